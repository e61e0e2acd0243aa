use std::fmt;

use chrono::{DateTime, Duration, Utc};
use quiz_core::model::{LearnerId, ReviewItem, TopicSnapshot};
use storage::demo::{demo_questions, seed_demo_questions};
use storage::repository::{ProgressRepository, Storage};

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    learner: Option<LearnerId>,
    mastery: f64,
    now: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidLearner { raw: String },
    InvalidMastery { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidLearner { raw } => write!(f, "invalid --learner value: {raw:?}"),
            ArgsError::InvalidMastery { raw } => {
                write!(f, "invalid --mastery value (expected 0..=100): {raw}")
            }
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected RFC3339): {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_mastery(value: String) -> Result<f64, ArgsError> {
    match value.parse::<f64>() {
        Ok(m) if m.is_finite() && (0.0..=100.0).contains(&m) => Ok(m),
        _ => Err(ArgsError::InvalidMastery { raw: value }),
    }
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("QUIZ_DB_URL").unwrap_or_else(|_| "sqlite:quiz.sqlite3?mode=rwc".into());
        let mut learner = std::env::var("QUIZ_LEARNER").ok().map(LearnerId::new);
        let mut mastery = std::env::var("QUIZ_SEED_MASTERY")
            .ok()
            .and_then(|value| value.parse::<f64>().ok())
            .unwrap_or(50.0);
        let mut now: Option<DateTime<Utc>> = None;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--learner" => {
                    let value = require_value(&mut args, "--learner")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidLearner { raw: value });
                    }
                    learner = Some(LearnerId::new(value));
                }
                "--mastery" => {
                    let value = require_value(&mut args, "--mastery")?;
                    mastery = parse_mastery(value)?;
                }
                "--now" => {
                    let value = require_value(&mut args, "--now")?;
                    let parsed = DateTime::parse_from_rfc3339(&value)
                        .map_err(|_| ArgsError::InvalidNow { raw: value.clone() })?
                        .with_timezone(&Utc);
                    now = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            learner,
            mastery,
            now,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite:quiz.sqlite3?mode=rwc)");
    eprintln!("  --learner <id>            Also seed topic progress for this learner");
    eprintln!("  --mastery <0..100>        Starting mastery for seeded topics (default: 50)");
    eprintln!("  --now <rfc3339>           Fixed current time for deterministic seeding");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  QUIZ_DB_URL, QUIZ_LEARNER, QUIZ_SEED_MASTERY");
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;
    let now = args.now.unwrap_or_else(Utc::now);

    let count = seed_demo_questions(storage.questions.as_ref()).await?;

    let mut topics: Vec<String> = Vec::new();
    for q in demo_questions() {
        let topic = q.topic_id.as_str().to_owned();
        if !topics.contains(&topic) {
            topics.push(topic);
        }
    }

    if let Some(learner) = &args.learner {
        for (i, topic) in topics.iter().enumerate() {
            let snapshot = TopicSnapshot::seeded(topic.as_str(), args.mastery)?.seen_at(now);
            storage.progress.save_snapshot(learner, &snapshot).await?;

            // First topic comes up for review right away; the rest later.
            let offset = i64::try_from(i).unwrap_or(i64::MAX).saturating_mul(2);
            let review = ReviewItem::new(topic.as_str(), now + Duration::days(offset));
            storage.progress.upsert_review(learner, &review).await?;
        }
    }

    match &args.learner {
        Some(learner) => println!(
            "Seeded {count} questions and {} topics for learner {learner} into {}",
            topics.len(),
            args.db_url
        ),
        None => println!("Seeded {count} questions into {}", args.db_url),
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
