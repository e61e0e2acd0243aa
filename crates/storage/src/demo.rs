//! Built-in English grammar question set used by the `seed` binary and by
//! `--seed-demo` at server startup.

use quiz_core::model::{Difficulty, QuestionId};

use crate::repository::{QuestionBank, QuestionRecord, StorageError};

fn question(
    id: u64,
    topic: &str,
    difficulty: Difficulty,
    prompt: &str,
    options: &[&str],
    correct_answer: &str,
    explanation: &str,
) -> QuestionRecord {
    QuestionRecord {
        id: QuestionId::new(id),
        topic_id: topic.into(),
        difficulty,
        prompt: prompt.to_owned(),
        options: options.iter().map(|o| (*o).to_owned()).collect(),
        correct_answer: correct_answer.to_owned(),
        explanation: explanation.to_owned(),
    }
}

#[must_use]
pub fn demo_questions() -> Vec<QuestionRecord> {
    vec![
        question(
            1,
            "articles",
            Difficulty::EASY,
            "Choose the correct article: ___ apple",
            &["a", "an", "the"],
            "an",
            "We use 'an' before words that start with a vowel sound.",
        ),
        question(
            2,
            "articles",
            Difficulty::MEDIUM,
            "Choose the correct article: ___ university",
            &["a", "an", "the"],
            "a",
            "'University' starts with a 'you' sound, so we use 'a'.",
        ),
        question(
            3,
            "articles",
            Difficulty::HARD,
            "Choose the correct article: She plays ___ violin in ___ orchestra.",
            &["the / an", "a / the", "- / an"],
            "the / an",
            "Musical instruments take 'the'; 'orchestra' starts with a vowel sound.",
        ),
        question(
            4,
            "present_simple",
            Difficulty::EASY,
            "He ___ to school every day.",
            &["go", "goes", "going"],
            "goes",
            "Third person singular adds -s or -es in the present simple.",
        ),
        question(
            5,
            "present_simple",
            Difficulty::MEDIUM,
            "___ she like coffee?",
            &["Do", "Does", "Is"],
            "Does",
            "Questions in the third person singular use 'does' plus the base verb.",
        ),
        question(
            6,
            "past_simple",
            Difficulty::EASY,
            "Yesterday I ___ a letter.",
            &["write", "wrote", "written"],
            "wrote",
            "'Write' is irregular: write, wrote, written.",
        ),
        question(
            7,
            "past_simple",
            Difficulty::MEDIUM,
            "They ___ at home last night.",
            &["wasn't", "weren't", "didn't"],
            "weren't",
            "Plural subjects take 'were' in the past simple of 'to be'.",
        ),
        question(
            8,
            "past_simple",
            Difficulty::HARD,
            "By the time we arrived, the film ___.",
            &["started", "had started", "has started"],
            "had started",
            "An action completed before another past action uses the past perfect.",
        ),
    ]
}

/// Insert the demo set into `bank`, replacing questions with the same ids.
///
/// # Errors
///
/// Returns `StorageError` if any question cannot be stored.
pub async fn seed_demo_questions(bank: &dyn QuestionBank) -> Result<usize, StorageError> {
    let questions = demo_questions();
    for q in &questions {
        bank.upsert_question(q).await?;
    }
    tracing::info!(count = questions.len(), "seeded demo questions");
    Ok(questions.len())
}
