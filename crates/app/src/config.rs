use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

pub const DEFAULT_DB_URL: &str = "sqlite:quiz.sqlite3?mode=rwc";
pub const DEFAULT_PORT: u16 = 8080;

/// Server settings. Environment first, command-line flags override.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub db_url: String,
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub seed_demo: bool,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ArgsError {
    HelpRequested,
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidHost { raw: String },
    InvalidPort { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::HelpRequested => f.write_str("help requested"),
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidHost { raw } => write!(f, "invalid --host value: {raw}"),
            ArgsError::InvalidPort { raw } => write!(f, "invalid --port value: {raw}"),
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

fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_url: DEFAULT_DB_URL.to_string(),
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: DEFAULT_PORT,
            log_level: "info".to_string(),
            seed_demo: false,
        }
    }
}

impl Config {
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let db_url = std::env::var("QUIZ_DB_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.db_url);

        let host = std::env::var("QUIZ_HOST")
            .ok()
            .and_then(|value| value.parse::<IpAddr>().ok())
            .unwrap_or(defaults.host);

        let port = std::env::var("QUIZ_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(defaults.port);

        let log_level = std::env::var("RUST_LOG").unwrap_or(defaults.log_level);

        Self {
            db_url,
            host,
            port,
            log_level,
            seed_demo: env_bool("QUIZ_SEED_DEMO").unwrap_or(false),
        }
    }

    /// Apply command-line flags on top of this config.
    ///
    /// # Errors
    ///
    /// Returns `ArgsError` for unknown flags, missing or malformed values, and
    /// `ArgsError::HelpRequested` for `-h`/`--help`.
    pub fn with_args(mut self, args: impl IntoIterator<Item = String>) -> Result<Self, ArgsError> {
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    self.db_url = value;
                }
                "--host" => {
                    let value = require_value(&mut args, "--host")?;
                    self.host = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidHost { raw: value.clone() })?;
                }
                "--port" => {
                    let value = require_value(&mut args, "--port")?;
                    self.port = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidPort { raw: value.clone() })?;
                }
                "--seed-demo" => self.seed_demo = true,
                "--help" | "-h" => return Err(ArgsError::HelpRequested),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }
        Ok(self)
    }

    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app --bin quiz-server -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: {DEFAULT_DB_URL})");
    eprintln!("  --host <ip>               Listen address (default: 0.0.0.0)");
    eprintln!("  --port <port>             Listen port (default: {DEFAULT_PORT})");
    eprintln!("  --seed-demo               Load the demo questions into an empty bank");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  QUIZ_DB_URL, QUIZ_HOST, QUIZ_PORT, QUIZ_SEED_DEMO, RUST_LOG");
}
