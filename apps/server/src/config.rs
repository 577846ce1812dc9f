//! Application configuration.
//!
//! Credentials come from the environment (with `.env` support); tuning
//! knobs can be overridden on the command line.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Default sleep between passes in loop mode.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 900;

/// Default subscription file location.
pub const DEFAULT_SUBSCRIPTIONS_FILE: &str = "subscriptions.json";

/// Sentiment bot CLI
#[derive(Parser, Debug)]
#[command(name = "sentiment-bot")]
#[command(about = "Myfxbook community outlook alerts over Telegram", long_about = None)]
pub struct Args {
    /// Alert threshold in percent (overrides ALERT_THRESHOLD)
    #[arg(short = 't', long)]
    pub threshold: Option<f64>,

    /// Run a single pass and exit (overrides ONE_SHOT)
    #[arg(long, default_value_t = false)]
    pub one_shot: bool,

    /// Seconds to sleep between passes (overrides POLL_INTERVAL_SECS)
    #[arg(short = 'i', long)]
    pub interval_secs: Option<u64>,

    /// Subscription file path (overrides SUBSCRIPTIONS_FILE)
    #[arg(long)]
    pub subscriptions: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short, long, default_value = "info")]
    pub log_level: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

/// Resolved runtime configuration.
#[derive(Debug)]
pub struct AppConfig {
    pub myfxbook_email: String,
    pub myfxbook_password: String,
    pub telegram_token: String,
    /// Optional single-recipient mode: this chat is subscribed to every
    /// known pair at startup when it has no subscriptions of its own.
    pub default_chat_id: Option<i64>,
    pub threshold: f64,
    pub one_shot: bool,
    pub poll_interval: Duration,
    pub subscriptions_file: PathBuf,
}

impl AppConfig {
    /// Build the configuration from the environment and CLI arguments.
    /// Missing credentials are fatal; everything else has a default.
    pub fn from_env(args: &Args) -> Result<Self, ConfigError> {
        let myfxbook_email = required("MYFXBOOK_EMAIL")?;
        let myfxbook_password = required("MYFXBOOK_PASSWORD")?;
        let telegram_token = required("TELEGRAM_BOT_TOKEN")?;
        let default_chat_id = optional_parsed("TELEGRAM_CHAT_ID", parse_i64)?;

        let threshold = match args.threshold {
            Some(t) => t,
            None => optional_parsed("ALERT_THRESHOLD", parse_f64)?
                .unwrap_or(sentiment_core::DEFAULT_THRESHOLD),
        };

        let one_shot = args.one_shot
            || optional_parsed("ONE_SHOT", parse_bool)?.unwrap_or(false);

        let interval_secs = match args.interval_secs {
            Some(secs) => secs,
            None => optional_parsed("POLL_INTERVAL_SECS", parse_u64)?
                .unwrap_or(DEFAULT_POLL_INTERVAL_SECS),
        };

        let subscriptions_file = args
            .subscriptions
            .clone()
            .or_else(|| std::env::var("SUBSCRIPTIONS_FILE").ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SUBSCRIPTIONS_FILE));

        Ok(Self {
            myfxbook_email,
            myfxbook_password,
            telegram_token,
            default_chat_id,
            threshold,
            one_shot,
            poll_interval: Duration::from_secs(interval_secs),
            subscriptions_file,
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(name)),
    }
}

fn optional_parsed<T>(
    name: &'static str,
    parse: fn(&str) -> Option<T>,
) -> Result<Option<T>, ConfigError> {
    match std::env::var(name) {
        Ok(value) => parse(&value)
            .map(Some)
            .ok_or(ConfigError::Invalid(name, value)),
        Err(_) => Ok(None),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn parse_f64(value: &str) -> Option<f64> {
    value.trim().parse().ok()
}

fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse().ok()
}

fn parse_i64(value: &str) -> Option<i64> {
    value.trim().parse().ok()
}
