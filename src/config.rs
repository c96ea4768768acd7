use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use tracing::level_filters::LevelFilter;

use crate::sink::{GoogleEndpoints, ServiceAccountKey, SpreadsheetLocator};

const DEFAULT_SPREADSHEET_TITLE: &str = "LevkinsPayments";
const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

#[derive(Clone)]
pub struct Config {
    pub bot_token: String,
    pub credentials: ServiceAccountKey,
    pub google_endpoints: GoogleEndpoints,
    pub spreadsheet: SpreadsheetLocator,
    /// Worksheet receiving rows; the first worksheet when unset.
    pub worksheet: Option<String>,
    pub port: u16,
    pub log_level: LevelFilter,
    pub session_idle_timeout: Duration,
    pub poll_timeout: Duration,
    pub telegram_api_url: String
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any variable source; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let bot_token = var("BOT_TOKEN")
            .context("BOT_TOKEN environment variable is required")?;

        let credentials = match (var("GOOGLE_CREDENTIALS"), var("GOOGLE_CREDENTIALS_PATH")) {
            (Some(json), _) => ServiceAccountKey::from_json(&json)
                .context("GOOGLE_CREDENTIALS must hold a service account key")?,
            (None, Some(path)) => ServiceAccountKey::from_file(&PathBuf::from(path))
                .context("GOOGLE_CREDENTIALS_PATH must point to a service account key")?,
            (None, None) => return Err(anyhow!("GOOGLE_CREDENTIALS or GOOGLE_CREDENTIALS_PATH environment variable is required"))
        };

        let defaults = GoogleEndpoints::default();
        let google_endpoints = GoogleEndpoints {
            sheets: var("GOOGLE_SHEETS_API_URL").unwrap_or(defaults.sheets),
            drive_files: var("GOOGLE_DRIVE_API_URL").unwrap_or(defaults.drive_files)
        };

        let spreadsheet = match var("SPREADSHEET_ID") {
            Some(id) => SpreadsheetLocator::Id(id),
            None => SpreadsheetLocator::Title(var("SPREADSHEET_TITLE").unwrap_or_else(|| DEFAULT_SPREADSHEET_TITLE.to_string()))
        };

        let port = var("PORT")
            .unwrap_or_else(|| "10000".to_string())
            .parse::<u16>()
            .context("PORT must be a valid number")?;

        let log_level = var("LOG_LEVEL")
            .map(|level| parse_log_level(&level))
            .unwrap_or(LevelFilter::INFO);

        let session_idle_timeout = var("SESSION_IDLE_SECS")
            .unwrap_or_else(|| "600".to_string())
            .parse::<u64>()
            .map(Duration::from_secs)
            .context("SESSION_IDLE_SECS must be a valid number")?;

        let poll_timeout = var("POLL_TIMEOUT_SECS")
            .unwrap_or_else(|| "30".to_string())
            .parse::<u64>()
            .map(Duration::from_secs)
            .context("POLL_TIMEOUT_SECS must be a valid number")?;

        let telegram_api_url = var("TELEGRAM_API_URL")
            .unwrap_or_else(|| DEFAULT_TELEGRAM_API_URL.to_string());

        Ok(Config {
            bot_token,
            credentials,
            google_endpoints,
            spreadsheet,
            worksheet: var("WORKSHEET_TITLE"),
            port,
            log_level,
            session_idle_timeout,
            poll_timeout,
            telegram_api_url
        })
    }
}

pub fn parse_log_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        _ => {
            eprintln!("Invalid log level '{}', defaulting to 'info'", level);
            LevelFilter::INFO
        }
    }
}
