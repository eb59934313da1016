use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::analysis::verdict::VerdictValidation;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-5.2";
const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_POLICY: &str = "balanced";

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing or a value does not parse.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_model: String,
    pub port: u16,
    pub rust_log: String,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub request_timeout: Duration,
    /// Name of a built-in scoring policy. Ignored when `scoring_policy_file` is set.
    pub scoring_policy: String,
    pub scoring_policy_file: Option<PathBuf>,
    pub verdict_validation: VerdictValidation,
    /// When false, 5xx bodies carry a generic message instead of the error text.
    pub expose_error_details: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. `from_env` is the production entry point.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let openai_api_key = var("OPENAI_API_KEY")
            .with_context(|| "Required environment variable 'OPENAI_API_KEY' is not set")?;

        let port = match var("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            None => DEFAULT_PORT,
        };

        let max_upload_bytes = match var("MAX_UPLOAD_BYTES") {
            Some(raw) => raw
                .parse::<usize>()
                .context("MAX_UPLOAD_BYTES must be a positive integer")?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        let timeout_secs = match var("REQUEST_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .context("REQUEST_TIMEOUT_SECS must be a whole number of seconds")?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        if timeout_secs == 0 {
            bail!("REQUEST_TIMEOUT_SECS must be greater than zero");
        }

        let verdict_validation = match var("VERDICT_VALIDATION") {
            Some(raw) => raw.parse::<VerdictValidation>()?,
            None => VerdictValidation::Off,
        };

        let expose_error_details = match var("EXPOSE_ERROR_DETAILS") {
            Some(raw) => parse_bool(&raw)
                .with_context(|| format!("EXPOSE_ERROR_DETAILS must be true or false, got '{raw}'"))?,
            None => true,
        };

        Ok(Config {
            openai_api_key,
            openai_base_url: var("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            openai_model: var("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            port,
            rust_log: var("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            upload_dir: var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR)),
            max_upload_bytes,
            request_timeout: Duration::from_secs(timeout_secs),
            scoring_policy: var("SCORING_POLICY").unwrap_or_else(|| DEFAULT_POLICY.to_string()),
            scoring_policy_file: var("SCORING_POLICY_FILE").map(PathBuf::from),
            verdict_validation,
            expose_error_details,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
