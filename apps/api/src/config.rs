use std::time::Duration;

use anyhow::{bail, Context, Result};

/// Application configuration loaded from environment variables.
/// Nothing is required; every variable has a default suited to a local LM Studio setup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub llm_enabled: bool,
    pub llm_base_url: String,
    pub llm_model: String,
    pub llm_api_key: Option<String>,
    pub llm_timeout: Duration,
    pub llm_insights_enabled: bool,
    pub web_scraping_enabled: bool,
    pub web_scraping_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
            llm_enabled: env_flag("LLM_ENABLED", true)?,
            llm_base_url: env_or("LLM_BASE_URL", "http://localhost:1234"),
            llm_model: env_or("LLM_MODEL", "qwen2.5-vl-7b"),
            llm_api_key: std::env::var("LLM_API_KEY").ok().filter(|k| !k.is_empty()),
            llm_timeout: env_secs("LLM_TIMEOUT_SECS", 120)?,
            llm_insights_enabled: env_flag("LLM_INSIGHTS_ENABLED", true)?,
            web_scraping_enabled: env_flag("WEB_SCRAPING_ENABLED", true)?,
            web_scraping_timeout: env_secs("WEB_SCRAPING_TIMEOUT_SECS", 10)?,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_flag(key: &str, default: bool) -> Result<bool> {
    match std::env::var(key) {
        Ok(raw) => parse_flag(&raw).with_context(|| format!("Invalid boolean in '{key}'")),
        Err(_) => Ok(default),
    }
}

fn env_secs(key: &str, default: u64) -> Result<Duration> {
    let secs = match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .with_context(|| format!("'{key}' must be a whole number of seconds"))?,
        Err(_) => default,
    };
    if secs == 0 {
        bail!("'{key}' must be greater than zero");
    }
    Ok(Duration::from_secs(secs))
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("expected true/false, got '{other}'"),
    }
}
