use anyhow::{Context, Result};

const DEFAULT_MAX_RESUME_BYTES: usize = 16 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the external scoring service (no trailing `/analyze-resumes`).
    pub analysis_api_url: String,
    /// Draft store backend. `None` keeps sessions in process memory.
    pub redis_url: Option<String>,
    pub port: u16,
    pub rust_log: String,
    pub analysis_timeout_secs: u64,
    pub session_ttl_secs: u64,
    pub max_resume_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            analysis_api_url: require_env("ANALYSIS_API_URL")?,
            redis_url: std::env::var("REDIS_URL").ok().filter(|v| !v.trim().is_empty()),
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            analysis_timeout_secs: parse_env("ANALYSIS_TIMEOUT_SECS", 120)?,
            session_ttl_secs: parse_env("SESSION_TTL_SECS", 86_400)?,
            max_resume_bytes: parse_env("MAX_RESUME_BYTES", DEFAULT_MAX_RESUME_BYTES)?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    /// Configuration for router tests: in-memory drafts, the given scoring endpoint.
    pub fn for_tests(analysis_api_url: &str) -> Self {
        Config {
            analysis_api_url: analysis_api_url.to_string(),
            redis_url: None,
            port: 0,
            rust_log: "debug".to_string(),
            analysis_timeout_secs: 5,
            session_ttl_secs: 60,
            max_resume_bytes: DEFAULT_MAX_RESUME_BYTES,
        }
    }
}
