use std::path::PathBuf;

use anyhow::{Context, bail};
use petcare_guard::RateLimit;
use rand::Rng;
use rand::distr::Alphanumeric;
use tracing::warn;

/// Placeholder session secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "your_secure_secret_key_here",
    "dev-secret-change-me",
    "change-me",
];

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gemini-pro".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub session_secret: String,
    pub session_days: i64,
    pub remember_days: i64,
    pub upload_dir: PathBuf,
    pub posts_per_page: i64,
    pub post_limit: RateLimit,
    pub comment_limit: RateLimit,
    pub llm: LlmConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            db_path: PathBuf::from(petcare_db::IN_MEMORY),
            session_secret: random_secret(),
            session_days: 7,
            remember_days: 30,
            upload_dir: PathBuf::from("static/uploads"),
            posts_per_page: 10,
            post_limit: RateLimit::new(30, 3),
            comment_limit: RateLimit::new(15, 5),
            llm: LlmConfig::default(),
        }
    }
}

impl Config {
    /// Reads `PETCARE_*` environment variables on top of the defaults.
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Config::default();

        if let Ok(host) = std::env::var("PETCARE_HOST") {
            config.host = host;
        }
        if let Ok(port) = std::env::var("PETCARE_PORT") {
            config.port = port.parse().context("PETCARE_PORT must be a port number")?;
        }
        if let Ok(path) = std::env::var("PETCARE_DB_PATH") {
            config.db_path = PathBuf::from(path);
        }
        if let Ok(dir) = std::env::var("PETCARE_UPLOAD_DIR") {
            config.upload_dir = PathBuf::from(dir);
        }

        match std::env::var("PETCARE_SESSION_SECRET") {
            Ok(secret) if PLACEHOLDER_SECRETS.contains(&secret.as_str()) => {
                bail!("PETCARE_SESSION_SECRET is still a placeholder value");
            }
            Ok(secret) if !secret.is_empty() => config.session_secret = secret,
            _ => warn!(
                "No session secret configured. Generated random secret (sessions end on restart)."
            ),
        }

        if let Ok(limit) = std::env::var("PETCARE_POST_LIMIT") {
            config.post_limit = parse_limit(&limit).context("PETCARE_POST_LIMIT")?;
        }
        if let Ok(limit) = std::env::var("PETCARE_COMMENT_LIMIT") {
            config.comment_limit = parse_limit(&limit).context("PETCARE_COMMENT_LIMIT")?;
        }

        if let Ok(key) = std::env::var("PETCARE_LLM_API_KEY") {
            config.llm.api_key = key;
        }
        if config.llm.api_key.is_empty() {
            warn!("PETCARE_LLM_API_KEY is not set; consultation requests will fail");
        }
        if let Ok(model) = std::env::var("PETCARE_LLM_MODEL") {
            config.llm.model = model;
        }
        if let Ok(url) = std::env::var("PETCARE_LLM_BASE_URL") {
            config.llm.base_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(secs) = std::env::var("PETCARE_LLM_TIMEOUT_SECS") {
            config.llm.timeout_secs = secs
                .parse()
                .context("PETCARE_LLM_TIMEOUT_SECS must be a number of seconds")?;
        }

        Ok(config)
    }
}

/// Parses `"<window seconds>/<max count>"`, e.g. `"30/3"`.
pub fn parse_limit(value: &str) -> anyhow::Result<RateLimit> {
    let (window, count) = value
        .split_once('/')
        .with_context(|| format!("expected <seconds>/<count>, got {value:?}"))?;
    let window: i64 = window.trim().parse().context("invalid window seconds")?;
    let count: usize = count.trim().parse().context("invalid count")?;
    if window <= 0 || count == 0 {
        bail!("rate limit window and count must be positive");
    }
    Ok(RateLimit::new(window, count))
}

fn random_secret() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(48)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_window_and_count() {
        assert_eq!(parse_limit("30/3").unwrap(), RateLimit::new(30, 3));
        assert_eq!(parse_limit(" 15 / 5 ").unwrap(), RateLimit::new(15, 5));
    }

    #[test]
    fn rejects_malformed_limits() {
        assert!(parse_limit("30").is_err());
        assert!(parse_limit("0/3").is_err());
        assert!(parse_limit("30/0").is_err());
        assert!(parse_limit("a/b").is_err());
    }

    #[test]
    fn defaults_match_board_rules() {
        let config = Config::default();
        assert_eq!(config.posts_per_page, 10);
        assert_eq!(config.post_limit, RateLimit::new(30, 3));
        assert_eq!(config.comment_limit, RateLimit::new(15, 5));
        assert_eq!(config.session_days, 7);
        assert_eq!(config.remember_days, 30);
        assert_eq!(config.session_secret.len(), 48);
    }
}
