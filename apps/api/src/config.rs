use std::fmt;

use anyhow::{Context, Result};

use crate::rubric::table_parser::BlankCellPolicy;

const DEFAULT_COMPLETION_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Application configuration loaded from environment variables.
/// Fails at startup if a variable is present but malformed.
#[derive(Clone)]
pub struct Config {
    pub completion_api_url: String,
    /// Fallback credential used when a request does not carry its own key.
    pub default_api_key: Option<String>,
    pub completion_timeout_secs: u64,
    pub criteria_catalog_path: Option<String>,
    pub blank_cells: BlankCellPolicy,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            completion_api_url: std::env::var("COMPLETION_API_URL")
                .unwrap_or_else(|_| DEFAULT_COMPLETION_API_URL.to_string()),
            default_api_key: optional_env("GROQ_API_KEY"),
            completion_timeout_secs: std::env::var("COMPLETION_TIMEOUT_SECS")
                .unwrap_or_else(|_| "120".to_string())
                .parse::<u64>()
                .context("COMPLETION_TIMEOUT_SECS must be a whole number of seconds")?,
            criteria_catalog_path: optional_env("CRITERIA_CATALOG_PATH"),
            blank_cells: std::env::var("RUBRIC_BLANK_CELLS")
                .unwrap_or_else(|_| "preserve".to_string())
                .parse::<BlankCellPolicy>()
                .context("RUBRIC_BLANK_CELLS must be 'preserve' or 'collapse'")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("completion_api_url", &self.completion_api_url)
            .field(
                "default_api_key",
                &self.default_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("completion_timeout_secs", &self.completion_timeout_secs)
            .field("criteria_catalog_path", &self.criteria_catalog_path)
            .field("blank_cells", &self.blank_cells)
            .field("port", &self.port)
            .field("rust_log", &self.rust_log)
            .finish()
    }
}

/// Reads an env var, treating unset and blank the same way.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
impl Config {
    /// Configuration used by router tests. Never touches the environment.
    pub fn for_tests() -> Self {
        Config {
            completion_api_url: DEFAULT_COMPLETION_API_URL.to_string(),
            default_api_key: None,
            completion_timeout_secs: 5,
            criteria_catalog_path: None,
            blank_cells: BlankCellPolicy::Preserve,
            port: 0,
            rust_log: "debug".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_default_api_key() {
        let config = Config {
            default_api_key: Some("gsk_secret".to_string()),
            ..Config::for_tests()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("gsk_secret"));
        assert!(debug.contains("<redacted>"));
        assert!(debug.contains("completion_api_url"));
    }

    #[test]
    fn test_debug_shows_absent_key_as_none() {
        let debug = format!("{:?}", Config::for_tests());
        assert!(debug.contains("default_api_key: None"));
    }
}
