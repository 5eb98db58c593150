use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};

/// Application configuration loaded from environment variables.
/// Fails fast at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the upstream company/employee read API.
    pub directory_api_base: String,
    /// Base URL of the third-party identity verification provider.
    pub verify_api_base: String,
    pub verify_api_key: String,
    pub port: u16,
    pub rust_log: String,
    /// Reference year for the roster's per-month contract-window columns.
    /// When unset, defaults to the year before the export date.
    pub reference_year: Option<i32>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            directory_api_base: require_env("DIRECTORY_API_BASE")?,
            verify_api_base: require_env("VERIFY_API_BASE")?,
            verify_api_key: require_env("VERIFY_API_KEY")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            reference_year: match std::env::var("REFERENCE_YEAR") {
                Ok(v) => Some(
                    v.parse::<i32>()
                        .context("REFERENCE_YEAR must be a four-digit year")?,
                ),
                Err(_) => None,
            },
        })
    }

    /// Resolves the reference year for a given export date.
    pub fn reference_year_for(&self, today: NaiveDate) -> i32 {
        self.reference_year.unwrap_or(today.year() - 1)
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config(reference_year: Option<i32>) -> Config {
        Config {
            directory_api_base: "http://localhost:9000".to_string(),
            verify_api_base: "http://localhost:9001".to_string(),
            verify_api_key: "test-key".to_string(),
            port: 8080,
            rust_log: "info".to_string(),
            reference_year,
        }
    }

    #[test]
    fn test_reference_year_defaults_to_previous_year() {
        let config = base_config(None);
        let today = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();
        assert_eq!(config.reference_year_for(today), 2025);
    }

    #[test]
    fn test_reference_year_override_wins() {
        let config = base_config(Some(2023));
        let today = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();
        assert_eq!(config.reference_year_for(today), 2023);
    }
}
