//! Runtime configuration loaded from environment variables.
//!
//! - `BOT_TOKEN` - Max Bot API token (required)
//! - `NOTEBOT_DATA_FILE` - Path of the JSON note store (default: platform data dir)
//! - `NOTEBOT_API_URL` - Max Bot API base URL (default: `https://platform-api.max.ru`)
//! - `NOTEBOT_ID_STRATEGY` - `length` or `monotonic` note numbering (default: `length`)
//! - `NOTEBOT_POLL_TIMEOUT` - Long-poll timeout in seconds (default: 30)

use std::path::PathBuf;

use thiserror::Error;

use crate::store::IdStrategy;

pub const DEFAULT_API_URL: &str = "https://platform-api.max.ru";
pub const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("BOT_TOKEN is not set; export BOT_TOKEN=<token> or add it to a .env file")]
    MissingToken,

    #[error("Invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },
}

#[derive(Clone)]
pub struct BotConfig {
    pub token: String,
    /// `None` means the platform default location.
    pub data_file: Option<PathBuf>,
    pub api_url: String,
    pub id_strategy: IdStrategy,
    pub poll_timeout_secs: u64,
}

impl std::fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotConfig")
            .field("token", &"<redacted>")
            .field("data_file", &self.data_file)
            .field("api_url", &self.api_url)
            .field("id_strategy", &self.id_strategy)
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .finish()
    }
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let token = get("BOT_TOKEN").ok_or(ConfigError::MissingToken)?;

        let id_strategy = match get("NOTEBOT_ID_STRATEGY") {
            Some(value) => {
                IdStrategy::from_str(value.trim()).ok_or(ConfigError::InvalidValue {
                    var: "NOTEBOT_ID_STRATEGY",
                    value,
                })?
            }
            None => IdStrategy::default(),
        };

        let poll_timeout_secs = match get("NOTEBOT_POLL_TIMEOUT") {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidValue {
                    var: "NOTEBOT_POLL_TIMEOUT",
                    value,
                })?,
            None => DEFAULT_POLL_TIMEOUT_SECS,
        };

        Ok(Self {
            token: token.trim().to_string(),
            data_file: get("NOTEBOT_DATA_FILE").map(PathBuf::from),
            api_url: get("NOTEBOT_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            id_strategy,
            poll_timeout_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var: &str| vars.get(var).cloned()
    }

    #[test]
    fn missing_token_is_an_error() {
        let err = BotConfig::from_lookup(lookup(&[])).unwrap_err();
        assert_eq!(err, ConfigError::MissingToken);
    }

    #[test]
    fn blank_token_is_an_error() {
        let err = BotConfig::from_lookup(lookup(&[("BOT_TOKEN", "  ")])).unwrap_err();
        assert_eq!(err, ConfigError::MissingToken);
    }

    #[test]
    fn defaults_apply_with_only_a_token() {
        let config = BotConfig::from_lookup(lookup(&[("BOT_TOKEN", "secret")])).unwrap();
        assert_eq!(config.token, "secret");
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.id_strategy, IdStrategy::CollectionLength);
        assert_eq!(config.poll_timeout_secs, DEFAULT_POLL_TIMEOUT_SECS);
        assert!(config.data_file.is_none());
    }

    #[test]
    fn reads_overrides() {
        let config = BotConfig::from_lookup(lookup(&[
            ("BOT_TOKEN", "secret"),
            ("NOTEBOT_DATA_FILE", "/tmp/notes.json"),
            ("NOTEBOT_API_URL", "http://localhost:9000/"),
            ("NOTEBOT_ID_STRATEGY", "monotonic"),
            ("NOTEBOT_POLL_TIMEOUT", "5"),
        ]))
        .unwrap();
        assert_eq!(config.data_file, Some(PathBuf::from("/tmp/notes.json")));
        assert_eq!(config.api_url, "http://localhost:9000");
        assert_eq!(config.id_strategy, IdStrategy::Monotonic);
        assert_eq!(config.poll_timeout_secs, 5);
    }

    #[test]
    fn rejects_unknown_id_strategy() {
        let err = BotConfig::from_lookup(lookup(&[
            ("BOT_TOKEN", "secret"),
            ("NOTEBOT_ID_STRATEGY", "random"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { var: "NOTEBOT_ID_STRATEGY", .. }));
    }

    #[test]
    fn debug_output_hides_token() {
        let config = BotConfig::from_lookup(lookup(&[("BOT_TOKEN", "secret")])).unwrap();
        assert!(!format!("{:?}", config).contains("secret"));
    }
}
