//! # Configuration
//!
//! Environment configuration.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use anyhow::{anyhow, bail, Context as _, Result};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::features::reminders::{AUTO_INTERVAL_SECS, MAX_INTERVAL_SECS};
use crate::features::store::github::DEFAULT_API_URL;
use crate::features::store::GitHubSettings;

/// Where the record store keeps its datasets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackendConfig {
    Local { data_dir: PathBuf },
    GitHub(GitHubSettings),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub admin_id: u64,
    pub discord_guild_id: Option<u64>,
    pub log_level: String,
    pub store: StoreBackendConfig,
    pub store_timeout: Duration,
    /// `None` disables the idle timeout
    pub session_idle: Option<Duration>,
    pub auto_reminder_interval_secs: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let discord_token = get("DISCORD_TOKEN")
            .ok_or_else(|| anyhow!("DISCORD_TOKEN environment variable not set"))?;
        let admin_id = get("ADMIN_ID")
            .ok_or_else(|| anyhow!("ADMIN_ID environment variable not set"))
            .and_then(|v| parse_value::<u64>("ADMIN_ID", &v))?;
        let discord_guild_id = get("DISCORD_GUILD_ID")
            .map(|v| parse_value::<u64>("DISCORD_GUILD_ID", &v))
            .transpose()?;
        let log_level = get("LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let store = match get("STORE_BACKEND").as_deref().unwrap_or("local") {
            "local" => StoreBackendConfig::Local {
                data_dir: PathBuf::from(get("DATA_DIR").unwrap_or_else(|| ".".to_string())),
            },
            "github" => StoreBackendConfig::GitHub(GitHubSettings {
                api_url: get("GITHUB_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
                token: get("GITHUB_TOKEN")
                    .ok_or_else(|| anyhow!("GITHUB_TOKEN is required when STORE_BACKEND=github"))?,
                repo: get("GITHUB_REPO")
                    .ok_or_else(|| anyhow!("GITHUB_REPO is required when STORE_BACKEND=github"))?,
                branch: get("GITHUB_BRANCH").unwrap_or_else(|| "main".to_string()),
                folder: get("GITHUB_FOLDER").unwrap_or_else(|| "airdrop-data".to_string()),
            }),
            other => bail!("STORE_BACKEND must be 'local' or 'github', got '{other}'"),
        };

        let store_timeout_secs = get("STORE_TIMEOUT_SECS")
            .map(|v| parse_value::<u64>("STORE_TIMEOUT_SECS", &v))
            .transpose()?
            .unwrap_or(30);
        if store_timeout_secs == 0 {
            bail!("STORE_TIMEOUT_SECS must be greater than zero");
        }

        let idle_minutes = get("SESSION_IDLE_MINUTES")
            .map(|v| parse_value::<u64>("SESSION_IDLE_MINUTES", &v))
            .transpose()?
            .unwrap_or(30);

        let auto_reminder_interval_secs = get("AUTO_REMINDER_INTERVAL_SECS")
            .map(|v| parse_value::<i64>("AUTO_REMINDER_INTERVAL_SECS", &v))
            .transpose()?
            .unwrap_or(AUTO_INTERVAL_SECS);
        if !(1..=MAX_INTERVAL_SECS).contains(&auto_reminder_interval_secs) {
            bail!("AUTO_REMINDER_INTERVAL_SECS must be between 1 and {MAX_INTERVAL_SECS}");
        }

        Ok(Config {
            discord_token,
            admin_id,
            discord_guild_id,
            log_level,
            store,
            store_timeout: Duration::from_secs(store_timeout_secs),
            session_idle: (idle_minutes > 0).then(|| Duration::from_secs(idle_minutes * 60)),
            auto_reminder_interval_secs,
        })
    }
}

fn parse_value<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse::<T>()
        .with_context(|| format!("{key} has an invalid value '{value}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[("DISCORD_TOKEN", "tok"), ("ADMIN_ID", "123")]).unwrap();
        assert_eq!(config.admin_id, 123);
        assert_eq!(config.log_level, "info");
        assert_eq!(
            config.store,
            StoreBackendConfig::Local {
                data_dir: PathBuf::from(".")
            }
        );
        assert_eq!(config.store_timeout, Duration::from_secs(30));
        assert_eq!(config.session_idle, Some(Duration::from_secs(1800)));
        assert_eq!(config.auto_reminder_interval_secs, 21_600);
        assert_eq!(config.discord_guild_id, None);
    }

    #[test]
    fn test_missing_required_keys() {
        assert!(config(&[("ADMIN_ID", "1")]).is_err());
        assert!(config(&[("DISCORD_TOKEN", "tok")]).is_err());
        assert!(config(&[("DISCORD_TOKEN", "tok"), ("ADMIN_ID", "abc")]).is_err());
    }

    #[test]
    fn test_github_backend_requires_credentials() {
        let base = [
            ("DISCORD_TOKEN", "tok"),
            ("ADMIN_ID", "1"),
            ("STORE_BACKEND", "github"),
        ];
        assert!(config(&base).is_err());

        let mut full = base.to_vec();
        full.push(("GITHUB_TOKEN", "ghp"));
        full.push(("GITHUB_REPO", "me/data"));
        let config = config(&full).unwrap();
        match config.store {
            StoreBackendConfig::GitHub(settings) => {
                assert_eq!(settings.repo, "me/data");
                assert_eq!(settings.branch, "main");
                assert_eq!(settings.folder, "airdrop-data");
                assert_eq!(settings.api_url, DEFAULT_API_URL);
            }
            other => panic!("expected github backend, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_idle_disables_timeout() {
        let config = config(&[
            ("DISCORD_TOKEN", "tok"),
            ("ADMIN_ID", "1"),
            ("SESSION_IDLE_MINUTES", "0"),
        ])
        .unwrap();
        assert_eq!(config.session_idle, None);
    }

    #[test]
    fn test_auto_interval_bounds() {
        let with_interval = |value: &str| {
            config(&[
                ("DISCORD_TOKEN", "tok"),
                ("ADMIN_ID", "1"),
                ("AUTO_REMINDER_INTERVAL_SECS", value),
            ])
        };
        assert!(with_interval("0").is_err());
        assert!(with_interval("31536001").is_err());
        assert_eq!(
            with_interval("31536000").unwrap().auto_reminder_interval_secs,
            MAX_INTERVAL_SECS
        );
    }

    #[test]
    fn test_unknown_backend_rejected() {
        assert!(config(&[
            ("DISCORD_TOKEN", "tok"),
            ("ADMIN_ID", "1"),
            ("STORE_BACKEND", "s3"),
        ])
        .is_err());
    }
}
