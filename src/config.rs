//! Image conversion service configuration

use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub advisor: AdvisorConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding the single-page form
    pub static_dir: PathBuf,
    pub max_upload_mb: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database file. History is disabled when unset.
    pub sqlite_path: Option<PathBuf>,
    /// Abort startup when the database cannot be opened
    pub required: bool,
    pub history_limit: i64,
}

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn default_path() -> &'static str {
        "config.toml"
    }
}

impl AdvisorConfig {
    /// Read the API key from the configured environment variable.
    /// Blank values count as absent.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            static_dir: PathBuf::from("static"),
            max_upload_mb: 20,
        }
    }
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            api_key_env: "CLAUDE_API_KEY".to_string(),
            base_url: "https://api.anthropic.com".to_string(),
            model: "claude-3-5-sonnet-20241022".to_string(),
            max_tokens: 1024,
            timeout_secs: 30,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            sqlite_path: Some(PathBuf::from("data/images.db")),
            required: false,
            history_limit: 20,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [server]
            port = 8080

            [storage]
            required = true
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.max_upload_mb, 20);
        assert!(config.storage.required);
        assert_eq!(config.storage.history_limit, 20);
        assert_eq!(config.advisor.api_key_env, "CLAUDE_API_KEY");
    }

    #[test]
    fn test_blank_api_key_is_absent() {
        let advisor = AdvisorConfig {
            api_key_env: "IMGTUNE_TEST_BLANK_KEY".to_string(),
            ..AdvisorConfig::default()
        };
        std::env::set_var("IMGTUNE_TEST_BLANK_KEY", "   ");
        assert!(advisor.api_key().is_none());

        std::env::set_var("IMGTUNE_TEST_BLANK_KEY", "sk-test");
        assert_eq!(advisor.api_key().as_deref(), Some("sk-test"));
        std::env::remove_var("IMGTUNE_TEST_BLANK_KEY");
    }
}
