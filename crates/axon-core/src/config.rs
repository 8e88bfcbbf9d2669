//! Axon configuration: built-in defaults, an optional TOML file, then `AXON__*` environment overrides.
//!
//! | Key | Env | Default |
//! |-----|-----|---------|
//! | app_name | AXON__APP_NAME | Axon |
//! | host | AXON__HOST | 127.0.0.1 |
//! | port | AXON__PORT | 3000 |
//! | store_path | AXON__STORE_PATH | ./data/axon/axon.sqlite |
//! | completion_base_url | AXON__COMPLETION_BASE_URL | https://api.openai.com/v1 |
//! | completion_model | AXON__COMPLETION_MODEL | gpt-4o |
//! | completion_api_key | AXON__COMPLETION_API_KEY, then OPENAI_API_KEY, then OPENROUTER_API_KEY | unset |
//! | completion_temperature | AXON__COMPLETION_TEMPERATURE | unset (provider default) |
//! | completion_timeout_secs | AXON__COMPLETION_TIMEOUT_SECS | 60 |

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::AxonResult;

pub const DEFAULT_CONFIG_PATH: &str = "config/axon.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxonConfig {
    pub app_name: String,
    pub host: String,
    pub port: u16,
    /// SQLite file backing the three tables.
    pub store_path: String,
    /// OpenAI-compatible API root; `/chat/completions` is appended.
    pub completion_base_url: String,
    pub completion_model: String,
    #[serde(default)]
    pub completion_api_key: Option<String>,
    #[serde(default)]
    pub completion_temperature: Option<f32>,
    pub completion_timeout_secs: u64,
}

impl Default for AxonConfig {
    fn default() -> Self {
        Self {
            app_name: "Axon".to_string(),
            host: "127.0.0.1".to_string(),
            port: 3000,
            store_path: "./data/axon/axon.sqlite".to_string(),
            completion_base_url: "https://api.openai.com/v1".to_string(),
            completion_model: "gpt-4o".to_string(),
            completion_api_key: None,
            completion_temperature: None,
            completion_timeout_secs: 60,
        }
    }
}

impl AxonConfig {
    /// Load config. Precedence: env `AXON_CONFIG` path > `config/axon.toml` > defaults, then `AXON__*` env.
    pub fn load() -> AxonResult<Self> {
        let config_path =
            std::env::var("AXON_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(Some(Path::new(&config_path)))
    }

    pub fn load_from(path: Option<&Path>) -> AxonResult<Self> {
        let defaults = Self::default();
        let builder = config::Config::builder()
            .set_default("app_name", defaults.app_name)?
            .set_default("host", defaults.host)?
            .set_default("port", defaults.port as i64)?
            .set_default("store_path", defaults.store_path)?
            .set_default("completion_base_url", defaults.completion_base_url)?
            .set_default("completion_model", defaults.completion_model)?
            .set_default("completion_timeout_secs", defaults.completion_timeout_secs as i64)?;

        let builder = match path {
            Some(p) if p.exists() => builder.add_source(config::File::from(p)),
            _ => builder,
        };

        let built = builder
            .add_source(
                config::Environment::with_prefix("AXON")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut cfg: AxonConfig = built.try_deserialize()?;
        if cfg
            .completion_api_key
            .as_deref()
            .map(|k| k.trim().is_empty())
            .unwrap_or(true)
        {
            cfg.completion_api_key =
                env_opt_string("OPENAI_API_KEY").or_else(|| env_opt_string("OPENROUTER_API_KEY"));
        }
        Ok(cfg)
    }

    /// `host:port` for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn has_completion_key(&self) -> bool {
        self.completion_api_key
            .as_deref()
            .map(|k| !k.trim().is_empty())
            .unwrap_or(false)
    }
}

fn env_opt_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("axon.toml");
        std::fs::write(
            &path,
            "port = 8088\nstore_path = \"/tmp/axon-test.sqlite\"\ncompletion_model = \"gpt-4o-mini\"\ncompletion_api_key = \"sk-test\"\n",
        )
        .unwrap();

        let cfg = AxonConfig::load_from(Some(&path)).unwrap();
        assert_eq!(cfg.port, 8088);
        assert_eq!(cfg.store_path, "/tmp/axon-test.sqlite");
        assert_eq!(cfg.completion_model, "gpt-4o-mini");
        assert_eq!(cfg.completion_api_key.as_deref(), Some("sk-test"));
        assert_eq!(cfg.completion_timeout_secs, 60);
        assert!(cfg.has_completion_key());
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = AxonConfig::load_from(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(cfg.app_name, "Axon");
        assert_eq!(cfg.completion_base_url, "https://api.openai.com/v1");
    }
}
