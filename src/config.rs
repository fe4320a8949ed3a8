// src/config.rs
//! Process-wide configuration, loaded once at startup and injected everywhere else

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::assessment::client::{DEFAULT_API_URL, DEFAULT_MODEL, DEFAULT_SEED, DEFAULT_TIMEOUT_SECS};
use crate::assessment::GeminiConfig;
use crate::errors::ConfigError;
use crate::export::{DEFAULT_EXPORT_TIMEOUT_SECS, DEFAULT_REPORT_PREFIX};
use crate::validator::HostMatching;

pub const DEFAULT_PORT: u16 = 8000;
const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Optional `config.yaml`. Secrets never live here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    pub model: Option<String>,
    pub api_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub seed: Option<i64>,
    pub grounded_search: Option<bool>,
    pub port: Option<u16>,
    pub typst_bin: Option<PathBuf>,
    pub export_timeout_secs: Option<u64>,
    pub report_prefix: Option<String>,
    pub strict_host_matching: Option<bool>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_yaml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub gemini: GeminiConfig,
    pub port: u16,
    pub typst_bin: PathBuf,
    pub export_timeout: Duration,
    pub report_prefix: String,
    pub host_matching: HostMatching,
}

impl AppConfig {
    /// Config file (`CONFIG_FILE` or ./config.yaml, if present) overlaid by the environment
    pub fn load() -> Result<Self> {
        let path = std::env::var("CONFIG_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

        let file = if path.exists() {
            info!("Loading configuration from {}", path.display());
            ConfigFile::load(&path)?
        } else {
            ConfigFile::default()
        };

        let config = Self::from_sources(file, |name| std::env::var(name).ok())?;
        info!(
            "Configuration loaded: model={}, timeout={:?}, host matching={:?}",
            config.gemini.model, config.gemini.timeout, config.host_matching
        );
        Ok(config)
    }

    pub fn from_sources<F>(file: ConfigFile, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = env("GEMINI_API_KEY")
            .or_else(|| env("API_KEY"))
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let timeout_secs = parse_env(&env, "ASSESSMENT_TIMEOUT_SECS")?
            .or(file.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                name: "ASSESSMENT_TIMEOUT_SECS",
                value: "0".to_string(),
            });
        }

        let export_timeout_secs = parse_env(&env, "EXPORT_TIMEOUT_SECS")?
            .or(file.export_timeout_secs)
            .unwrap_or(DEFAULT_EXPORT_TIMEOUT_SECS);
        if export_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                name: "EXPORT_TIMEOUT_SECS",
                value: "0".to_string(),
            });
        }

        let strict = parse_env(&env, "STRICT_HOST_MATCH")?
            .or(file.strict_host_matching)
            .unwrap_or(false);

        let gemini = GeminiConfig {
            api_key,
            api_url: env("GEMINI_API_URL")
                .or(file.api_url)
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            model: env("GEMINI_MODEL")
                .or(file.model)
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            timeout: Duration::from_secs(timeout_secs),
            seed: parse_env(&env, "ASSESSMENT_SEED")?
                .or(file.seed)
                .unwrap_or(DEFAULT_SEED),
            grounded_search: parse_env(&env, "GROUNDED_SEARCH")?
                .or(file.grounded_search)
                .unwrap_or(true),
        };

        Ok(Self {
            gemini,
            port: parse_env(&env, "ROCKET_PORT")?
                .or(file.port)
                .unwrap_or(DEFAULT_PORT),
            typst_bin: env("TYPST_BIN")
                .map(PathBuf::from)
                .or(file.typst_bin)
                .unwrap_or_else(|| PathBuf::from("typst")),
            export_timeout: Duration::from_secs(export_timeout_secs),
            report_prefix: env("REPORT_PREFIX")
                .or(file.report_prefix)
                .unwrap_or_else(|| DEFAULT_REPORT_PREFIX.to_string()),
            host_matching: if strict {
                HostMatching::Strict
            } else {
                HostMatching::Substring
            },
        })
    }
}

fn parse_env<F, T>(env: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match env(name) {
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        None => Ok(None),
    }
}
