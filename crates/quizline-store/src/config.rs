//! quizline configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level quizline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizlineConfig {
    /// Directory holding `quizzes/` and `results/`.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Time limit for quizzes that do not set their own.
    #[serde(default = "default_time_limit")]
    pub default_time_limit_minutes: u32,
    /// Minimum percentage counted as a pass in statistics.
    #[serde(default = "default_pass_threshold")]
    pub pass_threshold: u8,
    /// How long a result write may take before it is reported failed.
    #[serde(default = "default_persist_timeout")]
    pub persist_timeout_ms: u64,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./quizline-data")
}
fn default_time_limit() -> u32 {
    30
}
fn default_pass_threshold() -> u8 {
    50
}
fn default_persist_timeout() -> u64 {
    10_000
}

impl Default for QuizlineConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            default_time_limit_minutes: default_time_limit(),
            pass_threshold: default_pass_threshold(),
            persist_timeout_ms: default_persist_timeout(),
        }
    }
}

impl QuizlineConfig {
    pub fn persist_timeout(&self) -> Duration {
        Duration::from_millis(self.persist_timeout_ms)
    }

    fn check(&self) -> Result<()> {
        if self.pass_threshold > 100 {
            anyhow::bail!(
                "pass_threshold must be between 0 and 100, got {}",
                self.pass_threshold
            );
        }
        if self.default_time_limit_minutes == 0 {
            anyhow::bail!("default_time_limit_minutes must be at least 1");
        }
        Ok(())
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    let mut from = 0;
    while let Some(offset) = result[from..].find("${") {
        let start = from + offset;
        let Some(end) = result[start..].find('}') else {
            break;
        };
        let var_name = &result[start + 2..start + end];
        let value = std::env::var(var_name).unwrap_or_default();
        result = format!("{}{}{}", &result[..start], value, &result[start + end + 1..]);
        from = start + value.len();
    }
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `quizline.toml` in the current directory
/// 2. `~/.config/quizline/config.toml`
///
/// `QUIZLINE_DATA_DIR` overrides `data_dir`.
pub fn load_config() -> Result<QuizlineConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizlineConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("quizline.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|dir| dir.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<QuizlineConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => QuizlineConfig::default(),
    };

    config.data_dir = PathBuf::from(resolve_env_vars(&config.data_dir.to_string_lossy()));

    if let Ok(dir) = std::env::var("QUIZLINE_DATA_DIR") {
        if !dir.is_empty() {
            config.data_dir = PathBuf::from(dir);
        }
    }

    config.check()?;
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizline"))
}
