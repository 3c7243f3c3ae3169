//! TOML configuration for the `coachdesk` binary and server.
//!
//! Every section is optional. A missing `[knowledge]` section means the
//! built-in knowledge base and suggestion table are used.
//!
//! ```toml
//! [knowledge]
//! path = "./config/knowledge_base.toml"
//! suggestions = "./config/suggestions.toml"
//!
//! [server]
//! bind = "127.0.0.1:7341"
//! max_sessions = 1000
//!
//! [logging]
//! level = "info"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where to load assistant content from. `None` selects the built-in copy.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct KnowledgeConfig {
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub suggestions: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_sessions: default_max_sessions(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:7341".to_string()
}
fn default_max_sessions() -> usize {
    1000
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

impl Config {
    /// Built-in content, default bind address, `info` logging.
    pub fn minimal() -> Self {
        Self::default()
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config: Config =
        toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    // Relative content paths are resolved against the config file's directory.
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    config.knowledge.path = config.knowledge.path.map(|p| resolve(base, p));
    config.knowledge.suggestions = config.knowledge.suggestions.map(|p| resolve(base, p));

    validate(&config)?;
    Ok(config)
}

fn resolve(base: &Path, p: PathBuf) -> PathBuf {
    if p.is_absolute() {
        p
    } else {
        base.join(p)
    }
}

fn validate(config: &Config) -> Result<()> {
    if config.server.max_sessions == 0 {
        anyhow::bail!("server.max_sessions must be >= 1");
    }

    if config.server.bind.trim().is_empty() {
        anyhow::bail!("server.bind must not be empty");
    }

    if let Err(e) = EnvFilter::try_new(&config.logging.level) {
        anyhow::bail!("logging.level '{}' is invalid: {}", config.logging.level, e);
    }

    for (key, p) in [
        ("knowledge.path", &config.knowledge.path),
        ("knowledge.suggestions", &config.knowledge.suggestions),
    ] {
        if let Some(p) = p {
            if !p.exists() {
                anyhow::bail!("{} does not exist: {}", key, p.display());
            }
        }
    }

    Ok(())
}
