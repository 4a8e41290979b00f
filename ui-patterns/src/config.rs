//! Pipeline configuration loaded with figment.
//!
//! Sources in precedence order (later sources override earlier ones):
//! 1. Built-in defaults
//! 2. An optional YAML, TOML or JSON file
//! 3. `UI_PATTERNS_` environment variables

use std::path::Path;

use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "UI_PATTERNS_";

/// Theme hook of the wrapper node produced for multi-source fields.
pub const DEFAULT_DESTINATION_THEME_HOOK: &str = "patterns_destination";

/// Settings that tune the element pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternsConfig {
    /// Theme hook of multi-source destination nodes.
    pub destination_theme_hook: String,
    /// Markup emitted when a pattern ends up with no field content.
    pub empty_markup: String,
    /// Log a warning when a computed setting cannot be merged into a
    /// caller-supplied value and is dropped.
    pub warn_on_dropped_settings: bool,
}

impl Default for PatternsConfig {
    fn default() -> Self {
        Self {
            destination_theme_hook: DEFAULT_DESTINATION_THEME_HOOK.to_string(),
            empty_markup: String::new(),
            warn_on_dropped_settings: true,
        }
    }
}

impl PatternsConfig {
    /// Defaults overridden by environment variables.
    pub fn load() -> Result<Self> {
        Self::extract(Self::figment())
    }

    /// Defaults, then `path`, then environment variables.
    ///
    /// The format follows the file extension; unknown extensions are read as YAML.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Figment::from(Toml::file(path)),
            Some("json") => Figment::from(Json::file(path)),
            _ => Figment::from(Yaml::file(path)),
        };
        debug!(path = %path.display(), "loading pattern configuration");
        let figment = Figment::new()
            .merge(Serialized::defaults(PatternsConfig::default()))
            .merge(file)
            .merge(Env::prefixed(ENV_PREFIX).map(|key| key.as_str().to_lowercase().into()));
        Self::extract(figment)
    }

    fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(PatternsConfig::default()))
            .merge(Env::prefixed(ENV_PREFIX).map(|key| key.as_str().to_lowercase().into()))
    }

    fn extract(figment: Figment) -> Result<Self> {
        let config: PatternsConfig = figment.extract()?;
        debug!(?config, "pattern configuration loaded");
        Ok(config)
    }
}
