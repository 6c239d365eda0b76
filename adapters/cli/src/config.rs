//! Optional TOML file with world and enemy tuning.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use gridfire_system_enemy_ai::Tuning;
use gridfire_world::WorldConfig;
use serde::Deserialize;

/// Tunables accepted from `--config`; omitted tables keep their defaults.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct FileConfig {
    pub(crate) world: WorldConfig,
    pub(crate) enemy_ai: Tuning,
}

impl FileConfig {
    /// Reads the file at `path`, or falls back to defaults when none is given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid config file {}", path.display()))
    }

    fn parse(text: &str) -> Result<Self> {
        let config = toml::from_str(text)?;
        Ok(config)
    }
}
