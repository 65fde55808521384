use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::modes::{MarksMode, MovementMode, TextSource, Theme};
use crate::palette;

/// Errors raised when an [`EngineConfig`] cannot drive an engine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Indicates an invalid configuration value.
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Static configuration for one engine instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Opaque seed string; the same seed replays the same animation.
    pub seed: String,
    pub movement: MovementMode,
    pub marks: MarksMode,
    pub text_source: TextSource,
    pub theme: Theme,
    /// Palette slug pinned at start-up. `None` (or an unknown slug) draws from the bag.
    pub palette: Option<String>,
    /// Mark stamping attempts per tick.
    pub stamps_per_tick: u32,
    /// Buffer cells targeted along the shorter viewport side.
    pub target_cells: u32,
    /// Lower bound on both buffer dimensions.
    pub min_buffer: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: "holoweave".to_owned(),
            movement: MovementMode::default(),
            marks: MarksMode::default(),
            text_source: TextSource::default(),
            theme: Theme::default(),
            palette: None,
            stamps_per_tick: 2,
            target_cells: 260,
            min_buffer: 64,
        }
    }
}

impl EngineConfig {
    /// Config with the given seed and default selectors.
    #[must_use]
    pub fn seeded(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_cells == 0 {
            return Err(ConfigError::Invalid("target_cells must be non-zero"));
        }
        if self.min_buffer < 64 {
            return Err(ConfigError::Invalid("min_buffer must be at least 64"));
        }
        if self.stamps_per_tick > 64 {
            return Err(ConfigError::Invalid("stamps_per_tick must be at most 64"));
        }
        Ok(())
    }

    /// Catalog index of the pinned palette, if the slug resolves.
    #[must_use]
    pub fn palette_index(&self) -> Option<usize> {
        self.palette.as_deref().and_then(palette::find_by_slug)
    }
}
