//! Tunables of a simulation run, loadable from TOML.

use lantern_system_stealth::{MovementPace, DEFAULT_ACTIVATION_RADIUS};
use lantern_system_visibility::DEFAULT_BEAM_LENGTH;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Settings shared by every level a session plays.
///
/// Missing keys fall back to their defaults, unknown keys are rejected.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Number of cells the player's beam reaches.
    pub beam_length: u32,
    /// Player distance, in cells, below which agents start hunting.
    pub activation_radius: f32,
    /// Ticks on which agents act.
    pub pace: MovementPace,
}

impl SimulationConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every value is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.beam_length == 0 {
            return Err(ConfigError::InvalidBeamLength);
        }
        if !self.activation_radius.is_finite() || self.activation_radius <= 0.0 {
            return Err(ConfigError::InvalidActivationRadius(
                self.activation_radius,
            ));
        }
        Ok(())
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            beam_length: DEFAULT_BEAM_LENGTH,
            activation_radius: DEFAULT_ACTIVATION_RADIUS,
            pace: MovementPace::default(),
        }
    }
}

/// Errors raised while loading a [`SimulationConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid TOML or does not match the schema.
    #[error("failed to parse simulation config")]
    Parse(#[from] toml::de::Error),
    /// The beam would not reach a single cell.
    #[error("beam length must be at least one cell")]
    InvalidBeamLength,
    /// The activation radius is not a positive finite number.
    #[error("activation radius must be positive and finite, got {0}")]
    InvalidActivationRadius(f32),
}
