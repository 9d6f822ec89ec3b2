//! Tunable grab controller settings.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fingertip separation (metres) above which a non-grab gesture releases.
pub const DEFAULT_RELEASE_TIP_DISTANCE: f32 = 0.04;
/// Seconds the regrab cooldown is armed for after a release.
pub const DEFAULT_REGRAB_COOLDOWN_SECS: f32 = 0.3;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: f32 },
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Grab controller settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrabConfig {
    /// Fingertip separation that counts as an opened hand.
    pub release_tip_distance: f32,
    /// Cooldown armed on release.
    pub regrab_cooldown_secs: f32,
    /// Refuse to start a grab while the cooldown is running.
    ///
    /// Off by default: the cooldown is tracked but advisory.
    pub enforce_regrab_cooldown: bool,
}

impl Default for GrabConfig {
    fn default() -> Self {
        Self {
            release_tip_distance: DEFAULT_RELEASE_TIP_DISTANCE,
            regrab_cooldown_secs: DEFAULT_REGRAB_COOLDOWN_SECS,
            enforce_regrab_cooldown: false,
        }
    }
}

impl GrabConfig {
    /// Parse and validate a JSON config. Missing fields take defaults.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check that every distance and duration is finite and non-negative.
    pub fn validate(&self) -> ConfigResult<()> {
        check("release_tip_distance", self.release_tip_distance)?;
        check("regrab_cooldown_secs", self.regrab_cooldown_secs)?;
        Ok(())
    }
}

fn check(field: &'static str, value: f32) -> ConfigResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        log::warn!("Rejecting grab config: {} = {}", field, value);
        Err(ConfigError::InvalidValue { field, value })
    }
}
