//! Blur configuration
//!
//! Values come from code, JSON or the environment:
//!
//! - `QBLUR_ROTATION` - single-shot rotation angle (radians)
//! - `QBLUR_START_ROTATION` / `QBLUR_END_ROTATION` - animation sweep
//! - `QBLUR_DURATION_SECS` - animation length
//! - `QBLUR_REVERSE` - play the animation back after reaching the end
//! - `QBLUR_MAX_QUBITS` - largest register that may be allocated

use std::env;

use serde::{Deserialize, Serialize};

use crate::animation::AnimationSettings;
use crate::error::{Error, Result};
use crate::locality::MAX_TABLE_QUBITS;

/// Settings shared by the single-shot and animated blur.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlurConfig {
    /// Angle used by a single-shot transform
    pub rotation: f64,
    /// Animation angle at the first frame
    pub start_rotation: f64,
    /// Animation angle at the last frame
    pub end_rotation: f64,
    /// Animation length in seconds
    pub duration_secs: f64,
    /// Play back to `start_rotation` after reaching `end_rotation`
    pub reverse: bool,
    /// Qubit budget for one register
    pub max_qubits: u32,
}

impl Default for BlurConfig {
    fn default() -> Self {
        Self {
            rotation: 0.25,
            start_rotation: 0.0,
            end_rotation: 0.2,
            duration_secs: 3.0,
            reverse: false,
            max_qubits: 24,
        }
    }
}

impl BlurConfig {
    /// Parse and validate a JSON document. Missing fields take their default.
    ///
    /// ```
    /// use qblur_core::config::BlurConfig;
    ///
    /// let config = BlurConfig::from_json_str(r#"{ "rotation": 0.5, "reverse": true }"#).unwrap();
    /// assert_eq!(config.rotation, 0.5);
    /// assert!(config.reverse);
    /// assert_eq!(config.max_qubits, 24);
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by any `QBLUR_*` variables that are set.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(value) = env_f64("QBLUR_ROTATION")? {
            config.rotation = value;
        }
        if let Some(value) = env_f64("QBLUR_START_ROTATION")? {
            config.start_rotation = value;
        }
        if let Some(value) = env_f64("QBLUR_END_ROTATION")? {
            config.end_rotation = value;
        }
        if let Some(value) = env_f64("QBLUR_DURATION_SECS")? {
            config.duration_secs = value;
        }
        if let Ok(reverse) = env::var("QBLUR_REVERSE") {
            config.reverse = reverse.eq_ignore_ascii_case("true") || reverse == "1" || reverse.eq_ignore_ascii_case("yes");
        }
        if let Ok(raw) = env::var("QBLUR_MAX_QUBITS") {
            config.max_qubits = raw
                .trim()
                .parse()
                .map_err(|_| Error::InvalidConfig(format!("QBLUR_MAX_QUBITS is not an integer: {:?}", raw)))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject settings no transform can run with.
    ///
    /// A non-positive duration is not rejected; the animation driver replaces
    /// it with one second.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("rotation", self.rotation),
            ("start_rotation", self.start_rotation),
            ("end_rotation", self.end_rotation),
        ] {
            if !value.is_finite() {
                return Err(Error::InvalidConfig(format!("{} must be finite, got {}", name, value)));
            }
        }
        if self.duration_secs.is_nan() {
            return Err(Error::InvalidConfig("duration_secs must be a number".to_string()));
        }
        if self.max_qubits == 0 || self.max_qubits > MAX_TABLE_QUBITS {
            return Err(Error::InvalidConfig(format!(
                "max_qubits must be in 1..={}, got {}",
                MAX_TABLE_QUBITS, self.max_qubits
            )));
        }
        Ok(())
    }

    /// Animation parameters derived from this config
    pub fn animation_settings(&self) -> AnimationSettings {
        AnimationSettings {
            start_angle: self.start_rotation,
            end_angle: self.end_rotation,
            duration_secs: self.duration_secs,
            reverse: self.reverse,
            max_qubits: self.max_qubits,
        }
    }
}

fn env_f64(name: &str) -> Result<Option<f64>> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::InvalidConfig(format!("{} is not a number: {:?}", name, raw))),
        Err(_) => Ok(None),
    }
}
