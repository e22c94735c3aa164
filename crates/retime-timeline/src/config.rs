//! Build configuration.
//!
//! Every field has a default, so a config file only needs to name what it
//! overrides.

use retime_core::{Error, Result, RoundingMethod};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Time-compression ratio applied by the builder: target length is
/// `multiplier / divisor` of the uncompressed length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeedRatio {
    pub multiplier: i64,
    pub divisor: i64,
}

impl SpeedRatio {
    /// Double speed.
    pub const HALF: Self = Self::new(1, 2);

    /// Unchanged speed.
    pub const UNIT: Self = Self::new(1, 1);

    pub const fn new(multiplier: i64, divisor: i64) -> Self {
        Self {
            multiplier,
            divisor,
        }
    }

    /// Reject ratios that would produce negative or undefined durations.
    pub fn validate(self) -> Result<()> {
        if self.divisor <= 0 || self.multiplier < 0 {
            return Err(Error::InvalidParameter(format!(
                "speed ratio {}:{} must have a positive divisor and non-negative multiplier",
                self.multiplier, self.divisor
            )));
        }
        Ok(())
    }
}

impl Default for SpeedRatio {
    fn default() -> Self {
        Self::HALF
    }
}

/// Settings shared by both build strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Compression applied to the assembled copies
    pub speed: SpeedRatio,
    /// Rounding used whenever a time is rescaled
    pub rounding: RoundingMethod,
    /// Allowed disagreement between strategies, in source timescale units
    pub tolerance_units: i64,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            speed: SpeedRatio::HALF,
            rounding: RoundingMethod::HalfAwayFromZero,
            tolerance_units: 1,
        }
    }
}

impl BuildConfig {
    /// Check field ranges.
    pub fn validate(&self) -> Result<()> {
        self.speed.validate()?;
        if self.tolerance_units < 0 {
            return Err(Error::InvalidParameter(format!(
                "tolerance_units must be non-negative, got {}",
                self.tolerance_units
            )));
        }
        Ok(())
    }

    /// Parse from JSON bytes and validate.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let config: Self = serde_json::from_slice(data)
            .map_err(|e| Error::Serialization(format!("Invalid build config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_json(&data)
    }
}
