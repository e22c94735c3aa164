//! Build reports with versioning.
//!
//! Uses JSON with a schema version field so older readers can refuse files
//! they do not understand.

use retime_core::{Error, MediaTime, Result};
use serde::{Deserialize, Serialize};

use crate::builder::BuildStrategy;
use crate::source::SourceClip;
use crate::timeline::Timeline;

/// Current schema version.
pub const REPORT_VERSION: u32 = 1;

/// A duration the way a player overlay shows it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DurationDisplay {
    pub value: i64,
    pub timescale: i32,
    pub seconds: f64,
}

impl From<MediaTime> for DurationDisplay {
    fn from(time: MediaTime) -> Self {
        Self {
            value: time.value(),
            timescale: time.timescale(),
            seconds: time.seconds(),
        }
    }
}

/// Versioned record of one build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildReport {
    /// Schema version for compatibility checks.
    pub version: u32,
    /// Application version that wrote this report.
    pub app_version: String,
    pub strategy: BuildStrategy,
    pub source: SourceClip,
    /// Final timeline duration.
    pub duration: DurationDisplay,
    pub timeline: Timeline,
}

impl BuildReport {
    /// Create a report for a finished build.
    pub fn new(strategy: BuildStrategy, source: SourceClip, timeline: Timeline) -> Self {
        Self {
            version: REPORT_VERSION,
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            strategy,
            source,
            duration: timeline.duration().into(),
            timeline,
        }
    }

    /// Serialize to JSON bytes.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
            .map_err(|e| Error::Serialization(format!("Failed to serialize report: {}", e)))
    }

    /// Deserialize from JSON bytes.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        // Check the version before committing to the full schema
        let raw: serde_json::Value = serde_json::from_slice(data)
            .map_err(|e| Error::Serialization(format!("Invalid JSON: {}", e)))?;

        let version = raw.get("version").and_then(|v| v.as_u64()).unwrap_or(0) as u32;
        if version == 0 || version > REPORT_VERSION {
            return Err(Error::Serialization(format!(
                "Report version {} is not supported (expected 1..={})",
                version, REPORT_VERSION
            )));
        }

        let report: Self = serde_json::from_value(raw)
            .map_err(|e| Error::Serialization(format!("Failed to parse report: {}", e)))?;
        report.timeline.validate()?;

        let recorded = MediaTime::try_new(report.duration.value, report.duration.timescale)?;
        if recorded != report.timeline.duration() {
            return Err(Error::Serialization(format!(
                "Report duration {} does not match its timeline ({})",
                recorded.debug_string(),
                report.timeline.duration().debug_string()
            )));
        }
        Ok(report)
    }
}
