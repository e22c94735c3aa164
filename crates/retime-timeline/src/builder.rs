//! Timeline assembly strategies.
//!
//! Both strategies lay two full copies of the source back to back and
//! compress the result by the configured speed ratio. They differ only in
//! *when* the compression happens:
//!
//! - [`BuildStrategy::TotalSpeed`] inserts both copies, then scales the whole
//!   timeline once.
//! - [`BuildStrategy::SequentialSpeed`] scales each copy right after it is
//!   inserted, working in the already-rescaled coordinate space.
//!
//! With a source whose tick count does not halve evenly the two orders round
//! differently, and the resulting durations can differ by one tick.
//! [`TimelineBuilder::compare`] measures that.

use retime_core::{Error, MediaTime, Result, TimeRange};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::cancel::BuildCancel;
use crate::config::BuildConfig;
use crate::source::SourceClip;
use crate::timeline::Timeline;

/// Where the speed change is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildStrategy {
    /// Scale the whole assembled timeline once.
    TotalSpeed,
    /// Scale each inserted copy immediately.
    SequentialSpeed,
}

impl BuildStrategy {
    pub const ALL: [Self; 2] = [Self::TotalSpeed, Self::SequentialSpeed];

    /// Label shown to users.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::TotalSpeed => "To whole composition",
            Self::SequentialSpeed => "Segment by segment",
        }
    }
}

impl fmt::Display for BuildStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::TotalSpeed => "total",
            Self::SequentialSpeed => "sequential",
        })
    }
}

impl FromStr for BuildStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "total" | "total_speed" | "whole" => Ok(Self::TotalSpeed),
            "sequential" | "sequential_speed" | "segment" => Ok(Self::SequentialSpeed),
            other => Err(Error::InvalidParameter(format!(
                "unknown strategy '{other}' (expected 'total' or 'sequential')"
            ))),
        }
    }
}

/// Builds a fresh [`Timeline`] from a [`SourceClip`] on every call.
#[derive(Debug, Clone, Default)]
pub struct TimelineBuilder {
    config: BuildConfig,
}

impl TimelineBuilder {
    /// Create a builder, validating the config.
    pub fn new(config: BuildConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Run the given strategy.
    pub fn build(
        &self,
        strategy: BuildStrategy,
        source: &SourceClip,
        cancel: &BuildCancel,
    ) -> Result<Timeline> {
        match strategy {
            BuildStrategy::TotalSpeed => self.build_with_total_speed(source, cancel),
            BuildStrategy::SequentialSpeed => self.build_with_sequential_speed(source, cancel),
        }
    }

    /// Append the source track twice, then compress the whole timeline.
    ///
    /// Returns an empty timeline when the source has no audio track.
    pub fn build_with_total_speed(&self, source: &SourceClip, cancel: &BuildCancel) -> Result<Timeline> {
        let started = Instant::now();
        info!(source = %source.name, strategy = %BuildStrategy::TotalSpeed, "Start");

        let Some(track_range) = source.audio_track else {
            warn!(source = %source.name, "No audio track, nothing to build");
            return Ok(Timeline::new());
        };
        ensure_non_negative(track_range.duration)?;
        debug!(track = %track_range.debug_string(), "Source track range");

        let rounding = self.config.rounding;
        let mut timeline = Timeline::new();

        cancel.check()?;
        timeline.insert_time_range_with(track_range, MediaTime::ZERO, rounding)?;
        cancel.check()?;
        timeline.insert_time_range_with(track_range, timeline.duration(), rounding)?;
        log_step("inserted both copies", &timeline);

        cancel.check()?;
        let whole = timeline.time_range();
        let target = whole.duration.multiply_by_ratio_with(
            self.config.speed.multiplier,
            self.config.speed.divisor,
            rounding,
        )?;
        timeline.scale_time_range_with(whole, target, rounding)?;
        log_step("scaled whole timeline", &timeline);

        info!(
            elapsed = ?started.elapsed(),
            duration = %timeline.duration().debug_string(),
            "Complete"
        );
        Ok(timeline)
    }

    /// Insert and compress the first copy, then insert and compress the
    /// second copy behind it.
    ///
    /// Returns an empty timeline when the source has no audio track.
    pub fn build_with_sequential_speed(
        &self,
        source: &SourceClip,
        cancel: &BuildCancel,
    ) -> Result<Timeline> {
        let started = Instant::now();
        info!(source = %source.name, strategy = %BuildStrategy::SequentialSpeed, "Start");

        if !source.has_audio() {
            warn!(source = %source.name, "No audio track, nothing to build");
            return Ok(Timeline::new());
        }
        let source_duration = source.duration;
        ensure_non_negative(source_duration)?;

        let rounding = self.config.rounding;
        let scaled_duration = source_duration.multiply_by_ratio_with(
            self.config.speed.multiplier,
            self.config.speed.divisor,
            rounding,
        )?;
        let full = source.full_range();
        debug!(
            source = %source_duration.debug_string(),
            scaled = %scaled_duration.debug_string(),
            "Source duration"
        );

        let mut timeline = Timeline::new();

        cancel.check()?;
        timeline.insert_time_range_with(full, MediaTime::ZERO, rounding)?;
        timeline.scale_time_range_with(full, scaled_duration, rounding)?;
        log_step("inserted and scaled first copy", &timeline);

        cancel.check()?;
        timeline.insert_time_range_with(full, scaled_duration, rounding)?;
        log_step("inserted second copy", &timeline);

        cancel.check()?;
        let second = TimeRange::new(scaled_duration, source_duration);
        timeline.scale_time_range_with(second, scaled_duration, rounding)?;
        log_step("scaled second copy", &timeline);

        info!(
            elapsed = ?started.elapsed(),
            duration = %timeline.duration().debug_string(),
            "Complete"
        );
        Ok(timeline)
    }

    /// Run both strategies on the same source and measure how far apart
    /// their durations land.
    pub fn compare(&self, source: &SourceClip) -> Result<StrategyComparison> {
        let cancel = BuildCancel::new();
        let total = self.build_with_total_speed(source, &cancel)?;
        let sequential = self.build_with_sequential_speed(source, &cancel)?;

        let divergence = total.duration().checked_sub(sequential.duration())?.abs();
        let tolerance = MediaTime::try_new(self.config.tolerance_units, source.duration.timescale())?;
        let comparison = StrategyComparison {
            source_duration: source.duration,
            total,
            sequential,
            divergence,
            tolerance,
        };

        if comparison.within_tolerance() {
            debug!(divergence = %divergence.debug_string(), "Strategies agree within tolerance");
        } else {
            warn!(
                divergence = %divergence.debug_string(),
                tolerance = %tolerance.debug_string(),
                "Strategies diverge beyond tolerance"
            );
        }
        Ok(comparison)
    }
}

/// Outcome of running both strategies on one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyComparison {
    pub source_duration: MediaTime,
    pub total: Timeline,
    pub sequential: Timeline,
    /// `|total - sequential|`
    pub divergence: MediaTime,
    pub tolerance: MediaTime,
}

impl StrategyComparison {
    pub fn within_tolerance(&self) -> bool {
        self.divergence <= self.tolerance
    }

    /// Divergence counted in source timescale ticks, if it is a whole number
    /// of them.
    pub fn divergence_units(&self) -> Option<i64> {
        let timescale = self.source_duration.timescale();
        let ticks = self
            .divergence
            .convert_scale(timescale, retime_core::RoundingMethod::TowardZero)
            .ok()?;
        (ticks == self.divergence).then_some(ticks.value())
    }
}

fn ensure_non_negative(duration: MediaTime) -> Result<()> {
    if duration.is_negative() {
        return Err(Error::InvalidParameter(format!(
            "source duration {} is negative",
            duration.debug_string()
        )));
    }
    Ok(())
}

fn log_step(step: &str, timeline: &Timeline) {
    debug!(
        step,
        composition = %timeline.duration().debug_string(),
        track = %timeline.time_range().debug_string(),
        segments = timeline.len(),
        "Build step"
    );
}
