//! Timeline segments.

use num_rational::Rational64;
use retime_core::{MediaTime, Result, RoundingMethod, TimeRange};
use serde::{Deserialize, Serialize};

/// A span of the target timeline and the source range it plays.
///
/// The segment plays `source` stretched or compressed to fit `target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Position on the assembled timeline
    pub target: TimeRange,
    /// Range of the source clip this segment was copied from
    pub source: TimeRange,
}

impl Segment {
    /// Create a segment from explicit target and source ranges.
    pub fn new(target: TimeRange, source: TimeRange) -> Self {
        Self { target, source }
    }

    /// An unscaled copy of `source` placed at `at`.
    pub fn copy_of(source: TimeRange, at: MediaTime) -> Self {
        Self {
            target: TimeRange::new(at, source.duration),
            source,
        }
    }

    /// Exact scale factor `target.duration / source.duration`.
    ///
    /// `None` when the source is empty or the reduced ratio does not fit
    /// in 64 bits.
    pub fn scale(&self) -> Option<Rational64> {
        let target = self.target.duration;
        let source = self.source.duration;
        if source.is_zero() {
            return None;
        }
        let numer = (target.value() as i128) * (source.timescale() as i128);
        let denom = (source.value() as i128) * (target.timescale() as i128);
        let g = gcd(numer, denom);
        let (numer, denom) = (numer / g, denom / g);
        Some(Rational64::new(
            i64::try_from(numer).ok()?,
            i64::try_from(denom).ok()?,
        ))
    }

    /// Playback rate, the inverse of [`Segment::scale`]. 2.0 plays twice as fast.
    pub fn rate(&self) -> Option<f64> {
        let source = self.source.duration.seconds();
        let target = self.target.duration.seconds();
        (target != 0.0).then(|| source / target)
    }

    /// Split at `offset` from the start of the target range.
    ///
    /// The source range splits proportionally, rounded in the source's
    /// timescale.
    pub(crate) fn split(&self, offset: MediaTime, rounding: RoundingMethod) -> Result<(Self, Self)> {
        let source_offset = self
            .source
            .duration
            .scale_by(offset, self.target.duration, rounding)?;

        let left = Self {
            target: TimeRange::new(self.target.start, offset),
            source: TimeRange::new(self.source.start, source_offset),
        };
        let right = Self {
            target: TimeRange::new(
                self.target.start.checked_add(offset)?,
                self.target.duration.checked_sub(offset)?,
            ),
            source: TimeRange::new(
                self.source.start.checked_add(source_offset)?,
                self.source.duration.checked_sub(source_offset)?,
            ),
        };
        Ok((left, right))
    }
}

fn gcd(mut a: i128, mut b: i128) -> i128 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a.abs().max(1)
}
