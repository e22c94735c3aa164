//! The assembled target timeline and its editing primitives.

use retime_core::{Error, MediaTime, Result, RoundingMethod, TimeRange};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::segment::Segment;

/// An ordered run of segments starting at zero.
///
/// Segments are contiguous and non-overlapping in target time, so the
/// timeline's duration is both the end of its last segment and the sum of
/// all segment durations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    segments: SmallVec<[Segment; 4]>,
}

impl Timeline {
    /// Create an empty timeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Segments in target-time order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Get the total duration of this timeline.
    pub fn duration(&self) -> MediaTime {
        self.segments
            .last()
            .map(|segment| segment.target.end())
            .unwrap_or(MediaTime::ZERO)
    }

    /// Sum of segment durations. Equal to [`Timeline::duration`] whenever
    /// the timeline is valid.
    pub fn summed_duration(&self) -> MediaTime {
        self.segments
            .iter()
            .fold(MediaTime::ZERO, |acc, segment| acc + segment.target.duration)
    }

    /// `[0, duration)`.
    pub fn time_range(&self) -> TimeRange {
        TimeRange::new(MediaTime::ZERO, self.duration())
    }

    /// Find which segment contains the given time. Returns (index, segment).
    pub fn segment_at(&self, time: MediaTime) -> Option<(usize, &Segment)> {
        self.segments
            .iter()
            .enumerate()
            .find(|(_, segment)| segment.target.contains(time))
    }

    /// Check the ordering invariants.
    pub fn validate(&self) -> Result<()> {
        let mut cursor = MediaTime::ZERO;
        for (i, segment) in self.segments.iter().enumerate() {
            if segment.target.start != cursor {
                return Err(Error::Timeline(format!(
                    "segment {i} starts at {} but the previous one ends at {}",
                    segment.target.start.debug_string(),
                    cursor.debug_string()
                )));
            }
            if segment.target.duration.is_negative() || segment.source.duration.is_negative() {
                return Err(Error::Timeline(format!(
                    "segment {i} has a negative duration ({} <- {})",
                    segment.target.debug_string(),
                    segment.source.debug_string()
                )));
            }
            cursor = segment.target.checked_end()?;
        }
        Ok(())
    }

    /// Insert a copy of `source` at `at`, pushing later content back.
    ///
    /// `at` must lie within `[0, duration]`. A segment spanning `at` is
    /// split in two. Inserting an empty range does nothing.
    pub fn insert_time_range(&mut self, source: TimeRange, at: MediaTime) -> Result<()> {
        self.insert_time_range_with(source, at, RoundingMethod::default())
    }

    /// [`Timeline::insert_time_range`] with an explicit rounding method for
    /// segment splits.
    pub fn insert_time_range_with(
        &mut self,
        source: TimeRange,
        at: MediaTime,
        rounding: RoundingMethod,
    ) -> Result<()> {
        if source.duration.is_negative() {
            return Err(Error::InvalidParameter(format!(
                "cannot insert negative range {}",
                source.debug_string()
            )));
        }
        if source.is_empty() {
            return Ok(());
        }
        if at.is_negative() || at > self.duration() {
            return Err(Error::InvalidParameter(format!(
                "insertion point {} is outside {}",
                at.debug_string(),
                self.time_range().debug_string()
            )));
        }

        let index = self.split_at(at, rounding)?;
        for segment in &mut self.segments[index..] {
            segment.target = segment.target.shifted(source.duration)?;
        }
        self.segments.insert(index, Segment::copy_of(source, at));
        Ok(())
    }

    /// Stretch or compress the content of `range` to `to_duration`.
    ///
    /// Content after the range moves by the change in length. An empty range
    /// does nothing; a range reaching past the end of the timeline is
    /// rejected.
    pub fn scale_time_range(&mut self, range: TimeRange, to_duration: MediaTime) -> Result<()> {
        self.scale_time_range_with(range, to_duration, RoundingMethod::default())
    }

    /// [`Timeline::scale_time_range`] with an explicit rounding method.
    ///
    /// Every segment boundary inside the range is mapped independently as
    /// `start + (b - start) * to_duration / range.duration`, so rounding
    /// happens at most once per boundary per call.
    pub fn scale_time_range_with(
        &mut self,
        range: TimeRange,
        to_duration: MediaTime,
        rounding: RoundingMethod,
    ) -> Result<()> {
        if to_duration.is_negative() || range.duration.is_negative() {
            return Err(Error::InvalidParameter(format!(
                "cannot scale {} to {}",
                range.debug_string(),
                to_duration.debug_string()
            )));
        }
        if range.is_empty() {
            return Ok(());
        }
        let range_end = range.checked_end()?;
        if range.start.is_negative() || range_end > self.duration() {
            return Err(Error::InvalidParameter(format!(
                "scale range {} is outside {}",
                range.debug_string(),
                self.time_range().debug_string()
            )));
        }

        let first = self.split_at(range.start, rounding)?;
        let last = self.split_at(range_end, rounding)?;

        let map = |boundary: MediaTime| -> Result<MediaTime> {
            let offset = boundary.checked_sub(range.start)?;
            let scaled = offset.scale_by(to_duration, range.duration, rounding)?;
            range.start.checked_add(scaled)
        };

        let mut cursor = range.start;
        for segment in &mut self.segments[first..last] {
            let end = map(segment.target.end())?;
            segment.target = TimeRange::from_start_end(cursor, end);
            cursor = end;
        }

        let delta = cursor.checked_sub(range_end)?;
        if !delta.is_zero() {
            for segment in &mut self.segments[last..] {
                segment.target = segment.target.shifted(delta)?;
            }
        }

        self.segments.retain(|segment| !segment.target.duration.is_zero());
        Ok(())
    }

    /// Make `time` a segment boundary. Returns the index of the first
    /// segment starting at or after `time`.
    fn split_at(&mut self, time: MediaTime, rounding: RoundingMethod) -> Result<usize> {
        for i in 0..self.segments.len() {
            let segment = self.segments[i];
            if segment.target.start >= time {
                return Ok(i);
            }
            if segment.target.contains(time) {
                let offset = time.checked_sub(segment.target.start)?;
                let (left, right) = segment.split(offset, rounding)?;
                self.segments[i] = left;
                self.segments.insert(i + 1, right);
                return Ok(i + 1);
            }
        }
        Ok(self.segments.len())
    }
}
