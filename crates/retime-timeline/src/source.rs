//! Source clip description handed to the builder.

use retime_core::{MediaTime, TimeRange};
use serde::{Deserialize, Serialize};

/// The one clip a timeline is assembled from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceClip {
    /// Display name (usually the file name)
    pub name: String,
    /// Time range of the first audio track, if the clip has one
    pub audio_track: Option<TimeRange>,
    /// Overall asset duration
    pub duration: MediaTime,
}

impl SourceClip {
    /// A clip whose audio track spans exactly `[0, duration)`.
    pub fn audio(name: impl Into<String>, duration: MediaTime) -> Self {
        Self {
            name: name.into(),
            audio_track: Some(TimeRange::new(MediaTime::ZERO, duration)),
            duration,
        }
    }

    /// A clip with no audio track.
    pub fn without_audio(name: impl Into<String>, duration: MediaTime) -> Self {
        Self {
            name: name.into(),
            audio_track: None,
            duration,
        }
    }

    /// Override the audio track range, e.g. when the track starts after
    /// encoder priming.
    pub fn with_audio_track(mut self, range: TimeRange) -> Self {
        self.audio_track = Some(range);
        self
    }

    pub fn has_audio(&self) -> bool {
        self.audio_track.is_some()
    }

    /// `[0, duration)` of the asset.
    pub fn full_range(&self) -> TimeRange {
        TimeRange::new(MediaTime::ZERO, self.duration)
    }
}
