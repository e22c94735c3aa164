//! Media file probing to get track timing without decoding.
//!
//! Timing is taken from ffprobe's integer fields (`time_base`, `start_pts`,
//! `duration_ts`) so that the track range is exact in the stream's own
//! timescale.

use num_rational::Rational64;
use retime_core::{timescale, Error, MediaTime, Result, RoundingMethod, TimeRange};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Command;
use tracing::{debug, info};

/// Information about a media file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaProbe {
    /// File path
    pub path: String,
    /// Container duration, at the primary audio stream's timescale
    pub duration: MediaTime,
    /// Audio streams
    pub audio_streams: Vec<AudioStreamInfo>,
    /// Number of non-audio streams
    pub other_streams: usize,
    /// Container format
    pub format: String,
}

/// Information about an audio stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioStreamInfo {
    pub index: usize,
    pub codec: String,
    pub sample_rate: u32,
    pub channels: u16,
    pub bit_rate: Option<u64>,
    /// Presentation range in the stream's time base, when ffprobe knows it
    pub time_range: Option<TimeRange>,
}

#[derive(Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
    format: Option<FfprobeFormat>,
}

#[derive(Deserialize)]
struct FfprobeStream {
    index: usize,
    codec_type: Option<String>,
    codec_name: Option<String>,
    sample_rate: Option<String>,
    channels: Option<u16>,
    bit_rate: Option<String>,
    time_base: Option<String>,
    start_pts: Option<i64>,
    duration_ts: Option<i64>,
    duration: Option<String>,
}

#[derive(Deserialize)]
struct FfprobeFormat {
    format_name: Option<String>,
    duration: Option<String>,
}

impl MediaProbe {
    /// Probe a media file with ffprobe.
    pub fn probe<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let path_str = path.to_string_lossy().to_string();

        if !path.exists() {
            return Err(Error::NotFound(format!("File not found: {}", path_str)));
        }

        let ffprobe = ffmpeg_sidecar::ffprobe::ffprobe_path();
        info!("Probing {} with {}", path_str, ffprobe.display());

        let output = Command::new(&ffprobe)
            .args(["-v", "error", "-print_format", "json", "-show_format", "-show_streams"])
            .arg(path)
            .output()
            .map_err(|e| Error::Media(format!("Failed to run {}: {e}", ffprobe.display())))?;

        if !output.status.success() {
            return Err(Error::Media(format!(
                "ffprobe failed on {}: {}",
                path_str,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Self::from_ffprobe_json(path_str, &output.stdout)
    }

    /// Build a probe result from ffprobe's `-print_format json` output.
    pub fn from_ffprobe_json(path: impl Into<String>, data: &[u8]) -> Result<Self> {
        let output: FfprobeOutput = serde_json::from_slice(data)
            .map_err(|e| Error::Serialization(format!("Invalid ffprobe output: {}", e)))?;

        let mut audio_streams = Vec::new();
        let mut other_streams = 0;
        for stream in output.streams {
            if stream.codec_type.as_deref() == Some("audio") {
                audio_streams.push(audio_stream(stream)?);
            } else {
                other_streams += 1;
            }
        }

        let track_timescale = audio_streams
            .first()
            .and_then(|s| s.time_range)
            .map(|range| range.duration.timescale())
            .unwrap_or(timescale::MICROS);

        let format = output.format;
        let duration = match format.as_ref().and_then(|f| f.duration.as_deref()) {
            Some(seconds) => MediaTime::from_rational(
                parse_decimal_seconds(seconds)?,
                track_timescale,
                RoundingMethod::default(),
            )?,
            None => audio_streams
                .first()
                .and_then(|s| s.time_range)
                .map(|range| range.end())
                .unwrap_or(MediaTime::ZERO),
        };

        let probe = Self {
            path: path.into(),
            duration,
            audio_streams,
            other_streams,
            format: format
                .and_then(|f| f.format_name)
                .unwrap_or_else(|| "unknown".to_string()),
        };
        debug!(
            path = %probe.path,
            duration = %probe.duration.debug_string(),
            audio_streams = probe.audio_streams.len(),
            "Probed"
        );
        Ok(probe)
    }

    /// Check if the file has audio.
    pub fn has_audio(&self) -> bool {
        !self.audio_streams.is_empty()
    }

    /// Get the primary audio stream info.
    pub fn primary_audio(&self) -> Option<&AudioStreamInfo> {
        self.audio_streams.first()
    }

    /// Time range of the primary audio track.
    ///
    /// Falls back to `[0, duration)` when the stream carries no timing of
    /// its own.
    pub fn audio_track_range(&self) -> Option<TimeRange> {
        self.primary_audio().map(|stream| {
            stream
                .time_range
                .unwrap_or_else(|| TimeRange::new(MediaTime::ZERO, self.duration))
        })
    }

    /// File name component of the path.
    pub fn file_name(&self) -> String {
        Path::new(&self.path)
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.clone())
    }
}

fn audio_stream(stream: FfprobeStream) -> Result<AudioStreamInfo> {
    let time_range = match stream.time_base.as_deref() {
        Some(time_base) => stream_range(&stream, time_base)?,
        None => None,
    };
    Ok(AudioStreamInfo {
        index: stream.index,
        codec: stream.codec_name.unwrap_or_else(|| "unknown".to_string()),
        sample_rate: stream
            .sample_rate
            .and_then(|rate| rate.parse().ok())
            .unwrap_or(0),
        channels: stream.channels.unwrap_or(0),
        bit_rate: stream.bit_rate.and_then(|rate| rate.parse().ok()),
        time_range,
    })
}

/// Track range in the stream's time base. A time base of `num/den` becomes
/// timescale `den` with every tick count multiplied by `num`.
fn stream_range(stream: &FfprobeStream, time_base: &str) -> Result<Option<TimeRange>> {
    let (num, den) = parse_time_base(time_base)?;
    let ticks = |pts: i64| -> Result<MediaTime> {
        let value = pts
            .checked_mul(num)
            .ok_or_else(|| Error::Overflow(format!("{pts} * {num}")))?;
        MediaTime::try_new(value, den)
    };

    let start = ticks(stream.start_pts.unwrap_or(0))?;
    let duration = match (stream.duration_ts, stream.duration.as_deref()) {
        (Some(duration_ts), _) => ticks(duration_ts)?,
        (None, Some(seconds)) => {
            MediaTime::from_rational(parse_decimal_seconds(seconds)?, den, RoundingMethod::default())?
        }
        (None, None) => return Ok(None),
    };
    Ok(Some(TimeRange::new(start, duration)))
}

fn parse_time_base(time_base: &str) -> Result<(i64, i32)> {
    let invalid = || Error::Media(format!("Invalid time base '{time_base}'"));
    let (num, den) = time_base.split_once('/').ok_or_else(invalid)?;
    let num: i64 = num.trim().parse().map_err(|_| invalid())?;
    let den: i32 = den.trim().parse().map_err(|_| invalid())?;
    if num <= 0 || den <= 0 || den > MediaTime::MAX_TIMESCALE {
        return Err(invalid());
    }
    Ok((num, den))
}

/// Parse a plain decimal like `"10.000023"` exactly.
fn parse_decimal_seconds(text: &str) -> Result<Rational64> {
    let invalid = || Error::Media(format!("Invalid duration '{text}'"));
    let text = text.trim();
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));
    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }
    if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    // nanosecond precision is plenty for container durations
    let fraction = &fraction[..fraction.len().min(9)];

    let whole: i64 = if whole.is_empty() { 0 } else { whole.parse().map_err(|_| invalid())? };
    let denom = 10i64.pow(fraction.len() as u32);
    let frac: i64 = if fraction.is_empty() { 0 } else { fraction.parse().map_err(|_| invalid())? };
    let numer = whole
        .checked_mul(denom)
        .and_then(|v| v.checked_add(frac))
        .ok_or_else(invalid)?;
    Ok(Rational64::new(if negative { -numer } else { numer }, denom))
}
