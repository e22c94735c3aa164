//! Retime Media - source clip timing via FFmpeg
//!
//! This crate handles:
//! - Locating ffprobe through ffmpeg-sidecar
//! - Reading audio track ranges and container duration

pub mod probe;

pub use probe::{AudioStreamInfo, MediaProbe};
