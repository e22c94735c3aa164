//! Retime Timeline - Timeline assembly from a single source clip
//!
//! Implements the composition model:
//! - Segments mapping target time onto source time
//! - A timeline with insert and scale primitives
//! - Two build strategies that differ in when speed is applied
//! - Cancellation, configuration and JSON reports

pub mod builder;
pub mod cancel;
pub mod config;
pub mod report;
pub mod segment;
pub mod source;
pub mod timeline;

pub use builder::{BuildStrategy, StrategyComparison, TimelineBuilder};
pub use cancel::BuildCancel;
pub use config::{BuildConfig, SpeedRatio};
pub use report::{BuildReport, DurationDisplay, REPORT_VERSION};
pub use segment::Segment;
pub use source::SourceClip;
pub use timeline::Timeline;
