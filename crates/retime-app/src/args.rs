//! Command-line arguments.

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser, ValueEnum};
use retime_core::MediaTime;
use retime_timeline::BuildStrategy;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "retime",
    version,
    about = "Build a timeline from two copies of one audio clip compressed to double speed"
)]
#[command(group(ArgGroup::new("source").required(true).args(["duration", "file"])))]
pub struct Args {
    /// JSON build config
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Strategy to build
    #[arg(long, value_enum, default_value_t = StrategyChoice::Both)]
    pub strategy: StrategyChoice,

    /// Print JSON reports
    #[arg(long)]
    pub json: bool,

    /// Use a synthetic source instead of FILE (whole seconds when there is no slash)
    #[arg(long, value_name = "VALUE/TIMESCALE", value_parser = parse_duration)]
    pub duration: Option<MediaTime>,

    /// Media file whose first audio track is the source
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,
}

/// Which strategies to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyChoice {
    #[value(alias = "total_speed", alias = "whole")]
    Total,
    #[value(alias = "sequential_speed", alias = "segment")]
    Sequential,
    Both,
}

impl StrategyChoice {
    /// The single strategy requested, or `None` for both.
    pub fn single(self) -> Option<BuildStrategy> {
        match self {
            Self::Total => Some(BuildStrategy::TotalSpeed),
            Self::Sequential => Some(BuildStrategy::SequentialSpeed),
            Self::Both => None,
        }
    }
}

/// Where the source clip comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceArg {
    File(PathBuf),
    Duration(MediaTime),
}

impl Args {
    pub fn source(&self) -> Option<SourceArg> {
        match (self.duration, &self.file) {
            (Some(duration), _) => Some(SourceArg::Duration(duration)),
            (None, Some(path)) => Some(SourceArg::File(path.clone())),
            (None, None) => None,
        }
    }
}

/// Parse `VALUE/TIMESCALE`, or whole seconds when there is no slash.
pub fn parse_duration(text: &str) -> Result<MediaTime> {
    let (value, timescale) = text.split_once('/').unwrap_or((text, "1"));
    let value: i64 = value
        .trim()
        .parse()
        .with_context(|| format!("invalid duration value in '{text}'"))?;
    let timescale: i32 = timescale
        .trim()
        .parse()
        .with_context(|| format!("invalid timescale in '{text}'"))?;
    Ok(MediaTime::try_new(value, timescale)?)
}
