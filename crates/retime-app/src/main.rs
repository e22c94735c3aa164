//! Retime - compare whole-composition and segment-by-segment speed changes
//!
//! Entry point. Loads a source clip, builds the requested timelines and
//! prints their durations.

mod args;
mod session;
mod sink;

use anyhow::{Context, Result};
use clap::Parser;
use retime_media::MediaProbe;
use retime_timeline::{BuildConfig, BuildStrategy, SourceClip, TimelineBuilder};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::args::{Args, SourceArg};
use crate::session::BuildSession;
use crate::sink::{ConsoleSink, PlaybackSink};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    info!("Retime starting...");

    let config = match &args.config {
        Some(path) => BuildConfig::load_from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => BuildConfig::default(),
    };
    let builder = TimelineBuilder::new(config)?;

    let source = load_source(&args.source().context("no source given")?)?;

    let mut sink = ConsoleSink::new(std::io::stdout().lock(), args.json, source.clone());

    match args.strategy.single() {
        None => {
            let comparison = builder.compare(&source)?;
            sink.show_comparison(&comparison)?;
        }
        Some(strategy) => {
            let session = BuildSession::new(builder, source);
            // a sequential build starts on launch and is superseded by the request
            session.request(BuildStrategy::SequentialSpeed);
            if strategy != BuildStrategy::SequentialSpeed {
                session.request(strategy);
            }
            let published = session.wait().await?;
            sink.replace_current_item(published.as_ref())?;
        }
    }

    Ok(())
}

fn load_source(source: &SourceArg) -> Result<SourceClip> {
    match source {
        SourceArg::Duration(duration) => Ok(SourceClip::audio("synthetic", *duration)),
        SourceArg::File(path) => {
            let probe = MediaProbe::probe(path)
                .with_context(|| format!("failed to probe {}", path.display()))?;
            let name = probe.file_name();
            Ok(match probe.audio_track_range() {
                Some(range) => SourceClip::audio(name, probe.duration).with_audio_track(range),
                None => SourceClip::without_audio(name, probe.duration),
            })
        }
    }
}
