//! Where finished timelines are shown.

use anyhow::Result;
use retime_timeline::{BuildReport, DurationDisplay, SourceClip, StrategyComparison, Timeline};
use std::io::Write;

use crate::session::Published;

/// Accepts the timeline that should be "playing" now.
pub trait PlaybackSink {
    /// Swap in a new item; `None` clears the player.
    fn replace_current_item(&mut self, item: Option<&Published>) -> Result<()>;
}

/// Writes duration overlays (or JSON reports) to a stream.
pub struct ConsoleSink<W: Write> {
    out: W,
    json: bool,
    source: SourceClip,
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W, json: bool, source: SourceClip) -> Self {
        Self { out, json, source }
    }

    /// Print both strategies side by side with their divergence.
    pub fn show_comparison(&mut self, comparison: &StrategyComparison) -> Result<()> {
        if self.json {
            serde_json::to_writer_pretty(&mut self.out, comparison)?;
            writeln!(self.out)?;
            return Ok(());
        }

        writeln!(self.out, "Source: {}", self.source.name)?;
        write_duration(&mut self.out, "Source duration", comparison.source_duration.into())?;
        write_duration(&mut self.out, "To whole composition", comparison.total.duration().into())?;
        write_duration(&mut self.out, "Segment by segment", comparison.sequential.duration().into())?;
        write_duration(&mut self.out, "Divergence", comparison.divergence.into())?;
        writeln!(
            self.out,
            "Within tolerance ({} / {}): {}",
            comparison.tolerance.value(),
            comparison.tolerance.timescale(),
            if comparison.within_tolerance() { "yes" } else { "no" }
        )?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> PlaybackSink for ConsoleSink<W> {
    fn replace_current_item(&mut self, item: Option<&Published>) -> Result<()> {
        let Some(item) = item else {
            writeln!(self.out, "No composition")?;
            return Ok(());
        };

        if self.json {
            let report = BuildReport::new(item.strategy, self.source.clone(), item.timeline.clone());
            self.out.write_all(&report.to_json()?)?;
            writeln!(self.out)?;
            return Ok(());
        }

        writeln!(self.out, "Strategy: {}", item.strategy.display_name())?;
        write_duration(&mut self.out, "Duration", item.timeline.duration().into())?;
        write_segments(&mut self.out, &item.timeline)?;
        Ok(())
    }
}

fn write_duration(out: &mut impl Write, label: &str, duration: DurationDisplay) -> Result<()> {
    writeln!(out, "{label}: {} / {}", duration.value, duration.timescale)?;
    writeln!(out, "{label} (seconds): {:.14} s", duration.seconds)?;
    Ok(())
}

fn write_segments(out: &mut impl Write, timeline: &Timeline) -> Result<()> {
    for (i, segment) in timeline.segments().iter().enumerate() {
        let rate = segment
            .rate()
            .map(|rate| format!("x{rate:.5}"))
            .unwrap_or_else(|| "x?".to_string());
        writeln!(
            out,
            "  [{i}] {} <- {} ({rate})",
            segment.target.debug_string(),
            segment.source.debug_string()
        )?;
    }
    Ok(())
}
