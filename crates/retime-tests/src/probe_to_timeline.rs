//! Integration tests from probed media to built timelines.
//!
//! Exercises cross-crate interactions between retime-media,
//! retime-timeline and retime-core.

use retime_core::{MediaTime, TimeRange};
use retime_media::MediaProbe;
use retime_timeline::{
    BuildCancel, BuildReport, BuildStrategy, SourceClip, TimelineBuilder, REPORT_VERSION,
};

// ── Helpers ────────────────────────────────────────────────────

fn ffprobe_json(time_base: &str, start_pts: i64, duration_ts: i64, container: &str) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({
        "streams": [
            { "index": 0, "codec_type": "video", "codec_name": "h264", "time_base": "1/600" },
            {
                "index": 1,
                "codec_type": "audio",
                "codec_name": "aac",
                "sample_rate": "44100",
                "channels": 2,
                "time_base": time_base,
                "start_pts": start_pts,
                "duration_ts": duration_ts
            }
        ],
        "format": { "format_name": "mov,mp4,m4a", "duration": container }
    }))
    .unwrap()
}

fn source_from(probe: &MediaProbe) -> SourceClip {
    match probe.audio_track_range() {
        Some(range) => SourceClip::audio(probe.file_name(), probe.duration).with_audio_track(range),
        None => SourceClip::without_audio(probe.file_name(), probe.duration),
    }
}

// ── Probe → build ──────────────────────────────────────────────

#[test]
fn probed_odd_duration_reproduces_divergence() {
    let json = ffprobe_json("1/44100", 0, 441_001, "10.000023");
    let probe = MediaProbe::from_ffprobe_json("bundle/Sound.m4a", &json).unwrap();
    let source = source_from(&probe);

    assert_eq!(source.name, "Sound.m4a");
    assert_eq!(source.duration, MediaTime::new(441_001, 44_100));

    let comparison = TimelineBuilder::default().compare(&source).unwrap();
    assert_eq!(comparison.total.duration(), MediaTime::new(441_001, 44_100));
    assert_eq!(comparison.sequential.duration(), MediaTime::new(441_002, 44_100));
    assert_eq!(comparison.divergence_units(), Some(1));
}

#[test]
fn primed_track_uses_its_own_range_for_total_speed() {
    // track starts 2112 ticks in, as AAC encoders often prime
    let json = ffprobe_json("1/44100", 2112, 88_200, "2.047891");
    let probe = MediaProbe::from_ffprobe_json("primed.m4a", &json).unwrap();
    let source = source_from(&probe);

    let track = TimeRange::new(MediaTime::new(2112, 44_100), MediaTime::new(88_200, 44_100));
    assert_eq!(source.audio_track, Some(track));

    let timeline = TimelineBuilder::default()
        .build_with_total_speed(&source, &BuildCancel::new())
        .unwrap();
    assert_eq!(timeline.duration(), MediaTime::new(88_200, 44_100));
    assert!(timeline.segments().iter().all(|segment| segment.source == track));
}

#[test]
fn video_only_probe_builds_nothing() {
    let json = serde_json::to_vec(&serde_json::json!({
        "streams": [ { "index": 0, "codec_type": "video", "time_base": "1/600" } ],
        "format": { "format_name": "mov", "duration": "4.0" }
    }))
    .unwrap();
    let probe = MediaProbe::from_ffprobe_json("silent.mov", &json).unwrap();
    let source = source_from(&probe);

    let builder = TimelineBuilder::default();
    for strategy in BuildStrategy::ALL {
        let timeline = builder.build(strategy, &source, &BuildCancel::new()).unwrap();
        assert!(timeline.is_empty());
    }
}

#[test]
fn report_from_probed_source_round_trips() {
    let json = ffprobe_json("1/48000", 0, 480_000, "10.0");
    let probe = MediaProbe::from_ffprobe_json("tone.wav", &json).unwrap();
    let source = source_from(&probe);

    let timeline = TimelineBuilder::default()
        .build_with_sequential_speed(&source, &BuildCancel::new())
        .unwrap();
    let report = BuildReport::new(BuildStrategy::SequentialSpeed, source.clone(), timeline);
    let loaded = BuildReport::from_json(&report.to_json().unwrap()).unwrap();

    assert_eq!(loaded.version, REPORT_VERSION);
    assert_eq!(loaded.source, source);
    assert_eq!(loaded.duration.value, 480_000);
    assert_eq!(loaded.duration.timescale, 48_000);
}
