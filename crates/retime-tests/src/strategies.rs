//! Properties of the two build strategies over arbitrary source durations.

use num_rational::Rational64;
use proptest::prelude::*;
use retime_core::{MediaTime, RoundingMethod, TimeRange};
use retime_timeline::{
    BuildCancel, BuildConfig, BuildStrategy, SourceClip, SpeedRatio, Timeline, TimelineBuilder,
};

// ── Helpers ────────────────────────────────────────────────────

fn build(strategy: BuildStrategy, duration: MediaTime) -> Timeline {
    let source = SourceClip::audio("Sound.aac", duration);
    TimelineBuilder::default()
        .build(strategy, &source, &BuildCancel::new())
        .unwrap()
}

/// |a - b| in ticks of `timescale`, rounded up.
fn ticks_apart(a: MediaTime, b: MediaTime, timescale: i32) -> i64 {
    (a - b)
        .abs()
        .convert_scale(timescale, RoundingMethod::TowardPositiveInfinity)
        .unwrap()
        .value()
}

fn timescales() -> impl Strategy<Value = i32> {
    prop_oneof![
        Just(600),
        Just(44_100),
        Just(48_000),
        Just(1_000_000_000),
        1i32..100_000,
    ]
}

// ── Fixed examples ─────────────────────────────────────────────

#[test]
fn ten_seconds_total_speed() {
    let timeline = build(BuildStrategy::TotalSpeed, MediaTime::new(10, 1));
    assert_eq!(timeline.duration(), MediaTime::new(10, 1));
    assert_eq!(timeline.summed_duration(), MediaTime::new(10, 1));
    for segment in timeline.segments() {
        assert_eq!(segment.source.duration, MediaTime::new(10, 1));
        assert_eq!(segment.scale(), Some(Rational64::new(1, 2)));
    }
}

#[test]
fn ten_seconds_sequential_speed() {
    let timeline = build(BuildStrategy::SequentialSpeed, MediaTime::new(10, 1));
    let durations: Vec<_> = timeline
        .segments()
        .iter()
        .map(|segment| segment.target.duration)
        .collect();
    assert_eq!(durations, vec![MediaTime::new(5, 1), MediaTime::new(5, 1)]);
}

#[test]
fn zero_duration_never_fails() {
    for strategy in BuildStrategy::ALL {
        let timeline = build(strategy, MediaTime::ZERO);
        assert_eq!(timeline.duration(), MediaTime::ZERO);
        timeline.validate().unwrap();
    }
}

#[test]
fn both_strategies_cover_the_same_source_material() {
    let duration = MediaTime::new(441_001, 44_100);
    for strategy in BuildStrategy::ALL {
        let timeline = build(strategy, duration);
        let source_total = timeline
            .segments()
            .iter()
            .fold(MediaTime::ZERO, |acc, segment| acc + segment.source.duration);
        assert_eq!(source_total, MediaTime::new(882_002, 44_100), "{strategy}");
    }
}

#[test]
fn divergence_with_truncating_rounding() {
    // with truncation the sequential build comes out one tick short
    let config = BuildConfig {
        rounding: RoundingMethod::TowardZero,
        ..BuildConfig::default()
    };
    let builder = TimelineBuilder::new(config).unwrap();
    let source = SourceClip::audio("Sound.aac", MediaTime::new(441_001, 44_100));
    let comparison = builder.compare(&source).unwrap();

    assert_eq!(comparison.total.duration(), MediaTime::new(441_001, 44_100));
    assert_eq!(comparison.sequential.duration(), MediaTime::new(441_000, 44_100));
    assert!(comparison.within_tolerance());
}

// ── Properties ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn total_speed_preserves_source_duration(value in 1i64..1_000_000_000, timescale in timescales()) {
        let duration = MediaTime::new(value, timescale);
        let timeline = build(BuildStrategy::TotalSpeed, duration);
        timeline.validate().unwrap();
        prop_assert!(ticks_apart(timeline.duration(), duration, timescale) <= 1);
    }

    #[test]
    fn sequential_speed_preserves_source_duration(value in 1i64..1_000_000_000, timescale in timescales()) {
        let duration = MediaTime::new(value, timescale);
        let timeline = build(BuildStrategy::SequentialSpeed, duration);
        timeline.validate().unwrap();
        prop_assert!(ticks_apart(timeline.duration(), duration, timescale) <= 1);
        prop_assert_eq!(timeline.duration(), timeline.summed_duration());
    }

    #[test]
    fn divergence_is_one_tick_exactly_when_value_is_odd(value in 1i64..1_000_000_000, timescale in timescales()) {
        let source = SourceClip::audio("Sound.aac", MediaTime::new(value, timescale));
        let comparison = TimelineBuilder::default().compare(&source).unwrap();
        let expected = if value % 2 == 0 { 0 } else { 1 };
        prop_assert_eq!(comparison.divergence_units(), Some(expected));
        prop_assert!(comparison.within_tolerance());
    }

    #[test]
    fn unit_ratio_scale_is_identity(value in 1i64..10_000_000, timescale in timescales()) {
        let range = TimeRange::new(MediaTime::ZERO, MediaTime::new(value, timescale));
        let mut timeline = Timeline::new();
        timeline.insert_time_range(range, MediaTime::ZERO).unwrap();
        let before = timeline.clone();
        timeline.scale_time_range(range, range.duration).unwrap();
        prop_assert_eq!(timeline, before);
    }

    #[test]
    fn any_ratio_stays_within_a_tick(
        value in 1i64..10_000_000,
        timescale in timescales(),
        multiplier in 1i64..8,
        divisor in 1i64..8,
    ) {
        let config = BuildConfig {
            speed: SpeedRatio::new(multiplier, divisor),
            ..BuildConfig::default()
        };
        let builder = TimelineBuilder::new(config).unwrap();
        let source = SourceClip::audio("Sound.aac", MediaTime::new(value, timescale));
        let comparison = builder.compare(&source).unwrap();
        comparison.total.validate().unwrap();
        comparison.sequential.validate().unwrap();
        prop_assert!(comparison.divergence_units().unwrap() <= 1);
    }
}
