//! Time representation for sample-accurate composition
//!
//! A [`MediaTime`] is an integer `value` counted in units of `1 / timescale`
//! seconds. Addition, subtraction and comparison are exact; the only lossy
//! operations are the ones that rescale a value into a fixed timescale, and
//! those take an explicit [`RoundingMethod`].
//!
//! All intermediate arithmetic is done in `i128` so that rounding happens
//! exactly once per operation.

use num_rational::Rational64;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Neg, Sub};

use crate::error::{Error, Result};

/// How a rescaled value that falls between two ticks is resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMethod {
    /// Round to nearest, ties away from zero.
    #[default]
    HalfAwayFromZero,
    /// Truncate.
    TowardZero,
    AwayFromZero,
    /// Floor.
    TowardNegativeInfinity,
    /// Ceiling.
    TowardPositiveInfinity,
}

impl RoundingMethod {
    /// Divide `numerator / denominator`, rounding the quotient.
    /// `denominator` must be non-zero.
    pub fn divide(self, numerator: i128, denominator: i128) -> i128 {
        let (n, d) = if denominator < 0 {
            (-numerator, -denominator)
        } else {
            (numerator, denominator)
        };
        let quotient = n / d;
        let remainder = n % d;
        if remainder == 0 {
            return quotient;
        }
        let away = quotient + n.signum();
        match self {
            Self::TowardZero => quotient,
            Self::AwayFromZero => away,
            Self::TowardNegativeInfinity => {
                if n < 0 {
                    away
                } else {
                    quotient
                }
            }
            Self::TowardPositiveInfinity => {
                if n > 0 {
                    away
                } else {
                    quotient
                }
            }
            Self::HalfAwayFromZero => {
                if remainder.abs() * 2 >= d {
                    away
                } else {
                    quotient
                }
            }
        }
    }
}

/// A point in time (or a duration) as `value / timescale` seconds.
///
/// Two times compare equal when they denote the same rational number of
/// seconds, regardless of timescale: `1/2 == 2/4`.
#[derive(Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "RawMediaTime")]
pub struct MediaTime {
    value: i64,
    timescale: i32,
}

#[derive(Deserialize)]
struct RawMediaTime {
    value: i64,
    timescale: i32,
}

impl TryFrom<RawMediaTime> for MediaTime {
    type Error = Error;

    fn try_from(raw: RawMediaTime) -> Result<Self> {
        Self::try_new(raw.value, raw.timescale)
    }
}

impl MediaTime {
    /// Largest timescale a mixed-timescale sum is allowed to produce.
    pub const MAX_TIMESCALE: i32 = 1_000_000_000;

    /// Zero time constant.
    pub const ZERO: Self = Self {
        value: 0,
        timescale: 1,
    };

    /// Create a time of `value / timescale` seconds.
    ///
    /// # Panics
    /// Panics if `timescale` is not positive. Use [`MediaTime::try_new`] for
    /// untrusted input.
    #[inline]
    pub const fn new(value: i64, timescale: i32) -> Self {
        assert!(timescale > 0, "timescale must be positive");
        Self { value, timescale }
    }

    /// Create a time, rejecting timescales outside `1..=MAX_TIMESCALE`.
    pub fn try_new(value: i64, timescale: i32) -> Result<Self> {
        if timescale <= 0 || timescale > Self::MAX_TIMESCALE {
            return Err(Error::InvalidTimescale(timescale as i64));
        }
        Ok(Self { value, timescale })
    }

    /// Create a time from floating-point seconds at the given timescale.
    /// Note: may introduce a rounding error of up to half a tick.
    pub fn from_seconds_f64(seconds: f64, timescale: i32) -> Result<Self> {
        if !seconds.is_finite() {
            return Err(Error::InvalidParameter(format!(
                "non-finite seconds value {seconds}"
            )));
        }
        let ticks = (seconds * timescale as f64).round();
        if ticks < i64::MIN as f64 || ticks > i64::MAX as f64 {
            return Err(Error::Overflow(format!(
                "{seconds}s does not fit at timescale {timescale}"
            )));
        }
        Self::try_new(ticks as i64, timescale)
    }

    /// Create a time from an exact rational number of seconds.
    pub fn from_rational(seconds: Rational64, timescale: i32, rounding: RoundingMethod) -> Result<Self> {
        let scaled = (*seconds.numer() as i128)
            .checked_mul(timescale as i128)
            .ok_or_else(|| Error::Overflow(format!("{seconds} at timescale {timescale}")))?;
        let value = narrow(rounding.divide(scaled, *seconds.denom() as i128))?;
        Self::try_new(value, timescale)
    }

    /// Tick count.
    #[inline]
    pub fn value(self) -> i64 {
        self.value
    }

    /// Ticks per second.
    #[inline]
    pub fn timescale(self) -> i32 {
        self.timescale
    }

    /// Convert to seconds as f64.
    #[inline]
    pub fn seconds(self) -> f64 {
        self.value as f64 / self.timescale as f64
    }

    /// Exact value in seconds.
    #[inline]
    pub fn to_rational(self) -> Rational64 {
        Rational64::new(self.value, self.timescale as i64)
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self.value == 0
    }

    #[inline]
    pub fn is_negative(self) -> bool {
        self.value < 0
    }

    #[inline]
    pub fn is_positive(self) -> bool {
        self.value > 0
    }

    /// Get the absolute value of this time.
    #[inline]
    pub fn abs(self) -> Self {
        Self {
            value: self.value.saturating_abs(),
            timescale: self.timescale,
        }
    }

    /// Re-express this time in another timescale.
    pub fn convert_scale(self, timescale: i32, rounding: RoundingMethod) -> Result<Self> {
        if timescale == self.timescale {
            return Ok(self);
        }
        if timescale <= 0 || timescale > Self::MAX_TIMESCALE {
            return Err(Error::InvalidTimescale(timescale as i64));
        }
        let value = narrow(rescale(self.value, self.timescale, timescale, rounding))?;
        Ok(Self { value, timescale })
    }

    /// Multiply by `multiplier / divisor`, keeping this time's timescale and
    /// rounding half away from zero.
    pub fn multiply_by_ratio(self, multiplier: i64, divisor: i64) -> Result<Self> {
        self.multiply_by_ratio_with(multiplier, divisor, RoundingMethod::default())
    }

    /// Multiply by `multiplier / divisor` with an explicit rounding method.
    pub fn multiply_by_ratio_with(
        self,
        multiplier: i64,
        divisor: i64,
        rounding: RoundingMethod,
    ) -> Result<Self> {
        if divisor == 0 {
            return Err(Error::InvalidParameter("ratio divisor is zero".into()));
        }
        let numerator = (self.value as i128) * (multiplier as i128);
        let value = narrow(rounding.divide(numerator, divisor as i128))?;
        Ok(Self {
            value,
            timescale: self.timescale,
        })
    }

    /// Multiply by the ratio `numerator / denominator` of two times, keeping
    /// this time's timescale.
    pub fn scale_by(self, numerator: Self, denominator: Self, rounding: RoundingMethod) -> Result<Self> {
        if denominator.is_zero() {
            return Err(Error::InvalidParameter("cannot scale by a zero-length time".into()));
        }
        let overflow = || {
            Error::Overflow(format!(
                "{} * {} / {}",
                self.debug_string(),
                numerator.debug_string(),
                denominator.debug_string()
            ))
        };
        let n = (self.value as i128)
            .checked_mul(numerator.value as i128)
            .and_then(|v| v.checked_mul(denominator.timescale as i128))
            .ok_or_else(overflow)?;
        let d = (denominator.value as i128)
            .checked_mul(numerator.timescale as i128)
            .ok_or_else(overflow)?;
        let value = narrow(rounding.divide(n, d))?;
        Ok(Self {
            value,
            timescale: self.timescale,
        })
    }

    /// Add, failing if the result does not fit.
    pub fn checked_add(self, rhs: Self) -> Result<Self> {
        let (value, timescale) = self.combine(rhs, false);
        Ok(Self {
            value: narrow(value)?,
            timescale,
        })
    }

    /// Subtract, failing if the result does not fit.
    pub fn checked_sub(self, rhs: Self) -> Result<Self> {
        let (value, timescale) = self.combine(rhs, true);
        Ok(Self {
            value: narrow(value)?,
            timescale,
        })
    }

    /// Timescale used for the result of adding two times: the shared
    /// timescale, else their least common multiple capped at
    /// [`MediaTime::MAX_TIMESCALE`].
    pub fn common_timescale(a: i32, b: i32) -> i32 {
        if a == b {
            return a;
        }
        let (a64, b64) = (a as i64, b as i64);
        let lcm = a64 / gcd(a64, b64) * b64;
        lcm.min(Self::MAX_TIMESCALE as i64) as i32
    }

    /// Zero-padded `value/timescale` form, e.g. `001/2`.
    pub fn debug_string(self) -> String {
        format!("{:03}/{}", self.value, self.timescale)
    }

    fn combine(self, rhs: Self, subtract: bool) -> (i128, i32) {
        let timescale = Self::common_timescale(self.timescale, rhs.timescale);
        let rounding = RoundingMethod::default();
        let lhs = rescale(self.value, self.timescale, timescale, rounding);
        let rhs = rescale(rhs.value, rhs.timescale, timescale, rounding);
        let value = if subtract { lhs - rhs } else { lhs + rhs };
        (value, timescale)
    }

    fn saturating(value: i128, timescale: i32) -> Self {
        Self {
            value: value.clamp(i64::MIN as i128, i64::MAX as i128) as i64,
            timescale,
        }
    }
}

fn rescale(value: i64, from: i32, to: i32, rounding: RoundingMethod) -> i128 {
    if from == to {
        return value as i128;
    }
    // i64 * i32 always fits in i128
    rounding.divide((value as i128) * (to as i128), from as i128)
}

fn narrow(value: i128) -> Result<i64> {
    i64::try_from(value).map_err(|_| Error::Overflow(format!("{value} does not fit in 64 bits")))
}

fn gcd(mut a: i64, mut b: i64) -> i64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a.abs()
}

impl Default for MediaTime {
    fn default() -> Self {
        Self::ZERO
    }
}

impl PartialEq for MediaTime {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for MediaTime {}

impl PartialOrd for MediaTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MediaTime {
    fn cmp(&self, other: &Self) -> Ordering {
        let lhs = (self.value as i128) * (other.timescale as i128);
        let rhs = (other.value as i128) * (self.timescale as i128);
        lhs.cmp(&rhs)
    }
}

impl Hash for MediaTime {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // reduced form, so equal times hash alike
        self.to_rational().hash(state);
    }
}

impl Add for MediaTime {
    type Output = Self;

    /// Saturating; see [`MediaTime::checked_add`].
    fn add(self, rhs: Self) -> Self {
        let (value, timescale) = self.combine(rhs, false);
        Self::saturating(value, timescale)
    }
}

impl Sub for MediaTime {
    type Output = Self;

    /// Saturating; see [`MediaTime::checked_sub`].
    fn sub(self, rhs: Self) -> Self {
        let (value, timescale) = self.combine(rhs, true);
        Self::saturating(value, timescale)
    }
}

impl Neg for MediaTime {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            value: self.value.saturating_neg(),
            timescale: self.timescale,
        }
    }
}

impl fmt::Debug for MediaTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MediaTime({}/{})", self.value, self.timescale)
    }
}

impl fmt::Display for MediaTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s", self.seconds())
    }
}

/// A time range with inclusive start and exclusive end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    /// Start time (inclusive)
    pub start: MediaTime,
    /// Duration of the range
    pub duration: MediaTime,
}

impl TimeRange {
    /// Create a new time range from start and duration.
    #[inline]
    pub fn new(start: MediaTime, duration: MediaTime) -> Self {
        Self { start, duration }
    }

    /// Create a time range from start and end times.
    #[inline]
    pub fn from_start_end(start: MediaTime, end: MediaTime) -> Self {
        Self {
            start,
            duration: end - start,
        }
    }

    /// End time (exclusive).
    #[inline]
    pub fn end(self) -> MediaTime {
        self.start + self.duration
    }

    /// End time, failing instead of saturating.
    pub fn checked_end(self) -> Result<MediaTime> {
        self.start.checked_add(self.duration)
    }

    /// True for zero or negative durations.
    #[inline]
    pub fn is_empty(self) -> bool {
        !self.duration.is_positive()
    }

    /// Check if a time is within this range.
    #[inline]
    pub fn contains(self, time: MediaTime) -> bool {
        time >= self.start && time < self.end()
    }

    /// Check if `other` lies entirely within this range.
    pub fn contains_range(self, other: Self) -> bool {
        other.start >= self.start && other.end() <= self.end()
    }

    /// Check if two ranges overlap.
    pub fn overlaps(self, other: Self) -> bool {
        self.start < other.end() && other.start < self.end()
    }

    /// Compute the intersection of two ranges, if any.
    pub fn intersection(self, other: Self) -> Option<Self> {
        if !self.overlaps(other) {
            return None;
        }
        let start = self.start.max(other.start);
        let end = self.end().min(other.end());
        Some(Self::from_start_end(start, end))
    }

    /// Same range moved by `offset`.
    pub fn shifted(self, offset: MediaTime) -> Result<Self> {
        Ok(Self {
            start: self.start.checked_add(offset)?,
            duration: self.duration,
        })
    }

    /// `start - end` in [`MediaTime::debug_string`] form.
    pub fn debug_string(self) -> String {
        format!("{} - {}", self.start.debug_string(), self.end().debug_string())
    }

    /// Empty range starting at zero.
    pub const EMPTY: Self = Self {
        start: MediaTime::ZERO,
        duration: MediaTime::ZERO,
    };
}

impl Default for TimeRange {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end())
    }
}
