//! Degree helpers shared by the zodiac and position code.

use std::fmt;

use serde::{Deserialize, Serialize};

pub const DEGREE_MAX: f64 = 360.0;

pub const DEGREE_SYMBOL: char = '\u{00b0}';
pub const MINUTE_SYMBOL: char = '\u{2032}';
pub const SECOND_SYMBOL: char = '\u{2033}';
pub const RETROGRADE_SYMBOL: char = '℞';

/// Returns -1 for negative numbers, otherwise 1.
pub fn sign(num: i32) -> i32 {
    if num < 0 {
        -1
    } else {
        1
    }
}

/// Plain `d + m/60 + s/3600`; a negative degree does not flip the minutes.
pub fn dms_to_decimal(degrees: f64, minutes: f64, seconds: f64) -> f64 {
    degrees + minutes / 60.0 + seconds / 3600.0
}

/// Wraps a longitude into `[0, 360)`.
pub fn normalize_degree(degree: f64) -> f64 {
    let wrapped = degree.rem_euclid(DEGREE_MAX);
    // rem_euclid can return exactly 360.0 for tiny negative inputs
    if wrapped >= DEGREE_MAX {
        0.0
    } else {
        wrapped
    }
}

/// Wraps a rasi number into `1..=12`.
pub fn normalize_rasi(position: i32) -> i32 {
    (position - 1).rem_euclid(12) + 1
}

/// Signed shortest difference `to - from` in `(-180, 180]`.
pub fn angular_difference(from: f64, to: f64) -> f64 {
    let diff = normalize_degree(to - from);
    if diff > 180.0 {
        diff - DEGREE_MAX
    } else {
        diff
    }
}

/// An angle split into whole degrees, minutes and seconds.
///
/// Minutes and seconds are always non-negative. The sign is kept in
/// `negative` so angles between -1° and 0° survive the split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegMinSec {
    pub degree: i32,
    pub minute: u32,
    pub second: u32,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub negative: bool,
}

impl DegMinSec {
    /// The sign is taken from `degree`.
    pub fn new(degree: i32, minute: u32, second: u32) -> Self {
        Self {
            degree,
            minute,
            second,
            negative: degree < 0,
        }
    }

    /// Rounds to the nearest arc-second, carrying into minutes and degrees.
    pub fn from_decimal(deg: f64) -> Self {
        Self::from_total_seconds((deg * 3600.0).round() as i64)
    }

    pub fn is_negative(&self) -> bool {
        self.negative || self.degree < 0
    }

    pub fn to_decimal(&self) -> f64 {
        self.total_seconds() as f64 / 3600.0
    }

    /// Total signed arc-seconds; exact, unlike [`DegMinSec::to_decimal`].
    pub fn total_seconds(&self) -> i64 {
        let magnitude =
            self.degree.unsigned_abs() as i64 * 3600 + self.minute as i64 * 60 + self.second as i64;
        if self.is_negative() {
            -magnitude
        } else {
            magnitude
        }
    }

    pub fn from_total_seconds(total: i64) -> Self {
        let magnitude = total.abs();
        let degree = (magnitude / 3600) as i32;
        Self {
            degree: if total < 0 { -degree } else { degree },
            minute: ((magnitude % 3600) / 60) as u32,
            second: (magnitude % 60) as u32,
            negative: total < 0,
        }
    }

    pub fn format(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for DegMinSec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negative() {
            f.write_str("-")?;
        }
        write!(
            f,
            "{}{}{}{}{}{}",
            self.degree.unsigned_abs(),
            DEGREE_SYMBOL,
            self.minute,
            MINUTE_SYMBOL,
            self.second,
            SECOND_SYMBOL
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_dms_to_decimal() {
        assert_relative_eq!(dms_to_decimal(13.0, 20.0, 0.0), 13.0 + 20.0 / 60.0);
        assert_relative_eq!(
            dms_to_decimal(-12.0, 34.0, 56.78),
            -12.0 + 34.0 / 60.0 + 56.78 / 3600.0
        );
    }

    #[test]
    fn test_normalize_degree() {
        assert_relative_eq!(normalize_degree(-10.0), 350.0);
        assert_relative_eq!(normalize_degree(725.0), 5.0);
        assert_relative_eq!(normalize_degree(360.0), 0.0);
        assert!(normalize_degree(-1e-18) < DEGREE_MAX);
    }

    #[test]
    fn test_normalize_rasi() {
        assert_eq!(normalize_rasi(0), 12);
        assert_eq!(normalize_rasi(13), 1);
        assert_eq!(normalize_rasi(-1), 11);
        assert_eq!(normalize_rasi(12), 12);
    }

    #[test]
    fn test_angular_difference_wraps() {
        assert_relative_eq!(angular_difference(359.5, 0.5), 1.0, epsilon = 1e-9);
        assert_relative_eq!(angular_difference(0.5, 359.5), -1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_dms_roundtrip_and_format() {
        let dms = DegMinSec::from_decimal(4.0 + 19.0 / 60.0);
        assert_eq!(dms, DegMinSec::new(4, 19, 0));
        assert_eq!(dms.format(), "4°19′0″");

        let carry = DegMinSec::from_decimal(29.999_999_9);
        assert_eq!(carry, DegMinSec::new(30, 0, 0));
    }

    #[test]
    fn test_dms_keeps_sign_below_one_degree() {
        let negative = DegMinSec::from_decimal(-0.5);
        assert_eq!(negative.degree, 0);
        assert_eq!(negative.minute, 30);
        assert!(negative.is_negative());
        assert_relative_eq!(negative.to_decimal(), -0.5);
        assert_eq!(negative.format(), "-0°30′0″");

        assert_eq!(DegMinSec::from_decimal(-12.5), DegMinSec::new(-12, 30, 0));
        assert_relative_eq!(DegMinSec::from_decimal(-12.5).to_decimal(), -12.5);
        assert_eq!(DegMinSec::from_decimal(-0.0), DegMinSec::new(0, 0, 0));
    }

    #[test]
    fn test_total_seconds() {
        let dms = DegMinSec::new(-12, 30, 15);
        assert_eq!(dms.total_seconds(), -(12 * 3600 + 30 * 60 + 15));
        assert_eq!(DegMinSec::from_total_seconds(dms.total_seconds()), dms);
    }
}
