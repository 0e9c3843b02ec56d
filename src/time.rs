//! Julian dates and the sidereal/obliquity quantities derived from them.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AstroError, Result};

/// Julian date of the Unix epoch.
const UNIX_EPOCH_JD: f64 = 2_440_587.5;
/// Julian date of J2000.0 (2000-01-01 12:00 TT).
pub const J2000: f64 = 2_451_545.0;
pub const DAYS_PER_JULIAN_CENTURY: f64 = 36_525.0;
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// A Julian date. Whether it is on the UTC or TT scale is up to the caller;
/// [`JulianDate::tt`] converts the former into the latter.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct JulianDate(f64);

impl JulianDate {
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn from_utc(datetime: &DateTime<Utc>) -> Self {
        let seconds = datetime.timestamp() as f64
            + datetime.timestamp_subsec_nanos() as f64 / 1_000_000_000.0;
        Self(seconds / SECONDS_PER_DAY + UNIX_EPOCH_JD)
    }

    /// Gregorian calendar date with a fractional hour, on whatever time scale
    /// the caller means.
    pub fn from_calendar(year: i32, month: u32, day: u32, hour: f64) -> Self {
        let (y, m) = if month <= 2 {
            (year as f64 - 1.0, month as f64 + 12.0)
        } else {
            (year as f64, month as f64)
        };
        let a = (y / 100.0).floor();
        let b = 2.0 - a + (a / 4.0).floor();
        let jd = (365.25 * (y + 4716.0)).floor() + (30.6001 * (m + 1.0)).floor()
            + day as f64
            + hour / 24.0
            + b
            - 1524.5;
        Self(jd)
    }

    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        let seconds = (self.0 - UNIX_EPOCH_JD) * SECONDS_PER_DAY;
        let whole = seconds.floor();
        let nanos = ((seconds - whole) * 1_000_000_000.0).round() as u32;
        let (whole, nanos) = if nanos >= 1_000_000_000 {
            (whole + 1.0, 0)
        } else {
            (whole, nanos)
        };
        DateTime::from_timestamp(whole as i64, nanos)
    }

    pub fn add_days(&self, days: f64) -> Self {
        Self(self.0 + days)
    }

    /// Approximate decimal year, good enough for the ΔT polynomials.
    pub fn decimal_year(&self) -> f64 {
        2000.0 + (self.0 - J2000) / 365.25
    }

    /// Treats `self` as UTC and shifts it onto the TT scale.
    pub fn tt(&self) -> Self {
        Self(self.0 + delta_t(self.decimal_year()) / SECONDS_PER_DAY)
    }

    pub fn centuries_since_j2000(&self) -> f64 {
        (self.0 - J2000) / DAYS_PER_JULIAN_CENTURY
    }
}

/// ΔT = TT − UT in seconds (Espenak & Meeus polynomial fits).
pub fn delta_t(year: f64) -> f64 {
    let long_term = |y: f64| {
        let u = (y - 1820.0) / 100.0;
        -20.0 + 32.0 * u * u
    };

    match year {
        y if y < 1900.0 => long_term(y),
        y if y < 1920.0 => {
            let t = y - 1900.0;
            -2.79 + 1.494119 * t - 0.0598939 * t.powi(2) + 0.0061966 * t.powi(3)
                - 0.000197 * t.powi(4)
        }
        y if y < 1941.0 => {
            let t = y - 1920.0;
            21.20 + 0.84493 * t - 0.076100 * t.powi(2) + 0.0020936 * t.powi(3)
        }
        y if y < 1961.0 => {
            let t = y - 1950.0;
            29.07 + 0.407 * t - t.powi(2) / 233.0 + t.powi(3) / 2547.0
        }
        y if y < 1986.0 => {
            let t = y - 1975.0;
            45.45 + 1.067 * t - t.powi(2) / 260.0 - t.powi(3) / 718.0
        }
        y if y < 2005.0 => {
            let t = y - 2000.0;
            63.86 + 0.3345 * t - 0.060374 * t.powi(2)
                + 0.0017275 * t.powi(3)
                + 0.000651814 * t.powi(4)
                + 0.00002373599 * t.powi(5)
        }
        y if y < 2050.0 => {
            let t = y - 2000.0;
            62.92 + 0.32217 * t + 0.005589 * t.powi(2)
        }
        y if y < 2150.0 => long_term(y) - 0.5628 * (2150.0 - y),
        y => long_term(y),
    }
}

/// Julian date of `year-01-01 12:00 TT`; 1900 gives 2415021.0.
pub fn days_since_julian(year: i32) -> f64 {
    JulianDate::from_calendar(year, 1, 1, 12.0).value()
}

/// Days between `start_year-01-01 12:00` and `end_year-01-01 12:00`.
pub fn days_in_julian_century(start_year: i32, end_year: i32) -> f64 {
    days_since_julian(end_year) - days_since_julian(start_year)
}

/// Greenwich mean sidereal time in hours, `[0, 24)`, for a UT Julian date.
pub fn gmst_hours(jd_ut: JulianDate) -> f64 {
    let d = jd_ut.value() - J2000;
    let t = d / DAYS_PER_JULIAN_CENTURY;
    let theta = 280.460_618_37 + 360.985_647_366_29 * d + 0.000_387_933 * t * t
        - t * t * t / 38_710_000.0;
    theta.rem_euclid(360.0) / 15.0
}

/// IAU 2006 mean obliquity of the ecliptic in degrees for a TT Julian date.
pub fn mean_obliquity_deg(jd_tt: JulianDate) -> f64 {
    let t = jd_tt.centuries_since_j2000();
    let arcsec = 84_381.406 - 46.836_769 * t - 0.000_183_1 * t.powi(2) + 0.002_003_40 * t.powi(3)
        - 0.000_000_576 * t.powi(4)
        - 0.000_000_043_4 * t.powi(5);
    arcsec / 3600.0
}

/// Parses `Z`, `UTC`, `+05:30`, `-0400` or `+5` into a fixed offset.
pub fn parse_utc_offset(text: &str) -> Result<FixedOffset> {
    let trimmed = text.trim();
    if trimmed.eq_ignore_ascii_case("z") || trimmed.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0)
            .ok_or_else(|| AstroError::Parse(format!("invalid UTC offset: {}", text)));
    }

    let (sign, rest) = match trimmed.chars().next() {
        Some('+') => (1, &trimmed[1..]),
        Some('-') => (-1, &trimmed[1..]),
        _ => return Err(AstroError::Parse(format!("invalid UTC offset: {}", text))),
    };

    if !rest.is_ascii() {
        return Err(AstroError::Parse(format!("invalid UTC offset: {}", text)));
    }

    let (hours, minutes) = if let Some((h, m)) = rest.split_once(':') {
        (h, m)
    } else if rest.len() == 4 {
        rest.split_at(2)
    } else {
        (rest, "0")
    };

    let hours: i32 = hours
        .parse()
        .map_err(|_| AstroError::Parse(format!("invalid UTC offset: {}", text)))?;
    let minutes: i32 = minutes
        .parse()
        .map_err(|_| AstroError::Parse(format!("invalid UTC offset: {}", text)))?;
    if hours > 14 || minutes > 59 {
        return Err(AstroError::Parse(format!("UTC offset out of range: {}", text)));
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
        .ok_or_else(|| AstroError::Parse(format!("UTC offset out of range: {}", text)))
}

/// Midnight at the start of `date` in `offset`, expressed in UTC.
pub fn local_midnight(date: NaiveDate, offset: &FixedOffset) -> Result<DateTime<Utc>> {
    let naive = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| AstroError::Parse(format!("invalid date: {}", date)))?;
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| AstroError::Parse(format!("ambiguous local time: {}", naive)))
}

/// Parses a wall-clock time in `offset`. Accepts RFC 3339 (whose own offset
/// wins), `YYYY-MM-DD HH:MM[:SS]`, the same with a `T`, or a bare date
/// meaning local midnight.
pub fn parse_local_datetime(text: &str, offset: &FixedOffset) -> Result<DateTime<Utc>> {
    let trimmed = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }

    const FORMATS: [&str; 4] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"];
    for format in FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return offset
                .from_local_datetime(&naive)
                .single()
                .map(|dt| dt.with_timezone(&Utc))
                .ok_or_else(|| AstroError::Parse(format!("ambiguous local time: {}", text)));
        }
    }

    match NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        Ok(date) => local_midnight(date, offset),
        Err(_) => Err(AstroError::Parse(format!("invalid date/time: {}", text))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_days_since_julian() {
        assert_eq!(days_since_julian(1900), 2_415_021.0);
        assert_eq!(days_since_julian(2000), J2000);
    }

    #[test]
    fn test_get_days_in_julian_century() {
        assert_eq!(days_in_julian_century(1900, 2000), 36_524.0);
        assert_eq!(days_in_julian_century(2000, 2100), 36_525.0);
    }

    #[test]
    fn test_julian_date_from_utc() {
        let dt = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        assert_relative_eq!(JulianDate::from_utc(&dt).value(), J2000);

        let back = JulianDate::new(J2000).to_utc().unwrap();
        assert_eq!(back, dt);
    }

    #[test]
    fn test_delta_t_is_about_a_minute_today() {
        let dt = delta_t(2025.0);
        assert!(dt > 60.0 && dt < 80.0, "unexpected ΔT {}", dt);
        assert!(delta_t(1900.0).abs() < 5.0);
    }

    #[test]
    fn test_gmst_at_j2000() {
        // 18h 41m 50.548s
        assert_relative_eq!(gmst_hours(JulianDate::new(J2000)), 18.697_374_558, epsilon = 1e-6);
    }

    #[test]
    fn test_mean_obliquity_at_j2000() {
        assert_relative_eq!(mean_obliquity_deg(JulianDate::new(J2000)), 23.439_279, epsilon = 1e-6);
    }

    #[test]
    fn test_parse_utc_offset() {
        assert_eq!(parse_utc_offset("+05:30").unwrap().local_minus_utc(), 19_800);
        assert_eq!(parse_utc_offset("-0400").unwrap().local_minus_utc(), -14_400);
        assert_eq!(parse_utc_offset("+5").unwrap().local_minus_utc(), 18_000);
        assert_eq!(parse_utc_offset("UTC").unwrap().local_minus_utc(), 0);
        assert!(parse_utc_offset("Asia/Kolkata").is_err());
        assert!(parse_utc_offset("+25:00").is_err());
        assert!(matches!(parse_utc_offset("+1é1"), Err(AstroError::Parse(_))));
        assert!(parse_utc_offset("-é").is_err());
    }

    #[test]
    fn test_local_midnight() {
        let offset = parse_utc_offset("+05:30").unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 1, 11).unwrap();
        let midnight = local_midnight(date, &offset).unwrap();
        assert_eq!(midnight, Utc.with_ymd_and_hms(2025, 1, 10, 18, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_local_datetime() {
        let ist = parse_utc_offset("+05:30").unwrap();
        let expected = Utc.with_ymd_and_hms(2025, 1, 11, 10, 9, 20).unwrap();
        assert_eq!(parse_local_datetime("2025-01-11 15:39:20", &ist).unwrap(), expected);
        assert_eq!(parse_local_datetime("2025-01-11T15:39:20", &ist).unwrap(), expected);
        assert_eq!(parse_local_datetime("2025-01-11T10:09:20Z", &ist).unwrap(), expected);
        assert_eq!(
            parse_local_datetime("2025-01-11", &ist).unwrap(),
            Utc.with_ymd_and_hms(2025, 1, 10, 18, 30, 0).unwrap()
        );
        assert!(parse_local_datetime("11/01/2025", &ist).is_err());
    }
}
