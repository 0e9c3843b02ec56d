//! Sunrise and sunset.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::ephemeris::{to_equatorial, Body, Ephemeris};
use crate::error::{AstroError, Result};
use crate::location::GeoLocation;
use crate::search::find_discrete;
use crate::time::{gmst_hours, local_midnight, JulianDate};

/// Altitude of the Sun's centre at rise and set: refraction plus
/// semi-diameter.
pub const SUNRISE_ALTITUDE_DEG: f64 = -0.8333;

/// Sampling step of the horizon search.
const STEP_DAYS: f64 = 1.0 / 24.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SunTimes {
    pub date: NaiveDate,
    pub sunrise: Option<DateTime<FixedOffset>>,
    pub sunset: Option<DateTime<FixedOffset>>,
}

impl SunTimes {
    pub fn day_length(&self) -> Option<chrono::Duration> {
        match (self.sunrise, self.sunset) {
            (Some(rise), Some(set)) if set > rise => Some(set - rise),
            _ => None,
        }
    }
}

/// Geometric altitude of `body` above the horizon in degrees.
pub fn altitude_deg(ephemeris: &dyn Ephemeris, body: Body, location: &GeoLocation, jd_ut: JulianDate) -> f64 {
    let jd_tt = jd_ut.tt();
    let (ra, dec) = to_equatorial(&ephemeris.geocentric(body, jd_tt), jd_tt);
    let hour_angle = (gmst_hours(jd_ut) * 15.0 + location.longitude - ra).to_radians();
    let (lat, dec) = (location.latitude.to_radians(), dec.to_radians());
    (lat.sin() * dec.sin() + lat.cos() * dec.cos() * hour_angle.cos())
        .asin()
        .to_degrees()
}

/// Sunrise and sunset within the civil day `date` at `offset`.
///
/// Either time is `None` when the Sun does not cross the horizon that day,
/// as in polar day or night.
pub fn sunrise_sunset(
    ephemeris: &dyn Ephemeris,
    location: &GeoLocation,
    date: NaiveDate,
    offset: &FixedOffset,
) -> Result<SunTimes> {
    location.validate()?;
    let start = JulianDate::from_utc(&local_midnight(date, offset)?);
    let end = start.add_days(1.0);

    let above = |jd: JulianDate| altitude_deg(ephemeris, Body::Sun, location, jd) > SUNRISE_ALTITUDE_DEG;
    let events = find_discrete(start, end, STEP_DAYS, above)?;

    let local = |jd: JulianDate| -> Result<DateTime<FixedOffset>> {
        jd.to_utc()
            .map(|utc: DateTime<Utc>| utc.with_timezone(offset))
            .ok_or_else(|| AstroError::Search(format!("julian date {} out of range", jd.value())))
    };

    let sunrise = events.iter().find(|(_, up)| *up).map(|(jd, _)| local(*jd)).transpose()?;
    let sunset = events.iter().find(|(_, up)| !*up).map(|(jd, _)| local(*jd)).transpose()?;

    Ok(SunTimes {
        date,
        sunrise,
        sunset,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ephemeris::Analytic;
    use crate::time::parse_utc_offset;
    use chrono::Timelike;

    fn near(actual: &DateTime<FixedOffset>, hh: i64, mm: i64, tolerance_min: i64) {
        let minutes = actual.hour() as i64 * 60 + actual.minute() as i64;
        let diff = (minutes - (hh * 60 + mm)).abs();
        assert!(diff <= tolerance_min, "{} is {} minutes from {:02}:{:02}", actual, diff, hh, mm);
    }

    #[test]
    fn test_bangalore_january() {
        let location = GeoLocation::new(12.9716, 77.5946).unwrap();
        let offset = parse_utc_offset("+05:30").unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 1, 11).unwrap();
        let times = sunrise_sunset(&Analytic, &location, date, &offset).unwrap();

        near(times.sunrise.as_ref().unwrap(), 6, 45, 4);
        near(times.sunset.as_ref().unwrap(), 18, 10, 4);
        assert_eq!(times.sunrise.unwrap().date_naive(), date);
    }

    #[test]
    fn test_london_midsummer() {
        let location = GeoLocation::new(51.5074, -0.1278).unwrap();
        let offset = parse_utc_offset("+01:00").unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 6, 21).unwrap();
        let times = sunrise_sunset(&Analytic, &location, date, &offset).unwrap();

        near(times.sunrise.as_ref().unwrap(), 4, 43, 5);
        near(times.sunset.as_ref().unwrap(), 21, 21, 5);
        let length = times.day_length().unwrap();
        assert!(length.num_minutes() > 16 * 60 + 30);
    }

    #[test]
    fn test_polar_day_and_night() {
        let tromso = GeoLocation::new(69.6492, 18.9553).unwrap();
        let offset = parse_utc_offset("+01:00").unwrap();

        let midsummer = sunrise_sunset(&Analytic, &tromso, NaiveDate::from_ymd_opt(2025, 6, 21).unwrap(), &offset).unwrap();
        assert!(midsummer.sunrise.is_none());
        assert!(midsummer.sunset.is_none());

        let midwinter = sunrise_sunset(&Analytic, &tromso, NaiveDate::from_ymd_opt(2025, 12, 21).unwrap(), &offset).unwrap();
        assert!(midwinter.sunrise.is_none());
        assert!(midwinter.sunset.is_none());
        assert!(midwinter.day_length().is_none());
    }

    #[test]
    fn test_altitude_sign_flips_over_a_day() {
        let location = GeoLocation::new(0.0, 0.0).unwrap();
        let jd = JulianDate::new(2_460_000.5);
        let midnight = altitude_deg(&Analytic, Body::Sun, &location, jd);
        let noon = altitude_deg(&Analytic, Body::Sun, &location, jd.add_days(0.5));
        assert!(midnight < -50.0);
        assert!(noon > 50.0);
    }
}
