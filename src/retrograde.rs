//! Retrograde detection and retrograde period search.

use chrono::{DateTime, Duration, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::angle::angular_difference;
use crate::ephemeris::{Ephemeris, NodeKind};
use crate::error::{AstroError, Result};
use crate::location::GeoLocation;
use crate::positions::longitude_fn;
use crate::search::find_discrete;
use crate::time::JulianDate;
use crate::zodiac::Planet;

/// Default sampling step of the period search, in days.
pub const DEFAULT_STEP_DAYS: f64 = 1.0;

/// A closed interval during which a planet moves backwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrogradePeriod {
    pub planet: Planet,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl RetrogradePeriod {
    pub fn contains(&self, at: &DateTime<Utc>) -> bool {
        self.start <= *at && *at <= self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// True when the longitude at `jd` lies behind the longitude one day
/// earlier. The difference is taken across the 0°/360° seam.
fn moved_backwards(longitude: &dyn Fn(JulianDate) -> f64, jd: JulianDate) -> bool {
    angular_difference(longitude(jd.add_days(-1.0)), longitude(jd)) < 0.0
}

/// Whether `planet` is moving backwards at a UT Julian date.
pub fn is_retrograde_at(
    ephemeris: &dyn Ephemeris,
    planet: Planet,
    location: &GeoLocation,
    jd_ut: JulianDate,
    nodes: NodeKind,
) -> Result<bool> {
    let longitude = longitude_fn(ephemeris, planet, *location, nodes)?;
    Ok(moved_backwards(longitude.as_ref(), jd_ut))
}

/// Whether `planet` is retrograde at `date`. Always false for the Sun, the
/// Moon, the ascendant and the empty marker.
pub fn is_planet_in_retrograde(
    ephemeris: &dyn Ephemeris,
    date: &DateTime<Utc>,
    planet: Planet,
    location: &GeoLocation,
    nodes: NodeKind,
) -> Result<bool> {
    if !planet.can_retrograde() {
        return Ok(false);
    }
    is_retrograde_at(ephemeris, planet, location, JulianDate::from_utc(date), nodes)
}

fn to_utc(jd: JulianDate) -> Result<DateTime<Utc>> {
    jd.to_utc()
        .ok_or_else(|| AstroError::Search(format!("julian date {} out of range", jd.value())))
}

/// Retrograde periods of `planet` overlapping `[start, end]`.
///
/// A period already running at `start` opens at `start`; one still running
/// at `end` closes at `end`. Planets that never retrograde yield nothing.
pub fn find_retrograde_periods(
    ephemeris: &dyn Ephemeris,
    start: &DateTime<Utc>,
    end: &DateTime<Utc>,
    planet: Planet,
    location: &GeoLocation,
    nodes: NodeKind,
    step_days: f64,
) -> Result<Vec<RetrogradePeriod>> {
    if end < start {
        return Err(AstroError::Search(format!("end {} precedes start {}", end, start)));
    }
    if !planet.can_retrograde() {
        return Ok(Vec::new());
    }

    let longitude = longitude_fn(ephemeris, planet, *location, nodes)?;
    let retrograde = |jd: JulianDate| moved_backwards(longitude.as_ref(), jd);

    let t0 = JulianDate::from_utc(start);
    let t1 = JulianDate::from_utc(end);
    let mut open: Option<DateTime<Utc>> = retrograde(t0).then_some(*start);
    let changes = find_discrete(t0, t1, step_days, retrograde)?;

    let mut periods = Vec::new();
    for (jd, now_retrograde) in changes {
        let at = to_utc(jd)?;
        match (now_retrograde, open.take()) {
            (true, None) => open = Some(at),
            (false, Some(opened)) => periods.push(RetrogradePeriod {
                planet,
                start: opened,
                end: at,
            }),
            (_, previous) => open = previous,
        }
    }
    if let Some(opened) = open {
        periods.push(RetrogradePeriod {
            planet,
            start: opened,
            end: *end,
        });
    }

    tracing::debug!(
        "{} retrograde periods for {} between {} and {}",
        periods.len(),
        planet,
        start,
        end
    );
    Ok(periods)
}

/// Retrograde periods for every planet that can retrograde, searched in
/// parallel. Results follow [`Planet::GRAHAS`] order.
pub fn retrograde_periods_for_all(
    ephemeris: &dyn Ephemeris,
    start: &DateTime<Utc>,
    end: &DateTime<Utc>,
    location: &GeoLocation,
    nodes: NodeKind,
    step_days: f64,
) -> Result<Vec<(Planet, Vec<RetrogradePeriod>)>> {
    Planet::GRAHAS
        .par_iter()
        .filter(|p| p.can_retrograde())
        .map(|planet| {
            find_retrograde_periods(ephemeris, start, end, *planet, location, nodes, step_days)
                .map(|periods| (*planet, periods))
        })
        .collect()
}
