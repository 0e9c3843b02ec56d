//! Tropical and sidereal (nirayana) positions of the grahas and the lagna.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::angle::{normalize_degree, DegMinSec};
use crate::ayanamsa::Ayanamsa;
use crate::ephemeris::{lunar_node, Body, Ephemeris, NodeKind};
use crate::error::{AstroError, Result};
use crate::retrograde::is_retrograde_at;
use crate::time::{gmst_hours, mean_obliquity_deg, JulianDate};
use crate::zodiac::{nakshatra_and_pada, rasi_by_dms, House, Nakshatra, Planet, Rasi};

pub use crate::location::GeoLocation;

/// Tropical ecliptic coordinates of one planet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TropicalPosition {
    pub planet: Planet,
    pub longitude: f64,
    pub latitude: f64,
    pub distance_au: f64,
}

/// Everything a chart needs to know about one planet or the ascendant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetPosition {
    pub name: String,
    pub short_name: String,
    pub planet: Planet,
    pub latitude: f64,
    /// Tropical longitude.
    pub longitude: f64,
    pub distance_au: f64,
    pub nirayana_longitude: f64,
    pub rasi_occupied: Rasi,
    pub house_posited_at: House,
    pub advanced_by: DegMinSec,
    pub retrograde: bool,
    pub is_ascendant: bool,
    pub natchaththiram: Nakshatra,
    pub paatham: u8,
}

impl PlanetPosition {
    fn build(tropical: TropicalPosition, ayanamsa: f64, retrograde: bool) -> Self {
        let nirayana = normalize_degree(tropical.longitude - ayanamsa);
        let (rasi, advanced_by) = sidereal_placement(nirayana);
        let (natchaththiram, paatham) = nakshatra_and_pada(nirayana);
        let planet = tropical.planet;

        Self {
            name: planet.to_string(),
            short_name: planet.short_name().to_string(),
            planet,
            latitude: tropical.latitude,
            longitude: tropical.longitude,
            distance_au: tropical.distance_au,
            nirayana_longitude: nirayana,
            rasi_occupied: rasi,
            house_posited_at: House::FIRST,
            advanced_by,
            retrograde,
            is_ascendant: planet == Planet::Ascendant,
            natchaththiram,
            paatham,
        }
    }
}

/// Rasi and the offset into it, both read off the position rounded to
/// whole arc-seconds so they never disagree.
fn sidereal_placement(nirayana: f64) -> (Rasi, DegMinSec) {
    let mut dms = DegMinSec::from_decimal(nirayana);
    if dms.total_seconds() >= 360 * 3600 {
        dms = DegMinSec::new(0, 0, 0);
    }
    match rasi_by_dms(&dms) {
        Some(placement) => (placement.span.rasi, placement.advanced_by),
        None => {
            let rasi = Rasi::from_longitude(nirayana);
            (rasi, DegMinSec::from_decimal(nirayana - rasi.start_degree()))
        }
    }
}

/// Tropical ascendant (lagna) in degrees for a UT Julian date.
pub fn ascendant_at(jd_ut: JulianDate, location: &GeoLocation) -> f64 {
    let lst = (gmst_hours(jd_ut) * 15.0 + location.longitude).to_radians();
    let obliquity = mean_obliquity_deg(jd_ut.tt()).to_radians();
    let lat = location.latitude.to_radians();

    let y = lst.cos();
    let x = -(lst.sin() * obliquity.cos() + lat.tan() * obliquity.sin());
    normalize_degree(y.atan2(x).to_degrees())
}

/// Tropical ascendant at a UTC instant.
pub fn tropical_ascendant(datetime: &DateTime<Utc>, location: &GeoLocation) -> f64 {
    ascendant_at(JulianDate::from_utc(datetime), location)
}

/// Tropical longitude of `planet` as a function of UT Julian date.
///
/// The planet is checked once so the returned closure is infallible.
pub fn longitude_fn<'a>(
    ephemeris: &'a dyn Ephemeris,
    planet: Planet,
    location: GeoLocation,
    nodes: NodeKind,
) -> Result<Box<dyn Fn(JulianDate) -> f64 + Send + Sync + 'a>> {
    match planet {
        Planet::Empty => Err(AstroError::UnsupportedPlanet(planet.code().to_string())),
        Planet::Ascendant => Ok(Box::new(move |jd: JulianDate| ascendant_at(jd, &location))),
        Planet::Rahu => Ok(Box::new(move |jd: JulianDate| lunar_node(jd.tt(), nodes).0)),
        Planet::Kethu => Ok(Box::new(move |jd: JulianDate| lunar_node(jd.tt(), nodes).1)),
        _ => {
            let body = Body::from_planet(planet)
                .ok_or_else(|| AstroError::UnsupportedPlanet(planet.code().to_string()))?;
            Ok(Box::new(move |jd: JulianDate| {
                ephemeris.topocentric(body, &location, jd).longitude
            }))
        }
    }
}

/// Tropical position of one planet seen from `location`.
pub fn tropical_position_of(
    ephemeris: &dyn Ephemeris,
    planet: Planet,
    location: &GeoLocation,
    datetime: &DateTime<Utc>,
    nodes: NodeKind,
) -> Result<TropicalPosition> {
    let jd = JulianDate::from_utc(datetime);
    match planet {
        Planet::Rahu | Planet::Kethu => {
            let (rahu, kethu) = lunar_nodes(datetime, nodes);
            Ok(if planet == Planet::Rahu { rahu } else { kethu })
        }
        Planet::Ascendant => Ok(TropicalPosition {
            planet,
            longitude: ascendant_at(jd, location),
            latitude: 0.0,
            distance_au: 0.0,
        }),
        _ => {
            let body = Body::from_planet(planet)
                .ok_or_else(|| AstroError::UnsupportedPlanet(planet.code().to_string()))?;
            let pos = ephemeris.topocentric(body, location, jd);
            Ok(TropicalPosition {
                planet,
                longitude: pos.longitude,
                latitude: pos.latitude,
                distance_au: pos.distance_au,
            })
        }
    }
}

/// Rahu and Kethu; Kethu sits opposite Rahu on the ecliptic.
pub fn lunar_nodes(datetime: &DateTime<Utc>, nodes: NodeKind) -> (TropicalPosition, TropicalPosition) {
    let jd_tt = JulianDate::from_utc(datetime).tt();
    let (rahu, kethu) = lunar_node(jd_tt, nodes);
    (
        TropicalPosition {
            planet: Planet::Rahu,
            longitude: rahu,
            latitude: 0.0,
            distance_au: 0.0,
        },
        TropicalPosition {
            planet: Planet::Kethu,
            longitude: kethu,
            latitude: 0.0,
            distance_au: 0.0,
        },
    )
}

/// The nine grahas in [`Planet::GRAHAS`] order.
pub fn tropical_planetary_positions(
    ephemeris: &dyn Ephemeris,
    location: &GeoLocation,
    datetime: &DateTime<Utc>,
    nodes: NodeKind,
) -> Result<Vec<TropicalPosition>> {
    Planet::GRAHAS
        .iter()
        .map(|planet| tropical_position_of(ephemeris, *planet, location, datetime, nodes))
        .collect()
}

/// Sidereal ascendant; it always occupies the first house.
pub fn sidereal_ascendant(
    datetime: &DateTime<Utc>,
    location: &GeoLocation,
    ayanamsa: &Ayanamsa,
) -> PlanetPosition {
    let tropical = TropicalPosition {
        planet: Planet::Ascendant,
        longitude: tropical_ascendant(datetime, location),
        latitude: 0.0,
        distance_au: 0.0,
    };
    PlanetPosition::build(tropical, ayanamsa.value_for(datetime), false)
}

/// Ascendant followed by the nine grahas, with houses counted from the
/// ascendant's rasi.
pub fn sidereal_planet_positions(
    ephemeris: &dyn Ephemeris,
    location: &GeoLocation,
    datetime: &DateTime<Utc>,
    ayanamsa: &Ayanamsa,
    nodes: NodeKind,
) -> Result<Vec<PlanetPosition>> {
    location.validate()?;
    let ayanamsa_value = ayanamsa.value_for(datetime);
    let jd = JulianDate::from_utc(datetime);

    let ascendant = sidereal_ascendant(datetime, location, ayanamsa);
    let asc_rasi = ascendant.rasi_occupied;

    let mut positions = Vec::with_capacity(10);
    positions.push(ascendant);

    for tropical in tropical_planetary_positions(ephemeris, location, datetime, nodes)? {
        let retrograde = tropical.planet.can_retrograde()
            && is_retrograde_at(ephemeris, tropical.planet, location, jd, nodes)?;
        let mut position = PlanetPosition::build(tropical, ayanamsa_value, retrograde);
        position.house_posited_at = House::from_rasis(asc_rasi, position.rasi_occupied);
        positions.push(position);
    }

    tracing::debug!(
        "computed {} sidereal positions for {} (ayanamsa {:.6})",
        positions.len(),
        datetime,
        ayanamsa_value
    );
    Ok(positions)
}

/// Positions lying in `rasi`, in input order.
pub fn planets_posited_in(rasi: Rasi, positions: &[PlanetPosition]) -> Vec<&PlanetPosition> {
    positions
        .iter()
        .filter(|p| p.rasi_occupied == rasi)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ephemeris::Analytic;
    use approx::assert_abs_diff_eq;
    use chrono::TimeZone;

    fn chennai() -> GeoLocation {
        GeoLocation::new(13.0827, 80.2707).unwrap()
    }

    #[test]
    fn test_ascendant_on_equator_at_zero_sidereal_time() {
        // LST 0h on the equator puts 0 Cancer on the eastern horizon
        let equator = GeoLocation::new(0.0, 0.0).unwrap();
        let mut jd = JulianDate::new(2_451_545.0);
        // step until GMST is within a few seconds of 0h
        let offset_hours = 24.0 - gmst_hours(jd);
        jd = jd.add_days(offset_hours / 24.0 / 1.002_737_909);
        assert_abs_diff_eq!(ascendant_at(jd, &equator), 90.0, epsilon = 0.05);
    }

    #[test]
    fn test_ascendant_advances_through_all_signs_in_a_day() {
        let location = chennai();
        let start = JulianDate::new(2_460_000.5);
        let mut seen = std::collections::HashSet::new();
        for step in 0..96 {
            let lon = ascendant_at(start.add_days(step as f64 / 96.0), &location);
            seen.insert(Rasi::from_longitude(lon));
        }
        assert_eq!(seen.len(), 12);
    }

    #[test]
    fn test_sidereal_placement_rounding() {
        let (rasi, advanced) = sidereal_placement(29.999_999_9);
        assert_eq!(rasi, Rasi::Taurus);
        assert_eq!(advanced, DegMinSec::new(0, 0, 0));

        let (rasi, advanced) = sidereal_placement(359.999_999_9);
        assert_eq!(rasi, Rasi::Aries);
        assert_eq!(advanced, DegMinSec::new(0, 0, 0));

        let (rasi, advanced) = sidereal_placement(94.0 + 19.0 / 60.0);
        assert_eq!(rasi, Rasi::Cancer);
        assert_eq!(advanced, DegMinSec::new(4, 19, 0));
    }

    #[test]
    fn test_nodes_are_opposite() {
        let dt = Utc.with_ymd_and_hms(2025, 1, 11, 10, 0, 0).unwrap();
        let (rahu, kethu) = lunar_nodes(&dt, NodeKind::Mean);
        assert_abs_diff_eq!(normalize_degree(kethu.longitude - rahu.longitude), 180.0, epsilon = 1e-9);
        assert_eq!(rahu.latitude, 0.0);
    }

    #[test]
    fn test_empty_is_rejected() {
        let dt = Utc.with_ymd_and_hms(2025, 1, 11, 10, 0, 0).unwrap();
        assert!(matches!(
            tropical_position_of(&Analytic, Planet::Empty, &chennai(), &dt, NodeKind::True),
            Err(AstroError::UnsupportedPlanet(_))
        ));
    }

    #[test]
    fn test_sidereal_positions_shape() {
        let dt = Utc.with_ymd_and_hms(2025, 1, 11, 10, 9, 20).unwrap();
        let positions =
            sidereal_planet_positions(&Analytic, &chennai(), &dt, &Ayanamsa::Lahiri, NodeKind::True).unwrap();

        assert_eq!(positions.len(), 10);
        assert!(positions[0].is_ascendant);
        assert_eq!(positions[0].house_posited_at, House::FIRST);
        assert!(!positions[0].retrograde);
        assert_eq!(positions[1].planet, Planet::Sun);
        assert_eq!(positions[9].planet, Planet::Kethu);

        // Sun in sidereal Sagittarius in mid January
        assert_eq!(positions[1].rasi_occupied, Rasi::Sagittarius);
        // Mars was retrograde in January 2025
        let mars = positions.iter().find(|p| p.planet == Planet::Mars).unwrap();
        assert!(mars.retrograde);

        for p in &positions {
            assert!((0.0..360.0).contains(&p.nirayana_longitude));
            assert_eq!(p.house_posited_at, House::from_rasis(positions[0].rasi_occupied, p.rasi_occupied));
            assert!((1..=4).contains(&p.paatham));
        }

        let rahu = positions.iter().find(|p| p.planet == Planet::Rahu).unwrap();
        let kethu = positions.iter().find(|p| p.planet == Planet::Kethu).unwrap();
        assert_eq!((rahu.house_posited_at.number() + 5) % 12 + 1, kethu.house_posited_at.number());
    }

    #[test]
    fn test_planets_posited_in() {
        let dt = Utc.with_ymd_and_hms(2025, 1, 11, 10, 9, 20).unwrap();
        let positions =
            sidereal_planet_positions(&Analytic, &chennai(), &dt, &Ayanamsa::Lahiri, NodeKind::True).unwrap();
        let total: usize = Rasi::ALL
            .iter()
            .map(|r| planets_posited_in(*r, &positions).len())
            .sum();
        assert_eq!(total, positions.len());
    }
}
