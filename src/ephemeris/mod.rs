//! Geocentric positions of the Sun, Moon and classical planets.
//!
//! Positions are tropical, referred to the mean ecliptic and equinox of date,
//! which is the frame the ayanamsa is defined against.

pub mod analytic;
pub mod nodes;

use serde::{Deserialize, Serialize};

use crate::location::GeoLocation;
use crate::time::{gmst_hours, mean_obliquity_deg, JulianDate};
use crate::zodiac::Planet;

pub use analytic::Analytic;
pub use nodes::{lunar_node, NodeKind};

/// Equatorial radius of the Earth in astronomical units.
pub const EARTH_RADIUS_AU: f64 = 6378.137 / 149_597_870.7;

/// Bodies an [`Ephemeris`] can place. The lunar nodes are not bodies; see
/// [`lunar_node`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Body {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
}

impl Body {
    pub const ALL: [Body; 7] = [
        Body::Sun,
        Body::Moon,
        Body::Mercury,
        Body::Venus,
        Body::Mars,
        Body::Jupiter,
        Body::Saturn,
    ];

    pub fn from_planet(planet: Planet) -> Option<Body> {
        match planet {
            Planet::Sun => Some(Body::Sun),
            Planet::Moon => Some(Body::Moon),
            Planet::Mercury => Some(Body::Mercury),
            Planet::Venus => Some(Body::Venus),
            Planet::Mars => Some(Body::Mars),
            Planet::Jupiter => Some(Body::Jupiter),
            Planet::Saturn => Some(Body::Saturn),
            _ => None,
        }
    }

    pub fn planet(&self) -> Planet {
        match self {
            Body::Sun => Planet::Sun,
            Body::Moon => Planet::Moon,
            Body::Mercury => Planet::Mercury,
            Body::Venus => Planet::Venus,
            Body::Mars => Planet::Mars,
            Body::Jupiter => Planet::Jupiter,
            Body::Saturn => Planet::Saturn,
        }
    }
}

/// Ecliptic coordinates in degrees plus distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EclipticPosition {
    /// `[0, 360)`
    pub longitude: f64,
    pub latitude: f64,
    pub distance_au: f64,
}

impl EclipticPosition {
    fn to_vector(self) -> [f64; 3] {
        let (lon, lat) = (self.longitude.to_radians(), self.latitude.to_radians());
        [
            self.distance_au * lat.cos() * lon.cos(),
            self.distance_au * lat.cos() * lon.sin(),
            self.distance_au * lat.sin(),
        ]
    }

    fn from_vector(v: [f64; 3]) -> Self {
        let [x, y, z] = v;
        let distance = (x * x + y * y + z * z).sqrt();
        Self {
            longitude: y.atan2(x).to_degrees().rem_euclid(360.0),
            latitude: z.atan2((x * x + y * y).sqrt()).to_degrees(),
            distance_au: distance,
        }
    }
}

/// Source of geocentric positions.
pub trait Ephemeris: Send + Sync {
    /// Geocentric position of `body` at a TT Julian date.
    fn geocentric(&self, body: Body, jd_tt: JulianDate) -> EclipticPosition;

    /// Position seen from `location` at a UTC instant.
    fn topocentric(&self, body: Body, location: &GeoLocation, jd_ut: JulianDate) -> EclipticPosition {
        let jd_tt = jd_ut.tt();
        let geocentric = self.geocentric(body, jd_tt);
        apply_parallax(&geocentric, location, jd_ut, jd_tt)
    }
}

/// Rotates ecliptic rectangular coordinates onto the equator (`sign = 1`)
/// or back (`sign = -1`).
fn rotate_x(v: [f64; 3], obliquity_rad: f64, sign: f64) -> [f64; 3] {
    let (s, c) = (sign * obliquity_rad).sin_cos();
    [v[0], v[1] * c - v[2] * s, v[1] * s + v[2] * c]
}

/// Right ascension and declination in degrees for an ecliptic position of
/// date.
pub fn to_equatorial(position: &EclipticPosition, jd_tt: JulianDate) -> (f64, f64) {
    let obliquity = mean_obliquity_deg(jd_tt).to_radians();
    let unit = EclipticPosition {
        distance_au: 1.0,
        ..*position
    };
    let [x, y, z] = rotate_x(unit.to_vector(), obliquity, 1.0);
    let ra = y.atan2(x).to_degrees().rem_euclid(360.0);
    let dec = z.atan2((x * x + y * y).sqrt()).to_degrees();
    (ra, dec)
}

/// Shifts a geocentric position to the observer's place on the Earth's
/// surface.
pub fn apply_parallax(
    geocentric: &EclipticPosition,
    location: &GeoLocation,
    jd_ut: JulianDate,
    jd_tt: JulianDate,
) -> EclipticPosition {
    let obliquity = mean_obliquity_deg(jd_tt).to_radians();
    let lat = location.latitude.to_radians();

    // observer's geocentric position on the reference ellipsoid (Meeus ch. 11)
    let flattening_ratio = 0.996_647_19;
    let u = (flattening_ratio * lat.tan()).atan();
    let height = location.elevation_m / 6_378_137.0;
    let rho_sin = flattening_ratio * u.sin() + height * lat.sin();
    let rho_cos = u.cos() + height * lat.cos();

    let lst = (gmst_hours(jd_ut) * 15.0 + location.longitude).to_radians();
    let observer = [
        EARTH_RADIUS_AU * rho_cos * lst.cos(),
        EARTH_RADIUS_AU * rho_cos * lst.sin(),
        EARTH_RADIUS_AU * rho_sin,
    ];

    let body = rotate_x(geocentric.to_vector(), obliquity, 1.0);
    let relative = [
        body[0] - observer[0],
        body[1] - observer[1],
        body[2] - observer[2],
    ];

    EclipticPosition::from_vector(rotate_x(relative, obliquity, -1.0))
}
