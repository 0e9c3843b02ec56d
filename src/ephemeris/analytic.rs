//! Closed-form ephemeris from mean orbital elements of date.
//!
//! Elements and periodic terms follow Paul Schlyter's "How to compute
//! planetary positions". Accuracy is about one arcminute for the Sun and
//! planets and a few arcminutes for the Moon between 1800 and 2200, well
//! inside a nakshatra pada. Light-time and aberration are not applied.

use crate::ephemeris::{Body, EclipticPosition, Ephemeris, EARTH_RADIUS_AU};
use crate::time::JulianDate;

/// Day zero of the element polynomials: 1999-12-31 0h TT.
const EPOCH: f64 = 2_451_543.5;

#[derive(Debug, Default, Clone, Copy)]
pub struct Analytic;

impl Analytic {
    pub fn new() -> Self {
        Analytic
    }
}

/// Orbital elements in degrees; `semi_major` in AU (Earth radii for the Moon).
#[derive(Debug, Clone, Copy)]
struct Elements {
    node: f64,
    inclination: f64,
    perihelion: f64,
    semi_major: f64,
    eccentricity: f64,
    mean_anomaly: f64,
}

fn elements(body: Body, d: f64) -> Elements {
    match body {
        Body::Sun => Elements {
            node: 0.0,
            inclination: 0.0,
            perihelion: 282.9404 + 4.70935e-5 * d,
            semi_major: 1.0,
            eccentricity: 0.016709 - 1.151e-9 * d,
            mean_anomaly: 356.0470 + 0.985_600_258_5 * d,
        },
        Body::Moon => Elements {
            node: 125.1228 - 0.052_953_808_3 * d,
            inclination: 5.1454,
            perihelion: 318.0634 + 0.164_357_322_3 * d,
            semi_major: 60.2666,
            eccentricity: 0.054900,
            mean_anomaly: 115.3654 + 13.064_992_950_9 * d,
        },
        Body::Mercury => Elements {
            node: 48.3313 + 3.24587e-5 * d,
            inclination: 7.0047 + 5.00e-8 * d,
            perihelion: 29.1241 + 1.01444e-5 * d,
            semi_major: 0.387098,
            eccentricity: 0.205635 + 5.59e-10 * d,
            mean_anomaly: 168.6562 + 4.092_334_436_8 * d,
        },
        Body::Venus => Elements {
            node: 76.6799 + 2.46590e-5 * d,
            inclination: 3.3946 + 2.75e-8 * d,
            perihelion: 54.8910 + 1.38374e-5 * d,
            semi_major: 0.723330,
            eccentricity: 0.006773 - 1.302e-9 * d,
            mean_anomaly: 48.0052 + 1.602_130_224_4 * d,
        },
        Body::Mars => Elements {
            node: 49.5574 + 2.11081e-5 * d,
            inclination: 1.8497 - 1.78e-8 * d,
            perihelion: 286.5016 + 2.92961e-5 * d,
            semi_major: 1.523688,
            eccentricity: 0.093405 + 2.516e-9 * d,
            mean_anomaly: 18.6021 + 0.524_020_776_6 * d,
        },
        Body::Jupiter => Elements {
            node: 100.4542 + 2.76854e-5 * d,
            inclination: 1.3030 - 1.557e-7 * d,
            perihelion: 273.8777 + 1.64505e-5 * d,
            semi_major: 5.20256,
            eccentricity: 0.048498 + 4.469e-9 * d,
            mean_anomaly: 19.8950 + 0.083_085_300_1 * d,
        },
        Body::Saturn => Elements {
            node: 113.6634 + 2.38980e-5 * d,
            inclination: 2.4886 - 1.081e-7 * d,
            perihelion: 339.3939 + 2.97661e-5 * d,
            semi_major: 9.55475,
            eccentricity: 0.055546 - 9.499e-9 * d,
            mean_anomaly: 316.9670 + 0.033_444_228_2 * d,
        },
    }
}

/// Solves Kepler's equation by Newton iteration. Angles in radians.
fn eccentric_anomaly(mean_anomaly: f64, e: f64) -> f64 {
    let mut ea = mean_anomaly + e * mean_anomaly.sin() * (1.0 + e * mean_anomaly.cos());
    for _ in 0..30 {
        let delta = (ea - e * ea.sin() - mean_anomaly) / (1.0 - e * ea.cos());
        ea -= delta;
        if delta.abs() < 1e-12 {
            break;
        }
    }
    ea
}

/// Position in the orbit's reference frame: (longitude, latitude, radius).
fn orbit_position(el: &Elements) -> (f64, f64, f64) {
    let m = el.mean_anomaly.rem_euclid(360.0).to_radians();
    let e = el.eccentricity;
    let ea = eccentric_anomaly(m, e);

    let xv = el.semi_major * (ea.cos() - e);
    let yv = el.semi_major * (1.0 - e * e).sqrt() * ea.sin();
    let v = yv.atan2(xv);
    let r = (xv * xv + yv * yv).sqrt();

    let n = el.node.to_radians();
    let i = el.inclination.to_radians();
    let u = v + el.perihelion.to_radians();

    let x = r * (n.cos() * u.cos() - n.sin() * u.sin() * i.cos());
    let y = r * (n.sin() * u.cos() + n.cos() * u.sin() * i.cos());
    let z = r * u.sin() * i.sin();

    let lon = y.atan2(x).to_degrees();
    let lat = z.atan2((x * x + y * y).sqrt()).to_degrees();
    (lon, lat, r)
}

fn sin_deg(x: f64) -> f64 {
    x.to_radians().sin()
}

fn cos_deg(x: f64) -> f64 {
    x.to_radians().cos()
}

fn to_rect(lon: f64, lat: f64, r: f64) -> [f64; 3] {
    [
        r * cos_deg(lon) * cos_deg(lat),
        r * sin_deg(lon) * cos_deg(lat),
        r * sin_deg(lat),
    ]
}

fn from_rect(v: [f64; 3]) -> EclipticPosition {
    let [x, y, z] = v;
    EclipticPosition {
        longitude: y.atan2(x).to_degrees().rem_euclid(360.0),
        latitude: z.atan2((x * x + y * y).sqrt()).to_degrees(),
        distance_au: (x * x + y * y + z * z).sqrt(),
    }
}

fn sun(d: f64) -> EclipticPosition {
    let (lon, _, r) = orbit_position(&elements(Body::Sun, d));
    EclipticPosition {
        longitude: lon.rem_euclid(360.0),
        latitude: 0.0,
        distance_au: r,
    }
}

fn moon(d: f64) -> EclipticPosition {
    let el = elements(Body::Moon, d);
    let sun_el = elements(Body::Sun, d);
    let (mut lon, mut lat, mut r) = orbit_position(&el);

    let ms = sun_el.mean_anomaly;
    let mm = el.mean_anomaly;
    let sun_mean_lon = ms + sun_el.perihelion;
    let moon_mean_lon = mm + el.perihelion + el.node;
    let dd = moon_mean_lon - sun_mean_lon;
    let f = moon_mean_lon - el.node;

    lon += -1.274 * sin_deg(mm - 2.0 * dd)
        + 0.658 * sin_deg(2.0 * dd)
        - 0.186 * sin_deg(ms)
        - 0.059 * sin_deg(2.0 * mm - 2.0 * dd)
        - 0.057 * sin_deg(mm - 2.0 * dd + ms)
        + 0.053 * sin_deg(mm + 2.0 * dd)
        + 0.046 * sin_deg(2.0 * dd - ms)
        + 0.041 * sin_deg(mm - ms)
        - 0.035 * sin_deg(dd)
        - 0.031 * sin_deg(mm + ms)
        - 0.015 * sin_deg(2.0 * f - 2.0 * dd)
        + 0.011 * sin_deg(mm - 4.0 * dd);

    lat += -0.173 * sin_deg(f - 2.0 * dd)
        - 0.055 * sin_deg(mm - f - 2.0 * dd)
        - 0.046 * sin_deg(mm + f - 2.0 * dd)
        + 0.033 * sin_deg(f + 2.0 * dd)
        + 0.017 * sin_deg(2.0 * mm + f);

    r += -0.58 * cos_deg(mm - 2.0 * dd) - 0.46 * cos_deg(2.0 * dd);

    EclipticPosition {
        longitude: lon.rem_euclid(360.0),
        latitude: lat,
        distance_au: r * EARTH_RADIUS_AU,
    }
}

fn planet(body: Body, d: f64) -> EclipticPosition {
    let el = elements(body, d);
    let (mut lon, mut lat, r) = orbit_position(&el);

    let mj = elements(Body::Jupiter, d).mean_anomaly;
    let msat = elements(Body::Saturn, d).mean_anomaly;
    match body {
        Body::Jupiter => {
            lon += -0.332 * sin_deg(2.0 * mj - 5.0 * msat - 67.6)
                - 0.056 * sin_deg(2.0 * mj - 2.0 * msat + 21.0)
                + 0.042 * sin_deg(3.0 * mj - 5.0 * msat + 21.0)
                - 0.036 * sin_deg(mj - 2.0 * msat)
                + 0.022 * cos_deg(mj - msat)
                + 0.023 * sin_deg(2.0 * mj - 3.0 * msat + 52.0)
                - 0.016 * sin_deg(mj - 5.0 * msat - 69.0);
        }
        Body::Saturn => {
            lon += 0.812 * sin_deg(2.0 * mj - 5.0 * msat - 67.6)
                - 0.229 * cos_deg(2.0 * mj - 4.0 * msat - 2.0)
                + 0.119 * sin_deg(mj - 2.0 * msat - 3.0)
                + 0.046 * sin_deg(2.0 * mj - 6.0 * msat - 69.0)
                + 0.014 * sin_deg(mj - 3.0 * msat + 32.0);
            lat += -0.020 * cos_deg(2.0 * mj - 4.0 * msat - 2.0)
                + 0.018 * sin_deg(2.0 * mj - 6.0 * msat - 49.0);
        }
        _ => {}
    }

    let helio = to_rect(lon, lat, r);
    let earth_to_sun = sun(d);
    let sun_vec = to_rect(earth_to_sun.longitude, 0.0, earth_to_sun.distance_au);
    from_rect([
        helio[0] + sun_vec[0],
        helio[1] + sun_vec[1],
        helio[2] + sun_vec[2],
    ])
}

impl Ephemeris for Analytic {
    fn geocentric(&self, body: Body, jd_tt: JulianDate) -> EclipticPosition {
        let d = jd_tt.value() - EPOCH;
        match body {
            Body::Sun => sun(d),
            Body::Moon => moon(d),
            _ => planet(body, d),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::angle::angular_difference;

    fn lon_close(actual: f64, expected: f64, tolerance: f64) {
        let diff = angular_difference(expected, actual).abs();
        assert!(diff < tolerance, "longitude {} vs {} (diff {})", actual, expected, diff);
    }

    #[test]
    fn test_kepler_solution() {
        let m = 1.2_f64;
        let e = 0.2;
        let ea = eccentric_anomaly(m, e);
        assert!((ea - e * ea.sin() - m).abs() < 1e-12);
    }

    #[test]
    fn test_sun_true_longitude() {
        // 1992-10-13 0h TD: 199.90988 degrees, mean equinox of date
        let pos = Analytic.geocentric(Body::Sun, JulianDate::new(2_448_908.5));
        lon_close(pos.longitude, 199.909_88, 0.05);
        assert!((pos.distance_au - 0.99766).abs() < 0.001);
    }

    #[test]
    fn test_sun_at_march_equinox() {
        // 2024-03-20 03:06 UTC
        let jd = JulianDate::from_calendar(2024, 3, 20, 3.1).tt();
        let pos = Analytic.geocentric(Body::Sun, jd);
        lon_close(pos.longitude, 0.0, 0.05);
    }

    #[test]
    fn test_moon_position() {
        // 1992-04-12 0h TD: 133.16 degrees, -3.23 degrees, 368410 km
        let pos = Analytic.geocentric(Body::Moon, JulianDate::new(2_448_724.5));
        lon_close(pos.longitude, 133.162_655, 0.3);
        assert!((pos.latitude - -3.229_126).abs() < 0.2, "latitude {}", pos.latitude);
        let km = pos.distance_au * 149_597_870.7;
        assert!((km - 368_409.7).abs() / 368_409.7 < 0.02, "distance {}", km);
    }

    #[test]
    fn test_venus_position() {
        // 1992-12-20 0h TD: 313.08 degrees, -2.08 degrees, 0.911 AU
        let pos = Analytic.geocentric(Body::Venus, JulianDate::new(2_448_976.5));
        lon_close(pos.longitude, 313.081_02, 0.2);
        assert!((pos.latitude - -2.084_74).abs() < 0.2, "latitude {}", pos.latitude);
        assert!((pos.distance_au - 0.910_947).abs() < 0.01);
    }

    #[test]
    fn test_outer_planet_distances_are_plausible() {
        for offset in 0..40 {
            let jd = JulianDate::new(2_451_545.0 + offset as f64 * 173.0);
            let jupiter = Analytic.geocentric(Body::Jupiter, jd);
            let saturn = Analytic.geocentric(Body::Saturn, jd);
            assert!((3.9..6.5).contains(&jupiter.distance_au), "jupiter {}", jupiter.distance_au);
            assert!((7.9..11.2).contains(&saturn.distance_au), "saturn {}", saturn.distance_au);
        }
    }

    #[test]
    fn test_inner_planets_stay_near_the_sun() {
        for offset in 0..60 {
            let jd = JulianDate::new(2_451_545.0 + offset as f64 * 31.0);
            let sun = Analytic.geocentric(Body::Sun, jd).longitude;
            let mercury = Analytic.geocentric(Body::Mercury, jd).longitude;
            let venus = Analytic.geocentric(Body::Venus, jd).longitude;
            assert!(angular_difference(sun, mercury).abs() < 28.5);
            assert!(angular_difference(sun, venus).abs() < 47.5);
        }
    }
}
