//! Dasha (planetary period) systems and timelines.
//!
//! A year in every system here is 365 days.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::angle::normalize_degree;
use crate::error::{AstroError, Result};
use crate::zodiac::{nakshatra_and_pada, Planet, NAKSHATRA_SPAN};

const DAYS_PER_YEAR: i64 = 365;
const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DashaSystem {
    #[default]
    Vimshottari = 1,
    Ashtottari = 2,
    Kalachakra = 3,
}

impl DashaSystem {
    pub const ALL: [DashaSystem; 3] = [
        DashaSystem::Vimshottari,
        DashaSystem::Ashtottari,
        DashaSystem::Kalachakra,
    ];

    pub fn detail(&self) -> DashaDetail {
        match self {
            DashaSystem::Vimshottari => DashaDetail {
                name: "Vimshottari".to_string(),
                description: "A widely used dasha system in Vedic astrology based on a 120-year cycle."
                    .to_string(),
                dasha_system: *self,
                cycle_years: 120,
                planets_period: vec![
                    (Planet::Kethu, 7),
                    (Planet::Venus, 20),
                    (Planet::Sun, 6),
                    (Planet::Moon, 10),
                    (Planet::Mars, 7),
                    (Planet::Rahu, 18),
                    (Planet::Jupiter, 16),
                    (Planet::Saturn, 19),
                    (Planet::Mercury, 17),
                ],
            },
            DashaSystem::Ashtottari => DashaDetail {
                name: "Ashtottari".to_string(),
                description:
                    "A dasha system based on a 108-year cycle, used in specific astrological contexts."
                        .to_string(),
                dasha_system: *self,
                cycle_years: 108,
                planets_period: vec![
                    (Planet::Kethu, 7),
                    (Planet::Venus, 20),
                    (Planet::Sun, 6),
                    (Planet::Moon, 10),
                    (Planet::Mars, 7),
                    (Planet::Rahu, 18),
                    (Planet::Jupiter, 16),
                    (Planet::Saturn, 19),
                    (Planet::Mercury, 5),
                ],
            },
            DashaSystem::Kalachakra => DashaDetail {
                name: "Kalachakra".to_string(),
                description: "A complex dasha system based on the Kalachakra mandala.".to_string(),
                dasha_system: *self,
                cycle_years: 28,
                planets_period: vec![
                    (Planet::Moon, 1),
                    (Planet::Mars, 2),
                    (Planet::Mercury, 3),
                    (Planet::Venus, 4),
                    (Planet::Jupiter, 5),
                    (Planet::Sun, 6),
                    (Planet::Saturn, 7),
                ],
            },
        }
    }
}

impl fmt::Display for DashaSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DashaSystem::Vimshottari => "Vimshottari",
            DashaSystem::Ashtottari => "Ashtottari",
            DashaSystem::Kalachakra => "Kalachakra",
        };
        f.write_str(name)
    }
}

impl TryFrom<u8> for DashaSystem {
    type Error = AstroError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(DashaSystem::Vimshottari),
            2 => Ok(DashaSystem::Ashtottari),
            3 => Ok(DashaSystem::Kalachakra),
            other => Err(AstroError::UnsupportedDashaSystem(other.to_string())),
        }
    }
}

impl FromStr for DashaSystem {
    type Err = AstroError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vimshottari" => Ok(DashaSystem::Vimshottari),
            "ashtottari" => Ok(DashaSystem::Ashtottari),
            "kalachakra" => Ok(DashaSystem::Kalachakra),
            other => match other.parse::<u8>() {
                Ok(num) => DashaSystem::try_from(num),
                Err(_) => Err(AstroError::UnsupportedDashaSystem(s.to_string())),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DashaType {
    #[default]
    Maha = 1,
    Antar = 2,
    Pratyantar = 3,
    Sookshma = 4,
}

impl DashaType {
    /// The next finer level, if any.
    pub fn sub(&self) -> Option<DashaType> {
        match self {
            DashaType::Maha => Some(DashaType::Antar),
            DashaType::Antar => Some(DashaType::Pratyantar),
            DashaType::Pratyantar => Some(DashaType::Sookshma),
            DashaType::Sookshma => None,
        }
    }
}

impl fmt::Display for DashaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DashaType::Maha => "Maha",
            DashaType::Antar => "Antar",
            DashaType::Pratyantar => "Pratyantar",
            DashaType::Sookshma => "Sookshma",
        };
        f.write_str(name)
    }
}

/// A dasha system's cycle and the ordered planet periods in years.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashaDetail {
    pub name: String,
    pub description: String,
    pub dasha_system: DashaSystem,
    pub cycle_years: u32,
    pub planets_period: Vec<(Planet, u32)>,
}

impl DashaDetail {
    pub fn period_of(&self, planet: Planet) -> Option<u32> {
        self.planets_period
            .iter()
            .find(|(p, _)| *p == planet)
            .map(|(_, years)| *years)
    }

    /// Planets in cycle order starting from `first`.
    fn order_from(&self, first: Planet) -> Vec<(Planet, u32)> {
        let start = self
            .planets_period
            .iter()
            .position(|(p, _)| *p == first)
            .unwrap_or(0);
        let len = self.planets_period.len();
        (0..len)
            .map(|i| self.planets_period[(start + i) % len])
            .collect()
    }

    /// Owner of the maha dasha running at `current` for someone born at
    /// `birth`, counting whole elapsed days (floored) modulo the cycle.
    pub fn running_planet(&self, birth: &DateTime<Utc>, current: &DateTime<Utc>) -> Result<Planet> {
        if self.planets_period.is_empty() {
            return Err(AstroError::MissingPlanetsPeriod);
        }
        let cycle_days = self.cycle_years as i64 * DAYS_PER_YEAR;
        if cycle_days == 0 {
            return Err(AstroError::UnableToDetermineDasha);
        }

        let total_days = (*current - *birth).num_seconds().div_euclid(SECONDS_PER_DAY);
        let position = total_days.rem_euclid(cycle_days);

        let mut elapsed = 0i64;
        for (planet, years) in &self.planets_period {
            let period_days = *years as i64 * DAYS_PER_YEAR;
            if elapsed + period_days > position {
                return Ok(*planet);
            }
            elapsed += period_days;
        }
        Err(AstroError::UnableToDetermineDasha)
    }
}

/// Planet ruling the maha dasha running at `current`.
pub fn find_running_dasha(
    birth: &DateTime<Utc>,
    current: &DateTime<Utc>,
    system: DashaSystem,
) -> Result<Planet> {
    system.detail().running_planet(birth, current)
}

/// One period in a dasha timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dasha {
    pub name: String,
    pub description: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub is_running: bool,
    pub dasha_type: DashaType,
    pub owner: Planet,
}

impl Dasha {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn contains(&self, at: &DateTime<Utc>) -> bool {
        self.start <= *at && *at < self.end
    }

    /// Time left until the period ends, negative once it has passed.
    pub fn remaining_period(&self, now: &DateTime<Utc>) -> Duration {
        self.end - *now
    }
}

impl fmt::Display for Dasha {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} - {}{}",
            self.owner,
            self.dasha_type,
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d"),
            if self.is_running { " *" } else { "" }
        )
    }
}

fn build_period(
    owner: Planet,
    dasha_type: DashaType,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    now: &DateTime<Utc>,
) -> Dasha {
    Dasha {
        name: format!("{} {}", owner, dasha_type),
        description: None,
        start,
        end,
        is_running: start <= *now && *now < end,
        dasha_type,
        owner,
    }
}

/// One full cycle of maha dashas starting at birth with the first planet
/// of the system's table.
pub fn maha_dashas(birth: &DateTime<Utc>, now: &DateTime<Utc>, system: DashaSystem) -> Result<Vec<Dasha>> {
    let detail = system.detail();
    if detail.planets_period.is_empty() {
        return Err(AstroError::MissingPlanetsPeriod);
    }

    let mut start = *birth;
    let mut periods = Vec::with_capacity(detail.planets_period.len());
    for (planet, years) in &detail.planets_period {
        let end = start + Duration::days(*years as i64 * DAYS_PER_YEAR);
        let mut dasha = build_period(*planet, DashaType::Maha, start, end, now);
        dasha.description = Some(format!("{} years of {}", years, detail.name));
        periods.push(dasha);
        start = end;
    }
    Ok(periods)
}

/// Maha dashas anchored on the Moon's nakshatra at birth: the nakshatra
/// lord's period runs first, reduced by the part of the nakshatra the Moon
/// has already crossed.
pub fn maha_dashas_from_moon(
    birth: &DateTime<Utc>,
    moon_longitude: f64,
    now: &DateTime<Utc>,
    system: DashaSystem,
) -> Result<Vec<Dasha>> {
    let detail = system.detail();
    if detail.planets_period.is_empty() {
        return Err(AstroError::MissingPlanetsPeriod);
    }

    let (nakshatra, _) = nakshatra_and_pada(moon_longitude);
    let lord = nakshatra.lord();
    let lord_years = detail.period_of(lord).ok_or(AstroError::UnableToDetermineDasha)?;

    let nakshatra_start = (nakshatra.number() - 1) as f64 * NAKSHATRA_SPAN;
    let traversed = ((normalize_degree(moon_longitude) - nakshatra_start) / NAKSHATRA_SPAN)
        .clamp(0.0, 1.0);
    let elapsed_seconds = (lord_years as f64 * DAYS_PER_YEAR as f64 * 86_400.0 * traversed) as i64;

    let mut start = *birth - Duration::seconds(elapsed_seconds);
    let mut periods = Vec::with_capacity(detail.planets_period.len());
    for (planet, years) in detail.order_from(lord) {
        let end = start + Duration::days(years as i64 * DAYS_PER_YEAR);
        let mut dasha = build_period(planet, DashaType::Maha, start, end, now);
        dasha.description = Some(format!("{} years of {}", years, detail.name));
        periods.push(dasha);
        start = end;
    }
    Ok(periods)
}

/// Splits `parent` into the next level of periods. Each planet takes a
/// share of the parent proportional to its maha period, starting from the
/// parent's owner.
pub fn sub_periods(parent: &Dasha, system: DashaSystem, now: &DateTime<Utc>) -> Result<Vec<Dasha>> {
    let detail = system.detail();
    if detail.planets_period.is_empty() {
        return Err(AstroError::MissingPlanetsPeriod);
    }
    let Some(sub_type) = parent.dasha_type.sub() else {
        return Ok(Vec::new());
    };

    let total_seconds = parent.duration().num_seconds() as f64;
    let cycle = detail.cycle_years as f64;
    let order = detail.order_from(parent.owner);
    let mut periods = Vec::with_capacity(order.len());
    let mut start = parent.start;
    for (idx, (planet, years)) in order.iter().enumerate() {
        let end = if idx + 1 == order.len() {
            parent.end
        } else {
            start + Duration::seconds((total_seconds * *years as f64 / cycle) as i64)
        };
        periods.push(build_period(*planet, sub_type, start, end, now));
        start = end;
    }
    Ok(periods)
}

/// Maha, antar and pratyantar periods running at `now`.
pub fn running_chain(timeline: &[Dasha], system: DashaSystem, now: &DateTime<Utc>) -> Result<Vec<Dasha>> {
    let mut chain = Vec::new();
    let mut current = timeline.iter().find(|d| d.contains(now)).cloned();
    while let Some(dasha) = current {
        let next = if dasha.dasha_type < DashaType::Pratyantar {
            sub_periods(&dasha, system, now)?
                .into_iter()
                .find(|d| d.contains(now))
        } else {
            None
        };
        chain.push(dasha);
        current = next;
    }
    Ok(chain)
}
