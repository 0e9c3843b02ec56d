//! Wires configuration, settings and the ephemeris into chart-level
//! operations used by the CLI.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::ayanamsa::Ayanamsa;
use crate::chart::{build_kattams, render_south_chart, Kattam};
use crate::config::AppConfig;
use crate::dasha::{maha_dashas, maha_dashas_from_moon, running_chain, Dasha, DashaSystem};
use crate::ephemeris::{Analytic, Ephemeris, NodeKind};
use crate::error::{AstroError, Result};
use crate::locale::Locale;
use crate::location::GeoLocation;
use crate::positions::{sidereal_planet_positions, PlanetPosition};
use crate::retrograde::{find_retrograde_periods, retrograde_periods_for_all, RetrogradePeriod};
use crate::settings::{keys, SettingsStore};
use crate::sun::{sunrise_sunset, SunTimes};
use crate::time::parse_utc_offset;
use crate::zodiac::Planet;

/// A computed birth (or event) chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Horoscope {
    pub given_time: DateTime<Utc>,
    pub location: GeoLocation,
    pub ayanamsa: Ayanamsa,
    /// Ayanamsa in degrees at `given_time`.
    pub ayanamsa_value: f64,
    pub dasha_system: DashaSystem,
    /// Ascendant first, then the nine grahas.
    pub positions: Vec<PlanetPosition>,
    pub kattams: Vec<Kattam>,
    pub dashas: Vec<Dasha>,
}

impl Horoscope {
    pub fn position_of(&self, planet: Planet) -> Option<&PlanetPosition> {
        self.positions.iter().find(|p| p.planet == planet)
    }
}

/// Retrograde periods of one planet within a search window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrogradeReport {
    pub planet: Planet,
    pub retrograde_now: bool,
    pub periods: Vec<RetrogradePeriod>,
}

/// Entry point for chart computations. Dependencies are passed in so tests
/// can swap the ephemeris or point the store at a temporary database.
pub struct NdAstroService {
    config: AppConfig,
    settings: Arc<SettingsStore>,
    ephemeris: Arc<dyn Ephemeris>,
}

impl NdAstroService {
    pub fn new(config: AppConfig, settings: Arc<SettingsStore>, ephemeris: Arc<dyn Ephemeris>) -> Self {
        Self {
            config,
            settings,
            ephemeris,
        }
    }

    /// Opens the settings database (at `db_path` or the configured default),
    /// seeds missing defaults and uses the analytic ephemeris.
    pub fn open(config: AppConfig, db_path: Option<&Path>) -> Result<Self> {
        let path = db_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| config.settings_db_path());
        let settings = Arc::new(SettingsStore::open(&path)?);
        settings.seed_defaults()?;
        tracing::info!("using settings at {}", path.display());
        Ok(Self::new(config, settings, Arc::new(Analytic::new())))
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn settings(&self) -> &Arc<SettingsStore> {
        &self.settings
    }

    pub fn ephemeris(&self) -> &dyn Ephemeris {
        self.ephemeris.as_ref()
    }

    pub fn ayanamsa(&self) -> Result<Ayanamsa> {
        self.config.ayanamsa()
    }

    pub fn dasha_system(&self) -> DashaSystem {
        self.config.calculation.dasha_system
    }

    pub fn node_kind(&self) -> NodeKind {
        self.config.calculation.lunar_node
    }

    /// Display language from the `language` setting. Unknown values fall
    /// back to English.
    pub fn locale(&self) -> Result<Locale> {
        let code: Option<String> = self.settings.get(keys::LANGUAGE)?;
        Ok(match code {
            Some(code) => code.parse::<Locale>().unwrap_or_else(|e| {
                tracing::warn!("{}; falling back to English", e);
                Locale::default()
            }),
            None => Locale::default(),
        })
    }

    /// UTC offset from the `timezone` setting, else from the config.
    pub fn utc_offset(&self) -> Result<FixedOffset> {
        match self.settings.get::<String>(keys::TIMEZONE)? {
            Some(tz) => parse_utc_offset(&tz),
            None => self.config.utc_offset(),
        }
    }

    pub fn default_location(&self) -> Result<GeoLocation> {
        self.config.location()
    }

    pub fn positions(&self, datetime: &DateTime<Utc>, location: &GeoLocation) -> Result<Vec<PlanetPosition>> {
        sidereal_planet_positions(
            self.ephemeris(),
            location,
            datetime,
            &self.ayanamsa()?,
            self.node_kind(),
        )
    }

    /// Positions, kattams and maha dashas for `given_time` at `location`.
    /// `now` marks which dasha is running.
    pub fn horoscope(
        &self,
        given_time: &DateTime<Utc>,
        location: &GeoLocation,
        now: &DateTime<Utc>,
    ) -> Result<Horoscope> {
        let ayanamsa = self.ayanamsa()?;
        let positions = self.positions(given_time, location)?;
        let kattams = build_kattams(&positions)?;
        let dasha_system = self.dasha_system();
        let dashas = self.dashas_for(given_time, &positions, now, dasha_system)?;

        tracing::info!(
            "horoscope for {} at ({:.4}, {:.4})",
            given_time,
            location.latitude,
            location.longitude
        );
        Ok(Horoscope {
            given_time: *given_time,
            location: *location,
            ayanamsa,
            ayanamsa_value: ayanamsa.value_for(given_time),
            dasha_system,
            positions,
            kattams,
            dashas,
        })
    }

    /// Maha dashas anchored on the Moon's nakshatra. Systems whose table
    /// lacks the nakshatra lord start from birth instead.
    fn dashas_for(
        &self,
        birth: &DateTime<Utc>,
        positions: &[PlanetPosition],
        now: &DateTime<Utc>,
        system: DashaSystem,
    ) -> Result<Vec<Dasha>> {
        let moon = positions
            .iter()
            .find(|p| p.planet == Planet::Moon)
            .ok_or_else(|| AstroError::UnsupportedPlanet(Planet::Moon.code().to_string()))?;

        match maha_dashas_from_moon(birth, moon.nirayana_longitude, now, system) {
            Err(AstroError::UnableToDetermineDasha) => {
                tracing::debug!(
                    "{} has no period for {}; counting from birth",
                    system,
                    moon.natchaththiram.lord()
                );
                maha_dashas(birth, now, system)
            }
            other => other,
        }
    }

    /// One cycle of maha dashas for a birth chart.
    pub fn dasha_timeline(
        &self,
        birth: &DateTime<Utc>,
        location: &GeoLocation,
        now: &DateTime<Utc>,
        system: DashaSystem,
    ) -> Result<Vec<Dasha>> {
        let positions = self.positions(birth, location)?;
        self.dashas_for(birth, &positions, now, system)
    }

    /// Maha, antar and pratyantar dashas running at `now` for a birth chart.
    pub fn running_dasha(
        &self,
        birth: &DateTime<Utc>,
        location: &GeoLocation,
        now: &DateTime<Utc>,
        system: DashaSystem,
    ) -> Result<Vec<Dasha>> {
        let timeline = self.dasha_timeline(birth, location, now, system)?;
        let chain = running_chain(&timeline, system, now)?;
        if chain.is_empty() {
            return Err(AstroError::UnableToDetermineDasha);
        }
        Ok(chain)
    }

    /// Retrograde periods in `[start, end]`, for one planet or for every
    /// planet that can retrograde.
    pub fn retrograde_report(
        &self,
        start: &DateTime<Utc>,
        end: &DateTime<Utc>,
        location: &GeoLocation,
        planet: Option<Planet>,
    ) -> Result<Vec<RetrogradeReport>> {
        location.validate()?;
        let step = self.config.calculation.retrograde_step_days;
        let nodes = self.node_kind();
        let found = match planet {
            Some(planet) => vec![(
                planet,
                find_retrograde_periods(self.ephemeris(), start, end, planet, location, nodes, step)?,
            )],
            None => retrograde_periods_for_all(self.ephemeris(), start, end, location, nodes, step)?,
        };

        let reports: Vec<RetrogradeReport> = found
            .into_iter()
            .map(|(planet, periods)| RetrogradeReport {
                planet,
                retrograde_now: periods.iter().any(|p| p.contains(start)),
                periods,
            })
            .collect();
        tracing::info!(
            "found {} retrograde periods between {} and {}",
            reports.iter().map(|r| r.periods.len()).sum::<usize>(),
            start,
            end
        );
        Ok(reports)
    }

    pub fn sun_times(&self, location: &GeoLocation, date: NaiveDate) -> Result<SunTimes> {
        sunrise_sunset(self.ephemeris(), location, date, &self.utc_offset()?)
    }

    /// South Indian chart in the configured language.
    pub fn chart_text(&self, horoscope: &Horoscope) -> Result<String> {
        Ok(render_south_chart(&horoscope.kattams, self.locale()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn service() -> (TempDir, NdAstroService) {
        let dir = TempDir::new().unwrap();
        let service = NdAstroService::open(AppConfig::default(), Some(&dir.path().join("settings.db"))).unwrap();
        (dir, service)
    }

    fn chennai() -> GeoLocation {
        GeoLocation::new(13.0827, 80.2707).unwrap()
    }

    #[test]
    fn test_open_seeds_defaults() {
        let (_dir, service) = service();
        assert_eq!(service.locale().unwrap(), Locale::En);
        assert_eq!(service.utc_offset().unwrap().local_minus_utc(), 19_800);
    }

    #[test]
    fn test_locale_follows_language_setting() {
        let (_dir, service) = service();
        service.settings().set(keys::LANGUAGE, "ta").unwrap();
        assert_eq!(service.locale().unwrap(), Locale::Ta);

        service.settings().set(keys::LANGUAGE, "xx").unwrap();
        assert_eq!(service.locale().unwrap(), Locale::En);
    }

    #[test]
    fn test_horoscope() {
        let (_dir, service) = service();
        let birth = Utc.with_ymd_and_hms(2025, 1, 11, 10, 9, 20).unwrap();
        let now = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let horoscope = service.horoscope(&birth, &chennai(), &now).unwrap();

        assert_eq!(horoscope.positions.len(), 10);
        assert_eq!(horoscope.kattams.len(), 12);
        assert_eq!(horoscope.dashas.len(), 9);
        assert!(horoscope.dashas[0].start <= birth);
        assert_eq!(horoscope.dashas.iter().filter(|d| d.is_running).count(), 1);

        let moon = horoscope.position_of(Planet::Moon).unwrap();
        assert_eq!(horoscope.dashas[0].owner, moon.natchaththiram.lord());

        let text = service.chart_text(&horoscope).unwrap();
        assert!(text.contains("Sun"));
    }

    #[test]
    fn test_running_dasha_chain() {
        let (_dir, service) = service();
        let birth = Utc.with_ymd_and_hms(1990, 5, 17, 4, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let chain = service
            .running_dasha(&birth, &chennai(), &now, DashaSystem::Vimshottari)
            .unwrap();

        assert_eq!(chain.len(), 3);
        assert!(chain.iter().all(|d| d.contains(&now)));
        assert!(chain.windows(2).all(|w| w[0].dasha_type < w[1].dasha_type));
    }

    #[test]
    fn test_retrograde_report_for_one_planet() {
        let (_dir, service) = service();
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 12, 31, 0, 0, 0).unwrap();
        let reports = service
            .retrograde_report(&start, &end, &chennai(), Some(Planet::Mercury))
            .unwrap();

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].planet, Planet::Mercury);
        assert_eq!(reports[0].periods.len(), 3);
        assert!(!reports[0].retrograde_now);
    }

    #[test]
    fn test_sun_times_use_setting_offset() {
        let (_dir, service) = service();
        let bangalore = GeoLocation::new(12.9716, 77.5946).unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 1, 11).unwrap();
        let times = service.sun_times(&bangalore, date).unwrap();
        let sunrise = times.sunrise.unwrap();
        assert_eq!(sunrise.offset().local_minus_utc(), 19_800);
        assert_eq!(sunrise.date_naive(), date);
    }
}
