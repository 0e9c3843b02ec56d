pub mod angle;
pub mod ayanamsa;
pub mod chart;
pub mod config;
pub mod dasha;
pub mod ephemeris;
pub mod error;
pub mod locale;
pub mod location;
pub mod positions;
pub mod retrograde;
pub mod search;
pub mod service;
pub mod settings;
pub mod sun;
pub mod time;
pub mod zodiac;

pub use angle::{normalize_degree, normalize_rasi, DegMinSec};
pub use ayanamsa::{lahiri_ayanamsa, Ayanamsa};
pub use chart::{build_kattams, render_south_chart, Kattam};
pub use config::AppConfig;
pub use dasha::{
    find_running_dasha, maha_dashas, maha_dashas_from_moon, running_chain, sub_periods, Dasha,
    DashaDetail, DashaSystem, DashaType,
};
pub use ephemeris::{Analytic, Body, EclipticPosition, Ephemeris, NodeKind};
pub use error::{AstroError, Result};
pub use locale::Locale;
pub use location::GeoLocation;
pub use positions::{
    planets_posited_in, sidereal_ascendant, sidereal_planet_positions, tropical_ascendant,
    tropical_planetary_positions, tropical_position_of, PlanetPosition, TropicalPosition,
};
pub use retrograde::{
    find_retrograde_periods, is_planet_in_retrograde, retrograde_periods_for_all, RetrogradePeriod,
};
pub use service::{Horoscope, NdAstroService, RetrogradeReport};
pub use settings::{ChangeListener, SettingChange, SettingsStore};
pub use sun::{sunrise_sunset, SunTimes};
pub use time::JulianDate;
pub use zodiac::{nakshatra_and_pada, House, Nakshatra, Planet, Rasi};
