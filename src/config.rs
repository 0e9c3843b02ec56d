//! Application configuration loaded from `ndastro.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::ayanamsa::Ayanamsa;
use crate::dasha::DashaSystem;
use crate::ephemeris::NodeKind;
use crate::error::{AstroError, Result};
use crate::location::GeoLocation;
use crate::search::MIN_STEP_DAYS;
use crate::time::parse_utc_offset;

pub const CONFIG_FILE_NAME: &str = "ndastro.toml";
pub const SETTINGS_DB_NAME: &str = "settings.db";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub observer: ObserverSection,
    #[serde(default)]
    pub calculation: CalculationSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSection {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_author")]
    pub author: String,
    /// Defaults to `~/.nd_astro`.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

/// Default observer used when a command does not name a place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObserverSection {
    #[serde(default = "default_latitude")]
    pub latitude: f64,
    #[serde(default = "default_longitude")]
    pub longitude: f64,
    #[serde(default)]
    pub elevation_m: f64,
    /// Fixed UTC offset such as `+05:30`.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationSection {
    /// `lahiri` or a fixed number of degrees.
    #[serde(default = "default_ayanamsa")]
    pub ayanamsa: String,
    #[serde(default)]
    pub dasha_system: DashaSystem,
    #[serde(default)]
    pub lunar_node: NodeKind,
    #[serde(default = "default_retrograde_step_days")]
    pub retrograde_step_days: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSection {
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_app_name() -> String {
    "ND Astro".to_string()
}

fn default_author() -> String {
    "Jaganathan, B".to_string()
}

fn default_latitude() -> f64 {
    12.59
}

fn default_longitude() -> f64 {
    77.35
}

fn default_timezone() -> String {
    "+05:30".to_string()
}

fn default_ayanamsa() -> String {
    "lahiri".to_string()
}

fn default_retrograde_step_days() -> f64 {
    crate::retrograde::DEFAULT_STEP_DAYS
}

fn default_log_filter() -> String {
    "ndastro=info".to_string()
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            author: default_author(),
            data_dir: None,
        }
    }
}

impl Default for ObserverSection {
    fn default() -> Self {
        Self {
            latitude: default_latitude(),
            longitude: default_longitude(),
            elevation_m: 0.0,
            timezone: default_timezone(),
        }
    }
}

impl Default for CalculationSection {
    fn default() -> Self {
        Self {
            ayanamsa: default_ayanamsa(),
            dasha_system: DashaSystem::default(),
            lunar_node: NodeKind::default(),
            retrograde_step_days: default_retrograde_step_days(),
        }
    }
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl AppConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            AstroError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content)
            .map_err(|e| AstroError::Config(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `./ndastro.toml`, then `<data_dir>/ndastro.toml`, falling back
    /// to built-in defaults when neither exists.
    pub fn from_default_location() -> Result<Self> {
        let defaults = Self::default();
        let search_paths = [
            PathBuf::from(CONFIG_FILE_NAME),
            defaults.data_dir().join(CONFIG_FILE_NAME),
        ];

        for path in search_paths {
            if path.exists() {
                tracing::debug!("loading config from {}", path.display());
                return Self::from_file(&path);
            }
        }
        Ok(defaults)
    }

    /// Explicit path if given, otherwise [`AppConfig::from_default_location`].
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => Self::from_default_location(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.location()?;
        self.utc_offset()?;
        self.ayanamsa()?;
        let step = self.calculation.retrograde_step_days;
        if !(step.is_finite() && (MIN_STEP_DAYS..=30.0).contains(&step)) {
            return Err(AstroError::Config(format!(
                "retrograde_step_days must be between one second and 30 days, got {}",
                step
            )));
        }
        Ok(())
    }

    /// Directory holding the settings database, `~/.nd_astro` unless
    /// configured. The default name is the app name, lower-cased with
    /// spaces turned into underscores.
    pub fn data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.app.data_dir {
            return dir.clone();
        }
        let folder = format!(".{}", self.app.name.to_lowercase().replace(' ', "_"));
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(folder)
    }

    pub fn settings_db_path(&self) -> PathBuf {
        self.data_dir().join(SETTINGS_DB_NAME)
    }

    pub fn location(&self) -> Result<GeoLocation> {
        GeoLocation::with_elevation(
            self.observer.latitude,
            self.observer.longitude,
            self.observer.elevation_m,
        )
    }

    pub fn utc_offset(&self) -> Result<FixedOffset> {
        parse_utc_offset(&self.observer.timezone)
    }

    pub fn ayanamsa(&self) -> Result<Ayanamsa> {
        self.calculation.ayanamsa.parse()
    }
}
