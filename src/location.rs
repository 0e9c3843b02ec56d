use serde::{Deserialize, Serialize};

use crate::error::{AstroError, Result};

/// Geographic location of an observer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    /// Degrees north, `-90..=90`.
    pub latitude: f64,
    /// Degrees east, `-180..=180`.
    pub longitude: f64,
    #[serde(default)]
    pub elevation_m: f64,
}

impl GeoLocation {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        Self::with_elevation(latitude, longitude, 0.0)
    }

    pub fn with_elevation(latitude: f64, longitude: f64, elevation_m: f64) -> Result<Self> {
        let location = Self {
            latitude,
            longitude,
            elevation_m,
        };
        location.validate()?;
        Ok(location)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(AstroError::InvalidLocation(format!(
                "latitude {} outside -90..=90",
                self.latitude
            )));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(AstroError::InvalidLocation(format!(
                "longitude {} outside -180..=180",
                self.longitude
            )));
        }
        if !self.elevation_m.is_finite() {
            return Err(AstroError::InvalidLocation("elevation is not finite".into()));
        }
        Ok(())
    }
}
