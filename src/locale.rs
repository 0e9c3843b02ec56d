//! Display names for the supported languages.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::dasha::{DashaSystem, DashaType};
use crate::error::{AstroError, Result};
use crate::zodiac::{House, Nakshatra, Planet, Rasi};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ta,
}

const TA_PLANETS: [&str; 11] = [
    "",
    "லக்னம்",
    "சூரியன்",
    "சந்திரன்",
    "செவ்வாய்",
    "புதன்",
    "குரு",
    "சுக்கிரன்",
    "சனி",
    "ராகு",
    "கேது",
];

const TA_RASIS: [&str; 12] = [
    "மேஷம்",
    "ரிஷபம்",
    "மிதுனம்",
    "கடகம்",
    "சிம்மம்",
    "கன்னி",
    "துலாம்",
    "விருச்சிகம்",
    "தனுசு",
    "மகரம்",
    "கும்பம்",
    "மீனம்",
];

const TA_NAKSHATRAS: [&str; 27] = [
    "அஸ்வினி",
    "பரணி",
    "கார்த்திகை",
    "ரோகிணி",
    "மிருகசீரிடம்",
    "திருவாதிரை",
    "புனர்பூசம்",
    "பூசம்",
    "ஆயில்யம்",
    "மகம்",
    "பூரம்",
    "உத்திரம்",
    "அஸ்தம்",
    "சித்திரை",
    "சுவாதி",
    "விசாகம்",
    "அனுஷம்",
    "கேட்டை",
    "மூலம்",
    "பூராடம்",
    "உத்திராடம்",
    "திருவோணம்",
    "அவிட்டம்",
    "சதயம்",
    "பூரட்டாதி",
    "உத்திரட்டாதி",
    "ரேவதி",
];

impl Locale {
    pub fn code(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Ta => "ta",
        }
    }

    pub fn supported() -> [Locale; 2] {
        [Locale::En, Locale::Ta]
    }

    pub fn planet(&self, planet: Planet) -> String {
        match self {
            Locale::En => planet.to_string(),
            Locale::Ta => TA_PLANETS[(planet.number() + 1) as usize].to_string(),
        }
    }

    pub fn rasi(&self, rasi: Rasi) -> String {
        match self {
            Locale::En => rasi.name().to_string(),
            Locale::Ta => TA_RASIS[(rasi.number() - 1) as usize].to_string(),
        }
    }

    pub fn nakshatra(&self, nakshatra: Nakshatra) -> String {
        match self {
            Locale::En => nakshatra.name().to_string(),
            Locale::Ta => TA_NAKSHATRAS[(nakshatra.number() - 1) as usize].to_string(),
        }
    }

    pub fn house(&self, house: House) -> String {
        match self {
            Locale::En => house.to_string(),
            Locale::Ta => format!("{} ஆம் வீடு", house.number()),
        }
    }

    pub fn dasha_system(&self, system: DashaSystem) -> String {
        match self {
            Locale::En => system.to_string(),
            Locale::Ta => match system {
                DashaSystem::Vimshottari => "விம்சோத்தரி".to_string(),
                DashaSystem::Ashtottari => "அஷ்டோத்தரி".to_string(),
                DashaSystem::Kalachakra => "காலசக்கர".to_string(),
            },
        }
    }

    pub fn dasha_type(&self, dasha_type: DashaType) -> String {
        match self {
            Locale::En => dasha_type.to_string(),
            Locale::Ta => match dasha_type {
                DashaType::Maha => "மகா தசை".to_string(),
                DashaType::Antar => "புக்தி".to_string(),
                DashaType::Pratyantar => "அந்தரம்".to_string(),
                DashaType::Sookshma => "சூட்சுமம்".to_string(),
            },
        }
    }
}

impl FromStr for Locale {
    type Err = AstroError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Locale::En),
            "ta" | "tamil" => Ok(Locale::Ta),
            other => Err(AstroError::Parse(format!("unsupported language: {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_names() {
        let en = Locale::En;
        assert_eq!(en.planet(Planet::Sun), "Sun");
        assert_eq!(en.rasi(Rasi::Scorpio), "Scorpio");
        assert_eq!(en.nakshatra(Nakshatra::Revathi), "Revathi");
    }

    #[test]
    fn test_tamil_tables_line_up() {
        let ta = Locale::Ta;
        assert_eq!(ta.planet(Planet::Empty), "");
        assert_eq!(ta.planet(Planet::Ascendant), "லக்னம்");
        assert_eq!(ta.planet(Planet::Kethu), "கேது");
        assert_eq!(ta.rasi(Rasi::Pisces), "மீனம்");
        assert_eq!(ta.nakshatra(Nakshatra::Aswinni), "அஸ்வினி");
    }

    #[test]
    fn test_from_str() {
        assert_eq!("TA".parse::<Locale>().unwrap(), Locale::Ta);
        assert!("fr".parse::<Locale>().is_err());
    }
}
