use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AstroError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Planet {
    Empty = -1,
    Ascendant = 0,
    Sun = 1,
    Moon = 2,
    Mars = 3,
    Mercury = 4,
    Jupiter = 5,
    Venus = 6,
    Saturn = 7,
    Rahu = 8,
    Kethu = 9,
}

impl Planet {
    /// The nine grahas, in the numeric order of the enum.
    pub const GRAHAS: [Planet; 9] = [
        Planet::Sun,
        Planet::Moon,
        Planet::Mars,
        Planet::Mercury,
        Planet::Jupiter,
        Planet::Venus,
        Planet::Saturn,
        Planet::Rahu,
        Planet::Kethu,
    ];

    pub fn number(&self) -> i32 {
        *self as i32
    }

    pub fn from_number(num: i32) -> Option<Planet> {
        match num {
            -1 => Some(Planet::Empty),
            0 => Some(Planet::Ascendant),
            n => Self::GRAHAS.get((n - 1) as usize).copied().filter(|_| n > 0),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Planet::Empty => "empty",
            Planet::Ascendant => "ascendant",
            Planet::Sun => "sun",
            Planet::Moon => "moon",
            Planet::Mars => "mars",
            Planet::Mercury => "mercury",
            Planet::Jupiter => "jupiter",
            Planet::Venus => "venus",
            Planet::Saturn => "saturn",
            Planet::Rahu => "rahu",
            Planet::Kethu => "kethu",
        }
    }

    pub fn short_name(&self) -> &'static str {
        match self {
            Planet::Empty => "",
            Planet::Ascendant => "La",
            Planet::Sun => "Su",
            Planet::Moon => "Mo",
            Planet::Mars => "Ma",
            Planet::Mercury => "Me",
            Planet::Jupiter => "Ju",
            Planet::Venus => "Ve",
            Planet::Saturn => "Sa",
            Planet::Rahu => "Ra",
            Planet::Kethu => "Ke",
        }
    }

    /// Sun and Moon never station; the ascendant is not a body.
    pub fn can_retrograde(&self) -> bool {
        !matches!(
            self,
            Planet::Sun | Planet::Moon | Planet::Ascendant | Planet::Empty
        )
    }

    pub fn is_node(&self) -> bool {
        matches!(self, Planet::Rahu | Planet::Kethu)
    }

    pub fn to_list() -> Vec<&'static str> {
        std::iter::once(Planet::Empty)
            .chain(std::iter::once(Planet::Ascendant))
            .chain(Self::GRAHAS)
            .map(|p| p.code())
            .collect()
    }
}

impl fmt::Display for Planet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = self.code();
        let mut chars = code.chars();
        match chars.next() {
            Some(first) => write!(f, "{}{}", first.to_ascii_uppercase(), chars.as_str()),
            None => Ok(()),
        }
    }
}

impl FromStr for Planet {
    type Err = AstroError;

    fn from_str(s: &str) -> Result<Self> {
        let lowered = s.trim().to_ascii_lowercase();
        let planet = match lowered.as_str() {
            "empty" => Planet::Empty,
            "ascendant" | "lagna" | "lagnam" => Planet::Ascendant,
            "sun" => Planet::Sun,
            "moon" => Planet::Moon,
            "mars" => Planet::Mars,
            "mercury" => Planet::Mercury,
            "jupiter" => Planet::Jupiter,
            "venus" => Planet::Venus,
            "saturn" => Planet::Saturn,
            "rahu" => Planet::Rahu,
            "kethu" | "ketu" => Planet::Kethu,
            _ => return Err(AstroError::Parse(format!("unknown planet: {}", s))),
        };
        Ok(planet)
    }
}
