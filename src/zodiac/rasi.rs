use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::angle::{normalize_degree, DegMinSec};
use crate::error::{AstroError, Result};
use crate::zodiac::Planet;

/// Span of one rasi in degrees.
pub const RASI_SPAN: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rasi {
    Aries = 1,
    Taurus = 2,
    Gemini = 3,
    Cancer = 4,
    Leo = 5,
    Virgo = 6,
    Libra = 7,
    Scorpio = 8,
    Sagittarius = 9,
    Capricorn = 10,
    Aquarius = 11,
    Pisces = 12,
}

impl Rasi {
    pub const ALL: [Rasi; 12] = [
        Rasi::Aries,
        Rasi::Taurus,
        Rasi::Gemini,
        Rasi::Cancer,
        Rasi::Leo,
        Rasi::Virgo,
        Rasi::Libra,
        Rasi::Scorpio,
        Rasi::Sagittarius,
        Rasi::Capricorn,
        Rasi::Aquarius,
        Rasi::Pisces,
    ];

    pub fn number(&self) -> u8 {
        *self as u8
    }

    pub fn from_number(num: u8) -> Option<Rasi> {
        match num {
            1..=12 => Some(Self::ALL[(num - 1) as usize]),
            _ => None,
        }
    }

    /// The rasi containing a sidereal longitude; boundaries belong to the
    /// rasi that starts there.
    pub fn from_longitude(longitude: f64) -> Rasi {
        let index = (normalize_degree(longitude) / RASI_SPAN).floor() as usize;
        Self::ALL[index.min(11)]
    }

    pub fn name(&self) -> &'static str {
        RASIS[(self.number() - 1) as usize].name
    }

    pub fn symbol(&self) -> &'static str {
        RASIS[(self.number() - 1) as usize].symbol
    }

    /// Start of the rasi in degrees.
    pub fn start_degree(&self) -> f64 {
        (self.number() as f64 - 1.0) * RASI_SPAN
    }

    /// Rasi `count` signs further along the zodiac (negative goes back).
    pub fn offset(&self, count: i32) -> Rasi {
        let index = (self.number() as i32 - 1 + count).rem_euclid(12);
        Self::ALL[index as usize]
    }

    /// Planetary lord of the rasi.
    pub fn lord(&self) -> Planet {
        match self {
            Rasi::Aries | Rasi::Scorpio => Planet::Mars,
            Rasi::Taurus | Rasi::Libra => Planet::Venus,
            Rasi::Gemini | Rasi::Virgo => Planet::Mercury,
            Rasi::Cancer => Planet::Moon,
            Rasi::Leo => Planet::Sun,
            Rasi::Sagittarius | Rasi::Pisces => Planet::Jupiter,
            Rasi::Capricorn | Rasi::Aquarius => Planet::Saturn,
        }
    }

    /// South Indian chart layout: Pisces top-left, running clockwise. The
    /// four centre cells are empty.
    pub fn south_chart_grid() -> [[Option<Rasi>; 4]; 4] {
        use Rasi::*;
        [
            [Some(Pisces), Some(Aries), Some(Taurus), Some(Gemini)],
            [Some(Aquarius), None, None, Some(Cancer)],
            [Some(Capricorn), None, None, Some(Leo)],
            [Some(Sagittarius), Some(Scorpio), Some(Libra), Some(Virgo)],
        ]
    }

    pub fn to_list() -> Vec<&'static str> {
        Self::ALL.iter().map(|r| r.name()).collect()
    }
}

impl fmt::Display for Rasi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Rasi {
    type Err = AstroError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .find(|r| r.name().eq_ignore_ascii_case(wanted) || r.symbol().eq_ignore_ascii_case(wanted))
            .copied()
            .ok_or_else(|| AstroError::Parse(format!("unknown rasi: {}", s)))
    }
}

/// Static description of a rasi's extent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RasiSpan {
    pub rasi: Rasi,
    pub name: &'static str,
    pub symbol: &'static str,
    pub start: DegMinSec,
    pub end: DegMinSec,
}

pub static RASIS: Lazy<Vec<RasiSpan>> = Lazy::new(|| {
    const NAMES: [(&str, &str); 12] = [
        ("Aries", "Ar"),
        ("Taurus", "Ta"),
        ("Gemini", "Ge"),
        ("Cancer", "Cn"),
        ("Leo", "Le"),
        ("Virgo", "Vi"),
        ("Libra", "Li"),
        ("Scorpio", "Sc"),
        ("Sagittarius", "Sg"),
        ("Capricorn", "Cp"),
        ("Aquarius", "Aq"),
        ("Pisces", "Pi"),
    ];

    NAMES
        .iter()
        .enumerate()
        .map(|(idx, &(name, symbol))| {
            let start = idx as i32 * 30;
            RasiSpan {
                rasi: Rasi::ALL[idx],
                name,
                symbol,
                start: DegMinSec::new(start, 0, 0),
                end: DegMinSec::new(start + 29, 59, 59),
            }
        })
        .collect()
});

/// A rasi together with how far into it a position lies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RasiPlacement {
    pub span: RasiSpan,
    pub advanced_by: DegMinSec,
    pub advanced_by_deg: String,
}

/// Finds the rasi for a position given in degrees, minutes and seconds.
///
/// Works in whole arc-seconds so `94°19′0″` lands exactly `4°19′0″` into
/// Cancer. Returns `None` outside `0°0′0″..=359°59′59″`.
pub fn rasi_by_dms(dms: &DegMinSec) -> Option<RasiPlacement> {
    let position = dms.total_seconds();

    RASIS
        .iter()
        .find(|span| span.start.total_seconds() <= position && position <= span.end.total_seconds())
        .map(|span| {
            let advanced_by = DegMinSec::from_total_seconds(position - span.start.total_seconds());
            RasiPlacement {
                span: span.clone(),
                advanced_by,
                advanced_by_deg: advanced_by.format(),
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rasi_by_dms() {
        let placement = rasi_by_dms(&DegMinSec::new(94, 19, 0)).expect("rasi");
        assert_eq!(placement.span.name, RASIS[3].name);
        assert_eq!(placement.span.rasi, Rasi::Cancer);
        assert_eq!(placement.advanced_by_deg, "4°19′0″");
    }

    #[test]
    fn test_rasi_by_dms_bounds() {
        let first = rasi_by_dms(&DegMinSec::new(0, 0, 0)).expect("rasi");
        assert_eq!(first.span.rasi, Rasi::Aries);

        let last = rasi_by_dms(&DegMinSec::new(359, 59, 59)).expect("rasi");
        assert_eq!(last.span.rasi, Rasi::Pisces);
        assert_eq!(last.advanced_by, DegMinSec::new(29, 59, 59));

        assert!(rasi_by_dms(&DegMinSec::new(360, 0, 0)).is_none());
        assert!(rasi_by_dms(&DegMinSec::new(-1, 0, 0)).is_none());
    }

    #[test]
    fn test_from_longitude() {
        assert_eq!(Rasi::from_longitude(0.0), Rasi::Aries);
        assert_eq!(Rasi::from_longitude(30.0), Rasi::Taurus);
        assert_eq!(Rasi::from_longitude(359.999), Rasi::Pisces);
        assert_eq!(Rasi::from_longitude(-15.0), Rasi::Pisces);
    }

    #[test]
    fn test_offset_and_lord() {
        assert_eq!(Rasi::Pisces.offset(1), Rasi::Aries);
        assert_eq!(Rasi::Aries.offset(-1), Rasi::Pisces);
        assert_eq!(Rasi::Leo.lord(), Planet::Sun);
        assert_eq!(Rasi::Aquarius.lord(), Planet::Saturn);
    }

    #[test]
    fn test_south_chart_grid_covers_every_rasi_once() {
        let mut seen: Vec<Rasi> = Rasi::south_chart_grid()
            .iter()
            .flatten()
            .filter_map(|cell| *cell)
            .collect();
        seen.sort();
        assert_eq!(seen, Rasi::ALL.to_vec());
    }

    #[test]
    fn test_from_str() {
        assert_eq!("cancer".parse::<Rasi>().unwrap(), Rasi::Cancer);
        assert_eq!("Sg".parse::<Rasi>().unwrap(), Rasi::Sagittarius);
        assert!("ophiuchus".parse::<Rasi>().is_err());
    }
}
