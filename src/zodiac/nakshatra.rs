use std::fmt;

use serde::{Deserialize, Serialize};

use crate::angle::normalize_degree;
use crate::zodiac::Planet;

/// Span of one nakshatra: 13°20′.
pub const NAKSHATRA_SPAN: f64 = 360.0 / 27.0;

/// The 27 lunar mansions (natchaththirams), Tamil naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Nakshatra {
    Aswinni = 1,
    Bharani,
    Kaarthikai,
    Roghini,
    Mirugasirisam,
    Thiruvaathirai,
    Punarpoosam,
    Poosam,
    Aayilyam,
    Magam,
    Pooram,
    Uththiram,
    Asththam,
    Chiththirai,
    Suvaathi,
    Visaagam,
    Anusham,
    Kettai,
    Moolam,
    Pooraadam,
    Uththiraadam,
    Thiruvonam,
    Avittam,
    Shathayam,
    Poorattaathi,
    Uththirattaathi,
    Revathi,
}

impl Nakshatra {
    pub const ALL: [Nakshatra; 27] = [
        Nakshatra::Aswinni,
        Nakshatra::Bharani,
        Nakshatra::Kaarthikai,
        Nakshatra::Roghini,
        Nakshatra::Mirugasirisam,
        Nakshatra::Thiruvaathirai,
        Nakshatra::Punarpoosam,
        Nakshatra::Poosam,
        Nakshatra::Aayilyam,
        Nakshatra::Magam,
        Nakshatra::Pooram,
        Nakshatra::Uththiram,
        Nakshatra::Asththam,
        Nakshatra::Chiththirai,
        Nakshatra::Suvaathi,
        Nakshatra::Visaagam,
        Nakshatra::Anusham,
        Nakshatra::Kettai,
        Nakshatra::Moolam,
        Nakshatra::Pooraadam,
        Nakshatra::Uththiraadam,
        Nakshatra::Thiruvonam,
        Nakshatra::Avittam,
        Nakshatra::Shathayam,
        Nakshatra::Poorattaathi,
        Nakshatra::Uththirattaathi,
        Nakshatra::Revathi,
    ];

    pub fn number(&self) -> u8 {
        *self as u8
    }

    pub fn from_number(num: u8) -> Option<Nakshatra> {
        match num {
            1..=27 => Some(Self::ALL[(num - 1) as usize]),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Nakshatra::Aswinni => "Aswinni",
            Nakshatra::Bharani => "Bharani",
            Nakshatra::Kaarthikai => "Kaarthikai",
            Nakshatra::Roghini => "Roghini",
            Nakshatra::Mirugasirisam => "Mirugasirisam",
            Nakshatra::Thiruvaathirai => "Thiruvaathirai",
            Nakshatra::Punarpoosam => "Punarpoosam",
            Nakshatra::Poosam => "Poosam",
            Nakshatra::Aayilyam => "Aayilyam",
            Nakshatra::Magam => "Magam",
            Nakshatra::Pooram => "Pooram",
            Nakshatra::Uththiram => "Uththiram",
            Nakshatra::Asththam => "Asththam",
            Nakshatra::Chiththirai => "Chiththirai",
            Nakshatra::Suvaathi => "Suvaathi",
            Nakshatra::Visaagam => "Visaagam",
            Nakshatra::Anusham => "Anusham",
            Nakshatra::Kettai => "Kettai",
            Nakshatra::Moolam => "Moolam",
            Nakshatra::Pooraadam => "Pooraadam",
            Nakshatra::Uththiraadam => "Uththiraadam",
            Nakshatra::Thiruvonam => "Thiruvonam",
            Nakshatra::Avittam => "Avittam",
            Nakshatra::Shathayam => "Shathayam",
            Nakshatra::Poorattaathi => "Poorattaathi",
            Nakshatra::Uththirattaathi => "Uththirattaathi",
            Nakshatra::Revathi => "Revathi",
        }
    }

    /// Vimshottari lord; the sequence Kethu..Mercury repeats three times.
    pub fn lord(&self) -> Planet {
        const LORDS: [Planet; 9] = [
            Planet::Kethu,
            Planet::Venus,
            Planet::Sun,
            Planet::Moon,
            Planet::Mars,
            Planet::Rahu,
            Planet::Jupiter,
            Planet::Saturn,
            Planet::Mercury,
        ];
        LORDS[(self.number() as usize - 1) % 9]
    }

    pub fn to_list() -> Vec<&'static str> {
        Self::ALL.iter().map(|n| n.name()).collect()
    }
}

impl fmt::Display for Nakshatra {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Nakshatra and pada (quarter, 1..=4) for a sidereal longitude.
///
/// The zodiac holds 108 padas of 3°20′ each; working in padas keeps exact
/// boundaries such as 30° from drifting across a float rounding edge.
pub fn nakshatra_and_pada(longitude: f64) -> (Nakshatra, u8) {
    let quarter = ((normalize_degree(longitude) * 108.0 / 360.0).floor() as usize).min(107);
    (Nakshatra::ALL[quarter / 4], (quarter % 4) as u8 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_nakshatra_and_pada() {
        let cases = [
            (5.0, Nakshatra::Aswinni, 2),
            (13.333_333_4, Nakshatra::Bharani, 1),
            (26.6667, Nakshatra::Kaarthikai, 1),
            (30.0, Nakshatra::Kaarthikai, 2),
            (359.4, Nakshatra::Revathi, 4),
            (180.0, Nakshatra::Chiththirai, 3),
            (270.0, Nakshatra::Uththiraadam, 2),
        ];

        for (degrees, expected, expected_pada) in cases {
            let (nakshatra, pada) = nakshatra_and_pada(degrees);
            assert_eq!(nakshatra, expected, "nakshatra at {}", degrees);
            assert_eq!(pada, expected_pada, "pada at {}", degrees);
        }
    }

    #[test]
    fn test_lords_cycle() {
        assert_eq!(Nakshatra::Aswinni.lord(), Planet::Kethu);
        assert_eq!(Nakshatra::Magam.lord(), Planet::Kethu);
        assert_eq!(Nakshatra::Revathi.lord(), Planet::Mercury);
        assert_eq!(Nakshatra::Roghini.lord(), Planet::Moon);
    }

    #[test]
    fn test_numbers() {
        assert_eq!(Nakshatra::Revathi.number(), 27);
        assert_eq!(Nakshatra::from_number(14), Some(Nakshatra::Chiththirai));
        assert_eq!(Nakshatra::from_number(0), None);
    }
}
