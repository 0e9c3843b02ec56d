use std::fmt;

use serde::{Deserialize, Serialize};

use crate::zodiac::Rasi;

/// A bhava counted from the ascendant's rasi, 1 through 12.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct House(u8);

impl House {
    pub const FIRST: House = House(1);

    pub fn new(num: u8) -> Option<House> {
        (1..=12).contains(&num).then_some(House(num))
    }

    pub fn number(&self) -> u8 {
        self.0
    }

    /// Whole-sign house of `rasi` for an ascendant in `ascendant`.
    pub fn from_rasis(ascendant: Rasi, rasi: Rasi) -> House {
        let distance = (rasi.number() as i32 - ascendant.number() as i32).rem_euclid(12);
        House(distance as u8 + 1)
    }
}

impl fmt::Display for House {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "House {}", self.0)
    }
}
