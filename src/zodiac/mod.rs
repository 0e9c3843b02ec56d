//! Zodiac vocabulary: grahas, rasis, houses and nakshatras.

pub mod house;
pub mod nakshatra;
pub mod planet;
pub mod rasi;

pub use house::House;
pub use nakshatra::{nakshatra_and_pada, Nakshatra, NAKSHATRA_SPAN};
pub use planet::Planet;
pub use rasi::{rasi_by_dms, Rasi, RasiPlacement, RasiSpan, RASIS, RASI_SPAN};
