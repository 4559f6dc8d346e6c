//! Value objects

mod iso_week;

pub use iso_week::IsoWeek;
