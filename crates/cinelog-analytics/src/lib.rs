//! In-process analytics logic: trend gap-filling and keyword ranking.
//!
//! Deliberately store-free — everything here operates on plain values so the
//! dashboard math is testable without a database.

pub mod keywords;
pub mod trend;
