//! Small helpers shared across the crate.

pub mod counting;
pub mod strings;
