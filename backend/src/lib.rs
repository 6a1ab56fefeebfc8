//! Greedy, criteria-driven volunteer rota allocator.
//!
//! [`allocate`] takes an [`AllocationConfig`] describing a roster, their
//! availability and a run of shifts, and greedily fills each shift by repeatedly
//! picking the most urgent still-active volunteer group and the shift it best fits,
//! subject to a pluggable set of [`criteria::Criterion`] implementations that can
//! veto a group/shift pairing outright or just nudge the ranking.

mod allocate;
mod config;
pub mod criteria;
mod error;
mod init;
mod model;
mod ranking;
mod validate;

pub use allocate::{allocate, AllocationOutcome};
pub use config::{AllocationConfig, AvailabilityResponse, DateMatcher, ShiftOverride};
pub use error::ConfigError;
pub use model::{
    GroupId, HistoricalShift, RotaState, Shift, Volunteer, VolunteerGroup, VolunteerState,
};

#[cfg(test)]
mod tests;
