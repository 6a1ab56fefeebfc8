use thiserror::Error;

/// Failures that stop [`crate::allocate`] before it produces a state to inspect.
///
/// These are all detected during initialisation, before the allocation loop runs a
/// single step; an unsatisfiable-but-structurally-sound input is never an `Err` here
/// (it comes back as an [`crate::AllocationOutcome`] with `success = false` instead).
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("shift count must be positive, got {0}")]
    NonPositiveShiftCount(usize),

    #[error("group `{group_key}` has {count} team leads, at most one is allowed")]
    MultipleTeamLeads { group_key: String, count: usize },

    #[error("no valid volunteer groups: every volunteer either did not respond or has no available shift")]
    NoValidVolunteerGroups,

    #[error("pre-allocated volunteer id `{0}` was not found in the volunteer roster")]
    PreallocatedVolunteerNotFound(String),

    #[error("pre-allocated team lead id `{0}` was not found, or is not marked as a team lead")]
    PreallocatedTeamLeadInvalid(String),
}
