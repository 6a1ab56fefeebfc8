mod male_balance;
mod no_double_shifts;
mod shift_size;
mod shift_spread;
mod team_lead;

pub use male_balance::MaleBalance;
pub use no_double_shifts::NoDoubleShifts;
pub use shift_size::ShiftSize;
pub use shift_spread::ShiftSpread;
pub use team_lead::TeamLead;

use chrono::NaiveDate;
use serde::Serialize;

use crate::model::{RotaState, Shift, VolunteerGroup};

/// A single error surfaced against the final rota by one criterion's
/// [`Criterion::validate_rota_state`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShiftValidationError {
    pub shift_index: usize,
    pub shift_date: NaiveDate,
    pub criterion_name: &'static str,
    pub description: String,
}

/// A pluggable scheduling concern. Every group/shift decision the allocator makes
/// runs through every registered criterion: a veto from any one of them rules out a
/// shift for a group outright, and every non-vetoing criterion contributes to both
/// the group's rank and the group's affinity toward a given shift.
pub trait Criterion: std::fmt::Debug {
    fn name(&self) -> &'static str;

    /// Coefficient applied to [`Criterion::promote_group`] in the ranking formula.
    fn group_weight(&self) -> f64;

    /// Coefficient applied to [`Criterion::calculate_shift_affinity`].
    fn affinity_weight(&self) -> f64;

    /// How strongly this criterion wants `group` scheduled soon, independent of any
    /// particular shift. Expected range `[0, 1]`.
    fn promote_group(&self, state: &RotaState, group: &VolunteerGroup) -> f64;

    /// Hard veto: `false` rules the shift out for this group entirely, regardless of
    /// affinity.
    fn is_shift_valid(&self, state: &RotaState, group: &VolunteerGroup, shift: &Shift) -> bool;

    /// How well `group` fits `shift` specifically. Expected range `[0, 1]`; only
    /// consulted for shifts that already passed every criterion's
    /// [`Criterion::is_shift_valid`].
    fn calculate_shift_affinity(&self, state: &RotaState, group: &VolunteerGroup, shift: &Shift) -> f64;

    /// Post-hoc audit of the finished rota. Returns one error per violation found;
    /// an empty vec means this criterion is satisfied everywhere.
    fn validate_rota_state(&self, state: &RotaState) -> Vec<ShiftValidationError>;
}
