use std::collections::HashSet;

use crate::criteria::{Criterion, ShiftValidationError};
use crate::model::{GroupId, RotaState};

const CORE_INVARIANT: &str = "CoreInvariant";

/// Runs every criterion's validator against the finished state and collects groups
/// that never reached their own allocation cap.
pub(crate) fn build_report(
    state: &RotaState,
    criteria: &[Box<dyn Criterion>],
) -> (Vec<ShiftValidationError>, Vec<GroupId>) {
    let mut errors = check_core_invariants(state);
    for c in criteria {
        errors.extend(c.validate_rota_state(state));
    }

    let max_allocation_count = state.max_allocation_count();
    let underutilized = state
        .groups
        .iter()
        .filter(|g| {
            !g.allocated_shift_indices.is_empty() && g.allocated_shift_indices.len() < g.allocation_cap(max_allocation_count)
        })
        .map(|g| g.id)
        .collect();

    (errors, underutilized)
}

/// Structural checks independent of any one criterion: arena consistency, closed-shift
/// emptiness, per-group caps and the male-count bookkeeping invariant.
fn check_core_invariants(state: &RotaState) -> Vec<ShiftValidationError> {
    let mut errors = Vec::new();
    let max_allocation_count = state.max_allocation_count();

    for group in &state.groups {
        let cap = group.allocation_cap(max_allocation_count);
        if group.allocated_shift_indices.len() > cap {
            push_error(
                &mut errors,
                state,
                group.allocated_shift_indices.first().copied(),
                format!(
                    "group `{}` has {} allocation(s), exceeding its cap of {cap}",
                    group.group_key,
                    group.allocated_shift_indices.len(),
                ),
            );
        }
        for &idx in &group.allocated_shift_indices {
            if !group.available_shift_indices.contains(&idx) {
                push_error(
                    &mut errors,
                    state,
                    Some(idx),
                    format!("group `{}` allocated to unavailable shift {idx}", group.group_key),
                );
            }
        }
    }

    for shift in &state.shifts {
        if shift.closed {
            if !shift.allocated_groups.is_empty() || shift.team_lead.is_some() || !shift.custom_preallocations.is_empty() {
                errors.push(ShiftValidationError {
                    shift_index: shift.index,
                    shift_date: shift.date,
                    criterion_name: CORE_INVARIANT,
                    description: "closed shift carries non-empty allocations".to_string(),
                });
            }
            continue;
        }

        let mut seen = HashSet::new();
        for group_id in &shift.allocated_groups {
            if !seen.insert(*group_id) {
                errors.push(ShiftValidationError {
                    shift_index: shift.index,
                    shift_date: shift.date,
                    criterion_name: CORE_INVARIANT,
                    description: format!("group {:?} allocated to shift {} more than once", group_id, shift.index),
                });
            }
            let group = state.group(*group_id);
            if !group.allocated_shift_indices.contains(&shift.index) {
                errors.push(ShiftValidationError {
                    shift_index: shift.index,
                    shift_date: shift.date,
                    criterion_name: CORE_INVARIANT,
                    description: format!(
                        "shift {} lists group `{}` but the group has no matching allocation",
                        shift.index, group.group_key
                    ),
                });
            }
        }

        let expected_male_count: u32 = shift.allocated_groups.iter().map(|id| state.group(*id).male_count).sum();
        if shift.male_count != expected_male_count {
            errors.push(ShiftValidationError {
                shift_index: shift.index,
                shift_date: shift.date,
                criterion_name: CORE_INVARIANT,
                description: format!(
                    "shift male_count {} does not match the sum over allocated groups ({expected_male_count})",
                    shift.male_count
                ),
            });
        }
    }

    errors
}

fn push_error(errors: &mut Vec<ShiftValidationError>, state: &RotaState, shift_index: Option<usize>, description: String) {
    let (shift_index, shift_date) = match shift_index.and_then(|idx| state.shifts.get(idx)) {
        Some(shift) => (shift.index, shift.date),
        None => (0, state.shifts[0].date),
    };
    errors.push(ShiftValidationError {
        shift_index,
        shift_date,
        criterion_name: CORE_INVARIANT,
        description,
    });
}
