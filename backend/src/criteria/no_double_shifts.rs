use crate::model::{RotaState, Shift, VolunteerGroup};

use super::{Criterion, ShiftValidationError};

/// No group should work two adjacent shifts, including across the boundary with the
/// previous rota's last shift.
#[derive(Debug, Clone, Copy)]
pub struct NoDoubleShifts {
    pub group_weight: f64,
    pub affinity_weight: f64,
}

impl Default for NoDoubleShifts {
    fn default() -> Self {
        NoDoubleShifts {
            group_weight: 0.0,
            affinity_weight: 1.0,
        }
    }
}

impl NoDoubleShifts {
    pub fn new(group_weight: f64, affinity_weight: f64) -> Self {
        NoDoubleShifts {
            group_weight,
            affinity_weight,
        }
    }

    fn crosses_rota_boundary(state: &RotaState, group: &VolunteerGroup, shift_index: usize) -> bool {
        shift_index == 0
            && state
                .historical_shifts
                .last()
                .is_some_and(|h| h.allocated_group_keys.contains(&group.group_key))
    }

    /// Whether `idx` would remain a legal future placement for `group` given it has
    /// already been allocated to every shift in `allocated`.
    fn is_valid_given(allocated: &[usize], crosses_boundary_at_zero: bool, idx: usize) -> bool {
        !allocated.iter().any(|&a| a.abs_diff(idx) == 1) && !(idx == 0 && crosses_boundary_at_zero)
    }

    /// Count of `group`'s still-reachable shifts (available, not yet allocated, not
    /// vetoed by adjacency or the historical boundary), excluding `exclude`.
    fn reachable_count(group: &VolunteerGroup, allocated: &[usize], crosses_boundary_at_zero: bool, exclude: usize) -> usize {
        group
            .available_shift_indices
            .iter()
            .filter(|&&i| i != exclude && !allocated.contains(&i) && Self::is_valid_given(allocated, crosses_boundary_at_zero, i))
            .count()
    }
}

impl Criterion for NoDoubleShifts {
    fn name(&self) -> &'static str {
        "no_double_shifts"
    }

    fn group_weight(&self) -> f64 {
        self.group_weight
    }

    fn affinity_weight(&self) -> f64 {
        self.affinity_weight
    }

    fn promote_group(&self, _state: &RotaState, _group: &VolunteerGroup) -> f64 {
        0.0
    }

    fn is_shift_valid(&self, state: &RotaState, group: &VolunteerGroup, shift: &Shift) -> bool {
        let adjacent_in_rota = group
            .allocated_shift_indices
            .iter()
            .any(|&idx| idx.abs_diff(shift.index) == 1);
        !adjacent_in_rota && !Self::crosses_rota_boundary(state, group, shift.index)
    }

    fn calculate_shift_affinity(&self, state: &RotaState, group: &VolunteerGroup, shift: &Shift) -> f64 {
        let crosses_boundary_at_zero = Self::crosses_rota_boundary(state, group, 0);

        let current_reachable = Self::reachable_count(
            group,
            &group.allocated_shift_indices,
            crosses_boundary_at_zero,
            shift.index,
        );

        let mut allocated_after = group.allocated_shift_indices.clone();
        allocated_after.push(shift.index);
        let reachable_after =
            Self::reachable_count(group, &allocated_after, crosses_boundary_at_zero, shift.index);

        let mut base = if current_reachable > 0 {
            reachable_after as f64 / current_reachable as f64
        } else {
            0.0
        };

        let target = (state.shifts.len() as f64 * state.max_allocation_frequency).floor() as i64;
        let allocated_len = group.allocated_shift_indices.len() as i64;
        let can_reach_now = (current_reachable as i64 + 1) >= (target - allocated_len);
        let cannot_reach_after = (reachable_after as i64) < (target - allocated_len - 1);
        if can_reach_now && cannot_reach_after {
            base *= 0.1;
        }

        base.clamp(0.0, 1.0)
    }

    fn validate_rota_state(&self, state: &RotaState) -> Vec<ShiftValidationError> {
        let mut errors = Vec::new();
        for window in state.shifts.windows(2) {
            let (a, b) = (&window[0], &window[1]);
            for group_id in &a.allocated_groups {
                if b.allocated_groups.contains(group_id) {
                    errors.push(ShiftValidationError {
                        shift_index: b.index,
                        shift_date: b.date,
                        criterion_name: self.name(),
                        description: format!(
                            "group `{}` is also allocated to the immediately preceding shift",
                            state.group(*group_id).group_key
                        ),
                    });
                }
            }
        }
        if let (Some(first), Some(last_historical)) = (state.shifts.first(), state.historical_shifts.last()) {
            for group_id in &first.allocated_groups {
                let key = &state.group(*group_id).group_key;
                if last_historical.allocated_group_keys.contains(key) {
                    errors.push(ShiftValidationError {
                        shift_index: first.index,
                        shift_date: first.date,
                        criterion_name: self.name(),
                        description: format!(
                            "group `{key}` also worked the previous rota's final shift"
                        ),
                    });
                }
            }
        }
        errors
    }
}
