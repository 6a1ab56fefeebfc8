use crate::model::{RotaState, Shift, VolunteerGroup};

use super::{Criterion, ShiftValidationError};

/// Keeps groups from overflowing a shift's capacity and prefers groups that land
/// close to exactly filling the remaining space.
#[derive(Debug, Clone, Copy)]
pub struct ShiftSize {
    pub group_weight: f64,
    pub affinity_weight: f64,
}

impl Default for ShiftSize {
    fn default() -> Self {
        ShiftSize {
            group_weight: 0.0,
            affinity_weight: 1.0,
        }
    }
}

impl ShiftSize {
    pub fn new(group_weight: f64, affinity_weight: f64) -> Self {
        ShiftSize {
            group_weight,
            affinity_weight,
        }
    }

    fn remaining_available_ordinary_volunteers(state: &RotaState, shift: &Shift, remaining_capacity: f64) -> u32 {
        shift
            .available_groups
            .iter()
            .map(|id| state.group(*id))
            .filter(|g| {
                !state.volunteer_state.exhausted_volunteer_groups.contains(&g.id)
                    && !g.allocated_shift_indices.contains(&shift.index)
                    && g.ordinary_volunteer_count as f64 <= remaining_capacity
            })
            .map(|g| g.ordinary_volunteer_count)
            .sum()
    }
}

impl Criterion for ShiftSize {
    fn name(&self) -> &'static str {
        "shift_size"
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
        group.ordinary_volunteer_count as i64 <= shift.remaining_capacity(&state.groups)
    }

    fn calculate_shift_affinity(&self, state: &RotaState, group: &VolunteerGroup, shift: &Shift) -> f64 {
        if group.ordinary_volunteer_count == 0 {
            return 0.0;
        }
        let remaining_capacity = shift.remaining_capacity(&state.groups).max(0) as f64;
        let remaining_available = Self::remaining_available_ordinary_volunteers(state, shift, remaining_capacity);
        if remaining_available == 0 {
            return 0.0;
        }
        let urgency = (remaining_capacity / remaining_available as f64).clamp(0.0, 1.0);

        if state.is_resource_constrained() && shift.size > 0 {
            let expected = state.expected_fill_per_shift();
            let current = shift.ordinary_headcount(&state.groups) as f64;
            if current >= expected {
                return 0.0;
            }
            (urgency * (1.0 + (expected - current) / expected)).clamp(0.0, 1.0)
        } else {
            urgency
        }
    }

    fn validate_rota_state(&self, state: &RotaState) -> Vec<ShiftValidationError> {
        let mut errors = Vec::new();
        for shift in &state.shifts {
            if shift.closed {
                continue;
            }
            let filled = shift.ordinary_headcount(&state.groups);
            if filled < shift.size {
                errors.push(ShiftValidationError {
                    shift_index: shift.index,
                    shift_date: shift.date,
                    criterion_name: self.name(),
                    description: format!("under-filled: {filled}/{} ordinary volunteers", shift.size),
                });
            } else if filled > shift.size {
                errors.push(ShiftValidationError {
                    shift_index: shift.index,
                    shift_date: shift.date,
                    criterion_name: self.name(),
                    description: format!("over-filled: {filled}/{} ordinary volunteers", shift.size),
                });
            }
        }
        errors
    }
}
