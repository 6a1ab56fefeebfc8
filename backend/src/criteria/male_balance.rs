use crate::model::{RotaState, Shift, VolunteerGroup};

use super::{Criterion, ShiftValidationError};

/// Every open shift should end up with at least one male ordinary volunteer.
#[derive(Debug, Clone, Copy)]
pub struct MaleBalance {
    pub group_weight: f64,
    pub affinity_weight: f64,
}

impl Default for MaleBalance {
    fn default() -> Self {
        MaleBalance {
            group_weight: 0.5,
            affinity_weight: 1.0,
        }
    }
}

impl MaleBalance {
    pub fn new(group_weight: f64, affinity_weight: f64) -> Self {
        MaleBalance {
            group_weight,
            affinity_weight,
        }
    }

    fn remaining_available_male_volunteers(state: &RotaState, shift: &Shift, remaining_capacity: f64) -> u32 {
        shift
            .available_groups
            .iter()
            .map(|id| state.group(*id))
            .filter(|g| {
                g.male_count > 0
                    && !state.volunteer_state.exhausted_volunteer_groups.contains(&g.id)
                    && !g.allocated_shift_indices.contains(&shift.index)
                    && g.ordinary_volunteer_count as f64 <= remaining_capacity
            })
            .map(|g| g.male_count)
            .sum()
    }
}

impl Criterion for MaleBalance {
    fn name(&self) -> &'static str {
        "male_balance"
    }

    fn group_weight(&self) -> f64 {
        self.group_weight
    }

    fn affinity_weight(&self) -> f64 {
        self.affinity_weight
    }

    fn promote_group(&self, _state: &RotaState, group: &VolunteerGroup) -> f64 {
        if group.male_count > 0 {
            1.0
        } else {
            0.0
        }
    }

    fn is_shift_valid(&self, state: &RotaState, group: &VolunteerGroup, shift: &Shift) -> bool {
        let would_fill = shift.ordinary_headcount(&state.groups) + group.ordinary_volunteer_count >= shift.size;
        let no_future_lead_slot = shift.team_lead.is_some() || !group.has_team_lead;
        !(shift.male_count == 0 && group.male_count == 0 && would_fill && no_future_lead_slot)
    }

    fn calculate_shift_affinity(&self, state: &RotaState, group: &VolunteerGroup, shift: &Shift) -> f64 {
        if group.male_count == 0 {
            return 0.0;
        }
        let need = if shift.male_count == 0 {
            1.0
        } else {
            (1.0 - 0.5 * shift.male_count as f64).max(0.1)
        };
        let remaining_capacity = shift.remaining_capacity(&state.groups).max(0) as f64;
        let urgency = if remaining_capacity > 0.0 {
            (3.0 / remaining_capacity).max(1.0)
        } else {
            1.0
        };
        let remaining_males = Self::remaining_available_male_volunteers(state, shift, remaining_capacity);
        (need * urgency / remaining_males.max(1) as f64).clamp(0.0, 1.0)
    }

    fn validate_rota_state(&self, state: &RotaState) -> Vec<ShiftValidationError> {
        state
            .shifts
            .iter()
            .filter(|s| !s.closed && s.male_count == 0)
            .map(|s| ShiftValidationError {
                shift_index: s.index,
                shift_date: s.date,
                criterion_name: self.name(),
                description: "no male volunteer assigned".to_string(),
            })
            .collect()
    }
}
