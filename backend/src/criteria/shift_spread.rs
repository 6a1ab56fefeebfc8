use crate::model::{RotaState, Shift, VolunteerGroup};

use super::{Criterion, ShiftValidationError};

/// Prefers a shift that keeps a group's occurrences spread evenly through time,
/// rather than clustered together.
#[derive(Debug, Clone, Copy)]
pub struct ShiftSpread {
    pub group_weight: f64,
    pub affinity_weight: f64,
}

impl Default for ShiftSpread {
    fn default() -> Self {
        ShiftSpread {
            group_weight: 0.0,
            affinity_weight: 0.5,
        }
    }
}

impl ShiftSpread {
    pub fn new(group_weight: f64, affinity_weight: f64) -> Self {
        ShiftSpread {
            group_weight,
            affinity_weight,
        }
    }

    /// Most recent historical shift position at which `group` was scheduled, if any.
    fn last_historical_index(state: &RotaState, group: &VolunteerGroup) -> Option<usize> {
        state
            .historical_shifts
            .iter()
            .enumerate()
            .rev()
            .find(|(_, h)| h.allocated_group_keys.contains(&group.group_key))
            .map(|(idx, _)| idx)
    }
}

impl Criterion for ShiftSpread {
    fn name(&self) -> &'static str {
        "shift_spread"
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

    fn is_shift_valid(&self, _state: &RotaState, _group: &VolunteerGroup, _shift: &Shift) -> bool {
        true
    }

    fn calculate_shift_affinity(&self, state: &RotaState, group: &VolunteerGroup, shift: &Shift) -> f64 {
        let hist_len = state.historical_shifts.len();
        let hist_last = Self::last_historical_index(state, group);

        let max_distance = match hist_last {
            Some(hist_idx) => (hist_len - hist_idx - 1) + state.shifts.len(),
            None => state.shifts.len().saturating_sub(1),
        };

        let distance_from_historical = match hist_last {
            Some(hist_idx) => (hist_len - hist_idx - 1) + shift.index + 1,
            None => max_distance,
        };

        let min_distance_current = group
            .allocated_shift_indices
            .iter()
            .map(|&idx| shift.index.abs_diff(idx))
            .min();

        let min_distance = match min_distance_current {
            Some(d) => distance_from_historical.min(d),
            None => distance_from_historical,
        };

        if max_distance == 0 {
            return 0.5;
        }
        (min_distance as f64 / max_distance as f64).clamp(0.0, 1.0)
    }

    fn validate_rota_state(&self, _state: &RotaState) -> Vec<ShiftValidationError> {
        Vec::new()
    }
}
