use crate::model::{RotaState, Shift, VolunteerGroup};

use super::{Criterion, ShiftValidationError};

/// Every open shift needs exactly one team lead, and a group that already carries
/// one should be prioritised while slots that need one still exist.
#[derive(Debug, Clone, Copy)]
pub struct TeamLead {
    pub group_weight: f64,
    pub affinity_weight: f64,
}

impl Default for TeamLead {
    fn default() -> Self {
        TeamLead {
            group_weight: 1.0,
            affinity_weight: 1.0,
        }
    }
}

impl TeamLead {
    pub fn new(group_weight: f64, affinity_weight: f64) -> Self {
        TeamLead {
            group_weight,
            affinity_weight,
        }
    }

    /// Groups still active (not exhausted) that could still land a team lead on
    /// `shift`: they carry one, haven't been placed there already, and the shift
    /// doesn't have one yet.
    fn remaining_lead_candidates(state: &RotaState, shift: &Shift) -> usize {
        if shift.team_lead.is_some() {
            return 0;
        }
        shift
            .available_groups
            .iter()
            .filter(|id| {
                let g = state.group(**id);
                g.has_team_lead
                    && !state.volunteer_state.exhausted_volunteer_groups.contains(*id)
                    && !g.allocated_shift_indices.contains(&shift.index)
            })
            .count()
    }
}

impl Criterion for TeamLead {
    fn name(&self) -> &'static str {
        "team_lead"
    }

    fn group_weight(&self) -> f64 {
        self.group_weight
    }

    fn affinity_weight(&self) -> f64 {
        self.affinity_weight
    }

    fn promote_group(&self, _state: &RotaState, group: &VolunteerGroup) -> f64 {
        if group.has_team_lead {
            1.0
        } else {
            0.0
        }
    }

    fn is_shift_valid(&self, _state: &RotaState, group: &VolunteerGroup, shift: &Shift) -> bool {
        !(group.has_team_lead && shift.team_lead.is_some())
    }

    fn calculate_shift_affinity(&self, state: &RotaState, group: &VolunteerGroup, shift: &Shift) -> f64 {
        if !group.has_team_lead || shift.team_lead.is_some() {
            return 0.0;
        }
        let candidates = Self::remaining_lead_candidates(state, shift);
        if candidates == 0 {
            0.0
        } else {
            1.0 / candidates as f64
        }
    }

    fn validate_rota_state(&self, state: &RotaState) -> Vec<ShiftValidationError> {
        let mut errors = Vec::new();
        for shift in &state.shifts {
            if shift.closed {
                continue;
            }
            let leads: Vec<_> = shift
                .allocated_groups
                .iter()
                .filter_map(|id| state.group(*id).team_lead())
                .collect();
            if leads.is_empty() {
                errors.push(ShiftValidationError {
                    shift_index: shift.index,
                    shift_date: shift.date,
                    criterion_name: self.name(),
                    description: "no team lead assigned".to_string(),
                });
            } else if leads.len() > 1 {
                errors.push(ShiftValidationError {
                    shift_index: shift.index,
                    shift_date: shift.date,
                    criterion_name: self.name(),
                    description: format!("{} team leads assigned, at most one is allowed", leads.len()),
                });
            }
        }
        errors
    }
}
