use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Index into [`RotaState::groups`]. Groups never move once pushed, so this is
/// stable for the lifetime of a single [`crate::allocate`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GroupId(pub usize);

/// A single person in the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volunteer {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub gender: String,
    pub is_team_lead: bool,
    pub group_key: String,
}

impl Volunteer {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Only the literal string `"Male"` counts; any other spelling or casing is
    /// treated as non-male for balancing purposes.
    pub fn is_male(&self) -> bool {
        self.gender == "Male"
    }
}

/// A set of volunteers who are scheduled as a unit. Built once during init and frozen:
/// `available_shift_indices` never changes after construction, only the allocation
/// bookkeeping (`allocated_shift_indices`) grows as the loop runs.
#[derive(Debug, Clone, Serialize)]
pub struct VolunteerGroup {
    pub id: GroupId,
    pub group_key: String,
    pub members: Vec<Volunteer>,
    pub available_shift_indices: HashSet<usize>,
    pub allocated_shift_indices: Vec<usize>,
    pub historical_allocation_count: usize,
    pub has_team_lead: bool,
    pub male_count: u32,
    pub ordinary_volunteer_count: u32,
}

impl VolunteerGroup {
    /// Non-team-lead members only: team leads never count toward a shift's size or
    /// its male headcount.
    pub fn ordinary_members(&self) -> impl Iterator<Item = &Volunteer> {
        self.members.iter().filter(|v| !v.is_team_lead)
    }

    pub fn team_lead(&self) -> Option<&Volunteer> {
        self.members.iter().find(|v| v.is_team_lead)
    }

    /// The most this group may ever be allocated in this rota: bounded both by how
    /// many shifts it is available for and by the global frequency cap.
    pub fn allocation_cap(&self, max_allocation_count: usize) -> usize {
        self.available_shift_indices.len().min(max_allocation_count)
    }

    pub fn is_exhausted(&self, max_allocation_count: usize) -> bool {
        self.allocated_shift_indices.len() >= self.allocation_cap(max_allocation_count)
    }
}

/// One dated slot to be filled.
#[derive(Debug, Clone, Serialize)]
pub struct Shift {
    pub index: usize,
    pub date: NaiveDate,
    pub size: u32,
    pub closed: bool,
    pub allocated_groups: Vec<GroupId>,
    pub team_lead: Option<Volunteer>,
    pub male_count: u32,
    pub custom_preallocations: Vec<String>,
    pub available_groups: Vec<GroupId>,
}

impl Shift {
    /// Ordinary headcount currently filled: the sum of each allocated group's
    /// ordinary members, plus any free-text custom pre-allocations.
    pub fn ordinary_headcount(&self, groups: &[VolunteerGroup]) -> u32 {
        let from_groups: u32 = self
            .allocated_groups
            .iter()
            .map(|id| groups[id.0].ordinary_volunteer_count)
            .sum();
        from_groups + self.custom_preallocations.len() as u32
    }

    pub fn remaining_capacity(&self, groups: &[VolunteerGroup]) -> i64 {
        self.size as i64 - self.ordinary_headcount(groups) as i64
    }

    pub fn is_full(&self, groups: &[VolunteerGroup]) -> bool {
        self.ordinary_headcount(groups) >= self.size
    }
}

/// A shift from a previous rota, retained only as far as is needed to compute
/// fairness and spread: which groups filled it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricalShift {
    pub allocated_group_keys: HashSet<String>,
}

/// The ranked worklist driving the allocation loop: `volunteer_groups` holds the
/// still-active groups in descending score order; `exhausted_volunteer_groups` holds
/// groups that can never be profitably reconsidered.
#[derive(Debug, Clone, Default, Serialize)]
pub struct VolunteerState {
    pub volunteer_groups: Vec<GroupId>,
    pub exhausted_volunteer_groups: HashSet<GroupId>,
}

/// The full mutable picture of one allocation run.
#[derive(Debug, Clone, Serialize)]
pub struct RotaState {
    pub shifts: Vec<Shift>,
    pub groups: Vec<VolunteerGroup>,
    pub volunteer_state: VolunteerState,
    pub historical_shifts: Vec<HistoricalShift>,
    pub max_allocation_frequency: f64,
    pub weight_current_rota_urgency: f64,
    pub weight_overall_frequency_fairness: f64,
    pub weight_promote_group: f64,
    pub total_volunteer_capacity: u64,
    pub total_slots_needed: u64,
    pub open_shift_count: usize,
}

impl RotaState {
    pub fn group(&self, id: GroupId) -> &VolunteerGroup {
        &self.groups[id.0]
    }

    pub fn group_mut(&mut self, id: GroupId) -> &mut VolunteerGroup {
        &mut self.groups[id.0]
    }

    /// Global cap on allocations per group in this rota: `floor(|shifts| *
    /// max_allocation_frequency)`, never less than 1 so a group with any availability
    /// can always be used at least once.
    pub fn max_allocation_count(&self) -> usize {
        ((self.shifts.len() as f64 * self.max_allocation_frequency).floor() as usize).max(1)
    }

    pub fn is_resource_constrained(&self) -> bool {
        self.total_volunteer_capacity < self.total_slots_needed
    }

    /// Average ordinary-volunteer supply per open shift, used by [`crate::criteria::ShiftSize`]
    /// to scale urgency up when the rota is short on volunteers overall.
    pub fn expected_fill_per_shift(&self) -> f64 {
        if self.open_shift_count == 0 {
            0.0
        } else {
            self.total_volunteer_capacity as f64 / self.open_shift_count as f64
        }
    }
}
