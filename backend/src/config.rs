use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::criteria::Criterion;
use crate::model::{HistoricalShift, Volunteer};

/// One volunteer's response to the availability survey for this rota.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    pub volunteer_id: String,
    pub has_responded: bool,
    #[serde(default)]
    pub unavailable_shift_indices: HashSet<usize>,
}

/// Which dates an override applies to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DateMatcher {
    All,
    Exact(NaiveDate),
    OneOf(Vec<NaiveDate>),
    Range { start: NaiveDate, end: NaiveDate },
}

impl DateMatcher {
    pub fn matches(&self, date: NaiveDate) -> bool {
        match self {
            DateMatcher::All => true,
            DateMatcher::Exact(d) => *d == date,
            DateMatcher::OneOf(dates) => dates.contains(&date),
            DateMatcher::Range { start, end } => *start <= date && date <= *end,
        }
    }
}

/// A per-date adjustment to the default shift shape. When several overrides match the
/// same date they are applied in list order, each field independently: a later
/// override's `Some` wins over an earlier one, a `None` leaves the earlier value (or
/// the default) untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftOverride {
    pub matcher: DateMatcher,
    #[serde(default)]
    pub shift_size: Option<u32>,
    #[serde(default)]
    pub closed: Option<bool>,
    #[serde(default)]
    pub custom_preallocations: Option<Vec<String>>,
    #[serde(default)]
    pub preallocated_volunteer_ids: Option<Vec<String>>,
    #[serde(default)]
    pub preallocated_team_lead_id: Option<String>,
}

/// Everything [`crate::allocate`] needs to run a single rota.
pub struct AllocationConfig {
    pub criteria: Vec<Box<dyn Criterion>>,
    pub max_allocation_frequency: f64,
    pub historical_shifts: Vec<HistoricalShift>,
    pub volunteers: Vec<Volunteer>,
    pub availability: Vec<AvailabilityResponse>,
    pub shift_dates: Vec<NaiveDate>,
    pub default_shift_size: u32,
    pub overrides: Vec<ShiftOverride>,
    pub weight_current_rota_urgency: f64,
    pub weight_overall_frequency_fairness: f64,
    pub weight_promote_group: f64,
}
