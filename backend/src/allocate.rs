use log::{debug, trace, warn};
use serde::Serialize;

use crate::config::AllocationConfig;
use crate::criteria::{Criterion, ShiftValidationError};
use crate::error::ConfigError;
use crate::model::{GroupId, RotaState};
use crate::{init, ranking};

/// The result of running [`allocate`]: the finished state plus a post-hoc audit of
/// it. `success` is `false` whenever any criterion's validator found a violation —
/// the rota is still returned so the caller can see exactly how far it got.
#[derive(Debug, Clone, Serialize)]
pub struct AllocationOutcome {
    pub state: RotaState,
    pub success: bool,
    pub underutilized_groups: Vec<GroupId>,
    pub validation_errors: Vec<ShiftValidationError>,
}

/// Runs the greedy allocation loop to completion and returns the resulting rota.
///
/// Returns `Err` only for malformed input, detected entirely during setup; once the
/// loop starts it always runs to completion and always returns `Ok`.
pub fn allocate(config: AllocationConfig) -> Result<AllocationOutcome, ConfigError> {
    let mut state = init::build_state(&config)?;
    sort_active_groups(&mut state, &config.criteria);

    debug!(
        "starting allocation: {} shifts, {} active groups, {} pre-allocated",
        state.shifts.len(),
        state.volunteer_state.volunteer_groups.len(),
        state.volunteer_state.exhausted_volunteer_groups.len(),
    );

    run(&mut state, &config.criteria);

    let (validation_errors, underutilized_groups) = crate::validate::build_report(&state, &config.criteria);
    let success = validation_errors.is_empty();

    if !success {
        warn!("allocation finished with {} validation error(s)", validation_errors.len());
    } else {
        debug!("allocation finished cleanly");
    }

    Ok(AllocationOutcome {
        state,
        success,
        underutilized_groups,
        validation_errors,
    })
}

fn sort_active_groups(state: &mut RotaState, criteria: &[Box<dyn Criterion>]) {
    let mut scored: Vec<(GroupId, f64)> = state
        .volunteer_state
        .volunteer_groups
        .iter()
        .map(|&id| (id, ranking::score(state, id, criteria)))
        .collect();

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    state.volunteer_state.volunteer_groups = scored.into_iter().map(|(id, _)| id).collect();
}

fn run(state: &mut RotaState, criteria: &[Box<dyn Criterion>]) {
    loop {
        if state.volunteer_state.volunteer_groups.is_empty() {
            break;
        }
        let group_id = state.volunteer_state.volunteer_groups.remove(0);

        match find_best_shift(state, criteria, group_id) {
            Some(shift_index) => {
                assign(state, group_id, shift_index);
                trace!("assigned group {:?} to shift {}", group_id, shift_index);

                let max_allocation_count = state.max_allocation_count();
                if state.group(group_id).is_exhausted(max_allocation_count) {
                    state.volunteer_state.exhausted_volunteer_groups.insert(group_id);
                } else {
                    reinsert(state, criteria, group_id);
                }
            }
            None => {
                trace!("no valid shift left for group {:?}, exhausting it", group_id);
                state.volunteer_state.exhausted_volunteer_groups.insert(group_id);
            }
        }

        if state.shifts.iter().all(|s| s.closed || s.is_full(&state.groups)) {
            debug!("all open shifts full, stopping early");
            break;
        }
    }
}

/// The shift with the highest summed affinity across every criterion, among shifts
/// that no criterion vetoes. Ties keep the earliest shift index, since shifts are
/// visited in index order and only a strictly greater affinity replaces the
/// incumbent.
fn find_best_shift(state: &RotaState, criteria: &[Box<dyn Criterion>], group_id: GroupId) -> Option<usize> {
    let group = state.group(group_id);

    let mut best: Option<(usize, f64)> = None;
    for shift in &state.shifts {
        if shift.closed || shift.is_full(&state.groups) {
            continue;
        }
        if !group.available_shift_indices.contains(&shift.index) {
            continue;
        }
        if criteria.iter().any(|c| !c.is_shift_valid(state, group, shift)) {
            continue;
        }

        let affinity: f64 = criteria
            .iter()
            .map(|c| c.affinity_weight() * c.calculate_shift_affinity(state, group, shift))
            .sum();

        if affinity <= 0.0 {
            continue;
        }

        let better = match best {
            Some((_, best_affinity)) => affinity > best_affinity,
            None => true,
        };
        if better {
            best = Some((shift.index, affinity));
        }
    }

    best.map(|(idx, _)| idx)
}

fn assign(state: &mut RotaState, group_id: GroupId, shift_index: usize) {
    let male_count = state.group(group_id).male_count;
    let lead = state.group(group_id).team_lead().cloned();

    state.group_mut(group_id).allocated_shift_indices.push(shift_index);

    let shift = &mut state.shifts[shift_index];
    shift.allocated_groups.push(group_id);
    shift.male_count += male_count;
    if lead.is_some() && shift.team_lead.is_none() {
        shift.team_lead = lead;
    }
}

fn reinsert(state: &mut RotaState, criteria: &[Box<dyn Criterion>], group_id: GroupId) {
    let new_score = ranking::score(state, group_id, criteria);
    let pos = state
        .volunteer_state
        .volunteer_groups
        .iter()
        .position(|&gid| ranking::score(state, gid, criteria) < new_score)
        .unwrap_or(state.volunteer_state.volunteer_groups.len());
    state.volunteer_state.volunteer_groups.insert(pos, group_id);
}
