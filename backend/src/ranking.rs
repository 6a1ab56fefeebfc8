use crate::criteria::Criterion;
use crate::model::{RotaState, VolunteerGroup};

/// Constant bonus applied to any group spanning more than one volunteer: pairing
/// people up is worth mildly favouring over singletons, all else equal.
const GROUP_PROMOTION_BONUS: f64 = 0.5;

/// How much of `group`'s allocation budget is still open relative to how many
/// shifts remain reachable for it. Strictly non-increasing as the group is
/// allocated (both terms shrink together), strictly non-decreasing as shifts it
/// could have used close off elsewhere (the denominator shrinks, numerator does
/// not) — so a group left with fewer live options always looks at least as urgent
/// as it did before.
pub fn current_rota_urgency(state: &RotaState, group: &VolunteerGroup) -> f64 {
    let cap = group.allocation_cap(state.max_allocation_count());
    let remaining_needed = cap.saturating_sub(group.allocated_shift_indices.len());

    let reachable = group
        .available_shift_indices
        .iter()
        .filter(|&&idx| {
            !group.allocated_shift_indices.contains(&idx)
                && !state.shifts[idx].closed
                && !state.shifts[idx].is_full(&state.groups)
        })
        .count();

    remaining_needed as f64 / reachable.max(1) as f64
}

/// How far behind `group` is relative to a proportionate share of all allocations
/// ever made (historical and current). Positive when the group is behind its
/// target share, negative when it has already had more than its share.
pub fn overall_frequency_fairness(state: &RotaState, group: &VolunteerGroup) -> f64 {
    let historical_total = state.historical_shifts.len();
    let current_total = state.shifts.len();
    let target = ((historical_total + current_total) as f64 * state.max_allocation_frequency).floor();

    let done = group.historical_allocation_count + group.allocated_shift_indices.len();
    target - done as f64
}

fn promote_group(group: &VolunteerGroup) -> f64 {
    if group.members.len() > 1 {
        GROUP_PROMOTION_BONUS
    } else {
        0.0
    }
}

/// `S(g)`: the composite rank used to order the active worklist. Higher sorts
/// first.
pub fn score(state: &RotaState, group_id: crate::model::GroupId, criteria: &[Box<dyn Criterion>]) -> f64 {
    let group = state.group(group_id);

    let mut s = state.weight_current_rota_urgency * current_rota_urgency(state, group)
        + state.weight_overall_frequency_fairness * overall_frequency_fairness(state, group)
        + state.weight_promote_group * promote_group(group);

    for c in criteria {
        s += c.group_weight() * c.promote_group(state, group);
    }

    s
}
