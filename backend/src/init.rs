use std::collections::{HashMap, HashSet};

use crate::config::{AllocationConfig, AvailabilityResponse};
use crate::error::ConfigError;
use crate::model::{GroupId, RotaState, Shift, Volunteer, VolunteerGroup, VolunteerState};

/// Builds the initial [`RotaState`] from a config: groups, shifts, pre-allocations
/// and capacity metrics, but no ranking yet (see [`crate::ranking`]).
pub(crate) fn build_state(config: &AllocationConfig) -> Result<RotaState, ConfigError> {
    if config.shift_dates.is_empty() {
        return Err(ConfigError::NonPositiveShiftCount(0));
    }

    let availability: HashMap<&str, &AvailabilityResponse> = config
        .availability
        .iter()
        .map(|a| (a.volunteer_id.as_str(), a))
        .collect();

    let mut groups = build_groups(&config.volunteers, &availability, config.shift_dates.len())?;
    if groups.is_empty() {
        return Err(ConfigError::NoValidVolunteerGroups);
    }

    for group in &mut groups {
        group.historical_allocation_count = config
            .historical_shifts
            .iter()
            .filter(|h| h.allocated_group_keys.contains(&group.group_key))
            .count();
    }

    let mut shifts = build_shifts(config, &groups);

    apply_preallocations(config, &mut groups, &mut shifts)?;

    let open_shift_count = shifts.iter().filter(|s| !s.closed).count();
    let total_slots_needed: u64 = shifts.iter().filter(|s| !s.closed).map(|s| s.size as u64).sum();

    let max_allocation_count =
        ((shifts.len() as f64 * config.max_allocation_frequency).floor() as usize).max(1);
    let total_volunteer_capacity: u64 = groups
        .iter()
        .map(|g| (g.available_shift_indices.len().min(max_allocation_count) as u64) * g.ordinary_volunteer_count as u64)
        .sum();

    let exhausted_volunteer_groups: HashSet<GroupId> = groups
        .iter()
        .filter(|g| !g.allocated_shift_indices.is_empty())
        .map(|g| g.id)
        .collect();

    let volunteer_groups: Vec<GroupId> = groups
        .iter()
        .filter(|g| !exhausted_volunteer_groups.contains(&g.id))
        .map(|g| g.id)
        .collect();

    Ok(RotaState {
        shifts,
        groups,
        volunteer_state: VolunteerState {
            volunteer_groups,
            exhausted_volunteer_groups,
        },
        historical_shifts: config.historical_shifts.clone(),
        max_allocation_frequency: config.max_allocation_frequency,
        weight_current_rota_urgency: config.weight_current_rota_urgency,
        weight_overall_frequency_fairness: config.weight_overall_frequency_fairness,
        weight_promote_group: config.weight_promote_group,
        total_volunteer_capacity,
        total_slots_needed,
        open_shift_count,
    })
}

fn build_groups(
    volunteers: &[Volunteer],
    availability: &HashMap<&str, &AvailabilityResponse>,
    shift_count: usize,
) -> Result<Vec<VolunteerGroup>, ConfigError> {
    let mut order: Vec<String> = Vec::new();
    let mut by_key: HashMap<String, Vec<&Volunteer>> = HashMap::new();

    for v in volunteers {
        let Some(resp) = availability.get(v.id.as_str()) else {
            continue;
        };
        if !resp.has_responded {
            continue;
        }
        by_key.entry(v.group_key.clone()).or_insert_with(|| {
            order.push(v.group_key.clone());
            Vec::new()
        });
        by_key.get_mut(&v.group_key).unwrap().push(v);
    }

    let mut groups = Vec::new();
    for group_key in order {
        let members = &by_key[&group_key];

        let lead_count = members.iter().filter(|v| v.is_team_lead).count();
        if lead_count > 1 {
            return Err(ConfigError::MultipleTeamLeads {
                group_key,
                count: lead_count,
            });
        }

        let available_shift_indices: HashSet<usize> = (0..shift_count)
            .filter(|idx| {
                members.iter().all(|v| {
                    availability
                        .get(v.id.as_str())
                        .is_some_and(|resp| !resp.unavailable_shift_indices.contains(idx))
                })
            })
            .collect();

        if available_shift_indices.is_empty() {
            continue;
        }

        let ordinary_volunteer_count = members.iter().filter(|v| !v.is_team_lead).count() as u32;
        let male_count = members.iter().filter(|v| !v.is_team_lead && v.is_male()).count() as u32;

        groups.push(VolunteerGroup {
            id: GroupId(groups.len()),
            group_key,
            members: members.iter().map(|v| (**v).clone()).collect(),
            available_shift_indices,
            allocated_shift_indices: Vec::new(),
            historical_allocation_count: 0,
            has_team_lead: lead_count == 1,
            male_count,
            ordinary_volunteer_count,
        });
    }

    Ok(groups)
}

fn build_shifts(config: &AllocationConfig, groups: &[VolunteerGroup]) -> Vec<Shift> {
    config
        .shift_dates
        .iter()
        .enumerate()
        .map(|(index, &date)| {
            let mut size = config.default_shift_size;
            let mut closed = false;
            let mut custom_preallocations = Vec::new();

            for ov in &config.overrides {
                if !ov.matcher.matches(date) {
                    continue;
                }
                if let Some(s) = ov.shift_size {
                    size = s;
                }
                if let Some(c) = ov.closed {
                    closed = c;
                }
                if let Some(c) = &ov.custom_preallocations {
                    custom_preallocations = c.clone();
                }
            }

            // Closed shifts ignore all pre-allocation fields.
            if closed {
                custom_preallocations.clear();
            }

            let available_groups = if closed {
                Vec::new()
            } else {
                groups
                    .iter()
                    .filter(|g| g.available_shift_indices.contains(&index))
                    .map(|g| g.id)
                    .collect()
            };

            Shift {
                index,
                date,
                size,
                closed,
                allocated_groups: Vec::new(),
                team_lead: None,
                male_count: 0,
                custom_preallocations,
                available_groups,
            }
        })
        .collect()
}

/// Resolves each shift's `preallocated_*` override fields into one-member groups
/// that are immediately allocated and marked exhausted, consuming those fields in
/// the process (they have no meaning once applied).
fn apply_preallocations(
    config: &AllocationConfig,
    groups: &mut Vec<VolunteerGroup>,
    shifts: &mut [Shift],
) -> Result<(), ConfigError> {
    let volunteers_by_id: HashMap<&str, &Volunteer> =
        config.volunteers.iter().map(|v| (v.id.as_str(), v)).collect();

    for shift_index in 0..shifts.len() {
        if shifts[shift_index].closed {
            continue;
        }
        let date = shifts[shift_index].date;
        let mut preallocated_volunteer_ids = Vec::new();
        let mut preallocated_team_lead_id = None;

        for ov in &config.overrides {
            if !ov.matcher.matches(date) {
                continue;
            }
            if let Some(ids) = &ov.preallocated_volunteer_ids {
                preallocated_volunteer_ids = ids.clone();
            }
            if let Some(id) = &ov.preallocated_team_lead_id {
                preallocated_team_lead_id = Some(id.clone());
            }
        }

        if let Some(lead_id) = &preallocated_team_lead_id {
            if !preallocated_volunteer_ids.contains(lead_id) {
                let volunteer: &Volunteer = volunteers_by_id
                    .get(lead_id.as_str())
                    .copied()
                    .ok_or_else(|| ConfigError::PreallocatedTeamLeadInvalid(lead_id.clone()))?;
                if !volunteer.is_team_lead {
                    return Err(ConfigError::PreallocatedTeamLeadInvalid(lead_id.clone()));
                }
                push_preallocated_group(groups, shifts, shift_index, volunteer.clone(), true);
            }
        }

        for volunteer_id in &preallocated_volunteer_ids {
            let volunteer: &Volunteer = volunteers_by_id
                .get(volunteer_id.as_str())
                .copied()
                .ok_or_else(|| ConfigError::PreallocatedVolunteerNotFound(volunteer_id.clone()))?;
            let is_lead = preallocated_team_lead_id.as_deref() == Some(volunteer_id.as_str());
            push_preallocated_group(groups, shifts, shift_index, volunteer.clone(), is_lead);
        }
    }

    Ok(())
}

fn push_preallocated_group(
    groups: &mut Vec<VolunteerGroup>,
    shifts: &mut [Shift],
    shift_index: usize,
    volunteer: Volunteer,
    as_team_lead: bool,
) {
    let id = GroupId(groups.len());
    let group_key = format!("preallocated:{}", volunteer.id);
    let ordinary_volunteer_count = if as_team_lead { 0 } else { 1 };
    let male_count = if as_team_lead { 0 } else { u32::from(volunteer.is_male()) };

    groups.push(VolunteerGroup {
        id,
        group_key,
        members: vec![volunteer.clone()],
        available_shift_indices: HashSet::from([shift_index]),
        allocated_shift_indices: vec![shift_index],
        historical_allocation_count: 0,
        has_team_lead: as_team_lead,
        male_count,
        ordinary_volunteer_count,
    });

    let shift = &mut shifts[shift_index];
    shift.allocated_groups.push(id);
    shift.male_count += male_count;
    if as_team_lead {
        shift.team_lead = Some(volunteer);
    }
}
