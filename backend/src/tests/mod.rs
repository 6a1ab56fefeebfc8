use chrono::NaiveDate;

use crate::config::{AllocationConfig, AvailabilityResponse, DateMatcher, ShiftOverride};
use crate::criteria::{Criterion, MaleBalance, NoDoubleShifts, ShiftSize, ShiftSpread, TeamLead};
use crate::model::{HistoricalShift, Volunteer};
use crate::{allocate, ConfigError};

fn default_criteria() -> Vec<Box<dyn Criterion>> {
    vec![
        Box::new(TeamLead::default()),
        Box::new(MaleBalance::default()),
        Box::new(ShiftSize::default()),
        Box::new(ShiftSpread::default()),
        Box::new(NoDoubleShifts::default()),
    ]
}

fn volunteer(id: &str, group_key: &str, gender: &str, is_team_lead: bool) -> Volunteer {
    Volunteer {
        id: id.to_string(),
        first_name: id.to_string(),
        last_name: "Tester".to_string(),
        email: format!("{id}@example.com"),
        gender: gender.to_string(),
        is_team_lead,
        group_key: group_key.to_string(),
    }
}

fn responded(id: &str) -> AvailabilityResponse {
    AvailabilityResponse {
        volunteer_id: id.to_string(),
        has_responded: true,
        unavailable_shift_indices: Default::default(),
    }
}

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, day).unwrap()
}

/// Three standalone team-lead groups and three two-member ordinary groups, three
/// shifts of size 2: one lead group and one ordinary group exactly fills each
/// shift.
fn simple_config() -> AllocationConfig {
    let volunteers = vec![
        volunteer("lead-a", "lead-a", "Male", true),
        volunteer("lead-b", "lead-b", "female", true),
        volunteer("lead-c", "lead-c", "Male", true),
        volunteer("member-a1", "members-a", "Male", false),
        volunteer("member-a2", "members-a", "female", false),
        volunteer("member-b1", "members-b", "Male", false),
        volunteer("member-b2", "members-b", "female", false),
        volunteer("member-c1", "members-c", "Male", false),
        volunteer("member-c2", "members-c", "female", false),
    ];
    let availability = volunteers.iter().map(|v| responded(&v.id)).collect();

    AllocationConfig {
        criteria: default_criteria(),
        max_allocation_frequency: 1.0,
        historical_shifts: Vec::new(),
        volunteers,
        availability,
        shift_dates: vec![date(1), date(8), date(15)],
        default_shift_size: 2,
        overrides: Vec::new(),
        weight_current_rota_urgency: 1.0,
        weight_overall_frequency_fairness: 1.0,
        weight_promote_group: 1.0,
    }
}

#[test]
fn fills_every_shift_with_no_validation_errors() {
    let outcome = allocate(simple_config()).expect("valid config");
    assert!(outcome.success, "errors: {:?}", outcome.validation_errors);
    for shift in &outcome.state.shifts {
        assert!(shift.is_full(&outcome.state.groups), "shift {} not full", shift.index);
        assert!(shift.team_lead.is_some(), "shift {} has no team lead", shift.index);
    }
}

#[test]
fn allocation_is_deterministic_across_runs() {
    let outcome_a = allocate(simple_config()).unwrap();
    let outcome_b = allocate(simple_config()).unwrap();

    let keys = |outcome: &crate::AllocationOutcome| -> Vec<Vec<String>> {
        outcome
            .state
            .shifts
            .iter()
            .map(|s| {
                let mut keys: Vec<String> = s
                    .allocated_groups
                    .iter()
                    .map(|id| outcome.state.group(*id).group_key.clone())
                    .collect();
                keys.sort();
                keys
            })
            .collect()
    };

    assert_eq!(keys(&outcome_a), keys(&outcome_b));
}

#[test]
fn empty_shift_schedule_is_rejected() {
    let mut config = simple_config();
    config.shift_dates.clear();
    let err = allocate(config).unwrap_err();
    assert_eq!(err, ConfigError::NonPositiveShiftCount(0));
}

#[test]
fn no_responses_is_rejected() {
    let mut config = simple_config();
    config.availability.iter_mut().for_each(|a| a.has_responded = false);
    let err = allocate(config).unwrap_err();
    assert_eq!(err, ConfigError::NoValidVolunteerGroups);
}

#[test]
fn two_team_leads_in_one_group_is_rejected() {
    let mut config = simple_config();
    config
        .volunteers
        .push(volunteer("lead-a2", "lead-a", "Male", true));
    config.availability.push(responded("lead-a2"));
    let err = allocate(config).unwrap_err();
    assert!(matches!(err, ConfigError::MultipleTeamLeads { group_key, .. } if group_key == "lead-a"));
}

#[test]
fn later_override_wins_per_field() {
    let mut config = simple_config();
    config.overrides = vec![
        ShiftOverride {
            matcher: DateMatcher::All,
            shift_size: Some(2),
            closed: None,
            custom_preallocations: None,
            preallocated_volunteer_ids: None,
            preallocated_team_lead_id: None,
        },
        ShiftOverride {
            matcher: DateMatcher::Exact(date(1)),
            shift_size: Some(4),
            closed: None,
            custom_preallocations: None,
            preallocated_volunteer_ids: None,
            preallocated_team_lead_id: None,
        },
    ];
    let outcome = allocate(config).unwrap();
    assert_eq!(outcome.state.shifts[0].size, 4);
    assert_eq!(outcome.state.shifts[1].size, 2);
}

#[test]
fn preallocated_team_lead_is_respected_and_excluded_from_the_loop() {
    let mut config = simple_config();
    config.overrides.push(ShiftOverride {
        matcher: DateMatcher::Exact(date(1)),
        shift_size: None,
        closed: None,
        custom_preallocations: None,
        preallocated_volunteer_ids: None,
        preallocated_team_lead_id: Some("lead-a".to_string()),
    });

    let outcome = allocate(config).unwrap();
    let first = &outcome.state.shifts[0];
    assert_eq!(first.team_lead.as_ref().unwrap().id, "lead-a");

    let lead_group = outcome
        .state
        .groups
        .iter()
        .find(|g| g.group_key == "preallocated:lead-a")
        .expect("preallocated group exists");
    assert_eq!(lead_group.allocated_shift_indices, vec![0]);

    // The original "lead-a" group never enters the active worklist for this run
    // since every shift it could take already got a lead via pre-allocation or a
    // competing group; it should show up as underutilized rather than erroring.
    let original_lead_group = outcome
        .state
        .groups
        .iter()
        .find(|g| g.group_key == "lead-a")
        .expect("original lead group still exists in the arena");
    assert!(original_lead_group.allocated_shift_indices.len() <= 2);
}

#[test]
fn unknown_preallocated_volunteer_is_rejected() {
    let mut config = simple_config();
    config.overrides.push(ShiftOverride {
        matcher: DateMatcher::Exact(date(1)),
        shift_size: None,
        closed: None,
        custom_preallocations: None,
        preallocated_volunteer_ids: Some(vec!["ghost".to_string()]),
        preallocated_team_lead_id: None,
    });
    let err = allocate(config).unwrap_err();
    assert_eq!(err, ConfigError::PreallocatedVolunteerNotFound("ghost".to_string()));
}

#[test]
fn group_is_never_scheduled_on_two_adjacent_shifts() {
    // Only one ordinary group and one lead group are available across two adjacent
    // shifts: the loop must not double-book either onto both.
    let volunteers = vec![
        volunteer("lead-a", "lead-a", "Male", true),
        volunteer("member-a1", "members-a", "Male", false),
        volunteer("member-a2", "members-a", "female", false),
    ];
    let availability = volunteers.iter().map(|v| responded(&v.id)).collect();
    let config = AllocationConfig {
        criteria: default_criteria(),
        max_allocation_frequency: 1.0,
        historical_shifts: Vec::new(),
        volunteers,
        availability,
        shift_dates: vec![date(1), date(8)],
        default_shift_size: 2,
        overrides: Vec::new(),
        weight_current_rota_urgency: 1.0,
        weight_overall_frequency_fairness: 1.0,
        weight_promote_group: 1.0,
    };

    let outcome = allocate(config).unwrap();
    let group = outcome
        .state
        .groups
        .iter()
        .find(|g| g.group_key == "members-a")
        .unwrap();
    assert_eq!(group.allocated_shift_indices.len(), 1);
}

#[test]
fn historical_rota_boundary_prevents_immediate_repeat() {
    let mut config = simple_config();
    config.historical_shifts = vec![HistoricalShift {
        allocated_group_keys: ["members-a".to_string()].into_iter().collect(),
    }];
    let outcome = allocate(config).unwrap();
    let first_shift_keys: Vec<String> = outcome.state.shifts[0]
        .allocated_groups
        .iter()
        .map(|id| outcome.state.group(*id).group_key.clone())
        .collect();
    assert!(!first_shift_keys.contains(&"members-a".to_string()));
}
