//! Scenario-level integration tests exercising `tz_rules` the way a caller
//! would: through its public API only, with concrete annual-cycle rule sets.

use tz_rules::{
    decode, encode, DateSelector, DaylightSavingRule, FixedClock, Indicator, InitialTransition,
    RuleBasedModel, RuleError, Weekday,
};

fn eu_rules() -> Vec<DaylightSavingRule> {
    vec![
        DaylightSavingRule::new(
            DateSelector::LastWeekday {
                month: 3,
                weekday: Weekday::Sun,
            },
            3600,
            3600,
            Indicator::Utc,
        ),
        DaylightSavingRule::new(
            DateSelector::LastWeekday {
                month: 10,
                weekday: Weekday::Sun,
            },
            3600,
            0,
            Indicator::Utc,
        ),
    ]
}

fn us_rules() -> Vec<DaylightSavingRule> {
    vec![
        DaylightSavingRule::new(
            DateSelector::WeekdayOnOrAfter {
                month: 3,
                weekday: Weekday::Sun,
                day: 8,
            },
            2 * 3600,
            3600,
            Indicator::Wall,
        ),
        DaylightSavingRule::new(
            DateSelector::WeekdayOnOrAfter {
                month: 11,
                weekday: Weekday::Sun,
                day: 1,
            },
            2 * 3600,
            0,
            Indicator::Wall,
        ),
    ]
}

#[test]
fn eu_gap_at_spring_forward() {
    let model = RuleBasedModel::new(3600, eu_rules(), &FixedClock(1_577_836_800)).unwrap();
    let transition = model.next_transition(1_577_836_800);
    assert_eq!(transition.posix_time, 1_585_443_600); // 2020-03-29T01:00:00Z
    assert!(transition.is_gap());
    assert_eq!(model.conflict_transition(transition.posix_time + 5400), Some(transition));
}

#[test]
fn eu_overlap_at_fall_back() {
    let model = RuleBasedModel::new(3600, eu_rules(), &FixedClock(1_577_836_800)).unwrap();
    let transition = model.next_transition(1_585_443_600);
    assert_eq!(transition.posix_time, 1_603_587_600); // 2020-10-25T01:00:00Z
    assert!(transition.is_overlap());
    let ambiguous_local = transition.posix_time + 5400;
    let offsets = model.valid_offsets(ambiguous_local);
    assert_eq!(offsets, vec![3600, 7200]);
}

#[test]
fn us_rules_use_wall_clock_indicator() {
    let model = RuleBasedModel::new(-18000, us_rules(), &FixedClock(1_577_836_800)).unwrap();
    let transition = model.next_transition(1_577_836_800);
    // 2020-03-08T07:00:00Z: 02:00 local wall clock, -5h standard offset.
    assert_eq!(transition.posix_time, 1_583_650_800);
    assert_eq!(transition.previous_offset, -18000);
    assert_eq!(transition.total_offset, -14400);
}

#[test]
fn pre_model_history_has_no_transitions_before_it() {
    let initial = InitialTransition::StartingAt {
        posix_time: 946_684_800, // 2000-01-01T00:00:00Z
        standard_offset: 3600,
    };
    let model =
        RuleBasedModel::with_initial_transition(initial, eu_rules(), &FixedClock(946_684_800))
            .unwrap();

    assert_eq!(model.start_transition(946_684_800 - 1), None);
    assert_eq!(model.initial_offset(), 3600);

    let first = model.next_transition(946_684_800);
    assert!(first.posix_time > 946_684_800);
    assert_eq!(first.previous_offset, 3600);
}

#[test]
fn southern_hemisphere_rules_fire_twice_a_year() {
    let rules = vec![
        DaylightSavingRule::new(
            DateSelector::Fixed { month: 4, day: 1 },
            3 * 3600,
            0,
            Indicator::Utc,
        ),
        DaylightSavingRule::new(
            DateSelector::Fixed { month: 10, day: 1 },
            2 * 3600,
            3600,
            Indicator::Utc,
        ),
    ];
    let model = RuleBasedModel::new(36000, rules, &FixedClock(1_577_836_800)).unwrap();
    let transitions = model
        .transitions_in(1_577_836_800, 1_640_995_200) // 2020-01-01 .. 2022-01-01
        .unwrap();
    assert_eq!(transitions.len(), 4);
}

#[test]
fn rejects_rule_set_with_no_zero_savings_anchor() {
    let rules = vec![
        DaylightSavingRule::new(
            DateSelector::Fixed { month: 3, day: 1 },
            0,
            1800,
            Indicator::Utc,
        ),
        DaylightSavingRule::new(
            DateSelector::Fixed { month: 10, day: 1 },
            0,
            3600,
            Indicator::Utc,
        ),
    ];
    let result = RuleBasedModel::new(3600, rules, &FixedClock(0));
    assert_eq!(result.unwrap_err(), RuleError::NoZeroSavingsRule);
}

#[test]
fn rejects_single_rule_set() {
    let rules = vec![DaylightSavingRule::new(
        DateSelector::Fixed { month: 3, day: 1 },
        0,
        0,
        Indicator::Utc,
    )];
    let result = RuleBasedModel::new(3600, rules, &FixedClock(0));
    assert_eq!(result.unwrap_err(), RuleError::InvalidRuleCount(1));
}

#[test]
fn std_transitions_preview_covers_one_year_from_construction() {
    let now = 1_577_836_800; // 2020-01-01T00:00:00Z
    let model = RuleBasedModel::new(3600, eu_rules(), &FixedClock(now)).unwrap();
    let preview = model.std_transitions();
    assert!(!preview.is_empty());
    for transition in preview {
        assert!(transition.posix_time >= 0);
        assert!(transition.posix_time < now + 365 * 86_400);
    }
}

#[test]
fn proxy_round_trip_preserves_query_answers() {
    let model = RuleBasedModel::new(3600, eu_rules(), &FixedClock(1_577_836_800)).unwrap();
    let bytes = encode(&model);
    let decoded = decode(&bytes).unwrap();

    let probe_instants = [1_577_836_800, 1_585_443_600, 1_603_587_600];
    for instant in probe_instants {
        assert_eq!(model.next_transition(instant), decoded.next_transition(instant));
        assert_eq!(model.start_transition(instant), decoded.start_transition(instant));
    }
}
