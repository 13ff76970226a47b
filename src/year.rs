//! The year expander and the shared cycle-walking algorithm backing
//! `transitions_in`, `next_transition`, and the cache's per-year
//! materialisation.

use crate::calendar;
use crate::rule::DaylightSavingRule;
use crate::transition::ZonalTransition;

/// Materialises exactly `rules.len()` transitions for the given Gregorian
/// year, one per rule, in annual-cycle order. The predecessor of rule `i` is
/// `rules[(i - 1) mod n]`, wrapping from December back to January of the
/// *same* year — a deliberate simplification since the rule list has a
/// cyclic pre-image (§4.4 / DESIGN.md "Previous-savings wrap").
pub(crate) fn transitions_for_year(
    rules: &[DaylightSavingRule],
    std_offset: i64,
    year: i32,
) -> Vec<ZonalTransition> {
    let n = rules.len();
    (0..n)
        .map(|i| {
            let rule = &rules[i];
            let prev = &rules[(i + n - 1) % n];
            build_transition(rule, prev, std_offset, year)
        })
        .collect()
}

fn build_transition(
    rule: &DaylightSavingRule,
    prev: &DaylightSavingRule,
    std_offset: i64,
    year: i32,
) -> ZonalTransition {
    let previous_offset = std_offset + i64::from(prev.savings());
    let total_offset = std_offset + i64::from(rule.savings());
    let posix_time = rule.transition_instant(year, std_offset, prev.savings());
    ZonalTransition::new(
        posix_time,
        previous_offset as i32,
        total_offset as i32,
        rule.savings(),
    )
}

/// Walks the annual cycle forward from a seed instant, one rule at a time,
/// incrementing the Gregorian year only when the cycle wraps back to rule
/// index 0 (§4.5). Used by `transitions_in` and `next_transition`, which
/// differ only in where they stop.
pub(crate) struct CycleWalker<'a> {
    rules: &'a [DaylightSavingRule],
    std_offset: i64,
    index: usize,
    year: i32,
}

impl<'a> CycleWalker<'a> {
    /// `seed_instant` should already be `max(query_instant, initial_boundary)`
    /// per §4.5 step 3.
    pub(crate) fn starting_from(
        rules: &'a [DaylightSavingRule],
        std_offset: i64,
        seed_instant: i64,
    ) -> Self {
        let n = rules.len();
        let first_rule = &rules[0];
        let last_rule = &rules[n - 1];
        let shift = first_rule.shift(std_offset, last_rule.savings());
        let seed_day = calendar::epoch_days_for_epoch_seconds(seed_instant + shift);
        let year = calendar::year_for_epoch_day(seed_day);

        Self {
            rules,
            std_offset,
            index: 0,
            year,
        }
    }

    /// Produces the next transition in cycle order.
    pub(crate) fn next_transition(&mut self) -> ZonalTransition {
        let n = self.rules.len();
        let slot = self.index % n;
        if self.index > 0 && slot == 0 {
            self.year += 1;
        }
        let rule = &self.rules[slot];
        let prev = &self.rules[(slot + n - 1) % n];
        let transition = build_transition(rule, prev, self.std_offset, self.year);
        self.index += 1;
        transition
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{DateSelector, DaylightSavingRule, Indicator, Weekday};

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

    #[test]
    fn year_expander_produces_one_transition_per_rule() {
        let rules = eu_rules();
        let transitions = transitions_for_year(&rules, 3600, 2020);
        assert_eq!(transitions.len(), 2);
        assert!(transitions[0].posix_time < transitions[1].posix_time);
        assert_eq!(transitions[0].total_offset, 7200);
        assert_eq!(transitions[1].total_offset, 3600);
    }

    #[test]
    fn year_expander_is_deterministic() {
        let rules = eu_rules();
        let first = transitions_for_year(&rules, 3600, 2020);
        let second = transitions_for_year(&rules, 3600, 2020);
        assert_eq!(first, second);
    }

    #[test]
    fn cycle_walker_advances_across_year_boundary() {
        let rules = eu_rules();
        let mut walker = CycleWalker::starting_from(&rules, 3600, 1_577_836_800 /* 2020-01-01 */);
        let mut last = i64::MIN;
        for _ in 0..4 {
            let t = walker.next_transition();
            assert!(t.posix_time > last);
            last = t.posix_time;
        }
    }
}
