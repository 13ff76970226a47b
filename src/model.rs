//! The public contract: construction-time validation and all queries over a
//! rule-based transition model.

use crate::cache::YearCache;
use crate::calendar;
use crate::clock::Clock;
use crate::error::RuleError;
use crate::rule::{canonical_order, DaylightSavingRule};
use crate::transition::{InitialTransition, ZonalTransition};
use crate::year::CycleWalker;

/// A rule-based timezone transition engine: a standard offset plus a small
/// recurring set of daylight-saving rules, answering offset and transition
/// queries for any instant or local wall-clock reading.
pub struct RuleBasedModel {
    standard_offset: i32,
    initial: InitialTransition,
    rules: Vec<DaylightSavingRule>,
    std_transitions: Vec<ZonalTransition>,
    cache: YearCache,
}

impl RuleBasedModel {
    /// Constructs a model whose rules apply for all time (no pre-model
    /// history to reconcile against).
    pub fn new(
        standard_offset: i32,
        rules: Vec<DaylightSavingRule>,
        clock: &dyn Clock,
    ) -> Result<Self, RuleError> {
        Self::build(
            InitialTransition::RulesForever { standard_offset },
            rules,
            clock,
        )
    }

    /// Constructs a model anchored to an explicit initial transition,
    /// marking the boundary between a caller-owned pre-model history and
    /// the rule-generated era (invariant 5 requires the first
    /// rule-generated transition after the boundary to continue from the
    /// initial total offset).
    pub fn with_initial_transition(
        initial: InitialTransition,
        rules: Vec<DaylightSavingRule>,
        clock: &dyn Clock,
    ) -> Result<Self, RuleError> {
        Self::build(initial, rules, clock)
    }

    fn build(
        initial: InitialTransition,
        mut rules: Vec<DaylightSavingRule>,
        clock: &dyn Clock,
    ) -> Result<Self, RuleError> {
        let standard_offset = initial.standard_offset();
        let std_offset = i64::from(standard_offset);

        if rules.len() < 2 || rules.len() >= 128 {
            #[cfg(feature = "log")]
            log::warn!("rejecting rule set: unsupported rule count {}", rules.len());
            return Err(RuleError::InvalidRuleCount(rules.len()));
        }
        if !rules.iter().any(|rule| rule.savings() == 0) {
            #[cfg(feature = "log")]
            log::warn!("rejecting rule set: no rule with zero savings to anchor standard time");
            return Err(RuleError::NoZeroSavingsRule);
        }
        if let Err(err) = canonical_order(&mut rules, std_offset) {
            #[cfg(feature = "log")]
            log::warn!("rejecting rule set: {err}");
            return Err(err);
        }

        if let Some(boundary) = initial.boundary() {
            let mut walker = CycleWalker::starting_from(&rules, std_offset, boundary);
            let first_after = loop {
                let candidate = walker.next_transition();
                if candidate.posix_time > boundary {
                    break candidate;
                }
            };
            if first_after.previous_offset != standard_offset {
                #[cfg(feature = "log")]
                log::warn!(
                    "rejecting initial transition: boundary offset {standard_offset} does not \
                     match first rule-generated transition's previous offset {}",
                    first_after.previous_offset
                );
                return Err(RuleError::InconsistentInitialTransition);
            }
        }

        let now = clock.now_posix_seconds();
        let construction_year =
            calendar::year_for_epoch_day(calendar::epoch_days_for_epoch_seconds(now));
        let cache = YearCache::new(construction_year);

        let initial_boundary = initial.boundary().unwrap_or(i64::MIN);
        let preview_end = now.saturating_add(365 * calendar::SECONDS_PER_DAY);
        let std_transitions =
            collect_transitions_in(&rules, std_offset, initial_boundary, 0, preview_end);

        #[cfg(feature = "log")]
        log::debug!(
            "constructed rule-based model with {} rules, standard offset {standard_offset}",
            rules.len()
        );

        Ok(Self {
            standard_offset,
            initial,
            rules,
            std_transitions,
            cache,
        })
    }

    /// The model's standard (non-DST) offset, in seconds from UTC.
    pub fn initial_offset(&self) -> i32 {
        self.initial.standard_offset()
    }

    /// The precomputed `[UNIX_EPOCH, construction_now + 1 year)` preview
    /// (invariant 6).
    pub fn std_transitions(&self) -> &[ZonalTransition] {
        &self.std_transitions
    }

    /// All transitions in `[start, end)` that lie strictly after the
    /// model's initial boundary.
    pub fn transitions_in(&self, start: i64, end: i64) -> Result<Vec<ZonalTransition>, RuleError> {
        if start > end {
            #[cfg(feature = "log")]
            log::warn!("rejecting transitions_in: start ({start}) is after end ({end})");
            return Err(RuleError::InvalidInterval { start, end });
        }
        Ok(collect_transitions_in(
            &self.rules,
            self.std_offset_i64(),
            self.initial_boundary(),
            start,
            end,
        ))
    }

    /// The first transition strictly after `max(instant, initial boundary)`.
    /// Always exists: the annual cycle is non-degenerate (at least 2 rules,
    /// at least one with zero savings), so the walk always makes progress.
    pub fn next_transition(&self, instant: i64) -> ZonalTransition {
        let start = instant.max(self.initial_boundary());
        let mut walker = CycleWalker::starting_from(&self.rules, self.std_offset_i64(), start);
        loop {
            let candidate = walker.next_transition();
            if candidate.posix_time > start {
                return candidate;
            }
        }
    }

    /// The greatest transition with `posix_time <= instant` that is still
    /// strictly after the initial boundary; `None` if `instant` falls at or
    /// before the boundary (§4.7).
    pub fn start_transition(&self, instant: i64) -> Option<ZonalTransition> {
        let boundary = self.initial_boundary();
        if instant <= boundary {
            return None;
        }

        let std_offset = self.std_offset_i64();
        let n = self.rules.len();
        let first_rule = &self.rules[0];
        let last_rule = &self.rules[n - 1];
        let shift = first_rule.shift(std_offset, last_rule.savings());
        let seed_day = calendar::epoch_days_for_epoch_seconds(instant + shift);
        let year = calendar::year_for_epoch_day(seed_day);

        let list = self.cache.get_year(year, &self.rules, std_offset);
        let position = list.iter().position(|t| t.posix_time > instant);

        let candidate = match position {
            Some(0) => {
                let previous_list = self.cache.get_year(year - 1, &self.rules, std_offset);
                previous_list.last().copied()
            }
            Some(index) => Some(list[index - 1]),
            None => list.last().copied(),
        };

        candidate.filter(|t| t.posix_time > boundary)
    }

    /// The transition whose local window contains `local_instant` as a gap
    /// or overlap, or `None` if `local_instant` denotes exactly one offset
    /// (§4.8).
    pub fn conflict_transition(&self, local_instant: i64) -> Option<ZonalTransition> {
        self.local_time_lookup(local_instant).0
    }

    /// The offsets `local_instant` may legitimately denote: empty inside a
    /// gap, one outside any window, two inside an overlap (§4.8).
    pub fn valid_offsets(&self, local_instant: i64) -> Vec<i32> {
        self.local_time_lookup(local_instant).1
    }

    fn local_time_lookup(&self, local_instant: i64) -> (Option<ZonalTransition>, Vec<i32>) {
        let boundary = self.initial_boundary();
        let standard_offset = self.initial.standard_offset();
        let threshold = boundary.saturating_add(i64::from(standard_offset));
        if local_instant <= threshold {
            return (None, vec![standard_offset]);
        }

        let std_offset = self.std_offset_i64();
        let year =
            calendar::year_for_epoch_day(calendar::epoch_days_for_epoch_seconds(local_instant));
        let year_list = self.cache.get_year(year, &self.rules, std_offset);

        let mut running_offset = year_list
            .first()
            .map(|t| t.previous_offset)
            .unwrap_or(standard_offset);

        for transition in year_list.iter() {
            if transition.is_gap() {
                let window_start = transition.posix_time + i64::from(transition.previous_offset);
                let window_end = transition.posix_time + i64::from(transition.total_offset);
                if local_instant >= window_start && local_instant < window_end {
                    return (Some(*transition), Vec::new());
                }
                if local_instant < window_start {
                    return (None, vec![running_offset]);
                }
            } else if transition.is_overlap() {
                let window_start = transition.posix_time + i64::from(transition.total_offset);
                let window_end = transition.posix_time + i64::from(transition.previous_offset);
                if local_instant >= window_start && local_instant < window_end {
                    return (
                        Some(*transition),
                        vec![transition.total_offset, transition.previous_offset],
                    );
                }
                if local_instant < window_start {
                    return (None, vec![running_offset]);
                }
            } else if local_instant < transition.posix_time + i64::from(transition.total_offset) {
                return (None, vec![running_offset]);
            }
            running_offset = transition.total_offset;
        }

        (None, vec![running_offset])
    }

    fn std_offset_i64(&self) -> i64 {
        i64::from(self.standard_offset)
    }

    fn initial_boundary(&self) -> i64 {
        self.initial.boundary().unwrap_or(i64::MIN)
    }

    pub(crate) fn rules(&self) -> &[DaylightSavingRule] {
        &self.rules
    }

    pub(crate) fn initial(&self) -> InitialTransition {
        self.initial
    }
}

fn collect_transitions_in(
    rules: &[DaylightSavingRule],
    std_offset: i64,
    initial_boundary: i64,
    start: i64,
    end: i64,
) -> Vec<ZonalTransition> {
    if end <= initial_boundary || start == end {
        return Vec::new();
    }

    let seed = start.max(initial_boundary);
    let mut walker = CycleWalker::starting_from(rules, std_offset, seed);
    let mut output = Vec::new();
    loop {
        let transition = walker.next_transition();
        if transition.posix_time >= end {
            break;
        }
        if transition.posix_time >= start && transition.posix_time > initial_boundary {
            output.push(transition);
        }
    }
    output
}
