//! Bounded concurrent memoisation of the year expander's output (§4.6).
//!
//! A per-key cache generalizing a single global lock slot to multiple keys:
//! a shared read lock covers the common case, and a miss drops to an
//! exclusive "insert if still absent" write so that two racing writers
//! publish pointwise-equal, fully formed lists and the loser's freshly
//! computed copy is simply dropped.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::rule::DaylightSavingRule;
use crate::transition::ZonalTransition;
use crate::year::transitions_for_year;

pub(crate) struct YearCache {
    entries: RwLock<HashMap<i32, Arc<[ZonalTransition]>>>,
    last_cached_year: i32,
}

impl YearCache {
    /// `construction_year` anchors the bounded horizon: years beyond
    /// `construction_year + 100` are computed on every call rather than
    /// retained, so unbounded future lookups cannot grow memory without
    /// bound (§4.6).
    pub(crate) fn new(construction_year: i32) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            last_cached_year: construction_year.saturating_add(100),
        }
    }

    pub(crate) fn get_year(
        &self,
        year: i32,
        rules: &[DaylightSavingRule],
        std_offset: i64,
    ) -> Arc<[ZonalTransition]> {
        if let Some(hit) = self.entries.read().expect("year cache poisoned").get(&year) {
            return Arc::clone(hit);
        }

        #[cfg(feature = "log")]
        log::trace!("year cache miss for {year}, materialising");

        let computed: Arc<[ZonalTransition]> =
            transitions_for_year(rules, std_offset, year).into();

        if year > self.last_cached_year {
            return computed;
        }

        let mut entries = self.entries.write().expect("year cache poisoned");
        match entries.entry(year) {
            Entry::Occupied(existing) => Arc::clone(existing.get()),
            Entry::Vacant(slot) => Arc::clone(slot.insert(computed)),
        }
    }
}
