//! A rule-based daylight-saving time extrapolation engine.
//!
//! Given a standard UTC offset and a small recurring set of annual
//! daylight-saving rules, [`RuleBasedModel`] answers offset and transition
//! queries for any UTC instant or civil (local) time reading, including the
//! gap and overlap semantics a civil time falls into around a transition.
//!
//! This is the extrapolation tail of a historical transition table: it has
//! no opinion on anything before its initial transition, and generates every
//! transition after it from the rule set alone.
#![forbid(unsafe_code)]

mod cache;
mod calendar;
mod clock;
mod error;
mod model;
mod proxy;
mod rule;
mod transition;
mod year;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{ProxyError, RuleError};
pub use model::RuleBasedModel;
pub use proxy::{decode, encode};
pub use rule::{DateSelector, DaylightSavingRule, Indicator, Weekday};
pub use transition::{InitialTransition, ZonalTransition};
