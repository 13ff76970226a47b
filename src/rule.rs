//! Recurring daylight-saving rule definitions, the POSIX-style date
//! selectors they resolve through, and the canonical annual-cycle ordering.

use crate::calendar;
use crate::error::{ProxyError, RuleError};

/// Which offset basis a rule's time-of-day is expressed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    /// The time-of-day is already a UTC instant.
    Utc,
    /// The time-of-day is local standard time (standard offset applied, no DST).
    Standard,
    /// The time-of-day is local wall-clock time (standard offset plus whatever
    /// savings were in effect immediately before this rule fires).
    Wall,
}

/// Day of the week, `0` based from Sunday to match [`calendar::day_of_week`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Weekday {
    Sun = 0,
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
}

/// A closed sum of the ways a rule can pick its firing date within a given
/// Gregorian year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSelector {
    /// A fixed day of the given month.
    Fixed { month: u8, day: u8 },
    /// The last occurrence of `weekday` in `month`.
    LastWeekday { month: u8, weekday: Weekday },
    /// The first occurrence of `weekday` on or after `day` of `month`.
    WeekdayOnOrAfter { month: u8, weekday: Weekday, day: u8 },
    /// The last occurrence of `weekday` on or before `day` of `month`.
    WeekdayOnOrBefore { month: u8, weekday: Weekday, day: u8 },
}

impl DateSelector {
    pub(crate) fn month(&self) -> u8 {
        match *self {
            Self::Fixed { month, .. }
            | Self::LastWeekday { month, .. }
            | Self::WeekdayOnOrAfter { month, .. }
            | Self::WeekdayOnOrBefore { month, .. } => month,
        }
    }

    /// Resolves this selector to an epoch day for the given Gregorian year.
    pub(crate) fn epoch_day(&self, year: i32) -> i32 {
        let leap = calendar::is_leap_year(year);
        let year_start = calendar::epoch_days_for_year(year);

        match *self {
            Self::Fixed { month, day } => {
                year_start
                    + i32::from(calendar::day_of_year_until_start_of_month(month, leap))
                    + i32::from(day)
                    - 1
            }
            Self::LastWeekday { month, weekday } => {
                let month_end_day_of_year = if month == 12 {
                    i32::from(calendar::days_in_year(year)) - 1
                } else {
                    i32::from(calendar::day_of_year_until_start_of_month(month + 1, leap)) - 1
                };
                let mut candidate = year_start + month_end_day_of_year;
                while calendar::day_of_week(candidate) != weekday as u8 {
                    candidate -= 1;
                }
                candidate
            }
            Self::WeekdayOnOrAfter { month, weekday, day } => {
                let mut candidate = year_start
                    + i32::from(calendar::day_of_year_until_start_of_month(month, leap))
                    + i32::from(day)
                    - 1;
                while calendar::day_of_week(candidate) != weekday as u8 {
                    candidate += 1;
                }
                candidate
            }
            Self::WeekdayOnOrBefore { month, weekday, day } => {
                let mut candidate = year_start
                    + i32::from(calendar::day_of_year_until_start_of_month(month, leap))
                    + i32::from(day)
                    - 1;
                while calendar::day_of_week(candidate) != weekday as u8 {
                    candidate -= 1;
                }
                candidate
            }
        }
    }

    /// Day-in-year of this selector's resolution in a fixed non-leap
    /// reference year, used only to order rules within the annual cycle
    /// independent of which concrete year they eventually fire in.
    fn reference_day_in_year(&self) -> i32 {
        const REFERENCE_YEAR: i32 = 2001;
        self.epoch_day(REFERENCE_YEAR) - calendar::epoch_days_for_year(REFERENCE_YEAR)
    }
}

/// An immutable description of one recurring annual daylight-saving switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaylightSavingRule {
    date: DateSelector,
    /// Seconds since local midnight; may exceed 86 400 to mean "the next
    /// civil day".
    time_of_day: i64,
    /// Seconds added to the standard offset once this rule takes effect.
    savings: i32,
    indicator: Indicator,
}

impl DaylightSavingRule {
    pub fn new(date: DateSelector, time_of_day: i64, savings: i32, indicator: Indicator) -> Self {
        Self {
            date,
            time_of_day,
            savings,
            indicator,
        }
    }

    pub fn date_epoch_day(&self, year: i32) -> i32 {
        self.date.epoch_day(year)
    }

    pub fn date_selector(&self) -> DateSelector {
        self.date
    }

    pub fn time_of_day(&self) -> i64 {
        self.time_of_day
    }

    pub fn savings(&self) -> i32 {
        self.savings
    }

    pub fn indicator(&self) -> Indicator {
        self.indicator
    }

    /// The conversion shift (§4.2) for this rule's indicator: the number of
    /// seconds to add to this rule's locally-expressed time-of-day to reach a
    /// POSIX second count, given the model's standard offset and the savings
    /// in effect immediately before this rule fires.
    pub(crate) fn shift(&self, std_offset: i64, previous_savings: i32) -> i64 {
        match self.indicator {
            Indicator::Utc => 0,
            Indicator::Standard => std_offset,
            Indicator::Wall => std_offset + i64::from(previous_savings),
        }
    }

    /// The POSIX instant at which this rule fires in the given year.
    pub(crate) fn transition_instant(
        &self,
        year: i32,
        std_offset: i64,
        previous_savings: i32,
    ) -> i64 {
        let epoch_day = self.date_epoch_day(year);
        calendar::epoch_seconds_for_epoch_days(epoch_day) + self.time_of_day
            - self.shift(std_offset, previous_savings)
    }

    /// Canonical ordering key (§4.3): month, then day position within a
    /// reference year, then time-of-day normalized to a common basis using a
    /// nominal savings of zero.
    fn ordering_key(&self, std_offset: i64) -> (u8, i32, i64) {
        let nominal_shift = match self.indicator {
            Indicator::Utc => 0,
            Indicator::Standard | Indicator::Wall => std_offset,
        };
        (
            self.date.month(),
            self.date.reference_day_in_year(),
            self.time_of_day - nominal_shift,
        )
    }
}

fn weekday_from_tag(tag: u8) -> Result<Weekday, ProxyError> {
    match tag {
        0 => Ok(Weekday::Sun),
        1 => Ok(Weekday::Mon),
        2 => Ok(Weekday::Tue),
        3 => Ok(Weekday::Wed),
        4 => Ok(Weekday::Thu),
        5 => Ok(Weekday::Fri),
        6 => Ok(Weekday::Sat),
        _ => Err(ProxyError::MalformedStream),
    }
}

/// One rule's fixed-width wire encoding, concatenated by
/// [`crate::proxy::encode`]: a selector tag, month, weekday, day, an
/// indicator tag, then `time_of_day` and `savings` as big-endian integers.
const RULE_WIRE_LEN: usize = 4 + 1 + 8 + 4;

impl DaylightSavingRule {
    pub(crate) fn encode(&self, out: &mut Vec<u8>) {
        let (selector_tag, month, weekday, day) = match self.date {
            DateSelector::Fixed { month, day } => (0u8, month, 0u8, day),
            DateSelector::LastWeekday { month, weekday } => (1u8, month, weekday as u8, 0u8),
            DateSelector::WeekdayOnOrAfter { month, weekday, day } => {
                (2u8, month, weekday as u8, day)
            }
            DateSelector::WeekdayOnOrBefore { month, weekday, day } => {
                (3u8, month, weekday as u8, day)
            }
        };
        out.push(selector_tag);
        out.push(month);
        out.push(weekday);
        out.push(day);
        out.push(match self.indicator {
            Indicator::Utc => 0,
            Indicator::Standard => 1,
            Indicator::Wall => 2,
        });
        out.extend_from_slice(&self.time_of_day.to_be_bytes());
        out.extend_from_slice(&self.savings.to_be_bytes());
    }

    /// Decodes one rule from the front of `bytes`, returning it alongside the
    /// number of bytes consumed.
    pub(crate) fn decode(bytes: &[u8]) -> Result<(Self, usize), ProxyError> {
        if bytes.len() < RULE_WIRE_LEN {
            return Err(ProxyError::MalformedStream);
        }
        let selector_tag = bytes[0];
        let month = bytes[1];
        let weekday = weekday_from_tag(bytes[2])?;
        let day = bytes[3];
        let date = match selector_tag {
            0 => DateSelector::Fixed { month, day },
            1 => DateSelector::LastWeekday { month, weekday },
            2 => DateSelector::WeekdayOnOrAfter { month, weekday, day },
            3 => DateSelector::WeekdayOnOrBefore { month, weekday, day },
            _ => return Err(ProxyError::MalformedStream),
        };
        let indicator = match bytes[4] {
            0 => Indicator::Utc,
            1 => Indicator::Standard,
            2 => Indicator::Wall,
            other => return Err(ProxyError::UnsupportedIndicator(other)),
        };
        let time_of_day = i64::from_be_bytes(bytes[5..13].try_into().unwrap());
        let savings = i32::from_be_bytes(bytes[13..17].try_into().unwrap());
        Ok((Self::new(date, time_of_day, savings, indicator), RULE_WIRE_LEN))
    }
}

/// Sorts `rules` into the canonical annual-cycle order (§4.3) and rejects
/// rule sets where two distinct rules resolve to the same position in the
/// cycle, per the construction-time resolution of the ordering tie-break
/// open question.
pub(crate) fn canonical_order(
    rules: &mut [DaylightSavingRule],
    std_offset: i64,
) -> Result<(), RuleError> {
    rules.sort_by_key(|rule| rule.ordering_key(std_offset));
    if rules
        .windows(2)
        .any(|pair| pair[0].ordering_key(std_offset) == pair[1].ordering_key(std_offset))
    {
        return Err(RuleError::AmbiguousRuleOrder);
    }
    Ok(())
}
