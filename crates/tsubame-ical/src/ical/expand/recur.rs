//! Lazy recurrence rule expansion (RFC 5545 §3.3.10).
//!
//! [`expand`] validates the rule eagerly and returns [`Occurrences`], a
//! pull-based iterator that materializes one anchor's candidate set per
//! refill. Rule combinations outside the supported matrix fail loudly
//! instead of silently producing wrong dates.

use std::collections::VecDeque;

use chrono::{Datelike, Duration as ChronoDuration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use thiserror::Error;

use crate::ical::core::{Frequency, RRule, RRuleUntil, Weekday, WeekdayNum};

/// Consecutive anchors with an empty candidate set before the iterator
/// gives up on a rule that can never match again.
const MAX_BARREN_ANCHORS: u32 = 1000;

/// Errors raised while preparing a rule for expansion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpandError {
    /// The rule part is not implemented for this frequency.
    #[error("no support for {rule} with FREQ={freq}")]
    Unsupported {
        /// The offending rule part.
        rule: &'static str,
        /// The rule's frequency.
        freq: Frequency,
    },
    /// The two rule parts are not implemented together.
    #[error("no support for combining {first} with {second}")]
    UnsupportedCombination {
        /// First rule part.
        first: &'static str,
        /// Second rule part.
        second: &'static str,
    },
    /// The UNTIL bound does not exist on the calendar.
    #[error("UNTIL bound '{0}' is not a valid calendar date")]
    InvalidUntil(String),
}

/// Rejects rule combinations the candidate pipeline does not implement.
fn validate(rule: &RRule) -> Result<(), ExpandError> {
    let freq = rule.freq;

    if !rule.by_weekno.is_empty() {
        return Err(ExpandError::Unsupported {
            rule: "BYWEEKNO",
            freq,
        });
    }
    if !rule.by_yearday.is_empty() {
        return Err(ExpandError::Unsupported {
            rule: "BYYEARDAY",
            freq,
        });
    }
    if rule.by_month.iter().any(|&m| m < 0) {
        return Err(ExpandError::Unsupported {
            rule: "negative BYMONTH",
            freq,
        });
    }
    if !rule.by_monthday.is_empty() && freq == Frequency::Weekly {
        return Err(ExpandError::Unsupported {
            rule: "BYMONTHDAY",
            freq,
        });
    }
    if !rule.by_day.is_empty() && !rule.by_monthday.is_empty() {
        return Err(ExpandError::UnsupportedCombination {
            first: "BYDAY",
            second: "BYMONTHDAY",
        });
    }
    if rule.by_day.iter().any(|entry| entry.ordinal.is_some())
        && !matches!(freq, Frequency::Monthly | Frequency::Yearly)
    {
        return Err(ExpandError::Unsupported {
            rule: "ordinal BYDAY",
            freq,
        });
    }
    Ok(())
}

/// Expands a recurrence rule into its occurrence sequence.
///
/// `start` is the DTSTART anchor in its own wall-clock reference frame;
/// `end` is an optional exclusive bound. The rule's UNTIL (also exclusive,
/// with a date-only UNTIL read as midnight) and the caller bound are
/// combined by taking the earlier of the two. COUNT is honored after each
/// yield.
///
/// ## Errors
/// Returns [`ExpandError`] for rule combinations outside the supported
/// matrix, so the returned iterator itself is infallible.
#[tracing::instrument(skip_all, fields(rule = %rule, start = %start))]
pub fn expand(
    rule: &RRule,
    start: NaiveDateTime,
    end: Option<NaiveDateTime>,
) -> Result<Occurrences, ExpandError> {
    validate(rule)?;

    let until = match &rule.until {
        None => None,
        Some(RRuleUntil::Date(date)) => Some(
            date.to_naive()
                .ok_or_else(|| ExpandError::InvalidUntil(date.to_string()))?
                .and_time(NaiveTime::MIN),
        ),
        Some(RRuleUntil::DateTime(dt)) => Some(
            dt.to_naive()
                .ok_or_else(|| ExpandError::InvalidUntil(dt.to_string()))?,
        ),
    };
    let end = match (until, end) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    };

    tracing::debug!(count = ?rule.count, end = ?end, "prepared recurrence expansion");

    Ok(Occurrences {
        rule: rule.clone(),
        start,
        end,
        base_day: start.day(),
        week_start: rule.week_start.unwrap_or(Weekday::Monday),
        remaining: rule.count,
        step: 0,
        pending: VecDeque::new(),
        barren: 0,
        done: false,
    })
}

/// Lazy occurrence iterator returned by [`expand`].
///
/// Yields wall-clock occurrences in ascending order; each pull advances
/// the sequence by at most one anchor's worth of work.
#[derive(Debug, Clone)]
pub struct Occurrences {
    rule: RRule,
    start: NaiveDateTime,
    end: Option<NaiveDateTime>,
    base_day: u32,
    week_start: Weekday,
    remaining: Option<u32>,
    step: u32,
    pending: VecDeque<NaiveDateTime>,
    barren: u32,
    done: bool,
}

impl Iterator for Occurrences {
    type Item = NaiveDateTime;

    fn next(&mut self) -> Option<NaiveDateTime> {
        while !self.done {
            if let Some(candidate) = self.pending.pop_front() {
                if candidate < self.start {
                    continue;
                }
                if self.end.is_some_and(|end| candidate >= end) {
                    self.done = true;
                    return None;
                }
                if let Some(remaining) = &mut self.remaining {
                    if *remaining == 0 {
                        self.done = true;
                        return None;
                    }
                    *remaining -= 1;
                }
                return Some(candidate);
            }
            self.refill();
        }
        None
    }
}

impl Occurrences {
    fn refill(&mut self) {
        let Some(anchor) = self.anchor() else {
            self.done = true;
            return;
        };
        self.step += 1;

        if let Some(end) = self.end {
            if self.scope_floor(anchor) > end {
                self.done = true;
                return;
            }
        }

        let candidates = self.candidates_for(anchor);
        if candidates.is_empty() {
            self.barren += 1;
            if self.barren >= MAX_BARREN_ANCHORS {
                tracing::warn!(rule = %self.rule, "giving up on rule after {MAX_BARREN_ANCHORS} empty anchors");
                self.done = true;
            }
        } else {
            self.barren = 0;
            self.pending.extend(candidates);
        }
    }

    /// The `step`-th frequency anchor, stepped at `interval` from DTSTART.
    ///
    /// Yearly anchors snap Feb 29 starts to Feb 28 in common years;
    /// monthly anchors clamp the start's day-of-month to the target
    /// month's length.
    fn anchor(&self) -> Option<NaiveDateTime> {
        let total = self.step.checked_mul(self.rule.effective_interval())?;
        let time = self.start.time();
        match self.rule.freq {
            Frequency::Yearly => {
                let year = self
                    .start
                    .year()
                    .checked_add(i32::try_from(total).ok()?)?;
                let month = self.start.month();
                let day = self.base_day.min(days_in_month(year, month));
                Some(NaiveDate::from_ymd_opt(year, month, day)?.and_time(time))
            }
            Frequency::Monthly => {
                let months = i64::from(self.start.month0()) + i64::from(total);
                let year = self
                    .start
                    .year()
                    .checked_add(i32::try_from(months / 12).ok()?)?;
                let month = u32::try_from(months % 12).ok()? + 1;
                let day = self.base_day.min(days_in_month(year, month));
                Some(NaiveDate::from_ymd_opt(year, month, day)?.and_time(time))
            }
            Frequency::Weekly => self
                .start
                .checked_add_signed(ChronoDuration::weeks(i64::from(total))),
            Frequency::Daily => self
                .start
                .checked_add_signed(ChronoDuration::days(i64::from(total))),
            Frequency::Hourly => self
                .start
                .checked_add_signed(ChronoDuration::hours(i64::from(total))),
            Frequency::Minutely => self
                .start
                .checked_add_signed(ChronoDuration::minutes(i64::from(total))),
            Frequency::Secondly => self
                .start
                .checked_add_signed(ChronoDuration::seconds(i64::from(total))),
        }
    }

    /// Earliest instant the anchor's candidate set could contain; once the
    /// floor passes the bound no later anchor can contribute.
    fn scope_floor(&self, anchor: NaiveDateTime) -> NaiveDateTime {
        match self.rule.freq {
            Frequency::Yearly => NaiveDate::from_ymd_opt(anchor.year(), 1, 1)
                .map_or(anchor, |d| d.and_time(NaiveTime::MIN)),
            Frequency::Monthly => NaiveDate::from_ymd_opt(anchor.year(), anchor.month(), 1)
                .map_or(anchor, |d| d.and_time(NaiveTime::MIN)),
            Frequency::Weekly => anchor
                .date()
                .checked_sub_signed(ChronoDuration::days(6))
                .map_or(anchor, |d| d.and_time(NaiveTime::MIN)),
            _ => anchor,
        }
    }

    /// Runs the BYxxx pipeline for one anchor, in RFC evaluation order.
    #[expect(
        clippy::too_many_lines,
        reason = "the pipeline stages are only meaningful in sequence"
    )]
    fn candidates_for(&self, anchor: NaiveDateTime) -> Vec<NaiveDateTime> {
        let rule = &self.rule;
        let time = anchor.time();
        let mut dates: Vec<NaiveDate> = vec![anchor.date()];

        if !rule.by_month.is_empty() {
            if rule.freq == Frequency::Yearly {
                // Expand: one date per listed month. A later BY part
                // rewrites the day, so a placeholder carries the month;
                // otherwise the start's day applies and months too short
                // for it produce nothing.
                let rewrites_day = !rule.by_monthday.is_empty() || !rule.by_day.is_empty();
                dates = rule
                    .by_month
                    .iter()
                    .filter_map(|&m| {
                        let month = u32::from(m.unsigned_abs());
                        let day = if rewrites_day { 1 } else { self.base_day };
                        NaiveDate::from_ymd_opt(anchor.year(), month, day)
                    })
                    .collect();
            } else {
                dates.retain(|d| month_listed(&rule.by_month, d.month()));
            }
        }

        if !rule.by_monthday.is_empty() {
            if matches!(rule.freq, Frequency::Yearly | Frequency::Monthly) {
                // Expand within each date's month; rollovers are dropped.
                dates = dates
                    .iter()
                    .flat_map(|&base| {
                        rule.by_monthday.iter().filter_map(move |&md| {
                            let day = resolve_monthday(base.year(), base.month(), md)?;
                            NaiveDate::from_ymd_opt(base.year(), base.month(), day)
                        })
                    })
                    .collect();
            } else {
                dates.retain(|d| {
                    rule.by_monthday
                        .iter()
                        .any(|&md| resolve_monthday(d.year(), d.month(), md) == Some(d.day()))
                });
            }
        }

        if !rule.by_day.is_empty() {
            match rule.freq {
                Frequency::Weekly => {
                    let week_start_date = week_start_of(anchor.date(), self.week_start);
                    let mut expanded: Vec<NaiveDate> = rule
                        .by_day
                        .iter()
                        .filter_map(|entry| {
                            let offset =
                                days_from_week_start(entry.weekday, self.week_start);
                            week_start_date
                                .checked_add_signed(ChronoDuration::days(i64::from(offset)))
                        })
                        .collect();
                    // The week expansion starts over from the anchor, so the
                    // month limit has to be applied again.
                    if !rule.by_month.is_empty() {
                        expanded.retain(|d| month_listed(&rule.by_month, d.month()));
                    }
                    dates = expanded;
                }
                Frequency::Monthly | Frequency::Yearly => {
                    let month_scoped =
                        rule.freq == Frequency::Monthly || !rule.by_month.is_empty();
                    if month_scoped {
                        dates = dates
                            .iter()
                            .flat_map(|&base| {
                                rule.by_day.iter().flat_map(move |&entry| {
                                    weekday_dates_in_month(base.year(), base.month(), entry)
                                })
                            })
                            .collect();
                    } else {
                        dates = rule
                            .by_day
                            .iter()
                            .flat_map(|&entry| weekday_dates_in_year(anchor.year(), entry))
                            .collect();
                    }
                }
                _ => {
                    dates.retain(|d| {
                        rule.by_day
                            .iter()
                            .any(|entry| entry.weekday.to_chrono() == d.weekday())
                    });
                }
            }
        }

        let mut candidates: Vec<NaiveDateTime> =
            dates.into_iter().map(|d| d.and_time(time)).collect();

        if !rule.by_hour.is_empty() {
            candidates.retain(|c| rule.by_hour.iter().any(|&h| u32::from(h) == c.hour()));
        }
        if !rule.by_minute.is_empty() {
            candidates.retain(|c| rule.by_minute.iter().any(|&m| u32::from(m) == c.minute()));
        }
        if !rule.by_second.is_empty() {
            candidates.retain(|c| rule.by_second.iter().any(|&s| u32::from(s) == c.second()));
        }

        candidates.sort_unstable();
        candidates.dedup();

        if !rule.by_setpos.is_empty() {
            candidates = apply_setpos(&candidates, &rule.by_setpos);
        }
        candidates
    }
}

fn month_listed(by_month: &[i8], month: u32) -> bool {
    by_month.iter().any(|&m| u32::from(m.unsigned_abs()) == month)
}

/// Number of days in a month, via the last day before the next month.
fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map_or(30, |last| last.day())
}

/// Resolves a signed BYMONTHDAY to a day of the given month, counting
/// negative values from the end. `None` when the day does not exist.
fn resolve_monthday(year: i32, month: u32, monthday: i8) -> Option<u32> {
    let len = days_in_month(year, month);
    let magnitude = u32::from(monthday.unsigned_abs());
    if monthday > 0 {
        (magnitude <= len).then_some(magnitude)
    } else {
        (magnitude <= len).then(|| len - magnitude + 1)
    }
}

/// Days from `week_start` forward to `weekday` (0..=6).
fn days_from_week_start(weekday: Weekday, week_start: Weekday) -> u32 {
    (u32::from(weekday.days_from_sunday()) + 7 - u32::from(week_start.days_from_sunday())) % 7
}

/// The most recent `week_start` day on or before `date`.
fn week_start_of(date: NaiveDate, week_start: Weekday) -> NaiveDate {
    let offset = days_from_week_start(Weekday::from_chrono(date.weekday()), week_start);
    date.checked_sub_signed(ChronoDuration::days(i64::from(offset)))
        .unwrap_or(date)
}

fn select_ordinal(all: Vec<NaiveDate>, ordinal: Option<i8>) -> Vec<NaiveDate> {
    match ordinal {
        None => all,
        Some(n) if n > 0 => all
            .get(usize::from(n.unsigned_abs()) - 1)
            .copied()
            .into_iter()
            .collect(),
        Some(n) => {
            let back = usize::from(n.unsigned_abs());
            if back <= all.len() {
                vec![all[all.len() - back]]
            } else {
                Vec::new()
            }
        }
    }
}

/// All occurrences of a BYDAY entry within one month, with ordinal
/// selection applied.
fn weekday_dates_in_month(year: i32, month: u32, entry: WeekdayNum) -> Vec<NaiveDate> {
    let target = entry.weekday.to_chrono();
    let all: Vec<NaiveDate> = (1..=days_in_month(year, month))
        .filter_map(|day| NaiveDate::from_ymd_opt(year, month, day))
        .filter(|d| d.weekday() == target)
        .collect();
    select_ordinal(all, entry.ordinal)
}

/// All occurrences of a BYDAY entry within one year, with ordinal
/// selection applied.
fn weekday_dates_in_year(year: i32, entry: WeekdayNum) -> Vec<NaiveDate> {
    let target = entry.weekday.to_chrono();
    let mut all = Vec::new();
    let Some(mut date) = NaiveDate::from_ymd_opt(year, 1, 1) else {
        return all;
    };
    while date.year() == year {
        if date.weekday() == target {
            all.push(date);
        }
        match date.succ_opt() {
            Some(next) => date = next,
            None => break,
        }
    }
    select_ordinal(all, entry.ordinal)
}

/// Positional selection over an anchor's fully expanded candidate set.
fn apply_setpos(candidates: &[NaiveDateTime], positions: &[i16]) -> Vec<NaiveDateTime> {
    let len = i64::try_from(candidates.len()).unwrap_or(i64::MAX);
    let mut selected: Vec<NaiveDateTime> = positions
        .iter()
        .filter_map(|&pos| {
            let index = if pos > 0 {
                i64::from(pos) - 1
            } else {
                len + i64::from(pos)
            };
            usize::try_from(index)
                .ok()
                .and_then(|i| candidates.get(i).copied())
        })
        .collect();
    selected.sort_unstable();
    selected.dedup();
    selected
}
