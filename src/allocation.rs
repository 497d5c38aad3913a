// src/allocation.rs
use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;
use tracing::debug;

use crate::calendar::{count_working_days, is_rest_day};
use crate::record::{SchedulingRecord, Status};
use crate::rounding::{round_half_up, rounded_share, split_halves, to_decimal};
use crate::specific_dates::{explicit_total, legacy_entry_count, parse_specific_dates};

// --- Allocation Results ---

/// People attributed to one record on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DayAllocation {
    pub total: u32,
    pub morning: u32,
    pub afternoon: u32,
}

impl DayAllocation {
    pub const ZERO: DayAllocation = DayAllocation {
        total: 0,
        morning: 0,
        afternoon: 0,
    };

    pub fn new(total: u32, morning: u32, afternoon: u32) -> Self {
        Self {
            total,
            morning,
            afternoon,
        }
    }

    /// Even morning/afternoon split of a day count.
    pub fn from_total(total: u32) -> Self {
        let (morning, afternoon) = split_halves(total);
        Self::new(total, morning, afternoon)
    }

    /// Day count from the stored session averages. The total is rounded from
    /// the sum, each session separately, so they may differ by one.
    pub fn from_averages(morning_average: f64, afternoon_average: f64) -> Self {
        let morning = to_decimal(morning_average);
        let afternoon = to_decimal(afternoon_average);
        Self::new(
            round_half_up(morning + afternoon),
            round_half_up(morning),
            round_half_up(afternoon),
        )
    }

    pub fn is_zero(&self) -> bool {
        self.total == 0 && self.morning == 0 && self.afternoon == 0
    }
}

/// Which rule produced an allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationBasis {
    /// The record does not touch the day.
    None,
    /// Counts written on the date entry itself.
    ExplicitEntry,
    /// Completed campaign: people not claimed by explicit entries, spread
    /// over the bare date entries.
    LegacyRemainder,
    /// Ongoing campaign bare date entry: stored session averages.
    LegacyAverages,
    /// Completed campaign without a date list: total spread over working days.
    RangeSpread,
    /// Ongoing campaign without a date list: stored session averages.
    RangeAverages,
}

// --- Resolution ---

/// People/tests attributable to `record` on `date`.
pub fn allocate_for_day(record: &SchedulingRecord, date: NaiveDate, rest_day: Weekday) -> DayAllocation {
    resolve_day(record, date, rest_day).0
}

/// Like [`allocate_for_day`], also reporting which rule applied. Rules are
/// evaluated in order and the first match is final; in particular an
/// explicit entry is returned as-is and never re-derived.
pub fn resolve_day(
    record: &SchedulingRecord,
    date: NaiveDate,
    rest_day: Weekday,
) -> (DayAllocation, AllocationBasis) {
    let Some(start_date) = record.start_date else {
        return (DayAllocation::ZERO, AllocationBasis::None);
    };
    if is_rest_day(date, rest_day) {
        return (DayAllocation::ZERO, AllocationBasis::None);
    }

    match record.specific_dates_text() {
        Some(text) => resolve_specific_date(record, text, date, rest_day),
        None => resolve_range(record, start_date, date, rest_day),
    }
}

fn resolve_specific_date(
    record: &SchedulingRecord,
    text: &str,
    date: NaiveDate,
    rest_day: Weekday,
) -> (DayAllocation, AllocationBasis) {
    let entries = parse_specific_dates(text, date.year(), rest_day);

    let Some(position) = entries.iter().position(|entry| entry.date == date) else {
        return (DayAllocation::ZERO, AllocationBasis::None);
    };
    let entry = entries[position];

    if let Some(counts) = entry.counts {
        return (
            DayAllocation::new(counts.total, counts.morning, counts.afternoon),
            AllocationBasis::ExplicitEntry,
        );
    }

    match record.status {
        Status::Completed => {
            let claimed = explicit_total(&entries);
            let remaining_people = record.total_people.saturating_sub(claimed);
            let remaining_days = legacy_entry_count(&entries);
            // Position of this day among the bare entries, in input order
            let ordinal = entries[..position]
                .iter()
                .filter(|e| !e.is_explicit())
                .count() as u32;
            let daily = spread_share(remaining_people, remaining_days, ordinal);
            debug!(
                "{} on {}: {} people left after {} explicit, {} bare days -> {}",
                record.company_name, date, remaining_people, claimed, remaining_days, daily
            );
            (DayAllocation::from_total(daily), AllocationBasis::LegacyRemainder)
        }
        Status::Ongoing => (
            DayAllocation::from_averages(record.morning_average, record.afternoon_average),
            AllocationBasis::LegacyAverages,
        ),
    }
}

fn resolve_range(
    record: &SchedulingRecord,
    start_date: NaiveDate,
    date: NaiveDate,
    rest_day: Weekday,
) -> (DayAllocation, AllocationBasis) {
    let end_date = record.effective_end_date().unwrap_or(start_date);
    if date < start_date || date > end_date {
        return (DayAllocation::ZERO, AllocationBasis::None);
    }

    match record.status {
        Status::Completed => {
            let working_days = count_working_days(start_date, end_date, rest_day);
            // `date` is itself a working day, so this is at least 1
            let ordinal = count_working_days(start_date, date, rest_day).saturating_sub(1);
            let daily = spread_share(record.total_people, working_days, ordinal);
            (DayAllocation::from_total(daily), AllocationBasis::RangeSpread)
        }
        Status::Ongoing => (
            DayAllocation::from_averages(record.morning_average, record.afternoon_average),
            AllocationBasis::RangeAverages,
        ),
    }
}

/// Share of `pool` for the `ordinal`-th (0-based) of `days` days:
/// `round(pool / days)`, except that days whose rounded share would push
/// the running sum past `pool` only get what is left.
pub fn spread_share(pool: u32, days: u32, ordinal: u32) -> u32 {
    if days == 0 || ordinal >= days {
        return 0;
    }
    let daily = rounded_share(pool, days);
    let already_allocated = daily.saturating_mul(ordinal);
    daily.min(pool.saturating_sub(already_allocated))
}
