// src/aggregation.rs
use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

use crate::allocation::{resolve_day, AllocationBasis, DayAllocation};
use crate::blood_draw::{external_draw_total, BloodDrawSplit};
use crate::calendar::working_days_between;
use crate::record::{Category, RoomCategory, SchedulingRecord};
use crate::specific_dates::parse_specific_dates;

// --- Aggregates ---

/// One record's share of a day, kept for the per-day drill-down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayContribution {
    pub company_name: String,
    pub allocation: DayAllocation,
    pub basis: AllocationBasis,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyAggregate {
    pub date: NaiveDate,
    pub people_total: u32,
    pub morning_total: u32,
    pub afternoon_total: u32,
    /// Every category is present, zero when nothing was scheduled.
    pub per_category_total: BTreeMap<Category, u32>,
    /// Largest single category total of the day.
    pub max_category_value: u32,
    pub max_category: Option<Category>,
    pub blood_draw_external: u32,
    pub blood_draw_internal: u32,
    pub contributions: Vec<DayContribution>,
}

impl DailyAggregate {
    fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            people_total: 0,
            morning_total: 0,
            afternoon_total: 0,
            per_category_total: Category::ALL.iter().map(|c| (*c, 0)).collect(),
            max_category_value: 0,
            max_category: None,
            blood_draw_external: 0,
            blood_draw_internal: 0,
            contributions: Vec::new(),
        }
    }

    pub fn category_total(&self, category: Category) -> u32 {
        self.per_category_total.get(&category).copied().unwrap_or(0)
    }

    /// Category totals folded into the groups that share rooms.
    pub fn room_group_totals(&self) -> BTreeMap<RoomCategory, u32> {
        let mut totals: BTreeMap<RoomCategory, u32> =
            RoomCategory::ALL.iter().map(|c| (*c, 0)).collect();
        for (category, count) in &self.per_category_total {
            let entry = totals.entry(category.room_category()).or_insert(0);
            *entry = entry.saturating_add(*count);
        }
        totals
    }

    pub fn blood_draw(&self) -> BloodDrawSplit {
        BloodDrawSplit {
            external: self.blood_draw_external,
            internal: self.blood_draw_internal,
        }
    }

    // Category cells resolve against this record's own session split for the day
    fn add_contribution(&mut self, record: &SchedulingRecord, allocation: DayAllocation, basis: AllocationBasis) {
        self.people_total = self.people_total.saturating_add(allocation.total);
        self.morning_total = self.morning_total.saturating_add(allocation.morning);
        self.afternoon_total = self.afternoon_total.saturating_add(allocation.afternoon);

        for (category, cells) in &record.categories {
            let count = cells.resolve(allocation.morning, allocation.afternoon);
            let entry = self.per_category_total.entry(*category).or_insert(0);
            *entry = entry.saturating_add(count);
        }

        self.contributions.push(DayContribution {
            company_name: record.company_name.clone(),
            allocation,
            basis,
        });
    }

    // Ties go to the category listed first
    fn update_max_category(&mut self) {
        let mut best: Option<(Category, u32)> = None;
        for (category, count) in &self.per_category_total {
            if *count > 0 && best.map_or(true, |(_, best_count)| *count > best_count) {
                best = Some((*category, *count));
            }
        }
        self.max_category = best.map(|(category, _)| category);
        self.max_category_value = best.map_or(0, |(_, count)| count);
    }
}

// --- Date Index ---

/// Date -> records that can contribute on that date, plus the external blood
/// draw volume per date. Rebuilt for every aggregation run; it only narrows
/// the set of records visited and never changes results.
#[derive(Debug, Clone, Default)]
pub struct DateIndex {
    contributors: BTreeMap<NaiveDate, Vec<usize>>,
    external_draws: BTreeMap<NaiveDate, u32>,
}

impl DateIndex {
    pub fn build(records: &[SchedulingRecord], dates: &[NaiveDate], rest_day: Weekday) -> Self {
        let wanted: BTreeSet<NaiveDate> = dates.iter().copied().collect();
        let (Some(first), Some(last)) = (wanted.first().copied(), wanted.last().copied()) else {
            return Self::default();
        };
        let years: BTreeSet<i32> = wanted.iter().map(|date| date.year()).collect();

        let mut index = Self::default();
        for (idx, record) in records.iter().enumerate() {
            if let Some(draw_date) = record.blood_draw_date.filter(|date| wanted.contains(date)) {
                let entry = index.external_draws.entry(draw_date).or_insert(0);
                *entry = entry.saturating_add(record.total_people);
            }

            let Some(start_date) = record.start_date else {
                continue;
            };

            let mut hit_dates = BTreeSet::new();
            match record.specific_dates_text() {
                Some(text) => {
                    // Entries carry no year, so the list is read once per year in range
                    for year in &years {
                        hit_dates.extend(
                            parse_specific_dates(text, *year, rest_day)
                                .into_iter()
                                .map(|entry| entry.date)
                                .filter(|date| wanted.contains(date)),
                        );
                    }
                }
                None => {
                    let end_date = record.effective_end_date().unwrap_or(start_date);
                    hit_dates.extend(
                        working_days_between(start_date.max(first), end_date.min(last), rest_day)
                            .into_iter()
                            .filter(|date| wanted.contains(date)),
                    );
                }
            }

            for date in hit_dates {
                index.contributors.entry(date).or_default().push(idx);
            }
        }

        debug!(
            "Date index built: {} records over {} dates, {} dates with contributors",
            records.len(),
            wanted.len(),
            index.contributors.len()
        );
        index
    }

    /// Indices into the record slice the index was built from, in record order.
    pub fn contributors(&self, date: NaiveDate) -> &[usize] {
        self.contributors
            .get(&date)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn external_draw(&self, date: NaiveDate) -> u32 {
        self.external_draws.get(&date).copied().unwrap_or(0)
    }
}

// --- Aggregation ---

/// One aggregate per date, in the order given.
pub fn aggregate_daily(
    records: &[SchedulingRecord],
    dates: &[NaiveDate],
    rest_day: Weekday,
) -> Vec<DailyAggregate> {
    let index = DateIndex::build(records, dates, rest_day);

    let aggregates: Vec<DailyAggregate> = dates
        .iter()
        .map(|date| {
            let candidates = index
                .contributors(*date)
                .iter()
                .filter_map(|idx| records.get(*idx));
            fold_day(*date, candidates, index.external_draw(*date), rest_day)
        })
        .collect();

    let people: u64 = aggregates.iter().map(|a| a.people_total as u64).sum();
    info!(
        "Aggregated {} records over {} days: {} people in total",
        records.len(),
        aggregates.len(),
        people
    );
    aggregates
}

/// A single day, visiting every record.
pub fn aggregate_day(records: &[SchedulingRecord], date: NaiveDate, rest_day: Weekday) -> DailyAggregate {
    fold_day(date, records.iter(), external_draw_total(records, date), rest_day)
}

fn fold_day<'a>(
    date: NaiveDate,
    candidates: impl Iterator<Item = &'a SchedulingRecord>,
    external_draw: u32,
    rest_day: Weekday,
) -> DailyAggregate {
    let mut aggregate = DailyAggregate::empty(date);
    let mut allocated_to_drawing_records = 0u32;

    for record in candidates {
        let (allocation, basis) = resolve_day(record, date, rest_day);
        if basis == AllocationBasis::None {
            continue;
        }
        if record.blood_draw_date.is_some() {
            allocated_to_drawing_records = allocated_to_drawing_records.saturating_add(allocation.total);
        }
        aggregate.add_contribution(record, allocation, basis);
    }

    let split = BloodDrawSplit::from_parts(
        aggregate.people_total,
        external_draw,
        allocated_to_drawing_records,
    );
    aggregate.blood_draw_external = split.external;
    aggregate.blood_draw_internal = split.internal;
    aggregate.update_max_category();
    aggregate
}
