// src/blood_draw.rs
use chrono::{NaiveDate, Weekday};
use serde::Serialize;
use tracing::debug;

use crate::allocation::allocate_for_day;
use crate::record::SchedulingRecord;

/// A day's headcount partitioned by where blood is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BloodDrawSplit {
    /// People of campaigns whose dedicated external draw happens on the day.
    pub external: u32,
    /// Everyone else examined on the day.
    pub internal: u32,
}

impl BloodDrawSplit {
    /// `internal` is what is left of the day's people after removing the
    /// allocations of campaigns that draw blood on their own date. Never negative.
    pub fn from_parts(day_people_total: u32, external: u32, allocated_to_drawing_records: u32) -> Self {
        if allocated_to_drawing_records > day_people_total {
            debug!(
                "Blood draw allocations ({}) exceed day total ({}), clamping internal to 0",
                allocated_to_drawing_records, day_people_total
            );
        }
        Self {
            external,
            internal: day_people_total.saturating_sub(allocated_to_drawing_records),
        }
    }
}

/// Sum of `total_people` over records whose external draw falls on `date`.
/// The whole campaign is drawn in one occurrence, not just that day's share.
pub fn external_draw_total(records: &[SchedulingRecord], date: NaiveDate) -> u32 {
    records
        .iter()
        .filter(|record| record.blood_draw_date == Some(date))
        .map(|record| record.total_people)
        .fold(0u32, u32::saturating_add)
}

pub fn split_blood_draw(
    records: &[SchedulingRecord],
    date: NaiveDate,
    day_people_total: u32,
    rest_day: Weekday,
) -> BloodDrawSplit {
    let external = external_draw_total(records, date);
    let allocated_to_drawing_records = records
        .iter()
        .filter(|record| record.blood_draw_date.is_some())
        .map(|record| allocate_for_day(record, date, rest_day).total)
        .fold(0u32, u32::saturating_add);

    BloodDrawSplit::from_parts(day_people_total, external, allocated_to_drawing_records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Status;

    const REST: Weekday = Weekday::Mon;

    fn d(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
            .unwrap_or_else(|_| panic!("Invalid date string format: {}", date_str))
    }

    fn single_day(name: &str, date: &str, total: u32) -> SchedulingRecord {
        SchedulingRecord::new(name)
            .range(d(date), d(date))
            .total_people(total)
            .status(Status::Completed)
    }

    #[test]
    fn test_external_draw_is_carved_out_of_the_day() {
        let day = d("2025-08-06");
        let records = vec![
            single_day("Drawn Externally", "2025-08-06", 20).blood_draw_date(day),
            single_day("Drawn Here", "2025-08-06", 30),
        ];
        let split = split_blood_draw(&records, day, 50, REST);
        assert_eq!(split, BloodDrawSplit { external: 20, internal: 30 });
    }

    #[test]
    fn test_draw_date_elsewhere_still_reduces_internal() {
        // Examined today, drawn next week
        let records = vec![
            single_day("Later Draw", "2025-08-06", 20).blood_draw_date(d("2025-08-13")),
            single_day("Drawn Here", "2025-08-06", 30),
        ];
        let split = split_blood_draw(&records, d("2025-08-06"), 50, REST);
        assert_eq!(split, BloodDrawSplit { external: 0, internal: 30 });
    }

    #[test]
    fn test_external_counts_whole_campaign() {
        // Three exam days of 20, one draw of everybody on the last day
        let records = vec![SchedulingRecord::new("Three Days")
            .range(d("2025-08-05"), d("2025-08-07"))
            .total_people(60)
            .status(Status::Completed)
            .blood_draw_date(d("2025-08-07"))];
        let split = split_blood_draw(&records, d("2025-08-07"), 20, REST);
        assert_eq!(split.external, 60);
        assert_eq!(split.internal, 0);
    }

    #[test]
    fn test_internal_never_negative() {
        let day = d("2025-08-06");
        let records = vec![single_day("Oversized", "2025-08-06", 80).blood_draw_date(day)];
        let split = split_blood_draw(&records, day, 10, REST);
        assert_eq!(split, BloodDrawSplit { external: 80, internal: 0 });
    }

    #[test]
    fn test_no_drawing_records_leaves_day_untouched() {
        let records = vec![single_day("Plain", "2025-08-06", 30)];
        let split = split_blood_draw(&records, d("2025-08-06"), 30, REST);
        assert_eq!(split, BloodDrawSplit { external: 0, internal: 30 });
        assert_eq!(split_blood_draw(&[], d("2025-08-06"), 0, REST), BloodDrawSplit::default());
    }
}
