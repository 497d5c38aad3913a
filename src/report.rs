// src/report.rs
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;

use crate::aggregation::DailyAggregate;
use crate::config::RoomTierConfig;
use crate::error::EngineResult;
use crate::record::RoomCategory;
use crate::room_tiers::estimate_rooms;

// --- Report Rows ---

/// Flat per-day row, one column per value so it serializes to CSV as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub date: NaiveDate,
    pub weekday: String,
    pub people_total: u32,
    pub morning_total: u32,
    pub afternoon_total: u32,
    pub ultrasound_cases: u32,
    pub ultrasound_rooms: u32,
    pub x_ray_cases: u32,
    pub x_ray_rooms: u32,
    pub ecg_cases: u32,
    pub ecg_rooms: u32,
    pub gynecology_cases: u32,
    pub gynecology_rooms: u32,
    pub general_medicine_cases: u32,
    pub general_medicine_rooms: u32,
    /// Empty when no category had any cases.
    pub max_category: String,
    pub max_category_value: u32,
    pub blood_draw_external: u32,
    pub blood_draw_internal: u32,
    pub companies: usize,
}

impl ReportRow {
    pub fn from_aggregate(aggregate: &DailyAggregate, tiers: &RoomTierConfig) -> Self {
        let groups = aggregate.room_group_totals();
        let cases = |category: RoomCategory| groups.get(&category).copied().unwrap_or(0);
        let rooms = |category: RoomCategory| estimate_rooms(cases(category), category, tiers);

        Self {
            date: aggregate.date,
            weekday: aggregate.date.weekday().to_string(),
            people_total: aggregate.people_total,
            morning_total: aggregate.morning_total,
            afternoon_total: aggregate.afternoon_total,
            ultrasound_cases: cases(RoomCategory::Ultrasound),
            ultrasound_rooms: rooms(RoomCategory::Ultrasound),
            x_ray_cases: cases(RoomCategory::XRay),
            x_ray_rooms: rooms(RoomCategory::XRay),
            ecg_cases: cases(RoomCategory::Ecg),
            ecg_rooms: rooms(RoomCategory::Ecg),
            gynecology_cases: cases(RoomCategory::Gynecology),
            gynecology_rooms: rooms(RoomCategory::Gynecology),
            general_medicine_cases: cases(RoomCategory::GeneralMedicine),
            general_medicine_rooms: rooms(RoomCategory::GeneralMedicine),
            max_category: aggregate
                .max_category
                .map(|category| category.key().to_string())
                .unwrap_or_default(),
            max_category_value: aggregate.max_category_value,
            blood_draw_external: aggregate.blood_draw_external,
            blood_draw_internal: aggregate.blood_draw_internal,
            companies: aggregate.contributions.len(),
        }
    }

    pub fn rooms(&self, category: RoomCategory) -> u32 {
        match category {
            RoomCategory::Ultrasound => self.ultrasound_rooms,
            RoomCategory::XRay => self.x_ray_rooms,
            RoomCategory::Ecg => self.ecg_rooms,
            RoomCategory::Gynecology => self.gynecology_rooms,
            RoomCategory::GeneralMedicine => self.general_medicine_rooms,
        }
    }
}

// --- Summary ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub days: usize,
    pub people_total: u64,
    /// First day with the highest headcount; `None` when every day is empty.
    pub peak_day: Option<NaiveDate>,
    pub peak_people: u32,
    /// Highest room requirement per group over the window.
    pub peak_rooms: BTreeMap<RoomCategory, u32>,
}

impl ReportSummary {
    pub fn from_rows(rows: &[ReportRow]) -> Self {
        let mut peak: Option<(NaiveDate, u32)> = None;
        for row in rows {
            if row.people_total > peak.map_or(0, |(_, people)| people) {
                peak = Some((row.date, row.people_total));
            }
        }

        let peak_rooms = RoomCategory::ALL
            .iter()
            .map(|category| {
                let max = rows.iter().map(|row| row.rooms(*category)).max().unwrap_or(0);
                (*category, max)
            })
            .collect();

        Self {
            first_date: rows.iter().map(|row| row.date).min(),
            last_date: rows.iter().map(|row| row.date).max(),
            days: rows.len(),
            people_total: rows.iter().map(|row| row.people_total as u64).sum(),
            peak_day: peak.map(|(date, _)| date),
            peak_people: peak.map_or(0, |(_, people)| people),
            peak_rooms,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyReport {
    pub summary: ReportSummary,
    pub rows: Vec<ReportRow>,
}

impl DailyReport {
    pub fn from_aggregates(aggregates: &[DailyAggregate], tiers: &RoomTierConfig) -> Self {
        let rows: Vec<ReportRow> = aggregates
            .iter()
            .map(|aggregate| ReportRow::from_aggregate(aggregate, tiers))
            .collect();
        Self {
            summary: ReportSummary::from_rows(&rows),
            rows,
        }
    }
}

// --- Output ---

pub fn write_report_json<W: Write>(report: &DailyReport, mut writer: W) -> EngineResult<()> {
    serde_json::to_writer_pretty(&mut writer, report)?;
    writeln!(writer)?;
    Ok(())
}

/// Rows only; the summary has no flat shape.
pub fn write_report_csv<W: Write>(rows: &[ReportRow], writer: W) -> EngineResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}
