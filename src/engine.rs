// src/engine.rs
use chrono::{NaiveDate, Weekday};
use tracing::info;

use crate::aggregation::{aggregate_daily, DailyAggregate};
use crate::allocation::{allocate_for_day, DayAllocation};
use crate::blood_draw::{split_blood_draw, BloodDrawSplit};
use crate::calendar::{build_calendar_range, ReportingWindow};
use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::record::{RoomCategory, SchedulingRecord};
use crate::report::DailyReport;
use crate::room_tiers::{estimate_rooms, estimate_rooms_by_name};

/// Entry point for callers: the five engine operations bound to one
/// configuration. Holds no state besides the configuration, so every call
/// is a pure function of its arguments.
#[derive(Debug, Clone, Default)]
pub struct ScheduleEngine {
    config: EngineConfig,
}

impl ScheduleEngine {
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn rest_day(&self) -> Weekday {
        self.config.rest_day
    }

    pub fn build_calendar_range(&self, window: &ReportingWindow) -> Vec<NaiveDate> {
        build_calendar_range(window, self.config.rest_day)
    }

    pub fn allocate_for_day(&self, record: &SchedulingRecord, date: NaiveDate) -> DayAllocation {
        allocate_for_day(record, date, self.config.rest_day)
    }

    pub fn aggregate_daily(&self, records: &[SchedulingRecord], dates: &[NaiveDate]) -> Vec<DailyAggregate> {
        aggregate_daily(records, dates, self.config.rest_day)
    }

    pub fn split_blood_draw(
        &self,
        records: &[SchedulingRecord],
        date: NaiveDate,
        day_people_total: u32,
    ) -> BloodDrawSplit {
        split_blood_draw(records, date, day_people_total, self.config.rest_day)
    }

    pub fn estimate_rooms(&self, category_total: u32, category: RoomCategory) -> u32 {
        estimate_rooms(category_total, category, &self.config.room_tiers)
    }

    pub fn estimate_rooms_by_name(&self, category_total: u32, category: &str) -> EngineResult<u32> {
        estimate_rooms_by_name(category_total, category, &self.config.room_tiers)
    }

    /// Calendar range, aggregation and room estimation in one pass.
    pub fn daily_report(&self, records: &[SchedulingRecord], window: &ReportingWindow) -> DailyReport {
        let dates = self.build_calendar_range(window);
        let aggregates = self.aggregate_daily(records, &dates);
        let report = DailyReport::from_aggregates(&aggregates, &self.config.room_tiers);
        info!(
            "Report ready: {} days, {} people, peak {:?} ({} people)",
            report.summary.days,
            report.summary.people_total,
            report.summary.peak_day,
            report.summary.peak_people
        );
        report
    }
}
