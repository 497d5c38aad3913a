// src/lib.rs
pub mod aggregation;
pub mod allocation;
pub mod blood_draw;
pub mod calendar;
pub mod cell_value;
pub mod config;
pub mod engine;
pub mod error;
pub mod loader;
pub mod record;
pub mod report;
pub mod room_tiers;
pub mod rounding;
pub mod specific_dates;


pub use aggregation::{aggregate_daily, DailyAggregate, DateIndex, DayContribution};
pub use allocation::{allocate_for_day, AllocationBasis, DayAllocation};
pub use blood_draw::{split_blood_draw, BloodDrawSplit};
pub use calendar::{build_calendar_range, ReportingWindow};
pub use cell_value::{resolve_cell, CellValue, Placeholder};
pub use config::{EngineConfig, RoomTierConfig};
pub use engine::ScheduleEngine;
pub use error::{EngineError, EngineResult};
pub use record::{Category, RoomCategory, SchedulingRecord, SessionCells, Status};
pub use report::{DailyReport, ReportRow, ReportSummary};
pub use room_tiers::estimate_rooms;
pub use specific_dates::{parse_specific_dates, ParsedDayEntry};
