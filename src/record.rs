// src/record.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::cell_value::CellValue;

// --- Campaign Status ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Status {
    Completed,
    #[default]
    Ongoing,
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "completed" | "complete" | "done" | "finished" | "hoàn thành" | "đã hoàn thành"
            | "đã khám xong" => Ok(Status::Completed),
            "ongoing" | "in_progress" | "in progress" | "active" | "đang thực hiện"
            | "đang khám" | "chưa hoàn thành" => Ok(Status::Ongoing),
            other => Err(format!("unknown campaign status '{}'", other)),
        }
    }
}

impl TryFrom<String> for Status {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Status> for String {
    fn from(status: Status) -> Self {
        status.to_string()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Completed => write!(f, "completed"),
            Status::Ongoing => write!(f, "ongoing"),
        }
    }
}

// --- Test Categories ---

/// Clinical test counters tracked per campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    AbdominalUltrasound,
    ThyroidUltrasound,
    BreastUltrasound,
    CarotidUltrasound,
    CardiacUltrasound,
    XRay,
    Ecg,
    Gynecology,
    GeneralMedicine,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::AbdominalUltrasound,
        Category::ThyroidUltrasound,
        Category::BreastUltrasound,
        Category::CarotidUltrasound,
        Category::CardiacUltrasound,
        Category::XRay,
        Category::Ecg,
        Category::Gynecology,
        Category::GeneralMedicine,
    ];

    /// Stable key used in JSON and as the CSV column stem.
    pub fn key(&self) -> &'static str {
        match self {
            Category::AbdominalUltrasound => "abdominal_ultrasound",
            Category::ThyroidUltrasound => "thyroid_ultrasound",
            Category::BreastUltrasound => "breast_ultrasound",
            Category::CarotidUltrasound => "carotid_ultrasound",
            Category::CardiacUltrasound => "cardiac_ultrasound",
            Category::XRay => "x_ray",
            Category::Ecg => "ecg",
            Category::Gynecology => "gynecology",
            Category::GeneralMedicine => "general_medicine",
        }
    }

    pub fn room_category(&self) -> RoomCategory {
        match self {
            Category::AbdominalUltrasound
            | Category::ThyroidUltrasound
            | Category::BreastUltrasound
            | Category::CarotidUltrasound
            | Category::CardiacUltrasound => RoomCategory::Ultrasound,
            Category::XRay => RoomCategory::XRay,
            Category::Ecg => RoomCategory::Ecg,
            Category::Gynecology => RoomCategory::Gynecology,
            Category::GeneralMedicine => RoomCategory::GeneralMedicine,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Groups categories by the rooms/staff they compete for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomCategory {
    Ultrasound,
    XRay,
    Ecg,
    Gynecology,
    GeneralMedicine,
}

impl RoomCategory {
    pub const ALL: [RoomCategory; 5] = [
        RoomCategory::Ultrasound,
        RoomCategory::XRay,
        RoomCategory::Ecg,
        RoomCategory::Gynecology,
        RoomCategory::GeneralMedicine,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            RoomCategory::Ultrasound => "ultrasound",
            RoomCategory::XRay => "x_ray",
            RoomCategory::Ecg => "ecg",
            RoomCategory::Gynecology => "gynecology",
            RoomCategory::GeneralMedicine => "general_medicine",
        }
    }
}

impl FromStr for RoomCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect();
        match normalised.as_str() {
            "ultrasound" | "imaging" | "siêuâm" => Ok(RoomCategory::Ultrasound),
            "xray" | "radiology" | "xquang" => Ok(RoomCategory::XRay),
            "ecg" | "ekg" | "electrocardiogram" | "điệntim" => Ok(RoomCategory::Ecg),
            "gynecology" | "gynaecology" | "gyn" | "phụkhoa" => Ok(RoomCategory::Gynecology),
            "generalmedicine" | "internalmedicine" | "general" | "nộikhoa" => {
                Ok(RoomCategory::GeneralMedicine)
            }
            _ => Err(format!("unknown room category '{}'", s)),
        }
    }
}

impl fmt::Display for RoomCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// --- Scheduling Record ---

/// Raw counter(s) for one category. Source data holds either a single cell
/// for the whole day or one cell per examination session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SessionCells {
    Split {
        #[serde(default)]
        morning: CellValue,
        #[serde(default)]
        afternoon: CellValue,
    },
    /// A bare cell, resolved against the day's total people.
    WholeDay(CellValue),
}

impl Default for SessionCells {
    fn default() -> Self {
        SessionCells::WholeDay(CellValue::Empty)
    }
}

impl SessionCells {
    pub fn new(morning: CellValue, afternoon: CellValue) -> Self {
        SessionCells::Split { morning, afternoon }
    }

    /// Same raw value for both sessions.
    pub fn both(cell: CellValue) -> Self {
        Self::new(cell, cell)
    }

    pub fn whole_day(cell: CellValue) -> Self {
        SessionCells::WholeDay(cell)
    }

    // A literal in a whole-day cell counts once, not once per session
    pub fn resolve(&self, morning_people: u32, afternoon_people: u32) -> u32 {
        match self {
            SessionCells::Split { morning, afternoon } => morning
                .resolve(morning_people)
                .saturating_add(afternoon.resolve(afternoon_people)),
            SessionCells::WholeDay(cell) => {
                cell.resolve(morning_people.saturating_add(afternoon_people))
            }
        }
    }
}

/// One company's examination campaign, as read from the data store.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SchedulingRecord {
    pub company_name: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub specific_dates: Option<String>,
    #[serde(default)]
    pub total_people: u32,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub morning_average: f64,
    #[serde(default)]
    pub afternoon_average: f64,
    #[serde(default)]
    pub blood_draw_date: Option<NaiveDate>,
    #[serde(default)]
    pub categories: BTreeMap<Category, SessionCells>,
}

impl SchedulingRecord {
    pub fn new(company_name: &str) -> Self {
        Self {
            company_name: company_name.to_string(),
            ..Default::default()
        }
    }

    /// `end_date` falls back to `start_date`.
    pub fn effective_end_date(&self) -> Option<NaiveDate> {
        self.end_date.or(self.start_date)
    }

    /// The free-text date list, if it has any content.
    pub fn specific_dates_text(&self) -> Option<&str> {
        self.specific_dates
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }

    pub fn category_cells(&self, category: Category) -> SessionCells {
        self.categories.get(&category).copied().unwrap_or_default()
    }

    // Builder helpers, mostly for fixtures and loaders
    pub fn range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    pub fn specific_dates(mut self, text: &str) -> Self {
        self.specific_dates = Some(text.to_string());
        self
    }

    pub fn total_people(mut self, total: u32) -> Self {
        self.total_people = total;
        self
    }

    pub fn status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn averages(mut self, morning: f64, afternoon: f64) -> Self {
        self.morning_average = morning;
        self.afternoon_average = afternoon;
        self
    }

    pub fn blood_draw_date(mut self, date: NaiveDate) -> Self {
        self.blood_draw_date = Some(date);
        self
    }

    pub fn category(mut self, category: Category, cells: SessionCells) -> Self {
        self.categories.insert(category, cells);
        self
    }
}
