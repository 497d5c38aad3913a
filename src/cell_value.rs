// src/cell_value.rs
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::rounding::round_half_up_f64;

// --- Cell Values ---

/// Dynamic placeholders a category counter may hold instead of a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placeholder {
    /// `x`: everyone examined in the session gets the test.
    All,
    /// `x/2`: half of the session's people, rounded half up.
    Half,
}

/// A raw counter cell, parsed once when the record is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "RawCell", into = "RawCell")]
pub enum CellValue {
    #[default]
    Empty,
    Number(u32),
    Placeholder(Placeholder),
}

impl CellValue {
    /// Total parse: anything that is neither a placeholder nor a finite
    /// non-negative number becomes `Empty` (negative numbers become `Number(0)`).
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return CellValue::Empty;
        }

        let lowered = trimmed.to_lowercase();
        match lowered.as_str() {
            "x" => return CellValue::Placeholder(Placeholder::All),
            "x/2" => return CellValue::Placeholder(Placeholder::Half),
            _ => {}
        }

        match trimmed.parse::<f64>() {
            Ok(value) => CellValue::from_number(value),
            Err(_) => {
                debug!("Cell value '{}' is not numeric, treating as empty", trimmed);
                CellValue::Empty
            }
        }
    }

    /// Floors fractional literals; negative or non-finite values become 0.
    pub fn from_number(value: f64) -> Self {
        if !value.is_finite() || value <= 0.0 {
            return CellValue::Number(0);
        }
        let floored = value.floor();
        if floored >= u32::MAX as f64 {
            CellValue::Number(u32::MAX)
        } else {
            CellValue::Number(floored as u32)
        }
    }

    /// Resolves the cell against the number of people actually examined in
    /// the session the cell applies to.
    pub fn resolve(&self, actual_count: u32) -> u32 {
        match self {
            CellValue::Empty => 0,
            CellValue::Number(n) => *n,
            CellValue::Placeholder(Placeholder::All) => actual_count,
            CellValue::Placeholder(Placeholder::Half) => {
                round_half_up_f64(actual_count as f64 / 2.0)
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

/// `resolve(rawValue, actualCount)` on raw text. Never fails.
pub fn resolve_cell(raw: &str, actual_count: u32) -> u32 {
    CellValue::parse(raw).resolve(actual_count)
}

// --- Serde boundary ---

// Source data stores counters as numbers, strings or nulls interchangeably.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawCell {
    Number(f64),
    Text(String),
    Missing(Option<()>),
}

impl From<RawCell> for CellValue {
    fn from(raw: RawCell) -> Self {
        match raw {
            RawCell::Number(value) => CellValue::from_number(value),
            RawCell::Text(text) => CellValue::parse(&text),
            RawCell::Missing(_) => CellValue::Empty,
        }
    }
}

impl From<CellValue> for RawCell {
    fn from(cell: CellValue) -> Self {
        match cell {
            CellValue::Empty => RawCell::Missing(None),
            CellValue::Number(n) => RawCell::Number(n as f64),
            CellValue::Placeholder(Placeholder::All) => RawCell::Text("x".to_string()),
            CellValue::Placeholder(Placeholder::Half) => RawCell::Text("x/2".to_string()),
        }
    }
}
