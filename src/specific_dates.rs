// src/specific_dates.rs
use chrono::{NaiveDate, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

use crate::calendar::is_rest_day;
use crate::rounding::split_halves;

// `MM/DD` optionally followed by a parenthesised payload, e.g. `8/2(50,60)`
static ENTRY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2})\s*/\s*(\d{1,2})\s*(?:\(([^()]*)\))?$")
        .expect("specific date entry pattern is valid")
});

// --- Parsed Entries ---

/// Counts carried by an entry such as `8/1(30)` or `8/2(50,60)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExplicitCounts {
    pub morning: u32,
    pub afternoon: u32,
    pub total: u32,
}

/// One day out of a record's free-text date list. Entries without counts
/// (`8/4`) are legacy entries whose people must be derived elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParsedDayEntry {
    pub date: NaiveDate,
    pub counts: Option<ExplicitCounts>,
}

impl ParsedDayEntry {
    pub fn is_explicit(&self) -> bool {
        self.counts.is_some()
    }

    pub fn morning(&self) -> Option<u32> {
        self.counts.map(|c| c.morning)
    }

    pub fn afternoon(&self) -> Option<u32> {
        self.counts.map(|c| c.afternoon)
    }

    pub fn total(&self) -> Option<u32> {
        self.counts.map(|c| c.total)
    }
}

/// Sum of the totals of all explicit entries.
pub fn explicit_total(entries: &[ParsedDayEntry]) -> u32 {
    entries
        .iter()
        .filter_map(ParsedDayEntry::total)
        .fold(0u32, u32::saturating_add)
}

/// Number of legacy (count-less) entries.
pub fn legacy_entry_count(entries: &[ParsedDayEntry]) -> u32 {
    entries.iter().filter(|e| !e.is_explicit()).count() as u32
}

// --- Parsing ---

/// Parses a comma separated list of `MM/DD[(payload)]` entries. The source
/// text carries no year, so `reference_year` is used for every entry.
///
/// Malformed entries and entries falling on the rest day are dropped; the
/// remaining entries keep their input order.
pub fn parse_specific_dates(
    text: &str,
    reference_year: i32,
    rest_day: Weekday,
) -> Vec<ParsedDayEntry> {
    let normalised = normalise_punctuation(text);
    let mut entries = Vec::new();

    for raw_entry in split_top_level(&normalised) {
        let raw_entry = raw_entry.trim();
        if raw_entry.is_empty() {
            continue;
        }

        let Some(entry) = parse_entry(raw_entry, reference_year) else {
            warn!("Skipping malformed specific date entry '{}'", raw_entry);
            continue;
        };

        if is_rest_day(entry.date, rest_day) {
            debug!("Skipping specific date {} (rest day)", entry.date);
            continue;
        }
        entries.push(entry);
    }

    entries
}

fn parse_entry(raw_entry: &str, reference_year: i32) -> Option<ParsedDayEntry> {
    let caps = ENTRY_PATTERN.captures(raw_entry)?;
    let month = caps.get(1)?.as_str().parse::<u32>().ok()?;
    let day = caps.get(2)?.as_str().parse::<u32>().ok()?;
    let date = NaiveDate::from_ymd_opt(reference_year, month, day)?;

    let counts = match caps.get(3) {
        None => None,
        Some(payload) => Some(parse_payload(payload.as_str())?),
    };

    Some(ParsedDayEntry { date, counts })
}

fn parse_payload(payload: &str) -> Option<ExplicitCounts> {
    let values: Vec<&str> = payload.split(',').map(str::trim).collect();
    match values.as_slice() {
        [total] => {
            let total = total.parse::<u32>().ok()?;
            let (morning, afternoon) = split_halves(total);
            Some(ExplicitCounts {
                morning,
                afternoon,
                total,
            })
        }
        [morning, afternoon] => {
            let morning = parse_session(morning)?;
            let afternoon = parse_session(afternoon)?;
            Some(ExplicitCounts {
                morning,
                afternoon,
                total: morning.saturating_add(afternoon),
            })
        }
        _ => None,
    }
}

// An empty session count means nobody came that half-day
fn parse_session(value: &str) -> Option<u32> {
    if value.is_empty() {
        Some(0)
    } else {
        value.parse::<u32>().ok()
    }
}

/// Splits on commas that are not inside parentheses. An unbalanced `)` is
/// treated as depth zero so one stray bracket cannot swallow the rest of the list.
pub fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth: u32 = 0;
    let mut start = 0;

    for (idx, ch) in text.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&text[start..idx]);
                start = idx + ch.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

// Data entry mixes full-width and ASCII punctuation
fn normalise_punctuation(text: &str) -> String {
    text.chars()
        .map(|ch| match ch {
            '（' => '(',
            '）' => ')',
            '，' => ',',
            '／' => '/',
            other => other,
        })
        .collect()
}
