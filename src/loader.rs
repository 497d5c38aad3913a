// src/loader.rs
use chrono::NaiveDate;
use csv::StringRecord;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::cell_value::CellValue;
use crate::error::{EngineError, EngineResult};
use crate::record::{Category, SchedulingRecord, SessionCells, Status};

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

// --- Entry Point ---

/// Reads scheduling records from a `.json` or `.csv` file.
pub fn load_records(path: &Path) -> EngineResult<Vec<SchedulingRecord>> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let reader = || -> EngineResult<BufReader<File>> { Ok(BufReader::new(File::open(path)?)) };
    let records = match extension.as_str() {
        "json" => load_records_json(reader()?)?,
        "csv" => load_records_csv(reader()?)?,
        _ => {
            return Err(EngineError::UnsupportedFormat(format!(
                "{} (expected .json or .csv)",
                path.display()
            )))
        }
    };

    info!("Loaded {} scheduling records from {}", records.len(), path.display());
    Ok(records)
}

// --- JSON ---

/// A JSON array of records. Cells may be numbers, strings or null. Elements
/// that do not form a valid record are skipped with a warning.
pub fn load_records_json<R: Read>(reader: R) -> EngineResult<Vec<SchedulingRecord>> {
    Ok(keep_valid(json_rows(reader)?))
}

fn json_rows<R: Read>(reader: R) -> EngineResult<Vec<EngineResult<SchedulingRecord>>> {
    let values: Vec<serde_json::Value> = serde_json::from_reader(reader)?;
    let rows = values
        .into_iter()
        .enumerate()
        .map(|(idx, value)| {
            let invalid = |reason: String| EngineError::InvalidRecord { row: idx + 1, reason };
            let record: SchedulingRecord =
                serde_json::from_value(value).map_err(|e| invalid(e.to_string()))?;
            if record.company_name.trim().is_empty() {
                return Err(invalid("company_name is empty".to_string()));
            }
            Ok(record)
        })
        .collect();
    Ok(rows)
}

// --- CSV ---

/// One record per row. Category counters live in `<category>_am` and
/// `<category>_pm` columns (`ecg_am`, `x_ray_pm`, ...), or in a single
/// `<category>` column holding the whole day's cell. Absent columns are empty.
/// Rows that fail to parse are skipped with a warning.
pub fn load_records_csv<R: Read>(reader: R) -> EngineResult<Vec<SchedulingRecord>> {
    let records = keep_valid(csv_rows(reader)?);
    debug!("Parsed {} CSV rows", records.len());
    Ok(records)
}

// Header errors fail the whole file; each data row succeeds or fails on its own
fn csv_rows<R: Read>(reader: R) -> EngineResult<Vec<EngineResult<SchedulingRecord>>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let columns = CsvColumns::new(csv_reader.headers()?);

    let rows = csv_reader
        .records()
        .enumerate()
        .map(|(idx, row)| match row {
            Ok(row) => parse_row(&columns, &row, idx + 1),
            Err(e) => Err(EngineError::InvalidRecord {
                row: idx + 1,
                reason: e.to_string(),
            }),
        })
        .collect();
    Ok(rows)
}

fn keep_valid(rows: Vec<EngineResult<SchedulingRecord>>) -> Vec<SchedulingRecord> {
    let total = rows.len();
    let records: Vec<SchedulingRecord> = rows
        .into_iter()
        .filter_map(|row| match row {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping record: {}", e);
                None
            }
        })
        .collect();
    if records.len() < total {
        info!("Skipped {} of {} records", total - records.len(), total);
    }
    records
}

struct CsvColumns {
    index: HashMap<String, usize>,
}

impl CsvColumns {
    fn new(headers: &StringRecord) -> Self {
        let index = headers
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.trim().to_lowercase(), idx))
            .collect();
        Self { index }
    }

    // Missing columns and blank cells both read as `None`
    fn get<'r>(&self, row: &'r StringRecord, name: &str) -> Option<&'r str> {
        self.index
            .get(name)
            .and_then(|idx| row.get(*idx))
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

fn parse_row(columns: &CsvColumns, row: &StringRecord, row_no: usize) -> EngineResult<SchedulingRecord> {
    let invalid = |reason: String| EngineError::InvalidRecord { row: row_no, reason };

    let company_name = columns
        .get(row, "company_name")
        .ok_or_else(|| invalid("company_name is empty".to_string()))?;
    let mut record = SchedulingRecord::new(company_name);

    record.start_date = parse_date(columns.get(row, "start_date"), "start_date").map_err(invalid)?;
    record.end_date = parse_date(columns.get(row, "end_date"), "end_date").map_err(invalid)?;
    record.blood_draw_date =
        parse_date(columns.get(row, "blood_draw_date"), "blood_draw_date").map_err(invalid)?;
    record.specific_dates = columns.get(row, "specific_dates").map(str::to_string);

    if let Some(total) = columns.get(row, "total_people") {
        record.total_people = total
            .parse::<u32>()
            .map_err(|_| invalid(format!("total_people '{}' is not a whole number", total)))?;
    }
    if let Some(status) = columns.get(row, "status") {
        record.status = status.parse::<Status>().map_err(invalid)?;
    }
    record.morning_average = parse_average(columns.get(row, "morning_average"), "morning_average")
        .map_err(invalid)?;
    record.afternoon_average =
        parse_average(columns.get(row, "afternoon_average"), "afternoon_average")
            .map_err(invalid)?;

    for category in Category::ALL {
        let morning = columns.get(row, &format!("{}_am", category.key()));
        let afternoon = columns.get(row, &format!("{}_pm", category.key()));
        let cells = if morning.is_some() || afternoon.is_some() {
            SessionCells::new(
                morning.map(CellValue::parse).unwrap_or_default(),
                afternoon.map(CellValue::parse).unwrap_or_default(),
            )
        } else if let Some(whole_day) = columns.get(row, category.key()) {
            SessionCells::whole_day(CellValue::parse(whole_day))
        } else {
            continue;
        };
        record.categories.insert(category, cells);
    }

    Ok(record)
}

fn parse_date(value: Option<&str>, field: &str) -> Result<Option<NaiveDate>, String> {
    let Some(value) = value else {
        return Ok(None);
    };
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .map(Some)
        .ok_or_else(|| format!("{} '{}' is not a YYYY-MM-DD date", field, value))
}

fn parse_average(value: Option<&str>, field: &str) -> Result<f64, String> {
    match value {
        None => Ok(0.0),
        Some(value) => value
            .parse::<f64>()
            .map_err(|_| format!("{} '{}' is not a number", field, value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell_value::Placeholder;

    fn d(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
            .unwrap_or_else(|_| panic!("Invalid date string format: {}", date_str))
    }

    const CSV_HEADER: &str = "company_name,start_date,end_date,specific_dates,total_people,status,morning_average,afternoon_average,blood_draw_date,ecg_am,ecg_pm,thyroid_ultrasound_am";

    #[test]
    fn test_csv_rows_become_records() {
        let data = format!(
            "{}\n{}\n{}\n",
            CSV_HEADER,
            r#"Harbor Freight Co,2025-08-01,2025-08-05,"8/1(30),8/2(50)",160,Hoàn thành,,,2025-08-05,x,x/2,"#,
            "Northwind,2025/08/10,,,0,ongoing,12.5,9,,,,7"
        );
        let records = load_records_csv(data.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.company_name, "Harbor Freight Co");
        assert_eq!(first.start_date, Some(d("2025-08-01")));
        assert_eq!(first.specific_dates_text(), Some("8/1(30),8/2(50)"));
        assert_eq!(first.total_people, 160);
        assert_eq!(first.status, Status::Completed);
        assert_eq!(first.blood_draw_date, Some(d("2025-08-05")));
        assert_eq!(
            first.category_cells(Category::Ecg),
            SessionCells::new(
                CellValue::Placeholder(Placeholder::All),
                CellValue::Placeholder(Placeholder::Half)
            )
        );
        assert!(!first.categories.contains_key(&Category::ThyroidUltrasound));

        let second = &records[1];
        assert_eq!(second.start_date, Some(d("2025-08-10")));
        assert_eq!(second.end_date, None);
        assert_eq!(second.morning_average, 12.5);
        assert_eq!(second.afternoon_average, 9.0);
        assert_eq!(
            second.category_cells(Category::ThyroidUltrasound),
            SessionCells::new(CellValue::Number(7), CellValue::Empty)
        );
    }

    #[test]
    fn test_csv_bad_row_is_skipped() {
        let data = format!("{}\nAcme,2025-08-01\nBroken,08-01-2025\nNorthwind,2025-08-10\n", CSV_HEADER);
        let records = load_records_csv(data.as_bytes()).unwrap();
        let names: Vec<&str> = records.iter().map(|r| r.company_name.as_str()).collect();
        assert_eq!(names, vec!["Acme", "Northwind"]);
    }

    #[test]
    fn test_csv_bad_date_reports_row() {
        let data = format!("{}\nAcme,2025-08-01\nBroken,08-01-2025\n", CSV_HEADER);
        let rows = csv_rows(data.as_bytes()).unwrap();
        assert!(rows[0].is_ok());
        match &rows[1] {
            Err(EngineError::InvalidRecord { row, reason }) => {
                assert_eq!(*row, 2);
                assert!(reason.contains("start_date"), "unexpected reason: {}", reason);
            }
            other => panic!("expected InvalidRecord, got {:?}", other),
        }
    }

    #[test]
    fn test_csv_unknown_status_is_skipped() {
        let data = "company_name,status\nAcme,paused\n";
        let rows = csv_rows(data.as_bytes()).unwrap();
        assert!(matches!(rows[0], Err(EngineError::InvalidRecord { row: 1, .. })));
        assert!(load_records_csv(data.as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn test_csv_whole_day_columns() {
        let data = "company_name,ecg,x_ray,x_ray_am\nAcme,x,,\nBeta,12,x/2,8\n";
        let records = load_records_csv(data.as_bytes()).unwrap();
        assert_eq!(
            records[0].category_cells(Category::Ecg),
            SessionCells::whole_day(CellValue::Placeholder(Placeholder::All))
        );
        assert!(!records[0].categories.contains_key(&Category::XRay));
        assert_eq!(
            records[1].category_cells(Category::Ecg),
            SessionCells::whole_day(CellValue::Number(12))
        );
        // Per-session columns win over the whole-day column
        assert_eq!(
            records[1].category_cells(Category::XRay),
            SessionCells::new(CellValue::Number(8), CellValue::Empty)
        );
    }

    #[test]
    fn test_csv_requires_company_name() {
        let data = "company_name,total_people\n ,10\n";
        let rows = csv_rows(data.as_bytes()).unwrap();
        assert!(matches!(rows[0], Err(EngineError::InvalidRecord { row: 1, .. })));
    }

    #[test]
    fn test_json_records() {
        let data = r#"[
            {"company_name": "Acme", "start_date": "2025-08-01", "end_date": "2025-08-03",
             "total_people": 30, "status": "completed",
             "categories": {"ecg": {"morning": "x", "afternoon": 4}}},
            {"company_name": "Beta", "specific_dates": "8/5(10)"}
        ]"#;
        let records = load_records_json(data.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].status, Status::Completed);
        assert_eq!(
            records[0].category_cells(Category::Ecg),
            SessionCells::new(CellValue::Placeholder(Placeholder::All), CellValue::Number(4))
        );
        assert_eq!(records[1].status, Status::Ongoing);
        assert_eq!(records[1].start_date, None);
    }

    #[test]
    fn test_json_whole_day_cells() {
        let data = r#"[{"company_name": "Acme", "categories": {"ecg": "x", "x_ray": 6}}]"#;
        let records = load_records_json(data.as_bytes()).unwrap();
        assert_eq!(
            records[0].category_cells(Category::Ecg),
            SessionCells::whole_day(CellValue::Placeholder(Placeholder::All))
        );
        assert_eq!(
            records[0].category_cells(Category::XRay),
            SessionCells::whole_day(CellValue::Number(6))
        );
    }

    #[test]
    fn test_json_invalid_elements_are_skipped() {
        let data = r#"[{"company_name": "Acme"}, {"company_name": "  "}, {"company_name": "Beta", "status": "paused"}]"#;
        let rows = json_rows(data.as_bytes()).unwrap();
        assert!(matches!(rows[1], Err(EngineError::InvalidRecord { row: 2, .. })));
        assert!(matches!(rows[2], Err(EngineError::InvalidRecord { row: 3, .. })));

        let records = load_records_json(data.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].company_name, "Acme");
    }

    #[test]
    fn test_json_must_be_an_array() {
        let data = r#"{"company_name": "Acme"}"#;
        assert!(matches!(load_records_json(data.as_bytes()), Err(EngineError::Json(_))));
    }

    #[test]
    fn test_unsupported_extension() {
        let result = load_records(Path::new("records.xlsx"));
        assert!(matches!(result, Err(EngineError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = load_records(Path::new("definitely/not/here.json"));
        assert!(matches!(result, Err(EngineError::Io(_))));
    }
}
