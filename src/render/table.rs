//! History Table Formatting
//!
//! Turns measurement records into display rows and lays them out as a
//! fixed-column text table. Input order is preserved; sorting is the
//! History Synchronizer's job.

use crate::api::MeasurementRecord;
use crate::timefmt;

/// Placeholder for absent optional fields.
pub const EMPTY_FIELD: &str = "—";

/// Placeholder row shown when there is nothing to display (empty result
/// or failed fetch).
pub const NO_RECORDS_ROW: &str = "No records.";

const HEADERS: [&str; 5] = ["Timestamp", "mg/dL", "Last meal", "Last exercise", "Symptoms"];

/// One rendered table row.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRow {
    pub timestamp: String,
    pub value: String,
    pub meal_time: String,
    pub exercise_time: String,
    pub symptoms: String,
}

impl HistoryRow {
    fn columns(&self) -> [&str; 5] {
        [
            &self.timestamp,
            &self.value,
            &self.meal_time,
            &self.exercise_time,
            &self.symptoms,
        ]
    }
}

/// Build display rows from records, in the given order.
pub fn history_rows(records: &[MeasurementRecord]) -> Vec<HistoryRow> {
    records
        .iter()
        .map(|r| HistoryRow {
            timestamp: timefmt::normalize(&r.timestamp),
            value: format_value(r.value),
            meal_time: optional_timestamp(r.meal_time.as_deref()),
            exercise_time: optional_timestamp(r.exercise_time.as_deref()),
            symptoms: match r.symptoms.as_deref() {
                Some(s) if !s.is_empty() => s.to_string(),
                _ => EMPTY_FIELD.to_string(),
            },
        })
        .collect()
}

fn optional_timestamp(raw: Option<&str>) -> String {
    match raw {
        Some(s) if !s.is_empty() => timefmt::normalize(s),
        _ => EMPTY_FIELD.to_string(),
    }
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

/// Lay the rows out as an aligned text table with a header line.
pub fn format_history_table(rows: &[HistoryRow]) -> String {
    if rows.is_empty() {
        return NO_RECORDS_ROW.to_string();
    }

    let mut widths: Vec<usize> = HEADERS.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.columns().iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut out = String::new();
    append_line(&mut out, &HEADERS, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let rule_refs: Vec<&str> = rule.iter().map(String::as_str).collect();
    append_line(&mut out, &rule_refs, &widths);
    for row in rows {
        append_line(&mut out, &row.columns(), &widths);
    }
    out
}

fn append_line(out: &mut String, cells: &[&str], widths: &[usize]) {
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            out.push_str("  ");
        }
        out.push_str(cell);
        let pad = widths[i].saturating_sub(cell.chars().count());
        if i < cells.len() - 1 {
            out.extend(std::iter::repeat(' ').take(pad));
        }
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(timestamp: &str, value: f64) -> MeasurementRecord {
        MeasurementRecord {
            id: None,
            value,
            timestamp: timestamp.to_string(),
            meal_time: None,
            exercise_time: None,
            symptoms: None,
        }
    }

    #[test]
    fn absent_fields_render_em_dash() {
        let rows = history_rows(&[record("2024-01-01T10:00", 100.0)]);
        assert_eq!(rows[0].meal_time, EMPTY_FIELD);
        assert_eq!(rows[0].exercise_time, EMPTY_FIELD);
        assert_eq!(rows[0].symptoms, EMPTY_FIELD);
        assert_eq!(rows[0].value, "100");
    }

    #[test]
    fn present_fields_are_formatted() {
        let mut r = record("2024-01-01T10:00", 98.5);
        r.meal_time = Some("2024-01-01T08:30".to_string());
        r.symptoms = Some("dizziness".to_string());
        let rows = history_rows(&[r]);
        assert_eq!(rows[0].timestamp, "01/01/2024 10:00");
        assert_eq!(rows[0].meal_time, "01/01/2024 08:30");
        assert_eq!(rows[0].symptoms, "dizziness");
        assert_eq!(rows[0].value, "98.5");
    }

    #[test]
    fn empty_rows_render_placeholder() {
        assert_eq!(format_history_table(&[]), NO_RECORDS_ROW);
    }

    #[test]
    fn table_keeps_input_order() {
        let rows = history_rows(&[
            record("2024-01-02T10:00", 120.0),
            record("2024-01-01T10:00", 100.0),
        ]);
        let table = format_history_table(&rows);
        let jan2 = table.find("02/01/2024").unwrap();
        let jan1 = table.find("01/01/2024 10:00").unwrap();
        assert!(jan2 < jan1);
    }
}
