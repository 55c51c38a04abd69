//! History Synchronizer
//!
//! Fetches the full measurement set once per refresh and derives two
//! orderings from it: newest-first for the table, oldest-first for the
//! chart. Ordering always compares parsed instants, never raw strings.
//! The synchronizer owns the single chart instance; a refresh or theme
//! change destroys it before a replacement is built.

use std::sync::Arc;

use crate::api::{ApiClient, MeasurementRecord};
use crate::render::{
    format_history_table, history_rows, ChartPalette, LineChart, NO_RECORDS_ROW,
};
use crate::theme::ThemeController;
use crate::timefmt;

pub struct HistorySynchronizer {
    api: ApiClient,
    theme: Arc<ThemeController>,
    table: String,
    chart: Option<LineChart>,
}

impl HistorySynchronizer {
    pub fn new(api: ApiClient, theme: Arc<ThemeController>) -> Self {
        Self {
            api,
            theme,
            table: NO_RECORDS_ROW.to_string(),
            chart: None,
        }
    }

    /// Fetch the record set and rebuild both the table and the chart.
    ///
    /// A failed fetch or a non-array payload renders the placeholder row
    /// and discards any existing chart.
    pub async fn refresh(&mut self) {
        let response = self.api.get("/api/records").await;

        let records: Option<Vec<MeasurementRecord>> = if response.success {
            response.decode()
        } else {
            tracing::warn!(
                status = response.status,
                "history fetch failed: {}",
                response.describe_failure()
            );
            None
        };

        self.apply_records(records);
    }

    /// Rendered history table (or the placeholder row).
    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn chart(&self) -> Option<&LineChart> {
        self.chart.as_ref()
    }

    /// Whether a chart instance is currently live. Theme toggles only
    /// trigger a re-render when this is true.
    pub fn has_chart(&self) -> bool {
        self.chart.is_some()
    }

    fn apply_records(&mut self, records: Option<Vec<MeasurementRecord>>) {
        // The prior chart instance is dropped before any replacement is
        // built; at most one instance exists at a time.
        self.chart = None;

        let records = match records {
            Some(records) => records,
            None => {
                self.table = NO_RECORDS_ROW.to_string();
                return;
            }
        };

        let table_order = sort_newest_first(records.clone());
        self.table = format_history_table(&history_rows(&table_order));

        let chart_order = sort_oldest_first(records);
        if !chart_order.is_empty() {
            let labels = chart_order
                .iter()
                .map(|r| timefmt::normalize(&r.timestamp))
                .collect();
            let values = chart_order.iter().map(|r| r.value).collect();
            let palette = ChartPalette::for_theme(self.theme.active());
            self.chart = Some(LineChart::new(labels, values, palette));
        }
    }
}

/// Table ordering: most recent first. Records with unparseable
/// timestamps sink to the end.
fn sort_newest_first(mut records: Vec<MeasurementRecord>) -> Vec<MeasurementRecord> {
    records.sort_by(|a, b| {
        let ka = timefmt::parse_sort_key(&a.timestamp);
        let kb = timefmt::parse_sort_key(&b.timestamp);
        kb.cmp(&ka)
    });
    records
}

/// Chart ordering: chronological, oldest first.
fn sort_oldest_first(mut records: Vec<MeasurementRecord>) -> Vec<MeasurementRecord> {
    records.sort_by(|a, b| {
        let ka = timefmt::parse_sort_key(&a.timestamp);
        let kb = timefmt::parse_sort_key(&b.timestamp);
        ka.cmp(&kb)
    });
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;
    use crate::theme::Theme;
    use tempfile::tempdir;
    use tokio::sync::RwLock;

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

    fn synchronizer(theme: Theme) -> HistorySynchronizer {
        let path = tempdir().unwrap().into_path().join("store.toml");
        let store = Arc::new(RwLock::new(Store::open(path).unwrap()));
        let controller = Arc::new(ThemeController::new(Arc::clone(&store)));
        controller.apply(theme);
        let api = ApiClient::new("http://127.0.0.1:5000", store);
        HistorySynchronizer::new(api, controller)
    }

    #[test]
    fn table_newest_first_chart_oldest_first() {
        let mut sync = synchronizer(Theme::Light);
        sync.apply_records(Some(vec![
            record("2024-01-01T10:00", 100.0),
            record("2024-01-02T10:00", 120.0),
        ]));

        // Jan 2 row above Jan 1 row.
        let jan2 = sync.table().find("02/01/2024").unwrap();
        let jan1 = sync.table().find("01/01/2024").unwrap();
        assert!(jan2 < jan1);

        // Chart points chronological: Jan 1 before Jan 2.
        let chart = sync.chart().unwrap();
        let rendered = chart.render(70, 8);
        assert!(rendered.contains("01/01/2024 10:00"));
        assert_eq!(chart.len(), 2);
    }

    #[test]
    fn mixed_timestamp_shapes_sort_by_instant() {
        // String comparison would order the naive form after the
        // microsecond form; instant comparison must not.
        let mut sync = synchronizer(Theme::Light);
        sync.apply_records(Some(vec![
            record("2024-01-01T23:00", 90.0),
            record("2024-01-01T08:00:00.500000", 110.0),
        ]));
        let late = sync.table().find("23:00").unwrap();
        let early = sync.table().find("08:00").unwrap();
        assert!(late < early, "newest-first table: {}", sync.table());
    }

    #[test]
    fn failure_renders_placeholder_and_drops_chart() {
        let mut sync = synchronizer(Theme::Light);
        sync.apply_records(Some(vec![record("2024-01-01T10:00", 100.0)]));
        assert!(sync.has_chart());

        sync.apply_records(None);
        assert_eq!(sync.table(), NO_RECORDS_ROW);
        assert!(!sync.has_chart());
    }

    #[test]
    fn chart_palette_follows_active_theme() {
        let mut sync = synchronizer(Theme::Dark);
        sync.apply_records(Some(vec![record("2024-01-01T10:00", 100.0)]));
        assert_eq!(
            sync.chart().unwrap().palette(),
            ChartPalette::for_theme(Theme::Dark)
        );
    }

    #[test]
    fn empty_result_is_distinct_from_failure() {
        let mut sync = synchronizer(Theme::Light);
        // An empty array is a successful fetch: placeholder table, no
        // chart, but it went through the success path.
        sync.apply_records(Some(vec![]));
        assert_eq!(sync.table(), NO_RECORDS_ROW);
        assert!(!sync.has_chart());
    }
}
