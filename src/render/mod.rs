//! Rendering Layer
//!
//! Pure data-to-text transforms for the history table, the chart and the
//! chat feed. Nothing here touches the network or the terminal; the
//! synchronizers build these values and the CLI prints them, so every
//! transform stays unit-testable.

mod chart;
mod escape;
mod table;

pub use chart::{ChartPalette, LineChart, NO_DATA_MESSAGE};
pub use escape::{escape_html, escape_html_opt};
pub use table::{format_history_table, history_rows, HistoryRow, EMPTY_FIELD, NO_RECORDS_ROW};
