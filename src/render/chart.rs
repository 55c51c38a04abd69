//! History Chart
//!
//! Character-grid line chart of the glycemia series. A chart instance is
//! immutable once built: theme changes require destroying it and
//! creating a new one, which is why at most one instance exists at a
//! time (owned by the History Synchronizer).

use crate::theme::Theme;

/// Message rendered when the series is empty.
pub const NO_DATA_MESSAGE: &str = "No data to chart.";

/// Colors for the chart, picked from the active theme. Stroke and fill
/// are the series colors, grid and tick the scaffolding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartPalette {
    pub stroke: &'static str,
    pub fill: &'static str,
    pub grid: &'static str,
    pub tick: &'static str,
}

impl ChartPalette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                stroke: "#57d084",
                fill: "rgba(87, 208, 132, 0.1)",
                grid: "rgba(255, 255, 255, 0.1)",
                tick: "#e6eef8",
            },
            Theme::Light => Self {
                stroke: "#4caf50",
                fill: "rgba(76, 175, 80, 0.1)",
                grid: "rgba(0, 0, 0, 0.1)",
                tick: "#111827",
            },
        }
    }
}

/// One chart instance: labels, values and the palette it was built with.
#[derive(Debug)]
pub struct LineChart {
    labels: Vec<String>,
    values: Vec<f64>,
    palette: ChartPalette,
}

impl LineChart {
    /// Build a chart from chronologically ordered labels and values.
    pub fn new(labels: Vec<String>, values: Vec<f64>, palette: ChartPalette) -> Self {
        Self {
            labels,
            values,
            palette,
        }
    }

    pub fn palette(&self) -> ChartPalette {
        self.palette
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Render the series into a `width` x `height` character grid with a
    /// y-axis scale and first/last labels on the x-axis.
    pub fn render(&self, width: usize, height: usize) -> String {
        if self.values.is_empty() || width < 2 || height < 2 {
            return NO_DATA_MESSAGE.to_string();
        }

        let (min, max) = padded_range(&self.values);
        let mut grid = vec![vec![' '; width]; height];

        // Horizontal grid lines, quarter steps.
        for i in 0..=4 {
            let row = i * (height - 1) / 4;
            for cell in &mut grid[row] {
                *cell = '·';
            }
        }

        let n = self.values.len();
        let col_of = |i: usize| -> usize {
            if n == 1 {
                0
            } else {
                i * (width - 1) / (n - 1)
            }
        };
        let row_of = |v: f64| -> usize { value_to_row(v, min, max, height) };

        // Connect consecutive points column by column, then overlay the
        // points themselves.
        for i in 1..n {
            let (c0, c1) = (col_of(i - 1), col_of(i));
            let (v0, v1) = (self.values[i - 1], self.values[i]);
            for c in c0..=c1 {
                let t = if c1 == c0 {
                    0.0
                } else {
                    (c - c0) as f64 / (c1 - c0) as f64
                };
                let row = row_of(v0 + (v1 - v0) * t);
                grid[row][c] = '─';
            }
        }
        for (i, v) in self.values.iter().enumerate() {
            grid[row_of(*v)][col_of(i)] = '●';
        }

        let mut out = String::new();
        for (r, row) in grid.iter().enumerate() {
            let label = if r == 0 {
                format!("{max:>7.1}")
            } else if r == height - 1 {
                format!("{min:>7.1}")
            } else {
                " ".repeat(7)
            };
            out.push_str(&label);
            out.push_str(" ┤");
            out.extend(row.iter());
            out.push('\n');
        }

        // X-axis: first and last labels.
        if let (Some(first), Some(last)) = (self.labels.first(), self.labels.last()) {
            out.push_str(&" ".repeat(9));
            out.push_str(first);
            let used = first.chars().count() + last.chars().count();
            if n > 1 && width > used {
                out.extend(std::iter::repeat(' ').take(width - used));
                out.push_str(last);
            }
            out.push('\n');
        }

        out
    }
}

/// Y range with 10% padding; degenerate (flat) series get a unit band so
/// scaling never divides by zero.
fn padded_range(values: &[f64]) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values {
        min = min.min(*v);
        max = max.max(*v);
    }

    let span = max - min;
    let pad = if span > 0.0 { span * 0.1 } else { 1.0 };
    (min - pad, max + pad)
}

fn value_to_row(value: f64, min: f64, max: f64, height: usize) -> usize {
    let scaled = (max - value) / (max - min) * (height - 1) as f64;
    (scaled.round() as usize).min(height - 1)
}
