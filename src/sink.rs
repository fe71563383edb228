// 🖨️ Report Sinks
// A sink turns one named (label, value) series into an artifact. Aggregation
// code never renders; sinks are injected by the caller.

use crate::error::{InsightError, InsightResult};
use crate::rank::LabeledValue;
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

// ============================================================================
// CHART REQUEST
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChartKind {
    /// Time series (monthly revenue)
    Line,
    /// Ranked categories
    Bar,
}

/// How values are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ValueKind {
    Revenue,
    Units,
}

impl ValueKind {
    pub fn format(&self, value: f64) -> String {
        match self {
            ValueKind::Revenue => format!("{:.2}", value),
            ValueKind::Units => format!("{:.0}", value),
        }
    }
}

/// Everything a sink needs to render one aggregate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartRequest {
    /// File stem, e.g. `01_monthly_revenue`
    pub name: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub kind: ChartKind,
    pub value_kind: ValueKind,
    pub series: Vec<LabeledValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedArtifact {
    pub name: String,
    /// File written, if the sink produces files
    pub location: Option<PathBuf>,
    pub points: usize,
}

pub trait ReportSink {
    /// Short sink name for logs and summaries
    fn kind(&self) -> &'static str;

    fn render(&mut self, chart: &ChartRequest) -> InsightResult<RenderedArtifact>;
}

pub(crate) fn ensure_dir(dir: &Path, chart: &str) -> InsightResult<()> {
    fs::create_dir_all(dir).map_err(|e| {
        InsightError::render(chart, format!("cannot create {}: {}", dir.display(), e))
    })
}

// ============================================================================
// CONSOLE SINK
// ============================================================================

/// Prints each series as a ranked table, the way the console report reads
pub struct ConsoleSink<W: Write> {
    out: W,
}

impl ConsoleSink<io::Stdout> {
    pub fn stdout() -> Self {
        ConsoleSink { out: io::stdout() }
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn with_writer(out: W) -> Self {
        ConsoleSink { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_table(&mut self, chart: &ChartRequest) -> io::Result<()> {
        writeln!(self.out, "\n{}:", chart.title)?;

        let width = chart
            .series
            .iter()
            .map(|p| p.label.chars().count())
            .max()
            .unwrap_or(0);

        for (rank, point) in chart.series.iter().enumerate() {
            let label = match chart.kind {
                ChartKind::Bar => format!("{:>3}. {:<width$}", rank + 1, point.label, width = width),
                ChartKind::Line => format!("     {:<width$}", point.label, width = width),
            };
            writeln!(self.out, "{}  {:>12}", label, chart.value_kind.format(point.value))?;
        }

        self.out.flush()
    }
}

impl<W: Write> ReportSink for ConsoleSink<W> {
    fn kind(&self) -> &'static str {
        "console"
    }

    fn render(&mut self, chart: &ChartRequest) -> InsightResult<RenderedArtifact> {
        self.write_table(chart)
            .map_err(|e| InsightError::render(&chart.name, e))?;

        Ok(RenderedArtifact {
            name: chart.name.clone(),
            location: None,
            points: chart.series.len(),
        })
    }
}

// ============================================================================
// CSV SINK
// ============================================================================

/// Writes `<dir>/<name>.csv` with `label,value` rows
pub struct CsvSink {
    dir: PathBuf,
}

impl CsvSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        CsvSink { dir: dir.into() }
    }
}

impl ReportSink for CsvSink {
    fn kind(&self) -> &'static str {
        "csv"
    }

    fn render(&mut self, chart: &ChartRequest) -> InsightResult<RenderedArtifact> {
        ensure_dir(&self.dir, &chart.name)?;
        let path = self.dir.join(format!("{}.csv", chart.name));

        let mut wtr =
            csv::Writer::from_path(&path).map_err(|e| InsightError::render(&chart.name, e))?;
        for point in &chart.series {
            wtr.serialize(point)
                .map_err(|e| InsightError::render(&chart.name, e))?;
        }
        wtr.flush().map_err(|e| InsightError::render(&chart.name, e))?;

        Ok(RenderedArtifact {
            name: chart.name.clone(),
            location: Some(path),
            points: chart.series.len(),
        })
    }
}

// ============================================================================
// RECORDING SINK
// ============================================================================

/// Keeps every request in memory; can be told to fail specific charts
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub charts: Vec<ChartRequest>,
    pub fail_on: Vec<String>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(names: &[&str]) -> Self {
        RecordingSink {
            charts: Vec::new(),
            fail_on: names.iter().map(|n| n.to_string()).collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ChartRequest> {
        self.charts.iter().find(|c| c.name == name)
    }
}

impl ReportSink for RecordingSink {
    fn kind(&self) -> &'static str {
        "memory"
    }

    fn render(&mut self, chart: &ChartRequest) -> InsightResult<RenderedArtifact> {
        if self.fail_on.iter().any(|n| n == &chart.name) {
            return Err(InsightError::render(&chart.name, "rejected by recording sink"));
        }

        self.charts.push(chart.clone());
        Ok(RenderedArtifact {
            name: chart.name.clone(),
            location: None,
            points: chart.series.len(),
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn create_test_chart(kind: ChartKind, value_kind: ValueKind) -> ChartRequest {
        ChartRequest {
            name: "03_top_countries".to_string(),
            title: "Top 3 Countries by Revenue / Top 3 Länder nach Umsatz".to_string(),
            x_label: "Country / Land".to_string(),
            y_label: "Revenue / Umsatz".to_string(),
            kind,
            value_kind,
            series: vec![
                LabeledValue::new("USA", 523.06),
                LabeledValue::new("Canada", 303.96),
                LabeledValue::new("France", 195.1),
            ],
        }
    }

    #[test]
    fn test_console_sink_prints_ranked_table() {
        let mut sink = ConsoleSink::with_writer(Vec::new());
        let artifact = sink
            .render(&create_test_chart(ChartKind::Bar, ValueKind::Revenue))
            .unwrap();

        assert_eq!(artifact.points, 3);
        assert_eq!(artifact.location, None);

        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert!(text.contains("Top 3 Countries by Revenue / Top 3 Länder nach Umsatz:"));
        assert!(text.contains("  1. USA"));
        assert!(text.contains("523.06"));
        assert!(text.contains("  3. France"));
        assert!(text.contains("195.10"));
    }

    #[test]
    fn test_value_kind_formatting() {
        assert_eq!(ValueKind::Revenue.format(2328.6), "2328.60");
        assert_eq!(ValueKind::Units.format(835.0), "835");
    }

    #[test]
    fn test_csv_sink_writes_series() {
        let dir = tempdir().unwrap();
        let out_dir = dir.path().join("reports");
        let mut sink = CsvSink::new(&out_dir);

        let artifact = sink
            .render(&create_test_chart(ChartKind::Bar, ValueKind::Revenue))
            .unwrap();

        let path = artifact.location.unwrap();
        assert_eq!(path, out_dir.join("03_top_countries.csv"));

        let content = std::fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "label,value");
        assert_eq!(lines[1], "USA,523.06");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_recording_sink_failure_injection() {
        let mut sink = RecordingSink::failing_on(&["03_top_countries"]);
        let chart = create_test_chart(ChartKind::Bar, ValueKind::Revenue);

        assert!(matches!(sink.render(&chart), Err(InsightError::Render { .. })));
        assert!(sink.charts.is_empty());

        let mut sink = RecordingSink::new();
        sink.render(&chart).unwrap();
        assert_eq!(sink.get("03_top_countries").unwrap().series.len(), 3);
    }
}
