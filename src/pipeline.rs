// 🚀 Insight Pipeline
// Computes the report, then hands every chart to every sink.
// Render failures are collected per (sink, chart) and never stop the run.

use crate::error::InsightResult;
use crate::report::{compute_report, AnalysisReport, ReportLimits};
use crate::sink::{ChartRequest, RenderedArtifact, ReportSink};
use crate::source::DataSource;
use log::{info, warn};
use serde::Serialize;

// ============================================================================
// RUN SUMMARY
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct SinkArtifact {
    pub sink: &'static str,
    #[serde(flatten)]
    pub artifact: RenderedArtifact,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderFailure {
    pub sink: &'static str,
    pub chart: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub report: AnalysisReport,
    pub artifacts: Vec<SinkArtifact>,
    pub failures: Vec<RenderFailure>,
}

impl RunSummary {
    /// True when every aggregate was computed and every chart rendered
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.report.skipped.is_empty()
    }
}

// ============================================================================
// PIPELINE
// ============================================================================

pub struct ReportPipeline {
    limits: ReportLimits,
}

impl ReportPipeline {
    pub fn new(limits: ReportLimits) -> Self {
        ReportPipeline { limits }
    }

    pub fn limits(&self) -> &ReportLimits {
        &self.limits
    }

    /// Compute the report from `source` and render it to every sink
    ///
    /// Only source errors abort; skipped aggregates and render failures end
    /// up in the summary.
    pub fn run(
        &self,
        source: &dyn DataSource,
        sinks: &mut [&mut dyn ReportSink],
    ) -> InsightResult<RunSummary> {
        info!("Loading data from {}", source.describe());
        let report = compute_report(source, &self.limits)?;

        let charts = report.chart_requests();
        let (artifacts, failures) = render_all(&charts, sinks);

        info!(
            "Run finished: {} artifacts, {} render failures, {} skipped aggregates",
            artifacts.len(),
            failures.len(),
            report.skipped.len()
        );

        Ok(RunSummary {
            report,
            artifacts,
            failures,
        })
    }
}

impl Default for ReportPipeline {
    fn default() -> Self {
        Self::new(ReportLimits::default())
    }
}

/// Render each chart with each sink, in chart order
pub fn render_all(
    charts: &[ChartRequest],
    sinks: &mut [&mut dyn ReportSink],
) -> (Vec<SinkArtifact>, Vec<RenderFailure>) {
    let mut artifacts = Vec::new();
    let mut failures = Vec::new();

    for chart in charts {
        for sink in sinks.iter_mut() {
            match sink.render(chart) {
                Ok(artifact) => artifacts.push(SinkArtifact {
                    sink: sink.kind(),
                    artifact,
                }),
                Err(err) => {
                    warn!("{} sink: {}", sink.kind(), err);
                    failures.push(RenderFailure {
                        sink: sink.kind(),
                        chart: chart.name.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }
    }

    (artifacts, failures)
}

// ============================================================================
// TESTS
// ============================================================================
