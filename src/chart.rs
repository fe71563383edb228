// 📈 Chart Sink
// Renders line and bar charts to SVG with plotters. SVG keeps text as text,
// so no system font stack is needed at build or run time.

use crate::error::{InsightError, InsightResult};
use crate::sink::{ensure_dir, ChartKind, ChartRequest, RenderedArtifact, ReportSink};
use log::info;
use plotters::prelude::*;
use plotters::style::FontTransform;
use std::error::Error;
use std::path::{Path, PathBuf};

const BACKGROUND: RGBColor = RGBColor(20, 20, 20);
const LINE_COLOR: RGBColor = RGBColor(0, 191, 255);
const BAR_COLOR: RGBColor = RGBColor(255, 140, 0);
const GRID_COLOR: RGBColor = RGBColor(60, 60, 60);
const TEXT_COLOR: RGBColor = RGBColor(200, 200, 200);
const TITLE_COLOR: RGBColor = RGBColor(240, 240, 240);

/// Tick labels beyond this count become unreadable on the x axis
const MAX_X_LABELS: usize = 48;

pub struct ChartSink {
    dir: PathBuf,
    width: u32,
    height: u32,
}

impl ChartSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        ChartSink {
            dir: dir.into(),
            width: 1400,
            height: 700,
        }
    }

    pub fn with_size(dir: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        ChartSink {
            dir: dir.into(),
            width,
            height,
        }
    }

    pub fn chart_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.svg", name))
    }

    fn draw_line(&self, chart: &ChartRequest, path: &Path) -> Result<(), Box<dyn Error + 'static>> {
        let root = SVGBackend::new(path, (self.width, self.height)).into_drawing_area();
        root.fill(&BACKGROUND)?;

        let labels: Vec<&str> = chart.series.iter().map(|p| p.label.as_str()).collect();
        let (y_min, y_max) = value_range(chart.series.iter().map(|p| p.value));

        let mut ctx = ChartBuilder::on(&root)
            .caption(&chart.title, ("sans-serif", 32).into_font().color(&TITLE_COLOR))
            .margin(30)
            .x_label_area_size(90)
            .y_label_area_size(90)
            .build_cartesian_2d(0..labels.len(), y_min..y_max)?;

        ctx.configure_mesh()
            .x_desc(chart.x_label.as_str())
            .y_desc(chart.y_label.as_str())
            .x_labels(labels.len().min(MAX_X_LABELS))
            .y_labels(10)
            .axis_style(ShapeStyle::from(&RGBColor(120, 120, 120)).stroke_width(2))
            .light_line_style(ShapeStyle::from(&GRID_COLOR).stroke_width(1))
            .bold_line_style(ShapeStyle::from(&GRID_COLOR).stroke_width(1))
            .axis_desc_style(("sans-serif", 18).into_font().color(&TEXT_COLOR))
            .x_label_style(
                ("sans-serif", 13)
                    .into_font()
                    .color(&TEXT_COLOR)
                    .transform(FontTransform::Rotate90),
            )
            .y_label_style(("sans-serif", 16).into_font().color(&TEXT_COLOR))
            .x_label_formatter(&|x| labels.get(*x).map(|l| l.to_string()).unwrap_or_default())
            .y_label_formatter(&|y| format!("{:.0}", y))
            .draw()?;

        ctx.draw_series(LineSeries::new(
            chart.series.iter().enumerate().map(|(i, p)| (i, p.value)),
            ShapeStyle::from(&LINE_COLOR).stroke_width(3),
        ))?;

        root.present()?;
        Ok(())
    }

    fn draw_bars(&self, chart: &ChartRequest, path: &Path) -> Result<(), Box<dyn Error + 'static>> {
        let root = SVGBackend::new(path, (self.width, self.height)).into_drawing_area();
        root.fill(&BACKGROUND)?;

        let labels: Vec<&str> = chart.series.iter().map(|p| p.label.as_str()).collect();
        let (y_min, y_max) = value_range(chart.series.iter().map(|p| p.value));

        let mut ctx = ChartBuilder::on(&root)
            .caption(&chart.title, ("sans-serif", 32).into_font().color(&TITLE_COLOR))
            .margin(30)
            .x_label_area_size(160)
            .y_label_area_size(90)
            .build_cartesian_2d((0..labels.len()).into_segmented(), y_min..y_max)?;

        ctx.configure_mesh()
            .disable_x_mesh()
            .x_desc(chart.x_label.as_str())
            .y_desc(chart.y_label.as_str())
            .x_labels(labels.len())
            .y_labels(10)
            .axis_style(ShapeStyle::from(&RGBColor(120, 120, 120)).stroke_width(2))
            .light_line_style(ShapeStyle::from(&GRID_COLOR).stroke_width(1))
            .bold_line_style(ShapeStyle::from(&GRID_COLOR).stroke_width(1))
            .axis_desc_style(("sans-serif", 18).into_font().color(&TEXT_COLOR))
            .x_label_style(
                ("sans-serif", 13)
                    .into_font()
                    .color(&TEXT_COLOR)
                    .transform(FontTransform::Rotate90),
            )
            .y_label_style(("sans-serif", 16).into_font().color(&TEXT_COLOR))
            .x_label_formatter(&|x| match x {
                SegmentValue::CenterOf(i) => labels.get(*i).map(|l| l.to_string()).unwrap_or_default(),
                _ => String::new(),
            })
            .draw()?;

        ctx.draw_series(chart.series.iter().enumerate().map(|(i, p)| {
            let mut bar = Rectangle::new(
                [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), p.value)],
                BAR_COLOR.filled(),
            );
            bar.set_margin(0, 0, 6, 6);
            bar
        }))?;

        root.present()?;
        Ok(())
    }
}

impl ReportSink for ChartSink {
    fn kind(&self) -> &'static str {
        "chart"
    }

    fn render(&mut self, chart: &ChartRequest) -> InsightResult<RenderedArtifact> {
        if chart.series.is_empty() {
            return Err(InsightError::render(&chart.name, "cannot draw a chart with no data"));
        }

        ensure_dir(&self.dir, &chart.name)?;
        let path = self.chart_path(&chart.name);

        let drawn = match chart.kind {
            ChartKind::Line => self.draw_line(chart, &path),
            ChartKind::Bar => self.draw_bars(chart, &path),
        };
        drawn.map_err(|e| InsightError::render(&chart.name, e))?;

        info!("Chart generated: {}", path.display());

        Ok(RenderedArtifact {
            name: chart.name.clone(),
            location: Some(path),
            points: chart.series.len(),
        })
    }
}

/// Y-axis range with 10% headroom; always includes zero
fn value_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (mut min, mut max) = (0.0_f64, 0.0_f64);
    for v in values.filter(|v| v.is_finite()) {
        min = min.min(v);
        max = max.max(v);
    }

    let span = max - min;
    let padding = if span > 0.0 { span * 0.1 } else { 1.0 };
    let y_min = if min < 0.0 { min - padding } else { 0.0 };
    (y_min, max + padding)
}

// ============================================================================
// TESTS
// ============================================================================
