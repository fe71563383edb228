use anyhow::{bail, Context, Result};
use chinook_insights::{
    AppConfig, ChartSink, ConsoleSink, CsvSink, ReportPipeline, ReportSink, RunSummary,
};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq)]
enum OutputFormat {
    Chart,
    Csv,
    Console,
    All,
}

impl OutputFormat {
    fn parse(raw: &str) -> Result<Self> {
        match raw {
            "chart" | "svg" => Ok(OutputFormat::Chart),
            "csv" => Ok(OutputFormat::Csv),
            "console" => Ok(OutputFormat::Console),
            "all" => Ok(OutputFormat::All),
            other => bail!("unknown format '{}' (expected chart, csv, console or all)", other),
        }
    }
}

struct CliArgs {
    config_path: Option<PathBuf>,
    format: OutputFormat,
}

fn parse_args(args: &[String]) -> Result<Option<CliArgs>> {
    let mut config_path = None;
    let mut format = OutputFormat::All;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "run" => {}
            "--config" => {
                let path = iter.next().context("--config needs a path")?;
                config_path = Some(PathBuf::from(path));
            }
            "--format" => {
                let raw = iter.next().context("--format needs a value")?;
                format = OutputFormat::parse(raw)?;
            }
            "help" | "--help" | "-h" => return Ok(None),
            other => bail!("unknown argument '{}'", other),
        }
    }

    Ok(Some(CliArgs {
        config_path,
        format,
    }))
}

fn print_usage() {
    println!("Usage: chinook-insights [run] [--config PATH] [--format chart|csv|console|all]");
    println!();
    println!("  --config PATH   TOML configuration (default: chinook-insights.toml if present)");
    println!("  --format FMT    Output sinks (default: all)");
    println!();
    println!("Environment: CHINOOK_DB, CHINOOK_REPORTS_DIR, RUST_LOG");
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    let cli = match parse_args(&args)? {
        Some(cli) => cli,
        None => {
            print_usage();
            return Ok(());
        }
    };

    let config = AppConfig::load(cli.config_path.as_deref()).context("Failed to load configuration")?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_level.as_str()))
        .target(env_logger::Target::Stderr)
        .init();

    run(&config, cli.format)
}

fn run(config: &AppConfig, format: OutputFormat) -> Result<()> {
    println!("🎵 Chinook Insights - Sales Analysis / Verkaufsanalyse");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // 1. Open data source
    println!("\n📂 Opening data source...");
    let source = config.open_source().context("Failed to open data source")?;
    println!("✓ {}", source.describe());

    // 2. Sinks
    let mut charts = ChartSink::with_size(&config.reports_dir, config.chart.width, config.chart.height);
    let mut csv = CsvSink::new(&config.reports_dir);
    let mut console = ConsoleSink::stdout();

    let mut sinks: Vec<&mut dyn ReportSink> = Vec::new();
    if matches!(format, OutputFormat::Console | OutputFormat::All) {
        sinks.push(&mut console);
    }
    if matches!(format, OutputFormat::Chart | OutputFormat::All) {
        sinks.push(&mut charts);
    }
    if matches!(format, OutputFormat::Csv | OutputFormat::All) {
        sinks.push(&mut csv);
    }

    // 3. Aggregate and render
    println!("\n📊 Computing aggregates...");
    let pipeline = ReportPipeline::new(config.limits);
    let summary = pipeline
        .run(source.as_ref(), &mut sinks)
        .context("Analysis failed")?;

    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for line in summary.report.headlines() {
        println!("💰 {}", line);
    }

    let files: Vec<_> = summary
        .artifacts
        .iter()
        .filter_map(|a| a.artifact.location.as_ref())
        .collect();
    if !files.is_empty() {
        println!("\n📁 Files written / Dateien geschrieben: {}", files.len());
        for path in files {
            println!("   ✓ {}", path.display());
        }
    }

    for skipped in &summary.report.skipped {
        println!("⚠️  Skipped {}: {}", skipped.aggregate, skipped.reason);
    }
    for failure in &summary.failures {
        println!("❌ {} [{}]: {}", failure.chart, failure.sink, failure.reason);
    }

    if summary.is_clean() {
        println!("\n✅ Analysis complete / Analyse abgeschlossen");
    } else {
        println!("\n✅ Analysis complete with warnings / Analyse mit Warnungen abgeschlossen");
    }
}
