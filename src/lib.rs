// Chinook Insights - Core Library
// Sales, customer, catalog and sales-rep aggregates over the Chinook store,
// exposed for the CLI, the API server and tests

pub mod error;
pub mod model;
pub mod join;
pub mod rank;
pub mod revenue;     // Revenue analysis
pub mod customers;   // Customer behavior
pub mod catalog;     // Genre / artist / album performance
pub mod sales_reps;  // Sales performance
pub mod source;
pub mod sink;
pub mod chart;
pub mod report;
pub mod pipeline;
pub mod config;

#[cfg(test)]
mod fixtures;

// Re-export commonly used types
pub use error::{InsightError, InsightResult};
pub use model::{
    Album, Artist, Customer, Employee, EntityKind, Genre, Invoice, InvoiceLine, Track,
};
pub use join::{left_join, Joined, KeyIndex, Resolved};
pub use rank::{GroupTotals, LabeledValue, RankedBucket, UNASSIGNED_LABEL, UNKNOWN_LABEL};
pub use revenue::{MonthlyRevenue, RevenueAggregator, YearMonth};
pub use customers::{CountryRevenue, CustomerAggregator, CustomerRevenue};
pub use catalog::{CatalogAggregator, CatalogTables, QuantityBucket};
pub use sales_reps::{RepRevenue, SalesRepAggregator};
pub use source::{CsvSource, DataSource, Dataset, SqliteSource};
pub use sink::{
    ChartKind, ChartRequest, ConsoleSink, CsvSink, RecordingSink, RenderedArtifact, ReportSink,
    ValueKind,
};
pub use chart::ChartSink;
pub use report::{compute_report, AnalysisReport, ReportLimits, RevenueSummary, SkippedAggregate};
pub use pipeline::{render_all, RenderFailure, ReportPipeline, RunSummary, SinkArtifact};
pub use config::{AppConfig, ChartConfig, ServerConfig, SourceKind};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
