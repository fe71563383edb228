// 📊 Analysis Report
// Runs every aggregator against one data source and packages the results.
// Tables are loaded per stage and dropped once their consumers are done.

use crate::catalog::{
    CatalogAggregator, CatalogTables, QuantityBucket, DEFAULT_TOP_ALBUMS, DEFAULT_TOP_ARTISTS,
    DEFAULT_TOP_GENRES,
};
use crate::customers::{
    CountryRevenue, CustomerAggregator, CustomerRevenue, DEFAULT_TOP_COUNTRIES,
    DEFAULT_TOP_CUSTOMERS,
};
use crate::error::{InsightError, InsightResult};
use crate::rank::labeled_series;
use crate::revenue::{monthly_series_points, MonthlyRevenue, RevenueAggregator};
use crate::sales_reps::{RepRevenue, SalesRepAggregator};
use crate::sink::{ChartKind, ChartRequest, ValueKind};
use crate::source::DataSource;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

// ============================================================================
// LIMITS
// ============================================================================

/// How many entries each ranked aggregate keeps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportLimits {
    pub customers: usize,
    pub countries: usize,
    pub genres: usize,
    pub artists: usize,
    pub albums: usize,
}

impl Default for ReportLimits {
    fn default() -> Self {
        ReportLimits {
            customers: DEFAULT_TOP_CUSTOMERS,
            countries: DEFAULT_TOP_COUNTRIES,
            genres: DEFAULT_TOP_GENRES,
            artists: DEFAULT_TOP_ARTISTS,
            albums: DEFAULT_TOP_ALBUMS,
        }
    }
}

// ============================================================================
// REPORT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueSummary {
    pub invoice_count: usize,
    pub total_revenue: f64,
    /// `None` when there were no invoices to average
    pub average_invoice_value: Option<f64>,
    pub monthly: Vec<MonthlyRevenue>,
}

/// An aggregate that could not be computed; the rest of the run went on
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedAggregate {
    pub aggregate: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub limits: ReportLimits,
    pub revenue: RevenueSummary,
    pub top_customers: Vec<CustomerRevenue>,
    pub top_countries: Vec<CountryRevenue>,
    pub top_genres: Vec<QuantityBucket>,
    pub top_artists: Vec<QuantityBucket>,
    pub top_albums: Vec<QuantityBucket>,
    pub sales_by_rep: Vec<RepRevenue>,
    pub skipped: Vec<SkippedAggregate>,
}

/// Compute every aggregate from `source`
///
/// Source failures abort; `EmptyInput` is recorded in `skipped` and the
/// remaining aggregates still run.
pub fn compute_report(source: &dyn DataSource, limits: &ReportLimits) -> InsightResult<AnalysisReport> {
    let mut skipped = Vec::new();

    // 1. Revenue
    info!("Revenue analysis / Umsatzanalyse");
    let invoices = source.invoices()?;
    let revenue_agg = RevenueAggregator::new(&invoices);
    let average_invoice_value = match revenue_agg.average_invoice_value() {
        Ok(avg) => Some(avg),
        Err(err @ InsightError::EmptyInput { .. }) => {
            warn!("Skipping aggregate: {}", err);
            skipped.push(SkippedAggregate {
                aggregate: "average_invoice_value".to_string(),
                reason: err.to_string(),
            });
            None
        }
        Err(err) => return Err(err),
    };
    let revenue = RevenueSummary {
        invoice_count: revenue_agg.invoice_count(),
        total_revenue: revenue_agg.total_revenue(),
        average_invoice_value,
        monthly: revenue_agg.monthly_revenue_series(),
    };
    debug!(
        "{} invoices, {} monthly buckets",
        revenue.invoice_count,
        revenue.monthly.len()
    );

    // 2. Customers
    info!("Customer behavior / Kundenverhalten");
    let customers = source.customers()?;
    let customer_agg = CustomerAggregator::new(&invoices, &customers);
    let top_customers = customer_agg.top_customers_by_revenue(limits.customers);
    let top_countries = customer_agg.top_countries_by_revenue(limits.countries);

    // 3. Genres, artists, albums
    info!("Artists & genres performance / Künstler- und Genre-Performance");
    let (top_genres, top_artists, top_albums) = {
        let lines = source.invoice_lines()?;
        let tracks = source.tracks()?;
        let genres = source.genres()?;
        let albums = source.albums()?;
        let artists = source.artists()?;

        let catalog = CatalogAggregator::new(
            &lines,
            &CatalogTables {
                tracks: &tracks,
                genres: &genres,
                albums: &albums,
                artists: &artists,
            },
        );
        debug!(
            "{} invoice lines, {} units sold",
            catalog.sales().len(),
            catalog.total_quantity()
        );

        (
            catalog.top_genres_by_quantity(limits.genres),
            catalog.top_artists_by_quantity(limits.artists),
            catalog.top_albums_by_quantity(limits.albums),
        )
    };

    // 4. Sales reps
    info!("Sales performance / Verkaufsleistung");
    let employees = source.employees()?;
    let sales_by_rep = SalesRepAggregator::new(&invoices, &customers, &employees).revenue_by_employee();

    Ok(AnalysisReport {
        generated_at: Utc::now(),
        source: source.describe(),
        limits: *limits,
        revenue,
        top_customers,
        top_countries,
        top_genres,
        top_artists,
        top_albums,
        sales_by_rep,
        skipped,
    })
}

impl AnalysisReport {
    /// Headline figures for console output
    pub fn headlines(&self) -> Vec<String> {
        let average = match self.revenue.average_invoice_value {
            Some(avg) => format!("{:.2}", avg),
            None => "n/a".to_string(),
        };

        vec![
            format!("Invoices / Rechnungen: {}", self.revenue.invoice_count),
            format!("Total Revenue / Gesamtumsatz: {:.2}", self.revenue.total_revenue),
            format!("Average Invoice Value / Durchschnittlicher Einkaufswert: {}", average),
        ]
    }

    /// One chart request per aggregate, named like the report files
    pub fn chart_requests(&self) -> Vec<ChartRequest> {
        let revenue_axis = "Revenue / Umsatz";
        let units_axis = "Units Sold / Verkaufte Stückzahl";

        vec![
            ChartRequest {
                name: "01_monthly_revenue".to_string(),
                title: "Monthly Revenue / Monatlicher Umsatz".to_string(),
                x_label: "Month / Monat".to_string(),
                y_label: revenue_axis.to_string(),
                kind: ChartKind::Line,
                value_kind: ValueKind::Revenue,
                series: monthly_series_points(&self.revenue.monthly),
            },
            ChartRequest {
                name: "02_top_customers".to_string(),
                title: format!(
                    "Top {n} Customers by Revenue / Top {n} Kunden nach Umsatz",
                    n = self.limits.customers
                ),
                x_label: "Customer / Kunde".to_string(),
                y_label: revenue_axis.to_string(),
                kind: ChartKind::Bar,
                value_kind: ValueKind::Revenue,
                series: labeled_series(&self.top_customers),
            },
            ChartRequest {
                name: "03_top_countries".to_string(),
                title: format!(
                    "Top {n} Countries by Revenue / Top {n} Länder nach Umsatz",
                    n = self.limits.countries
                ),
                x_label: "Country / Land".to_string(),
                y_label: revenue_axis.to_string(),
                kind: ChartKind::Bar,
                value_kind: ValueKind::Revenue,
                series: labeled_series(&self.top_countries),
            },
            ChartRequest {
                name: "04_top_genres".to_string(),
                title: "Top Genres by Sold Tracks / Top Genres nach verkauften Tracks".to_string(),
                x_label: "Genre".to_string(),
                y_label: units_axis.to_string(),
                kind: ChartKind::Bar,
                value_kind: ValueKind::Units,
                series: labeled_series(&self.top_genres),
            },
            ChartRequest {
                name: "05_top_artists".to_string(),
                title: format!(
                    "Top {n} Artists by Sold Tracks / Top {n} Künstler nach verkauften Tracks",
                    n = self.limits.artists
                ),
                x_label: "Artist / Künstler".to_string(),
                y_label: units_axis.to_string(),
                kind: ChartKind::Bar,
                value_kind: ValueKind::Units,
                series: labeled_series(&self.top_artists),
            },
            ChartRequest {
                name: "06_top_albums".to_string(),
                title: format!(
                    "Top {n} Albums by Sold Tracks / Top {n} Alben nach verkauften Tracks",
                    n = self.limits.albums
                ),
                x_label: "Album".to_string(),
                y_label: units_axis.to_string(),
                kind: ChartKind::Bar,
                value_kind: ValueKind::Units,
                series: labeled_series(&self.top_albums),
            },
            ChartRequest {
                name: "07_sales_by_rep".to_string(),
                title: "Revenue by Salesperson / Umsatz nach Verkaufsmitarbeiter".to_string(),
                x_label: "Salesperson / Verkaufsmitarbeiter".to_string(),
                y_label: revenue_axis.to_string(),
                kind: ChartKind::Bar,
                value_kind: ValueKind::Revenue,
                series: labeled_series(&self.sales_by_rep),
            },
        ]
    }
}

// ============================================================================
// TESTS
// ============================================================================
