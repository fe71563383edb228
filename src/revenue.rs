// 💰 Revenue Aggregator
// Totals, average invoice value and the month-bucketed revenue series.

use crate::error::{InsightError, InsightResult};
use crate::model::Invoice;
use crate::rank::LabeledValue;
use chrono::Datelike;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// YEAR-MONTH BUCKET KEY
// ============================================================================

/// Calendar month bucket, ordered chronologically
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        YearMonth { year, month }
    }

    pub fn of(date: &impl Datelike) -> Self {
        YearMonth {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRevenue {
    pub month: YearMonth,
    pub total: f64,
}

// ============================================================================
// REVENUE AGGREGATOR
// ============================================================================

pub struct RevenueAggregator<'a> {
    invoices: &'a [Invoice],
}

impl<'a> RevenueAggregator<'a> {
    pub fn new(invoices: &'a [Invoice]) -> Self {
        RevenueAggregator { invoices }
    }

    pub fn invoice_count(&self) -> usize {
        self.invoices.len()
    }

    /// Sum of all invoice totals; 0.0 when there are no invoices
    pub fn total_revenue(&self) -> f64 {
        self.invoices.iter().map(|inv| inv.total_amount).sum()
    }

    /// Mean invoice total
    ///
    /// Fails with `EmptyInput` rather than returning NaN for zero invoices.
    pub fn average_invoice_value(&self) -> InsightResult<f64> {
        if self.invoices.is_empty() {
            return Err(InsightError::EmptyInput {
                aggregate: "average invoice value",
            });
        }

        Ok(self.total_revenue() / self.invoices.len() as f64)
    }

    /// Revenue per calendar month, ascending; months without invoices are absent
    pub fn monthly_revenue_series(&self) -> Vec<MonthlyRevenue> {
        let mut buckets: BTreeMap<YearMonth, f64> = BTreeMap::new();

        for invoice in self.invoices {
            *buckets.entry(YearMonth::of(&invoice.date)).or_insert(0.0) += invoice.total_amount;
        }

        buckets
            .into_iter()
            .map(|(month, total)| MonthlyRevenue { month, total })
            .collect()
    }
}

/// Monthly series as chart points labelled `YYYY-MM`
pub fn monthly_series_points(series: &[MonthlyRevenue]) -> Vec<LabeledValue> {
    series
        .iter()
        .map(|m| LabeledValue::new(m.month.to_string(), m.total))
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn create_test_invoice(id: i64, customer_id: i64, date: &str, total: f64) -> Invoice {
        Invoice {
            id,
            customer_id,
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            total_amount: total,
        }
    }

    fn create_scenario_invoices() -> Vec<Invoice> {
        vec![
            create_test_invoice(1, 1, "2024-01-05", 10.0),
            create_test_invoice(2, 2, "2024-01-20", 5.0),
            create_test_invoice(3, 1, "2024-02-01", 3.0),
        ]
    }

    #[test]
    fn test_scenario_totals() {
        let invoices = create_scenario_invoices();
        let revenue = RevenueAggregator::new(&invoices);

        assert_eq!(revenue.invoice_count(), 3);
        assert_eq!(revenue.total_revenue(), 18.0);
        assert_eq!(revenue.average_invoice_value().unwrap(), 6.0);

        let series = revenue.monthly_revenue_series();
        let points = monthly_series_points(&series);
        assert_eq!(
            points,
            vec![
                LabeledValue::new("2024-01", 15.0),
                LabeledValue::new("2024-02", 3.0),
            ]
        );

        println!("✅ Revenue scenario: total {:.2}", revenue.total_revenue());
    }

    #[test]
    fn test_empty_invoices() {
        let invoices: Vec<Invoice> = Vec::new();
        let revenue = RevenueAggregator::new(&invoices);

        assert_eq!(revenue.total_revenue(), 0.0);
        assert!(revenue.monthly_revenue_series().is_empty());
        assert!(matches!(
            revenue.average_invoice_value(),
            Err(InsightError::EmptyInput { .. })
        ));
    }

    #[test]
    fn test_single_invoice_average() {
        let invoices = vec![create_test_invoice(1, 1, "2021-06-30", 42.0)];
        let revenue = RevenueAggregator::new(&invoices);

        assert_eq!(revenue.average_invoice_value().unwrap(), 42.0);
    }

    #[test]
    fn test_total_is_order_independent() {
        let mut invoices = vec![
            create_test_invoice(1, 1, "2023-03-01", 1.98),
            create_test_invoice(2, 2, "2023-03-02", 3.96),
            create_test_invoice(3, 3, "2023-04-01", 5.94),
            create_test_invoice(4, 4, "2023-05-01", 8.91),
        ];
        let forward = RevenueAggregator::new(&invoices).total_revenue();
        invoices.reverse();
        let backward = RevenueAggregator::new(&invoices).total_revenue();

        assert!((forward - backward).abs() < 1e-9);
        assert!((forward - 20.79).abs() < 1e-9);
    }

    #[test]
    fn test_monthly_series_sorted_sparse_and_complete() {
        // Input deliberately out of chronological order, with a gap in March
        let invoices = vec![
            create_test_invoice(1, 1, "2010-04-11", 2.0),
            create_test_invoice(2, 1, "2009-12-31", 1.0),
            create_test_invoice(3, 2, "2010-02-01", 4.0),
            create_test_invoice(4, 3, "2010-04-01", 8.0),
            create_test_invoice(5, 3, "2010-02-28", 16.0),
        ];
        let revenue = RevenueAggregator::new(&invoices);
        let series = revenue.monthly_revenue_series();

        let months: Vec<String> = series.iter().map(|m| m.month.to_string()).collect();
        assert_eq!(months, vec!["2009-12", "2010-02", "2010-04"]);

        assert!(series.windows(2).all(|w| w[0].month < w[1].month));
        assert_eq!(series[1].total, 20.0);
        assert_eq!(series[2].total, 10.0);

        let bucket_total: f64 = series.iter().map(|m| m.total).sum();
        assert!((bucket_total - revenue.total_revenue()).abs() < 1e-9);
    }

    #[test]
    fn test_year_month_display_and_json() {
        let ym = YearMonth::new(987, 3);
        assert_eq!(ym.to_string(), "0987-03");

        let json = serde_json::to_string(&MonthlyRevenue {
            month: YearMonth::new(2013, 11),
            total: 49.62,
        })
        .unwrap();
        assert_eq!(json, r#"{"month":"2013-11","total":49.62}"#);
    }
}
