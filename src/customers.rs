// 👥 Customer Aggregator
// Revenue per customer and per billing country. Invoices are left-joined to
// customers, so revenue from an unknown customer id is still counted.

use crate::join::left_join;
use crate::model::{Customer, Invoice};
use crate::rank::{GroupTotals, RankedBucket, UNKNOWN_LABEL};

pub const DEFAULT_TOP_CUSTOMERS: usize = 10;
pub const DEFAULT_TOP_COUNTRIES: usize = 3;

/// Revenue bucket keyed by customer id
pub type CustomerRevenue = RankedBucket<i64, f64>;

/// Revenue bucket keyed by country name (or the unknown label)
pub type CountryRevenue = RankedBucket<String, f64>;

pub struct CustomerAggregator<'a> {
    invoices: &'a [Invoice],
    customers: &'a [Customer],
}

impl<'a> CustomerAggregator<'a> {
    pub fn new(invoices: &'a [Invoice], customers: &'a [Customer]) -> Self {
        CustomerAggregator {
            invoices,
            customers,
        }
    }

    /// Top `n` customers by summed invoice total
    ///
    /// Invoices whose customer id matches no customer row keep their own
    /// bucket, labelled `Unknown customer #<id>`.
    pub fn top_customers_by_revenue(&self, n: usize) -> Vec<CustomerRevenue> {
        let mut totals = GroupTotals::new();

        for row in left_join(
            self.invoices,
            self.customers,
            |inv| Some(inv.customer_id),
            |c| c.id,
        ) {
            let customer_id = row.left.customer_id;
            totals.add(customer_id, row.left.total_amount, || {
                row.right.label_or(
                    &format!("{} customer #{}", UNKNOWN_LABEL, customer_id),
                    Customer::display_name,
                )
            });
        }

        totals.top(n)
    }

    /// Top `n` billing countries by summed invoice total
    ///
    /// A missing country, or an invoice whose customer is unknown, lands in
    /// the `Unknown` bucket.
    pub fn top_countries_by_revenue(&self, n: usize) -> Vec<CountryRevenue> {
        let mut totals = GroupTotals::new();

        for row in left_join(
            self.invoices,
            self.customers,
            |inv| Some(inv.customer_id),
            |c| c.id,
        ) {
            let country = row
                .right
                .matched()
                .and_then(Customer::country)
                .unwrap_or(UNKNOWN_LABEL)
                .to_string();
            let label = country.clone();
            totals.add(country, row.left.total_amount, move || label);
        }

        totals.top(n)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rank::bucket_sum;
    use crate::revenue::RevenueAggregator;
    use chrono::NaiveDate;

    fn create_test_invoice(id: i64, customer_id: i64, date: &str, total: f64) -> Invoice {
        Invoice {
            id,
            customer_id,
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            total_amount: total,
        }
    }

    fn create_test_customer(id: i64, first: &str, last: &str, country: Option<&str>) -> Customer {
        Customer {
            id,
            first_name: first.to_string(),
            last_name: last.to_string(),
            billing_country: country.map(str::to_string),
            support_rep_id: Some(3),
        }
    }

    fn create_test_customers() -> Vec<Customer> {
        vec![
            create_test_customer(1, "Helena", "Holý", Some("Czech Republic")),
            create_test_customer(2, "Richard", "Cunningham", Some("USA")),
            create_test_customer(3, "Luis", "Rojas", Some("Chile")),
            create_test_customer(4, "Ladislav", "Kovács", None),
            create_test_customer(5, "Hugh", "O'Reilly", Some("USA")),
        ]
    }

    fn create_test_invoices() -> Vec<Invoice> {
        vec![
            create_test_invoice(1, 1, "2024-01-05", 10.0),
            create_test_invoice(2, 2, "2024-01-20", 5.0),
            create_test_invoice(3, 1, "2024-02-01", 3.0),
            create_test_invoice(4, 3, "2024-02-11", 7.0),
            create_test_invoice(5, 4, "2024-03-02", 2.5),
            create_test_invoice(6, 5, "2024-03-09", 4.0),
            create_test_invoice(7, 42, "2024-03-15", 1.5),
        ]
    }

    #[test]
    fn test_scenario_top_customers() {
        let invoices = vec![
            create_test_invoice(1, 1, "2024-01-05", 10.0),
            create_test_invoice(2, 2, "2024-01-20", 5.0),
            create_test_invoice(3, 1, "2024-02-01", 3.0),
        ];
        let customers = vec![
            create_test_customer(1, "Ada", "A", Some("UK")),
            create_test_customer(2, "Bob", "B", Some("USA")),
        ];

        let top = CustomerAggregator::new(&invoices, &customers)
            .top_customers_by_revenue(DEFAULT_TOP_CUSTOMERS);

        let pairs: Vec<(i64, f64)> = top.iter().map(|b| (b.key, b.total)).collect();
        assert_eq!(pairs, vec![(1, 13.0), (2, 5.0)]);
        assert_eq!(top[0].label, "Ada A");
    }

    #[test]
    fn test_unknown_customer_is_kept() {
        let invoices = create_test_invoices();
        let customers = create_test_customers();
        let top = CustomerAggregator::new(&invoices, &customers).top_customers_by_revenue(usize::MAX);

        let unknown = top.iter().find(|b| b.key == 42).unwrap();
        assert_eq!(unknown.label, "Unknown customer #42");
        assert_eq!(unknown.total, 1.5);

        let total = RevenueAggregator::new(&invoices).total_revenue();
        assert!((bucket_sum(&top) - total).abs() < 1e-9);
    }

    #[test]
    fn test_top_customers_ordering_and_limits() {
        let invoices = create_test_invoices();
        let customers = create_test_customers();
        let agg = CustomerAggregator::new(&invoices, &customers);

        let all = agg.top_customers_by_revenue(usize::MAX);
        assert_eq!(all.len(), 6);
        assert!(all.windows(2).all(|w| w[0].total >= w[1].total));

        let top2 = agg.top_customers_by_revenue(2);
        assert_eq!(top2.len(), 2);
        assert_eq!(top2[0].key, 1);
        assert_eq!(top2[1].key, 3);
    }

    #[test]
    fn test_top_countries() {
        let invoices = create_test_invoices();
        let customers = create_test_customers();
        let agg = CustomerAggregator::new(&invoices, &customers);

        let top = agg.top_countries_by_revenue(DEFAULT_TOP_COUNTRIES);
        let pairs: Vec<(&str, f64)> = top.iter().map(|b| (b.label.as_str(), b.total)).collect();
        assert_eq!(
            pairs,
            vec![("Czech Republic", 13.0), ("USA", 9.0), ("Chile", 7.0)]
        );

        // Missing country and unknown customer share the Unknown bucket
        let all = agg.top_countries_by_revenue(usize::MAX);
        assert_eq!(all.len(), 4);
        let unknown = all.iter().find(|b| b.key == UNKNOWN_LABEL).unwrap();
        assert_eq!(unknown.total, 4.0);
        assert!(all.windows(2).all(|w| w[0].total >= w[1].total));

        let total = RevenueAggregator::new(&invoices).total_revenue();
        assert!((bucket_sum(&all) - total).abs() < 1e-9);
    }

    #[test]
    fn test_no_invoices_no_buckets() {
        let customers = create_test_customers();
        let agg = CustomerAggregator::new(&[], &customers);

        assert!(agg.top_customers_by_revenue(10).is_empty());
        assert!(agg.top_countries_by_revenue(3).is_empty());
    }
}
