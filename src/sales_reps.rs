// 🧑‍💼 Sales Rep Aggregator
// Revenue per support representative: invoice → customer → employee.

use crate::join::{left_join, KeyIndex};
use crate::model::{Customer, Employee, Invoice};
use crate::rank::{GroupTotals, RankedBucket, UNASSIGNED_LABEL};

/// Revenue bucket keyed by employee id; `None` is the unassigned bucket
pub type RepRevenue = RankedBucket<Option<i64>, f64>;

pub struct SalesRepAggregator<'a> {
    invoices: &'a [Invoice],
    customers: &'a [Customer],
    employees: &'a [Employee],
}

impl<'a> SalesRepAggregator<'a> {
    pub fn new(invoices: &'a [Invoice], customers: &'a [Customer], employees: &'a [Employee]) -> Self {
        SalesRepAggregator {
            invoices,
            customers,
            employees,
        }
    }

    /// All representatives ranked by revenue
    ///
    /// Invoices with no customer, no rep, or a rep id that matches no
    /// employee are summed under `Unassigned`, so the buckets always add up
    /// to total revenue.
    pub fn revenue_by_employee(&self) -> Vec<RepRevenue> {
        let employees = KeyIndex::build(self.employees, |e| e.id);
        let mut totals = GroupTotals::new();

        for row in left_join(
            self.invoices,
            self.customers,
            |inv| Some(inv.customer_id),
            |c| c.id,
        ) {
            let rep = row.right.and_then(|c| employees.resolve(c.support_rep_id));
            let key = rep.matched().map(|e| e.id);
            totals.add(key, row.left.total_amount, || {
                rep.label_or(UNASSIGNED_LABEL, Employee::display_name)
            });
        }

        totals.into_ranked()
    }
}

// ============================================================================
// TESTS
// ============================================================================
