//! Per-project revenue, cost and profit figures.
//!
//! These are the only place profit is computed; presentation renders
//! [`ProjectTotals`] as-is.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use siteledger_core::{FinancialRecord, Project};
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectTotals {
    pub invoiced: f64,
    /// `invoiced - outstanding`
    pub paid: f64,
    pub outstanding: f64,
    pub costs: f64,
    /// `paid - costs`
    pub profit: f64,
    pub invoice_count: usize,
    pub bill_count: usize,
}

impl ProjectTotals {
    /// Profit as a share of cash collected.
    pub fn margin(&self) -> Option<f64> {
        (self.paid > 0.0).then(|| self.profit / self.paid)
    }
}

/// Fold one project's invoices and bills into totals.
///
/// Records linked to other projects are ignored; malformed rows are skipped.
pub fn aggregate(
    project_id: &str,
    invoices: &[FinancialRecord],
    bills: &[FinancialRecord],
) -> ProjectTotals {
    let mut invoiced = 0.0;
    let mut outstanding = 0.0;
    let mut invoice_count = 0;
    for inv in invoices.iter().filter(|r| r.belongs_to(project_id)) {
        if !inv.is_well_formed() {
            debug!(record = %inv.id, "skipping malformed invoice");
            continue;
        }
        invoiced += inv.amount;
        outstanding += inv.balance;
        invoice_count += 1;
    }

    let mut costs = 0.0;
    let mut bill_count = 0;
    for bill in bills.iter().filter(|r| r.belongs_to(project_id)) {
        if !bill.is_well_formed() {
            debug!(record = %bill.id, "skipping malformed bill");
            continue;
        }
        costs += bill.amount;
        bill_count += 1;
    }

    let paid = invoiced - outstanding;
    ProjectTotals {
        invoiced,
        paid,
        outstanding,
        costs,
        profit: paid - costs,
        invoice_count,
        bill_count,
    }
}

/// Totals for every project, keyed by project id.
pub fn aggregate_by_project(
    projects: &[Project],
    invoices: &[FinancialRecord],
    bills: &[FinancialRecord],
) -> BTreeMap<String, ProjectTotals> {
    projects
        .iter()
        .map(|p| (p.id.clone(), aggregate(&p.id, invoices, bills)))
        .collect()
}
