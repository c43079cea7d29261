//! Plain-text and JSON rendering of engine results.

use anyhow::Result;
use serde::Serialize;
use siteledger_finance::{
    AgingBucket, BulkClearReport, ClearOutcome, ProjectTotals, QuoteResponse, ReconcileOutcome,
};
use std::collections::BTreeMap;

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn money(v: f64) -> String {
    format!("${:.2}", v)
}

pub fn print_reconcile(outcomes: &[ReconcileOutcome]) {
    let changed: Vec<_> = outcomes.iter().filter(|o| o.changed).collect();
    println!(
        "Reconciled {} records: {} changed, {} unchanged",
        outcomes.len(),
        changed.len(),
        outcomes.len() - changed.len()
    );
    for o in changed {
        match &o.new_project_id {
            Some(p) => println!("  [{}] {} -> {}", o.kind, o.record_id, p),
            None => println!("  [{}] {} -> (unassigned)", o.kind, o.record_id),
        }
    }
}

pub fn print_totals(totals: &BTreeMap<String, ProjectTotals>) {
    println!(
        "{:<16} {:>14} {:>14} {:>14} {:>14} {:>14}",
        "project", "invoiced", "paid", "outstanding", "costs", "profit"
    );
    for (id, t) in totals {
        println!(
            "{:<16} {:>14} {:>14} {:>14} {:>14} {:>14}",
            id,
            money(t.invoiced),
            money(t.paid),
            money(t.outstanding),
            money(t.costs),
            money(t.profit)
        );
    }
}

pub fn print_aging(label: &str, bucket: &AgingBucket) {
    println!("{label}");
    println!(
        "  outstanding    {:>14}  ({} records)",
        money(bucket.outstanding),
        bucket.record_count
    );
    println!(
        "  overdue        {:>14}  ({})",
        money(bucket.overdue),
        bucket.overdue_count
    );
    println!(
        "  due this week  {:>14}  ({})",
        money(bucket.due_this_week),
        bucket.due_this_week_count
    );
}

pub fn print_quote(q: &QuoteResponse) {
    let inferred = if q.type_inferred { " (inferred)" } else { "" };
    println!("Type:        {}{}", q.project_type, inferred);
    println!("Estimate:    {}", money(q.estimated_total));
    if let Some(rate) = q.price_per_square_foot {
        println!("Per sq ft:   {}", money(rate));
    }
    println!("Confidence:  {:?}", q.confidence);
    println!("Basis:       {:?}", q.basis);
    if !q.comparables.is_empty() {
        println!("Comparables:");
        for c in &q.comparables {
            println!("  {:<16} weight={:.3}", c.project_id, c.weight);
        }
    }
}

fn clear_line(label: &str, outcome: &ClearOutcome) -> String {
    match outcome {
        ClearOutcome::Cleared { count } => format!("{label}: cleared {count}"),
        ClearOutcome::Failed { reason } => format!("{label}: FAILED ({reason})"),
    }
}

pub fn print_bulk_clear(report: &BulkClearReport) {
    println!("Detached project {}", report.project_id);
    println!("  {}", clear_line("invoices", &report.invoices));
    println!("  {}", clear_line("bills", &report.bills));
}
