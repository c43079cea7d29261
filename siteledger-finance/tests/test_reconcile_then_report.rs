use chrono::NaiveDate;
use siteledger_core::{AssignmentStore, FinancialRecord, Project, ProjectCode, ProjectType};
use siteledger_finance::{
    ClearOutcome, ConfidenceTier, QuoteBasis, QuoteRequest, ReconcilePolicy, aggregate,
    aggregate_by_project, bulk_clear, estimate, projects_by_code, reconcile, reconcile_in_place,
    summarize,
};

fn code(s: &str) -> ProjectCode {
    ProjectCode::parse(s).unwrap()
}

fn projects() -> Vec<Project> {
    vec![
        Project::new("p-dock", code("2601007"))
            .with_type(ProjectType::InteriorDemolition)
            .with_square_footage(4000.0)
            .with_location("Chicago, IL"),
        Project::new("p-mall", code("2601012"))
            .with_type(ProjectType::RetailFitOut)
            .with_square_footage(2500.0),
    ]
}

fn invoices() -> Vec<FinancialRecord> {
    vec![
        FinancialRecord::invoice("inv-1", 12_000.0, 12_000.0)
            .with_memo("Progress billing 2601007 phase 1")
            .with_due_date("2026-02-10"),
        FinancialRecord::invoice("inv-2", 8_000.0, 0.0)
            .with_memo("2601007 deposit")
            .with_due_date("2026-01-15"),
        FinancialRecord::invoice("inv-3", 20_000.0, 5_000.0)
            .with_memo("Mall fit-out #2601012")
            .with_due_date("2026-02-24T09:00:00-06:00"),
        FinancialRecord::invoice("inv-4", 700.0, 700.0).with_memo("Ref 26010071"),
    ]
}

fn bills() -> Vec<FinancialRecord> {
    vec![
        FinancialRecord::bill("bill-1", 3_000.0, 0.0).with_memo("Dumpsters 2601007"),
        FinancialRecord::bill("bill-2", 1_250.0, 1_250.0).with_memo("Labor 2601007"),
        FinancialRecord::bill("bill-3", 9_999.0, 9_999.0).with_memo("2999999 unknown job"),
    ]
}

/// Memo codes drive assignment, and the resulting links drive project totals.
#[test]
fn test_reconcile_feeds_totals() {
    let projects = projects();
    let lookup = projects_by_code(&projects);
    let mut invoices = invoices();
    let mut bills = bills();

    let inv_changes = reconcile_in_place(&mut invoices, &lookup, ReconcilePolicy::default());
    let bill_changes = reconcile_in_place(&mut bills, &lookup, ReconcilePolicy::default());
    assert_eq!(inv_changes.len(), 3);
    assert_eq!(bill_changes.len(), 2);
    assert_eq!(invoices[3].project_id, None);

    let dock = aggregate("p-dock", &invoices, &bills);
    assert_eq!(dock.invoiced, 20_000.0);
    assert_eq!(dock.outstanding, 12_000.0);
    assert_eq!(dock.paid, 8_000.0);
    assert_eq!(dock.costs, 4_250.0);
    assert_eq!(dock.profit, 3_750.0);

    let all = aggregate_by_project(&projects, &invoices, &bills);
    assert_eq!(all.len(), 2);
    assert_eq!(all["p-mall"].paid, 15_000.0);

    // Nothing left to do on the second pass
    assert!(reconcile(&invoices, &lookup, ReconcilePolicy::default()).iter().all(|o| !o.changed));
    assert!(reconcile(&bills, &lookup, ReconcilePolicy::default()).iter().all(|o| !o.changed));
}

/// Aging over the open invoices of the snapshot.
#[test]
fn test_aging_over_open_invoices() {
    let as_of = NaiveDate::from_ymd_opt(2026, 2, 19).unwrap();
    let open: Vec<FinancialRecord> = invoices().into_iter().filter(|r| r.is_open()).collect();
    let bucket = summarize(&open, as_of);
    assert_eq!(bucket.outstanding, 17_700.0);
    assert_eq!(bucket.overdue, 12_000.0);
    assert_eq!(bucket.due_this_week, 5_000.0);
    assert!(bucket.overdue + bucket.due_this_week <= bucket.outstanding);
}

struct VecStore {
    invoices: Vec<FinancialRecord>,
    bills: Vec<FinancialRecord>,
}

impl AssignmentStore for VecStore {
    fn clear_invoice_assignments(&mut self, project_id: &str) -> anyhow::Result<usize> {
        let mut n = 0;
        for r in self.invoices.iter_mut().filter(|r| r.belongs_to(project_id)) {
            r.clear_assignment();
            n += 1;
        }
        Ok(n)
    }

    fn clear_bill_assignments(&mut self, _project_id: &str) -> anyhow::Result<usize> {
        anyhow::bail!("bills endpoint unavailable")
    }
}

/// Detaching keeps going after one side fails.
#[test]
fn test_detach_project_partial_failure() {
    let lookup = projects_by_code(&projects());
    let mut store = VecStore {
        invoices: invoices(),
        bills: bills(),
    };
    reconcile_in_place(&mut store.invoices, &lookup, ReconcilePolicy::default());
    reconcile_in_place(&mut store.bills, &lookup, ReconcilePolicy::default());

    let report = bulk_clear(&mut store, "p-dock");
    assert_eq!(report.invoices, ClearOutcome::Cleared { count: 2 });
    assert!(matches!(report.bills, ClearOutcome::Failed { .. }));
    assert!(store.invoices.iter().all(|r| !r.belongs_to("p-dock")));
    assert!(store.bills.iter().any(|r| r.belongs_to("p-dock")));
}

/// Quote from a small closed-project history, type inferred from the description.
#[test]
fn test_quote_from_history() {
    let history: Vec<Project> = [
        ("h1", "2501001", 3_800.0, 30_400.0),
        ("h2", "2501002", 4_200.0, 29_400.0),
        ("h3", "2501003", 10_000.0, 60_000.0),
    ]
    .into_iter()
    .map(|(id, c, area, revenue)| {
        Project::new(id, code(c))
            .with_type(ProjectType::InteriorDemolition)
            .with_square_footage(area)
            .closed(Some(revenue), Some(revenue * 0.7))
    })
    .collect();

    let req = QuoteRequest::new("Interior demo, gut two floors").with_square_footage(4000.0);
    let quote = estimate(&req, &history);

    assert_eq!(quote.project_type, ProjectType::InteriorDemolition);
    assert!(quote.type_inferred);
    assert_eq!(quote.basis, QuoteBasis::History);
    assert_eq!(quote.confidence, ConfidenceTier::Medium);
    assert_eq!(quote.comparables.len(), 3);
    assert_eq!(quote.comparables[2].project_id, "h3");
    assert!(quote.estimated_total > 0.0);

    let rate = quote.price_per_square_foot.unwrap();
    assert!(rate > 6.0 && rate < 8.0, "rate {rate}");
}
