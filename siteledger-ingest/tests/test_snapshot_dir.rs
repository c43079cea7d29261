use siteledger_core::{
    AssignmentSource, AssignmentStore, FinancialRecord, Project, ProjectCode, RecordKind,
};
use siteledger_ingest::{Snapshot, parse_ledger_csv};
use std::fs;
use tempfile::tempdir;

fn sample() -> Snapshot {
    let mut inv = FinancialRecord::invoice("inv-1", 1000.0, 400.0).with_memo("2601007");
    inv.project_id = Some("p1".into());
    let mut bill = FinancialRecord::bill("bill-1", 300.0, 0.0).with_memo("2601007");
    bill.project_id = Some("p1".into());

    Snapshot {
        projects: vec![Project::new("p1", ProjectCode::parse("2601007").unwrap())],
        invoices: vec![inv, FinancialRecord::invoice("inv-2", 50.0, 50.0)],
        bills: vec![bill],
    }
}

#[test]
fn test_save_then_load_roundtrip() {
    let dir = tempdir().unwrap();
    let snap = sample();
    snap.save(dir.path()).unwrap();

    let loaded = Snapshot::load(dir.path()).unwrap();
    assert_eq!(loaded, snap);
}

#[test]
fn test_missing_files_load_empty() {
    let dir = tempdir().unwrap();
    let loaded = Snapshot::load(dir.path()).unwrap();
    assert!(loaded.projects.is_empty());
    assert!(loaded.invoices.is_empty());
    assert!(loaded.bills.is_empty());
}

#[test]
fn test_missing_dir_is_an_error() {
    let dir = tempdir().unwrap();
    assert!(Snapshot::load(&dir.path().join("missing")).is_err());
}

#[test]
fn test_bill_in_invoice_file_is_rejected() {
    let dir = tempdir().unwrap();
    let stray = vec![FinancialRecord::bill("b1", 1.0, 1.0)];
    fs::write(
        dir.path().join("invoices.json"),
        serde_json::to_string(&stray).unwrap(),
    )
    .unwrap();
    let err = Snapshot::load(dir.path()).unwrap_err();
    assert!(format!("{err:#}").contains("b1"));
}

#[test]
fn test_snapshot_store_clears_only_target_project() {
    let mut snap = sample();
    snap.invoices[1].project_id = Some("p2".into());

    assert_eq!(snap.clear_invoice_assignments("p1").unwrap(), 1);
    assert_eq!(snap.clear_bill_assignments("p1").unwrap(), 1);
    assert_eq!(snap.invoices[0].project_id, None);
    assert_eq!(snap.invoices[1].project_id.as_deref(), Some("p2"));
}

#[test]
fn test_import_csv_then_upsert() {
    let dir = tempdir().unwrap();
    let csv_path = dir.path().join("bills.csv");
    fs::write(
        &csv_path,
        "Id,Amount,Balance,Due Date,Memo\nbill-1,350,350,2026-03-01,Haul-off 2601007\nbill-9,20,20,,\n",
    )
    .unwrap();

    let parsed = parse_ledger_csv(&csv_path, RecordKind::Bill).unwrap();
    let mut snap = sample();
    let inserted = snap.upsert_records(parsed);

    assert_eq!(inserted, 1);
    assert_eq!(snap.bills.len(), 2);
    assert_eq!(snap.bills[0].amount, 350.0);
    // export has no project column; the existing link survives
    assert_eq!(snap.bills[0].project_id.as_deref(), Some("p1"));
    assert_eq!(snap.bills[1].project_id, None);
}

#[test]
fn test_reimport_keeps_manual_link() {
    let dir = tempdir().unwrap();
    let csv_path = dir.path().join("bills.csv");
    fs::write(&csv_path, "Id,Amount,Balance\nb1,100,50\n").unwrap();

    let mut snap = Snapshot {
        bills: vec![FinancialRecord::bill("b1", 100.0, 100.0).assigned_manually("p1")],
        ..Snapshot::default()
    };
    snap.upsert_records(parse_ledger_csv(&csv_path, RecordKind::Bill).unwrap());

    let b1 = &snap.bills[0];
    assert_eq!(b1.balance, 50.0);
    assert_eq!(b1.project_id.as_deref(), Some("p1"));
    assert_eq!(b1.assigned_by, Some(AssignmentSource::Manual));
}

#[test]
fn test_reimport_with_project_column_takes_new_link() {
    let mut snap = Snapshot {
        invoices: vec![FinancialRecord::invoice("i1", 10.0, 10.0).assigned_manually("p1")],
        ..Snapshot::default()
    };
    let mut incoming = FinancialRecord::invoice("i1", 10.0, 0.0);
    incoming.project_id = Some("p2".into());
    snap.upsert_records(vec![incoming]);

    assert_eq!(snap.invoices[0].project_id.as_deref(), Some("p2"));
    assert_eq!(snap.invoices[0].assigned_by, None);
}
