//! Accounting-system CSV exports of invoices or bills.
//!
//! Columns are located by header name (case-insensitive), so exports with
//! extra or reordered columns still parse:
//!   Id, Number, Amount, Balance, Due Date, Memo, Project Id
//! `Id` and `Amount` are required; the rest are optional. Rows whose money
//! columns cannot be read are skipped.

use anyhow::{Context, Result, bail};
use siteledger_core::{FinancialRecord, RecordKind};
use std::io::Read;
use std::path::Path;
use tracing::warn;

struct Columns {
    id: usize,
    number: Option<usize>,
    amount: usize,
    balance: Option<usize>,
    due_date: Option<usize>,
    memo: Option<usize>,
    project_id: Option<usize>,
}

impl Columns {
    fn locate(headers: &csv::StringRecord) -> Result<Self> {
        let find = |names: &[&str]| {
            headers.iter().position(|h| {
                let h = h.trim().to_lowercase();
                names.iter().any(|n| h == *n)
            })
        };

        let Some(id) = find(&["id", "txn id", "record id"]) else {
            bail!("missing Id column");
        };
        let Some(amount) = find(&["amount", "total", "total amount"]) else {
            bail!("missing Amount column");
        };

        Ok(Self {
            id,
            number: find(&["number", "doc number", "invoice number", "bill number", "no."]),
            amount,
            balance: find(&["balance", "open balance", "amount due"]),
            due_date: find(&["due date", "due", "due_date"]),
            memo: find(&["memo", "description", "private note"]),
            project_id: find(&["project id", "project_id", "project"]),
        })
    }
}

/// "$1,250.00" → 1250.0
fn parse_money(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' '))
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}

fn optional_text(record: &csv::StringRecord, idx: Option<usize>) -> Option<String> {
    idx.and_then(|i| record.get(i))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Parse CSV text from any reader.
pub fn parse_ledger_csv_reader<R: Read>(reader: R, kind: RecordKind) -> Result<Vec<FinancialRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers().context("reading CSV header")?.clone();
    let cols = Columns::locate(&headers)?;

    let mut out = Vec::new();
    for (line, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("reading CSV row {}", line + 2))?;

        let id = record.get(cols.id).unwrap_or("").trim();
        if id.is_empty() {
            continue;
        }

        let Some(amount) = record.get(cols.amount).and_then(parse_money) else {
            warn!(id, row = line + 2, "skipping row with unreadable amount");
            continue;
        };
        // A missing balance column means the export only lists what is owed in full.
        let balance = match cols.balance.and_then(|i| record.get(i)) {
            Some(raw) => match parse_money(raw) {
                Some(b) => b,
                None => {
                    warn!(id, row = line + 2, "skipping row with unreadable balance");
                    continue;
                }
            },
            None => amount,
        };

        let mut rec = FinancialRecord::new(id, kind, amount, balance);
        rec.number = optional_text(&record, cols.number);
        rec.due_date = optional_text(&record, cols.due_date);
        rec.memo = optional_text(&record, cols.memo);
        rec.project_id = optional_text(&record, cols.project_id);
        out.push(rec);
    }

    Ok(out)
}

/// Parse a CSV export file of invoices or bills.
pub fn parse_ledger_csv(path: impl AsRef<Path>, kind: RecordKind) -> Result<Vec<FinancialRecord>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
    parse_ledger_csv_reader(file, kind).with_context(|| format!("parsing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_invoice_export() {
        let text = "\
Id,Number,Due Date,Amount,Open Balance,Memo
101,INV-1042,2026-03-01,\"$12,000.00\",\"4,000.00\",Demo 2601007 phase 2
102,INV-1043,,500,0,
";
        let recs = parse_ledger_csv_reader(text.as_bytes(), RecordKind::Invoice).unwrap();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].id, "101");
        assert_eq!(recs[0].number.as_deref(), Some("INV-1042"));
        assert_eq!(recs[0].amount, 12_000.0);
        assert_eq!(recs[0].balance, 4_000.0);
        assert_eq!(recs[0].memo.as_deref(), Some("Demo 2601007 phase 2"));
        assert_eq!(recs[1].due_date, None);
        assert_eq!(recs[1].memo, None);
        assert!(recs.iter().all(|r| r.is_invoice()));
    }

    #[test]
    fn test_missing_balance_column_defaults_to_amount() {
        let text = "id,total,memo\nb1,75.50,Fuel 2500001\n";
        let recs = parse_ledger_csv_reader(text.as_bytes(), RecordKind::Bill).unwrap();
        assert_eq!(recs[0].balance, 75.5);
        assert_eq!(recs[0].kind, RecordKind::Bill);
    }

    #[test]
    fn test_bad_rows_are_skipped() {
        let text = "Id,Amount,Balance\nok,10,5\nbad,ten,5\n,10,10\nbal,10,lots\n";
        let recs = parse_ledger_csv_reader(text.as_bytes(), RecordKind::Bill).unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].id, "ok");
    }

    #[test]
    fn test_missing_required_column() {
        let text = "Number,Memo\nINV-1,x\n";
        assert!(parse_ledger_csv_reader(text.as_bytes(), RecordKind::Invoice).is_err());
    }

    #[test]
    fn test_parse_money() {
        assert_eq!(parse_money("$1,250.00"), Some(1250.0));
        assert_eq!(parse_money("  "), None);
        assert_eq!(parse_money("abc"), None);
    }
}
