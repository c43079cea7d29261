//! Aging summary over open invoices or bills.
//!
//! All comparisons use calendar days with time-of-day stripped. A record
//! always counts toward `outstanding` and toward at most one of `overdue` /
//! `due_this_week`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use siteledger_core::{FinancialRecord, days_between};
use tracing::debug;

pub const DEFAULT_DUE_SOON_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AgingBucket {
    pub outstanding: f64,
    pub overdue: f64,
    pub due_this_week: f64,
    pub record_count: usize,
    pub overdue_count: usize,
    pub due_this_week_count: usize,
}

/// Where a single due date falls relative to `as_of`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum DueStatus {
    Overdue { days: i64 },
    DueSoon { days: i64 },
    Current,
}

/// Classify a due date. `window_days` is inclusive: with 7, a date exactly
/// one week out is still "due soon".
pub fn due_status(due: NaiveDate, as_of: NaiveDate, window_days: i64) -> DueStatus {
    let days_overdue = days_between(due, as_of);
    if days_overdue > 0 {
        return DueStatus::Overdue { days: days_overdue };
    }
    let days_until_due = -days_overdue;
    if days_until_due <= window_days {
        DueStatus::DueSoon {
            days: days_until_due,
        }
    } else {
        DueStatus::Current
    }
}

/// Summarize open records with the default one-week window.
pub fn summarize(records: &[FinancialRecord], as_of: NaiveDate) -> AgingBucket {
    summarize_with_window(records, as_of, DEFAULT_DUE_SOON_DAYS)
}

pub fn summarize_with_window(
    records: &[FinancialRecord],
    as_of: NaiveDate,
    window_days: i64,
) -> AgingBucket {
    let mut bucket = AgingBucket::default();

    for record in records {
        if !record.balance.is_finite() || record.balance < 0.0 {
            debug!(record = %record.id, "skipping record with malformed balance");
            continue;
        }
        let due = match record.due_on() {
            Ok(due) => due,
            Err(e) => {
                debug!(record = %record.id, error = %e, "skipping record with unreadable due date");
                continue;
            }
        };

        bucket.outstanding += record.balance;
        bucket.record_count += 1;

        match due.map(|d| due_status(d, as_of, window_days)) {
            Some(DueStatus::Overdue { .. }) => {
                bucket.overdue += record.balance;
                bucket.overdue_count += 1;
            }
            Some(DueStatus::DueSoon { .. }) => {
                bucket.due_this_week += record.balance;
                bucket.due_this_week_count += 1;
            }
            Some(DueStatus::Current) | None => {}
        }
    }

    bucket
}
