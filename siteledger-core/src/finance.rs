//! Financial record types (invoices and bills) pulled from the accounting system

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;
use crate::time::parse_calendar_date;

/// Which side of the ledger a record sits on
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// Receivable: money the client owes us
    Invoice,
    /// Payable: money we owe a vendor
    Bill,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Invoice => f.write_str("invoice"),
            RecordKind::Bill => f.write_str("bill"),
        }
    }
}

impl FromStr for RecordKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "invoice" | "invoices" => Ok(RecordKind::Invoice),
            "bill" | "bills" => Ok(RecordKind::Bill),
            _ => Err(ParseError::UnknownRecordKind(s.to_string())),
        }
    }
}

/// How sure we are about an invoice's current project link.
/// Only one level exists today; absence means "no claim".
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MatchConfidence {
    High,
}

/// Which path produced the current `project_id`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentSource {
    Manual,
    Automatic,
}

/// An invoice or bill as delivered by the accounting system
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FinancialRecord {
    /// Unique identifier in the accounting system
    pub id: String,
    pub kind: RecordKind,
    /// Human document number (INV-1042, BILL-77, ...)
    #[serde(default)]
    pub number: Option<String>,
    /// Original amount, non-negative
    pub amount: f64,
    /// Remaining unpaid, `0 <= balance <= amount`
    pub balance: f64,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    /// Raw due date text, interpreted lazily by [`FinancialRecord::due_on`]
    #[serde(default)]
    pub due_date: Option<String>,
    /// Invoices only; always `None` on bills
    #[serde(default)]
    pub match_confidence: Option<MatchConfidence>,
    #[serde(default)]
    pub assigned_by: Option<AssignmentSource>,
}

impl FinancialRecord {
    pub fn new(id: impl Into<String>, kind: RecordKind, amount: f64, balance: f64) -> Self {
        Self {
            id: id.into(),
            kind,
            number: None,
            amount,
            balance,
            memo: None,
            project_id: None,
            due_date: None,
            match_confidence: None,
            assigned_by: None,
        }
    }

    pub fn invoice(id: impl Into<String>, amount: f64, balance: f64) -> Self {
        Self::new(id, RecordKind::Invoice, amount, balance)
    }

    pub fn bill(id: impl Into<String>, amount: f64, balance: f64) -> Self {
        Self::new(id, RecordKind::Bill, amount, balance)
    }

    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }

    pub fn with_due_date(mut self, due: impl Into<String>) -> Self {
        self.due_date = Some(due.into());
        self
    }

    /// Link to a project the way a user does from the dashboard.
    pub fn assigned_manually(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self.assigned_by = Some(AssignmentSource::Manual);
        if self.kind == RecordKind::Invoice {
            self.match_confidence = Some(MatchConfidence::High);
        }
        self
    }

    pub fn is_invoice(&self) -> bool {
        self.kind == RecordKind::Invoice
    }

    pub fn belongs_to(&self, project_id: &str) -> bool {
        self.project_id.as_deref() == Some(project_id)
    }

    /// Amounts are finite, non-negative, and the balance fits inside the amount.
    pub fn is_well_formed(&self) -> bool {
        self.amount.is_finite()
            && self.balance.is_finite()
            && self.amount >= 0.0
            && self.balance >= 0.0
            && self.balance <= self.amount
    }

    /// Still has money outstanding
    pub fn is_open(&self) -> bool {
        self.balance > 0.0
    }

    /// Calendar due date with any time-of-day stripped.
    ///
    /// `Ok(None)` when no due date was supplied, `Err` when one was supplied
    /// but cannot be interpreted.
    pub fn due_on(&self) -> Result<Option<NaiveDate>, ParseError> {
        match self.due_date.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => parse_calendar_date(raw).map(Some),
        }
    }

    /// Drop any project link along with its provenance.
    pub fn clear_assignment(&mut self) {
        self.project_id = None;
        self.match_confidence = None;
        self.assigned_by = None;
    }
}
