//! Reconciliation: derive each record's project link from the code in its memo.
//!
//! The pass is split in two so it can be tested without a store:
//! [`reconcile`] computes outcomes from a snapshot, and callers write back
//! only the outcomes that changed. Running it twice yields no changes the
//! second time.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use siteledger_core::{
    AssignmentSource, AssignmentStore, FinancialRecord, MatchConfidence, Project, ProjectCode,
    RecordKind, extract_project_code,
};
use tracing::{debug, warn};

/// Knobs for the automatic pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcilePolicy {
    /// Leave records a user linked by hand alone, even if the memo disagrees.
    #[serde(default)]
    pub preserve_manual: bool,
}

/// Result of comparing a record's current link with the derived candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum AssignmentChange {
    Unchanged,
    Assigned { project_id: String },
    Cleared,
}

impl AssignmentChange {
    pub fn is_change(&self) -> bool {
        !matches!(self, AssignmentChange::Unchanged)
    }
}

/// Diff step: only a differing candidate produces a change.
pub fn diff_assignment(current: Option<&str>, candidate: Option<&str>) -> AssignmentChange {
    match (current, candidate) {
        (a, b) if a == b => AssignmentChange::Unchanged,
        (_, Some(id)) => AssignmentChange::Assigned {
            project_id: id.to_string(),
        },
        (Some(_), None) => AssignmentChange::Cleared,
        (None, None) => AssignmentChange::Unchanged,
    }
}

/// Per-record reconciliation result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileOutcome {
    pub record_id: String,
    pub kind: RecordKind,
    pub new_project_id: Option<String>,
    pub changed: bool,
    pub change: AssignmentChange,
}

impl ReconcileOutcome {
    /// Write the outcome onto an in-memory record. No-op when unchanged.
    pub fn apply(&self, record: &mut FinancialRecord) {
        match &self.change {
            AssignmentChange::Unchanged => {}
            AssignmentChange::Assigned { project_id } => {
                record.project_id = Some(project_id.clone());
                record.assigned_by = Some(AssignmentSource::Automatic);
                record.match_confidence = match record.kind {
                    RecordKind::Invoice => Some(MatchConfidence::High),
                    RecordKind::Bill => None,
                };
            }
            AssignmentChange::Cleared => record.clear_assignment(),
        }
    }
}

/// Build the code → project id lookup. The first project wins on duplicate codes.
pub fn projects_by_code(projects: &[Project]) -> HashMap<ProjectCode, String> {
    let mut map: HashMap<ProjectCode, String> = HashMap::with_capacity(projects.len());
    for p in projects {
        if let Some(existing) = map.get(&p.code) {
            warn!(
                code = %p.code,
                kept = %existing,
                ignored = %p.id,
                "duplicate project code"
            );
            continue;
        }
        map.insert(p.code.clone(), p.id.clone());
    }
    map
}

/// Candidate project for one record: the memo's code, if the code is known.
pub fn candidate_for(
    record: &FinancialRecord,
    projects_by_code: &HashMap<ProjectCode, String>,
) -> Option<String> {
    let code = record.memo.as_deref().and_then(extract_project_code)?;
    let found = projects_by_code.get(&code).cloned();
    if found.is_none() {
        debug!(record = %record.id, code = %code, "memo code has no matching project");
    }
    found
}

/// Compute outcomes for every record, in input order.
pub fn reconcile(
    records: &[FinancialRecord],
    projects_by_code: &HashMap<ProjectCode, String>,
    policy: ReconcilePolicy,
) -> Vec<ReconcileOutcome> {
    records
        .iter()
        .map(|record| {
            let manual_hold = policy.preserve_manual
                && record.project_id.is_some()
                && record.assigned_by == Some(AssignmentSource::Manual);

            let change = if manual_hold {
                AssignmentChange::Unchanged
            } else {
                let candidate = candidate_for(record, projects_by_code);
                diff_assignment(record.project_id.as_deref(), candidate.as_deref())
            };

            let new_project_id = match &change {
                AssignmentChange::Unchanged => record.project_id.clone(),
                AssignmentChange::Assigned { project_id } => Some(project_id.clone()),
                AssignmentChange::Cleared => None,
            };

            ReconcileOutcome {
                record_id: record.id.clone(),
                kind: record.kind,
                new_project_id,
                changed: change.is_change(),
                change,
            }
        })
        .collect()
}

/// Reconcile a mutable batch in place, returning only the changes made.
pub fn reconcile_in_place(
    records: &mut [FinancialRecord],
    projects_by_code: &HashMap<ProjectCode, String>,
    policy: ReconcilePolicy,
) -> Vec<ReconcileOutcome> {
    let outcomes = reconcile(records, projects_by_code, policy);
    let mut changes = Vec::new();
    for (record, outcome) in records.iter_mut().zip(outcomes) {
        if outcome.changed {
            outcome.apply(record);
            changes.push(outcome);
        }
    }
    changes
}

/// What happened to one collection during a bulk clear
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ClearOutcome {
    Cleared { count: usize },
    Failed { reason: String },
}

impl ClearOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, ClearOutcome::Cleared { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkClearReport {
    pub project_id: String,
    pub invoices: ClearOutcome,
    pub bills: ClearOutcome,
}

impl BulkClearReport {
    pub fn fully_cleared(&self) -> bool {
        self.invoices.is_ok() && self.bills.is_ok()
    }
}

/// Detach a project from all of its invoices and bills.
///
/// Both collections are always attempted; a failure on one side is recorded
/// in the report and never stops the other.
pub fn bulk_clear<S: AssignmentStore + ?Sized>(store: &mut S, project_id: &str) -> BulkClearReport {
    let invoices = match store.clear_invoice_assignments(project_id) {
        Ok(count) => ClearOutcome::Cleared { count },
        Err(e) => {
            warn!(project = project_id, error = %e, "clearing invoice assignments failed");
            ClearOutcome::Failed {
                reason: format!("{e:#}"),
            }
        }
    };

    let bills = match store.clear_bill_assignments(project_id) {
        Ok(count) => ClearOutcome::Cleared { count },
        Err(e) => {
            warn!(project = project_id, error = %e, "clearing bill assignments failed");
            ClearOutcome::Failed {
                reason: format!("{e:#}"),
            }
        }
    };

    BulkClearReport {
        project_id: project_id.to_string(),
        invoices,
        bills,
    }
}
