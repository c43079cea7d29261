//! File-backed snapshot of projects, invoices and bills.
//!
//! A snapshot directory holds `projects.json`, `invoices.json` and
//! `bills.json`, each a JSON array. Missing files load as empty collections so
//! a fresh directory is a valid (empty) snapshot.

use anyhow::{Context, Result, bail};
use serde::Serialize;
use serde::de::DeserializeOwned;
use siteledger_core::{AssignmentStore, FinancialRecord, Project, RecordKind};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

pub const PROJECTS_FILE: &str = "projects.json";
pub const INVOICES_FILE: &str = "invoices.json";
pub const BILLS_FILE: &str = "bills.json";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub projects: Vec<Project>,
    pub invoices: Vec<FinancialRecord>,
    pub bills: Vec<FinancialRecord>,
}

impl Snapshot {
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            bail!("snapshot directory not found: {}", dir.display());
        }

        let snapshot = Self {
            projects: read_array(&dir.join(PROJECTS_FILE))?,
            invoices: read_records(&dir.join(INVOICES_FILE), RecordKind::Invoice)?,
            bills: read_records(&dir.join(BILLS_FILE), RecordKind::Bill)?,
        };
        info!(
            dir = %dir.display(),
            projects = snapshot.projects.len(),
            invoices = snapshot.invoices.len(),
            bills = snapshot.bills.len(),
            "loaded snapshot"
        );
        Ok(snapshot)
    }

    /// Write invoices and bills back. Projects are owned by intake and left as-is.
    pub fn save_records(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
        write_array(&dir.join(INVOICES_FILE), &self.invoices)?;
        write_array(&dir.join(BILLS_FILE), &self.bills)?;
        Ok(())
    }

    /// Write all three collections.
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        self.save_records(dir)?;
        write_array(&dir.join(PROJECTS_FILE), &self.projects)
    }

    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn closed_projects(&self) -> impl Iterator<Item = &Project> {
        self.projects.iter().filter(|p| p.is_closed())
    }

    /// Replace or append records by id, keeping the original order.
    ///
    /// An incoming row without a project id keeps the stored link, so a
    /// re-import never detaches records.
    pub fn upsert_records(&mut self, records: Vec<FinancialRecord>) -> usize {
        let mut inserted = 0;
        for mut rec in records {
            let target = match rec.kind {
                RecordKind::Invoice => &mut self.invoices,
                RecordKind::Bill => &mut self.bills,
            };
            match target.iter_mut().find(|r| r.id == rec.id) {
                Some(existing) => {
                    if rec.project_id.is_none() {
                        rec.project_id = existing.project_id.take();
                        rec.match_confidence = existing.match_confidence.take();
                        rec.assigned_by = existing.assigned_by.take();
                    }
                    *existing = rec;
                }
                None => {
                    target.push(rec);
                    inserted += 1;
                }
            }
        }
        inserted
    }
}

fn clear_for(records: &mut [FinancialRecord], project_id: &str) -> usize {
    let mut n = 0;
    for r in records.iter_mut().filter(|r| r.belongs_to(project_id)) {
        r.clear_assignment();
        n += 1;
    }
    n
}

impl AssignmentStore for Snapshot {
    fn clear_invoice_assignments(&mut self, project_id: &str) -> Result<usize> {
        Ok(clear_for(&mut self.invoices, project_id))
    }

    fn clear_bill_assignments(&mut self, project_id: &str) -> Result<usize> {
        Ok(clear_for(&mut self.bills, project_id))
    }
}

fn read_array<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        debug!(path = %path.display(), "snapshot file missing, treating as empty");
        return Ok(Vec::new());
    }
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parse {}", path.display()))
}

fn read_records(path: &Path, kind: RecordKind) -> Result<Vec<FinancialRecord>> {
    let records: Vec<FinancialRecord> = read_array(path)?;
    if let Some(stray) = records.iter().find(|r| r.kind != kind) {
        bail!(
            "{} contains {} '{}' but only {} records belong there",
            path.display(),
            stray.kind,
            stray.id,
            kind
        );
    }
    Ok(records)
}

fn write_array<T: Serialize>(path: &Path, items: &[T]) -> Result<()> {
    let json = serde_json::to_string_pretty(items)?;
    fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
