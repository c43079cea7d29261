//! The write seam toward whatever persists financial records.

use anyhow::Result;

/// Storage operations the engine needs when detaching a project from its
/// financial history. Each call is independent and may fail on its own.
pub trait AssignmentStore {
    /// Null out `project_id` and confidence on every invoice of the project.
    /// Returns how many invoices were touched.
    fn clear_invoice_assignments(&mut self, project_id: &str) -> Result<usize>;

    /// Null out `project_id` on every bill of the project.
    fn clear_bill_assignments(&mut self, project_id: &str) -> Result<usize>;
}
