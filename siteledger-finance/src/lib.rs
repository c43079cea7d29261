//! siteledger-finance: memo-code reconciliation, project totals, aging
//! buckets, project-type rules and the quote estimator

pub mod aging;
pub mod category_rules;
pub mod estimator;
pub mod reconcile;
pub mod totals;

pub use aging::{AgingBucket, DueStatus, due_status, summarize, summarize_with_window};
pub use category_rules::{KeywordRule, KeywordTable, classify};
pub use estimator::{
    ComparableWeight, ConfidenceTier, Estimator, EstimatorConfig, FallbackRate, QuoteBasis,
    QuoteRequest, QuoteResponse, estimate,
};
pub use reconcile::{
    AssignmentChange, BulkClearReport, ClearOutcome, ReconcileOutcome, ReconcilePolicy,
    bulk_clear, diff_assignment, projects_by_code, reconcile, reconcile_in_place,
};
pub use totals::{ProjectTotals, aggregate, aggregate_by_project};
