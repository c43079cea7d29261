//! siteledger-core: record types, project-code extraction and calendar helpers
//! shared by the reconciliation and estimation engine.

pub mod code;
pub mod error;
pub mod finance;
pub mod project;
pub mod store;
pub mod time;

pub use code::{ProjectCode, extract_all_project_codes, extract_project_code};
pub use error::ParseError;
pub use finance::{AssignmentSource, FinancialRecord, MatchConfidence, RecordKind};
pub use project::{Project, ProjectStatus, ProjectType};
pub use store::AssignmentStore;
pub use time::{days_between, parse_calendar_date, today_in};
