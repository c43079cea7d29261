//! siteledger-ingest: snapshot loading/saving and accounting CSV export parsers.

pub mod parsers;
pub mod snapshot;

pub use parsers::{parse_ledger_csv, parse_ledger_csv_reader};
pub use snapshot::Snapshot;
