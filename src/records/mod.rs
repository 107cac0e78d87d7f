//! Snapshot records on disk and the rules that pick one per machine.
//!
//! A scan reads every `*.json` file in the record directory, derives an
//! identity key for each (serial number, else owner from the filename, else
//! the filename) and keeps the newest record per key.

pub mod aggregate;
pub mod catalog;
pub mod document;
pub mod filename;
pub mod identity;
pub mod store;

pub use aggregate::{AggregatedView, aggregate};
pub use catalog::{
    CatalogError, CurrentRecord, get_record_by_filename, list_current_records, list_raw_filenames,
};
pub use document::Probes;
pub use filename::{FilenameMeta, RECORD_EXTENSION, parse_filename, record_filename};
pub use identity::{IdentityKey, IdentitySource, resolve_identity};
pub use store::{ParsedRecord, RecordError, ScanOutcome, ScanStats, TimestampSource, scan_records};
