//! Entry points used by the HTTP view. Every call takes the record directory
//! explicitly and rescans it; nothing is cached between calls.

use std::{
    fs,
    path::{Component, Path},
};

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use super::aggregate::aggregate;
use super::document::Probes;
use super::filename::RECORD_EXTENSION;
use super::identity::{IdentityKey, resolve_identity};
use super::store::{ParsedRecord, list_record_files, load_object, scan_records};

/// Failure of a direct lookup.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Record not found: {filename}")]
    NotFound { filename: String },
}

/// The record currently standing for one machine.
#[derive(Debug, Clone)]
pub struct CurrentRecord {
    pub identity: IdentityKey,
    pub record: ParsedRecord,
}

impl CurrentRecord {
    pub fn source_filename(&self) -> &str {
        self.record.source_filename()
    }
}

/// One record per machine, ordered by identity key.
///
/// A missing directory, or one without valid records, yields an empty list.
pub fn list_current_records(dir: &Path, probes: &Probes) -> Vec<CurrentRecord> {
    let outcome = scan_records(dir, probes);
    aggregate(
        outcome
            .records
            .into_iter()
            .map(|record| (resolve_identity(&record, probes), record)),
    )
    .into_sorted()
    .into_iter()
    .map(|(identity, record)| CurrentRecord { identity, record })
    .collect()
}

/// Load one record by its filename, bypassing de-duplication.
///
/// Only bare `*.json` names of regular files inside `dir` are served. Anything
/// else, including symlinks and files the scan would skip as undecodable, is
/// `NotFound`.
pub fn get_record_by_filename(dir: &Path, filename: &str) -> Result<Value, CatalogError> {
    let not_found = || CatalogError::NotFound {
        filename: filename.to_string(),
    };
    if !is_bare_record_name(filename) {
        return Err(not_found());
    }
    let path = dir.join(filename);
    if !fs::symlink_metadata(&path).is_ok_and(|meta| meta.file_type().is_file()) {
        return Err(not_found());
    }
    load_object(&path).map_err(|err| {
        debug!(path = %path.display(), error = %err, "Record lookup failed");
        not_found()
    })
}

/// Raw record filenames in `dir`, sorted, without decoding anything.
pub fn list_raw_filenames(dir: &Path) -> Vec<String> {
    list_record_files(dir)
        .into_iter()
        .map(|file| file.filename)
        .collect()
}

fn is_bare_record_name(filename: &str) -> bool {
    if !filename.ends_with(RECORD_EXTENSION) || filename.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(filename).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
