use std::{
    fs,
    path::{Path, PathBuf},
    time::SystemTime,
};

use serde_json::Value;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use super::document::{self, Probes};
use super::filename::{
    FilenameMeta, RECORD_EXTENSION, local_offset, parse_filename, sortable_timestamp,
};

/// Per-file failures; each one skips that file and nothing else.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Failed to read {path}: {source}")]
    FileUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid JSON in {path}: {source}")]
    DecodeFailure {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Record {path} is not a JSON object")]
    NotAnObject { path: PathBuf },
}

/// Candidate record file found while listing a directory.
#[derive(Debug, Clone)]
pub struct RawRecordFile {
    pub path: PathBuf,
    pub filename: String,
    pub modified: Option<SystemTime>,
}

/// Where a record's effective timestamp came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampSource {
    Document,
    Filename,
    Modified,
    Now,
}

/// A decoded snapshot plus what could be learned from its filename.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRecord {
    content: Value,
    source_filename: String,
    filename_meta: Option<FilenameMeta>,
    effective_timestamp: String,
    timestamp_source: TimestampSource,
}

impl ParsedRecord {
    /// Build a record from an already decoded document.
    ///
    /// The effective timestamp is the document's own timestamp, else the one
    /// in the filename, else `modified`, else the current time.
    pub fn new(
        source_filename: impl Into<String>,
        content: Value,
        modified: Option<SystemTime>,
        probes: &Probes,
    ) -> Result<Self, RecordError> {
        let source_filename = source_filename.into();
        if !content.is_object() {
            return Err(RecordError::NotAnObject {
                path: PathBuf::from(source_filename),
            });
        }
        let filename_meta = parse_filename(&source_filename);
        let (effective_timestamp, timestamp_source) =
            if let Some(stamp) = document::timestamp(&content, &probes.timestamp_field) {
                (stamp, TimestampSource::Document)
            } else if let Some(meta) = &filename_meta {
                (meta.timestamp.clone(), TimestampSource::Filename)
            } else if let Some(modified) = modified {
                let modified = OffsetDateTime::from(modified).to_offset(local_offset());
                (sortable_timestamp(modified), TimestampSource::Modified)
            } else {
                (
                    sortable_timestamp(OffsetDateTime::now_utc().to_offset(local_offset())),
                    TimestampSource::Now,
                )
            };
        Ok(Self {
            content,
            source_filename,
            filename_meta,
            effective_timestamp,
            timestamp_source,
        })
    }

    pub fn content(&self) -> &Value {
        &self.content
    }

    pub fn into_content(self) -> Value {
        self.content
    }

    pub fn source_filename(&self) -> &str {
        &self.source_filename
    }

    pub fn owner_from_filename(&self) -> Option<&str> {
        self.filename_meta.as_ref().map(|meta| meta.owner.as_str())
    }

    pub fn timestamp_from_filename(&self) -> Option<&str> {
        self.filename_meta
            .as_ref()
            .map(|meta| meta.timestamp.as_str())
    }

    pub fn effective_timestamp(&self) -> &str {
        &self.effective_timestamp
    }

    pub fn timestamp_source(&self) -> TimestampSource {
        self.timestamp_source
    }

    /// Owner for display: the filename's owner, else the document's owner field.
    pub fn display_owner(&self, probes: &Probes) -> Option<String> {
        self.owner_from_filename()
            .map(str::to_string)
            .or_else(|| document::owner_name(&self.content, &probes.owner_field))
    }
}

/// Counters for one directory scan.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanStats {
    pub seen: usize,
    pub parsed: usize,
    pub unreadable: usize,
    pub undecodable: usize,
}

/// Records decoded from one directory scan, in filename order.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub records: Vec<ParsedRecord>,
    pub stats: ScanStats,
}

/// Read every record file in `dir`.
///
/// Unreadable and malformed files are logged and skipped. A missing
/// directory is an empty scan.
pub fn scan_records(dir: &Path, probes: &Probes) -> ScanOutcome {
    scan_files(dir, list_record_files(dir), probes)
}

fn scan_files(dir: &Path, files: Vec<RawRecordFile>, probes: &Probes) -> ScanOutcome {
    let mut outcome = ScanOutcome::default();
    for file in files {
        outcome.stats.seen += 1;
        match read_record(&file, probes) {
            Ok(record) => {
                outcome.stats.parsed += 1;
                outcome.records.push(record);
            }
            Err(err) => {
                match err {
                    RecordError::FileUnreadable { .. } => outcome.stats.unreadable += 1,
                    RecordError::DecodeFailure { .. } | RecordError::NotAnObject { .. } => {
                        outcome.stats.undecodable += 1
                    }
                }
                warn!(
                    path = %file.path.display(),
                    error = %err,
                    "Skipping record file"
                );
            }
        }
    }
    info!(
        dir = %dir.display(),
        seen = outcome.stats.seen,
        parsed = outcome.stats.parsed,
        unreadable = outcome.stats.unreadable,
        undecodable = outcome.stats.undecodable,
        "Scanned record directory"
    );
    outcome
}

/// List record files directly inside `dir`, sorted by filename.
///
/// Subdirectories and symlinks are ignored. A directory that is missing or
/// cannot be listed yields an empty list.
pub fn list_record_files(dir: &Path) -> Vec<RawRecordFile> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!(dir = %dir.display(), "Record directory does not exist yet");
            return Vec::new();
        }
        Err(err) => {
            warn!(
                dir = %dir.display(),
                error = %err,
                "Failed to read record directory"
            );
            return Vec::new();
        }
    };

    let mut files = Vec::new();
    for entry_result in entries {
        let entry = match entry_result {
            Ok(entry) => entry,
            Err(err) => {
                warn!(
                    dir = %dir.display(),
                    error = %err,
                    "Failed to read directory entry during scan"
                );
                continue;
            }
        };
        let path = entry.path();
        if !entry.file_type().is_ok_and(|ft| ft.is_file()) {
            continue;
        }
        let Some(filename) = entry.file_name().to_str().map(str::to_string) else {
            warn!(path = %path.display(), "Skipping record with non UTF-8 name");
            continue;
        };
        if !filename.ends_with(RECORD_EXTENSION) {
            continue;
        }
        let modified = entry.metadata().and_then(|meta| meta.modified()).ok();
        files.push(RawRecordFile {
            path,
            filename,
            modified,
        });
    }
    files.sort_by(|a, b| a.filename.cmp(&b.filename));
    files
}

/// Read and decode one record file.
pub fn read_record(file: &RawRecordFile, probes: &Probes) -> Result<ParsedRecord, RecordError> {
    let content = load_object(&file.path)?;
    ParsedRecord::new(file.filename.clone(), content, file.modified, probes)
}

/// Decode the document at `path` and require a JSON object at the top.
pub fn load_object(path: &Path) -> Result<Value, RecordError> {
    let content = load_document(path)?;
    if !content.is_object() {
        return Err(RecordError::NotAnObject {
            path: path.to_path_buf(),
        });
    }
    Ok(content)
}

/// Decode the JSON document at `path`, tolerating a leading UTF-8 BOM.
pub fn load_document(path: &Path) -> Result<Value, RecordError> {
    let bytes = fs::read(path).map_err(|source| RecordError::FileUnreadable {
        path: path.to_path_buf(),
        source,
    })?;
    let body = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(&bytes);
    serde_json::from_slice(body).map_err(|source| RecordError::DecodeFailure {
        path: path.to_path_buf(),
        source,
    })
}
