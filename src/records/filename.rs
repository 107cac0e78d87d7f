//! Identity and capture time encoded in snapshot filenames.
//!
//! Canonical names look like `SystemInfo_Jane_Doe_2024-06-01_09_30_00.json`:
//! a fixed prefix, the owner with spaces written as underscores, and a
//! filesystem-safe timestamp. Underscores inside the owner always read back
//! as spaces, so an owner that really contains `_` does not round-trip.

use std::sync::OnceLock;

use regex::Regex;
use time::{OffsetDateTime, UtcOffset};

/// Literal every canonical record filename starts with.
pub const RECORD_PREFIX: &str = "SystemInfo_";
/// Extension shared by every record file.
pub const RECORD_EXTENSION: &str = ".json";

/// Owner and capture time recovered from a canonical filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenameMeta {
    /// Owner name with underscores turned into spaces.
    pub owner: String,
    /// Capture time as `YYYY-MM-DD_HH:MM:SS`.
    pub timestamp: String,
}

fn pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^SystemInfo_(\w+)_([0-9]{4}-[0-9]{2}-[0-9]{2}_[0-9]{2}_[0-9]{2}_[0-9]{2})\.json$")
            .expect("record filename regex must compile")
    })
}

/// Parse a record filename; `None` when it does not follow the canonical shape.
pub fn parse_filename(filename: &str) -> Option<FilenameMeta> {
    let captures = pattern().captures(filename)?;
    let owner = captures.get(1)?.as_str().replace('_', " ");
    let raw = captures.get(2)?.as_str();
    // Date part keeps its dashes; only the clock separators were made filesystem-safe.
    let (date, clock) = raw.split_at(10);
    let timestamp = format!("{date}_{}", clock[1..].replace('_', ":"));
    Some(FilenameMeta { owner, timestamp })
}

/// Build the canonical filename for `owner` captured at `at`.
///
/// Whitespace becomes `_` and characters the parser would reject are dropped.
/// Returns `None` when nothing usable is left of the owner name.
pub fn record_filename(owner: &str, at: OffsetDateTime) -> Option<String> {
    let owner: String = owner
        .trim()
        .chars()
        .filter_map(|c| {
            if c.is_whitespace() {
                Some('_')
            } else if c.is_alphabetic() || c.is_ascii_digit() || c == '_' {
                Some(c)
            } else {
                None
            }
        })
        .collect();
    if owner.trim_matches('_').is_empty() {
        return None;
    }
    let stamp = format!(
        "{:04}-{:02}-{:02}_{:02}_{:02}_{:02}",
        at.year(),
        u8::from(at.month()),
        at.day(),
        at.hour(),
        at.minute(),
        at.second()
    );
    Some(format!("{RECORD_PREFIX}{owner}_{stamp}{RECORD_EXTENSION}"))
}

/// Render `at` in the sortable `YYYY-MM-DD_HH:MM:SS` form used for recency.
pub fn sortable_timestamp(at: OffsetDateTime) -> String {
    format!(
        "{:04}-{:02}-{:02}_{:02}:{:02}:{:02}",
        at.year(),
        u8::from(at.month()),
        at.day(),
        at.hour(),
        at.minute(),
        at.second()
    )
}

static LOCAL_OFFSET: OnceLock<UtcOffset> = OnceLock::new();

/// Read the local UTC offset once and keep it for the rest of the process.
///
/// `time` refuses to look up the offset on Unix once a second thread exists,
/// so this has to run before logging starts its writer thread. When it fails
/// or never ran, local times are rendered in UTC.
pub fn capture_local_offset() -> UtcOffset {
    *LOCAL_OFFSET.get_or_init(|| UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC))
}

/// The offset saved by [`capture_local_offset`], or UTC.
pub fn local_offset() -> UtcOffset {
    LOCAL_OFFSET.get().copied().unwrap_or(UtcOffset::UTC)
}

/// Current time in the captured local offset.
pub fn local_now() -> OffsetDateTime {
    OffsetDateTime::now_utc().to_offset(local_offset())
}
