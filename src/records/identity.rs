use serde::Serialize;

use super::document::{self, Probes};
use super::store::ParsedRecord;

/// Which rule produced an identity key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentitySource {
    Serial,
    Owner,
    Filename,
}

/// Grouping key for records of the same machine.
///
/// Records are the same machine when their key strings match exactly; the
/// source only explains where the string came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityKey {
    value: String,
    source: IdentitySource,
}

impl IdentityKey {
    pub fn new(value: impl Into<String>, source: IdentitySource) -> Self {
        Self {
            value: value.into(),
            source,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn source(&self) -> IdentitySource {
        self.source
    }
}

impl std::fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value)
    }
}

/// Serial number from the document, else the owner from the filename, else
/// the filename itself.
pub fn resolve_identity(record: &ParsedRecord, probes: &Probes) -> IdentityKey {
    if let Some(serial) = document::serial_number(record.content(), &probes.serial_pointer) {
        return IdentityKey::new(serial, IdentitySource::Serial);
    }
    if let Some(owner) = record.owner_from_filename() {
        return IdentityKey::new(owner, IdentitySource::Owner);
    }
    IdentityKey::new(record.source_filename(), IdentitySource::Filename)
}
