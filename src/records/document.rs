//! Accessors into the untyped snapshot document.
//!
//! The aggregator only ever looks at three spots in a record: the serial
//! number, the capture timestamp, and the owner name. Their locations are
//! configurable through [`Probes`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Locations of the fields the aggregator reads from a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Probes {
    /// JSON pointer (RFC 6901) to the hardware serial number.
    pub serial_pointer: String,
    /// Top-level field holding the capture timestamp.
    pub timestamp_field: String,
    /// Top-level field holding the owner name, used for display only.
    pub owner_field: String,
}

impl Default for Probes {
    fn default() -> Self {
        Self {
            serial_pointer: "/AssetInformation/SerialNumber".to_string(),
            timestamp_field: "Timestamp".to_string(),
            owner_field: "OwnerName".to_string(),
        }
    }
}

/// Serial number at `pointer`.
///
/// Strings count only when non-blank after trimming and are returned trimmed;
/// numbers are rendered as written. Missing, null, blank and any other type
/// are all "absent".
pub fn serial_number(content: &Value, pointer: &str) -> Option<String> {
    match content.pointer(pointer)? {
        Value::String(serial) => {
            let serial = serial.trim();
            (!serial.is_empty()).then(|| serial.to_string())
        }
        Value::Number(serial) => Some(serial.to_string()),
        _ => None,
    }
}

/// Capture timestamp stored in the top-level `field`.
///
/// `2024-06-01 09:30:00` and `2024-06-01T09:30:00` are rewritten to
/// `2024-06-01_09:30:00` so they sort against filename timestamps. Anything
/// else is returned untouched and sorts however its bytes sort.
pub fn timestamp(content: &Value, field: &str) -> Option<String> {
    let raw = content.get(field)?.as_str()?.trim();
    if raw.is_empty() {
        return None;
    }
    Some(align_separator(raw))
}

/// Owner name stored in the top-level `field`, if it is a non-blank string.
pub fn owner_name(content: &Value, field: &str) -> Option<String> {
    let owner = content.get(field)?.as_str()?.trim();
    (!owner.is_empty()).then(|| owner.to_string())
}

fn align_separator(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let iso_like = bytes.len() >= 19
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && matches!(bytes[10], b' ' | b'T')
        && bytes[13] == b':'
        && bytes[16] == b':';
    if iso_like {
        format!("{}_{}", &raw[..10], &raw[11..])
    } else {
        raw.to_string()
    }
}
