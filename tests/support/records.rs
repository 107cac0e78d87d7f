use std::path::Path;

use serde_json::{Value, json};

/// Write `body` as `name` inside `dir`.
pub fn write_raw(dir: &Path, name: &str, body: &str) {
    std::fs::create_dir_all(dir).expect("create record dir");
    std::fs::write(dir.join(name), body).expect("write record");
}

/// Write a record document as `name` inside `dir`.
pub fn write_record(dir: &Path, name: &str, document: &Value) {
    write_raw(
        dir,
        name,
        &serde_json::to_string_pretty(document).expect("encode record"),
    );
}

/// Minimal document with an optional serial and hostname.
pub fn document(serial: Option<&str>, hostname: &str) -> Value {
    let mut asset = json!({ "Hostname": hostname });
    if let Some(serial) = serial {
        asset["SerialNumber"] = json!(serial);
    }
    json!({ "AssetInformation": asset })
}
