mod support;

use std::collections::HashSet;

use assetview::records::{
    IdentitySource, Probes, list_current_records, list_raw_filenames, scan_records,
};
use serde_json::json;
use support::records::{document, write_raw, write_record};
use tempfile::tempdir;

fn hostnames(dir: &std::path::Path) -> Vec<String> {
    list_current_records(dir, &Probes::default())
        .iter()
        .map(|current| {
            current.record.content()["AssetInformation"]["Hostname"]
                .as_str()
                .unwrap_or_default()
                .to_string()
        })
        .collect()
}

#[test]
fn newest_file_per_owner_wins() {
    let dir = tempdir().unwrap();
    write_record(
        dir.path(),
        "SystemInfo_Jane_Doe_2024-01-01_10_00_00.json",
        &document(None, "older"),
    );
    write_record(
        dir.path(),
        "SystemInfo_Jane_Doe_2024-06-01_09_30_00.json",
        &document(None, "newer"),
    );

    let current = list_current_records(dir.path(), &Probes::default());
    assert_eq!(current.len(), 1);
    assert_eq!(
        current[0].source_filename(),
        "SystemInfo_Jane_Doe_2024-06-01_09_30_00.json"
    );
    assert_eq!(current[0].identity.as_str(), "Jane Doe");
    assert_eq!(
        current[0].record.display_owner(&Probes::default()).as_deref(),
        Some("Jane Doe")
    );
}

#[test]
fn shared_serial_collapses_different_owners() {
    let dir = tempdir().unwrap();
    write_record(
        dir.path(),
        "SystemInfo_Jane_Doe_2024-01-01_10_00_00.json",
        &document(Some("5CG01"), "jane-laptop"),
    );
    write_record(
        dir.path(),
        "SystemInfo_John_Roe_2024-02-01_10_00_00.json",
        &document(Some("5CG01"), "reassigned"),
    );

    let current = list_current_records(dir.path(), &Probes::default());
    assert_eq!(current.len(), 1);
    assert_eq!(current[0].identity.as_str(), "5CG01");
    assert_eq!(current[0].identity.source(), IdentitySource::Serial);
    assert_eq!(hostnames(dir.path()), ["reassigned"]);
}

#[test]
fn corrupt_records_are_skipped() {
    let dir = tempdir().unwrap();
    write_record(
        dir.path(),
        "SystemInfo_Jane_Doe_2024-01-01_10_00_00.json",
        &document(None, "jane"),
    );
    write_raw(
        dir.path(),
        "SystemInfo_Jane_Doe_2024-06-01_09_30_00.json",
        "{\"AssetInformation\": {\"Host",
    );
    write_raw(dir.path(), "SystemInfo_Bob_2024-06-01_09_30_00.json", "");

    assert_eq!(hostnames(dir.path()), ["jane"]);
    let stats = scan_records(dir.path(), &Probes::default()).stats;
    assert_eq!(stats.seen, 3);
    assert_eq!(stats.undecodable, 2);
    assert_eq!(list_raw_filenames(dir.path()).len(), 3);
}

#[test]
fn mixed_provenance_keys_each_appear_once() {
    let dir = tempdir().unwrap();
    write_record(
        dir.path(),
        "SystemInfo_Ann_2024-01-01_00_00_00.json",
        &document(Some("SN-A"), "a1"),
    );
    write_record(
        dir.path(),
        "SystemInfo_Ann_2024-03-01_00_00_00.json",
        &document(Some("SN-A"), "a2"),
    );
    write_record(
        dir.path(),
        "SystemInfo_Ben_2024-01-01_00_00_00.json",
        &document(None, "b1"),
    );
    write_record(
        dir.path(),
        "SystemInfo_Ben_2024-02-01_00_00_00.json",
        &document(Some(""), "b2"),
    );
    write_record(dir.path(), "legacy.json", &document(None, "legacy"));
    write_record(dir.path(), "legacy-copy.json", &document(None, "legacy"));

    let current = list_current_records(dir.path(), &Probes::default());
    let keys: Vec<_> = current
        .iter()
        .map(|record| record.identity.as_str().to_string())
        .collect();
    let unique: HashSet<_> = keys.iter().collect();
    assert_eq!(unique.len(), keys.len());
    assert_eq!(keys, ["Ben", "SN-A", "legacy-copy.json", "legacy.json"]);
    assert_eq!(hostnames(dir.path())[..2], ["b2", "a2"]);
}

#[test]
fn document_timestamp_overrides_filename() {
    let dir = tempdir().unwrap();
    let mut late = document(None, "stamped-late");
    late["Timestamp"] = json!("2025-01-01 00:00:00");
    write_record(dir.path(), "SystemInfo_Kim_2024-01-01_00_00_00.json", &late);
    write_record(
        dir.path(),
        "SystemInfo_Kim_2024-06-01_00_00_00.json",
        &document(None, "named-late"),
    );
    assert_eq!(hostnames(dir.path()), ["stamped-late"]);
}

#[test]
fn repeated_scans_are_identical() {
    let dir = tempdir().unwrap();
    for (name, serial, host) in [
        ("SystemInfo_A_2024-01-01_00_00_00.json", Some("S1"), "x"),
        ("SystemInfo_B_2024-01-01_00_00_00.json", Some("S1"), "y"),
        ("SystemInfo_C_2024-01-01_00_00_00.json", None, "z"),
        ("other.json", None, "w"),
    ] {
        write_record(dir.path(), name, &document(serial, host));
    }
    let first: Vec<_> = list_current_records(dir.path(), &Probes::default())
        .into_iter()
        .map(|current| (current.identity, current.record))
        .collect();
    let second: Vec<_> = list_current_records(dir.path(), &Probes::default())
        .into_iter()
        .map(|current| (current.identity, current.record))
        .collect();
    assert_eq!(first, second);
    // A and B tie on S1; B comes later in name order and wins.
    let (_, winner) = first
        .iter()
        .find(|(key, _)| key.as_str() == "S1")
        .unwrap();
    assert_eq!(winner.source_filename(), "SystemInfo_B_2024-01-01_00_00_00.json");
}

#[test]
fn empty_and_missing_directories_are_empty() {
    let dir = tempdir().unwrap();
    assert!(list_current_records(dir.path(), &Probes::default()).is_empty());
    assert!(list_raw_filenames(dir.path()).is_empty());

    let missing = dir.path().join("Records");
    assert!(list_current_records(&missing, &Probes::default()).is_empty());
    assert!(list_raw_filenames(&missing).is_empty());
}
