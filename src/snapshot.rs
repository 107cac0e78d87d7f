//! Host inventory snapshots written in the layout the record view reads.
//!
//! Collection is best effort: whatever `sysinfo` can see on this platform ends
//! up in the document, and everything else is left out.

use std::path::{Path, PathBuf};

use serde::Serialize;
use sysinfo::{Disks, Networks, Product, System};
use thiserror::Error;
use time::OffsetDateTime;
use tracing::info;

use crate::atomic_file;
use crate::records::record_filename;

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Errors from collecting or writing a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Owner name {owner:?} has no characters usable in a record filename")]
    InvalidOwner { owner: String },
    #[error("Failed to create record directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// One inventory document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Snapshot {
    /// Capture time as `YYYY-MM-DD HH:MM:SS`.
    pub timestamp: String,
    pub owner_name: String,
    pub asset_information: AssetInformation,
    pub memory_information: MemoryInformation,
    pub logical_drives: Vec<LogicalDrive>,
    pub network_interfaces: Vec<NetworkInterface>,
    #[serde(skip)]
    captured_at: OffsetDateTime,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AssetInformation {
    pub hostname: Option<String>,
    #[serde(rename = "OS")]
    pub os: Option<String>,
    pub version: Option<String>,
    pub kernel: Option<String>,
    pub architecture: String,
    pub processor: Option<String>,
    pub processor_cores: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MemoryInformation {
    #[serde(rename = "TotalMemoryGB")]
    pub total_memory_gb: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LogicalDrive {
    pub name: String,
    pub mount_point: String,
    pub file_system: String,
    #[serde(rename = "TotalSizeGB")]
    pub total_size_gb: f64,
    #[serde(rename = "FreeSpaceGB")]
    pub free_space_gb: f64,
    pub removable: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct NetworkInterface {
    pub name: String,
    pub mac_address: String,
    pub ip_addresses: Vec<String>,
}

impl Snapshot {
    /// Empty snapshot for `owner` taken at `at`; callers fill in the sections.
    pub fn new(owner: &str, at: OffsetDateTime) -> Self {
        Self {
            timestamp: format!(
                "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                at.year(),
                u8::from(at.month()),
                at.day(),
                at.hour(),
                at.minute(),
                at.second()
            ),
            owner_name: owner.trim().to_string(),
            asset_information: AssetInformation::default(),
            memory_information: MemoryInformation::default(),
            logical_drives: Vec::new(),
            network_interfaces: Vec::new(),
            captured_at: at,
        }
    }

    /// Query this host.
    ///
    /// `serial_number` overrides the firmware serial that `sysinfo` reports.
    pub fn collect(owner: &str, serial_number: Option<String>, at: OffsetDateTime) -> Self {
        let system = System::new_all();
        let mut snapshot = Self::new(owner, at);
        snapshot.asset_information = AssetInformation {
            hostname: System::host_name(),
            os: System::long_os_version().or_else(System::name),
            version: System::os_version(),
            kernel: System::kernel_version(),
            architecture: std::env::consts::ARCH.to_string(),
            processor: system
                .cpus()
                .first()
                .map(|cpu| cpu.brand().trim().to_string()),
            processor_cores: system.cpus().len(),
            serial_number: choose_serial(serial_number, Product::serial_number),
        };
        snapshot.memory_information.total_memory_gb = to_gb(system.total_memory());

        let disks = Disks::new_with_refreshed_list();
        snapshot.logical_drives = disks
            .list()
            .iter()
            .map(|disk| LogicalDrive {
                name: disk.name().to_string_lossy().into_owned(),
                mount_point: disk.mount_point().display().to_string(),
                file_system: disk.file_system().to_string_lossy().into_owned(),
                total_size_gb: to_gb(disk.total_space()),
                free_space_gb: to_gb(disk.available_space()),
                removable: disk.is_removable(),
            })
            .collect();

        let networks = Networks::new_with_refreshed_list();
        let mut interfaces: Vec<NetworkInterface> = networks
            .list()
            .iter()
            .map(|(name, data)| NetworkInterface {
                name: name.clone(),
                mac_address: data.mac_address().to_string(),
                ip_addresses: data
                    .ip_networks()
                    .iter()
                    .map(|net| format!("{}/{}", net.addr, net.prefix))
                    .collect(),
            })
            .collect();
        interfaces.sort_by(|a, b| a.name.cmp(&b.name));
        snapshot.network_interfaces = interfaces;
        snapshot
    }

    /// Canonical record filename for this snapshot.
    pub fn file_name(&self) -> Result<String, SnapshotError> {
        record_filename(&self.owner_name, self.captured_at).ok_or_else(|| {
            SnapshotError::InvalidOwner {
                owner: self.owner_name.clone(),
            }
        })
    }
}

/// Write `snapshot` into `dir` under its canonical name and return the path.
///
/// The file appears atomically, so a concurrent scan never sees half a record.
pub fn write_snapshot(dir: &Path, snapshot: &Snapshot) -> Result<PathBuf, SnapshotError> {
    let file_name = snapshot.file_name()?;
    std::fs::create_dir_all(dir).map_err(|source| SnapshotError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;
    let path = dir.join(file_name);
    let body = serde_json::to_vec_pretty(snapshot)?;
    atomic_file::write_atomic(&path, &body).map_err(|source| SnapshotError::Write {
        path: path.clone(),
        source,
    })?;
    info!(path = %path.display(), "Wrote snapshot");
    Ok(path)
}

/// A usable explicit serial wins; otherwise ask `detect`.
fn choose_serial(
    explicit: Option<String>,
    detect: impl FnOnce() -> Option<String>,
) -> Option<String> {
    explicit
        .and_then(non_blank)
        .or_else(|| detect().and_then(non_blank))
}

fn non_blank(serial: String) -> Option<String> {
    let serial = serial.trim();
    (!serial.is_empty()).then(|| serial.to_string())
}

fn to_gb(bytes: u64) -> f64 {
    (bytes as f64 / BYTES_PER_GB * 100.0).round() / 100.0
}
