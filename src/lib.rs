//! Library exports for the server, the snapshot tool, tests and benches.
/// Application directory resolution.
pub mod app_dirs;
mod atomic_file;
/// TOML settings.
pub mod config;
/// Tracing setup.
pub mod logging;
/// Record files and per-machine reconciliation.
pub mod records;
/// HTTP JSON view.
pub mod server;
/// Host inventory snapshots.
pub mod snapshot;
