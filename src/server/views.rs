use serde::Serialize;
use serde_json::Value;

use crate::records::{CurrentRecord, IdentitySource, Probes};

/// One machine in the list view.
#[derive(Debug, Serialize)]
pub(crate) struct AssetSummary<'a> {
    pub identity: &'a str,
    pub identity_source: IdentitySource,
    pub owner: Option<String>,
    pub timestamp: &'a str,
    pub filename: &'a str,
    pub record: &'a Value,
}

impl<'a> AssetSummary<'a> {
    pub(crate) fn new(current: &'a CurrentRecord, probes: &Probes) -> Self {
        Self {
            identity: current.identity.as_str(),
            identity_source: current.identity.source(),
            owner: current.record.display_owner(probes),
            timestamp: current.record.effective_timestamp(),
            filename: current.source_filename(),
            record: current.record.content(),
        }
    }
}

/// Body of the list view.
#[derive(Debug, Serialize)]
pub(crate) struct AssetList<'a> {
    pub asset_count: usize,
    pub assets: Vec<AssetSummary<'a>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ErrorBody<'a> {
    pub error: &'a str,
}
