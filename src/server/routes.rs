use std::path::PathBuf;

use serde::Serialize;
use serde_json::Value;
use tiny_http::Method;
use url::Url;

use crate::records::{self, Probes};

use super::views::{AssetList, AssetSummary, ErrorBody};

/// Resolve request targets against a dummy origin; only path and query matter.
const REQUEST_BASE: &str = "http://localhost/";

/// Immutable inputs shared by every request.
#[derive(Debug, Clone)]
pub struct ServerState {
    pub records_dir: PathBuf,
    pub probes: Probes,
}

/// Status and JSON body ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Reply {
    fn json(status: u16, body: &impl Serialize) -> Self {
        match serde_json::to_vec(body) {
            Ok(body) => Self { status, body },
            Err(err) => {
                tracing::error!(error = %err, "Failed to encode response body");
                Self {
                    status: 500,
                    body: br#"{"error":"Internal error"}"#.to_vec(),
                }
            }
        }
    }

    fn error(status: u16, message: &str) -> Self {
        Self::json(status, &ErrorBody { error: message })
    }
}

/// Dispatch one request to its view.
pub fn route(method: &Method, target: &str, state: &ServerState) -> Reply {
    if *method != Method::Get {
        return Reply::error(405, "Method not allowed");
    }
    let Some(url) = Url::parse(REQUEST_BASE)
        .ok()
        .and_then(|base| base.join(target).ok())
    else {
        return Reply::error(400, "Malformed request target");
    };
    let segments: Vec<String> = url
        .path_segments()
        .map(|segments| {
            segments
                .filter(|segment| !segment.is_empty())
                .map(|segment| {
                    percent_encoding::percent_decode_str(segment)
                        .decode_utf8_lossy()
                        .into_owned()
                })
                .collect()
        })
        .unwrap_or_default();

    match segments.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        [] | ["api", "assets"] => {
            let query = url
                .query_pairs()
                .find(|(key, _)| key == "q")
                .map(|(_, value)| value.into_owned());
            list_assets(state, query.as_deref())
        }
        ["asset", filename] => asset_detail(state, filename),
        ["records", "list"] => Reply::json(200, &records::list_raw_filenames(&state.records_dir)),
        _ => Reply::error(404, "Not found"),
    }
}

fn list_assets(state: &ServerState, query: Option<&str>) -> Reply {
    let current = records::list_current_records(&state.records_dir, &state.probes);
    let needle = query
        .map(|q| q.trim().to_lowercase())
        .filter(|q| !q.is_empty());
    let assets: Vec<AssetSummary<'_>> = current
        .iter()
        .map(|record| AssetSummary::new(record, &state.probes))
        .filter(|summary| match &needle {
            Some(needle) => summary
                .owner
                .as_ref()
                .is_some_and(|owner| owner.to_lowercase().contains(needle.as_str())),
            None => true,
        })
        .collect();
    Reply::json(
        200,
        &AssetList {
            asset_count: assets.len(),
            assets,
        },
    )
}

fn asset_detail(state: &ServerState, filename: &str) -> Reply {
    match records::get_record_by_filename(&state.records_dir, filename) {
        Ok(mut document) => {
            if let Value::Object(fields) = &mut document {
                fields.insert("filename".to_string(), Value::String(filename.to_string()));
            }
            Reply::json(200, &document)
        }
        Err(err) => {
            tracing::debug!(error = %err, "Asset lookup missed");
            Reply::error(404, "Asset not found")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn state(dir: &std::path::Path) -> ServerState {
        ServerState {
            records_dir: dir.to_path_buf(),
            probes: Probes::default(),
        }
    }

    fn body(reply: &Reply) -> Value {
        serde_json::from_slice(&reply.body).unwrap()
    }

    fn seed(dir: &std::path::Path) {
        fs::write(
            dir.join("SystemInfo_Jane_Doe_2024-01-01_10_00_00.json"),
            r#"{"AssetInformation": {"Hostname": "old"}}"#,
        )
        .unwrap();
        fs::write(
            dir.join("SystemInfo_Jane_Doe_2024-06-01_09_30_00.json"),
            r#"{"AssetInformation": {"Hostname": "new"}}"#,
        )
        .unwrap();
        fs::write(
            dir.join("SystemInfo_Bob_Ray_2024-03-01_08_00_00.json"),
            r#"{"AssetInformation": {"Hostname": "bob"}}"#,
        )
        .unwrap();
    }

    #[test]
    fn list_view_returns_current_records() {
        let dir = tempdir().unwrap();
        seed(dir.path());
        let reply = route(&Method::Get, "/", &state(dir.path()));
        assert_eq!(reply.status, 200);
        let json = body(&reply);
        assert_eq!(json["asset_count"], 2);
        assert_eq!(json["assets"][0]["owner"], "Bob Ray");
        assert_eq!(json["assets"][1]["owner"], "Jane Doe");
        assert_eq!(json["assets"][1]["identity_source"], "owner");
        assert_eq!(
            json["assets"][1]["filename"],
            "SystemInfo_Jane_Doe_2024-06-01_09_30_00.json"
        );
        assert_eq!(json["assets"][1]["record"]["AssetInformation"]["Hostname"], "new");
    }

    #[test]
    fn list_view_filters_by_owner() {
        let dir = tempdir().unwrap();
        seed(dir.path());
        let json = body(&route(&Method::Get, "/api/assets?q=jane%20d", &state(dir.path())));
        assert_eq!(json["asset_count"], 1);
        assert_eq!(json["assets"][0]["owner"], "Jane Doe");

        let json = body(&route(&Method::Get, "/api/assets?q=nobody", &state(dir.path())));
        assert_eq!(json["asset_count"], 0);
    }

    #[test]
    fn detail_adds_filename_and_404s_on_miss() {
        let dir = tempdir().unwrap();
        seed(dir.path());
        let name = "SystemInfo_Bob_Ray_2024-03-01_08_00_00.json";
        let reply = route(&Method::Get, &format!("/asset/{name}"), &state(dir.path()));
        assert_eq!(reply.status, 200);
        assert_eq!(body(&reply)["filename"], name);

        let missing = route(&Method::Get, "/asset/nope.json", &state(dir.path()));
        assert_eq!(missing.status, 404);
        assert_eq!(body(&missing)["error"], "Asset not found");

        let escape = route(&Method::Get, "/asset/..%2Fconfig.json", &state(dir.path()));
        assert_eq!(escape.status, 404);

        fs::write(dir.path().join("list.json"), "[1, 2]").unwrap();
        let array = route(&Method::Get, "/asset/list.json", &state(dir.path()));
        assert_eq!(array.status, 404);
    }

    #[test]
    fn sync_list_returns_raw_names() {
        let dir = tempdir().unwrap();
        seed(dir.path());
        fs::write(dir.path().join("broken.json"), "{").unwrap();
        let json = body(&route(&Method::Get, "/records/list", &state(dir.path())));
        assert_eq!(
            json,
            serde_json::json!([
                "SystemInfo_Bob_Ray_2024-03-01_08_00_00.json",
                "SystemInfo_Jane_Doe_2024-01-01_10_00_00.json",
                "SystemInfo_Jane_Doe_2024-06-01_09_30_00.json",
                "broken.json",
            ])
        );
    }

    #[test]
    fn missing_directory_is_an_empty_list() {
        let dir = tempdir().unwrap();
        let state = state(&dir.path().join("Records"));
        assert_eq!(body(&route(&Method::Get, "/", &state))["asset_count"], 0);
        assert_eq!(
            body(&route(&Method::Get, "/records/list", &state)),
            serde_json::json!([])
        );
    }

    #[test]
    fn unknown_paths_and_methods() {
        let dir = tempdir().unwrap();
        assert_eq!(route(&Method::Get, "/static/app.js", &state(dir.path())).status, 404);
        assert_eq!(route(&Method::Post, "/", &state(dir.path())).status, 405);
    }
}
