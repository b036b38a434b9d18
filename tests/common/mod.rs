#![allow(dead_code)]

use std::{fs, path::PathBuf};

use justetf_rs::JustEtfClient;
use url::Url;

pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

pub fn read_fixture(name: &str) -> String {
    fs::read_to_string(fixtures_dir().join(name)).unwrap()
}

/// A client pointed at a mock server.
pub fn client_for(server: &httpmock::MockServer) -> JustEtfClient {
    JustEtfClient::builder()
        .base_host(Url::parse(&server.base_url()).unwrap())
        .build()
        .unwrap()
}

/// DataTables response with `n` rows whose ISINs are unique per `page`.
pub fn table_page(page: usize, n: usize) -> String {
    let rows: Vec<serde_json::Value> = (0..n)
        .map(|i| {
            serde_json::json!({
                "name": format!("Fund {page}-{i}"),
                "isin": format!("IE{page:02}{i:08}"),
                "ticker": format!("T{page}{i}"),
                "ter": "0,07%",
            })
        })
        .collect();
    serde_json::json!({
        "draw": page + 1,
        "recordsTotal": 160,
        "recordsFiltered": 160,
        "data": rows,
    })
    .to_string()
}

/// Write `ids` as a JSON array into `dir/name`.
pub fn write_ids(dir: &std::path::Path, name: &str, ids: &[&str]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, serde_json::to_string(ids).unwrap()).unwrap();
    path
}
