use std::fs;

use clap::Parser;
use httpmock::{Method::GET, Method::POST, MockServer};
use justetf_rs::RunStatus;
use justetf_rs::cli::{DiscoveryArgs, run_discovery};

use crate::common::{read_fixture, table_page, write_ids};

#[tokio::test]
async fn results_and_errors_go_to_separate_files() {
    let server = MockServer::start();
    let search = server.mock(|when, then| {
        when.method(GET)
            .path("/fr/search.html")
            .query_param("query", "CSPX");
        then.status(200).body(read_fixture("search_CSPX.html"));
    });
    let table = server.mock(|when, then| {
        when.method(POST).path("/fr/search.html");
        then.status(200)
            .header("content-type", "application/json")
            .body(table_page(0, 3));
    });
    let failing = server.mock(|when, then| {
        when.method(GET)
            .path("/fr/search.html")
            .query_param("query", "DOWN");
        then.status(502);
    });

    let dir = tempfile::tempdir().unwrap();
    let input = write_ids(dir.path(), "tickers.json", &["cspx", "DOWN"]);
    let output = dir.path().join("discovery.json");
    let errors_output = dir.path().join("discovery_errors.json");

    let args = DiscoveryArgs::try_parse_from([
        "justetf-discover",
        input.to_str().unwrap(),
        "--output",
        output.to_str().unwrap(),
        "--errors-output",
        errors_output.to_str().unwrap(),
        "--delay",
        "0",
        "--base-url",
        &server.base_url(),
    ])
    .unwrap();

    let status = run_discovery(&args).await;
    search.assert();
    table.assert();
    failing.assert();
    assert_eq!(status, RunStatus::PartialFailure);

    let rows: serde_json::Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(
        rows[0],
        serde_json::json!({"tickers": "T00", "isin": "IE0000000000", "nom_complet": "Fund 0-0"})
    );

    let errors: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&errors_output).unwrap()).unwrap();
    let errors = errors.as_object().unwrap();
    assert_eq!(errors.keys().collect::<Vec<_>>(), ["DOWN"]);
    assert!(errors["DOWN"].as_str().unwrap().contains("502"));
}

#[tokio::test]
async fn clean_run_writes_no_errors_file() {
    let server = MockServer::start();
    let _search = server.mock(|when, then| {
        when.method(GET).path("/fr/search.html");
        then.status(200).body(read_fixture("search_CSPX.html"));
    });
    let _table = server.mock(|when, then| {
        when.method(POST).path("/fr/search.html");
        then.status(200).body(r#"{"data":[]}"#);
    });

    let dir = tempfile::tempdir().unwrap();
    let input = write_ids(dir.path(), "tickers.json", &["XXXX"]);
    let output = dir.path().join("discovery.json");
    let errors_output = dir.path().join("discovery_errors.json");

    let args = DiscoveryArgs::try_parse_from([
        "justetf-discover",
        input.to_str().unwrap(),
        "--output",
        output.to_str().unwrap(),
        "--errors-output",
        errors_output.to_str().unwrap(),
        "--base-url",
        &server.base_url(),
    ])
    .unwrap();

    assert_eq!(run_discovery(&args).await, RunStatus::Success);
    assert_eq!(fs::read_to_string(&output).unwrap(), "[]\n");
    assert!(!errors_output.exists());
}
