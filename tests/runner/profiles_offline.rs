use std::fs;
use std::path::Path;
use std::time::Duration;

use clap::Parser;
use httpmock::{Method::GET, MockServer};
use justetf_rs::RunStatus;
use justetf_rs::cli::{ProfileArgs, run_profiles};

use crate::common::{read_fixture, write_ids};

/// The profile fixture without its returns-chart scripts.
fn static_profile_page() -> String {
    let html = read_fixture("profile_IE00B4L5Y983.html");
    let head = html.split("<script").next().unwrap();
    format!("{head}</body></html>")
}

fn mock_page<'a>(server: &'a MockServer, isin: &str, status: u16, body: String) -> httpmock::Mock<'a> {
    server.mock(|when, then| {
        when.method(GET)
            .path("/fr/etf-profile.html")
            .query_param("isin", isin);
        then.status(status)
            .header("content-type", "text/html;charset=UTF-8")
            .body(body);
    })
}

fn args(server: &MockServer, input: &std::path::Path, out: &std::path::Path) -> ProfileArgs {
    args_for(&server.base_url(), input, out, &[])
}

fn args_for(base_url: &str, input: &Path, out: &Path, extra: &[&str]) -> ProfileArgs {
    let mut argv = vec![
        "justetf-profiles",
        input.to_str().unwrap(),
        "--output-dir",
        out.to_str().unwrap(),
        "--delay",
        "0",
        "--base-url",
        base_url,
    ];
    argv.extend_from_slice(extra);
    ProfileArgs::try_parse_from(argv).unwrap()
}

fn read_errors(out: &Path) -> serde_json::Map<String, serde_json::Value> {
    let errors: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("errors.json")).unwrap()).unwrap();
    errors.as_object().unwrap().clone()
}

#[tokio::test]
async fn one_failure_does_not_stop_the_batch() {
    let server = MockServer::start();
    let good1 = mock_page(&server, "GOOD1", 200, static_profile_page());
    let bad1 = mock_page(&server, "BAD1", 500, "Internal Server Error".into());
    let good2 = mock_page(&server, "GOOD2", 200, static_profile_page());

    let dir = tempfile::tempdir().unwrap();
    let input = write_ids(dir.path(), "isins.json", &["GOOD1", "BAD1", "GOOD2"]);
    let out = dir.path().join("output");

    let status = run_profiles(&args(&server, &input, &out)).await;
    good1.assert();
    bad1.assert();
    good2.assert();
    assert_eq!(status, RunStatus::PartialFailure);
    assert_eq!(status.exit_code(), 2);

    let mut names: Vec<String> = fs::read_dir(&out)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, ["GOOD1.json", "GOOD2.json", "errors.json"]);

    let errors: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("errors.json")).unwrap()).unwrap();
    let errors = errors.as_object().unwrap();
    assert_eq!(errors.len(), 1);
    let msg = errors["BAD1"].as_str().unwrap();
    assert!(msg.contains("500"), "{msg}");

    let good: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("GOOD1.json")).unwrap()).unwrap();
    assert_eq!(good["isin"], "GOOD1");
    assert_eq!(good["nom"], "iShares Core MSCI World UCITS ETF USD (Acc)");
    assert_eq!(good["donnees"]["frais_totaux_sur_encours_ter"], "0,20% p.a.");
}

#[tokio::test]
async fn rerun_rewrites_identical_bytes() {
    let server = MockServer::start();
    let page = mock_page(&server, "IE00B4L5Y983", 200, static_profile_page());

    let dir = tempfile::tempdir().unwrap();
    let input = write_ids(dir.path(), "isins.json", &["IE00B4L5Y983"]);
    let out = dir.path().join("output");
    let args = args(&server, &input, &out);

    assert_eq!(run_profiles(&args).await, RunStatus::Success);
    let first = fs::read(out.join("IE00B4L5Y983.json")).unwrap();
    assert_eq!(run_profiles(&args).await, RunStatus::Success);
    let second = fs::read(out.join("IE00B4L5Y983.json")).unwrap();

    page.assert_calls(2);
    assert_eq!(first, second);
    assert!(String::from_utf8(first).unwrap().starts_with("{\n  \"isin\": \"IE00B4L5Y983\",\n  \"nom\": "));
    assert!(!out.join("errors.json").exists());
}

#[tokio::test]
async fn bad_input_stops_before_any_request() {
    let server = MockServer::start();
    let any = server.mock(|_when, then| {
        then.status(200);
    });

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("isins.json");
    fs::write(&input, r#"["VALID", "", 123]"#).unwrap();
    let out = dir.path().join("output");

    let status = run_profiles(&args(&server, &input, &out)).await;
    assert_eq!(status, RunStatus::InputError);
    assert_eq!(status.exit_code(), 1);
    any.assert_calls(0);
    assert!(!out.exists());
}

#[tokio::test]
async fn input_is_normalized_before_fetching() {
    let server = MockServer::start();
    let page = mock_page(&server, "IE00B4L5Y983", 200, static_profile_page());

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("isins.json");
    fs::write(&input, "\u{feff}[\" ie00b4l5y983 \", \"IE00B4L5Y983\"]").unwrap();
    let out = dir.path().join("output");

    assert_eq!(run_profiles(&args(&server, &input, &out)).await, RunStatus::Success);
    page.assert_calls(1);
    assert!(out.join("IE00B4L5Y983.json").exists());
}

#[tokio::test]
async fn timed_out_isin_is_recorded_and_the_run_continues() {
    let server = MockServer::start();
    let slow = server.mock(|when, then| {
        when.method(GET)
            .path("/fr/etf-profile.html")
            .query_param("isin", "SLOW1");
        then.status(200)
            .delay(Duration::from_secs(3))
            .body(static_profile_page());
    });
    let good = mock_page(&server, "GOOD1", 200, static_profile_page());

    let dir = tempfile::tempdir().unwrap();
    let input = write_ids(dir.path(), "isins.json", &["SLOW1", "GOOD1"]);
    let out = dir.path().join("output");

    let args = args_for(&server.base_url(), &input, &out, &["--timeout", "0.3"]);
    let status = run_profiles(&args).await;
    slow.assert();
    good.assert();
    assert_eq!(status, RunStatus::PartialFailure);
    assert!(out.join("GOOD1.json").exists());
    assert!(!out.join("SLOW1.json").exists());

    let errors = read_errors(&out);
    assert_eq!(errors.len(), 1);
    let msg = errors["SLOW1"].as_str().unwrap();
    assert!(msg.contains("timed out"), "{msg}");
}

#[tokio::test]
async fn refused_connection_is_recorded_per_isin() {
    // Bind then drop a listener to get a port nobody is serving.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let base_url = format!("http://127.0.0.1:{port}");

    let dir = tempfile::tempdir().unwrap();
    let input = write_ids(dir.path(), "isins.json", &["DOWN1", "DOWN2"]);
    let out = dir.path().join("output");

    let status = run_profiles(&args_for(&base_url, &input, &out, &[])).await;
    assert_eq!(status, RunStatus::PartialFailure);

    let errors = read_errors(&out);
    assert_eq!(errors.keys().collect::<Vec<_>>(), ["DOWN1", "DOWN2"]);
    for msg in errors.values() {
        assert!(msg.as_str().unwrap().starts_with("HTTP error:"), "{msg}");
    }
}

#[tokio::test]
async fn unwritable_artifact_is_recorded_and_later_isins_are_written() {
    let server = MockServer::start();
    let good_a = mock_page(&server, "GOODA", 200, static_profile_page());
    let blocked = mock_page(&server, "WRITE1", 200, static_profile_page());
    let good_b = mock_page(&server, "GOODB", 200, static_profile_page());

    let dir = tempfile::tempdir().unwrap();
    let input = write_ids(dir.path(), "isins.json", &["GOODA", "WRITE1", "GOODB"]);
    let out = dir.path().join("output");
    fs::create_dir_all(out.join("WRITE1.json")).unwrap();

    let status = run_profiles(&args(&server, &input, &out)).await;
    good_a.assert();
    blocked.assert();
    good_b.assert();
    assert_eq!(status, RunStatus::PartialFailure);
    assert!(out.join("GOODA.json").is_file());
    assert!(out.join("GOODB.json").is_file());
    assert!(out.join("WRITE1.json").is_dir());

    let errors = read_errors(&out);
    assert_eq!(errors.len(), 1);
    let msg = errors["WRITE1"].as_str().unwrap();
    assert!(msg.starts_with("failed to write"), "{msg}");
    assert!(msg.contains("WRITE1.json"), "{msg}");
}
