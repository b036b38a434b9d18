use httpmock::{Method::GET, Method::POST, MockServer};
use justetf_rs::{DiscoverBuilder, DiscoveryRecord, EtfError, discover};

use crate::common::{client_for, read_fixture, table_page};

fn mock_search_page<'a>(server: &'a MockServer, ticker: &str, body: String) -> httpmock::Mock<'a> {
    server.mock(|when, then| {
        when.method(GET)
            .path("/fr/search.html")
            .query_param("query", ticker)
            .query_param("search", "ETFS");
        then.status(200)
            .header("content-type", "text/html;charset=UTF-8")
            .body(body);
    })
}

fn mock_table_page(server: &MockServer, start: usize, rows: usize) -> httpmock::Mock<'_> {
    let page = start / 50;
    server.mock(|when, then| {
        when.method(POST)
            .path("/fr/search.html")
            .query_param("search", "ETFS")
            .body_includes(format!("&start={start}&"));
        then.status(200)
            .header("content-type", "application/json")
            .body(table_page(page, rows));
    })
}

#[tokio::test]
async fn pages_until_a_short_page() {
    let server = MockServer::start();
    let search = mock_search_page(&server, "CSPX", read_fixture("search_CSPX.html"));
    let pages = [
        mock_table_page(&server, 0, 50),
        mock_table_page(&server, 50, 50),
        mock_table_page(&server, 100, 50),
        mock_table_page(&server, 150, 10),
    ];
    let beyond = mock_table_page(&server, 200, 50);

    let rows = DiscoverBuilder::new(&client_for(&server), "CSPX")
        .page_size(50)
        .max_pages(20)
        .fetch()
        .await
        .unwrap();

    search.assert();
    for p in &pages {
        p.assert();
    }
    beyond.assert_calls(0);

    assert_eq!(rows.len(), 160);
    assert_eq!(rows[0].isin, "IE0000000000");
    assert_eq!(rows[0].ticker, "T00");
    assert_eq!(rows[0].full_name, "Fund 0-0");
    assert_eq!(rows[159].isin, "IE0300000009");
}

#[tokio::test]
async fn max_pages_caps_the_requests() {
    let server = MockServer::start();
    let _search = mock_search_page(&server, "CSPX", read_fixture("search_CSPX.html"));
    let first = mock_table_page(&server, 0, 50);
    let second = mock_table_page(&server, 50, 50);
    let third = mock_table_page(&server, 100, 50);

    let rows = DiscoverBuilder::new(&client_for(&server), "CSPX")
        .page_size(50)
        .max_pages(2)
        .fetch()
        .await
        .unwrap();

    first.assert();
    second.assert();
    third.assert_calls(0);
    assert_eq!(rows.len(), 100);
}

#[tokio::test]
async fn empty_table_is_not_an_error() {
    let server = MockServer::start();
    let _search = mock_search_page(&server, "ZZZZ", read_fixture("search_CSPX.html").replace("CSPX", "ZZZZ"));
    let empty = server.mock(|when, then| {
        when.method(POST).path("/fr/search.html");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"draw":1,"recordsTotal":0,"recordsFiltered":0,"data":[]}"#);
    });

    let rows = discover(&client_for(&server), "ZZZZ").await.unwrap();
    empty.assert();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn quick_search_short_circuits_the_table() {
    let server = MockServer::start();
    let _search = mock_search_page(&server, "CSPX", read_fixture("search_quick_CSPX.html"));
    let quick = server.mock(|when, then| {
        when.method(POST)
            .path("/fr/search.html")
            .query_param("_wicket", "1")
            .header("Wicket-Ajax", "true")
            .header("Wicket-Ajax-BaseURL", "fr/search.html?query=CSPX&search=ETFS")
            .body("query=CSPX");
        then.status(200)
            .header("content-type", "text/xml;charset=UTF-8")
            .body(read_fixture("quicksearch_CSPX.xml"));
    });

    let rows = discover(&client_for(&server), "CSPX").await.unwrap();
    quick.assert();

    assert_eq!(
        rows,
        vec![
            DiscoveryRecord {
                ticker: "CSPX".into(),
                isin: "IE00B5BMR087".into(),
                full_name: "iShares Core S&P 500 UCITS ETF USD (Acc)".into(),
            },
            DiscoveryRecord {
                ticker: "SPXS".into(),
                isin: "IE00B3YCGJ38".into(),
                full_name: "Invesco S&P 500 UCITS ETF".into(),
            },
        ]
    );
}

#[tokio::test]
async fn failed_first_page_falls_back_to_profile_links() {
    let server = MockServer::start();
    let _search = mock_search_page(&server, "CSPX", read_fixture("search_CSPX.html"));
    let broken = server.mock(|when, then| {
        when.method(POST).path("/fr/search.html");
        then.status(500).body("oops");
    });

    let rows = discover(&client_for(&server), "CSPX").await.unwrap();
    broken.assert();

    let isins: Vec<&str> = rows.iter().map(|r| r.isin.as_str()).collect();
    assert_eq!(isins, ["IE00B5BMR087", "IE00BFMXXD54"]);
    assert!(rows.iter().all(|r| r.ticker == "CSPX"));
    assert_eq!(rows[1].full_name, "Vanguard S&P 500 UCITS ETF (USD) Accumulating");
}

#[tokio::test]
async fn page_without_any_result_source_is_an_extraction_error() {
    let server = MockServer::start();
    let _search = mock_search_page(&server, "NOPE", "<html><body><p>Rien</p></body></html>".into());

    let err = discover(&client_for(&server), "NOPE").await.unwrap_err();
    assert!(
        matches!(err, EtfError::Extraction(ref m) if m.contains("fetchCallbackUrl")),
        "{err}"
    );
}

#[tokio::test]
async fn search_page_status_is_reported() {
    let server = MockServer::start();
    let search = server.mock(|when, then| {
        when.method(GET).path("/fr/search.html");
        then.status(404);
    });

    let err = discover(&client_for(&server), "CSPX").await.unwrap_err();
    search.assert();
    assert!(matches!(err, EtfError::Status { status: 404, .. }), "{err}");
}

#[tokio::test]
async fn debug_dir_receives_raw_bodies() {
    let server = MockServer::start();
    let _search = mock_search_page(&server, "CSPX", read_fixture("search_CSPX.html"));
    let _page = mock_table_page(&server, 0, 3);

    let dumps = tempfile::tempdir().unwrap();
    let client = justetf_rs::JustEtfClient::builder()
        .base_host(url::Url::parse(&server.base_url()).unwrap())
        .debug_dir(dumps.path().join("raw"))
        .build()
        .unwrap();

    let rows = discover(&client, "CSPX").await.unwrap();
    assert_eq!(rows.len(), 3);

    let raw = dumps.path().join("raw");
    assert_eq!(
        std::fs::read_to_string(raw.join("CSPX_search.html")).unwrap(),
        read_fixture("search_CSPX.html")
    );
    assert!(std::fs::read_to_string(raw.join("CSPX_api_page_1.txt")).unwrap().contains("IE0000000002"));
}
