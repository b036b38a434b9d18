//! Server-side paged results table (DataTables protocol).

use reqwest::header::{ACCEPT, REFERER};
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use super::DiscoveryRecord;
use crate::core::client::ACCEPT_JSON;
use crate::core::net;
use crate::core::text::{clean_text, truncate};
use crate::{EtfError, JustEtfClient};

/// Table columns as the page declares them: (data, name, searchable/orderable).
const COLUMNS: &[(&str, &str, bool)] = &[
    ("", "selectCheckbox", false),
    ("name", "name", true),
    ("", "sparkline", false),
    ("oneYearReturn", "oneYearReturn", true),
    ("fundSize", "fundSize", true),
    ("ter", "ter", true),
    ("distributionPolicy", "distributionPolicy", true),
    ("provider", "provider", true),
    ("isin", "isin", true),
    ("ticker", "ticker", true),
];

#[derive(Deserialize)]
struct TablePage {
    #[serde(default)]
    data: Option<Value>,
}

/// Form body for one page: `draw` is 1-based, `start` is a row offset.
pub(crate) fn page_payload(page: u32, page_size: u32) -> Vec<(String, String)> {
    let start = u64::from(page) * u64::from(page_size);
    let mut form = vec![
        ("draw".to_string(), (page + 1).to_string()),
        ("start".to_string(), start.to_string()),
        ("length".to_string(), page_size.to_string()),
        ("search[value]".to_string(), String::new()),
        ("search[regex]".to_string(), "false".to_string()),
        ("order[0][column]".to_string(), "3".to_string()),
        ("order[0][dir]".to_string(), "desc".to_string()),
    ];
    for (i, (data, name, enabled)) in COLUMNS.iter().enumerate() {
        let flag = if *enabled { "true" } else { "false" };
        let key = |k: &str| format!("columns[{i}][{k}]");
        form.push((key("data"), (*data).to_string()));
        form.push((key("name"), (*name).to_string()));
        form.push((key("searchable"), flag.to_string()));
        form.push((key("orderable"), flag.to_string()));
        form.push((key("search][value"), String::new()));
        form.push((key("search][regex"), "false".to_string()));
    }
    form
}

/// Request one page and return its raw rows (empty when `data` is missing).
pub(crate) async fn fetch_page(
    client: &JustEtfClient,
    fetch_url: &Url,
    referer: &Url,
    ticker: &str,
    page: u32,
    page_size: u32,
) -> Result<Vec<Value>, EtfError> {
    let req = client
        .http()
        .post(fetch_url.clone())
        .header(ACCEPT, ACCEPT_JSON)
        .header(REFERER, referer.as_str())
        .form(&page_payload(page, page_size));
    let body = net::fetch_text(client, req, &format!("{ticker}_api_page_{}.txt", page + 1)).await?;

    let page: TablePage = serde_json::from_value(parse_json_body(&body)?)?;
    match page.data {
        Some(Value::Array(rows)) => Ok(rows),
        _ => Ok(Vec::new()),
    }
}

/// Parse a JSON body, recovering the outermost object if it is wrapped.
pub(crate) fn parse_json_body(body: &str) -> Result<Value, EtfError> {
    if let Ok(v) = serde_json::from_str::<Value>(body) {
        return Ok(v);
    }
    match (body.find('{'), body.rfind('}')) {
        (Some(first), Some(last)) if last > first => Ok(serde_json::from_str(&body[first..=last])?),
        _ => Err(EtfError::Extraction(format!(
            "response is not JSON: `{}`",
            truncate(body, 200)
        ))),
    }
}

/// Map one table row. Rows without an ISIN are dropped.
pub(crate) fn record_from_row(row: &Value, input_ticker: &str) -> Option<DiscoveryRecord> {
    let row = row.as_object()?;
    let field = |key: &str| clean_text(&row.get(key).map(scalar_text).unwrap_or_default());

    let isin = field("isin").to_uppercase();
    if isin.is_empty() {
        return None;
    }
    let ticker = field("ticker").to_uppercase();

    Some(DiscoveryRecord {
        ticker: if ticker.is_empty() {
            input_ticker.to_string()
        } else {
            ticker
        },
        isin,
        full_name: field("name"),
    })
}

fn scalar_text(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
