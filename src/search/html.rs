//! Result rows rendered as HTML: the quick-search panel and plain profile links.

use std::collections::HashSet;

use scraper::{ElementRef, Html, Selector};

use super::DiscoveryRecord;
use crate::core::text::{clean_text, fold_accents};

const QUICK_ROW_PREFIX: &str = "quick-search-result-etf-";

/// Cell values that name an asset class, never a ticker.
const ASSET_CLASS_WORDS: &[&str] = &[
    "ETF",
    "ETFS",
    "ACTION",
    "ACTIONS",
    "OBLIGATION",
    "OBLIGATIONS",
    "MATIERES PREMIERES",
];

/// Rows of the quick-search AJAX panel.
pub(crate) fn parse_quick_search(fragment: &str, input_ticker: &str) -> Vec<DiscoveryRecord> {
    let (Ok(row_sel), Ok(link_sel), Ok(cell_sel)) = (
        Selector::parse(&format!(r#"tr[data-testid^="{QUICK_ROW_PREFIX}"]"#)),
        Selector::parse(r#"[data-target-kind="result-link"]"#),
        Selector::parse("td"),
    ) else {
        return Vec::new();
    };

    // Bare <tr> elements are dropped by the HTML parser outside a table.
    let doc = if fragment.to_ascii_lowercase().contains("<table") {
        Html::parse_document(fragment)
    } else {
        Html::parse_document(&format!("<table>{fragment}</table>"))
    };

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for row in doc.select(&row_sel) {
        let Some(isin) = row
            .value()
            .attr("data-testid")
            .and_then(|id| id.strip_prefix(QUICK_ROW_PREFIX))
            .and_then(normalize_isin)
        else {
            continue;
        };
        if !seen.insert(isin.clone()) {
            continue;
        }

        let cells: Vec<String> = row.select(&cell_sel).map(text_of).collect();
        let name = row
            .select(&link_sel)
            .map(text_of)
            .find(|t| !t.is_empty())
            .or_else(|| cells.first().cloned())
            .unwrap_or_default();
        let ticker = row_ticker(&cells, &isin).unwrap_or_else(|| input_ticker.to_string());

        out.push(DiscoveryRecord {
            ticker,
            isin,
            full_name: name,
        });
    }
    out
}

/// Links to profile pages anywhere in the search page.
pub(crate) fn parse_profile_links(html: &str, input_ticker: &str) -> Vec<DiscoveryRecord> {
    let Ok(link_sel) = Selector::parse(r#"a[href*="etf-profile.html?isin="]"#) else {
        return Vec::new();
    };
    let doc = Html::parse_document(html);

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for link in doc.select(&link_sel) {
        let Some(isin) = link
            .value()
            .attr("href")
            .and_then(|href| href.split_once("isin="))
            .map(|(_, rest)| rest.split(['&', '#']).next().unwrap_or(rest))
            .and_then(normalize_isin)
        else {
            continue;
        };
        let name = text_of(link);
        if name.is_empty() || !seen.insert(isin.clone()) {
            continue;
        }
        out.push(DiscoveryRecord {
            ticker: input_ticker.to_string(),
            isin,
            full_name: name,
        });
    }
    out
}

/// Rightmost cell that reads like an exchange symbol.
fn row_ticker(cells: &[String], isin: &str) -> Option<String> {
    cells.iter().rev().find_map(|text| {
        let upper = fold_accents(text).to_uppercase();
        if text.is_empty() || upper == isin || ASSET_CLASS_WORDS.contains(&upper.as_str()) {
            return None;
        }
        looks_like_ticker(&upper).then(|| text.clone())
    })
}

fn looks_like_ticker(s: &str) -> bool {
    (1..=12).contains(&s.len())
        && s.chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '.' || c == '-')
}

fn normalize_isin(raw: &str) -> Option<String> {
    let isin = raw.trim().to_ascii_uppercase();
    (isin.len() == 12 && isin.chars().all(|c| c.is_ascii_alphanumeric())).then_some(isin)
}

fn text_of(el: ElementRef<'_>) -> String {
    clean_text(&el.text().collect::<String>())
}
