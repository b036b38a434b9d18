//! Find the AJAX callback URLs embedded in the search page.

use std::sync::LazyLock;

use regex::Regex;

use crate::core::text::{unescape_html, unescape_script_url};

static FETCH_CALLBACK_JSON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""fetchCallbackUrl":"([^"]+)""#).expect("static regex"));
static FETCH_CALLBACK_VAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"var\s+fetchCallbackUrl\s*=\s*'([^']+)'").expect("static regex")
});
static QUICK_SEARCH_CALLBACK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^"'\s]*search\.html\?[^"'\s]*mainSearchPanel-searchForm-query[^"'\s]*_wicket=1)"#)
        .expect("static regex")
});

/// The results table's server-side data callback.
pub(crate) fn find_fetch_callback(search_html: &str) -> Option<String> {
    // JSON config object (search=ALL pages)
    if let Some(c) = FETCH_CALLBACK_JSON.captures(search_html) {
        return Some(unescape_script_url(&c[1]));
    }
    // inline script variable (search=ETFS pages)
    FETCH_CALLBACK_VAR
        .captures(search_html)
        .map(|c| unescape_html(&c[1]))
}

/// The quick-search form callback, preferring the primary (`-1.0-`) listener.
pub(crate) fn find_quick_search_callback(search_html: &str) -> Option<String> {
    let urls: Vec<&str> = QUICK_SEARCH_CALLBACK
        .captures_iter(search_html)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .collect();
    let chosen = urls
        .iter()
        .find(|u| u.contains("-1.0-"))
        .or_else(|| urls.first())?;
    Some(unescape_script_url(chosen))
}
