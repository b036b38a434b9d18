//! Locate the returns-chart AJAX callbacks and parse the chart script they return.

use std::sync::LazyLock;

use regex::Regex;

use crate::core::text::unescape_script_url;
use crate::profile::{MonthlyReturn, MonthlyReturns};

pub(crate) const HEATMAP_SOURCE: &str = "returnsSection:viewMode";

static TIMER_CALLBACK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"Wicket\.Ajax\.ajax\(\{"u":"([^"]*\?\d+-1\.0-(?:&|&amp;)isin=[^"]+(?:&|&amp;)_wicket=1)"\}\)"#,
    )
    .expect("static regex")
});
static X_CATEGORIES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)xAxis\s*:\s*\{.*?categories\s*:\s*\[([^\]]+)\]").expect("static regex")
});
static Y_CATEGORIES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)yAxis\s*:\s*\{.*?categories\s*:\s*\[([^\]]+)\]").expect("static regex")
});
static X_SET_CATEGORIES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\.xAxis\[0\]\.setCategories\(\[([^\]]+)\]\)").expect("static regex")
});
static Y_SET_CATEGORIES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\.yAxis\[0\]\.setCategories\(\[([^\]]+)\]\)").expect("static regex")
});
static QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"'([^']*)'|"([^"]*)""#).expect("static regex"));
static POINT_TRIPLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\s*(\d+)\s*,\s*(\d+)\s*,\s*(-?\d+(?:\.\d+)?)\s*\]").expect("static regex")
});
static POINT_OBJECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\{\s*x\s*:\s*(\d+)\s*,\s*y\s*:\s*(\d+)\s*,\s*value\s*:\s*(null|-?\d+(?:\.\d+)?)\s*\}",
    )
    .expect("static regex")
});

/// The lazy-panel timer callback scheduled right after page load.
pub(crate) fn find_timer_callback(page_html: &str) -> Option<String> {
    TIMER_CALLBACK
        .captures(page_html)
        .map(|c| unescape_script_url(&c[1]))
}

/// The first `Wicket.Ajax.ajax` callback whose URL contains `keyword`.
pub(crate) fn find_ajax_callback(page_html: &str, keyword: &str) -> Option<String> {
    let pattern = format!(
        r#"Wicket\.Ajax\.ajax\(\{{"u":"([^"]*{}[^"]*)""#,
        regex::escape(keyword)
    );
    let re = Regex::new(&pattern).ok()?;
    re.captures(page_html).map(|c| unescape_script_url(&c[1]))
}

/// Parse a chart script into monthly returns.
///
/// Returns `None` unless the script looks like the heatmap chart, has both
/// axes and yields at least one in-range point.
pub(crate) fn parse_heatmap_script(script: &str) -> Option<MonthlyReturns> {
    let lowered = script.to_lowercase();
    let looks_like_heatmap = lowered.contains("heatmap")
        || lowered.contains("coloraxis")
        || lowered.contains("rendements mensuels");
    if !looks_like_heatmap {
        return None;
    }

    let months = X_CATEGORIES
        .captures(script)
        .or_else(|| X_SET_CATEGORIES.captures(script))
        .map(|c| split_quoted_values(&c[1]))?;
    let years = Y_CATEGORIES
        .captures(script)
        .or_else(|| Y_SET_CATEGORIES.captures(script))
        .map(|c| split_quoted_values(&c[1]))?;
    if months.is_empty() || years.is_empty() {
        return None;
    }

    let triples = POINT_TRIPLE
        .captures_iter(script)
        .map(|c| (c[1].to_string(), c[2].to_string(), c[3].to_string()));
    let objects = POINT_OBJECT
        .captures_iter(script)
        .map(|c| (c[1].to_string(), c[2].to_string(), c[3].to_string()));

    let values: Vec<MonthlyReturn> = triples
        .chain(objects)
        .filter_map(|(x, y, v)| {
            let x: usize = x.parse().ok()?;
            let y: usize = y.parse().ok()?;
            let return_pct: f64 = v.parse().ok()?;
            let month = months.get(x)?;
            let year = years.get(y)?;
            Some(MonthlyReturn {
                year: year.clone(),
                month: month.clone(),
                month_index: u32::try_from(x + 1).ok()?,
                return_pct,
            })
        })
        .collect();
    if values.is_empty() {
        return None;
    }

    Some(MonthlyReturns {
        months,
        years,
        values,
        source: HEATMAP_SOURCE.to_string(),
    })
}

fn split_quoted_values(list: &str) -> Vec<String> {
    QUOTED
        .captures_iter(list)
        .filter_map(|c| c.get(1).or_else(|| c.get(2)))
        .map(|m| m.as_str().to_string())
        .collect()
}
