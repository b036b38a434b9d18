//! Best-effort enrichment of a profile with its monthly returns chart and CAGR.

mod cagr;
mod heatmap;

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::header::{ACCEPT, REFERER};
use tracing::debug;
use url::Url;

use super::scrape::ReturnHints;
use super::{CagrSource, FundProfile, MonthlyReturns};
use crate::core::client::ACCEPT_XML;
use crate::core::net;
use crate::core::text::{extract_cdata_blocks, unescape_html};
use crate::{EtfError, JustEtfClient};

const MAX_TIMER_POLLS: u32 = 5;
const TIMER_POLL_INTERVAL: Duration = Duration::from_millis(350);
const TIMER_RESCHEDULED: &str = "Wicket.Timer.set(";
const VIEW_MODE_KEYWORD: &str = "returnsSection-viewMode";

/// Fetch the monthly returns chart for a profile page already downloaded.
///
/// The chart is rendered lazily: first by a timer callback the page schedules
/// on load, otherwise by switching the returns section to its chart view.
/// `Ok(None)` means the page offers neither or the chart could not be parsed.
pub(crate) async fn fetch_monthly_returns(
    client: &JustEtfClient,
    isin: &str,
    page_url: &Url,
    page_html: &str,
) -> Result<Option<MonthlyReturns>, EtfError> {
    let wicket_base = client.wicket_base(page_url);

    if let Some(raw) = heatmap::find_timer_callback(page_html) {
        let timer_url = page_url.join(&raw)?;
        for attempt in 1..=MAX_TIMER_POLLS {
            let req = client
                .http()
                .get(timer_url.clone())
                .header(ACCEPT, ACCEPT_XML)
                .header(REFERER, page_url.as_str())
                .header("Wicket-Ajax", "true")
                .header("Wicket-Ajax-BaseURL", wicket_base.as_str());
            let xml =
                net::fetch_text(client, req, &format!("{isin}_timer_attempt_{attempt}.xml")).await?;
            let cdata = unescape_html(&extract_cdata_blocks(&xml));

            if let Some(chart) = heatmap::parse_heatmap_script(&cdata) {
                debug!(isin, attempt, "monthly returns found via timer callback");
                return Ok(Some(chart));
            }
            if !cdata.contains(TIMER_RESCHEDULED) || attempt == MAX_TIMER_POLLS {
                break;
            }
            tokio::time::sleep(TIMER_POLL_INTERVAL).await;
        }
    }

    let Some(raw) = heatmap::find_ajax_callback(page_html, VIEW_MODE_KEYWORD) else {
        debug!(isin, "no returns chart callback on page");
        return Ok(None);
    };
    let view_mode_url = page_url.join(&raw)?;
    let req = client
        .http()
        .post(view_mode_url)
        .header(ACCEPT, ACCEPT_XML)
        .header(REFERER, page_url.as_str())
        .header("Wicket-Ajax", "true")
        .header("Wicket-Ajax-BaseURL", wicket_base.as_str())
        .form(&[("returnsSection:viewMode", "CHART")]);
    let xml = net::fetch_text(client, req, &format!("{isin}_returns_viewmode.xml")).await?;
    let cdata = unescape_html(&extract_cdata_blocks(&xml));

    let chart = heatmap::parse_heatmap_script(&cdata);
    debug!(isin, found = chart.is_some(), "returns chart view requested");
    Ok(chart)
}

/// Attach the chart and the CAGR derived from it (or from the hints) to `profile`.
pub(crate) fn apply(
    profile: &mut FundProfile,
    chart: Option<MonthlyReturns>,
    hints: &ReturnHints,
    today: NaiveDate,
) {
    let from_chart = chart
        .as_ref()
        .and_then(cagr::cagr_from_monthly_returns)
        .map(|v| (v, CagrSource::MonthlyReturns));
    let cagr = from_chart.or_else(|| {
        cagr::cagr_from_max_return(
            hints.max_return_text.as_deref(),
            hints.launch_date_text.as_deref(),
            today,
        )
        .map(|v| (v, CagrSource::MaxReturnAndLaunchDate))
    });

    profile.monthly_returns = chart;
    if let Some((value, source)) = cagr {
        profile.cagr_since_inception_pct = Some(cagr::round6(value));
        profile.cagr_source = Some(source);
    }
}
