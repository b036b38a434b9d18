//! Fund profile pipeline: fetch one profile page per ISIN and extract a
//! [`FundProfile`].
//!
//! Internals are split into:
//! - `scrape`:  label-driven field extraction from the page HTML
//! - `returns`: monthly returns chart + CAGR enrichment (best effort)

mod returns;
mod scrape;

mod model;
pub use model::{CagrSource, FundData, FundProfile, MonthlyReturn, MonthlyReturns};

use tracing::{instrument, warn};

use crate::core::net;
use crate::{EtfError, JustEtfClient};

/// Loads the profile for one ISIN.
///
/// The monthly returns chart is fetched after the page; failing to get it
/// leaves the chart and CAGR empty rather than failing the profile.
///
/// # Errors
///
/// Returns `EtfError` if the page request fails, returns a non-2xx status,
/// or the page is not recognizable as a fund profile.
#[instrument(skip(client), err)]
pub async fn load_profile(client: &JustEtfClient, isin: &str) -> Result<FundProfile, EtfError> {
    let url = client.profile_url(isin)?;
    let req = client.http().get(url.clone());
    let body = net::fetch_text(client, req, &format!("{isin}_profile.html")).await?;

    let (mut profile, hints) = scrape::parse_profile_html(&body, isin)?;

    let chart = match returns::fetch_monthly_returns(client, isin, &url, &body).await {
        Ok(chart) => chart,
        Err(e) => {
            warn!(isin, "monthly returns unavailable: {e}");
            None
        }
    };
    returns::apply(&mut profile, chart, &hints, chrono::Local::now().date_naive());

    Ok(profile)
}

/// Extracts a profile from an already fetched page, without the returns enrichment.
///
/// Fields whose label is missing are left empty.
///
/// # Errors
///
/// Returns [`EtfError::Extraction`] if the body is empty or carries no fund name.
pub fn extract_profile(body: &str, isin: &str) -> Result<FundProfile, EtfError> {
    scrape::parse_profile_html(body, isin).map(|(profile, _)| profile)
}
