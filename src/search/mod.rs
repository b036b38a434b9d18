//! Ticker to ISIN discovery through the site's ETF search.
//!
//! One ticker goes through up to three sources, stopping at the first that
//! yields results:
//! - the quick-search AJAX panel (`html`)
//! - the server-side paged results table (`table`)
//! - plain profile links in the search page itself (`html`)

mod callbacks;
mod html;
mod table;

use std::collections::HashSet;

use reqwest::header::{ACCEPT, REFERER};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::core::client::ACCEPT_XML;
use crate::core::net;
use crate::core::text::extract_cdata_blocks;
use crate::{EtfError, JustEtfClient};

/// Default number of rows requested per results page.
pub const DEFAULT_PAGE_SIZE: u32 = 50;
/// Default cap on the number of results pages requested per ticker.
pub const DEFAULT_MAX_PAGES: u32 = 20;

/// One fund listed for a searched ticker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryRecord {
    /// The listing's ticker, or the searched ticker when the row has none.
    #[serde(rename = "tickers")]
    pub ticker: String,
    /// The fund's ISIN, upper-cased.
    pub isin: String,
    /// The fund's full display name.
    #[serde(rename = "nom_complet")]
    pub full_name: String,
}

/// Discovers the funds listed for one ticker with default paging.
///
/// # Errors
///
/// See [`DiscoverBuilder::fetch`].
pub async fn discover(client: &JustEtfClient, ticker: &str) -> Result<Vec<DiscoveryRecord>, EtfError> {
    DiscoverBuilder::new(client, ticker).fetch().await
}

/// A builder for one ticker's discovery query.
#[derive(Debug)]
pub struct DiscoverBuilder {
    client: JustEtfClient,
    ticker: String,
    page_size: u32,
    max_pages: u32,
}

impl DiscoverBuilder {
    /// Creates a new `DiscoverBuilder` for a given ticker.
    pub fn new(client: &JustEtfClient, ticker: impl Into<String>) -> Self {
        Self {
            client: client.clone(),
            ticker: ticker.into(),
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    /// Sets the number of rows requested per results page (at least 1).
    #[must_use]
    pub fn page_size(mut self, n: u32) -> Self {
        self.page_size = n.max(1);
        self
    }

    /// Sets the maximum number of results pages requested.
    #[must_use]
    pub const fn max_pages(mut self, n: u32) -> Self {
        self.max_pages = n;
        self
    }

    /// Runs the query.
    ///
    /// Zero results is not an error as long as the results table answered.
    ///
    /// # Errors
    ///
    /// Returns `EtfError` if the search page or a results page cannot be
    /// fetched, or the search page offers no way to list results.
    #[instrument(skip(self), fields(ticker = %self.ticker), err)]
    pub async fn fetch(self) -> Result<Vec<DiscoveryRecord>, EtfError> {
        let session = self.client.fresh_session()?;
        let ticker = self.ticker.as_str();
        let search_url = session.search_url(ticker)?;

        let req = session
            .http()
            .get(search_url.clone())
            .header(REFERER, session.base_host().as_str());
        let search_html = net::fetch_text(&session, req, &format!("{ticker}_search.html")).await?;

        if let Some(raw) = callbacks::find_quick_search_callback(&search_html) {
            let req = session
                .http()
                .post(search_url.join(&raw)?)
                .header(ACCEPT, ACCEPT_XML)
                .header(REFERER, search_url.as_str())
                .header("Wicket-Ajax", "true")
                .header("Wicket-Ajax-BaseURL", session.wicket_base(&search_url))
                .form(&[("query", ticker)]);
            let xml = net::fetch_text(&session, req, &format!("{ticker}_quicksearch.xml")).await?;

            let found = html::parse_quick_search(&extract_cdata_blocks(&xml), ticker);
            if !found.is_empty() {
                debug!(count = found.len(), "results from quick search");
                return Ok(found);
            }
        }

        let Some(raw) = callbacks::find_fetch_callback(&search_html) else {
            let found = html::parse_profile_links(&search_html, ticker);
            if found.is_empty() {
                return Err(EtfError::Extraction(
                    "fetchCallbackUrl not found in search page".into(),
                ));
            }
            info!(count = found.len(), "no results table; using profile links");
            return Ok(found);
        };
        let fetch_url = search_url.join(&raw)?;

        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for page in 0..self.max_pages {
            let rows = match table::fetch_page(
                &session,
                &fetch_url,
                &search_url,
                ticker,
                page,
                self.page_size,
            )
            .await
            {
                Ok(rows) => rows,
                Err(e) => {
                    let found = html::parse_profile_links(&search_html, ticker);
                    if found.is_empty() {
                        return Err(e);
                    }
                    warn!(page, "results table unavailable ({e}); using profile links");
                    return Ok(found);
                }
            };
            if rows.is_empty() {
                break;
            }

            let full_page = rows.len() >= self.page_size as usize;
            out.extend(
                rows.iter()
                    .filter_map(|row| table::record_from_row(row, ticker))
                    .filter(|rec| seen.insert(rec.isin.clone())),
            );
            debug!(page, rows = rows.len(), total = out.len(), "results page");
            if !full_page {
                break;
            }
        }

        Ok(out)
    }
}
