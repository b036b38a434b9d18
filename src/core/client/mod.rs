//! Public client surface + builder.
//! Endpoint defaults and header values live in `constants`.

mod constants;

pub(crate) use constants::{ACCEPT_JSON, ACCEPT_XML};

use crate::core::EtfError;
use constants::{ACCEPT_HTML, ACCEPT_LANGUAGE, DEFAULT_BASE_HOST, PROFILE_PATH, SEARCH_PATH, USER_AGENT};
use reqwest::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE as ACCEPT_LANGUAGE_HEADER, HeaderMap, HeaderValue};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Thin wrapper that holds a configured HTTP client, the site base URL and
/// the optional raw-response dump directory.
#[derive(Debug, Clone)]
pub struct JustEtfClient {
    http: Client,
    base_host: Url,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    debug_dir: Option<PathBuf>,
}

impl JustEtfClient {
    /// Create a new builder.
    pub fn builder() -> JustEtfClientBuilder {
        JustEtfClientBuilder::default()
    }

    /* -------- internal getters used by other modules -------- */

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    pub(crate) fn debug_dir(&self) -> Option<&Path> {
        self.debug_dir.as_deref()
    }

    /// The host every page and callback URL is resolved against.
    pub fn base_host(&self) -> &Url {
        &self.base_host
    }

    /// Profile page URL for one ISIN.
    ///
    /// # Errors
    ///
    /// Returns `EtfError::Url` if the base host cannot be joined with the profile path.
    pub fn profile_url(&self, isin: &str) -> Result<Url, EtfError> {
        let mut url = self.base_host.join(PROFILE_PATH)?;
        url.query_pairs_mut().append_pair("isin", isin);
        Ok(url)
    }

    /// Search page URL for one free-text query, restricted to ETFs.
    ///
    /// # Errors
    ///
    /// Returns `EtfError::Url` if the base host cannot be joined with the search path.
    pub fn search_url(&self, query: &str) -> Result<Url, EtfError> {
        let mut url = self.base_host.join(SEARCH_PATH)?;
        url.query_pairs_mut()
            .append_pair("query", query)
            .append_pair("search", "ETFS");
        Ok(url)
    }

    /// Value of the `Wicket-Ajax-BaseURL` header for a page URL: the page path
    /// relative to the host, with its query.
    pub(crate) fn wicket_base(&self, page: &Url) -> String {
        let path = page.path().trim_start_matches('/');
        match page.query() {
            Some(q) => format!("{path}?{q}"),
            None => path.to_string(),
        }
    }

    /// A copy of this client with an empty cookie jar.
    ///
    /// The site's AJAX callbacks are bound to the session that rendered the
    /// page, so each discovery query starts from a clean one.
    ///
    /// # Errors
    ///
    /// Returns `EtfError::Http` if the underlying HTTP client cannot be rebuilt.
    pub fn fresh_session(&self) -> Result<Self, EtfError> {
        let http = build_http(self.timeout, self.connect_timeout)?;
        Ok(Self {
            http,
            ..self.clone()
        })
    }
}

fn build_http(
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
) -> Result<Client, EtfError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
    headers.insert(ACCEPT_LANGUAGE_HEADER, HeaderValue::from_static(ACCEPT_LANGUAGE));
    headers.insert("x-requested-with", HeaderValue::from_static("XMLHttpRequest"));

    let mut httpb = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .cookie_store(true);

    if let Some(t) = timeout {
        httpb = httpb.timeout(t);
    }
    if let Some(ct) = connect_timeout {
        httpb = httpb.connect_timeout(ct);
    }

    Ok(httpb.build()?)
}

/* ----------------------- Builder ----------------------- */

#[derive(Default)]
pub struct JustEtfClientBuilder {
    base_host: Option<Url>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    debug_dir: Option<PathBuf>,
}

impl JustEtfClientBuilder {
    /// Override the site host (e.g. a mock server in tests).
    #[must_use]
    pub fn base_host(mut self, url: Url) -> Self {
        self.base_host = Some(url);
        self
    }

    /// Set a per-request timeout. Default: none.
    #[must_use]
    pub const fn timeout(mut self, dur: Duration) -> Self {
        self.timeout = Some(dur);
        self
    }

    /// Set a connect timeout. Default: none.
    #[must_use]
    pub const fn connect_timeout(mut self, dur: Duration) -> Self {
        self.connect_timeout = Some(dur);
        self
    }

    /// Dump every response body into this directory.
    #[must_use]
    pub fn debug_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.debug_dir = Some(dir.into());
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns `EtfError` if the default host cannot be parsed or the HTTP
    /// client cannot be constructed.
    pub fn build(self) -> Result<JustEtfClient, EtfError> {
        let base_host = match self.base_host {
            Some(u) => u,
            None => Url::parse(DEFAULT_BASE_HOST)?,
        };
        let http = build_http(self.timeout, self.connect_timeout)?;

        Ok(JustEtfClient {
            http,
            base_host,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            debug_dir: self.debug_dir,
        })
    }
}
