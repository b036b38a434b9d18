//! Centralized constants for default endpoints and request headers.

/// Desktop UA; the site serves a reduced page to unknown agents.
pub(crate) const USER_AGENT: &str = concat!(
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) ",
    "AppleWebKit/537.36 (KHTML, like Gecko) ",
    "Chrome/131.0.0.0 Safari/537.36"
);

/// Public justETF host. Every other URL is resolved against it.
pub(crate) const DEFAULT_BASE_HOST: &str = "https://www.justetf.com";

/// French profile page, keyed by `?isin=`. Extraction relies on the French labels.
pub(crate) const PROFILE_PATH: &str = "fr/etf-profile.html";

/// French search page, keyed by `?query=&search=ETFS`.
pub(crate) const SEARCH_PATH: &str = "fr/search.html";

pub(crate) const ACCEPT_LANGUAGE: &str = "fr-FR,fr;q=0.9,en;q=0.8";
pub(crate) const ACCEPT_HTML: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
pub(crate) const ACCEPT_XML: &str = "text/xml, application/xml, text/html, */*;q=0.01";
pub(crate) const ACCEPT_JSON: &str = "application/json, text/plain, */*";
