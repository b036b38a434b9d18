//! justetf-rs: ETF profile and ticker-to-ISIN scraper for justETF.
//!
//! Two sequential pipelines share the same shape (load identifiers, fetch,
//! extract, write, report):
//! - ISIN to profile: [`profile::load_profile`] per ISIN, one JSON file each.
//! - Ticker to ISIN: [`search::discover`] per ticker, one aggregate JSON file.
//!
//! The `justetf-profiles` and `justetf-discover` binaries wrap them in [`cli`].

pub mod cli;
pub mod core;
pub mod input;
pub mod output;
pub mod profile;
pub mod runner;
pub mod search;

pub use core::{ErrorKind, EtfError, JustEtfClient, JustEtfClientBuilder};
pub use profile::{CagrSource, FundData, FundProfile, MonthlyReturn, MonthlyReturns, extract_profile, load_profile};
pub use runner::{ItemState, RunResult, RunStatus, Runner};
pub use search::{DiscoverBuilder, DiscoveryRecord, discover};
