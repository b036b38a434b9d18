//! Sequential batch runner shared by both pipelines.
//!
//! Identifiers are processed one at a time in input order. A failure is
//! recorded against its identifier and never stops the batch.

use std::path::PathBuf;
use std::time::Duration;

use tracing::{error, info};

use crate::output::{ArtifactWriter, ErrorEntries};
use crate::profile::{self, FundProfile};
use crate::search::{DEFAULT_MAX_PAGES, DEFAULT_PAGE_SIZE, DiscoverBuilder, DiscoveryRecord};
use crate::{EtfError, JustEtfClient};

/// Per-identifier work unit: fetch, extract and (for profiles) persist.
#[allow(async_fn_in_trait)]
pub trait Pipeline {
    /// What a successful identifier yields.
    type Output;

    /// The URL logged when an identifier starts, if any.
    fn target(&self, _id: &str) -> Option<String> {
        None
    }

    /// Processes one identifier.
    async fn process(&mut self, id: &str) -> Result<Self::Output, EtfError>;

    /// One-line summary of a success, logged after `OK -> `.
    fn describe(&self, output: &Self::Output) -> String;
}

/// Lifecycle of one identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemState {
    /// Not reached yet.
    Pending,
    /// Currently being fetched.
    InProgress,
    /// Fetched, extracted and (for profiles) written.
    Succeeded,
    /// Recorded in the run's error entries.
    Failed,
}

/// Overall outcome of an invocation, mapped onto the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every identifier succeeded.
    Success,
    /// The identifier list could not be loaded; nothing was fetched.
    InputError,
    /// At least one identifier (or an aggregate artifact) failed.
    PartialFailure,
}

impl RunStatus {
    /// Process exit code: 0, 1 or 2.
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::InputError => 1,
            Self::PartialFailure => 2,
        }
    }
}

/// Accumulated outcomes of one run.
#[derive(Debug)]
pub struct RunResult<T> {
    /// Every input identifier with its final state, in input order.
    pub items: Vec<(String, ItemState)>,
    /// Successful identifiers and their outputs, in input order.
    pub successes: Vec<(String, T)>,
    /// Failed identifiers and their messages, in input order.
    pub errors: ErrorEntries,
}

impl<T> RunResult<T> {
    fn new(ids: &[String]) -> Self {
        Self {
            items: ids.iter().map(|id| (id.clone(), ItemState::Pending)).collect(),
            successes: Vec::new(),
            errors: ErrorEntries::new(),
        }
    }

    /// [`RunStatus::PartialFailure`] as soon as one identifier failed.
    pub fn status(&self) -> RunStatus {
        if self.errors.is_empty() {
            RunStatus::Success
        } else {
            RunStatus::PartialFailure
        }
    }
}

/// Drives a [`Pipeline`] over a list of identifiers.
#[derive(Debug, Clone, Copy)]
pub struct Runner {
    delay: Duration,
}

impl Runner {
    /// `delay` is slept between consecutive identifiers, never after the last.
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Processes `ids` in order and collects every outcome.
    pub async fn run<P: Pipeline>(&self, pipeline: &mut P, ids: &[String]) -> RunResult<P::Output> {
        let mut result = RunResult::new(ids);
        let total = ids.len();

        for (idx, id) in ids.iter().enumerate() {
            result.items[idx].1 = ItemState::InProgress;
            match pipeline.target(id) {
                Some(url) => info!("[{}/{total}] {id} -> {url}", idx + 1),
                None => info!("[{}/{total}] {id}", idx + 1),
            }

            match pipeline.process(id).await {
                Ok(output) => {
                    info!("  OK -> {}", pipeline.describe(&output));
                    result.items[idx].1 = ItemState::Succeeded;
                    result.successes.push((id.clone(), output));
                }
                Err(e) => {
                    error!(kind = ?e.kind(), "  ERROR -> {e}");
                    result.items[idx].1 = ItemState::Failed;
                    result.errors.push(id.clone(), e.to_string());
                }
            }

            if idx + 1 < total && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
        }

        result
    }
}

/// ISIN to profile: fetch, extract, then write `<ISIN>.json` right away.
#[derive(Debug)]
pub struct ProfilePipeline {
    client: JustEtfClient,
    writer: ArtifactWriter,
}

impl ProfilePipeline {
    pub fn new(client: JustEtfClient, writer: ArtifactWriter) -> Self {
        Self { client, writer }
    }

    pub fn writer(&self) -> &ArtifactWriter {
        &self.writer
    }
}

impl Pipeline for ProfilePipeline {
    type Output = PathBuf;

    fn target(&self, id: &str) -> Option<String> {
        self.client.profile_url(id).ok().map(String::from)
    }

    async fn process(&mut self, id: &str) -> Result<PathBuf, EtfError> {
        let profile: FundProfile = profile::load_profile(&self.client, id).await?;
        self.writer.write_profile(&profile)
    }

    fn describe(&self, output: &PathBuf) -> String {
        output.display().to_string()
    }
}

/// Ticker to ISIN: one discovery query per ticker, results kept in memory.
#[derive(Debug)]
pub struct DiscoveryPipeline {
    client: JustEtfClient,
    page_size: u32,
    max_pages: u32,
}

impl DiscoveryPipeline {
    pub fn new(client: JustEtfClient) -> Self {
        Self {
            client,
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    #[must_use]
    pub const fn page_size(mut self, n: u32) -> Self {
        self.page_size = n;
        self
    }

    #[must_use]
    pub const fn max_pages(mut self, n: u32) -> Self {
        self.max_pages = n;
        self
    }
}

impl Pipeline for DiscoveryPipeline {
    type Output = Vec<DiscoveryRecord>;

    fn target(&self, id: &str) -> Option<String> {
        self.client.search_url(id).ok().map(String::from)
    }

    async fn process(&mut self, id: &str) -> Result<Vec<DiscoveryRecord>, EtfError> {
        DiscoverBuilder::new(&self.client, id)
            .page_size(self.page_size)
            .max_pages(self.max_pages)
            .fetch()
            .await
    }

    fn describe(&self, output: &Vec<DiscoveryRecord>) -> String {
        format!("{} result(s)", output.len())
    }
}
