//! Core components shared by both pipelines:
//! - The HTTP [`JustEtfClient`] and its builder.
//! - The crate error type [`EtfError`].
//! - Internal request/response plumbing.

/// The HTTP client (`JustEtfClient`), builder, and endpoint constants.
pub mod client;
/// The primary error type (`EtfError`) for the crate.
pub mod error;
/// Text helpers shared by the HTML and AJAX extractors.
pub(crate) mod text;

pub(crate) mod net;

pub use client::{JustEtfClient, JustEtfClientBuilder};
pub use error::{ErrorKind, EtfError};
