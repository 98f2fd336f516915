// src/error.rs
// =============================================================================
// Error types for page-level failures.
//
// There are two very different kinds of failure in this tool:
// - A single link on the page is broken. That is NOT an error here; it is
//   recorded inside the report (see checker::report::LinkStatus).
// - The page itself could not be fetched. Then there is nothing to check,
//   so the whole request fails with a CheckError.
//
// Rust concepts:
// - thiserror: Derives Display and std::error::Error from attributes
// - #[from]: Lets the ? operator convert a source error automatically
// =============================================================================

use std::time::Duration;
use thiserror::Error;

// Everything that can make a whole page check fail
#[derive(Error, Debug)]
pub enum CheckError {
    /// The page address given by the caller is not an absolute URL
    #[error("Invalid page URL '{url}': {source}")]
    InvalidPageUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The page request failed at the transport level (DNS, connect, TLS, ...)
    #[error("Failed to fetch page {url}: {source}")]
    PageFetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The page answered, but not with a 2xx status
    #[error("Page {url} returned HTTP {status}")]
    PageStatus { url: String, status: u16 },

    /// The whole check (page fetch + every probe) ran past its deadline
    #[error("Checking {url} did not finish within {}s", .limit.as_secs())]
    PageTimeout { url: String, limit: Duration },

    /// The HTTP client could not be constructed
    #[error("Failed to create HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
