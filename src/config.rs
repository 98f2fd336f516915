// src/config.rs
// =============================================================================
// Tuning knobs for the link checker.
//
// The values come from command-line flags (see cli.rs), which in turn can be
// set through LINK_GUARDIAN_* environment variables. Library code only ever
// sees this plain struct, so tests can build one directly.
// =============================================================================

use std::time::Duration;

/// Redirect hops followed per probe before the last 3xx is reported as-is
pub const DEFAULT_MAX_REDIRECTS: usize = 5;

/// In-flight probes allowed at once
pub const DEFAULT_CONCURRENCY: usize = 50;

#[derive(Debug, Clone)]
pub struct CheckerConfig {
    /// Maximum number of links probed at the same time
    pub concurrency: usize,
    /// Bound on each single HTTP request (one redirect hop, or the page fetch)
    pub request_timeout: Duration,
    /// Bound on one whole probe, every redirect hop included
    pub probe_timeout: Duration,
    /// Bound on establishing a TCP/TLS connection
    pub connect_timeout: Duration,
    /// Redirect hops followed per link
    pub max_redirects: usize,
    /// Deadline for checking one whole page. The page fetch must finish in
    /// time; probes still running when it expires are reported as errors
    pub page_timeout: Duration,
    pub user_agent: String,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            request_timeout: Duration::from_secs(10),
            probe_timeout: Duration::from_secs(20),
            connect_timeout: Duration::from_secs(5),
            max_redirects: DEFAULT_MAX_REDIRECTS,
            page_timeout: Duration::from_secs(60),
            user_agent: format!("link-guardian/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}
