// src/checker/mod.rs
// =============================================================================
// This module contains all link checking logic.
//
// Submodules, in the order a check runs through them:
// - page: downloads the page
// - html: pulls hrefs and <meta> tags out of it
// - resolve: turns each href into an absolute URL (or an error)
// - coordinator: probes all URLs concurrently, keeping page order
// - http: probes a single URL, following redirects by hand
// - report: the types that make up the final answer
//
// The Checker struct below ties them together. Build one per process and
// reuse it: it owns the HTTP clients and their connection pools.
// =============================================================================

mod coordinator;
mod html;
mod http;
mod page;
mod report;
mod resolve;

pub use report::{LinkReport, LinkStatus, ProbeOutcome};

use crate::config::CheckerConfig;
use crate::error::CheckError;
use reqwest::Client;
use tokio::time::{timeout_at, Instant};
use tracing::info;
use url::Url;

pub struct Checker {
    config: CheckerConfig,
    prober: http::Prober,
    page_client: Client,
}

impl Checker {
    pub fn new(config: CheckerConfig) -> Result<Self, CheckError> {
        let prober = http::Prober::new(&config)?;
        let page_client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()?;

        Ok(Self {
            config,
            prober,
            page_client,
        })
    }

    // Checks every link on the page at `page_url`.
    //
    // Broken links are reported inside the LinkReport. An Err means the page
    // itself could not be checked: bad URL, fetch failure, or the page did
    // not arrive within `page_timeout`. Links still being checked when that
    // deadline passes become "Error" rows instead of failing the page.
    pub async fn check_page(&self, page_url: &str) -> Result<LinkReport, CheckError> {
        let url = Url::parse(page_url).map_err(|source| CheckError::InvalidPageUrl {
            url: page_url.to_string(),
            source,
        })?;
        let deadline = Instant::now() + self.config.page_timeout;

        let page = timeout_at(deadline, page::fetch_page(&self.page_client, &url))
            .await
            .map_err(|_| CheckError::PageTimeout {
                url: url.to_string(),
                limit: self.config.page_timeout,
            })??;

        let extract = html::extract_page(&page.html);
        info!(
            "{}: {} link(s), {} meta tag(s)",
            page.url,
            extract.hrefs.len(),
            extract.meta_tags.len()
        );

        // Relative hrefs resolve against the URL we were asked for, even if
        // the page fetch was redirected somewhere else
        let links = resolve::resolve_all(&url, extract.hrefs);
        let outcomes =
            coordinator::probe_all(&self.prober, links, self.config.concurrency, deadline).await;

        Ok(LinkReport::assemble(outcomes, extract.meta_tags))
    }
}
