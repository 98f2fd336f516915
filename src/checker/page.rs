// src/checker/page.rs
// =============================================================================
// Downloads the page whose links we are going to check.
//
// This is the one request that is allowed to fail the whole check: if we
// can't get the page, there are no links to look at. Anything other than a
// 2xx answer counts as a failure.
//
// Redirects are followed by reqwest itself here (Policy::limited). The URL
// we land on is kept for logging only: relative links are still resolved
// against the URL the caller asked for.
// =============================================================================

use crate::error::CheckError;
use reqwest::Client;
use tracing::debug;
use url::Url;

#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Where the page actually came from, after redirects (for logs)
    pub url: Url,
    pub html: String,
}

// Fetches a web page and returns its HTML content
pub async fn fetch_page(client: &Client, url: &Url) -> Result<FetchedPage, CheckError> {
    let fetch_error = |source: reqwest::Error| CheckError::PageFetch {
        url: url.to_string(),
        source,
    };

    let response = client.get(url.clone()).send().await.map_err(fetch_error)?;

    let status = response.status();
    if !status.is_success() {
        return Err(CheckError::PageStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let final_url = response.url().clone();
    if &final_url != url {
        debug!("Page {} redirected to {}", url, final_url);
    }

    let html = response.text().await.map_err(fetch_error)?;

    Ok(FetchedPage {
        url: final_url,
        html,
    })
}
