// src/checker/resolve.rs
// =============================================================================
// Turns raw href values into absolute URLs.
//
// The `url` crate implements the same resolution rules browsers use:
//   base = "https://example.com/blog/post"
//   "/docs"            -> https://example.com/docs
//   "../about"         -> https://example.com/about
//   "//cdn.example/x"  -> https://cdn.example/x   (inherits the base scheme)
//   "#top"             -> https://example.com/blog/post#top
//   "https://other.io" -> https://other.io/       (already absolute)
//
// Unlike the href filters used elsewhere, nothing is skipped here: every
// reference gets either a URL or a ResolveError, so every href on the page
// ends up with exactly one row in the report.
// =============================================================================

use thiserror::Error;
use url::Url;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Empty link reference")]
    Empty,

    #[error("Cannot resolve '{reference}': {source}")]
    Invalid {
        reference: String,
        #[source]
        source: url::ParseError,
    },
}

// An href paired with its resolution result
#[derive(Debug, Clone)]
pub struct ResolvedLink {
    pub original: String,
    pub address: Result<Url, ResolveError>,
}

// Resolves one reference against the page's base URL
pub fn resolve(base: &Url, reference: &str) -> Result<Url, ResolveError> {
    if reference.trim().is_empty() {
        return Err(ResolveError::Empty);
    }

    base.join(reference).map_err(|source| ResolveError::Invalid {
        reference: reference.to_string(),
        source,
    })
}

// Resolves every reference, keeping order and duplicates
pub fn resolve_all<I, S>(base: &Url, references: I) -> Vec<ResolvedLink>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    references
        .into_iter()
        .map(|reference| {
            let original = reference.into();
            let address = resolve(base, &original);
            ResolvedLink { original, address }
        })
        .collect()
}
