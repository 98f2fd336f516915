// src/checker/report.rs
// =============================================================================
// The data that comes out of a page check.
//
// - LinkStatus: what happened when we tried a link (tagged enum)
// - ProbeOutcome: one row of the report, one per href on the page
// - MetaEntry: a <meta> tag, passed through untouched
// - LinkReport: the final { linkStatuses, metaTags } document
//
// Inside the program a status is a proper enum. Only when we write JSON does
// it collapse into the wire shape: a number for HTTP responses, or the string
// "Error" when no response was obtained.
//
// Rust concepts:
// - Custom Serialize impls: control the JSON shape without changing the type
// - #[serde(rename_all = "camelCase")]: Rust field names -> JSON field names
// =============================================================================

use serde::{Serialize, Serializer};

// Represents the status of a link after checking
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkStatus {
    /// The server answered; holds the status code of the last response
    Http(u16),
    /// No response: connection refused, timeout, DNS, TLS, unsupported scheme
    NetworkFailure,
    /// The href could not be turned into an absolute URL
    Unresolved,
}

impl Serialize for LinkStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            LinkStatus::Http(code) => serializer.serialize_u16(*code),
            LinkStatus::NetworkFailure | LinkStatus::Unresolved => {
                serializer.serialize_str("Error")
            }
        }
    }
}

// The result of checking a single link
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeOutcome {
    /// The absolute URL probed, or the raw href when it could not be resolved
    pub link: String,
    pub status: LinkStatus,
    /// Whether the *requested* URL used https (redirect targets don't count)
    pub is_secure_transport: bool,
    pub redirect_loop_detected: bool,
    /// Optional message with more details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ProbeOutcome {
    // An href we could not resolve: report the raw string, since there is
    // no absolute URL to show
    pub fn unresolved(reference: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            link: reference.into(),
            status: LinkStatus::Unresolved,
            is_secure_transport: false,
            redirect_loop_detected: false,
            message: Some(reason.into()),
        }
    }

    // A probe that never got an HTTP response
    pub fn network_failure(address: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            link: address.into(),
            status: LinkStatus::NetworkFailure,
            is_secure_transport: false,
            redirect_loop_detected: false,
            message: Some(reason.into()),
        }
    }

    /// Helper method to check if the link is OK
    ///
    /// Returns true for 2xx/3xx responses that did not end in a redirect loop
    pub fn is_ok(&self) -> bool {
        match self.status {
            LinkStatus::Http(code) => code < 400 && !self.redirect_loop_detected,
            LinkStatus::NetworkFailure | LinkStatus::Unresolved => false,
        }
    }
}

// A <meta> tag from the page. Either field may be missing in the markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetaEntry {
    pub name: Option<String>,
    pub content: Option<String>,
}

// The full answer for one page
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkReport {
    pub link_statuses: Vec<ProbeOutcome>,
    pub meta_tags: Vec<MetaEntry>,
}

impl LinkReport {
    // Combines probe outcomes with the page's meta tags.
    // Both lists are kept exactly as given, order included.
    pub fn assemble(outcomes: Vec<ProbeOutcome>, meta_tags: Vec<MetaEntry>) -> Self {
        Self {
            link_statuses: outcomes,
            meta_tags,
        }
    }

    pub fn broken_count(&self) -> usize {
        self.link_statuses.iter().filter(|o| !o.is_ok()).count()
    }
}
