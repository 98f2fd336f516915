// src/checker/http.rs
// =============================================================================
// This module checks if URLs are alive by making HTTP requests.
//
// Key functionality:
// - Makes HTTP GET requests with the client's automatic redirects turned OFF
// - Follows redirects by hand, remembering every URL visited, so that a
//   loop (A -> B -> A) is spotted instead of bouncing until the hop limit
// - Reports the status code of the last response, whatever it is (a 404 is a
//   perfectly good answer, not a failure of the probe)
// - Turns transport failures (timeout, DNS, refused, TLS) into an "Error" row
//
// Rust concepts:
// - async/await: For concurrent network I/O
// - Owned state: each probe has its own RedirectChain, nothing is shared
// - Early return: every exit of the redirect loop builds its own outcome
// =============================================================================

use crate::checker::report::{LinkStatus, ProbeOutcome};
use crate::config::CheckerConfig;
use crate::error::CheckError;
use reqwest::header::LOCATION;
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::debug;
use url::Url;

// The URLs one probe has visited, starting with the URL it was asked for
#[derive(Debug)]
struct RedirectChain {
    visited: Vec<Url>,
}

impl RedirectChain {
    fn new(start: Url) -> Self {
        Self {
            visited: vec![start],
        }
    }

    // Records a redirect target. Returns false if we have been there before.
    fn visit(&mut self, target: &Url) -> bool {
        if self.visited.contains(target) {
            return false;
        }
        self.visited.push(target.clone());
        true
    }

    // Number of redirects followed so far
    fn hops(&self) -> usize {
        self.visited.len() - 1
    }

    // Builds the outcome once a response ends the chain.
    // Link and HTTPS flag both come from the first URL, wherever we ended up.
    fn outcome(&self, status: u16, redirect_loop: bool, message: Option<String>) -> ProbeOutcome {
        let origin = &self.visited[0];
        ProbeOutcome {
            link: origin.to_string(),
            status: LinkStatus::Http(status),
            is_secure_transport: is_secure_transport(origin),
            redirect_loop_detected: redirect_loop,
            message,
        }
    }
}

// Probes links one at a time; cheap to share behind a reference
#[derive(Debug, Clone)]
pub struct Prober {
    client: Client,
    max_redirects: usize,
    probe_timeout: Duration,
}

impl Prober {
    // Create an HTTP client with reasonable settings
    // We'll reuse this client for all requests (connection pooling)
    pub fn new(config: &CheckerConfig) -> Result<Self, CheckError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            max_redirects: config.max_redirects,
            probe_timeout: config.probe_timeout,
        })
    }

    // Checks a single absolute URL.
    //
    // Never fails: every problem is described by the returned outcome.
    // Each request has its own timeout, and the whole redirect chain is
    // bounded by `probe_timeout` on top of that.
    pub async fn probe(&self, address: &Url) -> ProbeOutcome {
        if !matches!(address.scheme(), "http" | "https") {
            return ProbeOutcome::network_failure(
                address.as_str(),
                format!("Unsupported scheme '{}'", address.scheme()),
            );
        }

        match tokio::time::timeout(self.probe_timeout, self.follow(address)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                debug!("Checking {} ran past {:?}", address, self.probe_timeout);
                ProbeOutcome::network_failure(
                    address.as_str(),
                    format!("Gave up after {:?}", self.probe_timeout),
                )
            }
        }
    }

    // The redirect loop: one GET per hop until a response ends the chain
    async fn follow(&self, address: &Url) -> ProbeOutcome {
        let mut chain = RedirectChain::new(address.clone());
        let mut current = address.clone();

        loop {
            debug!("GET {} (hop {})", current, chain.hops());

            let response = match self.client.get(current.clone()).send().await {
                Ok(response) => response,
                Err(e) => {
                    let reason = categorize_error(&e);
                    debug!("Probe of {} failed: {}", address, e);
                    return ProbeOutcome::network_failure(address.as_str(), reason);
                }
            };

            let status = response.status().as_u16();
            if !response.status().is_redirection() {
                return chain.outcome(status, false, None);
            }

            let target = match redirect_target(&current, &response) {
                Some(target) => target,
                // A 3xx without a usable Location (304, or a broken header)
                None => return chain.outcome(status, false, None),
            };

            if !chain.visit(&target) {
                debug!("Redirect loop on {}: {} was already visited", address, target);
                return chain.outcome(
                    status,
                    true,
                    Some(format!("HTTP {} -> {} (redirect loop)", status, target)),
                );
            }

            if chain.hops() > self.max_redirects {
                return chain.outcome(
                    status,
                    false,
                    Some(format!(
                        "HTTP {} -> {} (stopped after {} redirects)",
                        status, target, self.max_redirects
                    )),
                );
            }

            current = target;
        }
    }
}

// True when the URL uses the encrypted variant of HTTP
pub fn is_secure_transport(address: &Url) -> bool {
    address.scheme() == "https"
}

// Reads the Location header and resolves it against the URL that sent it
// (servers often answer with a relative path like "/login")
fn redirect_target(current: &Url, response: &Response) -> Option<Url> {
    let location = response.headers().get(LOCATION)?.to_str().ok()?;
    current.join(location).ok()
}

// Categorizes different error types from reqwest
//
// reqwest errors can happen for many reasons:
// - Network timeout
// - DNS resolution failure
// - SSL certificate issues
// - etc.
fn categorize_error(error: &reqwest::Error) -> String {
    // Convert error to string once; the Debug form carries the source chain
    let error_string = format!("{:?}", error).to_lowercase();

    if error.is_timeout() {
        "Request timed out".to_string()
    } else if error.is_connect() {
        if error_string.contains("dns") {
            "Could not resolve hostname".to_string()
        } else if error_string.contains("certificate") || error_string.contains("tls") {
            "SSL certificate error".to_string()
        } else {
            "Connection failed".to_string()
        }
    } else if error_string.contains("certificate") || error_string.contains("ssl") {
        "SSL certificate error".to_string()
    } else {
        error.to_string()
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why turn off reqwest's own redirect following?
//    - Policy::limited(5) would follow redirects for us, but it only tells
//      us "too many redirects" at the end
//    - Doing it by hand lets us look at every Location header and stop the
//      moment a URL comes back a second time
//
// 2. Why does probe() return ProbeOutcome and not Result?
//    - A dead link is a normal answer for a link checker
//    - Returning a value (not an error) means one bad link can never cancel
//      the checks of the other links on the page
//
// 3. Why two timeouts?
//    - request_timeout bounds each single GET
//    - A chain of slow-but-not-too-slow redirects could still add up, so
//      probe_timeout bounds the whole chain and turns it into an "Error" row
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn test_prober() -> Prober {
        let config = CheckerConfig {
            request_timeout: Duration::from_millis(500),
            connect_timeout: Duration::from_millis(500),
            ..CheckerConfig::default()
        };
        Prober::new(&config).unwrap()
    }

    fn url(server: &MockServer, p: &str) -> Url {
        Url::parse(&format!("{}{}", server.uri(), p)).unwrap()
    }

    #[test]
    fn test_secure_transport_is_scheme_based() {
        assert!(is_secure_transport(&Url::parse("https://a.example/x").unwrap()));
        assert!(!is_secure_transport(&Url::parse("http://a.example/x").unwrap()));
        assert!(!is_secure_transport(&Url::parse("ftp://a.example/x").unwrap()));
    }

    #[test]
    fn test_redirect_chain_detects_revisit() {
        let a = Url::parse("http://a.example/").unwrap();
        let b = Url::parse("http://b.example/").unwrap();

        let mut chain = RedirectChain::new(a.clone());
        assert_eq!(chain.hops(), 0);
        assert!(chain.visit(&b));
        assert_eq!(chain.hops(), 1);
        assert!(!chain.visit(&a));
        assert!(!chain.visit(&b));
    }

    #[test]
    fn test_secure_flag_follows_requested_url_across_scheme_change() {
        let mut downgraded = RedirectChain::new(Url::parse("https://a.example/x").unwrap());
        assert!(downgraded.visit(&Url::parse("http://a.example/y").unwrap()));
        let outcome = downgraded.outcome(200, false, None);
        assert!(outcome.is_secure_transport);
        assert_eq!(outcome.link, "https://a.example/x");

        let mut upgraded = RedirectChain::new(Url::parse("http://a.example/x").unwrap());
        assert!(upgraded.visit(&Url::parse("https://a.example/x").unwrap()));
        let outcome = upgraded.outcome(200, false, None);
        assert!(!outcome.is_secure_transport);
        assert_eq!(outcome.link, "http://a.example/x");
    }

    #[tokio::test]
    async fn test_link_ok() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ok"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let outcome = test_prober().probe(&url(&server, "/ok")).await;

        assert_eq!(outcome.status, LinkStatus::Http(200));
        assert_eq!(outcome.link, url(&server, "/ok").to_string());
        assert!(!outcome.is_secure_transport);
        assert!(!outcome.redirect_loop_detected);
        assert_eq!(outcome.message, None);
    }

    #[tokio::test]
    async fn test_link_404_is_not_a_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let outcome = test_prober().probe(&url(&server, "/missing")).await;

        assert_eq!(outcome.status, LinkStatus::Http(404));
        assert!(!outcome.redirect_loop_detected);
    }

    #[tokio::test]
    async fn test_link_follows_redirect_to_final_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/old"))
            .respond_with(ResponseTemplate::new(301).insert_header("location", "/new"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/new"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let outcome = test_prober().probe(&url(&server, "/old")).await;

        assert_eq!(outcome.status, LinkStatus::Http(200));
        assert_eq!(outcome.link, url(&server, "/old").to_string());
        assert!(!outcome.redirect_loop_detected);
    }

    #[tokio::test]
    async fn test_link_detects_redirect_loop() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/a"))
            .respond_with(
                ResponseTemplate::new(302).insert_header("location", format!("{}/b", server.uri())),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/b"))
            .respond_with(ResponseTemplate::new(302).insert_header("location", "/a"))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = test_prober().probe(&url(&server, "/a")).await;

        assert!(outcome.redirect_loop_detected);
        assert_eq!(outcome.status, LinkStatus::Http(302));
        assert_eq!(outcome.link, url(&server, "/a").to_string());
    }

    #[tokio::test]
    async fn test_link_stops_at_redirect_limit() {
        let server = MockServer::start().await;
        for i in 0..10 {
            Mock::given(method("GET"))
                .and(path(format!("/r{}", i)))
                .respond_with(
                    ResponseTemplate::new(302).insert_header("location", format!("/r{}", i + 1)),
                )
                .mount(&server)
                .await;
        }

        let outcome = test_prober().probe(&url(&server, "/r0")).await;

        // /r0 plus five followed hops, then the sixth 3xx is reported as-is
        assert_eq!(outcome.status, LinkStatus::Http(302));
        assert!(!outcome.redirect_loop_detected);
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 6);
    }

    #[tokio::test]
    async fn test_link_redirect_without_location() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/nowhere"))
            .respond_with(ResponseTemplate::new(302))
            .mount(&server)
            .await;

        let outcome = test_prober().probe(&url(&server, "/nowhere")).await;

        assert_eq!(outcome.status, LinkStatus::Http(302));
        assert!(!outcome.redirect_loop_detected);
    }

    #[tokio::test]
    async fn test_link_timeout_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/hang"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let outcome = test_prober().probe(&url(&server, "/hang")).await;

        assert_eq!(outcome.status, LinkStatus::NetworkFailure);
        assert_eq!(outcome.message.as_deref(), Some("Request timed out"));
        assert!(!outcome.is_secure_transport);
        assert!(!outcome.redirect_loop_detected);
    }

    #[tokio::test]
    async fn test_slow_redirect_chain_is_bounded_as_a_whole() {
        let server = MockServer::start().await;
        for i in 0..6 {
            Mock::given(method("GET"))
                .and(path(format!("/s{}", i)))
                .respond_with(
                    ResponseTemplate::new(302)
                        .insert_header("location", format!("/s{}", i + 1))
                        .set_delay(Duration::from_millis(300)),
                )
                .mount(&server)
                .await;
        }
        // Every hop fits in request_timeout; the chain as a whole does not
        let config = CheckerConfig {
            request_timeout: Duration::from_millis(500),
            connect_timeout: Duration::from_millis(500),
            probe_timeout: Duration::from_secs(1),
            ..CheckerConfig::default()
        };
        let prober = Prober::new(&config).unwrap();

        let started = Instant::now();
        let outcome = prober.probe(&url(&server, "/s0")).await;

        assert_eq!(outcome.status, LinkStatus::NetworkFailure);
        assert_eq!(outcome.link, url(&server, "/s0").to_string());
        assert_eq!(outcome.message.as_deref(), Some("Gave up after 1s"));
        assert!(started.elapsed() < Duration::from_millis(1500));
    }

    #[tokio::test]
    async fn test_link_connection_refused() {
        // Grab a free port, then close it so nothing is listening
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let address = Url::parse(&format!("http://127.0.0.1:{}/", port)).unwrap();
        let outcome = test_prober().probe(&address).await;

        assert_eq!(outcome.status, LinkStatus::NetworkFailure);
        assert_eq!(outcome.link, address.to_string());
    }

    #[tokio::test]
    async fn test_link_unsupported_scheme() {
        let address = Url::parse("mailto:someone@example.com").unwrap();
        let outcome = test_prober().probe(&address).await;

        assert_eq!(outcome.status, LinkStatus::NetworkFailure);
        assert_eq!(outcome.link, "mailto:someone@example.com");
    }
}
