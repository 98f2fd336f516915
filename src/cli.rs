// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// clap is a popular Rust library for parsing command-line arguments.
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// The tuning flags (concurrency, timeouts, redirects) are shared by both
// subcommands through #[command(flatten)], and each one can also be set with
// a LINK_GUARDIAN_* environment variable.
// =============================================================================

use crate::config::{CheckerConfig, DEFAULT_CONCURRENCY, DEFAULT_MAX_REDIRECTS};
use clap::{Args, Parser, Subcommand};
use std::net::IpAddr;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "link-guardian",
    version,
    about = "Check every link on a web page",
    long_about = "link-guardian fetches a page, probes every link on it concurrently and reports \
                  the HTTP status, whether the link uses HTTPS, and whether it is stuck in a \
                  redirect loop. Run it once with `check`, or as a JSON API with `serve`."
)]
pub struct Cli {
    /// Show debug logs (RUST_LOG takes precedence when set)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check all links on one page and print the results
    ///
    /// Example: link-guardian check https://example.com --json
    Check {
        /// Page URL to check (e.g., https://example.com/blog/)
        page_url: String,

        /// Output the report as JSON instead of a table
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        tuning: TuningArgs,
    },

    /// Serve POST /check-links as a JSON API
    ///
    /// Example: link-guardian serve --port 5000
    Serve {
        /// Address to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: IpAddr,

        /// Port to listen on
        #[arg(long, default_value_t = 5000)]
        port: u16,

        #[command(flatten)]
        tuning: TuningArgs,
    },
}

#[derive(Args, Debug, Clone)]
pub struct TuningArgs {
    /// Maximum number of links probed at the same time
    #[arg(
        long,
        env = "LINK_GUARDIAN_CONCURRENCY",
        default_value_t = DEFAULT_CONCURRENCY,
        value_parser = parse_concurrency
    )]
    pub concurrency: usize,

    /// Per-request timeout in seconds
    #[arg(long, env = "LINK_GUARDIAN_TIMEOUT", default_value_t = 10)]
    pub timeout: u64,

    /// Bound in seconds on one whole link check, redirects included
    #[arg(long, env = "LINK_GUARDIAN_PROBE_TIMEOUT", default_value_t = 20)]
    pub probe_timeout: u64,

    /// Redirect hops followed per link
    #[arg(long, env = "LINK_GUARDIAN_MAX_REDIRECTS", default_value_t = DEFAULT_MAX_REDIRECTS)]
    pub max_redirects: usize,

    /// Deadline in seconds for checking one whole page
    #[arg(long, env = "LINK_GUARDIAN_PAGE_TIMEOUT", default_value_t = 60)]
    pub page_timeout: u64,
}

impl TuningArgs {
    pub fn to_config(&self) -> CheckerConfig {
        let request_timeout = Duration::from_secs(self.timeout);
        CheckerConfig {
            concurrency: self.concurrency,
            request_timeout,
            probe_timeout: Duration::from_secs(self.probe_timeout),
            connect_timeout: request_timeout / 2,
            max_redirects: self.max_redirects,
            page_timeout: Duration::from_secs(self.page_timeout),
            ..CheckerConfig::default()
        }
    }
}

fn parse_concurrency(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("concurrency must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}
