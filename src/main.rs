// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (tracing, to stderr)
// 3. Dispatch to the appropriate subcommand handler
// 4. Exit with proper code (0 = all links fine, 1 = broken links, 2 = error)
// =============================================================================

mod checker; // src/checker/ - fetching, resolving and probing links
mod cli; // src/cli.rs - command-line parsing
mod config; // src/config.rs - tuning knobs
mod error; // src/error.rs - page-level error types
mod server; // src/server.rs - the `serve` subcommand

use anyhow::{Context, Result};
use checker::{Checker, LinkReport, LinkStatus, ProbeOutcome};
use clap::Parser;
use cli::{Cli, Commands};
use config::CheckerConfig;
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = no broken links (or the server shut down cleanly)
//   Ok(1) = broken links found
//   Err   = the page could not be checked, or the server failed
async fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Check {
            page_url,
            json,
            tuning,
        } => handle_check(&page_url, json, tuning.to_config()).await,
        Commands::Serve { host, port, tuning } => {
            let checker =
                Checker::new(tuning.to_config()).context("Failed to set up link checker")?;
            server::run_server(SocketAddr::new(host, port), checker).await?;
            Ok(0)
        }
    }
}

// Logs go to stderr so `check --json` output on stdout stays machine-readable
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "link_guardian=debug,info"
    } else {
        "warn,link_guardian=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// Handles the 'check' subcommand
async fn handle_check(page_url: &str, json: bool, config: CheckerConfig) -> Result<i32> {
    let checker = Checker::new(config).context("Failed to set up link checker")?;

    if !json {
        println!("🔍 Checking links on: {}\n", page_url);
    }

    let report = checker.check_page(page_url).await?;

    print_results(&report, json)?;

    if report.broken_count() > 0 {
        Ok(1)
    } else {
        Ok(0)
    }
}

// Prints the report either as a table or JSON
fn print_results(report: &LinkReport, json: bool) -> Result<()> {
    if json {
        let json_output = serde_json::to_string_pretty(report)?;
        println!("{}", json_output);
    } else {
        print_table(report);
    }
    Ok(())
}

// Prints results as a human-readable table in the terminal
fn print_table(report: &LinkReport) {
    println!("{:<60} {:<16} {:<6} {:<30}", "URL", "STATUS", "HTTPS", "MESSAGE");
    println!("{}", "=".repeat(112));

    for outcome in &report.link_statuses {
        let message = outcome.message.as_deref().unwrap_or("");

        // Truncate URL if too long for display
        let url_display = if outcome.link.chars().count() > 57 {
            format!("{}...", outcome.link.chars().take(57).collect::<String>())
        } else {
            outcome.link.clone()
        };

        println!(
            "{:<60} {:<16} {:<6} {:<30}",
            url_display,
            format_status(outcome),
            if outcome.is_secure_transport { "yes" } else { "no" },
            message
        );
    }

    println!();

    let ok_count = report.link_statuses.len() - report.broken_count();
    let loop_count = report
        .link_statuses
        .iter()
        .filter(|o| o.redirect_loop_detected)
        .count();

    println!("📊 Summary:");
    println!("   ✅ OK: {}", ok_count);
    println!("   ❌ Broken: {}", report.broken_count());
    println!("   🔁 Redirect loops: {}", loop_count);
    println!("   📋 Total: {}", report.link_statuses.len());
    println!("   🏷️  Meta tags: {}", report.meta_tags.len());
}

fn format_status(outcome: &ProbeOutcome) -> String {
    match outcome.status {
        LinkStatus::Http(_) if outcome.redirect_loop_detected => "🔁 LOOP".to_string(),
        LinkStatus::Http(code) if code < 300 => format!("✅ {}", code),
        LinkStatus::Http(code) if code < 400 => format!("🔀 {}", code),
        LinkStatus::Http(code) => format!("❌ {}", code),
        LinkStatus::NetworkFailure => "⚠️  ERROR".to_string(),
        LinkStatus::Unresolved => "❓ UNRESOLVED".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(status: LinkStatus, redirect_loop: bool) -> ProbeOutcome {
        ProbeOutcome {
            link: "https://example.com/".to_string(),
            status,
            is_secure_transport: true,
            redirect_loop_detected: redirect_loop,
            message: None,
        }
    }

    #[test]
    fn test_format_status() {
        assert_eq!(format_status(&outcome(LinkStatus::Http(200), false)), "✅ 200");
        assert_eq!(format_status(&outcome(LinkStatus::Http(301), false)), "🔀 301");
        assert_eq!(format_status(&outcome(LinkStatus::Http(302), true)), "🔁 LOOP");
        assert_eq!(format_status(&outcome(LinkStatus::Http(500), false)), "❌ 500");
        assert_eq!(
            format_status(&outcome(LinkStatus::Unresolved, false)),
            "❓ UNRESOLVED"
        );
    }
}
