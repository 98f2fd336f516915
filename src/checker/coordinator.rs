// src/checker/coordinator.rs
// =============================================================================
// Probes every link of a page concurrently, with a cap on how many requests
// are in flight at once.
//
// How it works:
// 1. Tag each resolved link with its position on the page
// 2. Run up to `concurrency` probes at once with buffer_unordered()
// 3. As each probe finishes (in any order), drop its outcome into the slot
//    for its position
// 4. Read the slots back front to back, so the report follows page order
//
// Links that could not be resolved skip the network entirely and get an
// "Error" row straight away.
//
// The batch stops at `deadline`. Links still in flight then are dropped and
// reported as "Error" rows, so one slow link never costs the page its report.
//
// Cancellation comes for free: every probe is a future owned by the stream
// below. Dropping the stream (deadline reached, or the caller gave up on
// probe_all() because the client hung up) drops every in-flight request.
// =============================================================================

use crate::checker::http::Prober;
use crate::checker::report::ProbeOutcome;
use crate::checker::resolve::ResolvedLink;
use futures::stream::{self, StreamExt};
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, warn};

pub async fn probe_all(
    prober: &Prober,
    links: Vec<ResolvedLink>,
    concurrency: usize,
    deadline: Instant,
) -> Vec<ProbeOutcome> {
    let total = links.len();
    let mut slots: Vec<Option<ProbeOutcome>> = vec![None; total];
    // Absolute URL (or raw href) per position, for rows cut off by the deadline
    let mut labels = Vec::with_capacity(total);
    let mut pending = Vec::new();

    for (index, link) in links.into_iter().enumerate() {
        match link.address {
            Ok(address) => {
                labels.push(address.to_string());
                pending.push((index, address));
            }
            Err(e) => {
                labels.push(link.original.clone());
                slots[index] = Some(ProbeOutcome::unresolved(link.original, e.to_string()));
            }
        }
    }

    let mut finished = stream::iter(pending)
        .map(|(index, address)| async move { (index, prober.probe(&address).await) })
        .buffer_unordered(concurrency.max(1));

    loop {
        match timeout_at(deadline, finished.next()).await {
            Ok(Some((index, outcome))) => {
                debug!("[{}/{}] {} -> {:?}", index + 1, total, outcome.link, outcome.status);
                slots[index] = Some(outcome);
            }
            Ok(None) => break,
            Err(_) => {
                let unfinished = slots.iter().filter(|slot| slot.is_none()).count();
                warn!("Deadline reached with {} link(s) still in flight", unfinished);
                break;
            }
        }
    }
    drop(finished);

    let outcomes: Vec<ProbeOutcome> = slots
        .into_iter()
        .zip(labels)
        .map(|(slot, label)| {
            slot.unwrap_or_else(|| ProbeOutcome::network_failure(label, "Page deadline exceeded"))
        })
        .collect();
    info!(
        "Probed {} link(s), {} broken",
        outcomes.len(),
        outcomes.iter().filter(|o| !o.is_ok()).count()
    );
    outcomes
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. buffer_unordered vs buffered
//    - buffered(N) hands results back in input order, but a slow link at the
//      front holds up the queue behind it
//    - buffer_unordered(N) keeps N requests busy no matter which one is slow;
//      we restore the order ourselves with the index slots
//
// 2. Why Vec<Option<ProbeOutcome>>?
//    - We know how many results are coming, but not in which order
//    - Each slot starts as None and is filled exactly once by its own probe
//    - A slot still None at the deadline becomes an "Error" row
//
// 3. Why timeout_at and not timeout?
//    - The deadline is a fixed point in time shared with the page fetch, so
//      waiting on each next() with timeout_at never extends it
// -----------------------------------------------------------------------------
