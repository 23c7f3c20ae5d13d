use anyhow::Result;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::open_context;
use crate::explore::{resolve_steps, ExplorationStatus, Explorer};
use crate::search::HybridSearch;

pub async fn run(query: &str, steps: Option<&str>, limit: Option<usize>) -> Result<()> {
    let ctx = open_context().await?;

    let steps = resolve_steps(steps, ctx.config.exploration.default_steps);
    let mut exploration = ctx.config.exploration.clone();
    if let Some(limit) = limit {
        exploration.round_limit = limit;
    }

    let hybrid = Arc::new(HybridSearch::with_config(
        Arc::clone(&ctx.store),
        Arc::clone(&ctx.embedder),
        &ctx.config.search,
    ));
    let explorer = Explorer::with_config(hybrid, &exploration);

    // Ctrl-C stops the loop at the next round boundary; the in-flight
    // round finishes and partial results are printed.
    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nStopping after the current round...");
            signal_token.cancel();
        }
    });

    let start = Instant::now();
    let outcome = explorer.run(query, steps, &cancel).await;

    info!(
        status = %outcome.status,
        rounds = outcome.rounds,
        results = outcome.hits.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Explore command completed"
    );

    println!(
        "Exploration {} after {} round(s): {} unique patents",
        outcome.status,
        outcome.rounds,
        outcome.hits.len()
    );
    if outcome.final_query != query {
        println!("Final query: {}", outcome.final_query);
    }
    println!();

    for (i, hit) in outcome.hits.iter().enumerate() {
        println!(
            "{}. {} [{}] (score: {:.4})",
            i + 1,
            hit.document.title,
            hit.patent_id(),
            hit.score
        );
    }

    if outcome.status == ExplorationStatus::Failed {
        if let Some(error) = outcome.error {
            warn!(error = %error, "Exploration aborted by retrieval failure");
            println!();
            return Err(error.into());
        }
    }

    Ok(())
}
