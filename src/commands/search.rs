use anyhow::Result;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use super::{open_context, CommandContext};
use crate::patent::{SearchHit, SearchStrategy};
use crate::search::{HybridSearch, KeywordSearch, Search, SemanticSearch};

/// Abstract preview length in characters.
const PREVIEW_CHARS: usize = 150;

pub async fn run(query: &str, mode: &str, limit: Option<usize>) -> Result<()> {
    let ctx = open_context().await?;
    let limit = limit.unwrap_or(ctx.config.search.default_limit);

    let strategy = SearchStrategy::parse_lenient(mode);
    let engine = build_engine(&ctx, strategy);

    let start = Instant::now();
    let hits = engine.search(query, limit).await?;

    info!(
        search_type = %strategy,
        query = query,
        results = hits.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Search command completed"
    );

    if hits.is_empty() {
        println!("No results found for: {}", query);
        println!("\nMake sure you have ingested records with 'patentrag ingest <dir>'");
        return Ok(());
    }

    println!(
        "Found {} results for \"{}\" ({} search)\n",
        hits.len(),
        query,
        strategy
    );
    for (i, hit) in hits.iter().enumerate() {
        print_hit(i + 1, hit);
    }

    Ok(())
}

fn build_engine(ctx: &CommandContext, strategy: SearchStrategy) -> Arc<dyn Search> {
    match strategy {
        SearchStrategy::Keyword => Arc::new(KeywordSearch::new(Arc::clone(&ctx.store))),
        SearchStrategy::Semantic => Arc::new(SemanticSearch::new(
            Arc::clone(&ctx.store),
            Arc::clone(&ctx.embedder),
        )),
        SearchStrategy::Hybrid => Arc::new(HybridSearch::with_config(
            Arc::clone(&ctx.store),
            Arc::clone(&ctx.embedder),
            &ctx.config.search,
        )),
    }
}

fn print_hit(rank: usize, hit: &SearchHit) {
    let doc = &hit.document;
    let date = doc.publication_date.as_deref().unwrap_or("n/a");

    println!(
        "{}. {} [{}] (score: {:.4}, published: {})",
        rank, doc.title, doc.patent_id, hit.score, date
    );
    println!("   {}", preview(&doc.abstract_text, PREVIEW_CHARS));
    if let Some(pdf) = &doc.pdf_link {
        println!("   pdf: {}", pdf);
    }
    println!();
}

/// Character-safe truncation; never splits a multi-byte character.
fn preview(text: &str, max_chars: usize) -> String {
    let collapsed: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let truncated: String = collapsed.chars().take(max_chars).collect();
        format!("{}...", truncated.trim_end())
    }
}
