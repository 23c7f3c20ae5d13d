//! Iterative exploration: bounded multi-round retrieval where each round's
//! query is refined from the previous round's results.

mod refine;

pub use refine::{extract_refinement_terms, refine_query};

use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::ExplorationConfig;
use crate::error::RetrievalError;
use crate::patent::SearchHit;
use crate::search::Search;

/// Mutable state owned by a single exploration run. Never shared across
/// concurrent runs; dropped when the run terminates.
struct ExplorationState {
    current_query: String,
    round_index: usize,
    /// patent id -> best-known hit; the deduplication store
    accumulated: HashMap<String, SearchHit>,
    max_rounds: usize,
}

impl ExplorationState {
    fn new(initial_query: &str, max_rounds: usize) -> Self {
        Self {
            current_query: initial_query.to_string(),
            round_index: 0,
            accumulated: HashMap::new(),
            max_rounds,
        }
    }

    /// Merge one round's hits, keeping the strictly higher score on
    /// conflict. Returns the hits whose patent ids were not seen before.
    fn merge(&mut self, hits: Vec<SearchHit>) -> Vec<SearchHit> {
        let mut new_hits = Vec::new();

        for hit in hits {
            match self.accumulated.get(hit.patent_id()) {
                None => {
                    new_hits.push(hit.clone());
                    self.accumulated.insert(hit.patent_id().to_string(), hit);
                }
                Some(existing) if hit.score > existing.score => {
                    self.accumulated.insert(hit.patent_id().to_string(), hit);
                }
                Some(_) => {}
            }
        }

        new_hits
    }

    /// Accumulated hits ordered by descending score, patent id tie-break.
    fn into_ranked_hits(self) -> Vec<SearchHit> {
        let mut hits: Vec<SearchHit> = self.accumulated.into_values().collect();
        hits.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.patent_id().cmp(b.patent_id()))
        });
        hits
    }
}

/// How an exploration run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplorationStatus {
    /// A round produced no new patent ids; further rounds are wasted work
    Converged,
    /// The round budget ran out before convergence
    Exhausted,
    /// Cancelled between rounds
    Cancelled,
    /// A retrieval failure aborted the run
    Failed,
}

impl std::fmt::Display for ExplorationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Converged => write!(f, "converged"),
            Self::Exhausted => write!(f, "exhausted"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Terminal result of an exploration run. Partial hits are always
/// preserved, including on failure and cancellation.
pub struct ExplorationOutcome {
    pub status: ExplorationStatus,
    /// Rounds actually executed
    pub rounds: usize,
    /// The query as refined by the final round
    pub final_query: String,
    /// Accumulated hits, score descending, deduplicated by patent id
    pub hits: Vec<SearchHit>,
    /// The error that aborted a failed run
    pub error: Option<RetrievalError>,
}

/// Resolve a caller-supplied step count leniently: unparsable or
/// non-positive input falls back to the default rather than erroring.
pub fn resolve_steps(raw: Option<&str>, default: usize) -> usize {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|&n| n >= 1)
        .map(|n| n as usize)
        .unwrap_or(default)
}

/// Drives repeated hybrid searches, refining the query from each round's
/// new results until convergence, exhaustion, cancellation or failure.
///
/// Rounds are strictly sequential: each round's query depends on the
/// previous round's hits.
pub struct Explorer {
    search: Arc<dyn Search>,
    refine_top_k: usize,
    round_limit: usize,
}

impl Explorer {
    pub fn new(search: Arc<dyn Search>) -> Self {
        Self::with_config(search, &ExplorationConfig::default())
    }

    pub fn with_config(search: Arc<dyn Search>, config: &ExplorationConfig) -> Self {
        Self {
            search,
            refine_top_k: config.refine_top_k,
            round_limit: config.round_limit,
        }
    }

    /// Run one exploration. `steps` is clamped to at least one round.
    pub async fn run(
        &self,
        initial_query: &str,
        steps: usize,
        cancel: &CancellationToken,
    ) -> ExplorationOutcome {
        let max_rounds = steps.max(1);
        let mut state = ExplorationState::new(initial_query, max_rounds);
        let mut error = None;

        info!(
            query = initial_query,
            max_rounds, "Starting iterative exploration"
        );

        let status = loop {
            // Cancellation is honored between rounds; an in-flight round is
            // never interrupted.
            if cancel.is_cancelled() {
                warn!(round = state.round_index, "Exploration cancelled");
                break ExplorationStatus::Cancelled;
            }

            let hits = match self
                .search
                .search(&state.current_query, self.round_limit)
                .await
            {
                Ok(hits) => hits,
                Err(e) => {
                    warn!(
                        round = state.round_index,
                        error = %e,
                        "Exploration round failed; surfacing partial results"
                    );
                    error = Some(e);
                    break ExplorationStatus::Failed;
                }
            };

            let new_hits = state.merge(hits);
            state.round_index += 1;

            info!(
                round = state.round_index,
                new = new_hits.len(),
                total = state.accumulated.len(),
                query = state.current_query.as_str(),
                "Exploration round completed"
            );

            if new_hits.is_empty() {
                break ExplorationStatus::Converged;
            }

            if state.round_index == state.max_rounds {
                break ExplorationStatus::Exhausted;
            }

            let terms =
                extract_refinement_terms(&new_hits, self.refine_top_k, &state.current_query);
            state.current_query = refine_query(&state.current_query, &terms);
        };

        ExplorationOutcome {
            status,
            rounds: state.round_index,
            final_query: state.current_query.clone(),
            hits: state.into_ranked_hits(),
            error,
        }
    }
}
