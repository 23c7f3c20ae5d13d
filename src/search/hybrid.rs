//! Hybrid search fusing lexical relevance and vector similarity.
//!
//! Raw BM25 and similarity scores are not comparable, so each list is
//! min-max normalized before the weighted combination.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use super::keyword::KeywordSearch;
use super::semantic::SemanticSearch;
use super::traits::Search;
use crate::config::SearchConfig;
use crate::embeddings::EmbeddingProvider;
use crate::error::RetrievalError;
use crate::patent::{SearchHit, SearchStrategy};
use crate::storage::IndexStore;

/// Default weight for either leg when unconfigured.
const DEFAULT_WEIGHT: f32 = 0.5;

/// Weighted combination of min-max normalized score lists.
///
/// A candidate present in only one list gets a zero contribution from the
/// missing strategy. Ties on the combined score break by raw keyword score
/// descending, then patent id ascending, so the ordering is deterministic.
pub struct ScoreFusion {
    keyword_weight: f32,
    semantic_weight: f32,
}

struct FusedCandidate {
    hit: SearchHit,
    norm_keyword: f32,
    norm_semantic: f32,
    raw_keyword: f32,
}

impl ScoreFusion {
    pub fn new(keyword_weight: f32, semantic_weight: f32) -> Self {
        Self {
            keyword_weight,
            semantic_weight,
        }
    }

    pub fn weights(&self) -> (f32, f32) {
        (self.keyword_weight, self.semantic_weight)
    }

    /// Fuse the two ranked lists into one deduplicated ordering.
    pub fn fuse(
        &self,
        keyword: Vec<SearchHit>,
        semantic: Vec<SearchHit>,
        limit: usize,
    ) -> Vec<SearchHit> {
        let keyword_norms = min_max_normalize(&keyword);
        let semantic_norms = min_max_normalize(&semantic);

        let mut candidates: HashMap<String, FusedCandidate> = HashMap::new();

        for (hit, norm) in keyword.into_iter().zip(keyword_norms) {
            let raw = hit.score;
            candidates
                .entry(hit.patent_id().to_string())
                .and_modify(|c| {
                    if norm > c.norm_keyword {
                        c.norm_keyword = norm;
                        c.raw_keyword = raw;
                    }
                })
                .or_insert(FusedCandidate {
                    hit,
                    norm_keyword: norm,
                    norm_semantic: 0.0,
                    raw_keyword: raw,
                });
        }

        for (hit, norm) in semantic.into_iter().zip(semantic_norms) {
            candidates
                .entry(hit.patent_id().to_string())
                .and_modify(|c| {
                    if norm > c.norm_semantic {
                        c.norm_semantic = norm;
                    }
                })
                .or_insert(FusedCandidate {
                    hit,
                    norm_keyword: 0.0,
                    norm_semantic: norm,
                    raw_keyword: 0.0,
                });
        }

        let mut fused: Vec<(f32, f32, SearchHit)> = candidates
            .into_values()
            .map(|c| {
                let combined = self.keyword_weight * c.norm_keyword
                    + self.semantic_weight * c.norm_semantic;
                (combined, c.raw_keyword, c.hit)
            })
            .collect();

        fused.sort_by(|a, b| {
            b.0.total_cmp(&a.0)
                .then_with(|| b.1.total_cmp(&a.1))
                .then_with(|| a.2.patent_id().cmp(b.2.patent_id()))
        });

        fused
            .into_iter()
            .take(limit)
            .map(|(combined, _, mut hit)| {
                hit.score = combined;
                hit.strategy = SearchStrategy::Hybrid;
                hit
            })
            .collect()
    }
}

impl Default for ScoreFusion {
    fn default() -> Self {
        Self::new(DEFAULT_WEIGHT, DEFAULT_WEIGHT)
    }
}

/// Min-max normalize scores within one list to [0, 1].
///
/// A list with a flat score range (including a single hit) normalizes to
/// 1.0 for every entry: presence in the list is full credit.
fn min_max_normalize(hits: &[SearchHit]) -> Vec<f32> {
    if hits.is_empty() {
        return Vec::new();
    }

    let min = hits.iter().map(|h| h.score).fold(f32::INFINITY, f32::min);
    let max = hits.iter().map(|h| h.score).fold(f32::NEG_INFINITY, f32::max);

    if (max - min).abs() < f32::EPSILON {
        return vec![1.0; hits.len()];
    }

    hits.iter().map(|h| (h.score - min) / (max - min)).collect()
}

/// Hybrid search running both sub-queries concurrently and fusing their
/// rankings.
pub struct HybridSearch {
    keyword: KeywordSearch,
    semantic: SemanticSearch,
    fusion: ScoreFusion,
}

impl HybridSearch {
    pub fn new(store: Arc<dyn IndexStore>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            keyword: KeywordSearch::new(Arc::clone(&store)),
            semantic: SemanticSearch::new(store, embedder),
            fusion: ScoreFusion::default(),
        }
    }

    pub fn with_config(
        store: Arc<dyn IndexStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        config: &SearchConfig,
    ) -> Self {
        Self {
            keyword: KeywordSearch::new(Arc::clone(&store)),
            semantic: SemanticSearch::new(store, embedder),
            fusion: ScoreFusion::new(config.keyword_weight, config.semantic_weight),
        }
    }

    pub fn weights(&self) -> (f32, f32) {
        self.fusion.weights()
    }
}

#[async_trait]
impl Search for HybridSearch {
    async fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchHit>, RetrievalError> {
        let start = Instant::now();

        // Over-fetch from each leg so fusion has overlap to work with
        let fetch_limit = limit * 3;

        // Two independent side-effect-free reads, joined before fusing
        let (keyword_results, semantic_results) = tokio::join!(
            self.keyword.search(query, fetch_limit),
            self.semantic.search(query, fetch_limit)
        );

        // Propagate the failing leg's error unchanged so callers can see
        // which strategy broke
        let keyword_results = keyword_results?;
        let semantic_results = semantic_results?;

        let fused = self.fusion.fuse(keyword_results, semantic_results, limit);

        info!(
            search_type = "hybrid",
            query = query,
            results = fused.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Hybrid search completed"
        );

        Ok(fused)
    }

    fn strategy(&self) -> SearchStrategy {
        SearchStrategy::Hybrid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patent::PatentDocument;

    fn hit(patent_id: &str, score: f32, strategy: SearchStrategy) -> SearchHit {
        SearchHit {
            document: PatentDocument {
                patent_id: patent_id.to_string(),
                title: format!("Patent {}", patent_id),
                abstract_text: String::new(),
                publication_date: None,
                pdf_link: None,
                token_count: 0,
                embedding: Vec::new(),
            },
            score,
            strategy,
        }
    }

    fn kw(patent_id: &str, score: f32) -> SearchHit {
        hit(patent_id, score, SearchStrategy::Keyword)
    }

    fn sem(patent_id: &str, score: f32) -> SearchHit {
        hit(patent_id, score, SearchStrategy::Semantic)
    }

    #[test]
    fn test_min_max_normalize() {
        let hits = vec![kw("A", 10.0), kw("B", 5.0), kw("C", 0.0)];
        let norms = min_max_normalize(&hits);
        assert_eq!(norms, vec![1.0, 0.5, 0.0]);
    }

    #[test]
    fn test_min_max_normalize_flat_list() {
        let hits = vec![kw("A", 3.0), kw("B", 3.0)];
        assert_eq!(min_max_normalize(&hits), vec![1.0, 1.0]);

        let single = vec![kw("A", 7.3)];
        assert_eq!(min_max_normalize(&single), vec![1.0]);
    }

    #[test]
    fn test_fusion_prefers_overlap() {
        let fusion = ScoreFusion::default();

        let keyword = vec![kw("A", 8.0), kw("B", 4.0)];
        let semantic = vec![sem("B", 0.9), sem("C", 0.7)];

        let fused = fusion.fuse(keyword, semantic, 10);

        // B appears in both lists and should outrank single-list candidates
        assert_eq!(fused.len(), 3);
        assert_eq!(fused[0].patent_id(), "B");
        assert!(fused.iter().all(|h| h.strategy == SearchStrategy::Hybrid));
    }

    #[test]
    fn test_fusion_never_duplicates_patent_ids() {
        let fusion = ScoreFusion::default();

        let keyword = vec![kw("A", 8.0), kw("A", 6.0), kw("B", 4.0)];
        let semantic = vec![sem("A", 0.9), sem("B", 0.8)];

        let fused = fusion.fuse(keyword, semantic, 10);

        let mut ids: Vec<&str> = fused.iter().map(|h| h.patent_id()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), fused.len());
    }

    #[test]
    fn test_fusion_single_list_candidate_scores_zero_from_missing_leg() {
        let fusion = ScoreFusion::new(0.5, 0.5);

        // Only a keyword hit: combined = 0.5 * 1.0 + 0.5 * 0.0
        let fused = fusion.fuse(vec![kw("A", 12.0)], vec![], 10);
        assert_eq!(fused.len(), 1);
        assert!((fused[0].score - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_fusion_respects_weights() {
        let keyword_heavy = ScoreFusion::new(0.9, 0.1);

        // A tops keyword, C tops semantic; keyword-heavy weights favor A
        let keyword = vec![kw("A", 9.0), kw("C", 1.0)];
        let semantic = vec![sem("C", 0.95), sem("A", 0.1)];

        let fused = keyword_heavy.fuse(keyword, semantic, 10);
        assert_eq!(fused[0].patent_id(), "A");
    }

    #[test]
    fn test_fusion_tie_breaks_by_raw_keyword_then_patent_id() {
        let fusion = ScoreFusion::new(0.5, 0.5);

        // Both only in the keyword list with a flat range: normalized 1.0
        // each, combined scores equal, so raw keyword ties too - falls
        // through to patent id ascending
        let fused = fusion.fuse(vec![kw("B", 5.0), kw("A", 5.0)], vec![], 10);
        assert_eq!(fused[0].patent_id(), "A");
        assert_eq!(fused[1].patent_id(), "B");
    }

    #[test]
    fn test_fusion_sorted_descending() {
        let fusion = ScoreFusion::default();

        let keyword = vec![kw("A", 9.0), kw("B", 5.0), kw("C", 1.0)];
        let semantic = vec![sem("B", 0.8), sem("D", 0.6)];

        let fused = fusion.fuse(keyword, semantic, 10);
        for pair in fused.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn test_fusion_limit() {
        let fusion = ScoreFusion::default();

        let keyword = vec![kw("A", 9.0), kw("B", 5.0), kw("C", 1.0)];
        let fused = fusion.fuse(keyword, vec![], 2);
        assert_eq!(fused.len(), 2);
    }
}
