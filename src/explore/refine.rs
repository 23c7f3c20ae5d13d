//! Deterministic query refinement: mine salient terms from the best new
//! hits of a round and append them to the running query.

use std::collections::HashMap;

use crate::patent::SearchHit;

/// Terms appended to the query per round.
const MAX_NEW_TERMS: usize = 3;

/// Minimum token length considered salient.
const MIN_TERM_LEN: usize = 3;

/// Common English plus patent-boilerplate tokens that carry no signal.
const STOPWORDS: &[&str] = &[
    "the", "and", "for", "with", "that", "this", "from", "are", "was", "were", "has", "have",
    "can", "may", "one", "more", "least", "which", "wherein", "thereof", "therein", "said",
    "such", "its", "into", "onto", "between", "about", "other", "each", "also", "than", "when",
    "where", "using", "used", "use", "being", "includes", "include", "including", "comprising",
    "comprises", "provided", "present", "invention", "disclosed", "disclosure", "method",
    "methods", "system", "systems", "device", "devices", "apparatus", "embodiment",
    "embodiments", "plurality", "first", "second", "third",
];

/// Extract up to `MAX_NEW_TERMS` refinement terms from the top-k new hits.
///
/// Deterministic given the same hits and query: hits are ordered by score
/// descending then patent id, tokens ranked by frequency descending then
/// alphabetically. Tokens already present in the query are skipped so the
/// query grows with new information only.
pub fn extract_refinement_terms(
    new_hits: &[SearchHit],
    top_k: usize,
    current_query: &str,
) -> Vec<String> {
    let mut ordered: Vec<&SearchHit> = new_hits.iter().collect();
    ordered.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.patent_id().cmp(b.patent_id()))
    });

    let query_tokens: Vec<String> = tokenize(current_query).collect();

    let mut frequencies: HashMap<String, usize> = HashMap::new();
    for hit in ordered.into_iter().take(top_k) {
        for token in tokenize(&hit.document.title).chain(tokenize(&hit.document.abstract_text)) {
            if token.len() < MIN_TERM_LEN
                || STOPWORDS.contains(&token.as_str())
                || query_tokens.contains(&token)
            {
                continue;
            }
            *frequencies.entry(token).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<(String, usize)> = frequencies.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    ranked
        .into_iter()
        .take(MAX_NEW_TERMS)
        .map(|(token, _)| token)
        .collect()
}

/// Append refinement terms to the query.
pub fn refine_query(current_query: &str, terms: &[String]) -> String {
    if terms.is_empty() {
        current_query.to_string()
    } else {
        format!("{} {}", current_query, terms.join(" "))
    }
}

/// Lowercase alphanumeric token stream.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}
