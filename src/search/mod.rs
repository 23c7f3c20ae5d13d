//! Search strategy layer: keyword, semantic and fused hybrid retrieval.

mod hybrid;
mod keyword;
mod semantic;
pub mod traits;

pub use hybrid::{HybridSearch, ScoreFusion};
pub use keyword::KeywordSearch;
pub use semantic::SemanticSearch;
pub use traits::Search;
