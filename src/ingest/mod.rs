pub mod loader;
pub mod pipeline;
pub mod validator;

pub use loader::{load_records, LoadedRecord};
pub use pipeline::{IngestPipeline, IngestReport, Rejection};
pub use validator::{count_tokens, DocumentValidator};
