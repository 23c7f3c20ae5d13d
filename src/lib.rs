pub mod cli;
pub mod commands;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod explore;
pub mod ingest;
pub mod logging;
pub mod patent;
pub mod search;
pub mod storage;

pub use config::Config;
pub use patent::{PatentDocument, SearchHit, SearchStrategy};
