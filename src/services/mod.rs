// src/services/mod.rs

//! Collector services: key rotation, dedup, sampling, search, enrichment.

pub mod dedup;
pub mod keys;
pub mod sampling;
pub mod search;
pub mod stats;

pub use dedup::DedupStore;
pub use keys::KeyRotator;
pub use sampling::{QuerySampler, QueryWindow};
pub use search::{CollectionCursor, SearchPaginator};
pub use stats::{RetryPolicy, StatsFetcher};
