//! Pipeline entry points for collector operations.
//!
//! - `run_collect`: Collect non-trending video metadata into the sink
//! - `run_clean` / `run_filter` / `run_prepare_trending`: Dataset
//!   maintenance over accumulated and exported files
//! - `run_validate`: Check configuration sanity

pub mod collect;
pub mod dataset;
pub mod validate;

pub use collect::{run_collect, CollectOutcome, CollectionDriver, Termination};
pub use dataset::{run_clean, run_filter, run_prepare_trending};
pub use validate::run_validate;
