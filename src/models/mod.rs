// src/models/mod.rs

//! Data structures shared across the collector.

pub mod api;
pub mod config;
pub mod video;

pub use config::{ApiConfig, CollectionConfig, Config, LoggingConfig, PathsConfig, SamplingConfig};
pub use video::{VideoRecord, VideoStats};
