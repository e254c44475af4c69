// src/utils/mod.rs

//! Shared utilities: HTTP client construction and console logging.

pub mod http;
pub mod log;
