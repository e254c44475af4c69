// src/storage/mod.rs

//! Durable sinks for collected data.

pub mod csv;

pub use csv::CsvSink;
