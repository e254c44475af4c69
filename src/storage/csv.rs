// src/storage/csv.rs

//! Append-only CSV sink for collected records.
//!
//! The file is created with a header row on first write and appended
//! headerless thereafter. Existing rows are read at startup solely to
//! seed the dedup store. Write failures surface to the caller: silently
//! retrying a partial append would corrupt the dedup invariant on restart.

use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};
use crate::models::VideoRecord;
use crate::utils::log;

/// Durable sink for the output dataset.
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    /// Create a sink writing to the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The sink's file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load previously persisted `video_id`s to seed the dedup store.
    ///
    /// Returns an empty set when the sink does not exist yet.
    pub fn existing_ids(&self) -> Result<HashSet<String>> {
        if !self.path.exists() {
            return Ok(HashSet::new());
        }

        let mut reader = csv::Reader::from_path(&self.path)?;
        let id_index = reader
            .headers()?
            .iter()
            .position(|h| h == "video_id")
            .ok_or_else(|| {
                AppError::persistence(format!(
                    "existing sink {:?} has no video_id column",
                    self.path
                ))
            })?;

        let mut ids = HashSet::new();
        for row in reader.records() {
            let row = row?;
            if let Some(id) = row.get(id_index) {
                ids.insert(id.to_string());
            }
        }
        Ok(ids)
    }

    /// Append all buffered records, clearing the buffer on success.
    ///
    /// A no-op when the buffer is empty: the file is not even touched.
    /// Returns the number of records written.
    pub fn append(&self, buffer: &mut Vec<VideoRecord>) -> Result<usize> {
        if buffer.is_empty() {
            return Ok(0);
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let write_header = !self.path.exists();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(write_header)
            .from_writer(file);
        for record in buffer.iter() {
            writer.serialize(record)?;
        }
        writer.flush()?;

        let written = buffer.len();
        buffer.clear();
        log::info(&format!("Flushed {} records to {:?}", written, self.path));
        Ok(written)
    }
}
