// src/services/keys.rs

//! API key rotation.
//!
//! Tracks which keys have hit their daily quota and selects the next
//! usable one. Exhaustion is monotonic for the process lifetime: quotas
//! reset on a provider schedule, so there is no backoff-and-retry here.

use crate::error::{AppError, Result};
use crate::utils::log;

/// State of one configured API key.
#[derive(Debug, Clone)]
struct CredentialState {
    key: String,
    exhausted: bool,
}

/// Rotates through a pool of API keys as quotas run out.
#[derive(Debug, Clone)]
pub struct KeyRotator {
    keys: Vec<CredentialState>,
    active: usize,
    switches: usize,
}

impl KeyRotator {
    /// Create a rotator over a non-empty key pool.
    pub fn new(keys: Vec<String>) -> Result<Self> {
        if keys.is_empty() {
            return Err(AppError::config("API key pool is empty"));
        }
        Ok(Self {
            keys: keys
                .into_iter()
                .map(|key| CredentialState {
                    key,
                    exhausted: false,
                })
                .collect(),
            active: 0,
            switches: 0,
        })
    }

    /// The currently active key.
    pub fn current(&self) -> &str {
        &self.keys[self.active].key
    }

    /// Mark the active key exhausted and switch to the lowest-indexed
    /// usable one.
    ///
    /// Fails with [`AppError::QuotaExhausted`] when no usable key remains;
    /// the caller must flush buffered output before terminating.
    pub fn advance(&mut self) -> Result<&str> {
        self.keys[self.active].exhausted = true;

        match self.keys.iter().position(|k| !k.exhausted) {
            Some(index) => {
                self.active = index;
                self.switches += 1;
                log::info(&format!("Switched to API key #{}", index + 1));
                Ok(self.current())
            }
            None => Err(AppError::QuotaExhausted),
        }
    }

    /// Number of keys not yet exhausted.
    pub fn remaining(&self) -> usize {
        self.keys.iter().filter(|k| !k.exhausted).count()
    }

    /// Number of key switches performed so far.
    pub fn switches(&self) -> usize {
        self.switches
    }
}
