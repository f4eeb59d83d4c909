//! Caller-side memoization of analysis reports.
//!
//! Inputs are keyed by their `bincode` encoding. Floats are not `Hash`, and
//! byte equality of the encoded snapshot is exact input equality, so the
//! encoding doubles as the key.

use std::collections::HashMap;

use crate::engine::{analyze, AnalysisInput, DesignReport};
use crate::error::EngineError;

/// Default number of reports kept before the cache is flushed.
pub const DEFAULT_CAPACITY: usize = 64;

/// Memoizes [`analyze`] results by input.
#[derive(Debug)]
pub struct AnalysisCache {
    entries: HashMap<Vec<u8>, DesignReport>,
    capacity: usize,
    hits: u64,
    misses: u64,
}

impl Default for AnalysisCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl AnalysisCache {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity: capacity.max(1),
            hits: 0,
            misses: 0,
        }
    }

    /// Cache key for an input.
    pub fn key(input: &AnalysisInput) -> Result<Vec<u8>, EngineError> {
        Ok(bincode::serialize(input)?)
    }

    /// Return the cached report for `input`, computing it on a miss.
    ///
    /// Failed analyses are not cached.
    pub fn get_or_analyze(&mut self, input: &AnalysisInput) -> Result<&DesignReport, EngineError> {
        let key = Self::key(input)?;
        if self.entries.contains_key(&key) {
            self.hits += 1;
        } else {
            let report = analyze(input)?;
            self.misses += 1;
            if self.entries.len() >= self.capacity {
                log::debug!("analysis cache full ({} entries), flushing", self.entries.len());
                self.entries.clear();
            }
            self.entries.insert(key.clone(), report);
        }
        Ok(&self.entries[&key])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
