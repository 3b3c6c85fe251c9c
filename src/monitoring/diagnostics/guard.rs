//! Guard for caller-supplied queries
//!
//! Custom tests run the query verbatim, so the only protection is up front:
//! a length cap and, in read-only mode, a deny list of mutation keywords.
//! Matching is whole-word and case-insensitive; field names such as
//! `deletedAt` pass.

use regex::Regex;

use crate::config::CustomQueryConfig;
use crate::utils::error::{EngineError, Result};

const MUTATION_PATTERN: &str =
    r"(?i)\b(delete|create|createOrReplace|createIfNotExists|patch|mutate|insert|drop)\b";

#[derive(Debug, Clone)]
pub struct QueryGuard {
    read_only: bool,
    max_length: usize,
    mutations: Regex,
}

impl QueryGuard {
    pub fn new(config: &CustomQueryConfig) -> Result<Self> {
        let mutations = Regex::new(MUTATION_PATTERN)
            .map_err(|e| EngineError::internal(format!("invalid mutation pattern: {}", e)))?;
        Ok(Self {
            read_only: config.read_only,
            max_length: config.max_length,
            mutations,
        })
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Reject a query before it reaches the backend
    pub fn check(&self, query: &str) -> Result<()> {
        if query.trim().is_empty() {
            return Err(EngineError::validation("customQuery must not be empty"));
        }

        let length = query.chars().count();
        if length > self.max_length {
            return Err(EngineError::validation(format!(
                "customQuery is {} characters, limit is {}",
                length, self.max_length
            )));
        }

        if self.read_only {
            if let Some(found) = self.mutations.find(query) {
                return Err(EngineError::validation(format!(
                    "customQuery contains mutating keyword '{}'; only read-only queries are allowed",
                    found.as_str()
                )));
            }
        }

        Ok(())
    }
}
