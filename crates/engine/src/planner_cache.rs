// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! §4.4 Planner Cache: `<repo-root>/.foreman-cache.json`, written
//! atomically (tmp-write + rename), grounded in the teacher's
//! `checkpoint.rs` tmp-write/rename sequence, simplified: no compression,
//! no background thread — the payload is a handful of file-digest entries
//! and is written synchronously on the event-loop thread.

use std::path::{Path, PathBuf};

use foreman_core::SpecSnapshot;
use serde::{Deserialize, Serialize};

use crate::error::PlannerCacheError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerCacheEntry {
    pub snapshot: SpecSnapshot,
    pub commit_digest: String,
}

/// Validation + atomic tmp-write/rename for `<repo-root>/.foreman-cache.json`.
pub struct PlannerCache {
    path: PathBuf,
}

impl PlannerCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `null` on any parse/validation failure ("cold start"); logged at
    /// debug, never fatal (§4.4, §7).
    pub fn load(&self) -> Option<PlannerCacheEntry> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "planner cache not readable, cold start");
                return None;
            }
        };
        match serde_json::from_str::<PlannerCacheEntry>(&text) {
            Ok(entry) if !entry.commit_digest.is_empty() => Some(entry),
            Ok(_) => {
                tracing::debug!(path = %self.path.display(), "planner cache has empty commit digest, cold start");
                None
            }
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "planner cache failed to parse, cold start");
                None
            }
        }
    }

    /// Serialize, write to `<path>.tmp`, rename to `<path>` (§4.4, §5).
    pub fn write(&self, snapshot: &SpecSnapshot, commit_digest: &str) -> Result<(), PlannerCacheError> {
        let entry = PlannerCacheEntry {
            snapshot: snapshot.clone(),
            commit_digest: commit_digest.to_string(),
        };
        let json = serde_json::to_string_pretty(&entry)?;
        let tmp_path = tmp_path(&self.path);
        std::fs::write(&tmp_path, json).map_err(|source| PlannerCacheError::Write {
            path: tmp_path.clone(),
            source,
        })?;
        std::fs::rename(&tmp_path, &self.path).map_err(|source| PlannerCacheError::Write {
            path: self.path.clone(),
            source,
        })?;
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

#[cfg(test)]
#[path = "planner_cache_tests.rs"]
mod tests;
