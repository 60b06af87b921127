// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-module error enums (§1.1 "Error handling"). `anyhow`/`Box<dyn Error>`
//! are not used; every fallible operation returns one of these.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkingCopyError {
    #[error(transparent)]
    Vcs(#[from] foreman_adapters::VcsError),
    #[error("no registered worktree for issue #{0}")]
    NotFound(u64),
}

#[derive(Debug, Error)]
pub enum PlannerCacheError {
    #[error("failed to write cache file {path}: {source}")]
    Write {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize cache: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum PollError {
    #[error(transparent)]
    Tracker(#[from] foreman_adapters::TrackerError),
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Tracker(#[from] foreman_adapters::TrackerError),
    #[error(transparent)]
    WorkingCopy(#[from] WorkingCopyError),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to load config: {0}")]
    Config(#[from] foreman_core::ConfigError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}
