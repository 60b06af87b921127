// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Config loading/validation (§6, §1.1). Struct-of-structs with
//! `#[serde(default)]` for every optional field, mirroring the teacher's
//! config-loading shape.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

fn default_log_level() -> String {
    "info".into()
}
fn default_shutdown_timeout() -> u64 {
    300
}
fn default_work_item_poll_interval() -> u64 {
    30
}
fn default_spec_poll_interval() -> u64 {
    60
}
fn default_specs_dir() -> String {
    "docs/specs/".into()
}
fn default_branch() -> String {
    "main".into()
}
fn default_revision_poll_interval() -> u64 {
    30
}
fn default_agent_planner() -> String {
    "planner".into()
}
fn default_agent_implementor() -> String {
    "implementor".into()
}
fn default_agent_reviewer() -> String {
    "reviewer".into()
}
fn default_max_agent_duration() -> u64 {
    1800
}
fn default_logs_dir() -> String {
    "logs".into()
}
fn default_install_command() -> Vec<String> {
    vec!["npm".into(), "install".into()]
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItemPollerConfig {
    #[serde(default = "default_work_item_poll_interval")]
    pub poll_interval: u64,
}

impl Default for WorkItemPollerConfig {
    fn default() -> Self {
        Self {
            poll_interval: default_work_item_poll_interval(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecPollerConfig {
    #[serde(default = "default_spec_poll_interval")]
    pub poll_interval: u64,
    #[serde(default = "default_specs_dir")]
    pub specs_dir: String,
    #[serde(default = "default_branch")]
    pub default_branch: String,
}

impl Default for SpecPollerConfig {
    fn default() -> Self {
        Self {
            poll_interval: default_spec_poll_interval(),
            specs_dir: default_specs_dir(),
            default_branch: default_branch(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionPollerConfig {
    #[serde(default = "default_revision_poll_interval")]
    pub poll_interval: u64,
}

impl Default for RevisionPollerConfig {
    fn default() -> Self {
        Self {
            poll_interval: default_revision_poll_interval(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentsConfig {
    #[serde(default = "default_agent_planner")]
    pub agent_planner: String,
    #[serde(default = "default_agent_implementor")]
    pub agent_implementor: String,
    #[serde(default = "default_agent_reviewer")]
    pub agent_reviewer: String,
    #[serde(default = "default_max_agent_duration")]
    pub max_agent_duration: u64,
    #[serde(default = "default_install_command")]
    pub install_command: Vec<String>,
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            agent_planner: default_agent_planner(),
            agent_implementor: default_agent_implementor(),
            agent_reviewer: default_agent_reviewer(),
            max_agent_duration: default_max_agent_duration(),
            install_command: default_install_command(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    #[serde(default)]
    pub agent_sessions: bool,
    #[serde(default = "default_logs_dir")]
    pub logs_dir: String,
}

/// Raw TOML shape, before `~` expansion and credential-path resolution.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConfig {
    repository: Option<String>,
    #[serde(rename = "appID")]
    app_id: Option<String>,
    #[serde(rename = "privateKeyPath")]
    private_key_path: Option<String>,
    #[serde(rename = "installationID")]
    installation_id: Option<String>,
    #[serde(default = "default_log_level")]
    log_level: String,
    #[serde(default = "default_shutdown_timeout")]
    shutdown_timeout: u64,
    #[serde(default)]
    work_item_poller: WorkItemPollerConfig,
    #[serde(default)]
    spec_poller: SpecPollerConfig,
    #[serde(default)]
    revision_poller: RevisionPollerConfig,
    #[serde(default)]
    agents: AgentsConfig,
    #[serde(default)]
    logging: LoggingConfig,
    /// Directory the engine treats as the repository root, where the
    /// planner cache file and `.worktrees/` live. Not part of §6's option
    /// list verbatim but required to locate them; defaults to the current
    /// directory.
    #[serde(default)]
    repo_root: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub repository: String,
    pub app_id: String,
    pub private_key_path: PathBuf,
    pub installation_id: String,
    pub log_level: String,
    pub shutdown_timeout: u64,
    pub work_item_poller: WorkItemPollerConfig,
    pub spec_poller: SpecPollerConfig,
    pub revision_poller: RevisionPollerConfig,
    pub agents: AgentsConfig,
    pub logging: LoggingConfig,
    pub repo_root: PathBuf,
}

fn expand_tilde(value: &str) -> PathBuf {
    if let Some(rest) = value.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(value)
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let repository = raw.repository.ok_or(ConfigError::MissingField("repository"))?;
        let app_id = raw.app_id.ok_or(ConfigError::MissingField("appID"))?;
        let private_key_path = raw
            .private_key_path
            .ok_or(ConfigError::MissingField("privateKeyPath"))?;
        let installation_id = raw
            .installation_id
            .ok_or(ConfigError::MissingField("installationID"))?;

        Ok(Self {
            repository,
            app_id,
            private_key_path: expand_tilde(&private_key_path),
            installation_id,
            log_level: raw.log_level,
            shutdown_timeout: raw.shutdown_timeout,
            work_item_poller: raw.work_item_poller,
            spec_poller: raw.spec_poller,
            revision_poller: raw.revision_poller,
            agents: raw.agents,
            logging: raw.logging,
            repo_root: raw
                .repo_root
                .map(|s| expand_tilde(&s))
                .unwrap_or_else(|| PathBuf::from(".")),
        })
    }

    pub fn planner_cache_path(&self) -> PathBuf {
        self.repo_root.join(".foreman-cache.json")
    }

    pub fn worktrees_root(&self) -> PathBuf {
        self.repo_root.join(".worktrees")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.repo_root.join(&self.logging.logs_dir)
    }

    /// Directory holding the daemon's own runtime state: socket, PID lock,
    /// and process log (§4.13, supplemented — distinct from the per-session
    /// agent logs in `logs_dir`). Overridable with `FOREMAN_STATE_DIR` for
    /// tests and for running more than one daemon against the same checkout.
    pub fn daemon_state_dir(&self) -> PathBuf {
        if let Ok(dir) = std::env::var("FOREMAN_STATE_DIR") {
            return PathBuf::from(dir);
        }
        self.repo_root.join(".foreman")
    }

    pub fn daemon_socket_path(&self) -> PathBuf {
        self.daemon_state_dir().join("daemon.sock")
    }

    pub fn daemon_lock_path(&self) -> PathBuf {
        self.daemon_state_dir().join("daemon.pid")
    }

    pub fn daemon_log_path(&self) -> PathBuf {
        self.daemon_state_dir().join("daemon.log")
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
