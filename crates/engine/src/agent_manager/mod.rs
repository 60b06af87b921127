// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! §4.8 Agent Manager: the hardest subsystem. Owns session lifecycle
//! (dispatch → spawn → monitor → finalize), the at-most-one-per-work-item
//! and at-most-one-planner invariants, deadline timers, cancellation, and
//! output fan-out.
//!
//! The teacher workspace has no equivalent of an LLM-session supervisor —
//! its `spawn.rs`/`monitor.rs` drive shell subprocesses against an HCL
//! runbook — so the procedures here are authored directly from §4.8. The
//! session-log append discipline is grounded in `pipeline_logger.rs` (see
//! `crate::session_log`); the at-most-one-per-work-item guard mirrors the
//! teacher's `workItemID → session` map idiom described in the design
//! ledger.

mod session;

pub use session::{Session, SessionOutputEvent};

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use foreman_adapters::{AgentMessage, AgentSdk, ContentBlock, QueryParams};
use foreman_core::config::{AgentsConfig, LoggingConfig};
use foreman_core::{AgentRole, AgentSessionInfo, Clock, Event, EventEmitter, SessionId, SessionStatus, WorkItemId};

use crate::session_log::{session_log_path, SessionLog};
use crate::working_copy::{CreateParams, WorkingCopyManager};

struct State<C: Clock> {
    by_session: HashMap<SessionId, Arc<Session<C>>>,
    by_work_item: HashMap<WorkItemId, Arc<Session<C>>>,
    planner: Option<Arc<Session<C>>>,
}

impl<C: Clock> Default for State<C> {
    fn default() -> Self {
        Self { by_session: HashMap::new(), by_work_item: HashMap::new(), planner: None }
    }
}

/// Shared orchestration surface for planner/implementor/reviewer sessions.
/// Cheap to clone: every field is an `Arc` or already `Clone`.
#[derive(Clone)]
pub struct AgentManager<A: AgentSdk, C: Clock> {
    sdk: A,
    agents: AgentsConfig,
    logging: LoggingConfig,
    logs_dir: PathBuf,
    repo_root: PathBuf,
    emitter: EventEmitter,
    working_copies: Arc<WorkingCopyManager>,
    clock: C,
    state: Arc<Mutex<State<C>>>,
}

impl<A: AgentSdk, C: Clock> AgentManager<A, C> {
    pub fn new(
        sdk: A,
        agents: AgentsConfig,
        logging: LoggingConfig,
        logs_dir: PathBuf,
        repo_root: PathBuf,
        emitter: EventEmitter,
        working_copies: Arc<WorkingCopyManager>,
        clock: C,
    ) -> Self {
        Self {
            sdk,
            agents,
            logging,
            logs_dir,
            repo_root,
            emitter,
            working_copies,
            clock,
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    /// Snapshot of every session currently known (running or just finished
    /// but not yet unregistered), for the `status` command.
    pub fn sessions(&self) -> Vec<AgentSessionInfo> {
        let state = self.state.lock();
        state
            .by_session
            .values()
            .map(|s| s.info(if s.is_done() { SessionStatus::Completed } else { SessionStatus::Running }))
            .collect()
    }

    pub fn subscribe_output(&self, session_id: &SessionId) -> Option<mpsc::UnboundedReceiver<SessionOutputEvent>> {
        self.state.lock().by_session.get(session_id).map(|s| s.subscribe())
    }

    /// Is a planner session currently claimed (§4.9's "planner already running" guard)?
    pub fn is_planner_running(&self) -> bool {
        self.state.lock().planner.is_some()
    }

    /// Is an implementor or reviewer session currently claimed for `work_item_id`
    /// (§4.9/§4.12's "no agent running" guards)?
    pub fn is_running_for_work_item(&self, work_item_id: WorkItemId) -> bool {
        self.state.lock().by_work_item.contains_key(&work_item_id)
    }

    /// Sessions claimed but not yet finalized: at most one per work item plus
    /// at most one planner (I1/I2). Used by shutdown's drain-until-zero wait.
    pub fn active_session_count(&self) -> usize {
        let state = self.state.lock();
        state.by_work_item.len() + usize::from(state.planner.is_some())
    }

    // ---- dispatch ----------------------------------------------------

    pub fn dispatch_implementor(
        &self,
        work_item_id: WorkItemId,
        branch_name: String,
        branch_base: Option<String>,
        model_override: Option<String>,
        prompt: String,
    ) {
        let Some(session) = self.claim_work_item(work_item_id, branch_name.clone(), AgentRole::Implementor) else {
            tracing::info!(%work_item_id, "implementor already running for work item, skipping dispatch");
            return;
        };
        let params = CreateParams { branch_name, branch_base, fetch_remote: false };
        let manager = self.clone();
        tokio::spawn(async move {
            manager.run_working_copy_session(session, params, model_override, prompt).await;
        });
    }

    pub fn dispatch_reviewer(
        &self,
        work_item_id: WorkItemId,
        branch_name: String,
        fetch_remote: bool,
        prompt: String,
    ) {
        let Some(session) = self.claim_work_item(work_item_id, branch_name.clone(), AgentRole::Reviewer) else {
            tracing::info!(%work_item_id, "reviewer already running for work item, skipping dispatch");
            return;
        };
        let params = CreateParams { branch_name, branch_base: None, fetch_remote };
        let manager = self.clone();
        tokio::spawn(async move {
            manager.run_working_copy_session(session, params, None, prompt).await;
        });
    }

    pub fn dispatch_planner(&self, spec_paths: Vec<String>, prompt: String) {
        let Some(session) = self.claim_planner(spec_paths) else {
            tracing::info!("planner already running, skipping dispatch");
            return;
        };
        let manager = self.clone();
        tokio::spawn(async move {
            manager.run_planner_session(session, prompt).await;
        });
    }

    fn claim_work_item(
        &self,
        work_item_id: WorkItemId,
        branch_name: String,
        role: AgentRole,
    ) -> Option<Arc<Session<C>>> {
        let mut state = self.state.lock();
        if state.by_work_item.contains_key(&work_item_id) {
            return None;
        }
        let session = Session::new(role, Some(work_item_id), Vec::new(), Some(branch_name), self.clock.now());
        state.by_work_item.insert(work_item_id, Arc::clone(&session));
        Some(session)
    }

    fn claim_planner(&self, spec_paths: Vec<String>) -> Option<Arc<Session<C>>> {
        let mut state = self.state.lock();
        if state.planner.is_some() {
            return None;
        }
        let session = Session::new(AgentRole::Planner, None, spec_paths, None, self.clock.now());
        state.planner = Some(Arc::clone(&session));
        Some(session)
    }

    // ---- procedures ----------------------------------------------------

    async fn run_working_copy_session(
        &self,
        session: Arc<Session<C>>,
        params: CreateParams,
        model_override: Option<String>,
        prompt: String,
    ) {
        let branch_name = params.branch_name.clone();
        let working_copy = match self.working_copies.create(params).await {
            Ok(wc) => wc,
            Err(e) => {
                tracing::warn!(branch_name, error = %e, "failed to create working copy, aborting dispatch");
                self.finalize_spawn_failure(&session, &branch_name);
                return;
            }
        };
        *session.working_copy_path.lock() = Some(working_copy.path.clone());

        if let Err(e) = self.run_install(&working_copy.path).await {
            tracing::warn!(branch_name, error = %e, "install-dependencies failed, aborting dispatch");
            self.working_copies.remove_by_path(&working_copy.path).await;
            self.finalize_spawn_failure(&session, &branch_name);
            return;
        }

        let agent_name = match session.role {
            AgentRole::Implementor => self.agents.agent_implementor.clone(),
            AgentRole::Reviewer => self.agents.agent_reviewer.clone(),
            AgentRole::Planner => self.agents.agent_planner.clone(),
        };
        self.spawn_and_monitor(session, working_copy.path, agent_name, model_override, prompt).await;
    }

    async fn run_planner_session(&self, session: Arc<Session<C>>, prompt: String) {
        let cwd = self.repo_root.clone();
        self.spawn_and_monitor(session, cwd, self.agents.agent_planner.clone(), None, prompt).await;
    }

    async fn run_install(&self, cwd: &std::path::Path) -> std::io::Result<()> {
        let Some((program, args)) = self.agents.install_command.split_first() else {
            return Ok(());
        };
        let status = tokio::process::Command::new(program).args(args).current_dir(cwd).status().await?;
        if status.success() {
            Ok(())
        } else {
            Err(std::io::Error::other(format!("install command exited with {status}")))
        }
    }

    /// §4.8 failure path for working-copy/install setup: no agent session
    /// was ever spawned, so `sessionID` is empty.
    fn finalize_spawn_failure(&self, session: &Arc<Session<C>>, branch_name: &str) {
        if !session.mark_done() {
            return;
        }
        self.unregister(session);
        self.emitter.emit(&Event::AgentFailed {
            role: session.role,
            session_id: SessionId::default(),
            work_item_id: session.work_item_id,
            spec_paths: spec_paths_option(&session.spec_paths),
            error: format!("failed to prepare working copy for branch {branch_name}"),
        });
    }

    async fn spawn_and_monitor(
        &self,
        session: Arc<Session<C>>,
        cwd: PathBuf,
        agent_name: String,
        model_override: Option<String>,
        prompt: String,
    ) {
        let params = QueryParams { prompt, agent_name, cwd, model_override };
        let handle = match self.sdk.query(params).await {
            Ok(handle) => handle,
            Err(e) => {
                tracing::warn!(error = %e, "failed to spawn agent");
                let branch = session.branch_name.clone().unwrap_or_default();
                self.finalize_spawn_failure(&session, &branch);
                return;
            }
        };
        *session.handle_cancel.lock() = Some(handle.cancel.clone());

        let deadline_manager = self.clone();
        let deadline_session = Arc::clone(&session);
        let deadline_secs = self.agents.max_agent_duration;
        let deadline_handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(deadline_secs)).await;
            let reason = format!("Agent exceeded max duration of {deadline_secs}s");
            deadline_manager.cancel_session(&deadline_session, &reason).await;
        });
        *session.deadline.lock() = Some(deadline_handle);

        self.monitor(session, handle.rx).await;
    }

    /// §4.8 "Message Consumption". Runs until the channel closes.
    async fn monitor(&self, session: Arc<Session<C>>, mut rx: mpsc::Receiver<AgentMessage>) {
        let mut saw_terminal = false;
        while let Some(message) = rx.recv().await {
            match message {
                AgentMessage::SystemInit { session_id, .. } => {
                    let id = SessionId::new(session_id);
                    *session.session_id.lock() = Some(id.clone());
                    self.register_session_id(id.clone(), Arc::clone(&session));

                    let log = if self.logging.agent_sessions {
                        let log = SessionLog::new(session_log_path(&self.logs_dir, &id), self.clock.clone());
                        log.write_header(session.role, session.work_item_id.map(|w| w.get()));
                        Some(log)
                    } else {
                        None
                    };
                    let log_file_path = log.as_ref().map(|l| l.path().display().to_string());
                    *session.log.lock() = log;

                    self.emitter.emit(&Event::AgentStarted {
                        role: session.role,
                        session_id: id,
                        work_item_id: session.work_item_id,
                        spec_paths: session.spec_paths.clone(),
                        branch_name: session.branch_name.clone(),
                        log_file_path,
                        started_at: session.started_at,
                    });
                }
                AgentMessage::Assistant { content } => {
                    let mut chunk = String::new();
                    for block in content {
                        match block {
                            ContentBlock::Text(text) => {
                                if let Some(log) = session.log.lock().as_ref() {
                                    log.append_text(&text);
                                }
                                chunk.push_str(&text);
                            }
                            ContentBlock::ToolUse { name } => {
                                if let Some(log) = session.log.lock().as_ref() {
                                    log.append_tool_use(&name);
                                }
                            }
                        }
                    }
                    if !chunk.is_empty() {
                        session.publish_chunk(chunk);
                    }
                }
                AgentMessage::ResultSuccess { .. } => {
                    saw_terminal = true;
                    self.finish(&session, true, "completed", None).await;
                }
                AgentMessage::ResultError { subtype } => {
                    saw_terminal = true;
                    if let Some(log) = session.log.lock().as_ref() {
                        log.append_unknown("result.error", &subtype);
                    }
                    self.finish(&session, false, "failed", Some("Agent session ended with error".to_string())).await;
                }
                AgentMessage::Unknown { raw } => {
                    if let Some(log) = session.log.lock().as_ref() {
                        log.append_unknown("unknown", &raw);
                    }
                }
            }
        }

        if !saw_terminal {
            self.finish(&session, true, "completed", None).await;
        }
    }

    /// §4.8 "Finalization contract". Idempotent. `footer` labels the single
    /// log footer this call writes — callers must not write one of their
    /// own, or the session log ends with two `=== Session End ===` blocks.
    async fn finish(&self, session: &Arc<Session<C>>, succeeded: bool, footer: &str, error_msg: Option<String>) {
        if !session.mark_done() {
            return;
        }

        if let Some(handle) = session.deadline.lock().take() {
            handle.abort();
        }
        self.unregister(session);
        session.notify_end();

        if let Some(log) = session.log.lock().as_ref() {
            log.write_footer(footer);
        }

        if let Some(path) = session.working_copy_path.lock().clone() {
            self.working_copies.remove_by_path(&path).await;
        }

        if succeeded {
            self.emitter.emit(&Event::AgentCompleted {
                role: session.role,
                session_id: session.session_id().unwrap_or_default(),
                work_item_id: session.work_item_id,
                spec_paths: spec_paths_option(&session.spec_paths),
            });
        } else {
            self.emitter.emit(&Event::AgentFailed {
                role: session.role,
                session_id: session.session_id().unwrap_or_default(),
                work_item_id: session.work_item_id,
                spec_paths: spec_paths_option(&session.spec_paths),
                error: error_msg.unwrap_or_else(|| "Agent session ended with error".to_string()),
            });
        }
    }

    fn register_session_id(&self, id: SessionId, session: Arc<Session<C>>) {
        self.state.lock().by_session.insert(id, session);
    }

    fn unregister(&self, session: &Arc<Session<C>>) {
        let mut state = self.state.lock();
        if let Some(id) = session.session_id() {
            state.by_session.remove(&id);
        }
        if let Some(work_item_id) = session.work_item_id {
            state.by_work_item.remove(&work_item_id);
        }
        if state.planner.as_ref().is_some_and(|p| Arc::ptr_eq(p, session)) {
            state.planner = None;
        }
    }

    // ---- cancellation ----------------------------------------------------

    pub async fn cancel_agent(&self, work_item_id: WorkItemId) {
        let session = self.state.lock().by_work_item.get(&work_item_id).cloned();
        if let Some(session) = session {
            self.cancel_session(&session, "cancelled by operator").await;
        }
    }

    pub async fn cancel_planner(&self) {
        let session = self.state.lock().planner.clone();
        if let Some(session) = session {
            self.cancel_session(&session, "cancelled by operator").await;
        }
    }

    /// Cancels every live session. Iterates `by_work_item` and `planner`
    /// rather than `by_session`: a session claimed just before dispatch but
    /// not yet past `system.init` has no `sessionID` yet and would be
    /// invisible to `by_session`, but must still be cancelled on shutdown.
    pub async fn cancel_all(&self) {
        let sessions: Vec<Arc<Session<C>>> = {
            let state = self.state.lock();
            state.by_work_item.values().cloned().chain(state.planner.clone()).collect()
        };
        for session in sessions {
            self.cancel_session(&session, "engine shutting down").await;
        }
    }

    async fn cancel_session(&self, session: &Arc<Session<C>>, reason: &str) {
        if session.is_done() {
            return;
        }
        session.cancel.cancel();
        if let Some(handle_cancel) = session.handle_cancel.lock().clone() {
            handle_cancel.cancel();
        }
        self.finish(session, false, "cancelled", Some(reason.to_string())).await;
    }
}

fn spec_paths_option(paths: &[String]) -> Option<Vec<String>> {
    if paths.is_empty() {
        None
    } else {
        Some(paths.to_vec())
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
