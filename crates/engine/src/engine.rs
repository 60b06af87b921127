// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! §4.12 Engine Root: wires every subsystem together and owns the main
//! loop. Grounded in the teacher's `lifecycle.rs` `DaemonState` (the
//! `process_event`/`shutdown` split), adapted from WAL replay to the
//! synchronous-emitter + event-queue discipline of §5.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot, Mutex as AsyncMutex};
use tokio::task::JoinHandle;

use foreman_adapters::{AgentSdk, GitVcs, TrackerClient};
use foreman_core::config::Config;
use foreman_core::{
    AgentRole, Clock, Command, Event, EventEmitter, StatusSnapshot, WorkItemId, WorkItemStatus,
};

use crate::agent_manager::AgentManager;
use crate::commands::{build_pr_context, find_linked_pr, CommandHandlers};
use crate::dispatch::{Dispatch, WorkItemAction};
use crate::event_queue::EventQueue;
use crate::planner_cache::PlannerCache;
use crate::pollers::{RevisionPoller, SpecPoller, WorkItemPoller};
use crate::prompt::PromptBuilder;
use crate::recovery::{crash_recovery, startup_recovery};
use crate::working_copy::WorkingCopyManager;

/// Result of [`Engine::start`] (§8 scenario 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartupSummary {
    pub work_item_count: usize,
    pub recoveries: usize,
}

/// One command submitted to the engine's single consumer, with a channel
/// for its response (§4.14's "routes every request through the same
/// engine command channel the event loop drains").
pub struct EngineCommand {
    pub command: Command,
    pub respond_to: oneshot::Sender<CommandResponse>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommandResponse {
    Ack,
    Status(StatusSnapshot),
}

/// Wires the three pollers, the dispatcher, the planner cache, and the
/// command handlers into the single-consumer event loop described in §5.
pub struct Engine<T: TrackerClient, A: AgentSdk, C: Clock> {
    tracker: Arc<T>,
    config: Config,
    emitter: EventEmitter,
    queue: EventQueue,
    work_item_poller: AsyncMutex<WorkItemPoller<T, C>>,
    spec_poller: AsyncMutex<SpecPoller<T>>,
    revision_poller: AsyncMutex<RevisionPoller<T>>,
    dispatch: Mutex<Dispatch>,
    planner_cache: PlannerCache,
    /// §4.6/§9's `latestSpecCommitDigest`: the last *non-empty* commit digest
    /// seen from any spec-poller batch. A batch's `commitDigest` is empty
    /// whenever that cycle found no changes (§4.6 step 6), so this must be
    /// updated only on non-empty batches to preserve the last real value.
    latest_spec_commit_digest: Mutex<Option<String>>,
    pending_planner_commit_digest: Mutex<Option<String>>,
    commands: CommandHandlers<T, A, C>,
    prompts: Arc<dyn PromptBuilder>,
    command_tx: mpsc::Sender<EngineCommand>,
    timers: Mutex<Vec<JoinHandle<()>>>,
}

impl<T: TrackerClient + 'static, A: AgentSdk + 'static, C: Clock> Engine<T, A, C> {
    /// Constructs every collaborator from `config`, loading the planner
    /// cache synchronously (§4.12 step 1) so the spec poller starts with
    /// the right snapshot before `start()` runs its first poll.
    pub fn new(
        tracker: Arc<T>,
        config: Config,
        sdk: A,
        prompts: Arc<dyn PromptBuilder>,
        clock: C,
    ) -> (Self, mpsc::Receiver<EngineCommand>) {
        let emitter = EventEmitter::new();
        let planner_cache = PlannerCache::new(config.planner_cache_path());

        let mut spec_poller = SpecPoller::new(
            Arc::clone(&tracker),
            config.spec_poller.specs_dir.clone(),
            config.spec_poller.default_branch.clone(),
        );
        if let Some(entry) = planner_cache.load() {
            spec_poller = spec_poller.with_snapshot(entry.snapshot);
        }

        let working_copies = Arc::new(WorkingCopyManager::new(
            GitVcs::new(config.repo_root.clone()),
            config.worktrees_root(),
        ));
        let agent_manager = AgentManager::new(
            sdk,
            config.agents.clone(),
            config.logging.clone(),
            config.logs_dir(),
            config.repo_root.clone(),
            emitter.clone(),
            working_copies,
            clock.clone(),
        );
        let commands = CommandHandlers::new(
            Arc::clone(&tracker),
            agent_manager,
            Arc::clone(&prompts),
            config.spec_poller.default_branch.clone(),
            clock.clone(),
        );

        let (command_tx, command_rx) = mpsc::channel(64);

        let engine = Self {
            work_item_poller: AsyncMutex::new(WorkItemPoller::new(Arc::clone(&tracker), clock)),
            spec_poller: AsyncMutex::new(spec_poller),
            revision_poller: AsyncMutex::new(RevisionPoller::new(Arc::clone(&tracker))),
            dispatch: Mutex::new(Dispatch::new()),
            planner_cache,
            latest_spec_commit_digest: Mutex::new(None),
            pending_planner_commit_digest: Mutex::new(None),
            commands,
            prompts,
            command_tx,
            timers: Mutex::new(Vec::new()),
            tracker,
            config,
            emitter,
            queue: EventQueue::new(),
        };
        (engine, command_rx)
    }

    /// Sender half of the command channel, handed to the daemon's socket
    /// listener (§4.14).
    pub fn command_sender(&self) -> mpsc::Sender<EngineCommand> {
        self.command_tx.clone()
    }

    /// §4.12 `start()`: subscribe, recover, run the first cycle of every
    /// poller, then schedule their periodic timers.
    pub async fn start(self: &Arc<Self>) -> StartupSummary {
        self.wire_event_handler();

        let recoveries = startup_recovery(&*self.tracker, &self.emitter).await;

        self.poll_work_items().await;
        self.poll_specs().await;
        self.poll_revisions().await;

        self.spawn_timers();

        let work_item_count = self.work_item_poller.lock().await.snapshot().len();
        StartupSummary { work_item_count, recoveries }
    }

    /// Subscribes the single internal handler that forwards every emitted
    /// event onto the event queue — the seam between the emitter (many
    /// synchronous producers) and the queue (one async consumer).
    fn wire_event_handler(&self) {
        let queue = self.queue.clone();
        self.emitter.subscribe(move |event| queue.enqueue(event.clone()));
    }

    fn spawn_timers(self: &Arc<Self>) {
        let mut handles = Vec::with_capacity(3);
        handles.push(self.spawn_timer(self.config.work_item_poller.poll_interval, |engine| {
            Box::pin(async move { engine.poll_work_items().await })
        }));
        handles.push(self.spawn_timer(self.config.spec_poller.poll_interval, |engine| {
            Box::pin(async move { engine.poll_specs().await })
        }));
        handles.push(self.spawn_timer(self.config.revision_poller.poll_interval, |engine| {
            Box::pin(async move { engine.poll_revisions().await })
        }));
        *self.timers.lock() = handles;
    }

    fn spawn_timer<F>(self: &Arc<Self>, interval_secs: u64, cycle: F) -> JoinHandle<()>
    where
        F: Fn(Arc<Self>) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>>
            + Send
            + 'static,
    {
        let engine = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
            ticker.tick().await; // first tick fires immediately; start() already ran cycle 1
            loop {
                ticker.tick().await;
                cycle(Arc::clone(&engine)).await;
            }
        })
    }

    async fn poll_work_items(&self) {
        let events = self.work_item_poller.lock().await.poll().await;
        for event in events {
            self.emitter.emit(&event);
        }
    }

    async fn poll_revisions(&self) {
        let events = self.revision_poller.lock().await.poll().await;
        for event in events {
            self.emitter.emit(&event);
        }
    }

    async fn poll_specs(&self) {
        let batch = self.spec_poller.lock().await.poll().await;
        if !batch.commit_digest.is_empty() {
            *self.latest_spec_commit_digest.lock() = Some(batch.commit_digest.clone());
        }

        let planner_running = self.commands.agent_manager().is_planner_running();
        let paths = self.dispatch.lock().record_batch(&batch, &self.emitter, planner_running);
        if let Some(paths) = paths {
            // A deferred dispatch can fire on a cycle whose own batch carried
            // no changes (§8 scenario 3, cycle 3): use the last non-empty
            // digest seen, never the empty one from this cycle's batch, so
            // the eventual cache write round-trips through `load` (I5, §8).
            *self.pending_planner_commit_digest.lock() = self.latest_spec_commit_digest.lock().clone();
            let prompt = self.prompts.planner_prompt(&paths);
            self.commands.agent_manager().dispatch_planner(paths, prompt);
        }
    }

    /// The main loop: single consumer of both the event queue (poller and
    /// agent-session output) and the command channel (CLI/daemon input).
    /// Returns once a `shutdown` command has been processed.
    pub async fn run(self: &Arc<Self>, mut command_rx: mpsc::Receiver<EngineCommand>) {
        loop {
            tokio::select! {
                event = self.queue.recv() => {
                    self.handle_event(event).await;
                }
                cmd = command_rx.recv() => {
                    let Some(cmd) = cmd else { break };
                    if matches!(cmd.command, Command::Shutdown) {
                        let _ = cmd.respond_to.send(CommandResponse::Ack);
                        self.shutdown().await;
                        break;
                    }
                    self.handle_command(cmd).await;
                }
            }
        }
    }

    async fn handle_command(&self, cmd: EngineCommand) {
        let response = if matches!(cmd.command, Command::Status) {
            let poller = self.work_item_poller.lock().await;
            CommandResponse::Status(StatusSnapshot {
                work_item_count: poller.snapshot().len(),
                planner_running: self.commands.agent_manager().is_planner_running(),
                sessions: self.commands.agent_manager().sessions(),
            })
        } else {
            let poller = self.work_item_poller.lock().await;
            self.commands.dispatch(cmd.command, &poller.snapshot()).await;
            CommandResponse::Ack
        };
        let _ = cmd.respond_to.send(response);
    }

    /// §4.12 "Event handler". Runs the full bullet list in order for every
    /// dequeued event.
    async fn handle_event(&self, event: Event) {
        match &event {
            Event::WorkItemChanged { work_item_id, old_status, new_status, is_engine_transition, .. } => {
                self.handle_work_item_changed(*work_item_id, *old_status, *new_status, *is_engine_transition).await;
            }
            Event::AgentCompleted { role: AgentRole::Planner, .. } => {
                self.persist_planner_cache().await;
            }
            Event::AgentFailed { role: AgentRole::Planner, spec_paths, .. } => {
                self.pending_planner_commit_digest.lock().take();
                if let Some(paths) = spec_paths {
                    self.dispatch.lock().handle_planner_failed(paths);
                }
            }
            Event::AgentCompleted { role: AgentRole::Implementor, work_item_id: Some(work_item_id), .. } => {
                self.completion_dispatch(*work_item_id).await;
            }
            _ => {}
        }

        if event.is_terminal_agent_event() {
            if let Some(work_item_id) = event.work_item_id() {
                self.run_crash_recovery(work_item_id).await;
            }
        }
    }

    async fn handle_work_item_changed(
        &self,
        work_item_id: WorkItemId,
        old_status: Option<WorkItemStatus>,
        new_status: Option<WorkItemStatus>,
        is_engine_transition: bool,
    ) {
        let agent_running = self.commands.agent_manager().is_running_for_work_item(work_item_id);
        let action = Dispatch::classify_work_item_transition(old_status, new_status, is_engine_transition, agent_running);
        match action {
            WorkItemAction::None => {}
            WorkItemAction::Cancel => {
                self.commands.agent_manager().cancel_agent(work_item_id).await;
            }
            WorkItemAction::DispatchReviewer => {
                let poller = self.work_item_poller.lock().await;
                self.commands.dispatch(Command::DispatchReviewer { work_item_id }, &poller.snapshot()).await;
            }
            WorkItemAction::DispatchImplementor => {
                let poller = self.work_item_poller.lock().await;
                self.commands.dispatch(Command::DispatchImplementor { work_item_id }, &poller.snapshot()).await;
            }
        }
    }

    async fn persist_planner_cache(&self) {
        let Some(commit_digest) = self.pending_planner_commit_digest.lock().take() else {
            return;
        };
        let snapshot = self.spec_poller.lock().await.snapshot().clone();
        if let Err(e) = self.planner_cache.write(&snapshot, &commit_digest) {
            tracing::warn!(error = %e, "failed to persist planner cache");
        }
    }

    /// §4.12 "completion-dispatch": an implementor's success transitions its
    /// work item to `review` and launches the reviewer, provided a non-draft
    /// revision already exists. No PR yet means nothing to review; the
    /// work item is left for crash recovery to reset to `pending`.
    async fn completion_dispatch(&self, work_item_id: WorkItemId) {
        let pr = match find_linked_pr(&*self.tracker, work_item_id).await {
            Ok(Some(pr)) if !pr.draft => pr,
            Ok(_) => return,
            Err(e) => {
                tracing::warn!(%work_item_id, error = %e, "completion-dispatch: failed to look up linked PR");
                return;
            }
        };

        if let Err(e) = self.tracker.add_label(work_item_id.get(), WorkItemStatus::Review.as_label()).await {
            tracing::warn!(%work_item_id, error = %e, "completion-dispatch: failed to set review label, skipping");
            return;
        }
        if let Err(e) = self.tracker.remove_label(work_item_id.get(), WorkItemStatus::InProgress.as_label()).await {
            tracing::warn!(%work_item_id, error = %e, "completion-dispatch: failed to clear in-progress label");
        }

        let work_item = {
            let mut poller = self.work_item_poller.lock().await;
            poller.snapshot_mut().set_status(work_item_id, WorkItemStatus::Review);
            poller.snapshot().get(work_item_id).cloned()
        };
        let Some(work_item) = work_item else { return };

        self.emitter.emit(&Event::WorkItemChanged {
            work_item_id,
            old_status: Some(WorkItemStatus::InProgress),
            new_status: Some(WorkItemStatus::Review),
            work_item: None,
            is_recovery: false,
            is_engine_transition: true,
        });

        let ctx = match build_pr_context(&*self.tracker, &pr).await {
            Ok(ctx) => ctx,
            Err(e) => {
                tracing::warn!(%work_item_id, error = %e, "completion-dispatch: failed to build PR context, skipping reviewer dispatch");
                return;
            }
        };
        let prompt = self.prompts.reviewer_prompt(&work_item, &ctx);
        self.commands.agent_manager().dispatch_reviewer(work_item_id, pr.head_ref.clone(), true, prompt);
    }

    async fn run_crash_recovery(&self, work_item_id: WorkItemId) {
        let agent_running = self.commands.agent_manager().is_running_for_work_item(work_item_id);
        let mut poller = self.work_item_poller.lock().await;
        let current_status = poller.snapshot().get(work_item_id).map(|w| w.status);
        crash_recovery(&*self.tracker, &self.emitter, poller.snapshot_mut(), work_item_id, current_status, agent_running).await;
    }

    /// §4.12 "Shutdown": stop the timers, reject new non-terminal events,
    /// wait (up to `shutdownTimeout`) for running sessions to finish on
    /// their own, force-cancel anything left, then drain the queue so the
    /// resulting terminal events are processed.
    async fn shutdown(&self) {
        for handle in self.timers.lock().drain(..) {
            handle.abort();
        }
        self.queue.set_rejecting(true, Some(|event: &Event| event.is_terminal_agent_event()));

        let mgr = self.commands.agent_manager();
        let mut waited = 0u64;
        while mgr.active_session_count() > 0 && waited < self.config.shutdown_timeout {
            tokio::time::sleep(Duration::from_secs(1)).await;
            waited += 1;
        }
        if mgr.active_session_count() > 0 {
            tracing::warn!("shutdown timeout elapsed with sessions still running, cancelling all");
            mgr.cancel_all().await;
        }

        while let Some(event) = self.queue.dequeue() {
            self.handle_event(event).await;
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
