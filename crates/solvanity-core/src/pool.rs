//! Worker pool orchestration
//!
//! Runs several independent [`SearchLoop`]s against one pattern, folds their
//! progress into a single stream and resolves on the first success.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{select, unbounded, Receiver, Sender};
use serde::Serialize;
use tracing::{debug, info, warn};

use solvanity_crypto::{KeyMaterial, KeypairSource, OsKeypairSource};
use solvanity_pattern::{PatternPosition, VanityPattern};

use crate::aggregate::{AggregateProgress, ProgressAggregator, WorkerProgress};
use crate::config::{available_parallelism, clamp_workers, SearchConfig};
use crate::error::SearchError;
use crate::protocol::{Command, Event};
use crate::search_loop::{LoopPhase, SearchLoop};

/// The winning keypair and how it was found
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// Base58 address
    pub public_key: String,
    /// Full keypair; the caller owns it from here on
    #[serde(rename = "secretKey")]
    pub keypair: KeyMaterial,
    /// Attempts made by the winning worker
    pub attempts: u64,
    /// Attempts made by all workers
    pub total_attempts: u64,
    /// Unpaused time the winning worker searched
    pub duration_ms: u64,
    pub worker_id: usize,
}

/// Intermediate notifications while a search runs
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SearchUpdate {
    Progress(AggregateProgress),
    /// Every live worker has acknowledged a pause
    Paused,
    /// Workers are searching again after a full pause
    Resumed,
    /// One worker stopped with an error; the others continue
    WorkerFailed { worker_id: usize, reason: String },
}

/// How a search ended
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Found(SearchResult),
    Cancelled(AggregateProgress),
    /// Every worker failed
    Failed { reasons: Vec<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    Pause,
    Resume,
    Cancel,
}

/// Cloneable handle for pausing, resuming or cancelling a running search.
#[derive(Debug, Clone)]
pub struct SearchController {
    inbox: Sender<Control>,
}

impl SearchController {
    /// Returns false once the search has ended.
    pub fn pause(&self) -> bool {
        self.inbox.send(Control::Pause).is_ok()
    }

    /// Returns false once the search has ended.
    pub fn resume(&self) -> bool {
        self.inbox.send(Control::Resume).is_ok()
    }

    /// Returns false once the search has ended.
    pub fn cancel(&self) -> bool {
        self.inbox.send(Control::Cancel).is_ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WorkerStatus {
    Running,
    Paused,
    Stopped,
}

/// What the orchestrator should do after an event
#[derive(Debug, PartialEq)]
enum Verdict {
    Update(SearchUpdate),
    /// First success: surface it and release the listed workers
    Winner {
        result: SearchResult,
        release: Vec<usize>,
    },
    /// No live workers remain and none succeeded
    Exhausted { reasons: Vec<String> },
    Ignore,
}

/// Decides the fate of the search from worker events.
///
/// Once settled (by a success, a cancel or exhaustion) every later event is
/// ignored, so at most one success is ever surfaced.
#[derive(Debug)]
struct Arbiter {
    status: BTreeMap<usize, WorkerStatus>,
    aggregator: ProgressAggregator,
    failures: Vec<String>,
    all_paused: bool,
    settled: bool,
}

impl Arbiter {
    fn new(worker_ids: impl IntoIterator<Item = usize>) -> Self {
        Self {
            status: worker_ids
                .into_iter()
                .map(|id| (id, WorkerStatus::Running))
                .collect(),
            aggregator: ProgressAggregator::new(),
            failures: Vec::new(),
            all_paused: false,
            settled: false,
        }
    }

    fn progress(&self) -> AggregateProgress {
        self.aggregator.snapshot()
    }

    fn live_workers(&self) -> Vec<usize> {
        self.status
            .iter()
            .filter(|(_, s)| **s != WorkerStatus::Stopped)
            .map(|(id, _)| *id)
            .collect()
    }

    fn stop(&mut self, worker_id: usize) {
        self.status.insert(worker_id, WorkerStatus::Stopped);
        self.aggregator.mark_stopped(worker_id);
    }

    /// Settle the search and return the workers that still need releasing.
    fn cancel(&mut self) -> Vec<usize> {
        self.settled = true;
        let live = self.live_workers();
        for id in &live {
            self.stop(*id);
        }
        live
    }

    fn on_event(&mut self, event: Event) -> Verdict {
        if self.settled {
            return Verdict::Ignore;
        }

        match event {
            Event::Progress {
                attempts,
                rate,
                elapsed_ms,
                worker_id,
            } => {
                if self.status.get(&worker_id) == Some(&WorkerStatus::Stopped) {
                    return Verdict::Ignore;
                }
                let progress = WorkerProgress {
                    attempts,
                    rate,
                    elapsed_ms,
                };
                Verdict::Update(SearchUpdate::Progress(self.aggregator.record(worker_id, progress)))
            }
            Event::Success {
                public_key,
                keypair,
                attempts,
                duration_ms,
                worker_id,
            } => {
                self.aggregator.record(
                    worker_id,
                    WorkerProgress {
                        attempts,
                        rate: 0.0,
                        elapsed_ms: duration_ms,
                    },
                );
                self.stop(worker_id);
                let total_attempts = self.aggregator.snapshot().total_attempts;
                let release = self.cancel();

                Verdict::Winner {
                    result: SearchResult {
                        public_key,
                        keypair,
                        attempts,
                        total_attempts,
                        duration_ms,
                        worker_id,
                    },
                    release,
                }
            }
            Event::Paused { worker_id } => {
                if let Some(status) = self.status.get_mut(&worker_id) {
                    if *status == WorkerStatus::Running {
                        *status = WorkerStatus::Paused;
                    }
                }
                let live = self.live_workers();
                let every_live_paused = !live.is_empty()
                    && live
                        .iter()
                        .all(|id| self.status.get(id) == Some(&WorkerStatus::Paused));
                if every_live_paused && !self.all_paused {
                    self.all_paused = true;
                    Verdict::Update(SearchUpdate::Paused)
                } else {
                    Verdict::Ignore
                }
            }
            Event::Resumed { worker_id } => {
                if let Some(status) = self.status.get_mut(&worker_id) {
                    if *status == WorkerStatus::Paused {
                        *status = WorkerStatus::Running;
                    }
                }
                if self.all_paused {
                    self.all_paused = false;
                    Verdict::Update(SearchUpdate::Resumed)
                } else {
                    Verdict::Ignore
                }
            }
            Event::Cancelled { worker_id } => {
                self.stop(worker_id);
                self.check_exhausted().unwrap_or(Verdict::Ignore)
            }
            Event::Error { reason, worker_id } => {
                self.stop(worker_id);
                self.failures.push(format!("worker {}: {}", worker_id, reason));
                self.check_exhausted()
                    .unwrap_or(Verdict::Update(SearchUpdate::WorkerFailed { worker_id, reason }))
            }
        }
    }

    fn check_exhausted(&mut self) -> Option<Verdict> {
        if self.live_workers().is_empty() {
            self.settled = true;
            Some(Verdict::Exhausted {
                reasons: self.failures.clone(),
            })
        } else {
            None
        }
    }
}

struct WorkerHandle {
    id: usize,
    commands: Sender<Command>,
    thread: Option<JoinHandle<LoopPhase>>,
}

impl WorkerHandle {
    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            debug!(worker_id = self.id, "Worker no longer accepts commands");
        }
    }

    /// Cancel the loop and join its thread. Only the first call has any effect.
    fn release(&mut self) -> bool {
        let Some(thread) = self.thread.take() else {
            return false;
        };
        // Already-finished loops have dropped their receiver; that's fine.
        let _ = self.commands.send(Command::Cancel);
        match thread.join() {
            Ok(phase) => debug!(worker_id = self.id, ?phase, "Worker released"),
            Err(_) => warn!(worker_id = self.id, "Worker thread panicked"),
        }
        true
    }
}

/// A running multi-worker vanity search.
///
/// Dropping it stops and joins every worker.
pub struct VanitySearch {
    pattern: VanityPattern,
    workers: Vec<WorkerHandle>,
    events: Receiver<Event>,
    control_tx: Sender<Control>,
    control_rx: Receiver<Control>,
    arbiter: Arbiter,
}

impl VanitySearch {
    /// Start a search using the OS random source
    pub fn start(pattern: VanityPattern, config: &SearchConfig) -> Result<Self, SearchError> {
        Self::start_with_source(pattern, config, Arc::new(OsKeypairSource))
    }

    /// Validate raw pattern text, then start. Nothing is spawned if the
    /// pattern is rejected.
    pub fn start_characters(
        characters: &str,
        position: PatternPosition,
        config: &SearchConfig,
    ) -> Result<Self, SearchError> {
        let pattern = VanityPattern::new(characters, position)?;
        Self::start(pattern, config)
    }

    /// Start a search drawing keypairs from `source`
    pub fn start_with_source(
        pattern: VanityPattern,
        config: &SearchConfig,
        source: Arc<dyn KeypairSource>,
    ) -> Result<Self, SearchError> {
        let requested = config.requested_workers();
        let available = available_parallelism();
        let count = clamp_workers(requested, available);
        if count != requested {
            info!(requested, available, count, "Clamped worker count");
        }
        Self::launch(pattern, config, source, count)
    }

    fn launch(
        pattern: VanityPattern,
        config: &SearchConfig,
        source: Arc<dyn KeypairSource>,
        count: usize,
    ) -> Result<Self, SearchError> {
        let (event_tx, events) = unbounded();
        let mut workers = Vec::with_capacity(count);
        let mut spawn_error = None;

        for id in 0..count {
            let (commands, inbox) = unbounded();
            let search_loop = SearchLoop::new(inbox, event_tx.clone(), source.clone());

            match thread::Builder::new()
                .name(format!("vanity-worker-{}", id))
                .spawn(move || search_loop.run())
            {
                Ok(thread) => workers.push(WorkerHandle {
                    id,
                    commands,
                    thread: Some(thread),
                }),
                Err(e) => {
                    warn!(worker_id = id, "Could not spawn worker thread: {}", e);
                    spawn_error = Some(e.to_string());
                    break;
                }
            }
        }
        // Workers hold the only senders now, so the inbox closes when they all exit.
        drop(event_tx);

        if workers.is_empty() {
            return Err(SearchError::ResourceExhausted(
                spawn_error.unwrap_or_else(|| "no workers requested".to_string()),
            ));
        }

        let progress_interval_ms = config.progress_interval().as_millis() as u64;
        let yield_interval_attempts = config.yield_interval();
        for worker in &workers {
            worker.send(Command::Generate {
                characters: pattern.characters().to_string(),
                position: pattern.position(),
                worker_id: worker.id,
                progress_interval_ms,
                yield_interval_attempts,
            });
        }

        info!(
            pattern = %pattern,
            workers = workers.len(),
            profile = %config.profile,
            "Search started"
        );

        let (control_tx, control_rx) = unbounded();
        let arbiter = Arbiter::new(workers.iter().map(|w| w.id));

        Ok(Self {
            pattern,
            workers,
            events,
            control_tx,
            control_rx,
            arbiter,
        })
    }

    pub fn pattern(&self) -> &VanityPattern {
        &self.pattern
    }

    /// Number of workers actually running
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    pub fn controller(&self) -> SearchController {
        SearchController {
            inbox: self.control_tx.clone(),
        }
    }

    /// Block until the search is found, cancelled or has failed.
    ///
    /// `on_update` is called on this thread for each aggregated update. No
    /// update is delivered once the outcome is decided, and every worker has
    /// been joined by the time this returns.
    pub fn run<F>(mut self, mut on_update: F) -> SearchOutcome
    where
        F: FnMut(&SearchUpdate),
    {
        let control_rx = self.control_rx.clone();
        let events = self.events.clone();

        let outcome = 'search: loop {
            // Control requests go ahead of any queued worker event.
            while let Ok(control) = control_rx.try_recv() {
                if let Some(outcome) = self.apply(control) {
                    break 'search outcome;
                }
            }

            select! {
                recv(control_rx) -> control => {
                    if let Ok(control) = control {
                        if let Some(outcome) = self.apply(control) {
                            break 'search outcome;
                        }
                    }
                }
                recv(events) -> event => {
                    let Ok(event) = event else {
                        // Every worker exited without a decisive event.
                        let mut reasons = self.arbiter.failures.clone();
                        reasons.push("all workers exited".to_string());
                        break 'search SearchOutcome::Failed { reasons };
                    };

                    // select! picks at random when both are ready; a raced request still wins.
                    while let Ok(control) = control_rx.try_recv() {
                        if let Some(outcome) = self.apply(control) {
                            break 'search outcome;
                        }
                    }

                    match self.arbiter.on_event(event) {
                        Verdict::Update(update) => on_update(&update),
                        Verdict::Winner { result, release } => {
                            info!(
                                worker_id = result.worker_id,
                                attempts = result.total_attempts,
                                address = %result.public_key,
                                "Search succeeded"
                            );
                            self.release(&release);
                            break 'search SearchOutcome::Found(result);
                        }
                        Verdict::Exhausted { reasons } => {
                            warn!(failures = reasons.len(), "Every worker failed");
                            break 'search SearchOutcome::Failed { reasons };
                        }
                        Verdict::Ignore => {}
                    }
                }
            }
        };

        self.release_all();
        outcome
    }

    fn apply(&mut self, control: Control) -> Option<SearchOutcome> {
        match control {
            Control::Pause => {
                self.broadcast(Command::Pause);
                None
            }
            Control::Resume => {
                self.broadcast(Command::Resume);
                None
            }
            Control::Cancel => {
                let live = self.arbiter.cancel();
                let progress = self.arbiter.progress();
                info!(attempts = progress.total_attempts, "Search cancelled");
                self.release(&live);
                Some(SearchOutcome::Cancelled(progress))
            }
        }
    }

    fn broadcast(&self, command: Command) {
        let live = self.arbiter.live_workers();
        for worker in self.workers.iter().filter(|w| live.contains(&w.id)) {
            worker.send(command.clone());
        }
    }

    fn release(&mut self, ids: &[usize]) {
        for worker in self.workers.iter_mut().filter(|w| ids.contains(&w.id)) {
            worker.release();
        }
    }

    fn release_all(&mut self) {
        for worker in &mut self.workers {
            worker.release();
        }
    }
}

impl Drop for VanitySearch {
    fn drop(&mut self) {
        self.release_all();
    }
}
