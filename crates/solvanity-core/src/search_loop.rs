//! Single-worker search loop
//!
//! A loop owns its [`SearchState`] and talks to the outside world only
//! through its command receiver and event sender:
//!
//! ```text
//! Idle -> Running -> {Paused <-> Running} -> {Succeeded | Cancelled | Failed}
//! ```

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use tracing::{debug, info, warn};

use solvanity_crypto::KeypairSource;
use solvanity_pattern::VanityPattern;

use crate::protocol::{Command, Event};
use crate::state::SearchState;

/// Lifecycle of a loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    Idle,
    Running,
    Paused,
    Succeeded,
    Cancelled,
    Failed,
}

impl LoopPhase {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            LoopPhase::Succeeded | LoopPhase::Cancelled | LoopPhase::Failed
        )
    }
}

/// Parameters taken from a `generate` command
#[derive(Debug, Clone)]
struct Job {
    pattern: VanityPattern,
    worker_id: usize,
    progress_interval: Duration,
    yield_interval: u64,
}

/// One independent generate-encode-test loop.
pub struct SearchLoop {
    commands: Receiver<Command>,
    events: Sender<Event>,
    source: Arc<dyn KeypairSource>,
    phase: LoopPhase,
}

impl SearchLoop {
    pub fn new(
        commands: Receiver<Command>,
        events: Sender<Event>,
        source: Arc<dyn KeypairSource>,
    ) -> Self {
        Self {
            commands,
            events,
            source,
            phase: LoopPhase::Idle,
        }
    }

    /// Wait for `generate`, then search until a terminal state.
    ///
    /// Returns the final phase. A loop whose command channel disconnects
    /// exits quietly as `Cancelled`.
    pub fn run(mut self) -> LoopPhase {
        if let Some(job) = self.wait_for_generate() {
            self.search(job);
        }
        self.phase
    }

    fn wait_for_generate(&mut self) -> Option<Job> {
        loop {
            let command = match self.commands.recv() {
                Ok(command) => command,
                Err(_) => {
                    self.phase = LoopPhase::Cancelled;
                    return None;
                }
            };

            match command {
                Command::Generate {
                    characters,
                    position,
                    worker_id,
                    progress_interval_ms,
                    yield_interval_attempts,
                } => {
                    return match VanityPattern::new(characters, position) {
                        Ok(pattern) => Some(Job {
                            pattern,
                            worker_id,
                            progress_interval: Duration::from_millis(progress_interval_ms),
                            yield_interval: yield_interval_attempts.max(1),
                        }),
                        Err(e) => {
                            warn!(worker_id, "Rejecting generate: {}", e);
                            self.fail(worker_id, e.to_string());
                            None
                        }
                    };
                }
                Command::Cancel => {
                    self.phase = LoopPhase::Cancelled;
                    // Worker id is unknown before generate; 0 is the protocol default.
                    self.emit(Event::Cancelled { worker_id: 0 });
                    return None;
                }
                Command::Pause | Command::Resume => {
                    debug!("Ignoring {:?} on idle loop", command);
                }
            }
        }
    }

    fn search(&mut self, job: Job) {
        let worker_id = job.worker_id;
        let mut state = SearchState::new();
        let mut last_progress = Instant::now();
        self.phase = LoopPhase::Running;

        debug!(worker_id, pattern = %job.pattern, "Search loop started");

        loop {
            if self.handle_commands(&mut state, worker_id) {
                return;
            }

            let keypair = match self.source.generate() {
                Ok(keypair) => keypair,
                Err(e) => {
                    warn!(worker_id, attempts = state.attempts(), "Key generation failed: {}", e);
                    self.fail(worker_id, e.to_string());
                    return;
                }
            };

            let address = keypair.address();
            let attempts = state.record_attempt();

            if job.pattern.matches(&address) {
                let duration = state.elapsed();
                info!(worker_id, attempts, %address, "Match found");
                self.phase = LoopPhase::Succeeded;
                self.emit(Event::Success {
                    public_key: address,
                    keypair,
                    attempts,
                    duration_ms: duration.as_millis() as u64,
                    worker_id,
                });
                return;
            }

            let now = Instant::now();
            if now.duration_since(last_progress) >= job.progress_interval {
                last_progress = now;
                let delivered = self.emit(Event::Progress {
                    attempts,
                    rate: state.rate_at(now),
                    elapsed_ms: state.elapsed_at(now).as_millis() as u64,
                    worker_id,
                });
                if !delivered {
                    // Nobody is listening any more.
                    self.phase = LoopPhase::Cancelled;
                    return;
                }
            }

            if attempts % job.yield_interval == 0 {
                thread::yield_now();
            }
        }
    }

    /// Apply pending commands. Blocks while paused.
    ///
    /// Returns true once the loop has reached a terminal state.
    fn handle_commands(&mut self, state: &mut SearchState, worker_id: usize) -> bool {
        loop {
            let next = if state.is_paused() {
                self.commands.recv().map_err(|_| TryRecvError::Disconnected)
            } else {
                self.commands.try_recv()
            };

            let command = match next {
                Ok(command) => command,
                Err(TryRecvError::Empty) => return false,
                Err(TryRecvError::Disconnected) => {
                    debug!(worker_id, "Command channel closed, stopping");
                    self.phase = LoopPhase::Cancelled;
                    return true;
                }
            };

            match command {
                Command::Pause => {
                    if state.pause_at(Instant::now()) {
                        debug!(worker_id, attempts = state.attempts(), "Paused");
                    }
                    self.phase = LoopPhase::Paused;
                    self.emit(Event::Paused { worker_id });
                }
                Command::Resume => {
                    if state.resume_at(Instant::now()) {
                        debug!(worker_id, "Resumed");
                    }
                    self.phase = LoopPhase::Running;
                    self.emit(Event::Resumed { worker_id });
                }
                Command::Cancel => {
                    debug!(worker_id, attempts = state.attempts(), "Cancelled");
                    self.phase = LoopPhase::Cancelled;
                    self.emit(Event::Cancelled { worker_id });
                    return true;
                }
                Command::Generate { .. } => {
                    debug!(worker_id, "Ignoring generate on running loop");
                }
            }
        }
    }

    fn fail(&mut self, worker_id: usize, reason: String) {
        self.phase = LoopPhase::Failed;
        self.emit(Event::Error { reason, worker_id });
    }

    fn emit(&self, event: Event) -> bool {
        self.events.send(event).is_ok()
    }
}
