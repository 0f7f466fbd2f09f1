use std::sync::Arc;

use parking_lot::Mutex;
use robot_core::{
    Command, Difficulty, EventEnvelope, FailureReason, Level, LevelCatalog, LevelId, SessionStatus,
    Verdict,
};
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::pacing::pause;
use crate::session::{RunTicket, Session, SessionSnapshot, StepPhase};
use crate::{LevelAuthor, Pacing};

pub type EventTx = broadcast::Sender<Vec<EventEnvelope>>;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// How a run ended from the caller's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Finished {
        status: SessionStatus,
        failure: Option<FailureReason>,
    },
    /// Stopped or superseded by a level load; the session is back in PLANNING.
    Cancelled,
}

impl From<Verdict> for RunOutcome {
    fn from(verdict: Verdict) -> Self {
        RunOutcome::Finished {
            status: verdict.status(),
            failure: verdict.failure(),
        }
    }
}

/// Serializes player intents onto one `Session` and publishes the resulting
/// events. Cheap to clone; clones drive the same session.
#[derive(Clone)]
pub struct SessionController {
    session: Arc<Mutex<Session>>,
    event_tx: EventTx,
    catalog: Arc<LevelCatalog>,
    author: Arc<dyn LevelAuthor>,
    pacing: Pacing,
    endless_difficulty: Difficulty,
}

impl SessionController {
    pub fn new(level: Level, catalog: LevelCatalog, author: Arc<dyn LevelAuthor>) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            session: Arc::new(Mutex::new(Session::new(level))),
            event_tx,
            catalog: Arc::new(catalog),
            author,
            pacing: Pacing::reference(),
            endless_difficulty: Difficulty::Medium,
        }
    }

    #[must_use]
    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Difficulty requested from the author once the catalog runs out.
    #[must_use]
    pub fn with_endless_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.endless_difficulty = difficulty;
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Vec<EventEnvelope>> {
        self.event_tx.subscribe()
    }

    pub fn catalog(&self) -> &LevelCatalog {
        &self.catalog
    }

    pub fn pacing(&self) -> Pacing {
        self.pacing
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.lock().snapshot()
    }

    pub fn status(&self) -> SessionStatus {
        self.session.lock().status()
    }

    /// Runs `f` under the session lock and publishes what it emitted.
    /// Returns whether the intent was accepted.
    fn apply(&self, f: impl FnOnce(&mut Session) -> Vec<EventEnvelope>) -> bool {
        let events = f(&mut *self.session.lock());
        self.publish(events)
    }

    fn publish(&self, events: Vec<EventEnvelope>) -> bool {
        if events.is_empty() {
            return false;
        }
        // No subscribers is fine.
        let _ = self.event_tx.send(events);
        true
    }

    // -----------------------------------------------------------------------
    // Intents
    // -----------------------------------------------------------------------

    pub fn append(&self, command: Command) -> bool {
        self.apply(|s| s.append(command))
    }

    pub fn remove_at(&self, index: usize) -> bool {
        self.apply(|s| s.remove_at(index))
    }

    pub fn remove_last(&self) -> bool {
        self.apply(Session::remove_last)
    }

    pub fn clear_all(&self) -> bool {
        self.apply(Session::clear_all)
    }

    pub fn reset(&self) -> bool {
        self.apply(Session::reset)
    }

    pub fn stop(&self) -> bool {
        let stopped = self.apply(Session::stop);
        if stopped {
            info!("run stopped");
        }
        stopped
    }

    pub fn load_level(&self, level: Level) -> bool {
        info!(level = %level.id, name = %level.name, "loading level");
        self.apply(|s| s.load_level(level))
    }

    /// Loads a catalog level. Unknown ids are ignored.
    pub fn load_level_by_id(&self, id: &LevelId) -> bool {
        match self.catalog.get(id) {
            Some(level) => self.load_level(level.clone()),
            None => {
                debug!(level = %id, "unknown level id");
                false
            }
        }
    }

    /// SUCCESS only: load the next catalog level, or ask the author for a
    /// fresh one once the catalog is exhausted.
    ///
    /// The session is checked again after the author returns. If it left
    /// SUCCESS on the same level in the meantime, the authored level is
    /// discarded.
    pub async fn advance_level(&self) -> bool {
        let current = {
            let session = self.session.lock();
            if session.status() != SessionStatus::Success {
                return false;
            }
            session.level().id.clone()
        };
        let next = match self.catalog.next_after(&current) {
            Some(level) => level.clone(),
            None => {
                info!(difficulty = %self.endless_difficulty, "catalog exhausted, requesting level");
                self.author.request_level(self.endless_difficulty).await
            }
        };
        info!(level = %next.id, name = %next.name, "advancing to level");
        let advanced = self.apply(|s| {
            if s.status() == SessionStatus::Success && s.level().id == current {
                s.load_level(next)
            } else {
                Vec::new()
            }
        });
        if !advanced {
            debug!(level = %current, "session moved on while authoring, advance dropped");
        }
        advanced
    }

    /// Always legal: replaces the current level with a freshly authored one.
    pub async fn generate_level(&self, difficulty: Difficulty) -> bool {
        let level = self.author.request_level(difficulty).await;
        self.load_level(level)
    }

    /// Executes the queue with paced playback.
    ///
    /// Returns `None` when the run is rejected (empty queue, or not in
    /// PLANNING). Holds the session lock only between suspension points, so
    /// `stop` and `load_level` from another task land between steps.
    pub async fn run(&self) -> Option<RunOutcome> {
        let begun = self.session.lock().begin_run();
        let (ticket, events) = begun?;
        self.publish(events);
        info!(run = ticket.id.0, commands = ticket.commands.len(), "run started");

        let outcome = self.play(&ticket).await;
        match outcome {
            RunOutcome::Finished { status, failure } => {
                info!(run = ticket.id.0, ?status, ?failure, "run finished");
            }
            RunOutcome::Cancelled => info!(run = ticket.id.0, "run cancelled"),
        }
        Some(outcome)
    }

    async fn play(&self, ticket: &RunTicket) -> RunOutcome {
        if !pause(self.pacing.settle(), &ticket.token).await {
            return RunOutcome::Cancelled;
        }

        for (index, command) in ticket.commands.iter().enumerate() {
            let marked = self.session.lock().mark_step(ticket, index);
            let Some(events) = marked else {
                return RunOutcome::Cancelled;
            };
            self.publish(events);
            debug!(run = ticket.id.0, index, %command, "step");

            if !pause(self.pacing.step(), &ticket.token).await {
                return RunOutcome::Cancelled;
            }

            let committed = self.session.lock().commit_step(ticket, index);
            let Some((phase, events)) = committed else {
                return RunOutcome::Cancelled;
            };
            self.publish(events);
            if let StepPhase::Finished(verdict) = phase {
                return verdict.into();
            }
        }

        let finished = self.session.lock().finish_exhausted(ticket);
        match finished {
            Some((verdict, events)) => {
                self.publish(events);
                verdict.into()
            }
            None => RunOutcome::Cancelled,
        }
    }
}
