//! Planning → running → terminal state machine.
//!
//! Every intent returns the events it produced. A rejected intent is a
//! silent no-op and returns no events.

use std::sync::Arc;

use robot_core::{
    emit, judge_exhausted, step, Command, CommandQueue, Event, EventEnvelope, FailureReason, Level,
    Position, RobotState, SessionStatus, StepResult, Verdict,
};
use serde::Serialize;

use crate::CancelToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RunId(pub u64);

/// Private handle for one run. Holds the command snapshot taken at run start
/// and the token the session signals on stop.
#[derive(Debug, Clone)]
pub struct RunTicket {
    pub id: RunId,
    pub token: CancelToken,
    pub commands: Arc<[Command]>,
}

/// Whether playback should keep stepping after a committed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepPhase {
    Continue,
    Finished(Verdict),
}

/// Read-only view handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub level: Level,
    pub robot: RobotState,
    pub queue: Vec<Command>,
    pub status: SessionStatus,
    pub active_index: Option<usize>,
    pub last_failure: Option<FailureReason>,
}

#[derive(Debug)]
pub struct Session {
    level: Level,
    queue: CommandQueue,
    robot: RobotState,
    status: SessionStatus,
    active_index: Option<usize>,
    last_failure: Option<FailureReason>,
    run: Option<RunTicket>,
    next_event_id: u64,
    next_run_id: u64,
}

impl Session {
    pub fn new(level: Level) -> Self {
        Self {
            robot: RobotState::at_start(&level),
            level,
            queue: CommandQueue::new(),
            status: SessionStatus::Planning,
            active_index: None,
            last_failure: None,
            run: None,
            next_event_id: 0,
            next_run_id: 0,
        }
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn queue(&self) -> &CommandQueue {
        &self.queue
    }

    pub fn robot(&self) -> RobotState {
        self.robot
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active_index
    }

    pub fn last_failure(&self) -> Option<FailureReason> {
        self.last_failure
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            level: self.level.clone(),
            robot: self.robot,
            queue: self.queue.snapshot(),
            status: self.status,
            active_index: self.active_index,
            last_failure: self.last_failure,
        }
    }

    fn emit(&mut self, event: Event) -> EventEnvelope {
        emit(&mut self.next_event_id, event)
    }

    fn queue_changed(&mut self) -> Vec<EventEnvelope> {
        let len = self.queue.len();
        vec![self.emit(Event::QueueChanged { len })]
    }

    /// Robot back on start, no active step, status PLANNING.
    fn park(&mut self) {
        self.robot = RobotState::at_start(&self.level);
        self.status = SessionStatus::Planning;
        self.active_index = None;
        self.last_failure = None;
    }

    fn cancel_run(&mut self) -> bool {
        match self.run.take() {
            Some(ticket) => {
                ticket.token.cancel();
                true
            }
            None => false,
        }
    }

    // -----------------------------------------------------------------------
    // Queue intents (PLANNING only)
    // -----------------------------------------------------------------------

    pub fn append(&mut self, command: Command) -> Vec<EventEnvelope> {
        if self.status != SessionStatus::Planning {
            return Vec::new();
        }
        self.queue.push(command);
        self.queue_changed()
    }

    pub fn remove_at(&mut self, index: usize) -> Vec<EventEnvelope> {
        if self.status != SessionStatus::Planning || self.queue.remove_at(index).is_none() {
            return Vec::new();
        }
        self.queue_changed()
    }

    pub fn remove_last(&mut self) -> Vec<EventEnvelope> {
        if self.status != SessionStatus::Planning || self.queue.pop().is_none() {
            return Vec::new();
        }
        self.queue_changed()
    }

    /// Empties the queue and returns to a clean PLANNING state. Rejected
    /// while RUNNING.
    pub fn clear_all(&mut self) -> Vec<EventEnvelope> {
        if self.status == SessionStatus::Running {
            return Vec::new();
        }
        self.queue.clear();
        self.park();
        let mut events = self.queue_changed();
        let position = self.robot.position;
        events.push(self.emit(Event::SessionReset { position }));
        events
    }

    // -----------------------------------------------------------------------
    // Session intents
    // -----------------------------------------------------------------------

    /// SUCCESS/FAILED → PLANNING with the robot on start. The queue is kept.
    pub fn reset(&mut self) -> Vec<EventEnvelope> {
        if !self.status.is_terminal() {
            return Vec::new();
        }
        self.park();
        let position = self.robot.position;
        vec![self.emit(Event::SessionReset { position })]
    }

    /// RUNNING → PLANNING. Signals the run's token; the robot goes back to
    /// start rather than freezing where it was.
    pub fn stop(&mut self) -> Vec<EventEnvelope> {
        if self.status != SessionStatus::Running || !self.cancel_run() {
            return Vec::new();
        }
        let active_index = self.active_index;
        self.park();
        vec![self.emit(Event::RunCancelled { active_index })]
    }

    /// Always legal. Cancels any active run, replaces the level, clears the
    /// queue and parks the robot on the new start.
    pub fn load_level(&mut self, level: Level) -> Vec<EventEnvelope> {
        let mut events = Vec::new();
        if self.cancel_run() {
            let active_index = self.active_index;
            events.push(self.emit(Event::RunCancelled { active_index }));
        }
        self.level = level;
        self.queue.clear();
        self.park();
        let level_id = self.level.id.clone();
        let start = self.level.start;
        events.push(self.emit(Event::LevelLoaded { level_id, start }));
        events
    }

    // -----------------------------------------------------------------------
    // Run lifecycle, driven by playback
    // -----------------------------------------------------------------------

    /// PLANNING with a non-empty queue → RUNNING. Returns the ticket that
    /// playback must present for every later step.
    pub fn begin_run(&mut self) -> Option<(RunTicket, Vec<EventEnvelope>)> {
        if self.status != SessionStatus::Planning || self.queue.is_empty() || self.run.is_some() {
            return None;
        }
        let ticket = RunTicket {
            id: RunId(self.next_run_id),
            token: CancelToken::new(),
            commands: self.queue.snapshot().into(),
        };
        self.next_run_id += 1;
        self.run = Some(ticket.clone());
        self.park();
        self.status = SessionStatus::Running;
        let commands = ticket.commands.len();
        let events = vec![self.emit(Event::RunStarted { commands })];
        Some((ticket, events))
    }

    fn is_current(&self, ticket: &RunTicket) -> bool {
        !ticket.token.is_cancelled()
            && self.status == SessionStatus::Running
            && self.run.as_ref().is_some_and(|run| run.id == ticket.id)
    }

    /// Marks `index` active and turns the robot toward its command.
    /// `None` when the run was stopped or replaced.
    pub fn mark_step(&mut self, ticket: &RunTicket, index: usize) -> Option<Vec<EventEnvelope>> {
        if !self.is_current(ticket) {
            return None;
        }
        let command = *ticket.commands.get(index)?;
        self.active_index = Some(index);
        self.robot.facing = command;
        Some(vec![self.emit(Event::StepStarted {
            index,
            facing: command,
        })])
    }

    /// Checks and commits the move at `index`. A collision ends the run
    /// FAILED with the robot left on its last committed cell.
    pub fn commit_step(
        &mut self,
        ticket: &RunTicket,
        index: usize,
    ) -> Option<(StepPhase, Vec<EventEnvelope>)> {
        if !self.is_current(ticket) {
            return None;
        }
        let command = *ticket.commands.get(index)?;
        match step(&self.level, &mut self.robot, command) {
            StepResult::Moved { from, to } => {
                let events = vec![self.emit(Event::RobotMoved { index, from, to })];
                Some((StepPhase::Continue, events))
            }
            StepResult::Collided {
                attempted,
                collision,
            } => {
                let collided = self.emit(Event::Collided {
                    index,
                    attempted,
                    collision,
                });
                let verdict = Verdict::Failed(FailureReason::Collision {
                    index,
                    attempted,
                    collision,
                });
                let mut events = vec![collided];
                events.extend(self.finish(verdict));
                Some((StepPhase::Finished(verdict), events))
            }
        }
    }

    /// Judges a run whose queue ran out without a collision.
    pub fn finish_exhausted(&mut self, ticket: &RunTicket) -> Option<(Verdict, Vec<EventEnvelope>)> {
        if !self.is_current(ticket) {
            return None;
        }
        let verdict = judge_exhausted(&self.level, &self.robot);
        Some((verdict, self.finish(verdict)))
    }

    /// Freezes the robot and records the terminal status. The queue and the
    /// active index are left as they were.
    fn finish(&mut self, verdict: Verdict) -> Vec<EventEnvelope> {
        self.run = None;
        self.status = verdict.status();
        self.last_failure = verdict.failure();
        let position: Position = self.robot.position;
        vec![self.emit(Event::RunFinished {
            status: self.status,
            position,
            failure: self.last_failure,
        })]
    }
}
