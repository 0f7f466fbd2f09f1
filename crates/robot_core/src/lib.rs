//! `robot_core`: grid robot puzzle model and step simulation.
//!
//! No IO, no async, no clocks. Pacing and cancellation live in `robot_control`.

mod catalog;
mod engine;
mod id;
mod queue;
mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod test_fixtures;

pub use catalog::LevelCatalog;
pub use engine::{check_collision, judge_exhausted, simulate, step, RunTrace, StepResult, Verdict};
pub use id::{generate_level_id, generate_uuid};
pub use queue::CommandQueue;
pub use types::*;

/// Wraps `event` with the next sequential event id.
pub fn emit(next_event_id: &mut u64, event: Event) -> EventEnvelope {
    let id = EventId(format!("evt_{:06}", *next_event_id));
    *next_event_id += 1;
    EventEnvelope { id, event }
}

#[cfg(test)]
mod tests;
