//! `robot_control`: session state machine and paced, cancellable playback.
//!
//! The session owns all mutable game state. Playback runs as one async task
//! that suspends between steps; only a stop or a level load may interleave.

mod author;
mod cancel;
mod controller;
mod pacing;
mod session;

pub use author::{FixedAuthor, LevelAuthor};
pub use cancel::CancelToken;
pub use controller::{EventTx, RunOutcome, SessionController};
pub use pacing::Pacing;
pub use session::{RunId, RunTicket, Session, SessionSnapshot, StepPhase};
