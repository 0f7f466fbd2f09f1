use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::CancelToken;

/// Playback delays.
///
/// `settle` runs once before the first step; `step` runs after each step is
/// marked active and before its move is checked and committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pacing {
    pub settle_ms: u64,
    pub step_ms: u64,
}

impl Pacing {
    /// 500 ms settle, 600 ms per step.
    pub const fn reference() -> Self {
        Self {
            settle_ms: 500,
            step_ms: 600,
        }
    }

    /// No delays. Playback still yields to the scheduler at every
    /// suspension point so a stop can land between steps.
    pub const fn instant() -> Self {
        Self {
            settle_ms: 0,
            step_ms: 0,
        }
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn step(&self) -> Duration {
        Duration::from_millis(self.step_ms)
    }

    /// Total paced duration of an uncancelled run over `commands` steps.
    pub fn run_duration(&self, commands: usize) -> Duration {
        self.settle() + self.step() * u32::try_from(commands).unwrap_or(u32::MAX)
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self::reference()
    }
}

/// Suspends for `duration`. Returns `false` if `token` was cancelled before
/// or during the wait.
pub(crate) async fn pause(duration: Duration, token: &CancelToken) -> bool {
    if duration.is_zero() {
        tokio::task::yield_now().await;
        return !token.is_cancelled();
    }
    tokio::select! {
        () = tokio::time::sleep(duration) => !token.is_cancelled(),
        () = token.cancelled() => false,
    }
}
