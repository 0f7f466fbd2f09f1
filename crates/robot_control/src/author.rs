use async_trait::async_trait;
use robot_core::{Difficulty, Level};

/// External level-authoring collaborator.
///
/// Always yields a playable `Level`: implementations absorb their own
/// failures into a fallback level and never surface an error to the session.
#[async_trait]
pub trait LevelAuthor: Send + Sync {
    async fn request_level(&self, difficulty: Difficulty) -> Level;
}

/// Hands out the same level for every request.
#[derive(Debug, Clone)]
pub struct FixedAuthor {
    level: Level,
}

impl FixedAuthor {
    pub fn new(level: Level) -> Self {
        Self { level }
    }
}

#[async_trait]
impl LevelAuthor for FixedAuthor {
    async fn request_level(&self, _difficulty: Difficulty) -> Level {
        self.level.clone()
    }
}
