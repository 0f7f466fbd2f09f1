//! Type definitions for `robot_core`.
//!
//! Grid geometry, levels, robot state, session status and the event types
//! emitted while a session is driven.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// ID newtypes
// ---------------------------------------------------------------------------

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(EventId);

/// Stable level identifier. Content may spell it as a number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct LevelId(pub String);

impl LevelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for LevelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for LevelId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(n) => LevelId(n.to_string()),
            Raw::Text(s) => LevelId(s),
        })
    }
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// Grid cell. Signed so an attempted step off the west or north edge is
/// representable before the collision check rejects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The neighbouring cell one step in `direction`. Never clamps.
    #[must_use]
    pub fn offset(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn manhattan(self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// A single queued move. Carries no robot state until it is executed.
pub type Command = Direction;

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit displacement; y grows downward.
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Clockwise rotation from the east-facing sprite.
    pub const fn rotation_degrees(self) -> u16 {
        match self {
            Direction::Right => 0,
            Direction::Down => 90,
            Direction::Left => 180,
            Direction::Up => 270,
        }
    }

    pub const fn glyph(self) -> char {
        match self {
            Direction::Up => '↑',
            Direction::Down => '↓',
            Direction::Left => '←',
            Direction::Right => '→',
        }
    }

    fn from_symbol(symbol: char) -> Option<Self> {
        match symbol.to_ascii_uppercase() {
            'U' | '↑' => Some(Direction::Up),
            'D' | '↓' => Some(Direction::Down),
            'L' | '←' => Some(Direction::Left),
            'R' | '→' => Some(Direction::Right),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Up => "UP",
            Direction::Down => "DOWN",
            Direction::Left => "LEFT",
            Direction::Right => "RIGHT",
        };
        f.write_str(name)
    }
}

impl FromStr for Direction {
    type Err = ParseMoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "up" => return Ok(Direction::Up),
            "down" => return Ok(Direction::Down),
            "left" => return Ok(Direction::Left),
            "right" => return Ok(Direction::Right),
            _ => {}
        }
        let mut chars = trimmed.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Direction::from_symbol(c).ok_or(ParseMoveError {
                symbol: c,
                offset: 0,
            }),
            (first, _) => Err(ParseMoveError {
                symbol: first.unwrap_or(' '),
                offset: 0,
            }),
        }
    }
}

/// Unrecognised symbol in a move string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseMoveError {
    pub symbol: char,
    /// Character offset into the parsed input.
    pub offset: usize,
}

impl fmt::Display for ParseMoveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown move '{}' at offset {} (expected U, D, L or R)",
            self.symbol, self.offset
        )
    }
}

impl std::error::Error for ParseMoveError {}

/// Parses a compact move string such as `"RRDD"` or `"R, R, D"`.
///
/// Whitespace and commas are separators; every other character must name a
/// direction.
pub fn parse_moves(input: &str) -> Result<Vec<Command>, ParseMoveError> {
    input
        .chars()
        .enumerate()
        .filter(|(_, c)| !c.is_whitespace() && *c != ',')
        .map(|(offset, symbol)| {
            Direction::from_symbol(symbol).ok_or(ParseMoveError { symbol, offset })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        };
        f.write_str(name)
    }
}

/// A puzzle definition. Immutable once selected; switching levels replaces it
/// wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Level {
    pub id: LevelId,
    pub name: String,
    /// Side length N of the N×N grid.
    pub grid_size: u32,
    pub start: Position,
    pub goal: Position,
    #[serde(default)]
    pub obstacles: Vec<Position>,
    /// Minimal move count hint. Informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub par: Option<u32>,
}

impl Level {
    pub fn in_bounds(&self, pos: Position) -> bool {
        let n = self.grid_size as i32;
        (0..n).contains(&pos.x) && (0..n).contains(&pos.y)
    }

    pub fn is_obstacle(&self, pos: Position) -> bool {
        self.obstacles.contains(&pos)
    }

    /// Authoring problems with this level. Empty means well-formed.
    ///
    /// Solvability is not checked.
    pub fn issues(&self) -> Vec<LevelIssue> {
        let mut issues = Vec::new();
        if self.grid_size == 0 {
            issues.push(LevelIssue::EmptyGrid);
        }
        if !self.in_bounds(self.start) {
            issues.push(LevelIssue::StartOutOfBounds(self.start));
        }
        if !self.in_bounds(self.goal) {
            issues.push(LevelIssue::GoalOutOfBounds(self.goal));
        }
        if self.start == self.goal {
            issues.push(LevelIssue::StartIsGoal);
        }
        for &obstacle in &self.obstacles {
            if !self.in_bounds(obstacle) {
                issues.push(LevelIssue::ObstacleOutOfBounds(obstacle));
            }
        }
        if self.is_obstacle(self.start) {
            issues.push(LevelIssue::ObstacleOnStart);
        }
        if self.is_obstacle(self.goal) {
            issues.push(LevelIssue::ObstacleOnGoal);
        }
        issues
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelIssue {
    EmptyGrid,
    StartOutOfBounds(Position),
    GoalOutOfBounds(Position),
    StartIsGoal,
    ObstacleOutOfBounds(Position),
    ObstacleOnStart,
    ObstacleOnGoal,
}

impl fmt::Display for LevelIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelIssue::EmptyGrid => f.write_str("grid size is zero"),
            LevelIssue::StartOutOfBounds(p) => write!(f, "start {p} is outside the grid"),
            LevelIssue::GoalOutOfBounds(p) => write!(f, "goal {p} is outside the grid"),
            LevelIssue::StartIsGoal => f.write_str("start and goal are the same cell"),
            LevelIssue::ObstacleOutOfBounds(p) => write!(f, "obstacle {p} is outside the grid"),
            LevelIssue::ObstacleOnStart => f.write_str("an obstacle covers the start cell"),
            LevelIssue::ObstacleOnGoal => f.write_str("an obstacle covers the goal cell"),
        }
    }
}

// ---------------------------------------------------------------------------
// Robot and session state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RobotState {
    pub position: Position,
    /// Last direction applied, including a move that collided.
    pub facing: Direction,
}

impl RobotState {
    /// Robot parked on `level.start`, facing east.
    pub fn at_start(level: &Level) -> Self {
        Self {
            position: level.start,
            facing: Direction::Right,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    Planning,
    Running,
    Success,
    Failed,
}

impl SessionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Success | SessionStatus::Failed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionKind {
    Boundary,
    Obstacle,
}

/// Why a run ended FAILED. The status itself stays the coarse two-outcome model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureReason {
    Collision {
        index: usize,
        attempted: Position,
        collision: CollisionKind,
    },
    /// Queue exhausted somewhere other than the goal.
    MissedGoal { ended_at: Position },
}

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub id: EventId,
    pub event: Event,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    LevelLoaded {
        level_id: LevelId,
        start: Position,
    },
    QueueChanged {
        len: usize,
    },
    SessionReset {
        position: Position,
    },
    RunStarted {
        commands: usize,
    },
    StepStarted {
        index: usize,
        facing: Direction,
    },
    RobotMoved {
        index: usize,
        from: Position,
        to: Position,
    },
    Collided {
        index: usize,
        attempted: Position,
        collision: CollisionKind,
    },
    RunFinished {
        status: SessionStatus,
        position: Position,
        failure: Option<FailureReason>,
    },
    RunCancelled {
        /// Last index marked active before the stop, if any.
        active_index: Option<usize>,
    },
}
