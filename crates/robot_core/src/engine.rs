use crate::{Command, CollisionKind, FailureReason, Level, Position, RobotState, SessionStatus};

/// Result of applying one command to the robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    Moved { from: Position, to: Position },
    /// The move was rejected; the robot keeps its last committed position.
    Collided {
        attempted: Position,
        collision: CollisionKind,
    },
}

/// Terminal outcome of a full walk through a command sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Success,
    Failed(FailureReason),
}

impl Verdict {
    pub fn status(self) -> SessionStatus {
        match self {
            Verdict::Success => SessionStatus::Success,
            Verdict::Failed(_) => SessionStatus::Failed,
        }
    }

    pub fn failure(self) -> Option<FailureReason> {
        match self {
            Verdict::Success => None,
            Verdict::Failed(reason) => Some(reason),
        }
    }
}

/// Boundary is checked before obstacles, so an out-of-grid cell that is also
/// listed as an obstacle reports `Boundary`.
pub fn check_collision(level: &Level, pos: Position) -> Option<CollisionKind> {
    if !level.in_bounds(pos) {
        Some(CollisionKind::Boundary)
    } else if level.is_obstacle(pos) {
        Some(CollisionKind::Obstacle)
    } else {
        None
    }
}

/// Apply one command.
///
/// Order of operations:
/// 1. Compute the target cell.
/// 2. Turn the robot to face `command`, even if the move will fail.
/// 3. Check the target for a boundary or obstacle collision.
/// 4. Commit the move only when there was no collision.
pub fn step(level: &Level, robot: &mut RobotState, command: Command) -> StepResult {
    let from = robot.position;
    let to = from.offset(command);
    robot.facing = command;
    if let Some(collision) = check_collision(level, to) {
        return StepResult::Collided {
            attempted: to,
            collision,
        };
    }
    robot.position = to;
    StepResult::Moved { from, to }
}

/// Judge a robot whose queue ran out without a collision. Only an exact goal
/// match succeeds.
pub fn judge_exhausted(level: &Level, robot: &RobotState) -> Verdict {
    if robot.position == level.goal {
        Verdict::Success
    } else {
        Verdict::Failed(FailureReason::MissedGoal {
            ended_at: robot.position,
        })
    }
}

/// Full unpaced walk of `commands` against `level`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunTrace {
    /// Start cell followed by every committed position, in order.
    pub visited: Vec<Position>,
    /// One entry per command processed; stops at the first collision.
    pub steps: Vec<StepResult>,
    pub robot: RobotState,
    pub verdict: Verdict,
}

/// Walk every command in order, stopping at the first collision.
///
/// Deterministic: the same level and commands always produce the same trace.
pub fn simulate(level: &Level, commands: &[Command]) -> RunTrace {
    let mut robot = RobotState::at_start(level);
    let mut visited = vec![robot.position];
    let mut steps = Vec::with_capacity(commands.len());

    for (index, &command) in commands.iter().enumerate() {
        let result = step(level, &mut robot, command);
        steps.push(result);
        match result {
            StepResult::Moved { to, .. } => visited.push(to),
            StepResult::Collided {
                attempted,
                collision,
            } => {
                return RunTrace {
                    visited,
                    steps,
                    robot,
                    verdict: Verdict::Failed(FailureReason::Collision {
                        index,
                        attempted,
                        collision,
                    }),
                };
            }
        }
    }

    let verdict = judge_exhausted(level, &robot);
    RunTrace {
        visited,
        steps,
        robot,
        verdict,
    }
}
