//! Level authors: procedural generation and an external-document adapter.
//!
//! Both absorb every failure into the fallback level, so a session never sees
//! an authoring error.

use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::{bail, ensure, Context, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use robot_control::LevelAuthor;
use robot_core::{generate_level_id, Difficulty, Direction, Level, Position};
use serde::Deserialize;
use tracing::{info, warn};

/// Start cells tried before procedural generation gives up.
pub const MAX_PLACEMENT_ATTEMPTS: usize = 64;

const NAME_ADJECTIVES: &[&str] = &[
    "Dusty", "Crooked", "Quiet", "Rusty", "Hidden", "Winding", "Frozen", "Sunny",
];
const NAME_NOUNS: &[&str] = &[
    "Crossing", "Garden", "Workshop", "Canyon", "Corridor", "Depot", "Maze", "Harbor",
];

struct Profile {
    grid_sizes: &'static [u32],
    /// Minimum Manhattan distance between start and goal.
    min_distance: u32,
    /// Share of off-path cells turned into obstacles, in percent.
    obstacle_percent: u32,
}

fn profile(difficulty: Difficulty) -> Profile {
    match difficulty {
        Difficulty::Easy => Profile {
            grid_sizes: &[5],
            min_distance: 3,
            obstacle_percent: 15,
        },
        Difficulty::Medium => Profile {
            grid_sizes: &[5, 6],
            min_distance: 5,
            obstacle_percent: 25,
        },
        Difficulty::Hard => Profile {
            grid_sizes: &[6],
            min_distance: 7,
            obstacle_percent: 40,
        },
    }
}

fn cells(grid_size: u32) -> impl Iterator<Item = Position> {
    let n = grid_size as i32;
    (0..n).flat_map(move |y| (0..n).map(move |x| Position::new(x, y)))
}

/// Monotone walk from `start` to `goal`, both included. Its length is the
/// Manhattan distance, so it is also a shortest path.
fn carve_path(start: Position, goal: Position, rng: &mut impl Rng) -> Vec<Position> {
    let mut path = vec![start];
    let mut current = start;
    while current != goal {
        let mut options = Vec::with_capacity(2);
        if current.x != goal.x {
            options.push(if goal.x > current.x {
                Direction::Right
            } else {
                Direction::Left
            });
        }
        if current.y != goal.y {
            options.push(if goal.y > current.y {
                Direction::Down
            } else {
                Direction::Up
            });
        }
        let Some(&direction) = options.choose(rng) else {
            break;
        };
        current = current.offset(direction);
        path.push(current);
    }
    path
}

/// Generates a solvable level for `difficulty`.
///
/// Start and goal are placed at least the profile's distance apart, a
/// shortest path between them is kept clear, and obstacles are scattered
/// over the remaining cells. `par` is the Manhattan distance.
pub fn generate_level(difficulty: Difficulty, rng: &mut impl Rng) -> Result<Level> {
    let profile = profile(difficulty);
    let grid_size = *profile
        .grid_sizes
        .choose(rng)
        .context("difficulty profile has no grid sizes")?;
    let all_cells: Vec<Position> = cells(grid_size).collect();

    let mut placement = None;
    for _ in 0..MAX_PLACEMENT_ATTEMPTS {
        let Some(&start) = all_cells.choose(rng) else {
            break;
        };
        let goals: Vec<Position> = all_cells
            .iter()
            .copied()
            .filter(|cell| start.manhattan(*cell) >= profile.min_distance)
            .collect();
        if let Some(&goal) = goals.choose(rng) {
            placement = Some((start, goal));
            break;
        }
    }
    let Some((start, goal)) = placement else {
        bail!(
            "no start/goal pair {} apart on a {grid_size}x{grid_size} grid",
            profile.min_distance
        );
    };

    let path: HashSet<Position> = carve_path(start, goal, rng).into_iter().collect();
    let mut free: Vec<Position> = all_cells
        .into_iter()
        .filter(|cell| !path.contains(cell))
        .collect();
    free.shuffle(rng);
    let obstacle_count = free.len() * profile.obstacle_percent as usize / 100;
    free.truncate(obstacle_count);
    free.sort_by_key(|p| (p.y, p.x));

    let name = format!(
        "{} {}",
        NAME_ADJECTIVES.choose(rng).copied().unwrap_or("Mystery"),
        NAME_NOUNS.choose(rng).copied().unwrap_or("Mission"),
    );
    let level = Level {
        id: generate_level_id("generated", rng),
        name,
        grid_size,
        start,
        goal,
        obstacles: free,
        par: Some(start.manhattan(goal)),
    };
    let issues = level.issues();
    ensure!(
        issues.is_empty(),
        "generated level is malformed: {:?}",
        issues
    );
    Ok(level)
}

/// Seeded procedural author. The same seed yields the same level sequence.
pub struct ProceduralAuthor {
    rng: Mutex<ChaCha8Rng>,
    fallback: Level,
}

impl ProceduralAuthor {
    pub fn new(seed: u64, fallback: Level) -> Self {
        Self {
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
            fallback,
        }
    }

    pub fn author(&self, difficulty: Difficulty) -> Level {
        let generated = generate_level(difficulty, &mut *self.rng.lock());
        match generated {
            Ok(level) => {
                info!(level = %level.id, %difficulty, grid = level.grid_size, "generated level");
                level
            }
            Err(err) => {
                warn!(error = %format!("{err:#}"), %difficulty, "level generation failed, using fallback");
                self.fallback.clone()
            }
        }
    }
}

#[async_trait]
impl LevelAuthor for ProceduralAuthor {
    async fn request_level(&self, difficulty: Difficulty) -> Level {
        self.author(difficulty)
    }
}

// ---------------------------------------------------------------------------
// External authoring
// ---------------------------------------------------------------------------

/// Supplies a level document, e.g. from a generative service.
///
/// The document is JSON: `{ gridSize, start, goal, obstacles, name }`.
#[async_trait]
pub trait LevelSource: Send + Sync {
    async fn fetch(&self, difficulty: Difficulty) -> Result<String>;
}

/// Reads the level document from a file. The difficulty is ignored.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl LevelSource for FileSource {
    async fn fetch(&self, _difficulty: Difficulty) -> Result<String> {
        tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("reading {}", self.path.display()))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthoredLevel {
    grid_size: u32,
    start: Position,
    goal: Position,
    #[serde(default)]
    obstacles: Vec<Position>,
    name: String,
}

/// Grid sizes an external author may return.
const AUTHORED_GRID_SIZES: std::ops::RangeInclusive<u32> = 5..=6;

/// Wraps a `LevelSource`, validating what it returns.
pub struct ExternalAuthor<S> {
    source: S,
    fallback: Level,
    rng: Mutex<ChaCha8Rng>,
}

impl<S: LevelSource> ExternalAuthor<S> {
    /// `seed` drives the ids given to accepted levels.
    pub fn new(source: S, fallback: Level, seed: u64) -> Self {
        Self {
            source,
            fallback,
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }

    async fn try_request(&self, difficulty: Difficulty) -> Result<Level> {
        let document = self
            .source
            .fetch(difficulty)
            .await
            .context("fetching authored level")?;
        let authored: AuthoredLevel =
            serde_json::from_str(&document).context("parsing authored level")?;
        ensure!(
            AUTHORED_GRID_SIZES.contains(&authored.grid_size),
            "authored grid size {} is not 5 or 6",
            authored.grid_size
        );
        ensure!(!authored.name.trim().is_empty(), "authored level has no name");

        let id = generate_level_id("authored", &mut *self.rng.lock());
        let level = Level {
            id,
            name: authored.name,
            grid_size: authored.grid_size,
            start: authored.start,
            goal: authored.goal,
            obstacles: authored.obstacles,
            par: None,
        };
        let issues = level.issues();
        if !issues.is_empty() {
            bail!(
                "authored level rejected: {}",
                issues
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; ")
            );
        }
        Ok(level)
    }
}

#[async_trait]
impl<S: LevelSource> LevelAuthor for ExternalAuthor<S> {
    async fn request_level(&self, difficulty: Difficulty) -> Level {
        match self.try_request(difficulty).await {
            Ok(level) => {
                info!(level = %level.id, name = %level.name, %difficulty, "authored level accepted");
                level
            }
            Err(err) => {
                warn!(error = %format!("{err:#}"), %difficulty, "level authoring failed, using fallback");
                self.fallback.clone()
            }
        }
    }
}
