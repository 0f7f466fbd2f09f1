//! Level authoring tests: procedural generation and external documents.

use std::collections::{HashSet, VecDeque};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use robot_control::LevelAuthor;
use robot_core::test_fixtures::snake_level;
use robot_core::{Difficulty, Direction, Level, LevelId, Position};
use robot_world::{generate_level, ExternalAuthor, FileSource, LevelSource, ProceduralAuthor};

fn fallback() -> Level {
    let mut level = snake_level();
    level.id = LevelId::new("fallback-1");
    level
}

/// Breadth-first shortest path length, test-only.
fn shortest_path(level: &Level) -> Option<u32> {
    let mut seen = HashSet::from([level.start]);
    let mut frontier = VecDeque::from([(level.start, 0u32)]);
    while let Some((cell, distance)) = frontier.pop_front() {
        if cell == level.goal {
            return Some(distance);
        }
        for direction in Direction::ALL {
            let next = cell.offset(direction);
            if level.in_bounds(next) && !level.is_obstacle(next) && seen.insert(next) {
                frontier.push_back((next, distance + 1));
            }
        }
    }
    None
}

#[test]
fn generated_levels_are_valid_and_solvable_at_par() {
    for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..200 {
            let level = generate_level(difficulty, &mut rng).unwrap();
            assert!(level.issues().is_empty(), "{level:?}");
            assert!(level.id.0.starts_with("generated-"));
            assert_eq!(shortest_path(&level), level.par, "{level:?}");
        }
    }
}

#[test]
fn grid_size_and_spacing_follow_difficulty() {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    for _ in 0..100 {
        let easy = generate_level(Difficulty::Easy, &mut rng).unwrap();
        assert_eq!(easy.grid_size, 5);
        assert!(easy.start.manhattan(easy.goal) >= 3);

        let medium = generate_level(Difficulty::Medium, &mut rng).unwrap();
        assert!(matches!(medium.grid_size, 5 | 6));

        let hard = generate_level(Difficulty::Hard, &mut rng).unwrap();
        assert_eq!(hard.grid_size, 6);
        assert!(hard.start.manhattan(hard.goal) >= 7);
        assert!(hard.obstacles.len() > easy.obstacles.len());
    }
}

#[test]
fn same_seed_same_levels() {
    let a = ProceduralAuthor::new(42, fallback());
    let b = ProceduralAuthor::new(42, fallback());
    for _ in 0..5 {
        assert_eq!(a.author(Difficulty::Medium), b.author(Difficulty::Medium));
    }
}

#[tokio::test]
async fn procedural_author_serves_fresh_levels() {
    let author = ProceduralAuthor::new(7, fallback());
    let first = author.request_level(Difficulty::Easy).await;
    let second = author.request_level(Difficulty::Easy).await;
    assert_ne!(first.id, second.id);
    assert_ne!(first.id, fallback().id);
}

// ---------------------------------------------------------------------------
// External authoring
// ---------------------------------------------------------------------------

struct CannedSource(Result<String, String>);

#[async_trait]
impl LevelSource for CannedSource {
    async fn fetch(&self, _difficulty: Difficulty) -> Result<String> {
        self.0.clone().map_err(|e| anyhow!(e))
    }
}

fn external(document: Result<&str, &str>) -> ExternalAuthor<CannedSource> {
    let canned = document.map(str::to_string).map_err(str::to_string);
    ExternalAuthor::new(CannedSource(canned), fallback(), 5)
}

const GOOD_DOCUMENT: &str = r#"{
    "gridSize": 6,
    "start": {"x": 0, "y": 5},
    "goal": {"x": 5, "y": 0},
    "obstacles": [{"x": 2, "y": 2}, {"x": 3, "y": 3}],
    "name": "Night Patrol"
}"#;

#[tokio::test]
async fn accepted_document_becomes_level() {
    let level = external(Ok(GOOD_DOCUMENT))
        .request_level(Difficulty::Medium)
        .await;
    assert!(level.id.0.starts_with("authored-"), "{}", level.id);
    assert_eq!(level.name, "Night Patrol");
    assert_eq!(level.grid_size, 6);
    assert_eq!(level.start, Position::new(0, 5));
    assert_eq!(level.obstacles.len(), 2);
    assert_eq!(level.par, None);
}

#[tokio::test]
async fn source_error_yields_fallback() {
    let level = external(Err("missing credential"))
        .request_level(Difficulty::Easy)
        .await;
    assert_eq!(level, fallback());
}

#[tokio::test]
async fn malformed_document_yields_fallback() {
    let level = external(Ok("{\"gridSize\": 5"))
        .request_level(Difficulty::Easy)
        .await;
    assert_eq!(level, fallback());
}

#[tokio::test]
async fn oversized_grid_yields_fallback() {
    let document = GOOD_DOCUMENT.replace("\"gridSize\": 6", "\"gridSize\": 9");
    let level = external(Ok(document.as_str())).request_level(Difficulty::Hard).await;
    assert_eq!(level, fallback());
}

#[tokio::test]
async fn blocked_goal_yields_fallback() {
    let document = GOOD_DOCUMENT.replace(r#"{"x": 3, "y": 3}"#, r#"{"x": 5, "y": 0}"#);
    let level = external(Ok(document.as_str())).request_level(Difficulty::Hard).await;
    assert_eq!(level, fallback());
}

#[tokio::test]
async fn file_source_reads_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("authored.json");
    std::fs::write(&path, GOOD_DOCUMENT).unwrap();

    let author = ExternalAuthor::new(FileSource::new(&path), fallback(), 1);
    let level = author.request_level(Difficulty::Medium).await;
    assert_eq!(level.name, "Night Patrol");
}

#[tokio::test]
async fn missing_file_yields_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let author = ExternalAuthor::new(FileSource::new(dir.path().join("absent.json")), fallback(), 1);
    assert_eq!(author.request_level(Difficulty::Medium).await, fallback());
}
