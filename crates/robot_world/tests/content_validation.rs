//! Validation tests for the shipped `content/*.json` files.
//!
//! These load the real content directory and check that every predefined
//! level is well-formed, ordered, and solvable.

use robot_control::Pacing;
use robot_core::test_fixtures::base_catalog;
use robot_core::{parse_moves, simulate, Direction, Level, LevelId, Verdict};
use robot_world::{load_content, WorldContent};
use std::collections::{HashSet, VecDeque};
use std::sync::OnceLock;

/// Helper: resolve the content directory relative to the workspace root.
/// Integration tests run from the crate directory, so we go up two levels.
fn content_dir() -> String {
    let manifest = std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");
    format!("{manifest}/../../content")
}

/// Shared content loaded once across all tests in this module.
fn load_test_content() -> &'static WorldContent {
    static CONTENT: OnceLock<WorldContent> = OnceLock::new();
    CONTENT.get_or_init(|| {
        load_content(&content_dir()).expect("load_content should succeed for shipped content")
    })
}

#[test]
fn content_loads_successfully() {
    let content = load_test_content();
    assert!(!content.content_version.is_empty());
    assert_eq!(content.catalog.len(), 3);
}

#[test]
fn playback_config_matches_reference_pacing() {
    assert_eq!(load_test_content().pacing, Pacing::reference());
}

#[test]
fn catalog_matches_shared_fixtures() {
    let content = load_test_content();
    let fixtures = base_catalog();
    for (shipped, fixture) in content.catalog.iter().zip(fixtures.iter()) {
        assert_eq!(shipped, fixture, "content and fixture drifted for level {}", fixture.id);
    }
}

#[test]
fn catalog_order_is_numeric() {
    let content = load_test_content();
    let ids: Vec<&str> = content.catalog.iter().map(|l| l.id.0.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
    assert!(content.catalog.next_after(&LevelId::new("3")).is_none());
}

#[test]
fn every_shipped_level_has_a_known_solution() {
    let content = load_test_content();
    let solutions = [
        ("1", "RR"),
        ("2", "RDDRRRUU"),
        ("3", "DDDRRUURRDDD"),
    ];
    for (id, moves) in solutions {
        let level = content.catalog.get(&LevelId::new(id)).unwrap();
        let trace = simulate(level, &parse_moves(moves).unwrap());
        assert_eq!(trace.verdict, Verdict::Success, "level {id}");
    }
}

#[test]
fn fallback_level_is_solvable() {
    let fallback = &load_test_content().fallback;
    let trace = simulate(fallback, &parse_moves("RRRRDDDD").unwrap());
    assert_eq!(trace.verdict, Verdict::Success);
    assert!(fallback.issues().is_empty());
}

/// Breadth-first move count from start to goal, `None` if unreachable.
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
fn par_hints_match_shortest_paths() {
    let content = load_test_content();
    for level in content.catalog.iter().chain(std::iter::once(&content.fallback)) {
        let shortest = shortest_path(level);
        assert!(shortest.is_some(), "level {} is unsolvable", level.id);
        if let Some(par) = level.par {
            assert_eq!(shortest, Some(par), "par hint for level {}", level.id);
        }
    }
}
