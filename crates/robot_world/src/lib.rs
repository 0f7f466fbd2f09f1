//! Level content loading and level authoring shared by front ends.

mod author;

use anyhow::{Context, Result};
use robot_control::Pacing;
use robot_core::{Level, LevelCatalog, LevelId};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

pub use author::{
    generate_level, ExternalAuthor, FileSource, LevelSource, ProceduralAuthor,
    MAX_PLACEMENT_ATTEMPTS,
};

#[derive(Deserialize)]
struct LevelsFile {
    content_version: String,
    levels: Vec<Level>,
    fallback: Level,
}

/// Everything a front end needs to start a session.
#[derive(Debug, Clone)]
pub struct WorldContent {
    pub content_version: String,
    pub catalog: LevelCatalog,
    /// Handed out by level authors whenever authoring fails.
    pub fallback: Level,
    pub pacing: Pacing,
}

/// Validates predefined levels, panicking on any authoring error.
///
/// Catches mistakes like: a goal placed under an obstacle, a start outside
/// the grid, or two levels sharing an id (which would break "next level"
/// traversal).
pub fn validate_levels(levels: &[Level], fallback: &Level) {
    assert!(!levels.is_empty(), "level catalog is empty");

    let mut seen: HashSet<&LevelId> = HashSet::new();
    for level in levels {
        assert!(
            seen.insert(&level.id),
            "duplicate level id '{}'",
            level.id
        );
    }
    assert!(
        !seen.contains(&fallback.id),
        "fallback level id '{}' collides with a catalog level",
        fallback.id
    );

    for level in levels.iter().chain(std::iter::once(fallback)) {
        assert!(!level.name.is_empty(), "level '{}' has an empty name", level.id);
        let issues = level.issues();
        assert!(
            issues.is_empty(),
            "level '{}' is malformed: {}",
            level.id,
            issues
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; "),
        );
    }
}

pub fn load_content(content_dir: &str) -> Result<WorldContent> {
    let dir = Path::new(content_dir);
    let levels_file: LevelsFile = serde_json::from_str(
        &std::fs::read_to_string(dir.join("levels.json")).context("reading levels.json")?,
    )
    .context("parsing levels.json")?;
    let pacing: Pacing = serde_json::from_str(
        &std::fs::read_to_string(dir.join("playback.json")).context("reading playback.json")?,
    )
    .context("parsing playback.json")?;
    validate_levels(&levels_file.levels, &levels_file.fallback);
    Ok(WorldContent {
        content_version: levels_file.content_version,
        catalog: LevelCatalog::new(levels_file.levels),
        fallback: levels_file.fallback,
        pacing,
    })
}
