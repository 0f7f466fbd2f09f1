//! Shared test fixtures for robot_core and downstream crates.
//!
//! The first three levels mirror `content/levels.json`.

use crate::{Level, LevelCatalog, LevelId, Position};

/// 5×5, start (0,0), goal (2,0), no obstacles. Par 2.
pub fn first_steps_level() -> Level {
    Level {
        id: LevelId::new("1"),
        name: "First Steps".to_string(),
        grid_size: 5,
        start: Position::new(0, 0),
        goal: Position::new(2, 0),
        obstacles: vec![],
        par: Some(2),
    }
}

/// 5×5 with a three-cell wall in column 2. Par 8, around the wall.
pub fn wall_level() -> Level {
    Level {
        id: LevelId::new("2"),
        name: "The Wall".to_string(),
        grid_size: 5,
        start: Position::new(0, 2),
        goal: Position::new(4, 2),
        obstacles: vec![
            Position::new(2, 1),
            Position::new(2, 2),
            Position::new(2, 3),
        ],
        par: Some(8),
    }
}

/// 5×5 serpentine corridor. Par 12.
pub fn snake_level() -> Level {
    Level {
        id: LevelId::new("3"),
        name: "Snake Path".to_string(),
        grid_size: 5,
        start: Position::new(0, 0),
        goal: Position::new(4, 4),
        obstacles: vec![
            Position::new(1, 0),
            Position::new(1, 1),
            Position::new(1, 2),
            Position::new(3, 2),
            Position::new(3, 3),
            Position::new(3, 4),
        ],
        par: Some(12),
    }
}

/// Empty N×N grid, start top-left, goal bottom-right.
pub fn open_level(grid_size: u32) -> Level {
    let far = grid_size as i32 - 1;
    Level {
        id: LevelId(format!("open_{grid_size}")),
        name: format!("Open {grid_size}x{grid_size}"),
        grid_size,
        start: Position::new(0, 0),
        goal: Position::new(far, far),
        obstacles: vec![],
        par: None,
    }
}

pub fn base_catalog() -> LevelCatalog {
    LevelCatalog::new(vec![first_steps_level(), wall_level(), snake_level()])
}
