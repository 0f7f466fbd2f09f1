use super::*;
use crate::test_fixtures::{base_catalog, first_steps_level, open_level, snake_level, wall_level};

mod catalog;
mod queue;

// --- Shared test helpers ------------------------------------------------

fn moves(input: &str) -> Vec<Command> {
    parse_moves(input).expect("test move string should parse")
}

fn pos(x: i32, y: i32) -> Position {
    Position::new(x, y)
}
