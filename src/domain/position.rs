// Grid position and movement direction for the snake simulation.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn translated(self, dir: Direction) -> Self {
        let (dx, dy) = dir.delta();
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    pub fn in_bounds(self, board_size: i32) -> bool {
        self.x >= 0 && self.x < board_size && self.y >= 0 && self.y < board_size
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Right => (1, 0),
            Direction::Left => (-1, 0),
            Direction::Down => (0, 1),
            Direction::Up => (0, -1),
        }
    }

    /// True when `self` is the exact 180-degree reversal of `other`.
    pub fn is_opposite(self, other: Direction) -> bool {
        let (dx1, dy1) = self.delta();
        let (dx2, dy2) = other.delta();
        dx1 == -dx2 && dy1 == -dy2
    }
}

impl Default for Direction {
    fn default() -> Self {
        Direction::Right
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_direction_detection() {
        assert!(Direction::Left.is_opposite(Direction::Right));
        assert!(Direction::Right.is_opposite(Direction::Left));
        assert!(Direction::Up.is_opposite(Direction::Down));
        assert!(!Direction::Up.is_opposite(Direction::Left));
        assert!(!Direction::Right.is_opposite(Direction::Right));
    }

    #[test]
    fn translate_moves_one_cell() {
        let p = Position::new(5, 5);
        assert_eq!(p.translated(Direction::Right), Position::new(6, 5));
        assert_eq!(p.translated(Direction::Down), Position::new(5, 6));
    }

    #[test]
    fn bounds_check() {
        assert!(Position::new(0, 0).in_bounds(20));
        assert!(Position::new(19, 19).in_bounds(20));
        assert!(!Position::new(20, 0).in_bounds(20));
        assert!(!Position::new(-1, 0).in_bounds(20));
    }
}
