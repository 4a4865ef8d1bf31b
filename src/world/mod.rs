//! # World Module
//!
//! Coordinates, facings and the collaborator interfaces the engine consumes.
//!
//! The encounter engine never owns the game world. Everything it needs from
//! the host (time of day, terrain, the player, object creation) is expressed
//! by the traits in [`services`], and [`SimWorld`] provides an in-memory
//! implementation for the CLI and for tests.

pub mod dice;
pub mod services;
pub mod sim;

pub use dice::*;
pub use services::*;
pub use sim::*;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tile on the world map. Any `i32` pair is valid; distance math widens to
/// `i64` so far-apart tiles never overflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Creates a new position with the given coordinates.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the origin position (0, 0).
    pub fn origin() -> Self {
        Self::new(0, 0)
    }

    /// Straight-line distance, as used by chart zones.
    ///
    /// ```
    /// use overworld_encounters::Position;
    ///
    /// let camp = Position::new(-2, 7);
    /// assert_eq!(camp.euclidean_distance(Position::new(4, -1)), 10.0);
    /// ```
    pub fn euclidean_distance(self, other: Position) -> f64 {
        let (dx, dy) = self.delta_to(other);
        let (dx, dy) = (dx as f64, dy as f64);
        (dx * dx + dy * dy).sqrt()
    }

    /// King-move distance, saturating at `u32::MAX`.
    pub fn chebyshev_distance(self, other: Position) -> u32 {
        let (dx, dy) = self.delta_to(other);
        u32::try_from(dx.unsigned_abs().max(dy.unsigned_abs())).unwrap_or(u32::MAX)
    }

    /// Shifted by the given deltas, clamped to the coordinate range.
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }

    fn delta_to(self, other: Position) -> (i64, i64) {
        (
            other.x as i64 - self.x as i64,
            other.y as i64 - self.y as i64,
        )
    }

    /// Returns all 8 adjacent positions (including diagonals).
    pub fn adjacent_positions(self) -> Vec<Position> {
        Direction::all()
            .into_iter()
            .map(|direction| self + direction.to_delta())
            .collect()
    }
}

impl std::ops::Add for Position {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        self.offset(other.x, other.y)
    }
}

/// Facing of a creature on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
    Northeast,
    Northwest,
    Southeast,
    Southwest,
}

impl Direction {
    /// Unit step one tile in this direction.
    pub fn to_delta(self) -> Position {
        match self {
            Direction::North => Position::new(0, -1),
            Direction::South => Position::new(0, 1),
            Direction::East => Position::new(1, 0),
            Direction::West => Position::new(-1, 0),
            Direction::Northeast => Position::new(1, -1),
            Direction::Northwest => Position::new(-1, -1),
            Direction::Southeast => Position::new(1, 1),
            Direction::Southwest => Position::new(-1, 1),
        }
    }

    fn from_signs(sx: i64, sy: i64) -> Option<Direction> {
        match (sx, sy) {
            (0, -1) => Some(Direction::North),
            (0, 1) => Some(Direction::South),
            (1, 0) => Some(Direction::East),
            (-1, 0) => Some(Direction::West),
            (1, -1) => Some(Direction::Northeast),
            (-1, -1) => Some(Direction::Northwest),
            (1, 1) => Some(Direction::Southeast),
            (-1, 1) => Some(Direction::Southwest),
            _ => None,
        }
    }

    /// Facing from one tile toward another, snapped to the nearest of the
    /// eight directions.
    ///
    /// Returns None when both tiles are the same.
    ///
    /// # Examples
    ///
    /// ```
    /// use overworld_encounters::{Direction, Position};
    ///
    /// let facing = Direction::toward(Position::new(0, 0), Position::new(6, 5));
    /// assert_eq!(facing, Some(Direction::Southeast));
    /// ```
    pub fn toward(from: Position, to: Position) -> Option<Direction> {
        let (dx, dy) = from.delta_to(to);
        if dx == 0 && dy == 0 {
            return None;
        }

        // Snap to 8 sectors: an axis only counts when it is at least
        // tan(22.5°) ≈ 5/12 of the dominant axis.
        let (ax, ay) = (dx.abs(), dy.abs());
        let sx = if ax * 12 >= ay * 5 { dx.signum() } else { 0 };
        let sy = if ay * 12 >= ax * 5 { dy.signum() } else { 0 };
        Direction::from_signs(sx, sy)
    }

    /// All eight facings.
    pub fn all() -> [Direction; 8] {
        [
            Direction::North,
            Direction::South,
            Direction::East,
            Direction::West,
            Direction::Northeast,
            Direction::Northwest,
            Direction::Southeast,
            Direction::Southwest,
        ]
    }
}

/// Identifier of a creature prototype in the host's content.
pub type SpeciesId = i32;

/// Opaque handle to a creature object created through the host.
pub type CreatureHandle = Uuid;

/// Creates a new unique creature handle.
pub fn new_creature_handle() -> CreatureHandle {
    Uuid::new_v4()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_distances() {
        let pos1 = Position::new(0, 0);
        let pos2 = Position::new(3, 4);
        assert_eq!(pos1.euclidean_distance(pos2), 5.0);
        assert_eq!(pos1.chebyshev_distance(pos2), 4);
    }

    #[test]
    fn test_position_arithmetic() {
        let pos = Position::new(5, 10);
        assert_eq!(pos + Position::new(3, 2), Position::new(8, 12));
        assert_eq!(pos.offset(-6, 0), Position::new(-1, 10));
        assert_eq!(Position::new(i32::MIN + 2, 0).offset(-6, 0).x, i32::MIN);
    }

    #[test]
    fn test_distances_across_the_full_range() {
        let east = Position::new(2_000_000_000, 0);
        let west = Position::new(-1_000_000_000, 0);
        assert_eq!(east.euclidean_distance(west), 3_000_000_000.0);
        assert_eq!(west.chebyshev_distance(east), 3_000_000_000);

        let corner = Position::new(i32::MIN, i32::MIN);
        assert_eq!(corner.chebyshev_distance(Position::new(i32::MAX, 0)), u32::MAX);
        assert_eq!(Direction::toward(corner, Position::new(i32::MAX, i32::MAX)), Some(Direction::Southeast));
    }

    #[test]
    fn test_position_adjacent() {
        let pos = Position::new(5, 5);
        let adjacent = pos.adjacent_positions();
        assert_eq!(adjacent.len(), 8);
        assert!(adjacent.contains(&Position::new(4, 4)));
        assert!(adjacent.contains(&Position::new(6, 6)));
        assert!(!adjacent.contains(&pos));
    }

    #[test]
    fn test_direction_toward() {
        let origin = Position::new(10, 10);
        assert_eq!(Direction::toward(origin, Position::new(10, 4)), Some(Direction::North));
        assert_eq!(Direction::toward(origin, Position::new(16, 10)), Some(Direction::East));
        assert_eq!(Direction::toward(origin, Position::new(4, 4)), Some(Direction::Northwest));
        assert_eq!(Direction::toward(origin, Position::new(16, 11)), Some(Direction::East));
        assert_eq!(Direction::toward(origin, origin), None);
    }

    #[test]
    fn test_direction_steps_are_distinct_units() {
        let steps: std::collections::HashSet<Position> =
            Direction::all().into_iter().map(Direction::to_delta).collect();
        assert_eq!(steps.len(), 8);
        assert!(steps.iter().all(|step| step.chebyshev_distance(Position::origin()) == 1));
    }

    #[test]
    fn test_creature_handle_uniqueness() {
        assert_ne!(new_creature_handle(), new_creature_handle());
    }
}
