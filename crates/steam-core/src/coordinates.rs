//! Hex coordinate system using axial coordinates (q, r).
//!
//! This module provides the foundational types for the rail map:
//! - `Coordinates`: Identifies individual hexes
//! - `Direction`: The six edges of a flat-topped hex, in clockwise order
//! - `Exit`: Where one end of a track segment leaves its hex
//!
//! Coordinates are plain values: two `Coordinates` with the same `(q, r)` are
//! the same hex, so they can be copied freely and used as map keys.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Edge of a flat-topped hex.
///
/// Variants are declared in clockwise order starting from the top-left edge,
/// so rotating is a matter of index arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    /// Upper-left edge
    TopLeft,
    /// Top edge
    Top,
    /// Upper-right edge
    TopRight,
    /// Lower-right edge
    BottomRight,
    /// Bottom edge
    Bottom,
    /// Lower-left edge
    BottomLeft,
}

impl Direction {
    /// All directions in clockwise order starting from TopLeft
    pub const ALL: [Direction; 6] = [
        Direction::TopLeft,
        Direction::Top,
        Direction::TopRight,
        Direction::BottomRight,
        Direction::Bottom,
        Direction::BottomLeft,
    ];

    /// Position of this direction in the clockwise cycle
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Direction at a position of the clockwise cycle (wraps around)
    pub const fn from_index(index: usize) -> Self {
        Self::ALL[index % 6]
    }

    /// Rotate clockwise by the given number of steps
    pub const fn rotate_clockwise(self, steps: usize) -> Self {
        Self::from_index(self.index() + steps % 6)
    }

    /// The edge on the far side of the hex
    pub const fn opposite(self) -> Self {
        self.rotate_clockwise(3)
    }

    /// Number of clockwise steps needed to turn `from` into `self`
    pub const fn steps_from(self, from: Direction) -> usize {
        (self.index() + 6 - from.index()) % 6
    }

    /// Axial offset `(dq, dr)` of the neighbor across this edge
    const fn offset(self) -> (i32, i32) {
        match self {
            Direction::TopLeft => (-1, 0),
            Direction::Top => (0, -1),
            Direction::TopRight => (1, -1),
            Direction::BottomRight => (1, 0),
            Direction::Bottom => (0, 1),
            Direction::BottomLeft => (-1, 1),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::TopLeft => "top left",
            Direction::Top => "top",
            Direction::TopRight => "top right",
            Direction::BottomRight => "bottom right",
            Direction::Bottom => "bottom",
            Direction::BottomLeft => "bottom left",
        };
        f.write_str(name)
    }
}

/// Error returned when parsing `Coordinates` from their `"q,r"` form
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid coordinates {0:?}, expected \"q,r\"")]
pub struct CoordinatesParseError(String);

/// Axial coordinate of a hex on the map.
///
/// In axial coordinates for flat-topped hexes:
/// - `q` increases going to the lower right
/// - `r` increases going down
/// - The third coordinate `s` (not stored) satisfies: q + r + s = 0
///
/// Serialized as the string `"q,r"` so that it can key JSON objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Coordinates {
    /// Column
    pub q: i32,
    /// Row
    pub r: i32,
}

impl Coordinates {
    /// The origin hex
    pub const ORIGIN: Coordinates = Coordinates::from_qr(0, 0);

    /// Create a new coordinate
    pub const fn from_qr(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// The implicit third coordinate (s = -q - r)
    pub const fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// The hex across the given edge
    pub const fn neighbor(&self, direction: Direction) -> Coordinates {
        let (dq, dr) = direction.offset();
        Coordinates::from_qr(self.q + dq, self.r + dr)
    }

    /// The six neighboring hexes in clockwise order starting from TopLeft
    pub fn neighbors(&self) -> [Coordinates; 6] {
        Direction::ALL.map(|direction| self.neighbor(direction))
    }

    /// The edge shared with `other`, if the two hexes are adjacent
    pub fn direction_to(&self, other: &Coordinates) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|direction| self.neighbor(*direction) == *other)
    }

    /// Distance to another hex (in hex steps)
    pub fn distance_to(&self, other: &Coordinates) -> u32 {
        let dq = (self.q - other.q).abs();
        let dr = (self.r - other.r).abs();
        let ds = (self.s() - other.s()).abs();
        ((dq + dr + ds) / 2) as u32
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.q, self.r)
    }
}

impl FromStr for Coordinates {
    type Err = CoordinatesParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoordinatesParseError(s.to_string());
        let (q, r) = s.split_once(',').ok_or_else(invalid)?;
        let q = q.trim().parse().map_err(|_| invalid())?;
        let r = r.trim().parse().map_err(|_| invalid())?;
        Ok(Coordinates::from_qr(q, r))
    }
}

impl From<Coordinates> for String {
    fn from(coordinates: Coordinates) -> Self {
        coordinates.to_string()
    }
}

impl TryFrom<String> for Coordinates {
    type Error = CoordinatesParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// One end of a track segment.
///
/// A segment either leaves its hex across an edge, or stops at the town in
/// the middle of the hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Exit {
    /// Crosses into the neighboring hex
    Edge(Direction),
    /// Terminates at the town center of this hex
    Town,
}

impl Exit {
    /// The edge this exit crosses, if any
    pub const fn direction(self) -> Option<Direction> {
        match self {
            Exit::Edge(direction) => Some(direction),
            Exit::Town => None,
        }
    }

    pub const fn is_town(self) -> bool {
        matches!(self, Exit::Town)
    }

    /// Rotate clockwise; the town exit is fixed under rotation
    pub const fn rotate_clockwise(self, steps: usize) -> Self {
        match self {
            Exit::Edge(direction) => Exit::Edge(direction.rotate_clockwise(steps)),
            Exit::Town => Exit::Town,
        }
    }
}

impl From<Direction> for Exit {
    fn from(direction: Direction) -> Self {
        Exit::Edge(direction)
    }
}

impl fmt::Display for Exit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Exit::Edge(direction) => direction.fmt(f),
            Exit::Town => f.write_str("town"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_neighbors_are_unique_and_adjacent() {
        let center = Coordinates::from_qr(2, -1);
        let neighbors = center.neighbors();

        let unique: HashSet<_> = neighbors.iter().collect();
        assert_eq!(unique.len(), 6);

        for neighbor in &neighbors {
            assert_eq!(center.distance_to(neighbor), 1);
        }
    }

    #[test]
    fn test_opposite_neighbor_round_trip() {
        let start = Coordinates::from_qr(-3, 4);
        for direction in Direction::ALL {
            let there = start.neighbor(direction);
            assert_eq!(there.neighbor(direction.opposite()), start);
            assert_eq!(start.direction_to(&there), Some(direction));
        }
    }

    #[test]
    fn test_rotation_is_cyclic() {
        for direction in Direction::ALL {
            assert_eq!(direction.rotate_clockwise(6), direction);
            assert_eq!(direction.opposite().opposite(), direction);
            assert_eq!(direction.rotate_clockwise(2).steps_from(direction), 2);
        }
        assert_eq!(Direction::BottomLeft.rotate_clockwise(1), Direction::TopLeft);
        assert_eq!(Direction::Top.opposite(), Direction::Bottom);
    }

    #[test]
    fn test_clockwise_order_walks_around_the_hex() {
        // Consecutive directions must point at neighbors that are adjacent to each other
        let center = Coordinates::ORIGIN;
        for direction in Direction::ALL {
            let a = center.neighbor(direction);
            let b = center.neighbor(direction.rotate_clockwise(1));
            assert_eq!(a.distance_to(&b), 1);
        }
    }

    #[test]
    fn test_distance() {
        let a = Coordinates::ORIGIN;
        assert_eq!(a.distance_to(&Coordinates::from_qr(2, -1)), 2);
        assert_eq!(a.distance_to(&Coordinates::from_qr(-3, 3)), 3);
        assert_eq!(a.direction_to(&Coordinates::from_qr(2, 0)), None);
    }

    #[test]
    fn test_coordinates_string_form() {
        let coordinates = Coordinates::from_qr(-2, 7);
        assert_eq!(coordinates.to_string(), "-2,7");
        assert_eq!("-2, 7".parse::<Coordinates>(), Ok(coordinates));
        assert!("7".parse::<Coordinates>().is_err());
        assert!("a,b".parse::<Coordinates>().is_err());

        let json = serde_json::to_string(&coordinates).unwrap();
        assert_eq!(json, "\"-2,7\"");
    }

    #[test]
    fn test_town_exit_ignores_rotation() {
        assert_eq!(Exit::Town.rotate_clockwise(4), Exit::Town);
        assert_eq!(
            Exit::Edge(Direction::Top).rotate_clockwise(4),
            Exit::Edge(Direction::BottomLeft)
        );
        assert_eq!(Exit::Town.direction(), None);
    }
}
