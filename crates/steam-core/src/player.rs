//! Player identity and the per-player state the rules engine reads.
//!
//! Money, shares and income live with the turn orchestration; the map engine
//! only needs to know who is acting and how far their locomotive can haul.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Locomotive value every player starts with
pub const STARTING_LOCOMOTIVE: u8 = 1;

/// Highest locomotive value on standard maps
pub const MAX_LOCOMOTIVE: u8 = 6;

/// Color identifying a player and everything they own on the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlayerColor {
    Red,
    Yellow,
    Green,
    Purple,
    Black,
    Blue,
    White,
    Brown,
}

impl PlayerColor {
    /// All player colors in seating order
    pub const ALL: [PlayerColor; 8] = [
        PlayerColor::Red,
        PlayerColor::Yellow,
        PlayerColor::Green,
        PlayerColor::Purple,
        PlayerColor::Black,
        PlayerColor::Blue,
        PlayerColor::White,
        PlayerColor::Brown,
    ];
}

impl fmt::Display for PlayerColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlayerColor::Red => "red",
            PlayerColor::Yellow => "yellow",
            PlayerColor::Green => "green",
            PlayerColor::Purple => "purple",
            PlayerColor::Black => "black",
            PlayerColor::Blue => "blue",
            PlayerColor::White => "white",
            PlayerColor::Brown => "brown",
        };
        f.write_str(name)
    }
}

/// Errors from changing a player's own state
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlayerError {
    #[error("locomotive is already at the maximum of {0}")]
    LocomotiveMaxed(u8),
}

/// The slice of player state the map rules depend on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerData {
    /// The player's color
    pub color: PlayerColor,
    /// Maximum number of hops per delivery
    pub locomotive: u8,
}

impl PlayerData {
    /// Create a player with the starting locomotive
    pub fn new(color: PlayerColor) -> Self {
        Self {
            color,
            locomotive: STARTING_LOCOMOTIVE,
        }
    }

    /// Create a player with a specific locomotive value
    pub fn with_locomotive(color: PlayerColor, locomotive: u8) -> Self {
        Self { color, locomotive }
    }

    /// Raise the locomotive by one, up to `max`
    pub fn upgrade_locomotive(&mut self, max: u8) -> Result<(), PlayerError> {
        if self.locomotive >= max {
            return Err(PlayerError::LocomotiveMaxed(max));
        }
        self.locomotive += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_player_starts_with_one_locomotive() {
        let player = PlayerData::new(PlayerColor::Purple);
        assert_eq!(player.locomotive, STARTING_LOCOMOTIVE);
    }

    #[test]
    fn test_upgrade_locomotive_stops_at_max() {
        let mut player = PlayerData::with_locomotive(PlayerColor::Red, MAX_LOCOMOTIVE - 1);
        assert!(player.upgrade_locomotive(MAX_LOCOMOTIVE).is_ok());
        assert_eq!(player.locomotive, MAX_LOCOMOTIVE);
        assert_eq!(
            player.upgrade_locomotive(MAX_LOCOMOTIVE),
            Err(PlayerError::LocomotiveMaxed(MAX_LOCOMOTIVE))
        );
    }
}
