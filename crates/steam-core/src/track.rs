//! A single placed track segment.
//!
//! A `Track` only knows where it sits and what its exits are. Anything that
//! depends on neighboring hexes is answered by the `Grid`, so each walking
//! method here takes the grid snapshot and delegates to it.

use crate::coordinates::{Coordinates, Exit};
use crate::grid::{Grid, RouteEnd};
use crate::player::PlayerColor;
use crate::tile::TrackInfo;

/// Identity of a segment within one snapshot: its hex plus its index on the tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrackId {
    pub coordinates: Coordinates,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    coordinates: Coordinates,
    index: usize,
    info: TrackInfo,
}

impl Track {
    pub fn new(coordinates: Coordinates, index: usize, info: TrackInfo) -> Self {
        Self {
            coordinates,
            index,
            info,
        }
    }

    pub fn id(&self) -> TrackId {
        TrackId {
            coordinates: self.coordinates,
            index: self.index,
        }
    }

    /// The hex hosting this segment
    pub fn coordinates(&self) -> Coordinates {
        self.coordinates
    }

    /// Position of this segment on its tile
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn info(&self) -> &TrackInfo {
        &self.info
    }

    pub fn exits(&self) -> [Exit; 2] {
        self.info.exits
    }

    pub fn owner(&self) -> Option<PlayerColor> {
        self.info.owner
    }

    pub fn has_exit(&self, exit: Exit) -> bool {
        self.info.exits.contains(&exit)
    }

    /// The exit at the other end from `exit`
    pub fn other_exit(&self, exit: Exit) -> Exit {
        let [first, second] = self.info.exits;
        if first == exit {
            second
        } else {
            first
        }
    }

    /// Unowned pre-printed track that has to be claimed before use
    pub fn is_claimable(&self) -> bool {
        self.info.owner.is_none() && self.info.claimable_cost.is_some()
    }

    pub fn claimable_cost(&self) -> Option<u32> {
        self.info.claimable_cost
    }

    /// Exits anchored to a town, a city or connecting track
    pub fn immovable_exits(&self, grid: &Grid) -> Vec<Exit> {
        grid.immovable_exits(self)
    }

    /// Whether fewer than two exits are anchored
    pub fn dangles(&self, grid: &Grid) -> bool {
        grid.dangles(self)
    }

    /// The whole continuous line this segment belongs to
    pub fn get_route<'g>(&'g self, grid: &'g Grid) -> Vec<&'g Track> {
        grid.get_route(self)
    }

    /// Where the line ends when followed out through `from_exit`
    pub fn get_end(&self, grid: &Grid, from_exit: Exit) -> RouteEnd {
        grid.get_end(self, from_exit)
    }

    /// Whether either end of the route lands on `coordinates`
    pub fn ends_with(&self, grid: &Grid, coordinates: Coordinates) -> bool {
        grid.ends_with(self, coordinates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinates::Direction;

    fn track(exits: [Exit; 2], owner: Option<PlayerColor>, claimable_cost: Option<u32>) -> Track {
        Track::new(
            Coordinates::ORIGIN,
            0,
            TrackInfo {
                exits,
                owner,
                claimable_cost,
            },
        )
    }

    #[test]
    fn test_other_exit() {
        let t = track([Exit::Edge(Direction::Top), Exit::Town], None, None);
        assert_eq!(t.other_exit(Exit::Town), Exit::Edge(Direction::Top));
        assert_eq!(t.other_exit(Exit::Edge(Direction::Top)), Exit::Town);
        assert!(t.has_exit(Exit::Town));
        assert!(!t.has_exit(Exit::Edge(Direction::Bottom)));
    }

    #[test]
    fn test_claimable_requires_cost_and_no_owner() {
        let exits = [Exit::Edge(Direction::Top), Exit::Edge(Direction::Bottom)];
        assert!(track(exits, None, Some(2)).is_claimable());
        assert!(!track(exits, Some(PlayerColor::Red), Some(2)).is_claimable());
        assert!(!track(exits, None, None).is_claimable());
    }
}
