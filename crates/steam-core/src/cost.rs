//! What a build costs.
//!
//! Costs are informational: legality never depends on them, the caller
//! charges the player after a build is accepted.

use crate::build::{partition_tracks, BuildInfo};
use crate::coordinates::Coordinates;
use crate::grid::Grid;
use crate::space::{Land, LandType};
use crate::tile::{track_shape, TileType};

/// Cost of upgrading an existing tile to one with crossing segments
pub const CROSSING_UPGRADE_COST: u32 = 3;
/// Cost of any other upgrade over an existing tile
pub const UPGRADE_COST: u32 = 2;
/// Cost of redirecting dangling track without adding any
pub const REROUTE_COST: u32 = 2;
/// Base cost of a town tile, before its segments
pub const TOWN_COST: u32 = 1;

/// How much a map charges for building
pub trait CostRule {
    /// Cost of laying track on empty land
    fn terrain_cost(&self, land: &Land) -> Option<u32>;

    /// Cost of placing `build` at `coordinates`, or `None` where nothing can
    /// be built at all
    fn build_cost(&self, grid: &Grid, coordinates: Coordinates, build: &BuildInfo) -> Option<u32>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StandardCosts;

impl StandardCosts {
    pub fn land_type_cost(land_type: LandType) -> Option<u32> {
        match land_type {
            LandType::Plain | LandType::Street => Some(2),
            LandType::River | LandType::Desert => Some(3),
            LandType::Hill | LandType::Mountain | LandType::Swamp => Some(4),
            LandType::Lake => Some(5),
            LandType::Unpassable => None,
        }
    }
}

impl CostRule for StandardCosts {
    fn terrain_cost(&self, land: &Land) -> Option<u32> {
        if !land.is_passable() {
            return None;
        }
        land.terrain_cost()
            .or_else(|| Self::land_type_cost(land.land_type()))
    }

    fn build_cost(&self, grid: &Grid, coordinates: Coordinates, build: &BuildInfo) -> Option<u32> {
        let land = grid.get_land(coordinates)?;
        let proposed = track_shape(build.tile_type, build.orientation);
        let partition = partition_tracks(land.tracks(), &proposed);

        if let TileType::Town(_) = build.tile_type {
            self.terrain_cost(land)?;
            let added = u32::try_from(partition.new.len()).unwrap_or(u32::MAX);
            return Some(TOWN_COST.saturating_add(added));
        }

        if land.tile().is_none() {
            return self.terrain_cost(land);
        }
        if partition.new.is_empty() && !partition.rerouted.is_empty() {
            return Some(REROUTE_COST);
        }
        let crosses = matches!(build.tile_type, TileType::Complex(complex) if complex.crosses());
        Some(if crosses {
            CROSSING_UPGRADE_COST
        } else {
            UPGRADE_COST
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinates::Direction::*;
    use crate::goods::Good;
    use crate::grid::MapState;
    use crate::player::PlayerColor;
    use crate::space::{CityData, LandData};
    use crate::tile::{ComplexTileType, SimpleTileType, TileData, TownTileType};

    const RED: PlayerColor = PlayerColor::Red;
    const STRAIGHT: TileType = TileType::Simple(SimpleTileType::Straight);

    fn c(q: i32, r: i32) -> Coordinates {
        Coordinates::from_qr(q, r)
    }

    fn info(tile_type: TileType, orientation: crate::coordinates::Direction) -> BuildInfo {
        BuildInfo {
            tile_type,
            orientation,
            player_color: RED,
        }
    }

    #[test]
    fn test_terrain_costs() {
        let state = MapState::new()
            .with_land(c(0, 0), LandData::plain())
            .with_land(c(1, 0), LandData::of_type(LandType::Mountain))
            .with_land(c(2, 0), LandData::of_type(LandType::Lake))
            .with_land(
                c(3, 0),
                LandData {
                    terrain_cost: Some(7),
                    ..LandData::of_type(LandType::River)
                },
            )
            .with_land(c(4, 0), LandData::of_type(LandType::Unpassable))
            .with_city(c(5, 0), CityData::new("A", Good::Red));
        let grid = Grid::from_state(&state);
        let cost = |q| StandardCosts.build_cost(&grid, c(q, 0), &info(STRAIGHT, Top));

        assert_eq!(cost(0), Some(2));
        assert_eq!(cost(1), Some(4));
        assert_eq!(cost(2), Some(5));
        assert_eq!(cost(3), Some(7));
        assert_eq!(cost(4), None);
        assert_eq!(cost(5), None);
    }

    #[test]
    fn test_town_tile_cost_counts_segments() {
        let state = MapState::new().with_land(
            c(0, 0),
            LandData {
                land_type: LandType::Mountain,
                ..LandData::town("Erie")
            },
        );
        let grid = Grid::from_state(&state);
        let fan = info(TileType::Town(TownTileType::Fan), Top);
        assert_eq!(StandardCosts.build_cost(&grid, c(0, 0), &fan), Some(5));

        // adding one branch to an existing lollypop
        let state = MapState::new().with_land(
            c(0, 0),
            LandData::town("Erie").with_tile(TileData::owned_by(
                TileType::Town(TownTileType::Lollypop),
                Top,
                RED,
            )),
        );
        let grid = Grid::from_state(&state);
        let straight = info(TileType::Town(TownTileType::Straight), Top);
        assert_eq!(StandardCosts.build_cost(&grid, c(0, 0), &straight), Some(2));
    }

    #[test]
    fn test_upgrades_and_reroutes() {
        let state = MapState::new().with_land(
            c(0, 0),
            LandData::of_type(LandType::Mountain).with_tile(TileData::owned_by(STRAIGHT, Top, RED)),
        );
        let grid = Grid::from_state(&state);
        let cost = |tile_type, orientation| {
            StandardCosts.build_cost(&grid, c(0, 0), &info(tile_type, orientation))
        };

        assert_eq!(cost(TileType::Complex(ComplexTileType::X), Top), Some(3));
        assert_eq!(cost(TileType::Complex(ComplexTileType::StraightTight), Top), Some(2));
        assert_eq!(cost(TileType::Simple(SimpleTileType::Curve), Top), Some(2));
    }
}
