//! Map actions and the events committing them produces.
//!
//! Every action is validated against a fresh `Grid` snapshot first; the
//! `MapState` is only touched once validation has passed.

use crate::build::{BuildInfo, BuildValidator, InvalidBuildReason};
use crate::claim::{ClaimValidator, InvalidClaimReason};
use crate::coordinates::{Coordinates, Exit};
use crate::goods::{CityGroup, Good};
use crate::grid::{Grid, MapState};
use crate::moves::{MoveData, MoveError, MoveValidator};
use crate::player::{PlayerColor, PlayerData};
use crate::rules::MapRules;
use crate::space::SpaceData;
use crate::tile::TileData;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::info;

/// All actions that change the map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Place or upgrade a tile
    Build {
        coordinates: Coordinates,
        info: BuildInfo,
    },
    /// Take ownership of a pre-printed segment
    Claim {
        coordinates: Coordinates,
        exits: [Exit; 2],
    },
    /// Deliver one goods cube
    MoveGoods(MoveData),
    /// Move pending cubes into cities for each rolled die
    ProduceGoods { group: CityGroup, dice: Vec<u8> },
}

/// Events that occur as a result of actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionEvent {
    /// A tile was placed
    TrackBuilt {
        player: PlayerColor,
        coordinates: Coordinates,
        tile: TileData,
        /// What the build costs under the map's rules
        cost: Option<u32>,
    },

    /// A pre-printed segment changed hands
    TrackClaimed {
        player: PlayerColor,
        coordinates: Coordinates,
        cost: u32,
    },

    /// A cube reached its destination
    GoodsDelivered {
        player: PlayerColor,
        good: Good,
        from: Coordinates,
        to: Coordinates,
        /// One point per hop, to whoever owned the line used
        income: Vec<(PlayerColor, u32)>,
    },

    /// A pending cube became available in a city
    GoodsProduced { coordinates: Coordinates, good: Good },
}

/// Errors that can occur when applying actions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("cannot build for another player")]
    WrongPlayer,

    #[error(transparent)]
    Build(#[from] InvalidBuildReason),

    #[error(transparent)]
    Claim(#[from] InvalidClaimReason),

    #[error(transparent)]
    Move(#[from] MoveError),
}

/// Validate `action` for `player` and commit it to `state`
pub fn apply_action(
    state: &mut MapState,
    rules: &MapRules,
    player: &PlayerData,
    action: Action,
) -> Result<Vec<ActionEvent>, ActionError> {
    let grid = Grid::from_state(state);
    let mut events = Vec::new();

    match action {
        Action::Build { coordinates, info } => {
            if info.player_color != player.color {
                return Err(ActionError::WrongPlayer);
            }
            let validator = BuildValidator::new(&grid, rules);
            if let Some(reason) = validator.get_invalid_build_reason(coordinates, &info) {
                return Err(reason.into());
            }

            let cost = rules.costs.build_cost(&grid, coordinates, &info);
            let tile = validator.resulting_tile(coordinates, &info);
            state.set_tile(coordinates, tile.clone());
            info!(%coordinates, player = %player.color, tile = ?info.tile_type, "track built");

            events.push(ActionEvent::TrackBuilt {
                player: player.color,
                coordinates,
                tile,
                cost,
            });
        }

        Action::Claim { coordinates, exits } => {
            let validator = ClaimValidator::new(&grid);
            if let Some(reason) = validator.get_invalid_claim_reason(player.color, coordinates, exits) {
                return Err(reason.into());
            }
            let track = validator
                .find_track(coordinates, exits)
                .ok_or(InvalidClaimReason::NoTrack(coordinates))?;
            let (index, cost) = (track.index(), track.claimable_cost().unwrap_or_default());

            state.update(coordinates, |space| {
                if let SpaceData::Land(land) = space {
                    if let Some(tile) = land.tile.as_mut() {
                        claim_segment(tile, index, player.color);
                    }
                }
            });
            info!(%coordinates, player = %player.color, cost, "track claimed");

            events.push(ActionEvent::TrackClaimed {
                player: player.color,
                coordinates,
                cost,
            });
        }

        Action::MoveGoods(data) => {
            MoveValidator::new(&grid, rules).validate(player, &data)?;

            state.update(data.start_on, |space| {
                if let SpaceData::City(city) = space {
                    city.take_good(data.good);
                }
            });

            let mut income: BTreeMap<PlayerColor, u32> = BTreeMap::new();
            for owner in data.path.iter().filter_map(|hop| hop.owner) {
                *income.entry(owner).or_insert(0) += 1;
            }
            info!(
                from = %data.start_on,
                to = %data.destination(),
                good = %data.good,
                player = %player.color,
                "goods delivered"
            );

            events.push(ActionEvent::GoodsDelivered {
                player: player.color,
                good: data.good,
                from: data.start_on,
                to: data.destination(),
                income: income.into_iter().collect(),
            });
        }

        Action::ProduceGoods { group, dice } => {
            for (coordinates, space) in state.spaces.iter_mut() {
                let SpaceData::City(city) = space else {
                    continue;
                };
                for die in &dice {
                    if let Some(good) = city.grow(group, *die) {
                        events.push(ActionEvent::GoodsProduced {
                            coordinates: *coordinates,
                            good,
                        });
                    }
                }
            }
            info!(?group, produced = events.len(), "goods produced");
        }
    }

    Ok(events)
}

fn claim_segment(tile: &mut TileData, index: usize, color: PlayerColor) {
    if tile.owners.len() <= index {
        tile.owners.resize(index + 1, None);
    }
    tile.owners[index] = Some(color);
    if let Some(cost) = tile.claimable_cost.get_mut(index) {
        *cost = None;
    }
    if tile.claimable_cost.iter().all(Option::is_none) {
        tile.claimable_cost.clear();
    }
}
