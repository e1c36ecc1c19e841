//! Goods delivery: validating a path of hops and finding the routes between stops.

use crate::coordinates::Coordinates;
use crate::goods::Good;
use crate::grid::{Grid, RouteCandidate};
use crate::player::{PlayerColor, PlayerData};
use crate::rules::MapRules;
use crate::space::Space;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

/// One hop of a delivery: the stop reached and whose line was used to get there
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovePath {
    pub owner: Option<PlayerColor>,
    pub ending_stop: Coordinates,
}

/// A proposed delivery of one goods cube
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveData {
    pub start_on: Coordinates,
    pub good: Good,
    pub path: Vec<MovePath>,
}

impl MoveData {
    /// Every stop in order, starting city first
    pub fn stops(&self) -> impl Iterator<Item = Coordinates> + '_ {
        std::iter::once(self.start_on).chain(self.path.iter().map(|hop| hop.ending_stop))
    }

    /// `(from, hop)` for every hop
    pub fn hops(&self) -> impl Iterator<Item = (Coordinates, &MovePath)> + '_ {
        self.stops().zip(self.path.iter())
    }

    pub fn destination(&self) -> Coordinates {
        self.path
            .last()
            .map(|hop| hop.ending_stop)
            .unwrap_or(self.start_on)
    }
}

/// Why a delivery is not allowed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("must move the good at least one step")]
    EmptyPath,

    #[error("cannot move {steps} steps with a locomotive of {locomotive}")]
    TooManySteps { steps: usize, locomotive: u8 },

    #[error("{good} good not found at {start}")]
    GoodNotAtStart { start: Coordinates, good: Good },

    #[error("cannot visit the same stop twice: {0}")]
    RepeatedStop(Coordinates),

    #[error("{0} is neither a city nor a town")]
    InvalidStop(Coordinates),

    #[error("{good} good cannot pass through {city}")]
    CannotPassThrough { city: String, good: Good },

    #[error("no route from {from} to {to} with the given owner")]
    NoRoute { from: Coordinates, to: Coordinates },

    #[error("{good} good cannot be delivered to {to}")]
    CannotDeliver { to: Coordinates, good: Good },
}

pub struct MoveValidator<'a> {
    grid: &'a Grid,
    rules: &'a MapRules,
}

impl<'a> MoveValidator<'a> {
    pub fn new(grid: &'a Grid, rules: &'a MapRules) -> Self {
        Self { grid, rules }
    }

    /// Check a delivery; the first broken rule is returned
    pub fn validate(&self, player: &PlayerData, action: &MoveData) -> Result<(), MoveError> {
        let result = self.check(player, action);
        if let Err(reason) = &result {
            debug!(start = %action.start_on, player = %player.color, %reason, "rejected move");
        }
        result
    }

    /// Hops that use up locomotive capacity
    pub fn counted_steps(&self, action: &MoveData) -> usize {
        action
            .hops()
            .filter(|(from, hop)| {
                !self
                    .rules
                    .extra_routes
                    .exempt_from_locomotive(self.grid, *from, hop.ending_stop)
            })
            .count()
    }

    fn check(&self, player: &PlayerData, action: &MoveData) -> Result<(), MoveError> {
        if action.path.is_empty() {
            return Err(MoveError::EmptyPath);
        }

        let steps = self.counted_steps(action);
        if steps > usize::from(player.locomotive) {
            return Err(MoveError::TooManySteps {
                steps,
                locomotive: player.locomotive,
            });
        }

        let holds_good = self
            .grid
            .get_city(action.start_on)
            .is_some_and(|city| city.has_good(action.good));
        if !holds_good {
            return Err(MoveError::GoodNotAtStart {
                start: action.start_on,
                good: action.good,
            });
        }

        let stops: Vec<Coordinates> = action.stops().collect();
        for (i, stop) in stops.iter().enumerate() {
            if stops[..i]
                .iter()
                .any(|earlier| self.grid.is_same_location(*earlier, *stop))
            {
                return Err(MoveError::RepeatedStop(*stop));
            }
        }

        let last = action.path.len() - 1;
        for hop in &action.path[..last] {
            self.check_intermediate_stop(hop.ending_stop, action.good)?;
        }

        for (from, hop) in action.hops() {
            let found = self
                .find_routes_from_location(from)
                .iter()
                .any(|route| {
                    route.owner == hop.owner
                        && self.grid.is_same_location(route.destination, hop.ending_stop)
                });
            if !found {
                return Err(MoveError::NoRoute {
                    from,
                    to: hop.ending_stop,
                });
            }
        }

        let to = action.destination();
        let accepts = self
            .grid
            .get_city(to)
            .is_some_and(|city| city.accepts(action.good));
        if !accepts {
            return Err(MoveError::CannotDeliver {
                to,
                good: action.good,
            });
        }
        Ok(())
    }

    fn check_intermediate_stop(&self, stop: Coordinates, good: Good) -> Result<(), MoveError> {
        match self.grid.get(stop) {
            Some(Space::City(city)) => {
                if self.rules.pass_through.can_pass_through(city, good) {
                    Ok(())
                } else {
                    Err(MoveError::CannotPassThrough {
                        city: city.name().to_string(),
                        good,
                    })
                }
            }
            Some(Space::Land(land)) if land.has_town() => Ok(()),
            _ => Err(MoveError::InvalidStop(stop)),
        }
    }

    /// Track, intercity and map-specific routes leaving `from`
    pub fn find_routes_from_location(&self, from: Coordinates) -> Vec<RouteCandidate> {
        let mut routes = self.grid.find_routes_from_location(from);
        routes.extend(self.rules.extra_routes.extra_routes(self.grid, from));
        routes
    }

    /// Distinct owners of the routes from `from` to `to`
    pub fn find_routes_to_location(
        &self,
        from: Coordinates,
        to: Coordinates,
    ) -> HashSet<Option<PlayerColor>> {
        self.find_routes_from_location(from)
            .into_iter()
            .filter(|route| self.grid.is_same_location(route.destination, to))
            .map(|route| route.owner)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinates::Direction;
    use crate::grid::{MapState, RouteKind};
    use crate::rules::{MapSettings, PassThroughRule};
    use crate::space::{City, CityData, LandData};
    use crate::tile::{SimpleTileType, TileData, TileType, TownTileType};
    use pretty_assertions::assert_eq;

    const RED: PlayerColor = PlayerColor::Red;
    const BLUE: PlayerColor = PlayerColor::Blue;

    fn c(q: i32, r: i32) -> Coordinates {
        Coordinates::from_qr(q, r)
    }

    fn straight(owner: PlayerColor) -> LandData {
        LandData::plain().with_tile(TileData::owned_by(
            TileType::Simple(SimpleTileType::Straight),
            Direction::Top,
            owner,
        ))
    }

    /// A column: Pittsburgh (0,0) -red track- Erie town (0,-2) -blue track- Cleveland (0,-4)
    fn column() -> MapState {
        MapState::new()
            .with_city(
                c(0, 0),
                CityData::new("Pittsburgh", Good::Red).with_goods(vec![Good::Blue, Good::Yellow]),
            )
            .with_land(c(0, -1), straight(RED))
            .with_land(
                c(0, -2),
                LandData::town("Erie").with_tile(TileData {
                    tile_type: TileType::Town(TownTileType::Straight),
                    orientation: Direction::Top,
                    owners: vec![Some(BLUE), Some(RED)],
                    claimable_cost: Vec::new(),
                }),
            )
            .with_land(c(0, -3), straight(BLUE))
            .with_city(c(0, -4), CityData::new("Cleveland", Good::Blue))
    }

    fn hop(owner: PlayerColor, q: i32, r: i32) -> MovePath {
        MovePath {
            owner: Some(owner),
            ending_stop: c(q, r),
        }
    }

    fn deliver(path: Vec<MovePath>) -> MoveData {
        MoveData {
            start_on: c(0, 0),
            good: Good::Blue,
            path,
        }
    }

    fn validate(state: &MapState, locomotive: u8, action: &MoveData) -> Result<(), MoveError> {
        let grid = Grid::from_state(state);
        let rules = MapRules::standard();
        let player = PlayerData::with_locomotive(RED, locomotive);
        MoveValidator::new(&grid, &rules).validate(&player, action)
    }

    #[test]
    fn test_delivery_through_town() {
        let action = deliver(vec![hop(RED, 0, -2), hop(BLUE, 0, -4)]);
        assert_eq!(validate(&column(), 2, &action), Ok(()));
    }

    #[test]
    fn test_locomotive_limits_hops() {
        let action = deliver(vec![hop(RED, 0, -2), hop(BLUE, 0, -4)]);
        assert_eq!(
            validate(&column(), 1, &action),
            Err(MoveError::TooManySteps {
                steps: 2,
                locomotive: 1
            })
        );
    }

    #[test]
    fn test_empty_path_and_missing_good() {
        assert_eq!(validate(&column(), 2, &deliver(vec![])), Err(MoveError::EmptyPath));

        let action = MoveData {
            good: Good::Purple,
            ..deliver(vec![hop(RED, 0, -2), hop(BLUE, 0, -4)])
        };
        assert_eq!(
            validate(&column(), 2, &action),
            Err(MoveError::GoodNotAtStart {
                start: c(0, 0),
                good: Good::Purple
            })
        );
    }

    #[test]
    fn test_wrong_owner_has_no_route() {
        let action = deliver(vec![hop(BLUE, 0, -2), hop(BLUE, 0, -4)]);
        assert_eq!(
            validate(&column(), 2, &action),
            Err(MoveError::NoRoute {
                from: c(0, 0),
                to: c(0, -2)
            })
        );
    }

    #[test]
    fn test_wrong_color_cannot_be_delivered() {
        let action = MoveData {
            good: Good::Yellow,
            ..deliver(vec![hop(RED, 0, -2), hop(BLUE, 0, -4)])
        };
        assert_eq!(
            validate(&column(), 2, &action),
            Err(MoveError::CannotDeliver {
                to: c(0, -4),
                good: Good::Yellow
            })
        );
        // ending at a town is never a delivery
        let action = deliver(vec![hop(RED, 0, -2)]);
        assert_eq!(
            validate(&column(), 2, &action),
            Err(MoveError::CannotDeliver {
                to: c(0, -2),
                good: Good::Blue
            })
        );
    }

    #[test]
    fn test_same_city_cannot_be_revisited() {
        let state = column()
            .with_city(c(0, -4), CityData::new("Pittsburgh", Good::Blue).with_same_city(1))
            .with_city(
                c(0, 0),
                CityData::new("Pittsburgh", Good::Red)
                    .with_goods(vec![Good::Blue])
                    .with_same_city(1),
            );
        let action = deliver(vec![hop(RED, 0, -2), hop(BLUE, 0, -4)]);
        assert_eq!(
            validate(&state, 6, &action),
            Err(MoveError::RepeatedStop(c(0, -4)))
        );
    }

    #[test]
    fn test_open_track_is_not_a_stop() {
        let action = deliver(vec![hop(RED, 0, -1), hop(RED, 0, -2), hop(BLUE, 0, -4)]);
        assert_eq!(
            validate(&column(), 3, &action),
            Err(MoveError::InvalidStop(c(0, -1)))
        );
    }

    #[test]
    fn test_cannot_pass_through_accepting_city() {
        // Erie becomes a city that takes blue goods
        let state = column().with_city(c(0, -2), CityData::new("Erie", Good::Blue));
        let action = deliver(vec![hop(RED, 0, -2), hop(BLUE, 0, -4)]);
        assert_eq!(
            validate(&state, 2, &action),
            Err(MoveError::CannotPassThrough {
                city: "Erie".to_string(),
                good: Good::Blue
            })
        );
    }

    struct PassAnywhere;

    impl PassThroughRule for PassAnywhere {
        fn can_pass_through(&self, _city: &City, _good: Good) -> bool {
            true
        }
    }

    #[test]
    fn test_pass_through_rule_is_pluggable() {
        let state = column().with_city(c(0, -2), CityData::new("Erie", Good::Blue));
        let grid = Grid::from_state(&state);
        let rules = MapRules::standard().with_pass_through(PassAnywhere);
        let player = PlayerData::with_locomotive(RED, 2);
        let action = deliver(vec![hop(RED, 0, -2), hop(BLUE, 0, -4)]);
        assert_eq!(MoveValidator::new(&grid, &rules).validate(&player, &action), Ok(()));
    }

    #[test]
    fn test_ferry_hop_is_free_and_unowned() {
        let state = column().with_city(c(5, -4), CityData::new("Buffalo", Good::Blue));
        let grid = Grid::from_state(&state);
        let rules = MapRules::from_settings(MapSettings {
            ferries: vec![[c(0, 0), c(5, -4)]],
            ..MapSettings::default()
        });
        let validator = MoveValidator::new(&grid, &rules);
        let player = PlayerData::new(RED);

        let action = deliver(vec![MovePath {
            owner: None,
            ending_stop: c(5, -4),
        }]);
        assert_eq!(validator.counted_steps(&action), 0);
        assert_eq!(validator.validate(&player, &action), Ok(()));

        let routes = validator.find_routes_from_location(c(0, 0));
        assert!(routes.iter().any(|r| r.kind == RouteKind::Teleport));
        assert_eq!(
            validator.find_routes_to_location(c(0, 0), c(5, -4)),
            HashSet::from([None])
        );
    }
}
