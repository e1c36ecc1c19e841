//! The map snapshot and every spatial query the rules are built on.
//!
//! This module contains:
//! - `MapState`: the serializable game-state map (coordinate -> space descriptor)
//! - `Grid`: an immutable view of one `MapState` version
//! - Cross-edge connection resolution and route walking
//! - Dangling-track reports and route discovery between stops
//!
//! A `Grid` is never mutated. Committing a change means editing the
//! `MapState` and building a fresh `Grid` from it.

use crate::coordinates::{Coordinates, Direction, Exit};
use crate::player::PlayerColor;
use crate::space::{City, CityData, Land, LandData, Space, SpaceData};
use crate::tile::TileData;
use crate::track::{Track, TrackId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::trace;

/// A player-buildable link straight between two cities, outside the hex track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterCityConnection {
    pub connects: [Coordinates; 2],
    pub cost: u32,
    #[serde(default)]
    pub owner: Option<PlayerColor>,
}

impl InterCityConnection {
    /// The far end when starting from `from`, if this link touches it
    pub fn other_end(&self, from: Coordinates) -> Option<Coordinates> {
        match self.connects {
            [a, b] if a == from => Some(b),
            [a, b] if b == from => Some(a),
            _ => None,
        }
    }
}

/// Serializable state of the whole map
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapState {
    pub spaces: BTreeMap<Coordinates, SpaceData>,
    #[serde(default)]
    pub connections: Vec<InterCityConnection>,
}

impl MapState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_city(mut self, coordinates: Coordinates, city: CityData) -> Self {
        self.set(coordinates, SpaceData::City(city));
        self
    }

    pub fn with_land(mut self, coordinates: Coordinates, land: LandData) -> Self {
        self.set(coordinates, SpaceData::Land(land));
        self
    }

    pub fn with_connection(mut self, connection: InterCityConnection) -> Self {
        self.connections.push(connection);
        self
    }

    pub fn get(&self, coordinates: Coordinates) -> Option<&SpaceData> {
        self.spaces.get(&coordinates)
    }

    /// Replace whatever occupies a hex
    pub fn set(&mut self, coordinates: Coordinates, space: SpaceData) {
        self.spaces.insert(coordinates, space);
    }

    /// Edit a hex in place; returns `None` if the hex is not on the map
    pub fn update<T>(
        &mut self,
        coordinates: Coordinates,
        f: impl FnOnce(&mut SpaceData) -> T,
    ) -> Option<T> {
        self.spaces.get_mut(&coordinates).map(f)
    }

    /// Place a tile on a land hex; returns whether the hex was land
    pub fn set_tile(&mut self, coordinates: Coordinates, tile: TileData) -> bool {
        self.update(coordinates, |space| match space {
            SpaceData::Land(land) => {
                land.tile = Some(tile);
                true
            }
            SpaceData::City(_) => false,
        })
        .unwrap_or(false)
    }
}

/// What lies across one hex edge
#[derive(Debug, Clone, Copy)]
pub enum Connection<'g> {
    City(&'g City),
    Track(&'g Track),
}

/// Where a line of track stops when followed in one direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteEnd {
    /// Runs into a city
    City(Coordinates),
    /// Stops at the town in the given hex
    Town(Coordinates),
    /// Leaves the last hex through an edge with nothing on the other side
    Open {
        coordinates: Coordinates,
        exit: Direction,
    },
    /// Re-enters a segment already walked, at the given hex
    Cycle(Coordinates),
}

impl RouteEnd {
    pub fn coordinates(&self) -> Coordinates {
        match self {
            RouteEnd::City(coordinates)
            | RouteEnd::Town(coordinates)
            | RouteEnd::Cycle(coordinates)
            | RouteEnd::Open { coordinates, .. } => *coordinates,
        }
    }

    /// Ends at a city or a town
    pub fn is_anchored(&self) -> bool {
        matches!(self, RouteEnd::City(_) | RouteEnd::Town(_))
    }
}

/// A dangling segment reported for end-of-turn checks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dangler {
    pub coordinates: Coordinates,
    /// The one anchored exit, if the segment has any
    pub immovable_exit: Option<Exit>,
    /// Number of segments in the dangling route
    pub length: usize,
}

/// How a route between two stops is made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RouteKind {
    /// A line of placed track
    Track,
    /// An intercity connection
    Connection,
    /// A map-specific jump such as a ferry
    Teleport,
}

/// One way to travel from a stop to another
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteCandidate {
    pub kind: RouteKind,
    pub destination: Coordinates,
    pub owner: Option<PlayerColor>,
}

/// Immutable snapshot of the map
#[derive(Debug, Clone, Default)]
pub struct Grid {
    spaces: HashMap<Coordinates, Space>,
    connections: Vec<InterCityConnection>,
}

impl Grid {
    /// Build a snapshot of the given state
    pub fn from_state(state: &MapState) -> Self {
        let spaces = state
            .spaces
            .iter()
            .map(|(coordinates, data)| (*coordinates, Space::from_data(*coordinates, data)))
            .collect();
        Self {
            spaces,
            connections: state.connections.clone(),
        }
    }

    /// A copy of this snapshot with `tile` placed at `coordinates`.
    ///
    /// Used to ask questions about a build before it is committed.
    pub fn with_tile(&self, coordinates: Coordinates, tile: TileData) -> Grid {
        let mut grid = self.clone();
        if let Some(Space::Land(land)) = self.spaces.get(&coordinates) {
            let data = LandData {
                tile: Some(tile),
                ..land.data().clone()
            };
            grid.spaces
                .insert(coordinates, Space::Land(Land::new(coordinates, data)));
        }
        grid
    }

    pub fn get(&self, coordinates: Coordinates) -> Option<&Space> {
        self.spaces.get(&coordinates)
    }

    pub fn has(&self, coordinates: Coordinates) -> bool {
        self.spaces.contains_key(&coordinates)
    }

    pub fn get_city(&self, coordinates: Coordinates) -> Option<&City> {
        self.get(coordinates).and_then(Space::as_city)
    }

    pub fn get_land(&self, coordinates: Coordinates) -> Option<&Land> {
        self.get(coordinates).and_then(Space::as_land)
    }

    pub fn cities(&self) -> impl Iterator<Item = &City> {
        self.spaces.values().filter_map(Space::as_city)
    }

    pub fn lands(&self) -> impl Iterator<Item = &Land> {
        self.spaces.values().filter_map(Space::as_land)
    }

    pub fn connections(&self) -> &[InterCityConnection] {
        &self.connections
    }

    pub fn get_neighbor(&self, coordinates: Coordinates, direction: Direction) -> Option<&Space> {
        self.get(coordinates.neighbor(direction))
    }

    /// Whether track may cross this edge at all: both sides exist, neither is
    /// impassable terrain, and neither side marks the edge unpassable
    pub fn is_passable_edge(&self, coordinates: Coordinates, direction: Direction) -> bool {
        let blocked_here = self
            .get_land(coordinates)
            .is_some_and(|land| land.blocks_edge(direction));
        if blocked_here {
            return false;
        }
        match self.get_neighbor(coordinates, direction) {
            None => false,
            Some(Space::City(_)) => true,
            Some(Space::Land(land)) => {
                land.is_passable() && !land.blocks_edge(direction.opposite())
            }
        }
    }

    /// What is reached by leaving `coordinates` through `direction`: a city,
    /// or the neighboring segment whose exit points back at us
    pub fn connection(&self, coordinates: Coordinates, direction: Direction) -> Option<Connection<'_>> {
        if !self.is_passable_edge(coordinates, direction) {
            return None;
        }
        match self.get_neighbor(coordinates, direction)? {
            Space::City(city) => Some(Connection::City(city)),
            Space::Land(land) => land
                .track_with_exit(Exit::Edge(direction.opposite()))
                .map(Connection::Track),
        }
    }

    /// Whether an exit is anchored to a town, a city or connecting track
    pub fn is_immovable(&self, track: &Track, exit: Exit) -> bool {
        match exit {
            Exit::Town => true,
            Exit::Edge(direction) => self.connection(track.coordinates(), direction).is_some(),
        }
    }

    pub fn immovable_exits(&self, track: &Track) -> Vec<Exit> {
        track
            .exits()
            .into_iter()
            .filter(|exit| self.is_immovable(track, *exit))
            .collect()
    }

    pub fn dangles(&self, track: &Track) -> bool {
        self.immovable_exits(track).len() < 2
    }

    /// Whether any segment of the track's route dangles
    pub fn route_dangles(&self, track: &Track) -> bool {
        self.get_route(track).iter().any(|t| self.dangles(t))
    }

    /// Follow the line out of `start` through `from_exit`, collecting the
    /// segments passed (excluding `start`) and where it stops
    fn walk<'g>(&'g self, start: &'g Track, from_exit: Exit) -> (Vec<&'g Track>, RouteEnd) {
        let mut chain = Vec::new();
        let mut visited: HashSet<TrackId> = HashSet::from([start.id()]);
        let mut current = start;
        let mut exit = from_exit;

        loop {
            let direction = match exit {
                Exit::Town => return (chain, RouteEnd::Town(current.coordinates())),
                Exit::Edge(direction) => direction,
            };
            match self.connection(current.coordinates(), direction) {
                None => {
                    let end = RouteEnd::Open {
                        coordinates: current.coordinates(),
                        exit: direction,
                    };
                    return (chain, end);
                }
                Some(Connection::City(city)) => return (chain, RouteEnd::City(city.coordinates())),
                Some(Connection::Track(next)) => {
                    if !visited.insert(next.id()) {
                        return (chain, RouteEnd::Cycle(next.coordinates()));
                    }
                    chain.push(next);
                    exit = next.other_exit(Exit::Edge(direction.opposite()));
                    current = next;
                }
            }
        }
    }

    pub fn get_end(&self, track: &Track, from_exit: Exit) -> RouteEnd {
        self.walk(track, from_exit).1
    }

    /// Both ends of the track's route, in exit order
    pub fn route_ends(&self, track: &Track) -> [RouteEnd; 2] {
        track.exits().map(|exit| self.get_end(track, exit))
    }

    /// The ordered chain of segments forming one continuous line through `track`
    pub fn get_route<'g>(&'g self, track: &'g Track) -> Vec<&'g Track> {
        let [first, second] = track.exits();
        let (mut route, _) = self.walk(track, first);
        route.reverse();
        route.push(track);
        let (forward, _) = self.walk(track, second);
        for segment in forward {
            // a closed ring is reached from both sides
            if !route.iter().any(|t| t.id() == segment.id()) {
                route.push(segment);
            }
        }
        route
    }

    pub fn ends_with(&self, track: &Track, coordinates: Coordinates) -> bool {
        self.route_ends(track)
            .iter()
            .any(|end| end.coordinates() == coordinates)
    }

    /// Dangling segments owned by `color` (or unowned when `None`)
    pub fn get_danglers(&self, color: Option<PlayerColor>) -> Vec<Dangler> {
        let mut danglers: Vec<Dangler> = self
            .lands()
            .flat_map(|land| land.tracks())
            .filter(|track| track.owner() == color && self.dangles(track))
            .map(|track| Dangler {
                coordinates: track.coordinates(),
                immovable_exit: self.immovable_exits(track).first().copied(),
                length: self.get_route(track).len(),
            })
            .collect();
        danglers.sort_by_key(|d| (d.coordinates, d.immovable_exit));
        danglers
    }

    /// Whether two hexes are the same stop: equal, or aliases of one city
    pub fn is_same_location(&self, a: Coordinates, b: Coordinates) -> bool {
        if a == b {
            return true;
        }
        match (self.get_city(a), self.get_city(b)) {
            (Some(a), Some(b)) => a.is_same_city(b),
            _ => false,
        }
    }

    /// All hexes of the logical city at `coordinates`
    fn city_hexes(&self, city: &City) -> Vec<Coordinates> {
        if city.same_city().is_none() {
            return vec![city.coordinates()];
        }
        let mut hexes: Vec<Coordinates> = self
            .cities()
            .filter(|other| city.is_same_city(other))
            .map(City::coordinates)
            .collect();
        hexes.sort();
        hexes
    }

    /// Every stop reachable in one hop from `from`, with the owner of the way there
    pub fn find_routes_from_location(&self, from: Coordinates) -> Vec<RouteCandidate> {
        let routes = match self.get(from) {
            Some(Space::City(city)) => self.routes_from_city(city),
            Some(Space::Land(land)) if land.has_town() => self.routes_from_town(land),
            _ => Vec::new(),
        };
        trace!(%from, count = routes.len(), "found routes");
        routes
    }

    /// Distinct owners of the routes leading from `from` to `to`
    pub fn find_routes_to_location(
        &self,
        from: Coordinates,
        to: Coordinates,
    ) -> HashSet<Option<PlayerColor>> {
        self.find_routes_from_location(from)
            .into_iter()
            .filter(|route| self.is_same_location(route.destination, to))
            .map(|route| route.owner)
            .collect()
    }

    fn routes_from_city(&self, city: &City) -> Vec<RouteCandidate> {
        let hexes = self.city_hexes(city);
        let mut routes = Vec::new();

        for hex in &hexes {
            for direction in Direction::ALL {
                if let Some(Connection::Track(first)) = self.connection(*hex, direction) {
                    routes.extend(self.track_route(first, Exit::Edge(direction.opposite())));
                }
            }
            for connection in &self.connections {
                if connection.owner.is_none() {
                    continue;
                }
                if let Some(destination) = connection.other_end(*hex) {
                    routes.push(RouteCandidate {
                        kind: RouteKind::Connection,
                        destination,
                        owner: connection.owner,
                    });
                }
            }
        }

        routes.retain(|route| !self.is_same_location(route.destination, city.coordinates()));
        routes
    }

    fn routes_from_town(&self, town: &Land) -> Vec<RouteCandidate> {
        town.tracks()
            .iter()
            .filter_map(|track| self.track_route(track, Exit::Town))
            .filter(|route| route.destination != town.coordinates())
            .collect()
    }

    /// The route starting with `first`, entered through `entered_by`.
    ///
    /// Lines that end nowhere or run into a cycle are not usable, and neither
    /// is a line made only of track still waiting to be claimed.
    fn track_route(&self, first: &Track, entered_by: Exit) -> Option<RouteCandidate> {
        let (chain, end) = self.walk(first, first.other_exit(entered_by));
        if first.is_claimable() && chain.iter().all(|t| t.is_claimable()) {
            return None;
        }
        let destination = match end {
            RouteEnd::City(coordinates) | RouteEnd::Town(coordinates) => coordinates,
            RouteEnd::Open { .. } | RouteEnd::Cycle(_) => return None,
        };
        Some(RouteCandidate {
            kind: RouteKind::Track,
            destination,
            owner: first.owner(),
        })
    }
}
