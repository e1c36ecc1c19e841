//! Legality of placing a tile.
//!
//! `BuildValidator::get_invalid_build_reason` checks a proposed tile against
//! the current `Grid` snapshot and reports the first rule it breaks. Checks
//! run in a fixed order; only the first failure is reported.

use crate::coordinates::{Coordinates, Direction, Exit};
use crate::grid::{Connection, Grid, RouteEnd};
use crate::player::PlayerColor;
use crate::rules::{MapRules, TileManifest};
use crate::space::{Land, Space};
use crate::tile::{track_shape, TileData, TileType};
use crate::track::Track;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// A proposed tile placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildInfo {
    pub tile_type: TileType,
    pub orientation: Direction,
    pub player_color: PlayerColor,
}

/// Why a build is not allowed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidBuildReason {
    #[error("cannot build outside the map")]
    OffMap,

    #[error("cannot build on a city")]
    OnCity,

    #[error("cannot build on unpassable terrain")]
    UnpassableTerrain,

    #[error("tile unavailable")]
    TileUnavailable,

    #[error("town tiles can only be placed on towns")]
    TownTileOffTown,

    #[error("towns can only hold town tiles")]
    PlainTileOnTown,

    #[error("cannot reroute track on a town")]
    RerouteOnTown,

    #[error("cannot reroute another player's track")]
    RerouteOtherPlayer,

    #[error("cannot change non-dangling track")]
    NonDanglingTrack,

    #[error("cannot have an exit to unpassable terrain")]
    ExitToUnpassable,

    #[error("must add or reroute track")]
    NoChange,

    #[error("must preserve previous track")]
    MustPreserveTrack,

    #[error("new track cannot connect to another player's track")]
    ConnectsToOtherPlayer,

    #[error("new track must come off a city or extend your own track")]
    Unconnected,

    #[error("cannot create a loop back to the same location")]
    Loop,
}

/// A proposed segment that replaces an existing one while keeping one of
/// its edge exits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reroute<'g> {
    pub previous: &'g Track,
    pub exits: [Exit; 2],
}

impl Reroute<'_> {
    /// The exit of the previous segment that the new one no longer uses
    pub fn abandoned_exit(&self) -> Option<Exit> {
        self.previous
            .exits()
            .into_iter()
            .find(|exit| !self.exits.contains(exit))
    }
}

/// Proposed segments sorted against the segments already on the hex
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackPartition<'g> {
    /// Segments kept exactly as they are
    pub preserved: Vec<&'g Track>,
    pub rerouted: Vec<Reroute<'g>>,
    pub new: Vec<[Exit; 2]>,
}

impl TrackPartition<'_> {
    /// Whether nothing changes
    pub fn is_unchanged(&self) -> bool {
        self.rerouted.is_empty() && self.new.is_empty()
    }
}

fn same_exits(a: &[Exit; 2], b: &[Exit; 2]) -> bool {
    (a[0] == b[0] && a[1] == b[1]) || (a[0] == b[1] && a[1] == b[0])
}

fn shares_edge(a: &[Exit; 2], b: &[Exit; 2]) -> bool {
    a.iter().any(|exit| !exit.is_town() && b.contains(exit))
}

/// Sort `proposed` into preserved, rerouted and new segments relative to `existing`
pub fn partition_tracks<'g>(existing: &'g [Track], proposed: &[[Exit; 2]]) -> TrackPartition<'g> {
    let mut partition = TrackPartition::default();
    let mut used = vec![false; existing.len()];
    let mut unmatched = Vec::new();

    for exits in proposed {
        let same = existing
            .iter()
            .enumerate()
            .find(|(i, track)| !used[*i] && same_exits(&track.exits(), exits));
        match same {
            Some((i, track)) => {
                used[i] = true;
                partition.preserved.push(track);
            }
            None => unmatched.push(*exits),
        }
    }

    for exits in unmatched {
        let shared = existing
            .iter()
            .enumerate()
            .find(|(i, track)| !used[*i] && shares_edge(&track.exits(), &exits));
        match shared {
            Some((i, track)) => {
                used[i] = true;
                partition.rerouted.push(Reroute {
                    previous: track,
                    exits,
                });
            }
            None => partition.new.push(exits),
        }
    }

    partition
}

pub struct BuildValidator<'a> {
    grid: &'a Grid,
    manifest: &'a dyn TileManifest,
}

impl<'a> BuildValidator<'a> {
    pub fn new(grid: &'a Grid, rules: &'a MapRules) -> Self {
        Self {
            grid,
            manifest: rules.manifest.as_ref(),
        }
    }

    /// Use a specific tile supply instead of the map's
    pub fn with_manifest(grid: &'a Grid, manifest: &'a dyn TileManifest) -> Self {
        Self { grid, manifest }
    }

    /// The first rule the build breaks, or `None` if it is legal
    pub fn get_invalid_build_reason(
        &self,
        coordinates: Coordinates,
        build: &BuildInfo,
    ) -> Option<InvalidBuildReason> {
        let reason = self.validate(coordinates, build).err();
        if let Some(reason) = &reason {
            debug!(%coordinates, player = %build.player_color, %reason, "rejected build");
        }
        reason
    }

    /// The tile that ends up on the hex if the build is committed: kept
    /// segments retain their owner, everything else belongs to the builder
    pub fn resulting_tile(&self, coordinates: Coordinates, build: &BuildInfo) -> TileData {
        let proposed = track_shape(build.tile_type, build.orientation);
        let existing = self
            .grid
            .get_land(coordinates)
            .map(Land::tracks)
            .unwrap_or_default();

        let mut owners = Vec::with_capacity(proposed.len());
        let mut claimable_cost = Vec::with_capacity(proposed.len());
        for exits in &proposed {
            match existing.iter().find(|t| same_exits(&t.exits(), exits)) {
                Some(kept) => {
                    owners.push(kept.owner());
                    claimable_cost.push(kept.claimable_cost());
                }
                None => {
                    owners.push(Some(build.player_color));
                    claimable_cost.push(None);
                }
            }
        }
        if claimable_cost.iter().all(Option::is_none) {
            claimable_cost.clear();
        }

        TileData {
            tile_type: build.tile_type,
            orientation: build.orientation,
            owners,
            claimable_cost,
        }
    }

    fn validate(&self, coordinates: Coordinates, build: &BuildInfo) -> Result<(), InvalidBuildReason> {
        let land = match self.grid.get(coordinates) {
            None => return Err(InvalidBuildReason::OffMap),
            Some(Space::City(_)) => return Err(InvalidBuildReason::OnCity),
            Some(Space::Land(land)) => land,
        };
        if !land.is_passable() {
            return Err(InvalidBuildReason::UnpassableTerrain);
        }

        if !self.manifest.tile_available(build.tile_type) {
            return Err(InvalidBuildReason::TileUnavailable);
        }

        match (build.tile_type.is_town(), land.has_town()) {
            (true, false) => return Err(InvalidBuildReason::TownTileOffTown),
            (false, true) => return Err(InvalidBuildReason::PlainTileOnTown),
            _ => {}
        }

        let proposed = track_shape(build.tile_type, build.orientation);
        let existing = land.tracks();
        let partition = partition_tracks(existing, &proposed);

        // town branches never share an edge with each other, so only plain
        // track left on a town by the map data can end up here
        if build.tile_type.is_town() && !partition.rerouted.is_empty() {
            return Err(InvalidBuildReason::RerouteOnTown);
        }

        for reroute in &partition.rerouted {
            self.check_reroute(reroute, build.player_color)?;
        }

        let changed_exits = partition
            .new
            .iter()
            .chain(partition.rerouted.iter().map(|r| &r.exits))
            .flat_map(|exits| exits.iter().filter_map(|exit| exit.direction()));
        for direction in changed_exits {
            if !self.grid.is_passable_edge(coordinates, direction) {
                return Err(InvalidBuildReason::ExitToUnpassable);
            }
        }

        if partition.is_unchanged() {
            return Err(InvalidBuildReason::NoChange);
        }

        if partition.preserved.len() + partition.rerouted.len() != existing.len() {
            return Err(InvalidBuildReason::MustPreserveTrack);
        }

        self.check_connected(coordinates, build, &partition)?;

        self.check_loops(coordinates, build)
    }

    fn check_reroute(&self, reroute: &Reroute<'_>, color: PlayerColor) -> Result<(), InvalidBuildReason> {
        let previous = reroute.previous;
        if previous.owner().is_some_and(|owner| owner != color) {
            return Err(InvalidBuildReason::RerouteOtherPlayer);
        }
        if !self.grid.route_dangles(previous) {
            return Err(InvalidBuildReason::NonDanglingTrack);
        }
        if let Some(abandoned) = reroute.abandoned_exit() {
            if self.grid.is_immovable(previous, abandoned) {
                return Err(InvalidBuildReason::NonDanglingTrack);
            }
        }
        Ok(())
    }

    /// Whether a segment at `coordinates` with `exits` touches a city or the
    /// builder's own track; fails if it runs into another player's track
    fn reaches_own_network(
        &self,
        coordinates: Coordinates,
        exits: &[Exit; 2],
        color: PlayerColor,
    ) -> Result<bool, InvalidBuildReason> {
        let mut connected = false;
        for direction in exits.iter().filter_map(|exit| exit.direction()) {
            match self.grid.connection(coordinates, direction) {
                Some(Connection::City(_)) => connected = true,
                Some(Connection::Track(track)) => match track.owner() {
                    Some(owner) if owner == color => connected = true,
                    Some(_) => return Err(InvalidBuildReason::ConnectsToOtherPlayer),
                    None => {}
                },
                None => {}
            }
        }
        Ok(connected)
    }

    fn check_connected(
        &self,
        coordinates: Coordinates,
        build: &BuildInfo,
        partition: &TrackPartition<'_>,
    ) -> Result<(), InvalidBuildReason> {
        let color = build.player_color;

        for reroute in &partition.rerouted {
            self.reaches_own_network(coordinates, &reroute.exits, color)?;
        }

        let mut statuses = Vec::with_capacity(partition.new.len());
        for exits in &partition.new {
            statuses.push(self.reaches_own_network(coordinates, exits, color)?);
        }

        let connected = if build.tile_type.is_town() {
            // a town tile adds several branches at once; one anchored branch
            // (or the builder's existing branch into the town) is enough
            statuses.iter().any(|ok| *ok)
                || partition.preserved.iter().any(|t| t.owner() == Some(color))
        } else {
            statuses.iter().all(|ok| *ok)
        };

        if connected {
            Ok(())
        } else {
            Err(InvalidBuildReason::Unconnected)
        }
    }

    fn check_loops(&self, coordinates: Coordinates, build: &BuildInfo) -> Result<(), InvalidBuildReason> {
        let placed = self
            .grid
            .with_tile(coordinates, self.resulting_tile(coordinates, build));
        let Some(land) = placed.get_land(coordinates) else {
            return Ok(());
        };

        for track in land.tracks() {
            let [first, second] = track.exits();
            let [a, b] = placed.route_ends(track);
            let loops = match (a, b) {
                (RouteEnd::Cycle(_), _) | (_, RouteEnd::Cycle(_)) => true,
                // a segment touching nothing on either side ends on its own hex twice
                _ if stays_home(track, first, a) && stays_home(track, second, b) => false,
                _ => placed.is_same_location(a.coordinates(), b.coordinates()),
            };
            if loops {
                return Err(InvalidBuildReason::Loop);
            }
        }
        Ok(())
    }
}

/// Whether following `exit` ends without ever leaving the segment's hex
fn stays_home(track: &Track, exit: Exit, end: RouteEnd) -> bool {
    match (exit, end) {
        (Exit::Town, _) => true,
        (Exit::Edge(direction), RouteEnd::Open { coordinates, exit }) => {
            coordinates == track.coordinates() && exit == direction
        }
        _ => false,
    }
}
