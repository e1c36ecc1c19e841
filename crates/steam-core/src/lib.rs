//! Steam - a rail-network map engine
//!
//! This crate provides the map rules for a hex-grid railroad game, including:
//! - Hex coordinates, edge directions and tile geometry
//! - Cities, land, towns and the track placed on them
//! - A read-only grid snapshot answering connectivity questions
//! - Validators for building, claiming track and moving goods
//!
//! # Architecture
//!
//! Validation never mutates anything. A `Grid` is built from the current
//! `MapState`, questions are asked of it, and only `apply_action` writes
//! back to the state once an action has been accepted. Map variants plug in
//! through the capability traits in [`rules`] instead of subclassing.
//!
//! # Modules
//!
//! - [`coordinates`]: Axial hex coordinates, directions and exits
//! - [`tile`]: Tile catalog and segment geometry
//! - [`grid`]: Map state, snapshots and route walking
//! - [`build`]: Build legality
//! - [`moves`]: Goods movement legality and route discovery
//! - [`rules`]: Per-map capabilities and settings

pub mod actions;
pub mod build;
pub mod claim;
pub mod coordinates;
pub mod cost;
pub mod goods;
pub mod grid;
pub mod moves;
pub mod player;
pub mod rules;
pub mod space;
pub mod tile;
pub mod track;
#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use actions::{apply_action, Action, ActionError, ActionEvent};
pub use build::{partition_tracks, BuildInfo, BuildValidator, InvalidBuildReason};
pub use claim::{ClaimValidator, InvalidClaimReason};
pub use coordinates::{Coordinates, CoordinatesParseError, Direction, Exit};
pub use cost::{CostRule, StandardCosts};
pub use goods::{roll_dice, CityGroup, Good, GoodsBag};
pub use grid::{
    Connection, Dangler, Grid, InterCityConnection, MapState, RouteCandidate, RouteEnd, RouteKind,
};
pub use moves::{MoveData, MoveError, MovePath, MoveValidator};
pub use player::{PlayerColor, PlayerData, PlayerError};
pub use rules::{
    ConfigError, ExtraRouteRule, Ferries, MapRules, MapSettings, NoExtraRoutes, PassThroughRule,
    StandardPassThrough, TileInventory, TileManifest, UnlimitedManifest,
};
pub use space::{City, CityData, Land, LandData, LandType, OnRollData, Space, SpaceData};
pub use tile::{
    calculate_track_info, track_shape, ComplexTileType, SimpleTileType, TileData, TileType,
    TownTileType, TrackInfo,
};
pub use track::{Track, TrackId};
