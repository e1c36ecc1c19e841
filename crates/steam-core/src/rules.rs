//! Map configuration and the capabilities a map may customize.
//!
//! Instead of one rules class per map, each customizable concern is a small
//! trait. A map's `MapRules` picks one implementation per concern, and
//! concerns that stack (extra routes) are composed as wrappers, each one
//! delegating to the next.

use crate::coordinates::Coordinates;
use crate::cost::{CostRule, StandardCosts};
use crate::goods::Good;
use crate::grid::{Grid, RouteCandidate, RouteKind};
use crate::player::{MAX_LOCOMOTIVE, STARTING_LOCOMOTIVE};
use crate::space::City;
use crate::tile::TileType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Errors from loading map configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid map settings: {0}")]
    Json(#[from] serde_json::Error),

    #[error("locomotive range {starting}..={max} is empty")]
    LocomotiveRange { starting: u8, max: u8 },
}

/// Whether a tile is still in the supply
pub trait TileManifest {
    fn tile_available(&self, tile_type: TileType) -> bool;
}

/// A supply that never runs out
#[derive(Debug, Clone, Copy, Default)]
pub struct UnlimitedManifest;

impl TileManifest for UnlimitedManifest {
    fn tile_available(&self, _tile_type: TileType) -> bool {
        true
    }
}

/// A counted tile supply
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TileInventory {
    remaining: HashMap<TileType, u32>,
}

impl TileInventory {
    pub fn new(counts: impl IntoIterator<Item = (TileType, u32)>) -> Self {
        Self {
            remaining: counts.into_iter().collect(),
        }
    }

    pub fn remaining(&self, tile_type: TileType) -> u32 {
        self.remaining.get(&tile_type).copied().unwrap_or(0)
    }

    /// Take one tile out of the supply; returns whether one was left
    pub fn take(&mut self, tile_type: TileType) -> bool {
        match self.remaining.get_mut(&tile_type) {
            Some(count) if *count > 0 => {
                *count -= 1;
                true
            }
            _ => false,
        }
    }

    /// Put a replaced tile back into the supply
    pub fn give_back(&mut self, tile_type: TileType) {
        *self.remaining.entry(tile_type).or_insert(0) += 1;
    }
}

impl TileManifest for TileInventory {
    fn tile_available(&self, tile_type: TileType) -> bool {
        self.remaining(tile_type) > 0
    }
}

/// Whether a good may move through a city without stopping there
pub trait PassThroughRule {
    fn can_pass_through(&self, city: &City, good: Good) -> bool;
}

/// A good must stop at the first city that accepts its color
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardPassThrough;

impl PassThroughRule for StandardPassThrough {
    fn can_pass_through(&self, city: &City, good: Good) -> bool {
        !city.accepts(good)
    }
}

/// Routes a map adds on top of track and intercity connections
pub trait ExtraRouteRule {
    fn extra_routes(&self, grid: &Grid, from: Coordinates) -> Vec<RouteCandidate>;

    /// Whether a hop from `from` to `to` is free of the locomotive limit
    fn exempt_from_locomotive(&self, _grid: &Grid, _from: Coordinates, _to: Coordinates) -> bool {
        false
    }
}

/// End of the extra-route chain
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExtraRoutes;

impl ExtraRouteRule for NoExtraRoutes {
    fn extra_routes(&self, _grid: &Grid, _from: Coordinates) -> Vec<RouteCandidate> {
        Vec::new()
    }
}

/// Ferry links: unowned jumps between two stops that do not use up a
/// locomotive hop. Wraps the next rule in the chain.
#[derive(Debug, Clone)]
pub struct Ferries<R> {
    inner: R,
    links: Vec<[Coordinates; 2]>,
}

impl<R: ExtraRouteRule> Ferries<R> {
    pub fn new(inner: R, links: Vec<[Coordinates; 2]>) -> Self {
        Self { inner, links }
    }

    fn links_between(&self, grid: &Grid, from: Coordinates, to: Coordinates) -> bool {
        self.links.iter().any(|[a, b]| {
            (grid.is_same_location(*a, from) && grid.is_same_location(*b, to))
                || (grid.is_same_location(*b, from) && grid.is_same_location(*a, to))
        })
    }
}

impl<R: ExtraRouteRule> ExtraRouteRule for Ferries<R> {
    fn extra_routes(&self, grid: &Grid, from: Coordinates) -> Vec<RouteCandidate> {
        let mut routes = self.inner.extra_routes(grid, from);
        for [a, b] in &self.links {
            let destination = if grid.is_same_location(*a, from) {
                *b
            } else if grid.is_same_location(*b, from) {
                *a
            } else {
                continue;
            };
            routes.push(RouteCandidate {
                kind: RouteKind::Teleport,
                destination,
                owner: None,
            });
        }
        routes
    }

    fn exempt_from_locomotive(&self, grid: &Grid, from: Coordinates, to: Coordinates) -> bool {
        self.links_between(grid, from, to) || self.inner.exempt_from_locomotive(grid, from, to)
    }
}

/// Serializable per-map configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapSettings {
    pub name: String,
    #[serde(default = "default_starting_locomotive")]
    pub starting_locomotive: u8,
    #[serde(default = "default_max_locomotive")]
    pub max_locomotive: u8,
    /// Pairs of stops joined by a ferry
    #[serde(default)]
    pub ferries: Vec<[Coordinates; 2]>,
}

fn default_starting_locomotive() -> u8 {
    STARTING_LOCOMOTIVE
}

fn default_max_locomotive() -> u8 {
    MAX_LOCOMOTIVE
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            name: "Rust Belt".to_string(),
            starting_locomotive: STARTING_LOCOMOTIVE,
            max_locomotive: MAX_LOCOMOTIVE,
            ferries: Vec::new(),
        }
    }
}

impl MapSettings {
    /// Parse and check settings from JSON
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: MapSettings = serde_json::from_str(json)?;
        if settings.starting_locomotive > settings.max_locomotive {
            return Err(ConfigError::LocomotiveRange {
                starting: settings.starting_locomotive,
                max: settings.max_locomotive,
            });
        }
        Ok(settings)
    }
}

/// The capability table for one map
pub struct MapRules {
    pub settings: MapSettings,
    pub manifest: Box<dyn TileManifest>,
    pub pass_through: Box<dyn PassThroughRule>,
    pub extra_routes: Box<dyn ExtraRouteRule>,
    pub costs: Box<dyn CostRule>,
}

impl MapRules {
    /// Base-game rules with an unlimited tile supply
    pub fn standard() -> Self {
        Self::from_settings(MapSettings::default())
    }

    /// Compose the capabilities a map's settings ask for
    pub fn from_settings(settings: MapSettings) -> Self {
        let extra_routes: Box<dyn ExtraRouteRule> = if settings.ferries.is_empty() {
            Box::new(NoExtraRoutes)
        } else {
            Box::new(Ferries::new(NoExtraRoutes, settings.ferries.clone()))
        };
        Self {
            settings,
            manifest: Box::new(UnlimitedManifest),
            pass_through: Box::new(StandardPassThrough),
            extra_routes,
            costs: Box::new(StandardCosts),
        }
    }

    pub fn with_manifest(mut self, manifest: impl TileManifest + 'static) -> Self {
        self.manifest = Box::new(manifest);
        self
    }

    pub fn with_pass_through(mut self, rule: impl PassThroughRule + 'static) -> Self {
        self.pass_through = Box::new(rule);
        self
    }

    pub fn with_extra_routes(mut self, rule: impl ExtraRouteRule + 'static) -> Self {
        self.extra_routes = Box::new(rule);
        self
    }

    pub fn with_costs(mut self, rule: impl CostRule + 'static) -> Self {
        self.costs = Box::new(rule);
        self
    }
}

impl Default for MapRules {
    fn default() -> Self {
        Self::standard()
    }
}
