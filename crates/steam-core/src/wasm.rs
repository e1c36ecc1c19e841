//! WebAssembly bindings for the map engine.
//!
//! This module exposes the validators and route finder to JavaScript through
//! wasm-bindgen. Everything crosses the boundary as JSON; coordinates are
//! passed in their `"q,r"` form.

#[cfg(feature = "wasm")]
use wasm_bindgen::prelude::*;

#[cfg(feature = "wasm")]
use crate::actions::{apply_action, Action};
#[cfg(feature = "wasm")]
use crate::build::{BuildInfo, BuildValidator};
#[cfg(feature = "wasm")]
use crate::coordinates::Coordinates;
#[cfg(feature = "wasm")]
use crate::grid::{Grid, MapState};
#[cfg(feature = "wasm")]
use crate::moves::MoveValidator;
#[cfg(feature = "wasm")]
use crate::player::{PlayerColor, PlayerData};
#[cfg(feature = "wasm")]
use crate::rules::{MapRules, MapSettings};
#[cfg(feature = "wasm")]
use crate::tile::{calculate_track_info, TileData};

/// Initialize panic hook for better error messages in browser console
#[cfg(feature = "wasm")]
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

#[cfg(feature = "wasm")]
fn parse_coordinates(coordinates: &str) -> Result<Coordinates, JsValue> {
    coordinates
        .parse()
        .map_err(|e| JsValue::from_str(&format!("Invalid coordinates: {}", e)))
}

/// Segments of a tile as JSON
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = calculateTrackInfo)]
pub fn calculate_track_info_json(tile_json: &str) -> Result<String, JsValue> {
    let tile: TileData = serde_json::from_str(tile_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid tile JSON: {}", e)))?;
    Ok(serde_json::to_string(&calculate_track_info(&tile)).unwrap_or_else(|_| "[]".to_string()))
}

/// WASM-exposed map wrapper
#[cfg(feature = "wasm")]
#[wasm_bindgen]
pub struct WasmMap {
    state: MapState,
    rules: MapRules,
}

#[cfg(feature = "wasm")]
#[wasm_bindgen]
impl WasmMap {
    /// Load a map from its state and settings JSON
    #[wasm_bindgen(constructor)]
    pub fn new(state_json: &str, settings_json: &str) -> Result<WasmMap, JsValue> {
        let state: MapState = serde_json::from_str(state_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid map state: {}", e)))?;
        let settings = MapSettings::from_json(settings_json)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        Ok(WasmMap {
            state,
            rules: MapRules::from_settings(settings),
        })
    }

    /// Get the current map state as JSON
    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> String {
        serde_json::to_string(&self.state).unwrap_or_else(|_| "{}".to_string())
    }

    /// Why a build is illegal, or `undefined` if it is allowed
    #[wasm_bindgen(js_name = getInvalidBuildReason)]
    pub fn get_invalid_build_reason(
        &self,
        coordinates: &str,
        build_json: &str,
    ) -> Result<Option<String>, JsValue> {
        let coordinates = parse_coordinates(coordinates)?;
        let build: BuildInfo = serde_json::from_str(build_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid build JSON: {}", e)))?;

        let grid = Grid::from_state(&self.state);
        Ok(BuildValidator::new(&grid, &self.rules)
            .get_invalid_build_reason(coordinates, &build)
            .map(|reason| reason.to_string()))
    }

    /// Dangling track of one player (or unowned track) as JSON array
    #[wasm_bindgen(js_name = getDanglers)]
    pub fn get_danglers(&self, color_json: Option<String>) -> Result<String, JsValue> {
        let color: Option<PlayerColor> = match color_json {
            Some(json) => Some(
                serde_json::from_str(&json)
                    .map_err(|e| JsValue::from_str(&format!("Invalid color: {}", e)))?,
            ),
            None => None,
        };
        let grid = Grid::from_state(&self.state);
        Ok(serde_json::to_string(&grid.get_danglers(color)).unwrap_or_else(|_| "[]".to_string()))
    }

    /// Routes leaving a stop as JSON array
    #[wasm_bindgen(js_name = findRoutes)]
    pub fn find_routes(&self, from: &str) -> Result<String, JsValue> {
        let from = parse_coordinates(from)?;
        let grid = Grid::from_state(&self.state);
        let routes = MoveValidator::new(&grid, &self.rules).find_routes_from_location(from);
        Ok(serde_json::to_string(&routes).unwrap_or_else(|_| "[]".to_string()))
    }

    /// Apply an action from JSON, returns events JSON or error
    #[wasm_bindgen(js_name = applyAction)]
    pub fn apply_action(&mut self, player_json: &str, action_json: &str) -> Result<String, JsValue> {
        let player: PlayerData = serde_json::from_str(player_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid player JSON: {}", e)))?;
        let action: Action = serde_json::from_str(action_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid action JSON: {}", e)))?;

        match apply_action(&mut self.state, &self.rules, &player, action) {
            Ok(events) => {
                Ok(serde_json::to_string(&events).unwrap_or_else(|_| "[]".to_string()))
            }
            Err(e) => Err(JsValue::from_str(&format!("Action failed: {}", e))),
        }
    }
}
