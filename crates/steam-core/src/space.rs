//! Map spaces: cities and land hexes.
//!
//! `SpaceData` is the serializable descriptor kept in the game state. `City`
//! and `Land` are the read-only views a `Grid` snapshot builds from it.

use crate::coordinates::{Coordinates, Direction, Exit};
use crate::goods::{CityGroup, Good};
use crate::tile::{calculate_track_info, TileData};
use crate::track::Track;
use serde::{Deserialize, Serialize};
use std::cell::OnceCell;

/// Terrain of a land hex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LandType {
    #[default]
    Plain,
    River,
    Mountain,
    Hill,
    Swamp,
    Lake,
    Street,
    Desert,
    /// Off-limits to track
    Unpassable,
}

impl LandType {
    pub fn is_passable(&self) -> bool {
        !matches!(self, LandType::Unpassable)
    }
}

/// A production slot: when its die value comes up, the next pending cube
/// moves into the city
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnRollData {
    pub on_roll: u8,
    pub group: CityGroup,
    #[serde(default)]
    pub goods: Vec<Good>,
}

/// Serializable description of a city
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityData {
    pub name: String,
    /// Goods colors this city accepts for delivery
    pub color: Vec<Good>,
    /// Cubes waiting to be shipped out
    #[serde(default)]
    pub goods: Vec<Good>,
    #[serde(default)]
    pub on_roll: Vec<OnRollData>,
    #[serde(default)]
    pub urbanized: bool,
    /// Cities sharing this id are one logical city spread over several hexes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub same_city: Option<u8>,
}

impl CityData {
    /// A city accepting one goods color
    pub fn new(name: impl Into<String>, color: Good) -> Self {
        Self {
            name: name.into(),
            color: vec![color],
            goods: Vec::new(),
            on_roll: Vec::new(),
            urbanized: false,
            same_city: None,
        }
    }

    pub fn with_goods(mut self, goods: Vec<Good>) -> Self {
        self.goods = goods;
        self
    }

    pub fn with_same_city(mut self, id: u8) -> Self {
        self.same_city = Some(id);
        self
    }

    /// Promote the next pending cube of the slot matching `die`, if any
    pub fn grow(&mut self, group: CityGroup, die: u8) -> Option<Good> {
        let slot = self
            .on_roll
            .iter_mut()
            .find(|slot| slot.group == group && slot.on_roll == die)?;
        if slot.goods.is_empty() {
            return None;
        }
        let good = slot.goods.remove(0);
        self.goods.push(good);
        Some(good)
    }

    /// Remove one cube of the given color, returning whether one was present
    pub fn take_good(&mut self, good: Good) -> bool {
        match self.goods.iter().position(|g| *g == good) {
            Some(index) => {
                self.goods.remove(index);
                true
            }
            None => false,
        }
    }
}

/// Serializable description of a land hex
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LandData {
    #[serde(default)]
    pub land_type: LandType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub town_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tile: Option<TileData>,
    /// Fixed build cost replacing the terrain cost
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terrain_cost: Option<u32>,
    /// Edges track may never cross (rivers without bridges, cliffs)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unpassable_edges: Vec<Direction>,
    /// Extra data only a particular map understands
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_specific: Option<serde_json::Value>,
}

impl LandData {
    pub fn plain() -> Self {
        Self::default()
    }

    pub fn of_type(land_type: LandType) -> Self {
        Self {
            land_type,
            ..Self::default()
        }
    }

    pub fn town(name: impl Into<String>) -> Self {
        Self {
            town_name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_tile(mut self, tile: TileData) -> Self {
        self.tile = Some(tile);
        self
    }
}

/// What occupies one hex in the game state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpaceData {
    City(CityData),
    Land(LandData),
}

/// A city on the map
#[derive(Debug, Clone)]
pub struct City {
    coordinates: Coordinates,
    data: CityData,
}

impl City {
    pub fn new(coordinates: Coordinates, data: CityData) -> Self {
        Self { coordinates, data }
    }

    pub fn coordinates(&self) -> Coordinates {
        self.coordinates
    }

    pub fn name(&self) -> &str {
        &self.data.name
    }

    pub fn data(&self) -> &CityData {
        &self.data
    }

    /// Goods colors accepted for delivery
    pub fn accepted_goods(&self) -> &[Good] {
        &self.data.color
    }

    pub fn accepts(&self, good: Good) -> bool {
        self.data.color.contains(&good)
    }

    /// Cubes currently waiting in this city
    pub fn goods(&self) -> &[Good] {
        &self.data.goods
    }

    pub fn has_good(&self, good: Good) -> bool {
        self.data.goods.contains(&good)
    }

    pub fn on_roll(&self) -> &[OnRollData] {
        &self.data.on_roll
    }

    pub fn is_urbanized(&self) -> bool {
        self.data.urbanized
    }

    pub fn same_city(&self) -> Option<u8> {
        self.data.same_city
    }

    /// Whether both cities are the same logical city
    pub fn is_same_city(&self, other: &City) -> bool {
        self.coordinates == other.coordinates
            || matches!((self.same_city(), other.same_city()), (Some(a), Some(b)) if a == b)
    }
}

/// A land hex, possibly holding a town and placed track
#[derive(Debug, Clone)]
pub struct Land {
    coordinates: Coordinates,
    data: LandData,
    tracks: OnceCell<Vec<Track>>,
}

impl Land {
    pub fn new(coordinates: Coordinates, data: LandData) -> Self {
        Self {
            coordinates,
            data,
            tracks: OnceCell::new(),
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        self.coordinates
    }

    pub fn data(&self) -> &LandData {
        &self.data
    }

    pub fn land_type(&self) -> LandType {
        self.data.land_type
    }

    pub fn is_passable(&self) -> bool {
        self.data.land_type.is_passable()
    }

    pub fn town_name(&self) -> Option<&str> {
        self.data.town_name.as_deref()
    }

    pub fn has_town(&self) -> bool {
        self.data.town_name.is_some()
    }

    pub fn tile(&self) -> Option<&TileData> {
        self.data.tile.as_ref()
    }

    pub fn terrain_cost(&self) -> Option<u32> {
        self.data.terrain_cost
    }

    /// Whether track may not cross the given edge of this hex
    pub fn blocks_edge(&self, direction: Direction) -> bool {
        self.data.unpassable_edges.contains(&direction)
    }

    /// Track segments on this hex, derived once per snapshot
    pub fn tracks(&self) -> &[Track] {
        self.tracks.get_or_init(|| match &self.data.tile {
            Some(tile) => calculate_track_info(tile)
                .into_iter()
                .enumerate()
                .map(|(index, info)| Track::new(self.coordinates, index, info))
                .collect(),
            None => Vec::new(),
        })
    }

    /// The segment using the given exit, if any
    pub fn track_with_exit(&self, exit: Exit) -> Option<&Track> {
        self.tracks().iter().find(|track| track.has_exit(exit))
    }
}

/// A hex of the map as seen through a `Grid`
#[derive(Debug, Clone)]
pub enum Space {
    City(City),
    Land(Land),
}

impl Space {
    pub fn from_data(coordinates: Coordinates, data: &SpaceData) -> Self {
        match data {
            SpaceData::City(city) => Space::City(City::new(coordinates, city.clone())),
            SpaceData::Land(land) => Space::Land(Land::new(coordinates, land.clone())),
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        match self {
            Space::City(city) => city.coordinates(),
            Space::Land(land) => land.coordinates(),
        }
    }

    pub fn as_city(&self) -> Option<&City> {
        match self {
            Space::City(city) => Some(city),
            Space::Land(_) => None,
        }
    }

    pub fn as_land(&self) -> Option<&Land> {
        match self {
            Space::City(_) => None,
            Space::Land(land) => Some(land),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::PlayerColor;
    use crate::tile::{SimpleTileType, TileType};

    #[test]
    fn test_grow_promotes_first_pending_cube() {
        let mut city = CityData::new("Pittsburgh", Good::Yellow);
        city.on_roll.push(OnRollData {
            on_roll: 3,
            group: CityGroup::White,
            goods: vec![Good::Red, Good::Blue],
        });

        assert_eq!(city.grow(CityGroup::Black, 3), None);
        assert_eq!(city.grow(CityGroup::White, 4), None);
        assert_eq!(city.grow(CityGroup::White, 3), Some(Good::Red));
        assert_eq!(city.goods, vec![Good::Red]);
        assert_eq!(city.grow(CityGroup::White, 3), Some(Good::Blue));
        assert_eq!(city.grow(CityGroup::White, 3), None);
    }

    #[test]
    fn test_take_good() {
        let mut city = CityData::new("Chicago", Good::Red).with_goods(vec![Good::Blue, Good::Blue]);
        assert!(city.take_good(Good::Blue));
        assert!(!city.take_good(Good::Purple));
        assert_eq!(city.goods, vec![Good::Blue]);
    }

    #[test]
    fn test_same_city_alias() {
        let a = City::new(Coordinates::from_qr(0, 0), CityData::new("A", Good::Red).with_same_city(1));
        let b = City::new(Coordinates::from_qr(5, 0), CityData::new("B", Good::Red).with_same_city(1));
        let c = City::new(Coordinates::from_qr(2, 0), CityData::new("C", Good::Red));
        assert!(a.is_same_city(&b));
        assert!(!a.is_same_city(&c));
        assert!(c.is_same_city(&c.clone()));
    }

    #[test]
    fn test_land_tracks_are_derived_from_tile() {
        let coordinates = Coordinates::from_qr(1, 1);
        let land = Land::new(
            coordinates,
            LandData::plain().with_tile(TileData::owned_by(
                TileType::Simple(SimpleTileType::Straight),
                Direction::Top,
                PlayerColor::Green,
            )),
        );
        let tracks = land.tracks();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].coordinates(), coordinates);
        assert_eq!(tracks[0].owner(), Some(PlayerColor::Green));
        assert!(land.track_with_exit(Exit::Edge(Direction::Bottom)).is_some());
        assert!(land.track_with_exit(Exit::Edge(Direction::TopRight)).is_none());
    }

    #[test]
    fn test_space_data_json_is_tagged() {
        let data = SpaceData::Land(LandData::town("Dayton"));
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["type"], "LAND");
        assert_eq!(json["town_name"], "Dayton");
        let back: SpaceData = serde_json::from_value(json).unwrap();
        assert_eq!(back, data);
    }
}
