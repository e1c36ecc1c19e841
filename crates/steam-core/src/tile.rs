//! Track tile catalog and tile geometry.
//!
//! Every tile shape is defined once at orientation `Top`. Placing a tile at
//! another orientation rotates every exit of every segment clockwise by the
//! same number of steps, so the whole catalog is just the base table below
//! plus `calculate_track_info`.

use crate::coordinates::{Direction, Exit};
use crate::player::PlayerColor;
use serde::{Deserialize, Serialize};

/// Tiles carrying a single segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SimpleTileType {
    /// Opposite edges
    Straight,
    /// Edges two apart
    Curve,
    /// Adjacent edges
    Tight,
}

/// Tiles carrying two segments that either cross or coexist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplexTileType {
    X,
    BowAndArrow,
    CrossingCurves,
    StraightTight,
    CoexistingCurves,
    CurveTight1,
    CurveTight2,
}

impl ComplexTileType {
    /// Whether the two segments cross each other (an overpass)
    pub fn crosses(&self) -> bool {
        match self {
            ComplexTileType::X | ComplexTileType::BowAndArrow | ComplexTileType::CrossingCurves => {
                true
            }
            ComplexTileType::StraightTight
            | ComplexTileType::CoexistingCurves
            | ComplexTileType::CurveTight1
            | ComplexTileType::CurveTight2 => false,
        }
    }
}

/// Tiles for town hexes; every segment ends at the town center
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TownTileType {
    Lollypop,
    Straight,
    Curve,
    Tight,
    TightThree,
    K,
    ThumbsUp,
    ChickenFoot,
    X,
    Fan,
    Broom,
}

/// Any placeable tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TileType {
    Simple(SimpleTileType),
    Complex(ComplexTileType),
    Town(TownTileType),
}

impl TileType {
    /// Every tile in the catalog
    pub const ALL: [TileType; 21] = [
        TileType::Simple(SimpleTileType::Straight),
        TileType::Simple(SimpleTileType::Curve),
        TileType::Simple(SimpleTileType::Tight),
        TileType::Complex(ComplexTileType::X),
        TileType::Complex(ComplexTileType::BowAndArrow),
        TileType::Complex(ComplexTileType::CrossingCurves),
        TileType::Complex(ComplexTileType::StraightTight),
        TileType::Complex(ComplexTileType::CoexistingCurves),
        TileType::Complex(ComplexTileType::CurveTight1),
        TileType::Complex(ComplexTileType::CurveTight2),
        TileType::Town(TownTileType::Lollypop),
        TileType::Town(TownTileType::Straight),
        TileType::Town(TownTileType::Curve),
        TileType::Town(TownTileType::Tight),
        TileType::Town(TownTileType::TightThree),
        TileType::Town(TownTileType::K),
        TileType::Town(TownTileType::ThumbsUp),
        TileType::Town(TownTileType::ChickenFoot),
        TileType::Town(TownTileType::X),
        TileType::Town(TownTileType::Fan),
        TileType::Town(TownTileType::Broom),
    ];

    pub fn is_town(&self) -> bool {
        matches!(self, TileType::Town(_))
    }

    pub fn is_complex(&self) -> bool {
        matches!(self, TileType::Complex(_))
    }

    /// Segments of this tile at orientation `Top`
    pub fn base_shape(&self) -> &'static [[Exit; 2]] {
        use shapes::*;
        match self {
            TileType::Simple(simple) => match simple {
                SimpleTileType::Straight => STRAIGHT,
                SimpleTileType::Curve => CURVE,
                SimpleTileType::Tight => TIGHT,
            },
            TileType::Complex(complex) => match complex {
                ComplexTileType::X => X,
                ComplexTileType::BowAndArrow => BOW_AND_ARROW,
                ComplexTileType::CrossingCurves => CROSSING_CURVES,
                ComplexTileType::StraightTight => STRAIGHT_TIGHT,
                ComplexTileType::CoexistingCurves => COEXISTING_CURVES,
                ComplexTileType::CurveTight1 => CURVE_TIGHT_1,
                ComplexTileType::CurveTight2 => CURVE_TIGHT_2,
            },
            TileType::Town(town) => match town {
                TownTileType::Lollypop => TOWN_LOLLYPOP,
                TownTileType::Straight => TOWN_STRAIGHT,
                TownTileType::Curve => TOWN_CURVE,
                TownTileType::Tight => TOWN_TIGHT,
                TownTileType::TightThree => TOWN_TIGHT_THREE,
                TownTileType::K => TOWN_K,
                TownTileType::ThumbsUp => TOWN_THUMBS_UP,
                TownTileType::ChickenFoot => TOWN_CHICKEN_FOOT,
                TownTileType::X => TOWN_X,
                TownTileType::Fan => TOWN_FAN,
                TownTileType::Broom => TOWN_BROOM,
            },
        }
    }
}

mod shapes {
    use crate::coordinates::Direction::*;
    use crate::coordinates::{Direction, Exit};

    const fn edge(direction: Direction) -> Exit {
        Exit::Edge(direction)
    }

    const fn town(direction: Direction) -> [Exit; 2] {
        [Exit::Edge(direction), Exit::Town]
    }

    pub const STRAIGHT: &[[Exit; 2]] = &[[edge(Top), edge(Bottom)]];
    pub const CURVE: &[[Exit; 2]] = &[[edge(Top), edge(BottomRight)]];
    pub const TIGHT: &[[Exit; 2]] = &[[edge(Top), edge(TopRight)]];

    pub const X: &[[Exit; 2]] = &[[edge(Top), edge(Bottom)], [edge(TopRight), edge(BottomLeft)]];
    pub const BOW_AND_ARROW: &[[Exit; 2]] =
        &[[edge(Top), edge(Bottom)], [edge(TopLeft), edge(TopRight)]];
    pub const CROSSING_CURVES: &[[Exit; 2]] =
        &[[edge(TopLeft), edge(TopRight)], [edge(Top), edge(BottomRight)]];
    pub const STRAIGHT_TIGHT: &[[Exit; 2]] =
        &[[edge(Top), edge(Bottom)], [edge(TopRight), edge(BottomRight)]];
    pub const COEXISTING_CURVES: &[[Exit; 2]] =
        &[[edge(TopLeft), edge(TopRight)], [edge(BottomRight), edge(BottomLeft)]];
    pub const CURVE_TIGHT_1: &[[Exit; 2]] =
        &[[edge(Top), edge(BottomRight)], [edge(Bottom), edge(BottomLeft)]];
    pub const CURVE_TIGHT_2: &[[Exit; 2]] =
        &[[edge(Top), edge(BottomLeft)], [edge(TopRight), edge(BottomRight)]];

    pub const TOWN_LOLLYPOP: &[[Exit; 2]] = &[town(Top)];
    pub const TOWN_STRAIGHT: &[[Exit; 2]] = &[town(Top), town(Bottom)];
    pub const TOWN_CURVE: &[[Exit; 2]] = &[town(Top), town(BottomRight)];
    pub const TOWN_TIGHT: &[[Exit; 2]] = &[town(Top), town(TopRight)];
    pub const TOWN_TIGHT_THREE: &[[Exit; 2]] = &[town(TopLeft), town(Top), town(TopRight)];
    pub const TOWN_K: &[[Exit; 2]] = &[town(Top), town(TopRight), town(Bottom)];
    pub const TOWN_THUMBS_UP: &[[Exit; 2]] = &[town(Top), town(TopRight), town(BottomLeft)];
    pub const TOWN_CHICKEN_FOOT: &[[Exit; 2]] = &[town(Top), town(BottomRight), town(BottomLeft)];
    pub const TOWN_X: &[[Exit; 2]] =
        &[town(Top), town(TopRight), town(Bottom), town(BottomLeft)];
    pub const TOWN_FAN: &[[Exit; 2]] =
        &[town(Top), town(TopRight), town(BottomRight), town(Bottom)];
    pub const TOWN_BROOM: &[[Exit; 2]] =
        &[town(Top), town(TopRight), town(BottomRight), town(BottomLeft)];
}

/// A tile as placed on the map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileData {
    pub tile_type: TileType,
    pub orientation: Direction,
    /// Owner of each segment, positionally matching the tile's segments
    #[serde(default)]
    pub owners: Vec<Option<PlayerColor>>,
    /// Cost to claim each pre-printed segment; `None` for ordinary track
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub claimable_cost: Vec<Option<u32>>,
}

impl TileData {
    /// An unowned tile
    pub fn new(tile_type: TileType, orientation: Direction) -> Self {
        Self {
            tile_type,
            orientation,
            owners: Vec::new(),
            claimable_cost: Vec::new(),
        }
    }

    /// A tile whose every segment belongs to one player
    pub fn owned_by(tile_type: TileType, orientation: Direction, owner: PlayerColor) -> Self {
        let segments = tile_type.base_shape().len();
        Self {
            tile_type,
            orientation,
            owners: vec![Some(owner); segments],
            claimable_cost: Vec::new(),
        }
    }
}

/// One buildable track segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackInfo {
    pub exits: [Exit; 2],
    pub owner: Option<PlayerColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claimable_cost: Option<u32>,
}

/// Segment exits of a tile type at an orientation, without ownership
pub fn track_shape(tile_type: TileType, orientation: Direction) -> Vec<[Exit; 2]> {
    let steps = orientation.steps_from(Direction::Top);
    tile_type
        .base_shape()
        .iter()
        .map(|exits| exits.map(|exit| exit.rotate_clockwise(steps)))
        .collect()
}

/// Turn a placed tile into its concrete track segments.
///
/// Owners and claim costs are attached by segment index; missing entries
/// leave the segment unowned.
pub fn calculate_track_info(tile: &TileData) -> Vec<TrackInfo> {
    track_shape(tile.tile_type, tile.orientation)
        .into_iter()
        .enumerate()
        .map(|(index, exits)| TrackInfo {
            exits,
            owner: tile.owners.get(index).copied().flatten(),
            claimable_cost: tile.claimable_cost.get(index).copied().flatten(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn exit_set(exits: &[Exit; 2]) -> HashSet<Exit> {
        exits.iter().copied().collect()
    }

    #[test]
    fn test_top_orientation_reproduces_base_shape() {
        for tile_type in TileType::ALL {
            let shape = track_shape(tile_type, Direction::Top);
            assert_eq!(shape.as_slice(), tile_type.base_shape(), "{tile_type:?}");
        }
    }

    #[test]
    fn test_rotation_equivariance() {
        for tile_type in TileType::ALL {
            for orientation in Direction::ALL {
                let here = track_shape(tile_type, orientation);
                let next = track_shape(tile_type, orientation.rotate_clockwise(1));
                let rotated: Vec<[Exit; 2]> = here
                    .iter()
                    .map(|exits| exits.map(|exit| exit.rotate_clockwise(1)))
                    .collect();
                assert_eq!(rotated, next, "{tile_type:?} at {orientation:?}");
            }
        }
    }

    #[test]
    fn test_segment_counts_per_family() {
        for tile_type in TileType::ALL {
            let segments = tile_type.base_shape().len();
            match tile_type {
                TileType::Simple(_) => assert_eq!(segments, 1),
                TileType::Complex(_) => assert_eq!(segments, 2),
                TileType::Town(_) => assert!((1..=4).contains(&segments)),
            }
        }
    }

    #[test]
    fn test_segments_never_share_an_edge() {
        for tile_type in TileType::ALL {
            let mut seen = HashSet::new();
            for exits in tile_type.base_shape() {
                assert_ne!(exits[0], exits[1]);
                let towns = exits.iter().filter(|e| e.is_town()).count();
                assert_eq!(towns, usize::from(tile_type.is_town()), "{tile_type:?}");
                for exit in exits.iter().filter(|e| !e.is_town()) {
                    assert!(seen.insert(*exit), "{tile_type:?} reuses {exit:?}");
                }
            }
        }
    }

    #[test]
    fn test_town_shapes_are_distinct_under_rotation() {
        let mut canonical = HashSet::new();
        for tile_type in TileType::ALL.iter().filter(|t| t.is_town()) {
            let rotations: Vec<Vec<Direction>> = Direction::ALL
                .iter()
                .map(|o| {
                    let mut dirs: Vec<Direction> = track_shape(*tile_type, *o)
                        .iter()
                        .filter_map(|exits| exits[0].direction())
                        .collect();
                    dirs.sort();
                    dirs
                })
                .collect();
            let smallest = rotations.into_iter().min().unwrap_or_default();
            assert!(canonical.insert(smallest), "{tile_type:?} duplicates another shape");
        }
        assert_eq!(canonical.len(), 11);
    }

    #[test]
    fn test_complex_crossing() {
        // Two segments cross when exactly one exit of the second lies strictly
        // between the exits of the first, going clockwise
        for tile_type in TileType::ALL {
            if let TileType::Complex(complex) = tile_type {
                let shape = tile_type.base_shape();
                let a = shape[0].map(|e| e.direction().map(Direction::index).unwrap_or_default());
                let b = shape[1].map(|e| e.direction().map(Direction::index).unwrap_or_default());
                let (lo, hi) = (a[0].min(a[1]), a[0].max(a[1]));
                let inside = b.iter().filter(|i| **i > lo && **i < hi).count();
                assert_eq!(complex.crosses(), inside == 1, "{complex:?}");
            }
        }
    }

    #[test]
    fn test_owners_zip_by_index() {
        let tile = TileData {
            tile_type: TileType::Complex(ComplexTileType::X),
            orientation: Direction::TopRight,
            owners: vec![None, Some(PlayerColor::Blue)],
            claimable_cost: Vec::new(),
        };
        let info = calculate_track_info(&tile);
        assert_eq!(info.len(), 2);
        assert_eq!(info[0].owner, None);
        assert_eq!(info[1].owner, Some(PlayerColor::Blue));
        assert_eq!(
            exit_set(&info[0].exits),
            exit_set(&[Exit::Edge(Direction::TopRight), Exit::Edge(Direction::BottomLeft)])
        );
    }

    #[test]
    fn test_calculate_is_pure() {
        let tile = TileData::owned_by(
            TileType::Town(TownTileType::ChickenFoot),
            Direction::BottomRight,
            PlayerColor::Red,
        );
        assert_eq!(calculate_track_info(&tile), calculate_track_info(&tile));
        assert!(calculate_track_info(&tile)
            .iter()
            .all(|t| t.owner == Some(PlayerColor::Red)));
    }
}
