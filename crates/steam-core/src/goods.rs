//! Goods cubes, the bag they are drawn from, and production dice.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of cubes of each color in a fresh bag
const GOODS_PER_COLOR: usize = 20;

/// Color of a goods cube. Cities accept the cubes matching their own color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Good {
    Red,
    Blue,
    Yellow,
    Purple,
    Black,
}

impl Good {
    /// All goods colors
    pub const ALL: [Good; 5] = [Good::Red, Good::Blue, Good::Yellow, Good::Purple, Good::Black];
}

impl fmt::Display for Good {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Good::Red => "red",
            Good::Blue => "blue",
            Good::Yellow => "yellow",
            Good::Purple => "purple",
            Good::Black => "black",
        };
        f.write_str(name)
    }
}

/// Production group of an on-roll slot (the white or black dice)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CityGroup {
    White,
    Black,
}

/// The bag cubes are drawn from when cities are seeded or refilled
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoodsBag {
    goods: Vec<Good>,
}

impl GoodsBag {
    /// A bag holding the given cubes
    pub fn new(goods: Vec<Good>) -> Self {
        Self { goods }
    }

    /// A full bag with the standard number of cubes per color
    pub fn standard() -> Self {
        let goods = Good::ALL
            .iter()
            .flat_map(|good| std::iter::repeat(*good).take(GOODS_PER_COLOR))
            .collect();
        Self { goods }
    }

    pub fn len(&self) -> usize {
        self.goods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.goods.is_empty()
    }

    /// How many cubes of one color remain
    pub fn count(&self, good: Good) -> usize {
        self.goods.iter().filter(|g| **g == good).count()
    }

    /// Draw one cube at random; `None` once the bag is empty
    pub fn draw<R: Rng>(&mut self, rng: &mut R) -> Option<Good> {
        if self.goods.is_empty() {
            return None;
        }
        let index = rng.gen_range(0..self.goods.len());
        Some(self.goods.swap_remove(index))
    }

    /// Draw up to `count` cubes
    pub fn draw_many<R: Rng>(&mut self, rng: &mut R, count: usize) -> Vec<Good> {
        (0..count).map_while(|_| self.draw(rng)).collect()
    }

    /// Return cubes to the bag
    pub fn put_back(&mut self, goods: impl IntoIterator<Item = Good>) {
        self.goods.extend(goods);
    }
}

/// Roll `count` six-sided dice
pub fn roll_dice<R: Rng>(rng: &mut R, count: usize) -> Vec<u8> {
    (0..count).map(|_| rng.gen_range(1..=6)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_standard_bag_contents() {
        let bag = GoodsBag::standard();
        assert_eq!(bag.len(), GOODS_PER_COLOR * Good::ALL.len());
        for good in Good::ALL {
            assert_eq!(bag.count(good), GOODS_PER_COLOR);
        }
    }

    #[test]
    fn test_draw_until_empty() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut bag = GoodsBag::new(vec![Good::Red, Good::Blue, Good::Blue]);

        let drawn = bag.draw_many(&mut rng, 5);
        assert_eq!(drawn.len(), 3);
        assert!(bag.is_empty());
        assert_eq!(bag.draw(&mut rng), None);

        bag.put_back(drawn);
        assert_eq!(bag.count(Good::Blue), 2);
    }

    #[test]
    fn test_dice_are_six_sided() {
        let mut rng = StdRng::seed_from_u64(42);
        let rolls = roll_dice(&mut rng, 200);
        assert_eq!(rolls.len(), 200);
        assert!(rolls.iter().all(|r| (1..=6).contains(r)));
    }
}
