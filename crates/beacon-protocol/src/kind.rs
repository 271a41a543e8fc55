//! Closed enumerations carried on the wire.

use serde::{Deserialize, Serialize};

use crate::bits::bits_for;
use crate::coord::Offset;

/// A closed enumeration whose wire width is derived from its cardinality.
///
/// `VARIANTS` lists every value in ordinal order; `ordinal` must return the
/// index of `self` in that list.
pub trait Enumerated: Copy + Eq + std::fmt::Debug + 'static {
    const VARIANTS: &'static [Self];

    fn ordinal(self) -> u32;

    fn from_ordinal(ordinal: u32) -> Option<Self> {
        Self::VARIANTS.get(ordinal as usize).copied()
    }

    fn bit_width() -> u32 {
        bits_for(Self::VARIANTS.len())
    }
}

/// Kind of a sensed unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Base,
    Tower,
    Soldier,
    Scout,
    Worker,
}

impl Enumerated for UnitKind {
    const VARIANTS: &'static [Self] = &[
        UnitKind::Base,
        UnitKind::Tower,
        UnitKind::Soldier,
        UnitKind::Scout,
        UnitKind::Worker,
    ];

    fn ordinal(self) -> u32 {
        self as u32
    }
}

/// Eight-way compass direction. Angles are counter-clockwise from east.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    East,
    NorthEast,
    North,
    NorthWest,
    West,
    SouthWest,
    South,
    SouthEast,
}

impl Enumerated for Direction {
    const VARIANTS: &'static [Self] = &[
        Direction::East,
        Direction::NorthEast,
        Direction::North,
        Direction::NorthWest,
        Direction::West,
        Direction::SouthWest,
        Direction::South,
        Direction::SouthEast,
    ];

    fn ordinal(self) -> u32 {
        self as u32
    }
}

impl Direction {
    /// Nearest compass direction to a heading in whole degrees.
    pub fn from_degrees(degrees: u32) -> Self {
        let index = ((degrees % 360) * 2 + 45) / 90 % 8;
        Self::VARIANTS[index as usize]
    }

    pub fn degrees(self) -> u16 {
        (self.ordinal() * 45) as u16
    }

    pub fn offset(self) -> Offset {
        match self {
            Direction::East => Offset::new(1, 0),
            Direction::NorthEast => Offset::new(1, 1),
            Direction::North => Offset::new(0, 1),
            Direction::NorthWest => Offset::new(-1, 1),
            Direction::West => Offset::new(-1, 0),
            Direction::SouthWest => Offset::new(-1, -1),
            Direction::South => Offset::new(0, -1),
            Direction::SouthEast => Offset::new(1, -1),
        }
    }

    /// Direction of the king step that best approaches `offset`, if it is non-zero.
    pub fn toward(offset: Offset) -> Option<Self> {
        let step = Offset::new(offset.dx.signum(), offset.dy.signum());
        Self::VARIANTS.iter().copied().find(|d| d.offset() == step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_ordinals<T: Enumerated>() {
        for (index, value) in T::VARIANTS.iter().enumerate() {
            assert_eq!(value.ordinal() as usize, index, "{value:?}");
            assert_eq!(T::from_ordinal(index as u32), Some(*value));
        }
        assert_eq!(T::from_ordinal(T::VARIANTS.len() as u32), None);
    }

    #[test]
    fn ordinals_follow_variant_order() {
        assert_ordinals::<UnitKind>();
        assert_ordinals::<Direction>();
    }

    #[test]
    fn widths_track_cardinality() {
        assert_eq!(UnitKind::bit_width(), 3);
        assert_eq!(Direction::bit_width(), 3);
    }

    #[test]
    fn degrees_round_to_nearest_direction() {
        assert_eq!(Direction::from_degrees(0), Direction::East);
        assert_eq!(Direction::from_degrees(22), Direction::East);
        assert_eq!(Direction::from_degrees(23), Direction::NorthEast);
        assert_eq!(Direction::from_degrees(90), Direction::North);
        assert_eq!(Direction::from_degrees(350), Direction::East);
        assert_eq!(Direction::from_degrees(270), Direction::South);
        for d in Direction::VARIANTS {
            assert_eq!(Direction::from_degrees(u32::from(d.degrees())), *d);
        }
    }

    #[test]
    fn toward_uses_sign_of_offset() {
        assert_eq!(Direction::toward(Offset::new(5, -2)), Some(Direction::SouthEast));
        assert_eq!(Direction::toward(Offset::new(0, 9)), Some(Direction::North));
        assert_eq!(Direction::toward(Offset::new(0, 0)), None);
    }
}
