//! Compass sides of a component.
//!
//! A [`Side`] names the boundary of a component through which external
//! edges leave it. [`SideSet`] is a compact set of sides, used both for a
//! component's external connections and for the shape analysis done by the
//! successor strategies.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the four compass sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Side {
    North,
    East,
    South,
    West,
}

impl Side {
    /// All sides in clockwise order, starting with north.
    pub const ALL: [Side; 4] = [Side::North, Side::East, Side::South, Side::West];

    /// Returns the side facing away from this one
    pub fn opposite(self) -> Self {
        match self {
            Side::North => Side::South,
            Side::East => Side::West,
            Side::South => Side::North,
            Side::West => Side::East,
        }
    }

    /// Returns true for east and west, whose extensions run horizontally
    pub fn is_horizontal(self) -> bool {
        matches!(self, Side::East | Side::West)
    }

    fn bit(self) -> u8 {
        match self {
            Side::North => 0b0001,
            Side::East => 0b0010,
            Side::South => 0b0100,
            Side::West => 0b1000,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Side::North => "north",
            Side::East => "east",
            Side::South => "south",
            Side::West => "west",
        };
        f.write_str(name)
    }
}

/// A set of [`Side`]s stored as a four-bit mask.
///
/// # Examples
///
/// ```
/// # use polypack_core::side::{Side, SideSet};
/// let sides: SideSet = [Side::North, Side::East].into_iter().collect();
/// assert!(sides.contains(Side::North));
/// assert!(!sides.contains(Side::South));
/// assert_eq!(sides.len(), 2);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<Side>", into = "Vec<Side>")]
pub struct SideSet(u8);

impl SideSet {
    /// The empty set
    pub const EMPTY: SideSet = SideSet(0);

    /// The set containing all four sides
    pub const ALL: SideSet = SideSet(0b1111);

    /// Returns true if the side is part of the set
    pub fn contains(self, side: Side) -> bool {
        self.0 & side.bit() != 0
    }

    /// Adds a side to the set
    pub fn insert(&mut self, side: Side) {
        self.0 |= side.bit();
    }

    /// Returns a copy of the set with the side added
    pub fn with(mut self, side: Side) -> Self {
        self.insert(side);
        self
    }

    /// Returns the number of sides in the set
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns the number of horizontal sides (east, west) in the set
    pub fn horizontal_count(self) -> usize {
        self.iter().filter(|side| side.is_horizontal()).count()
    }

    /// Iterates the contained sides in clockwise order, starting with north
    pub fn iter(self) -> impl Iterator<Item = Side> {
        Side::ALL.into_iter().filter(move |side| self.contains(*side))
    }
}

impl FromIterator<Side> for SideSet {
    fn from_iter<T: IntoIterator<Item = Side>>(iter: T) -> Self {
        let mut set = SideSet::EMPTY;
        for side in iter {
            set.insert(side);
        }
        set
    }
}

impl From<Vec<Side>> for SideSet {
    fn from(sides: Vec<Side>) -> Self {
        sides.into_iter().collect()
    }
}

impl From<SideSet> for Vec<Side> {
    fn from(set: SideSet) -> Self {
        set.iter().collect()
    }
}
