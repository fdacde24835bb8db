//! Traversal strategies for candidate placements.
//!
//! A [`Successor`] maps the last tried grid offset (and the shape being
//! placed) to the next offset to try. Started at `(0, 0)`, the plain
//! strategies enumerate every integer offset exactly once, so the packer is
//! guaranteed to find a free spot eventually. The quadrant wrapper skips the
//! offsets of its inner strategy that point away from a shape's extensions.

use std::collections::HashMap;

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use polypack_core::{
    shape::{Shape, ShapeId},
    side::Side,
};

/// The configurable traversal orders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TraversalStrategy {
    /// Max-norm squares, spiraling in the positive sense
    Spiral,
    LineByLine,
    Manhattan,
    /// Max-norm squares with a pseudo-random start on every ring
    Jitter,
    QuadrantsManhattan,
    #[default]
    QuadrantsLineByLine,
    QuadrantsJitter,
    /// Quadrant-restricted line-by-line for shapes without extensions,
    /// quadrant-restricted Manhattan otherwise
    CombineLineByLineManhattan,
    /// Quadrant-restricted jitter for shapes without extensions,
    /// quadrant-restricted Manhattan otherwise
    CombineJitterManhattan,
}

/// A grid offset.
pub type Offset = (i32, i32);

/// Half-planes a shape may be placed in, derived from its extensions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuadrantFilter {
    non_negative_x: bool,
    non_positive_x: bool,
    non_positive_y: bool,
    non_negative_y: bool,
}

impl QuadrantFilter {
    fn of(shape: &Shape) -> Self {
        let sides = shape.extension_sides();
        let only = |side: Side| sides.contains(side) && !sides.contains(side.opposite());
        Self {
            non_negative_x: only(Side::East),
            non_positive_x: only(Side::West),
            non_positive_y: only(Side::North),
            non_negative_y: only(Side::South),
        }
    }

    fn allows(&self, (x, y): Offset) -> bool {
        (!self.non_negative_x || x >= 0)
            && (!self.non_positive_x || x <= 0)
            && (!self.non_positive_y || y <= 0)
            && (!self.non_negative_y || y >= 0)
    }
}

/// Pseudo-random ring start positions for the jitter traversal.
#[derive(Debug, Clone)]
pub struct JitterRings {
    seed: u64,
    rotations: Vec<i32>,
}

impl JitterRings {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rotations: Vec::new(),
        }
    }

    /// Index (in max-norm ring order) of the first visited point of ring `d`
    fn rotation(&mut self, d: i32) -> i32 {
        let ring = d as usize;
        while self.rotations.len() < ring {
            let next = self.rotations.len() as u64 + 1;
            let mut rng = StdRng::seed_from_u64(self.seed ^ next.wrapping_mul(0x9E37_79B9_7F4A_7C15));
            let len = 8 * next as i32;
            self.rotations.push(rng.random_range(0..len));
        }
        self.rotations[ring - 1]
    }

    fn next(&mut self, (x, y): Offset) -> Offset {
        let d = max_norm(x, y);
        if d == 0 {
            return ring_point(1, self.rotation(1));
        }
        let len = 8 * d;
        let index = ring_index(x, y, d);
        let rotation = self.rotation(d);
        if (index - rotation).rem_euclid(len) == len - 1 {
            ring_point(d + 1, self.rotation(d + 1))
        } else {
            ring_point(d, (index + 1) % len)
        }
    }
}

/// A traversal strategy together with its per-run state.
#[derive(Debug, Clone)]
pub enum Successor {
    LineByLine,
    Manhattan,
    MaxNormSpiral,
    Jitter(JitterRings),
    Quadrants {
        inner: Box<Successor>,
        filters: HashMap<ShapeId, QuadrantFilter>,
    },
    Combination {
        plain: Box<Successor>,
        extended: Box<Successor>,
    },
}

impl Successor {
    /// Builds the successor for a configured strategy
    pub fn from_strategy(strategy: TraversalStrategy, jitter_seed: u64) -> Self {
        let jitter = || Successor::Jitter(JitterRings::new(jitter_seed));
        match strategy {
            TraversalStrategy::Spiral => Successor::MaxNormSpiral,
            TraversalStrategy::LineByLine => Successor::LineByLine,
            TraversalStrategy::Manhattan => Successor::Manhattan,
            TraversalStrategy::Jitter => jitter(),
            TraversalStrategy::QuadrantsManhattan => Successor::quadrants(Successor::Manhattan),
            TraversalStrategy::QuadrantsLineByLine => Successor::quadrants(Successor::LineByLine),
            TraversalStrategy::QuadrantsJitter => Successor::quadrants(jitter()),
            TraversalStrategy::CombineLineByLineManhattan => Successor::combination(
                Successor::quadrants(Successor::LineByLine),
                Successor::quadrants(Successor::Manhattan),
            ),
            TraversalStrategy::CombineJitterManhattan => Successor::combination(
                Successor::quadrants(jitter()),
                Successor::quadrants(Successor::Manhattan),
            ),
        }
    }

    /// Restricts `inner` to the quadrants matching a shape's extensions
    pub fn quadrants(inner: Successor) -> Self {
        Successor::Quadrants {
            inner: Box::new(inner),
            filters: HashMap::new(),
        }
    }

    /// Uses `plain` for shapes without extensions and `extended` otherwise
    pub fn combination(plain: Successor, extended: Successor) -> Self {
        Successor::Combination {
            plain: Box::new(plain),
            extended: Box::new(extended),
        }
    }

    /// Returns the offset to try after `last` for `shape`
    pub fn next(&mut self, last: Offset, shape: &Shape) -> Offset {
        match self {
            Successor::LineByLine => line_by_line(last),
            Successor::Manhattan => manhattan(last),
            Successor::MaxNormSpiral => max_norm_spiral(last),
            Successor::Jitter(rings) => rings.next(last),
            Successor::Quadrants { inner, filters } => {
                let filter = *filters
                    .entry(shape.id())
                    .or_insert_with(|| QuadrantFilter::of(shape));
                let mut next = inner.next(last, shape);
                while !filter.allows(next) {
                    next = inner.next(next, shape);
                }
                next
            }
            Successor::Combination { plain, extended } => {
                if shape.extensions().is_empty() {
                    plain.next(last, shape)
                } else {
                    extended.next(last, shape)
                }
            }
        }
    }
}

fn max_norm(x: i32, y: i32) -> i32 {
    x.abs().max(y.abs())
}

/// Square rings, each enumerated row by row from the top-left corner.
fn line_by_line((x, y): Offset) -> Offset {
    let d = max_norm(x, y);
    if d == 0 {
        return (-1, -1);
    }
    if y == -d || y == d {
        if x < d {
            (x + 1, y)
        } else if y == -d {
            (-d, y + 1)
        } else {
            (-(d + 1), -(d + 1))
        }
    } else if x == -d {
        (d, y)
    } else {
        (-d, y + 1)
    }
}

/// Taxicab diamonds, each starting on the positive x-axis.
fn manhattan((x, y): Offset) -> Offset {
    if x == 0 && y == 0 {
        (1, 0)
    } else if x > 0 && y >= 0 {
        (x - 1, y + 1)
    } else if x <= 0 && y > 0 {
        (x - 1, y - 1)
    } else if x < 0 && y <= 0 {
        (x + 1, y - 1)
    } else if y == -1 {
        (x + 2, 0)
    } else {
        (x + 1, y + 1)
    }
}

/// Max-norm squares, each starting just below the top-right corner.
fn max_norm_spiral((x, y): Offset) -> Offset {
    let d = max_norm(x, y);
    if d == 0 {
        (1, 0)
    } else if x == d && y == -d {
        (d + 1, -d)
    } else if x == d && y < d {
        (x, y + 1)
    } else if y == d && x > -d {
        (x - 1, y)
    } else if x == -d && y > -d {
        (x, y - 1)
    } else {
        (x + 1, y)
    }
}

/// Position of `(x, y)` within ring `d` in [`max_norm_spiral`] order.
fn ring_index(x: i32, y: i32, d: i32) -> i32 {
    if x == d && y > -d {
        y + d - 1
    } else if y == d && x < d {
        2 * d + (d - 1 - x)
    } else if x == -d && y < d {
        4 * d + (d - 1 - y)
    } else {
        6 * d + (x + d - 1)
    }
}

/// Inverse of [`ring_index`].
fn ring_point(d: i32, index: i32) -> Offset {
    let side = index / (2 * d);
    let j = index % (2 * d);
    match side {
        0 => (d, -d + 1 + j),
        1 => (d - 1 - j, d),
        2 => (-d, d - 1 - j),
        _ => (-d + 1 + j, -d),
    }
}
