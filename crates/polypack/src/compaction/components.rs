//! Alternating horizontal and vertical compaction of packed components.

use log::{debug, info, warn};

use polypack_core::{
    geometry::{Point, Rect},
    side::Side,
};

use super::{
    compactor::{LockingStrategy, OneDimensionalCompactor},
    graph::{Direction, NodeKind},
    transformer::{ComponentsToCGraphTransformer, ExtensionNodes, LayoutBounds},
};
use crate::component::Component;

/// Upper bound on compaction rounds before the final alignment.
const MAX_ITERATIONS: usize = 10;

/// Movement below which the layout counts as converged.
const EPSILON: f64 = 1e-4;

/// Outcome of a compaction run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompactionReport {
    movements: Vec<f64>,
    bounds: LayoutBounds,
}

impl CompactionReport {
    /// Number of rounds run before the final alignment
    pub fn iterations(&self) -> usize {
        self.movements.len()
    }

    /// Summed absolute group movement of every round
    pub fn movements(&self) -> &[f64] {
        &self.movements
    }

    /// Bounds of the compacted hulls and placeholders
    pub fn bounds(&self) -> LayoutBounds {
        self.bounds
    }
}

/// Shrinks the gaps between components while keeping `spacing` between
/// them.
///
/// Each round compacts horizontally (left, right, left) and then vertically
/// (up, down, up). The first pass of each triple moves every group freely;
/// the other two keep the groups that nothing constrains in place.
/// Representors of the extensions crossing the current axis are part of the
/// pass, so components do not slide over the edges of their neighbors.
///
/// # Examples
///
/// ```
/// # use polypack::compaction::ComponentsCompactor;
/// # use polypack::component::Component;
/// # use polypack::geometry::Rect;
/// let mut components = vec![
///     Component::new(vec![Rect::new(0.0, 0.0, 10.0, 10.0)]),
///     Component::new(vec![Rect::new(60.0, 0.0, 10.0, 10.0)]),
/// ];
/// let report = ComponentsCompactor::new(5.0).compact(&mut components);
///
/// assert_eq!(components[1].hull()[0].x(), 15.0);
/// assert!(report.iterations() <= 10);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ComponentsCompactor {
    spacing: f64,
}

impl ComponentsCompactor {
    pub fn new(spacing: f64) -> Self {
        Self { spacing }
    }

    /// Compacts the components in place.
    pub fn compact(&self, components: &mut [Component]) -> CompactionReport {
        info!(components = components.len(), spacing = self.spacing; "Compacting components");

        let mut transformer = ComponentsToCGraphTransformer::new(self.spacing);
        let graph = transformer.transform(components);

        let top_left = graph
            .nodes()
            .filter(|(_, node)| !matches!(node.kind(), NodeKind::Placeholder { .. }))
            .map(|(_, node)| node.hitbox())
            .reduce(Rect::union)
            .map_or(Point::default(), Rect::position);

        let mut run = Run {
            transformer: &transformer,
            compactor: OneDimensionalCompactor::new(graph),
            top_left,
        };
        run.compactor.set_locking_strategy(LockingStrategy::Dependencies);

        let mut movements = Vec::new();
        loop {
            let movement = run.round();
            debug!(iteration = movements.len(), movement; "Compaction round finished");
            movements.push(movement);

            let iterations = movements.len();
            if iterations >= 2 && movement <= EPSILON {
                break;
            }
            if iterations >= MAX_ITERATIONS {
                warn!(
                    iterations, movement;
                    "Compaction stopped at the iteration cap before converging"
                );
                break;
            }
        }

        run.compactor.set_locking_strategy(LockingStrategy::OwnLocks);
        run.round();
        run.compactor.finish();

        let bounds = transformer.apply_layout(run.compactor.graph(), components);
        info!(
            iterations = movements.len(),
            width = bounds.size.width(),
            height = bounds.size.height();
            "Compaction finished"
        );
        CompactionReport { movements, bounds }
    }
}

/// State of one compaction run.
struct Run<'a> {
    transformer: &'a ComponentsToCGraphTransformer,
    compactor: OneDimensionalCompactor,
    top_left: Point,
}

impl Run<'_> {
    /// Runs one horizontal and one vertical triple and returns the summed
    /// movement of both.
    fn round(&mut self) -> f64 {
        self.compactor.graph_mut().reset_deltas();

        self.set_placeholders_active(true, true);
        self.set_representors_active(false, true);
        self.compactor.force_constraints_recalculation();
        self.compact_triple(Direction::Left);
        self.set_representors_active(false, false);
        self.set_placeholders_active(true, false);

        self.update_representors(true);
        self.follow_parents(false);

        self.set_placeholders_active(false, true);
        self.set_representors_active(true, true);
        let mut movement = self.compactor.graph().total_movement();
        self.compactor.graph_mut().reset_deltas();

        self.compactor.force_constraints_recalculation();
        self.compact_triple(Direction::Up);
        self.set_representors_active(true, false);
        self.set_placeholders_active(false, false);

        self.update_representors(false);
        self.follow_parents(true);

        movement += self.compactor.graph().total_movement();
        movement
    }

    /// Compacts toward `direction`, back, and toward it again, then returns
    /// to the natural orientation.
    fn compact_triple(&mut self, direction: Direction) {
        self.compactor
            .change_direction(direction)
            .compact()
            .change_direction(direction.opposite())
            .apply_locking_strategy()
            .compact()
            .change_direction(direction)
            .apply_locking_strategy()
            .compact()
            .change_direction(Direction::Left);
    }

    fn extensions(&self, horizontal: bool) -> Vec<ExtensionNodes> {
        self.transformer.extensions_on(horizontal).copied().collect()
    }

    fn set_representors_active(&mut self, horizontal: bool, active: bool) {
        for ext in self.extensions(horizontal) {
            self.compactor.set_active(ext.representor, active);
        }
    }

    fn set_placeholders_active(&mut self, horizontal: bool, active: bool) {
        for ext in self.extensions(horizontal) {
            if let Some(placeholder) = ext.placeholder {
                self.compactor.set_active(placeholder, active);
            }
        }
    }

    fn parent_movement(&self, ext: &ExtensionNodes) -> f64 {
        let group = self.transformer.component_group(ext.component);
        self.compactor.graph().group(group).delta_normalized()
    }

    /// Re-anchors the representors of one axis after their parents moved
    /// along it.
    ///
    /// West and north representors start at the drawing's top left and
    /// stretch to their parent. East and south representors move with their
    /// parent and keep their far end.
    fn update_representors(&mut self, horizontal: bool) {
        let top_left = self.top_left;
        for ext in self.extensions(horizontal) {
            let moved = self.parent_movement(&ext);
            let node = self.compactor.graph_mut().node_mut(ext.representor);
            let r = &mut node.hitbox;
            match ext.side {
                Side::West => {
                    r.set_x(top_left.x());
                    r.set_width((r.width() + moved).max(1.0));
                }
                Side::East => {
                    r.set_x(r.x() + moved);
                    r.set_width((r.width() - moved).max(1.0));
                }
                Side::North => {
                    r.set_y(top_left.y());
                    r.set_height((r.height() + moved).max(1.0));
                }
                Side::South => {
                    r.set_y(r.y() + moved);
                    r.set_height((r.height() - moved).max(1.0));
                }
            }
        }
    }

    /// Moves the placeholders of extensions on `horizontal` sides with
    /// their parents across the axis that was just compacted.
    fn follow_parents(&mut self, horizontal: bool) {
        for ext in self.extensions(horizontal) {
            let Some(placeholder) = ext.placeholder else {
                continue;
            };
            let moved = self.parent_movement(&ext);
            let node = self.compactor.graph_mut().node_mut(placeholder);
            if horizontal {
                node.hitbox.set_y(node.hitbox.y() + moved);
            } else {
                node.hitbox.set_x(node.hitbox.x() + moved);
            }
        }
    }
}
