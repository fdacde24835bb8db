//! One-dimensional compaction of a [`CGraph`].
//!
//! All compaction happens toward the left. The other directions are reached
//! by mirroring and transposing the hitboxes of the active nodes, so that
//! the longest-path pass only ever has to push groups toward smaller `x`.
//!
//! ```text
//! Left   identity
//! Right  mirror     x ↦ −x − w
//! Up     transpose  (x, y, w, h) ↦ (y, x, h, w)
//! Down   transpose, then mirror
//! ```

use std::collections::VecDeque;

use log::{trace, warn};

use polypack_core::geometry::Rect;

use super::graph::{CGraph, Direction, GroupId, NodeId};

/// Minimum overlap on the other axis for two nodes to constrain each other.
const OVERLAP_TOLERANCE: f64 = 1e-9;

/// Decides which groups may be moved freely by the next compaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockingStrategy {
    /// Groups that no other group constrains keep their position, the rest
    /// move freely
    #[default]
    Dependencies,
    /// Groups follow the lock bits of their own nodes for the current
    /// direction
    OwnLocks,
}

/// Compacts the active nodes of a constraint graph one direction at a time.
///
/// Methods return `&mut Self` so that passes can be chained:
///
/// ```
/// # use polypack::compaction::compactor::OneDimensionalCompactor;
/// # use polypack::compaction::graph::{CGraph, Direction, Lock, NodeKind};
/// # use polypack::geometry::Rect;
/// let mut graph = CGraph::new();
/// for (i, x) in [0.0, 40.0].into_iter().enumerate() {
///     let group = graph.add_group();
///     let kind = NodeKind::Hull { component: i, rect: 0 };
///     graph.add_node(group, Rect::new(x, 0.0, 10.0, 10.0), 5.0, Lock::FREE, kind, true);
/// }
///
/// let mut compactor = OneDimensionalCompactor::new(graph);
/// compactor.change_direction(Direction::Left).compact().finish();
///
/// let graph = compactor.into_graph();
/// let (_, second) = graph.nodes().nth(1).unwrap();
/// assert_eq!(second.hitbox().x(), 15.0);
/// ```
#[derive(Debug)]
pub struct OneDimensionalCompactor {
    graph: CGraph,
    direction: Option<Direction>,
    locking: LockingStrategy,
    constraints_stale: bool,
    finished: bool,
}

impl OneDimensionalCompactor {
    pub fn new(graph: CGraph) -> Self {
        Self {
            graph,
            direction: None,
            locking: LockingStrategy::default(),
            constraints_stale: true,
            finished: false,
        }
    }

    pub fn graph(&self) -> &CGraph {
        &self.graph
    }

    /// Mutable access to the graph while it is in its natural orientation.
    pub(crate) fn graph_mut(&mut self) -> &mut CGraph {
        self.assert_natural_orientation();
        &mut self.graph
    }

    pub fn into_graph(self) -> CGraph {
        self.graph
    }

    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    pub fn set_locking_strategy(&mut self, locking: LockingStrategy) -> &mut Self {
        self.locking = locking;
        self
    }

    /// Activates or deactivates a node.
    ///
    /// Inactive nodes are not transformed by direction changes, so they may
    /// only be toggled while the graph is in its natural orientation.
    pub fn set_active(&mut self, node: NodeId, active: bool) -> &mut Self {
        self.assert_natural_orientation();
        if self.graph.node(node).is_active() != active {
            self.graph.set_node_active(node, active);
            self.constraints_stale = true;
        }
        self
    }

    /// Transforms the active hitboxes so that the next compaction moves
    /// them toward `direction`.
    ///
    /// Turning around reverses the existing constraints; any other change
    /// forces their recalculation.
    pub fn change_direction(&mut self, direction: Direction) -> &mut Self {
        self.assert_not_finished();
        let current = self.direction.unwrap_or(Direction::Left);
        if self.direction == Some(direction) {
            return self;
        }

        let active = self.graph.active_nodes();
        for &id in &active {
            let node = self.graph.node_mut(id);
            node.hitbox = from_canonical(current, node.hitbox);
            node.hitbox = to_canonical(direction, node.hitbox);
        }

        if self.direction.is_some() && direction == current.opposite() && !self.constraints_stale {
            self.reverse_constraints();
        } else {
            self.constraints_stale = true;
        }
        self.direction = Some(direction);
        self
    }

    /// Marks the constraints for recalculation before the next compaction
    pub fn force_constraints_recalculation(&mut self) -> &mut Self {
        self.constraints_stale = true;
        self
    }

    /// Decides for every group whether the next compaction may move it
    /// freely. The decision is reset by [`compact`](Self::compact).
    pub fn apply_locking_strategy(&mut self) -> &mut Self {
        let direction = self.direction.unwrap_or(Direction::Left);
        self.refresh_constraints();
        let predecessors = self.group_predecessors();

        let ids: Vec<GroupId> = self.graph.groups().map(|(id, _)| id).collect();
        for group in ids {
            let reposition = match self.locking {
                LockingStrategy::Dependencies => predecessors[group.index()] != 0,
                LockingStrategy::OwnLocks => self
                    .graph
                    .active_members(group)
                    .all(|n| self.graph.node(n).lock().allows(direction)),
            };
            self.graph.group_mut(group).reposition = reposition;
        }
        self
    }

    /// Pushes all active groups as far as possible toward the current
    /// direction without violating any constraint.
    ///
    /// # Panics
    ///
    /// Panics if called after [`finish`](Self::finish).
    pub fn compact(&mut self) -> &mut Self {
        self.assert_not_finished();
        if self.direction.is_none() {
            self.change_direction(Direction::Left);
        }
        self.refresh_constraints();
        self.longest_path();

        let ids: Vec<GroupId> = self.graph.groups().map(|(id, _)| id).collect();
        for group in ids {
            self.graph.group_mut(group).reposition = true;
        }
        self
    }

    /// Returns to the natural orientation and rejects any further
    /// compaction.
    pub fn finish(&mut self) -> &mut Self {
        self.change_direction(Direction::Left);
        self.finished = true;
        self
    }

    fn assert_not_finished(&self) {
        assert!(!self.finished, "compactor used after finish()");
    }

    fn assert_natural_orientation(&self) {
        debug_assert!(
            matches!(self.direction, None | Some(Direction::Left)),
            "graph modified while transformed to {:?}",
            self.direction
        );
    }

    fn refresh_constraints(&mut self) {
        if self.constraints_stale {
            self.calculate_constraints();
            self.constraints_stale = false;
        }
    }

    /// Recomputes the constraints between active nodes of different groups.
    fn calculate_constraints(&mut self) {
        let active = self.graph.active_nodes();
        let mut successors: Vec<Vec<NodeId>> = vec![Vec::new(); self.graph.node_count()];

        for &a in &active {
            for &b in &active {
                if a != b && self.precedes(a, b) {
                    successors[a.index()].push(b);
                }
            }
        }

        let ids: Vec<NodeId> = self.graph.nodes().map(|(id, _)| id).collect();
        for (id, succ) in ids.into_iter().zip(successors) {
            self.graph.node_mut(id).successors = succ;
        }
        trace!(nodes = active.len(); "Constraints recalculated");
    }

    fn precedes(&self, a: NodeId, b: NodeId) -> bool {
        let (na, nb) = (self.graph.node(a), self.graph.node(b));
        if na.group() == nb.group() {
            return false;
        }
        let (ha, hb) = (na.hitbox(), nb.hitbox());
        let before = ha.x() < hb.x() || (ha.x() == hb.x() && a < b);
        if !before {
            return false;
        }
        let spacing = na.spacing().min(nb.spacing());
        let overlap = ha.max_y().min(hb.max_y()) - ha.y().max(hb.y()) + spacing;
        overlap > OVERLAP_TOLERANCE
    }

    fn reverse_constraints(&mut self) {
        let mut reversed: Vec<Vec<NodeId>> = vec![Vec::new(); self.graph.node_count()];
        for (id, node) in self.graph.nodes() {
            for succ in &node.successors {
                reversed[succ.index()].push(id);
            }
        }
        let ids: Vec<NodeId> = self.graph.nodes().map(|(id, _)| id).collect();
        for (id, succ) in ids.into_iter().zip(reversed) {
            self.graph.node_mut(id).successors = succ;
        }
    }

    /// Number of constraints reaching each group from other active groups
    fn group_predecessors(&self) -> Vec<usize> {
        let mut predecessors = vec![0; self.graph.group_count()];
        for id in self.graph.active_nodes() {
            for succ in &self.graph.node(id).successors {
                if self.graph.node(*succ).is_active() {
                    predecessors[self.graph.node(*succ).group().index()] += 1;
                }
            }
        }
        predecessors
    }

    fn reference_x(&self, group: GroupId) -> Option<f64> {
        self.graph
            .active_members(group)
            .map(|n| self.graph.node(n).hitbox().x())
            .reduce(f64::min)
    }

    /// Longest-path placement of the active groups in canonical
    /// orientation.
    fn longest_path(&mut self) {
        let groups = self.graph.active_groups();
        let Some(min_start) = self
            .graph
            .active_nodes()
            .into_iter()
            .map(|n| self.graph.node(n).hitbox().x())
            .reduce(f64::min)
        else {
            return;
        };

        let count = self.graph.group_count();
        let mut reference = vec![0.0; count];
        let mut start = vec![f64::NEG_INFINITY; count];
        for &group in &groups {
            let ref_x = self.reference_x(group).unwrap_or(min_start);
            reference[group.index()] = ref_x;
            start[group.index()] = if self.graph.group(group).reposition {
                min_start
            } else {
                ref_x.max(min_start)
            };
        }

        let mut predecessors = self.group_predecessors();
        let mut placed = vec![false; count];
        let mut queue: VecDeque<GroupId> = groups
            .iter()
            .copied()
            .filter(|g| predecessors[g.index()] == 0)
            .collect();

        while let Some(group) = queue.pop_front() {
            self.place_group(group, &reference, &mut start, &mut placed);
            for succ_group in self.successor_groups(group) {
                let slot = &mut predecessors[succ_group.index()];
                *slot -= 1;
                if *slot == 0 {
                    queue.push_back(succ_group);
                }
            }
        }

        let mut leftover: Vec<GroupId> = groups
            .iter()
            .copied()
            .filter(|g| !placed[g.index()])
            .collect();
        if !leftover.is_empty() {
            warn!(
                groups = leftover.len(), direction:? = self.direction;
                "Rigid groups form a constraint cycle, relaxing in current order"
            );
            leftover.sort_by(|a, b| reference[a.index()].total_cmp(&reference[b.index()]));
            for group in leftover {
                self.place_group(group, &reference, &mut start, &mut placed);
            }
        }
    }

    /// Moves `group` to its computed start and raises the start of every
    /// unplaced group it constrains.
    fn place_group(
        &mut self,
        group: GroupId,
        reference: &[f64],
        start: &mut [f64],
        placed: &mut [bool],
    ) {
        let old_ref = reference[group.index()];
        let diff = start[group.index()] - old_ref;
        let members: Vec<NodeId> = self.graph.active_members(group).collect();

        for &n in &members {
            let node = self.graph.node_mut(n);
            node.hitbox.set_x(node.hitbox.x() + diff);
        }
        placed[group.index()] = true;

        let direction = self.direction.unwrap_or(Direction::Left);
        let entry = self.graph.group_mut(group);
        entry.delta += diff;
        entry.delta_normalized += match direction {
            Direction::Left | Direction::Up => diff,
            Direction::Right | Direction::Down => -diff,
        };

        for &n in &members {
            let node = self.graph.node(n);
            let end = node.hitbox().max_x();
            for &m in &node.successors {
                let succ = self.graph.node(m);
                let succ_group = succ.group();
                if !succ.is_active() || placed[succ_group.index()] {
                    continue;
                }
                let spacing = node.spacing().min(succ.spacing());
                let offset = succ.hitbox().x() - reference[succ_group.index()];
                let bound = end + spacing - offset;
                if bound > start[succ_group.index()] {
                    start[succ_group.index()] = bound;
                }
            }
        }
    }

    /// One entry per constraint leaving `group` toward another active group
    fn successor_groups(&self, group: GroupId) -> Vec<GroupId> {
        self.graph
            .active_members(group)
            .flat_map(|n| self.graph.node(n).successors.iter().copied())
            .filter(|m| self.graph.node(*m).is_active())
            .map(|m| self.graph.node(m).group())
            .collect()
    }
}

fn mirror(rect: Rect) -> Rect {
    Rect::new(-rect.x() - rect.width(), rect.y(), rect.width(), rect.height())
}

fn transpose(rect: Rect) -> Rect {
    Rect::new(rect.y(), rect.x(), rect.height(), rect.width())
}

/// Maps a hitbox from drawing coordinates to the canonical orientation of
/// `direction`.
fn to_canonical(direction: Direction, rect: Rect) -> Rect {
    match direction {
        Direction::Left => rect,
        Direction::Right => mirror(rect),
        Direction::Up => transpose(rect),
        Direction::Down => mirror(transpose(rect)),
    }
}

fn from_canonical(direction: Direction, rect: Rect) -> Rect {
    match direction {
        Direction::Left => rect,
        Direction::Right => mirror(rect),
        Direction::Up => transpose(rect),
        Direction::Down => transpose(mirror(rect)),
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;

    use super::*;
    use crate::compaction::graph::{Lock, NodeKind};

    fn hull(component: usize) -> NodeKind {
        NodeKind::Hull { component, rect: 0 }
    }

    /// One single-node group per rectangle
    fn graph_of(rects: &[Rect], spacing: f64) -> CGraph {
        let mut graph = CGraph::new();
        for (i, rect) in rects.iter().enumerate() {
            let group = graph.add_group();
            graph.add_node(group, *rect, spacing, Lock::FREE, hull(i), true);
        }
        graph
    }

    fn hitbox(compactor: &OneDimensionalCompactor, index: usize) -> Rect {
        let (_, node) = compactor
            .graph()
            .nodes()
            .nth(index)
            .expect("node exists");
        node.hitbox()
    }

    #[test]
    fn test_canonical_roundtrip() {
        let rect = Rect::new(3.0, 7.0, 2.0, 5.0);
        for direction in [Direction::Left, Direction::Right, Direction::Up, Direction::Down] {
            assert_eq!(from_canonical(direction, to_canonical(direction, rect)), rect);
        }
        assert_eq!(to_canonical(Direction::Down, rect), Rect::new(-12.0, 3.0, 5.0, 2.0));
    }

    #[test]
    fn test_compact_left_keeps_spacing() {
        let rects = [
            Rect::new(0.0, 0.0, 10.0, 10.0),
            Rect::new(50.0, 0.0, 10.0, 10.0),
            Rect::new(120.0, 5.0, 10.0, 10.0),
        ];
        let mut compactor = OneDimensionalCompactor::new(graph_of(&rects, 5.0));
        compactor.compact();

        assert!(approx_eq!(f64, hitbox(&compactor, 0).x(), 0.0));
        assert!(approx_eq!(f64, hitbox(&compactor, 1).x(), 15.0));
        assert!(approx_eq!(f64, hitbox(&compactor, 2).x(), 30.0));
        assert!(approx_eq!(f64, compactor.graph().total_movement(), 125.0));
    }

    #[test]
    fn test_unrelated_rows_do_not_constrain() {
        let rects = [
            Rect::new(0.0, 0.0, 10.0, 10.0),
            Rect::new(50.0, 30.0, 10.0, 10.0),
        ];
        let mut compactor = OneDimensionalCompactor::new(graph_of(&rects, 5.0));
        compactor.compact();
        assert!(approx_eq!(f64, hitbox(&compactor, 1).x(), 0.0));
    }

    #[test]
    fn test_compact_right_and_up_restore_orientation() {
        let rects = [
            Rect::new(0.0, 0.0, 10.0, 10.0),
            Rect::new(50.0, 0.0, 10.0, 10.0),
        ];
        let mut compactor = OneDimensionalCompactor::new(graph_of(&rects, 5.0));
        compactor.change_direction(Direction::Right).compact().finish();
        assert!(approx_eq!(f64, hitbox(&compactor, 0).x(), 35.0));
        assert!(approx_eq!(f64, hitbox(&compactor, 1).x(), 50.0));

        let (_, group) = compactor.graph().groups().next().expect("group exists");
        assert!(approx_eq!(f64, group.delta_normalized(), 35.0));
        assert!(approx_eq!(f64, group.delta(), -35.0));

        let rects = [
            Rect::new(0.0, 0.0, 10.0, 10.0),
            Rect::new(0.0, 40.0, 10.0, 10.0),
        ];
        let mut compactor = OneDimensionalCompactor::new(graph_of(&rects, 2.0));
        compactor.change_direction(Direction::Up).compact().finish();
        assert_eq!(hitbox(&compactor, 1), Rect::new(0.0, 12.0, 10.0, 10.0));
    }

    #[test]
    fn test_dependency_locks_keep_unconstrained_groups() {
        let rects = [
            Rect::new(20.0, 0.0, 10.0, 10.0),
            Rect::new(0.0, 30.0, 10.0, 10.0),
            Rect::new(60.0, 0.0, 10.0, 10.0),
        ];
        let mut compactor = OneDimensionalCompactor::new(graph_of(&rects, 5.0));
        compactor
            .change_direction(Direction::Left)
            .apply_locking_strategy()
            .compact();
        // Nothing constrains the first group, so it stays put. The third one
        // is constrained by it and closes up.
        assert!(approx_eq!(f64, hitbox(&compactor, 0).x(), 20.0));
        assert!(approx_eq!(f64, hitbox(&compactor, 1).x(), 0.0));
        assert!(approx_eq!(f64, hitbox(&compactor, 2).x(), 35.0));

        // Locks only last for one compaction.
        compactor.compact();
        assert!(approx_eq!(f64, hitbox(&compactor, 0).x(), 0.0));
        assert!(approx_eq!(f64, hitbox(&compactor, 2).x(), 15.0));
    }

    #[test]
    fn test_dependency_locks_let_constrained_group_move() {
        let rects = [
            Rect::new(0.0, 0.0, 10.0, 10.0),
            Rect::new(50.0, 0.0, 10.0, 10.0),
        ];
        let mut compactor = OneDimensionalCompactor::new(graph_of(&rects, 5.0));
        compactor
            .change_direction(Direction::Left)
            .apply_locking_strategy()
            .compact();
        assert!(approx_eq!(f64, hitbox(&compactor, 0).x(), 0.0));
        assert!(approx_eq!(f64, hitbox(&compactor, 1).x(), 15.0));
    }

    #[test]
    fn test_own_locks_respect_lock_bits() {
        let mut graph = CGraph::new();
        let group = graph.add_group();
        let pinned = Lock::from_external_sides(
            [polypack_core::side::Side::East].into_iter().collect(),
        );
        graph.add_node(group, Rect::new(0.0, 0.0, 10.0, 10.0), 5.0, Lock::FREE, hull(0), true);
        let group = graph.add_group();
        graph.add_node(group, Rect::new(50.0, 30.0, 10.0, 10.0), 5.0, pinned, hull(1), true);

        let mut compactor = OneDimensionalCompactor::new(graph);
        compactor
            .set_locking_strategy(LockingStrategy::OwnLocks)
            .change_direction(Direction::Left)
            .apply_locking_strategy()
            .compact();
        assert!(approx_eq!(f64, hitbox(&compactor, 1).x(), 50.0));
    }

    #[test]
    fn test_rigid_group_moves_together() {
        let mut graph = CGraph::new();
        let left = graph.add_group();
        graph.add_node(left, Rect::new(0.0, 0.0, 10.0, 10.0), 5.0, Lock::FREE, hull(0), true);
        let right = graph.add_group();
        graph.add_node(right, Rect::new(40.0, 0.0, 10.0, 10.0), 5.0, Lock::FREE, hull(1), true);
        graph.add_node(right, Rect::new(60.0, 20.0, 10.0, 10.0), 5.0, Lock::FREE, NodeKind::Hull { component: 1, rect: 1 }, true);

        let mut compactor = OneDimensionalCompactor::new(graph);
        compactor.compact();
        assert!(approx_eq!(f64, hitbox(&compactor, 1).x(), 15.0));
        assert!(approx_eq!(f64, hitbox(&compactor, 2).x(), 35.0));
    }

    #[test]
    fn test_inactive_nodes_are_ignored() {
        let mut graph = graph_of(
            &[
                Rect::new(0.0, 0.0, 10.0, 10.0),
                Rect::new(20.0, 0.0, 10.0, 10.0),
                Rect::new(50.0, 0.0, 10.0, 10.0),
            ],
            5.0,
        );
        let (middle, _) = graph.nodes().nth(1).expect("node exists");
        graph.set_node_active(middle, false);

        let mut compactor = OneDimensionalCompactor::new(graph);
        compactor.compact();
        assert!(approx_eq!(f64, hitbox(&compactor, 1).x(), 20.0));
        assert!(approx_eq!(f64, hitbox(&compactor, 2).x(), 15.0));
    }

    #[test]
    fn test_cycle_is_resolved() {
        // Two interleaved combs: each group has a node left of the other.
        let mut graph = CGraph::new();
        let a = graph.add_group();
        let b = graph.add_group();
        graph.add_node(a, Rect::new(0.0, 0.0, 10.0, 10.0), 1.0, Lock::FREE, hull(0), true);
        graph.add_node(a, Rect::new(40.0, 20.0, 10.0, 10.0), 1.0, Lock::FREE, NodeKind::Hull { component: 0, rect: 1 }, true);
        graph.add_node(b, Rect::new(20.0, 0.0, 10.0, 10.0), 1.0, Lock::FREE, hull(1), true);
        graph.add_node(b, Rect::new(0.0, 20.0, 10.0, 10.0), 1.0, Lock::FREE, NodeKind::Hull { component: 1, rect: 1 }, true);

        let mut compactor = OneDimensionalCompactor::new(graph);
        compactor.compact();
        for index in 0..4 {
            assert!(hitbox(&compactor, index).x().is_finite());
        }
    }

    #[test]
    #[should_panic(expected = "after finish")]
    fn test_compact_after_finish_panics() {
        let mut compactor =
            OneDimensionalCompactor::new(graph_of(&[Rect::new(0.0, 0.0, 1.0, 1.0)], 1.0));
        compactor.finish();
        compactor.compact();
    }
}
