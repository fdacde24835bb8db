//! Arena-backed constraint graph.
//!
//! Nodes are rectangles, groups are sets of nodes that move as one. Both
//! live in flat vectors and refer to each other by index. Nodes and groups
//! can be temporarily deactivated; inactive ones keep their data but take no
//! part in compaction.

use polypack_core::{
    geometry::Rect,
    side::{Side, SideSet},
};

/// Index of a node in a [`CGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Index of a group in a [`CGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(usize);

impl GroupId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A compaction direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }

    /// The component side facing this direction
    pub fn side(self) -> Side {
        match self {
            Direction::Left => Side::West,
            Direction::Right => Side::East,
            Direction::Up => Side::North,
            Direction::Down => Side::South,
        }
    }

    fn bit(self) -> u8 {
        match self {
            Direction::Left => 0b0001,
            Direction::Right => 0b0010,
            Direction::Up => 0b0100,
            Direction::Down => 0b1000,
        }
    }
}

impl From<Side> for Direction {
    fn from(side: Side) -> Self {
        match side {
            Side::West => Direction::Left,
            Side::East => Direction::Right,
            Side::North => Direction::Up,
            Side::South => Direction::Down,
        }
    }
}

/// Per-direction realignment permissions of a node.
///
/// A set bit lets the final alignment pass move the node toward that
/// direction; a cleared bit keeps it from drifting away from the opposite
/// side, where its external connections leave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Lock(u8);

impl Lock {
    /// All directions allowed
    pub const FREE: Lock = Lock(0b1111);

    /// Derives the lock from the sides carrying external connections.
    ///
    /// Moving toward `d` is forbidden when the connections lie on the side
    /// opposite to `d`, not on `d` itself, and on at most two sides overall.
    /// Components without external connections, with connections on
    /// opposite sides, or on three or more sides are free.
    ///
    /// # Examples
    ///
    /// ```
    /// # use polypack::compaction::graph::{Direction, Lock};
    /// # use polypack_core::side::{Side, SideSet};
    /// let lock = Lock::from_external_sides(SideSet::EMPTY.with(Side::North));
    /// assert!(lock.allows(Direction::Up));
    /// assert!(!lock.allows(Direction::Down));
    /// ```
    pub fn from_external_sides(sides: SideSet) -> Self {
        let mut lock = Lock::FREE;
        if sides.len() <= 2 {
            for direction in [Direction::Left, Direction::Right, Direction::Up, Direction::Down] {
                let side = direction.side();
                if sides.contains(side.opposite()) && !sides.contains(side) {
                    lock.0 &= !direction.bit();
                }
            }
        }
        lock
    }

    /// Returns true if the node may be realigned toward `direction`
    pub fn allows(self, direction: Direction) -> bool {
        self.0 & direction.bit() != 0
    }
}

/// What a node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A hull rectangle of a component
    Hull { component: usize, rect: usize },
    /// The representor rectangle of an external extension
    Representor { component: usize, extension: usize },
    /// The placeholder rectangle of an external extension
    Placeholder { component: usize, extension: usize },
}

/// A rectangle taking part in compaction.
#[derive(Debug, Clone)]
pub struct CNode {
    pub(crate) hitbox: Rect,
    pub(crate) spacing: f64,
    pub(crate) lock: Lock,
    pub(crate) group: GroupId,
    pub(crate) kind: NodeKind,
    pub(crate) active: bool,
    /// Nodes that must be placed after this one along the compaction axis
    pub(crate) successors: Vec<NodeId>,
}

impl CNode {
    pub fn hitbox(&self) -> Rect {
        self.hitbox
    }

    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    pub fn lock(&self) -> Lock {
        self.lock
    }

    pub fn group(&self) -> GroupId {
        self.group
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

/// A rigid set of nodes.
#[derive(Debug, Clone)]
pub struct CGroup {
    pub(crate) nodes: Vec<NodeId>,
    pub(crate) active: bool,
    pub(crate) reposition: bool,
    pub(crate) delta: f64,
    pub(crate) delta_normalized: f64,
}

impl CGroup {
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Displacement of the last compaction along the compacted axis in
    /// canonical coordinates
    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// Displacement of the last compaction along the compacted axis in
    /// drawing coordinates: positive toward right or down
    pub fn delta_normalized(&self) -> f64 {
        self.delta_normalized
    }
}

/// Nodes and groups of one compaction run.
#[derive(Debug, Clone, Default)]
pub struct CGraph {
    nodes: Vec<CNode>,
    groups: Vec<CGroup>,
}

impl CGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an empty, active group
    pub fn add_group(&mut self) -> GroupId {
        let id = GroupId(self.groups.len());
        self.groups.push(CGroup {
            nodes: Vec::new(),
            active: true,
            reposition: true,
            delta: 0.0,
            delta_normalized: 0.0,
        });
        id
    }

    /// Adds a node to `group`
    pub fn add_node(
        &mut self,
        group: GroupId,
        hitbox: Rect,
        spacing: f64,
        lock: Lock,
        kind: NodeKind,
        active: bool,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(CNode {
            hitbox,
            spacing,
            lock,
            group,
            kind,
            active,
            successors: Vec::new(),
        });
        self.groups[group.0].nodes.push(id);
        id
    }

    pub fn node(&self, id: NodeId) -> &CNode {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut CNode {
        &mut self.nodes[id.0]
    }

    pub fn group(&self, id: GroupId) -> &CGroup {
        &self.groups[id.0]
    }

    pub(crate) fn group_mut(&mut self, id: GroupId) -> &mut CGroup {
        &mut self.groups[id.0]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Iterates all nodes with their ids
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &CNode)> {
        self.nodes.iter().enumerate().map(|(i, node)| (NodeId(i), node))
    }

    /// Iterates all groups with their ids
    pub fn groups(&self) -> impl Iterator<Item = (GroupId, &CGroup)> {
        self.groups.iter().enumerate().map(|(i, group)| (GroupId(i), group))
    }

    /// Ids of active nodes in active groups
    pub fn active_nodes(&self) -> Vec<NodeId> {
        self.nodes()
            .filter(|(_, node)| node.active && self.groups[node.group.0].active)
            .map(|(id, _)| id)
            .collect()
    }

    /// Ids of active groups with at least one active node
    pub fn active_groups(&self) -> Vec<GroupId> {
        self.groups()
            .filter(|(_, group)| {
                group.active && group.nodes.iter().any(|n| self.nodes[n.0].active)
            })
            .map(|(id, _)| id)
            .collect()
    }

    /// Active nodes of a group
    pub fn active_members(&self, group: GroupId) -> impl Iterator<Item = NodeId> + '_ {
        self.groups[group.0]
            .nodes
            .iter()
            .copied()
            .filter(|n| self.nodes[n.0].active)
    }

    pub(crate) fn set_node_active(&mut self, id: NodeId, active: bool) {
        self.nodes[id.0].active = active;
    }

    /// Activates or deactivates a whole group
    pub fn set_group_active(&mut self, id: GroupId, active: bool) {
        self.groups[id.0].active = active;
    }

    /// Resets the displacement bookkeeping of every group
    pub(crate) fn reset_deltas(&mut self) {
        for group in &mut self.groups {
            group.delta = 0.0;
            group.delta_normalized = 0.0;
        }
    }

    /// Sum of absolute drawing-space displacements of all active groups.
    ///
    /// Placeholder groups only shadow an extension of their component and
    /// are not counted.
    pub fn total_movement(&self) -> f64 {
        self.groups
            .iter()
            .filter(|group| group.active && !self.holds_placeholder(group))
            .map(|group| group.delta_normalized.abs())
            .sum()
    }

    fn holds_placeholder(&self, group: &CGroup) -> bool {
        group
            .nodes
            .iter()
            .any(|n| matches!(self.nodes[n.0].kind, NodeKind::Placeholder { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lock_of(sides: &[Side]) -> [bool; 4] {
        let lock = Lock::from_external_sides(sides.iter().copied().collect::<SideSet>());
        [
            lock.allows(Direction::Left),
            lock.allows(Direction::Right),
            lock.allows(Direction::Up),
            lock.allows(Direction::Down),
        ]
    }

    #[test]
    fn test_lock_single_sides() {
        assert_eq!(lock_of(&[Side::North]), [true, true, true, false]);
        assert_eq!(lock_of(&[Side::East]), [false, true, true, true]);
        assert_eq!(lock_of(&[Side::South]), [true, true, false, true]);
        assert_eq!(lock_of(&[Side::West]), [true, false, true, true]);
    }

    #[test]
    fn test_lock_corners() {
        assert_eq!(lock_of(&[Side::North, Side::East]), [false, true, true, false]);
        assert_eq!(lock_of(&[Side::East, Side::South]), [false, true, false, true]);
        assert_eq!(lock_of(&[Side::South, Side::West]), [true, false, false, true]);
        assert_eq!(lock_of(&[Side::North, Side::West]), [true, false, true, false]);
    }

    #[test]
    fn test_lock_free_cases() {
        let free = [true; 4];
        assert_eq!(lock_of(&[]), free);
        assert_eq!(lock_of(&[Side::North, Side::South]), free);
        assert_eq!(lock_of(&[Side::East, Side::West]), free);
        assert_eq!(lock_of(&[Side::North, Side::East, Side::South]), free);
        assert_eq!(lock_of(&Side::ALL), free);
    }

    #[test]
    fn test_active_groups_need_active_nodes() {
        let mut graph = CGraph::new();
        let a = graph.add_group();
        let b = graph.add_group();
        let n = graph.add_node(a, Rect::new(0.0, 0.0, 1.0, 1.0), 1.0, Lock::FREE, NodeKind::Hull { component: 0, rect: 0 }, true);
        graph.add_node(b, Rect::new(5.0, 0.0, 1.0, 1.0), 1.0, Lock::FREE, NodeKind::Hull { component: 1, rect: 0 }, false);
        assert_eq!(graph.active_groups(), vec![a]);
        assert_eq!(graph.active_nodes(), vec![n]);

        graph.set_group_active(a, false);
        assert!(graph.active_groups().is_empty());
        assert!(graph.active_nodes().is_empty());
    }

    #[test]
    fn test_total_movement_skips_placeholders() {
        let mut graph = CGraph::new();
        let hull = graph.add_group();
        graph.add_node(hull, Rect::new(0.0, 0.0, 4.0, 4.0), 1.0, Lock::FREE, NodeKind::Hull { component: 0, rect: 0 }, true);
        let placeholder = graph.add_group();
        graph.add_node(placeholder, Rect::new(0.0, -1.0, 1.0, 1.0), 1.0, Lock::FREE, NodeKind::Placeholder { component: 0, extension: 0 }, false);

        graph.group_mut(hull).delta_normalized = -3.0;
        graph.group_mut(placeholder).delta_normalized = 40.0;
        assert_eq!(graph.total_movement(), 3.0);

        graph.reset_deltas();
        assert_eq!(graph.total_movement(), 0.0);
    }

    #[test]
    fn test_direction_side_roundtrip() {
        for side in Side::ALL {
            assert_eq!(Direction::from(side).side(), side);
        }
        assert_eq!(Direction::Up.opposite(), Direction::Down);
        assert!(Direction::Right.is_horizontal());
    }
}
