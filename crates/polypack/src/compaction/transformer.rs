//! Conversion between components and a constraint graph.

use log::debug;

use polypack_core::{
    geometry::{Point, Rect, Size},
    side::Side,
};

use super::graph::{CGraph, GroupId, Lock, NodeId, NodeKind};
use crate::component::Component;

/// Individual spacing of placeholder nodes.
const PLACEHOLDER_SPACING: f64 = 1.0;

/// Graph nodes standing for one external extension.
#[derive(Debug, Clone, Copy)]
pub struct ExtensionNodes {
    pub component: usize,
    pub side: Side,
    pub representor: NodeId,
    pub placeholder: Option<NodeId>,
}

/// Position and extent of a drawing after compaction.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LayoutBounds {
    /// Translation that moves the drawing to non-negative coordinates
    pub global_offset: Point,
    pub size: Size,
}

/// Builds a [`CGraph`] from components and writes compacted positions back.
///
/// Every component becomes one rigid group holding its hull rectangles and
/// the representors of its external extensions. Placeholders get a group of
/// their own so that they can slide independently of their component. Only
/// hull nodes start out active.
#[derive(Debug, Clone)]
pub struct ComponentsToCGraphTransformer {
    spacing: f64,
    groups: Vec<GroupId>,
    extensions: Vec<ExtensionNodes>,
}

impl ComponentsToCGraphTransformer {
    pub fn new(spacing: f64) -> Self {
        Self {
            spacing,
            groups: Vec::new(),
            extensions: Vec::new(),
        }
    }

    pub fn transform(&mut self, components: &[Component]) -> CGraph {
        let mut graph = CGraph::new();
        self.groups.clear();
        self.extensions.clear();

        for (index, component) in components.iter().enumerate() {
            let group = graph.add_group();
            self.groups.push(group);
            let lock = Lock::from_external_sides(component.external_sides());

            for (rect_index, rect) in component.hull().iter().enumerate() {
                let kind = NodeKind::Hull {
                    component: index,
                    rect: rect_index,
                };
                graph.add_node(group, *rect, self.spacing, lock, kind, true);
            }

            for (ext_index, extension) in component.extensions().iter().enumerate() {
                let representor = graph.add_node(
                    group,
                    extension.representor(),
                    self.spacing,
                    lock,
                    NodeKind::Representor {
                        component: index,
                        extension: ext_index,
                    },
                    false,
                );
                let placeholder = extension.placeholder().map(|rect| {
                    let own = graph.add_group();
                    graph.add_node(
                        own,
                        rect,
                        PLACEHOLDER_SPACING,
                        lock,
                        NodeKind::Placeholder {
                            component: index,
                            extension: ext_index,
                        },
                        false,
                    )
                });
                self.extensions.push(ExtensionNodes {
                    component: index,
                    side: extension.side(),
                    representor,
                    placeholder,
                });
            }
        }

        debug!(
            components = components.len(),
            nodes = graph.node_count(),
            groups = graph.group_count();
            "Constraint graph built"
        );
        graph
    }

    /// Rigid group of the component at `index`
    pub fn component_group(&self, index: usize) -> GroupId {
        self.groups[index]
    }

    pub fn extensions(&self) -> &[ExtensionNodes] {
        &self.extensions
    }

    /// Extensions leaving east or west (`horizontal`), or north or south
    pub fn extensions_on(&self, horizontal: bool) -> impl Iterator<Item = &ExtensionNodes> {
        self.extensions
            .iter()
            .filter(move |ext| ext.side.is_horizontal() == horizontal)
    }

    /// Writes every node's hitbox back into the rectangle it stands for and
    /// returns the bounds of the hulls and placeholders.
    pub fn apply_layout(&self, graph: &CGraph, components: &mut [Component]) -> LayoutBounds {
        let shifts: Vec<Point> = components
            .iter()
            .map(|component| component.hull().first().map_or(Point::default(), |r| r.position()))
            .collect();

        let mut bounds: Option<Rect> = None;
        for (_, node) in graph.nodes() {
            let hitbox = node.hitbox();
            match node.kind() {
                NodeKind::Hull { component, rect } => {
                    components[component].hull_mut()[rect] = hitbox;
                    bounds = Some(bounds.map_or(hitbox, |b| b.union(hitbox)));
                }
                NodeKind::Representor {
                    component,
                    extension,
                } => components[component].extensions_mut()[extension].set_representor(hitbox),
                NodeKind::Placeholder {
                    component,
                    extension,
                } => {
                    components[component].extensions_mut()[extension].set_placeholder(hitbox);
                    bounds = Some(bounds.map_or(hitbox, |b| b.union(hitbox)));
                }
            }
        }

        for (component, old) in components.iter_mut().zip(shifts) {
            let Some(new) = component.hull().first().map(|r| r.position()) else {
                continue;
            };
            let shift = new.sub_point(old);
            for extension in component.extensions_mut() {
                let parent = extension.parent().translate(shift);
                extension.set_parent(parent);
            }
        }

        bounds.map_or(LayoutBounds::default(), |b| LayoutBounds {
            global_offset: b.position().negate(),
            size: b.size(),
        })
    }
}
