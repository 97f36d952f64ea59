//! Placement of nodes the editor has not seen before.
//!
//! Two entry points:
//!
//! - [`initial_layout`] runs once when the editor is constructed. Nodes use
//!   their `position` hint (or a default spot) and are shifted right when
//!   they land on an already placed node. Port anchor offsets are seeded so
//!   links can be drawn before the renderer reports measured positions.
//! - [`adjust`] runs on every frame and places only nodes that appeared since
//!   the last call, using a breadth-first column assignment over their links.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use crate::config::{Direction, Side};
use crate::endpoint::{Endpoint, PortKind};
use crate::geometry::{Rect, Size, Vector2d};
use crate::model::Node;

/// Default node extent until the renderer reports a measured size.
pub const DEFAULT_NODE_SIZE: Vector2d = Vector2d::new(100.0, 100.0);

/// Spacing used by [`initial_layout`] when pushing a node off an occupied spot.
const MARGIN: Vector2d = Vector2d::new(100.0, 100.0);

/// Horizontal slack applied to the viewport width by [`adjust`].
const LAYOUT_WIDTH_FACTOR: f32 = 3.0;
/// Vertical slack applied to the viewport height by [`adjust`].
const LAYOUT_HEIGHT_FACTOR: f32 = 4.0;

/// The editor's private geometry for one node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeState {
    pub pos: Vector2d,
    pub size: Vector2d,
    pub is_collapsed: bool,
}

impl NodeState {
    pub fn new(pos: Vector2d, is_collapsed: bool) -> Self {
        Self {
            pos,
            size: DEFAULT_NODE_SIZE,
            is_collapsed,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }
}

/// Node states and seeded anchor offsets produced by [`initial_layout`].
#[derive(Debug, Default)]
pub struct InitialLayout {
    pub node_states: HashMap<String, NodeState>,
    pub anchors: HashMap<Endpoint, Vector2d>,
}

/// Place every node known at construction time.
///
/// Duplicate ids keep their first placement.
pub fn initial_layout<P>(nodes: &[Node<P>], direction: Direction) -> InitialLayout {
    let mut layout = InitialLayout::default();
    let mut used_place: Vec<Rect> = Vec::new();

    for node in nodes {
        if layout.node_states.contains_key(&node.id) {
            tracing::warn!(node_id = %node.id, "duplicate node id, keeping first placement");
            continue;
        }

        let mut pos = node
            .position
            .unwrap_or(Vector2d::new(10.0 + MARGIN.x, 10.0 + MARGIN.y));
        for place in &used_place {
            if place.hit(pos) {
                pos.x = place.right() + MARGIN.x;
                pos.y = place.top();
            }
        }

        let state = NodeState::new(pos, false);
        used_place.push(state.rect());
        layout.node_states.insert(node.id.clone(), state);
        layout.anchors.extend(seed_anchors(node, state.size, direction));
    }

    layout
}

/// Default anchor offsets for a node's ports: on the side given by
/// `direction`, spread evenly along the node height.
pub fn seed_anchors<P>(
    node: &Node<P>,
    size: Vector2d,
    direction: Direction,
) -> impl Iterator<Item = (Endpoint, Vector2d)> + '_ {
    [PortKind::Input, PortKind::Output]
        .into_iter()
        .flat_map(move |kind| {
            let count = node.ports(kind).len();
            let x = match direction.side(kind) {
                Side::Left => 0.0,
                Side::Right => size.x,
            };
            (0..count).map(move |i| {
                let y = size.y * (i + 1) as f32 / (count + 1) as f32;
                (Endpoint::new(node.id.clone(), i, kind), Vector2d::new(x, y))
            })
        })
}

/// Neighbours of a new node: peers reached through its inputs (`left`) and
/// through its outputs (`right`).
struct Correlation<'a> {
    left: Vec<&'a str>,
    right: Vec<&'a str>,
}

/// Lay out nodes that are not in `prev`.
///
/// Each connected group of new nodes is walked breadth-first from its first
/// node (in list order), which gets column 0. Following an input link moves
/// one column right, following an output link one column left. A node reached
/// twice keeps the column it got first; cycles are not detected. Columns are
/// spread over `3 x` the viewport width in numeric order, and the nodes of a
/// column are stacked evenly over `4 x` the viewport height.
///
/// Returns states for the new nodes only; `prev` is never modified and the
/// result is empty when there is nothing new.
pub fn adjust<P>(
    prev: &HashMap<String, NodeState>,
    size: Size,
    nodes: &[Node<P>],
) -> HashMap<String, NodeState> {
    let mut new_nodes: HashMap<String, NodeState> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    let mut correlations: HashMap<&str, Correlation<'_>> = HashMap::new();

    for node in nodes {
        if prev.contains_key(&node.id) || correlations.contains_key(node.id.as_str()) {
            continue;
        }
        let left = node
            .inputs
            .iter()
            .flat_map(|p| p.connections())
            .map(|c| c.node_id.as_str())
            .collect();
        let right = node
            .outputs
            .iter()
            .flat_map(|p| p.connections())
            .map(|c| c.node_id.as_str())
            .collect();

        correlations.insert(node.id.as_str(), Correlation { left, right });
        order.push(node.id.as_str());
        new_nodes.insert(
            node.id.clone(),
            NodeState::new(
                node.position.unwrap_or(Vector2d::ZERO),
                node.is_collapsed.unwrap_or(true),
            ),
        );
    }
    if new_nodes.is_empty() {
        return new_nodes;
    }

    let mut id_to_column: HashMap<&str, i32> = HashMap::new();
    let mut columns: BTreeMap<i32, Vec<&str>> = BTreeMap::new();
    let mut queued: HashSet<(&str, i32)> = HashSet::new();

    for &seed in &order {
        if id_to_column.contains_key(seed) {
            continue;
        }
        let mut queue = VecDeque::from([(seed, 0)]);
        while let Some((id, column)) = queue.pop_front() {
            if id_to_column.contains_key(id) {
                continue;
            }
            id_to_column.insert(id, column);
            columns.entry(column).or_default().push(id);

            let Some(correlation) = correlations.get(id) else {
                continue;
            };
            let neighbours = correlation
                .left
                .iter()
                .map(|&l| (l, column + 1))
                .chain(correlation.right.iter().map(|&r| (r, column - 1)));
            for (peer, peer_column) in neighbours {
                // Known nodes keep their place and do not pull new ones along.
                if !correlations.contains_key(peer) || id_to_column.contains_key(peer) {
                    continue;
                }
                if queued.insert((peer, peer_column)) {
                    queue.push_back((peer, peer_column));
                }
            }
        }
    }

    let width = size.width * LAYOUT_WIDTH_FACTOR;
    let height = size.height * LAYOUT_HEIGHT_FACTOR;
    let dx = width / columns.len() as f32;
    let mut x = -dx / 2.0;
    for column_nodes in columns.values() {
        x += dx;
        let count = column_nodes.len() as f32;
        for (i, id) in column_nodes.iter().enumerate() {
            let y = height * (1.0 + 2.0 * i as f32) / (count * 2.0);
            if let Some(state) = new_nodes.get_mut(*id) {
                state.pos = Vector2d::new(x, y);
            }
        }
    }

    tracing::debug!(count = new_nodes.len(), columns = columns.len(), "laid out new nodes");
    new_nodes
}
