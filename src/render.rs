//! Per-frame view of the editor, ready for a renderer to draw.
//!
//! Positions and connection paths are in editor (world) space; the renderer
//! applies [`Frame::transform`] to the whole scene. The grid is drawn in
//! component space and does not follow the transform.

use crate::config::Side;
use crate::editor::Editor;
use crate::endpoint::{ConnectionId, Endpoint, PortKind};
use crate::geometry::{Size, Vector2d};
use crate::grid::generate_grid_commands;
use crate::model::Node;
use crate::path::{connection_path, stroke_width};
use crate::state::Transform;

/// Everything needed to draw one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame<R> {
    pub nodes: Vec<NodeView<R>>,
    pub connections: Vec<ConnectionView>,
    /// The connection being dragged out of a port, if any.
    pub working: Option<WorkingConnectionView>,
    pub transform: Transform,
    /// SVG commands of the background grid, `None` when the grid is off.
    pub grid: Option<String>,
    pub component_size: Size,
}

impl<R> Frame<R> {
    pub fn node(&self, id: &str) -> Option<&NodeView<R>> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn connection(&self, id: &ConnectionId) -> Option<&ConnectionView> {
        self.connections.iter().find(|c| &c.id == id)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PortView {
    pub endpoint: Endpoint,
    pub name: String,
    pub side: Side,
    pub connected: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeView<R> {
    pub id: String,
    pub name: String,
    pub node_type: String,
    pub pos: Vector2d,
    pub size: Vector2d,
    /// The node's own flag when set, the editor's state otherwise.
    pub is_collapsed: bool,
    pub selected: bool,
    pub class_names: Vec<String>,
    /// Resolved body content; `None` while collapsed.
    pub content: Option<R>,
    pub inputs: Vec<PortView>,
    pub outputs: Vec<PortView>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConnectionView {
    pub id: ConnectionId,
    pub class_names: Vec<String>,
    pub notes: Option<String>,
    pub selected: bool,
    /// `None` until both port anchors are known; links created outside the
    /// editor appear once the renderer reported them.
    pub path: Option<String>,
    pub stroke_width: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WorkingConnectionView {
    pub path: String,
    pub stroke_width: f32,
}

impl<P: Clone> Editor<P> {
    /// Settle the editor and describe the frame. `resolver` renders the body
    /// of every expanded node.
    pub fn render<R>(&mut self, resolver: impl Fn(&Node<P>) -> R) -> Frame<R> {
        self.settle();
        self.frame(resolver)
    }

    /// Describe the current state without settling it.
    pub fn frame<R>(&self, resolver: impl Fn(&Node<P>) -> R) -> Frame<R> {
        let config = &self.config;
        let state = &self.state;
        let transform = state.transform;
        let width = stroke_width(transform.zoom);

        let nodes = self
            .nodes
            .iter()
            .filter_map(|node| {
                let node_state = state.node_states.get(&node.id)?;
                let is_collapsed = node.is_collapsed.unwrap_or(node_state.is_collapsed);
                let ports = |kind: PortKind| -> Vec<PortView> {
                    node.ports(kind)
                        .iter()
                        .enumerate()
                        .map(|(i, port)| PortView {
                            endpoint: Endpoint::new(node.id.clone(), i, kind),
                            name: port.name.clone(),
                            side: config.direction.side(kind),
                            connected: port.is_connected(),
                        })
                        .collect()
                };
                Some(NodeView {
                    id: node.id.clone(),
                    name: node.name.clone(),
                    node_type: node.node_type.clone(),
                    pos: node_state.pos,
                    size: node_state.size,
                    is_collapsed,
                    selected: state.selection.is_node_selected(&node.id),
                    class_names: node.class_names.clone(),
                    content: (!is_collapsed).then(|| resolver(node)),
                    inputs: ports(PortKind::Input),
                    outputs: ports(PortKind::Output),
                })
            })
            .collect();

        let connections = self
            .connections()
            .into_iter()
            .map(|info| ConnectionView {
                selected: state.selection.is_connection_selected(&info.id),
                path: self.connection_path(&info.id),
                id: info.id,
                class_names: info.class_names,
                notes: info.notes,
                stroke_width: width,
            })
            .collect();

        let working = state.working.as_ref().map(|w| WorkingConnectionView {
            path: connection_path(
                w.output,
                w.input,
                config.connection_type,
                config.connection_anchors_length,
                config.direction,
            ),
            stroke_width: width,
        });

        Frame {
            nodes,
            connections,
            working,
            transform,
            grid: config
                .grid
                .spacing()
                .map(|spacing| generate_grid_commands(state.component_size, spacing)),
            component_size: state.component_size,
        }
    }

    /// SVG path of a link in editor space, once both port anchors are known.
    pub fn connection_path(&self, id: &ConnectionId) -> Option<String> {
        let output = self.state.anchor(&id.output)?;
        let input = self.state.anchor(&id.input)?;
        Some(connection_path(
            output,
            input,
            self.config.connection_type,
            self.config.connection_anchors_length,
            self.config.direction,
        ))
    }
}
