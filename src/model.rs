//! Host-owned graph data: nodes, their ports, and the connection halves stored
//! on each port.
//!
//! A link between output `i` of node A and input `j` of node B is stored twice:
//! A's output port holds `{node_id: B, port: j}` and B's input port holds
//! `{node_id: A, port: i}`. Every mutation in [`crate::graph`] touches both
//! halves.
//!
//! The serde representation follows the host JSON shape (`camelCase`, `type`
//! for the node type, a port's `connection` either a single object or an
//! array).

use crate::endpoint::{Endpoint, PortKind};
use crate::geometry::Vector2d;
use serde::{Deserialize, Serialize};

/// The half of a link stored on one port, naming the opposite endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub node_id: String,
    pub port: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub class_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Connection {
    pub fn new(node_id: impl Into<String>, port: usize) -> Self {
        Self {
            node_id: node_id.into(),
            port,
            class_names: Vec::new(),
            notes: None,
        }
    }

    pub fn with_class_names(mut self, class_names: Vec<String>) -> Self {
        self.class_names = class_names;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Same opposite endpoint (class names and notes are ignored).
    pub fn matches(&self, node_id: &str, port: usize) -> bool {
        self.node_id == node_id && self.port == port
    }
}

/// Value of a port's `connection` field when present.
///
/// `Single` is the degenerate single-link shape: once a port holds a bare
/// connection, the editor will not add another one to it. `Many` ports accept
/// any number of links.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PortConnection {
    Single(Connection),
    Many(Vec<Connection>),
}

impl PortConnection {
    pub fn as_slice(&self) -> &[Connection] {
        match self {
            PortConnection::Single(connection) => std::slice::from_ref(connection),
            PortConnection::Many(connections) => connections,
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Connection> {
        self.as_slice().iter()
    }

    pub fn is_single(&self) -> bool {
        matches!(self, PortConnection::Single(_))
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    pub fn contains(&self, node_id: &str, port: usize) -> bool {
        self.iter().any(|c| c.matches(node_id, port))
    }

    /// Any connection pointing at `node_id`, regardless of port.
    pub fn references_node(&self, node_id: &str) -> bool {
        self.iter().any(|c| c.node_id == node_id)
    }

    pub fn find(&self, node_id: &str, port: usize) -> Option<&Connection> {
        self.iter().find(|c| c.matches(node_id, port))
    }
}

/// A named attachment point on a node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Port {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection: Option<PortConnection>,
}

impl Port {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            connection: None,
        }
    }

    /// A port whose connection field is an (initially empty or given) array.
    pub fn multi(name: impl Into<String>, connections: Vec<Connection>) -> Self {
        Self {
            name: name.into(),
            connection: Some(PortConnection::Many(connections)),
        }
    }

    /// A port holding exactly one bare connection.
    pub fn single(name: impl Into<String>, connection: Connection) -> Self {
        Self {
            name: name.into(),
            connection: Some(PortConnection::Single(connection)),
        }
    }

    pub fn connections(&self) -> &[Connection] {
        self.connection.as_ref().map(PortConnection::as_slice).unwrap_or(&[])
    }

    pub fn is_connected(&self) -> bool {
        !self.connections().is_empty()
    }

    /// True when the field holds a bare single connection.
    pub fn is_singly_occupied(&self) -> bool {
        self.connection.as_ref().is_some_and(PortConnection::is_single)
    }
}

/// A node of the graph. `P` is the host's payload type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node<P = serde_json::Value> {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub name: String,
    pub payload: P,
    #[serde(default)]
    pub inputs: Vec<Port>,
    #[serde(default)]
    pub outputs: Vec<Port>,
    /// Initial position hint, only read when the node first becomes known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Vector2d>,
    /// Host-controlled collapse flag; overrides the editor's own state when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_collapsed: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub class_names: Vec<String>,
}

impl<P> Node<P> {
    pub fn new(
        id: impl Into<String>,
        node_type: impl Into<String>,
        name: impl Into<String>,
        payload: P,
    ) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            name: name.into(),
            payload,
            inputs: Vec::new(),
            outputs: Vec::new(),
            position: None,
            is_collapsed: None,
            class_names: Vec::new(),
        }
    }

    pub fn with_inputs(mut self, inputs: Vec<Port>) -> Self {
        self.inputs = inputs;
        self
    }

    pub fn with_outputs(mut self, outputs: Vec<Port>) -> Self {
        self.outputs = outputs;
        self
    }

    pub fn with_position(mut self, position: Vector2d) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_collapsed(mut self, collapsed: bool) -> Self {
        self.is_collapsed = Some(collapsed);
        self
    }

    pub fn with_class_names(mut self, class_names: Vec<String>) -> Self {
        self.class_names = class_names;
        self
    }

    pub fn ports(&self, kind: PortKind) -> &[Port] {
        match kind {
            PortKind::Input => &self.inputs,
            PortKind::Output => &self.outputs,
        }
    }

    pub fn port(&self, kind: PortKind, index: usize) -> Option<&Port> {
        self.ports(kind).get(index)
    }

    pub fn port_mut(&mut self, kind: PortKind, index: usize) -> Option<&mut Port> {
        match kind {
            PortKind::Input => self.inputs.get_mut(index),
            PortKind::Output => self.outputs.get_mut(index),
        }
    }

    /// All endpoints of this node, inputs first.
    pub fn endpoints(&self) -> impl Iterator<Item = Endpoint> + '_ {
        let inputs = (0..self.inputs.len()).map(|i| Endpoint::input(self.id.clone(), i));
        let outputs = (0..self.outputs.len()).map(|i| Endpoint::output(self.id.clone(), i));
        inputs.chain(outputs)
    }
}

/// Look up a node by id.
pub fn find_node<'a, P>(nodes: &'a [Node<P>], id: &str) -> Option<&'a Node<P>> {
    nodes.iter().find(|n| n.id == id)
}

pub fn find_node_mut<'a, P>(nodes: &'a mut [Node<P>], id: &str) -> Option<&'a mut Node<P>> {
    nodes.iter_mut().find(|n| n.id == id)
}

/// Resolve the port an endpoint names, if both node and port exist.
pub fn find_port<'a, P>(nodes: &'a [Node<P>], endpoint: &Endpoint) -> Option<&'a Port> {
    find_node(nodes, &endpoint.node_id)?.port(endpoint.kind, endpoint.port)
}
