//! The interactive editor: turns pointer and keyboard events into graph
//! mutations over a host-owned node list.
//!
//! Renderers that deliver per-element events pass the element they hit as a
//! [`PointerTarget`]; renderers that only know raw positions resolve it with
//! [`Editor::target_at`]. All event positions are client coordinates.
//!
//! ```ignore
//! let mut editor = Editor::new(nodes, EditorConfig::default());
//! editor.set_editor_rect(Rect::new(Vector2d::new(0.0, 0.0), Vector2d::new(800.0, 600.0)));
//!
//! let target = editor.target_at(Vector2d::new(120.0, 115.0));
//! editor.pointer_down(PointerEvent::primary(120.0, 115.0), &target);
//! editor.pointer_move(PointerEvent::primary(160.0, 140.0));
//! editor.pointer_up(PointerEvent::primary(160.0, 140.0), &PointerTarget::Background);
//!
//! let frame = editor.render(|node| node.name.clone());
//! ```

use std::collections::HashMap;

use rand::distr::Alphanumeric;
use rand::Rng;

use crate::change::{ChangeAction, Mutation, PendingCommit};
use crate::config::{DragHandler, EditorConfig};
use crate::endpoint::{ConnectionId, Endpoint, PortKind};
use crate::geometry::{Rect, Size, Vector2d};
use crate::graph::{
    attach_connection, check_connection, corresponding_connections, derive_connections, detach_connection, detach_node,
    normalize_direction, ConnectionInfo, ValidationError, ValidationResult,
};
use crate::hit_test::{
    find_connection_at, find_node_at, find_port_at, ConnectionGeometry, NodeGeometry, NodeRegion, PortGeometry,
    CONNECTION_HIT_TOLERANCE, HEADER_HEIGHT, PORT_HIT_RADIUS,
};
use crate::layout::{adjust, initial_layout, seed_anchors, NodeState};
use crate::model::{find_node, find_node_mut, Node};
use crate::palette::PaletteHandle;
use crate::selection::Selection;
use crate::state::{EditorState, WorkingConnection};

/// Length of the random suffix of generated node ids.
const NODE_ID_SUFFIX_LEN: usize = 6;

/// Zoom step per wheel notch.
const ZOOM_STEP: f32 = 1.25;

// ============================================================================
// Events
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Middle,
    Secondary,
    Other,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    /// Client position.
    pub position: Vector2d,
    pub button: PointerButton,
}

impl PointerEvent {
    pub fn new(x: f32, y: f32, button: PointerButton) -> Self {
        Self {
            position: Vector2d::new(x, y),
            button,
        }
    }

    pub fn primary(x: f32, y: f32) -> Self {
        Self::new(x, y, PointerButton::Primary)
    }

    pub fn middle(x: f32, y: f32) -> Self {
        Self::new(x, y, PointerButton::Middle)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub control: bool,
    pub shift: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WheelEvent {
    pub position: Vector2d,
    pub delta_y: f32,
    pub modifiers: Modifiers,
}

impl WheelEvent {
    pub fn new(x: f32, y: f32, delta_y: f32) -> Self {
        Self {
            position: Vector2d::new(x, y),
            delta_y,
            modifiers: Modifiers::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Delete,
    Other,
}

/// The element under the pointer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PointerTarget {
    Background,
    NodeHeader(String),
    NodeBody(String),
    /// The collapse toggle in a node header.
    NodeExpander(String),
    Port(Endpoint),
    Connection(ConnectionId),
}

/// The gesture in progress.
#[derive(Clone, Debug, PartialEq)]
pub enum CurrentAction {
    DraggingNode { node_id: String, last_pos: Vector2d },
    DraggingConnection { endpoint: Endpoint, last_pos: Vector2d },
    Panning { last_pos: Vector2d },
}

impl CurrentAction {
    fn last_pos_mut(&mut self) -> &mut Vector2d {
        match self {
            CurrentAction::DraggingNode { last_pos, .. }
            | CurrentAction::DraggingConnection { last_pos, .. }
            | CurrentAction::Panning { last_pos } => last_pos,
        }
    }
}

// ============================================================================
// Editor
// ============================================================================

/// Node-graph editor over a node list of payload type `P`.
#[derive(Debug)]
pub struct Editor<P = serde_json::Value> {
    pub(crate) nodes: Vec<Node<P>>,
    pub(crate) config: EditorConfig<P>,
    pub(crate) state: EditorState,
    pub(crate) current_action: Option<CurrentAction>,
    pub(crate) palette: PaletteHandle<P>,
}

impl<P: Clone> Editor<P> {
    /// Create an editor and lay out the initial nodes.
    pub fn new(nodes: Vec<Node<P>>, config: EditorConfig<P>) -> Self {
        let layout = initial_layout(&nodes, config.direction);
        tracing::debug!(nodes = nodes.len(), "editor created");
        Self {
            nodes,
            config,
            state: EditorState::new(layout),
            current_action: None,
            palette: PaletteHandle::default(),
        }
    }

    pub fn nodes(&self) -> &[Node<P>] {
        &self.nodes
    }

    /// Host access to the node list, for changes made outside the editor.
    /// New nodes are placed on the next [`Editor::render`].
    pub fn nodes_mut(&mut self) -> &mut Vec<Node<P>> {
        &mut self.nodes
    }

    pub fn into_nodes(self) -> Vec<Node<P>> {
        self.nodes
    }

    pub fn config(&self) -> &EditorConfig<P> {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut EditorConfig<P> {
        &mut self.config
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.state.selection.current()
    }

    pub fn current_action(&self) -> Option<&CurrentAction> {
        self.current_action.as_ref()
    }

    // === Pointer and keyboard events ===

    pub fn pointer_down(&mut self, event: PointerEvent, target: &PointerTarget) {
        let pos = event.position;
        match (event.button, target) {
            (PointerButton::Middle, _) => {
                self.current_action = Some(CurrentAction::Panning { last_pos: pos });
            }
            (PointerButton::Primary, PointerTarget::Background) => {
                self.deselect();
            }
            (PointerButton::Primary, PointerTarget::NodeHeader(id)) => {
                self.start_node_drag(id, pos);
            }
            (PointerButton::Primary, PointerTarget::NodeBody(id)) if self.config.drag_handler == DragHandler::Body => {
                self.start_node_drag(id, pos);
            }
            (PointerButton::Primary, PointerTarget::Port(endpoint)) => {
                tracing::trace!(%endpoint, "connection drag started");
                self.current_action = Some(CurrentAction::DraggingConnection {
                    endpoint: endpoint.clone(),
                    last_pos: pos,
                });
            }
            _ => {}
        }
    }

    fn start_node_drag(&mut self, id: &str, pos: Vector2d) {
        tracing::trace!(node_id = id, "node drag started");
        self.current_action = Some(CurrentAction::DraggingNode {
            node_id: id.to_string(),
            last_pos: pos,
        });
    }

    pub fn pointer_move(&mut self, event: PointerEvent) {
        let Some(mut action) = self.current_action.take() else {
            return;
        };
        let pos = event.position;
        let delta = pos - *action.last_pos_mut();

        match &action {
            CurrentAction::DraggingNode { node_id, .. } => {
                let zoom = self.state.transform.zoom;
                if let Some(state) = self.state.node_states.get_mut(node_id) {
                    state.pos.x += delta.x / zoom;
                    state.pos.y += delta.y / zoom;
                    tracing::trace!(node_id = %node_id, x = state.pos.x, y = state.pos.y, "node dragged");
                }
            }
            CurrentAction::DraggingConnection { endpoint, .. } => {
                self.update_working_connection(endpoint, pos);
            }
            CurrentAction::Panning { .. } => {
                self.state.transform.dx += delta.x;
                self.state.transform.dy += delta.y;
                tracing::trace!(dx = self.state.transform.dx, dy = self.state.transform.dy, "viewport panned");
            }
        }

        *action.last_pos_mut() = pos;
        self.current_action = Some(action);
    }

    fn update_working_connection(&mut self, origin: &Endpoint, pointer: Vector2d) {
        let Some(fixed) = self.state.anchor(origin) else {
            tracing::trace!(endpoint = %origin, "no anchor for connection origin yet");
            return;
        };
        let free = self.state.client_to_world(pointer);
        let (output, input) = match origin.kind {
            PortKind::Input => (free, fixed),
            PortKind::Output => (fixed, free),
        };
        self.state.working = Some(WorkingConnection {
            origin: origin.clone(),
            output,
            input,
        });
    }

    /// End the current gesture. Releasing a connection drag over a port
    /// tries to connect the two ports.
    pub fn pointer_up(&mut self, _event: PointerEvent, target: &PointerTarget) {
        if let (Some(CurrentAction::DraggingConnection { endpoint, .. }), PointerTarget::Port(other)) =
            (&self.current_action, target)
        {
            let (a, b) = (endpoint.clone(), other.clone());
            let _ = self.create_connection(a, b);
        }
        self.end_gesture();
    }

    /// The pointer left the editor: the gesture ends without connecting.
    pub fn pointer_leave(&mut self) {
        self.end_gesture();
    }

    fn end_gesture(&mut self) {
        self.current_action = None;
        self.state.working = None;
    }

    pub fn click(&mut self, target: &PointerTarget) {
        match target {
            PointerTarget::NodeHeader(id) | PointerTarget::NodeBody(id) => self.select_node(id),
            PointerTarget::NodeExpander(id) => {
                self.toggle_collapse(id);
                self.select_node(id);
            }
            PointerTarget::Connection(id) => self.select_connection(id.clone()),
            PointerTarget::Background | PointerTarget::Port(_) => {}
        }
    }

    pub fn double_click(&mut self, target: &PointerTarget) {
        match target {
            PointerTarget::NodeHeader(id) => {
                self.toggle_collapse(id);
            }
            PointerTarget::NodeBody(id) if self.config.drag_handler == DragHandler::Body => {
                self.toggle_collapse(id);
            }
            _ => {}
        }
    }

    /// Zoom around the cursor. Ignored with ctrl held or zoom disabled.
    pub fn wheel(&mut self, event: WheelEvent) {
        if event.modifiers.control || self.config.disable_zoom || event.delta_y == 0.0 {
            return;
        }
        let factor = ZOOM_STEP.powf(event.delta_y.signum());
        let center = self.state.client_to_local(event.position);
        self.state.transform.zoom_at(center, factor);
        tracing::trace!(zoom = self.state.transform.zoom, "zoomed");
    }

    pub fn key_down(&mut self, key: Key) {
        if key != Key::Delete || self.state.selection.is_empty() {
            return;
        }
        self.delete_selection();
        // Always reported after a delete, even if the removal already cleared it
        self.propose(ChangeAction::NodeDeselected, Mutation::Deselect);
    }

    fn delete_selection(&mut self) {
        match self.state.selection.current().cloned() {
            Some(Selection::Connection(id)) => self.remove_connection(id.input, id.output),
            Some(Selection::Node(id)) => self.remove_node(&id),
            None => {}
        }
    }

    // === Graph operations ===

    /// Propose a link between two ports, given in either order.
    ///
    /// Rejected links change nothing and emit no event.
    pub fn create_connection(&mut self, a: Endpoint, b: Endpoint) -> ValidationResult {
        let Some((input, output)) = normalize_direction(a, b) else {
            tracing::debug!("connection rejected: both ends have the same direction");
            return ValidationResult::Invalid(ValidationError::IncompatibleDirection);
        };
        let result = check_connection(&self.nodes, &input, &output, self.config.connection_validator.as_deref());
        if let ValidationResult::Invalid(reason) = &result {
            tracing::debug!(%input, %output, %reason, "connection rejected");
            return result;
        }
        self.propose(
            ChangeAction::ConnectionCreated {
                input: input.clone(),
                output: output.clone(),
            },
            Mutation::CreateConnection { input, output },
        );
        result
    }

    pub fn remove_connection(&mut self, input: Endpoint, output: Endpoint) {
        let id = ConnectionId::new(input.clone(), output.clone());
        self.propose(
            ChangeAction::ConnectionRemoved {
                id: id.to_string(),
                input: input.clone(),
                output: output.clone(),
            },
            Mutation::RemoveConnection { input, output },
        );
    }

    /// Propose removing a node and every link touching it.
    pub fn remove_node(&mut self, id: &str) {
        if find_node(&self.nodes, id).is_none() {
            tracing::debug!(node_id = id, "cannot remove unknown node");
            return;
        }
        let connections = corresponding_connections(&self.nodes, id);
        self.propose(
            ChangeAction::NodeRemoved {
                id: id.to_string(),
                corresponding_connections: connections.clone(),
            },
            Mutation::RemoveNode {
                id: id.to_string(),
                connections,
            },
        );
    }

    /// Propose a node built from `prototype`, dropped at a client position.
    ///
    /// Returns the generated id, or `None` when the drop point is outside
    /// the editor.
    pub fn create_node(&mut self, mut prototype: Node<P>, drop_point: Vector2d) -> Option<String> {
        let rect = self.state.editor_rect.unwrap_or_else(|| {
            let size = self.state.component_size;
            Rect::new(Vector2d::ZERO, Vector2d::new(size.width, size.height))
        });
        if !rect.hit(drop_point) {
            tracing::debug!(x = drop_point.x, y = drop_point.y, "node dropped outside the editor");
            return None;
        }
        let pos = self.state.transform.to_world(drop_point - rect.pos);

        let id = self.generate_node_id(&prototype.node_type);
        prototype.id = id.clone();
        let state = NodeState::new(pos, true);

        if self.config.is_host_driven() {
            // Known before the host adds the node, so it is not re-laid out
            for (endpoint, offset) in seed_anchors(&prototype, state.size, self.config.direction) {
                self.state.connection_state.entry(endpoint).or_insert(offset);
            }
            self.state.node_states.insert(id.clone(), state);
        }
        self.propose(
            ChangeAction::NodeCreated {
                node: prototype.clone(),
            },
            Mutation::CreateNode { node: prototype, state },
        );
        Some(id)
    }

    fn generate_node_id(&self, node_type: &str) -> String {
        loop {
            let suffix: String = rand::rng()
                .sample_iter(&Alphanumeric)
                .take(NODE_ID_SUFFIX_LEN)
                .map(char::from)
                .collect();
            let id = format!("{}_{}", node_type, suffix);
            if find_node(&self.nodes, &id).is_none() && !self.state.node_states.contains_key(&id) {
                return id;
            }
        }
    }

    /// Propose flipping a node's collapsed state. Returns the desired state,
    /// or `None` for an unknown node.
    pub fn toggle_collapse(&mut self, id: &str) -> Option<bool> {
        let node = find_node(&self.nodes, id)?;
        let desired = match node.is_collapsed {
            Some(collapsed) => !collapsed,
            None => !self.state.node_states.get(id)?.is_collapsed,
        };
        self.propose(
            ChangeAction::NodeCollapseChanged {
                id: id.to_string(),
                should_be_collapsed: desired,
            },
            Mutation::SetCollapsed {
                id: id.to_string(),
                collapsed: desired,
            },
        );
        Some(desired)
    }

    /// Propose selecting a node. Selecting the current selection again does
    /// nothing.
    pub fn select_node(&mut self, id: &str) {
        if self.state.selection.is_node_selected(id) {
            return;
        }
        let Some(node) = find_node(&self.nodes, id) else {
            return;
        };
        let action = ChangeAction::NodeSelected { node: node.clone() };
        self.propose(action, Mutation::Select(Selection::Node(id.to_string())));
    }

    /// Select a link. Link selection is view state only and applies at once.
    pub fn select_connection(&mut self, id: ConnectionId) {
        if self.state.selection.select(Selection::Connection(id)) {
            tracing::debug!("connection selected");
        }
    }

    /// Propose clearing the selection. Nothing happens when it is empty.
    pub fn deselect(&mut self) {
        if self.state.selection.is_empty() {
            return;
        }
        self.propose(ChangeAction::NodeDeselected, Mutation::Deselect);
    }

    // === Change protocol ===

    fn propose(&mut self, action: ChangeAction<P>, mutation: Mutation<P>) {
        tracing::debug!(action = action.name(), "change proposed");
        let demo_mode = self.config.demo_mode;
        let Some(listener) = self.config.on_changed.as_mut() else {
            self.apply(mutation);
            return;
        };
        if demo_mode {
            let _ = listener(&action, PendingCommit::settled());
            self.apply(mutation);
            return;
        }
        if let Some(pending) = listener(&action, PendingCommit::new(mutation)) {
            self.commit(pending);
        }
    }

    /// Apply a change the listener kept. Returns `false` when the commit was
    /// already settled or no longer applies.
    pub fn commit(&mut self, mut pending: PendingCommit<P>) -> bool {
        match pending.mutation.take() {
            Some(mutation) => self.apply(mutation),
            None => false,
        }
    }

    fn apply(&mut self, mutation: Mutation<P>) -> bool {
        match mutation {
            Mutation::CreateNode { node, state } => {
                if find_node(&self.nodes, &node.id).is_some() {
                    tracing::warn!(node_id = %node.id, "node already exists, not created again");
                    return false;
                }
                for (endpoint, offset) in seed_anchors(&node, state.size, self.config.direction) {
                    self.state.connection_state.entry(endpoint).or_insert(offset);
                }
                self.state.node_states.insert(node.id.clone(), state);
                self.nodes.push(node);
                true
            }
            Mutation::RemoveNode { id, connections } => {
                for connection in &connections {
                    detach_connection(&mut self.nodes, &connection.input, &connection.output);
                }
                // Duplicate links leave more than one half per listed id
                let leftover = detach_node(&mut self.nodes, &id);
                if leftover > 0 {
                    tracing::debug!(node_id = %id, leftover, "dropped remaining links to removed node");
                }
                let before = self.nodes.len();
                self.nodes.retain(|n| n.id != id);
                self.state.remove_node(&id);
                let stale = match self.state.selection.current() {
                    Some(Selection::Node(selected)) => *selected == id,
                    Some(Selection::Connection(selected)) => selected.touches(&id),
                    None => false,
                };
                if stale {
                    self.state.selection.clear();
                }
                self.nodes.len() != before
            }
            Mutation::CreateConnection { input, output } => attach_connection(&mut self.nodes, &input, &output),
            Mutation::RemoveConnection { input, output } => {
                let id = ConnectionId::new(input, output);
                if self.state.selection.is_connection_selected(&id) {
                    self.state.selection.clear();
                }
                detach_connection(&mut self.nodes, &id.input, &id.output)
            }
            Mutation::SetCollapsed { id, collapsed } => {
                if let Some(node) = find_node_mut(&mut self.nodes, &id) {
                    if node.is_collapsed.is_some() {
                        node.is_collapsed = Some(collapsed);
                    }
                }
                match self.state.node_states.get_mut(&id) {
                    Some(state) => {
                        state.is_collapsed = collapsed;
                        true
                    }
                    None => false,
                }
            }
            Mutation::Select(item) => self.state.selection.select(item),
            Mutation::Deselect => self.state.selection.clear().is_some(),
        }
    }

    // === Frame bookkeeping ===

    /// Apply deferred measurements, pick up palette drops and place nodes
    /// the editor has not seen yet. [`Editor::render`] calls this first.
    pub fn settle(&mut self) -> bool {
        self.process_palette_drops();
        let mut changed = self.state.settle();

        let placed = adjust(&self.state.node_states, self.state.component_size, &self.nodes);
        if !placed.is_empty() {
            changed = true;
            for node in self.nodes.iter().filter(|n| placed.contains_key(&n.id)) {
                let size = placed[&node.id].size;
                for (endpoint, offset) in seed_anchors(node, size, self.config.direction) {
                    self.state.connection_state.entry(endpoint).or_insert(offset);
                }
            }
            self.state.node_states.extend(placed);
        }
        changed
    }

    /// Handle for a palette feeding this editor.
    pub fn palette_handle(&self) -> PaletteHandle<P> {
        self.palette.clone()
    }

    /// Turn queued palette drops into node proposals. Returns the generated
    /// ids of drops that landed inside the editor.
    pub fn process_palette_drops(&mut self) -> Vec<String> {
        self.palette
            .take_all()
            .into_iter()
            .filter_map(|dropped| self.create_node(dropped.prototype, dropped.position))
            .collect()
    }

    // === Queries ===

    /// Links derived from the node list.
    pub fn connections(&self) -> Vec<ConnectionInfo> {
        derive_connections(&self.nodes)
    }

    /// Editor position of every node in the list that has been placed.
    pub fn positions(&self) -> HashMap<String, Vector2d> {
        self.nodes
            .iter()
            .filter_map(|n| self.state.node_states.get(&n.id).map(|s| (n.id.clone(), s.pos)))
            .collect()
    }

    /// Resolve the element under a client position: ports first, then nodes
    /// (topmost wins), then links.
    pub fn target_at(&self, client: Vector2d) -> PointerTarget {
        let point = self.state.client_to_world(client);
        let zoom = self.state.transform.zoom;

        let ports: Vec<PortGeometry> = self
            .nodes
            .iter()
            .flat_map(|n| n.endpoints())
            .filter_map(|endpoint| {
                let position = self.state.anchor(&endpoint)?;
                Some(PortGeometry { endpoint, position })
            })
            .collect();
        if let Some(endpoint) = find_port_at(point, &ports, PORT_HIT_RADIUS / zoom) {
            return PointerTarget::Port(endpoint.clone());
        }

        let nodes: Vec<NodeGeometry> = self
            .nodes
            .iter()
            .filter_map(|n| {
                let state = self.state.node_states.get(&n.id)?;
                Some(NodeGeometry {
                    id: n.id.clone(),
                    rect: state.rect(),
                })
            })
            .collect();
        if let Some((id, region)) = find_node_at(point, &nodes, HEADER_HEIGHT) {
            let id = id.to_string();
            return match region {
                NodeRegion::Expander => PointerTarget::NodeExpander(id),
                NodeRegion::Header => PointerTarget::NodeHeader(id),
                NodeRegion::Body => PointerTarget::NodeBody(id),
            };
        }

        let connections: Vec<ConnectionGeometry> = self
            .connections()
            .into_iter()
            .filter_map(|info| {
                let output = self.state.anchor(info.output())?;
                let input = self.state.anchor(info.input())?;
                Some(ConnectionGeometry {
                    id: info.id,
                    output,
                    input,
                })
            })
            .collect();
        let hit = find_connection_at(
            point,
            &connections,
            CONNECTION_HIT_TOLERANCE / zoom,
            self.config.connection_type,
            self.config.connection_anchors_length,
            self.config.direction,
        );
        match hit {
            Some(id) => PointerTarget::Connection(id.clone()),
            None => PointerTarget::Background,
        }
    }

    // === Renderer measurements ===

    /// Measured client rect of a port dot. Applied on the next frame.
    pub fn report_port_anchor(&mut self, endpoint: Endpoint, client_rect: Rect) {
        self.state.report_port_anchor(endpoint, client_rect);
    }

    pub fn report_node_size(&mut self, id: &str, size: Vector2d) {
        self.state.report_node_size(id, size);
    }

    /// Client rect of the editor surface.
    pub fn set_editor_rect(&mut self, rect: Rect) {
        self.state.set_editor_rect(rect);
    }

    /// Measured size of the editor component. Applied on the next frame.
    pub fn set_component_size(&mut self, size: Size) {
        self.state.set_component_size(size);
    }
}
