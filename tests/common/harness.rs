//! Test harness around an [`Editor`] holding the A -> B -> C graph.
//!
//! Provides the fixture, change tracking and helper methods for simulating
//! user interactions in client coordinates.

#![allow(dead_code)]

use super::{ChangeTracker, CommitMode};
use flow_editor::{
    Editor, EditorConfig, Endpoint, Key, Node, PointerEvent, PointerTarget, Port, PortKind, Rect, Size,
    Vector2d, WheelEvent,
};
use serde_json::json;

/// Client position of the editor's top-left corner.
pub const EDITOR_ORIGIN: Vector2d = Vector2d::new(20.0, 30.0);
pub const EDITOR_SIZE: Size = Size::new(1000.0, 800.0);

/// Three nodes: `a` (one output) feeds `b` input 0, `b` (two inputs, one
/// output) feeds `c` input 0. `c`'s input holds a bare single connection.
///
/// Placed at (50, 100), (300, 100) and (550, 100).
pub fn chain_nodes() -> Vec<Node> {
    serde_json::from_value(json!([
        {
            "id": "a",
            "type": "const",
            "name": "A",
            "payload": {"value": 2},
            "position": {"x": 50.0, "y": 100.0},
            "outputs": [{"name": "value", "connection": [{"nodeId": "b", "port": 0}]}]
        },
        {
            "id": "b",
            "type": "add",
            "name": "B",
            "payload": null,
            "position": {"x": 300.0, "y": 100.0},
            "inputs": [
                {"name": "lhs", "connection": [{"nodeId": "a", "port": 0}]},
                {"name": "rhs", "connection": []}
            ],
            "outputs": [{"name": "sum", "connection": [{"nodeId": "c", "port": 0}]}]
        },
        {
            "id": "c",
            "type": "print",
            "name": "C",
            "payload": null,
            "position": {"x": 550.0, "y": 100.0},
            "inputs": [{"name": "in", "connection": {"nodeId": "b", "port": 0}}]
        }
    ]))
    .expect("fixture is valid node JSON")
}

/// Test harness for the editor.
pub struct EditorHarness {
    pub editor: Editor,
    pub tracker: ChangeTracker,
}

impl EditorHarness {
    /// The chain graph with no change listener: every change applies at once.
    pub fn new() -> Self {
        Self::with_config(chain_nodes(), EditorConfig::default())
    }

    /// The chain graph with a tracking listener.
    pub fn with_listener(mode: CommitMode) -> Self {
        let tracker = ChangeTracker::new();
        let config = EditorConfig::default().with_listener(tracker.listener(mode));
        Self::with_tracker(chain_nodes(), config, tracker)
    }

    /// The chain graph in demo mode with a tracking listener.
    pub fn demo(mode: CommitMode) -> Self {
        let tracker = ChangeTracker::new();
        let config = EditorConfig::default()
            .with_listener(tracker.listener(mode))
            .with_demo_mode(true);
        Self::with_tracker(chain_nodes(), config, tracker)
    }

    pub fn with_config(nodes: Vec<Node>, config: EditorConfig) -> Self {
        Self::with_tracker(nodes, config, ChangeTracker::new())
    }

    fn with_tracker(nodes: Vec<Node>, config: EditorConfig, tracker: ChangeTracker) -> Self {
        let mut editor = Editor::new(nodes, config);
        editor.set_editor_rect(Rect::new(
            EDITOR_ORIGIN,
            Vector2d::new(EDITOR_SIZE.width, EDITOR_SIZE.height),
        ));
        editor.set_component_size(EDITOR_SIZE);
        editor.settle();
        Self { editor, tracker }
    }

    // === Coordinates ===

    /// Client position of a world point.
    pub fn to_client(&self, world: Vector2d) -> Vector2d {
        self.editor.state().transform().to_screen(world) + EDITOR_ORIGIN
    }

    pub fn position(&self, id: &str) -> Vector2d {
        self.editor.positions()[id]
    }

    pub fn anchor_client(&self, endpoint: &Endpoint) -> Vector2d {
        let anchor = self
            .editor
            .state()
            .anchor(endpoint)
            .expect("anchor of a known port");
        self.to_client(anchor)
    }

    /// A point inside the node's header, left of the expander.
    pub fn header_client(&self, id: &str) -> Vector2d {
        self.to_client(self.position(id) + Vector2d::new(10.0, 10.0))
    }

    /// A point inside the node's body.
    pub fn body_client(&self, id: &str) -> Vector2d {
        self.to_client(self.position(id) + Vector2d::new(20.0, 60.0))
    }

    /// A point inside the expander icon.
    pub fn expander_client(&self, id: &str) -> Vector2d {
        self.to_client(self.position(id) + Vector2d::new(90.0, 10.0))
    }

    // === Interactions ===

    pub fn press(&mut self, at: Vector2d) -> PointerTarget {
        let target = self.editor.target_at(at);
        self.editor.pointer_down(PointerEvent::primary(at.x, at.y), &target);
        target
    }

    pub fn move_to(&mut self, at: Vector2d) {
        self.editor.pointer_move(PointerEvent::primary(at.x, at.y));
    }

    pub fn release(&mut self, at: Vector2d) -> PointerTarget {
        let target = self.editor.target_at(at);
        self.editor.pointer_up(PointerEvent::primary(at.x, at.y), &target);
        target
    }

    /// Drag a node by its header, by a client-space delta.
    pub fn drag_node(&mut self, id: &str, delta: Vector2d) {
        let start = self.header_client(id);
        let end = start + delta;
        self.press(start);
        self.move_to(end);
        self.release(end);
    }

    /// Drag from one port's dot and release over another's.
    pub fn drag_connection(&mut self, from: &Endpoint, to: &Endpoint) {
        let start = self.anchor_client(from);
        let end = self.anchor_client(to);
        self.press(start);
        self.move_to(end);
        self.release(end);
    }

    pub fn click_at(&mut self, at: Vector2d) -> PointerTarget {
        let target = self.editor.target_at(at);
        self.editor.click(&target);
        target
    }

    /// Press and click on the node header, as a real click does.
    pub fn click_node(&mut self, id: &str) {
        let at = self.header_client(id);
        self.press(at);
        self.release(at);
        self.click_at(at);
    }

    pub fn press_background(&mut self) {
        self.press(EDITOR_ORIGIN + Vector2d::new(950.0, 750.0));
    }

    pub fn press_delete(&mut self) {
        self.editor.key_down(Key::Delete);
    }

    pub fn wheel(&mut self, at: Vector2d, delta_y: f32) {
        self.editor.wheel(WheelEvent::new(at.x, at.y, delta_y));
    }

    // === Graph lookups ===

    pub fn node(&self, id: &str) -> &Node {
        self.editor
            .nodes()
            .iter()
            .find(|n| n.id == id)
            .expect("node exists")
    }

    pub fn port(&self, endpoint: &Endpoint) -> &Port {
        let node = self.node(&endpoint.node_id);
        match endpoint.kind {
            PortKind::Input => &node.inputs[endpoint.port],
            PortKind::Output => &node.outputs[endpoint.port],
        }
    }

    pub fn connection_count(&self) -> usize {
        self.editor.connections().len()
    }
}
