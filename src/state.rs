use std::collections::HashMap;

use crate::endpoint::Endpoint;
use crate::geometry::{Rect, Size, Vector2d};
use crate::layout::{InitialLayout, NodeState};
use crate::selection::SelectionManager;

/// Viewport transform: `screen = zoom * world + (dx, dy)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub dx: f32,
    pub dy: f32,
    pub zoom: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            dx: 0.0,
            dy: 0.0,
            zoom: 1.0,
        }
    }
}

impl Transform {
    /// Editor-local screen point to world space.
    pub fn to_world(&self, local: Vector2d) -> Vector2d {
        Vector2d::new((local.x - self.dx) / self.zoom, (local.y - self.dy) / self.zoom)
    }

    /// World point to editor-local screen space.
    pub fn to_screen(&self, world: Vector2d) -> Vector2d {
        Vector2d::new(world.x * self.zoom + self.dx, world.y * self.zoom + self.dy)
    }

    /// Multiply the zoom by `factor`, keeping the world point under the
    /// editor-local `center` fixed.
    pub fn zoom_at(&mut self, center: Vector2d, factor: f32) {
        let zoom = self.zoom * factor;
        let ratio = zoom / self.zoom;
        self.dx = center.x - (center.x - self.dx) * ratio;
        self.dy = center.y - (center.y - self.dy) * ratio;
        self.zoom = zoom;
    }
}

/// The in-progress connection drawn while dragging from a port.
#[derive(Clone, Debug, PartialEq)]
pub struct WorkingConnection {
    /// Port the drag started on.
    pub origin: Endpoint,
    pub output: Vector2d,
    pub input: Vector2d,
}

/// Geometry and view state owned by the editor.
///
/// Port anchor offsets and the component size are reported by the renderer
/// while it draws a frame, so they are queued and only applied by
/// [`EditorState::settle`] at the start of the next frame.
#[derive(Debug, Default)]
pub struct EditorState {
    pub(crate) node_states: HashMap<String, NodeState>,
    /// Anchor offset of each port relative to its node.
    pub(crate) connection_state: HashMap<Endpoint, Vector2d>,
    pending_offsets: HashMap<Endpoint, Vector2d>,
    pending_size: Option<Size>,
    pub(crate) selection: SelectionManager,
    pub(crate) working: Option<WorkingConnection>,
    pub(crate) transform: Transform,
    pub(crate) component_size: Size,
    pub(crate) editor_rect: Option<Rect>,
}

impl EditorState {
    pub fn new(initial: InitialLayout) -> Self {
        Self {
            node_states: initial.node_states,
            connection_state: initial.anchors,
            ..Default::default()
        }
    }

    pub fn node_state(&self, id: &str) -> Option<&NodeState> {
        self.node_states.get(id)
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn component_size(&self) -> Size {
        self.component_size
    }

    pub fn editor_rect(&self) -> Option<Rect> {
        self.editor_rect
    }

    pub fn working_connection(&self) -> Option<&WorkingConnection> {
        self.working.as_ref()
    }

    /// Anchor offset of a port relative to its node.
    pub fn anchor_offset(&self, endpoint: &Endpoint) -> Option<Vector2d> {
        self.connection_state.get(endpoint).copied()
    }

    /// Absolute anchor position of a port in world space.
    pub fn anchor(&self, endpoint: &Endpoint) -> Option<Vector2d> {
        let offset = self.connection_state.get(endpoint)?;
        let node = self.node_states.get(&endpoint.node_id)?;
        Some(*offset + node.pos)
    }

    /// Client point to editor-local screen space.
    pub fn client_to_local(&self, client: Vector2d) -> Vector2d {
        match self.editor_rect {
            Some(rect) => client - rect.pos,
            None => client,
        }
    }

    /// Client point to world space.
    pub fn client_to_world(&self, client: Vector2d) -> Vector2d {
        self.transform.to_world(self.client_to_local(client))
    }

    /// Queue the measured client rect of a port's dot.
    ///
    /// The stored offset is the dot centre in world space, relative to the
    /// node, floored. Unknown nodes are ignored.
    pub fn report_port_anchor(&mut self, endpoint: Endpoint, client_rect: Rect) {
        let Some(node) = self.node_states.get(&endpoint.node_id) else {
            return;
        };
        let offset = (self.client_to_world(client_rect.center()) - node.pos).floor();

        let current = self
            .pending_offsets
            .get(&endpoint)
            .or_else(|| self.connection_state.get(&endpoint));
        if current.is_some_and(|c| Vector2d::compare(*c, offset)) {
            return;
        }
        tracing::trace!(%endpoint, x = offset.x, y = offset.y, "port anchor moved");
        self.pending_offsets.insert(endpoint, offset);
    }

    /// Queue the measured size of the editor component, floored. Sizes below
    /// one pixel in either dimension are ignored.
    pub fn set_component_size(&mut self, size: Size) {
        let size = Size::new(size.width.floor(), size.height.floor());
        if size.width < 1.0 || size.height < 1.0 {
            return;
        }
        if self.pending_size.is_none() && self.component_size == size {
            return;
        }
        self.pending_size = Some(size);
    }

    pub fn set_editor_rect(&mut self, rect: Rect) {
        self.editor_rect = Some(rect);
    }

    /// Store the measured size of a node. Unknown nodes are ignored.
    pub fn report_node_size(&mut self, id: &str, size: Vector2d) {
        if let Some(state) = self.node_states.get_mut(id) {
            state.size = size;
        }
    }

    /// Apply queued measurements. Returns `true` if anything changed.
    pub fn settle(&mut self) -> bool {
        let mut changed = false;
        for (endpoint, offset) in self.pending_offsets.drain() {
            changed |= self.connection_state.insert(endpoint, offset) != Some(offset);
        }
        if let Some(size) = self.pending_size.take() {
            changed |= self.component_size != size;
            self.component_size = size;
        }
        changed
    }

    pub fn has_pending(&self) -> bool {
        !self.pending_offsets.is_empty() || self.pending_size.is_some()
    }

    /// Forget a node's state and its anchors.
    pub(crate) fn remove_node(&mut self, id: &str) {
        self.node_states.remove(id);
        self.connection_state.retain(|endpoint, _| endpoint.node_id != id);
        self.pending_offsets.retain(|endpoint, _| endpoint.node_id != id);
    }
}
