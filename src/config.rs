//! Editor configuration.

use std::fmt;

use crate::change::{ChangeAction, ChangeListener, PendingCommit};
use crate::endpoint::{Endpoint, PortKind};
use crate::graph::ConnectionValidator;

/// Shape of rendered connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionType {
    #[default]
    Bezier,
    Linear,
}

/// Background grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Grid {
    Off,
    On {
        /// Spacing between lines, in unzoomed pixels.
        size: f32,
    },
}

impl Default for Grid {
    fn default() -> Self {
        Grid::On { size: 18.0 }
    }
}

impl Grid {
    /// Line spacing, or `None` when the grid is off.
    pub fn spacing(&self) -> Option<f32> {
        match self {
            Grid::Off => None,
            Grid::On { size } => Some(*size),
        }
    }
}

/// Which side of a node its inputs are drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Inputs on the east (right) side, outputs on the west (left) side.
    #[default]
    WestEast,
    /// Inputs on the west side, outputs on the east side.
    EastWest,
}

/// Horizontal side of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Direction {
    pub fn side(&self, kind: PortKind) -> Side {
        match (self, kind) {
            (Direction::WestEast, PortKind::Input) | (Direction::EastWest, PortKind::Output) => Side::Right,
            (Direction::WestEast, PortKind::Output) | (Direction::EastWest, PortKind::Input) => Side::Left,
        }
    }

    /// Sign applied to the bezier control point offset.
    pub fn anchor_sign(&self) -> f32 {
        match self {
            Direction::WestEast => 1.0,
            Direction::EastWest => -1.0,
        }
    }
}

/// Part of a node that starts a node drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragHandler {
    #[default]
    Header,
    /// Header and body.
    Body,
}

/// Configuration for [`crate::Editor`].
///
/// ```ignore
/// let config = EditorConfig::default()
///     .with_connection_validator(|output: &Endpoint, input: &Endpoint| output.node_id != input.node_id)
///     .with_listener(|action, commit| {
///         tracing::info!(action = action.name(), "graph change");
///         Some(commit)
///     });
/// ```
pub struct EditorConfig<P = serde_json::Value> {
    pub connection_validator: Option<Box<dyn ConnectionValidator<P>>>,
    pub on_changed: Option<Box<ChangeListener<P>>>,
    /// Apply every change locally even when a listener is configured.
    pub demo_mode: bool,
    pub connection_type: ConnectionType,
    pub grid: Grid,
    /// Minimum horizontal length of a bezier control arm.
    pub connection_anchors_length: f32,
    pub direction: Direction,
    pub disable_zoom: bool,
    pub drag_handler: DragHandler,
}

impl<P> Default for EditorConfig<P> {
    fn default() -> Self {
        Self {
            connection_validator: None,
            on_changed: None,
            demo_mode: false,
            connection_type: ConnectionType::default(),
            grid: Grid::default(),
            connection_anchors_length: 100.0,
            direction: Direction::default(),
            disable_zoom: false,
            drag_handler: DragHandler::default(),
        }
    }
}

impl<P> EditorConfig<P> {
    pub fn with_validator<V: ConnectionValidator<P> + 'static>(mut self, validator: V) -> Self {
        self.connection_validator = Some(Box::new(validator));
        self
    }

    /// Shorthand for a plain `(output, input) -> bool` predicate.
    pub fn with_connection_validator<F>(self, validator: F) -> Self
    where
        F: Fn(&Endpoint, &Endpoint) -> bool + 'static,
    {
        self.with_validator(validator)
    }

    pub fn with_listener<F>(mut self, listener: F) -> Self
    where
        F: FnMut(&ChangeAction<P>, PendingCommit<P>) -> Option<PendingCommit<P>> + 'static,
    {
        self.on_changed = Some(Box::new(listener));
        self
    }

    pub fn with_demo_mode(mut self, demo_mode: bool) -> Self {
        self.demo_mode = demo_mode;
        self
    }

    pub fn with_connection_type(mut self, connection_type: ConnectionType) -> Self {
        self.connection_type = connection_type;
        self
    }

    pub fn with_grid(mut self, grid: Grid) -> Self {
        self.grid = grid;
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_drag_handler(mut self, drag_handler: DragHandler) -> Self {
        self.drag_handler = drag_handler;
        self
    }

    pub fn with_zoom_disabled(mut self, disable_zoom: bool) -> Self {
        self.disable_zoom = disable_zoom;
        self
    }

    pub fn with_anchors_length(mut self, length: f32) -> Self {
        self.connection_anchors_length = length;
        self
    }

    /// True when proposals go to the host instead of being applied locally.
    pub(crate) fn is_host_driven(&self) -> bool {
        self.on_changed.is_some() && !self.demo_mode
    }
}

impl<P> fmt::Debug for EditorConfig<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorConfig")
            .field("connection_validator", &self.connection_validator.is_some())
            .field("on_changed", &self.on_changed.is_some())
            .field("demo_mode", &self.demo_mode)
            .field("connection_type", &self.connection_type)
            .field("grid", &self.grid)
            .field("connection_anchors_length", &self.connection_anchors_length)
            .field("direction", &self.direction)
            .field("disable_zoom", &self.disable_zoom)
            .field("drag_handler", &self.drag_handler)
            .finish()
    }
}
