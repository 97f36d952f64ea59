//! # Flow Editor
//!
//! An embeddable node-graph editing engine. The host owns a list of nodes with
//! typed input and output ports; the editor turns pointer and keyboard events
//! into graph mutations: dragging nodes, connecting and disconnecting ports,
//! selecting and deleting, collapsing node bodies, panning and zooming, and
//! dropping new nodes from a palette.
//!
//! ## Features
//!
//! - **Host-owned data** - Nodes carry any payload type; the editor keeps only
//!   its own geometry next to them
//! - **Change protocol** - Every mutation is proposed to an optional listener
//!   as a [`ChangeAction`] with a [`PendingCommit`] the host may apply, defer or drop
//! - **Automatic layout** - Nodes without a known position are placed in
//!   columns following their links
//! - **Renderer agnostic** - [`Editor::render`] returns a [`Frame`] with node
//!   views, SVG connection paths and grid commands
//! - **Slint adapter** - [`EditorController`] (feature `slint`, on by default)
//!
//! ## Quick Start
//!
//! ```ignore
//! use flow_editor::{Editor, EditorConfig, Node, Port};
//!
//! let nodes: Vec<Node> = serde_json::from_str(&std::fs::read_to_string("graph.json")?)?;
//! let config = EditorConfig::default().with_listener(|action, commit| {
//!     tracing::info!(action = action.name(), "graph changed");
//!     Some(commit)
//! });
//! let mut editor = Editor::new(nodes, config);
//!
//! let frame = editor.render(|node| node.name.clone());
//! for view in &frame.nodes {
//!     draw_node(view);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`editor`] - Interaction state machine and graph operations
//! - [`layout`] - Initial placement of nodes
//! - [`graph`] - Connection bookkeeping and validation
//! - [`render`] - Per-frame views
//! - [`palette`] - Drag-and-drop node creation

pub mod change;
pub mod config;
pub mod editor;
pub mod endpoint;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod grid;
pub mod layout;
pub mod model;
pub mod palette;
pub mod path;
pub mod render;
pub mod selection;
pub mod state;

#[cfg(feature = "slint")]
pub mod controller;

pub use change::{ChangeAction, ChangeListener, PendingCommit};
pub use config::{ConnectionType, Direction, DragHandler, EditorConfig, Grid, Side};
pub use editor::{
    CurrentAction, Editor, Key, Modifiers, PointerButton, PointerEvent, PointerTarget, WheelEvent,
};
pub use endpoint::{compute_id, extract_endpoint_info, ConnectionId, Endpoint, PortKind};
pub use error::EndpointParseError;
pub use geometry::{Rect, Size, Vector2d};
pub use graph::{
    ConnectionInfo, ConnectionValidator, CompositeValidator, NoDuplicatesValidator, ValidationError,
    ValidationResult,
};
pub use grid::generate_grid_commands;
pub use layout::{adjust, NodeState};
pub use model::{Connection, Node, Port, PortConnection};
pub use palette::{PaletteDrag, PaletteDrop, PaletteHandle, PaletteItem};
pub use path::connection_path;
pub use render::{ConnectionView, Frame, NodeView, PortView, WorkingConnectionView};
pub use selection::{Selection, SelectionManager};
pub use state::{EditorState, Transform, WorkingConnection};

#[cfg(feature = "slint")]
pub use controller::EditorController;
