//! Slint glue for [`Editor`].
//!
//! [`EditorController`] shares one editor between Slint callbacks and turns
//! raw pointer positions into editor events, resolving what was hit with
//! [`Editor::target_at`].
//!
//! # Example
//!
//! ```ignore
//! use flow_editor::{EditorConfig, EditorController};
//!
//! slint::include_modules!();
//!
//! fn main() {
//!     let window = MainWindow::new().unwrap();
//!     let ctrl = EditorController::new(load_nodes(), EditorConfig::default());
//!     let w = window.as_weak();
//!
//!     // Pointer input - the controller resolves targets itself
//!     window.on_pointer_down(ctrl.pointer_down_callback());
//!     window.on_pointer_move(ctrl.pointer_move_callback());
//!     window.on_pointer_up(ctrl.pointer_up_callback());
//!     window.on_clicked(ctrl.click_callback());
//!     window.on_double_clicked(ctrl.double_click_callback());
//!     window.on_scrolled(ctrl.wheel_callback());
//!     window.on_key_pressed(ctrl.key_pressed_callback());
//!
//!     // Paths are looked up by connection id
//!     window.on_connection_path(ctrl.connection_path_callback());
//!
//!     // Measurements
//!     window.on_port_moved({
//!         let ctrl = ctrl.clone();
//!         move |id, x, y, width, height| ctrl.handle_port_anchor(&id, x, y, width, height)
//!     });
//!
//!     window.on_frame_requested({
//!         let ctrl = ctrl.clone();
//!         move || {
//!             if let Some(w) = w.upgrade() {
//!                 ctrl.settle();
//!                 ctrl.sync_connection_ids(&connection_model);
//!                 w.set_grid_commands(ctrl.grid_commands());
//!                 w.set_working_path(ctrl.working_path());
//!             }
//!         }
//!     });
//!
//!     window.run().unwrap();
//! }
//! ```
//!
//! The change listener in [`EditorConfig`] runs while the controller holds
//! the editor borrowed; it must not call back into the controller.

use std::cell::RefCell;
use std::rc::Rc;

use slint::platform::{Key as SlintKey, PointerEventButton};
use slint::{Model, SharedString, VecModel};

use crate::config::EditorConfig;
use crate::editor::{Editor, Key, PointerButton, PointerEvent, WheelEvent};
use crate::endpoint::{ConnectionId, Endpoint};
use crate::geometry::{Rect, Size, Vector2d};
use crate::grid::generate_grid_commands;
use crate::model::Node;
use crate::render::Frame;

/// Shared handle to an [`Editor`] with Slint callback factories.
///
/// Clone this controller to share it across callbacks.
pub struct EditorController<P = serde_json::Value> {
    editor: Rc<RefCell<Editor<P>>>,
}

impl<P> Clone for EditorController<P> {
    fn clone(&self) -> Self {
        Self {
            editor: self.editor.clone(),
        }
    }
}

fn map_button(button: PointerEventButton) -> PointerButton {
    match button {
        PointerEventButton::Left => PointerButton::Primary,
        PointerEventButton::Middle => PointerButton::Middle,
        PointerEventButton::Right => PointerButton::Secondary,
        _ => PointerButton::Other,
    }
}

impl<P: Clone + 'static> EditorController<P> {
    pub fn new(nodes: Vec<Node<P>>, config: EditorConfig<P>) -> Self {
        Self::from_editor(Editor::new(nodes, config))
    }

    pub fn from_editor(editor: Editor<P>) -> Self {
        Self {
            editor: Rc::new(RefCell::new(editor)),
        }
    }

    /// Get access to the shared editor.
    pub fn editor(&self) -> Rc<RefCell<Editor<P>>> {
        self.editor.clone()
    }

    pub fn with_editor<T>(&self, f: impl FnOnce(&mut Editor<P>) -> T) -> T {
        f(&mut self.editor.borrow_mut())
    }

    // === Callback factories ===

    /// Returns a callback for `pointer-down(x, y, button)`.
    pub fn pointer_down_callback(&self) -> impl Fn(f32, f32, PointerEventButton) {
        let editor = self.editor.clone();
        move |x, y, button| {
            let mut editor = editor.borrow_mut();
            let target = editor.target_at(Vector2d::new(x, y));
            editor.pointer_down(PointerEvent::new(x, y, map_button(button)), &target);
        }
    }

    /// Returns a callback for `pointer-move(x, y)`.
    pub fn pointer_move_callback(&self) -> impl Fn(f32, f32) {
        let editor = self.editor.clone();
        move |x, y| {
            editor
                .borrow_mut()
                .pointer_move(PointerEvent::new(x, y, PointerButton::Other));
        }
    }

    /// Returns a callback for `pointer-up(x, y, button)`.
    pub fn pointer_up_callback(&self) -> impl Fn(f32, f32, PointerEventButton) {
        let editor = self.editor.clone();
        move |x, y, button| {
            let mut editor = editor.borrow_mut();
            let target = editor.target_at(Vector2d::new(x, y));
            editor.pointer_up(PointerEvent::new(x, y, map_button(button)), &target);
        }
    }

    /// Returns a callback for `pointer-exit()`.
    pub fn pointer_leave_callback(&self) -> impl Fn() {
        let editor = self.editor.clone();
        move || editor.borrow_mut().pointer_leave()
    }

    /// Returns a callback for `clicked(x, y)`.
    pub fn click_callback(&self) -> impl Fn(f32, f32) {
        let editor = self.editor.clone();
        move |x, y| {
            let mut editor = editor.borrow_mut();
            let target = editor.target_at(Vector2d::new(x, y));
            editor.click(&target);
        }
    }

    /// Returns a callback for `double-clicked(x, y)`.
    pub fn double_click_callback(&self) -> impl Fn(f32, f32) {
        let editor = self.editor.clone();
        move |x, y| {
            let mut editor = editor.borrow_mut();
            let target = editor.target_at(Vector2d::new(x, y));
            editor.double_click(&target);
        }
    }

    /// Returns a callback for `scrolled(x, y, delta-y, control)`.
    pub fn wheel_callback(&self) -> impl Fn(f32, f32, f32, bool) {
        let editor = self.editor.clone();
        move |x, y, delta_y, control| {
            let mut event = WheelEvent::new(x, y, delta_y);
            event.modifiers.control = control;
            editor.borrow_mut().wheel(event);
        }
    }

    /// Returns a callback for `key-pressed(text) -> bool`. Reports whether
    /// the key was handled.
    pub fn key_pressed_callback(&self) -> impl Fn(SharedString) -> bool {
        let editor = self.editor.clone();
        move |text| {
            if text != SharedString::from(SlintKey::Delete) {
                return false;
            }
            editor.borrow_mut().key_down(Key::Delete);
            true
        }
    }

    /// Returns a callback for `connection-path(id) -> string`.
    ///
    /// Empty until both port anchors of the link are known.
    pub fn connection_path_callback(&self) -> impl Fn(SharedString) -> SharedString {
        let editor = self.editor.clone();
        move |id| {
            let Ok(id) = id.parse::<ConnectionId>() else {
                tracing::debug!(id = %id, "path requested for malformed connection id");
                return SharedString::default();
            };
            editor.borrow().connection_path(&id).unwrap_or_default().into()
        }
    }

    // === Direct handlers ===

    /// Handle a port dot's client rect, reported by its string id.
    pub fn handle_port_anchor(&self, id: &str, x: f32, y: f32, width: f32, height: f32) {
        match id.parse::<Endpoint>() {
            Ok(endpoint) => self
                .editor
                .borrow_mut()
                .report_port_anchor(endpoint, Rect::new(Vector2d::new(x, y), Vector2d::new(width, height))),
            Err(err) => tracing::debug!(%err, "ignoring port anchor report"),
        }
    }

    pub fn handle_node_size(&self, id: &str, width: f32, height: f32) {
        self.editor
            .borrow_mut()
            .report_node_size(id, Vector2d::new(width, height));
    }

    pub fn handle_editor_rect(&self, x: f32, y: f32, width: f32, height: f32) {
        let mut editor = self.editor.borrow_mut();
        editor.set_editor_rect(Rect::new(Vector2d::new(x, y), Vector2d::new(width, height)));
        editor.set_component_size(Size::new(width, height));
    }

    // === Frame ===

    pub fn settle(&self) -> bool {
        self.editor.borrow_mut().settle()
    }

    pub fn render<R>(&self, resolver: impl Fn(&Node<P>) -> R) -> Frame<R> {
        self.editor.borrow_mut().render(resolver)
    }

    /// Replace the contents of `model` with the current connection ids,
    /// leaving it untouched when nothing changed.
    pub fn sync_connection_ids(&self, model: &VecModel<SharedString>) {
        let ids: Vec<SharedString> = self
            .editor
            .borrow()
            .connections()
            .iter()
            .map(|c| SharedString::from(c.id.to_string()))
            .collect();
        let unchanged = model.row_count() == ids.len() && model.iter().zip(&ids).all(|(a, b)| &a == b);
        if !unchanged {
            model.set_vec(ids);
        }
    }

    /// Grid commands for the current component size, empty when the grid is
    /// off.
    pub fn grid_commands(&self) -> SharedString {
        let editor = self.editor.borrow();
        match editor.config().grid.spacing() {
            Some(spacing) => generate_grid_commands(editor.state().component_size(), spacing).into(),
            None => SharedString::default(),
        }
    }

    /// Path of the connection being dragged, empty when there is none.
    pub fn working_path(&self) -> SharedString {
        self.editor
            .borrow()
            .frame(|_| ())
            .working
            .map(|w| SharedString::from(w.path))
            .unwrap_or_default()
    }

    pub fn zoom(&self) -> f32 {
        self.editor.borrow().state().transform().zoom
    }
}
