//! Node palette: drag a prototype out of a menu and drop it on an editor.
//!
//! The palette reaches its editor through a [`PaletteHandle`] obtained from
//! [`crate::Editor::palette_handle`]. Drops are queued on the handle and turned
//! into `NodeCreated` proposals by [`crate::Editor::process_palette_drops`],
//! which [`crate::Editor::render`] runs at the start of every frame.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use crate::geometry::Vector2d;
use crate::model::Node;

/// A palette entry producing fresh prototypes.
pub struct PaletteItem<P = serde_json::Value> {
    pub node_type: String,
    pub name: String,
    /// Merged into the created node's class names.
    pub class_names: Vec<String>,
    factory: Rc<dyn Fn() -> Node<P>>,
}

impl<P> PaletteItem<P> {
    pub fn new(
        node_type: impl Into<String>,
        name: impl Into<String>,
        factory: impl Fn() -> Node<P> + 'static,
    ) -> Self {
        Self {
            node_type: node_type.into(),
            name: name.into(),
            class_names: Vec::new(),
            factory: Rc::new(factory),
        }
    }

    pub fn with_class_names(mut self, class_names: Vec<String>) -> Self {
        self.class_names = class_names;
        self
    }

    /// Build a new prototype. Its id is replaced when the node is created;
    /// an empty node type is taken from the item.
    pub fn prototype(&self) -> Node<P> {
        let mut node = (self.factory)();
        if node.node_type.is_empty() {
            node.node_type = self.node_type.clone();
        }
        node
    }
}

impl<P> Clone for PaletteItem<P> {
    fn clone(&self) -> Self {
        Self {
            node_type: self.node_type.clone(),
            name: self.name.clone(),
            class_names: self.class_names.clone(),
            factory: self.factory.clone(),
        }
    }
}

impl<P> fmt::Debug for PaletteItem<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaletteItem")
            .field("node_type", &self.node_type)
            .field("name", &self.name)
            .field("class_names", &self.class_names)
            .finish_non_exhaustive()
    }
}

/// A prototype released over the screen, waiting for the editor.
#[derive(Clone, Debug, PartialEq)]
pub struct PaletteDrop<P = serde_json::Value> {
    pub prototype: Node<P>,
    /// Client-space top-left of the ghost at release, floored.
    pub position: Vector2d,
}

/// Shared queue between a palette and one editor.
pub struct PaletteHandle<P = serde_json::Value> {
    queue: Rc<RefCell<VecDeque<PaletteDrop<P>>>>,
}

impl<P> Clone for PaletteHandle<P> {
    fn clone(&self) -> Self {
        Self {
            queue: self.queue.clone(),
        }
    }
}

impl<P> Default for PaletteHandle<P> {
    fn default() -> Self {
        Self {
            queue: Rc::new(RefCell::new(VecDeque::new())),
        }
    }
}

impl<P> fmt::Debug for PaletteHandle<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaletteHandle")
            .field("pending", &self.pending())
            .finish()
    }
}

impl<P> PaletteHandle<P> {
    /// Start dragging `item`. `pointer` is the client position of the press
    /// and `item_origin` the client top-left of the palette entry; the ghost
    /// keeps the grab offset between them.
    pub fn start_drag(&self, item: &PaletteItem<P>, pointer: Vector2d, item_origin: Vector2d) -> PaletteDrag<P> {
        PaletteDrag {
            handle: self.clone(),
            item: item.clone(),
            offset: pointer - item_origin,
            ghost: item_origin,
        }
    }

    /// Queue a drop directly, bypassing the ghost drag.
    pub fn drop_node(&self, prototype: Node<P>, position: Vector2d) {
        self.queue.borrow_mut().push_back(PaletteDrop { prototype, position });
    }

    /// Number of drops not yet picked up by the editor.
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    pub(crate) fn take_all(&self) -> Vec<PaletteDrop<P>> {
        self.queue.borrow_mut().drain(..).collect()
    }
}

/// A palette item following the pointer.
#[derive(Debug)]
pub struct PaletteDrag<P = serde_json::Value> {
    handle: PaletteHandle<P>,
    item: PaletteItem<P>,
    offset: Vector2d,
    ghost: Vector2d,
}

impl<P> PaletteDrag<P> {
    /// Client top-left of the ghost.
    pub fn ghost_position(&self) -> Vector2d {
        self.ghost
    }

    pub fn item(&self) -> &PaletteItem<P> {
        &self.item
    }

    pub fn move_to(&mut self, pointer: Vector2d) {
        self.ghost = pointer - self.offset;
    }

    /// Release (pointer up or leaving the window) at the last ghost
    /// position. The palette entry's class names are added to the prototype.
    pub fn finish(self) {
        let mut prototype = self.item.prototype();
        for class_name in &self.item.class_names {
            if !prototype.class_names.contains(class_name) {
                prototype.class_names.push(class_name.clone());
            }
        }
        tracing::debug!(node_type = %self.item.node_type, "palette item dropped");
        self.handle.drop_node(prototype, self.ghost.floor());
    }

    /// Abort the drag without queueing anything.
    pub fn cancel(self) {}
}
