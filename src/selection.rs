use crate::endpoint::ConnectionId;
use std::fmt;

/// The selectable things in the editor.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Selection {
    Node(String),
    Connection(ConnectionId),
}

impl Selection {
    /// Flat id: the node id, or `"{input id}__{output id}"` for a connection.
    pub fn id(&self) -> String {
        match self {
            Selection::Node(id) => id.clone(),
            Selection::Connection(id) => id.to_string(),
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::Node(id) => write!(f, "node {}", id),
            Selection::Connection(id) => write!(f, "connection {}", id),
        }
    }
}

/// Holds at most one selected item.
#[derive(Debug, Default)]
pub struct SelectionManager {
    selected: Option<Selection>,
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selection. Returns `false` when `item` is already selected.
    pub fn select(&mut self, item: Selection) -> bool {
        if self.selected.as_ref() == Some(&item) {
            return false;
        }
        self.selected = Some(item);
        true
    }

    /// Clear the selection, returning what was selected.
    pub fn clear(&mut self) -> Option<Selection> {
        self.selected.take()
    }

    pub fn current(&self) -> Option<&Selection> {
        self.selected.as_ref()
    }

    pub fn is_node_selected(&self, node_id: &str) -> bool {
        matches!(&self.selected, Some(Selection::Node(id)) if id == node_id)
    }

    pub fn is_connection_selected(&self, connection: &ConnectionId) -> bool {
        matches!(&self.selected, Some(Selection::Connection(id)) if id == connection)
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_none()
    }
}
