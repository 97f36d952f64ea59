//! Change notifications sent to the host and the deferred mutations behind
//! them.
//!
//! Every graph or view mutation the editor proposes is described by a
//! [`ChangeAction`] and carried out by a [`PendingCommit`]. With no listener
//! configured, or in demo mode, the editor applies the commit itself. Otherwise
//! the listener decides: return the commit to apply it right away, keep it and
//! hand it to [`crate::Editor::commit`] later, or drop it and update the node
//! list through the host's own state management.

use crate::endpoint::{ConnectionId, Endpoint};
use crate::layout::NodeState;
use crate::model::Node;
use crate::selection::Selection;

/// What the editor wants to change.
#[derive(Clone, Debug, PartialEq)]
pub enum ChangeAction<P = serde_json::Value> {
    NodeCreated {
        node: Node<P>,
    },
    NodeRemoved {
        id: String,
        /// Every link touching the node, computed before anything changed.
        corresponding_connections: Vec<ConnectionId>,
    },
    ConnectionCreated {
        input: Endpoint,
        output: Endpoint,
    },
    ConnectionRemoved {
        id: String,
        input: Endpoint,
        output: Endpoint,
    },
    NodeCollapseChanged {
        id: String,
        should_be_collapsed: bool,
    },
    NodeSelected {
        node: Node<P>,
    },
    NodeDeselected,
}

impl<P> ChangeAction<P> {
    pub fn name(&self) -> &'static str {
        match self {
            ChangeAction::NodeCreated { .. } => "NodeCreated",
            ChangeAction::NodeRemoved { .. } => "NodeRemoved",
            ChangeAction::ConnectionCreated { .. } => "ConnectionCreated",
            ChangeAction::ConnectionRemoved { .. } => "ConnectionRemoved",
            ChangeAction::NodeCollapseChanged { .. } => "NodeCollapseChanged",
            ChangeAction::NodeSelected { .. } => "NodeSelected",
            ChangeAction::NodeDeselected => "NodeDeselected",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Mutation<P> {
    CreateNode { node: Node<P>, state: NodeState },
    RemoveNode { id: String, connections: Vec<ConnectionId> },
    CreateConnection { input: Endpoint, output: Endpoint },
    RemoveConnection { input: Endpoint, output: Endpoint },
    SetCollapsed { id: String, collapsed: bool },
    Select(Selection),
    Deselect,
}

/// A proposed mutation waiting to be applied with [`crate::Editor::commit`].
///
/// In demo mode the listener receives an already settled commit: the editor
/// applies the change itself and committing it again does nothing.
#[derive(Debug)]
#[must_use = "drop the commit to discard the change, or pass it to Editor::commit"]
pub struct PendingCommit<P = serde_json::Value> {
    pub(crate) mutation: Option<Mutation<P>>,
}

impl<P> PendingCommit<P> {
    pub(crate) fn new(mutation: Mutation<P>) -> Self {
        Self {
            mutation: Some(mutation),
        }
    }

    pub(crate) fn settled() -> Self {
        Self { mutation: None }
    }

    /// True if committing this does nothing.
    pub fn is_settled(&self) -> bool {
        self.mutation.is_none()
    }
}

/// Host listener for proposed changes.
///
/// Returning `Some(commit)` applies the change immediately; returning `None`
/// leaves it to the host.
pub type ChangeListener<P> =
    dyn FnMut(&ChangeAction<P>, PendingCommit<P>) -> Option<PendingCommit<P>>;
