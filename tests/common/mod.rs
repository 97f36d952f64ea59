//! Common test utilities for integration tests.

#![allow(dead_code)]

pub mod harness;

use flow_editor::{ChangeAction, PendingCommit};
use std::cell::RefCell;
use std::rc::Rc;

/// What a tracking listener does with the commits it receives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommitMode {
    /// Hand the commit straight back so the editor applies it.
    Immediate,
    /// Keep the commit in the tracker for the test to apply later.
    Defer,
    /// Drop the commit; the graph stays as it was.
    Discard,
}

/// Tracks change notifications for testing.
#[derive(Default, Clone)]
pub struct ChangeTracker {
    /// Every action the listener saw, in order.
    pub actions: Rc<RefCell<Vec<ChangeAction>>>,
    /// Commits kept in [`CommitMode::Defer`].
    pub pending: Rc<RefCell<Vec<PendingCommit>>>,
    /// How many received commits were already settled (demo mode).
    pub settled: Rc<RefCell<usize>>,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// A listener recording into this tracker.
    pub fn listener(
        &self,
        mode: CommitMode,
    ) -> impl FnMut(&ChangeAction, PendingCommit) -> Option<PendingCommit> + 'static {
        let tracker = self.clone();
        move |action: &ChangeAction, commit: PendingCommit| {
            tracker.actions.borrow_mut().push(action.clone());
            if commit.is_settled() {
                *tracker.settled.borrow_mut() += 1;
            }
            match mode {
                CommitMode::Immediate => Some(commit),
                CommitMode::Defer => {
                    tracker.pending.borrow_mut().push(commit);
                    None
                }
                CommitMode::Discard => None,
            }
        }
    }

    /// Names of the recorded actions.
    pub fn names(&self) -> Vec<&'static str> {
        self.actions.borrow().iter().map(|a| a.name()).collect()
    }

    pub fn last(&self) -> Option<ChangeAction> {
        self.actions.borrow().last().cloned()
    }

    pub fn take_pending(&self) -> Vec<PendingCommit> {
        self.pending.borrow_mut().drain(..).collect()
    }

    /// Clear all recorded notifications.
    pub fn clear(&self) {
        self.actions.borrow_mut().clear();
        self.pending.borrow_mut().clear();
        *self.settled.borrow_mut() = 0;
    }
}
