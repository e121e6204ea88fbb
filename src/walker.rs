//! Pre-order traversal with exit visits.
//!
//! Containers are visited twice (entering, then exiting after their last
//! child); leaves are visited once. The [`Walker`] does not borrow the tree,
//! so callers can step it one event at a time and edit the tree in between.

use crate::node::{NodeId, Tree};

/// One step of a traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkEvent {
    pub node: NodeId,
    pub entering: bool,
}

/// Externally driven traversal state.
#[derive(Debug, Clone)]
pub struct Walker {
    current: Option<NodeId>,
    root: NodeId,
    entering: bool,
    started: bool,
}

impl Walker {
    /// Traverse the subtree rooted at `root`.
    pub fn new(root: NodeId) -> Self {
        Self {
            current: Some(root),
            root,
            entering: true,
            started: false,
        }
    }

    /// Advance one step.
    ///
    /// Returns `None` once the root's own visit is complete.
    pub fn next(&mut self, tree: &Tree) -> Option<WalkEvent> {
        let current = self.current?;

        if !self.started {
            self.started = true;
            return Some(self.event());
        }

        let node = &tree[current];
        if self.entering && node.kind().is_container() {
            match node.first_child() {
                Some(child) => {
                    self.current = Some(child);
                    self.entering = true;
                }
                None => self.entering = false,
            }
        } else if current == self.root {
            self.current = None;
            return None;
        } else if let Some(next) = node.next() {
            self.current = Some(next);
            self.entering = true;
        } else {
            match node.parent() {
                Some(parent) => {
                    self.current = Some(parent);
                    self.entering = false;
                }
                None => {
                    // Detached subtree ran out before reaching the root.
                    self.current = None;
                    return None;
                }
            }
        }

        Some(self.event())
    }

    /// Continue from `node` as if it had just been visited.
    pub fn resume_at(&mut self, node: NodeId, entering: bool) {
        self.current = Some(node);
        self.entering = entering;
        self.started = true;
    }

    #[inline]
    fn event(&self) -> WalkEvent {
        WalkEvent {
            node: self.current.unwrap_or(self.root),
            entering: self.entering,
        }
    }
}

/// Borrowing iterator over a [`Walker`].
pub struct Walk<'a> {
    tree: &'a Tree,
    walker: Walker,
}

impl<'a> Walk<'a> {
    pub(crate) fn new(tree: &'a Tree, walker: Walker) -> Self {
        Self { tree, walker }
    }
}

impl Iterator for Walk<'_> {
    type Item = WalkEvent;

    #[inline]
    fn next(&mut self) -> Option<WalkEvent> {
        self.walker.next(self.tree)
    }
}
