//! Read-only traversal of a [`GameTree`].
//!
//! These operations never mutate the tree; the host's renderer, move
//! controls, and persistence layer are all built on top of them.

use crate::error::{Error, Result};
use crate::tree::{GameTree, NodeId};

impl GameTree {
    /// Walk parent links up to the root.
    pub fn top_variation(&self, mut id: NodeId) -> NodeId {
        while let Some(parent) = self[id].parent() {
            id = parent;
        }
        id
    }

    /// Walk the main line (`children[0]`) down to a leaf.
    pub fn bottom_variation(&self, mut id: NodeId) -> NodeId {
        while let Some(&first) = self[id].children().first() {
            id = first;
        }
        id
    }

    /// Resolve a child-index path starting at the root.
    ///
    /// The empty path is the root. Together with the serialized movetext
    /// this path is the entire persistence contract: a tree plus a current
    /// node is re-derivable from `(pgn, path)` alone.
    pub fn locate(&self, path: &[usize]) -> Result<NodeId> {
        let mut id = self.root();
        for (depth, &index) in path.iter().enumerate() {
            id = *self[id]
                .children()
                .get(index)
                .ok_or(Error::PathNotFound { depth, index })?;
        }
        Ok(id)
    }

    /// Child-index path from the root to `id`; inverse of [`GameTree::locate`].
    pub fn path_to(&self, id: NodeId) -> Vec<usize> {
        let mut path = Vec::new();
        let mut current = id;
        while let Some(parent) = self[current].parent() {
            let index = self[parent]
                .children()
                .iter()
                .position(|&child| child == current)
                .unwrap_or(0);
            path.push(index);
            current = parent;
        }
        path.reverse();
        path
    }

    /// Linear scan for a child already holding `fen`.
    ///
    /// Equality is on the full FEN string, move counters included, so
    /// transpositions that differ only in the half-move clock do not
    /// collapse into one node.
    pub fn find_child_by_position(&self, id: NodeId, fen: &str) -> Option<NodeId> {
        self[id]
            .children()
            .iter()
            .copied()
            .find(|&child| self[child].fen() == fen)
    }

    /// Iterator over the main line below `from` (exclusive of `from`).
    pub fn mainline_from(&self, from: NodeId) -> Mainline<'_> {
        Mainline {
            tree: self,
            current: from,
        }
    }

    /// Iterator over the main line below the root.
    pub fn mainline(&self) -> Mainline<'_> {
        self.mainline_from(self.root())
    }
}

/// See [`GameTree::mainline_from`].
pub struct Mainline<'a> {
    tree: &'a GameTree,
    current: NodeId,
}

impl Iterator for Mainline<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let next = *self.tree[self.current].children().first()?;
        self.current = next;
        Some(next)
    }
}
