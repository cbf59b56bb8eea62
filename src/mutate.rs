//! Mutation of a [`GameTree`]: playing moves and editing annotations.
//!
//! There are exactly three outcomes when a move is applied at a node: it
//! becomes the sole child, it is appended as a trailing variation, or an
//! existing child already holding the resulting position is reused. The
//! reuse case is what keeps transposing re-entries from duplicating lines.

use log::debug;
use shakmaty::san::San;
use shakmaty::uci::UciMove;

use crate::error::{Error, Result};
use crate::rules::{self, MoveOutcome};
use crate::tree::{GameTree, MoveInfo, NodeId, Score};

impl GameTree {
    /// Play a from/to/promotion move at `at`.
    ///
    /// The move is validated by the rules engine first; an illegal move
    /// returns [`Error::IllegalMove`] and leaves the tree untouched.
    /// Returns the node holding the resulting position, which is the new
    /// current node from the caller's point of view.
    pub fn apply_move(&mut self, at: NodeId, uci: &UciMove) -> Result<NodeId> {
        let outcome = rules::validate_move(self[at].fen(), uci, self.mode)?;
        Ok(self.attach(at, outcome))
    }

    /// Play a move given in algebraic notation at `at`. Same attach
    /// semantics as [`GameTree::apply_move`].
    pub fn apply_san(&mut self, at: NodeId, san: &San) -> Result<NodeId> {
        let outcome = rules::validate_san(self[at].fen(), san, self.mode)?;
        Ok(self.attach(at, outcome))
    }

    /// Fold [`GameTree::apply_move`] over a sequence, threading the
    /// returned node into the next call.
    ///
    /// Stops at the first illegal move. Nodes created before the failure
    /// stay attached; callers that need all-or-nothing behavior should
    /// clone the tree beforehand.
    pub fn apply_move_sequence(&mut self, at: NodeId, moves: &[UciMove]) -> Result<NodeId> {
        let mut current = at;
        for uci in moves {
            current = self.apply_move(current, uci)?;
        }
        Ok(current)
    }

    /// Attach a validated move below `at`, reusing a transposing child if
    /// one exists.
    pub(crate) fn attach(&mut self, at: NodeId, outcome: MoveOutcome) -> NodeId {
        if let Some(existing) = self.find_child_by_position(at, &outcome.fen_after) {
            debug!("reusing transposing child {existing} at {at}");
            return existing;
        }
        let info = MoveInfo {
            m: outcome.m,
            san: outcome.san,
        };
        let child = self.new_node(outcome.fen_after, Some(info), Some(at));
        self.node_mut(at).children.push(child);
        child
    }

    /// Step to the parent node. Pure lookup, no mutation.
    pub fn undo(&self, at: NodeId) -> Result<NodeId> {
        self[at].parent().ok_or(Error::AtRoot)
    }

    /// Step into the main-line continuation. Pure lookup, no mutation.
    pub fn redo(&self, at: NodeId) -> Result<NodeId> {
        self[at].children().first().copied().ok_or(Error::NoContinuation)
    }

    /// Replace the free-text comment attached to a position.
    pub fn set_comment(&mut self, at: NodeId, comment: Option<String>) {
        self.node_mut(at).comment = comment;
    }

    /// Replace the annotation glyphs attached to the producing move.
    pub fn set_nags(&mut self, at: NodeId, nags: Vec<u8>) {
        self.node_mut(at).nags = nags;
    }

    /// Append one annotation glyph.
    pub fn push_nag(&mut self, at: NodeId, nag: u8) {
        self.node_mut(at).nags.push(nag);
    }

    /// Cache an engine evaluation for display.
    pub fn set_score(&mut self, at: NodeId, score: Option<Score>) {
        self.node_mut(at).score = score;
    }
}
