//! The variation tree: an arena of position nodes.
//!
//! Nodes are owned by the [`GameTree`] arena and addressed by [`NodeId`]
//! indices. The parent link is a plain index, never an owning pointer, so
//! ownership flows strictly root-to-leaf and dropping (or replacing) a
//! `GameTree` drops every node at once. Nodes are never freed one at a
//! time; a subtree disappears only when the whole tree is discarded.

use shakmaty::san::{SanPlus, Suffix};
use shakmaty::{CastlingMode, Move, Role, Square};
use std::fmt;
use std::ops::Index;

use crate::error::Result;
use crate::rules;

/// Index of a node within its [`GameTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The move that produced a node's position, with its algebraic text.
#[derive(Debug, Clone)]
pub struct MoveInfo {
    pub(crate) m: Move,
    pub(crate) san: SanPlus,
}

impl MoveInfo {
    /// Origin square (`None` only for drops, which standard chess lacks).
    pub fn from(&self) -> Option<Square> {
        self.m.from()
    }

    pub fn to(&self) -> Square {
        self.m.to()
    }

    pub fn promotion(&self) -> Option<Role> {
        self.m.promotion()
    }

    /// Piece that moved.
    pub fn role(&self) -> Role {
        self.m.role()
    }

    pub fn is_capture(&self) -> bool {
        self.m.is_capture()
    }

    pub fn is_check(&self) -> bool {
        self.san.suffix.is_some()
    }

    pub fn is_checkmate(&self) -> bool {
        matches!(self.san.suffix, Some(Suffix::Checkmate))
    }

    /// Standard algebraic notation including any check/checkmate suffix.
    pub fn san_text(&self) -> String {
        self.san.to_string()
    }
}

/// Cached evaluation from an external analysis source. Display-only,
/// never consulted by tree operations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Score {
    /// Pawn-unit evaluation from the side to move's perspective.
    Eval(f64),
    /// Signed moves to mate.
    Mate(i32),
}

/// Game result as recorded in movetext.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    WhiteWins,
    BlackWins,
    Draw,
    Unknown,
}

impl GameOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameOutcome::WhiteWins => "1-0",
            GameOutcome::BlackWins => "0-1",
            GameOutcome::Draw => "1/2-1/2",
            GameOutcome::Unknown => "*",
        }
    }
}

impl fmt::Display for GameOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ply of the game: a position, the move that reached it, and any
/// annotations attached to it.
#[derive(Debug, Clone)]
pub struct PositionNode {
    pub(crate) fen: String,
    pub(crate) produced_by: Option<MoveInfo>,
    pub(crate) comment: Option<String>,
    pub(crate) nags: Vec<u8>,
    pub(crate) score: Option<Score>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) parent: Option<NodeId>,
}

impl PositionNode {
    /// Canonical FEN of this position. Full-string equality on this field
    /// is the transposition criterion: two positions differing only in the
    /// half-move clock stay distinct.
    pub fn fen(&self) -> &str {
        &self.fen
    }

    /// The move that produced this position; `None` for a root.
    pub fn produced_by(&self) -> Option<&MoveInfo> {
        self.produced_by.as_ref()
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Numeric annotation glyphs attached to the producing move, in input
    /// order.
    pub fn nags(&self) -> &[u8] {
        &self.nags
    }

    pub fn score(&self) -> Option<Score> {
        self.score
    }

    /// Ordered children. Index 0 is the main-line continuation; the order
    /// is significant and survives parse/serialize round-trips.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// A branching move history rooted at a single position.
#[derive(Debug, Clone)]
pub struct GameTree {
    pub(crate) nodes: Vec<PositionNode>,
    pub(crate) root: NodeId,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) outcome: Option<GameOutcome>,
    pub(crate) mode: CastlingMode,
}

impl GameTree {
    /// A tree holding only the standard starting position.
    pub fn new() -> Self {
        Self::with_root(rules::STARTING_FEN.to_string(), CastlingMode::Standard)
    }

    /// Start a fresh tree from an arbitrary position (board editing).
    ///
    /// This is the `editPosition` entry point: the returned tree has a
    /// single parentless, childless root and no connection to any prior
    /// tree. Abandoning the previous variation history is the caller's
    /// explicit choice, made by replacing their tree with this one.
    pub fn from_position(fen: &str) -> Result<Self> {
        Self::from_position_with_mode(fen, CastlingMode::Standard)
    }

    /// Like [`GameTree::from_position`] but for Chess960 setups.
    pub fn from_position_with_mode(fen: &str, mode: CastlingMode) -> Result<Self> {
        let pos = rules::position(fen, mode)?;
        Ok(Self::with_root(rules::fen_of(&pos), mode))
    }

    pub(crate) fn with_root(fen: String, mode: CastlingMode) -> Self {
        GameTree {
            nodes: vec![PositionNode {
                fen,
                produced_by: None,
                comment: None,
                nags: Vec::new(),
                score: None,
                children: Vec::new(),
                parent: None,
            }],
            root: NodeId(0),
            headers: Vec::new(),
            outcome: None,
            mode,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &PositionNode {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut PositionNode {
        &mut self.nodes[id.0]
    }

    /// Total number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        false // there is always a root
    }

    /// PGN tag pairs in input order.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    pub fn set_outcome(&mut self, outcome: Option<GameOutcome>) {
        self.outcome = outcome;
    }

    pub fn castling_mode(&self) -> CastlingMode {
        self.mode
    }

    /// Allocate a node in the arena. Linking it into a parent's child list
    /// is the caller's job.
    pub(crate) fn new_node(
        &mut self,
        fen: String,
        produced_by: Option<MoveInfo>,
        parent: Option<NodeId>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(PositionNode {
            fen,
            produced_by,
            comment: None,
            nags: Vec::new(),
            score: None,
            children: Vec::new(),
            parent,
        });
        id
    }
}

impl Default for GameTree {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<NodeId> for GameTree {
    type Output = PositionNode;

    fn index(&self, id: NodeId) -> &PositionNode {
        &self.nodes[id.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tree_is_single_root_at_start_position() {
        let tree = GameTree::new();
        assert_eq!(tree.len(), 1);
        let root = &tree[tree.root()];
        assert_eq!(root.fen(), rules::STARTING_FEN);
        assert!(root.is_root());
        assert!(root.is_leaf());
        assert!(root.produced_by().is_none());
    }

    #[test]
    fn test_from_position_normalizes_fen() {
        let fen = "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3";
        let tree = GameTree::from_position(fen).unwrap();
        assert_eq!(tree[tree.root()].fen(), fen);
        assert!(tree[tree.root()].children().is_empty());
    }

    #[test]
    fn test_from_position_rejects_garbage() {
        assert!(GameTree::from_position("no such position").is_err());
    }

    #[test]
    fn test_outcome_strings() {
        assert_eq!(GameOutcome::WhiteWins.as_str(), "1-0");
        assert_eq!(GameOutcome::BlackWins.as_str(), "0-1");
        assert_eq!(GameOutcome::Draw.as_str(), "1/2-1/2");
        assert_eq!(GameOutcome::Unknown.to_string(), "*");
    }
}
