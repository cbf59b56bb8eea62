use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by tree operations and the PGN transcoder.
///
/// All of these are recoverable: a failed operation leaves the tree in the
/// state it had before the call, except where `apply_move_sequence`
/// documents partial application.
#[derive(Debug, Error)]
pub enum Error {
    /// The rules engine rejected a move against the current position.
    #[error("illegal move {mv} in position {fen}")]
    IllegalMove { mv: String, fen: String },

    /// Structurally invalid movetext, or a move token that cannot be
    /// validated against the position it is played from.
    #[error("malformed notation: {0}")]
    MalformedNotation(String),

    /// A position string that is not well-formed FEN or does not describe
    /// a legal position.
    #[error("invalid FEN: {0}")]
    InvalidFen(String),

    /// A child-index path walked off the tree.
    #[error("no node at path step {depth} (child index {index})")]
    PathNotFound { depth: usize, index: usize },

    /// `undo` called on the root node.
    #[error("already at the root position")]
    AtRoot,

    /// `redo` called on a node with no children.
    #[error("no continuation from this position")]
    NoContinuation,
}
