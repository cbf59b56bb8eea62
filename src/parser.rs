//! PGN movetext → [`GameTree`].
//!
//! Tokenization is delegated to `pgn_reader`; the visitor here builds a
//! variation tree instead of a flat move list. A small stack of frames
//! tracks where each `(...)` group diverges so nested variations attach at
//! the node whose move they replace. New nodes go through the same
//! transposition-aware attach as interactive move entry, so parsed trees
//! satisfy the sibling-uniqueness invariant too.
//!
//! Parsing is all-or-nothing: on any failure the caller gets an error and
//! keeps whatever tree it already had.

use log::debug;
use pgn_reader::{KnownOutcome, Nag, Outcome, RawComment, RawTag, Reader, SanPlus, Skip, Visitor};
use shakmaty::{fen::Fen, CastlingMode, Chess, Color};
use std::io::Cursor;
use std::ops::ControlFlow;

use crate::comment_parsing::extract_score;
use crate::error::{Error, Result};
use crate::rules::{self, MoveOutcome};
use crate::tree::{GameOutcome, GameTree, NodeId};

/// Parse one game of PGN text into a variation tree.
///
/// Empty (or whitespace-only) input yields a tree holding just the
/// standard starting position. Tag pairs are retained; a `FEN` tag sets
/// the root position and `[Variant "chess960"]` switches castling rules.
pub fn parse_pgn(pgn: &str) -> Result<GameTree> {
    if pgn.trim().is_empty() {
        return Ok(GameTree::new());
    }
    check_balance(pgn)?;

    let mut reader = Reader::new(Cursor::new(pgn));
    let mut builder = TreeBuilder::new();
    match reader.read_game(&mut builder) {
        Ok(Some(())) => builder.finish(),
        Ok(None) => Err(Error::MalformedNotation("no game found".to_string())),
        Err(err) => Err(Error::MalformedNotation(err.to_string())),
    }
}

/// Reject text with unbalanced `{...}` or `(...)` before visiting it.
///
/// The token reader itself is permissive about these, but a tree built
/// from unbalanced variation markers would silently misattach lines.
fn check_balance(pgn: &str) -> Result<()> {
    let mut depth: u32 = 0;
    let mut in_comment = false;
    let mut in_string = false;
    let mut in_rest_of_line = false;
    let mut escaped = false;
    for c in pgn.chars() {
        if in_rest_of_line {
            in_rest_of_line = c != '\n';
            continue;
        }
        if in_comment {
            // '{' does not nest inside a comment
            in_comment = c != '}';
            continue;
        }
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '{' => in_comment = true,
            '}' => {
                return Err(Error::MalformedNotation("unmatched '}'".to_string()));
            }
            '(' => depth += 1,
            ')' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| Error::MalformedNotation("unmatched ')'".to_string()))?;
            }
            '"' => in_string = true,
            ';' => in_rest_of_line = true,
            _ => {}
        }
    }
    if in_comment {
        Err(Error::MalformedNotation("unclosed '{'".to_string()))
    } else if depth != 0 {
        Err(Error::MalformedNotation("unclosed '('".to_string()))
    } else {
        Ok(())
    }
}

/// Saved insertion point for one `(...)` level.
struct Frame {
    current: NodeId,
    pos: Chess,
    prev_pos: Option<Chess>,
}

/// Visitor that grows a [`GameTree`] while the reader streams tokens.
struct TreeBuilder {
    tree: GameTree,
    current: NodeId,
    /// Position at `current`.
    pos: Chess,
    /// Position at `current`'s parent, i.e. before the latest move at this
    /// level. This is where a variation opening here branches from.
    prev_pos: Option<Chess>,
    stack: Vec<Frame>,
    error: Option<Error>,
}

impl TreeBuilder {
    fn new() -> Self {
        let tree = GameTree::new();
        let current = tree.root();
        TreeBuilder {
            tree,
            current,
            pos: Chess::default(),
            prev_pos: None,
            stack: Vec::new(),
            error: None,
        }
    }

    fn set_error(&mut self, error: Error) {
        debug!("parse failed: {error}");
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    fn finish(self) -> Result<GameTree> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.tree),
        }
    }
}

impl Visitor for TreeBuilder {
    type Tags = Vec<(String, String)>;
    type Movetext = ();
    type Output = ();

    fn begin_tags(&mut self) -> ControlFlow<Self::Output, Self::Tags> {
        ControlFlow::Continue(Vec::with_capacity(10))
    }

    fn tag(
        &mut self,
        tags: &mut Self::Tags,
        key: &[u8],
        value: RawTag<'_>,
    ) -> ControlFlow<Self::Output> {
        let key_str = String::from_utf8_lossy(key).into_owned();
        let value_str = String::from_utf8_lossy(value.as_bytes()).into_owned();
        tags.push((key_str, value_str));
        ControlFlow::Continue(())
    }

    fn begin_movetext(&mut self, tags: Self::Tags) -> ControlFlow<Self::Output, Self::Movetext> {
        // Castling rules from the Variant tag (case-insensitive)
        let mode = tags
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("Variant"))
            .filter(|(_, v)| v.eq_ignore_ascii_case("chess960"))
            .map(|_| CastlingMode::Chess960)
            .unwrap_or(CastlingMode::Standard);

        // Starting position from the FEN tag, default otherwise
        let fen_tag = tags
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("FEN"))
            .map(|(_, v)| v.as_str());

        let start = match fen_tag {
            Some(fen_str) => match fen_str.parse::<Fen>() {
                Ok(fen) => match fen.into_position(mode) {
                    Ok(pos) => pos,
                    Err(e) => {
                        self.set_error(Error::InvalidFen(format!("{e}: {fen_str}")));
                        Chess::default()
                    }
                },
                Err(e) => {
                    self.set_error(Error::InvalidFen(format!("{e}: {fen_str}")));
                    Chess::default()
                }
            },
            None => Chess::default(),
        };

        self.tree = GameTree::with_root(rules::fen_of(&start), mode);
        self.tree.headers = tags;
        self.current = self.tree.root();
        self.pos = start;
        self.prev_pos = None;
        self.stack.clear();
        ControlFlow::Continue(())
    }

    fn san(&mut self, _movetext: &mut Self::Movetext, san_plus: SanPlus) -> ControlFlow<Self::Output> {
        if self.error.is_some() {
            return ControlFlow::Continue(());
        }
        match san_plus.san.to_move(&self.pos) {
            Ok(m) => {
                let before = self.pos.clone();
                let san = SanPlus::from_move_and_play_unchecked(&mut self.pos, m);
                let outcome = MoveOutcome {
                    m,
                    san,
                    fen_after: rules::fen_of(&self.pos),
                };
                let child = self.tree.attach(self.current, outcome);
                self.prev_pos = Some(before);
                self.current = child;
            }
            Err(err) => {
                self.set_error(Error::MalformedNotation(format!(
                    "illegal move: {err} {san_plus}"
                )));
            }
        }
        ControlFlow::Continue(())
    }

    fn nag(&mut self, _movetext: &mut Self::Movetext, nag: Nag) -> ControlFlow<Self::Output> {
        if self.error.is_none() && self.current != self.tree.root() {
            self.tree.push_nag(self.current, nag.0);
        }
        ControlFlow::Continue(())
    }

    fn comment(
        &mut self,
        _movetext: &mut Self::Movetext,
        comment: RawComment<'_>,
    ) -> ControlFlow<Self::Output> {
        if self.error.is_some() {
            return ControlFlow::Continue(());
        }
        let text = String::from_utf8_lossy(comment.as_bytes());
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return ControlFlow::Continue(());
        }
        let node = self.tree.node_mut(self.current);
        match &mut node.comment {
            Some(existing) => {
                existing.push(' ');
                existing.push_str(trimmed);
            }
            None => node.comment = Some(trimmed.to_string()),
        }
        if node.score.is_none() {
            node.score = extract_score(trimmed);
        }
        ControlFlow::Continue(())
    }

    fn begin_variation(&mut self, _movetext: &mut Self::Movetext) -> ControlFlow<Self::Output, Skip> {
        if self.error.is_some() {
            return ControlFlow::Continue(Skip(true));
        }
        let (Some(parent), Some(prev_pos)) =
            (self.tree[self.current].parent(), self.prev_pos.clone())
        else {
            // a variation with no move to diverge from; nothing to attach to
            debug!("skipping variation at the root position");
            return ControlFlow::Continue(Skip(true));
        };
        self.stack.push(Frame {
            current: self.current,
            pos: std::mem::replace(&mut self.pos, prev_pos),
            prev_pos: self.prev_pos.take(),
        });
        self.current = parent;
        ControlFlow::Continue(Skip(false))
    }

    fn end_variation(&mut self, _movetext: &mut Self::Movetext) -> ControlFlow<Self::Output> {
        if let Some(frame) = self.stack.pop() {
            self.current = frame.current;
            self.pos = frame.pos;
            self.prev_pos = frame.prev_pos;
        }
        ControlFlow::Continue(())
    }

    fn outcome(&mut self, _movetext: &mut Self::Movetext, outcome: Outcome) -> ControlFlow<Self::Output> {
        self.tree.outcome = Some(match outcome {
            Outcome::Known(KnownOutcome::Decisive {
                winner: Color::White,
            }) => GameOutcome::WhiteWins,
            Outcome::Known(KnownOutcome::Decisive {
                winner: Color::Black,
            }) => GameOutcome::BlackWins,
            Outcome::Known(KnownOutcome::Draw) => GameOutcome::Draw,
            Outcome::Unknown => GameOutcome::Unknown,
        });
        ControlFlow::Continue(())
    }

    fn end_game(&mut self, _movetext: Self::Movetext) -> Self::Output {}
}
