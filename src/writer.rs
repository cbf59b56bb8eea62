//! [`GameTree`] → PGN movetext.
//!
//! The writer walks the main line, emitting each variation as a
//! parenthesized group right after the move it replaces, the same order
//! the parser consumes. Black moves get a `N...` number at the start of a
//! line and after a comment or variation interruption. Output produced
//! with comments and variations disabled is still valid PGN and reparses
//! to the identical tree shape.

use crate::rules;
use crate::tree::{GameTree, NodeId};

/// What to include when serializing a tree.
#[derive(Debug, Clone, Copy)]
pub struct WriteOptions {
    /// Emit `(...)` groups for children beyond the main line.
    pub variations: bool,
    /// Emit `{...}` comments.
    pub comments: bool,
    /// Emit `$n` annotation glyphs.
    pub nags: bool,
    /// Append the result token when the outcome is known.
    pub result: bool,
    /// Emit the tag pair section (plus a synthesized `FEN` tag for
    /// non-standard root positions).
    pub headers: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        WriteOptions {
            variations: true,
            comments: true,
            nags: true,
            result: true,
            headers: true,
        }
    }
}

impl WriteOptions {
    /// Movetext with variations but no annotations, tags or result.
    pub fn moves_only() -> Self {
        WriteOptions {
            variations: true,
            comments: false,
            nags: false,
            result: false,
            headers: false,
        }
    }
}

impl GameTree {
    /// Full PGN of the game: tag section (if requested and present) and
    /// movetext from the root.
    pub fn pgn(&self, opts: &WriteOptions) -> String {
        let mut movetext = self.movetext_from(self.root(), opts);
        if opts.result {
            if let Some(outcome) = self.outcome() {
                push_tok(&mut movetext, outcome.as_str());
            }
        }
        if !opts.headers {
            return movetext;
        }
        let tags = self.tag_section();
        if tags.is_empty() {
            movetext
        } else {
            format!("{tags}\n{movetext}")
        }
    }

    /// Movetext for the subtree below `from` (all descendants).
    pub fn movetext_from(&self, from: NodeId, opts: &WriteOptions) -> String {
        let mut out = String::new();
        if opts.comments {
            if let Some(comment) = self[from].comment() {
                push_tok(&mut out, &brace_comment(comment));
            }
        }
        self.write_continuations(&mut out, from, true, opts);
        out
    }

    /// Movetext restricted to the direct line from the root to `target`,
    /// ignoring every branch along the way.
    pub fn line_to(&self, target: NodeId, opts: &WriteOptions) -> String {
        let mut chain = Vec::new();
        let mut current = target;
        while let Some(parent) = self[current].parent() {
            chain.push((parent, current));
            current = parent;
        }
        chain.reverse();

        let mut out = String::new();
        let mut force = true;
        for (parent, child) in chain {
            force = self.write_move_token(&mut out, parent, child, force, opts);
        }
        out
    }

    fn tag_section(&self) -> String {
        let mut tags = String::new();
        for (key, value) in self.headers() {
            tags.push_str(&format!("[{} \"{}\"]\n", key, escape_tag(value)));
        }
        let has_fen = self
            .headers()
            .iter()
            .any(|(k, _)| k.eq_ignore_ascii_case("FEN"));
        if !has_fen && self[self.root()].fen() != rules::STARTING_FEN {
            tags.push_str("[SetUp \"1\"]\n");
            tags.push_str(&format!("[FEN \"{}\"]\n", self[self.root()].fen()));
        }
        tags
    }

    /// Emit the main line below `start`, with variations inline.
    fn write_continuations(
        &self,
        out: &mut String,
        start: NodeId,
        mut force_number: bool,
        opts: &WriteOptions,
    ) {
        let mut current = start;
        loop {
            let children = self[current].children();
            let Some(&main) = children.first() else { break };
            let mut interrupted = self.write_move_token(out, current, main, force_number, opts);
            if opts.variations && children.len() > 1 {
                for &var in &children[1..] {
                    let mut inner = String::new();
                    let inner_force = self.write_move_token(&mut inner, current, var, true, opts);
                    self.write_continuations(&mut inner, var, inner_force, opts);
                    push_tok(out, &format!("({inner})"));
                }
                interrupted = true;
            }
            current = main;
            force_number = interrupted;
        }
    }

    /// Emit one move (number, SAN, glyphs, comment). Returns whether the
    /// following move needs its number reprinted.
    fn write_move_token(
        &self,
        out: &mut String,
        parent: NodeId,
        child: NodeId,
        force_number: bool,
        opts: &WriteOptions,
    ) -> bool {
        let node = &self[child];
        let Some(info) = node.produced_by() else {
            return false;
        };
        let (white_to_move, number) = side_and_number(self[parent].fen());
        if white_to_move {
            push_tok(out, &format!("{number}."));
        } else if force_number {
            push_tok(out, &format!("{number}..."));
        }
        push_tok(out, &info.san_text());

        if opts.nags {
            for &nag in node.nags() {
                push_tok(out, &format!("${nag}"));
            }
        }
        if opts.comments {
            if let Some(comment) = node.comment() {
                push_tok(out, &brace_comment(comment));
                return true;
            }
        }
        false
    }
}

fn push_tok(out: &mut String, tok: &str) {
    if !out.is_empty() {
        out.push(' ');
    }
    out.push_str(tok);
}

/// Side to move and fullmove number of a FEN, describing the move played
/// from that position.
fn side_and_number(fen: &str) -> (bool, u32) {
    let fields: Vec<&str> = fen.split_whitespace().collect();
    let white_to_move = fields.get(1).copied().unwrap_or("w") == "w";
    let number = fields
        .get(5)
        .and_then(|n| n.parse().ok())
        .unwrap_or(1);
    (white_to_move, number)
}

fn brace_comment(comment: &str) -> String {
    // a '}' inside the text would end the comment early
    format!("{{ {} }}", comment.replace('}', ")"))
}

fn escape_tag(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
