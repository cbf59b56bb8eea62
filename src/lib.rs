//! Variation trees for annotated chess games.
//!
//! This crate holds the core of a game-analysis application: a branching
//! move history ([`GameTree`]) together with a bidirectional PGN
//! transcoder. A tree is built either by parsing movetext
//! ([`parse_pgn`]) or move by move ([`GameTree::apply_move`]); it
//! serializes back to PGN with [`GameTree::pgn`]. Navigation is by
//! [`NodeId`] handles into the tree's arena, and a tree plus a current
//! node round-trips through plain `(movetext, path)` pairs via
//! [`GameTree::path_to`] and [`GameTree::locate`].
//!
//! Move legality, SAN and FEN handling are delegated to `shakmaty`
//! through the [`rules`] module; this crate never implements chess rules
//! itself.

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

mod comment_parsing;
mod error;
mod mutate;
mod navigate;
mod parser;
pub mod rules;
mod tree;
mod writer;

pub use error::{Error, Result};
pub use navigate::Mainline;
pub use parser::parse_pgn;
pub use tree::{GameOutcome, GameTree, MoveInfo, NodeId, PositionNode, Score};
pub use writer::WriteOptions;

/// In parallel, parse a set of independent games.
///
/// Each input string is one game; trees do not share state, so the batch
/// splits cleanly across a thread pool. Fails on the first game that does
/// not parse.
pub fn parse_pgn_games(pgns: &[String], num_threads: Option<usize>) -> Result<Vec<GameTree>> {
    let num_threads = num_threads.unwrap_or_else(num_cpus::get);

    let thread_pool = ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
        .expect("Failed to build Rayon thread pool");

    thread_pool.install(|| pgns.par_iter().map(|pgn| parse_pgn(pgn)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakmaty::uci::UciMove;

    fn uci(s: &str) -> UciMove {
        s.parse().unwrap()
    }

    #[test]
    fn test_load_edit_save_cycle() {
        // the host application's life cycle: parse stored text, locate the
        // current node from a stored path, apply a move, serialize back
        let mut tree = parse_pgn("1. e4 e5 2. Nf3").unwrap();
        let current = tree.locate(&[0, 0]).unwrap();

        let bc4 = tree.apply_move(current, &uci("f1c4")).unwrap();
        assert_eq!(tree.path_to(bc4), vec![0, 0, 1]);

        let written = tree.pgn(&WriteOptions::default());
        assert_eq!(written, "1. e4 e5 2. Nf3 (2. Bc4)");

        let reloaded = parse_pgn(&written).unwrap();
        let relocated = reloaded.locate(&[0, 0, 1]).unwrap();
        assert_eq!(
            reloaded[relocated].produced_by().unwrap().san_text(),
            "Bc4"
        );
    }

    #[test]
    fn test_parse_pgn_games_in_parallel() {
        let pgns: Vec<String> = vec![
            "1. e4 e5 1-0".to_string(),
            "1. d4 d5 2. c4 0-1".to_string(),
            "1. Nf3 (1. e4 c5) 1... d5 1/2-1/2".to_string(),
        ];
        let trees = parse_pgn_games(&pgns, Some(2)).unwrap();
        assert_eq!(trees.len(), 3);
        assert_eq!(trees[0].outcome(), Some(GameOutcome::WhiteWins));
        assert_eq!(trees[1].mainline().count(), 3);
        assert_eq!(trees[2][trees[2].root()].children().len(), 2);
    }

    #[test]
    fn test_parse_pgn_games_surfaces_first_failure() {
        let pgns: Vec<String> = vec![
            "1. e4 e5".to_string(),
            "1. e4 (1... c5".to_string(),
        ];
        assert!(parse_pgn_games(&pgns, None).is_err());
    }
}
