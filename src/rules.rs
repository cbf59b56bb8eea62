//! Boundary to the move-legality engine (shakmaty).
//!
//! Everything the tree needs from the rules of chess goes through this
//! module: validating a move against a FEN, deriving its SAN text and the
//! resulting position, enumerating legal destinations for the board UI,
//! and checkmate detection. The tree itself never inspects piece placement.

use crate::error::{Error, Result};
use shakmaty::{
    fen::Fen,
    san::{San, SanPlus},
    uci::UciMove,
    CastlingMode, Chess, EnPassantMode, Move, Position, Square,
};

/// FEN of the standard starting position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Result of validating a move: the engine move, its algebraic text
/// (with check/checkmate suffix), and the position it leads to.
#[derive(Debug, Clone)]
pub struct MoveOutcome {
    pub m: Move,
    pub san: SanPlus,
    pub fen_after: String,
}

/// Parse a FEN into a playable position.
///
/// Syntactic well-formedness and position legality are both checked here;
/// either failure maps to [`Error::InvalidFen`].
pub fn position(fen: &str, mode: CastlingMode) -> Result<Chess> {
    let parsed: Fen = fen
        .parse()
        .map_err(|e| Error::InvalidFen(format!("{e}: {fen}")))?;
    parsed
        .into_position(mode)
        .map_err(|e| Error::InvalidFen(format!("{e}: {fen}")))
}

/// Canonical FEN for a position.
pub fn fen_of(pos: &Chess) -> String {
    Fen::from_position(pos, EnPassantMode::Legal).to_string()
}

/// Validate a from/to/promotion move against a position.
pub fn validate_move(fen: &str, uci: &UciMove, mode: CastlingMode) -> Result<MoveOutcome> {
    let pos = position(fen, mode)?;
    let m = uci.to_move(&pos).map_err(|_| Error::IllegalMove {
        mv: uci.to_string(),
        fen: fen.to_string(),
    })?;
    Ok(outcome_of(pos, m))
}

/// Validate a move given in standard algebraic notation.
pub fn validate_san(fen: &str, san: &San, mode: CastlingMode) -> Result<MoveOutcome> {
    let pos = position(fen, mode)?;
    let m = san.to_move(&pos).map_err(|_| Error::IllegalMove {
        mv: san.to_string(),
        fen: fen.to_string(),
    })?;
    Ok(outcome_of(pos, m))
}

/// Play an already-validated move, deriving its canonical SAN on the way.
fn outcome_of(mut pos: Chess, m: Move) -> MoveOutcome {
    let san = SanPlus::from_move_and_play_unchecked(&mut pos, m);
    MoveOutcome {
        m,
        san,
        fen_after: fen_of(&pos),
    }
}

/// Squares a piece on `from` can legally move to.
pub fn legal_destinations(fen: &str, from: Square, mode: CastlingMode) -> Result<Vec<Square>> {
    let pos = position(fen, mode)?;
    Ok(pos
        .legal_moves()
        .iter()
        .filter(|m| m.from() == Some(from))
        .map(|m| m.to())
        .collect())
}

/// Whether the side to move is checkmated.
pub fn is_checkmate(fen: &str, mode: CastlingMode) -> Result<bool> {
    Ok(position(fen, mode)?.is_checkmate())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starting_fen_round_trips() {
        let pos = position(STARTING_FEN, CastlingMode::Standard).unwrap();
        assert_eq!(fen_of(&pos), STARTING_FEN);
    }

    #[test]
    fn test_validate_legal_move() {
        let uci: UciMove = "e2e4".parse().unwrap();
        let outcome = validate_move(STARTING_FEN, &uci, CastlingMode::Standard).unwrap();
        assert_eq!(outcome.san.to_string(), "e4");
        assert!(outcome.fen_after.starts_with("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b"));
    }

    #[test]
    fn test_validate_illegal_move() {
        let uci: UciMove = "e2e5".parse().unwrap();
        let result = validate_move(STARTING_FEN, &uci, CastlingMode::Standard);
        assert!(matches!(result, Err(Error::IllegalMove { .. })));
    }

    #[test]
    fn test_validate_san_with_check_suffix() {
        // 1. f3 e5 2. g4, and Qh4 is mate
        let fen = "rnbqkbnr/pppp1ppp/8/4p3/6P1/5P2/PPPPP2P/RNBQKBNR b KQkq - 0 2";
        let san: San = "Qh4".parse().unwrap();
        let outcome = validate_san(fen, &san, CastlingMode::Standard).unwrap();
        assert_eq!(outcome.san.to_string(), "Qh4#");
        assert!(is_checkmate(&outcome.fen_after, CastlingMode::Standard).unwrap());
    }

    #[test]
    fn test_legal_destinations_from_e2() {
        let from = Square::E2;
        let destinations =
            legal_destinations(STARTING_FEN, from, CastlingMode::Standard).unwrap();
        assert_eq!(destinations.len(), 2);
        assert!(destinations.contains(&Square::E3));
        assert!(destinations.contains(&Square::E4));
    }

    #[test]
    fn test_invalid_fen_rejected() {
        assert!(matches!(
            position("not a fen", CastlingMode::Standard),
            Err(Error::InvalidFen(_))
        ));
    }
}
