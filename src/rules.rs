//! Rules-engine boundary.
//!
//! Move selection never looks inside a position. Everything it needs (legal
//! moves, piece lookups, check and termination flags, notation, canonical keys)
//! goes through [`RulesEngine`], so alternate engines can be dropped in for
//! testing. Squares, piece kinds and sides are the `chess` crate's value types.

use crate::errors::Result;
use chess::{ChessMove, Color, Piece, Square};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

/// Final outcome of a finished game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    WhiteWins,
    BlackWins,
    Draw,
}

impl GameResult {
    /// Playout tally from `side`'s point of view: +1 win, -1 loss, 0 draw
    pub fn score_for(self, side: Color) -> f32 {
        match (self, side) {
            (GameResult::Draw, _) => 0.0,
            (GameResult::WhiteWins, Color::White) | (GameResult::BlackWins, Color::Black) => 1.0,
            _ => -1.0,
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameResult::WhiteWins => write!(f, "1-0"),
            GameResult::BlackWins => write!(f, "0-1"),
            GameResult::Draw => write!(f, "1/2-1/2"),
        }
    }
}

/// Capability surface consumed from the rules engine.
///
/// `push` and `pop` must be strictly balanced by every caller; inside this
/// crate that is done through [`RulesEngine::scoped_push`].
pub trait RulesEngine {
    type Position: Clone;

    fn initial_position(&self) -> Self::Position;
    fn position_from_fen(&self, fen: &str) -> Result<Self::Position>;

    /// Empty iff the position is terminal by checkmate or stalemate
    fn legal_moves(&self, position: &Self::Position) -> Vec<ChessMove>;
    fn is_legal(&self, position: &Self::Position, chess_move: ChessMove) -> bool {
        self.legal_moves(position).contains(&chess_move)
    }

    fn push(&self, position: &mut Self::Position, chess_move: ChessMove);
    fn pop(&self, position: &mut Self::Position);

    fn piece_at(&self, position: &Self::Position, square: Square) -> Option<(Piece, Color)>;
    fn side_to_move(&self, position: &Self::Position) -> Color;
    fn king_square(&self, position: &Self::Position, side: Color) -> Option<Square>;

    fn is_check(&self, position: &Self::Position) -> bool;
    fn is_checkmate(&self, position: &Self::Position) -> bool;
    fn is_stalemate(&self, position: &Self::Position) -> bool;
    fn is_game_over(&self, position: &Self::Position) -> bool;
    fn result(&self, position: &Self::Position) -> Option<GameResult>;

    fn to_notation(&self, position: &Self::Position, chess_move: ChessMove) -> String;
    /// Fails on unparseable or illegal text
    fn parse_notation(&self, position: &Self::Position, text: &str) -> Result<ChessMove>;

    /// Lossless key over placement, side to move, castling and en-passant rights
    fn canonical_key(&self, position: &Self::Position) -> String;

    fn is_castling(&self, position: &Self::Position, chess_move: ChessMove) -> bool {
        let source = chess_move.get_source();
        let dest = chess_move.get_dest();
        matches!(self.piece_at(position, source), Some((Piece::King, _)))
            && source.get_file().to_index().abs_diff(dest.get_file().to_index()) == 2
    }

    /// Push `chess_move` and get a guard that pops it again when dropped,
    /// including while unwinding from a panic.
    fn scoped_push<'a>(
        &'a self,
        position: &'a mut Self::Position,
        chess_move: ChessMove,
    ) -> ScopedMove<'a, Self>
    where
        Self: Sized,
    {
        self.push(position, chess_move);
        ScopedMove {
            rules: self,
            position,
        }
    }
}

/// A hypothetical move applied to a private position copy
pub struct ScopedMove<'a, R: RulesEngine> {
    rules: &'a R,
    position: &'a mut R::Position,
}

impl<R: RulesEngine> Deref for ScopedMove<'_, R> {
    type Target = R::Position;

    fn deref(&self) -> &Self::Target {
        &*self.position
    }
}

impl<R: RulesEngine> Drop for ScopedMove<'_, R> {
    fn drop(&mut self) {
        self.rules.pop(self.position);
    }
}

/// Manhattan distance between two squares
pub fn manhattan_distance(a: Square, b: Square) -> usize {
    a.get_file().to_index().abs_diff(b.get_file().to_index())
        + a.get_rank().to_index().abs_diff(b.get_rank().to_index())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_scores() {
        assert_eq!(GameResult::WhiteWins.score_for(Color::White), 1.0);
        assert_eq!(GameResult::WhiteWins.score_for(Color::Black), -1.0);
        assert_eq!(GameResult::BlackWins.score_for(Color::Black), 1.0);
        assert_eq!(GameResult::Draw.score_for(Color::White), 0.0);
    }

    #[test]
    fn test_result_display() {
        assert_eq!(GameResult::WhiteWins.to_string(), "1-0");
        assert_eq!(GameResult::BlackWins.to_string(), "0-1");
        assert_eq!(GameResult::Draw.to_string(), "1/2-1/2");
    }

    #[test]
    fn test_manhattan_distance() {
        assert_eq!(manhattan_distance(Square::A1, Square::A1), 0);
        assert_eq!(manhattan_distance(Square::A1, Square::H8), 14);
        assert_eq!(manhattan_distance(Square::E4, Square::D5), 2);
    }
}
