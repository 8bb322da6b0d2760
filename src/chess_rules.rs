//! Rules engine backed by the `chess` crate.
//!
//! `chess::Board` is copy-make and carries no move counters, so
//! [`GamePosition`] adds the undo stack, the halfmove clock and the hash trail
//! needed for push/pop and for draw detection (75-move rule, fivefold
//! repetition, insufficient material).

use crate::errors::{EngineError, Result};
use crate::notation;
use crate::rules::{GameResult, RulesEngine};
use chess::{BitBoard, Board, BoardStatus, ChessMove, Color, MoveGen, Piece, Square, EMPTY};
use std::str::FromStr;

/// Half-moves without a capture or pawn move that end the game
pub const SEVENTY_FIVE_MOVE_PLIES: u32 = 150;
/// Occurrences of one position that end the game
pub const FIVEFOLD_REPETITION: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Snapshot {
    board: Board,
    halfmove_clock: u32,
}

/// A chess position with the bookkeeping `chess::Board` leaves out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GamePosition {
    board: Board,
    halfmove_clock: u32,
    undo_stack: Vec<Snapshot>,
    /// Hash of every position reached, the current one last
    hash_trail: Vec<u64>,
}

impl GamePosition {
    pub fn new(board: Board, halfmove_clock: u32) -> Self {
        Self {
            board,
            halfmove_clock,
            undo_stack: Vec::new(),
            hash_trail: vec![board.get_hash()],
        }
    }

    pub fn from_fen(fen: &str) -> Result<Self> {
        let board = Board::from_str(fen)
            .map_err(|_e| EngineError::InvalidPosition(format!("invalid FEN: {}", fen)))?;
        let halfmove_clock = match fen.split_whitespace().nth(4) {
            Some(field) => field.parse::<u32>()?,
            None => 0,
        };
        Ok(Self::new(board, halfmove_clock))
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    /// Number of moves pushed since this position was created
    pub fn depth(&self) -> usize {
        self.undo_stack.len()
    }

    fn make_move(&mut self, chess_move: ChessMove) {
        let irreversible = self.board.piece_on(chess_move.get_source()) == Some(Piece::Pawn)
            || self.board.piece_on(chess_move.get_dest()).is_some();

        self.undo_stack.push(Snapshot {
            board: self.board,
            halfmove_clock: self.halfmove_clock,
        });
        self.board = self.board.make_move_new(chess_move);
        self.halfmove_clock = if irreversible {
            0
        } else {
            self.halfmove_clock + 1
        };
        self.hash_trail.push(self.board.get_hash());
    }

    fn unmake_move(&mut self) {
        if let Some(snapshot) = self.undo_stack.pop() {
            self.board = snapshot.board;
            self.halfmove_clock = snapshot.halfmove_clock;
            self.hash_trail.pop();
        }
    }

    fn repetition_count(&self) -> usize {
        let current = self.board.get_hash();
        // Positions before the last irreversible move cannot recur
        let window = (self.halfmove_clock as usize + 1).min(self.hash_trail.len());
        self.hash_trail[self.hash_trail.len() - window..]
            .iter()
            .filter(|&&hash| hash == current)
            .count()
    }

    fn has_insufficient_material(&self) -> bool {
        let board = &self.board;
        let heavy = *board.pieces(Piece::Pawn) | *board.pieces(Piece::Rook) | *board.pieces(Piece::Queen);
        if heavy != EMPTY {
            return false;
        }

        let knights = *board.pieces(Piece::Knight);
        let bishops = *board.pieces(Piece::Bishop);
        let minors = (knights | bishops).popcnt();

        match minors {
            0 | 1 => true,
            2 if knights == EMPTY => {
                // One bishop each, both on the same square colour
                let white = bishops & *board.color_combined(Color::White);
                let black = bishops & *board.color_combined(Color::Black);
                white.popcnt() == 1 && black.popcnt() == 1 && {
                    let shade = |bb: BitBoard| {
                        let sq = bb.to_square();
                        (sq.get_rank().to_index() + sq.get_file().to_index()) % 2
                    };
                    shade(white) == shade(black)
                }
            }
            _ => false,
        }
    }
}

impl Default for GamePosition {
    fn default() -> Self {
        Self::new(Board::default(), 0)
    }
}

/// The default rules engine
#[derive(Debug, Clone, Copy, Default)]
pub struct ChessRules;

impl ChessRules {
    pub fn new() -> Self {
        Self
    }
}

impl RulesEngine for ChessRules {
    type Position = GamePosition;

    fn initial_position(&self) -> GamePosition {
        GamePosition::default()
    }

    fn position_from_fen(&self, fen: &str) -> Result<GamePosition> {
        GamePosition::from_fen(fen)
    }

    fn legal_moves(&self, position: &GamePosition) -> Vec<ChessMove> {
        MoveGen::new_legal(&position.board).collect()
    }

    fn is_legal(&self, position: &GamePosition, chess_move: ChessMove) -> bool {
        position.board.legal(chess_move)
    }

    fn push(&self, position: &mut GamePosition, chess_move: ChessMove) {
        position.make_move(chess_move);
    }

    fn pop(&self, position: &mut GamePosition) {
        position.unmake_move();
    }

    fn piece_at(&self, position: &GamePosition, square: Square) -> Option<(Piece, Color)> {
        let piece = position.board.piece_on(square)?;
        let color = position.board.color_on(square)?;
        Some((piece, color))
    }

    fn side_to_move(&self, position: &GamePosition) -> Color {
        position.board.side_to_move()
    }

    fn king_square(&self, position: &GamePosition, side: Color) -> Option<Square> {
        let kings = *position.board.pieces(Piece::King) & *position.board.color_combined(side);
        if kings == EMPTY {
            None
        } else {
            Some(kings.to_square())
        }
    }

    fn is_check(&self, position: &GamePosition) -> bool {
        *position.board.checkers() != EMPTY
    }

    fn is_checkmate(&self, position: &GamePosition) -> bool {
        position.board.status() == BoardStatus::Checkmate
    }

    fn is_stalemate(&self, position: &GamePosition) -> bool {
        position.board.status() == BoardStatus::Stalemate
    }

    fn is_game_over(&self, position: &GamePosition) -> bool {
        self.result(position).is_some()
    }

    fn result(&self, position: &GamePosition) -> Option<GameResult> {
        match position.board.status() {
            BoardStatus::Checkmate => {
                // The side to move has been mated
                return Some(match position.board.side_to_move() {
                    Color::White => GameResult::BlackWins,
                    Color::Black => GameResult::WhiteWins,
                });
            }
            BoardStatus::Stalemate => return Some(GameResult::Draw),
            BoardStatus::Ongoing => {}
        }

        if position.halfmove_clock >= SEVENTY_FIVE_MOVE_PLIES
            || position.has_insufficient_material()
            || position.repetition_count() >= FIVEFOLD_REPETITION
        {
            Some(GameResult::Draw)
        } else {
            None
        }
    }

    fn to_notation(&self, position: &GamePosition, chess_move: ChessMove) -> String {
        notation::format_san(&position.board, chess_move)
    }

    fn parse_notation(&self, position: &GamePosition, text: &str) -> Result<ChessMove> {
        notation::parse_move(&position.board, text).ok_or_else(|| {
            EngineError::InvalidNotation(format!(
                "'{}' is not a legal move in {}",
                text.trim(),
                position.board
            ))
        })
    }

    fn canonical_key(&self, position: &GamePosition) -> String {
        // Placement, side, castling and en passant; move counters are dropped
        position
            .board
            .to_string()
            .split_whitespace()
            .take(4)
            .collect::<Vec<_>>()
            .join(" ")
    }
}
