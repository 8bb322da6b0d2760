//! Static Evaluation
//!
//! Scores a position as a signed scalar in pawns, positive for White.
//! Material dominates; piece-square tables, centre occupancy, king pressure,
//! development and check add small positional and tactical nudges.

use crate::rules::{manhattan_distance, RulesEngine};
use chess::{Color, Piece, Square};

/// Weight applied to piece-square table entries (which are in tenths of a pawn)
pub const POSITIONAL_SCALE: f32 = 0.15;
/// Per piece standing on d4, e4, d5 or e5
pub const CENTER_OCCUPANCY_BONUS: f32 = 0.2;
/// Per own piece within [`KING_PRESSURE_RADIUS`] of the enemy king
pub const KING_PRESSURE_BONUS: f32 = 0.1;
pub const KING_PRESSURE_RADIUS: usize = 4;
/// Knight or bishop still on its starting square
pub const UNDEVELOPED_PENALTY: f32 = 0.15;
/// Credited to the side giving check
pub const CHECK_BONUS: f32 = 0.5;

pub const CENTER_SQUARES: [Square; 4] = [Square::D4, Square::E4, Square::D5, Square::E5];

/// Material values in pawns
#[derive(Debug, Clone, Copy)]
pub struct PieceValues {
    pub pawn: f32,
    pub knight: f32,
    pub bishop: f32,
    pub rook: f32,
    pub queen: f32,
    pub king: f32,
}

impl Default for PieceValues {
    fn default() -> Self {
        Self {
            pawn: 1.0,
            knight: 3.0,
            bishop: 3.0,
            rook: 5.0,
            queen: 9.0,
            king: 0.0,
        }
    }
}

impl PieceValues {
    pub fn value(&self, piece: Piece) -> f32 {
        match piece {
            Piece::Pawn => self.pawn,
            Piece::Knight => self.knight,
            Piece::Bishop => self.bishop,
            Piece::Rook => self.rook,
            Piece::Queen => self.queen,
            Piece::King => self.king,
        }
    }
}

// Piece-square tables from White's side, a1 = 0 .. h8 = 63, tenths of a pawn.
// Black looks them up mirrored (index ^ 56).

#[rustfmt::skip]
const PAWN_TABLE: [i8; 64] = [
     0,  0,  0,  0,  0,  0,  0,  0,
     1,  1,  1, -2, -2,  1,  1,  1,
     1, -1, -1,  0,  0, -1, -1,  1,
     0,  0,  0,  2,  2,  0,  0,  0,
     1,  1,  1,  3,  3,  1,  1,  1,
     1,  1,  2,  3,  3,  2,  1,  1,
     5,  5,  5,  5,  5,  5,  5,  5,
     0,  0,  0,  0,  0,  0,  0,  0,
];

#[rustfmt::skip]
const KNIGHT_TABLE: [i8; 64] = [
    -5, -4, -3, -3, -3, -3, -4, -5,
    -4, -2,  0,  1,  1,  0, -2, -4,
    -3,  1,  1,  2,  2,  1,  1, -3,
    -3,  0,  2,  2,  2,  2,  0, -3,
    -3,  1,  2,  2,  2,  2,  1, -3,
    -3,  0,  1,  2,  2,  1,  0, -3,
    -4, -2,  0,  0,  0,  0, -2, -4,
    -5, -4, -3, -3, -3, -3, -4, -5,
];

#[rustfmt::skip]
const BISHOP_TABLE: [i8; 64] = [
    -2, -1, -1, -1, -1, -1, -1, -2,
    -1,  1,  0,  0,  0,  0,  1, -1,
    -1,  1,  1,  1,  1,  1,  1, -1,
    -1,  0,  1,  1,  1,  1,  0, -1,
    -1,  1,  1,  1,  1,  1,  1, -1,
    -1,  0,  1,  1,  1,  1,  0, -1,
    -1,  0,  0,  0,  0,  0,  0, -1,
    -2, -1, -1, -1, -1, -1, -1, -2,
];

#[rustfmt::skip]
const ROOK_TABLE: [i8; 64] = [
     0,  0,  1,  1,  1,  1,  0,  0,
    -1,  0,  0,  0,  0,  0,  0, -1,
    -1,  0,  0,  0,  0,  0,  0, -1,
    -1,  0,  0,  0,  0,  0,  0, -1,
    -1,  0,  0,  0,  0,  0,  0, -1,
    -1,  0,  0,  0,  0,  0,  0, -1,
     1,  1,  1,  1,  1,  1,  1,  1,
     0,  0,  0,  0,  0,  0,  0,  0,
];

#[rustfmt::skip]
const QUEEN_TABLE: [i8; 64] = [
    -2, -1, -1, -1, -1, -1, -1, -2,
    -1,  0,  1,  0,  0,  0,  0, -1,
    -1,  1,  1,  1,  1,  1,  0, -1,
     0,  0,  1,  1,  1,  1,  0, -1,
    -1,  0,  1,  1,  1,  1,  0, -1,
    -1,  0,  1,  1,  1,  1,  0, -1,
    -1,  0,  0,  0,  0,  0,  0, -1,
    -2, -1, -1, -1, -1, -1, -1, -2,
];

#[rustfmt::skip]
const KING_TABLE: [i8; 64] = [
     2,  3,  1,  0,  0,  1,  3,  2,
     2,  2,  0,  0,  0,  0,  2,  2,
    -1, -2, -2, -2, -2, -2, -2, -1,
    -2, -3, -3, -4, -4, -3, -3, -2,
    -3, -4, -4, -5, -5, -4, -4, -3,
    -3, -4, -4, -5, -5, -4, -4, -3,
    -3, -4, -4, -5, -5, -4, -4, -3,
    -3, -4, -4, -5, -5, -4, -4, -3,
];

fn piece_table(piece: Piece) -> &'static [i8; 64] {
    match piece {
        Piece::Pawn => &PAWN_TABLE,
        Piece::Knight => &KNIGHT_TABLE,
        Piece::Bishop => &BISHOP_TABLE,
        Piece::Rook => &ROOK_TABLE,
        Piece::Queen => &QUEEN_TABLE,
        Piece::King => &KING_TABLE,
    }
}

/// Piece-square value in pawns for `piece` of `color` on `square`
pub fn positional_value(piece: Piece, color: Color, square: Square) -> f32 {
    let index = match color {
        Color::White => square.to_index(),
        Color::Black => square.to_index() ^ 56,
    };
    assert!(index < 64, "square index out of range: {}", index);
    piece_table(piece)[index] as f32 * POSITIONAL_SCALE
}

fn is_home_square(piece: Piece, color: Color, square: Square) -> bool {
    let homes: [Square; 2] = match (piece, color) {
        (Piece::Knight, Color::White) => [Square::B1, Square::G1],
        (Piece::Knight, Color::Black) => [Square::B8, Square::G8],
        (Piece::Bishop, Color::White) => [Square::C1, Square::F1],
        (Piece::Bishop, Color::Black) => [Square::C8, Square::F8],
        _ => return false,
    };
    homes.contains(&square)
}

fn sign(color: Color) -> f32 {
    match color {
        Color::White => 1.0,
        Color::Black => -1.0,
    }
}

/// Orient a White-positive score for `side`
pub fn oriented(score: f32, side: Color) -> f32 {
    score * sign(side)
}

/// Anything that can put a number on a position
pub trait PositionEvaluator<R: RulesEngine> {
    /// White-positive score; must not mutate the position
    fn evaluate(&self, rules: &R, position: &R::Position) -> f32;
}

/// One occupied square as seen by the evaluator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedPiece {
    pub square: Square,
    pub piece: Piece,
    pub color: Color,
}

/// Heuristic evaluator: material, piece-square tables and tactical nudges
#[derive(Debug, Clone, Default)]
pub struct StaticEvaluator {
    piece_values: PieceValues,
}

impl StaticEvaluator {
    pub fn new(piece_values: PieceValues) -> Self {
        Self { piece_values }
    }

    /// Score a piece listing directly. `checked_side` is the side to move
    /// when it is in check.
    pub fn score_pieces(&self, pieces: &[PlacedPiece], checked_side: Option<Color>) -> f32 {
        let king_of = |color: Color| {
            pieces
                .iter()
                .find(|p| p.piece == Piece::King && p.color == color)
                .map(|p| p.square)
        };
        let white_king = king_of(Color::White);
        let black_king = king_of(Color::Black);

        let mut score = 0.0;
        for placed in pieces {
            let s = sign(placed.color);

            score += s * self.piece_values.value(placed.piece);
            score += s * positional_value(placed.piece, placed.color, placed.square);

            if CENTER_SQUARES.contains(&placed.square) {
                score += s * CENTER_OCCUPANCY_BONUS;
            }

            let enemy_king = match placed.color {
                Color::White => black_king,
                Color::Black => white_king,
            };
            if let Some(king) = enemy_king {
                if manhattan_distance(placed.square, king) <= KING_PRESSURE_RADIUS {
                    score += s * KING_PRESSURE_BONUS;
                }
            }

            if is_home_square(placed.piece, placed.color, placed.square) {
                score -= s * UNDEVELOPED_PENALTY;
            }
        }

        // The side giving check is the one not to move
        if let Some(checked) = checked_side {
            score -= sign(checked) * CHECK_BONUS;
        }

        score
    }

    /// Every occupied square of `position`, a1 first
    pub fn collect_pieces<R: RulesEngine>(rules: &R, position: &R::Position) -> Vec<PlacedPiece> {
        chess::ALL_SQUARES
            .iter()
            .filter_map(|&square| {
                rules
                    .piece_at(position, square)
                    .map(|(piece, color)| PlacedPiece {
                        square,
                        piece,
                        color,
                    })
            })
            .collect()
    }
}

impl<R: RulesEngine> PositionEvaluator<R> for StaticEvaluator {
    fn evaluate(&self, rules: &R, position: &R::Position) -> f32 {
        let pieces = Self::collect_pieces(rules, position);
        let checked_side = if rules.is_check(position) {
            Some(rules.side_to_move(position))
        } else {
            None
        };
        self.score_pieces(&pieces, checked_side)
    }
}
