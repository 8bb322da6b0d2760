//! Move scoring for the hybrid strategy.
//!
//! A candidate's score is the post-move static evaluation, seen from the side
//! making the move, plus a stack of flat bonuses that push the engine towards
//! captures, checks, central and king-side activity. The bonuses are summed
//! unconditionally whenever their guard holds.

use crate::evaluation::{oriented, PositionEvaluator, CENTER_SQUARES};
use crate::history::MoveHistory;
use crate::repetition::AiMoveMemory;
use crate::rules::{manhattan_distance, RulesEngine};
use chess::{ChessMove, Color, Piece};

pub const CAPTURE_BONUS: f32 = 1.0;
pub const CENTER_CONTROL_BONUS: f32 = 0.6;
pub const DEVELOPMENT_BONUS: f32 = 0.4;
/// Development bonus only applies while the history is shorter than this
pub const DEVELOPMENT_PLIES: usize = 10;
pub const CASTLING_BONUS: f32 = 0.2;
pub const CHECK_BONUS: f32 = 0.8;
pub const KING_NEAR_BONUS: f32 = 0.6;
pub const KING_NEAR_DISTANCE: usize = 3;
pub const KING_APPROACH_BONUS: f32 = 0.3;
pub const KING_APPROACH_DISTANCE: usize = 5;
pub const ATTACK_TARGET_BONUS: f32 = 0.5;
pub const DISCOVERED_ATTACK_BONUS: f32 = 0.2;
pub const PAWN_ADVANCE_BONUS: f32 = 0.3;
pub const QUEEN_ACTIVITY_BONUS: f32 = 0.4;
pub const SAME_PIECE_PENALTY: f32 = -0.1;
pub const CHECKMATE_BONUS: f32 = 10.0;
pub const LINGERING_CHECK_BONUS: f32 = 0.5;

/// Individual terms of a move score
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreBreakdown {
    pub base: f32,
    pub capture: f32,
    pub center_control: f32,
    pub development: f32,
    pub castling: f32,
    pub check: f32,
    pub king_proximity: f32,
    pub attack_presence: f32,
    pub pawn_advance: f32,
    pub queen_activity: f32,
    pub same_piece: f32,
    pub mate_threat: f32,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f32 {
        self.base
            + self.capture
            + self.center_control
            + self.development
            + self.castling
            + self.check
            + self.king_proximity
            + self.attack_presence
            + self.pawn_advance
            + self.queen_activity
            + self.same_piece
            + self.mate_threat
    }
}

/// Scores one candidate move in the context of the game so far
#[derive(Debug, Clone, Default)]
pub struct MoveScorer<E> {
    evaluator: E,
}

impl<E> MoveScorer<E> {
    pub fn new(evaluator: E) -> Self {
        Self { evaluator }
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    pub fn score<R>(
        &self,
        rules: &R,
        position: &mut R::Position,
        chess_move: ChessMove,
        history: &MoveHistory,
        memory: &AiMoveMemory,
    ) -> f32
    where
        R: RulesEngine,
        E: PositionEvaluator<R>,
    {
        self.breakdown(rules, position, chess_move, history, memory)
            .total()
    }

    /// Score `chess_move` term by term. The move is pushed on `position` to
    /// look at the result and popped again on every exit path.
    pub fn breakdown<R>(
        &self,
        rules: &R,
        position: &mut R::Position,
        chess_move: ChessMove,
        history: &MoveHistory,
        memory: &AiMoveMemory,
    ) -> ScoreBreakdown
    where
        R: RulesEngine,
        E: PositionEvaluator<R>,
    {
        let source = chess_move.get_source();
        let dest = chess_move.get_dest();
        let mover = rules.side_to_move(position);
        let opponent = !mover;
        let moved = rules.piece_at(position, source).map(|(piece, _)| piece);

        let mut terms = ScoreBreakdown::default();

        if matches!(rules.piece_at(position, dest), Some((_, color)) if color == opponent) {
            terms.capture = CAPTURE_BONUS;
        }

        if CENTER_SQUARES.contains(&dest) {
            terms.center_control = CENTER_CONTROL_BONUS;
        }

        if history.len() < DEVELOPMENT_PLIES
            && matches!(moved, Some(Piece::Knight) | Some(Piece::Bishop))
        {
            terms.development = DEVELOPMENT_BONUS;
        }

        if rules.is_castling(position, chess_move) {
            terms.castling = CASTLING_BONUS;
        }

        if let Some(king) = rules.king_square(position, opponent) {
            let distance = manhattan_distance(dest, king);
            if distance <= KING_NEAR_DISTANCE {
                terms.king_proximity = KING_NEAR_BONUS;
            } else if distance <= KING_APPROACH_DISTANCE {
                terms.king_proximity = KING_APPROACH_BONUS;
            }
        }

        // No line-of-sight test: every enemy piece off the destination earns
        // the discovered-attack credit.
        for square in chess::ALL_SQUARES {
            if !matches!(rules.piece_at(position, square), Some((_, color)) if color == opponent) {
                continue;
            }
            if square == dest {
                terms.attack_presence += ATTACK_TARGET_BONUS;
            } else if square != source {
                terms.attack_presence += DISCOVERED_ATTACK_BONUS;
            }
        }

        if moved == Some(Piece::Pawn) {
            let (from_rank, to_rank) = (source.get_rank().to_index(), dest.get_rank().to_index());
            let advancing = match mover {
                Color::White => to_rank > from_rank,
                Color::Black => to_rank < from_rank,
            };
            if advancing {
                terms.pawn_advance = PAWN_ADVANCE_BONUS;
            }
        }

        if moved == Some(Piece::Queen) {
            terms.queen_activity = QUEEN_ACTIVITY_BONUS;
        }

        if memory.last().map(|m| m.get_source()) == Some(source) {
            terms.same_piece = SAME_PIECE_PENALTY;
        }

        let scoped = rules.scoped_push(position, chess_move);
        let after: &R::Position = &scoped;
        terms.base = oriented(self.evaluator.evaluate(rules, after), mover);
        let gives_check = rules.is_check(after);
        if gives_check {
            terms.check = CHECK_BONUS;
        }
        if rules.is_checkmate(after) {
            terms.mate_threat = CHECKMATE_BONUS;
        } else if gives_check {
            terms.mate_threat = LINGERING_CHECK_BONUS;
        }
        drop(scoped);

        terms
    }
}
