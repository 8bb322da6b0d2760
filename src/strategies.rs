//! Move-selection strategies for the three difficulty tiers.

use crate::errors::{EngineError, Result};
use crate::evaluation::{oriented, PositionEvaluator};
use crate::history::MoveHistory;
use crate::move_scorer::MoveScorer;
use crate::opening_book::{OpeningBook, OPENING_BOOK_PLIES};
use crate::repetition::{filter_repeats, AiMoveMemory};
use crate::rules::RulesEngine;
use chess::ChessMove;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, trace};

/// Sampling weights for the best, second and third scored candidates
pub const TOP_K_WEIGHTS: [f32; 3] = [1.0, 0.5, 0.2];

/// Difficulty tier requested by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(EngineError::ValidationError {
                field: "difficulty".to_string(),
                value: s.to_string(),
                expected: "easy, medium or hard".to_string(),
            }),
        }
    }
}

/// Search used for the hard tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HardEngine {
    #[default]
    Hybrid,
    Playout,
}

impl fmt::Display for HardEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HardEngine::Hybrid => write!(f, "hybrid"),
            HardEngine::Playout => write!(f, "playout"),
        }
    }
}

impl FromStr for HardEngine {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "hybrid" => Ok(HardEngine::Hybrid),
            "playout" => Ok(HardEngine::Playout),
            _ => Err(EngineError::ValidationError {
                field: "hard_engine".to_string(),
                value: s.to_string(),
                expected: "hybrid or playout".to_string(),
            }),
        }
    }
}

/// Uniformly random legal move
pub fn random_move<R, G>(rules: &R, position: &R::Position, rng: &mut G) -> Result<ChessMove>
where
    R: RulesEngine,
    G: Rng + ?Sized,
{
    rules
        .legal_moves(position)
        .choose(rng)
        .copied()
        .ok_or(EngineError::NoLegalMoves)
}

/// One-ply lookahead on the static evaluation. Only a strictly better score
/// replaces the current best, so the first of equal moves is kept.
pub fn greedy_move<R, E, G>(
    rules: &R,
    evaluator: &E,
    position: &R::Position,
    rng: &mut G,
) -> Result<ChessMove>
where
    R: RulesEngine,
    E: PositionEvaluator<R>,
    G: Rng + ?Sized,
{
    let legal = rules.legal_moves(position);
    if legal.is_empty() {
        return random_move(rules, position, rng);
    }

    let mover = rules.side_to_move(position);
    let mut scratch = position.clone();
    let mut best: Option<(ChessMove, f32)> = None;

    for chess_move in legal {
        let after = rules.scoped_push(&mut scratch, chess_move);
        let score = oriented(evaluator.evaluate(rules, &*after), mover);
        drop(after);

        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((chess_move, score)),
        }
    }

    best.map(|(chess_move, _)| chess_move)
        .ok_or(EngineError::NoLegalMoves)
}

/// Weighted draw over `candidates`, which are expected best first. Only as
/// many weights as there are candidates are used. Returns `None` when there
/// is nothing to pick from.
pub fn weighted_pick<T, G>(candidates: &[T], weights: &[f32], rng: &mut G) -> Option<T>
where
    T: Copy,
    G: Rng + ?Sized,
{
    let k = candidates.len().min(weights.len());
    if k == 0 {
        return None;
    }

    let total: f32 = weights[..k].iter().sum();
    if total <= 0.0 {
        return candidates.first().copied();
    }

    let r = rng.gen_range(0.0..total);
    let mut cumulative = 0.0;
    for (candidate, weight) in candidates[..k].iter().zip(&weights[..k]) {
        cumulative += weight;
        if cumulative >= r {
            return Some(*candidate);
        }
    }
    // Float rounding can leave the last bucket a hair short
    Some(candidates[k - 1])
}

/// Moves ordered best first. The sort is stable, so equal scores keep the
/// order they came in.
fn rank_by_score(mut scored: Vec<(ChessMove, f32)>) -> Vec<ChessMove> {
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    for (chess_move, score) in scored.iter().take(TOP_K_WEIGHTS.len()) {
        trace!("candidate {} scored {:.2}", chess_move, score);
    }
    scored.into_iter().map(|(chess_move, _)| chess_move).collect()
}

/// Opening book, anti-repetition filter, heuristic scoring and a weighted
/// pick among the best three. The returned move is recorded in `memory`.
pub fn hybrid_move<R, E, G>(
    rules: &R,
    scorer: &MoveScorer<E>,
    book: &OpeningBook,
    position: &R::Position,
    history: &MoveHistory,
    memory: &mut AiMoveMemory,
    rng: &mut G,
) -> Result<ChessMove>
where
    R: RulesEngine,
    E: PositionEvaluator<R>,
    G: Rng + ?Sized,
{
    if history.len() < OPENING_BOOK_PLIES {
        if let Some(book_move) = book.lookup(rules, position) {
            debug!("book move {}", rules.to_notation(position, book_move));
            memory.record(book_move);
            return Ok(book_move);
        }
    }

    let legal = rules.legal_moves(position);
    if legal.is_empty() {
        return Err(EngineError::NoLegalMoves);
    }

    let candidates = filter_repeats(&legal, memory);
    let mut scratch = position.clone();
    let scored: Vec<(ChessMove, f32)> = candidates
        .into_iter()
        .map(|chess_move| {
            let score = scorer.score(rules, &mut scratch, chess_move, history, memory);
            (chess_move, score)
        })
        .collect();

    let ranked = rank_by_score(scored);
    let chosen = match weighted_pick(&ranked, &TOP_K_WEIGHTS, rng) {
        Some(chess_move) => chess_move,
        None => *legal.choose(rng).ok_or(EngineError::NoLegalMoves)?,
    };

    memory.record(chosen);
    Ok(chosen)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess_rules::{ChessRules, GamePosition};
    use crate::evaluation::StaticEvaluator;
    use crate::history::MoveRecord;
    use chess::Square;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const STALEMATE_FEN: &str = "7k/5Q2/6K1/8/8/8/8/8 b - - 0 1";

    fn placeholder() -> ChessMove {
        ChessMove::new(Square::A1, Square::A2, None)
    }

    #[test]
    fn test_difficulty_parsing() {
        assert_eq!("Easy".parse::<Difficulty>().unwrap(), Difficulty::Easy);
        assert_eq!("hard".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!("insane".parse::<Difficulty>().is_err());
        assert_eq!("PLAYOUT".parse::<HardEngine>().unwrap(), HardEngine::Playout);
        assert_eq!(Difficulty::Medium.to_string(), "medium");
    }

    #[test]
    fn test_random_move_is_legal() {
        let rules = ChessRules::new();
        let position = rules.initial_position();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let chess_move = random_move(&rules, &position, &mut rng).unwrap();
            assert!(rules.is_legal(&position, chess_move));
        }
    }

    #[test]
    fn test_no_legal_moves_is_an_error() {
        let rules = ChessRules::new();
        let position = rules.position_from_fen(STALEMATE_FEN).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let evaluator = StaticEvaluator::default();

        assert_eq!(
            random_move(&rules, &position, &mut rng),
            Err(EngineError::NoLegalMoves)
        );
        assert_eq!(
            greedy_move(&rules, &evaluator, &position, &mut rng),
            Err(EngineError::NoLegalMoves)
        );
    }

    #[test]
    fn test_greedy_from_start_is_best_first_move() {
        let rules = ChessRules::new();
        let evaluator = StaticEvaluator::default();
        let mut position = rules.initial_position();
        let mut rng = StdRng::seed_from_u64(3);

        let chosen = greedy_move(&rules, &evaluator, &position, &mut rng).unwrap();
        let score_of = |position: &mut GamePosition, m: ChessMove| {
            let after = rules.scoped_push(position, m);
            let score = PositionEvaluator::evaluate(&evaluator, &rules, &*after);
            score
        };
        let chosen_score = score_of(&mut position, chosen);
        for other in rules.legal_moves(&rules.initial_position()) {
            assert!(chosen_score >= score_of(&mut position, other));
        }
    }

    #[test]
    fn test_greedy_takes_free_queen() {
        let rules = ChessRules::new();
        let evaluator = StaticEvaluator::default();
        let position = rules
            .position_from_fen("4k3/8/8/3q4/8/8/3R4/4K3 w - - 0 1")
            .unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let chosen = greedy_move(&rules, &evaluator, &position, &mut rng).unwrap();
        assert_eq!(rules.to_notation(&position, chosen), "Rxd5");
    }

    struct FlatEvaluator;

    impl PositionEvaluator<ChessRules> for FlatEvaluator {
        fn evaluate(&self, _rules: &ChessRules, _position: &GamePosition) -> f32 {
            0.0
        }
    }

    #[test]
    fn test_greedy_keeps_first_of_equal_moves() {
        let rules = ChessRules::new();
        let mut rng = StdRng::seed_from_u64(5);
        for fen in [
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3",
        ] {
            let position = rules.position_from_fen(fen).unwrap();
            let chosen = greedy_move(&rules, &FlatEvaluator, &position, &mut rng).unwrap();
            assert_eq!(chosen, rules.legal_moves(&position)[0]);
        }
    }

    #[test]
    fn test_ranking_keeps_legal_order_on_ties() {
        let rules = ChessRules::new();
        let legal = rules.legal_moves(&rules.initial_position());

        let flat: Vec<(ChessMove, f32)> = legal.iter().map(|&m| (m, 1.0)).collect();
        assert_eq!(rank_by_score(flat), legal);

        let mixed = vec![
            (legal[0], 0.5),
            (legal[1], 1.0),
            (legal[2], 0.5),
            (legal[3], 1.0),
        ];
        assert_eq!(
            rank_by_score(mixed),
            vec![legal[1], legal[3], legal[0], legal[2]]
        );
    }

    #[test]
    fn test_weighted_pick_frequency() {
        let mut rng = StdRng::seed_from_u64(42);
        let candidates = ['a', 'b', 'c', 'd'];
        let trials = 20_000;
        let mut counts = [0usize; 3];
        for _ in 0..trials {
            match weighted_pick(&candidates, &TOP_K_WEIGHTS, &mut rng) {
                Some('a') => counts[0] += 1,
                Some('b') => counts[1] += 1,
                Some('c') => counts[2] += 1,
                other => panic!("unexpected pick {:?}", other),
            }
        }
        let best = counts[0] as f64 / trials as f64;
        let second = counts[1] as f64 / trials as f64;
        assert!((best - 1.0 / 1.7).abs() < 0.02, "best picked {}", best);
        assert!((second - 0.5 / 1.7).abs() < 0.02, "second picked {}", second);
    }

    #[test]
    fn test_weighted_pick_truncates_weights() {
        let mut rng = StdRng::seed_from_u64(9);
        assert_eq!(weighted_pick::<char, _>(&[], &TOP_K_WEIGHTS, &mut rng), None);
        for _ in 0..100 {
            assert_eq!(weighted_pick(&['x'], &TOP_K_WEIGHTS, &mut rng), Some('x'));
        }
    }

    #[test]
    fn test_hybrid_uses_book_and_records() {
        let rules = ChessRules::new();
        let book = OpeningBook::with_standard_openings(&rules).unwrap();
        let scorer = MoveScorer::new(StaticEvaluator::default());
        let position = rules.initial_position();
        let mut memory = AiMoveMemory::new();
        let mut rng = StdRng::seed_from_u64(11);

        let chosen = hybrid_move(
            &rules,
            &scorer,
            &book,
            &position,
            &MoveHistory::new(),
            &mut memory,
            &mut rng,
        )
        .unwrap();
        let notation = rules.to_notation(&position, chosen);
        assert!(["e4", "d4", "c4", "Nf3"].contains(&notation.as_str()));
        assert_eq!(memory.last(), Some(chosen));
    }

    #[test]
    fn test_hybrid_skips_book_after_opening() {
        let rules = ChessRules::new();
        let book = OpeningBook::with_standard_openings(&rules).unwrap();
        let scorer = MoveScorer::new(StaticEvaluator::default());
        let position = rules.initial_position();
        let mut history = MoveHistory::new();
        for _ in 0..OPENING_BOOK_PLIES {
            history.push(MoveRecord::new(placeholder(), "--"));
        }
        let mut memory = AiMoveMemory::new();
        let mut rng = StdRng::seed_from_u64(5);

        let chosen =
            hybrid_move(&rules, &scorer, &book, &position, &history, &mut memory, &mut rng)
                .unwrap();
        assert!(rules.is_legal(&position, chosen));
        assert_eq!(memory.len(), 1);
    }

    #[test]
    fn test_hybrid_finds_mate_among_top_choices() {
        let rules = ChessRules::new();
        let book = OpeningBook::new();
        let scorer = MoveScorer::new(StaticEvaluator::default());
        let position = rules
            .position_from_fen("r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4")
            .unwrap();
        let mut mates = 0;
        for seed in 0..40 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut memory = AiMoveMemory::new();
            let chosen = hybrid_move(
                &rules,
                &scorer,
                &book,
                &position,
                &MoveHistory::new(),
                &mut memory,
                &mut rng,
            )
            .unwrap();
            if rules.to_notation(&position, chosen) == "Qxf7#" {
                mates += 1;
            }
        }
        // Best candidate is drawn with probability 1/1.7
        assert!(mates >= 12, "mate chosen {} times", mates);
    }

    #[test]
    fn test_hybrid_avoids_recent_moves() {
        let rules = ChessRules::new();
        let book = OpeningBook::new();
        let scorer = MoveScorer::new(StaticEvaluator::default());
        let position = rules
            .position_from_fen("4k3/8/8/8/8/8/8/R3K3 w Q - 0 1")
            .unwrap();
        let legal = rules.legal_moves(&position);
        let mut memory = AiMoveMemory::new();
        for m in legal.iter().take(4) {
            memory.record(*m);
        }
        let banned: Vec<ChessMove> = memory.iter().copied().collect();
        let mut history = MoveHistory::new();
        for _ in 0..OPENING_BOOK_PLIES {
            history.push(MoveRecord::new(placeholder(), "--"));
        }

        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut scratch = memory.clone();
            let chosen =
                hybrid_move(&rules, &scorer, &book, &position, &history, &mut scratch, &mut rng)
                    .unwrap();
            assert!(!banned.contains(&chosen));
        }
    }
}
