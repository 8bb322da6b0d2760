//! Pure-playout Monte Carlo search.
//!
//! Each sweep plays every root move once and follows it with a uniformly
//! random game to the end. Results are tallied from the root mover's point of
//! view (+1 win, -1 loss, 0 draw) and the move with the best average wins.
//! There is no tree: nothing below the root is remembered between playouts.
//!
//! Sweeps can run on the rayon pool. Every root move of a sweep then gets its
//! own `StdRng` derived from the search seed, and the calling thread folds the
//! outcomes in once the sweep is back.

use crate::errors::{EngineError, Result};
use crate::rules::RulesEngine;
use chess::{ChessMove, Color};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

/// Default thinking time per move
pub const DEFAULT_PLAYOUT_BUDGET: Duration = Duration::from_secs(5);

/// Per-root-move playout tally
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootMoveStats {
    /// Move in coordinate notation
    pub chess_move: String,
    pub score: f32,
    pub count: u32,
}

impl RootMoveStats {
    /// Average outcome; unexplored moves never win the argmax
    pub fn mean(&self) -> f32 {
        if self.count == 0 {
            f32::NEG_INFINITY
        } else {
            self.score / self.count as f32
        }
    }
}

/// Summary of one search
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchStats {
    pub sweeps: u32,
    pub playouts: u64,
    pub elapsed_ms: u64,
    pub parallel: bool,
    pub root_moves: Vec<RootMoveStats>,
}

impl SearchStats {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Time-boxed pure-playout search
#[derive(Debug, Clone)]
pub struct PlayoutSearch {
    time_limit: Duration,
    parallel: bool,
}

impl Default for PlayoutSearch {
    fn default() -> Self {
        Self::new(DEFAULT_PLAYOUT_BUDGET)
    }
}

impl PlayoutSearch {
    pub fn new(time_limit: Duration) -> Self {
        Self {
            time_limit,
            parallel: false,
        }
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Single-threaded search
    pub fn search<R, G>(
        &self,
        rules: &R,
        position: &R::Position,
        rng: &mut G,
    ) -> Result<(ChessMove, SearchStats)>
    where
        R: RulesEngine,
        G: Rng + ?Sized,
    {
        self.run(rules, position, false, |root_moves, mover, _sweep| {
            root_moves
                .iter()
                .map(|&chess_move| playout(rules, position, chess_move, mover, rng))
                .collect()
        })
    }

    /// Search that plays each sweep's root moves on the rayon pool. Falls back
    /// to [`PlayoutSearch::search`] when parallel sweeps are disabled.
    pub fn search_parallel<R, G>(
        &self,
        rules: &R,
        position: &R::Position,
        rng: &mut G,
    ) -> Result<(ChessMove, SearchStats)>
    where
        R: RulesEngine + Sync,
        R::Position: Send + Sync,
        G: Rng + ?Sized,
    {
        if !self.parallel {
            return self.search(rules, position, rng);
        }

        let seed: u64 = rng.gen();
        self.run(rules, position, true, |root_moves, mover, sweep| {
            root_moves
                .par_iter()
                .enumerate()
                .map(|(index, &chess_move)| {
                    let mut worker_rng = StdRng::seed_from_u64(worker_seed(seed, sweep, index));
                    playout(rules, position, chess_move, mover, &mut worker_rng)
                })
                .collect()
        })
    }

    fn run<R, F>(
        &self,
        rules: &R,
        position: &R::Position,
        parallel: bool,
        mut sweep_once: F,
    ) -> Result<(ChessMove, SearchStats)>
    where
        R: RulesEngine,
        F: FnMut(&[ChessMove], Color, u32) -> Vec<f32>,
    {
        let root_moves = rules.legal_moves(position);
        if root_moves.is_empty() {
            return Err(EngineError::NoLegalMoves);
        }

        let mover = rules.side_to_move(position);
        let start = Instant::now();
        let mut scores = vec![0.0f32; root_moves.len()];
        let mut counts = vec![0u32; root_moves.len()];
        let mut sweeps = 0u32;

        // At least one full sweep, deadline checked between sweeps only
        loop {
            let outcomes = sweep_once(&root_moves, mover, sweeps);
            for (index, outcome) in outcomes.into_iter().enumerate() {
                scores[index] += outcome;
                counts[index] += 1;
            }
            sweeps += 1;

            if start.elapsed() >= self.time_limit {
                break;
            }
        }

        let root_stats: Vec<RootMoveStats> = root_moves
            .iter()
            .zip(scores.iter().zip(&counts))
            .map(|(chess_move, (&score, &count))| RootMoveStats {
                chess_move: chess_move.to_string(),
                score,
                count,
            })
            .collect();

        let best_index = best_root_index(&root_stats);

        let stats = SearchStats {
            sweeps,
            playouts: counts.iter().map(|&c| c as u64).sum(),
            elapsed_ms: start.elapsed().as_millis() as u64,
            parallel,
            root_moves: root_stats,
        };
        debug!(
            "playout search: {} sweeps, {} playouts in {}ms, best {}",
            stats.sweeps, stats.playouts, stats.elapsed_ms, root_moves[best_index]
        );

        Ok((root_moves[best_index], stats))
    }
}

/// Index of the highest mean; the earliest wins ties
fn best_root_index(root_stats: &[RootMoveStats]) -> usize {
    let mut best_index = 0;
    for (index, stats) in root_stats.iter().enumerate() {
        if stats.mean() > root_stats[best_index].mean() {
            best_index = index;
        }
    }
    best_index
}

fn worker_seed(seed: u64, sweep: u32, index: usize) -> u64 {
    seed ^ (((sweep as u64) << 32) | index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Play `root_move` on a private copy, then random moves until the game ends.
/// Returns the outcome for `mover`.
fn playout<R, G>(
    rules: &R,
    position: &R::Position,
    root_move: ChessMove,
    mover: Color,
    rng: &mut G,
) -> f32
where
    R: RulesEngine,
    G: Rng + ?Sized,
{
    let mut game = position.clone();
    rules.push(&mut game, root_move);

    while !rules.is_game_over(&game) {
        let moves = rules.legal_moves(&game);
        match moves.choose(rng) {
            Some(&chess_move) => rules.push(&mut game, chess_move),
            None => break,
        }
    }

    rules
        .result(&game)
        .map(|result| result.score_for(mover))
        .unwrap_or(0.0)
}
