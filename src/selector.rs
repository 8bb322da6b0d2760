//! Difficulty-tier dispatch: the one entry point presentation code calls.

use crate::chess_rules::ChessRules;
use crate::config::EngineConfig;
use crate::errors::Result;
use crate::evaluation::{PositionEvaluator, StaticEvaluator};
use crate::history::MoveHistory;
use crate::move_scorer::MoveScorer;
use crate::opening_book::OpeningBook;
use crate::playout::{PlayoutSearch, SearchStats};
use crate::repetition::AiMoveMemory;
use crate::rules::RulesEngine;
use crate::strategies::{greedy_move, hybrid_move, random_move, Difficulty, HardEngine};
use chess::ChessMove;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Instant;
use tracing::debug;

/// Owns everything move selection needs apart from the game state itself
pub struct MoveSelector<R, E = StaticEvaluator> {
    rules: R,
    scorer: MoveScorer<E>,
    book: OpeningBook,
    config: EngineConfig,
    rng: StdRng,
    last_search: Option<SearchStats>,
}

impl MoveSelector<ChessRules> {
    /// `chess`-backed rules, default evaluator and the standard opening book
    pub fn standard(config: EngineConfig) -> Result<Self> {
        let rules = ChessRules::new();
        let book = OpeningBook::with_standard_openings(&rules)?;
        Ok(Self::new(rules, StaticEvaluator::default(), book, config))
    }
}

fn rng_for(config: &EngineConfig) -> StdRng {
    match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

impl<R, E> MoveSelector<R, E>
where
    R: RulesEngine + Sync,
    R::Position: Send + Sync,
    E: PositionEvaluator<R>,
{
    pub fn new(rules: R, evaluator: E, book: OpeningBook, config: EngineConfig) -> Self {
        let rng = rng_for(&config);
        Self {
            rules,
            scorer: MoveScorer::new(evaluator),
            book,
            config,
            rng,
            last_search: None,
        }
    }

    pub fn rules(&self) -> &R {
        &self.rules
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Replace the configuration; a configured seed restarts the random stream
    pub fn set_config(&mut self, config: EngineConfig) {
        if config.seed.is_some() && config.seed != self.config.seed {
            self.rng = rng_for(&config);
        }
        self.config = config;
    }

    /// Statistics of the pure-playout search behind the latest selection;
    /// `None` when that selection used another strategy
    pub fn last_search(&self) -> Option<&SearchStats> {
        self.last_search.as_ref()
    }

    /// Select with the configured difficulty
    pub fn choose(
        &mut self,
        position: &R::Position,
        history: &MoveHistory,
        memory: &mut AiMoveMemory,
    ) -> Result<ChessMove> {
        let difficulty = self.config.difficulty;
        self.select_move(difficulty, position, history, memory)
    }

    /// Pick the move to play now. Only the hybrid search writes to `memory`.
    pub fn select_move(
        &mut self,
        difficulty: Difficulty,
        position: &R::Position,
        history: &MoveHistory,
        memory: &mut AiMoveMemory,
    ) -> Result<ChessMove> {
        let start = Instant::now();
        self.last_search = None;

        let chosen = match difficulty {
            Difficulty::Easy => random_move(&self.rules, position, &mut self.rng)?,
            Difficulty::Medium => {
                greedy_move(&self.rules, self.scorer.evaluator(), position, &mut self.rng)?
            }
            Difficulty::Hard => match self.config.hard_engine {
                HardEngine::Hybrid => {
                    let empty = OpeningBook::new();
                    let book = if self.config.use_opening_book {
                        &self.book
                    } else {
                        &empty
                    };
                    hybrid_move(
                        &self.rules,
                        &self.scorer,
                        book,
                        position,
                        history,
                        memory,
                        &mut self.rng,
                    )?
                }
                HardEngine::Playout => {
                    let search = PlayoutSearch::new(self.config.playout_budget())
                        .with_parallel(self.config.parallel_playouts);
                    let (chess_move, stats) =
                        search.search_parallel(&self.rules, position, &mut self.rng)?;
                    self.last_search = Some(stats);
                    chess_move
                }
            },
        };

        debug!(
            "{} selected {} in {:?}",
            difficulty,
            self.rules.to_notation(position, chosen),
            start.elapsed()
        );
        Ok(chosen)
    }
}
