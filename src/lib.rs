//! # Chess Rival
//!
//! A tiered chess opponent. Every tier answers the same question, "which move
//! now?", with a different amount of effort:
//!
//! - **Easy**: a uniformly random legal move
//! - **Medium**: one-ply greedy search on a static evaluation
//! - **Hard**: either the hybrid search (opening book, anti-repetition filter,
//!   tactical move scoring and a weighted pick among the best three) or a
//!   time-boxed pure-playout Monte Carlo search
//!
//! Chess rules come from a [`RulesEngine`]; [`ChessRules`] implements it on
//! top of the `chess` crate.
//!
//! ## Quick Start
//!
//! ```rust
//! use chess_rival::{ChessRules, EngineConfig, GameSession, MoveSelector};
//!
//! let mut selector = MoveSelector::standard(EngineConfig::hard_hybrid().with_seed(7))?;
//! let mut session = GameSession::new(ChessRules::new());
//!
//! session.play_notation("e4")?;
//! let reply = session.ai_move(&mut selector)?;
//! println!("engine answers {} ({})", reply, session.history());
//! # Ok::<(), chess_rival::EngineError>(())
//! ```

// Core modules
pub mod errors;
pub mod rules;

pub use errors::{EngineError, Result};
pub use rules::{GameResult, RulesEngine, ScopedMove};

pub mod chess_rules;
pub mod config;
pub mod evaluation;
pub mod history;
pub mod move_scorer;
pub mod notation;
pub mod opening_book;
pub mod playout;
pub mod repetition;
pub mod selector;
pub mod session;
pub mod strategies;
pub mod uci;

pub use chess_rules::{ChessRules, GamePosition};
pub use config::EngineConfig;
pub use evaluation::{PieceValues, PositionEvaluator, StaticEvaluator};
pub use history::{MoveHistory, MoveRecord};
pub use move_scorer::{MoveScorer, ScoreBreakdown};
pub use opening_book::{OpeningBook, OpeningBookStats, OpeningEntry};
pub use playout::{PlayoutSearch, RootMoveStats, SearchStats};
pub use repetition::{filter_repeats, AiMoveMemory};
pub use selector::MoveSelector;
pub use session::GameSession;
pub use strategies::{greedy_move, hybrid_move, random_move, weighted_pick, Difficulty, HardEngine};
pub use uci::{run_uci_engine, run_uci_engine_with_config, UCIConfig, UCIEngine};
