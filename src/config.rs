use crate::errors::{EngineError, Result};
use crate::playout::DEFAULT_PLAYOUT_BUDGET;
use crate::strategies::{Difficulty, HardEngine};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Longest playout budget accepted from a config file
pub const MAX_PLAYOUT_TIME_MS: u64 = 600_000;

/// Engine configuration, loadable from JSON. Missing fields take defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // Strategy selection
    pub difficulty: Difficulty,
    pub hard_engine: HardEngine,
    pub use_opening_book: bool,

    // Pure-playout search
    pub playout_time_ms: u64,
    pub parallel_playouts: bool,

    // Fixed seed for reproducible games, entropy when absent
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Medium,
            hard_engine: HardEngine::Hybrid,
            use_opening_book: true,
            playout_time_ms: DEFAULT_PLAYOUT_BUDGET.as_millis() as u64,
            parallel_playouts: false,
            seed: None,
        }
    }
}

impl EngineConfig {
    /// Hard tier with the heuristic hybrid search
    pub fn hard_hybrid() -> Self {
        Self {
            difficulty: Difficulty::Hard,
            hard_engine: HardEngine::Hybrid,
            ..Default::default()
        }
    }

    /// Hard tier with single-threaded playouts
    pub fn hard_playout(time_limit: Duration) -> Self {
        Self {
            difficulty: Difficulty::Hard,
            hard_engine: HardEngine::Playout,
            playout_time_ms: time_limit.as_millis() as u64,
            ..Default::default()
        }
    }

    pub fn with_parallel_playouts(mut self, parallel: bool) -> Self {
        self.parallel_playouts = parallel;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn playout_budget(&self) -> Duration {
        Duration::from_millis(self.playout_time_ms)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::from_json(&text)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path.as_ref(), self.to_json()?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.playout_time_ms > MAX_PLAYOUT_TIME_MS {
            return Err(EngineError::ValidationError {
                field: "playout_time_ms".to_string(),
                value: self.playout_time_ms.to_string(),
                expected: format!("at most {}", MAX_PLAYOUT_TIME_MS),
            });
        }
        Ok(())
    }
}
