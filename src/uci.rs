use chess::ChessMove;
use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::time::Duration;
use tracing::warn;

use crate::chess_rules::ChessRules;
use crate::config::{EngineConfig, MAX_PLAYOUT_TIME_MS};
use crate::errors::{EngineError, Result};
use crate::rules::RulesEngine;
use crate::selector::MoveSelector;
use crate::session::GameSession;
use crate::strategies::{Difficulty, HardEngine};

/// Moves assumed left in the game when the GUI only sends clock times
const DEFAULT_MOVES_TO_GO: u64 = 30;

/// UCI (Universal Chess Interface) front end over a game session
pub struct UCIEngine {
    session: GameSession<ChessRules>,
    selector: MoveSelector<ChessRules>,
    debug: bool,
    engine_name: String,
    engine_author: String,
    options: HashMap<String, UCIOption>,
}

/// UCI option types
#[derive(Debug, Clone)]
pub enum UCIOption {
    Check {
        default: bool,
        value: bool,
    },
    Spin {
        default: i32,
        min: i32,
        max: i32,
        value: i32,
    },
    Combo {
        default: String,
        options: Vec<String>,
        value: String,
    },
    String {
        default: String,
        value: String,
    },
}

/// Limits parsed from a `go` command
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoParams {
    pub movetime: Option<u64>,
    pub wtime: Option<u64>,
    pub btime: Option<u64>,
    pub movestogo: Option<u64>,
}

impl GoParams {
    pub fn parse(parts: &[&str]) -> Self {
        let mut params = GoParams::default();
        let mut i = 1;
        while i < parts.len() {
            let value = parts.get(i + 1).and_then(|v| v.parse::<u64>().ok());
            match parts[i] {
                "movetime" => params.movetime = value,
                "wtime" => params.wtime = value,
                "btime" => params.btime = value,
                "movestogo" => params.movestogo = value,
                _ => {
                    i += 1;
                    continue;
                }
            }
            i += 2;
        }
        params
    }

    /// Thinking time for the side to move, if the command implies one
    pub fn budget(&self, white_to_move: bool) -> Option<Duration> {
        if let Some(ms) = self.movetime {
            return Some(Duration::from_millis(ms));
        }
        let remaining = if white_to_move { self.wtime } else { self.btime }?;
        let moves_to_go = self.movestogo.unwrap_or(DEFAULT_MOVES_TO_GO).max(1);
        Some(Duration::from_millis(remaining / moves_to_go))
    }
}

impl UCIEngine {
    pub fn new() -> Result<Self> {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Result<Self> {
        let mut options = HashMap::new();

        options.insert(
            "Difficulty".to_string(),
            UCIOption::Combo {
                default: capitalize(&config.difficulty.to_string()),
                options: vec!["Easy".to_string(), "Medium".to_string(), "Hard".to_string()],
                value: capitalize(&config.difficulty.to_string()),
            },
        );

        options.insert(
            "HardEngine".to_string(),
            UCIOption::Combo {
                default: capitalize(&config.hard_engine.to_string()),
                options: vec!["Hybrid".to_string(), "Playout".to_string()],
                value: capitalize(&config.hard_engine.to_string()),
            },
        );

        let playout_ms = config.playout_time_ms.min(MAX_PLAYOUT_TIME_MS) as i32;
        options.insert(
            "PlayoutTime".to_string(),
            UCIOption::Spin {
                default: playout_ms,
                min: 0,
                max: MAX_PLAYOUT_TIME_MS as i32,
                value: playout_ms,
            },
        );

        options.insert(
            "ParallelPlayouts".to_string(),
            UCIOption::Check {
                default: config.parallel_playouts,
                value: config.parallel_playouts,
            },
        );

        options.insert(
            "OwnBook".to_string(),
            UCIOption::Check {
                default: config.use_opening_book,
                value: config.use_opening_book,
            },
        );

        let seed = config.seed.map(|s| s.to_string()).unwrap_or_default();
        options.insert(
            "Seed".to_string(),
            UCIOption::String {
                default: seed.clone(),
                value: seed,
            },
        );

        let selector = MoveSelector::standard(config)?;
        Ok(Self {
            session: GameSession::new(ChessRules::new()),
            selector,
            debug: false,
            engine_name: format!("Chess Rival {}", env!("CARGO_PKG_VERSION")),
            engine_author: "Chess Rival Team".to_string(),
            options,
        })
    }

    pub fn session(&self) -> &GameSession<ChessRules> {
        &self.session
    }

    pub fn config(&self) -> &EngineConfig {
        self.selector.config()
    }

    /// Main UCI loop
    pub fn run(&mut self) {
        let stdin = io::stdin();
        let mut stdout = io::stdout();

        for line in stdin.lock().lines() {
            match line {
                Ok(command) => {
                    let response = self.process_command(command.trim());
                    if !response.is_empty() {
                        let _ = writeln!(stdout, "{response}");
                        let _ = stdout.flush();
                    }

                    if command.trim() == "quit" {
                        break;
                    }
                }
                Err(e) => {
                    if self.debug {
                        let _ = writeln!(stdout, "info string Error reading input: {e}");
                    }
                    break;
                }
            }
        }
    }

    /// Process UCI command and return response
    pub fn process_command(&mut self, command: &str) -> String {
        let parts: Vec<&str> = command.split_whitespace().collect();
        if parts.is_empty() {
            return String::new();
        }

        match parts[0] {
            "uci" => self.handle_uci(),
            "debug" => self.handle_debug(&parts),
            "isready" => self.handle_isready(),
            "setoption" => self.handle_setoption(&parts),
            "ucinewgame" => self.handle_ucinewgame(),
            "position" => self.handle_position(&parts),
            "go" => self.handle_go(&parts),
            // Searches are synchronous, there is never anything to stop
            "stop" | "quit" => String::new(),
            _ => {
                if self.debug {
                    format!("info string Unknown command: {command}")
                } else {
                    String::new()
                }
            }
        }
    }

    fn handle_uci(&self) -> String {
        let mut response = String::new();
        response.push_str(&format!("id name {}\n", self.engine_name));
        response.push_str(&format!("id author {}\n", self.engine_author));

        let mut names: Vec<&String> = self.options.keys().collect();
        names.sort();
        for name in names {
            match &self.options[name] {
                UCIOption::Check { default, .. } => {
                    response.push_str(&format!(
                        "option name {name} type check default {default}\n"
                    ));
                }
                UCIOption::Spin {
                    default, min, max, ..
                } => {
                    response.push_str(&format!(
                        "option name {name} type spin default {default} min {min} max {max}\n"
                    ));
                }
                UCIOption::Combo {
                    default, options, ..
                } => {
                    let combo_options = options.join(" var ");
                    response.push_str(&format!(
                        "option name {name} type combo default {default} var {combo_options}\n"
                    ));
                }
                UCIOption::String { default, .. } => {
                    let default = if default.is_empty() { "<empty>" } else { default };
                    response.push_str(&format!(
                        "option name {name} type string default {default}\n"
                    ));
                }
            }
        }

        response.push_str("uciok");
        response
    }

    fn handle_debug(&mut self, parts: &[&str]) -> String {
        if parts.len() >= 2 {
            match parts[1] {
                "on" => self.debug = true,
                "off" => self.debug = false,
                _ => {}
            }
        }
        String::new()
    }

    fn handle_isready(&self) -> String {
        "readyok".to_string()
    }

    fn handle_setoption(&mut self, parts: &[&str]) -> String {
        // setoption name <name> value <value>
        if parts.len() >= 4 && parts[1] == "name" {
            let mut name_parts = Vec::new();
            let mut value_parts = Vec::new();
            let mut in_value = false;

            for &part in &parts[2..] {
                if part == "value" {
                    in_value = true;
                } else if in_value {
                    value_parts.push(part);
                } else {
                    name_parts.push(part);
                }
            }

            let name = name_parts.join(" ");
            let value = value_parts.join(" ");

            if let Err(e) = self.set_option(&name, &value) {
                warn!("setoption {}: {}", name, e);
                if self.debug {
                    return format!("info string {e}");
                }
            }
        }

        String::new()
    }

    fn set_option(&mut self, name: &str, value: &str) -> Result<()> {
        let option = self
            .options
            .get_mut(name)
            .ok_or_else(|| EngineError::ConfigurationError(format!("unknown option {name}")))?;

        let rejected = || EngineError::ValidationError {
            field: name.to_string(),
            value: value.to_string(),
            expected: "a value allowed by the option".to_string(),
        };

        match option {
            UCIOption::Check {
                value: ref mut val, ..
            } => {
                *val = value == "true";
            }
            UCIOption::Spin {
                value: ref mut val,
                min,
                max,
                ..
            } => {
                let new_val = value.parse::<i32>().map_err(|_| rejected())?;
                if new_val < *min || new_val > *max {
                    return Err(rejected());
                }
                *val = new_val;
            }
            UCIOption::Combo {
                value: ref mut val,
                options,
                ..
            } => {
                let matched = options
                    .iter()
                    .find(|o| o.eq_ignore_ascii_case(value))
                    .ok_or_else(rejected)?;
                *val = matched.clone();
            }
            UCIOption::String {
                value: ref mut val, ..
            } => {
                if name == "Seed" && !value.is_empty() {
                    value.parse::<u64>()?;
                }
                *val = value.to_string();
            }
        }

        self.apply_options()
    }

    /// Rebuild the engine configuration from the option table
    fn apply_options(&mut self) -> Result<()> {
        let mut config = self.selector.config().clone();

        if let Some(UCIOption::Combo { value, .. }) = self.options.get("Difficulty") {
            config.difficulty = value.parse::<Difficulty>()?;
        }
        if let Some(UCIOption::Combo { value, .. }) = self.options.get("HardEngine") {
            config.hard_engine = value.parse::<HardEngine>()?;
        }
        if let Some(UCIOption::Spin { value, .. }) = self.options.get("PlayoutTime") {
            config.playout_time_ms = *value as u64;
        }
        if let Some(UCIOption::Check { value, .. }) = self.options.get("ParallelPlayouts") {
            config.parallel_playouts = *value;
        }
        if let Some(UCIOption::Check { value, .. }) = self.options.get("OwnBook") {
            config.use_opening_book = *value;
        }
        if let Some(UCIOption::String { value, .. }) = self.options.get("Seed") {
            config.seed = if value.is_empty() {
                None
            } else {
                Some(value.parse::<u64>()?)
            };
        }

        config.validate()?;
        self.selector.set_config(config);
        Ok(())
    }

    fn handle_ucinewgame(&mut self) -> String {
        self.session.new_game();
        String::new()
    }

    fn handle_position(&mut self, parts: &[&str]) -> String {
        match self.load_position(parts) {
            Ok(()) => String::new(),
            Err(e) => {
                warn!("position command rejected: {}", e);
                if self.debug {
                    format!("info string {e}")
                } else {
                    String::new()
                }
            }
        }
    }

    fn load_position(&mut self, parts: &[&str]) -> Result<()> {
        if parts.len() < 2 {
            return Err(EngineError::InvalidPosition("missing position".to_string()));
        }

        let moves_idx = parts.iter().position(|&x| x == "moves");
        let rules = self.session.rules();
        let start = match parts[1] {
            "startpos" => rules.initial_position(),
            "fen" => {
                let end = moves_idx.unwrap_or(parts.len());
                if end <= 2 {
                    return Err(EngineError::InvalidPosition("missing FEN".to_string()));
                }
                rules.position_from_fen(&parts[2..end].join(" "))?
            }
            other => {
                return Err(EngineError::InvalidPosition(format!(
                    "expected startpos or fen, got {other}"
                )))
            }
        };

        let moves: &[&str] = match moves_idx {
            Some(idx) => &parts[idx + 1..],
            None => &[],
        };
        self.session.restart_with_moves(start, moves)
    }

    fn handle_go(&mut self, parts: &[&str]) -> String {
        let params = GoParams::parse(parts);
        let white_to_move = self.session.side_to_move() == chess::Color::White;

        let saved = self.selector.config().clone();
        if let Some(budget) = params.budget(white_to_move) {
            let mut config = saved.clone();
            config.playout_time_ms = (budget.as_millis() as u64).min(MAX_PLAYOUT_TIME_MS);
            self.selector.set_config(config);
        }

        let result = self.session.think(&mut self.selector);
        self.selector.set_config(saved);

        let mut response = String::new();
        if let Some(stats) = self.selector.last_search().filter(|_| self.debug) {
            response.push_str(&format!(
                "info string playouts {} sweeps {} time {}\n",
                stats.playouts, stats.sweeps, stats.elapsed_ms
            ));
        }

        match result {
            Ok(chess_move) => response.push_str(&format!("bestmove {}", uci_move(chess_move))),
            Err(e) => {
                warn!("no move to report: {}", e);
                response.push_str("bestmove 0000");
            }
        }
        response
    }
}

fn uci_move(chess_move: ChessMove) -> String {
    chess_move.to_string()
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// Configuration for the UCI engine
#[derive(Debug, Clone)]
pub struct UCIConfig {
    pub engine_name: String,
    pub engine_author: String,
    pub enable_debug: bool,
    pub engine: EngineConfig,
}

impl Default for UCIConfig {
    fn default() -> Self {
        Self {
            engine_name: format!("Chess Rival {}", env!("CARGO_PKG_VERSION")),
            engine_author: "Chess Rival Team".to_string(),
            enable_debug: false,
            engine: EngineConfig::default(),
        }
    }
}

/// Run the UCI engine with default configuration
pub fn run_uci_engine() -> Result<()> {
    run_uci_engine_with_config(UCIConfig::default())
}

/// Run the UCI engine with custom configuration
pub fn run_uci_engine_with_config(config: UCIConfig) -> Result<()> {
    let mut engine = UCIEngine::with_config(config.engine)?;
    engine.engine_name = config.engine_name;
    engine.engine_author = config.engine_author;
    engine.debug = config.enable_debug;
    engine.run();
    Ok(())
}
