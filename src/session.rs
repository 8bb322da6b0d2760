//! Game lifecycle: the authoritative position, the move history and the AI
//! move memory live and die together here.

use crate::errors::{EngineError, Result};
use crate::evaluation::PositionEvaluator;
use crate::history::{MoveHistory, MoveRecord};
use crate::repetition::AiMoveMemory;
use crate::rules::{GameResult, RulesEngine};
use crate::selector::MoveSelector;
use chess::{ChessMove, Color};
use tracing::info;

pub struct GameSession<R: RulesEngine> {
    rules: R,
    start: R::Position,
    position: R::Position,
    history: MoveHistory,
    memory: AiMoveMemory,
}

impl<R: RulesEngine> GameSession<R> {
    /// Session from the standard starting position
    pub fn new(rules: R) -> Self {
        let start = rules.initial_position();
        Self::with_start(rules, start)
    }

    pub fn from_fen(rules: R, fen: &str) -> Result<Self> {
        let start = rules.position_from_fen(fen)?;
        Ok(Self::with_start(rules, start))
    }

    fn with_start(rules: R, start: R::Position) -> Self {
        Self {
            position: start.clone(),
            start,
            rules,
            history: MoveHistory::new(),
            memory: AiMoveMemory::new(),
        }
    }

    /// Fresh game from the standard starting position
    pub fn new_game(&mut self) {
        self.start = self.rules.initial_position();
        self.reset();
    }

    /// Back to this session's starting position with empty history and memory
    pub fn reset(&mut self) {
        self.position = self.start.clone();
        self.history.clear();
        self.memory.clear();
    }

    /// Continue the same game from a new starting position. History is
    /// cleared; AI memory is kept.
    pub fn restart_from(&mut self, start: R::Position) {
        self.position = start.clone();
        self.start = start;
        self.history.clear();
    }

    /// [`GameSession::restart_from`] followed by `moves`. If any move is
    /// rejected the session is left exactly as it was.
    pub fn restart_with_moves(&mut self, start: R::Position, moves: &[&str]) -> Result<()> {
        let saved = (self.start.clone(), self.position.clone(), self.history.clone());
        self.restart_from(start);
        for text in moves {
            if let Err(e) = self.play_notation(text) {
                (self.start, self.position, self.history) = saved;
                return Err(e);
            }
        }
        Ok(())
    }

    pub fn rules(&self) -> &R {
        &self.rules
    }

    pub fn position(&self) -> &R::Position {
        &self.position
    }

    pub fn history(&self) -> &MoveHistory {
        &self.history
    }

    pub fn memory(&self) -> &AiMoveMemory {
        &self.memory
    }

    pub fn side_to_move(&self) -> Color {
        self.rules.side_to_move(&self.position)
    }

    pub fn legal_moves(&self) -> Vec<ChessMove> {
        self.rules.legal_moves(&self.position)
    }

    pub fn is_game_over(&self) -> bool {
        self.rules.is_game_over(&self.position)
    }

    pub fn result(&self) -> Option<GameResult> {
        self.rules.result(&self.position)
    }

    fn ensure_in_progress(&self) -> Result<()> {
        match self.result() {
            Some(result) => Err(EngineError::GameOver(result.to_string())),
            None if self.is_game_over() => Err(EngineError::GameOver("finished".to_string())),
            None => Ok(()),
        }
    }

    /// Play a move on the authoritative position and record it
    pub fn play_move(&mut self, chess_move: ChessMove) -> Result<()> {
        self.ensure_in_progress()?;
        if !self.rules.is_legal(&self.position, chess_move) {
            return Err(EngineError::IllegalMove(chess_move.to_string()));
        }

        let notation = self.rules.to_notation(&self.position, chess_move);
        self.rules.push(&mut self.position, chess_move);
        self.history.push(MoveRecord::new(chess_move, notation));
        Ok(())
    }

    /// Play a move given in SAN or coordinate notation
    pub fn play_notation(&mut self, text: &str) -> Result<ChessMove> {
        self.ensure_in_progress()?;
        let chess_move = self.rules.parse_notation(&self.position, text)?;
        self.play_move(chess_move)?;
        Ok(chess_move)
    }

    /// Take back the last half-move by replaying the remaining history from
    /// the starting position
    pub fn undo(&mut self) -> Result<MoveRecord> {
        let undone = self.history.last().cloned().ok_or(EngineError::NothingToUndo)?;
        self.history.truncate(self.history.len() - 1);

        let mut position = self.start.clone();
        for record in self.history.iter() {
            self.rules.push(&mut position, record.chess_move);
        }
        self.position = position;
        Ok(undone)
    }

    /// Ask `selector` for a move with the configured difficulty without
    /// playing it
    pub fn think<E>(&mut self, selector: &mut MoveSelector<R, E>) -> Result<ChessMove>
    where
        R: Sync,
        R::Position: Send + Sync,
        E: PositionEvaluator<R>,
    {
        self.ensure_in_progress()?;
        selector.choose(&self.position, &self.history, &mut self.memory)
    }

    /// [`GameSession::think`], then play the move
    pub fn ai_move<E>(&mut self, selector: &mut MoveSelector<R, E>) -> Result<ChessMove>
    where
        R: Sync,
        R::Position: Send + Sync,
        E: PositionEvaluator<R>,
    {
        let chess_move = self.think(selector)?;
        self.play_move(chess_move)?;
        if let Some(record) = self.history.last() {
            info!("AI plays {}", record.notation);
        }
        Ok(chess_move)
    }
}
