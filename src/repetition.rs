//! Anti-repetition memory for the hybrid strategy.

use chess::ChessMove;
use std::collections::VecDeque;

/// Moves kept in AI memory
pub const AI_MEMORY_CAPACITY: usize = 6;
/// Most recent memory entries a candidate must not repeat
pub const REPETITION_WINDOW: usize = 4;

/// Bounded FIFO of the moves the search actually returned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiMoveMemory {
    moves: VecDeque<ChessMove>,
    capacity: usize,
}

impl Default for AiMoveMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl AiMoveMemory {
    pub fn new() -> Self {
        Self::with_capacity(AI_MEMORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            moves: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Append a chosen move; the oldest entries fall off past capacity
    pub fn record(&mut self, chess_move: ChessMove) {
        self.moves.push_back(chess_move);
        while self.moves.len() > self.capacity {
            self.moves.pop_front();
        }
    }

    pub fn last(&self) -> Option<ChessMove> {
        self.moves.back().copied()
    }

    /// Up to `n` most recent moves, oldest first
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &ChessMove> {
        self.moves.iter().skip(self.moves.len().saturating_sub(n))
    }

    pub fn contains_recent(&self, chess_move: ChessMove, n: usize) -> bool {
        self.recent(n).any(|m| *m == chess_move)
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn clear(&mut self) {
        self.moves.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChessMove> {
        self.moves.iter()
    }
}

/// Drop legal moves that repeat one of the last [`REPETITION_WINDOW`] memory
/// entries. Never returns an empty set when `legal` is non-empty.
pub fn filter_repeats(legal: &[ChessMove], memory: &AiMoveMemory) -> Vec<ChessMove> {
    let fresh: Vec<ChessMove> = legal
        .iter()
        .copied()
        .filter(|m| !memory.contains_recent(*m, REPETITION_WINDOW))
        .collect();

    if fresh.is_empty() {
        legal.to_vec()
    } else {
        fresh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess::Square;

    fn mv(from: Square, to: Square) -> ChessMove {
        ChessMove::new(from, to, None)
    }

    #[test]
    fn test_memory_is_bounded_fifo() {
        let mut memory = AiMoveMemory::new();
        let moves = [
            mv(Square::A2, Square::A3),
            mv(Square::B2, Square::B3),
            mv(Square::C2, Square::C3),
            mv(Square::D2, Square::D3),
            mv(Square::E2, Square::E3),
            mv(Square::F2, Square::F3),
            mv(Square::G2, Square::G3),
        ];
        for m in moves {
            memory.record(m);
        }
        assert_eq!(memory.len(), AI_MEMORY_CAPACITY);
        assert_eq!(memory.iter().next(), Some(&moves[1]));
        assert_eq!(memory.last(), Some(moves[6]));

        let recent: Vec<_> = memory.recent(2).copied().collect();
        assert_eq!(recent, vec![moves[5], moves[6]]);
    }

    #[test]
    fn test_filter_removes_recent_window_only() {
        let mut memory = AiMoveMemory::new();
        let old = mv(Square::A2, Square::A3);
        memory.record(old);
        let window = [
            mv(Square::B2, Square::B3),
            mv(Square::C2, Square::C3),
            mv(Square::D2, Square::D3),
            mv(Square::E2, Square::E3),
        ];
        for m in window {
            memory.record(m);
        }

        let fresh = mv(Square::G1, Square::F3);
        let legal = vec![old, window[0], fresh, window[3]];
        let filtered = filter_repeats(&legal, &memory);

        // `old` is fifth from the end, outside the window
        assert_eq!(filtered, vec![old, fresh]);
        for m in &filtered {
            assert!(!memory.contains_recent(*m, REPETITION_WINDOW));
        }
    }

    #[test]
    fn test_filter_falls_back_to_full_set() {
        let mut memory = AiMoveMemory::new();
        let legal = vec![mv(Square::E2, Square::E4), mv(Square::D2, Square::D4)];
        for m in &legal {
            memory.record(*m);
        }
        assert_eq!(filter_repeats(&legal, &memory), legal);
    }

    #[test]
    fn test_filter_with_empty_memory_is_identity() {
        let memory = AiMoveMemory::new();
        let legal = vec![mv(Square::E2, Square::E4), mv(Square::D2, Square::D4)];
        assert_eq!(filter_repeats(&legal, &memory), legal);
    }

    #[test]
    fn test_promotion_is_part_of_identity() {
        let mut memory = AiMoveMemory::new();
        let queen = ChessMove::new(Square::E7, Square::E8, Some(chess::Piece::Queen));
        let knight = ChessMove::new(Square::E7, Square::E8, Some(chess::Piece::Knight));
        memory.record(queen);
        assert!(memory.contains_recent(queen, REPETITION_WINDOW));
        assert!(!memory.contains_recent(knight, REPETITION_WINDOW));
    }
}
