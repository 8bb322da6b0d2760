use chess::ChessMove;
use std::fmt;

/// A played move together with its notation at the time it was played
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    pub chess_move: ChessMove,
    pub notation: String,
}

impl MoveRecord {
    pub fn new(chess_move: ChessMove, notation: impl Into<String>) -> Self {
        Self {
            chess_move,
            notation: notation.into(),
        }
    }
}

/// Every move played in the game so far, oldest first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveHistory {
    records: Vec<MoveRecord>,
}

impl MoveHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: MoveRecord) {
        self.records.push(record);
    }

    /// Number of half-moves played
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&MoveRecord> {
        self.records.last()
    }

    pub fn truncate(&mut self, len: usize) {
        self.records.truncate(len);
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MoveRecord> {
        self.records.iter()
    }
}

impl fmt::Display for MoveHistory {
    /// Numbered move list, e.g. `1. e4 e5 2. Nf3`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, record) in self.records.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            if i % 2 == 0 {
                write!(f, "{}. ", i / 2 + 1)?;
            }
            write!(f, "{}", record.notation)?;
        }
        Ok(())
    }
}
