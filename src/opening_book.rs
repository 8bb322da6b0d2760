use crate::errors::{EngineError, Result};
use crate::rules::RulesEngine;
use chess::ChessMove;
use std::collections::HashMap;
use tracing::trace;

/// The book is only consulted while fewer half-moves than this have been played
pub const OPENING_BOOK_PLIES: usize = 6;

/// Opening book entry: candidate moves for one exact position, best first
#[derive(Debug, Clone)]
pub struct OpeningEntry {
    pub name: String,
    pub candidates: Vec<String>, // notation, tried in order
}

/// Named opening lines the standard book is built from, in SAN
const STANDARD_LINES: &[(&str, &[&str])] = &[
    ("Italian Game", &["e4", "e5", "Nf3", "Nc6", "Bc4", "Bc5"]),
    ("Ruy Lopez", &["e4", "e5", "Nf3", "Nc6", "Bb5", "a6"]),
    ("King's Gambit", &["e4", "e5", "f4", "exf4", "Nf3", "g5"]),
    ("Vienna Game", &["e4", "e5", "Nc3", "Nf6", "f4", "d5"]),
    ("Sicilian Defense", &["e4", "c5", "Nf3", "d6", "d4", "cxd4"]),
    ("French Defense", &["e4", "e6", "d4", "d5", "Nc3", "Nf6"]),
    ("Caro-Kann Defense", &["e4", "c6", "d4", "d5", "Nc3", "dxe4"]),
    ("Scandinavian Defense", &["e4", "d5", "exd5", "Qxd5", "Nc3", "Qa5"]),
    ("Queen's Gambit Declined", &["d4", "d5", "c4", "e6", "Nc3", "Nf6"]),
    ("Slav Defense", &["d4", "d5", "c4", "c6", "Nf3", "Nf6"]),
    ("King's Indian Defense", &["d4", "Nf6", "c4", "g6", "Nc3", "Bg7"]),
    ("Nimzo-Indian Defense", &["d4", "Nf6", "c4", "e6", "Nc3", "Bb4"]),
    ("Dutch Defense", &["d4", "f5", "g3", "Nf6", "Bg2", "e6"]),
    ("English Opening", &["c4", "e5", "Nc3", "Nf6", "Nf3", "Nc6"]),
    ("Reti Opening", &["Nf3", "d5", "g3", "Nf6", "Bg2", "e6"]),
];

/// Opening book keyed by the rules engine's canonical position key
#[derive(Debug, Clone, Default)]
pub struct OpeningBook {
    entries: HashMap<String, OpeningEntry>,
}

impl OpeningBook {
    /// Create an empty opening book
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Book built from the standard opening lines
    pub fn with_standard_openings<R: RulesEngine>(rules: &R) -> Result<Self> {
        let mut book = Self::new();
        for (name, line) in STANDARD_LINES {
            book.add_line(rules, name, line)?;
        }
        Ok(book)
    }

    /// Add candidates for a position key. Candidates already listed are kept
    /// in their original place.
    pub fn add_entry(&mut self, key: impl Into<String>, name: &str, candidates: &[&str]) {
        let entry = self
            .entries
            .entry(key.into())
            .or_insert_with(|| OpeningEntry {
                name: name.to_string(),
                candidates: Vec::new(),
            });
        for candidate in candidates {
            if !entry.candidates.iter().any(|c| c == candidate) {
                entry.candidates.push(candidate.to_string());
            }
        }
    }

    /// Replay `line` from the initial position, recording each move as a
    /// candidate for the position it is played from. Returns the number of
    /// positions touched.
    pub fn add_line<R: RulesEngine>(&mut self, rules: &R, name: &str, line: &[&str]) -> Result<usize> {
        let mut position = rules.initial_position();
        for text in line {
            let chess_move = rules.parse_notation(&position, text).map_err(|e| {
                EngineError::InvalidNotation(format!("opening line '{}': {}", name, e))
            })?;
            let notation = rules.to_notation(&position, chess_move);
            self.add_entry(rules.canonical_key(&position), name, &[notation.as_str()]);
            rules.push(&mut position, chess_move);
        }
        Ok(line.len())
    }

    /// Look up the position and return the first candidate that parses to a
    /// legal move. Bad candidates are skipped.
    pub fn lookup<R: RulesEngine>(&self, rules: &R, position: &R::Position) -> Option<ChessMove> {
        let entry = self.entry(rules, position)?;
        entry.candidates.iter().find_map(|candidate| {
            match rules.parse_notation(position, candidate) {
                Ok(chess_move) if rules.is_legal(position, chess_move) => Some(chess_move),
                Ok(_) => None,
                Err(e) => {
                    trace!("skipping book candidate {}: {}", candidate, e);
                    None
                }
            }
        })
    }

    /// Book entry for the position, if any
    pub fn entry<R: RulesEngine>(&self, rules: &R, position: &R::Position) -> Option<&OpeningEntry> {
        self.entries.get(&rules.canonical_key(position))
    }

    /// Check if position is in opening book
    pub fn contains<R: RulesEngine>(&self, rules: &R, position: &R::Position) -> bool {
        self.entries.contains_key(&rules.canonical_key(position))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get opening book statistics
    pub fn stats(&self) -> OpeningBookStats {
        let total_positions = self.entries.len();
        let total_candidates: usize = self.entries.values().map(|e| e.candidates.len()).sum();

        OpeningBookStats {
            total_positions,
            avg_candidates_per_position: if total_positions > 0 {
                total_candidates as f32 / total_positions as f32
            } else {
                0.0
            },
        }
    }
}

/// Statistics about the opening book coverage
#[derive(Debug, Clone)]
pub struct OpeningBookStats {
    pub total_positions: usize,
    pub avg_candidates_per_position: f32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess_rules::ChessRules;

    #[test]
    fn test_opening_book_creation() {
        let book = OpeningBook::new();
        assert!(book.is_empty());
        assert_eq!(book.stats().avg_candidates_per_position, 0.0);
    }

    #[test]
    fn test_start_position_lookup() {
        let rules = ChessRules::new();
        let book = OpeningBook::with_standard_openings(&rules).unwrap();
        let start = rules.initial_position();

        let entry = book.entry(&rules, &start).unwrap();
        assert_eq!(entry.candidates, vec!["e4", "d4", "c4", "Nf3"]);

        let chess_move = book.lookup(&rules, &start).unwrap();
        let notation = rules.to_notation(&start, chess_move);
        assert!(entry.candidates.contains(&notation));
    }

    #[test]
    fn test_reply_after_e4() {
        let rules = ChessRules::new();
        let book = OpeningBook::with_standard_openings(&rules).unwrap();
        let mut position = rules.initial_position();
        let e4 = rules.parse_notation(&position, "e4").unwrap();
        rules.push(&mut position, e4);

        let reply = book.lookup(&rules, &position).unwrap();
        assert_eq!(rules.to_notation(&position, reply), "e5");
    }

    #[test]
    fn test_unknown_position_returns_none() {
        let rules = ChessRules::new();
        let book = OpeningBook::with_standard_openings(&rules).unwrap();
        let position = rules
            .position_from_fen("8/8/8/4k3/8/8/4P3/4K3 w - - 0 1")
            .unwrap();
        assert!(!book.contains(&rules, &position));
        assert_eq!(book.lookup(&rules, &position), None);
    }

    #[test]
    fn test_bad_candidates_are_skipped() {
        let rules = ChessRules::new();
        let start = rules.initial_position();
        let mut book = OpeningBook::new();
        book.add_entry(rules.canonical_key(&start), "Broken", &["Qxz9", "e5", "Nf3"]);

        let chess_move = book.lookup(&rules, &start).unwrap();
        assert_eq!(rules.to_notation(&start, chess_move), "Nf3");

        let mut hopeless = OpeningBook::new();
        hopeless.add_entry(rules.canonical_key(&start), "Broken", &["Qxz9", "e5"]);
        assert_eq!(hopeless.lookup(&rules, &start), None);
    }

    #[test]
    fn test_standard_coverage() {
        let rules = ChessRules::new();
        let book = OpeningBook::with_standard_openings(&rules).unwrap();
        let stats = book.stats();
        assert!(stats.total_positions >= 40, "only {} positions", stats.total_positions);
        assert!(stats.avg_candidates_per_position >= 1.0);
    }

    #[test]
    fn test_illegal_line_is_rejected() {
        let rules = ChessRules::new();
        let mut book = OpeningBook::new();
        let err = book.add_line(&rules, "Nonsense", &["e4", "e4"]).unwrap_err();
        assert!(matches!(err, EngineError::InvalidNotation(_)));
    }
}
