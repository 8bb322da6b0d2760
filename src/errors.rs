use std::fmt;

/// Error types for move selection and game-session management
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// FEN or position text could not be turned into a position
    InvalidPosition(String),
    /// A move that is not legal in the current position
    IllegalMove(String),
    /// Notation text that does not describe a move
    InvalidNotation(String),
    /// Selection was requested for a position without legal moves
    NoLegalMoves,
    /// The game already has a result
    GameOver(String),
    /// Undo requested on an empty history
    NothingToUndo,
    /// Configuration error
    ConfigurationError(String),
    /// File I/O operation failed
    IoError(String),
    /// Validation error with context
    ValidationError {
        field: String,
        value: String,
        expected: String,
    },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::InvalidPosition(msg) => write!(f, "Invalid position: {}", msg),
            EngineError::IllegalMove(msg) => write!(f, "Illegal move: {}", msg),
            EngineError::InvalidNotation(msg) => write!(f, "Invalid notation: {}", msg),
            EngineError::NoLegalMoves => write!(f, "No legal moves available"),
            EngineError::GameOver(result) => write!(f, "Game is over: {}", result),
            EngineError::NothingToUndo => write!(f, "No moves to undo"),
            EngineError::ConfigurationError(msg) => write!(f, "Configuration error: {}", msg),
            EngineError::IoError(msg) => write!(f, "I/O error: {}", msg),
            EngineError::ValidationError {
                field,
                value,
                expected,
            } => {
                write!(
                    f,
                    "Validation failed for field '{}': got '{}', expected '{}'",
                    field, value, expected
                )
            }
        }
    }
}

impl std::error::Error for EngineError {}

// Convenience type alias
pub type Result<T> = std::result::Result<T, EngineError>;

impl From<std::io::Error> for EngineError {
    fn from(error: std::io::Error) -> Self {
        EngineError::IoError(error.to_string())
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(error: serde_json::Error) -> Self {
        EngineError::ConfigurationError(format!("JSON error: {}", error))
    }
}

impl From<std::num::ParseIntError> for EngineError {
    fn from(error: std::num::ParseIntError) -> Self {
        EngineError::ValidationError {
            field: "integer_parsing".to_string(),
            value: "unknown".to_string(),
            expected: format!("valid integer: {}", error),
        }
    }
}
