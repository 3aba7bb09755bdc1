use std::path::PathBuf;

/// Reasons a move is refused by [`Board::try_make_move`](crate::board::Board::try_make_move).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("cell is already occupied")]
    Occupied,

    #[error("a move must cover exactly one cell, got {count}")]
    NotSingleCell { count: u32 },

    #[error("move lies outside the board")]
    OffBoard,
}

/// Errors that can occur when loading or validating a board configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_error_display() {
        assert_eq!(
            MoveError::NotSingleCell { count: 3 }.to_string(),
            "a move must cover exactly one cell, got 3"
        );
        assert_eq!(MoveError::Occupied.to_string(), "cell is already occupied");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Validation("line must be between 1 and 3".to_string());
        assert_eq!(
            err.to_string(),
            "config validation error: line must be between 1 and 3"
        );
    }
}
