use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::board::{Board, DEFAULT_SIDE, MAX_SIDE};
use crate::error::ConfigError;

/// Board geometry, loadable from TOML.
///
/// Unlike [`Board::new`], which wraps bad inputs into range, `build` rejects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub width: i32,
    pub height: i32,
    /// Length of a winning run.
    pub line: i32,
}

impl Default for BoardConfig {
    fn default() -> Self {
        BoardConfig {
            width: DEFAULT_SIDE as i32,
            height: DEFAULT_SIDE as i32,
            line: DEFAULT_SIDE as i32,
        }
    }
}

impl BoardConfig {
    pub fn new(width: i32, height: i32, line: i32) -> Self {
        BoardConfig {
            width,
            height,
            line,
        }
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&content)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            warn!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: BoardConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let max = MAX_SIDE as i32;
        if !(1..=max).contains(&self.width) {
            return Err(ConfigError::Validation(format!(
                "width must be between 1 and {}, got {}",
                max, self.width
            )));
        }
        if !(1..=max).contains(&self.height) {
            return Err(ConfigError::Validation(format!(
                "height must be between 1 and {}, got {}",
                max, self.height
            )));
        }
        let shorter = self.width.min(self.height);
        if !(1..=shorter).contains(&self.line) {
            return Err(ConfigError::Validation(format!(
                "line must be between 1 and {}, got {}",
                shorter, self.line
            )));
        }
        Ok(())
    }

    /// Validate, then build an empty board.
    pub fn build(&self) -> Result<Board, ConfigError> {
        self.validate()?;
        Ok(Board::new(self.width, self.height, self.line))
    }
}
