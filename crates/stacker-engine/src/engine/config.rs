use serde::{Deserialize, Serialize};

use crate::{
    core::{BoardDimensions, PieceKind, PieceRotation, PieceState, SPAWN_X, SPAWN_Y},
    engine::lock::{LOCK_MOVE_LIMIT, LockDelay},
};

/// Matrix origin of a freshly spawned piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SpawnPoint {
    pub x: i32,
    pub y: i32,
}

impl Default for SpawnPoint {
    fn default() -> Self {
        Self {
            x: SPAWN_X,
            y: SPAWN_Y,
        }
    }
}

/// Tunable rule parameters.
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```
/// use stacker_engine::EngineConfig;
///
/// let config: EngineConfig = serde_json::from_str(r#"{ "lock_move_limit": 10 }"#).unwrap();
/// assert_eq!(config.lock_move_limit, 10);
/// assert_eq!(config.board.cols, 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    pub board: BoardDimensions,
    pub lock_move_limit: u8,
    pub spawn: SpawnPoint,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            board: BoardDimensions::STANDARD,
            lock_move_limit: LOCK_MOVE_LIMIT,
            spawn: SpawnPoint::default(),
        }
    }
}

/// Rejected [`EngineConfig`] values.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("board must be at least 4 columns wide, got {_0}")]
    TooNarrow(#[error(not(source))] usize),
    #[display("board must have at least 4 visible rows, got {_0}")]
    TooShort(#[error(not(source))] usize),
    #[display("lock move limit must be at least 1")]
    ZeroLockMoveLimit,
}

impl EngineConfig {
    /// Checks that every piece can exist on the configured board.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.board.cols < 4 {
            return Err(ConfigError::TooNarrow(self.board.cols));
        }
        if self.board.visible_rows < 4 {
            return Err(ConfigError::TooShort(self.board.visible_rows));
        }
        if self.lock_move_limit == 0 {
            return Err(ConfigError::ZeroLockMoveLimit);
        }
        Ok(())
    }

    #[must_use]
    pub fn spawn_piece(&self, kind: PieceKind) -> PieceState {
        PieceState::new(kind, self.spawn.x, self.spawn.y, PieceRotation::SPAWN)
    }

    #[must_use]
    pub fn lock_delay(&self) -> LockDelay {
        LockDelay::with_limit(self.lock_move_limit)
    }
}
