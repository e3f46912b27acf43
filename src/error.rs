use thiserror::Error;

/// Rejected board or search configuration.
///
/// Raised before any search work begins; none of these are retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("board size must be at least 2, got {size}")]
    InvalidBoardSize { size: usize },
    #[error("search depth must be at least 1, got {depth}")]
    InvalidDepth { depth: u32 },
    #[error("chance-node sampling would select {sample_size} cells")]
    DegenerateSampling { sample_size: usize },
    #[error("tile {value} at ({row}, {col}) is not a power of two >= 2")]
    InvalidTile { value: u32, row: usize, col: usize },
    #[error("direction index {0} is out of range (expected 0..4)")]
    InvalidDirection(u8),
}
