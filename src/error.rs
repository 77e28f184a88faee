use thiserror::Error;

/// Errors raised while configuring the heuristics or loading DOM snapshots.
///
/// Classification itself never fails: predicates answer `false`/`None`
/// when information is missing.
#[derive(Error, Debug)]
pub enum ShootError {
    #[error("Invalid embed provider pattern: {0}")]
    InvalidEmbedPattern(#[from] regex::Error),

    #[error("Access to the top level frame was denied (cross-origin)")]
    CrossOriginFrame,

    #[error("Failed to parse DOM snapshot: {0}")]
    SnapshotParse(String),

    #[error("Invalid DOM snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ShootError>;
