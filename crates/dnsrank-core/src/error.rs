use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, RankError>;

/// Errors that can occur in the benchmark pipeline
#[derive(Error, Debug)]
pub enum RankError {
    /// Resolver directory file could not be read
    #[error("failed to read resolver directory: {0}")]
    Io(#[from] std::io::Error),
}
