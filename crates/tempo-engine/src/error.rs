//! Error types for tempo-engine operations.

use thiserror::Error;

/// The three failure kinds surfaced by the toolkit.
///
/// None of them is retried internally: parsing and arithmetic are pure, so a
/// second attempt would fail the same way.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TempoError {
    /// Neither the pattern catalog nor the fallback parser understood the text.
    #[error("Unable to parse: {0}")]
    Parse(String),

    /// An argument was outside the operation's contract.
    #[error("Invalid value: {0}")]
    Value(String),

    /// The input kind cannot be normalized into the requested value.
    #[error("Unsupported input: {0}")]
    Type(String),
}

pub type Result<T> = std::result::Result<T, TempoError>;
