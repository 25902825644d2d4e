//! This module contains all custom errors used in this library.

use thiserror::Error;

/// Errors raised while reading an edge list. Line numbers are 1-based.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Import: IoError")]
    Io(#[from] std::io::Error),
    #[error("Import: line {line} has no tab separator.")]
    MissingSeparator { line: usize },
    #[error("Import: line {line}: `{token}` is not a vertex id.")]
    BadInt {
        line: usize,
        token: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Import: line {line} holds more than two tokens.")]
    TrailingToken { line: usize },
}

#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("Unsupported selector {0}, expected 0 (benchmark) or 1-4 (single algorithm)")]
    UnsupportedSelector(u32),
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    /// The graph generator exited abnormally for a test case.
    #[error("Generator failed for size {size}: {reason}")]
    Generator { size: usize, reason: String },
    /// The graph generator produced output that is not an edge list.
    #[error("Generator output for size {size} is malformed")]
    GeneratorOutput {
        size: usize,
        #[source]
        source: ImportError,
    },
    #[error("InvalidSolution: {0}")]
    InvalidSolution(String),
    #[error("Could not write benchmark output")]
    Output(#[from] std::io::Error),
}
