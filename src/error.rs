//! Error types for parsing and cut search

use std::time::Duration;

use thiserror::Error;

/// Result type for snowverload operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading a wiring diagram or searching for a cut
#[derive(Error, Debug)]
pub enum Error {
    /// A line that does not follow `<vertex>: <vertex> <vertex> ...`
    #[error("Invalid vertex adjacencies on line {line_number}: {line:?}")]
    Parse { line_number: usize, line: String },

    /// A vertex that lists itself as a neighbor
    #[error("Self-loop on line {line_number}: {vertex:?} lists itself as adjacent")]
    SelfLoop { line_number: usize, vertex: String },

    /// Fewer than two vertices: there is nothing to cut
    #[error("Graph has {0} vertices, need at least 2 to cut")]
    TooFewVertices(usize),

    /// The target cut size must be positive
    #[error("Invalid target cut size: {0} (must be at least 1)")]
    InvalidTarget(usize),

    /// The trial budget ran out before a cut of the target size was found
    #[error("No cut of size {target} found after {trials} trials")]
    CutNotFound { target: usize, trials: usize },

    /// The deadline passed before a cut of the target size was found
    #[error("Gave up after {elapsed:?} and {trials} trials")]
    Timeout { elapsed: Duration, trials: usize },

    /// The gap splitter needs at least two values
    #[error("Need at least 2 values to split, got {0}")]
    TooFewValues(usize),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the error comes from the input itself rather than the search
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Error::Parse { .. }
                | Error::SelfLoop { .. }
                | Error::TooFewVertices(_)
                | Error::TooFewValues(_)
        )
    }

    /// Whether the search gave up because of its configured bounds
    pub fn is_search_exhausted(&self) -> bool {
        matches!(self, Error::CutNotFound { .. } | Error::Timeout { .. })
    }
}
