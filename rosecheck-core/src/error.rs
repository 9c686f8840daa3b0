//! Error types for rosecheck property testing.

use std::fmt;
use thiserror::Error;

/// Main error type for rosecheck.
///
/// Configuration errors (`InvalidConfig`, `InvalidRange`, `InvalidWeights`)
/// are reported before any trial runs. `Generation` is recoverable up to the
/// configured discard budget. `PropertyFailed` and `StatefulFailed` terminate
/// a run once shrinking has finished.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CheckError {
    /// Invalid configuration, such as bad size bounds.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// An interval was requested with `min > max`.
    #[error("Invalid range: min {min} is greater than max {max}")]
    InvalidRange { min: i128, max: i128 },

    /// Weights given to `one_of`/`element_of` are out of bounds.
    #[error("Invalid weights: {message}")]
    InvalidWeights { message: String },

    /// A generator failed to produce a value.
    #[error("Generation failed: {message}")]
    Generation { message: String },

    /// Too many consecutive generation errors.
    #[error("Too many generation errors in a row (limit: {limit})")]
    TooManyDiscards { limit: usize },

    /// Property failed with a counterexample.
    #[error(
        "Property failed after {tests_run} tests (seed {seed:?}): {} {args}\n  caused by: {cause}",
        shrink_phrase(.shrunk)
    )]
    PropertyFailed {
        /// JSON-like rendering of the argument list.
        args: String,
        /// Rendering of the argument list before shrinking.
        original_args: String,
        /// Whether shrinking found a smaller failing case.
        shrunk: bool,
        /// Message of the original failure.
        cause: String,
        seed: String,
        tests_run: usize,
        shrinks_performed: usize,
    },

    /// Stateful property failed with an action sequence.
    #[error(
        "Stateful property failed after {tests_run} tests (seed {seed:?}): {} {actions:?}\n  caused by: {cause}",
        shrink_phrase(.shrunk)
    )]
    StatefulFailed {
        /// Names of the actions applied, in order.
        actions: Vec<String>,
        shrunk: bool,
        cause: String,
        seed: String,
        tests_run: usize,
        shrinks_performed: usize,
    },
}

impl CheckError {
    /// Shorthand for a generation error.
    pub fn generation(message: impl Into<String>) -> Self {
        CheckError::Generation {
            message: message.into(),
        }
    }

    /// Shorthand for a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        CheckError::InvalidConfig {
            message: message.into(),
        }
    }

    /// True for errors raised while producing a value.
    pub fn is_generation(&self) -> bool {
        matches!(self, CheckError::Generation { .. })
    }

    /// True for errors that are reported before any trial runs.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            CheckError::InvalidConfig { .. }
                | CheckError::InvalidRange { .. }
                | CheckError::InvalidWeights { .. }
        )
    }
}

fn shrink_phrase(shrunk: &bool) -> &'static str {
    if *shrunk {
        "minimized by shrinking to"
    } else {
        "no shrink found, original failing case"
    }
}

/// Result type for rosecheck operations.
pub type Result<T> = std::result::Result<T, CheckError>;

/// How a predicate, action or post-check failed.
///
/// Shrinking only adopts a candidate that fails the same way as the
/// original case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// The check returned `false`.
    Falsified,
    /// The check panicked or returned an error.
    Raised { message: String },
}

impl Failure {
    /// Whether `other` is the same kind of failure.
    pub fn same_kind(&self, other: &Failure) -> bool {
        matches!(
            (self, other),
            (Failure::Falsified, Failure::Falsified) | (Failure::Raised { .. }, Failure::Raised { .. })
        )
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Falsified => write!(f, "property returned false"),
            Failure::Raised { message } => write!(f, "{message}"),
        }
    }
}
