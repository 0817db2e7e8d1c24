//! Errors raised by an evolutionary run.

use crate::schema::ConfigError;

use super::callbacks::Stage;
use super::individual::FitnessArityError;

/// Error type returned by external collaborators (evaluation functions and
/// callbacks).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error returned by an objective function.
pub type EvalError = BoxError;

/// Error returned by a callback.
pub type CallbackError = BoxError;

/// Fatal run errors. None of them is retried.
#[derive(Debug, thiserror::Error)]
pub enum EvolutionError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Evaluation of individual {index} failed: {source}")]
    Evaluation {
        index: usize,
        #[source]
        source: BoxError,
    },
    #[error("Individual {index}: {source}")]
    FitnessArity {
        index: usize,
        #[source]
        source: FitnessArityError,
    },
    #[error("Mapping returned {actual} results for {expected} individuals")]
    MappingLength { expected: usize, actual: usize },
    #[error("Callback failed during {stage}: {source}")]
    Callback {
        stage: Stage,
        #[source]
        source: BoxError,
    },
    #[error("Failed to build evaluation thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
