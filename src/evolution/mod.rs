//! Generational evolutionary search.
//!
//! This module drives a population through repeated rounds of variation,
//! evaluation, replacement and recording.
//!
//! # Overview
//!
//! The search loop consists of:
//!
//! - **Fitness** (`individual`, `fitness`): Weighted fitness values and the
//!   evaluator that scores individuals whose fitness is invalid
//! - **Operators** (`operators`): The `Toolbox` trait plus stock crossover,
//!   mutation and selection operators
//! - **Variation** (`variation`): And-type and or-type offspring production
//! - **Replacement** (`replacement`): Generational, (mu + lambda) and
//!   (mu, lambda) survivor selection
//! - **Recording** (`statistics`, `hall_of_fame`): Per-generation statistics
//!   and the best individuals ever seen
//! - **Lifecycle** (`callbacks`, `progress`): Early stopping hooks and
//!   progress reporting
//! - **Engine** (`search`): The loop tying it all together
//!
//! # Example
//!
//! ```rust,no_run
//! use evoloop::evolution::{
//!     BitToolbox, BoxError, EvolutionEngine, FitnessEvaluator, Individual, Statistics,
//!     ThresholdStopping, random_bits,
//! };
//! use evoloop::schema::{Algorithm, EvolutionConfig};
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! fn onemax(genome: &Vec<bool>) -> Result<Vec<f64>, BoxError> {
//!     Ok(vec![genome.iter().filter(|&&b| b).count() as f64])
//! }
//!
//! let config = EvolutionConfig {
//!     algorithm: Algorithm::MuPlusLambda { mu: 20, lambda: 40 },
//!     crossover_prob: 0.6,
//!     mutation_prob: 0.3,
//!     generations: 50,
//!     ..Default::default()
//! };
//!
//! let mut rng = StdRng::seed_from_u64(0);
//! let genomes: Vec<_> = (0..20).map(|_| random_bits(32, &mut rng)).collect();
//! let population = Individual::population(genomes, &[1.0]);
//!
//! let mut engine = EvolutionEngine::new(config, BitToolbox::default(), FitnessEvaluator::new(onemax))?
//!     .with_stats(Statistics::fitness(0))
//!     .with_callback(ThresholdStopping::new(32.0, "fitness_max"));
//!
//! let outcome = engine.run(population)?;
//! println!("Processed {} generations", outcome.generations_processed());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod callbacks;
mod error;
mod fitness;
mod hall_of_fame;
mod individual;
mod operators;
mod progress;
mod replacement;
mod search;
mod statistics;
mod variation;

pub use callbacks::{
    Callback, CallbackContext, CallbackController, ConsecutiveStopping, DeltaThreshold,
    LogbookSaver, Stage, StepPredicate, ThresholdStopping, TimerStopping, predicate,
};
pub use error::{BoxError, CallbackError, EvalError, EvolutionError};
pub use fitness::{
    Evaluate, EvaluationBackend, FitnessEvaluator, MapStrategy, ParallelMap, SequentialMap,
};
pub use hall_of_fame::HallOfFame;
pub use individual::{Fitness, FitnessArityError, Individual};
pub use operators::{
    BitToolbox, Toolbox, best_selection, flip_bit_mutation, gaussian_mutation,
    one_point_crossover, random_bits, tournament_selection, uniform_crossover,
};
pub use progress::{LogProgress, ProgressReporter, SilentProgress};
pub use replacement::replace;
pub use search::{EstimatorHandle, EvolutionEngine, EvolutionOutcome};
pub use statistics::{Statistics, StatsCompiler};
pub use variation::{generate_offspring, var_and, var_or};
