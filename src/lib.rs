//! evoloop - A generational evolutionary algorithm driver.
//!
//! This crate runs the classic evolutionary loop: evaluate a population,
//! produce offspring by crossover and mutation, pick survivors, record
//! statistics, and repeat until a generation budget runs out or a callback
//! asks to stop.
//!
//! # Architecture
//!
//! The crate is split into two main modules:
//!
//! - `schema`: Configuration types, validation and the logbook
//! - `evolution`: Fitness, operators, variation, replacement and the engine
//!
//! # Example
//!
//! ```rust,no_run
//! use evoloop::{
//!     evolution::{BitToolbox, BoxError, EvolutionEngine, FitnessEvaluator, Individual, random_bits},
//!     schema::EvolutionConfig,
//! };
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! fn onemax(genome: &Vec<bool>) -> Result<Vec<f64>, BoxError> {
//!     Ok(vec![genome.iter().filter(|&&b| b).count() as f64])
//! }
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let genomes: Vec<_> = (0..50).map(|_| random_bits(20, &mut rng)).collect();
//!
//! let mut engine = EvolutionEngine::new(
//!     EvolutionConfig::default(),
//!     BitToolbox::default(),
//!     FitnessEvaluator::new(onemax),
//! )?;
//! let outcome = engine.run(Individual::population(genomes, &[1.0]))?;
//!
//! println!("Best after {} generations: {:?}", outcome.n_gen, outcome.best());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod evolution;
pub mod schema;

// Re-export commonly used types
pub use evolution::{EvolutionEngine, EvolutionError, EvolutionOutcome, Individual};
pub use schema::{Algorithm, EvolutionConfig, Logbook};
