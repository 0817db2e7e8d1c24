//! Fitness evaluation of individuals whose fitness is invalid.
//!
//! The objective function and the mapping primitive are both supplied by the
//! caller. The evaluator only relies on the mapping returning one result per
//! input, in input order.

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::schema::EvaluationConfig;

use super::error::{BoxError, EvolutionError};
use super::individual::{FitnessArityError, Individual};

/// Objective function: genome to raw objective values.
pub trait Evaluate<G>: Sync {
    fn evaluate(&self, genome: &G) -> Result<Vec<f64>, BoxError>;
}

impl<G, F> Evaluate<G> for F
where
    F: Fn(&G) -> Result<Vec<f64>, BoxError> + Sync,
{
    fn evaluate(&self, genome: &G) -> Result<Vec<f64>, BoxError> {
        self(genome)
    }
}

/// Applies an objective function over a batch of genomes.
///
/// Implementations may run evaluations concurrently but must return exactly
/// one result per genome, in the order given, and must not return before
/// every evaluation has finished.
pub trait MapStrategy {
    fn map<G, E>(&self, evaluate: &E, genomes: &[&G]) -> Vec<Result<Vec<f64>, BoxError>>
    where
        G: Sync,
        E: Evaluate<G>;
}

/// Evaluates genomes one after another on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialMap;

impl MapStrategy for SequentialMap {
    fn map<G, E>(&self, evaluate: &E, genomes: &[&G]) -> Vec<Result<Vec<f64>, BoxError>>
    where
        G: Sync,
        E: Evaluate<G>,
    {
        genomes.iter().map(|g| evaluate.evaluate(g)).collect()
    }
}

/// Evaluates genomes on rayon, either on the global pool or a dedicated one.
#[derive(Debug, Default)]
pub struct ParallelMap {
    pool: Option<ThreadPool>,
}

impl ParallelMap {
    /// Use rayon's global thread pool.
    pub fn new() -> Self {
        Self { pool: None }
    }

    /// Use a dedicated pool with `workers` threads.
    pub fn with_workers(workers: usize) -> Result<Self, EvolutionError> {
        let pool = ThreadPoolBuilder::new().num_threads(workers).build()?;
        Ok(Self { pool: Some(pool) })
    }
}

impl MapStrategy for ParallelMap {
    fn map<G, E>(&self, evaluate: &E, genomes: &[&G]) -> Vec<Result<Vec<f64>, BoxError>>
    where
        G: Sync,
        E: Evaluate<G>,
    {
        let run = || {
            genomes
                .par_iter()
                .map(|g| evaluate.evaluate(g))
                .collect::<Vec<_>>()
        };

        match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        }
    }
}

/// Mapping primitive chosen from an [`EvaluationConfig`].
#[derive(Debug)]
pub enum EvaluationBackend {
    Sequential(SequentialMap),
    Parallel(ParallelMap),
}

impl EvaluationBackend {
    /// Build the backend described by `config`.
    pub fn from_config(config: &EvaluationConfig) -> Result<Self, EvolutionError> {
        if !config.parallel {
            return Ok(Self::Sequential(SequentialMap));
        }
        let map = if config.workers == 0 {
            ParallelMap::new()
        } else {
            ParallelMap::with_workers(config.workers)?
        };
        Ok(Self::Parallel(map))
    }
}

impl MapStrategy for EvaluationBackend {
    fn map<G, E>(&self, evaluate: &E, genomes: &[&G]) -> Vec<Result<Vec<f64>, BoxError>>
    where
        G: Sync,
        E: Evaluate<G>,
    {
        match self {
            Self::Sequential(map) => map.map(evaluate, genomes),
            Self::Parallel(map) => map.map(evaluate, genomes),
        }
    }
}

/// Scores every individual lacking a valid fitness.
pub struct FitnessEvaluator<E, M = SequentialMap> {
    evaluate: E,
    map: M,
}

impl<E> FitnessEvaluator<E, SequentialMap> {
    /// Create an evaluator that runs sequentially.
    pub fn new(evaluate: E) -> Self {
        Self {
            evaluate,
            map: SequentialMap,
        }
    }
}

impl<E, M: MapStrategy> FitnessEvaluator<E, M> {
    /// Create an evaluator with a custom mapping primitive.
    pub fn with_map(evaluate: E, map: M) -> Self {
        Self { evaluate, map }
    }

    /// Evaluate the individuals whose fitness is invalid and return how many
    /// were evaluated. Valid individuals are left untouched.
    ///
    /// The first failing evaluation or arity mismatch aborts with an error;
    /// no fitness is assigned from a batch that failed as a whole.
    pub fn evaluate_invalid<G>(
        &self,
        individuals: &mut [Individual<G>],
    ) -> Result<usize, EvolutionError>
    where
        G: Sync,
        E: Evaluate<G>,
    {
        let invalid: Vec<usize> = individuals
            .iter()
            .enumerate()
            .filter(|(_, ind)| !ind.fitness.is_valid())
            .map(|(i, _)| i)
            .collect();

        if invalid.is_empty() {
            return Ok(0);
        }

        let genomes: Vec<&G> = invalid.iter().map(|&i| &individuals[i].genome).collect();
        let results = self.map.map(&self.evaluate, &genomes);

        if results.len() != invalid.len() {
            return Err(EvolutionError::MappingLength {
                expected: invalid.len(),
                actual: results.len(),
            });
        }

        let mut values = Vec::with_capacity(results.len());
        for (&index, result) in invalid.iter().zip(results) {
            let fit = result.map_err(|source| EvolutionError::Evaluation { index, source })?;
            let expected = individuals[index].fitness.weights().len();
            if fit.len() != expected {
                return Err(EvolutionError::FitnessArity {
                    index,
                    source: FitnessArityError {
                        expected,
                        actual: fit.len(),
                    },
                });
            }
            values.push(fit);
        }

        for (&index, fit) in invalid.iter().zip(values) {
            individuals[index]
                .fitness
                .set_values(fit)
                .map_err(|source| EvolutionError::FitnessArity { index, source })?;
        }

        Ok(invalid.len())
    }
}
