//! Evolution configuration types for the generational search loop.
//!
//! This module provides the serializable settings that select a replacement
//! strategy, the variation probabilities, and how fitness evaluation is mapped
//! over a population.

use serde::{Deserialize, Serialize};

/// Top-level configuration for an evolutionary run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionConfig {
    /// Replacement strategy and its population sizes.
    #[serde(default)]
    pub algorithm: Algorithm,
    /// Probability of mating two individuals (and-type), or of producing an
    /// offspring by crossover (or-type).
    #[serde(default = "default_crossover_prob", alias = "cxpb")]
    pub crossover_prob: f64,
    /// Probability of mutating an individual (and-type), or of producing an
    /// offspring by mutation (or-type).
    #[serde(default = "default_mutation_prob", alias = "mutpb")]
    pub mutation_prob: f64,
    /// Number of generations to run after generation 0.
    #[serde(default = "default_generations", alias = "ngen")]
    pub generations: usize,
    /// Capacity of the hall of fame. Zero disables it.
    #[serde(default = "default_hall_of_fame_size")]
    pub hall_of_fame_size: usize,
    /// Log every logbook record as it is appended.
    #[serde(default)]
    pub verbose: bool,
    /// How fitness evaluation is mapped over individuals.
    #[serde(default)]
    pub evaluation: EvaluationConfig,
    /// Random seed for reproducibility.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::default(),
            crossover_prob: default_crossover_prob(),
            mutation_prob: default_mutation_prob(),
            generations: default_generations(),
            hall_of_fame_size: default_hall_of_fame_size(),
            verbose: false,
            evaluation: EvaluationConfig::default(),
            random_seed: None,
        }
    }
}

fn default_crossover_prob() -> f64 {
    0.8
}
fn default_mutation_prob() -> f64 {
    0.1
}
fn default_generations() -> usize {
    40
}
fn default_hall_of_fame_size() -> usize {
    1
}

/// Replacement strategy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "type")]
pub enum Algorithm {
    /// Parents picked by the selection operator, varied with and-type
    /// variation, and replaced wholesale by their offspring.
    #[default]
    Simple,
    /// Elitist: the next population is the best `mu` of parents and `lambda`
    /// or-type offspring combined.
    MuPlusLambda {
        /// Individuals kept per generation.
        mu: usize,
        /// Offspring produced per generation.
        lambda: usize,
    },
    /// Non-elitist: the next population is the best `mu` of the `lambda`
    /// or-type offspring only.
    MuCommaLambda {
        /// Individuals kept per generation.
        mu: usize,
        /// Offspring produced per generation.
        lambda: usize,
    },
}

impl Algorithm {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Simple => "simple",
            Algorithm::MuPlusLambda { .. } => "mu+lambda",
            Algorithm::MuCommaLambda { .. } => "mu,lambda",
        }
    }

    /// Whether offspring are produced by or-type variation.
    pub fn is_or_type(&self) -> bool {
        !matches!(self, Algorithm::Simple)
    }
}

/// Evaluation mapping settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EvaluationConfig {
    /// Evaluate individuals on a rayon thread pool.
    #[serde(default)]
    pub parallel: bool,
    /// Number of worker threads (0 = rayon's global pool).
    #[serde(default)]
    pub workers: usize,
}

/// Reason a run stopped.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StopReason {
    /// All configured generations were processed.
    MaxGenerations,
    /// A callback asked the loop to stop.
    Callback,
}

// ============================================================================
// Validation
// ============================================================================

/// Configuration validation errors.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be within [0, 1], got {value}")]
    InvalidProbability { name: &'static str, value: f64 },
    #[error(
        "The sum of the crossover and mutation probabilities must be smaller or equal to 1.0, got {sum}"
    )]
    ProbabilitySumTooLarge { sum: f64 },
    #[error("mu must be at least 1")]
    InvalidMu,
    #[error("lambda must be at least 1")]
    InvalidLambda,
    #[error("lambda ({lambda}) must be greater or equal to mu ({mu})")]
    LambdaSmallerThanMu { mu: usize, lambda: usize },
    #[error("Population must hold at least {required} individuals, got {actual}")]
    PopulationTooSmall { required: usize, actual: usize },
}

/// Check that `value` is a probability in [0, 1]. NaN is rejected.
pub fn check_probability(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidProbability { name, value })
    }
}

impl EvolutionConfig {
    /// Validate evolution configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_probability("crossover_prob", self.crossover_prob)?;
        check_probability("mutation_prob", self.mutation_prob)?;

        if !self.algorithm.is_or_type() {
            return Ok(());
        }

        // Or-type variation picks exactly one operation per offspring.
        let sum = self.crossover_prob + self.mutation_prob;
        if sum > 1.0 {
            return Err(ConfigError::ProbabilitySumTooLarge { sum });
        }

        match self.algorithm {
            Algorithm::Simple => {}
            Algorithm::MuPlusLambda { mu, lambda } | Algorithm::MuCommaLambda { mu, lambda } => {
                if mu == 0 {
                    return Err(ConfigError::InvalidMu);
                }
                if lambda == 0 {
                    return Err(ConfigError::InvalidLambda);
                }
                if matches!(self.algorithm, Algorithm::MuCommaLambda { .. }) && lambda < mu {
                    return Err(ConfigError::LambdaSmallerThanMu { mu, lambda });
                }
            }
        }

        Ok(())
    }

    /// Check a starting population against this configuration.
    ///
    /// Or-type crossover draws two distinct parents, so a population that can
    /// shrink to `mu` needs room for a pair whenever crossover can fire.
    pub fn validate_population(&self, size: usize) -> Result<(), ConfigError> {
        if size == 0 {
            return Err(ConfigError::PopulationTooSmall {
                required: 1,
                actual: 0,
            });
        }

        if self.crossover_prob > 0.0 {
            let smallest = match self.algorithm {
                Algorithm::Simple => return Ok(()),
                Algorithm::MuPlusLambda { mu, .. } | Algorithm::MuCommaLambda { mu, .. } => {
                    size.min(mu)
                }
            };
            if smallest < 2 {
                return Err(ConfigError::PopulationTooSmall {
                    required: 2,
                    actual: smallest,
                });
            }
        }

        Ok(())
    }
}
