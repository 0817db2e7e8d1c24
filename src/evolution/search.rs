//! The generational loop.

use std::any::Any;
use std::sync::Arc;

use rand::prelude::*;

use crate::schema::{ConfigError, EvolutionConfig, Logbook, Record, StopReason};

use super::callbacks::{Callback, CallbackContext, CallbackController, Stage};
use super::error::EvolutionError;
use super::fitness::{Evaluate, FitnessEvaluator, MapStrategy, SequentialMap};
use super::hall_of_fame::HallOfFame;
use super::individual::Individual;
use super::operators::Toolbox;
use super::progress::{ProgressReporter, SilentProgress};
use super::replacement::replace;
use super::statistics::StatsCompiler;
use super::variation::generate_offspring;

/// Opaque handle to whatever drives the search, handed to callbacks.
pub type EstimatorHandle = Arc<dyn Any + Send + Sync>;

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct EvolutionOutcome<G> {
    /// Final population.
    pub population: Vec<Individual<G>>,
    /// One record per processed generation, generation 0 included.
    pub logbook: Logbook,
    /// Generation counter as reported at termination: 0 when stopped right
    /// after generation 0, otherwise one past the last generation index.
    pub n_gen: usize,
    /// Why the loop ended.
    pub stop_reason: StopReason,
}

impl<G> EvolutionOutcome<G> {
    /// Generations run after generation 0.
    pub fn generations_processed(&self) -> usize {
        self.logbook.len().saturating_sub(1)
    }

    /// Evaluations performed over the whole run.
    pub fn total_evaluations(&self) -> usize {
        self.logbook.records().iter().map(|r| r.nevals).sum()
    }

    /// Best individual of the final population.
    pub fn best(&self) -> Option<&Individual<G>> {
        self.population.iter().max_by(|a, b| a.fitness.cmp(&b.fitness))
    }
}

/// Evolution engine that runs the generational loop.
///
/// The engine owns its collaborators: the operator toolbox, the fitness
/// evaluator, and optionally a statistics compiler, a hall of fame,
/// callbacks, a progress reporter and an estimator handle.
pub struct EvolutionEngine<G, T, E, M = SequentialMap> {
    config: EvolutionConfig,
    toolbox: T,
    evaluator: FitnessEvaluator<E, M>,
    stats: Option<Box<dyn StatsCompiler<G>>>,
    hall_of_fame: Option<HallOfFame<G>>,
    callbacks: CallbackController,
    reporter: Box<dyn ProgressReporter>,
    estimator: Option<EstimatorHandle>,
    rng: StdRng,
}

impl<G, T, E, M> EvolutionEngine<G, T, E, M>
where
    G: Clone + PartialEq + Sync,
    T: Toolbox<G>,
    E: Evaluate<G>,
    M: MapStrategy,
{
    /// Create a new evolution engine.
    ///
    /// The configuration is validated here, before any generation can run.
    pub fn new(
        config: EvolutionConfig,
        toolbox: T,
        evaluator: FitnessEvaluator<E, M>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let seed = config.random_seed.unwrap_or_else(rand::random);
        log::debug!("Seeding {} search with {}", config.algorithm.name(), seed);

        let hall_of_fame = (config.hall_of_fame_size > 0)
            .then(|| HallOfFame::new(config.hall_of_fame_size));

        Ok(Self {
            config,
            toolbox,
            evaluator,
            stats: None,
            hall_of_fame,
            callbacks: CallbackController::new(),
            reporter: Box::new(SilentProgress),
            estimator: None,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// Compile statistics into every logbook record.
    pub fn with_stats(mut self, stats: impl StatsCompiler<G> + 'static) -> Self {
        self.stats = Some(Box::new(stats));
        self
    }

    /// Register a callback.
    pub fn with_callback(mut self, callback: impl Callback + 'static) -> Self {
        self.callbacks.push(Box::new(callback));
        self
    }

    /// Replace the progress reporter.
    pub fn with_reporter(mut self, reporter: impl ProgressReporter + 'static) -> Self {
        self.reporter = Box::new(reporter);
        self
    }

    /// Attach a handle that callbacks can downcast.
    pub fn with_estimator(mut self, estimator: EstimatorHandle) -> Self {
        self.estimator = Some(estimator);
        self
    }

    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    /// Hall of fame, absent when its configured size is zero.
    pub fn hall_of_fame(&self) -> Option<&HallOfFame<G>> {
        self.hall_of_fame.as_ref()
    }

    /// Run the configured algorithm from `population`.
    ///
    /// Individuals with an invalid fitness are evaluated first. `on_end` runs
    /// exactly once when the loop finishes or is stopped by a callback. Any
    /// error aborts the run immediately.
    pub fn run(
        &mut self,
        population: Vec<Individual<G>>,
    ) -> Result<EvolutionOutcome<G>, EvolutionError> {
        self.config.validate_population(population.len())?;

        let algorithm = self.config.algorithm;
        let cxpb = self.config.crossover_prob;
        let mutpb = self.config.mutation_prob;
        let ngen = self.config.generations;
        let estimator = self.estimator.clone();
        let estimator = estimator.as_deref();

        self.callbacks.on_start(&CallbackContext {
            stage: Stage::Start,
            record: None,
            logbook: None,
            estimator,
        })?;

        let fields = self.stats.as_ref().map(|s| s.fields()).unwrap_or_default();
        let mut logbook = Logbook::new(fields);

        let mut population = population;
        let nevals = self.evaluator.evaluate_invalid(&mut population)?;
        if let Some(hof) = self.hall_of_fame.as_mut() {
            hof.update(&population);
        }
        self.record(&mut logbook, 0, nevals, &population);

        let mut stop_reason = StopReason::MaxGenerations;
        let mut n_gen = 0;

        if self.step(&logbook, estimator)? {
            stop_reason = StopReason::Callback;
        } else {
            let mut last = 0;
            for generation in 1..=ngen {
                last = generation;

                let mut offspring = generate_offspring(
                    &algorithm,
                    &population,
                    &self.toolbox,
                    cxpb,
                    mutpb,
                    &mut self.rng,
                );
                let nevals = self.evaluator.evaluate_invalid(&mut offspring)?;
                if let Some(hof) = self.hall_of_fame.as_mut() {
                    hof.update(&offspring);
                }

                population = replace(&algorithm, population, offspring);
                self.record(&mut logbook, generation, nevals, &population);

                log::debug!(
                    "Generation {}: {} evaluations, population {}, hall of fame {}",
                    generation,
                    nevals,
                    population.len(),
                    self.hall_of_fame.as_ref().map_or(0, HallOfFame::len)
                );

                if self.step(&logbook, estimator)? {
                    stop_reason = StopReason::Callback;
                    break;
                }
            }
            n_gen = last + 1;
        }

        if stop_reason == StopReason::Callback {
            log::info!("Stopping the algorithm");
        }

        self.callbacks.on_end(&CallbackContext {
            stage: Stage::End,
            record: None,
            logbook: Some(&logbook),
            estimator,
        })?;
        self.reporter.finish(n_gen);

        Ok(EvolutionOutcome {
            population,
            logbook,
            n_gen,
            stop_reason,
        })
    }

    /// Compile and append the record for `generation`.
    fn record(
        &mut self,
        logbook: &mut Logbook,
        generation: usize,
        nevals: usize,
        population: &[Individual<G>],
    ) {
        let mut record = Record::new(generation, nevals);
        if let Some(stats) = &self.stats {
            record.stats = stats.compile(population);
        }

        if self.config.verbose {
            if logbook.is_empty() {
                log::info!("{}", logbook.header_line());
            }
            log::info!("{}", logbook.format_record(&record));
        }

        self.reporter.advance(&record);
        logbook.record(record);
    }

    /// Run `on_step` against the latest record.
    fn step(
        &mut self,
        logbook: &Logbook,
        estimator: Option<&(dyn Any + Send + Sync)>,
    ) -> Result<bool, EvolutionError> {
        self.callbacks.on_step(&CallbackContext {
            stage: Stage::Step,
            record: logbook.last(),
            logbook: Some(logbook),
            estimator,
        })
    }
}
