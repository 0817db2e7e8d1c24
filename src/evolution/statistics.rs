//! Population statistics compiled into logbook records.

use std::collections::BTreeMap;

use super::individual::Individual;

/// Compiles a population into named numeric values.
pub trait StatsCompiler<G> {
    /// Field names produced by [`compile`](Self::compile), in display order.
    fn fields(&self) -> Vec<String>;

    /// Aggregate the population.
    fn compile(&self, population: &[Individual<G>]) -> BTreeMap<String, f64>;
}

type KeyFn<G> = Box<dyn Fn(&Individual<G>) -> Option<f64> + Send + Sync>;
type Reducer = Box<dyn Fn(&[f64]) -> f64 + Send + Sync>;

/// Statistics over one value extracted from every individual.
///
/// Individuals for which the key yields `None` (typically an invalid
/// fitness) are left out. An empty sample compiles to no fields.
pub struct Statistics<G> {
    key: KeyFn<G>,
    reducers: Vec<(String, Reducer)>,
}

impl<G: 'static> Statistics<G> {
    /// Create statistics over the value returned by `key`.
    pub fn new<K>(key: K) -> Self
    where
        K: Fn(&Individual<G>) -> Option<f64> + Send + Sync + 'static,
    {
        Self {
            key: Box::new(key),
            reducers: Vec::new(),
        }
    }

    /// Mean, standard deviation, max and min of one objective, under the
    /// names `fitness`, `fitness_std`, `fitness_max` and `fitness_min`.
    pub fn fitness(objective: usize) -> Self {
        Self::new(move |ind: &Individual<G>| ind.fitness.value(objective))
            .register("fitness", mean)
            .register("fitness_std", std_dev)
            .register("fitness_max", max)
            .register("fitness_min", min)
    }

    /// Add a named reducer.
    pub fn register<F>(mut self, name: impl Into<String>, reducer: F) -> Self
    where
        F: Fn(&[f64]) -> f64 + Send + Sync + 'static,
    {
        self.reducers.push((name.into(), Box::new(reducer)));
        self
    }
}

impl<G> StatsCompiler<G> for Statistics<G> {
    fn fields(&self) -> Vec<String> {
        self.reducers.iter().map(|(name, _)| name.clone()).collect()
    }

    fn compile(&self, population: &[Individual<G>]) -> BTreeMap<String, f64> {
        let sample: Vec<f64> = population.iter().filter_map(|ind| (self.key)(ind)).collect();
        if sample.is_empty() {
            return BTreeMap::new();
        }

        self.reducers
            .iter()
            .map(|(name, reducer)| (name.clone(), reducer(&sample)))
            .collect()
    }
}

/// Arithmetic mean.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let avg = mean(values);
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

pub fn max(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

pub fn min(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::INFINITY, f64::min)
}
