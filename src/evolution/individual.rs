//! Individuals and their (possibly multi-objective) fitness.

use std::cmp::Ordering;
use std::sync::Arc;

/// Weighted fitness with a validity flag.
///
/// Each objective carries a weight; positive weights are maximized and
/// negative weights minimized. Fitnesses are ordered lexicographically by
/// their weighted values, so `a > b` means `a` is better. An invalid fitness
/// orders below every valid one.
#[derive(Debug, Clone)]
pub struct Fitness {
    weights: Arc<[f64]>,
    values: Option<Vec<f64>>,
}

impl Fitness {
    /// Create an invalid fitness with the given objective weights.
    pub fn new(weights: impl Into<Arc<[f64]>>) -> Self {
        Self {
            weights: weights.into(),
            values: None,
        }
    }

    /// Single objective, maximized.
    pub fn maximize() -> Self {
        Self::new(vec![1.0])
    }

    /// Single objective, minimized.
    pub fn minimize() -> Self {
        Self::new(vec![-1.0])
    }

    /// Objective weights.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Raw objective values, if evaluated.
    pub fn values(&self) -> Option<&[f64]> {
        self.values.as_deref()
    }

    /// Raw value of one objective, if evaluated.
    pub fn value(&self, objective: usize) -> Option<f64> {
        self.values.as_ref().and_then(|v| v.get(objective).copied())
    }

    /// Whether the fitness has been assigned since the last invalidation.
    pub fn is_valid(&self) -> bool {
        self.values.is_some()
    }

    /// Assign objective values. Fails if the count does not match the weights.
    pub fn set_values(&mut self, values: Vec<f64>) -> Result<(), FitnessArityError> {
        if values.len() != self.weights.len() {
            return Err(FitnessArityError {
                expected: self.weights.len(),
                actual: values.len(),
            });
        }
        self.values = Some(values);
        Ok(())
    }

    /// Drop the assigned values.
    pub fn invalidate(&mut self) {
        self.values = None;
    }

    /// Weighted values (empty while invalid).
    pub fn weighted(&self) -> impl Iterator<Item = f64> + '_ {
        self.values
            .iter()
            .flatten()
            .zip(self.weights.iter())
            .map(|(v, w)| v * w)
    }

    /// Pareto dominance: no worse on every objective and strictly better on one.
    pub fn dominates(&self, other: &Fitness) -> bool {
        if !self.is_valid() || !other.is_valid() {
            return false;
        }

        let mut strictly_better = false;
        for (mine, theirs) in self.weighted().zip(other.weighted()) {
            if mine < theirs {
                return false;
            }
            if mine > theirs {
                strictly_better = true;
            }
        }
        strictly_better
    }
}

impl PartialEq for Fitness {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Fitness {}

impl PartialOrd for Fitness {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Fitness {
    fn cmp(&self, other: &Self) -> Ordering {
        let mut mine = self.weighted();
        let mut theirs = other.weighted();
        loop {
            match (mine.next(), theirs.next()) {
                (Some(a), Some(b)) => match a.total_cmp(&b) {
                    Ordering::Equal => continue,
                    unequal => return unequal,
                },
                (Some(_), None) => return Ordering::Greater,
                (None, Some(_)) => return Ordering::Less,
                (None, None) => return Ordering::Equal,
            }
        }
    }
}

/// Returned when an evaluation yields the wrong number of objective values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Expected {expected} fitness values, got {actual}")]
pub struct FitnessArityError {
    pub expected: usize,
    pub actual: usize,
}

/// A candidate solution: an opaque genome and its fitness.
#[derive(Debug, Clone)]
pub struct Individual<G> {
    /// The genome.
    pub genome: G,
    /// Fitness of the genome. Must be invalidated whenever the genome changes.
    pub fitness: Fitness,
}

impl<G> Individual<G> {
    /// Create an unevaluated individual.
    pub fn new(genome: G, fitness: Fitness) -> Self {
        Self { genome, fitness }
    }

    /// Build an unevaluated population sharing one set of objective weights.
    pub fn population<I>(genomes: I, weights: &[f64]) -> Vec<Self>
    where
        I: IntoIterator<Item = G>,
    {
        let weights: Arc<[f64]> = weights.into();
        genomes
            .into_iter()
            .map(|genome| Self::new(genome, Fitness::new(Arc::clone(&weights))))
            .collect()
    }
}

/// Individuals compare by genome, which is what the hall of fame deduplicates on.
impl<G: PartialEq> PartialEq for Individual<G> {
    fn eq(&self, other: &Self) -> bool {
        self.genome == other.genome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn evaluated(weights: &[f64], values: &[f64]) -> Fitness {
        let mut fitness = Fitness::new(weights.to_vec());
        fitness.set_values(values.to_vec()).unwrap();
        fitness
    }

    #[test]
    fn test_validity_flag() {
        let mut fitness = Fitness::maximize();
        assert!(!fitness.is_valid());
        assert_eq!(fitness.values(), None);

        fitness.set_values(vec![3.0]).unwrap();
        assert!(fitness.is_valid());
        assert_eq!(fitness.value(0), Some(3.0));

        fitness.invalidate();
        assert!(!fitness.is_valid());
    }

    #[test]
    fn test_arity_mismatch() {
        let mut fitness = Fitness::new(vec![1.0, -1.0]);
        let err = fitness.set_values(vec![1.0]).unwrap_err();
        assert_eq!(
            err,
            FitnessArityError {
                expected: 2,
                actual: 1
            }
        );
        assert!(!fitness.is_valid());
    }

    #[test]
    fn test_maximize_and_minimize_ordering() {
        assert!(evaluated(&[1.0], &[5.0]) > evaluated(&[1.0], &[3.0]));
        assert!(evaluated(&[-1.0], &[5.0]) < evaluated(&[-1.0], &[3.0]));
    }

    #[test]
    fn test_invalid_orders_below_valid() {
        let invalid = Fitness::maximize();
        assert!(invalid < evaluated(&[1.0], &[-100.0]));
        assert_eq!(invalid, Fitness::maximize());
    }

    #[test]
    fn test_lexicographic_ordering() {
        let a = evaluated(&[1.0, -1.0], &[2.0, 10.0]);
        let b = evaluated(&[1.0, -1.0], &[2.0, 5.0]);
        let c = evaluated(&[1.0, -1.0], &[1.0, 0.0]);
        assert!(b > a);
        assert!(a > c);
    }

    #[test]
    fn test_dominates() {
        let a = evaluated(&[1.0, 1.0], &[2.0, 2.0]);
        let b = evaluated(&[1.0, 1.0], &[1.0, 2.0]);
        let c = evaluated(&[1.0, 1.0], &[3.0, 0.0]);
        assert!(a.dominates(&b));
        assert!(!b.dominates(&a));
        assert!(!a.dominates(&c));
        assert!(!c.dominates(&a));
        assert!(!a.dominates(&a));
    }

    #[test]
    fn test_population_shares_weights() {
        let population = Individual::population(vec![vec![true], vec![false]], &[1.0]);
        assert_eq!(population.len(), 2);
        assert!(population.iter().all(|ind| !ind.fitness.is_valid()));
        assert_eq!(population[0].fitness.weights(), &[1.0]);
        assert_ne!(population[0], population[1]);
    }

    proptest! {
        #[test]
        fn prop_ordering_matches_weighted_values(
            a in -1e6f64..1e6,
            b in -1e6f64..1e6,
            weight in prop_oneof![Just(1.0f64), Just(-1.0f64)],
        ) {
            let fa = evaluated(&[weight], &[a]);
            let fb = evaluated(&[weight], &[b]);
            prop_assert_eq!(fa.cmp(&fb), (a * weight).total_cmp(&(b * weight)));
        }
    }
}
