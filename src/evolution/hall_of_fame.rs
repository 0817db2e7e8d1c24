//! Bounded memory of the best individuals seen during a run.

use super::individual::Individual;

/// The best `max_size` distinct individuals ever offered, best first.
///
/// Entries are only displaced by strictly better individuals, and genomes
/// already present are never inserted twice. What the active population
/// discards has no effect here.
#[derive(Debug, Clone)]
pub struct HallOfFame<G> {
    items: Vec<Individual<G>>,
    max_size: usize,
}

impl<G: Clone + PartialEq> HallOfFame<G> {
    /// Create an empty hall of fame holding at most `max_size` individuals.
    pub fn new(max_size: usize) -> Self {
        Self {
            items: Vec::with_capacity(max_size),
            max_size,
        }
    }

    /// Offer every individual in `individuals`. Unevaluated ones are ignored.
    pub fn update(&mut self, individuals: &[Individual<G>]) {
        for individual in individuals {
            if !individual.fitness.is_valid() {
                continue;
            }

            let admissible = match self.items.last() {
                _ if self.max_size == 0 => false,
                None => true,
                Some(worst) => {
                    self.items.len() < self.max_size || individual.fitness > worst.fitness
                }
            };
            if !admissible || self.items.iter().any(|kept| kept == individual) {
                continue;
            }

            if self.items.len() >= self.max_size {
                self.items.pop();
            }
            self.insert(individual.clone());
        }
    }

    /// Insert keeping best-first order; equal fitnesses go after existing ones.
    fn insert(&mut self, individual: Individual<G>) {
        let position = self
            .items
            .partition_point(|kept| kept.fitness >= individual.fitness);
        self.items.insert(position, individual);
    }

    /// Best individual, if any.
    pub fn best(&self) -> Option<&Individual<G>> {
        self.items.first()
    }

    /// All kept individuals, best first.
    pub fn items(&self) -> &[Individual<G>] {
        &self.items
    }

    /// Capacity fixed at construction.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evolution::individual::Fitness;
    use proptest::prelude::*;

    fn ind(genome: u32, value: f64) -> Individual<u32> {
        let mut fitness = Fitness::maximize();
        fitness.set_values(vec![value]).unwrap();
        Individual::new(genome, fitness)
    }

    fn values(hof: &HallOfFame<u32>) -> Vec<f64> {
        hof.items()
            .iter()
            .filter_map(|i| i.fitness.value(0))
            .collect()
    }

    #[test]
    fn test_keeps_best_sorted() {
        let mut hof = HallOfFame::new(3);
        hof.update(&[ind(1, 2.0), ind(2, 5.0), ind(3, 1.0), ind(4, 4.0), ind(5, 3.0)]);

        assert_eq!(hof.len(), 3);
        assert_eq!(values(&hof), vec![5.0, 4.0, 3.0]);
        assert_eq!(hof.best().map(|i| i.genome), Some(2));
    }

    #[test]
    fn test_deduplicates_by_genome() {
        let mut hof = HallOfFame::new(3);
        hof.update(&[ind(7, 5.0), ind(7, 5.0), ind(8, 1.0)]);
        hof.update(&[ind(7, 5.0)]);

        let genomes: Vec<u32> = hof.items().iter().map(|i| i.genome).collect();
        assert_eq!(genomes, vec![7, 8]);
    }

    #[test]
    fn test_ties_do_not_evict_when_full() {
        let mut hof = HallOfFame::new(2);
        hof.update(&[ind(1, 5.0), ind(2, 3.0)]);
        hof.update(&[ind(3, 3.0)]);

        let genomes: Vec<u32> = hof.items().iter().map(|i| i.genome).collect();
        assert_eq!(genomes, vec![1, 2]);
    }

    #[test]
    fn test_equal_fitness_inserted_after_existing() {
        let mut hof = HallOfFame::new(3);
        hof.update(&[ind(1, 5.0), ind(2, 5.0)]);

        let genomes: Vec<u32> = hof.items().iter().map(|i| i.genome).collect();
        assert_eq!(genomes, vec![1, 2]);
    }

    #[test]
    fn test_ignores_unevaluated() {
        let mut hof = HallOfFame::new(2);
        hof.update(&[Individual::new(1, Fitness::maximize())]);
        assert!(hof.is_empty());
    }

    #[test]
    fn test_zero_capacity() {
        let mut hof = HallOfFame::new(0);
        hof.update(&[ind(1, 1.0)]);
        assert!(hof.is_empty());
        assert_eq!(hof.max_size(), 0);
    }

    #[test]
    fn test_minimization() {
        let mut hof = HallOfFame::new(1);
        let mut low = Individual::new(1u32, Fitness::minimize());
        low.fitness.set_values(vec![0.5]).unwrap();
        let mut high = Individual::new(2u32, Fitness::minimize());
        high.fitness.set_values(vec![9.0]).unwrap();

        hof.update(&[high, low]);
        assert_eq!(hof.best().map(|i| i.genome), Some(1));
    }

    proptest! {
        #[test]
        fn prop_best_never_degrades(
            batches in prop::collection::vec(
                prop::collection::vec(-100.0f64..100.0, 0..10),
                1..8,
            ),
            capacity in 1usize..5,
        ) {
            let mut hof = HallOfFame::new(capacity);
            let mut previous_best = f64::NEG_INFINITY;
            let mut seen_max = f64::NEG_INFINITY;
            let mut next_genome = 0u32;

            for batch in batches {
                let individuals: Vec<_> = batch
                    .iter()
                    .map(|&v| {
                        next_genome += 1;
                        ind(next_genome, v)
                    })
                    .collect();
                seen_max = individuals
                    .iter()
                    .filter_map(|i| i.fitness.value(0))
                    .fold(seen_max, f64::max);
                hof.update(&individuals);

                let kept = values(&hof);
                prop_assert!(kept.len() <= capacity);
                prop_assert!(kept.windows(2).all(|w| w[0] >= w[1]));
                if let Some(&best) = kept.first() {
                    prop_assert!(best >= previous_best);
                    prop_assert_eq!(best, seen_max);
                    previous_best = best;
                }
            }
        }
    }
}
