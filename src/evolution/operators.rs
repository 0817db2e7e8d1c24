//! Variation and selection operators.
//!
//! The search loop only sees the [`Toolbox`] trait. The free functions below
//! are stock operators for common genome shapes.

use rand::prelude::*;
use rand_distr::Normal;

use crate::schema::{ConfigError, check_probability};

use super::individual::Individual;

/// Operators the search loop needs from the caller.
///
/// `mate` and `mutate` edit genomes in place; the loop invalidates the
/// fitness of every individual it hands to them.
pub trait Toolbox<G> {
    /// Recombine two genomes in place.
    fn mate(&self, a: &mut G, b: &mut G, rng: &mut StdRng);

    /// Mutate a genome in place.
    fn mutate(&self, genome: &mut G, rng: &mut StdRng);

    /// Pick `k` individuals, returned as indices into `population`.
    /// Indices may repeat.
    fn select(&self, population: &[Individual<G>], k: usize, rng: &mut StdRng) -> Vec<usize>;
}

/// Toolbox for binary genomes: one-point crossover, bit-flip mutation and
/// tournament selection.
#[derive(Debug, Clone)]
pub struct BitToolbox {
    /// Per-gene flip probability.
    pub indpb: f64,
    /// Contestants per tournament.
    pub tournament_size: usize,
}

impl Default for BitToolbox {
    fn default() -> Self {
        Self {
            indpb: 0.05,
            tournament_size: 3,
        }
    }
}

impl BitToolbox {
    /// Create a toolbox, rejecting an `indpb` outside [0, 1].
    pub fn new(indpb: f64, tournament_size: usize) -> Result<Self, ConfigError> {
        check_probability("indpb", indpb)?;
        Ok(Self {
            indpb,
            tournament_size,
        })
    }
}

impl Toolbox<Vec<bool>> for BitToolbox {
    fn mate(&self, a: &mut Vec<bool>, b: &mut Vec<bool>, rng: &mut StdRng) {
        one_point_crossover(a, b, rng);
    }

    fn mutate(&self, genome: &mut Vec<bool>, rng: &mut StdRng) {
        flip_bit_mutation(genome, self.indpb, rng);
    }

    fn select(
        &self,
        population: &[Individual<Vec<bool>>],
        k: usize,
        rng: &mut StdRng,
    ) -> Vec<usize> {
        tournament_selection(population, k, self.tournament_size, rng)
    }
}

/// Per-gene rate clamped to [0, 1]. NaN counts as 0.
fn gene_probability(indpb: f64) -> f64 {
    if indpb.is_nan() {
        0.0
    } else {
        indpb.clamp(0.0, 1.0)
    }
}

/// Generate a random binary genome.
pub fn random_bits<R: Rng>(length: usize, rng: &mut R) -> Vec<bool> {
    (0..length).map(|_| rng.gen_bool(0.5)).collect()
}

/// Single-point crossover: swap the tails after a random cut point.
pub fn one_point_crossover<T, R: Rng>(a: &mut [T], b: &mut [T], rng: &mut R) {
    let len = a.len().min(b.len());
    if len <= 1 {
        return;
    }

    let point = rng.gen_range(1..len);
    a[point..len].swap_with_slice(&mut b[point..len]);
}

/// Uniform crossover: swap each gene with probability `indpb`, clamped to
/// [0, 1].
pub fn uniform_crossover<T, R: Rng>(a: &mut [T], b: &mut [T], indpb: f64, rng: &mut R) {
    let indpb = gene_probability(indpb);
    for (x, y) in a.iter_mut().zip(b.iter_mut()) {
        if rng.gen_bool(indpb) {
            std::mem::swap(x, y);
        }
    }
}

/// Flip each bit with probability `indpb`, clamped to [0, 1].
pub fn flip_bit_mutation<R: Rng>(genome: &mut [bool], indpb: f64, rng: &mut R) {
    let indpb = gene_probability(indpb);
    for gene in genome.iter_mut() {
        if rng.gen_bool(indpb) {
            *gene = !*gene;
        }
    }
}

/// Add gaussian noise N(mu, sigma) to each gene with probability `indpb`.
///
/// A NaN or negative `sigma` leaves the genome unchanged. `indpb` is clamped
/// to [0, 1].
pub fn gaussian_mutation<R: Rng>(genome: &mut [f64], mu: f64, sigma: f64, indpb: f64, rng: &mut R) {
    let Ok(normal) = Normal::new(mu, sigma) else {
        return;
    };
    let indpb = gene_probability(indpb);
    for gene in genome.iter_mut() {
        if rng.gen_bool(indpb) {
            *gene += normal.sample(rng);
        }
    }
}

/// Tournament selection: `k` times, keep the best of `tournament_size`
/// uniformly drawn contestants.
pub fn tournament_selection<G, R: Rng>(
    population: &[Individual<G>],
    k: usize,
    tournament_size: usize,
    rng: &mut R,
) -> Vec<usize> {
    if population.is_empty() {
        return Vec::new();
    }

    (0..k)
        .map(|_| {
            let mut best_idx = rng.gen_range(0..population.len());
            for _ in 1..tournament_size.max(1) {
                let idx = rng.gen_range(0..population.len());
                if population[idx].fitness > population[best_idx].fitness {
                    best_idx = idx;
                }
            }
            best_idx
        })
        .collect()
}

/// Truncation selection: indices of the `k` best individuals, best first.
/// Ties keep their original order.
pub fn best_selection<G>(population: &[Individual<G>], k: usize) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..population.len()).collect();
    indices.sort_by(|&a, &b| population[b].fitness.cmp(&population[a].fitness));
    indices.truncate(k);
    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evolution::individual::Fitness;

    fn scored(values: &[f64]) -> Vec<Individual<usize>> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let mut fitness = Fitness::maximize();
                fitness.set_values(vec![v]).unwrap();
                Individual::new(i, fitness)
            })
            .collect()
    }

    #[test]
    fn test_one_point_crossover_swaps_tails() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut a = vec![0u8; 8];
        let mut b = vec![1u8; 8];

        one_point_crossover(&mut a, &mut b, &mut rng);

        let point = a.iter().position(|&g| g == 1).unwrap();
        assert!(point >= 1 && point < 8);
        assert!(a[..point].iter().all(|&g| g == 0));
        assert!(a[point..].iter().all(|&g| g == 1));
        assert!(b[..point].iter().all(|&g| g == 1));
        assert!(b[point..].iter().all(|&g| g == 0));
    }

    #[test]
    fn test_crossover_short_genomes_unchanged() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut a = vec![true];
        let mut b = vec![false];
        one_point_crossover(&mut a, &mut b, &mut rng);
        assert_eq!((a, b), (vec![true], vec![false]));
    }

    #[test]
    fn test_uniform_crossover_conserves_genes() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut a: Vec<u32> = (0..20).collect();
        let mut b: Vec<u32> = (100..120).collect();

        uniform_crossover(&mut a, &mut b, 0.5, &mut rng);

        for i in 0..20 {
            let mut pair = [a[i], b[i]];
            pair.sort();
            assert_eq!(pair, [i as u32, 100 + i as u32]);
        }
    }

    #[test]
    fn test_flip_bit_extremes() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut genome = vec![true, false, true];

        flip_bit_mutation(&mut genome, 0.0, &mut rng);
        assert_eq!(genome, vec![true, false, true]);

        flip_bit_mutation(&mut genome, 1.0, &mut rng);
        assert_eq!(genome, vec![false, true, false]);
    }

    #[test]
    fn test_gaussian_mutation() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut genome = vec![0.0; 16];

        gaussian_mutation(&mut genome, 0.0, 1.0, 1.0, &mut rng);
        assert!(genome.iter().any(|&g| g != 0.0));

        let before = genome.clone();
        gaussian_mutation(&mut genome, 0.0, f64::NAN, 1.0, &mut rng);
        assert_eq!(genome, before);
    }

    #[test]
    fn test_tournament_full_size_picks_best_often() {
        let mut rng = StdRng::seed_from_u64(13);
        let population = scored(&[1.0, 5.0, 3.0, 2.0]);

        let picks = tournament_selection(&population, 50, 20, &mut rng);

        assert_eq!(picks.len(), 50);
        let best = picks.iter().filter(|&&i| i == 1).count();
        assert!(best > 40, "best picked {best} times");
    }

    #[test]
    fn test_tournament_empty_population() {
        let mut rng = StdRng::seed_from_u64(0);
        let population: Vec<Individual<usize>> = Vec::new();
        assert!(tournament_selection(&population, 5, 3, &mut rng).is_empty());
    }

    #[test]
    fn test_best_selection() {
        let population = scored(&[1.0, 5.0, 3.0, 5.0, 2.0]);
        assert_eq!(best_selection(&population, 3), vec![1, 3, 2]);
        assert_eq!(best_selection(&population, 10).len(), 5);
    }

    #[test]
    fn test_random_bits_length() {
        let mut rng = StdRng::seed_from_u64(2);
        assert_eq!(random_bits(12, &mut rng).len(), 12);
    }

    #[test]
    fn test_out_of_range_gene_rates_are_clamped() {
        let mut rng = StdRng::seed_from_u64(8);

        let mut genome = vec![true, false, true];
        flip_bit_mutation(&mut genome, 1.5, &mut rng);
        assert_eq!(genome, vec![false, true, false]);

        flip_bit_mutation(&mut genome, -0.5, &mut rng);
        flip_bit_mutation(&mut genome, f64::NAN, &mut rng);
        assert_eq!(genome, vec![false, true, false]);

        let mut a = vec![0u8; 4];
        let mut b = vec![1u8; 4];
        uniform_crossover(&mut a, &mut b, 2.0, &mut rng);
        assert_eq!((a, b), (vec![1u8; 4], vec![0u8; 4]));

        let mut reals = vec![0.0; 4];
        gaussian_mutation(&mut reals, 0.0, 1.0, -1.0, &mut rng);
        assert_eq!(reals, vec![0.0; 4]);
    }

    #[test]
    fn test_bit_toolbox_rejects_bad_indpb() {
        assert!(BitToolbox::new(0.1, 3).is_ok());
        assert_eq!(
            BitToolbox::new(1.5, 3).unwrap_err(),
            ConfigError::InvalidProbability {
                name: "indpb",
                value: 1.5
            }
        );
    }

    #[test]
    fn test_bit_toolbox_mutate_with_stray_indpb() {
        let mut rng = StdRng::seed_from_u64(4);
        let toolbox = BitToolbox {
            indpb: 1.5,
            tournament_size: 3,
        };
        let mut genome = vec![false; 6];
        toolbox.mutate(&mut genome, &mut rng);
        assert_eq!(genome, vec![true; 6]);
    }
}
