//! Survivor selection: how parents and offspring form the next population.

use crate::schema::Algorithm;

use super::individual::Individual;

/// Build the next population from the current one and its evaluated offspring.
///
/// - `Simple`: the offspring replace the population outright.
/// - `MuPlusLambda`: the best `mu` of parents and offspring together. Parents
///   stay eligible, so the best fitness never drops.
/// - `MuCommaLambda`: the best `mu` of the offspring alone. Parents are
///   discarded, so the best fitness may drop between generations.
///
/// Ties keep their relative order, parents ahead of offspring.
pub fn replace<G>(
    algorithm: &Algorithm,
    population: Vec<Individual<G>>,
    offspring: Vec<Individual<G>>,
) -> Vec<Individual<G>> {
    match *algorithm {
        Algorithm::Simple => offspring,
        Algorithm::MuPlusLambda { mu, .. } => {
            let mut pool = population;
            pool.extend(offspring);
            keep_best(pool, mu)
        }
        Algorithm::MuCommaLambda { mu, .. } => keep_best(offspring, mu),
    }
}

/// Sort best first and truncate to `k`.
fn keep_best<G>(mut pool: Vec<Individual<G>>, k: usize) -> Vec<Individual<G>> {
    pool.sort_by(|a, b| b.fitness.cmp(&a.fitness));
    pool.truncate(k);
    pool
}
