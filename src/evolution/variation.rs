//! Offspring production: and-type and or-type variation.

use rand::prelude::*;
use rand::seq::index;

use crate::schema::Algorithm;

use super::individual::Individual;
use super::operators::Toolbox;

/// And-type variation over an already selected pool.
///
/// Consecutive pairs `(0, 1), (2, 3), ...` are mated with probability `cxpb`,
/// then every individual is mutated with probability `mutpb`. Both operators
/// may touch the same individual. Anything touched has its fitness
/// invalidated. The output has the same length as the input.
pub fn var_and<G, T>(
    mut offspring: Vec<Individual<G>>,
    toolbox: &T,
    cxpb: f64,
    mutpb: f64,
    rng: &mut StdRng,
) -> Vec<Individual<G>>
where
    T: Toolbox<G>,
{
    for pair in offspring.chunks_exact_mut(2) {
        if rng.gen_bool(cxpb) {
            let (first, second) = pair.split_at_mut(1);
            toolbox.mate(&mut first[0].genome, &mut second[0].genome, rng);
            first[0].fitness.invalidate();
            second[0].fitness.invalidate();
        }
    }

    for individual in offspring.iter_mut() {
        if rng.gen_bool(mutpb) {
            toolbox.mutate(&mut individual.genome, rng);
            individual.fitness.invalidate();
        }
    }

    offspring
}

/// Or-type variation: produce exactly `lambda` offspring, each by exactly one
/// of crossover (probability `cxpb`), mutation (`mutpb`) or plain copy
/// (`1 - cxpb - mutpb`).
///
/// Crossover draws two distinct parents uniformly and keeps the first child.
/// Mutation and copy draw one parent uniformly. The caller guarantees
/// `cxpb + mutpb <= 1` and, when `cxpb > 0`, at least two parents.
pub fn var_or<G, T>(
    population: &[Individual<G>],
    toolbox: &T,
    lambda: usize,
    cxpb: f64,
    mutpb: f64,
    rng: &mut StdRng,
) -> Vec<Individual<G>>
where
    G: Clone,
    T: Toolbox<G>,
{
    let mut offspring = Vec::with_capacity(lambda);
    if population.is_empty() {
        return offspring;
    }

    for _ in 0..lambda {
        let op_choice: f64 = rng.gen_range(0.0..1.0);

        if op_choice < cxpb && population.len() >= 2 {
            let parents = index::sample(rng, population.len(), 2);
            let mut child = population[parents.index(0)].clone();
            let mut other = population[parents.index(1)].genome.clone();
            toolbox.mate(&mut child.genome, &mut other, rng);
            child.fitness.invalidate();
            offspring.push(child);
        } else if op_choice < cxpb + mutpb {
            let parent = rng.gen_range(0..population.len());
            let mut child = population[parent].clone();
            toolbox.mutate(&mut child.genome, rng);
            child.fitness.invalidate();
            offspring.push(child);
        } else {
            let parent = rng.gen_range(0..population.len());
            offspring.push(population[parent].clone());
        }
    }

    offspring
}

/// Produce one generation's offspring for `algorithm`.
///
/// `Simple` first selects `len(population)` parents with the toolbox's
/// selection operator and applies and-type variation; the or-type algorithms
/// produce `lambda` offspring from the current population.
pub fn generate_offspring<G, T>(
    algorithm: &Algorithm,
    population: &[Individual<G>],
    toolbox: &T,
    cxpb: f64,
    mutpb: f64,
    rng: &mut StdRng,
) -> Vec<Individual<G>>
where
    G: Clone,
    T: Toolbox<G>,
{
    match *algorithm {
        Algorithm::Simple => {
            let chosen = toolbox.select(population, population.len(), rng);
            let pool = chosen.into_iter().map(|i| population[i].clone()).collect();
            var_and(pool, toolbox, cxpb, mutpb, rng)
        }
        Algorithm::MuPlusLambda { lambda, .. } | Algorithm::MuCommaLambda { lambda, .. } => {
            var_or(population, toolbox, lambda, cxpb, mutpb, rng)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evolution::individual::Fitness;
    use crate::evolution::operators::BitToolbox;

    /// Toolbox whose operators leave visible marks on integer genomes.
    struct MarkingToolbox;

    impl Toolbox<Vec<i32>> for MarkingToolbox {
        fn mate(&self, a: &mut Vec<i32>, b: &mut Vec<i32>, _rng: &mut StdRng) {
            a.push(100);
            b.push(100);
        }

        fn mutate(&self, genome: &mut Vec<i32>, _rng: &mut StdRng) {
            genome.push(-1);
        }

        fn select(&self, population: &[Individual<Vec<i32>>], k: usize, _rng: &mut StdRng) -> Vec<usize> {
            (0..k).map(|i| i % population.len()).collect()
        }
    }

    fn evaluated(n: usize) -> Vec<Individual<Vec<i32>>> {
        (0..n)
            .map(|i| {
                let mut fitness = Fitness::maximize();
                fitness.set_values(vec![i as f64]).unwrap();
                Individual::new(vec![i as i32], fitness)
            })
            .collect()
    }

    #[test]
    fn test_var_and_no_variation_keeps_fitness() {
        let mut rng = StdRng::seed_from_u64(0);
        let offspring = var_and(evaluated(6), &MarkingToolbox, 0.0, 0.0, &mut rng);

        assert_eq!(offspring.len(), 6);
        assert!(offspring.iter().all(|ind| ind.fitness.is_valid()));
        assert!(offspring.iter().all(|ind| ind.genome.len() == 1));
    }

    #[test]
    fn test_var_and_full_variation_invalidates_all() {
        let mut rng = StdRng::seed_from_u64(0);
        let offspring = var_and(evaluated(5), &MarkingToolbox, 1.0, 1.0, &mut rng);

        assert_eq!(offspring.len(), 5);
        assert!(offspring.iter().all(|ind| !ind.fitness.is_valid()));
        // Pairs (0,1) and (2,3) mate; the odd one out is only mutated.
        for ind in &offspring[..4] {
            assert_eq!(ind.genome[1..], [100, -1]);
        }
        assert_eq!(offspring[4].genome[1..], [-1]);
    }

    #[test]
    fn test_var_or_produces_lambda() {
        let mut rng = StdRng::seed_from_u64(9);
        let population = evaluated(4);
        for lambda in [1, 4, 13] {
            let offspring = var_or(&population, &MarkingToolbox, lambda, 0.5, 0.2, &mut rng);
            assert_eq!(offspring.len(), lambda);
        }
    }

    #[test]
    fn test_var_or_operations_are_exclusive() {
        let mut rng = StdRng::seed_from_u64(21);
        let population = evaluated(4);
        let offspring = var_or(&population, &MarkingToolbox, 200, 0.4, 0.4, &mut rng);

        let mut crossed = 0;
        let mut mutated = 0;
        let mut copied = 0;
        for ind in &offspring {
            match ind.genome[1..] {
                [100] => crossed += 1,
                [-1] => mutated += 1,
                [] => copied += 1,
                ref other => panic!("operators combined: {other:?}"),
            }
            assert_eq!(ind.fitness.is_valid(), ind.genome.len() == 1);
        }

        assert!(crossed > 0 && mutated > 0 && copied > 0);
        assert_eq!(crossed + mutated + copied, 200);
    }

    #[test]
    fn test_var_or_copy_only() {
        let mut rng = StdRng::seed_from_u64(4);
        let population = evaluated(3);
        let offspring = var_or(&population, &MarkingToolbox, 10, 0.0, 0.0, &mut rng);

        assert!(offspring.iter().all(|ind| ind.fitness.is_valid()));
        assert!(offspring.iter().all(|ind| population.contains(ind)));
    }

    #[test]
    fn test_generate_offspring_sizes() {
        let mut rng = StdRng::seed_from_u64(1);
        let toolbox = BitToolbox::default();
        let genomes: Vec<Vec<bool>> = (0..6).map(|i| vec![i % 2 == 0; 5]).collect();
        let mut population = Individual::population(genomes, &[1.0]);
        for ind in population.iter_mut() {
            let ones = ind.genome.iter().filter(|&&b| b).count() as f64;
            ind.fitness.set_values(vec![ones]).unwrap();
        }

        let simple = generate_offspring(&Algorithm::Simple, &population, &toolbox, 0.5, 0.2, &mut rng);
        assert_eq!(simple.len(), 6);

        let plus = Algorithm::MuPlusLambda { mu: 3, lambda: 9 };
        let offspring = generate_offspring(&plus, &population, &toolbox, 0.5, 0.2, &mut rng);
        assert_eq!(offspring.len(), 9);
    }
}
