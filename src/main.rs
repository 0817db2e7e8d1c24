//! evoloop CLI - Run a OneMax search from JSON configuration.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use evoloop::{
    evolution::{
        BitToolbox, BoxError, EvaluationBackend, EvolutionEngine, FitnessEvaluator, Individual,
        LogProgress, LogbookSaver, Statistics, ThresholdStopping, random_bits,
    },
    schema::{Algorithm, ConfigError, EvolutionConfig, check_probability},
};

/// OneMax demo: maximize the number of set bits in a binary genome.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct OneMaxConfig {
    /// Bits per genome.
    #[serde(default = "default_genome_length")]
    genome_length: usize,
    /// Individuals in the initial population.
    #[serde(default = "default_population_size")]
    population_size: usize,
    /// Contestants per selection tournament.
    #[serde(default = "default_tournament_size")]
    tournament_size: usize,
    /// Per-bit flip probability of the mutation operator.
    #[serde(default = "default_indpb")]
    indpb: f64,
    /// Stop as soon as a genome with every bit set is found.
    #[serde(default = "default_stop_on_optimum")]
    stop_on_optimum: bool,
    /// Search settings.
    #[serde(default)]
    evolution: EvolutionConfig,
}

impl Default for OneMaxConfig {
    fn default() -> Self {
        Self {
            genome_length: default_genome_length(),
            population_size: default_population_size(),
            tournament_size: default_tournament_size(),
            indpb: default_indpb(),
            stop_on_optimum: default_stop_on_optimum(),
            evolution: EvolutionConfig::default(),
        }
    }
}

impl OneMaxConfig {
    /// Validate the demo settings and the search settings they carry.
    fn validate(&self) -> Result<(), ConfigError> {
        check_probability("indpb", self.indpb)?;
        self.evolution.validate()?;
        self.evolution.validate_population(self.population_size)
    }
}

fn default_genome_length() -> usize {
    100
}
fn default_population_size() -> usize {
    300
}
fn default_tournament_size() -> usize {
    3
}
fn default_indpb() -> f64 {
    0.05
}
fn default_stop_on_optimum() -> bool {
    true
}

fn onemax(genome: &Vec<bool>) -> Result<Vec<f64>, BoxError> {
    Ok(vec![genome.iter().filter(|&&b| b).count() as f64])
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <config.json> [logbook.json]", args[0]);
        eprintln!();
        eprintln!("Run a OneMax evolutionary search from JSON configuration.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  config.json   Path to search configuration file");
        eprintln!("  logbook.json  Where to write the logbook (optional)");
        eprintln!();
        eprintln!("Example configuration is generated with --example flag.");
        std::process::exit(1);
    }

    if args[1] == "--example" {
        print_example_config();
        return;
    }

    let config_path = PathBuf::from(&args[1]);
    let logbook_path = args.get(2).map(PathBuf::from);

    let config_str = fs::read_to_string(&config_path).unwrap_or_else(|e| {
        eprintln!("Error reading config file: {}", e);
        std::process::exit(1);
    });

    let config: OneMaxConfig = serde_json::from_str(&config_str).unwrap_or_else(|e| {
        eprintln!("Error parsing config: {}", e);
        std::process::exit(1);
    });

    if let Err(e) = config.validate() {
        eprintln!("Invalid config: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(config, logbook_path) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(config: OneMaxConfig, logbook_path: Option<PathBuf>) -> Result<(), BoxError> {
    let evolution = config.evolution.clone();

    println!("OneMax Search");
    println!("=============");
    println!(
        "Algorithm: {} ({} generations)",
        evolution.algorithm.name(),
        evolution.generations
    );
    println!(
        "Population: {} genomes of {} bits",
        config.population_size, config.genome_length
    );
    println!(
        "cxpb: {}, mutpb: {}",
        evolution.crossover_prob, evolution.mutation_prob
    );
    println!();

    let mut rng = match evolution.random_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let genomes: Vec<Vec<bool>> = (0..config.population_size)
        .map(|_| random_bits(config.genome_length, &mut rng))
        .collect();
    let population = Individual::population(genomes, &[1.0]);

    let toolbox = BitToolbox::new(config.indpb, config.tournament_size)?;
    let backend = EvaluationBackend::from_config(&evolution.evaluation)?;
    let evaluator = FitnessEvaluator::with_map(onemax, backend);

    let mut engine = EvolutionEngine::new(evolution.clone(), toolbox, evaluator)?
        .with_stats(Statistics::fitness(0))
        .with_reporter(LogProgress::new(evolution.generations + 1));
    if config.stop_on_optimum {
        engine = engine.with_callback(ThresholdStopping::new(
            config.genome_length as f64,
            "fitness_max",
        ));
    }
    if let Some(path) = logbook_path {
        engine = engine.with_callback(LogbookSaver::new(path));
    }

    println!("Running search...");
    let start = Instant::now();
    let outcome = engine.run(population)?;
    let elapsed = start.elapsed();

    println!();
    println!("{}", outcome.logbook.header_line());
    for record in outcome.logbook.records() {
        println!("{}", outcome.logbook.format_record(record));
    }
    println!();

    println!("Stopped: {:?}", outcome.stop_reason);
    println!(
        "Generations: {} processed (n_gen = {})",
        outcome.generations_processed(),
        outcome.n_gen
    );
    println!("Evaluations: {}", outcome.total_evaluations());
    if let Some(best) = engine.hall_of_fame().and_then(|hof| hof.best()) {
        println!(
            "Best ever: {:.0}/{} bits set",
            best.fitness.value(0).unwrap_or(0.0),
            config.genome_length
        );
    }
    if let Some(best) = outcome.best() {
        println!(
            "Best in final population: {:.0}",
            best.fitness.value(0).unwrap_or(0.0)
        );
    }
    println!("Time: {:.2}s", elapsed.as_secs_f32());

    Ok(())
}

fn example_config() -> OneMaxConfig {
    OneMaxConfig {
        evolution: EvolutionConfig {
            algorithm: Algorithm::MuPlusLambda {
                mu: 300,
                lambda: 600,
            },
            crossover_prob: 0.5,
            mutation_prob: 0.2,
            random_seed: Some(42),
            ..Default::default()
        },
        ..Default::default()
    }
}

fn print_example_config() {
    let config = example_config();

    println!("Example configuration (config.json):");
    match serde_json::to_string_pretty(&config) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing example config: {}", e),
    }
}
