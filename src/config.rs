//! Tunables of an optimization run.
//!
//! Every field has a default, so a configuration file only needs to carry the
//! values it overrides:
//!
//! ```rust
//! use vmp_ga::config::Configuration;
//!
//! let config: Configuration = serde_json::from_str(r#"{ "generations": 250, "seed": 7 }"#)?;
//!
//! assert_eq!(config.generations, 250);
//! assert_eq!(config.population_size, 30);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::models::{Crossover, Distribution, MutationRate};
use serde::{Deserialize, Serialize};
use tracing::instrument;

pub const DEFAULT_GENERATIONS: u32 = 100;
pub const DEFAULT_POPULATION_SIZE: usize = 30;
pub const DEFAULT_ELITE_COUNT: usize = 5;
pub const DEFAULT_MATING_POOL_SIZE: usize = 10;
pub const DEFAULT_MUTATION_RATE: f64 = 0.1;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum InvalidConfiguration {
    #[error("NoPhysicalMachines: at least one physical machine is required")]
    NoPhysicalMachines,
    #[error("EmptyPopulation: population_size must be at least 1")]
    EmptyPopulation,
    #[error("EliteCountTooLarge: elite_count={elite_count}, population_size={population_size}")]
    EliteCountTooLarge {
        elite_count: usize,
        population_size: usize,
    },
    #[error("EmptyMatingPool: mating_pool_size must be at least 1")]
    EmptyMatingPool,
    #[error(
        "MatingPoolTooLarge: mating_pool_size={mating_pool_size}, population_size={population_size}"
    )]
    MatingPoolTooLarge {
        mating_pool_size: usize,
        population_size: usize,
    },
    #[error("GenomeTooShort: single-point crossover needs at least 2 genes, got {0}")]
    GenomeTooShort(usize),
    #[error("GenomeLengthMismatch: parents have {lhs} and {rhs} genes")]
    GenomeLengthMismatch { lhs: usize, rhs: usize },
    #[error("ProbabilityOutOfRange: {name} must be between 0.0 and 1.0, got {value}")]
    ProbabilityOutOfRange { name: &'static str, value: f64 },
}

impl InvalidConfiguration {
    pub(crate) fn probability(name: &'static str, value: f64) -> Result<f64, Self> {
        if !(0.0..=1.0).contains(&value) {
            return Err(Self::ProbabilityOutOfRange { name, value });
        }

        Ok(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Number of generations bred before the run concludes.
    pub generations: u32,
    pub population_size: usize,
    /// Top-ranked candidates copied unmodified into the next generation.
    pub elite_count: usize,
    /// Top-ranked candidates eligible as parents.
    pub mating_pool_size: usize,
    pub mutation_rate: MutationRate,
    pub crossover: Crossover,
    pub distribution: Distribution,
    /// Fixes the random stream; runs with the same seed and input are identical.
    pub seed: Option<u64>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            generations: DEFAULT_GENERATIONS,
            population_size: DEFAULT_POPULATION_SIZE,
            elite_count: DEFAULT_ELITE_COUNT,
            mating_pool_size: DEFAULT_MATING_POOL_SIZE,
            mutation_rate: MutationRate::default(),
            crossover: Crossover::default(),
            distribution: Distribution::default(),
            seed: None,
        }
    }
}

impl Configuration {
    pub fn with_generations(mut self, generations: u32) -> Self {
        self.generations = generations;
        self
    }

    pub fn with_population_size(mut self, population_size: usize) -> Self {
        self.population_size = population_size;
        self
    }

    pub fn with_elite_count(mut self, elite_count: usize) -> Self {
        self.elite_count = elite_count;
        self
    }

    pub fn with_mating_pool_size(mut self, mating_pool_size: usize) -> Self {
        self.mating_pool_size = mating_pool_size;
        self
    }

    pub fn with_mutation_rate(mut self, mutation_rate: MutationRate) -> Self {
        self.mutation_rate = mutation_rate;
        self
    }

    pub fn with_crossover(mut self, crossover: Crossover) -> Self {
        self.crossover = crossover;
        self
    }

    pub fn with_distribution(mut self, distribution: Distribution) -> Self {
        self.distribution = distribution;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks the tunables against each other and against the problem size.
    ///
    /// Deserialized values bypass the validating constructors of the nested
    /// types, so probabilities are checked again here.
    #[instrument(level = "debug", skip(self), fields(population_size = self.population_size, elite_count = self.elite_count, mating_pool_size = self.mating_pool_size))]
    pub fn validate(&self, num_vms: usize, num_pms: usize) -> Result<(), InvalidConfiguration> {
        if num_pms == 0 {
            return Err(InvalidConfiguration::NoPhysicalMachines);
        }

        if self.population_size == 0 {
            return Err(InvalidConfiguration::EmptyPopulation);
        }

        if self.elite_count > self.population_size {
            return Err(InvalidConfiguration::EliteCountTooLarge {
                elite_count: self.elite_count,
                population_size: self.population_size,
            });
        }

        if self.mating_pool_size == 0 {
            return Err(InvalidConfiguration::EmptyMatingPool);
        }

        if self.mating_pool_size > self.population_size {
            return Err(InvalidConfiguration::MatingPoolTooLarge {
                mating_pool_size: self.mating_pool_size,
                population_size: self.population_size,
            });
        }

        self.mutation_rate.validate()?;
        self.crossover.validate(num_vms)?;

        Ok(())
    }
}
