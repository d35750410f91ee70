use crate::config::{Configuration, InvalidConfiguration};
use crate::models::{Candidate, Crossover, Population, SelectionError, mutate};
use rand::Rng;
use tracing::instrument;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum BreedingError {
    #[error("Selection error: {0}")]
    Selection(#[from] SelectionError),
    #[error("Configuration error: {0}")]
    Configuration(#[from] InvalidConfiguration),
}

/// Builds the next generation from a ranked one.
pub(crate) struct Breeder<'a> {
    crossover: &'a Crossover,
    population_size: usize,
    elite_count: usize,
    mating_pool_size: usize,
    num_pms: usize,
}

impl<'a> Breeder<'a> {
    pub(crate) fn new(config: &'a Configuration, num_pms: usize) -> Self {
        Self {
            crossover: &config.crossover,
            population_size: config.population_size,
            elite_count: config.elite_count,
            mating_pool_size: config.mating_pool_size,
            num_pms,
        }
    }

    fn breed_child<R: Rng>(
        &self,
        rng: &mut R,
        parent1: &Candidate,
        parent2: &Candidate,
        mutation_rate: f64,
    ) -> Result<Candidate, InvalidConfiguration> {
        let child = self.crossover.apply(rng, parent1, parent2)?;

        mutate(rng, child, self.num_pms, mutation_rate)
    }

    /// Elites first, verbatim, then offspring of parents drawn from the mating pool
    /// until the population is full again.
    #[instrument(level = "debug", skip(self, rng, ranked), fields(population_size = self.population_size, elite_count = self.elite_count, mutation_rate = mutation_rate))]
    pub(crate) fn breed_generation<R: Rng>(
        &self,
        rng: &mut R,
        ranked: &Population,
        mutation_rate: f64,
    ) -> Result<Population, BreedingError> {
        let mut next_generation = ranked.elites(self.elite_count)?;
        next_generation.reserve(self.population_size.saturating_sub(self.elite_count));

        while next_generation.len() < self.population_size {
            let parent1 = ranked.sample_parent(rng, self.mating_pool_size)?;
            let parent2 = ranked.sample_parent(rng, self.mating_pool_size)?;

            next_generation.push(self.breed_child(rng, parent1, parent2, mutation_rate)?);
        }

        Ok(Population::new(next_generation))
    }
}
