use crate::models::{Candidate, Resources, ValidationError, fitness};
use rand::Rng;
use rayon::prelude::*;
use std::cmp::Ordering;
use tracing::instrument;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("NotRanked: the population must be ranked before selection")]
    NotRanked,
    #[error("EmptyPool: cannot select from an empty pool")]
    EmptyPool,
    #[error("PoolOutOfRange: requested {requested} candidates from a population of {population_size}")]
    PoolOutOfRange {
        requested: usize,
        population_size: usize,
    },
}

/// Fixed-size collection of candidates, ordered by descending fitness once ranked.
///
/// Scores are attached by [`Population::rank`] and belong to this generation only;
/// a population built from elites and offspring starts unscored.
#[derive(Debug, Clone)]
pub struct Population {
    candidates_with_fitness: Vec<(Candidate, Option<f64>)>,
    ranked: bool,
}

impl Population {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self {
            candidates_with_fitness: candidates.into_iter().map(|c| (c, None)).collect(),
            ranked: false,
        }
    }

    pub fn len(&self) -> usize {
        self.candidates_with_fitness.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates_with_fitness.is_empty()
    }

    pub fn is_ranked(&self) -> bool {
        self.ranked
    }

    pub fn candidates(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates_with_fitness.iter().map(|(candidate, _)| candidate)
    }

    /// Score attached to the candidate at `index`, if ranked.
    pub fn fitness(&self, index: usize) -> Option<f64> {
        self.candidates_with_fitness
            .get(index)
            .and_then(|(_, fitness)| *fitness)
    }

    /// Scores every candidate once, in parallel, then stable-sorts by descending
    /// fitness. Equal scores keep their previous relative order.
    ///
    /// A candidate that does not fit `resources` leaves the population unranked.
    #[instrument(level = "debug", skip(self, resources), fields(population_size = self.len()))]
    pub fn rank(&mut self, resources: &Resources) -> Result<(), ValidationError> {
        self.ranked = false;
        self.candidates_with_fitness
            .par_iter_mut()
            .try_for_each(|(candidate, score)| {
                *score = Some(fitness(candidate, resources)?);
                Ok(())
            })?;

        self.candidates_with_fitness
            .sort_by(|(_, lhs), (_, rhs)| rhs.partial_cmp(lhs).unwrap_or(Ordering::Equal));

        self.ranked = true;
        Ok(())
    }

    /// Rank-0 candidate and its score.
    pub fn best(&self) -> Result<(&Candidate, f64), SelectionError> {
        self.ensure_ranked()?;

        self.candidates_with_fitness
            .first()
            .and_then(|(candidate, fitness)| fitness.map(|fitness| (candidate, fitness)))
            .ok_or(SelectionError::EmptyPool)
    }

    pub fn mean_fitness(&self) -> Option<f64> {
        if !self.ranked || self.is_empty() {
            return None;
        }

        let total: f64 = self
            .candidates_with_fitness
            .iter()
            .filter_map(|(_, fitness)| *fitness)
            .sum();

        Some(total / self.len() as f64)
    }

    /// Copies of the first `count` ranked candidates, unmodified.
    pub fn elites(&self, count: usize) -> Result<Vec<Candidate>, SelectionError> {
        self.ensure_ranked()?;
        self.ensure_within(count)?;

        Ok(self.candidates_with_fitness[..count]
            .iter()
            .map(|(candidate, _)| candidate.clone())
            .collect())
    }

    /// Draws uniformly, with replacement, from the top `pool_size` ranked candidates.
    pub fn sample_parent<R: Rng>(
        &self,
        rng: &mut R,
        pool_size: usize,
    ) -> Result<&Candidate, SelectionError> {
        self.ensure_ranked()?;
        if pool_size == 0 {
            return Err(SelectionError::EmptyPool);
        }
        self.ensure_within(pool_size)?;

        let index = rng.random_range(0..pool_size);

        Ok(&self.candidates_with_fitness[index].0)
    }

    pub fn into_candidates(self) -> Vec<Candidate> {
        self.candidates_with_fitness
            .into_iter()
            .map(|(candidate, _)| candidate)
            .collect()
    }

    fn ensure_ranked(&self) -> Result<(), SelectionError> {
        if !self.ranked {
            return Err(SelectionError::NotRanked);
        }

        Ok(())
    }

    fn ensure_within(&self, requested: usize) -> Result<(), SelectionError> {
        if requested > self.len() {
            return Err(SelectionError::PoolOutOfRange {
                requested,
                population_size: self.len(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Pm, Vm};
    use rand::{SeedableRng, rngs::StdRng};

    // two VMs of (2,2) and (3,3) on three hosts of (4,4)
    fn create_test_resources() -> Resources {
        Resources::new(
            vec![Vm { cpu: 2, ram: 2 }, Vm { cpu: 3, ram: 3 }],
            vec![
                Pm {
                    cpu_capacity: 4,
                    ram_capacity: 4
                };
                3
            ],
        )
        .unwrap()
    }

    fn candidate(genome: Vec<usize>) -> Candidate {
        Candidate { genome }
    }

    fn create_test_population() -> Population {
        Population::new(vec![
            candidate(vec![0, 0]), // overloaded, 1 host: 1/3
            candidate(vec![0, 1]), // feasible, 2 hosts: 1/3
            candidate(vec![2, 2]), // overloaded, 1 host: 1/3
            candidate(vec![1, 2]), // feasible, 2 hosts: 1/3
        ])
    }

    #[test]
    fn it_requires_ranking_before_selection() {
        let population = create_test_population();
        let mut rng = StdRng::seed_from_u64(42);

        assert_eq!(population.elites(1), Err(SelectionError::NotRanked));
        assert_eq!(
            population.sample_parent(&mut rng, 2).map(|_| ()),
            Err(SelectionError::NotRanked)
        );
        assert_eq!(population.best().map(|_| ()), Err(SelectionError::NotRanked));
        assert_eq!(population.mean_fitness(), None);
    }

    #[test]
    fn it_keeps_order_among_equal_scores() {
        let mut population = create_test_population();
        let before: Vec<Candidate> = population.candidates().cloned().collect();

        population.rank(&create_test_resources()).unwrap();

        let after: Vec<Candidate> = population.candidates().cloned().collect();
        assert_eq!(before, after);
        assert!((0..4).all(|i| population.fitness(i) == Some(1.0 / 3.0)));
    }

    #[test]
    fn it_sorts_by_descending_fitness() {
        let resources = Resources::new(
            vec![Vm { cpu: 2, ram: 2 }, Vm { cpu: 3, ram: 3 }, Vm { cpu: 1, ram: 1 }],
            vec![
                Pm {
                    cpu_capacity: 4,
                    ram_capacity: 4
                };
                3
            ],
        )
        .unwrap();
        let mut population = Population::new(vec![
            candidate(vec![0, 1, 2]), // 3 hosts: 1/4
            candidate(vec![0, 0, 0]), // overloaded, 1 host: 1/3
            candidate(vec![0, 1, 0]), // 2 hosts: 1/3
            candidate(vec![0, 0, 1]), // overloaded, 2 hosts: 1/4
        ]);

        population.rank(&resources).unwrap();

        let order: Vec<Vec<usize>> = population.candidates().map(|c| c.genome().to_vec()).collect();
        assert_eq!(
            order,
            vec![vec![0, 0, 0], vec![0, 1, 0], vec![0, 1, 2], vec![0, 0, 1]]
        );
        assert_eq!(population.best().unwrap().1, 1.0 / 3.0);
        let expected_mean = (1.0 / 3.0 + 1.0 / 3.0 + 1.0 / 4.0 + 1.0 / 4.0) / 4.0;
        assert!((population.mean_fitness().unwrap() - expected_mean).abs() < 1e-12);
    }

    #[test]
    fn it_returns_elites_unmodified() {
        let mut population = create_test_population();
        population.rank(&create_test_resources()).unwrap();

        let elites = population.elites(2).unwrap();

        assert_eq!(elites, vec![candidate(vec![0, 0]), candidate(vec![0, 1])]);
        assert!(population.elites(0).unwrap().is_empty());
        assert_eq!(
            population.elites(5),
            Err(SelectionError::PoolOutOfRange {
                requested: 5,
                population_size: 4
            })
        );
    }

    #[test]
    fn it_samples_only_from_the_mating_pool() {
        let mut population = create_test_population();
        population.rank(&create_test_resources()).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let pool = population.elites(2).unwrap();
        let mut seen = [false; 2];

        for _ in 0..200 {
            let parent = population.sample_parent(&mut rng, 2).unwrap();
            let index = pool.iter().position(|c| c == parent).unwrap();
            seen[index] = true;
        }

        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn it_rejects_invalid_pool_sizes() {
        let mut population = create_test_population();
        population.rank(&create_test_resources()).unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        assert_eq!(
            population.sample_parent(&mut rng, 0).map(|_| ()),
            Err(SelectionError::EmptyPool)
        );
        assert_eq!(
            population.sample_parent(&mut rng, 5).map(|_| ()),
            Err(SelectionError::PoolOutOfRange {
                requested: 5,
                population_size: 4
            })
        );
    }

    #[test]
    fn it_refuses_to_rank_foreign_candidates() {
        let mut population = Population::new(vec![candidate(vec![0, 1]), candidate(vec![0, 7])]);

        assert_eq!(
            population.rank(&create_test_resources()),
            Err(ValidationError::IndexOutOfRange {
                kind: "pm",
                index: 7,
                len: 3
            })
        );
        assert!(!population.is_ranked());
        assert_eq!(population.best().map(|_| ()), Err(SelectionError::NotRanked));
    }
}
