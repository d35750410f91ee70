use crate::config::InvalidConfiguration;
use crate::models::{Candidate, Gene};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Takes each gene from `lhs` with the given probability, otherwise from `rhs`.
#[instrument(level = "debug", skip(rng, lhs, rhs), fields(genome_length = lhs.len(), probability = probability))]
fn crossover_uniform<R: Rng>(rng: &mut R, lhs: &[Gene], rhs: &[Gene], probability: f64) -> Vec<Gene> {
    lhs.iter()
        .zip(rhs)
        .map(|(&lhs, &rhs)| if rng.random_bool(probability) { lhs } else { rhs })
        .collect()
}

/// Concatenates `lhs[..point]` and `rhs[point..]`.
#[instrument(level = "debug", skip(lhs, rhs), fields(genome_length = lhs.len(), cut_point = point))]
fn crossover_single_point(lhs: &[Gene], rhs: &[Gene], point: usize) -> Vec<Gene> {
    let mut genome = Vec::with_capacity(lhs.len());

    genome.extend_from_slice(&lhs[..point]);
    genome.extend_from_slice(&rhs[point..]);
    genome
}

/// Recombination of two parent placements into a new one.
///
/// The child never shares storage with either parent.
///
/// ```rust
/// use vmp_ga::models::Crossover;
///
/// // the default: cut once, head from the first parent, tail from the second
/// let single_point = Crossover::single_point();
///
/// // pick each VM's host from the first parent 60% of the time
/// let uniform = Crossover::uniform(0.6)?;
///
/// assert!(Crossover::uniform(1.5).is_err());
/// # let _ = (single_point, uniform);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum Crossover {
    /// Cut point drawn uniformly from `[1, N-1]`, so both parents contribute.
    /// Requires genomes of at least two genes.
    #[default]
    SinglePoint,
    /// Each gene is drawn independently from one of the two parents.
    Uniform {
        /// Chance in `[0, 1]` that a gene comes from the first parent. `1.0` copies
        /// the first parent and `0.0` copies the second.
        probability: f64,
    },
}

impl Crossover {
    pub fn single_point() -> Self {
        Self::SinglePoint
    }

    pub fn uniform(probability: f64) -> Result<Self, InvalidConfiguration> {
        let probability = InvalidConfiguration::probability("crossover_probability", probability)?;

        Ok(Self::Uniform { probability })
    }

    /// Checks that this strategy can recombine genomes of `genome_length` genes.
    pub(crate) fn validate(&self, genome_length: usize) -> Result<(), InvalidConfiguration> {
        match self {
            Self::SinglePoint if genome_length < 2 => {
                Err(InvalidConfiguration::GenomeTooShort(genome_length))
            }
            Self::SinglePoint => Ok(()),
            Self::Uniform { probability } => {
                InvalidConfiguration::probability("crossover_probability", *probability).map(|_| ())
            }
        }
    }

    /// Produces a child from two parents of equal length.
    #[instrument(level = "debug", skip(self, rng, lhs, rhs), fields(crossover_type = ?self, genome_length = lhs.len()))]
    pub fn apply<R: Rng>(
        &self,
        rng: &mut R,
        lhs: &Candidate,
        rhs: &Candidate,
    ) -> Result<Candidate, InvalidConfiguration> {
        if lhs.len() != rhs.len() {
            return Err(InvalidConfiguration::GenomeLengthMismatch {
                lhs: lhs.len(),
                rhs: rhs.len(),
            });
        }
        self.validate(lhs.len())?;

        let genome = match self {
            Self::SinglePoint => {
                let point = rng.random_range(1..lhs.len());
                crossover_single_point(lhs.genome(), rhs.genome(), point)
            }
            Self::Uniform { probability } => {
                crossover_uniform(rng, lhs.genome(), rhs.genome(), *probability)
            }
        };

        Ok(Candidate { genome })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    fn create_test_candidate(genome: Vec<Gene>) -> Candidate {
        Candidate { genome }
    }

    #[test]
    fn it_performs_single_point_crossover() {
        let lhs = [1, 2, 3, 4, 5];
        let rhs = [6, 7, 8, 9, 10];

        assert_eq!(crossover_single_point(&lhs, &rhs, 1), vec![1, 7, 8, 9, 10]);
        assert_eq!(crossover_single_point(&lhs, &rhs, 2), vec![1, 2, 8, 9, 10]);
        assert_eq!(crossover_single_point(&lhs, &rhs, 4), vec![1, 2, 3, 4, 10]);
    }

    #[test]
    fn it_keeps_both_parents_in_single_point_children() {
        let mut rng = StdRng::seed_from_u64(42);
        let parent_a = create_test_candidate(vec![0; 8]);
        let parent_b = create_test_candidate(vec![1; 8]);

        for _ in 0..100 {
            let child = Crossover::SinglePoint
                .apply(&mut rng, &parent_a, &parent_b)
                .unwrap();

            assert_eq!(child.len(), 8);
            // head from a, tail from b, exactly one transition
            assert_eq!(child.genome()[0], 0);
            assert_eq!(child.genome()[7], 1);
            let transitions = child.genome().windows(2).filter(|w| w[0] != w[1]).count();
            assert_eq!(transitions, 1);
        }
    }

    #[test]
    fn it_splits_two_gene_parents_in_the_middle() {
        let mut rng = StdRng::seed_from_u64(42);
        let parent_a = create_test_candidate(vec![3, 3]);
        let parent_b = create_test_candidate(vec![5, 5]);

        let child = Crossover::SinglePoint
            .apply(&mut rng, &parent_a, &parent_b)
            .unwrap();

        assert_eq!(child.genome(), &[3, 5]);
    }

    #[test]
    fn it_performs_uniform_crossover() {
        let mut rng = StdRng::seed_from_u64(42);
        let parent_a = create_test_candidate(vec![1, 2, 3, 4, 5]);
        let parent_b = create_test_candidate(vec![6, 7, 8, 9, 10]);

        let child = Crossover::uniform(0.5)
            .unwrap()
            .apply(&mut rng, &parent_a, &parent_b)
            .unwrap();

        assert_eq!(child.len(), 5);
        for (i, &gene) in child.genome().iter().enumerate() {
            assert!(gene == parent_a.genome()[i] || gene == parent_b.genome()[i]);
        }
    }

    #[test]
    fn it_handles_uniform_crossover_extreme_probabilities() {
        let mut rng = StdRng::seed_from_u64(42);
        let parent_a = create_test_candidate(vec![1, 2, 3]);
        let parent_b = create_test_candidate(vec![4, 5, 6]);

        let child = Crossover::Uniform { probability: 0.0 }
            .apply(&mut rng, &parent_a, &parent_b)
            .unwrap();
        assert_eq!(child, parent_b);

        let child = Crossover::Uniform { probability: 1.0 }
            .apply(&mut rng, &parent_a, &parent_b)
            .unwrap();
        assert_eq!(child, parent_a);
    }

    #[test]
    fn it_rejects_short_and_mismatched_parents() {
        let mut rng = StdRng::seed_from_u64(42);
        let single = create_test_candidate(vec![0]);

        assert_eq!(
            Crossover::SinglePoint.apply(&mut rng, &single, &single),
            Err(InvalidConfiguration::GenomeTooShort(1))
        );
        assert_eq!(
            Crossover::SinglePoint.apply(
                &mut rng,
                &create_test_candidate(vec![0, 1, 2]),
                &create_test_candidate(vec![0, 1])
            ),
            Err(InvalidConfiguration::GenomeLengthMismatch { lhs: 3, rhs: 2 })
        );
    }

    #[test]
    fn it_validates_uniform_crossover_probability() {
        assert!(Crossover::uniform(-0.1).is_err());
        assert!(Crossover::uniform(1.5).is_err());
        assert!(Crossover::uniform(0.0).is_ok());
        assert!(Crossover::uniform(1.0).is_ok());
    }
}
