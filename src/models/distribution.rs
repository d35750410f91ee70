use crate::config::InvalidConfiguration;
use crate::models::{Candidate, Gene};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// How the first generation is sampled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Distribution {
    /// Every gene uniform in `[0, num_pms)`.
    #[default]
    Random,
    /// Per VM, hosts are stratified across the population so that every PM is
    /// represented as evenly as the population size allows.
    LatinHypercube,
}

impl Distribution {
    #[instrument(level = "debug", skip(self, rng), fields(distribution = ?self))]
    pub fn distribute<R: Rng>(
        &self,
        rng: &mut R,
        population_size: usize,
        num_vms: usize,
        num_pms: usize,
    ) -> Result<Vec<Candidate>, InvalidConfiguration> {
        if num_pms == 0 {
            return Err(InvalidConfiguration::NoPhysicalMachines);
        }

        match self {
            Distribution::Random => (0..population_size)
                .map(|_| Candidate::random(&mut *rng, num_vms, num_pms))
                .collect(),
            Distribution::LatinHypercube => {
                Ok(latin_hypercube(rng, population_size, num_vms, num_pms))
            }
        }
    }
}

fn latin_hypercube<R: Rng>(
    rng: &mut R,
    n_samples: usize,
    num_vms: usize,
    num_pms: usize,
) -> Vec<Candidate> {
    let mut genomes: Vec<Vec<Gene>> = (0..n_samples)
        .map(|_| Vec::with_capacity(num_vms))
        .collect();

    for _ in 0..num_vms {
        // centre of each stratum, mapped onto a host index
        let mut strata: Vec<Gene> = (0..n_samples)
            .map(|i| {
                let sample = (i as f64 + 0.5) / n_samples as f64;
                ((sample * num_pms as f64) as Gene).min(num_pms - 1)
            })
            .collect();

        strata.shuffle(rng);

        for (genome, gene) in genomes.iter_mut().zip(strata) {
            genome.push(gene);
        }
    }

    genomes
        .into_iter()
        .map(|genome| Candidate { genome })
        .collect()
}
