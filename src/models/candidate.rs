use crate::config::InvalidConfiguration;
use crate::models::{Resources, ValidationError};
use rand::Rng;
use serde::Serialize;
use tracing::instrument;

/// Index of the physical machine a virtual machine is placed on.
pub type Gene = usize;

/// One placement: entry `i` is the PM hosting VM `i`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Candidate {
    pub(crate) genome: Vec<Gene>,
}

impl Candidate {
    /// Wraps a genome, checking it against the resource model.
    pub fn new(genome: Vec<Gene>, resources: &Resources) -> Result<Self, ValidationError> {
        if genome.len() != resources.num_vms() {
            return Err(ValidationError::LengthMismatch {
                expected: resources.num_vms(),
                actual: genome.len(),
            });
        }

        if let Some(&gene) = genome.iter().find(|&&gene| gene >= resources.num_pms()) {
            return Err(ValidationError::pm_out_of_range(gene, resources.num_pms()));
        }

        Ok(Self { genome })
    }

    /// Samples every gene independently and uniformly from `[0, num_pms)`.
    #[instrument(level = "debug", skip(rng))]
    pub fn random<R: Rng>(
        rng: &mut R,
        num_vms: usize,
        num_pms: usize,
    ) -> Result<Self, InvalidConfiguration> {
        if num_pms == 0 {
            return Err(InvalidConfiguration::NoPhysicalMachines);
        }

        let genome = (0..num_vms).map(|_| rng.random_range(0..num_pms)).collect();

        Ok(Self { genome })
    }

    pub fn genome(&self) -> &[Gene] {
        &self.genome
    }

    pub fn len(&self) -> usize {
        self.genome.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genome.is_empty()
    }

    pub fn into_genome(self) -> Vec<Gene> {
        self.genome
    }
}
