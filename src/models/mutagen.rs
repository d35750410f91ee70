use crate::config::{DEFAULT_MUTATION_RATE, InvalidConfiguration};
use crate::models::Candidate;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::instrument;

fn decay_linear(value: f64, progress: f64, multiplier: f64) -> f64 {
    value * (1.0 - progress * multiplier).max(0.0)
}

fn decay_exponential(value: f64, progress: f64, multiplier: f64, exponent: i32) -> f64 {
    value * (1.0 - progress * multiplier).max(0.0).powi(exponent)
}

/// How the mutation rate changes as a run progresses from `0.0` to `1.0`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum Decay {
    #[default]
    Constant,
    Linear {
        multiplier: f64,
    },
    Exponential {
        multiplier: f64,
        exponent: i32,
    },
}

impl Decay {
    fn apply(&self, value: f64, progress: f64) -> f64 {
        match self {
            Decay::Constant => value,
            Decay::Linear { multiplier } => decay_linear(value, progress, *multiplier),
            Decay::Exponential {
                multiplier,
                exponent,
            } => decay_exponential(value, progress, *multiplier, *exponent),
        }
    }
}

/// Per-gene probability of resampling a placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationRate {
    value: f64,
    decay: Decay,
}

impl Default for MutationRate {
    fn default() -> Self {
        Self {
            value: DEFAULT_MUTATION_RATE,
            decay: Decay::Constant,
        }
    }
}

impl MutationRate {
    pub fn new(value: f64, decay: Decay) -> Result<Self, InvalidConfiguration> {
        let value = InvalidConfiguration::probability("mutation_rate", value)?;

        Ok(Self { value, decay })
    }

    pub fn constant(value: f64) -> Result<Self, InvalidConfiguration> {
        Self::new(value, Decay::Constant)
    }

    pub(crate) fn validate(&self) -> Result<(), InvalidConfiguration> {
        InvalidConfiguration::probability("mutation_rate", self.value).map(|_| ())
    }

    /// Effective rate at `progress`, kept inside `[0, 1]` whatever the decay parameters.
    pub fn get(&self, progress: f64) -> f64 {
        self.decay.apply(self.value, progress).clamp(0.0, 1.0)
    }
}

/// Resamples each gene with probability `rate` from `[0, num_pms)`.
///
/// Takes the candidate by value; callers that keep the original clone it first.
#[instrument(level = "debug", skip(rng, candidate), fields(genome_length = candidate.len()))]
pub fn mutate<R: Rng>(
    rng: &mut R,
    mut candidate: Candidate,
    num_pms: usize,
    rate: f64,
) -> Result<Candidate, InvalidConfiguration> {
    if num_pms == 0 {
        return Err(InvalidConfiguration::NoPhysicalMachines);
    }
    let rate = InvalidConfiguration::probability("mutation_rate", rate)?;

    for gene in candidate.genome.iter_mut() {
        if rng.random_bool(rate) {
            *gene = rng.random_range(0..num_pms);
        }
    }

    Ok(candidate)
}
