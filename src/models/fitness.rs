//! Placement scoring.
//!
//! A placement is scored by how many physical machines it overloads and how many
//! it powers on at all:
//!
//! ```text
//! fitness = 1 / (1 + overloaded + used)
//! ```
//!
//! The score lies in `(0, 1]`. The value `1` is reachable only when nothing is
//! placed; any non-empty workload occupies at least one PM, so its best possible
//! score is `1 / (1 + used_min)` where `used_min` is the smallest number of PMs
//! that can host the workload without overload. Overload and usage weigh the same,
//! so a consolidated placement with one overloaded host can tie or beat a feasible
//! placement that spreads over more hosts.
//!
//! Per-host sums are kept in `u128`, so no combination of `u64` demands can wrap
//! below a capacity.

use crate::models::{Candidate, Resources, ValidationError};
use serde::Serialize;
use tracing::instrument;

/// Accumulated demand on one physical machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Usage {
    pub cpu: u128,
    pub ram: u128,
    pub vms: usize,
}

impl Usage {
    pub fn is_used(&self) -> bool {
        self.vms > 0
    }

    pub fn exceeds(&self, cpu_capacity: u64, ram_capacity: u64) -> bool {
        self.cpu > u128::from(cpu_capacity) || self.ram > u128::from(ram_capacity)
    }
}

/// Full breakdown of a placement score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    /// Indexed by PM.
    pub usage: Vec<Usage>,
    pub overloaded: usize,
    pub used: usize,
    pub fitness: f64,
}

impl Evaluation {
    pub fn is_feasible(&self) -> bool {
        self.overloaded == 0
    }
}

/// Scores a candidate and keeps the per-host accumulators used to get there.
///
/// Fails when the candidate was built for a different resource model: its length
/// must equal `num_vms` and every gene must index an existing PM.
#[instrument(level = "debug", skip(candidate, resources), fields(num_vms = candidate.len(), num_pms = resources.num_pms()))]
pub fn evaluate(
    candidate: &Candidate,
    resources: &Resources,
) -> Result<Evaluation, ValidationError> {
    if candidate.len() != resources.num_vms() {
        return Err(ValidationError::LengthMismatch {
            expected: resources.num_vms(),
            actual: candidate.len(),
        });
    }

    let num_pms = resources.num_pms();
    let mut usage = vec![Usage::default(); num_pms];

    for (vm_index, &pm_index) in candidate.genome().iter().enumerate() {
        let (cpu, ram) = resources.demand(vm_index)?;
        let slot = usage
            .get_mut(pm_index)
            .ok_or_else(|| ValidationError::pm_out_of_range(pm_index, num_pms))?;
        slot.cpu += u128::from(cpu);
        slot.ram += u128::from(ram);
        slot.vms += 1;
    }

    let overloaded = usage
        .iter()
        .zip(resources.pms())
        .filter(|(slot, pm)| slot.exceeds(pm.cpu_capacity, pm.ram_capacity))
        .count();
    let used = usage.iter().filter(|slot| slot.is_used()).count();

    Ok(Evaluation {
        usage,
        overloaded,
        used,
        fitness: score(overloaded, used),
    })
}

/// Scalar projection of [`evaluate`].
pub fn fitness(candidate: &Candidate, resources: &Resources) -> Result<f64, ValidationError> {
    Ok(evaluate(candidate, resources)?.fitness)
}

fn score(overloaded: usize, used: usize) -> f64 {
    1.0 / (1 + overloaded + used) as f64
}
