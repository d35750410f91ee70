use super::Error;
use crate::models::{Candidate, Evaluation, Population, Resources, evaluate};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

/// Cancellation signal, polled between generations only.
pub trait Terminated: Sync {
    fn is_terminated(&self) -> bool;
}

impl Terminated for AtomicBool {
    fn is_terminated(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

/// Never cancels.
pub struct Unbounded;

impl Terminated for Unbounded {
    fn is_terminated(&self) -> bool {
        false
    }
}

/// The reason why a run was concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Conclusion {
    /// The generation budget was spent.
    Completed,
    /// A cancellation signal was observed at a generation boundary.
    Terminated,
}

/// Progress of one generation, taken after ranking and before replacement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationReport {
    pub generation: u32,
    pub best_fitness: f64,
    pub mean_fitness: f64,
    /// Overloaded hosts of the rank-0 candidate.
    pub overloaded: usize,
    /// Hosts in use by the rank-0 candidate.
    pub used: usize,
}

impl GenerationReport {
    pub(crate) fn new(
        generation: u32,
        ranked: &Population,
        resources: &Resources,
    ) -> Result<Self, Error> {
        let (best, best_fitness) = ranked.best()?;
        let evaluation = evaluate(best, resources)?;

        Ok(Self {
            generation,
            best_fitness,
            mean_fitness: ranked.mean_fitness().unwrap_or(best_fitness),
            overloaded: evaluation.overloaded,
            used: evaluation.used,
        })
    }
}

/// Result of a run, handed to presentation.
#[derive(Debug, Clone, Serialize)]
pub struct Outcome {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub concluded_at: DateTime<Utc>,
    pub concluded_with: Conclusion,
    pub best: Candidate,
    pub evaluation: Evaluation,
    pub history: Vec<GenerationReport>,
}

impl Outcome {
    pub fn best_fitness(&self) -> f64 {
        self.evaluation.fitness
    }

    /// Rank-0 fitness of every generation that was bred from.
    pub fn best_fitness_per_generation(&self) -> Vec<f64> {
        self.history.iter().map(|report| report.best_fitness).collect()
    }
}
