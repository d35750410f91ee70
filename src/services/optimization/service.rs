use super::Error;
use super::models::{Conclusion, GenerationReport, Outcome, Terminated, Unbounded};
use crate::config::Configuration;
use crate::models::{Breeder, Population, Resources, evaluate};
use chrono::Utc;
use rand::{SeedableRng, rngs::StdRng};
use tracing::instrument;
use uuid::Uuid;

/// Drives the generational search over a resource model.
///
/// ```rust
/// use vmp_ga::config::Configuration;
/// use vmp_ga::models::{Instance, Resources};
/// use vmp_ga::services::optimization::Service;
///
/// let resources = Resources::try_from(Instance {
///     num_vms: 3,
///     num_pms: 2,
///     vm_records: vec![(2, 2), (1, 3), (2, 1)],
///     pm_records: vec![(4, 4), (4, 4)],
/// })?;
///
/// let outcome = Service::new(Configuration::default().with_generations(20).with_seed(1))
///     .run(&resources)?;
///
/// assert_eq!(outcome.best.len(), 3);
/// assert_eq!(outcome.history.len(), 20);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Service {
    config: Configuration,
}

impl Service {
    pub fn new(config: Configuration) -> Self {
        Self { config }
    }

    /// Runs the full generation budget.
    pub fn run(&self, resources: &Resources) -> Result<Outcome, Error> {
        self.run_until(resources, &Unbounded)
    }

    /// Runs until the generation budget is spent or `terminated` reports true at a
    /// generation boundary. The configuration is validated before anything is seeded.
    #[instrument(level = "info", skip(self, resources, terminated), fields(run_id = tracing::field::Empty, num_vms = resources.num_vms(), num_pms = resources.num_pms(), generations = self.config.generations))]
    pub fn run_until(
        &self,
        resources: &Resources,
        terminated: &dyn Terminated,
    ) -> Result<Outcome, Error> {
        let config = &self.config;
        config.validate(resources.num_vms(), resources.num_pms())?;

        let run_id = Uuid::now_v7();
        let started_at = Utc::now();
        tracing::Span::current().record("run_id", tracing::field::display(run_id));
        tracing::info!("Optimization started");

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let seeded = config.distribution.distribute(
            &mut rng,
            config.population_size,
            resources.num_vms(),
            resources.num_pms(),
        )?;
        let mut population = Population::new(seeded);
        let breeder = Breeder::new(config, resources.num_pms());

        let mut history = Vec::with_capacity(config.generations as usize);
        let mut concluded_with = Conclusion::Completed;

        for generation in 0..config.generations {
            if terminated.is_terminated() {
                tracing::warn!(generation, "Optimization terminated before the generation budget was spent");
                concluded_with = Conclusion::Terminated;
                break;
            }

            population.rank(resources)?;

            let report = GenerationReport::new(generation, &population, resources)?;
            tracing::info!(
                generation,
                best_fitness = report.best_fitness,
                overloaded = report.overloaded,
                used = report.used,
                "Generation ranked"
            );
            history.push(report);

            let progress = f64::from(generation) / f64::from(config.generations);
            population =
                breeder.breed_generation(&mut rng, &population, config.mutation_rate.get(progress))?;
        }

        population.rank(resources)?;
        let (best, _) = population.best()?;
        let best = best.clone();
        let evaluation = evaluate(&best, resources)?;

        tracing::info!(
            best_fitness = evaluation.fitness,
            overloaded = evaluation.overloaded,
            used = evaluation.used,
            conclusion = ?concluded_with,
            "Optimization concluded"
        );

        Ok(Outcome {
            run_id,
            started_at,
            concluded_at: Utc::now(),
            concluded_with,
            best,
            evaluation,
            history,
        })
    }
}
