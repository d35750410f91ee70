use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use vmp_ga::config::Configuration;
use vmp_ga::loader;
use vmp_ga::models::{Distribution, evaluate};
use vmp_ga::report;
use vmp_ga::services::optimization::{Conclusion, Service, Terminated};

fn data_file(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data").join(name)
}

#[test]
fn test_load_optimize_and_report() -> anyhow::Result<()> {
    let resources = loader::load(data_file("vmp-data.txt"))?;
    assert_eq!(resources.num_vms(), 10);
    assert_eq!(resources.num_pms(), 6);

    let outcome = Service::new(Configuration::default().with_seed(42)).run(&resources)?;

    assert_eq!(outcome.concluded_with, Conclusion::Completed);
    assert_eq!(outcome.history.len(), 100);
    assert_eq!(evaluate(&outcome.best, &resources)?, outcome.evaluation);
    assert!(outcome.best_fitness() > 0.0 && outcome.best_fitness() <= 1.0);

    let listing = report::placement_listing(&outcome.best);
    assert_eq!(listing.lines().count(), 10);
    assert!(listing.starts_with("VM 0 -> PM "));

    let summary = report::host_summary(&outcome.best, &resources)?;
    assert_eq!(summary.lines().count(), outcome.evaluation.used);
    assert_eq!(
        summary.lines().filter(|line| line.ends_with("OVERLOADED")).count(),
        outcome.evaluation.overloaded
    );

    let chart = report::placement_chart(&outcome.best, resources.num_pms());
    assert_eq!(chart.lines().count(), 6);
    assert_eq!(chart.matches("VM").count(), 10);

    Ok(())
}

#[test]
fn test_configuration_file_drives_the_run() -> anyhow::Result<()> {
    let resources = loader::load(data_file("vmp-data.txt"))?;
    let text = std::fs::read_to_string(data_file("config.json"))?;
    let config: Configuration = serde_json::from_str(&text)?;

    assert_eq!(config.population_size, 40);
    assert_eq!(config.distribution, Distribution::LatinHypercube);

    let first = Service::new(config.clone()).run(&resources)?;
    let second = Service::new(config).run(&resources)?;

    assert_eq!(first.history.len(), 150);
    assert_eq!(first.best, second.best);
    assert_eq!(
        first.best_fitness_per_generation(),
        second.best_fitness_per_generation()
    );

    Ok(())
}

#[test]
fn test_outcome_serializes_to_json() -> anyhow::Result<()> {
    let resources = loader::load(data_file("vmp-data.txt"))?;
    let outcome = Service::new(Configuration::default().with_generations(5).with_seed(1))
        .run(&resources)?;

    let value = serde_json::to_value(&outcome)?;

    assert_eq!(value["concluded_with"], "completed");
    assert_eq!(value["history"].as_array().map(Vec::len), Some(5));
    assert_eq!(value["best"]["genome"].as_array().map(Vec::len), Some(10));
    assert!(value["run_id"].is_string());

    Ok(())
}

struct AfterGenerations {
    remaining: std::sync::atomic::AtomicU32,
    terminated: AtomicBool,
}

impl Terminated for AfterGenerations {
    fn is_terminated(&self) -> bool {
        if self.remaining.load(Ordering::Relaxed) == 0 {
            self.terminated.store(true, Ordering::Relaxed);
        } else {
            self.remaining.fetch_sub(1, Ordering::Relaxed);
        }
        self.terminated.load(Ordering::Relaxed)
    }
}

#[test]
fn test_termination_keeps_completed_generations() -> anyhow::Result<()> {
    let resources = loader::load(data_file("vmp-data.txt"))?;
    let signal = AfterGenerations {
        remaining: std::sync::atomic::AtomicU32::new(7),
        terminated: AtomicBool::new(false),
    };

    let outcome = Service::new(Configuration::default().with_seed(3))
        .run_until(&resources, &signal)?;

    assert_eq!(outcome.concluded_with, Conclusion::Terminated);
    assert_eq!(outcome.history.len(), 7);
    assert!(outcome.best_fitness() >= outcome.history[6].best_fitness);

    Ok(())
}
