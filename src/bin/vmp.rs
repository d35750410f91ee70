use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use vmp_ga::config::Configuration;
use vmp_ga::models::{MutationRate, Resources};
use vmp_ga::services::optimization::{Outcome, Service};
use vmp_ga::{loader, report};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum Format {
    #[default]
    Text,
    Json,
}

/// Places VMs onto as few PMs as possible without overloading them.
#[derive(Debug, Parser)]
#[command(name = "vmp", version, about)]
struct Cli {
    /// Problem description: `num_vms num_pms` followed by VM demands and PM capacities
    #[arg(default_value = "vmp-data.txt")]
    input: PathBuf,

    /// JSON configuration, overridden by any flag below
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long)]
    generations: Option<u32>,

    #[arg(short, long)]
    population_size: Option<usize>,

    #[arg(short, long)]
    elite_count: Option<usize>,

    #[arg(short, long)]
    mating_pool_size: Option<usize>,

    /// Constant per-gene mutation probability
    #[arg(long)]
    mutation_rate: Option<f64>,

    #[arg(short, long)]
    seed: Option<u64>,

    #[arg(short, long, value_enum, default_value_t)]
    format: Format,
}

impl Cli {
    fn configuration(&self) -> anyhow::Result<Configuration> {
        let mut config = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                serde_json::from_str::<Configuration>(&text)
                    .with_context(|| format!("parsing {}", path.display()))?
            }
            None => Configuration::default(),
        };

        if let Some(generations) = self.generations {
            config = config.with_generations(generations);
        }
        if let Some(population_size) = self.population_size {
            config = config.with_population_size(population_size);
        }
        if let Some(elite_count) = self.elite_count {
            config = config.with_elite_count(elite_count);
        }
        if let Some(mating_pool_size) = self.mating_pool_size {
            config = config.with_mating_pool_size(mating_pool_size);
        }
        if let Some(rate) = self.mutation_rate {
            config = config.with_mutation_rate(MutationRate::constant(rate)?);
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }

        Ok(config)
    }
}

fn print_text(outcome: &Outcome, resources: &Resources) -> anyhow::Result<()> {
    let verdict = if outcome.evaluation.is_feasible() {
        "feasible"
    } else {
        "infeasible"
    };

    print!("{}", report::progress(&outcome.history));
    println!();
    println!(
        "Best placement (fitness {:.4}, {} hosts used, {} overloaded, {verdict}):",
        outcome.best_fitness(),
        outcome.evaluation.used,
        outcome.evaluation.overloaded
    );
    print!("{}", report::placement_listing(&outcome.best));
    println!();
    print!("{}", report::host_summary(&outcome.best, resources)?);
    println!();
    print!("{}", report::placement_chart(&outcome.best, resources.num_pms()));

    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.configuration()?;
    let resources = loader::load(&cli.input)
        .with_context(|| format!("loading {}", cli.input.display()))?;

    let outcome = Service::new(config).run(&resources)?;

    match cli.format {
        Format::Text => print_text(&outcome, &resources)?,
        Format::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
    }

    Ok(())
}
