mod breeder;
mod candidate;
mod crossover;
mod distribution;
mod fitness;
mod mutagen;
mod population;
mod resources;

pub use breeder::BreedingError;
pub use candidate::{Candidate, Gene};
pub use crossover::Crossover;
pub use distribution::Distribution;
pub use fitness::{Evaluation, Usage, evaluate, fitness};
pub use mutagen::{Decay, MutationRate, mutate};
pub use population::{Population, SelectionError};
pub use resources::{Instance, Pm, Resources, ValidationError, Vm};

pub(crate) use breeder::Breeder;
