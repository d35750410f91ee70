use crate::config::InvalidConfiguration;
use crate::models::{BreedingError, SelectionError, ValidationError};

/// Errors that can occur during an optimization run.
///
/// Everything except `Breeding` and `Selection` is raised before the first
/// generation is seeded.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    #[error("ValidationError: {0}")]
    Validation(#[from] ValidationError),
    #[error("InvalidConfiguration: {0}")]
    InvalidConfiguration(#[from] InvalidConfiguration),
    #[error("SelectionError: {0}")]
    Selection(#[from] SelectionError),
    #[error("BreedingError: {0}")]
    Breeding(#[from] BreedingError),
}
