mod errors;
mod models;
mod service;

pub use errors::Error;
pub use models::{Conclusion, GenerationReport, Outcome, Terminated, Unbounded};
pub use service::Service;
