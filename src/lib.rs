//! Virtual machine placement by genetic search.
//!
//! A placement assigns every VM to one PM. Placements are scored by
//! [`models::fitness`], which penalises overloaded hosts and powered-on hosts
//! alike, and improved by the generational loop in
//! [`services::optimization::Service`].

pub mod config;
pub mod loader;
pub mod models;
pub mod report;
pub mod services;

pub use services::optimization::Service;
