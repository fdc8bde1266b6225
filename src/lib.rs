//! List the image tags of an ECR repository and log a container runtime in
//! to the registry.

pub mod app;
pub mod config;
pub mod ecr;
pub mod error;
pub mod logging;
pub mod login;
pub mod report;

pub use error::{EcrError, Result};
