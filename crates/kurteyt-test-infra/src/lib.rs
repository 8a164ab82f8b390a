//! Disposable containers for integration tests.

pub mod dynamodb;
mod error;
pub mod mysql;

pub use error::{Result, TestInfraError};
