//! Repository implementations module.
//!
//! This module contains the implementations of the `TableRepository` trait:
//! - `sqlserver`: SQL Server implementation for production use
//! - `local`: In-memory implementation for unit testing and local development

pub mod local;
#[cfg(feature = "sqlserver-repo")]
pub mod sqlserver;

pub use local::LocalRepository;
#[cfg(feature = "sqlserver-repo")]
pub use sqlserver::SqlServerRepository;
