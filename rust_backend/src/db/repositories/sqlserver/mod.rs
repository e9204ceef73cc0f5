//! SQL Server implementation module.
//!
//! This module contains the SQL Server specific pieces: the tiberius
//! connector behind the pool, row decoding, and the repository itself.

pub mod pool;
pub mod repository;
pub mod rows;

// Re-export the main repository implementation
pub use repository::SqlServerRepository;

pub use pool::{build_tiberius_config, DbPool, SqlServerConnector};
