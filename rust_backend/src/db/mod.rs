//! Database module for the dashboard's source tables.
//!
//! This module provides read access to the TRSM SQL Server database via the
//! Repository pattern, so the batch loader can run against SQL Server or an
//! in-memory fixture store.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Service Layer (services.rs) - batch table loader       │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  TableRepository trait (repository/)                    │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────┴────────────────┐
//!     │                                 │
//! ┌───▼───────────────────┐  ┌─────────▼───────────────┐
//! │ SqlServerRepository   │  │  LocalRepository        │
//! │ ConnectionProvider +  │  │  (in-memory)            │
//! │ tiberius              │  │                         │
//! └───────────────────────┘  └─────────────────────────┘
//! ```
//!
//! The module includes:
//! - `services`: batch fetch and health check (use these in your application!)
//! - `repository`: trait definition and error types
//! - `queries`: the nine fixed table queries
//! - `pool`: the cached connection provider
//! - `config` / `repo_config`: environment and TOML configuration
//! - `factory`: factory for creating repository instances
//!
//! # Recommended Usage
//!
//! ```no_run
//! use trsm_data::db::{services, DbConfig, RepositoryFactory};
//! use trsm_data::models::SystemClock;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DbConfig::from_env()?;
//!     let repo = RepositoryFactory::create_sqlserver(config);
//!
//!     let raw = services::fetch_tables_between(repo.as_ref(), Some("2023-01-01"), None, &SystemClock).await?;
//!     for (name, reason) in raw.failures() {
//!         eprintln!("{} unavailable: {}", name, reason);
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod factory;
pub mod pool;
pub mod queries;
pub mod repo_config;
pub mod repositories;
pub mod repository;
pub mod services;

// ==================== Service Layer ====================

pub use services::{
    fetch_tables, fetch_tables_between, fetch_tables_with_mode, health_check, FetchMode,
};

// ==================== Repository Pattern Exports ====================

pub use config::{DbAuthMethod, DbConfig, PoolSettings};
pub use pool::{ConnectionProvider, PoolConnector};
pub use queries::{catalog, query_for, TableQuery};
pub use repo_config::RepositoryConfig;

pub use factory::{RepositoryFactory, RepositoryType};
pub use repositories::LocalRepository;
#[cfg(feature = "sqlserver-repo")]
pub use repositories::SqlServerRepository;
pub use repository::{ErrorContext, RepositoryError, RepositoryResult, TableRepository};

#[cfg(feature = "sqlserver-repo")]
pub use repositories::sqlserver::{build_tiberius_config, DbPool, SqlServerConnector};
