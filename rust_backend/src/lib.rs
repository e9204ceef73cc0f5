//! Date-ranged table loader for the TRSM sales dashboard.
//!
//! Pulls the nine source tables (orders, order lines, customers, products,
//! regions, shippers, shipping methods, suppliers, packs) from SQL Server for a
//! date range. Each table is fetched independently; one failing query does
//! not take the others down.
//!
//! ```no_run
//! use trsm_data::db::{services, RepositoryFactory};
//! use trsm_data::models::SystemClock;
//!
//! # async fn run() -> anyhow::Result<()> {
//! trsm_data::logging::init_logging()?;
//! let repo = RepositoryFactory::from_env()?;
//! let raw = services::fetch_tables_between(repo.as_ref(), None, None, &SystemClock).await?;
//! let tables = raw.into_tables();
//! # Ok(())
//! # }
//! ```

pub mod db;
pub mod logging;
pub mod models;

pub use db::{fetch_tables, fetch_tables_between, RepositoryError, RepositoryResult, TableRepository};
pub use models::{DateRange, RawTables, Table, TableFetch, TableName, Value};
