//! High-level database service layer.
//!
//! Repository-agnostic operations: the batch table loader and the health
//! check. They work with any [`TableRepository`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Application Layer (dashboard data preparation)         │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service Layer (services.rs)                            │
//! │  - Date range resolution                                │
//! │  - Per-table failure isolation                          │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  TableRepository trait (repository/)                    │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────┴────────────────┐
//!     │                                 │
//! ┌───▼───────────────────┐  ┌─────────▼───────────────┐
//! │ SQL Server Repository │  │ Local Repository        │
//! │ (tiberius + bb8)      │  │ (in-memory)             │
//! └───────────────────────┘  └─────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use trsm_data::db::{services, repositories::LocalRepository};
//! use trsm_data::models::{SystemClock, TableName};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = LocalRepository::new();
//!
//!     let raw = services::fetch_tables_between(
//!         &repo,
//!         Some("2023-01-01"),
//!         Some("2023-01-31"),
//!         &SystemClock,
//!     )
//!     .await?;
//!     println!("{} orders", raw.row_count(TableName::Orders));
//!
//!     Ok(())
//! }
//! ```

use futures::future::join_all;
use log::{debug, error, info, warn};

use super::queries::{catalog, TableQuery};
use super::repository::{RepositoryResult, TableRepository};
use crate::models::{Clock, DateRange, RawTables, TableFetch, TableName};

/// How the nine queries of a batch are scheduled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FetchMode {
    /// One query after another.
    #[default]
    Sequential,
    /// All queries at once, each on its own pooled connection.
    Concurrent,
}

// ==================== Health & Connection ====================

/// Check if the database connection is healthy.
///
/// This is a simple pass-through to the repository's health check.
pub async fn health_check<R: TableRepository + ?Sized>(repo: &R) -> RepositoryResult<bool> {
    repo.health_check().await
}

// ==================== Batch Fetch ====================

/// Load all nine tables for `range`, one query at a time.
///
/// # Returns
/// * `Ok(RawTables)` - Always all nine keys; a failed query shows up as
///   [`TableFetch::Failed`] for its key only
/// * `Err(RepositoryError)` - Only when the connection itself cannot be
///   established, before any query runs
pub async fn fetch_tables<R: TableRepository + ?Sized>(
    repo: &R,
    range: DateRange,
) -> RepositoryResult<RawTables> {
    fetch_tables_with_mode(repo, range, FetchMode::Sequential).await
}

/// String-date entry point: `start` defaults to `2020-01-01`, `end` to
/// `clock.today()`. Malformed or inverted dates fail before any I/O.
pub async fn fetch_tables_between<R: TableRepository + ?Sized>(
    repo: &R,
    start: Option<&str>,
    end: Option<&str>,
    clock: &dyn Clock,
) -> RepositoryResult<RawTables> {
    let range = DateRange::parse(start, end, clock)?;
    fetch_tables(repo, range).await
}

/// [`fetch_tables`] with an explicit [`FetchMode`]. Both modes produce the
/// same mapping for the same data.
pub async fn fetch_tables_with_mode<R: TableRepository + ?Sized>(
    repo: &R,
    range: DateRange,
    mode: FetchMode,
) -> RepositoryResult<RawTables> {
    // Connection failures are fatal for the whole batch.
    repo.connect().await?;
    info!("Fetching {} tables for {} ({:?})", catalog().len(), range, mode);

    let fetched: Vec<(TableName, TableFetch)> = match mode {
        FetchMode::Sequential => {
            let mut fetched = Vec::with_capacity(catalog().len());
            for query in catalog() {
                fetched.push(fetch_one(repo, query, &range).await);
            }
            fetched
        }
        FetchMode::Concurrent => {
            join_all(catalog().iter().map(|query| fetch_one(repo, query, &range))).await
        }
    };

    let raw = RawTables::new(range, fetched);
    let failed = raw.failures().count();
    if failed > 0 {
        warn!(
            "Batch for {} finished with {} of {} tables failed",
            range,
            failed,
            raw.len()
        );
    }
    Ok(raw)
}

async fn fetch_one<R: TableRepository + ?Sized>(
    repo: &R,
    query: &TableQuery,
    range: &DateRange,
) -> (TableName, TableFetch) {
    match repo.fetch_table(query, range).await {
        Ok(table) => {
            debug!("Fetched '{}': {} rows", query.name, table.len());
            (query.name, TableFetch::Loaded { table })
        }
        Err(e) => {
            error!("Error fetching '{}': {}", query.name, e);
            (
                query.name,
                TableFetch::Failed {
                    reason: e.to_string(),
                },
            )
        }
    }
}
