//! Database connection pool management.
//!
//! [`ConnectionProvider`] owns one lazily built [`bb8::Pool`]. The first call
//! to [`ConnectionProvider::get_connection`] builds the pool and checks a
//! connection out to prove the server is reachable; later calls hand back the
//! same pool. Where the connections come from is up to the [`PoolConnector`].

use async_trait::async_trait;
use bb8::{ManageConnection, Pool};
use log::{debug, info};
use std::time::Duration;
use tokio::sync::OnceCell;

use super::config::PoolSettings;
use super::repository::{ErrorContext, RepositoryError, RepositoryResult};

/// Produces the bb8 connection manager for a pool.
#[async_trait]
pub trait PoolConnector: Send + Sync {
    type Manager: ManageConnection;

    /// Build the manager. May perform I/O, e.g. fetch an access token.
    async fn manager(&self) -> RepositoryResult<Self::Manager>;

    /// Human-readable target for logs. Must not contain secrets.
    fn describe(&self) -> String;
}

/// Lazily built, cached connection pool.
pub struct ConnectionProvider<C: PoolConnector> {
    connector: C,
    settings: PoolSettings,
    pool: OnceCell<Pool<C::Manager>>,
}

impl<C: PoolConnector> ConnectionProvider<C> {
    pub fn new(connector: C, settings: PoolSettings) -> Self {
        Self {
            connector,
            settings,
            pool: OnceCell::new(),
        }
    }

    pub fn settings(&self) -> &PoolSettings {
        &self.settings
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Whether the pool has been built.
    pub fn is_initialized(&self) -> bool {
        self.pool.initialized()
    }

    /// Get the shared pool, building it on first use.
    ///
    /// Concurrent first callers wait for a single build. A failed build is
    /// not cached; the next call tries again.
    ///
    /// # Errors
    /// Common errors:
    /// - `TimeoutError`: firewall blocking the connection or server unreachable
    /// - `ConnectionError` with "Login failed": invalid credentials
    /// - `ConnectionError` with "Cannot open server": wrong server name
    pub async fn get_connection(&self) -> RepositoryResult<&Pool<C::Manager>> {
        self.pool.get_or_try_init(|| self.build_pool()).await
    }

    async fn build_pool(&self) -> RepositoryResult<Pool<C::Manager>> {
        let max_size = self.settings.validate()?;
        info!("Opening connection pool to {}", self.connector.describe());
        let manager = self.connector.manager().await?;

        let pool = Pool::builder()
            .max_size(max_size)
            .test_on_check_out(self.settings.pre_ping)
            .connection_timeout(Duration::from_secs(self.settings.connect_timeout_secs))
            .build(manager)
            .await
            .map_err(|e| {
                let err_msg = format!("Failed to create connection pool: {:?}", e);
                RepositoryError::connection_with_context(
                    err_msg,
                    ErrorContext::new("get_connection").with_details(self.connector.describe()),
                )
            })?;

        // Prove the server is reachable before handing the pool out.
        {
            let _conn = pool.get().await.map_err(|e| {
                RepositoryError::from(e)
                    .with_operation("get_connection")
                    .with_entity(self.connector.describe())
            })?;
        }

        let state = pool.state();
        debug!(
            "Connection pool ready ({} open, {} idle, max {})",
            state.connections,
            state.idle_connections,
            max_size
        );
        Ok(pool)
    }
}
