//! Repository factory for dependency injection.
//!
//! This module provides utilities for creating and configuring repository instances
//! based on runtime configuration.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use super::config::DbConfig;
use super::repo_config::RepositoryConfig;
use super::repositories::LocalRepository;
#[cfg(feature = "sqlserver-repo")]
use super::repositories::SqlServerRepository;
use super::repository::{RepositoryError, RepositoryResult, TableRepository};

/// Repository type configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryType {
    /// SQL Server over tiberius
    SqlServer,
    /// In-memory local repository
    Local,
}

impl FromStr for RepositoryType {
    type Err = String;

    /// Parse repository type from string.
    ///
    /// # Arguments
    /// * `s` - String representation ("sqlserver", "mssql", "azure", "local")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlserver" | "mssql" | "azure" => Ok(Self::SqlServer),
            "local" => Ok(Self::Local),
            _ => Err(format!("Unknown repository type: {}", s)),
        }
    }
}

impl RepositoryType {
    /// Get repository type from environment variable.
    ///
    /// Reads `REPOSITORY_TYPE`. Without it, SQL Server is chosen when
    /// `DB_SERVER` is set, otherwise Local.
    pub fn from_env() -> RepositoryResult<Self> {
        if let Ok(val) = std::env::var("REPOSITORY_TYPE") {
            return val.parse().map_err(RepositoryError::configuration);
        }

        if std::env::var("DB_SERVER").is_ok() {
            Ok(Self::SqlServer)
        } else {
            Ok(Self::Local)
        }
    }
}

/// Repository factory for creating repository instances.
///
/// # Example
/// ```ignore
/// use trsm_data::db::{DbConfig, RepositoryFactory};
///
/// let config = DbConfig::from_env()?;
/// let repo = RepositoryFactory::create_sqlserver(config);
/// ```
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create a repository instance based on type.
    ///
    /// # Arguments
    /// * `repo_type` - Type of repository to create
    /// * `db_config` - Database configuration (required for SQL Server)
    pub fn create(
        repo_type: RepositoryType,
        db_config: Option<DbConfig>,
    ) -> RepositoryResult<Arc<dyn TableRepository>> {
        match repo_type {
            RepositoryType::SqlServer => {
                let config = db_config.ok_or_else(|| {
                    RepositoryError::configuration("SQL Server repository requires DbConfig")
                })?;
                Self::sqlserver_or_disabled(config)
            }
            RepositoryType::Local => Ok(Self::create_local()),
        }
    }

    /// Create a SQL Server repository. No connection is opened yet.
    #[cfg(feature = "sqlserver-repo")]
    pub fn create_sqlserver(config: DbConfig) -> Arc<SqlServerRepository> {
        Arc::new(SqlServerRepository::new(config))
    }

    #[cfg(feature = "sqlserver-repo")]
    fn sqlserver_or_disabled(config: DbConfig) -> RepositoryResult<Arc<dyn TableRepository>> {
        Ok(Self::create_sqlserver(config) as Arc<dyn TableRepository>)
    }

    #[cfg(not(feature = "sqlserver-repo"))]
    fn sqlserver_or_disabled(_config: DbConfig) -> RepositoryResult<Arc<dyn TableRepository>> {
        Err(RepositoryError::configuration(
            "SQL Server repository feature not enabled",
        ))
    }

    /// Create an in-memory local repository.
    pub fn create_local() -> Arc<dyn TableRepository> {
        Arc::new(LocalRepository::new())
    }

    /// Create repository from environment configuration.
    ///
    /// See [`RepositoryType::from_env`] and [`DbConfig::from_env`].
    pub fn from_env() -> RepositoryResult<Arc<dyn TableRepository>> {
        match RepositoryType::from_env()? {
            RepositoryType::SqlServer => Self::create(RepositoryType::SqlServer, Some(DbConfig::from_env()?)),
            RepositoryType::Local => Ok(Self::create_local()),
        }
    }

    /// Create repository from a TOML configuration file.
    ///
    /// # Arguments
    /// * `config_path` - Path to the repository.toml configuration file
    pub fn from_config_file<P: AsRef<Path>>(
        config_path: P,
    ) -> RepositoryResult<Arc<dyn TableRepository>> {
        let config = RepositoryConfig::from_file(config_path)?;
        Self::from_repository_config(&config)
    }

    /// Create repository from the default configuration file location.
    pub fn from_default_config() -> RepositoryResult<Arc<dyn TableRepository>> {
        let config = RepositoryConfig::from_default_location()?;
        Self::from_repository_config(&config)
    }

    fn from_repository_config(
        config: &RepositoryConfig,
    ) -> RepositoryResult<Arc<dyn TableRepository>> {
        let repo_type = config.repository_type().map_err(|e| {
            RepositoryError::configuration(format!("Invalid repository type: {}", e))
        })?;
        Self::create(repo_type, config.to_db_config()?)
    }
}
