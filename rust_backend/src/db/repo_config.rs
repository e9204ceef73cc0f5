//! Repository configuration file support.
//!
//! This module provides utilities for reading repository configuration from
//! TOML configuration files.
//!
//! ```toml
//! [repository]
//! type = "sqlserver"
//!
//! [sqlserver]
//! server = "sql.internal"
//! database = "TRSM"
//! username = "reporter"
//! password_env = "DB_PASS"
//!
//! [pool]
//! pool_size = 5
//! max_overflow = 10
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::config::{DbAuthMethod, DbConfig, PoolSettings};
use super::factory::RepositoryType;
use super::repository::RepositoryError;

/// Repository configuration from file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    pub repository: RepositorySettings,
    #[serde(default)]
    pub sqlserver: SqlServerSettings,
    #[serde(default)]
    pub pool: PoolFileSettings,
}

/// Repository type settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySettings {
    #[serde(rename = "type")]
    pub repo_type: String,
}

/// SQL Server connection settings.
///
/// The password is read from the environment variable named by
/// `password_env` so it never has to live in the file; `password` is
/// accepted for local setups.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct SqlServerSettings {
    #[serde(default)]
    pub server: String,
    #[serde(default)]
    pub database: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub password_env: Option<String>,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_true")]
    pub encrypt: bool,
    #[serde(default = "default_true")]
    pub trust_cert: bool,
}

impl fmt::Debug for SqlServerSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlServerSettings")
            .field("server", &self.server)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("password_env", &self.password_env)
            .field("port", &self.port)
            .field("encrypt", &self.encrypt)
            .field("trust_cert", &self.trust_cert)
            .finish()
    }
}

/// Pool settings; every field falls back to the fixed defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolFileSettings {
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_max_overflow")]
    pub max_overflow: u32,
    #[serde(default = "default_true")]
    pub pre_ping: bool,
    #[serde(default = "default_true")]
    pub fast_bulk_insert: bool,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,
}

impl Default for PoolFileSettings {
    fn default() -> Self {
        let defaults = PoolSettings::default();
        Self {
            pool_size: defaults.pool_size,
            max_overflow: defaults.max_overflow,
            pre_ping: defaults.pre_ping,
            fast_bulk_insert: defaults.fast_bulk_insert,
            connect_timeout: defaults.connect_timeout_secs,
        }
    }
}

impl From<&PoolFileSettings> for PoolSettings {
    fn from(s: &PoolFileSettings) -> Self {
        PoolSettings {
            pool_size: s.pool_size,
            max_overflow: s.max_overflow,
            pre_ping: s.pre_ping,
            fast_bulk_insert: s.fast_bulk_insert,
            connect_timeout_secs: s.connect_timeout,
        }
    }
}

fn default_port() -> u16 {
    1433
}

fn default_true() -> bool {
    true
}

fn default_pool_size() -> u32 {
    PoolSettings::default().pool_size
}

fn default_max_overflow() -> u32 {
    PoolSettings::default().max_overflow
}

fn default_connect_timeout() -> u64 {
    PoolSettings::default().connect_timeout_secs
}

impl RepositoryConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, RepositoryError> {
        toml::from_str(content).map_err(|e| {
            RepositoryError::configuration(format!("Failed to parse config file: {}", e))
        })
    }

    /// Load repository configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(RepositoryConfig)` if successful
    /// * `Err(RepositoryError)` if file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            RepositoryError::configuration(format!("Failed to read config file: {}", e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Load repository configuration from the default location.
    ///
    /// Searches for `repository.toml` in:
    /// 1. Current directory
    /// 2. `rust_backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> Result<Self, RepositoryError> {
        let search_paths = [
            PathBuf::from("repository.toml"),
            PathBuf::from("rust_backend/repository.toml"),
            PathBuf::from("../repository.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(RepositoryError::configuration(
            "No repository.toml found in standard locations",
        ))
    }

    /// Get the repository type from configuration.
    pub fn repository_type(&self) -> Result<RepositoryType, String> {
        RepositoryType::from_str(&self.repository.repo_type)
    }

    /// Convert to [`DbConfig`] if this is a SQL Server configuration.
    ///
    /// Missing server, database, username or password is an error; there are
    /// no placeholder fallbacks in the file form.
    pub fn to_db_config(&self) -> Result<Option<DbConfig>, RepositoryError> {
        let repo_type = self.repository_type().map_err(|e| {
            RepositoryError::configuration(format!("Invalid repository type: {}", e))
        })?;

        if repo_type != RepositoryType::SqlServer {
            return Ok(None);
        }

        let s = &self.sqlserver;
        let password = match (&s.password_env, &s.password) {
            (Some(var), _) => env::var(var).ok(),
            (None, password) => password.clone(),
        }
        .filter(|p| !p.is_empty());

        let mut missing = Vec::new();
        if s.server.is_empty() {
            missing.push("sqlserver.server");
        }
        if s.database.is_empty() {
            missing.push("sqlserver.database");
        }
        if s.username.is_empty() {
            missing.push("sqlserver.username");
        }
        if password.is_none() {
            missing.push("sqlserver.password / sqlserver.password_env");
        }
        if !missing.is_empty() {
            return Err(RepositoryError::configuration(format!(
                "SQL Server repository requires: {}",
                missing.join(", ")
            )));
        }

        let pool = PoolSettings::from(&self.pool);
        pool.validate()?;

        let auth_method = if s.username.contains('@') {
            DbAuthMethod::AadPassword
        } else {
            DbAuthMethod::SqlPassword
        };

        Ok(Some(DbConfig {
            server: s.server.clone(),
            database: s.database.clone(),
            username: s.username.clone(),
            password: password.unwrap_or_default(),
            port: s.port,
            encrypt: s.encrypt,
            trust_cert: s.trust_cert,
            auth_method,
            tenant_id: "common".to_string(),
            client_id: "1950a258-227b-4e31-a9cf-717495945fc2".to_string(),
            resource: "https://database.windows.net/".to_string(),
            pool,
        }))
    }
}
