//! tiberius connector for the shared pool.

use async_trait::async_trait;
use bb8::Pool;
use bb8_tiberius::ConnectionManager;
use log::debug;
use serde::Deserialize;
use std::time::Duration;
use tiberius::{AuthMethod, Config, EncryptionLevel};

use crate::db::config::{DbAuthMethod, DbConfig};
use crate::db::pool::PoolConnector;
use crate::db::repository::{ErrorContext, RepositoryError, RepositoryResult};

/// Type alias for the database connection pool.
pub type DbPool = Pool<ConnectionManager>;

#[derive(Debug, Deserialize)]
struct AadTokenResponse {
    access_token: String,
}

async fn fetch_aad_token(config: &DbConfig) -> RepositoryResult<String> {
    let token_url = format!(
        "https://login.microsoftonline.com/{}/oauth2/token",
        config.tenant_id
    );
    let context = || ErrorContext::new("fetch_aad_token").with_details(token_url.clone());

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(20))
        .build()
        .map_err(|e| {
            RepositoryError::internal(format!("Failed to build HTTP client: {}", e))
        })?;

    let params = [
        ("grant_type", "password"),
        ("client_id", config.client_id.as_str()),
        ("username", config.username.as_str()),
        ("password", config.password.as_str()),
        ("resource", config.resource.as_str()),
    ];

    let response = client
        .post(&token_url)
        .form(&params)
        .send()
        .await
        .map_err(|e| {
            RepositoryError::connection_with_context(
                format!("Failed to request AAD token: {}", e),
                context(),
            )
        })?;

    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<empty response>".to_string());

    if !status.is_success() {
        return Err(RepositoryError::ConfigurationError {
            message: format!("AAD token request failed ({}): {}", status, body.trim()),
            context: context(),
        });
    }

    let token_response: AadTokenResponse = serde_json::from_str(&body).map_err(|e| {
        RepositoryError::internal(format!("Failed to parse AAD token response: {}", e))
    })?;

    Ok(token_response.access_token)
}

fn authentication(config: &DbConfig, aad_token: Option<String>) -> AuthMethod {
    match (&config.auth_method, aad_token) {
        (DbAuthMethod::AadToken(token), _) => AuthMethod::aad_token(token),
        (DbAuthMethod::AadPassword, Some(token)) => AuthMethod::aad_token(token),
        _ => AuthMethod::sql_server(&config.username, &config.password),
    }
}

fn base_config(config: &DbConfig, auth: AuthMethod) -> Config {
    let mut sql_config = Config::new();
    sql_config.host(&config.server);
    sql_config.port(config.port);
    sql_config.database(&config.database);
    sql_config.application_name(env!("CARGO_PKG_NAME"));
    sql_config.authentication(auth);

    sql_config.encryption(if config.encrypt {
        EncryptionLevel::Required
    } else {
        EncryptionLevel::Off
    });

    if config.trust_cert {
        sql_config.trust_cert();
    }

    sql_config
}

/// Build a tiberius config, including Azure AD token retrieval when requested.
pub async fn build_tiberius_config(config: &DbConfig) -> RepositoryResult<Config> {
    let aad_token = match config.auth_method {
        DbAuthMethod::AadPassword => Some(fetch_aad_token(config).await?),
        _ => None,
    };
    Ok(base_config(config, authentication(config, aad_token)))
}

/// [`PoolConnector`] for SQL Server over tiberius.
#[derive(Debug, Clone)]
pub struct SqlServerConnector {
    config: DbConfig,
}

impl SqlServerConnector {
    pub fn new(config: DbConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DbConfig {
        &self.config
    }
}

#[async_trait]
impl PoolConnector for SqlServerConnector {
    type Manager = ConnectionManager;

    async fn manager(&self) -> RepositoryResult<ConnectionManager> {
        let sql_config = build_tiberius_config(&self.config).await?;
        debug!(
            "tiberius config ready for {}:{} (auth {:?})",
            self.config.server, self.config.port, self.config.auth_method
        );
        Ok(ConnectionManager::new(sql_config))
    }

    fn describe(&self) -> String {
        self.config.connection_url()
    }
}
