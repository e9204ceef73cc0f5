//! Repository selection from the environment and from config files.

mod support;

use std::io::Write;

use support::{with_scoped_env, CLEAR_DB_ENV};
use tempfile::NamedTempFile;
use trsm_data::db::{RepositoryError, RepositoryFactory, RepositoryType};

#[test]
fn test_type_defaults_to_local_without_server() {
    let repo_type = with_scoped_env(CLEAR_DB_ENV, RepositoryType::from_env).unwrap();
    assert_eq!(repo_type, RepositoryType::Local);
}

#[test]
fn test_type_follows_db_server() {
    let mut changes = CLEAR_DB_ENV.to_vec();
    changes.push(("DB_SERVER", Some("sql.internal")));

    let repo_type = with_scoped_env(&changes, RepositoryType::from_env).unwrap();
    assert_eq!(repo_type, RepositoryType::SqlServer);
}

#[test]
fn test_explicit_type_wins() {
    let mut changes = CLEAR_DB_ENV.to_vec();
    changes.push(("DB_SERVER", Some("sql.internal")));
    changes.push(("REPOSITORY_TYPE", Some("local")));

    let repo_type = with_scoped_env(&changes, RepositoryType::from_env).unwrap();
    assert_eq!(repo_type, RepositoryType::Local);
}

#[test]
fn test_unknown_type_is_configuration_error() {
    let mut changes = CLEAR_DB_ENV.to_vec();
    changes.push(("REPOSITORY_TYPE", Some("oracle")));

    let result = with_scoped_env(&changes, RepositoryType::from_env);
    assert!(matches!(result, Err(RepositoryError::ConfigurationError { .. })));
}

#[test]
fn test_sqlserver_from_env_without_credentials_fails() {
    let mut changes = CLEAR_DB_ENV.to_vec();
    changes.push(("REPOSITORY_TYPE", Some("sqlserver")));

    let result = with_scoped_env(&changes, RepositoryFactory::from_env);
    assert!(matches!(result, Err(RepositoryError::ConfigurationError { .. })));
}

#[tokio::test]
async fn test_local_repository_from_config_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[repository]\ntype = \"local\"").unwrap();

    let repo = RepositoryFactory::from_config_file(file.path()).unwrap();
    assert!(repo.health_check().await.unwrap());
}

#[test]
fn test_incomplete_sqlserver_config_file_fails() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[repository]\ntype = \"sqlserver\"\n\n[sqlserver]\nserver = \"sql.internal\"").unwrap();

    let result = RepositoryFactory::from_config_file(file.path());
    assert!(matches!(result, Err(RepositoryError::ConfigurationError { .. })));
}

#[test]
fn test_missing_config_file_fails() {
    let result = RepositoryFactory::from_config_file("/nonexistent/repository.toml");
    assert!(result.is_err());
}
