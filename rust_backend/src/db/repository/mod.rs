//! Repository trait definitions for database operations.
//!
//! - [`error`]: Error types for repository operations
//! - [`tables`]: Read access to the nine dashboard tables

pub mod error;
pub mod tables;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};
pub use tables::TableRepository;
