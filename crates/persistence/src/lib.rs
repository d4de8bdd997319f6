//! Persistence layer for the ticket survey mailer.
//!
//! This crate contains:
//! - Database connection management and migrations
//! - Entity definitions (database row mappings)
//! - Repository implementations, including the domain ports

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;

use domain::errors::RepositoryError;

/// Wraps a database error for the domain ports.
pub(crate) fn repository_error(context: &str, error: sqlx::Error) -> RepositoryError {
    tracing::error!(error = %error, context, "Database operation failed");
    RepositoryError(format!("{}: {}", context, error))
}
