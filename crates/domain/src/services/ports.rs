//! Collaborator traits implemented by persistence and the mail transport.

use crate::errors::{EmailSendingError, RepositoryError};
use crate::models::{NewEmailSent, NewUser, UpsertOutcome, User};

/// Looks up registered users.
#[async_trait::async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError>;
}

/// Writes users from an import.
#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    async fn upsert(&self, user: &NewUser) -> Result<UpsertOutcome, RepositoryError>;
}

/// Append-only email log.
#[async_trait::async_trait]
pub trait EmailSentStore: Send + Sync {
    /// True if a non-test `Versendet` entry exists for the pair.
    async fn exists_for_ticket(&self, ticket_id: &str, username: &str)
        -> Result<bool, RepositoryError>;

    async fn save(&self, record: &NewEmailSent) -> Result<(), RepositoryError>;
}

/// A rendered email ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub to_name: Option<String>,
    pub subject: String,
    pub body: String,
}

/// Delivers rendered emails.
#[async_trait::async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailSendingError>;
}
