//! In-memory fakes for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Utc;
use uuid::Uuid;

use crate::errors::{EmailSendingError, RepositoryError};
use crate::events::{DomainEvent, EventSubscriber};
use crate::models::{
    EmailStatus, NewEmailSent, NewUser, TicketData, TicketId, Username, UpsertOutcome, User,
    ValidTicket,
};
use crate::services::ports::{EmailSentStore, MailTransport, OutgoingEmail, UserDirectory, UserStore};

pub fn sample_user(username: &str, email: &str) -> User {
    User {
        id: Uuid::new_v4(),
        username: username.to_string(),
        email: email.to_string(),
        first_name: None,
        last_name: None,
        excluded_from_surveys: false,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// A valid ticket for `username` with email `<username>@example.com`.
pub fn valid_ticket(ticket_id: &str, username: &str) -> ValidTicket {
    ValidTicket {
        ticket: TicketData {
            ticket_id: TicketId::new(ticket_id).unwrap(),
            username: Username::new(username).unwrap(),
            ticket_name: None,
            created: None,
            row_number: 2,
        },
        user: sample_user(username, &format!("{}@example.com", username)),
    }
}

#[derive(Default)]
pub struct InMemoryUsers {
    users: Mutex<HashMap<String, User>>,
    fail: bool,
}

impl InMemoryUsers {
    pub fn with(users: Vec<User>) -> Self {
        Self {
            users: Mutex::new(users.into_iter().map(|u| (u.username.clone(), u)).collect()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn get(&self, username: &str) -> Option<User> {
        self.users.lock().unwrap().get(username).cloned()
    }
}

#[async_trait::async_trait]
impl UserDirectory for InMemoryUsers {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        if self.fail {
            return Err(RepositoryError("connection refused".to_string()));
        }
        Ok(self.get(username))
    }
}

#[async_trait::async_trait]
impl UserStore for InMemoryUsers {
    async fn upsert(&self, user: &NewUser) -> Result<UpsertOutcome, RepositoryError> {
        if self.fail {
            return Err(RepositoryError("connection refused".to_string()));
        }
        let mut users = self.users.lock().unwrap();
        match users.get_mut(user.username.as_str()) {
            Some(existing) => {
                existing.email = user.email.to_string();
                if user.first_name.is_some() {
                    existing.first_name = user.first_name.clone();
                }
                if user.last_name.is_some() {
                    existing.last_name = user.last_name.clone();
                }
                existing.excluded_from_surveys = user.excluded_from_surveys;
                existing.updated_at = Utc::now();
                Ok(UpsertOutcome::Updated)
            }
            None => {
                let mut created = sample_user(user.username.as_str(), user.email.as_str());
                created.first_name = user.first_name.clone();
                created.last_name = user.last_name.clone();
                created.excluded_from_surveys = user.excluded_from_surveys;
                users.insert(created.username.clone(), created);
                Ok(UpsertOutcome::Created)
            }
        }
    }
}

#[derive(Default)]
pub struct InMemoryEmailLog {
    records: Mutex<Vec<NewEmailSent>>,
    fail: bool,
}

impl InMemoryEmailLog {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Adds a non-test `Versendet` entry.
    pub fn seed_sent(&self, ticket_id: &str, username: &str) {
        self.records.lock().unwrap().push(NewEmailSent {
            ticket_id: ticket_id.to_string(),
            username: username.to_string(),
            email: format!("{}@example.com", username),
            ticket_name: None,
            subject: "seeded".to_string(),
            status: EmailStatus::Sent,
            test_mode: false,
        });
    }

    pub fn records(&self) -> Vec<NewEmailSent> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl EmailSentStore for InMemoryEmailLog {
    async fn exists_for_ticket(&self, ticket_id: &str, username: &str) -> Result<bool, RepositoryError> {
        if self.fail {
            return Err(RepositoryError("connection refused".to_string()));
        }
        Ok(self.records.lock().unwrap().iter().any(|r| {
            r.ticket_id == ticket_id && r.username == username && r.status.is_sent() && !r.test_mode
        }))
    }

    async fn save(&self, record: &NewEmailSent) -> Result<(), RepositoryError> {
        if self.fail {
            return Err(RepositoryError("connection refused".to_string()));
        }
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

/// Records sent emails; fails for one configured recipient.
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<OutgoingEmail>>,
    fail_for: Option<String>,
}

impl RecordingTransport {
    pub fn failing_for(recipient: &str) -> Self {
        Self {
            fail_for: Some(recipient.to_string()),
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl MailTransport for RecordingTransport {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailSendingError> {
        if self.fail_for.as_deref() == Some(email.to.as_str()) {
            return Err(EmailSendingError::SendFailed {
                reason: "simulated rejection".to_string(),
            });
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingSubscriber {
    events: Mutex<Vec<DomainEvent>>,
}

impl RecordingSubscriber {
    pub fn events(&self) -> Vec<DomainEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.events().iter().map(DomainEvent::name).collect()
    }
}

impl EventSubscriber for RecordingSubscriber {
    fn handle(&self, event: &DomainEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
