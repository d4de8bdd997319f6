//! Domain events and the in-process event dispatcher.
//!
//! Events are published synchronously, in order, to every registered
//! subscriber. Subscribers must not block; they log, count or record.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::models::dispatch::DispatchSummary;
use crate::models::email_status::SkipReason;

/// A survey email was delivered to the transport.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailSentEvent {
    pub ticket_id: String,
    pub username: String,
    pub recipient: String,
    pub subject: String,
    pub test_mode: bool,
    pub occurred_at: DateTime<Utc>,
}

/// A ticket was not mailed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailSkippedEvent {
    pub ticket_id: String,
    pub username: String,
    pub reason: SkipReason,
    pub test_mode: bool,
    pub occurred_at: DateTime<Utc>,
}

/// Rendering or delivery failed for a ticket.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailFailedEvent {
    pub ticket_id: String,
    pub username: String,
    pub recipient: String,
    pub error: String,
    pub test_mode: bool,
    pub occurred_at: DateTime<Utc>,
}

/// A dispatch run finished.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkEmailCompletedEvent {
    #[serde(flatten)]
    pub summary: DispatchSummary,
    pub occurred_at: DateTime<Utc>,
}

impl BulkEmailCompletedEvent {
    pub fn was_successful(&self) -> bool {
        self.summary.was_successful()
    }

    pub fn success_rate(&self) -> f64 {
        self.summary.success_rate()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserImportStartedEvent {
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserImportCompletedEvent {
    pub created: usize,
    pub updated: usize,
    pub failed: usize,
    pub duration_in_seconds: f64,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserImportFailedEvent {
    pub reason: String,
    pub occurred_at: DateTime<Utc>,
}

/// Every event the domain publishes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    EmailSent(EmailSentEvent),
    EmailSkipped(EmailSkippedEvent),
    EmailFailed(EmailFailedEvent),
    BulkEmailCompleted(BulkEmailCompletedEvent),
    UserImportStarted(UserImportStartedEvent),
    UserImportCompleted(UserImportCompletedEvent),
    UserImportFailed(UserImportFailedEvent),
}

impl DomainEvent {
    pub fn name(&self) -> &'static str {
        match self {
            DomainEvent::EmailSent(_) => "email_sent",
            DomainEvent::EmailSkipped(_) => "email_skipped",
            DomainEvent::EmailFailed(_) => "email_failed",
            DomainEvent::BulkEmailCompleted(_) => "bulk_email_completed",
            DomainEvent::UserImportStarted(_) => "user_import_started",
            DomainEvent::UserImportCompleted(_) => "user_import_completed",
            DomainEvent::UserImportFailed(_) => "user_import_failed",
        }
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            DomainEvent::EmailSent(e) => e.occurred_at,
            DomainEvent::EmailSkipped(e) => e.occurred_at,
            DomainEvent::EmailFailed(e) => e.occurred_at,
            DomainEvent::BulkEmailCompleted(e) => e.occurred_at,
            DomainEvent::UserImportStarted(e) => e.occurred_at,
            DomainEvent::UserImportCompleted(e) => e.occurred_at,
            DomainEvent::UserImportFailed(e) => e.occurred_at,
        }
    }
}

/// Receives published domain events.
pub trait EventSubscriber: Send + Sync {
    fn handle(&self, event: &DomainEvent);
}

/// Fans events out to subscribers in registration order.
#[derive(Clone, Default)]
pub struct EventDispatcher {
    subscribers: Vec<Arc<dyn EventSubscriber>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(mut self, subscriber: Arc<dyn EventSubscriber>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    pub fn publish(&self, event: DomainEvent) {
        for subscriber in &self.subscribers {
            subscriber.handle(&event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
