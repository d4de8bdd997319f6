//! Built-in domain event subscribers.

use domain::events::{DomainEvent, EventDispatcher, EventSubscriber};
use metrics::{counter, histogram};
use std::sync::Arc;

/// Writes every domain event to the `audit` log target.
#[derive(Debug, Default)]
pub struct AuditLogSubscriber;

impl EventSubscriber for AuditLogSubscriber {
    fn handle(&self, event: &DomainEvent) {
        match event {
            DomainEvent::EmailSent(e) => tracing::info!(
                target: "audit",
                event = event.name(),
                ticket_id = %e.ticket_id,
                username = %e.username,
                recipient = %e.recipient,
                test_mode = e.test_mode,
                "Survey email sent"
            ),
            DomainEvent::EmailSkipped(e) => tracing::info!(
                target: "audit",
                event = event.name(),
                ticket_id = %e.ticket_id,
                username = %e.username,
                reason = e.reason.as_str(),
                test_mode = e.test_mode,
                "Survey email skipped"
            ),
            DomainEvent::EmailFailed(e) => tracing::warn!(
                target: "audit",
                event = event.name(),
                ticket_id = %e.ticket_id,
                username = %e.username,
                recipient = %e.recipient,
                error = %e.error,
                test_mode = e.test_mode,
                "Survey email failed"
            ),
            DomainEvent::BulkEmailCompleted(e) => tracing::info!(
                target: "audit",
                event = event.name(),
                total = e.summary.total_emails,
                sent = e.summary.sent_count,
                failed = e.summary.failed_count,
                skipped = e.summary.skipped_count,
                test_mode = e.summary.test_mode,
                success_rate = e.summary.success_rate(),
                duration_secs = e.summary.duration_in_seconds,
                "Dispatch run completed"
            ),
            DomainEvent::UserImportStarted(_) => {
                tracing::info!(target: "audit", event = event.name(), "User import started")
            }
            DomainEvent::UserImportCompleted(e) => tracing::info!(
                target: "audit",
                event = event.name(),
                created = e.created,
                updated = e.updated,
                failed = e.failed,
                duration_secs = e.duration_in_seconds,
                "User import completed"
            ),
            DomainEvent::UserImportFailed(e) => tracing::warn!(
                target: "audit",
                event = event.name(),
                reason = %e.reason,
                "User import failed"
            ),
        }
    }
}

/// Counts dispatch outcomes and import results.
///
/// - `survey_emails_total{outcome,test_mode}`
/// - `survey_dispatch_duration_seconds`
/// - `user_import_rows_total{result}`
#[derive(Debug, Default)]
pub struct MetricsSubscriber;

impl EventSubscriber for MetricsSubscriber {
    fn handle(&self, event: &DomainEvent) {
        match event {
            DomainEvent::EmailSent(e) => email_outcome("sent", e.test_mode),
            DomainEvent::EmailSkipped(e) => email_outcome("skipped", e.test_mode),
            DomainEvent::EmailFailed(e) => email_outcome("failed", e.test_mode),
            DomainEvent::BulkEmailCompleted(e) => {
                histogram!("survey_dispatch_duration_seconds")
                    .record(e.summary.duration_in_seconds);
            }
            DomainEvent::UserImportCompleted(e) => {
                counter!("user_import_rows_total", "result" => "created")
                    .increment(e.created as u64);
                counter!("user_import_rows_total", "result" => "updated")
                    .increment(e.updated as u64);
                counter!("user_import_rows_total", "result" => "failed")
                    .increment(e.failed as u64);
            }
            DomainEvent::UserImportStarted(_) | DomainEvent::UserImportFailed(_) => {}
        }
    }
}

fn email_outcome(outcome: &'static str, test_mode: bool) {
    counter!(
        "survey_emails_total",
        "outcome" => outcome,
        "test_mode" => if test_mode { "true" } else { "false" }
    )
    .increment(1);
}

/// Dispatcher with the audit and metrics subscribers attached.
pub fn default_dispatcher() -> EventDispatcher {
    EventDispatcher::new()
        .subscribe(Arc::new(AuditLogSubscriber))
        .subscribe(Arc::new(MetricsSubscriber))
}
