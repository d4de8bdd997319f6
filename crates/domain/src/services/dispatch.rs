//! Survey email dispatch.
//!
//! Walks the valid tickets of an upload in file order and decides for each
//! one whether to send, skip or record a failure. Every decision is written
//! to the email log before its event is published. Store failures abort the
//! run; template and transport failures only fail the affected ticket.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;

use crate::errors::RepositoryError;
use crate::events::{
    BulkEmailCompletedEvent, DomainEvent, EmailFailedEvent, EmailSentEvent, EmailSkippedEvent,
    EventDispatcher,
};
use crate::models::{
    DispatchOptions, DispatchReport, DispatchSummary, EmailStatus, NewEmailSent, SkipReason,
    TicketOutcome, ValidTicket,
};
use crate::services::ports::{EmailSentStore, MailTransport, OutgoingEmail};
use crate::services::template::SurveyTemplate;

/// Prefix added to the subject of test-mode emails.
pub const TEST_SUBJECT_PREFIX: &str = "[TEST] ";

pub struct EmailDispatchService {
    sent_store: Arc<dyn EmailSentStore>,
    transport: Arc<dyn MailTransport>,
    template: Arc<SurveyTemplate>,
    events: EventDispatcher,
}

impl EmailDispatchService {
    pub fn new(
        sent_store: Arc<dyn EmailSentStore>,
        transport: Arc<dyn MailTransport>,
        template: Arc<SurveyTemplate>,
        events: EventDispatcher,
    ) -> Self {
        Self {
            sent_store,
            transport,
            template,
            events,
        }
    }

    pub async fn dispatch(
        &self,
        tickets: &[ValidTicket],
        options: &DispatchOptions,
    ) -> Result<DispatchReport, RepositoryError> {
        let started = Instant::now();
        let mut outcomes = Vec::with_capacity(tickets.len());

        tracing::info!(
            tickets = tickets.len(),
            test_mode = options.test_mode,
            force_resend = options.force_resend,
            "Starting survey dispatch"
        );

        for ticket in tickets {
            outcomes.push(self.dispatch_one(ticket, options).await?);
        }

        let summary = DispatchSummary::from_outcomes(
            &outcomes,
            options.test_mode,
            started.elapsed().as_secs_f64(),
        );

        tracing::info!(
            total = summary.total_emails,
            sent = summary.sent_count,
            skipped = summary.skipped_count,
            failed = summary.failed_count,
            duration_secs = summary.duration_in_seconds,
            "Survey dispatch finished"
        );

        self.events
            .publish(DomainEvent::BulkEmailCompleted(BulkEmailCompletedEvent {
                summary,
                occurred_at: Utc::now(),
            }));

        Ok(DispatchReport::new(summary, outcomes))
    }

    async fn dispatch_one(
        &self,
        valid: &ValidTicket,
        options: &DispatchOptions,
    ) -> Result<TicketOutcome, RepositoryError> {
        let ticket_id = valid.ticket.ticket_id.as_str();
        let username = valid.ticket.username.as_str();
        let recipient = match (&options.test_recipient, options.test_mode) {
            (Some(test_recipient), true) => test_recipient.as_str().to_string(),
            _ => valid.user.email.clone(),
        };
        let rendered = self.template.render(valid);
        let subject = match &rendered {
            Ok(email) if options.test_mode => format!("{}{}", TEST_SUBJECT_PREFIX, email.subject),
            Ok(email) => email.subject.clone(),
            Err(_) => String::new(),
        };

        let skip_reason = if !options.force_resend
            && self.sent_store.exists_for_ticket(ticket_id, username).await?
        {
            Some(SkipReason::AlreadyProcessed)
        } else if valid.user.excluded_from_surveys {
            Some(SkipReason::ExcludedFromSurveys)
        } else {
            None
        };

        let (status, event) = match skip_reason {
            Some(reason) => {
                tracing::debug!(ticket_id, username, reason = reason.as_str(), "Skipping ticket");
                (
                    EmailStatus::Skipped(reason),
                    DomainEvent::EmailSkipped(EmailSkippedEvent {
                        ticket_id: ticket_id.to_string(),
                        username: username.to_string(),
                        reason,
                        test_mode: options.test_mode,
                        occurred_at: Utc::now(),
                    }),
                )
            }
            None => {
                let delivery = match rendered {
                    Ok(email) => {
                        let outgoing = OutgoingEmail {
                            to: recipient.clone(),
                            to_name: Some(valid.user.display_name()),
                            subject: subject.clone(),
                            body: email.body,
                        };
                        self.transport.send(&outgoing).await
                    }
                    Err(e) => Err(e),
                };

                match delivery {
                    Ok(()) => (
                        EmailStatus::Sent,
                        DomainEvent::EmailSent(EmailSentEvent {
                            ticket_id: ticket_id.to_string(),
                            username: username.to_string(),
                            recipient: recipient.clone(),
                            subject: subject.clone(),
                            test_mode: options.test_mode,
                            occurred_at: Utc::now(),
                        }),
                    ),
                    Err(e) => {
                        tracing::warn!(ticket_id, username, error = %e, "Survey email failed");
                        (
                            EmailStatus::Error(e.to_string()),
                            DomainEvent::EmailFailed(EmailFailedEvent {
                                ticket_id: ticket_id.to_string(),
                                username: username.to_string(),
                                recipient: recipient.clone(),
                                error: e.to_string(),
                                test_mode: options.test_mode,
                                occurred_at: Utc::now(),
                            }),
                        )
                    }
                }
            }
        };

        self.sent_store
            .save(&NewEmailSent {
                ticket_id: ticket_id.to_string(),
                username: username.to_string(),
                email: recipient.clone(),
                ticket_name: valid.ticket.ticket_name.as_ref().map(|n| n.to_string()),
                subject,
                status: status.clone(),
                test_mode: options.test_mode,
            })
            .await?;
        self.events.publish(event);

        Ok(TicketOutcome {
            ticket_id: ticket_id.to_string(),
            username: username.to_string(),
            recipient,
            status,
        })
    }
}
