//! Mail transports.
//!
//! - `smtp`: delivers through lettre's async SMTP transport using the
//!   settings stored in the database
//! - `console`: logs the message and reports success (development)

use std::sync::Arc;

use async_trait::async_trait;
use domain::errors::EmailSendingError;
use domain::models::{SmtpConfig, SmtpEncryption};
use domain::services::{MailTransport, OutgoingEmail};
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::EmailConfig;

/// Sends through an SMTP relay.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    host: String,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, EmailSendingError> {
        if config.host.trim().is_empty() {
            return Err(EmailSendingError::NotConfigured {
                reason: "SMTP host is not set".to_string(),
            });
        }

        let from = mailbox(&config.sender_email, Some(&config.sender_name)).map_err(|_| {
            EmailSendingError::NotConfigured {
                reason: format!("invalid sender address '{}'", config.sender_email),
            }
        })?;

        let connection_error = |e: lettre::transport::smtp::Error| EmailSendingError::Connection {
            host: config.host.clone(),
            reason: e.to_string(),
        };
        let builder = match config.encryption {
            SmtpEncryption::Tls => {
                AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host).map_err(connection_error)?
            }
            SmtpEncryption::StartTls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                    .map_err(connection_error)?
            }
            SmtpEncryption::None => {
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
            }
        }
        .port(config.port);

        let builder = match (&config.username, &config.password) {
            (Some(user), Some(password)) if config.has_credentials() => {
                builder.credentials(Credentials::new(user.clone(), password.clone()))
            }
            _ => builder,
        };

        Ok(Self {
            transport: builder.build(),
            from,
            host: config.host.clone(),
        })
    }

    fn message(&self, email: &OutgoingEmail) -> Result<Message, EmailSendingError> {
        let to = mailbox(&email.to, email.to_name.as_deref()).map_err(|_| {
            EmailSendingError::InvalidRecipient {
                address: email.to.clone(),
            }
        })?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(email.body.clone())
            .map_err(|e| EmailSendingError::SendFailed {
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailSendingError> {
        let message = self.message(email)?;

        match self.transport.send(message).await {
            Ok(_) => {
                tracing::debug!(to = %email.to, host = %self.host, "Email accepted by SMTP server");
                Ok(())
            }
            // The server answered and refused the message.
            Err(e) if e.is_permanent() || e.is_transient() => {
                Err(EmailSendingError::SendFailed {
                    reason: e.to_string(),
                })
            }
            Err(e) => Err(EmailSendingError::Connection {
                host: self.host.clone(),
                reason: e.to_string(),
            }),
        }
    }
}

/// Logs every message instead of sending it.
#[derive(Debug, Default)]
pub struct ConsoleMailer;

#[async_trait]
impl MailTransport for ConsoleMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailSendingError> {
        if email.to.parse::<Address>().is_err() {
            return Err(EmailSendingError::InvalidRecipient {
                address: email.to.clone(),
            });
        }
        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            body_len = email.body.len(),
            "Email logged (console provider)"
        );
        Ok(())
    }
}

/// Stands in for a transport that could not be built; every send fails with
/// the build error.
#[derive(Debug)]
pub struct UnavailableMailer {
    error: EmailSendingError,
}

impl UnavailableMailer {
    pub fn new(error: EmailSendingError) -> Self {
        Self { error }
    }
}

#[async_trait]
impl MailTransport for UnavailableMailer {
    async fn send(&self, _email: &OutgoingEmail) -> Result<(), EmailSendingError> {
        Err(self.error.clone())
    }
}

/// Builds the transport for the configured provider.
pub fn build_transport(
    email: &EmailConfig,
    smtp: &SmtpConfig,
) -> Result<Arc<dyn MailTransport>, EmailSendingError> {
    if email.is_console() {
        return Ok(Arc::new(ConsoleMailer));
    }
    Ok(Arc::new(SmtpMailer::new(smtp)?))
}

fn mailbox(address: &str, name: Option<&str>) -> Result<Mailbox, lettre::address::AddressError> {
    let address: Address = address.trim().parse()?;
    let name = name.map(str::trim).filter(|n| !n.is_empty()).map(str::to_string);
    Ok(Mailbox::new(name, address))
}
