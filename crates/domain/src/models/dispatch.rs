//! Dispatch run options and results.

use serde::Serialize;

use super::email_status::EmailStatus;
use super::value_objects::EmailAddress;
use crate::errors::ValidationError;

/// Options for one dispatch run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DispatchOptions {
    pub test_mode: bool,
    pub force_resend: bool,
    /// Every send goes here when `test_mode` is set.
    pub test_recipient: Option<EmailAddress>,
}

impl DispatchOptions {
    /// Builds options from form input.
    ///
    /// In test mode the recipient is the form value, falling back to the
    /// configured SMTP test address. Test mode without any recipient is
    /// rejected.
    pub fn new(
        test_mode: bool,
        force_resend: bool,
        form_test_email: Option<&str>,
        configured_test_email: Option<&str>,
    ) -> Result<Self, ValidationError> {
        if !test_mode {
            return Ok(Self {
                test_mode,
                force_resend,
                test_recipient: None,
            });
        }

        let raw = form_test_email
            .filter(|s| !s.trim().is_empty())
            .or(configured_test_email.filter(|s| !s.trim().is_empty()))
            .ok_or_else(|| ValidationError::required("testEmail"))?;

        let recipient = EmailAddress::new(raw).map_err(|e| ValidationError::InvalidFormat {
            field: "testEmail".to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            test_mode,
            force_resend,
            test_recipient: Some(recipient),
        })
    }
}

/// Decision taken for a single ticket.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketOutcome {
    pub ticket_id: String,
    pub username: String,
    /// Address the email was (or would have been) sent to.
    pub recipient: String,
    pub status: EmailStatus,
}

/// Aggregate counts of a dispatch run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchSummary {
    pub total_emails: usize,
    pub sent_count: usize,
    pub failed_count: usize,
    pub skipped_count: usize,
    pub test_mode: bool,
    pub duration_in_seconds: f64,
}

impl DispatchSummary {
    /// Tallies outcomes. `total_emails` is always the sum of the three counts.
    pub fn from_outcomes(outcomes: &[TicketOutcome], test_mode: bool, duration_in_seconds: f64) -> Self {
        let sent_count = outcomes.iter().filter(|o| o.status.is_sent()).count();
        let skipped_count = outcomes.iter().filter(|o| o.status.is_skipped()).count();
        let failed_count = outcomes.iter().filter(|o| o.status.is_error()).count();
        Self {
            total_emails: sent_count + skipped_count + failed_count,
            sent_count,
            failed_count,
            skipped_count,
            test_mode,
            duration_in_seconds,
        }
    }

    pub fn was_successful(&self) -> bool {
        self.failed_count == 0
    }

    /// Percentage of sent emails, 0 for an empty run.
    pub fn success_rate(&self) -> f64 {
        if self.total_emails == 0 {
            0.0
        } else {
            self.sent_count as f64 / self.total_emails as f64 * 100.0
        }
    }
}

/// Full result of a dispatch run, returned to the admin.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchReport {
    pub summary: DispatchSummary,
    pub success_rate: f64,
    pub was_successful: bool,
    pub outcomes: Vec<TicketOutcome>,
}

impl DispatchReport {
    pub fn new(summary: DispatchSummary, outcomes: Vec<TicketOutcome>) -> Self {
        Self {
            success_rate: summary.success_rate(),
            was_successful: summary.was_successful(),
            summary,
            outcomes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::email_status::SkipReason;

    fn outcome(status: EmailStatus) -> TicketOutcome {
        TicketOutcome {
            ticket_id: "T-1".to_string(),
            username: "u".to_string(),
            recipient: "u@example.com".to_string(),
            status,
        }
    }

    #[test]
    fn test_options_without_test_mode() {
        let options = DispatchOptions::new(false, true, Some("ignored@example.com"), None).unwrap();
        assert!(!options.test_mode);
        assert!(options.force_resend);
        assert!(options.test_recipient.is_none());
    }

    #[test]
    fn test_options_test_mode_prefers_form_value() {
        let options = DispatchOptions::new(
            true,
            false,
            Some("Tester@Example.com"),
            Some("config@example.com"),
        )
        .unwrap();
        assert_eq!(options.test_recipient.unwrap().as_str(), "tester@example.com");
    }

    #[test]
    fn test_options_test_mode_falls_back_to_config() {
        let options = DispatchOptions::new(true, false, Some(""), Some("config@example.com")).unwrap();
        assert_eq!(options.test_recipient.unwrap().as_str(), "config@example.com");
    }

    #[test]
    fn test_options_test_mode_requires_recipient() {
        let err = DispatchOptions::new(true, false, None, None).unwrap_err();
        assert!(matches!(err, ValidationError::RequiredField { .. }));

        let err = DispatchOptions::new(true, false, Some("kaputt"), None).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFormat { .. }));
    }

    #[test]
    fn test_summary_counts() {
        let outcomes = vec![
            outcome(EmailStatus::Sent),
            outcome(EmailStatus::Sent),
            outcome(EmailStatus::Skipped(SkipReason::AlreadyProcessed)),
            outcome(EmailStatus::Error("boom".to_string())),
        ];
        let summary = DispatchSummary::from_outcomes(&outcomes, false, 1.5);
        assert_eq!(summary.total_emails, 4);
        assert_eq!(summary.sent_count, 2);
        assert_eq!(summary.skipped_count, 1);
        assert_eq!(summary.failed_count, 1);
        assert!(!summary.was_successful());
        assert!((summary.success_rate() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_summary() {
        let summary = DispatchSummary::from_outcomes(&[], true, 0.0);
        assert_eq!(summary.total_emails, 0);
        assert!(summary.was_successful());
        assert_eq!(summary.success_rate(), 0.0);
    }
}
