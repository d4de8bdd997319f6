//! Survey email rendering with `{{placeholder}}` substitution.

use std::collections::HashMap;

use crate::errors::EmailSendingError;
use crate::models::ValidTicket;

/// Names accepted inside `{{...}}`.
pub const PLACEHOLDERS: [&str; 7] = [
    "ticketId",
    "ticketName",
    "username",
    "firstName",
    "lastName",
    "created",
    "surveyUrl",
];

lazy_static::lazy_static! {
    static ref PLACEHOLDER_REGEX: regex::Regex =
        regex::Regex::new(r"\{\{\s*([^{}]*?)\s*\}\}").unwrap();
}

/// Subject and body ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub body: String,
}

/// Subject/body templates plus the survey link pattern.
#[derive(Debug, Clone)]
pub struct SurveyTemplate {
    subject: String,
    body: String,
    survey_url: String,
}

impl SurveyTemplate {
    /// Checks every template for unknown placeholders.
    pub fn new(
        subject: impl Into<String>,
        body: impl Into<String>,
        survey_url: impl Into<String>,
    ) -> Result<Self, EmailSendingError> {
        let template = Self {
            subject: subject.into(),
            body: body.into(),
            survey_url: survey_url.into(),
        };

        if template.subject.trim().is_empty() {
            return Err(EmailSendingError::Template {
                reason: "subject template is empty".to_string(),
            });
        }
        for (name, text) in [
            ("subject", &template.subject),
            ("body", &template.body),
            ("survey_url", &template.survey_url),
        ] {
            if let Some(unknown) = unknown_placeholders(text).first() {
                return Err(EmailSendingError::Template {
                    reason: format!("unknown placeholder '{{{{{}}}}}' in {}", unknown, name),
                });
            }
        }
        if let Some(other) = placeholder_names(&template.survey_url)
            .into_iter()
            .find(|name| name != "ticketId")
        {
            return Err(EmailSendingError::Template {
                reason: format!("survey_url may only use {{{{ticketId}}}}, found '{}'", other),
            });
        }

        Ok(template)
    }

    /// Renders subject and body for one ticket.
    pub fn render(&self, ticket: &ValidTicket) -> Result<RenderedEmail, EmailSendingError> {
        let mut values: HashMap<&str, String> = HashMap::new();
        values.insert("ticketId", ticket.ticket.ticket_id.to_string());
        values.insert(
            "ticketName",
            ticket
                .ticket
                .ticket_name
                .as_ref()
                .map(|n| n.to_string())
                .unwrap_or_default(),
        );
        values.insert("username", ticket.ticket.username.to_string());
        values.insert("firstName", ticket.user.first_name.clone().unwrap_or_default());
        values.insert("lastName", ticket.user.last_name.clone().unwrap_or_default());
        values.insert("created", ticket.ticket.created.clone().unwrap_or_default());

        let mut url_values = HashMap::new();
        url_values.insert("ticketId", encode_url_component(ticket.ticket.ticket_id.as_str()));
        let survey_url = substitute(&self.survey_url, &url_values)?;
        values.insert("surveyUrl", survey_url);

        Ok(RenderedEmail {
            subject: substitute(&self.subject, &values)?,
            body: substitute(&self.body, &values)?,
        })
    }
}

fn placeholder_names(text: &str) -> Vec<String> {
    PLACEHOLDER_REGEX
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

fn unknown_placeholders(text: &str) -> Vec<String> {
    placeholder_names(text)
        .into_iter()
        .filter(|name| !PLACEHOLDERS.contains(&name.as_str()))
        .collect()
}

/// Single-pass substitution; inserted values are not rescanned.
fn substitute(text: &str, values: &HashMap<&str, String>) -> Result<String, EmailSendingError> {
    let mut output = String::with_capacity(text.len());
    let mut last = 0;

    for caps in PLACEHOLDER_REGEX.captures_iter(text) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let value = values
            .get(name.as_str())
            .ok_or_else(|| EmailSendingError::Template {
                reason: format!("unresolved placeholder '{}'", whole.as_str()),
            })?;
        output.push_str(&text[last..whole.start()]);
        output.push_str(value);
        last = whole.end();
    }
    output.push_str(&text[last..]);

    Ok(output)
}

fn encode_url_component(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}
