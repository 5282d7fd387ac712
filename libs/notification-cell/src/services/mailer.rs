use std::sync::LazyLock;

use regex::Regex;
use tracing::{info, warn};

use shared_config::AppConfig;

use crate::models::{EmailRequest, EmailResponse, MailError, OutgoingEmail};
use crate::services::transport::MailTransport;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern compiles"));

pub const SENDER_NAME: &str = "Spa Sentirse Bien";

pub fn is_valid_email(address: &str) -> bool {
    EMAIL_RE.is_match(address)
}

/// Plain-text fallback for an HTML body: tags removed, nothing else.
pub fn strip_tags(html: &str) -> String {
    TAG_RE.replace_all(html, "").into_owned()
}

pub struct EmailService<T> {
    transport: T,
    sender: String,
    configured: bool,
}

impl<T: MailTransport> EmailService<T> {
    pub fn new(config: &AppConfig, transport: T) -> Self {
        Self {
            transport,
            sender: format!("\"{}\" <{}>", SENDER_NAME, config.email_user),
            configured: config.is_email_configured(),
        }
    }

    /// Validate, build and deliver one message. Validation happens before the
    /// configuration check, and the transport is verified before sending.
    pub async fn send_email(&self, request: EmailRequest) -> Result<EmailResponse, MailError> {
        let to = non_empty(request.to).ok_or(MailError::MissingFields)?;
        let subject = non_empty(request.subject).ok_or(MailError::MissingFields)?;
        let html = non_empty(request.html);
        let text = non_empty(request.text);
        if html.is_none() && text.is_none() {
            return Err(MailError::MissingFields);
        }

        if !is_valid_email(&to) {
            return Err(MailError::InvalidEmail);
        }

        if !self.configured {
            warn!("Email credentials not configured");
            return Err(MailError::NotConfigured);
        }

        let text = match (text, &html) {
            (Some(text), _) => text,
            (None, Some(html)) => strip_tags(html),
            (None, None) => String::new(),
        };

        let email = OutgoingEmail {
            from: self.sender.clone(),
            to,
            subject,
            html,
            text,
        };

        self.transport.verify().await?;
        let message_id = self.transport.send(&email).await?;

        info!("Email sent to {} (message id: {:?})", email.to, message_id);
        Ok(EmailResponse::sent(message_id))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
