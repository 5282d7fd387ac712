use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, error};

use shared_config::AppConfig;

use crate::models::{MailError, OutgoingEmail};

/// Delivery backend for outgoing mail.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Check credentials and reachability before sending.
    async fn verify(&self) -> Result<(), MailError>;

    /// Deliver one message, returning the provider's message id when it
    /// reports one.
    async fn send(&self, email: &OutgoingEmail) -> Result<Option<String>, MailError>;
}

/// HTTP mail relay authenticated with the account's user and app password.
pub struct HttpMailRelay {
    client: Client,
    url: String,
    user: String,
    pass: String,
}

impl HttpMailRelay {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            url: config.mail_relay_url.clone(),
            user: config.email_user.clone(),
            pass: config.email_pass.clone(),
        }
    }

    fn classify_status(status: StatusCode, body: String) -> MailError {
        error!("Mail relay answered {}: {}", status, body);
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => MailError::Auth(body),
            StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT => {
                MailError::Connection(body)
            }
            _ => MailError::Other(if body.is_empty() { status.to_string() } else { body }),
        }
    }
}

fn transport_error(err: reqwest::Error) -> MailError {
    error!("Mail relay request failed: {}", err);
    if err.is_connect() || err.is_timeout() {
        MailError::Connection(err.to_string())
    } else {
        MailError::Other(err.to_string())
    }
}

#[async_trait]
impl MailTransport for HttpMailRelay {
    async fn verify(&self) -> Result<(), MailError> {
        debug!("Verifying mail relay at {}", self.url);

        let response = self.client
            .get(&self.url)
            .basic_auth(&self.user, Some(&self.pass))
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(Self::classify_status(status, body))
    }

    async fn send(&self, email: &OutgoingEmail) -> Result<Option<String>, MailError> {
        debug!("Sending email to {} via relay", email.to);

        let response = self.client
            .post(&self.url)
            .basic_auth(&self.user, Some(&self.pass))
            .json(email)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;
        if !status.is_success() {
            return Err(Self::classify_status(status, body));
        }

        // The relay reports the id as `messageId` or `id`; an empty body is fine.
        let message_id = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| {
                v.get("messageId")
                    .or_else(|| v.get("id"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
            });

        Ok(message_id)
    }
}
