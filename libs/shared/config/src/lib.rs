use std::env;
use tracing::warn;

pub const DEFAULT_MAIL_RELAY_URL: &str = "https://api.mailrelay.local/v1/send";
pub const DEFAULT_SESSION_STORE_PATH: &str = ".session.json";
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the turnos collection, e.g. `https://backend/api/turno`.
    pub api_turno_url: String,
    pub api_service_url: String,
    pub api_user_url: String,
    pub email_user: String,
    pub email_pass: String,
    pub mail_relay_url: String,
    pub session_store_path: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            api_turno_url: required_url("API_TURNO"),
            api_service_url: required_url("API_SERVICE"),
            api_user_url: required_url("API_USER"),
            email_user: env::var("EMAIL_USER")
                .unwrap_or_else(|_| {
                    warn!("EMAIL_USER not set, email delivery disabled");
                    String::new()
                }),
            email_pass: env::var("EMAIL_PASS")
                .unwrap_or_else(|_| {
                    warn!("EMAIL_PASS not set, email delivery disabled");
                    String::new()
                }),
            mail_relay_url: env::var("MAIL_RELAY_URL")
                .unwrap_or_else(|_| {
                    warn!("MAIL_RELAY_URL not set, using default");
                    DEFAULT_MAIL_RELAY_URL.to_string()
                }),
            session_store_path: env::var("SESSION_STORE_PATH")
                .unwrap_or_else(|_| DEFAULT_SESSION_STORE_PATH.to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing backend URLs");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.api_turno_url.is_empty()
            && !self.api_service_url.is_empty()
            && !self.api_user_url.is_empty()
    }

    pub fn is_email_configured(&self) -> bool {
        !self.email_user.is_empty() && !self.email_pass.is_empty()
    }
}

// Trailing slashes are dropped so paths can be appended with `format!("{}/...")`.
fn required_url(key: &str) -> String {
    env::var(key)
        .map(|v| v.trim_end_matches('/').to_string())
        .unwrap_or_else(|_| {
            warn!("{} not set, using empty value", key);
            String::new()
        })
}
