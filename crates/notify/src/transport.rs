use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use rexchat_core::config::NotificationConfig;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OutboundEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("mail relay could not be reached: {0}")]
    Connect(String),
    #[error("mail relay rejected message with status {status}: {detail}")]
    Rejected { status: u16, detail: String },
}

#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> Result<(), TransportError>;
}

/// Development transport: logs the envelope and reports success.
#[derive(Default)]
pub struct LogOnlyTransport;

#[async_trait]
impl MailTransport for LogOnlyTransport {
    async fn send(&self, email: &OutboundEmail) -> Result<(), TransportError> {
        info!(
            event_name = "notify.transport.logged",
            to = %email.to,
            subject = %email.subject,
            html_bytes = email.html.len(),
            "mail relay not configured; message logged only"
        );
        Ok(())
    }
}

/// Posts `{from, to, subject, html}` as JSON to an HTTP mail relay.
pub struct HttpRelayTransport {
    client: Client,
    relay_url: String,
    token: Option<SecretString>,
}

impl HttpRelayTransport {
    pub fn new(
        relay_url: impl Into<String>,
        token: Option<SecretString>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| TransportError::Connect(error.to_string()))?;
        Ok(Self { client, relay_url: relay_url.into(), token })
    }
}

#[async_trait]
impl MailTransport for HttpRelayTransport {
    async fn send(&self, email: &OutboundEmail) -> Result<(), TransportError> {
        let mut request = self.client.post(&self.relay_url).json(email);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response =
            request.send().await.map_err(|error| TransportError::Connect(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(TransportError::Rejected { status: status.as_u16(), detail });
        }

        info!(
            event_name = "notify.transport.relayed",
            to = %email.to,
            subject = %email.subject,
            "message handed to mail relay"
        );
        Ok(())
    }
}

/// Relay when a URL is configured, log-only otherwise.
pub fn transport_from_config(
    config: &NotificationConfig,
) -> Result<Arc<dyn MailTransport>, TransportError> {
    match config.relay_url.as_deref() {
        Some(url) => Ok(Arc::new(HttpRelayTransport::new(
            url,
            config.relay_token.clone(),
            Duration::from_secs(config.timeout_secs),
        )?)),
        None => Ok(Arc::new(LogOnlyTransport)),
    }
}
