//! Client for the remote newsletter API that stores subscriptions.

use crate::{configuration::NewsletterSettings, domain::SubscriberEmail};
use chrono::{SecondsFormat, Utc};
use reqwest::{Client, StatusCode, Url};

/// Message shown when an error carries no text of its own.
pub const FALLBACK_ERROR_MESSAGE: &str = "Failed to subscribe. Please try again.";

#[derive(Debug)]
pub struct SubscriptionClient {
    endpoint: Option<Url>,
    http_client: Client,
}

impl SubscriptionClient {
    /// Create a new subscription client. Without an endpoint every call to
    /// [`SubscriptionClient::subscribe`] fails before touching the network.
    pub fn new(endpoint: Option<Url>) -> Self {
        Self {
            endpoint,
            http_client: Client::new(),
        }
    }

    /// Post the email to the configured endpoint. Only the status code decides
    /// whether the subscription succeeded; the JSON body is handed back as is.
    #[tracing::instrument(
        name = "Posting subscription to the newsletter API",
        skip(self, email),
        fields(subscriber_email = %email)
    )]
    pub async fn subscribe(
        &self,
        email: &SubscriberEmail,
    ) -> Result<serde_json::Value, SubscribeError> {
        let endpoint = self
            .endpoint
            .as_ref()
            .ok_or(SubscribeError::EndpointNotConfigured)?;
        let request_body = SubscribeRequest {
            email: email.as_ref(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        };

        let response = self
            .http_client
            .post(endpoint.clone())
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SubscribeError::UnexpectedStatus(status));
        }

        Ok(response.json().await?)
    }
}

impl TryFrom<&NewsletterSettings> for SubscriptionClient {
    type Error = String;

    fn try_from(config: &NewsletterSettings) -> Result<Self, Self::Error> {
        let endpoint = config.endpoint().map_err(|e| {
            tracing::error!("Unable to parse the newsletter API endpoint: {e}");
            "Newsletter API endpoint is invalid".to_string()
        })?;
        if endpoint.is_none() {
            tracing::warn!("Newsletter API endpoint is not configured");
        }

        Ok(Self::new(endpoint))
    }
}

#[derive(Debug, serde::Serialize)]
struct SubscribeRequest<'a> {
    email: &'a str,
    timestamp: String,
}

/// Everything that can go wrong while submitting a subscription.
#[derive(thiserror::Error)]
pub enum SubscribeError {
    #[error("{0}")]
    InvalidEmail(String),
    #[error("Newsletter API endpoint not configured")]
    EndpointNotConfigured,
    #[error("HTTP error! status: {}", .0.as_u16())]
    UnexpectedStatus(StatusCode),
    #[error(transparent)]
    Request(#[from] reqwest::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Configuration,
    Request,
}

impl SubscribeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidEmail(_) => ErrorKind::Validation,
            Self::EndpointNotConfigured => ErrorKind::Configuration,
            Self::UnexpectedStatus(_) | Self::Request(_) => ErrorKind::Request,
        }
    }

    /// Text shown next to the email input.
    pub fn display_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            FALLBACK_ERROR_MESSAGE.to_string()
        } else {
            message
        }
    }
}
