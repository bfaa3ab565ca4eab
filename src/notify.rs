use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_ses::{
    error::DisplayErrorContext,
    types::{Body, Content, Destination, Message},
    Client as SesClient,
};
use tracing::debug;

use crate::age::AgeThreshold;

pub const EXPIRY_SUBJECT: &str = "Secret Key Expiration Warning";

/// Plain-text warning sent to the owner of a stale key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiryMessage {
    pub subject: String,
    pub body: String,
}

impl ExpiryMessage {
    pub fn for_threshold(threshold: AgeThreshold) -> Self {
        Self {
            subject: EXPIRY_SUBJECT.to_string(),
            body: format!(
                "Your secret keys are older than {threshold} days and will be deleted."
            ),
        }
    }
}

/// Delivers a single message to a single recipient.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, to: &str, message: &ExpiryMessage) -> Result<()>;
}

/// [`Notifier`] backed by SES `SendEmail`.
#[derive(Debug, Clone)]
pub struct SesNotifier {
    client: SesClient,
    from_address: String,
}

impl SesNotifier {
    pub fn new(config: &SdkConfig, from_address: impl Into<String>) -> Self {
        Self::from_client(SesClient::new(config), from_address)
    }

    pub fn from_client(client: SesClient, from_address: impl Into<String>) -> Self {
        Self { client, from_address: from_address.into() }
    }

    pub fn from_address(&self) -> &str {
        &self.from_address
    }
}

#[async_trait]
impl Notifier for SesNotifier {
    async fn send(&self, to: &str, message: &ExpiryMessage) -> Result<()> {
        let subject = Content::builder()
            .data(&message.subject)
            .build()
            .context("Failed to build email subject")?;
        let text = Content::builder()
            .data(&message.body)
            .build()
            .context("Failed to build email body")?;
        let email = Message::builder().subject(subject).body(Body::builder().text(text).build()).build();

        let resp = self
            .client
            .send_email()
            .source(&self.from_address)
            .destination(Destination::builder().to_addresses(to).build())
            .message(email)
            .send()
            .await
            .map_err(|err| anyhow!("ses:SendEmail to {to} failed: {}", DisplayErrorContext(&err)))?;

        debug!("ses:SendEmail to {to} accepted as message {}", resp.message_id());
        Ok(())
    }
}
