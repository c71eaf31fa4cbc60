use crate::configuration::EmailClientSettings;
use crate::domain::RecipientEmail;
use crate::email::Email;
use anyhow::{anyhow, Context};
use async_trait::async_trait;
use aws_config::timeout::TimeoutConfig;
use aws_config::Region;
use aws_sdk_sesv2 as ses;
use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message};

pub struct SesEmailClient {
    ses_client: ses::Client,
    sender: RecipientEmail,
    blind_copy: bool,
}

impl SesEmailClient {
    pub fn new(ses_client: ses::Client, sender: RecipientEmail, blind_copy: bool) -> Self {
        Self {
            ses_client,
            sender,
            blind_copy,
        }
    }

    /// Loads credentials and region from the environment, applying the
    /// configured per-call timeout.
    pub async fn from_settings(settings: &EmailClientSettings) -> Result<Self, anyhow::Error> {
        let sender = settings.sender().map_err(|e| anyhow!(e))?;
        let timeout_config = TimeoutConfig::builder()
            .operation_timeout(settings.timeout())
            .build();
        let mut loader = aws_config::from_env().timeout_config(timeout_config);
        if let Some(region) = &settings.region {
            loader = loader.region(Region::new(region.clone()));
        }
        let shared_config = loader.load().await;
        Ok(Self::new(
            ses::Client::new(&shared_config),
            sender,
            settings.blind_copy,
        ))
    }

    fn destination(&self, recipients: &[RecipientEmail]) -> Destination {
        let addresses: Vec<String> = recipients.iter().map(|r| r.as_ref().to_string()).collect();
        if self.blind_copy {
            Destination::builder()
                .to_addresses(self.sender.as_ref())
                .set_bcc_addresses(Some(addresses))
                .build()
        } else {
            Destination::builder().set_to_addresses(Some(addresses)).build()
        }
    }
}

fn utf8_content(data: &str) -> Result<Content, anyhow::Error> {
    Content::builder()
        .data(data)
        .charset("UTF-8")
        .build()
        .context("Failed to build email content.")
}

#[async_trait]
impl Email for SesEmailClient {
    #[tracing::instrument(
        name = "Sending an email through SES",
        skip(self, recipients, html_content, text_content),
        fields(recipient_count = recipients.len())
    )]
    async fn send_email(
        &self,
        recipients: &[RecipientEmail],
        subject: &str,
        html_content: &str,
        text_content: &str,
    ) -> Result<String, anyhow::Error> {
        let body = Body::builder()
            .html(utf8_content(html_content)?)
            .text(utf8_content(text_content)?)
            .build();
        let message = Message::builder()
            .subject(utf8_content(subject)?)
            .body(body)
            .build();
        let content = EmailContent::builder().simple(message).build();

        let output = self
            .ses_client
            .send_email()
            .from_email_address(self.sender.as_ref())
            .destination(self.destination(recipients))
            .content(content)
            .send()
            .await
            .context("SES rejected the send request.")?;
        Ok(output.message_id().unwrap_or_default().to_string())
    }
}
