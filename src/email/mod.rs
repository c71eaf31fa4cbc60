mod ses_email_client;

use crate::domain::RecipientEmail;
use async_trait::async_trait;
pub use ses_email_client::SesEmailClient;

/// Sends one message to every recipient in `recipients` and returns the
/// provider's message id.
#[async_trait]
pub trait Email: Send + Sync {
    async fn send_email(
        &self,
        recipients: &[RecipientEmail],
        subject: &str,
        html_content: &str,
        text_content: &str,
    ) -> Result<String, anyhow::Error>;
}
