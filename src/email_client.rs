//! src/email_client.rs

use crate::configuration::EmailClientSettings;
use crate::domain::SubscriberEmail;
use anyhow::Context;
use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use secrecy::ExposeSecret;

/// Anything able to deliver one message to one recipient.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_email(
        &self,
        recipient: &SubscriberEmail,
        subject: &str,
        html_content: &str,
        text_content: &str,
    ) -> Result<(), anyhow::Error>;

    /// Whether the mail server accepts connections at all.
    async fn test_connection(&self) -> Result<bool, anyhow::Error>;
}

/// SMTP mailer.
pub struct EmailClient {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
}

impl EmailClient {
    pub fn new(
        transport: AsyncSmtpTransport<Tokio1Executor>,
        sender: SubscriberEmail,
        sender_name: Option<String>,
    ) -> Result<Self, anyhow::Error> {
        let address: Address = sender
            .as_ref()
            .parse()
            .context("Invalid sender email address")?;
        Ok(Self {
            transport,
            sender: Mailbox::new(sender_name, address),
        })
    }

    pub fn from_settings(settings: &EmailClientSettings) -> Result<Self, anyhow::Error> {
        let credentials = Credentials::new(
            settings.username.clone(),
            settings.password.expose_secret().clone(),
        );
        let builder = if settings.require_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.smtp_host)
                .context("Failed to create SMTP transport")?
                .credentials(credentials)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.smtp_host)
        };
        let transport = builder
            .port(settings.smtp_port)
            .timeout(Some(settings.timeout()))
            .build();
        Self::new(
            transport,
            settings.sender()?,
            Some(settings.sender_name.clone()),
        )
    }

    fn build_message(
        &self,
        recipient: &SubscriberEmail,
        subject: &str,
        html_content: &str,
        text_content: &str,
    ) -> Result<Message, anyhow::Error> {
        let to: Mailbox = recipient
            .as_ref()
            .parse()
            .context("Invalid recipient email address")?;
        Message::builder()
            .from(self.sender.clone())
            .to(to)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_content.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_content.to_string()),
                    ),
            )
            .context("Failed to build email message")
    }
}

#[async_trait]
impl Mailer for EmailClient {
    #[tracing::instrument(
        name = "Send email via SMTP",
        skip(self, html_content, text_content),
        fields(recipient = %recipient)
    )]
    async fn send_email(
        &self,
        recipient: &SubscriberEmail,
        subject: &str,
        html_content: &str,
        text_content: &str,
    ) -> Result<(), anyhow::Error> {
        let message = self.build_message(recipient, subject, html_content, text_content)?;
        self.transport
            .send(message)
            .await
            .context("Failed to send email via SMTP")?;
        Ok(())
    }

    #[tracing::instrument(name = "Test SMTP connection", skip_all)]
    async fn test_connection(&self) -> Result<bool, anyhow::Error> {
        self.transport
            .test_connection()
            .await
            .context("Failed to connect to the SMTP server")
    }
}
