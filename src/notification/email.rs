use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    address::AddressError,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use thiserror::Error;
use tracing::info;

use crate::config::SmtpConfig;

#[derive(Error, Debug)]
pub enum EmailError {
    #[error("invalid address: {0}")]
    Address(#[from] AddressError),

    #[error("failed to build message: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("smtp error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    sales_to: Mailbox,
}

impl Mailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, EmailError> {
        let creds = Credentials::new(config.username.clone(), config.password.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .port(config.port)
            .credentials(creds)
            .build();

        Ok(Self {
            transport,
            from: Mailbox::new(Some("FASTag Support".to_owned()), config.from.parse()?),
            sales_to: Mailbox::new(Some("Sales".to_owned()), config.sales_to.parse()?),
        })
    }

    pub async fn send_html(
        &self,
        to: &str,
        name: Option<&str>,
        subject: &str,
        html: String,
    ) -> Result<(), EmailError> {
        let to = Mailbox::new(name.map(str::to_owned), to.trim().parse()?);
        self.deliver(to, subject, html).await
    }

    pub async fn send_to_sales(&self, subject: &str, html: String) -> Result<(), EmailError> {
        self.deliver(self.sales_to.clone(), subject, html).await
    }

    async fn deliver(&self, to: Mailbox, subject: &str, html: String) -> Result<(), EmailError> {
        let recipient = to.email.to_string();

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html)?;

        self.transport.send(message).await?;

        info!(to = %recipient, subject, "email sent");

        Ok(())
    }
}
