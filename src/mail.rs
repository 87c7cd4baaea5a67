use crate::config::MailConfig;
use actix_web::web;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;

pub const OTP_SUBJECT: &str = "StudentHub Email Verification OTP";

#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Plain-text verification mail carrying the signup OTP.
pub fn otp_mail(to: &str, otp: &str) -> OutgoingMail {
    OutgoingMail {
        to: to.to_string(),
        subject: OTP_SUBJECT.to_string(),
        body: format!("Your OTP for StudentHub is: {}", otp),
    }
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid mail address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("could not build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("smtp error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError>;
}

/// Mailer backed by an authenticated SMTP relay.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Builds the transport. No connection is made until the first send.
    pub fn new(config: &MailConfig) -> Result<Self, MailError> {
        let from: Mailbox = config.from.parse()?;
        let builder = if config.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.server)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.server)?
        };

        let transport = builder
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self {
            transport,
            from,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(mail.to.parse()?)
            .subject(mail.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(mail.body)?;

        self.transport.send(message).await?;
        Ok(())
    }
}

/// Sends the OTP mail on a spawned task. Failures are logged; the caller
/// has already answered the request.
pub fn send_otp_in_background(mailer: web::Data<dyn Mailer>, email: String, otp: String) {
    actix_web::rt::spawn(async move {
        match mailer.send(otp_mail(&email, &otp)).await {
            Ok(()) => tracing::info!(event = "otp_mail_sent", to = %email, "OTP mail sent"),
            Err(e) => {
                tracing::error!(event = "otp_mail_failed", to = %email, error = %e, "Failed to send OTP mail")
            }
        }
    });
}
