use std::error::Error as StdError;
use std::io;
use std::time::Duration;

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, MultiPart},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Serialize;

use crate::{
    application::use_cases::notification::{
        DeliveryFailure, EmailProviderConfig, EmailTransport, FailureCause, OutgoingEmail,
        SendGridSettings, SmtpSettings,
    },
    infra::http_client,
};

const SENDGRID_SEND_URL: &str = "https://api.sendgrid.com/v3/mail/send";
const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Delivers email through the provider named in the resolved settings.
/// A new SMTP connection is opened per attempt since settings can change at any time.
#[derive(Clone)]
pub struct ProviderEmailTransport {
    client: Client,
}

impl ProviderEmailTransport {
    pub fn new() -> Self {
        Self {
            client: http_client::build_client(),
        }
    }

    async fn send_smtp(&self, smtp: &SmtpSettings, email: &OutgoingEmail) -> Result<(), DeliveryFailure> {
        let message = build_smtp_message(smtp, email)?;

        let builder = if smtp.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&smtp.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)
        };
        let builder = builder.map_err(|e| {
            DeliveryFailure::new(FailureCause::Rejected, format!("Invalid SMTP host: {e}"))
        })?;

        let mailer = builder
            .port(smtp.port)
            .credentials(Credentials::new(
                smtp.username.clone(),
                smtp.password.expose_secret().to_string(),
            ))
            .timeout(Some(SMTP_TIMEOUT))
            .build();

        mailer
            .send(message)
            .await
            .map(|_| ())
            .map_err(|e| DeliveryFailure::new(classify_smtp_error(&e), e.to_string()))
    }

    async fn send_sendgrid(
        &self,
        sendgrid: &SendGridSettings,
        email: &OutgoingEmail,
    ) -> Result<(), DeliveryFailure> {
        let response = self
            .client
            .post(SENDGRID_SEND_URL)
            .bearer_auth(sendgrid.api_key.expose_secret())
            .json(&SendGridRequest::new(sendgrid, email))
            .send()
            .await
            .map_err(|e| DeliveryFailure::new(classify_reqwest_error(&e), e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(DeliveryFailure::new(
            FailureCause::Status(status.as_u16()),
            format!("SendGrid returned HTTP {}: {}", status.as_u16(), body),
        ))
    }
}

impl Default for ProviderEmailTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmailTransport for ProviderEmailTransport {
    async fn send(
        &self,
        config: &EmailProviderConfig,
        email: &OutgoingEmail,
    ) -> Result<(), DeliveryFailure> {
        match config {
            EmailProviderConfig::Smtp(smtp) => self.send_smtp(smtp, email).await,
            EmailProviderConfig::SendGrid(sendgrid) => self.send_sendgrid(sendgrid, email).await,
        }
    }
}

// ============================================================================
// Message building
// ============================================================================

fn mailbox(name: Option<&str>, address: &str) -> Result<Mailbox, DeliveryFailure> {
    let address = address.parse().map_err(|_| {
        DeliveryFailure::new(FailureCause::Rejected, format!("Invalid email address: {address}"))
    })?;
    Ok(Mailbox::new(name.map(str::to_string), address))
}

fn build_smtp_message(smtp: &SmtpSettings, email: &OutgoingEmail) -> Result<Message, DeliveryFailure> {
    Message::builder()
        .from(mailbox(smtp.from_name.as_deref(), &smtp.from_email)?)
        .to(mailbox(None, &email.to)?)
        .subject(email.subject.as_str())
        .multipart(MultiPart::alternative_plain_html(
            email.text.clone(),
            email.html.clone(),
        ))
        .map_err(|e| DeliveryFailure::new(FailureCause::Rejected, format!("Failed to build message: {e}")))
}

#[derive(Serialize)]
struct SendGridAddress<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Serialize)]
struct SendGridPersonalization<'a> {
    to: [SendGridAddress<'a>; 1],
}

#[derive(Serialize)]
struct SendGridContent<'a> {
    #[serde(rename = "type")]
    content_type: &'static str,
    value: &'a str,
}

#[derive(Serialize)]
struct SendGridRequest<'a> {
    personalizations: [SendGridPersonalization<'a>; 1],
    from: SendGridAddress<'a>,
    subject: &'a str,
    content: [SendGridContent<'a>; 2],
}

impl<'a> SendGridRequest<'a> {
    fn new(sendgrid: &'a SendGridSettings, email: &'a OutgoingEmail) -> Self {
        Self {
            personalizations: [SendGridPersonalization {
                to: [SendGridAddress {
                    email: &email.to,
                    name: None,
                }],
            }],
            from: SendGridAddress {
                email: &sendgrid.from_email,
                name: sendgrid.from_name.as_deref(),
            },
            subject: &email.subject,
            content: [
                SendGridContent {
                    content_type: "text/plain",
                    value: &email.text,
                },
                SendGridContent {
                    content_type: "text/html",
                    value: &email.html,
                },
            ],
        }
    }
}

// ============================================================================
// Failure classification
// ============================================================================

fn find_io_error<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a io::Error> {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(io_err) = e.downcast_ref::<io::Error>() {
            return Some(io_err);
        }
        current = e.source();
    }
    None
}

fn classify_io_error(err: &io::Error) -> FailureCause {
    match err.kind() {
        io::ErrorKind::TimedOut => FailureCause::Timeout,
        io::ErrorKind::ConnectionRefused => FailureCause::ConnectionRefused,
        io::ErrorKind::ConnectionReset | io::ErrorKind::ConnectionAborted | io::ErrorKind::BrokenPipe => {
            FailureCause::ConnectionReset
        }
        _ if is_dns_message(&err.to_string()) => FailureCause::DnsLookup,
        _ => FailureCause::Connect,
    }
}

fn is_dns_message(message: &str) -> bool {
    let message = message.to_lowercase();
    message.contains("failed to lookup")
        || message.contains("dns error")
        || message.contains("name or service not known")
        || message.contains("no such host")
}

/// SMTP replies (4xx and 5xx) are final; only failures to reach the server retry.
fn classify_smtp_error(err: &SmtpError) -> FailureCause {
    if err.is_timeout() {
        return FailureCause::Timeout;
    }
    if err.is_permanent() || err.is_transient() || err.is_client() {
        return FailureCause::Rejected;
    }
    match find_io_error(err) {
        Some(io_err) => classify_io_error(io_err),
        None if is_dns_message(&err.to_string()) => FailureCause::DnsLookup,
        None => FailureCause::Connect,
    }
}

fn classify_reqwest_error(err: &reqwest::Error) -> FailureCause {
    if err.is_timeout() {
        return FailureCause::Timeout;
    }
    if let Some(status) = err.status() {
        return FailureCause::Status(status.as_u16());
    }
    match find_io_error(err) {
        Some(io_err) => classify_io_error(io_err),
        None if is_dns_message(&format!("{err:?}")) => FailureCause::DnsLookup,
        None if err.is_connect() || err.is_request() => FailureCause::Connect,
        None => FailureCause::Rejected,
    }
}
