use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::SecretString;

use crate::app_error::{AppError, AppResult};
use crate::application::use_cases::settings::{SettingsMap, SettingsUseCases};
use crate::domain::entities::email_provider::EmailProviderKind;

// ============================================================================
// Constants
// ============================================================================

pub const MAX_SEND_ATTEMPTS: u32 = 3;

/// Wait before attempt n+1 is `SEND_RETRY_DELAYS[n-1]`. With three attempts the
/// last entry is never reached; it only applies if `MAX_SEND_ATTEMPTS` grows.
pub const SEND_RETRY_DELAYS: [Duration; 3] = [
    Duration::from_secs(5),
    Duration::from_secs(15),
    Duration::from_secs(45),
];

pub const DEFAULT_SENDGRID_FROM: &str = "noreply@lawnies.com.au";

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
    /// Implicit TLS when true, otherwise a plain connection upgraded with STARTTLS.
    pub use_tls: bool,
    pub from_email: String,
    pub from_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SendGridSettings {
    pub api_key: SecretString,
    pub from_email: String,
    pub from_name: Option<String>,
}

/// Provider configuration resolved from the `email` settings category.
#[derive(Debug, Clone)]
pub enum EmailProviderConfig {
    Smtp(SmtpSettings),
    SendGrid(SendGridSettings),
}

fn non_empty<'a>(settings: &'a SettingsMap, key: &str) -> Option<&'a str> {
    settings
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

impl EmailProviderConfig {
    pub fn from_settings(settings: &SettingsMap) -> AppResult<Self> {
        let provider = non_empty(settings, "provider")
            .ok_or_else(|| AppError::Configuration("Email settings not configured".into()))?;
        let kind: EmailProviderKind = provider.parse().map_err(AppError::Configuration)?;
        let from_name = non_empty(settings, "from_name").map(str::to_string);

        match kind {
            EmailProviderKind::Smtp => {
                let incomplete = || AppError::Configuration("SMTP settings incomplete".into());
                let host = non_empty(settings, "smtp_host").ok_or_else(incomplete)?;
                let port = non_empty(settings, "smtp_port")
                    .and_then(|p| p.parse::<u16>().ok())
                    .ok_or_else(incomplete)?;
                let username = non_empty(settings, "smtp_username").ok_or_else(incomplete)?;
                let password = settings
                    .get("smtp_password")
                    .filter(|p| !p.is_empty())
                    .ok_or_else(incomplete)?;

                Ok(EmailProviderConfig::Smtp(SmtpSettings {
                    host: host.to_string(),
                    port,
                    username: username.to_string(),
                    password: SecretString::from(password.clone()),
                    use_tls: non_empty(settings, "smtp_use_tls") == Some("true"),
                    from_email: non_empty(settings, "from_email").unwrap_or(username).to_string(),
                    from_name,
                }))
            }
            EmailProviderKind::SendGrid => {
                let api_key = non_empty(settings, "sendgrid_api_key").ok_or_else(|| {
                    AppError::Configuration("SendGrid API key not configured".into())
                })?;

                Ok(EmailProviderConfig::SendGrid(SendGridSettings {
                    api_key: SecretString::from(api_key.to_string()),
                    from_email: non_empty(settings, "from_email")
                        .unwrap_or(DEFAULT_SENDGRID_FROM)
                        .to_string(),
                    from_name,
                }))
            }
        }
    }

    pub fn kind(&self) -> EmailProviderKind {
        match self {
            EmailProviderConfig::Smtp(_) => EmailProviderKind::Smtp,
            EmailProviderConfig::SendGrid(_) => EmailProviderKind::SendGrid,
        }
    }

    fn smtp_endpoint(&self) -> (Option<&str>, Option<u16>) {
        match self {
            EmailProviderConfig::Smtp(smtp) => (Some(smtp.host.as_str()), Some(smtp.port)),
            EmailProviderConfig::SendGrid(_) => (None, None),
        }
    }
}

/// Why a single delivery attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCause {
    Timeout,
    ConnectionRefused,
    ConnectionReset,
    DnsLookup,
    /// Any other failure to establish a connection.
    Connect,
    /// The provider answered with a non-success HTTP status.
    Status(u16),
    /// The provider refused the message (bad credentials, invalid address, etc).
    Rejected,
}

impl FailureCause {
    pub fn is_transient(&self) -> bool {
        match self {
            FailureCause::Timeout
            | FailureCause::ConnectionRefused
            | FailureCause::ConnectionReset
            | FailureCause::DnsLookup
            | FailureCause::Connect => true,
            FailureCause::Status(code) => matches!(code, 429 | 500 | 502 | 503 | 504),
            FailureCause::Rejected => false,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            FailureCause::Timeout => "timeout",
            FailureCause::ConnectionRefused => "connection_refused",
            FailureCause::ConnectionReset => "connection_reset",
            FailureCause::DnsLookup => "dns_lookup",
            FailureCause::Connect => "connect",
            FailureCause::Status(_) => "http_status",
            FailureCause::Rejected => "rejected",
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            FailureCause::Status(code) => Some(*code),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DeliveryFailure {
    pub cause: FailureCause,
    pub detail: String,
}

impl DeliveryFailure {
    pub fn new(cause: FailureCause, detail: impl Into<String>) -> Self {
        Self {
            cause,
            detail: detail.into(),
        }
    }
}

impl std::fmt::Display for DeliveryFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.detail, self.cause.code())
    }
}

#[async_trait]
pub trait EmailTransport: Send + Sync {
    /// One delivery attempt, no retries.
    async fn send(
        &self,
        config: &EmailProviderConfig,
        email: &OutgoingEmail,
    ) -> Result<(), DeliveryFailure>;
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delays: Vec<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_SEND_ATTEMPTS,
            delays: SEND_RETRY_DELAYS.to_vec(),
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after a failed `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let idx = attempt.saturating_sub(1) as usize;
        self.delays
            .get(idx)
            .or_else(|| self.delays.last())
            .copied()
            .unwrap_or_default()
    }
}

// ============================================================================
// Use Cases
// ============================================================================

/// Sends transactional email through whichever provider is configured in
/// settings at call time, retrying transient failures.
#[derive(Clone)]
pub struct NotificationUseCases {
    settings: Arc<SettingsUseCases>,
    transport: Arc<dyn EmailTransport>,
    retry: RetryPolicy,
}

impl NotificationUseCases {
    pub fn new(settings: Arc<SettingsUseCases>, transport: Arc<dyn EmailTransport>) -> Self {
        Self::with_retry_policy(settings, transport, RetryPolicy::default())
    }

    pub fn with_retry_policy(
        settings: Arc<SettingsUseCases>,
        transport: Arc<dyn EmailTransport>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            settings,
            transport,
            retry,
        }
    }

    pub async fn provider_config(&self) -> AppResult<EmailProviderConfig> {
        self.settings.email_settings().await
    }

    /// Send one email. Emits exactly one log event per attempt.
    pub async fn send(&self, email: &OutgoingEmail) -> AppResult<()> {
        let config = self.provider_config().await.inspect_err(|err| {
            tracing::error!(
                service = "email",
                outcome = "failed",
                recipient = %email.to,
                subject = %email.subject,
                error = %err,
                "Email provider not configured"
            );
        })?;
        let provider = config.kind().as_str();
        let (smtp_host, smtp_port) = config.smtp_endpoint();

        let mut attempt = 1;
        loop {
            let failure = match self.transport.send(&config, email).await {
                Ok(()) => {
                    tracing::info!(
                        service = "email",
                        outcome = "sent",
                        provider,
                        smtp_host,
                        smtp_port,
                        recipient = %email.to,
                        subject = %email.subject,
                        attempt,
                        "Email sent successfully"
                    );
                    return Ok(());
                }
                Err(failure) => failure,
            };

            let transient = failure.cause.is_transient();
            if transient && attempt < self.retry.max_attempts {
                let delay = self.retry.delay_after(attempt);
                tracing::warn!(
                    service = "email",
                    outcome = "retrying",
                    provider,
                    smtp_host,
                    smtp_port,
                    recipient = %email.to,
                    subject = %email.subject,
                    attempt,
                    error = %failure.detail,
                    error_code = failure.cause.code(),
                    error_status = failure.cause.status(),
                    retry_in_ms = delay.as_millis() as u64,
                    "Email send failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }

            tracing::error!(
                service = "email",
                outcome = "failed",
                provider,
                smtp_host,
                smtp_port,
                recipient = %email.to,
                subject = %email.subject,
                attempt,
                error = %failure.detail,
                error_code = failure.cause.code(),
                error_status = failure.cause.status(),
                "Email send failed permanently"
            );

            return Err(if transient {
                AppError::TransientDelivery(failure.to_string())
            } else {
                AppError::PermanentDelivery(failure.to_string())
            });
        }
    }
}
