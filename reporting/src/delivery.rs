//! Email delivery of report artifacts
//!
//! # Configuration
//! Set `SENDER_EMAIL`, `SENDER_PASSWORD` and `RECEIVER_EMAIL`. Missing values
//! skip delivery instead of failing the run. The relay defaults to
//! `smtp.gmail.com:465` (implicit TLS); any other port uses STARTTLS.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDate;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::render::REPORT_TITLE;

/// Implicit-TLS submission port
pub const SMTPS_PORT: u16 = 465;

const BODY: &str = "Hello,\n\n\
    Please find attached today's company performance report and the metrics spreadsheet.\n\n\
    This message was generated automatically.\n";

/// Errors raised while composing or sending a message
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("Invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("Invalid content type: {0}")]
    ContentType(String),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Result of the delivery step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Message accepted by the relay with these attachments
    Sent { attached: Vec<PathBuf> },
    /// Configuration incomplete; nothing was sent
    Skipped(String),
    /// Composition or transport failed
    Failed(String),
}

/// Mail settings; credentials come from the environment only
#[derive(Clone, Default)]
pub struct MailSettings {
    pub sender: Option<String>,
    pub password: Option<String>,
    pub recipient: Option<String>,
    pub smtp_host: String,
    pub smtp_port: u16,
}

impl std::fmt::Debug for MailSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailSettings")
            .field("sender", &self.sender)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("recipient", &self.recipient)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .finish()
    }
}

impl MailSettings {
    /// Read SENDER_EMAIL, SENDER_PASSWORD and RECEIVER_EMAIL
    pub fn from_env(smtp_host: impl Into<String>, smtp_port: u16) -> Self {
        fn var(name: &str) -> Option<String> {
            std::env::var(name).ok().filter(|v| !v.trim().is_empty())
        }

        Self {
            sender: var("SENDER_EMAIL"),
            password: var("SENDER_PASSWORD"),
            recipient: var("RECEIVER_EMAIL"),
            smtp_host: smtp_host.into(),
            smtp_port,
        }
    }

    /// Names of the required variables that are not set
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.sender.is_none() {
            missing.push("SENDER_EMAIL");
        }
        if self.password.is_none() {
            missing.push("SENDER_PASSWORD");
        }
        if self.recipient.is_none() {
            missing.push("RECEIVER_EMAIL");
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }
}

/// Something that can submit a composed message
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, message: Message) -> Result<(), DeliveryError>;
}

/// Authenticated SMTP relay over TLS
pub struct SmtpRelay {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpRelay {
    pub fn new(host: &str, port: u16, username: &str, password: &str) -> Result<Self, DeliveryError> {
        let builder = if port == SMTPS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?
        };

        let transport = builder
            .port(port)
            .credentials(Credentials::new(username.to_string(), password.to_string()))
            .build();

        Ok(Self { transport })
    }
}

#[async_trait]
impl MailTransport for SmtpRelay {
    async fn send(&self, message: Message) -> Result<(), DeliveryError> {
        self.transport.send(message).await?;
        tracing::debug!("SMTP relay accepted message");
        Ok(())
    }
}

/// Composes and sends the report email
pub struct Deliverer {
    settings: MailSettings,
    date: NaiveDate,
}

impl Deliverer {
    pub fn new(settings: MailSettings, date: NaiveDate) -> Self {
        Self { settings, date }
    }

    pub fn subject(&self) -> String {
        format!("{} - {}", REPORT_TITLE, self.date.format("%Y-%m-%d"))
    }

    /// Send `attachments` through the configured SMTP relay
    pub async fn deliver(&self, attachments: &[PathBuf]) -> DeliveryOutcome {
        if let Some(outcome) = self.skip_if_unconfigured() {
            return outcome;
        }

        let relay = SmtpRelay::new(
            &self.settings.smtp_host,
            self.settings.smtp_port,
            self.settings.sender.as_deref().unwrap_or_default(),
            self.settings.password.as_deref().unwrap_or_default(),
        );

        match relay {
            Ok(relay) => self.deliver_via(&relay, attachments).await,
            Err(e) => {
                tracing::error!("Failed to set up SMTP relay: {}", e);
                DeliveryOutcome::Failed(e.to_string())
            }
        }
    }

    /// Send `attachments` through an explicit transport
    pub async fn deliver_via(
        &self,
        transport: &dyn MailTransport,
        attachments: &[PathBuf],
    ) -> DeliveryOutcome {
        if let Some(outcome) = self.skip_if_unconfigured() {
            return outcome;
        }

        let (message, attached) = match self.compose(attachments) {
            Ok(composed) => composed,
            Err(e) => {
                tracing::error!("Failed to compose report email: {}", e);
                return DeliveryOutcome::Failed(e.to_string());
            }
        };

        match transport.send(message).await {
            Ok(()) => {
                tracing::info!(
                    "Report email sent to {} with {} attachment(s)",
                    self.settings.recipient.as_deref().unwrap_or_default(),
                    attached.len()
                );
                DeliveryOutcome::Sent { attached }
            }
            Err(e) => {
                tracing::error!("Failed to send report email: {}", e);
                DeliveryOutcome::Failed(e.to_string())
            }
        }
    }

    fn skip_if_unconfigured(&self) -> Option<DeliveryOutcome> {
        let missing = self.settings.missing();
        if missing.is_empty() {
            return None;
        }

        let reason = format!(
            "Email environment variables are not set ({}). Skipping email.",
            missing.join(", ")
        );
        tracing::warn!("{}", reason);
        Some(DeliveryOutcome::Skipped(reason))
    }

    /// Build the message, attaching only the paths that exist
    pub fn compose(&self, attachments: &[PathBuf]) -> Result<(Message, Vec<PathBuf>), DeliveryError> {
        let from: Mailbox = self.settings.sender.as_deref().unwrap_or_default().parse()?;
        let to: Mailbox = self.settings.recipient.as_deref().unwrap_or_default().parse()?;

        let mut body = MultiPart::mixed().singlepart(SinglePart::plain(BODY.to_string()));
        let mut attached = Vec::new();

        for path in attachments {
            let Some(part) = attachment_part(path)? else {
                continue;
            };
            body = body.singlepart(part);
            attached.push(path.clone());
        }

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(self.subject())
            .multipart(body)?;

        Ok((message, attached))
    }
}

/// `None` when the file does not exist or cannot be read
fn attachment_part(path: &Path) -> Result<Option<SinglePart>, DeliveryError> {
    if !path.is_file() {
        tracing::debug!("Attachment not found, skipping: {}", path.display());
        return Ok(None);
    }

    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("Could not read attachment {}: {}", path.display(), e);
            return Ok(None);
        }
    };

    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "attachment".to_string());

    let mime = mime_guess::from_path(path).first_or_octet_stream();
    let content_type = ContentType::parse(mime.essence_str())
        .map_err(|e| DeliveryError::ContentType(e.to_string()))?;

    Ok(Some(Attachment::new(filename).body(bytes, content_type)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::tempdir;

    #[derive(Default)]
    struct RecordingTransport {
        sent: Mutex<Vec<Message>>,
        fail: bool,
    }

    #[async_trait]
    impl MailTransport for RecordingTransport {
        async fn send(&self, message: Message) -> Result<(), DeliveryError> {
            if self.fail {
                return Err(DeliveryError::ContentType("relay unavailable".to_string()));
            }
            self.sent.lock().unwrap().push(message);
            Ok(())
        }
    }

    fn settings() -> MailSettings {
        MailSettings {
            sender: Some("reports@example.com".to_string()),
            password: Some("app-password".to_string()),
            recipient: Some("ceo@example.com".to_string()),
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: SMTPS_PORT,
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, 26).unwrap()
    }

    #[tokio::test]
    async fn test_missing_credential_skips_without_sending() {
        let transport = RecordingTransport::default();
        let mut settings = settings();
        settings.password = None;

        let outcome = Deliverer::new(settings, date())
            .deliver_via(&transport, &[])
            .await;

        match outcome {
            DeliveryOutcome::Skipped(reason) => assert!(reason.contains("SENDER_PASSWORD")),
            other => panic!("expected skip, got {:?}", other),
        }
        assert!(transport.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_deliver_skips_before_building_relay() {
        let outcome = Deliverer::new(MailSettings::default(), date())
            .deliver(&[])
            .await;
        assert!(matches!(outcome, DeliveryOutcome::Skipped(_)));
    }

    #[tokio::test]
    async fn test_missing_attachment_is_ignored() {
        let dir = tempdir().unwrap();
        let pdf = dir.path().join("company_report.pdf");
        std::fs::write(&pdf, b"%PDF-1.3 test").unwrap();
        let missing = dir.path().join("company_data.xlsx");

        let transport = RecordingTransport::default();
        let outcome = Deliverer::new(settings(), date())
            .deliver_via(&transport, &[pdf.clone(), missing])
            .await;

        assert_eq!(outcome, DeliveryOutcome::Sent { attached: vec![pdf] });

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        let raw = String::from_utf8_lossy(&sent[0].formatted()).into_owned();
        assert!(raw.contains("company_report.pdf"));
        assert!(raw.contains("application/pdf"));
        assert!(!raw.contains("company_data.xlsx"));
        assert!(raw.contains("Daily Company Performance Report - 2025-08-26"));
    }

    #[tokio::test]
    async fn test_transport_failure_is_reported() {
        let transport = RecordingTransport {
            fail: true,
            ..Default::default()
        };

        let outcome = Deliverer::new(settings(), date())
            .deliver_via(&transport, &[])
            .await;

        assert!(matches!(outcome, DeliveryOutcome::Failed(ref r) if r.contains("relay unavailable")));
    }

    #[tokio::test]
    async fn test_invalid_address_fails() {
        let mut settings = settings();
        settings.recipient = Some("not an address".to_string());

        let transport = RecordingTransport::default();
        let outcome = Deliverer::new(settings, date())
            .deliver_via(&transport, &[])
            .await;

        assert!(matches!(outcome, DeliveryOutcome::Failed(_)));
        assert!(transport.sent.lock().unwrap().is_empty());
    }

    #[test]
    fn test_debug_masks_password() {
        let rendered = format!("{:?}", settings());
        assert!(!rendered.contains("app-password"));
    }
}
