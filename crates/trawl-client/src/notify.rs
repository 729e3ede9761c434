use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use trawl_core::config::EmailSettings;
use trawl_core::error::AppError;
use trawl_core::traits::Notifier;

/// Email notifier over SMTP with STARTTLS.
///
/// Authenticates as the sender address when a password is configured.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpNotifier {
    pub fn new(settings: &EmailSettings) -> Result<Self, AppError> {
        let from = parse_mailbox("email_from", &settings.email_from)?;
        let to = parse_mailbox("email_to", &settings.email_to)?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.smtp_server)
            .map_err(|e| {
                AppError::NotificationError(format!(
                    "Invalid SMTP server '{}': {e}",
                    settings.smtp_server
                ))
            })?
            .port(settings.smtp_port);

        if let Some(password) = settings.email_password.as_deref() {
            builder = builder.credentials(Credentials::new(
                settings.email_from.clone(),
                password.to_string(),
            ));
        }

        Ok(Self {
            transport: builder.build(),
            from,
            to,
        })
    }

    fn build_message(&self, subject: &str, body: &str) -> Result<Message, AppError> {
        Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| AppError::NotificationError(format!("Failed to build email: {e}")))
    }
}

impl Notifier for SmtpNotifier {
    async fn notify(&self, subject: &str, body: &str) -> Result<(), AppError> {
        let message = self.build_message(subject, body)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::NotificationError(format!("SMTP delivery failed: {e}")))?;

        tracing::info!(to = %self.to, %subject, "Notification email sent");
        Ok(())
    }
}

fn parse_mailbox(key: &str, raw: &str) -> Result<Mailbox, AppError> {
    raw.parse::<Mailbox>()
        .map_err(|e| AppError::ConfigError(format!("Invalid {key} address '{raw}': {e}")))
}
