use std::time::Duration;

use lettre::{
    Message, SmtpTransport, Transport,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use tracing::{debug, info};

use super::{Notice, NoticeKind, Notifier};
use crate::{
    config::EmailConfig,
    result::{BotError, Result},
};

const SUBJECT: &str = "Review Robot";

/// Sends claim notices over SMTP.
pub struct EmailNotifier {
    transport: SmtpTransport,
    from: Mailbox,
    to: Vec<Mailbox>,
}

impl std::fmt::Debug for EmailNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailNotifier")
            .field("from", &self.from)
            .field("to", &self.to)
            .finish_non_exhaustive()
    }
}

impl EmailNotifier {
    pub fn new(config: &EmailConfig) -> Result<Self> {
        let from = parse_mailbox("email.from", &config.from)?;
        let to = config
            .to
            .iter()
            .map(|addr| parse_mailbox("email.to", addr))
            .collect::<Result<Vec<_>>>()?;

        let builder = if config.implicit_tls {
            SmtpTransport::relay(&config.host)
        } else {
            SmtpTransport::starttls_relay(&config.host)
        }
        .map_err(|e| BotError::config_validation_error("email.host", e.to_string()))?;

        let transport = builder
            .port(config.port)
            .credentials(Credentials::new(
                config.username.to_string(),
                config.password().to_string(),
            ))
            .timeout(Some(Duration::from_secs(20)))
            .build();

        debug!(host = %config.host, port = config.port, "SMTP transport configured");
        Ok(Self { transport, from, to })
    }
}

fn parse_mailbox(field: &'static str, raw: &str) -> Result<Mailbox> {
    raw.parse()
        .map_err(|e: lettre::address::AddressError| BotError::config_validation_error(field, e.to_string()))
}

impl Notifier for EmailNotifier {
    fn channel(&self) -> &'static str {
        "email"
    }

    fn accepts(&self, kind: NoticeKind) -> bool {
        kind == NoticeKind::Claimed
    }

    fn notify(&self, notice: &Notice) -> Result<()> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(SUBJECT)
            .header(ContentType::TEXT_HTML);
        for to in &self.to {
            builder = builder.to(to.clone());
        }

        let html = match &notice.url {
            Some(url) => format!("<p>{}</p><p><a href=\"{url}\">{url}</a></p>", notice.body),
            None => format!("<p>{}</p>", notice.body),
        };
        let message = builder
            .body(html)
            .map_err(|e| BotError::notification_error(self.channel(), e))?;

        self.transport
            .send(&message)
            .map_err(|e| BotError::notification_error(self.channel(), e))?;
        info!(recipients = self.to.len(), "Email sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> EmailConfig {
        EmailConfig {
            host: "smtp.example.com".into(),
            port: 465,
            implicit_tls: true,
            username: "bot@example.com".into(),
            password: "secret".into(),
            from: "Review Bot <bot@example.com>".into(),
            to: vec!["me@example.com".into()],
        }
    }

    #[test]
    fn builds_from_valid_config() {
        let notifier = EmailNotifier::new(&config()).unwrap();
        assert_eq!(notifier.to.len(), 1);
        assert!(notifier.accepts(NoticeKind::Claimed));
        assert!(!notifier.accepts(NoticeKind::Assigned));
    }

    #[test]
    fn bad_recipient_is_a_config_error() {
        let mut config = config();
        config.to = vec!["not an address".into()];

        assert!(matches!(
            EmailNotifier::new(&config),
            Err(BotError::ConfigValidationError { field, .. }) if field == "email.to"
        ));
    }
}
