use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use minijinja::context;
use tracing::{debug, info, warn};

use super::templates::{render_template, DOCUMENT_SENT, PASSWORD_GENERATED};
use crate::core::config::MailConfig;
use crate::core::error::AppError;

/// Ports served in clear text by local catch-all servers (MailHog, Mailpit)
const PLAINTEXT_PORTS: &[u16] = &[25, 1025];

/// Port using implicit TLS instead of STARTTLS
const SMTPS_PORT: u16 = 465;

#[derive(Debug, Clone)]
pub struct MailAttachment {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
    pub attachment: Option<MailAttachment>,
}

/// Sends HTML mail over SMTP. Without an SMTP host every mail is logged and reported as sent.
pub struct Mailer {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from: Mailbox,
}

impl Mailer {
    pub fn new(config: &MailConfig) -> Result<Self, AppError> {
        let from = parse_mailbox(&config.from_address)
            .map_err(|e| AppError::Internal(format!("Invalid MAIL_FROM: {}", e)))?;

        let Some(host) = config.smtp_host.as_deref() else {
            warn!("SMTP_HOST is not set; outgoing mail will only be logged");
            return Ok(Self {
                transport: None,
                from,
            });
        };

        let builder = if PLAINTEXT_PORTS.contains(&config.smtp_port) {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
        } else if config.smtp_port == SMTPS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)
                .map_err(|e| AppError::Internal(format!("Invalid SMTP relay '{}': {}", host, e)))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                .map_err(|e| AppError::Internal(format!("Invalid SMTP relay '{}': {}", host, e)))?
        };
        let mut builder = builder.port(config.smtp_port);

        if let (Some(username), Some(password)) = (&config.smtp_username, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        info!("SMTP mailer configured for {}:{}", host, config.smtp_port);

        Ok(Self {
            transport: Some(builder.build()),
            from,
        })
    }

    /// Mailer that never opens a connection
    pub fn log_only(from: &str) -> Result<Self, AppError> {
        let from = parse_mailbox(from).map_err(|e| AppError::Internal(e.to_string()))?;
        Ok(Self {
            transport: None,
            from,
        })
    }

    pub fn is_log_only(&self) -> bool {
        self.transport.is_none()
    }

    pub async fn send(&self, mail: OutgoingMail) -> Result<(), AppError> {
        let message = self.build_message(&mail)?;

        let Some(transport) = &self.transport else {
            warn!(
                "Mail to {} not sent (log-only mailer): {}",
                mail.to, mail.subject
            );
            debug!("Mail body for {}: {}", mail.to, mail.html_body);
            return Ok(());
        };

        transport.send(message).await.map_err(|e| {
            tracing::error!("Failed to send mail to {}: {:?}", mail.to, e);
            AppError::Mail(e.to_string())
        })?;

        info!("Mail sent to {}: {}", mail.to, mail.subject);
        Ok(())
    }

    /// Credentials mail sent after self-registration
    pub async fn send_generated_password(
        &self,
        to: &str,
        nom: &str,
        prenom: &str,
        password: &str,
        login_url: &str,
    ) -> Result<(), AppError> {
        let html_body = render_template(
            PASSWORD_GENERATED,
            context! { nom, prenom, email => to, password, login_url },
        )
        .map_err(|e| AppError::Internal(e.to_string()))?;

        self.send(OutgoingMail {
            to: to.to_string(),
            subject: "Vos identifiants de connexion".to_string(),
            html_body,
            attachment: None,
        })
        .await
    }

    /// A document forwarded by its owner, attached to the mail
    pub async fn send_document(
        &self,
        to: &str,
        subject: &str,
        body: &str,
        sender_name: &str,
        attachment: MailAttachment,
    ) -> Result<(), AppError> {
        let html_body = render_template(
            DOCUMENT_SENT,
            context! { body, sender_name, document_name => attachment.filename.as_str() },
        )
        .map_err(|e| AppError::Internal(e.to_string()))?;

        self.send(OutgoingMail {
            to: to.to_string(),
            subject: subject.to_string(),
            html_body,
            attachment: Some(attachment),
        })
        .await
    }

    fn build_message(&self, mail: &OutgoingMail) -> Result<Message, AppError> {
        let to = parse_mailbox(&mail.to)
            .map_err(|e| AppError::BadRequest(format!("Invalid recipient '{}': {}", mail.to, e)))?;

        let builder = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(mail.subject.clone());

        let html = SinglePart::html(mail.html_body.clone());

        let message = match &mail.attachment {
            Some(attachment) => {
                let content_type = ContentType::parse(&attachment.content_type)
                    .or_else(|_| ContentType::parse("application/octet-stream"))
                    .map_err(|e| AppError::Internal(format!("Invalid content type: {}", e)))?;
                let part = Attachment::new(attachment.filename.clone())
                    .body(attachment.data.clone(), content_type);
                builder.multipart(MultiPart::mixed().singlepart(html).singlepart(part))
            }
            None => builder.singlepart(html),
        };

        message.map_err(|e| AppError::Internal(format!("Failed to build mail: {}", e)))
    }
}

fn parse_mailbox(raw: &str) -> Result<Mailbox, lettre::address::AddressError> {
    raw.trim().parse::<Mailbox>()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mailer() -> Mailer {
        Mailer::log_only("Docvault <no-reply@example.com>").unwrap()
    }

    #[test]
    fn test_log_only_without_smtp_host() {
        let config = MailConfig {
            smtp_host: None,
            smtp_port: 587,
            smtp_username: None,
            smtp_password: None,
            from_address: "Docvault <no-reply@example.com>".to_string(),
        };
        assert!(Mailer::new(&config).unwrap().is_log_only());
    }

    #[test]
    fn test_invalid_from_address() {
        assert!(Mailer::log_only("not an address").is_err());
    }

    #[test]
    fn test_build_message_with_attachment() {
        let mail = OutgoingMail {
            to: "awa@example.com".to_string(),
            subject: "Rapport mensuel".to_string(),
            html_body: "<p>Bonjour</p>".to_string(),
            attachment: Some(MailAttachment {
                filename: "rapport.pdf".to_string(),
                content_type: "application/pdf".to_string(),
                data: b"%PDF-1.4".to_vec(),
            }),
        };

        let message = mailer().build_message(&mail).unwrap();
        let raw = String::from_utf8_lossy(&message.formatted()).to_string();
        assert!(raw.contains("Rapport mensuel"));
        assert!(raw.contains("rapport.pdf"));
        assert!(raw.contains("multipart/mixed"));
    }

    #[test]
    fn test_build_message_rejects_bad_recipient() {
        let mail = OutgoingMail {
            to: "nobody".to_string(),
            subject: "x".to_string(),
            html_body: String::new(),
            attachment: None,
        };
        let err = mailer().build_message(&mail).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_log_only_send_succeeds() {
        tokio_test::assert_ok!(
            mailer()
                .send_generated_password("awa@example.com", "Kouassi", "Awa", "Xy7pQ2rT", "")
                .await
        );
    }
}
