use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct InlineImage {
    pub content_id: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct MailAttachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct ReportMail {
    pub subject: String,
    pub plain_text: String,
    pub html: String,
    pub inline_image: Option<InlineImage>,
    pub attachments: Vec<MailAttachment>,
}

/// Builds `mixed(related(alternative(text, html), inline image), attachments...)`.
pub fn compose(sender: &str, recipients: &[String], mail: ReportMail) -> AppResult<Message> {
    let mut builder = Message::builder()
        .from(parse_mailbox(sender)?)
        .subject(mail.subject);
    for recipient in recipients {
        builder = builder.to(parse_mailbox(recipient)?);
    }

    let alternative = MultiPart::alternative_plain_html(mail.plain_text, mail.html);

    let body = match mail.inline_image {
        Some(image) => MultiPart::related().multipart(alternative).singlepart(
            Attachment::new_inline(image.content_id)
                .body(image.bytes, parse_content_type(&image.content_type)?),
        ),
        None => alternative,
    };

    let mut mixed = MultiPart::mixed().multipart(body);
    for attachment in mail.attachments {
        let content_type = parse_content_type(&attachment.content_type)?;
        mixed = mixed.singlepart(
            Attachment::new(attachment.file_name).body(attachment.bytes, content_type),
        );
    }

    builder
        .multipart(mixed)
        .map_err(|e| AppError::Email(format!("cannot build message: {e}")))
}

fn parse_mailbox(raw: &str) -> AppResult<Mailbox> {
    raw.parse()
        .map_err(|e| AppError::Email(format!("invalid address {raw:?}: {e}")))
}

fn parse_content_type(raw: &str) -> AppResult<ContentType> {
    ContentType::parse(raw)
        .map_err(|e| AppError::Email(format!("invalid content type {raw:?}: {e}")))
}

#[async_trait::async_trait]
pub trait MailSender: Send + Sync {
    async fn send(&self, message: Message) -> AppResult<()>;
}

/// STARTTLS SMTP relay with login credentials.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    host: String,
    port: u16,
}

impl SmtpMailer {
    pub fn new(host: &str, port: u16, username: &str, password: &str) -> AppResult<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| AppError::Email(format!("cannot configure SMTP relay {host}: {e}")))?
            .port(port)
            .credentials(Credentials::new(username.to_string(), password.to_string()))
            .build();

        Ok(Self {
            transport,
            host: host.to_string(),
            port,
        })
    }
}

#[async_trait::async_trait]
impl MailSender for SmtpMailer {
    async fn send(&self, message: Message) -> AppResult<()> {
        let response = self
            .transport
            .send(message)
            .await
            .map_err(|e| {
                AppError::Email(format!("SMTP send via {}:{} failed: {e}", self.host, self.port))
            })?;

        tracing::info!(
            smtp.host = %self.host,
            smtp.port = self.port,
            smtp.code = %response.code(),
            "Message accepted by SMTP server"
        );
        Ok(())
    }
}
