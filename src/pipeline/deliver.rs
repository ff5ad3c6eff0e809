use image::ImageFormat;

use crate::artifacts::ArtifactDir;
use crate::error::AppResult;
use crate::mail::{MailAttachment, MailSender, ReportMail, compose};

/// Reads whichever attachment files exist in the artifact directory.
pub async fn load_attachments(
    artifacts: &ArtifactDir,
    image_format: ImageFormat,
) -> AppResult<Vec<MailAttachment>> {
    let mut loaded = Vec::new();
    for file in artifacts.attachments(image_format) {
        let bytes = tokio::fs::read(&file.path).await?;
        loaded.push(MailAttachment {
            file_name: file.file_name,
            content_type: file.content_type.to_string(),
            bytes,
        });
    }
    Ok(loaded)
}

/// Stage 6: attach the artifacts, compose and hand the message to the sender.
#[tracing::instrument(
    name = "pipeline_stage deliver",
    skip(sender, recipients, mail, artifacts),
    fields(
        pipeline.stage = "deliver",
        mail.recipients = recipients.len(),
        mail.attachments,
    )
)]
pub async fn deliver(
    sender: &dyn MailSender,
    from: &str,
    recipients: &[String],
    mut mail: ReportMail,
    artifacts: &ArtifactDir,
    image_format: ImageFormat,
) -> AppResult<()> {
    mail.attachments.extend(load_attachments(artifacts, image_format).await?);
    tracing::Span::current().record("mail.attachments", mail.attachments.len());

    let message = compose(from, recipients, mail)?;
    sender.send(message).await
}
