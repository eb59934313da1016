//! Upload Gate: single-file multipart acceptance for the `cv` field.

use axum::extract::Multipart;
use tracing::debug;

use crate::analysis::storage::{TempFileStore, UploadedResume};
use crate::errors::AppError;

pub const RESUME_FIELD: &str = "cv";
pub const PDF_MEDIA_TYPE: &str = "application/pdf";
const DEFAULT_FILENAME: &str = "resume.pdf";

/// Reads the whole multipart body and stores the one accepted `cv` file.
///
/// Text fields are ignored. Any other file field, or a second `cv` file, is
/// rejected; a file already stored for this request is released on that path.
pub async fn accept_upload(
    mut multipart: Multipart,
    store: &TempFileStore,
) -> Result<UploadedResume, AppError> {
    let mut accepted: Option<UploadedResume> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Multipart(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();

        let Some(file_name) = field.file_name().map(str::to_string) else {
            debug!(field = %name, "Ignoring non-file form field");
            continue;
        };

        if name != RESUME_FIELD || accepted.is_some() {
            return Err(AppError::UnexpectedField(name));
        }

        let media_type = field.content_type().unwrap_or_default().to_string();
        if !is_pdf(&media_type) {
            return Err(AppError::UnsupportedMediaType(media_type));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Multipart(e.body_text()))?;

        let file_name = if file_name.trim().is_empty() {
            DEFAULT_FILENAME.to_string()
        } else {
            file_name
        };

        accepted = Some(store.store(&file_name, &media_type, &bytes).await?);
    }

    accepted.ok_or(AppError::NoFile)
}

fn is_pdf(media_type: &str) -> bool {
    media_type == PDF_MEDIA_TYPE
}
