use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::response::Redirect;
use common::storage::{BlobStore, BoxReader, ContentHash};
use tokio::io::AsyncWriteExt;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{AppError, PageError};
use crate::extractors::identity::RequestIdentity;
use crate::services::catalog::{self, AppChanges, NewApplication};
use crate::state::AppState;
use crate::utils::filename::validate_app_id;

pub fn upload_body_limit() -> DefaultBodyLimit {
    DefaultBodyLimit::max(256 * 1024 * 1024) // 256 MB
}

/// Raw multipart fields from the upload/edit form.
#[derive(Default)]
struct UploadForm {
    appid: Option<String>,
    description: Option<String>,
    size: Option<String>,
    storage_url: Option<String>,
    /// Stored blob, when the form carried a file: hash plus byte count.
    file: Option<(ContentHash, u64)>,
}

impl UploadForm {
    /// The storage reference for this submission: the uploaded blob's hash,
    /// or the user-supplied external URL. Exactly one must be present.
    fn storage_ref(&self) -> Result<String, AppError> {
        match (&self.file, &self.storage_url) {
            (Some((hash, _)), _) => Ok(hash.to_hex()),
            (None, Some(url)) => Ok(url.clone()),
            (None, None) => Err(AppError::Validation(
                "Provide either a file or an external URL".into(),
            )),
        }
    }

    fn description(&self) -> Result<String, AppError> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .ok_or_else(|| AppError::Validation("Description must not be empty".into()))
    }

    /// Display size: the form value, or a rendering of the uploaded byte
    /// count when the form left it blank.
    fn size(&self) -> Option<String> {
        self.size
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .or_else(|| self.file.map(|(_, bytes)| human_size(bytes)))
    }
}

/// Create a new application from the submitted upload form.
///
/// Validation happens before any write; the blob write itself is harmless on
/// a later rejection since blobs are content-addressed and unreferenced ones
/// are simply never served through an application.
#[instrument(skip(state, identity, multipart))]
pub async fn upload_internal(
    identity: RequestIdentity,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Redirect, PageError> {
    let form = parse_upload_form(multipart, &state).await?;

    let appid = form
        .appid
        .as_deref()
        .ok_or_else(|| AppError::Validation("Application id is required".into()))?;
    let appid = validate_app_id(appid)
        .map_err(|e| AppError::Validation(e.message()))?
        .to_string();
    let description = form.description()?;
    let storage_ref = form.storage_ref()?;

    // The cap is a precondition: check it before the record exists.
    if let Some(owner) = identity.owner() {
        catalog::ensure_upload_capacity(&state.db, &owner).await?;
    }

    let new = NewApplication {
        id: appid,
        description,
        storage_ref,
        size: form.size(),
        owner: identity.owner(),
    };

    let app = catalog::create_application(&state.db, new).await?;
    if let Some(owner) = identity.owner() {
        catalog::record_upload_for_user(&state.db, &owner, &app.id).await?;
    }

    Ok(Redirect::to("/upload-successful"))
}

/// Apply form edits to an existing application.
#[instrument(skip(state, multipart), fields(app_id = %id))]
pub async fn edit_app(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Redirect, PageError> {
    // Fail on unknown ids before touching the form or the blob store.
    let existing = catalog::get_application(&state.db, &id).await?;

    let form = parse_upload_form(multipart, &state).await?;
    let description = form.description()?;
    // An edit without a replacement file or URL keeps the current reference.
    let storage_ref = form
        .storage_ref()
        .unwrap_or_else(|_| existing.storage_ref.clone());

    let changes = AppChanges {
        description,
        storage_ref,
        size: form.size().or(existing.size),
    };
    catalog::update_application(&state.db, &id, changes).await?;

    Ok(Redirect::to("/upload-successful"))
}

/// Drain the multipart stream into an `UploadForm`, streaming any file field
/// into the blob store. Unknown fields are ignored.
async fn parse_upload_form(
    mut multipart: Multipart,
    state: &AppState,
) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        match field.name() {
            Some("appid") => form.appid = Some(read_text(field).await?),
            Some("description") => form.description = Some(read_text(field).await?),
            Some("size") => form.size = Some(read_text(field).await?),
            Some("storage_url") => {
                let url = read_text(field).await?;
                if !url.trim().is_empty() {
                    form.storage_url = Some(url.trim().to_string());
                }
            }
            Some("file") => {
                // Browsers send an empty file part when nothing was chosen.
                if field.file_name().is_some_and(|n| !n.is_empty()) {
                    form.file = Some(stream_field_to_store(field, &*state.blob_store).await?);
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read form field: {e}")))
}

/// Stream a multipart file field into the blob store via a temp file, so
/// large uploads never sit in memory.
async fn stream_field_to_store(
    mut field: axum::extract::multipart::Field<'_>,
    blob_store: &dyn BlobStore,
) -> Result<(ContentHash, u64), AppError> {
    let temp_path = std::env::temp_dir().join(format!("filehosting-upload-{}", Uuid::new_v4()));

    let result = async {
        let mut temp_file = tokio::fs::File::create(&temp_path)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create temp file: {e}")))?;

        let mut total: u64 = 0;
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| AppError::Validation(format!("Upload read error: {e}")))?
        {
            total += chunk.len() as u64;
            temp_file
                .write_all(&chunk)
                .await
                .map_err(|e| AppError::Internal(format!("Temp file write failed: {e}")))?;
        }

        temp_file
            .flush()
            .await
            .map_err(|e| AppError::Internal(format!("Temp file flush failed: {e}")))?;
        drop(temp_file);

        let file = tokio::fs::File::open(&temp_path)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to reopen temp file: {e}")))?;
        let reader: BoxReader = Box::new(file);
        let hash = blob_store.put_stream(reader).await?;

        Ok((hash, total))
    }
    .await;

    // Best effort.
    let _ = tokio::fs::remove_file(&temp_path).await;

    result
}

/// Render a byte count as a short human-readable size string.
fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
