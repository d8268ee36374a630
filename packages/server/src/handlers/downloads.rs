use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Redirect, Response};
use common::retry::with_backoff;
use common::storage::{ContentHash, StorageError};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use tokio_util::io::ReaderStream;
use tracing::instrument;

use crate::entity::app_metadata;
use crate::error::{AppError, PageError};
use crate::extractors::geo::GeoContext;
use crate::extractors::identity::RequestIdentity;
use crate::services::downloads::record_download;
use crate::state::AppState;
use crate::utils::filename::content_disposition_value;

/// Record the download, then send the client to the file. External URL
/// references redirect directly; blob hashes redirect to the serve route.
#[instrument(skip(state, identity, geo), fields(app_id = %id))]
pub async fn download_app(
    identity: RequestIdentity,
    geo: GeoContext,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, PageError> {
    let tracking_key = identity.tracking_key(&geo.ip_address);
    let app = record_download(&state.db, &tracking_key, &geo, &id).await?;

    if app.storage_ref.starts_with("http://") || app.storage_ref.starts_with("https://") {
        Ok(Redirect::to(&app.storage_ref))
    } else {
        Ok(Redirect::to(&format!("/serve/{}", app.storage_ref)))
    }
}

/// Stream blob bytes by content hash.
///
/// Transient blob-store failures are retried with backoff before giving up
/// with a 503.
#[instrument(skip(state, headers), fields(blob_ref = %blob_ref))]
pub async fn serve_blob(
    State(state): State<AppState>,
    Path(blob_ref): Path<String>,
    headers: HeaderMap,
) -> Result<Response, PageError> {
    let hash = ContentHash::from_hex(&blob_ref).map_err(AppError::from)?;

    let etag_value = format!("\"{}\"", hash.to_hex());
    if let Some(if_none_match) = headers.get(header::IF_NONE_MATCH)
        && let Ok(val) = if_none_match.to_str()
        && (val == etag_value || val == "*")
    {
        return Ok(StatusCode::NOT_MODIFIED.into_response());
    }

    let retries = state.config.storage.read_retries;
    let size = with_backoff(
        "blob size",
        retries,
        100,
        2000,
        StorageError::is_transient,
        || state.blob_store.size(&hash),
    )
    .await
    .map_err(AppError::from)?;

    let reader = with_backoff(
        "blob open",
        retries,
        100,
        2000,
        StorageError::is_transient,
        || state.blob_store.get_stream(&hash),
    )
    .await
    .map_err(AppError::from)?;

    // Name the download after the application that references this blob,
    // when one does.
    let download_name = app_metadata::Entity::find()
        .filter(app_metadata::Column::StorageRef.eq(&blob_ref))
        .one(&state.db)
        .await
        .map_err(AppError::from)?
        .map(|app| app.id)
        .unwrap_or_else(|| "download".to_string());

    let body = Body::from_stream(ReaderStream::new(reader));
    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(header::CONTENT_LENGTH, size.to_string())
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_value(&download_name),
        )
        .header(header::ETAG, &etag_value)
        .header(header::CACHE_CONTROL, "private, max-age=3600")
        .body(body)
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))?;

    Ok(response)
}
