use axum::Json;
use axum::extract::{Path, State};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::models::app::{AppListResponse, AppResponse};
use crate::services::{catalog, listing};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/apps",
    tag = "Applications",
    operation_id = "listApplications",
    summary = "List all hosted applications",
    description = "Returns every hosted application ordered by id descending. \
        The listing is unbounded; there is no pagination.",
    responses(
        (status = 200, description = "Application listing", body = AppListResponse),
        (status = 503, description = "Backing store unavailable (STORAGE_UNAVAILABLE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn list_apps(State(state): State<AppState>) -> Result<Json<AppListResponse>, AppError> {
    let apps = listing::list_applications(&state.db).await?;
    let total = apps.len() as u64;
    Ok(Json(AppListResponse { apps, total }))
}

#[utoipa::path(
    get,
    path = "/apps/{id}",
    tag = "Applications",
    operation_id = "getApplication",
    summary = "Get one application by id",
    params(("id" = String, Path, description = "Application id")),
    responses(
        (status = 200, description = "Application details", body = AppResponse),
        (status = 404, description = "Application not found (NOT_FOUND)", body = ErrorBody),
        (status = 503, description = "Backing store unavailable (STORAGE_UNAVAILABLE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(app_id = %id))]
pub async fn get_app(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AppResponse>, AppError> {
    let app = catalog::get_application(&state.db, &id).await?;
    Ok(Json(app.into()))
}
