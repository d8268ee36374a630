use axum::extract::{Path, State};
use axum::response::Html;
use tracing::instrument;

use crate::error::PageError;
use crate::extractors::identity::RequestIdentity;
use crate::models::pages::{AppPage, IndexPage, UploadPage, UploadSuccessfulPage};
use crate::services::{catalog, listing};
use crate::state::AppState;

/// Landing page listing every hosted application.
#[instrument(skip(state, identity))]
pub async fn index(
    identity: RequestIdentity,
    State(state): State<AppState>,
) -> Result<Html<String>, PageError> {
    let apps = listing::list_applications(&state.db).await?;
    let page = IndexPage {
        common: identity.into(),
        apps,
    };
    Ok(Html(state.templates.render_index(&page)))
}

/// Detail page for one application.
#[instrument(skip(state, identity), fields(app_id = %id))]
pub async fn app_detail(
    identity: RequestIdentity,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, PageError> {
    let app = catalog::get_application(&state.db, &id).await?;
    let page = AppPage {
        common: identity.into(),
        app_id: app.id,
        description: app.description,
        download_count: app.download_count,
        size: app.size,
        owner: app.owner,
    };
    Ok(Html(state.templates.render_app(&page)))
}

/// Render the blank upload form.
#[instrument(skip(state, identity))]
pub async fn upload_form(
    identity: RequestIdentity,
    State(state): State<AppState>,
) -> Html<String> {
    let page = UploadPage {
        common: identity.into(),
        upload_url: "/upload-internal".to_string(),
        app_id: None,
        description: String::new(),
        storage_ref: String::new(),
        size: String::new(),
    };
    Html(state.templates.render_upload(&page))
}

/// Static confirmation page after a successful upload or edit.
#[instrument(skip(state, identity))]
pub async fn upload_successful(
    identity: RequestIdentity,
    State(state): State<AppState>,
) -> Html<String> {
    let page = UploadSuccessfulPage {
        common: identity.into(),
    };
    Html(state.templates.render_upload_successful(&page))
}

/// Upload-style form prefilled with the existing record for editing.
#[instrument(skip(state, identity), fields(app_id = %id))]
pub async fn edit_form(
    identity: RequestIdentity,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, PageError> {
    let app = catalog::get_application(&state.db, &id).await?;
    let page = UploadPage {
        common: identity.into(),
        upload_url: format!("/edit/{}", app.id),
        app_id: Some(app.id),
        description: app.description,
        storage_ref: app.storage_ref,
        size: app.size.unwrap_or_default(),
    };
    Ok(Html(state.templates.render_upload(&page)))
}
