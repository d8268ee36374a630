use axum::{
    Router,
    routing::{get, post},
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

/// HTML page routes.
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::pages::index))
        .route("/apps/{id}", get(handlers::pages::app_detail))
        .route("/download/{id}", get(handlers::downloads::download_app))
        .route("/serve/{blob_ref}", get(handlers::downloads::serve_blob))
        .route("/upload", get(handlers::pages::upload_form))
        .route("/upload-internal", post(handlers::uploads::upload_internal))
        .route("/upload-successful", get(handlers::pages::upload_successful))
        .route(
            "/edit/{id}",
            get(handlers::pages::edit_form).post(handlers::uploads::edit_app),
        )
        .layer(handlers::uploads::upload_body_limit())
}

/// JSON API routes, registered in the OpenAPI document.
pub fn api_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::api::list_apps))
        .routes(routes!(handlers::api::get_app))
}
