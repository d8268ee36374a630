use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, Set};
use serde_json::json;
use tracing::info;

use crate::entity::{app_metadata, user_metadata};
use crate::error::AppError;
use crate::services::string_list;

/// The maximum number of applications a single user may upload.
pub const MAX_APPS_UPLOADED_PER_USER: usize = 100;

/// Fields for a newly uploaded application.
pub struct NewApplication {
    pub id: String,
    pub description: String,
    pub storage_ref: String,
    pub size: Option<String>,
    pub owner: Option<String>,
}

/// Mutable fields applied by an edit. Owner and download count are never
/// touched after creation.
pub struct AppChanges {
    pub description: String,
    pub storage_ref: String,
    pub size: Option<String>,
}

/// Look up one application by id.
pub async fn get_application<C: ConnectionTrait>(
    db: &C,
    id: &str,
) -> Result<app_metadata::Model, AppError> {
    app_metadata::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No application with id '{id}'")))
}

/// Create a new application record with a zero download count.
///
/// A duplicate id is an explicit conflict; existing records are never
/// silently overwritten.
pub async fn create_application<C: ConnectionTrait>(
    db: &C,
    new: NewApplication,
) -> Result<app_metadata::Model, AppError> {
    if app_metadata::Entity::find_by_id(&new.id).one(db).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "An application with id '{}' already exists",
            new.id
        )));
    }

    let now = Utc::now();
    let model = app_metadata::ActiveModel {
        id: Set(new.id),
        storage_ref: Set(new.storage_ref),
        description: Set(new.description),
        download_count: Set(0),
        size: Set(new.size),
        owner: Set(new.owner),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;

    info!(app_id = %model.id, "Application created");
    Ok(model)
}

/// Apply an edit to an existing application.
pub async fn update_application<C: ConnectionTrait>(
    db: &C,
    id: &str,
    changes: AppChanges,
) -> Result<app_metadata::Model, AppError> {
    let existing = get_application(db, id).await?;

    let mut active: app_metadata::ActiveModel = existing.into();
    active.description = Set(changes.description);
    active.storage_ref = Set(changes.storage_ref);
    active.size = Set(changes.size);
    active.updated_at = Set(Utc::now());

    Ok(active.update(db).await?)
}

/// Verify the uploader is below the per-user cap. Runs before any record is
/// created so a rejected upload leaves nothing behind.
pub async fn ensure_upload_capacity<C: ConnectionTrait>(
    db: &C,
    owner: &str,
) -> Result<(), AppError> {
    if let Some(model) = user_metadata::Entity::find_by_id(owner).one(db).await?
        && string_list(&model.uploaded_apps).len() >= MAX_APPS_UPLOADED_PER_USER
    {
        return Err(AppError::Conflict(format!(
            "Upload limit of {MAX_APPS_UPLOADED_PER_USER} applications reached"
        )));
    }
    Ok(())
}

/// Record a successful upload against the uploader's user record, enforcing
/// the per-user upload cap.
pub async fn record_upload_for_user<C: ConnectionTrait>(
    db: &C,
    owner: &str,
    app_id: &str,
) -> Result<(), AppError> {
    let now = Utc::now();

    match user_metadata::Entity::find_by_id(owner).one(db).await? {
        Some(model) => {
            let mut uploaded = string_list(&model.uploaded_apps);
            if uploaded.len() >= MAX_APPS_UPLOADED_PER_USER {
                return Err(AppError::Conflict(format!(
                    "Upload limit of {MAX_APPS_UPLOADED_PER_USER} applications reached"
                )));
            }
            uploaded.push(app_id.to_string());

            let mut active: user_metadata::ActiveModel = model.into();
            active.uploaded_apps = Set(json!(uploaded));
            active.updated_at = Set(now);
            active.update(db).await?;
        }
        None => {
            user_metadata::ActiveModel {
                id: Set(owner.to_string()),
                uploaded_apps: Set(json!([app_id])),
                downloaded_apps: Set(json!([])),
                ip_address: Set(None),
                country: Set(None),
                region: Set(None),
                city: Set(None),
                geo_point: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(db)
            .await?;
        }
    }

    Ok(())
}
