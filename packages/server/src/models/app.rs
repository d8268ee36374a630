use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::entity::app_metadata;
use crate::utils::version::extract_version;

/// One row of the application listing.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct AppListEntry {
    /// Application id.
    #[schema(example = "demo-1.0.0")]
    pub name: String,
    #[schema(example = 42)]
    pub download_count: i64,
    /// Display size string.
    #[schema(example = "4.2 MB")]
    pub size: Option<String>,
    /// Semantic-version token parsed from the id, when one is present.
    #[schema(example = "1.0.0")]
    pub version: Option<String>,
}

impl From<app_metadata::Model> for AppListEntry {
    fn from(model: app_metadata::Model) -> Self {
        let version = extract_version(&model.id);
        Self {
            name: model.id,
            download_count: model.download_count,
            size: model.size,
            version,
        }
    }
}

/// Listing payload for the JSON API.
#[derive(Serialize, utoipa::ToSchema)]
pub struct AppListResponse {
    pub apps: Vec<AppListEntry>,
    pub total: u64,
}

/// Full application details for the JSON API.
#[derive(Serialize, utoipa::ToSchema)]
pub struct AppResponse {
    #[schema(example = "demo-1.0.0")]
    pub id: String,
    pub description: String,
    #[schema(example = 42)]
    pub download_count: i64,
    pub size: Option<String>,
    pub owner: Option<String>,
    pub version: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<app_metadata::Model> for AppResponse {
    fn from(model: app_metadata::Model) -> Self {
        let version = extract_version(&model.id);
        Self {
            id: model.id,
            description: model.description,
            download_count: model.download_count,
            size: model.size,
            owner: model.owner,
            version,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
