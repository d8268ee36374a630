use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Metadata for one hosted application package.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "app_metadata")]
pub struct Model {
    /// User-supplied application id, e.g. "myapp-1.2.3". Immutable once created.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Opaque storage reference: an external URL, or a content hash in the
    /// local blob store.
    pub storage_ref: String,

    pub description: String,

    /// Never decreases; incremented atomically on every successful download.
    pub download_count: i64,

    /// Display size string ("4.2 MB").
    pub size: Option<String>,

    /// Identity of the uploader. Absent when the upload was anonymous.
    pub owner: Option<String>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
