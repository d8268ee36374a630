use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Per-user tracking record, created lazily on the first tracked interaction.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_metadata")]
pub struct Model {
    /// Tracking key: the login-derived user name, or the client network
    /// address for anonymous visitors.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// JSON array of app ids this user uploaded. Duplicates permitted.
    pub uploaded_apps: Json,

    /// JSON array of app ids this user downloaded. Duplicates permitted.
    pub downloaded_apps: Json,

    /// Network address seen on the most recent interaction.
    pub ip_address: Option<String>,

    pub country: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,

    /// Last-seen coordinate as `{"lat": .., "lon": ..}`. Cleared when a
    /// request carries no coordinate header.
    pub geo_point: Option<Json>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
