use sea_orm::{ConnectionTrait, EntityTrait, QueryOrder};

use crate::entity::app_metadata;
use crate::error::AppError;
use crate::models::app::AppListEntry;

/// Read every hosted application, ordered by id descending.
///
/// The listing is unbounded by design; paging is an explicit non-goal. Ids
/// without a parseable version token get `version: None` instead of failing
/// the whole listing.
pub async fn list_applications<C: ConnectionTrait>(db: &C) -> Result<Vec<AppListEntry>, AppError> {
    let apps = app_metadata::Entity::find()
        .order_by_desc(app_metadata::Column::Id)
        .all(db)
        .await?;

    Ok(apps.into_iter().map(AppListEntry::from).collect())
}
