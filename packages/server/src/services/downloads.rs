use chrono::Utc;
use sea_orm::prelude::Expr;
use sea_orm::*;
use serde_json::json;
use tracing::info;

use crate::entity::{app_metadata, user_metadata};
use crate::error::AppError;
use crate::extractors::geo::GeoContext;
use crate::services::{catalog, string_list};

/// Record one download: append to the tracking user's history, refresh their
/// last-seen network and geolocation facts, and bump the application's
/// counter.
///
/// The tracking key is the login name for authenticated visitors and the
/// client network address otherwise; anonymous downloads are always tracked,
/// never rejected.
///
/// An unknown app id fails before any write. The user write and the counter
/// increment are two separate persisted writes; a failure between them
/// leaves a recoverable inconsistency (a history entry without a counted
/// download), which is accepted rather than masked by a transaction.
pub async fn record_download<C: ConnectionTrait>(
    db: &C,
    tracking_key: &str,
    ctx: &GeoContext,
    app_id: &str,
) -> Result<app_metadata::Model, AppError> {
    // Resolve first so an unknown id performs no writes at all.
    catalog::get_application(db, app_id).await?;

    let now = Utc::now();
    let geo_point = ctx.geo_point.map(|p| json!({ "lat": p.lat, "lon": p.lon }));

    match user_metadata::Entity::find_by_id(tracking_key).one(db).await? {
        Some(model) => {
            let mut downloaded = string_list(&model.downloaded_apps);
            downloaded.push(app_id.to_string());

            let mut active: user_metadata::ActiveModel = model.into();
            active.downloaded_apps = Set(json!(downloaded));
            active.ip_address = Set(Some(ctx.ip_address.clone()));
            active.country = Set(ctx.country.clone());
            active.region = Set(ctx.region.clone());
            active.city = Set(ctx.city.clone());
            // A request without a coordinate header clears the stored point;
            // a stale location is worse than none.
            active.geo_point = Set(geo_point);
            active.updated_at = Set(now);
            active.update(db).await?;
        }
        None => {
            user_metadata::ActiveModel {
                id: Set(tracking_key.to_string()),
                uploaded_apps: Set(json!([])),
                downloaded_apps: Set(json!([app_id])),
                ip_address: Set(Some(ctx.ip_address.clone())),
                country: Set(ctx.country.clone()),
                region: Set(ctx.region.clone()),
                city: Set(ctx.city.clone()),
                geo_point: Set(geo_point),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(db)
            .await?;
        }
    }

    // Atomic SQL increment so concurrent downloads never lose updates.
    app_metadata::Entity::update_many()
        .col_expr(
            app_metadata::Column::DownloadCount,
            Expr::col(app_metadata::Column::DownloadCount).add(1),
        )
        .filter(app_metadata::Column::Id.eq(app_id))
        .exec(db)
        .await?;

    let updated = catalog::get_application(db, app_id).await?;
    info!(app_id, tracking_key, download_count = updated.download_count, "Download recorded");
    Ok(updated)
}
