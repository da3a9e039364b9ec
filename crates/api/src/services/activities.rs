//! Activity recording and feed enrichment.

use futures::future::join_all;
use plotwist_core::enums::{Language, MediaType};
use plotwist_core::types::TmdbId;
use plotwist_db::models::activity::{Activity, ActivityFeedItem, CreateActivity};
use plotwist_db::repositories::ActivityRepo;
use plotwist_providers::tmdb::MetadataProvider;
use sqlx::PgPool;

/// Append an activity to the user's feed.
pub async fn record(pool: &PgPool, input: CreateActivity) -> Result<Activity, sqlx::Error> {
    let activity = ActivityRepo::insert(pool, &input).await?;
    tracing::debug!(
        user_id = %activity.user_id,
        activity_type = %activity.activity_type,
        "Activity recorded"
    );
    Ok(activity)
}

/// The title an activity's `additional_info` refers to, when it names one.
fn title_ref(info: &serde_json::Value) -> Option<(TmdbId, MediaType)> {
    let tmdb_id = info.get("tmdb_id")?.as_i64()?;
    let media_type = MediaType::from_str(info.get("media_type")?.as_str()?)?;
    Some((i32::try_from(tmdb_id).ok()?, media_type))
}

/// Add the TMDB `title` and `poster_path` to feed items that reference a
/// title. Lookups that fail leave the item as it was.
pub async fn enrich(
    metadata: &dyn MetadataProvider,
    items: &mut [ActivityFeedItem],
    language: Language,
) {
    let lookups = items.iter().map(|item| async move {
        let (tmdb_id, media_type) = item.additional_info.as_ref().and_then(title_ref)?;
        match metadata.details(tmdb_id, media_type, language).await {
            Ok(details) => Some(details),
            Err(e) => {
                tracing::debug!(tmdb_id, error = %e, "Activity title lookup failed");
                None
            }
        }
    });
    let details = join_all(lookups).await;

    for (item, details) in items.iter_mut().zip(details) {
        let (Some(details), Some(serde_json::Value::Object(info))) =
            (details, item.additional_info.as_mut())
        else {
            continue;
        };
        info.insert("title".into(), details.title.into());
        info.insert(
            "poster_path".into(),
            details.poster_path.map_or(serde_json::Value::Null, Into::into),
        );
    }
}
