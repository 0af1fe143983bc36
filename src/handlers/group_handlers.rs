use std::collections::HashMap;

use actix_web::{HttpResponse, web};
use futures_util::TryStreamExt;
use mongodb::bson::{Bson, Document, doc};
use validator::Validate;

use crate::db::mongodb::{QR_GROUP_SEQUENCE, next_id, qr_codes, qr_groups};
use crate::error::ApiError;
use crate::models::qr_group::QrGroup;
use crate::state::app_state::AppState;
use crate::structs::group_request::{CreateGroupRequest, GroupResponse};
use crate::structs::qr_request::non_blank;

pub async fn create_group(
    app_state: web::Data<AppState>,
    web::Json(req): web::Json<CreateGroupRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;

    let db = &app_state.db;
    let id = next_id(db, QR_GROUP_SEQUENCE).await?;
    let group = QrGroup::new(id, req.name.trim().to_string(), non_blank(req.description));
    qr_groups(db).insert_one(&group).await?;

    log::info!("Created QR group {} ({})", group.id, group.name);
    Ok(HttpResponse::Created().json(GroupResponse::new(group, 0)))
}

pub async fn get_groups(app_state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let db = &app_state.db;
    let groups: Vec<QrGroup> = qr_groups(db)
        .find(doc! {})
        .sort(doc! { "name": 1 })
        .await?
        .try_collect()
        .await?;

    let count_rows: Vec<Document> = qr_codes(db)
        .aggregate(vec![
            doc! { "$match": { "group_id": { "$ne": null } } },
            doc! { "$group": { "_id": "$group_id", "count": { "$sum": 1 } } },
        ])
        .await?
        .try_collect()
        .await?;
    let counts = group_counts(&count_rows);

    let responses: Vec<GroupResponse> = groups
        .into_iter()
        .map(|group| {
            let qr_count = counts.get(&group.id).copied().unwrap_or(0);
            GroupResponse::new(group, qr_count)
        })
        .collect();

    Ok(HttpResponse::Ok().json(responses))
}

/// Deletes a group; its codes stay and lose their `group_id`.
pub async fn delete_group(
    app_state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let db = &app_state.db;
    let id = path.into_inner();

    let result = qr_groups(db).delete_one(doc! { "_id": id }).await?;
    if result.deleted_count == 0 {
        return Err(ApiError::NotFound("QR group"));
    }

    let now = chrono::Utc::now().timestamp_millis();
    let members = qr_codes(db)
        .update_many(
            doc! { "group_id": id },
            doc! { "$unset": { "group_id": "" }, "$set": { "updated_at": now } },
        )
        .await?;

    log::info!(
        "Deleted QR group {}, ungrouped {} QR codes",
        id,
        members.modified_count
    );
    Ok(HttpResponse::NoContent().finish())
}

/// Maps `{_id: group_id, count}` rows from the `$group` stage to counts per group.
fn group_counts(rows: &[Document]) -> HashMap<i64, u64> {
    rows.iter()
        .filter_map(|row| {
            let group_id = bson_int(row.get("_id")?)?;
            let count = bson_int(row.get("count")?)?;
            Some((group_id, count.max(0) as u64))
        })
        .collect()
}

fn bson_int(value: &Bson) -> Option<i64> {
    match value {
        Bson::Int32(v) => Some(i64::from(*v)),
        Bson::Int64(v) => Some(*v),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_come_from_group_stage_rows() {
        let rows = vec![
            doc! { "_id": 1_i64, "count": 3_i32 },
            doc! { "_id": 2_i32, "count": 7_i64 },
            doc! { "_id": "stray", "count": 1_i32 },
        ];
        let counts = group_counts(&rows);

        assert_eq!(counts.len(), 2);
        assert_eq!(counts.get(&1), Some(&3));
        assert_eq!(counts.get(&2), Some(&7));
        assert_eq!(counts.get(&9), None);
    }
}
