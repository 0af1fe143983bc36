use actix_web::{HttpRequest, HttpResponse, http, web};
use futures_util::TryStreamExt;
use mongodb::Database;
use mongodb::bson::{Document, doc};
use validator::Validate;

use crate::db::mongodb::{QR_CODE_SEQUENCE, is_duplicate_key, next_id, qr_codes, qr_groups, qr_scans};
use crate::error::ApiError;
use crate::handlers::base_url;
use crate::models::qr_analytics::ScanRecord;
use crate::models::qr_code::{QrCode, QrKind};
use crate::resolver::{barcode_text, encode_target};
use crate::state::app_state::AppState;
use crate::structs::qr_request::{
    CreateQrRequest, DownloadParams, ListQrParams, Pagination, QrAnalyticsResponse,
    QrCodeResponse, QrListResponse, Symbology, UpdateQrRequest, non_blank,
};
use crate::utils::qr_image::{OutputFormat, encode_data_matrix, encode_qr};
use crate::utils::short_code::generate_short_code;

const SHORT_CODE_ATTEMPTS: usize = 5;

pub async fn create_qr_code(
    app_state: web::Data<AppState>,
    req: HttpRequest,
    web::Json(mut body): web::Json<CreateQrRequest>,
) -> Result<HttpResponse, ApiError> {
    body.redirect_url = non_blank(body.redirect_url);
    body.short_url = non_blank(body.short_url);
    body.validate()?;

    let db = &app_state.db;
    if let Some(group_id) = body.group_id {
        ensure_group_exists(db, group_id).await?;
    }

    if body.is_dynamic {
        body.kind = QrKind::Dynamic;
        body.analytics = true;
    }

    let short_url = match body.short_url {
        Some(code) => {
            if short_code_taken(db, &code, None).await? {
                return Err(short_code_conflict(&code));
            }
            Some(code)
        }
        None if body.is_dynamic || body.kind.requires_short_code() || body.analytics => {
            Some(unique_short_code(db).await?)
        }
        None => None,
    };

    let id = next_id(db, QR_CODE_SEQUENCE).await?;
    let mut qr = QrCode::new(id, body.kind, body.title, body.content);
    qr.description = non_blank(body.description);
    qr.redirect_url = body.redirect_url;
    qr.short_url = short_url;
    qr.expires_at = body.expires_at.map(|at| at.timestamp_millis());
    qr.analytics = body.analytics;
    qr.active = body.active;
    qr.tags = body.tags;
    qr.design = body.design;
    qr.group_id = body.group_id;

    qr_codes(db).insert_one(&qr).await.map_err(|e| {
        if is_duplicate_key(&e) {
            short_code_conflict(qr.short_url.as_deref().unwrap_or_default())
        } else {
            ApiError::Database(e)
        }
    })?;

    log::info!(
        "Created {} QR code {} ({})",
        qr.kind,
        qr.id,
        qr.content_kind
    );

    let base = base_url(&req, &app_state.config);
    Ok(HttpResponse::Created().json(QrCodeResponse::new(qr, &base)))
}

pub async fn get_qr_codes(
    app_state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<ListQrParams>,
) -> Result<HttpResponse, ApiError> {
    let params = query.into_inner();
    let (page, limit) = params.pagination();
    let offset = params.offset();

    let mut filter = Document::new();
    if let Some(kind) = params.kind {
        filter.insert("type", kind.as_str());
    }
    if let Some(content_kind) = params.content_kind {
        filter.insert("content_kind", content_kind.as_str());
    }
    if let Some(group_id) = params.group_id {
        filter.insert("group_id", group_id);
    }

    let collection = qr_codes(&app_state.db);
    let total = collection.count_documents(filter.clone()).await?;
    let records: Vec<QrCode> = collection
        .find(filter)
        .sort(doc! { "created_at": -1, "_id": -1 })
        .skip(offset)
        .limit(limit as i64)
        .await?
        .try_collect()
        .await?;

    let base = base_url(&req, &app_state.config);
    let data = records
        .into_iter()
        .map(|qr| QrCodeResponse::new(qr, &base))
        .collect();

    Ok(HttpResponse::Ok().json(QrListResponse {
        data,
        pagination: Pagination { page, limit, total },
    }))
}

pub async fn get_qr_code(
    app_state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let qr = find_qr_code(&app_state.db, path.into_inner()).await?;
    let base = base_url(&req, &app_state.config);
    Ok(HttpResponse::Ok().json(QrCodeResponse::new(qr, &base)))
}

pub async fn update_qr_code(
    app_state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
    web::Json(mut body): web::Json<UpdateQrRequest>,
) -> Result<HttpResponse, ApiError> {
    body.redirect_url = non_blank(body.redirect_url);
    body.short_url = non_blank(body.short_url);
    body.validate()?;

    let db = &app_state.db;
    let id = path.into_inner();
    let mut qr = find_qr_code(db, id).await?;

    if let Some(group_id) = body.group_id {
        ensure_group_exists(db, group_id).await?;
    }

    match body.short_url {
        Some(code) if qr.short_url.as_deref() != Some(code.as_str()) => {
            if short_code_taken(db, &code, Some(id)).await? {
                return Err(short_code_conflict(&code));
            }
            qr.short_url = Some(code);
        }
        Some(_) => {}
        None => {
            // Kinds reachable only by scan URL must keep one
            if qr.short_code().is_none() && (body.kind.requires_short_code() || body.analytics) {
                qr.short_url = Some(unique_short_code(db).await?);
            }
        }
    }

    qr.kind = body.kind;
    qr.title = body.title;
    qr.description = non_blank(body.description);
    qr.redirect_url = body.redirect_url;
    qr.content = body.content;
    qr.expires_at = body.expires_at.map(|at| at.timestamp_millis());
    qr.analytics = body.analytics;
    qr.active = body.active;
    qr.tags = body.tags;
    qr.design = body.design;
    qr.group_id = body.group_id;
    qr.updated_at = chrono::Utc::now().timestamp_millis();
    qr.refresh_content_kind();

    qr_codes(db)
        .replace_one(doc! { "_id": id }, &qr)
        .await
        .map_err(|e| {
            if is_duplicate_key(&e) {
                short_code_conflict(qr.short_url.as_deref().unwrap_or_default())
            } else {
                ApiError::Database(e)
            }
        })?;

    log::info!("Updated QR code {}", id);

    let base = base_url(&req, &app_state.config);
    Ok(HttpResponse::Ok().json(QrCodeResponse::new(qr, &base)))
}

pub async fn delete_qr_code(
    app_state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let db = &app_state.db;
    let id = path.into_inner();

    let result = qr_codes(db).delete_one(doc! { "_id": id }).await?;
    if result.deleted_count == 0 {
        return Err(ApiError::NotFound("QR code"));
    }

    let scans = qr_scans(db).delete_many(doc! { "qr_code_id": id }).await?;
    log::info!(
        "Deleted QR code {} and {} scan records",
        id,
        scans.deleted_count
    );

    Ok(HttpResponse::NoContent().finish())
}

pub async fn delete_all_qr_codes(app_state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let db = &app_state.db;

    let codes = qr_codes(db).delete_many(doc! {}).await?;
    let scans = qr_scans(db).delete_many(doc! {}).await?;
    log::info!(
        "Bulk deleted {} QR codes and {} scan records",
        codes.deleted_count,
        scans.deleted_count
    );

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "deleted": codes.deleted_count,
        "deleted_scans": scans.deleted_count,
    })))
}

/// Renders the record's image as an attachment.
pub async fn download_qr_code(
    app_state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
    query: web::Query<DownloadParams>,
) -> Result<HttpResponse, ApiError> {
    let options = query.resolve(&app_state.config)?;
    let qr = find_qr_code(&app_state.db, path.into_inner()).await?;
    ensure_servable(&qr)?;

    let base = base_url(&req, &app_state.config);
    let bytes = match options.symbology {
        Symbology::Qr => {
            let target = encode_target(&qr, &base);
            log::debug!("Encoding QR code {} as {:?}", qr.id, target);
            encode_qr(&target, options.level, options.size, options.format)?
        }
        Symbology::DataMatrix => {
            if options.format != OutputFormat::Png {
                return Err(ApiError::InvalidInput(
                    "Data Matrix is only available as png".to_string(),
                ));
            }
            encode_data_matrix(&barcode_text(&qr, &base), options.size, options.format)?
        }
    };

    Ok(HttpResponse::Ok()
        .content_type(options.format.content_type())
        .insert_header((
            http::header::CONTENT_DISPOSITION,
            format!(
                "attachment; filename=\"{}.{}\"",
                attachment_name(&qr.title),
                options.format.extension()
            ),
        ))
        .body(bytes))
}

pub async fn get_qr_analytics(
    app_state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let db = &app_state.db;
    let qr = find_qr_code(db, path.into_inner()).await?;

    let records: Vec<ScanRecord> = qr_scans(db)
        .find(doc! { "qr_code_id": qr.id })
        .sort(doc! { "scanned_at": -1 })
        .await?
        .try_collect()
        .await?;

    Ok(HttpResponse::Ok().json(QrAnalyticsResponse::summarize(qr.id, records)))
}

pub async fn find_qr_code(db: &Database, id: i64) -> Result<QrCode, ApiError> {
    qr_codes(db)
        .find_one(doc! { "_id": id })
        .await?
        .ok_or(ApiError::NotFound("QR code"))
}

/// Inactive and expired codes are never served.
pub fn ensure_servable(qr: &QrCode) -> Result<(), ApiError> {
    if !qr.active {
        return Err(ApiError::Inactive);
    }
    if qr.is_expired() {
        return Err(ApiError::Expired);
    }
    Ok(())
}

async fn ensure_group_exists(db: &Database, group_id: i64) -> Result<(), ApiError> {
    let count = qr_groups(db).count_documents(doc! { "_id": group_id }).await?;
    if count == 0 {
        return Err(ApiError::InvalidInput(format!(
            "QR group {} does not exist",
            group_id
        )));
    }
    Ok(())
}

async fn short_code_taken(db: &Database, code: &str, except: Option<i64>) -> Result<bool, ApiError> {
    let mut filter = doc! { "short_url": code };
    if let Some(id) = except {
        filter.insert("_id", doc! { "$ne": id });
    }
    Ok(qr_codes(db).count_documents(filter).await? > 0)
}

async fn unique_short_code(db: &Database) -> Result<String, ApiError> {
    for _ in 0..SHORT_CODE_ATTEMPTS {
        let code = generate_short_code();
        if !short_code_taken(db, &code, None).await? {
            return Ok(code);
        }
        log::warn!("Generated short code {} already in use, retrying", code);
    }
    Err(ApiError::Conflict(
        "Could not allocate a unique short code".to_string(),
    ))
}

fn short_code_conflict(code: &str) -> ApiError {
    ApiError::Conflict(format!("Short URL {} is already in use", code))
}

/// Title made safe for a quoted `Content-Disposition` filename.
fn attachment_name(title: &str) -> String {
    let name: String = title
        .chars()
        .map(|c| match c {
            '"' | '\\' | '/' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let name = name.trim();
    if name.is_empty() {
        "qr-code".to_string()
    } else {
        name.to_string()
    }
}
