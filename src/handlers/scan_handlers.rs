use actix_web::{HttpRequest, HttpResponse, http, web};
use mongodb::bson::doc;

use crate::db::mongodb::qr_codes;
use crate::error::ApiError;
use crate::handlers::qr_handlers::{ensure_servable, find_qr_code};
use crate::handlers::{base_url, client_ip, user_agent};
use crate::render::landing::render_landing;
use crate::resolver::{ScanAction, resolve_scan, resolve_static};
use crate::state::app_state::AppState;
use crate::utils::scan_tracker::{ScanEvent, track_scan};

/// Entry point for scanned dynamic codes.
pub async fn scan_qr_code(
    app_state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let code = path.into_inner();
    let qr = qr_codes(&app_state.db)
        .find_one(doc! { "short_url": &code })
        .await?
        .ok_or(ApiError::NotFound("QR code"))?;
    ensure_servable(&qr)?;

    let config = &app_state.config;
    if qr.analytics && config.analytics_enabled {
        // Don't wait for the write to avoid slowing down the scan
        let event = ScanEvent {
            qr_id: qr.id,
            ip: client_ip(&req),
            user_agent: user_agent(&req),
            scanned_at: chrono::Utc::now().timestamp_millis(),
        };
        track_scan(
            app_state.db.clone(),
            event,
            config.visitor_salt.clone(),
            config.analytics_timeout,
        );
    }

    let base = base_url(&req, config);
    let action = resolve_scan(&qr, &base);
    log::debug!("Scan of {} resolved to {}", code, action_label(&action));

    Ok(action_response(action, &qr.title))
}

/// Serves the inline payload of a static code.
pub async fn get_static_content(
    app_state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let qr = find_qr_code(&app_state.db, path.into_inner()).await?;
    ensure_servable(&qr)?;

    let action = resolve_static(&qr)?;
    Ok(action_response(action, &qr.title))
}

pub fn action_response(action: ScanAction, title: &str) -> HttpResponse {
    match action {
        ScanAction::RenderPage(page) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(render_landing(&page, title)),
        ScanAction::Redirect { url } => HttpResponse::Found()
            .append_header((http::header::LOCATION, url))
            .finish(),
        ScanAction::PlainText { body } => HttpResponse::Ok()
            .content_type("text/plain; charset=utf-8")
            .body(body),
        ScanAction::Json { body } => HttpResponse::Ok().json(body),
    }
}

fn action_label(action: &ScanAction) -> &'static str {
    match action {
        ScanAction::RenderPage(page) => page.template(),
        ScanAction::Redirect { .. } => "redirect",
        ScanAction::PlainText { .. } => "text",
        ScanAction::Json { .. } => "json",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::landing::{LandingPage, SmsPage};
    use actix_web::body::to_bytes;
    use actix_web::http::StatusCode;
    use serde_json::json;

    async fn body_string(resp: HttpResponse) -> String {
        let bytes = to_bytes(resp.into_body()).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn content_type(resp: &HttpResponse) -> &str {
        resp.headers()
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }

    #[actix_web::test]
    async fn redirect_sets_location() {
        let resp = action_response(
            ScanAction::Redirect {
                url: "https://example.com/promo".to_string(),
            },
            "Promo",
        );
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(
            resp.headers().get(http::header::LOCATION).unwrap(),
            "https://example.com/promo"
        );
    }

    #[actix_web::test]
    async fn page_is_rendered_as_html() {
        let page = LandingPage::Sms(SmsPage {
            phone: "+15550100".to_string(),
            message: "Hello".to_string(),
            sms_uri: "sms:+15550100?body=Hello".to_string(),
        });
        let resp = action_response(ScanAction::RenderPage(page), "Text us");
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(content_type(&resp), "text/html; charset=utf-8");

        let html = body_string(resp).await;
        assert!(html.contains("<title>Text us</title>"));
        assert!(html.contains("+15550100"));
    }

    #[actix_web::test]
    async fn plain_text_and_json_bodies() {
        let resp = action_response(
            ScanAction::PlainText {
                body: "WIFI:T:WPA;S:Cafe;P:pw;;".to_string(),
            },
            "Cafe",
        );
        assert_eq!(content_type(&resp), "text/plain; charset=utf-8");
        assert_eq!(body_string(resp).await, "WIFI:T:WPA;S:Cafe;P:pw;;");

        let resp = action_response(
            ScanAction::Json {
                body: json!({"content": {"note": "hi"}}),
            },
            "Note",
        );
        assert_eq!(content_type(&resp), "application/json");
        let body: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
        assert_eq!(body["content"]["note"], "hi");
    }

    #[test]
    fn redirect_label() {
        let action = ScanAction::Redirect {
            url: String::new(),
        };
        assert_eq!(action_label(&action), "redirect");
    }
}
