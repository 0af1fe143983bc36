use actix_web::{HttpResponse, web};
use mongodb::bson::doc;

use crate::state::app_state::AppState;

pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    // A ping is enough to tell whether scans can be served
    match state.db.run_command(doc! { "ping": 1 }).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "version": env!("CARGO_PKG_VERSION"),
        })),
        Err(e) => {
            log::error!("Health check ping failed: {}", e);
            HttpResponse::ServiceUnavailable()
                .json(serde_json::json!({ "success": false, "error": "Database connection failed" }))
        }
    }
}
