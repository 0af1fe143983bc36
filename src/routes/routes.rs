use actix_web::{error, web};

use crate::error::ApiError;
use crate::handlers::group_handlers::{create_group, delete_group, get_groups};
use crate::handlers::health_handlers::health_check;
use crate::handlers::qr_handlers::{
    create_qr_code, delete_all_qr_codes, delete_qr_code, download_qr_code, get_qr_analytics,
    get_qr_code, get_qr_codes, update_qr_code,
};
use crate::handlers::scan_handlers::{get_static_content, scan_qr_code};

/// Configure the routes
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    // Malformed bodies and query strings get the same JSON error shape as handler errors
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        error::Error::from(ApiError::InvalidInput(err.to_string()))
    }));
    cfg.app_data(web::QueryConfig::default().error_handler(|err, _req| {
        error::Error::from(ApiError::InvalidInput(err.to_string()))
    }));

    // Public scan surface at the root level
    cfg.route("/scan/{shortcode}", web::get().to(scan_qr_code));
    cfg.route("/qr/{id}", web::get().to(get_static_content));

    cfg.service(
        web::scope("/api")
            .route("/health/check", web::get().to(health_check))
            .service(
                web::scope("/qr")
                    .route("", web::get().to(get_qr_codes))
                    .route("", web::post().to(create_qr_code))
                    .route("", web::delete().to(delete_all_qr_codes))
                    .route("/{id}", web::get().to(get_qr_code))
                    .route("/{id}", web::put().to(update_qr_code))
                    .route("/{id}", web::delete().to(delete_qr_code))
                    .route("/{id}/download", web::get().to(download_qr_code))
                    .route("/{id}/analytics", web::get().to(get_qr_analytics)),
            )
            .service(
                web::scope("/groups")
                    .route("", web::get().to(get_groups))
                    .route("", web::post().to(create_group))
                    .route("/{id}", web::delete().to(delete_group)),
            ),
    );
}
