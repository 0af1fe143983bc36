use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use thiserror::Error;
use validator::ValidationErrors;

use crate::utils::qr_image::ImageError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Validation failed")]
    Validation(#[from] ValidationErrors),

    #[error("QR code is inactive")]
    Inactive,

    #[error("QR code has expired")]
    Expired,

    #[error("{0}")]
    Conflict(String),

    #[error("Failed to generate image: {0}")]
    EncodingFailed(String),

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),
}

impl From<ImageError> for ApiError {
    fn from(err: ImageError) -> Self {
        ApiError::EncodingFailed(err.to_string())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidInput(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Inactive | ApiError::Expired => StatusCode::FORBIDDEN,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::EncodingFailed(_) | ApiError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            ApiError::Validation(errors) => serde_json::json!({
                "error": self.to_string(),
                "fields": errors,
            }),
            ApiError::Database(e) => {
                // Driver messages can include hostnames; keep them in the log only
                log::error!("Database error: {}", e);
                serde_json::json!({ "error": "Internal database error" })
            }
            ApiError::EncodingFailed(_) => {
                log::error!("{}", self);
                serde_json::json!({ "error": self.to_string() })
            }
            _ => serde_json::json!({ "error": self.to_string() }),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn body_json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let resp = err.error_response();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body()).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[actix_web::test]
    async fn maps_domain_errors_to_statuses() {
        let (status, body) = body_json(ApiError::NotFound("QR code")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "QR code not found");

        let (status, body) = body_json(ApiError::Expired).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "QR code has expired");

        let (status, _) = body_json(ApiError::Inactive).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = body_json(ApiError::Conflict("taken".to_string())).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = body_json(ApiError::EncodingFailed("too long".to_string())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to generate image: too long");
    }

    #[actix_web::test]
    async fn validation_errors_list_fields() {
        let mut errors = ValidationErrors::new();
        errors.add("title", validator::ValidationError::new("length"));
        let (status, body) = body_json(ApiError::Validation(errors)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["fields"].get("title").is_some());
    }
}
