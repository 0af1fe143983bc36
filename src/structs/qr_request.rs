use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::{Validate, ValidationError};

use crate::config::settings::AppConfig;
use crate::error::ApiError;
use crate::models::qr_analytics::ScanRecord;
use crate::models::qr_code::{QrCode, QrKind};
use crate::resolver::payload::ContentKind;
use crate::resolver::scan_url;
use crate::utils::qr_image::{CorrectionLevel, MAX_SIZE, MIN_SIZE, OutputFormat};

const DEFAULT_PAGE_LIMIT: u64 = 20;
const MAX_PAGE_LIMIT: u64 = 100;

#[derive(Deserialize, Validate, Debug)]
pub struct CreateQrRequest {
    #[serde(rename = "type", default)]
    pub kind: QrKind,
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    pub description: Option<String>,
    #[validate(url(message = "Invalid redirect URL"))]
    pub redirect_url: Option<String>,
    #[validate(custom(function = "validate_short_code"))]
    pub short_url: Option<String>,
    #[serde(default)]
    pub content: Map<String, Value>,
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub analytics: bool,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    pub design: Option<Map<String, Value>>,
    pub group_id: Option<i64>,
    /// Forces a dynamic code with a generated short code and analytics on.
    #[serde(default)]
    pub is_dynamic: bool,
}

#[derive(Deserialize, Validate, Debug)]
pub struct UpdateQrRequest {
    #[serde(rename = "type", default)]
    pub kind: QrKind,
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    pub description: Option<String>,
    #[validate(url(message = "Invalid redirect URL"))]
    pub redirect_url: Option<String>,
    #[validate(custom(function = "validate_short_code"))]
    pub short_url: Option<String>,
    #[serde(default)]
    pub content: Map<String, Value>,
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub analytics: bool,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    pub design: Option<Map<String, Value>>,
    pub group_id: Option<i64>,
}

fn default_true() -> bool {
    true
}

fn validate_short_code(code: &str) -> Result<(), ValidationError> {
    let valid_len = (3..=64).contains(&code.len());
    let valid_chars = code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid_len && valid_chars {
        Ok(())
    } else {
        Err(ValidationError::new("short_code")
            .with_message("Short URL must be 3-64 letters, digits, '-' or '_'".into()))
    }
}

/// Treats blank strings from form clients as absent.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Deserialize, Debug, Default)]
pub struct ListQrParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    #[serde(rename = "type")]
    pub kind: Option<QrKind>,
    pub content_kind: Option<ContentKind>,
    pub group_id: Option<i64>,
}

impl ListQrParams {
    /// `(page, limit)` with out-of-range values replaced by defaults.
    pub fn pagination(&self) -> (u64, u64) {
        let page = match self.page {
            Some(p) if p >= 1 => p as u64,
            _ => 1,
        };
        let limit = match self.limit {
            Some(l) if (1..=MAX_PAGE_LIMIT as i64).contains(&l) => l as u64,
            _ => DEFAULT_PAGE_LIMIT,
        };
        (page, limit)
    }

    /// Documents to skip for `(page, limit)`, saturating for absurd page numbers.
    pub fn offset(&self) -> u64 {
        let (page, limit) = self.pagination();
        (page - 1).saturating_mul(limit).min(i64::MAX as u64)
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct DownloadParams {
    pub format: Option<String>,
    pub size: Option<i64>,
    pub level: Option<String>,
    pub symbology: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbology {
    Qr,
    DataMatrix,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadOptions {
    pub format: OutputFormat,
    pub size: u32,
    pub level: CorrectionLevel,
    pub symbology: Symbology,
}

impl DownloadParams {
    /// Out-of-range sizes and unknown levels fall back to configured defaults;
    /// unknown formats and symbologies are rejected.
    pub fn resolve(&self, config: &AppConfig) -> Result<DownloadOptions, ApiError> {
        let format = match self.format.as_deref() {
            None | Some("") => OutputFormat::Png,
            Some(raw) => OutputFormat::parse(raw)
                .ok_or_else(|| ApiError::InvalidInput(format!("Unsupported format: {}", raw)))?,
        };

        let size = match self.size {
            Some(s) if (MIN_SIZE as i64..=MAX_SIZE as i64).contains(&s) => s as u32,
            _ => config.default_qr_size,
        };

        let level = self
            .level
            .as_deref()
            .map(|raw| CorrectionLevel::parse(raw).unwrap_or(CorrectionLevel::Medium))
            .unwrap_or(config.default_qr_level);

        let symbology = match self.symbology.as_deref().map(str::to_ascii_lowercase) {
            None => Symbology::Qr,
            Some(s) if s.is_empty() || s == "qr" => Symbology::Qr,
            Some(s) if s == "datamatrix" || s == "data_matrix" => Symbology::DataMatrix,
            Some(s) => {
                return Err(ApiError::InvalidInput(format!("Unsupported symbology: {}", s)));
            }
        };

        Ok(DownloadOptions {
            format,
            size,
            level,
            symbology,
        })
    }
}

#[derive(Serialize, Debug)]
pub struct QrCodeResponse {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: QrKind,
    pub content_kind: ContentKind,
    pub title: String,
    pub description: Option<String>,
    pub redirect_url: Option<String>,
    pub short_url: Option<String>,
    pub scan_url: Option<String>,
    pub content: Map<String, Value>,
    pub created_at: i64,
    pub updated_at: i64,
    pub expires_at: Option<i64>,
    pub analytics: bool,
    pub active: bool,
    pub tags: Vec<String>,
    pub design: Option<Map<String, Value>>,
    pub group_id: Option<i64>,
}

impl QrCodeResponse {
    pub fn new(qr: QrCode, base_url: &str) -> Self {
        let scan_url = qr.short_code().map(|code| scan_url(base_url, code));
        Self {
            id: qr.id,
            kind: qr.kind,
            content_kind: qr.content_kind,
            title: qr.title,
            description: qr.description,
            redirect_url: qr.redirect_url,
            short_url: qr.short_url,
            scan_url,
            content: qr.content,
            created_at: qr.created_at,
            updated_at: qr.updated_at,
            expires_at: qr.expires_at,
            analytics: qr.analytics,
            active: qr.active,
            tags: qr.tags,
            design: qr.design,
            group_id: qr.group_id,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
}

#[derive(Serialize, Debug)]
pub struct QrListResponse {
    pub data: Vec<QrCodeResponse>,
    pub pagination: Pagination,
}

#[derive(Serialize, Debug)]
pub struct ScanRecordResponse {
    pub visitor_hash: String,
    pub user_agent: Option<String>,
    pub scanned_at: i64,
}

impl From<ScanRecord> for ScanRecordResponse {
    fn from(record: ScanRecord) -> Self {
        Self {
            visitor_hash: record.visitor_hash,
            user_agent: record.user_agent,
            scanned_at: record.scanned_at,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct QrAnalyticsResponse {
    pub qr_code_id: i64,
    pub total_scans: usize,
    pub unique_visitors: usize,
    pub records: Vec<ScanRecordResponse>,
}

impl QrAnalyticsResponse {
    /// Summarises scan records, which are expected newest first.
    pub fn summarize(qr_code_id: i64, records: Vec<ScanRecord>) -> Self {
        let unique_visitors = records
            .iter()
            .map(|r| r.visitor_hash.as_str())
            .collect::<std::collections::HashSet<_>>()
            .len();
        Self {
            qr_code_id,
            total_scans: records.len(),
            unique_visitors,
            records: records.into_iter().map(ScanRecordResponse::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create(value: Value) -> CreateQrRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn create_request_defaults() {
        let req = create(json!({"title": "Menu"}));
        assert_eq!(req.kind, QrKind::Static);
        assert!(req.active);
        assert!(!req.analytics);
        assert!(!req.is_dynamic);
        assert!(req.content.is_empty());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn create_request_validation() {
        assert!(create(json!({"title": ""})).validate().is_err());
        assert!(
            create(json!({"title": "x", "redirect_url": "not a url"}))
                .validate()
                .is_err()
        );
        assert!(
            create(json!({"title": "x", "short_url": "has space"}))
                .validate()
                .is_err()
        );
        assert!(
            create(json!({"title": "x", "short_url": "promo-2024", "redirect_url": "https://a.b"}))
                .validate()
                .is_ok()
        );
    }

    #[test]
    fn unknown_type_fails_to_parse() {
        let result = serde_json::from_value::<CreateQrRequest>(json!({"title": "x", "type": "pdf"}));
        assert!(result.is_err());
    }

    #[test]
    fn non_blank_trims() {
        assert_eq!(non_blank(Some("  ".to_string())), None);
        assert_eq!(non_blank(Some(" a ".to_string())), Some("a".to_string()));
        assert_eq!(non_blank(None), None);
    }

    #[test]
    fn pagination_bounds() {
        let params = ListQrParams::default();
        assert_eq!(params.pagination(), (1, 20));

        let params = ListQrParams {
            page: Some(0),
            limit: Some(500),
            ..Default::default()
        };
        assert_eq!(params.pagination(), (1, 20));

        let params = ListQrParams {
            page: Some(3),
            limit: Some(50),
            ..Default::default()
        };
        assert_eq!(params.pagination(), (3, 50));
        assert_eq!(params.offset(), 100);
    }

    #[test]
    fn huge_page_offset_saturates() {
        let params = ListQrParams {
            page: Some(i64::MAX),
            limit: Some(100),
            ..Default::default()
        };
        assert_eq!(params.pagination(), (i64::MAX as u64, 100));
        assert_eq!(params.offset(), i64::MAX as u64);

        assert_eq!(ListQrParams::default().offset(), 0);
    }

    #[test]
    fn download_params_fall_back() {
        let config = AppConfig::from_lookup(|_| None);

        let opts = DownloadParams::default().resolve(&config).unwrap();
        assert_eq!(opts.format, OutputFormat::Png);
        assert_eq!(opts.size, 256);
        assert_eq!(opts.level, CorrectionLevel::Medium);
        assert_eq!(opts.symbology, Symbology::Qr);

        let opts = DownloadParams {
            format: Some("svg".to_string()),
            size: Some(2048),
            level: Some("bogus".to_string()),
            symbology: Some("DataMatrix".to_string()),
        }
        .resolve(&config)
        .unwrap();
        assert_eq!(opts.format, OutputFormat::Svg);
        assert_eq!(opts.size, 256);
        assert_eq!(opts.level, CorrectionLevel::Medium);
        assert_eq!(opts.symbology, Symbology::DataMatrix);

        let opts = DownloadParams {
            size: Some(64),
            level: Some("highest".to_string()),
            ..Default::default()
        }
        .resolve(&config)
        .unwrap();
        assert_eq!(opts.size, 64);
        assert_eq!(opts.level, CorrectionLevel::Highest);
    }

    #[test]
    fn download_params_reject_unknown_format() {
        let config = AppConfig::from_lookup(|_| None);
        let result = DownloadParams {
            format: Some("gif".to_string()),
            ..Default::default()
        }
        .resolve(&config);
        assert!(matches!(result, Err(ApiError::InvalidInput(_))));
    }

    #[test]
    fn response_exposes_scan_url() {
        let mut qr = QrCode::new(5, QrKind::Dynamic, "Promo".to_string(), Map::new());
        qr.short_url = Some("abc123".to_string());
        let resp = QrCodeResponse::new(qr, "https://x.io");
        assert_eq!(resp.scan_url.as_deref(), Some("https://x.io/scan/abc123"));

        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["type"], json!("dynamic"));
        assert_eq!(value["id"], json!(5));
    }

    #[test]
    fn analytics_summary_counts_unique_visitors() {
        let records = vec![
            ScanRecord::new(1, "aaa".to_string(), None, 3),
            ScanRecord::new(1, "bbb".to_string(), Some("UA".to_string()), 2),
            ScanRecord::new(1, "aaa".to_string(), None, 1),
        ];
        let summary = QrAnalyticsResponse::summarize(1, records);
        assert_eq!(summary.total_scans, 3);
        assert_eq!(summary.unique_visitors, 2);
        assert_eq!(summary.records[0].scanned_at, 3);
    }
}
