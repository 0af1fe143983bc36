use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::resolver::payload::ContentKind;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct QrCode {
    #[serde(rename = "_id")]
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: QrKind,
    #[serde(default)]
    pub content_kind: ContentKind,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    // Left out of the document when unset so the sparse unique index ignores it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_url: Option<String>,
    #[serde(default)]
    pub content: Map<String, Value>,
    pub created_at: i64, // Unix milliseconds
    pub updated_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    #[serde(default)]
    pub analytics: bool,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<i64>,
}

/// The stored `type` column.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum QrKind {
    #[default]
    Static,
    Dynamic,
    Wifi,
    App,
    Business,
}

fn default_active() -> bool {
    true
}

impl QrKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QrKind::Static => "static",
            QrKind::Dynamic => "dynamic",
            QrKind::Wifi => "wifi",
            QrKind::App => "app",
            QrKind::Business => "business",
        }
    }

    /// Kinds that are only reachable through a scan URL and therefore always get a short code.
    pub fn requires_short_code(&self) -> bool {
        !matches!(self, QrKind::Static)
    }
}

impl fmt::Display for QrKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl QrCode {
    pub fn new(id: i64, kind: QrKind, title: String, content: Map<String, Value>) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            id,
            kind,
            content_kind: ContentKind::classify(kind, &content),
            title,
            description: None,
            redirect_url: None,
            short_url: None,
            content,
            created_at: now,
            updated_at: now,
            expires_at: None,
            analytics: false,
            active: true,
            tags: Vec::new(),
            design: None,
            group_id: None,
        }
    }

    /// Recomputes the stored content kind after `kind` or `content` changed.
    pub fn refresh_content_kind(&mut self) {
        self.content_kind = ContentKind::classify(self.kind, &self.content);
    }

    /// Short code, if one is set and non-empty.
    pub fn short_code(&self) -> Option<&str> {
        self.short_url.as_deref().filter(|s| !s.is_empty())
    }

    /// Redirect target, if one is set and non-empty.
    pub fn redirect_target(&self) -> Option<&str> {
        self.redirect_url.as_deref().filter(|s| !s.is_empty())
    }

    pub fn is_expired_at(&self, now_millis: i64) -> bool {
        match self.expires_at {
            Some(expiry) => now_millis > expiry,
            None => false, // No expiration date means it never expires
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(chrono::Utc::now().timestamp_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_round_trips_as_lowercase_type_field() {
        let qr = QrCode::new(7, QrKind::Business, "Acme".to_string(), Map::new());
        let value = serde_json::to_value(&qr).unwrap();
        assert_eq!(value["type"], json!("business"));
        assert_eq!(value["_id"], json!(7));
        assert_eq!(value["content_kind"], json!("business"));
        assert!(value.get("short_url").is_none());

        let parsed: QrCode = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.kind, QrKind::Business);
    }

    #[test]
    fn unknown_type_is_rejected() {
        let result = serde_json::from_value::<QrKind>(json!("website"));
        assert!(result.is_err());
    }

    #[test]
    fn empty_short_code_and_redirect_read_as_absent() {
        let mut qr = QrCode::new(1, QrKind::Dynamic, "t".to_string(), Map::new());
        qr.short_url = Some(String::new());
        qr.redirect_url = Some(String::new());
        assert_eq!(qr.short_code(), None);
        assert_eq!(qr.redirect_target(), None);

        qr.short_url = Some("abc123".to_string());
        assert_eq!(qr.short_code(), Some("abc123"));
    }

    #[test]
    fn expiry_gate() {
        let mut qr = QrCode::new(1, QrKind::Static, "t".to_string(), Map::new());
        assert!(!qr.is_expired_at(i64::MAX));
        qr.expires_at = Some(1_000);
        assert!(qr.is_expired_at(1_001));
        assert!(!qr.is_expired_at(1_000));
    }

    #[test]
    fn missing_optional_fields_use_defaults() {
        let qr: QrCode = serde_json::from_value(json!({
            "_id": 3,
            "type": "static",
            "title": "Menu",
            "created_at": 0,
            "updated_at": 0
        }))
        .unwrap();
        assert!(qr.active);
        assert!(!qr.analytics);
        assert!(qr.content.is_empty());
        assert_eq!(qr.content_kind, ContentKind::Other);
    }
}
