use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use super::content::ContentView;
use super::shapes;
use crate::models::qr_code::QrKind;

/// Explicit sub-kind of a record's content, computed when the record is written.
///
/// Stored alongside the record for listing and filtering. Scan and download
/// dispatch still inspect the content directly.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Text,
    Url,
    Event,
    Wifi,
    Sms,
    Email,
    VCard,
    Pdf,
    Image,
    Barcode,
    App,
    Business,
    #[default]
    Other,
}

impl ContentKind {
    pub fn classify(kind: QrKind, content: &Map<String, Value>) -> Self {
        let view = ContentView::new(content);
        match kind {
            QrKind::App => return ContentKind::App,
            QrKind::Business => return ContentKind::Business,
            QrKind::Wifi => return ContentKind::Wifi,
            QrKind::Static | QrKind::Dynamic => {}
        }

        if shapes::is_sms(&view) {
            ContentKind::Sms
        } else if shapes::is_email(&view) {
            ContentKind::Email
        } else if shapes::is_contact_card(&view) {
            ContentKind::VCard
        } else if shapes::is_event(&view) {
            ContentKind::Event
        } else if shapes::is_pdf(&view) {
            ContentKind::Pdf
        } else if shapes::is_image(&view) {
            ContentKind::Image
        } else if shapes::is_barcode(&view) {
            ContentKind::Barcode
        } else if shapes::is_wifi(&view) {
            ContentKind::Wifi
        } else if view.string("text").is_some() {
            ContentKind::Text
        } else if view.string("url").is_some() {
            ContentKind::Url
        } else {
            ContentKind::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Text => "text",
            ContentKind::Url => "url",
            ContentKind::Event => "event",
            ContentKind::Wifi => "wifi",
            ContentKind::Sms => "sms",
            ContentKind::Email => "email",
            ContentKind::VCard => "v_card",
            ContentKind::Pdf => "pdf",
            ContentKind::Image => "image",
            ContentKind::Barcode => "barcode",
            ContentKind::App => "app",
            ContentKind::Business => "business",
            ContentKind::Other => "other",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn classify(kind: QrKind, value: Value) -> ContentKind {
        match value {
            Value::Object(map) => ContentKind::classify(kind, &map),
            _ => panic!("expected a JSON object"),
        }
    }

    #[test]
    fn explicit_kinds_win() {
        assert_eq!(
            classify(QrKind::Wifi, json!({"recipient": "a@b.com"})),
            ContentKind::Wifi
        );
        assert_eq!(
            classify(QrKind::App, json!({"phone_number": "1"})),
            ContentKind::App
        );
        assert_eq!(classify(QrKind::Business, json!({})), ContentKind::Business);
    }

    #[test]
    fn shapes_follow_scan_priority() {
        assert_eq!(
            classify(QrKind::Static, json!({"phone_number": "1", "recipient": "x"})),
            ContentKind::Sms
        );
        assert_eq!(
            classify(QrKind::Dynamic, json!({"name": "Ada", "email": "a@b.c"})),
            ContentKind::VCard
        );
        assert_eq!(
            classify(
                QrKind::Static,
                json!({"name": "Expo", "date": "2024-01-05", "end_date": "2024-01-06"})
            ),
            ContentKind::Event
        );
        assert_eq!(
            classify(QrKind::Dynamic, json!({"url": "https://x.io/menu.PDF"})),
            ContentKind::Pdf
        );
        assert_eq!(
            classify(QrKind::Dynamic, json!({"url": "https://x.io/a.jpeg"})),
            ContentKind::Image
        );
        assert_eq!(
            classify(QrKind::Static, json!({"data": "ABC-123"})),
            ContentKind::Barcode
        );
        assert_eq!(
            classify(QrKind::Static, json!({"ssid": "Home"})),
            ContentKind::Wifi
        );
        assert_eq!(
            classify(QrKind::Static, json!({"text": "hello"})),
            ContentKind::Text
        );
        assert_eq!(
            classify(QrKind::Dynamic, json!({"url": "https://x.io"})),
            ContentKind::Url
        );
        assert_eq!(classify(QrKind::Static, json!({})), ContentKind::Other);
    }

    #[test]
    fn serializes_as_snake_case() {
        assert_eq!(
            serde_json::to_value(ContentKind::VCard).unwrap(),
            json!("v_card")
        );
        assert_eq!(ContentKind::VCard.to_string(), "v_card");
    }
}
