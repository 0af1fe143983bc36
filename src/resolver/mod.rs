//! Content resolution for stored QR codes.
//!
//! Two tables decide what a record means:
//!
//! * [`encode_target`] picks the string baked into a downloadable image.
//! * [`resolve_scan`] picks the response for someone visiting the short code.
//!
//! The tables check content shapes in different orders: a static record with
//! both `ssid` and `phone_number` encodes as WiFi but scans as SMS. Both
//! orders are kept as they are.
//!
//! Everything here is pure: no I/O, no clock, no randomness.

pub mod content;
pub mod formats;
pub mod landing;
pub mod payload;
pub mod shapes;

use serde_json::{Value, json};

use crate::error::ApiError;
use crate::models::qr_code::{QrCode, QrKind};
use content::ContentView;
use formats::{CalendarEvent, VCard, WifiCredentials};
use landing::{
    AppPage, BarcodePage, BusinessPage, EmailPage, EventPage, FilePage, LandingPage, SmsPage,
    VCardPage, WifiPage,
};

const EVENT_DEFAULT_START: &str = "09:00:00";
const EVENT_DEFAULT_END: &str = "17:00:00";
const BARCODE_TYPE: &str = "Data Matrix";

/// What to send back when a short code is scanned.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanAction {
    RenderPage(LandingPage),
    Redirect { url: String },
    PlainText { body: String },
    Json { body: Value },
}

pub fn scan_url(base_url: &str, short_code: &str) -> String {
    format!("{}/scan/{}", base_url.trim_end_matches('/'), short_code)
}

pub fn static_content_url(base_url: &str, id: i64) -> String {
    format!("{}/qr/{}", base_url.trim_end_matches('/'), id)
}

/// The string to encode into the record's QR image.
pub fn encode_target(qr: &QrCode, base_url: &str) -> String {
    let content = ContentView::new(&qr.content);

    if qr.kind == QrKind::Static {
        return static_payload(qr, &content, base_url);
    }

    if matches!(qr.kind, QrKind::Dynamic | QrKind::App | QrKind::Business) {
        if let Some(code) = qr.short_code() {
            return scan_url(base_url, code);
        }
    }

    if let Some(target) = qr.redirect_target() {
        return target.to_string();
    }
    if let Some(code) = qr.short_code() {
        return scan_url(base_url, code);
    }
    match content.string("url") {
        Some(url) => url.to_string(),
        None => static_content_url(base_url, qr.id),
    }
}

/// Static records carry their payload inline.
fn static_payload(qr: &QrCode, content: &ContentView<'_>, base_url: &str) -> String {
    if let Some(text) = content.string("text") {
        text.to_string()
    } else if shapes::is_event(content) {
        formats::icalendar(&calendar_event(content))
    } else if shapes::is_wifi(content) {
        formats::wifi_uri(&wifi_credentials(content))
    } else if shapes::is_sms(content) {
        formats::sms_uri(content.text("phone_number"), content.text("message"))
    } else if shapes::is_email(content) {
        formats::mailto_uri(
            content.text("recipient"),
            content.text("subject"),
            content.text("body"),
        )
    } else if content.string("name").is_some() {
        formats::vcard(&contact_card(content))
    } else if let Some(url) = content.string("url") {
        url.to_string()
    } else {
        static_content_url(base_url, qr.id)
    }
}

/// Text for a Data Matrix rendering: the record's `data` field, or its QR target.
pub fn barcode_text(qr: &QrCode, base_url: &str) -> String {
    let content = ContentView::new(&qr.content);
    match content.string("data").filter(|d| !d.is_empty()) {
        Some(data) => data.to_string(),
        None => encode_target(qr, base_url),
    }
}

/// The response for a scanned short code.
pub fn resolve_scan(qr: &QrCode, base_url: &str) -> ScanAction {
    let content = ContentView::new(&qr.content);

    match qr.kind {
        QrKind::App => return render(LandingPage::App(app_page(qr, &content))),
        QrKind::Business => return render(LandingPage::Business(business_page(qr, &content))),
        QrKind::Wifi => return render(LandingPage::Wifi(wifi_page(&content))),
        QrKind::Static | QrKind::Dynamic => {}
    }

    if shapes::is_sms(&content) {
        return render(LandingPage::Sms(sms_page(&content)));
    }
    if shapes::is_email(&content) {
        return render(LandingPage::Email(email_page(&content)));
    }
    if shapes::is_contact_card(&content) {
        return render(LandingPage::VCard(vcard_page(&content)));
    }
    if shapes::is_event(&content) {
        return render(LandingPage::Event(event_page(&content)));
    }
    if shapes::is_pdf(&content) {
        return render(LandingPage::Pdf(file_page(qr, &content, "pdf")));
    }
    if shapes::is_image(&content) {
        return render(LandingPage::Image(file_page(qr, &content, "png")));
    }
    if shapes::is_barcode(&content) {
        return render(LandingPage::Barcode(barcode_page(qr, &content, base_url)));
    }

    if qr.kind == QrKind::Dynamic {
        if let Some(target) = qr.redirect_target() {
            return ScanAction::Redirect {
                url: target.to_string(),
            };
        }
    }
    match content.string("url") {
        Some(url) => ScanAction::Redirect {
            url: url.to_string(),
        },
        None => ScanAction::Json {
            body: Value::Object(qr.content.clone()),
        },
    }
}

/// The response for the static content endpoint (`/qr/{id}`).
///
/// WiFi records answer with their bare `WIFI:` URI; everything else with its content object.
pub fn resolve_static(qr: &QrCode) -> Result<ScanAction, ApiError> {
    let content = ContentView::new(&qr.content);
    if qr.kind == QrKind::Wifi {
        if content.text("ssid").is_empty() {
            return Err(ApiError::InvalidInput(
                "Invalid or missing SSID in WiFi QR code".to_string(),
            ));
        }
        return Ok(ScanAction::PlainText {
            body: formats::wifi_uri(&wifi_credentials(&content)),
        });
    }
    Ok(ScanAction::Json {
        body: json!({ "content": qr.content }),
    })
}

fn render(page: LandingPage) -> ScanAction {
    ScanAction::RenderPage(page)
}

fn wifi_credentials<'a>(content: &ContentView<'a>) -> WifiCredentials<'a> {
    WifiCredentials {
        ssid: content.text("ssid"),
        password: content.text("password"),
        encryption: content.text("encryption"),
        hidden: content.flag("hidden"),
    }
}

fn contact_card<'a>(content: &ContentView<'a>) -> VCard<'a> {
    VCard {
        name: content.text("name"),
        organization: content.text("organization"),
        title: content.text("title"),
        phone: content.text("phone"),
        email: content.text("email"),
        address: content.text("address"),
    }
}

fn calendar_event<'a>(content: &ContentView<'a>) -> CalendarEvent<'a> {
    CalendarEvent {
        name: content.text("name"),
        start: content.text("date"),
        end: content.text("end_date"),
        location: content.text("location"),
        description: content.text("description"),
    }
}

fn app_page(qr: &QrCode, content: &ContentView<'_>) -> AppPage {
    let app_name = [content.text("app_name"), content.text("name"), qr.title.as_str()]
        .into_iter()
        .find(|s| !s.is_empty())
        .unwrap_or_default();
    AppPage {
        app_name: app_name.to_string(),
        app_store_url: content.text("app_store_url").to_string(),
        deep_link: content.text("deep_link").to_string(),
    }
}

fn business_page(qr: &QrCode, content: &ContentView<'_>) -> BusinessPage {
    let name = content.text("name");
    BusinessPage {
        business_name: if name.is_empty() { qr.title.as_str() } else { name }.to_string(),
        tagline: content.text("tagline").to_string(),
        website: content.text("website").to_string(),
        description: content.text("description").to_string(),
        logo_url: content.text("logo_url").to_string(),
        contact_info: content.string_pairs("contact_info"),
        social_links: content.string_pairs("social_links"),
    }
}

fn wifi_page(content: &ContentView<'_>) -> WifiPage {
    let wifi = wifi_credentials(content);
    let wifi_uri = formats::wifi_uri(&wifi);
    WifiPage {
        ssid: wifi.ssid.to_string(),
        password: wifi.password.to_string(),
        encryption: wifi.encryption_or_default().to_string(),
        download_url: formats::data_url("text/plain", &wifi_uri),
        wifi_uri,
    }
}

fn sms_page(content: &ContentView<'_>) -> SmsPage {
    let phone = content.text("phone_number");
    let message = content.text("message");
    SmsPage {
        phone: phone.to_string(),
        message: message.to_string(),
        sms_uri: formats::sms_uri(phone, message),
    }
}

fn email_page(content: &ContentView<'_>) -> EmailPage {
    let recipient = content.text("recipient");
    let subject = content.text("subject");
    let body = content.text("body");
    EmailPage {
        recipient: recipient.to_string(),
        subject: subject.to_string(),
        body: body.to_string(),
        mailto: formats::mailto_link(recipient, subject, body),
    }
}

fn vcard_page(content: &ContentView<'_>) -> VCardPage {
    let card = contact_card(content);
    VCardPage {
        name: card.name.to_string(),
        organization: card.organization.to_string(),
        title: card.title.to_string(),
        phone: card.phone.to_string(),
        email: card.email.to_string(),
        address: card.address.to_string(),
        vcard_url: formats::data_url("text/vcard", &formats::vcard(&card)),
    }
}

fn event_page(content: &ContentView<'_>) -> EventPage {
    let event = calendar_event(content);
    let start = formats::with_default_time(event.start, EVENT_DEFAULT_START);
    let end = formats::with_default_time(event.end, EVENT_DEFAULT_END);
    let ical = formats::icalendar(&CalendarEvent {
        start: &start,
        end: &end,
        ..event
    });
    EventPage {
        event_name: event.name.to_string(),
        start_date: event.start.to_string(),
        end_date: event.end.to_string(),
        location: event.location.to_string(),
        description: event.description.to_string(),
        ical_url: formats::data_url("text/calendar", &ical),
    }
}

/// `file_url` when set, otherwise `url`.
fn file_url<'a>(content: &ContentView<'a>) -> &'a str {
    match content.text("file_url") {
        "" => content.text("url"),
        url => url,
    }
}

fn file_page(qr: &QrCode, content: &ContentView<'_>, extension: &str) -> FilePage {
    let url = file_url(content);
    FilePage {
        file_url: url.to_string(),
        filename: filename_for(content, url)
            .unwrap_or_else(|| format!("{}.{}", qr.title, extension)),
    }
}

fn barcode_page(qr: &QrCode, content: &ContentView<'_>, base_url: &str) -> BarcodePage {
    let url = file_url(content);
    let (file_url, filename) = if url.is_empty() {
        (
            format!(
                "{}/api/qr/{}/download?symbology=datamatrix",
                base_url.trim_end_matches('/'),
                qr.id
            ),
            format!("{}.png", qr.title),
        )
    } else {
        let name = filename_for(content, url).unwrap_or_else(|| format!("{}.png", qr.title));
        (url.to_string(), name)
    };
    BarcodePage {
        text_data: content.text("data").to_string(),
        barcode_type: BARCODE_TYPE.to_string(),
        file_url,
        filename,
    }
}

/// An explicit `filename`, or the last path segment of `url`.
fn filename_for(content: &ContentView<'_>, url: &str) -> Option<String> {
    if let Some(name) = content.string("filename").filter(|n| !n.is_empty()) {
        return Some(name.to_string());
    }
    let path = url.split(['?', '#']).next().unwrap_or_default();
    path.rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty() && segment.contains('.'))
        .map(str::to_string)
}
