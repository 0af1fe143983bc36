//! Payload string builders for the content types a scanner understands natively.
//!
//! These outputs are read by phone cameras and calendar/contact apps, so the
//! exact bytes matter: line endings, field order and separators are fixed.

use url::form_urlencoded;

const DEFAULT_WIFI_ENCRYPTION: &str = "WPA";
const ICAL_DATETIME_LEN: usize = 15;
const CRLF: &str = "\r\n";

#[derive(Debug, Clone, Copy, Default)]
pub struct WifiCredentials<'a> {
    pub ssid: &'a str,
    pub password: &'a str,
    pub encryption: &'a str,
    pub hidden: bool,
}

impl WifiCredentials<'_> {
    /// Encryption with the `WPA` default applied.
    pub fn encryption_or_default(&self) -> &str {
        if self.encryption.is_empty() {
            DEFAULT_WIFI_ENCRYPTION
        } else {
            self.encryption
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct VCard<'a> {
    pub name: &'a str,
    pub organization: &'a str,
    pub title: &'a str,
    pub phone: &'a str,
    pub email: &'a str,
    pub address: &'a str,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CalendarEvent<'a> {
    pub name: &'a str,
    pub start: &'a str,
    pub end: &'a str,
    pub location: &'a str,
    pub description: &'a str,
}

/// Form-style escaping: spaces become `+`, reserved bytes become `%XX`.
pub fn query_escape(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

pub fn wifi_uri(wifi: &WifiCredentials<'_>) -> String {
    let hidden = if wifi.hidden { "H:true;" } else { "" };
    format!(
        "WIFI:T:{};S:{};P:{};{};",
        wifi.encryption_or_default(),
        wifi.ssid,
        wifi.password,
        hidden
    )
}

pub fn sms_uri(phone: &str, message: &str) -> String {
    format!("SMSTO:{}:{}", phone, message)
}

/// `mailto:` URI with every component escaped, as encoded into images.
pub fn mailto_uri(recipient: &str, subject: &str, body: &str) -> String {
    format!(
        "mailto:{}?subject={}&body={}",
        query_escape(recipient),
        query_escape(subject),
        query_escape(body)
    )
}

/// `mailto:` link for landing pages; the address is left readable.
pub fn mailto_link(recipient: &str, subject: &str, body: &str) -> String {
    format!(
        "mailto:{}?subject={}&body={}",
        recipient,
        query_escape(subject),
        query_escape(body)
    )
}

pub fn vcard(card: &VCard<'_>) -> String {
    let mut out = format!("BEGIN:VCARD\nVERSION:3.0\nFN:{}\n", card.name);
    let optional = [
        ("ORG:", card.organization),
        ("TITLE:", card.title),
        ("TEL;TYPE=CELL:", card.phone),
        ("EMAIL:", card.email),
        ("ADR;TYPE=WORK:;;", card.address),
    ];
    for (prefix, value) in optional {
        if !value.is_empty() {
            out.push_str(prefix);
            out.push_str(value);
            out.push('\n');
        }
    }
    out.push_str("END:VCARD");
    out
}

pub fn icalendar(event: &CalendarEvent<'_>) -> String {
    let mut out = String::new();
    out.push_str("BEGIN:VCALENDAR");
    out.push_str(CRLF);
    out.push_str("VERSION:2.0");
    out.push_str(CRLF);
    out.push_str("BEGIN:VEVENT");
    out.push_str(CRLF);
    out.push_str(&format!("SUMMARY:{}{}", event.name, CRLF));
    if !event.start.is_empty() {
        out.push_str(&format!("DTSTART:{}{}", ical_datetime(event.start), CRLF));
    }
    if !event.end.is_empty() {
        out.push_str(&format!("DTEND:{}{}", ical_datetime(event.end), CRLF));
    }
    if !event.location.is_empty() {
        out.push_str(&format!("LOCATION:{}{}", event.location, CRLF));
    }
    if !event.description.is_empty() {
        out.push_str(&format!("DESCRIPTION:{}{}", event.description, CRLF));
    }
    out.push_str("END:VEVENT");
    out.push_str(CRLF);
    out.push_str("END:VCALENDAR");
    out
}

/// Strips `-` and `:` and forces the result to exactly 15 characters,
/// truncating or right-padding with `0`.
pub fn ical_datetime(value: &str) -> String {
    let mut out: String = value
        .chars()
        .filter(|c| *c != '-' && *c != ':')
        .take(ICAL_DATETIME_LEN)
        .collect();
    let len = out.chars().count();
    out.extend(std::iter::repeat_n('0', ICAL_DATETIME_LEN - len));
    out
}

/// Appends `T{time}` to a bare date. Values that already carry a time are returned as-is.
pub fn with_default_time(value: &str, time: &str) -> String {
    if value.is_empty() || value.contains('T') {
        value.to_string()
    } else {
        format!("{}T{}", value, time)
    }
}

pub fn data_url(mime: &str, payload: &str) -> String {
    format!("data:{};charset=utf-8,{}", mime, query_escape(payload))
}
