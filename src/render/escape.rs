/// Data URL types the landing pages offer as downloads.
const DOWNLOADABLE_DATA: [&str; 3] = ["data:text/plain", "data:text/vcard", "data:text/calendar"];

/// Escapes text for use in HTML element content and quoted attributes.
pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Escapes a link target, replacing script URLs with `#`.
pub fn escape_href(value: &str) -> String {
    let trimmed = value.trim();
    let lower = trimmed.to_ascii_lowercase();
    let scripted = lower.starts_with("javascript:") || lower.starts_with("vbscript:");
    let unsafe_data = lower.starts_with("data:")
        && !DOWNLOADABLE_DATA.iter().any(|prefix| lower.starts_with(prefix));
    if scripted || unsafe_data {
        return "#".to_string();
    }
    escape_html(trimmed)
}
