//! Content-shape predicates: which sub-kind a content object looks like, judged by key presence.

use super::content::ContentView;

const CONTACT_KEYS: [&str; 5] = ["organization", "title", "phone", "email", "address"];
const IMAGE_EXTENSIONS: [&str; 4] = [".jpg", ".jpeg", ".png", ".gif"];

pub fn is_wifi(content: &ContentView<'_>) -> bool {
    content.string("ssid").is_some()
}

pub fn is_sms(content: &ContentView<'_>) -> bool {
    content.string("phone_number").is_some()
}

pub fn is_email(content: &ContentView<'_>) -> bool {
    content.string("recipient").is_some()
}

/// A `name` together with both event dates.
pub fn is_event(content: &ContentView<'_>) -> bool {
    content.string("name").is_some() && content.present("date") && content.present("end_date")
}

/// A `name` plus at least one contact detail.
pub fn is_contact_card(content: &ContentView<'_>) -> bool {
    content.string("name").is_some() && CONTACT_KEYS.iter().any(|key| content.present(key))
}

pub fn is_pdf(content: &ContentView<'_>) -> bool {
    content.text("type") == "pdf" || url_has_extension(content, &[".pdf"])
}

pub fn is_image(content: &ContentView<'_>) -> bool {
    content.text("type") == "image" || url_has_extension(content, &IMAGE_EXTENSIONS)
}

pub fn is_barcode(content: &ContentView<'_>) -> bool {
    content.text("type") == "barcode_2d" || content.present("data")
}

fn url_has_extension(content: &ContentView<'_>, extensions: &[&str]) -> bool {
    let url = content.text("url").to_ascii_lowercase();
    !url.is_empty() && extensions.iter().any(|ext| url.ends_with(ext))
}
