use crate::render::escape::{escape_href, escape_html};
use crate::resolver::landing::{
    AppPage, BarcodePage, BusinessPage, EmailPage, EventPage, FilePage, LandingPage, SmsPage,
    VCardPage, WifiPage,
};

const STYLE: &str = "body{font-family:system-ui,sans-serif;margin:0;background:#f4f5f7;color:#1f2328}\
main{max-width:32rem;margin:2rem auto;padding:1.5rem;background:#fff;border-radius:12px;box-shadow:0 1px 4px rgba(0,0,0,.08)}\
h1{font-size:1.4rem;margin-top:0}dl{margin:0 0 1rem}dt{font-weight:600;margin-top:.5rem}dd{margin:0}\
.button{display:inline-block;margin:.5rem .5rem 0 0;padding:.6rem 1rem;border-radius:8px;background:#1f6feb;color:#fff;text-decoration:none}\
img{max-width:100%}";

/// Renders a landing page as a complete HTML document titled after the record.
pub fn render_landing(page: &LandingPage, title: &str) -> String {
    let body = match page {
        LandingPage::App(p) => app(p),
        LandingPage::Business(p) => business(p),
        LandingPage::Wifi(p) => wifi(p),
        LandingPage::Sms(p) => sms(p),
        LandingPage::Email(p) => email(p),
        LandingPage::VCard(p) => vcard(p),
        LandingPage::Event(p) => event(p),
        LandingPage::Pdf(p) => pdf(p),
        LandingPage::Image(p) => image(p),
        LandingPage::Barcode(p) => barcode(p),
    };
    shell(title, page.template(), &body)
}

fn shell(title: &str, template: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title}</title>\n<style>{STYLE}</style>\n</head>\n\
         <body>\n<main class=\"landing landing-{template}\">\n<h1>{title}</h1>\n{body}</main>\n</body>\n</html>\n",
        title = escape_html(title),
    )
}

/// Definition list of the non-empty `(label, value)` pairs.
fn details(rows: &[(&str, &str)]) -> String {
    let items: String = rows
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(label, value)| {
            format!(
                "<dt>{}</dt><dd>{}</dd>\n",
                escape_html(label),
                escape_html(value)
            )
        })
        .collect();
    if items.is_empty() {
        String::new()
    } else {
        format!("<dl>\n{}</dl>\n", items)
    }
}

fn button(href: &str, label: &str) -> String {
    if href.is_empty() {
        return String::new();
    }
    format!(
        "<a class=\"button\" href=\"{}\">{}</a>\n",
        escape_href(href),
        escape_html(label)
    )
}

fn download_button(href: &str, filename: &str, label: &str) -> String {
    if href.is_empty() {
        return String::new();
    }
    format!(
        "<a class=\"button\" href=\"{}\" download=\"{}\">{}</a>\n",
        escape_href(href),
        escape_html(filename),
        escape_html(label)
    )
}

fn app(p: &AppPage) -> String {
    let mut out = details(&[("App", &p.app_name)]);
    out.push_str(&button(&p.deep_link, "Open app"));
    out.push_str(&button(&p.app_store_url, "Get the app"));
    out
}

fn business(p: &BusinessPage) -> String {
    let mut out = String::new();
    if !p.logo_url.is_empty() {
        out.push_str(&format!(
            "<img class=\"logo\" src=\"{}\" alt=\"{}\">\n",
            escape_href(&p.logo_url),
            escape_html(&p.business_name)
        ));
    }
    out.push_str(&details(&[
        ("Business", &p.business_name),
        ("Tagline", &p.tagline),
        ("About", &p.description),
    ]));

    let contact: Vec<(&str, &str)> = p
        .contact_info
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    out.push_str(&details(&contact));

    out.push_str(&button(&p.website, "Visit website"));
    for (network, url) in &p.social_links {
        out.push_str(&button(url, network));
    }
    out
}

fn wifi(p: &WifiPage) -> String {
    let mut out = details(&[
        ("Network", &p.ssid),
        ("Password", &p.password),
        ("Security", &p.encryption),
    ]);
    out.push_str(&button(&p.wifi_uri, "Join network"));
    out.push_str(&download_button(&p.download_url, "wifi.wifi", "Download WiFi File"));
    out
}

fn sms(p: &SmsPage) -> String {
    let mut out = details(&[("To", &p.phone), ("Message", &p.message)]);
    out.push_str(&button(&p.sms_uri, "Send message"));
    out
}

fn email(p: &EmailPage) -> String {
    let mut out = details(&[
        ("To", &p.recipient),
        ("Subject", &p.subject),
        ("Message", &p.body),
    ]);
    out.push_str(&button(&p.mailto, "Compose email"));
    out
}

fn vcard(p: &VCardPage) -> String {
    let mut out = details(&[
        ("Name", &p.name),
        ("Organization", &p.organization),
        ("Title", &p.title),
        ("Phone", &p.phone),
        ("Email", &p.email),
        ("Address", &p.address),
    ]);
    out.push_str(&download_button(&p.vcard_url, "contact.vcf", "Save contact"));
    out
}

fn event(p: &EventPage) -> String {
    let mut out = details(&[
        ("Event", &p.event_name),
        ("Starts", &p.start_date),
        ("Ends", &p.end_date),
        ("Location", &p.location),
        ("Details", &p.description),
    ]);
    out.push_str(&download_button(&p.ical_url, "event.ics", "Add to calendar"));
    out
}

fn pdf(p: &FilePage) -> String {
    let mut out = details(&[("File", &p.filename)]);
    out.push_str(&button(&p.file_url, "Open PDF"));
    out.push_str(&download_button(&p.file_url, &p.filename, "Download"));
    out
}

fn image(p: &FilePage) -> String {
    let mut out = String::new();
    if !p.file_url.is_empty() {
        out.push_str(&format!(
            "<img src=\"{}\" alt=\"{}\">\n",
            escape_href(&p.file_url),
            escape_html(&p.filename)
        ));
    }
    out.push_str(&download_button(&p.file_url, &p.filename, "Download image"));
    out
}

fn barcode(p: &BarcodePage) -> String {
    let mut out = details(&[("Type", &p.barcode_type), ("Data", &p.text_data)]);
    if !p.file_url.is_empty() {
        out.push_str(&format!(
            "<img class=\"barcode\" src=\"{}\" alt=\"{}\">\n",
            escape_href(&p.file_url),
            escape_html(&p.barcode_type)
        ));
    }
    out.push_str(&download_button(&p.file_url, &p.filename, "Download"));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::formats::data_url;

    #[test]
    fn shell_escapes_title_and_tags_template() {
        let page = LandingPage::Sms(SmsPage {
            phone: "+15550100".to_string(),
            message: "Hi".to_string(),
            sms_uri: "sms:+15550100?body=Hi".to_string(),
        });
        let html = render_landing(&page, "<Promo>");

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>&lt;Promo&gt;</title>"));
        assert!(html.contains("landing-sms"));
        assert!(html.contains("href=\"sms:+15550100?body=Hi\""));
    }

    #[test]
    fn empty_fields_are_omitted() {
        let page = LandingPage::Wifi(WifiPage {
            ssid: "Cafe".to_string(),
            password: String::new(),
            encryption: "WPA".to_string(),
            wifi_uri: "WIFI:T:WPA;S:Cafe;P:;H:false;;".to_string(),
            download_url: String::new(),
        });
        let html = render_landing(&page, "Guest WiFi");

        assert!(html.contains("<dt>Network</dt><dd>Cafe</dd>"));
        assert!(!html.contains("Password"));
        assert!(!html.contains("Download WiFi File"));
    }

    #[test]
    fn wifi_page_offers_network_file() {
        let wifi_uri = "WIFI:T:WPA;S:Cafe;P:pw;;";
        let page = LandingPage::Wifi(WifiPage {
            ssid: "Cafe".to_string(),
            password: "pw".to_string(),
            encryption: "WPA".to_string(),
            wifi_uri: wifi_uri.to_string(),
            download_url: data_url("text/plain", wifi_uri),
        });
        let html = render_landing(&page, "Guest WiFi");

        assert!(html.contains("href=\"data:text/plain;charset=utf-8,"));
        assert!(html.contains("download=\"wifi.wifi\">Download WiFi File</a>"));
        assert!(!html.contains("href=\"#\""));
    }

    #[test]
    fn user_content_is_escaped() {
        let page = LandingPage::Business(BusinessPage {
            business_name: "Tom & Jerry's".to_string(),
            tagline: "<script>alert(1)</script>".to_string(),
            website: "javascript:alert(1)".to_string(),
            description: String::new(),
            logo_url: String::new(),
            contact_info: vec![("phone".to_string(), "555".to_string())],
            social_links: vec![("twitter".to_string(), "https://t.co/x".to_string())],
        });
        let html = render_landing(&page, "Shop");

        assert!(html.contains("Tom &amp; Jerry&#39;s"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("href=\"#\""));
        assert!(html.contains("<dt>phone</dt><dd>555</dd>"));
        assert!(html.contains("href=\"https://t.co/x\">twitter</a>"));
    }

    #[test]
    fn file_pages_offer_download() {
        let page = LandingPage::Pdf(FilePage {
            file_url: "https://cdn.example.com/menu.pdf".to_string(),
            filename: "menu.pdf".to_string(),
        });
        let html = render_landing(&page, "Menu");
        assert!(html.contains("download=\"menu.pdf\""));

        let page = LandingPage::Barcode(BarcodePage {
            text_data: "SKU-1".to_string(),
            barcode_type: "Data Matrix".to_string(),
            file_url: "https://x.io/api/qr/4/download?symbology=datamatrix".to_string(),
            filename: "Stock.png".to_string(),
        });
        let html = render_landing(&page, "Stock");
        assert!(html.contains("<dd>SKU-1</dd>"));
        assert!(html.contains("download?symbology=datamatrix"));
    }
}
