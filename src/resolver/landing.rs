/// Field bundle for a landing page served to a human scanner.
#[derive(Debug, Clone, PartialEq)]
pub enum LandingPage {
    App(AppPage),
    Business(BusinessPage),
    Wifi(WifiPage),
    Sms(SmsPage),
    Email(EmailPage),
    VCard(VCardPage),
    Event(EventPage),
    Pdf(FilePage),
    Image(FilePage),
    Barcode(BarcodePage),
}

impl LandingPage {
    /// Template name of the page.
    pub fn template(&self) -> &'static str {
        match self {
            LandingPage::App(_) => "app",
            LandingPage::Business(_) => "business",
            LandingPage::Wifi(_) => "wifi",
            LandingPage::Sms(_) => "sms",
            LandingPage::Email(_) => "email",
            LandingPage::VCard(_) => "vcard",
            LandingPage::Event(_) => "event",
            LandingPage::Pdf(_) => "pdf",
            LandingPage::Image(_) => "image",
            LandingPage::Barcode(_) => "barcode",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppPage {
    pub app_name: String,
    pub app_store_url: String,
    pub deep_link: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BusinessPage {
    pub business_name: String,
    pub tagline: String,
    pub website: String,
    pub description: String,
    pub logo_url: String,
    pub contact_info: Vec<(String, String)>,
    pub social_links: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WifiPage {
    pub ssid: String,
    pub password: String,
    pub encryption: String,
    pub wifi_uri: String,
    pub download_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SmsPage {
    pub phone: String,
    pub message: String,
    pub sms_uri: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmailPage {
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub mailto: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VCardPage {
    pub name: String,
    pub organization: String,
    pub title: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub vcard_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventPage {
    pub event_name: String,
    pub start_date: String,
    pub end_date: String,
    pub location: String,
    pub description: String,
    pub ical_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilePage {
    pub file_url: String,
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarcodePage {
    pub text_data: String,
    pub barcode_type: String,
    pub file_url: String,
    pub filename: String,
}
