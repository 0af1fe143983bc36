pub mod group_handlers;
pub mod health_handlers;
pub mod qr_handlers;
pub mod scan_handlers;

use actix_web::{HttpRequest, http};

use crate::config::settings::AppConfig;

/// Origin used in generated links: the configured public URL, or the request's own.
pub fn base_url(req: &HttpRequest, config: &AppConfig) -> String {
    if let Some(public) = &config.public_base_url {
        return public.clone();
    }
    let info = req.connection_info();
    format!("{}://{}", info.scheme(), info.host())
}

pub fn user_agent(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

pub fn client_ip(req: &HttpRequest) -> String {
    req.connection_info()
        .realip_remote_addr()
        .unwrap_or("unknown")
        .to_string()
}
