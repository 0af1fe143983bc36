pub mod qr_analytics;
pub mod qr_code;
pub mod qr_group;
