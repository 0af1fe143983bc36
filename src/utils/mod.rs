pub mod hash_ip;
pub mod qr_image;
pub mod scan_tracker;
pub mod short_code;
