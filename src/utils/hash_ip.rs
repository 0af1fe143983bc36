use sha2::{Digest, Sha256};

/// Hash a visitor IP address with the configured salt so raw addresses are never stored.
pub fn hash_ip(ip: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(ip.as_bytes());
    hasher.update(salt.as_bytes());
    format!("{:x}", hasher.finalize())
}
