use std::time::Duration;

use mongodb::Database;

use crate::db::mongodb::qr_scans;
use crate::models::qr_analytics::ScanRecord;
use crate::utils::hash_ip::hash_ip;

/// A scan as observed by the HTTP layer.
#[derive(Debug, Clone)]
pub struct ScanEvent {
    pub qr_id: i64,
    pub ip: String,
    pub user_agent: Option<String>,
    pub scanned_at: i64,
}

impl ScanEvent {
    pub fn into_record(self, salt: &str) -> ScanRecord {
        ScanRecord::new(
            self.qr_id,
            hash_ip(&self.ip, salt),
            self.user_agent,
            self.scanned_at,
        )
    }
}

/// Records `event` in the background.
///
/// Returns immediately. The write runs under its own `timeout`, and failures
/// are logged and dropped so the scan response is never affected.
pub fn track_scan(db: Database, event: ScanEvent, salt: String, timeout: Duration) {
    actix_web::rt::spawn(async move {
        let qr_id = event.qr_id;
        let record = event.into_record(&salt);

        match tokio::time::timeout(timeout, qr_scans(&db).insert_one(&record)).await {
            Ok(Ok(_)) => log::debug!("Recorded scan for QR code {}", qr_id),
            Ok(Err(e)) => log::warn!("Failed to track scan for QR code {}: {}", qr_id, e),
            Err(_) => log::warn!(
                "Timed out after {:?} tracking scan for QR code {}",
                timeout,
                qr_id
            ),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_becomes_hashed_record() {
        let event = ScanEvent {
            qr_id: 9,
            ip: "198.51.100.4".to_string(),
            user_agent: Some("Camera/1.0".to_string()),
            scanned_at: 1_700_000_000_000,
        };
        let record = event.into_record("salt");

        assert_eq!(record.qr_code_id, 9);
        assert_eq!(record.visitor_hash, hash_ip("198.51.100.4", "salt"));
        assert_eq!(record.user_agent.as_deref(), Some("Camera/1.0"));
        assert_eq!(record.scanned_at, 1_700_000_000_000);
        assert!(record.id.is_none());
    }
}
