use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// One recorded scan of a QR code.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ScanRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub qr_code_id: i64,
    pub visitor_hash: String,       // Salted hash of the scanner's IP
    pub user_agent: Option<String>, // Optional user agent info
    pub scanned_at: i64,            // Unix milliseconds
}

impl ScanRecord {
    pub fn new(
        qr_code_id: i64,
        visitor_hash: String,
        user_agent: Option<String>,
        scanned_at: i64,
    ) -> Self {
        Self {
            id: None,
            qr_code_id,
            visitor_hash,
            user_agent,
            scanned_at,
        }
    }
}
