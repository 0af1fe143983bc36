use mongodb::bson::doc;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{IndexOptions, ReturnDocument};
use mongodb::{Client, Collection, Database, IndexModel};
use serde::{Deserialize, Serialize};

use crate::config::settings::AppConfig;
use crate::models::qr_analytics::ScanRecord;
use crate::models::qr_code::QrCode;
use crate::models::qr_group::QrGroup;

const QR_CODES: &str = "qr_codes";
const QR_GROUPS: &str = "qr_groups";
const QR_SCANS: &str = "qr_scans";
const COUNTERS: &str = "counters";

/// Sequence names in the `counters` collection.
pub const QR_CODE_SEQUENCE: &str = "qr_codes";
pub const QR_GROUP_SEQUENCE: &str = "qr_groups";

#[derive(Serialize, Deserialize, Debug)]
struct Counter {
    #[serde(rename = "_id")]
    id: String,
    seq: i64,
}

/// Connects, verifies the connection and makes sure the indexes exist.
pub async fn get_database(config: &AppConfig) -> mongodb::error::Result<Database> {
    let client = Client::with_uri_str(&config.mongodb_uri).await?;
    let db = client.database(&config.db_name);

    db.run_command(doc! { "ping": 1 }).await?;
    ensure_indexes(&db).await?;

    log::info!("Connected to MongoDB database {}", config.db_name);
    Ok(db)
}

async fn ensure_indexes(db: &Database) -> mongodb::error::Result<()> {
    let short_url_index = IndexModel::builder()
        .keys(doc! { "short_url": 1 })
        .options(IndexOptions::builder().unique(true).sparse(true).build())
        .build();
    qr_codes(db).create_index(short_url_index).await?;

    let scans_index = IndexModel::builder()
        .keys(doc! { "qr_code_id": 1, "scanned_at": -1 })
        .build();
    qr_scans(db).create_index(scans_index).await?;

    Ok(())
}

pub fn qr_codes(db: &Database) -> Collection<QrCode> {
    db.collection::<QrCode>(QR_CODES)
}

pub fn qr_groups(db: &Database) -> Collection<QrGroup> {
    db.collection::<QrGroup>(QR_GROUPS)
}

pub fn qr_scans(db: &Database) -> Collection<ScanRecord> {
    db.collection::<ScanRecord>(QR_SCANS)
}

/// Atomically allocates the next integer id of `sequence`, starting at 1.
pub async fn next_id(db: &Database, sequence: &str) -> mongodb::error::Result<i64> {
    let counter = db
        .collection::<Counter>(COUNTERS)
        .find_one_and_update(doc! { "_id": sequence }, doc! { "$inc": { "seq": 1_i64 } })
        .upsert(true)
        .return_document(ReturnDocument::After)
        .await?;

    // An upsert returning the post-update document always yields one
    Ok(counter.map(|c| c.seq).unwrap_or(1))
}

/// True when `err` is a unique index violation.
pub fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == 11000,
        _ => false,
    }
}
