use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::qr_group::QrGroup;

#[derive(Deserialize, Validate, Debug)]
pub struct CreateGroupRequest {
    #[validate(length(min = 1, max = 100, message = "Group name must be 1-100 characters"))]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct GroupResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    pub qr_count: u64,
}

impl GroupResponse {
    pub fn new(group: QrGroup, qr_count: u64) -> Self {
        Self {
            id: group.id,
            name: group.name,
            description: group.description,
            created_at: group.created_at,
            updated_at: group.updated_at,
            qr_count,
        }
    }
}
