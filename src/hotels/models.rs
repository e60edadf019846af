use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Room type read model
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RoomType {
    pub id: Uuid,
    pub hotel_id: Uuid,
    pub code: String,
    pub name: String,
    pub deleted_at: Option<DateTime<Utc>>,
}
