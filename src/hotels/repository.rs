use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::hotels::RoomType;

/// Lookups against hotels, room types and rooms
#[async_trait]
pub trait HotelDirectory: Send + Sync {
    /// True when the hotel exists and belongs to the organization
    async fn hotel_in_organization(&self, organization_id: Uuid, hotel_id: Uuid) -> ApiResult<bool>;

    /// A live (non-deleted) room type of the hotel
    async fn find_room_type(&self, hotel_id: Uuid, room_type_id: Uuid) -> ApiResult<Option<RoomType>>;

    /// Active rooms of the type that are not out of order
    async fn count_sellable_rooms(&self, room_type_id: Uuid) -> ApiResult<i64>;
}

/// Postgres-backed hotel directory
#[derive(Clone)]
pub struct PgHotelDirectory {
    pool: PgPool,
}

impl PgHotelDirectory {
    /// Create a new PgHotelDirectory
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HotelDirectory for PgHotelDirectory {
    async fn hotel_in_organization(&self, organization_id: Uuid, hotel_id: Uuid) -> ApiResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM hotels WHERE id = $1 AND organization_id = $2 AND deleted_at IS NULL)",
        )
        .bind(hotel_id)
        .bind(organization_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn find_room_type(&self, hotel_id: Uuid, room_type_id: Uuid) -> ApiResult<Option<RoomType>> {
        let room_type = sqlx::query_as::<_, RoomType>(
            r#"
            SELECT id, hotel_id, code, name, deleted_at
            FROM room_types
            WHERE id = $1 AND hotel_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(room_type_id)
        .bind(hotel_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(room_type)
    }

    async fn count_sellable_rooms(&self, room_type_id: Uuid) -> ApiResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM rooms
            WHERE room_type_id = $1
              AND is_active = TRUE
              AND is_out_of_order = FALSE
              AND deleted_at IS NULL
            "#,
        )
        .bind(room_type_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
