use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::error::ApiResult;
use crate::inventory::{InventoryPatch, RoomInventory};

const INVENTORY_COLUMNS: &str = r#"
    id, room_type_id, date, total_rooms, out_of_order, blocked, sold,
    overbooking_limit, available, stop_sell, min_stay, max_stay,
    closed_to_arrival, closed_to_departure, rate_override, reason,
    created_at, updated_at
"#;

/// Inventory ledger storage. `available` is recomputed on every write.
#[async_trait]
pub trait InventoryRepository: Send + Sync {
    /// Rows with `from <= date <= to`, ordered by date
    async fn find_range(
        &self,
        room_type_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> ApiResult<Vec<RoomInventory>>;

    /// Insert or merge one date; a new row takes `default_total` rooms
    /// unless the patch says otherwise
    async fn upsert(
        &self,
        room_type_id: Uuid,
        patch: &InventoryPatch,
        default_total: i32,
    ) -> ApiResult<RoomInventory>;

    /// Upsert every entry in one transaction, returning the number written
    async fn bulk_upsert(
        &self,
        room_type_id: Uuid,
        patches: &[InventoryPatch],
        default_total: i32,
    ) -> ApiResult<u64>;
}

/// Repository for inventory ledger operations
#[derive(Clone)]
pub struct PgInventoryRepository {
    pool: PgPool,
}

impl PgInventoryRepository {
    /// Create a new PgInventoryRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn upsert_one<'e, E>(
    executor: E,
    room_type_id: Uuid,
    patch: &InventoryPatch,
    default_total: i32,
) -> Result<RoomInventory, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, RoomInventory>(&format!(
        r#"
        INSERT INTO room_inventory (
            id, room_type_id, date, total_rooms, out_of_order, blocked, sold,
            overbooking_limit, stop_sell, min_stay, max_stay,
            closed_to_arrival, closed_to_departure, rate_override, reason
        )
        VALUES (
            $1, $2, $3, COALESCE($4, $16), COALESCE($5, 0), COALESCE($6, 0), COALESCE($7, 0),
            COALESCE($8, 0), COALESCE($9, FALSE), $10, $11,
            COALESCE($12, FALSE), COALESCE($13, FALSE), $14, $15
        )
        ON CONFLICT (room_type_id, date) DO UPDATE
        SET total_rooms = COALESCE($4, room_inventory.total_rooms),
            out_of_order = COALESCE($5, room_inventory.out_of_order),
            blocked = COALESCE($6, room_inventory.blocked),
            sold = COALESCE($7, room_inventory.sold),
            overbooking_limit = COALESCE($8, room_inventory.overbooking_limit),
            stop_sell = COALESCE($9, room_inventory.stop_sell),
            min_stay = COALESCE($10, room_inventory.min_stay),
            max_stay = COALESCE($11, room_inventory.max_stay),
            closed_to_arrival = COALESCE($12, room_inventory.closed_to_arrival),
            closed_to_departure = COALESCE($13, room_inventory.closed_to_departure),
            rate_override = COALESCE($14, room_inventory.rate_override),
            reason = COALESCE($15, room_inventory.reason),
            updated_at = NOW()
        RETURNING {}
        "#,
        INVENTORY_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(room_type_id)
    .bind(patch.date)
    .bind(patch.total_rooms)
    .bind(patch.out_of_order)
    .bind(patch.blocked)
    .bind(patch.sold)
    .bind(patch.overbooking_limit)
    .bind(patch.stop_sell)
    .bind(patch.min_stay)
    .bind(patch.max_stay)
    .bind(patch.closed_to_arrival)
    .bind(patch.closed_to_departure)
    .bind(patch.rate_override)
    .bind(&patch.reason)
    .bind(default_total)
    .fetch_one(executor)
    .await
}

#[async_trait]
impl InventoryRepository for PgInventoryRepository {
    async fn find_range(
        &self,
        room_type_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> ApiResult<Vec<RoomInventory>> {
        let rows = sqlx::query_as::<_, RoomInventory>(&format!(
            r#"
            SELECT {}
            FROM room_inventory
            WHERE room_type_id = $1 AND date BETWEEN $2 AND $3
            ORDER BY date
            "#,
            INVENTORY_COLUMNS
        ))
        .bind(room_type_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn upsert(
        &self,
        room_type_id: Uuid,
        patch: &InventoryPatch,
        default_total: i32,
    ) -> ApiResult<RoomInventory> {
        Ok(upsert_one(&self.pool, room_type_id, patch, default_total).await?)
    }

    async fn bulk_upsert(
        &self,
        room_type_id: Uuid,
        patches: &[InventoryPatch],
        default_total: i32,
    ) -> ApiResult<u64> {
        let mut tx = self.pool.begin().await?;

        let mut written = 0u64;
        for patch in patches {
            upsert_one(&mut *tx, room_type_id, patch, default_total).await?;
            written += 1;
        }

        tx.commit().await?;
        Ok(written)
    }
}
