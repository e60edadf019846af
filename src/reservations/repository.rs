use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::reservations::{Reservation, ReservationStatus, StatusMachine};

/// Reservation reads used by pricing and availability, plus the status workflow
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Reservation rooms of the type in CONFIRMED or CHECKED_IN reservations
    /// whose stay overlaps `[check_in, check_out)`
    async fn count_overlapping_rooms(
        &self,
        room_type_id: Uuid,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> ApiResult<i64>;

    /// True when a CONFIRMED or CHECKED_IN reservation references the plan
    async fn has_active_for_rate_plan(&self, rate_plan_id: Uuid) -> ApiResult<bool>;

    async fn find_by_id(&self, hotel_id: Uuid, id: Uuid) -> ApiResult<Option<Reservation>>;

    /// Lock, validate and apply a status transition in one transaction
    async fn update_status(
        &self,
        hotel_id: Uuid,
        id: Uuid,
        to: ReservationStatus,
    ) -> ApiResult<Reservation>;
}

/// Repository for reservation operations
#[derive(Clone)]
pub struct PgReservationRepository {
    pool: PgPool,
}

impl PgReservationRepository {
    /// Create a new PgReservationRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReservationRepository for PgReservationRepository {
    async fn count_overlapping_rooms(
        &self,
        room_type_id: Uuid,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> ApiResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM reservation_rooms rr
            JOIN reservations r ON r.id = rr.reservation_id
            WHERE rr.room_type_id = $1
              AND r.status IN ('CONFIRMED', 'CHECKED_IN')
              AND rr.check_in < $3
              AND rr.check_out > $2
            "#,
        )
        .bind(room_type_id)
        .bind(check_in)
        .bind(check_out)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn has_active_for_rate_plan(&self, rate_plan_id: Uuid) -> ApiResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM reservations
                WHERE rate_plan_id = $1 AND status IN ('CONFIRMED', 'CHECKED_IN')
            )
            "#,
        )
        .bind(rate_plan_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn find_by_id(&self, hotel_id: Uuid, id: Uuid) -> ApiResult<Option<Reservation>> {
        let reservation = sqlx::query_as::<_, Reservation>(
            r#"
            SELECT id, hotel_id, rate_plan_id, status, check_in, check_out, created_at, updated_at
            FROM reservations
            WHERE id = $1 AND hotel_id = $2
            "#,
        )
        .bind(id)
        .bind(hotel_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(reservation)
    }

    async fn update_status(
        &self,
        hotel_id: Uuid,
        id: Uuid,
        to: ReservationStatus,
    ) -> ApiResult<Reservation> {
        // The transaction rolls back if dropped without commit
        let mut tx = self.pool.begin().await?;

        // Step 1: Lock the reservation row
        let current = sqlx::query_as::<_, Reservation>(
            r#"
            SELECT id, hotel_id, rate_plan_id, status, check_in, check_out, created_at, updated_at
            FROM reservations
            WHERE id = $1 AND hotel_id = $2
            FOR UPDATE
            "#,
        )
        .bind(id)
        .bind(hotel_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ApiError::not_found("Reservation", id))?;

        // Step 2: Validate the transition
        StatusMachine::transition(current.status, to).map_err(ApiError::BadRequest)?;
        if current.status == to {
            tx.commit().await?;
            return Ok(current);
        }

        // Step 3: Update reservation and its rooms
        let updated = sqlx::query_as::<_, Reservation>(
            r#"
            UPDATE reservations
            SET status = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING id, hotel_id, rate_plan_id, status, check_in, check_out, created_at, updated_at
            "#,
        )
        .bind(to)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE reservation_rooms SET status = $1, updated_at = NOW() WHERE reservation_id = $2")
            .bind(to)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(updated)
    }
}
