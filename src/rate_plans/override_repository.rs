use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::error::ApiResult;
use crate::rate_plans::{OverridePatch, RateOverride};

/// Per-date rate overrides of a rate plan
#[async_trait]
pub trait RateOverrideRepository: Send + Sync {
    /// Overrides with `from <= date <= to`, ordered by date
    async fn find_range(
        &self,
        rate_plan_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> ApiResult<Vec<RateOverride>>;

    /// Insert or merge a single override; omitted fields keep their value
    async fn upsert(&self, rate_plan_id: Uuid, patch: &OverridePatch) -> ApiResult<RateOverride>;

    /// Upsert every entry in one transaction, returning the number written
    async fn bulk_upsert(&self, rate_plan_id: Uuid, patches: &[OverridePatch]) -> ApiResult<u64>;

    /// Returns false when there was no override on that date
    async fn delete(&self, rate_plan_id: Uuid, date: NaiveDate) -> ApiResult<bool>;
}

/// Repository for rate override operations
#[derive(Clone)]
pub struct PgRateOverrideRepository {
    pool: PgPool,
}

impl PgRateOverrideRepository {
    /// Create a new PgRateOverrideRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn upsert_one<'e, E>(
    executor: E,
    rate_plan_id: Uuid,
    patch: &OverridePatch,
) -> Result<RateOverride, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, RateOverride>(
        r#"
        INSERT INTO rate_overrides (id, rate_plan_id, date, rate, stop_sell, min_stay, reason)
        VALUES ($1, $2, $3, $4, COALESCE($5, FALSE), $6, $7)
        ON CONFLICT (rate_plan_id, date) DO UPDATE
        SET rate = COALESCE(EXCLUDED.rate, rate_overrides.rate),
            stop_sell = COALESCE($5, rate_overrides.stop_sell),
            min_stay = COALESCE(EXCLUDED.min_stay, rate_overrides.min_stay),
            reason = COALESCE(EXCLUDED.reason, rate_overrides.reason),
            updated_at = NOW()
        RETURNING id, rate_plan_id, date, rate, stop_sell, min_stay, reason, created_at, updated_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(rate_plan_id)
    .bind(patch.date)
    .bind(patch.rate)
    .bind(patch.stop_sell)
    .bind(patch.min_stay)
    .bind(&patch.reason)
    .fetch_one(executor)
    .await
}

#[async_trait]
impl RateOverrideRepository for PgRateOverrideRepository {
    async fn find_range(
        &self,
        rate_plan_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> ApiResult<Vec<RateOverride>> {
        let overrides = sqlx::query_as::<_, RateOverride>(
            r#"
            SELECT id, rate_plan_id, date, rate, stop_sell, min_stay, reason, created_at, updated_at
            FROM rate_overrides
            WHERE rate_plan_id = $1 AND date BETWEEN $2 AND $3
            ORDER BY date
            "#,
        )
        .bind(rate_plan_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(overrides)
    }

    async fn upsert(&self, rate_plan_id: Uuid, patch: &OverridePatch) -> ApiResult<RateOverride> {
        Ok(upsert_one(&self.pool, rate_plan_id, patch).await?)
    }

    async fn bulk_upsert(&self, rate_plan_id: Uuid, patches: &[OverridePatch]) -> ApiResult<u64> {
        let mut tx = self.pool.begin().await?;

        let mut written = 0u64;
        for patch in patches {
            upsert_one(&mut *tx, rate_plan_id, patch).await?;
            written += 1;
        }

        tx.commit().await?;
        Ok(written)
    }

    async fn delete(&self, rate_plan_id: Uuid, date: NaiveDate) -> ApiResult<bool> {
        let result = sqlx::query("DELETE FROM rate_overrides WHERE rate_plan_id = $1 AND date = $2")
            .bind(rate_plan_id)
            .bind(date)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
