use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::rate_plans::{RatePlan, RatePlanRow};

const RATE_PLAN_COLUMNS: &str = r#"
    id, hotel_id, room_type_id, code, name, description, base_rate, currency,
    pricing_type, min_stay, max_stay, min_advance_days, max_advance_days,
    is_refundable, cancellation_policy, is_public, channel_codes, meal_plan,
    amenities, pricing_rules, valid_from, valid_until, is_active, deleted_at,
    created_at, updated_at
"#;

/// Rate plan registry storage. Soft-deleted plans are invisible to every lookup.
#[async_trait]
pub trait RatePlanRepository: Send + Sync {
    async fn insert(&self, plan: &RatePlan) -> ApiResult<RatePlan>;

    async fn find_by_id(&self, hotel_id: Uuid, id: Uuid) -> ApiResult<Option<RatePlan>>;

    async fn find_by_code(&self, hotel_id: Uuid, code: &str) -> ApiResult<Option<RatePlan>>;

    async fn list(&self, hotel_id: Uuid, room_type_id: Option<Uuid>) -> ApiResult<Vec<RatePlan>>;

    /// Active plans valid on `check_in`, cheapest base rate first
    async fn find_applicable(
        &self,
        hotel_id: Uuid,
        room_type_id: Uuid,
        check_in: NaiveDate,
        channel_code: Option<&str>,
        is_public: Option<bool>,
    ) -> ApiResult<Vec<RatePlan>>;

    /// Active public plans of a room type
    async fn find_public_for_room_type(&self, room_type_id: Uuid) -> ApiResult<Vec<RatePlan>>;

    async fn update(&self, plan: &RatePlan) -> ApiResult<RatePlan>;

    /// Returns false when no live plan matched
    async fn soft_delete(&self, hotel_id: Uuid, id: Uuid) -> ApiResult<bool>;
}

/// Repository for rate plan operations
#[derive(Clone)]
pub struct PgRatePlanRepository {
    pool: PgPool,
}

impl PgRatePlanRepository {
    /// Create a new PgRatePlanRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Map a unique index hit on (hotel_id, code) to a Conflict
fn map_code_conflict(error: sqlx::Error, code: &str) -> ApiError {
    match &error {
        sqlx::Error::Database(db_error) if db_error.is_unique_violation() => {
            ApiError::conflict(format!("Rate plan with code '{}' already exists", code))
        }
        _ => ApiError::DatabaseError(error),
    }
}

#[async_trait]
impl RatePlanRepository for PgRatePlanRepository {
    async fn insert(&self, plan: &RatePlan) -> ApiResult<RatePlan> {
        let row = sqlx::query_as::<_, RatePlanRow>(&format!(
            r#"
            INSERT INTO rate_plans (
                id, hotel_id, room_type_id, code, name, description, base_rate, currency,
                pricing_type, min_stay, max_stay, min_advance_days, max_advance_days,
                is_refundable, cancellation_policy, is_public, channel_codes, meal_plan,
                amenities, pricing_rules, valid_from, valid_until, is_active
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                    $16, $17, $18, $19, $20, $21, $22, $23)
            RETURNING {}
            "#,
            RATE_PLAN_COLUMNS
        ))
        .bind(plan.id)
        .bind(plan.hotel_id)
        .bind(plan.room_type_id)
        .bind(&plan.code)
        .bind(&plan.name)
        .bind(&plan.description)
        .bind(plan.base_rate)
        .bind(&plan.currency)
        .bind(plan.pricing_type)
        .bind(plan.min_stay)
        .bind(plan.max_stay)
        .bind(plan.min_advance_days)
        .bind(plan.max_advance_days)
        .bind(plan.is_refundable)
        .bind(&plan.cancellation_policy)
        .bind(plan.is_public)
        .bind(&plan.channel_codes)
        .bind(plan.meal_plan)
        .bind(&plan.amenities)
        .bind(Json(plan.pricing_rules.clone()))
        .bind(plan.valid_from)
        .bind(plan.valid_until)
        .bind(plan.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_code_conflict(e, &plan.code))?;

        Ok(row.into())
    }

    async fn find_by_id(&self, hotel_id: Uuid, id: Uuid) -> ApiResult<Option<RatePlan>> {
        let row = sqlx::query_as::<_, RatePlanRow>(&format!(
            "SELECT {} FROM rate_plans WHERE id = $1 AND hotel_id = $2 AND deleted_at IS NULL",
            RATE_PLAN_COLUMNS
        ))
        .bind(id)
        .bind(hotel_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(RatePlan::from))
    }

    async fn find_by_code(&self, hotel_id: Uuid, code: &str) -> ApiResult<Option<RatePlan>> {
        let row = sqlx::query_as::<_, RatePlanRow>(&format!(
            "SELECT {} FROM rate_plans WHERE hotel_id = $1 AND code = $2 AND deleted_at IS NULL",
            RATE_PLAN_COLUMNS
        ))
        .bind(hotel_id)
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(RatePlan::from))
    }

    async fn list(&self, hotel_id: Uuid, room_type_id: Option<Uuid>) -> ApiResult<Vec<RatePlan>> {
        let rows = sqlx::query_as::<_, RatePlanRow>(&format!(
            r#"
            SELECT {}
            FROM rate_plans
            WHERE hotel_id = $1
              AND ($2::uuid IS NULL OR room_type_id = $2)
              AND deleted_at IS NULL
            ORDER BY code
            "#,
            RATE_PLAN_COLUMNS
        ))
        .bind(hotel_id)
        .bind(room_type_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(RatePlan::from).collect())
    }

    async fn find_applicable(
        &self,
        hotel_id: Uuid,
        room_type_id: Uuid,
        check_in: NaiveDate,
        channel_code: Option<&str>,
        is_public: Option<bool>,
    ) -> ApiResult<Vec<RatePlan>> {
        tracing::debug!(
            %hotel_id, %room_type_id, %check_in, ?channel_code, ?is_public,
            "Finding applicable rate plans"
        );

        let rows = sqlx::query_as::<_, RatePlanRow>(&format!(
            r#"
            SELECT {}
            FROM rate_plans
            WHERE hotel_id = $1
              AND room_type_id = $2
              AND is_active = TRUE
              AND deleted_at IS NULL
              AND (valid_from IS NULL OR valid_from <= $3)
              AND (valid_until IS NULL OR valid_until >= $3)
              AND ($4::text IS NULL OR $4 = ANY(channel_codes))
              AND ($5::boolean IS NULL OR is_public = $5)
            ORDER BY base_rate ASC
            "#,
            RATE_PLAN_COLUMNS
        ))
        .bind(hotel_id)
        .bind(room_type_id)
        .bind(check_in)
        .bind(channel_code)
        .bind(is_public)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(RatePlan::from).collect())
    }

    async fn find_public_for_room_type(&self, room_type_id: Uuid) -> ApiResult<Vec<RatePlan>> {
        let rows = sqlx::query_as::<_, RatePlanRow>(&format!(
            r#"
            SELECT {}
            FROM rate_plans
            WHERE room_type_id = $1
              AND is_public = TRUE
              AND is_active = TRUE
              AND deleted_at IS NULL
            "#,
            RATE_PLAN_COLUMNS
        ))
        .bind(room_type_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(RatePlan::from).collect())
    }

    async fn update(&self, plan: &RatePlan) -> ApiResult<RatePlan> {
        let row = sqlx::query_as::<_, RatePlanRow>(&format!(
            r#"
            UPDATE rate_plans
            SET code = $3,
                name = $4,
                description = $5,
                base_rate = $6,
                currency = $7,
                pricing_type = $8,
                min_stay = $9,
                max_stay = $10,
                min_advance_days = $11,
                max_advance_days = $12,
                is_refundable = $13,
                cancellation_policy = $14,
                is_public = $15,
                channel_codes = $16,
                meal_plan = $17,
                amenities = $18,
                pricing_rules = $19,
                valid_from = $20,
                valid_until = $21,
                is_active = $22,
                updated_at = NOW()
            WHERE id = $1 AND hotel_id = $2 AND deleted_at IS NULL
            RETURNING {}
            "#,
            RATE_PLAN_COLUMNS
        ))
        .bind(plan.id)
        .bind(plan.hotel_id)
        .bind(&plan.code)
        .bind(&plan.name)
        .bind(&plan.description)
        .bind(plan.base_rate)
        .bind(&plan.currency)
        .bind(plan.pricing_type)
        .bind(plan.min_stay)
        .bind(plan.max_stay)
        .bind(plan.min_advance_days)
        .bind(plan.max_advance_days)
        .bind(plan.is_refundable)
        .bind(&plan.cancellation_policy)
        .bind(plan.is_public)
        .bind(&plan.channel_codes)
        .bind(plan.meal_plan)
        .bind(&plan.amenities)
        .bind(Json(plan.pricing_rules.clone()))
        .bind(plan.valid_from)
        .bind(plan.valid_until)
        .bind(plan.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_code_conflict(e, &plan.code))?
        .ok_or_else(|| ApiError::not_found("RatePlan", plan.id))?;

        Ok(row.into())
    }

    async fn soft_delete(&self, hotel_id: Uuid, id: Uuid) -> ApiResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE rate_plans
            SET deleted_at = NOW(), is_active = FALSE, updated_at = NOW()
            WHERE id = $1 AND hotel_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(hotel_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
