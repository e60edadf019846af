use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::hotels::HotelDirectory;
use crate::rate_plans::{
    ApplicableRatePlansQuery, BulkOverrideRequest, BulkWriteResult, CreateRatePlanRequest,
    OverridePatch, RateOverride, RateOverrideRepository, RatePlan, RatePlanRepository,
    UpdateRatePlanRequest,
};
use crate::reservations::ReservationRepository;
use crate::validation::check_bounds;

const DEFAULT_CURRENCY: &str = "USD";

/// Service for rate plan registry and override store business logic
#[derive(Clone)]
pub struct RatePlanService {
    directory: Arc<dyn HotelDirectory>,
    rate_plans: Arc<dyn RatePlanRepository>,
    overrides: Arc<dyn RateOverrideRepository>,
    reservations: Arc<dyn ReservationRepository>,
}

impl RatePlanService {
    /// Create a new RatePlanService
    pub fn new(
        directory: Arc<dyn HotelDirectory>,
        rate_plans: Arc<dyn RatePlanRepository>,
        overrides: Arc<dyn RateOverrideRepository>,
        reservations: Arc<dyn ReservationRepository>,
    ) -> Self {
        Self {
            directory,
            rate_plans,
            overrides,
            reservations,
        }
    }

    /// Create a new rate plan
    ///
    /// # Arguments
    /// * `hotel_id` - Hotel the plan belongs to
    /// * `request` - Plan definition
    ///
    /// # Validation
    /// - Field rules from the request DTO
    /// - min <= max for stay, advance days and validity window
    /// - Room type must be a live room type of the hotel
    /// - Code must be unique among the hotel's live plans
    /// - A public plan may not claim a channel another public plan of the
    ///   same room type already serves
    pub async fn create(&self, hotel_id: Uuid, request: CreateRatePlanRequest) -> ApiResult<RatePlan> {
        tracing::debug!("Creating rate plan {} for hotel {}", request.code, hotel_id);

        // 1. Validate request
        request.validate()?;

        let now = Utc::now();
        let plan = RatePlan {
            id: Uuid::new_v4(),
            hotel_id,
            room_type_id: request.room_type_id,
            code: request.code,
            name: request.name,
            description: request.description,
            base_rate: request.base_rate,
            currency: request
                .currency
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            pricing_type: request.pricing_type.unwrap_or_default(),
            min_stay: request.min_stay.unwrap_or(1),
            max_stay: request.max_stay,
            min_advance_days: request.min_advance_days,
            max_advance_days: request.max_advance_days,
            is_refundable: request.is_refundable.unwrap_or(true),
            cancellation_policy: request.cancellation_policy,
            is_public: request.is_public.unwrap_or(true),
            channel_codes: request.channel_codes,
            meal_plan: request.meal_plan.unwrap_or_default(),
            amenities: request.amenities,
            pricing_rules: request.pricing_rules,
            valid_from: request.valid_from,
            valid_until: request.valid_until,
            is_active: request.is_active.unwrap_or(true),
            deleted_at: None,
            created_at: now,
            updated_at: now,
        };
        validate_plan_bounds(&plan)?;

        // 2. Room type must belong to the hotel
        self.directory
            .find_room_type(hotel_id, plan.room_type_id)
            .await?
            .ok_or_else(|| ApiError::not_found("RoomType", plan.room_type_id))?;

        // 3. Code uniqueness
        if self.rate_plans.find_by_code(hotel_id, &plan.code).await?.is_some() {
            return Err(ApiError::conflict(format!(
                "Rate plan with code '{}' already exists",
                plan.code
            )));
        }

        // 4. Channel exclusivity
        self.ensure_channels_unclaimed(&plan).await?;

        // 5. Persist
        let created = self.rate_plans.insert(&plan).await?;
        tracing::info!("Created rate plan {} ({})", created.id, created.code);
        Ok(created)
    }

    /// Get a live rate plan of the hotel
    pub async fn get(&self, hotel_id: Uuid, id: Uuid) -> ApiResult<RatePlan> {
        self.rate_plans
            .find_by_id(hotel_id, id)
            .await?
            .ok_or_else(|| ApiError::not_found("RatePlan", id))
    }

    pub async fn list(&self, hotel_id: Uuid, room_type_id: Option<Uuid>) -> ApiResult<Vec<RatePlan>> {
        self.rate_plans.list(hotel_id, room_type_id).await
    }

    pub async fn find_applicable(
        &self,
        hotel_id: Uuid,
        query: &ApplicableRatePlansQuery,
    ) -> ApiResult<Vec<RatePlan>> {
        self.rate_plans
            .find_applicable(
                hotel_id,
                query.room_type_id,
                query.check_in,
                query.channel_code.as_deref(),
                query.is_public,
            )
            .await
    }

    /// Partially update a rate plan, re-validating the merged result
    pub async fn update(
        &self,
        hotel_id: Uuid,
        id: Uuid,
        request: UpdateRatePlanRequest,
    ) -> ApiResult<RatePlan> {
        tracing::debug!("Updating rate plan {}", id);

        // 1. Validate request
        request.validate()?;

        // 2. Load and merge
        let existing = self.get(hotel_id, id).await?;
        let merged = request.apply_to(existing.clone());
        validate_plan_bounds(&merged)?;

        // 3. Code change must stay unique
        if merged.code != existing.code {
            if let Some(other) = self.rate_plans.find_by_code(hotel_id, &merged.code).await? {
                if other.id != id {
                    return Err(ApiError::conflict(format!(
                        "Rate plan with code '{}' already exists",
                        merged.code
                    )));
                }
            }
        }

        // 4. Channel exclusivity when the plan's public channel claim changes
        let claim_changed = merged.channel_codes != existing.channel_codes
            || merged.is_public != existing.is_public
            || merged.is_active != existing.is_active;
        if claim_changed {
            self.ensure_channels_unclaimed(&merged).await?;
        }

        // 5. Persist
        let updated = self.rate_plans.update(&merged).await?;
        tracing::info!("Updated rate plan {}", id);
        Ok(updated)
    }

    /// Soft delete a rate plan unless an active reservation references it
    pub async fn delete(&self, hotel_id: Uuid, id: Uuid) -> ApiResult<()> {
        tracing::debug!("Deleting rate plan {}", id);

        self.get(hotel_id, id).await?;

        if self.reservations.has_active_for_rate_plan(id).await? {
            return Err(ApiError::conflict(
                "Rate plan is referenced by confirmed or checked-in reservations",
            ));
        }

        if !self.rate_plans.soft_delete(hotel_id, id).await? {
            return Err(ApiError::not_found("RatePlan", id));
        }

        tracing::info!("Soft-deleted rate plan {}", id);
        Ok(())
    }

    /// Overrides of a plan within an inclusive date range
    pub async fn get_overrides(
        &self,
        hotel_id: Uuid,
        rate_plan_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> ApiResult<Vec<RateOverride>> {
        if from > to {
            return Err(ApiError::bad_request("from must not be after to"));
        }
        self.get(hotel_id, rate_plan_id).await?;
        self.overrides.find_range(rate_plan_id, from, to).await
    }

    pub async fn upsert_override(
        &self,
        hotel_id: Uuid,
        rate_plan_id: Uuid,
        patch: OverridePatch,
    ) -> ApiResult<RateOverride> {
        patch.validate()?;
        self.get(hotel_id, rate_plan_id).await?;

        let saved = self.overrides.upsert(rate_plan_id, &patch).await?;
        tracing::info!("Upserted override for rate plan {} on {}", rate_plan_id, saved.date);
        Ok(saved)
    }

    /// Write every entry or none. Entries carrying only flags create a row
    /// with defaults when the date has no override yet.
    pub async fn bulk_upsert_overrides(
        &self,
        hotel_id: Uuid,
        rate_plan_id: Uuid,
        request: BulkOverrideRequest,
    ) -> ApiResult<BulkWriteResult> {
        request.validate()?;
        for entry in &request.overrides {
            entry.validate()?;
        }
        self.get(hotel_id, rate_plan_id).await?;

        let count = self
            .overrides
            .bulk_upsert(rate_plan_id, &request.overrides)
            .await?;
        tracing::info!("Bulk upserted {} overrides for rate plan {}", count, rate_plan_id);
        Ok(BulkWriteResult { count })
    }

    pub async fn delete_override(
        &self,
        hotel_id: Uuid,
        rate_plan_id: Uuid,
        date: NaiveDate,
    ) -> ApiResult<()> {
        self.get(hotel_id, rate_plan_id).await?;

        if !self.overrides.delete(rate_plan_id, date).await? {
            return Err(ApiError::not_found(
                "RateOverride",
                format!("{}/{}", rate_plan_id, date),
            ));
        }
        tracing::info!("Deleted override for rate plan {} on {}", rate_plan_id, date);
        Ok(())
    }

    async fn ensure_channels_unclaimed(&self, plan: &RatePlan) -> ApiResult<()> {
        if !plan.is_public || !plan.is_active || plan.channel_codes.is_empty() {
            return Ok(());
        }

        let public_plans = self
            .rate_plans
            .find_public_for_room_type(plan.room_type_id)
            .await?;

        if let Some(other) = public_plans
            .iter()
            .find(|other| other.id != plan.id && other.shares_channel_with(&plan.channel_codes))
        {
            tracing::warn!(
                "Channel collision between rate plans {} and {}",
                plan.code,
                other.code
            );
            return Err(ApiError::bad_request(format!(
                "A public rate plan ('{}') already serves one of these channels for this room type",
                other.code
            )));
        }
        Ok(())
    }
}

fn validate_plan_bounds(plan: &RatePlan) -> ApiResult<()> {
    let problems = [
        check_bounds("Stay", Some(plan.min_stay), plan.max_stay),
        check_bounds("Advance booking", plan.min_advance_days, plan.max_advance_days),
        check_bounds("Validity", plan.valid_from, plan.valid_until),
    ];

    match problems.into_iter().flatten().next() {
        Some(message) => Err(ApiError::bad_request(message)),
        None => Ok(()),
    }
}
