use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::dates::{nullable_wire_date, option_wire_date, wire_date};
use crate::rate_plans::rules::{AppliedRule, PricingRule};
use crate::validation::{
    validate_channel_codes, validate_currency_code, validate_non_negative_amount,
};

/// How a plan's price is expressed. Both are computed per night.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PricingType {
    Daily,
    Flat,
}

impl Default for PricingType {
    fn default() -> Self {
        PricingType::Daily
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MealPlan {
    RoomOnly,
    Breakfast,
    HalfBoard,
    FullBoard,
    AllInclusive,
}

impl Default for MealPlan {
    fn default() -> Self {
        MealPlan::RoomOnly
    }
}

/// Database row for a rate plan. `pricing_rules` is JSONB.
#[derive(Debug, Clone, FromRow)]
pub struct RatePlanRow {
    pub id: Uuid,
    pub hotel_id: Uuid,
    pub room_type_id: Uuid,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub base_rate: Decimal,
    pub currency: String,
    pub pricing_type: PricingType,
    pub min_stay: i32,
    pub max_stay: Option<i32>,
    pub min_advance_days: Option<i32>,
    pub max_advance_days: Option<i32>,
    pub is_refundable: bool,
    pub cancellation_policy: Option<String>,
    pub is_public: bool,
    pub channel_codes: Vec<String>,
    pub meal_plan: MealPlan,
    pub amenities: Vec<String>,
    pub pricing_rules: Json<Vec<PricingRule>>,
    pub valid_from: Option<NaiveDate>,
    pub valid_until: Option<NaiveDate>,
    pub is_active: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Rate plan domain model
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RatePlan {
    pub id: Uuid,
    pub hotel_id: Uuid,
    pub room_type_id: Uuid,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub base_rate: Decimal,
    pub currency: String,
    pub pricing_type: PricingType,
    pub min_stay: i32,
    pub max_stay: Option<i32>,
    pub min_advance_days: Option<i32>,
    pub max_advance_days: Option<i32>,
    pub is_refundable: bool,
    pub cancellation_policy: Option<String>,
    pub is_public: bool,
    pub channel_codes: Vec<String>,
    pub meal_plan: MealPlan,
    pub amenities: Vec<String>,
    #[schema(value_type = Vec<Object>)]
    pub pricing_rules: Vec<PricingRule>,
    pub valid_from: Option<NaiveDate>,
    pub valid_until: Option<NaiveDate>,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<RatePlanRow> for RatePlan {
    fn from(row: RatePlanRow) -> Self {
        Self {
            id: row.id,
            hotel_id: row.hotel_id,
            room_type_id: row.room_type_id,
            code: row.code,
            name: row.name,
            description: row.description,
            base_rate: row.base_rate,
            currency: row.currency,
            pricing_type: row.pricing_type,
            min_stay: row.min_stay,
            max_stay: row.max_stay,
            min_advance_days: row.min_advance_days,
            max_advance_days: row.max_advance_days,
            is_refundable: row.is_refundable,
            cancellation_policy: row.cancellation_policy,
            is_public: row.is_public,
            channel_codes: row.channel_codes,
            meal_plan: row.meal_plan,
            amenities: row.amenities,
            pricing_rules: row.pricing_rules.0,
            valid_from: row.valid_from,
            valid_until: row.valid_until,
            is_active: row.is_active,
            deleted_at: row.deleted_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl RatePlan {
    /// Stay and advance-booking restrictions for a request
    pub fn restriction_compliance(&self, nights: i64, days_in_advance: i64) -> RestrictionCompliance {
        let min_stay_met = nights >= i64::from(self.min_stay);
        let max_stay_met = self.max_stay.map_or(true, |max| nights <= i64::from(max));
        let advance_booking_met = self
            .min_advance_days
            .map_or(true, |min| days_in_advance >= i64::from(min))
            && self
                .max_advance_days
                .map_or(true, |max| days_in_advance <= i64::from(max));

        RestrictionCompliance {
            min_stay_met,
            max_stay_met,
            advance_booking_met,
        }
    }

    /// Channels this public plan claims on its room type
    pub fn shares_channel_with(&self, channels: &[String]) -> bool {
        self.channel_codes.iter().any(|c| channels.contains(c))
    }
}

/// Request DTO for creating a rate plan
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRatePlanRequest {
    pub room_type_id: Uuid,
    #[validate(length(min = 1, max = 50, message = "Code must be 1-50 characters"))]
    pub code: String,
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(custom = "validate_non_negative_amount")]
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub base_rate: Decimal,
    #[validate(custom = "validate_currency_code")]
    pub currency: Option<String>,
    pub pricing_type: Option<PricingType>,
    #[validate(range(min = 1, message = "Minimum stay must be at least 1 night"))]
    pub min_stay: Option<i32>,
    #[validate(range(min = 1, message = "Maximum stay must be at least 1 night"))]
    pub max_stay: Option<i32>,
    #[validate(range(min = 0, message = "Advance days cannot be negative"))]
    pub min_advance_days: Option<i32>,
    #[validate(range(min = 0, message = "Advance days cannot be negative"))]
    pub max_advance_days: Option<i32>,
    pub is_refundable: Option<bool>,
    pub cancellation_policy: Option<String>,
    pub is_public: Option<bool>,
    #[serde(default)]
    #[validate(custom = "validate_channel_codes")]
    pub channel_codes: Vec<String>,
    pub meal_plan: Option<MealPlan>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub pricing_rules: Vec<PricingRule>,
    #[serde(default, deserialize_with = "option_wire_date::deserialize")]
    pub valid_from: Option<NaiveDate>,
    #[serde(default, deserialize_with = "option_wire_date::deserialize")]
    pub valid_until: Option<NaiveDate>,
    pub is_active: Option<bool>,
}

/// Request DTO for partially updating a rate plan. Omitted fields are kept;
/// an explicit `null` clears a nullable field.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRatePlanRequest {
    #[validate(length(min = 1, max = 50, message = "Code must be 1-50 characters"))]
    pub code: Option<String>,
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[validate(custom = "validate_non_negative_amount")]
    #[serde(default, with = "rust_decimal::serde::float_option")]
    #[schema(value_type = Option<f64>)]
    pub base_rate: Option<Decimal>,
    #[validate(custom = "validate_currency_code")]
    pub currency: Option<String>,
    pub pricing_type: Option<PricingType>,
    #[validate(range(min = 1, message = "Minimum stay must be at least 1 night"))]
    pub min_stay: Option<i32>,
    #[validate(range(min = 1, message = "Maximum stay must be at least 1 night"))]
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<i32>)]
    pub max_stay: Option<Option<i32>>,
    #[validate(range(min = 0, message = "Advance days cannot be negative"))]
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<i32>)]
    pub min_advance_days: Option<Option<i32>>,
    #[validate(range(min = 0, message = "Advance days cannot be negative"))]
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<i32>)]
    pub max_advance_days: Option<Option<i32>>,
    pub is_refundable: Option<bool>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub cancellation_policy: Option<Option<String>>,
    pub is_public: Option<bool>,
    #[validate(custom = "validate_channel_codes")]
    pub channel_codes: Option<Vec<String>>,
    pub meal_plan: Option<MealPlan>,
    pub amenities: Option<Vec<String>>,
    #[schema(value_type = Option<Vec<Object>>)]
    pub pricing_rules: Option<Vec<PricingRule>>,
    #[serde(default, deserialize_with = "nullable_wire_date::deserialize")]
    #[schema(value_type = Option<String>)]
    pub valid_from: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "nullable_wire_date::deserialize")]
    #[schema(value_type = Option<String>)]
    pub valid_until: Option<Option<NaiveDate>>,
    pub is_active: Option<bool>,
}

impl UpdateRatePlanRequest {
    /// Apply the patch onto an existing plan, returning the merged plan
    pub fn apply_to(self, mut plan: RatePlan) -> RatePlan {
        if let Some(code) = self.code {
            plan.code = code;
        }
        if let Some(name) = self.name {
            plan.name = name;
        }
        if let Some(description) = self.description {
            plan.description = description;
        }
        if let Some(base_rate) = self.base_rate {
            plan.base_rate = base_rate;
        }
        if let Some(currency) = self.currency {
            plan.currency = currency;
        }
        if let Some(pricing_type) = self.pricing_type {
            plan.pricing_type = pricing_type;
        }
        if let Some(min_stay) = self.min_stay {
            plan.min_stay = min_stay;
        }
        if let Some(max_stay) = self.max_stay {
            plan.max_stay = max_stay;
        }
        if let Some(min_advance_days) = self.min_advance_days {
            plan.min_advance_days = min_advance_days;
        }
        if let Some(max_advance_days) = self.max_advance_days {
            plan.max_advance_days = max_advance_days;
        }
        if let Some(is_refundable) = self.is_refundable {
            plan.is_refundable = is_refundable;
        }
        if let Some(cancellation_policy) = self.cancellation_policy {
            plan.cancellation_policy = cancellation_policy;
        }
        if let Some(is_public) = self.is_public {
            plan.is_public = is_public;
        }
        if let Some(channel_codes) = self.channel_codes {
            plan.channel_codes = channel_codes;
        }
        if let Some(meal_plan) = self.meal_plan {
            plan.meal_plan = meal_plan;
        }
        if let Some(amenities) = self.amenities {
            plan.amenities = amenities;
        }
        if let Some(pricing_rules) = self.pricing_rules {
            plan.pricing_rules = pricing_rules;
        }
        if let Some(valid_from) = self.valid_from {
            plan.valid_from = valid_from;
        }
        if let Some(valid_until) = self.valid_until {
            plan.valid_until = valid_until;
        }
        if let Some(is_active) = self.is_active {
            plan.is_active = is_active;
        }
        plan
    }
}

/// Query parameters for listing plans
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct ListRatePlansQuery {
    pub room_type_id: Option<Uuid>,
}

/// Query parameters for GET /rate-plans/applicable
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct ApplicableRatePlansQuery {
    pub room_type_id: Uuid,
    #[serde(deserialize_with = "wire_date::deserialize")]
    #[param(value_type = String, example = "2025-06-01")]
    pub check_in: NaiveDate,
    pub channel_code: Option<String>,
    pub is_public: Option<bool>,
}

/// Per rate-plan, per-date override row
#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RateOverride {
    pub id: Uuid,
    pub rate_plan_id: Uuid,
    pub date: NaiveDate,
    #[serde(with = "rust_decimal::serde::float_option")]
    #[schema(value_type = Option<f64>)]
    pub rate: Option<Decimal>,
    pub stop_sell: bool,
    pub min_stay: Option<i32>,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial override write. Omitted fields keep their stored value; a new
/// row starts with no rate, `stop_sell = false` and no minimum stay.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OverridePatch {
    #[serde(deserialize_with = "wire_date::deserialize")]
    #[schema(value_type = String, example = "2025-06-02")]
    pub date: NaiveDate,
    #[validate(custom = "validate_non_negative_amount")]
    #[serde(default, with = "rust_decimal::serde::float_option")]
    #[schema(value_type = Option<f64>)]
    pub rate: Option<Decimal>,
    pub stop_sell: Option<bool>,
    #[validate(range(min = 1, message = "Minimum stay must be at least 1 night"))]
    pub min_stay: Option<i32>,
    pub reason: Option<String>,
}

impl OverridePatch {
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            date,
            rate: None,
            stop_sell: None,
            min_stay: None,
            reason: None,
        }
    }
}

/// Bulk override request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkOverrideRequest {
    #[validate(length(min = 1, message = "At least one override entry is required"))]
    pub overrides: Vec<OverridePatch>,
}

/// Result of a bulk write
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkWriteResult {
    pub count: u64,
}

/// Inclusive date range query (`from`, `to`)
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DateRangeQuery {
    #[serde(deserialize_with = "wire_date::deserialize")]
    #[param(value_type = String, example = "2025-06-01")]
    pub from: NaiveDate,
    #[serde(deserialize_with = "wire_date::deserialize")]
    #[param(value_type = String, example = "2025-06-30")]
    pub to: NaiveDate,
}

/// Body of POST /rate-plans/calculate
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CalculateRatesRequest {
    pub room_type_id: Uuid,
    #[serde(deserialize_with = "wire_date::deserialize")]
    #[schema(value_type = String, example = "2025-06-01")]
    pub check_in: NaiveDate,
    #[serde(deserialize_with = "wire_date::deserialize")]
    #[schema(value_type = String, example = "2025-06-04")]
    pub check_out: NaiveDate,
    pub channel_code: Option<String>,
}

/// One priced night of an offer
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NightlyRate {
    pub date: NaiveDate,
    /// Override rate when present, otherwise the plan base rate
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub base_rate: Decimal,
    pub has_override: bool,
    /// Stop-sell flag carried by the night's override, informational only
    pub stop_sell: bool,
    pub applied_rules: Vec<AppliedRule>,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub rate: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RestrictionCompliance {
    pub min_stay_met: bool,
    pub max_stay_met: bool,
    pub advance_booking_met: bool,
}

impl RestrictionCompliance {
    pub fn all_met(&self) -> bool {
        self.min_stay_met && self.max_stay_met && self.advance_booking_met
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Inclusions {
    pub meal_plan: MealPlan,
    pub amenities: Vec<String>,
}

/// A bookable, fully priced rate plan for the requested stay
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RateOffer {
    pub rate_plan_id: Uuid,
    pub code: String,
    pub name: String,
    pub pricing_type: PricingType,
    pub currency: String,
    pub nights: i64,
    pub nightly_rates: Vec<NightlyRate>,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub taxes: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub total: Decimal,
    pub restrictions: RestrictionCompliance,
    pub inclusions: Inclusions,
    pub is_refundable: bool,
    pub cancellation_policy: Option<String>,
}

/// Response data of POST /rate-plans/calculate
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RateCalculationResult {
    pub room_type_id: Uuid,
    pub room_type_name: String,
    pub available_rate_plans: Vec<RateOffer>,
    #[serde(with = "rust_decimal::serde::float_option")]
    #[schema(value_type = Option<f64>)]
    pub best_available_rate: Option<Decimal>,
}
