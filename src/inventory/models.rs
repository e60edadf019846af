use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::dates::wire_date;
use crate::validation::validate_non_negative_amount;

/// Sellable rooms implied by the ledger counts. May be negative.
pub fn compute_available(
    total_rooms: i32,
    out_of_order: i32,
    blocked: i32,
    sold: i32,
    overbooking_limit: i32,
) -> i32 {
    total_rooms - out_of_order - blocked - sold + overbooking_limit
}

/// Per room type, per date inventory record
#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomInventory {
    pub id: Uuid,
    pub room_type_id: Uuid,
    pub date: NaiveDate,
    pub total_rooms: i32,
    pub out_of_order: i32,
    pub blocked: i32,
    pub sold: i32,
    pub overbooking_limit: i32,
    pub available: i32,
    pub stop_sell: bool,
    pub min_stay: Option<i32>,
    pub max_stay: Option<i32>,
    pub closed_to_arrival: bool,
    pub closed_to_departure: bool,
    #[serde(with = "rust_decimal::serde::float_option")]
    #[schema(value_type = Option<f64>)]
    pub rate_override: Option<Decimal>,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RoomInventory {
    /// Refresh `available` from the counts
    pub fn recompute_available(&mut self) {
        self.available = compute_available(
            self.total_rooms,
            self.out_of_order,
            self.blocked,
            self.sold,
            self.overbooking_limit,
        );
    }
}

/// Partial inventory write for one date; omitted fields keep their value
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryPatch {
    #[serde(deserialize_with = "wire_date::deserialize")]
    #[schema(value_type = String, example = "2025-06-02")]
    pub date: NaiveDate,
    #[validate(range(min = 0, message = "Total rooms cannot be negative"))]
    pub total_rooms: Option<i32>,
    #[validate(range(min = 0, message = "Out-of-order count cannot be negative"))]
    pub out_of_order: Option<i32>,
    #[validate(range(min = 0, message = "Blocked count cannot be negative"))]
    pub blocked: Option<i32>,
    #[validate(range(min = 0, message = "Sold count cannot be negative"))]
    pub sold: Option<i32>,
    #[validate(range(min = 0, message = "Overbooking limit cannot be negative"))]
    pub overbooking_limit: Option<i32>,
    pub stop_sell: Option<bool>,
    #[validate(range(min = 1, message = "Minimum stay must be at least 1 night"))]
    pub min_stay: Option<i32>,
    #[validate(range(min = 1, message = "Maximum stay must be at least 1 night"))]
    pub max_stay: Option<i32>,
    pub closed_to_arrival: Option<bool>,
    pub closed_to_departure: Option<bool>,
    #[validate(custom = "validate_non_negative_amount")]
    #[serde(default, with = "rust_decimal::serde::float_option")]
    #[schema(value_type = Option<f64>)]
    pub rate_override: Option<Decimal>,
    pub reason: Option<String>,
}

impl InventoryPatch {
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            date,
            total_rooms: None,
            out_of_order: None,
            blocked: None,
            sold: None,
            overbooking_limit: None,
            stop_sell: None,
            min_stay: None,
            max_stay: None,
            closed_to_arrival: None,
            closed_to_departure: None,
            rate_override: None,
            reason: None,
        }
    }
}

/// Request DTO for POST /room-types/:id/inventory/bulk
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkInventoryRequest {
    #[validate(length(min = 1, message = "At least one inventory entry is required"))]
    pub entries: Vec<InventoryPatch>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuery {
    #[serde(deserialize_with = "wire_date::deserialize")]
    #[param(value_type = String, example = "2025-06-01")]
    pub check_in: NaiveDate,
    #[serde(deserialize_with = "wire_date::deserialize")]
    #[param(value_type = String, example = "2025-06-04")]
    pub check_out: NaiveDate,
}

/// Which signal decided availability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AvailabilitySource {
    Inventory,
    Reservations,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResult {
    pub available: bool,
    pub rooms_available: i64,
    pub total_rooms: i64,
    pub occupied: i64,
    pub stop_sell: bool,
    pub source: AvailabilitySource,
}
