// Availability Checker
//
// Decides whether a room type can be sold for a stay. Two signals exist: the
// inventory ledger and reservation overlap counting. Ledger rows, when present
// for any night of the stay, are authoritative.

use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::dates::{last_night, stay_length};
use crate::error::{ApiError, ApiResult};
use crate::hotels::HotelDirectory;
use crate::inventory::{AvailabilityResult, AvailabilitySource, InventoryRepository, RoomInventory};
use crate::metrics::PerformanceMetrics;
use crate::reservations::ReservationRepository;

/// Half-open interval overlap: `[a_in, a_out)` and `[b_in, b_out)` share a night
pub fn stays_overlap(
    existing_check_in: NaiveDate,
    existing_check_out: NaiveDate,
    check_in: NaiveDate,
    check_out: NaiveDate,
) -> bool {
    existing_check_in < check_out && existing_check_out > check_in
}

/// Combine room counts and ledger rows into a verdict
///
/// Any stop-sell row closes the stay. Otherwise the smallest ledger
/// `available` wins when rows exist, falling back to `total - occupied`.
pub fn resolve_availability(
    total_rooms: i64,
    occupied: i64,
    inventory: &[RoomInventory],
) -> AvailabilityResult {
    let stop_sell = inventory.iter().any(|row| row.stop_sell);

    let (min_available, source) = match inventory.iter().map(|row| row.available).min() {
        Some(min) => (i64::from(min), AvailabilitySource::Inventory),
        None => (total_rooms - occupied, AvailabilitySource::Reservations),
    };

    let available = !stop_sell && min_available > 0;

    AvailabilityResult {
        available,
        rooms_available: if stop_sell { 0 } else { min_available.max(0) },
        total_rooms,
        occupied,
        stop_sell,
        source: if stop_sell {
            AvailabilitySource::Inventory
        } else {
            source
        },
    }
}

#[derive(Clone)]
pub struct AvailabilityChecker {
    directory: Arc<dyn HotelDirectory>,
    inventory: Arc<dyn InventoryRepository>,
    reservations: Arc<dyn ReservationRepository>,
    max_stay_nights: u32,
    metrics: PerformanceMetrics,
}

impl AvailabilityChecker {
    pub fn new(
        directory: Arc<dyn HotelDirectory>,
        inventory: Arc<dyn InventoryRepository>,
        reservations: Arc<dyn ReservationRepository>,
        max_stay_nights: u32,
        metrics: PerformanceMetrics,
    ) -> Self {
        Self {
            directory,
            inventory,
            reservations,
            max_stay_nights,
            metrics,
        }
    }

    /// Check bookability of a room type for `[check_in, check_out)`
    pub async fn check(
        &self,
        hotel_id: Uuid,
        room_type_id: Uuid,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> ApiResult<AvailabilityResult> {
        let _timer = self.metrics.start_availability_check();

        // 1. Room type must be a live room type of the hotel
        self.directory
            .find_room_type(hotel_id, room_type_id)
            .await?
            .ok_or_else(|| ApiError::not_found("RoomType", room_type_id))?;

        stay_length(check_in, check_out, self.max_stay_nights).map_err(ApiError::bad_request)?;

        // 2. Both signals
        let total_rooms = self.directory.count_sellable_rooms(room_type_id).await?;
        let occupied = self
            .reservations
            .count_overlapping_rooms(room_type_id, check_in, check_out)
            .await?;
        let inventory = self
            .inventory
            .find_range(room_type_id, check_in, last_night(check_out))
            .await?;

        // 3. Resolve
        let result = resolve_availability(total_rooms, occupied, &inventory);
        tracing::debug!(
            %room_type_id,
            %check_in,
            %check_out,
            available = result.available,
            rooms_available = result.rooms_available,
            source = ?result.source,
            "Availability checked"
        );
        Ok(result)
    }
}
