use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::hotels::HotelDirectory;
use crate::inventory::{BulkInventoryRequest, InventoryPatch, InventoryRepository, RoomInventory};
use crate::rate_plans::BulkWriteResult;
use crate::validation::check_bounds;

/// Service for inventory ledger reads and writes
#[derive(Clone)]
pub struct InventoryService {
    directory: Arc<dyn HotelDirectory>,
    inventory: Arc<dyn InventoryRepository>,
}

impl InventoryService {
    /// Create a new InventoryService
    pub fn new(directory: Arc<dyn HotelDirectory>, inventory: Arc<dyn InventoryRepository>) -> Self {
        Self {
            directory,
            inventory,
        }
    }

    /// Inventory rows of a room type within an inclusive date range
    pub async fn get(
        &self,
        hotel_id: Uuid,
        room_type_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> ApiResult<Vec<RoomInventory>> {
        if from > to {
            return Err(ApiError::bad_request("from must not be after to"));
        }
        self.ensure_room_type(hotel_id, room_type_id).await?;
        self.inventory.find_range(room_type_id, from, to).await
    }

    /// Write one date of the ledger
    ///
    /// # Arguments
    /// * `hotel_id` - Hotel owning the room type
    /// * `room_type_id` - Room type whose ledger is written
    /// * `patch` - Fields to set; omitted fields keep their stored value
    pub async fn upsert(
        &self,
        hotel_id: Uuid,
        room_type_id: Uuid,
        patch: InventoryPatch,
    ) -> ApiResult<RoomInventory> {
        // 1. Validate request
        validate_patch(&patch)?;

        // 2. Room type must belong to the hotel
        self.ensure_room_type(hotel_id, room_type_id).await?;

        // 3. Stay bounds must hold once merged with the stored row
        let stored = self
            .inventory
            .find_range(room_type_id, patch.date, patch.date)
            .await?;
        check_merged_stay(&patch, stored.first())?;

        // 4. Persist, defaulting the room count for new rows
        let default_total = self.default_total(room_type_id).await?;
        let saved = self.inventory.upsert(room_type_id, &patch, default_total).await?;

        tracing::info!(
            "Upserted inventory for room type {} on {} (available {})",
            room_type_id,
            saved.date,
            saved.available
        );
        Ok(saved)
    }

    /// Write every entry or none
    pub async fn bulk_upsert(
        &self,
        hotel_id: Uuid,
        room_type_id: Uuid,
        request: BulkInventoryRequest,
    ) -> ApiResult<BulkWriteResult> {
        request.validate()?;
        for entry in &request.entries {
            validate_patch(entry)?;
        }
        self.ensure_room_type(hotel_id, room_type_id).await?;

        if let (Some(from), Some(to)) = (
            request.entries.iter().map(|e| e.date).min(),
            request.entries.iter().map(|e| e.date).max(),
        ) {
            let stored = self.inventory.find_range(room_type_id, from, to).await?;
            for entry in &request.entries {
                check_merged_stay(entry, stored.iter().find(|row| row.date == entry.date))?;
            }
        }

        let default_total = self.default_total(room_type_id).await?;
        let count = self
            .inventory
            .bulk_upsert(room_type_id, &request.entries, default_total)
            .await?;

        tracing::info!("Bulk upserted {} inventory rows for room type {}", count, room_type_id);
        Ok(BulkWriteResult { count })
    }

    async fn ensure_room_type(&self, hotel_id: Uuid, room_type_id: Uuid) -> ApiResult<()> {
        self.directory
            .find_room_type(hotel_id, room_type_id)
            .await?
            .ok_or_else(|| ApiError::not_found("RoomType", room_type_id))?;
        Ok(())
    }

    async fn default_total(&self, room_type_id: Uuid) -> ApiResult<i32> {
        let rooms = self.directory.count_sellable_rooms(room_type_id).await?;
        i32::try_from(rooms)
            .map_err(|_| ApiError::InternalError(format!("Room count {} out of range", rooms)))
    }
}

fn validate_patch(patch: &InventoryPatch) -> ApiResult<()> {
    patch.validate()?;
    match check_bounds("Stay", patch.min_stay, patch.max_stay) {
        Some(message) => Err(ApiError::bad_request(message)),
        None => Ok(()),
    }
}

/// Stay bounds of the row as it will be after the patch is merged
fn check_merged_stay(patch: &InventoryPatch, stored: Option<&RoomInventory>) -> ApiResult<()> {
    let min_stay = patch.min_stay.or_else(|| stored.and_then(|row| row.min_stay));
    let max_stay = patch.max_stay.or_else(|| stored.and_then(|row| row.max_stay));
    match check_bounds("Stay", min_stay, max_stay) {
        Some(message) => Err(ApiError::bad_request(message)),
        None => Ok(()),
    }
}
