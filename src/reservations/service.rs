use std::sync::Arc;

use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::reservations::{Reservation, ReservationRepository, ReservationStatus};

/// Service for the reservation status workflow
#[derive(Clone)]
pub struct ReservationService {
    reservations: Arc<dyn ReservationRepository>,
}

impl ReservationService {
    /// Create a new ReservationService
    pub fn new(reservations: Arc<dyn ReservationRepository>) -> Self {
        Self { reservations }
    }

    pub async fn get(&self, hotel_id: Uuid, id: Uuid) -> ApiResult<Reservation> {
        self.reservations
            .find_by_id(hotel_id, id)
            .await?
            .ok_or_else(|| ApiError::not_found("Reservation", id))
    }

    /// Move a reservation to a new status
    ///
    /// Invalid transitions are BadRequest; moving to the current status is a
    /// no-op that returns the reservation unchanged.
    pub async fn update_status(
        &self,
        hotel_id: Uuid,
        id: Uuid,
        status: ReservationStatus,
    ) -> ApiResult<Reservation> {
        tracing::debug!("Updating reservation {} to {}", id, status);

        let updated = self.reservations.update_status(hotel_id, id, status).await?;

        tracing::info!("Reservation {} is now {}", id, updated.status);
        Ok(updated)
    }
}
