// HTTP handlers for reservation workflow endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::AuthenticatedUser;
use crate::error::ApiResult;
use crate::hotels::authorize_hotel_mutation;
use crate::reservations::{Reservation, UpdateReservationStatusRequest};
use crate::response::ApiResponse;

/// Handler for PATCH /organizations/:org_id/hotels/:hotel_id/reservations/:id/status
#[utoipa::path(
    patch,
    path = "/organizations/{org_id}/hotels/{hotel_id}/reservations/{id}/status",
    params(
        ("org_id" = Uuid, Path, description = "Organization ID"),
        ("hotel_id" = Uuid, Path, description = "Hotel ID"),
        ("id" = Uuid, Path, description = "Reservation ID")
    ),
    request_body = UpdateReservationStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = Reservation),
        (status = 400, description = "Invalid status transition"),
        (status = 404, description = "Reservation not found")
    ),
    security(("bearer_auth" = [])),
    tag = "reservations"
)]
pub async fn update_reservation_status_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((org_id, hotel_id, id)): Path<(Uuid, Uuid, Uuid)>,
    Json(request): Json<UpdateReservationStatusRequest>,
) -> ApiResult<Json<ApiResponse<Reservation>>> {
    authorize_hotel_mutation(state.directory.as_ref(), &user, org_id, hotel_id).await?;

    let reservation = state
        .reservation_service
        .update_status(hotel_id, id, request.status)
        .await?;
    Ok(Json(ApiResponse::ok("Reservation status updated successfully", reservation)))
}
