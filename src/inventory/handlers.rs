// HTTP handlers for inventory ledger and availability endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::AuthenticatedUser;
use crate::error::ApiResult;
use crate::hotels::{authorize_hotel, authorize_hotel_mutation};
use crate::inventory::{
    AvailabilityQuery, AvailabilityResult, BulkInventoryRequest, InventoryPatch, RoomInventory,
};
use crate::rate_plans::{BulkWriteResult, DateRangeQuery};
use crate::response::ApiResponse;

/// Handler for GET /organizations/:org_id/hotels/:hotel_id/room-types/:id/inventory
#[utoipa::path(
    get,
    path = "/organizations/{org_id}/hotels/{hotel_id}/room-types/{id}/inventory",
    params(
        ("org_id" = Uuid, Path, description = "Organization ID"),
        ("hotel_id" = Uuid, Path, description = "Hotel ID"),
        ("id" = Uuid, Path, description = "Room type ID"),
        DateRangeQuery
    ),
    responses(
        (status = 200, description = "Inventory rows in the inclusive range", body = Vec<RoomInventory>),
        (status = 404, description = "Room type not found")
    ),
    security(("bearer_auth" = [])),
    tag = "inventory"
)]
pub async fn get_inventory_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((org_id, hotel_id, id)): Path<(Uuid, Uuid, Uuid)>,
    Query(range): Query<DateRangeQuery>,
) -> ApiResult<Json<ApiResponse<Vec<RoomInventory>>>> {
    authorize_hotel(state.directory.as_ref(), &user, org_id, hotel_id).await?;

    let rows = state
        .inventory_service
        .get(hotel_id, id, range.from, range.to)
        .await?;
    Ok(Json(ApiResponse::ok("Inventory retrieved successfully", rows)))
}

/// Handler for PUT /organizations/:org_id/hotels/:hotel_id/room-types/:id/inventory
#[utoipa::path(
    put,
    path = "/organizations/{org_id}/hotels/{hotel_id}/room-types/{id}/inventory",
    params(
        ("org_id" = Uuid, Path, description = "Organization ID"),
        ("hotel_id" = Uuid, Path, description = "Hotel ID"),
        ("id" = Uuid, Path, description = "Room type ID")
    ),
    request_body = InventoryPatch,
    responses(
        (status = 200, description = "Inventory row written", body = RoomInventory),
        (status = 400, description = "Invalid counts or restrictions"),
        (status = 404, description = "Room type not found")
    ),
    security(("bearer_auth" = [])),
    tag = "inventory"
)]
pub async fn upsert_inventory_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((org_id, hotel_id, id)): Path<(Uuid, Uuid, Uuid)>,
    Json(patch): Json<InventoryPatch>,
) -> ApiResult<Json<ApiResponse<RoomInventory>>> {
    authorize_hotel_mutation(state.directory.as_ref(), &user, org_id, hotel_id).await?;

    let row = state.inventory_service.upsert(hotel_id, id, patch).await?;
    Ok(Json(ApiResponse::ok("Inventory updated successfully", row)))
}

/// Handler for POST /organizations/:org_id/hotels/:hotel_id/room-types/:id/inventory/bulk
#[utoipa::path(
    post,
    path = "/organizations/{org_id}/hotels/{hotel_id}/room-types/{id}/inventory/bulk",
    params(
        ("org_id" = Uuid, Path, description = "Organization ID"),
        ("hotel_id" = Uuid, Path, description = "Hotel ID"),
        ("id" = Uuid, Path, description = "Room type ID")
    ),
    request_body = BulkInventoryRequest,
    responses(
        (status = 200, description = "All rows written", body = BulkWriteResult),
        (status = 400, description = "An entry failed validation; nothing was written")
    ),
    security(("bearer_auth" = [])),
    tag = "inventory"
)]
pub async fn bulk_upsert_inventory_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((org_id, hotel_id, id)): Path<(Uuid, Uuid, Uuid)>,
    Json(request): Json<BulkInventoryRequest>,
) -> ApiResult<Json<ApiResponse<BulkWriteResult>>> {
    authorize_hotel_mutation(state.directory.as_ref(), &user, org_id, hotel_id).await?;

    let result = state
        .inventory_service
        .bulk_upsert(hotel_id, id, request)
        .await?;
    Ok(Json(ApiResponse::ok("Inventory bulk update completed", result)))
}

/// Handler for GET /organizations/:org_id/hotels/:hotel_id/room-types/:id/availability
#[utoipa::path(
    get,
    path = "/organizations/{org_id}/hotels/{hotel_id}/room-types/{id}/availability",
    params(
        ("org_id" = Uuid, Path, description = "Organization ID"),
        ("hotel_id" = Uuid, Path, description = "Hotel ID"),
        ("id" = Uuid, Path, description = "Room type ID"),
        AvailabilityQuery
    ),
    responses(
        (status = 200, description = "Availability verdict", body = AvailabilityResult),
        (status = 400, description = "Stay has no nights"),
        (status = 404, description = "Room type not found")
    ),
    security(("bearer_auth" = [])),
    tag = "inventory"
)]
pub async fn availability_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((org_id, hotel_id, id)): Path<(Uuid, Uuid, Uuid)>,
    Query(query): Query<AvailabilityQuery>,
) -> ApiResult<Json<ApiResponse<AvailabilityResult>>> {
    authorize_hotel(state.directory.as_ref(), &user, org_id, hotel_id).await?;

    let result = state
        .availability
        .check(hotel_id, id, query.check_in, query.check_out)
        .await?;
    Ok(Json(ApiResponse::ok("Availability checked", result)))
}
