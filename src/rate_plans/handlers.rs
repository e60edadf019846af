// HTTP handlers for rate plan, override and rate calculation endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::AuthenticatedUser;
use crate::dates::parse_wire_date;
use crate::error::{ApiError, ApiResult};
use crate::hotels::{authorize_hotel, authorize_hotel_mutation};
use crate::rate_plans::{
    ApplicableRatePlansQuery, BulkOverrideRequest, BulkWriteResult, CalculateRatesRequest,
    CreateRatePlanRequest, DateRangeQuery, ListRatePlansQuery, OverridePatch,
    RateCalculationResult, RateOverride, RatePlan, UpdateRatePlanRequest,
};
use crate::response::ApiResponse;

/// Handler for POST /organizations/:org_id/hotels/:hotel_id/rate-plans/calculate
/// Prices every applicable rate plan for a stay
#[utoipa::path(
    post,
    path = "/organizations/{org_id}/hotels/{hotel_id}/rate-plans/calculate",
    params(
        ("org_id" = Uuid, Path, description = "Organization ID"),
        ("hotel_id" = Uuid, Path, description = "Hotel ID")
    ),
    request_body = CalculateRatesRequest,
    responses(
        (status = 200, description = "Ranked offers, possibly empty", body = RateCalculationResult),
        (status = 400, description = "Stay has no nights"),
        (status = 403, description = "Caller belongs to another organization"),
        (status = 404, description = "Hotel or room type not found")
    ),
    security(("bearer_auth" = [])),
    tag = "rate-plans"
)]
pub async fn calculate_rates_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((org_id, hotel_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<CalculateRatesRequest>,
) -> ApiResult<Json<ApiResponse<RateCalculationResult>>> {
    authorize_hotel(state.directory.as_ref(), &user, org_id, hotel_id).await?;

    let result = state.engine.calculate(hotel_id, &request).await?;
    Ok(Json(ApiResponse::ok("Rates calculated successfully", result)))
}

/// Handler for POST /organizations/:org_id/hotels/:hotel_id/rate-plans
#[utoipa::path(
    post,
    path = "/organizations/{org_id}/hotels/{hotel_id}/rate-plans",
    params(
        ("org_id" = Uuid, Path, description = "Organization ID"),
        ("hotel_id" = Uuid, Path, description = "Hotel ID")
    ),
    request_body = CreateRatePlanRequest,
    responses(
        (status = 201, description = "Rate plan created", body = RatePlan),
        (status = 400, description = "Invalid input data"),
        (status = 404, description = "Room type not found"),
        (status = 409, description = "Code already used in this hotel")
    ),
    security(("bearer_auth" = [])),
    tag = "rate-plans"
)]
pub async fn create_rate_plan_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((org_id, hotel_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<CreateRatePlanRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<RatePlan>>)> {
    authorize_hotel_mutation(state.directory.as_ref(), &user, org_id, hotel_id).await?;

    let plan = state.rate_plan_service.create(hotel_id, request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Rate plan created successfully", plan)),
    ))
}

/// Handler for GET /organizations/:org_id/hotels/:hotel_id/rate-plans
#[utoipa::path(
    get,
    path = "/organizations/{org_id}/hotels/{hotel_id}/rate-plans",
    params(
        ("org_id" = Uuid, Path, description = "Organization ID"),
        ("hotel_id" = Uuid, Path, description = "Hotel ID"),
        ListRatePlansQuery
    ),
    responses((status = 200, description = "Live rate plans of the hotel", body = Vec<RatePlan>)),
    security(("bearer_auth" = [])),
    tag = "rate-plans"
)]
pub async fn list_rate_plans_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((org_id, hotel_id)): Path<(Uuid, Uuid)>,
    Query(query): Query<ListRatePlansQuery>,
) -> ApiResult<Json<ApiResponse<Vec<RatePlan>>>> {
    authorize_hotel(state.directory.as_ref(), &user, org_id, hotel_id).await?;

    let plans = state
        .rate_plan_service
        .list(hotel_id, query.room_type_id)
        .await?;
    Ok(Json(ApiResponse::ok("Rate plans retrieved successfully", plans)))
}

/// Handler for GET /organizations/:org_id/hotels/:hotel_id/rate-plans/applicable
#[utoipa::path(
    get,
    path = "/organizations/{org_id}/hotels/{hotel_id}/rate-plans/applicable",
    params(
        ("org_id" = Uuid, Path, description = "Organization ID"),
        ("hotel_id" = Uuid, Path, description = "Hotel ID"),
        ApplicableRatePlansQuery
    ),
    responses((status = 200, description = "Applicable plans, cheapest base rate first", body = Vec<RatePlan>)),
    security(("bearer_auth" = [])),
    tag = "rate-plans"
)]
pub async fn applicable_rate_plans_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((org_id, hotel_id)): Path<(Uuid, Uuid)>,
    Query(query): Query<ApplicableRatePlansQuery>,
) -> ApiResult<Json<ApiResponse<Vec<RatePlan>>>> {
    authorize_hotel(state.directory.as_ref(), &user, org_id, hotel_id).await?;

    let plans = state
        .rate_plan_service
        .find_applicable(hotel_id, &query)
        .await?;
    Ok(Json(ApiResponse::ok("Applicable rate plans retrieved successfully", plans)))
}

/// Handler for GET /organizations/:org_id/hotels/:hotel_id/rate-plans/:id
#[utoipa::path(
    get,
    path = "/organizations/{org_id}/hotels/{hotel_id}/rate-plans/{id}",
    params(
        ("org_id" = Uuid, Path, description = "Organization ID"),
        ("hotel_id" = Uuid, Path, description = "Hotel ID"),
        ("id" = Uuid, Path, description = "Rate plan ID")
    ),
    responses(
        (status = 200, description = "Rate plan found", body = RatePlan),
        (status = 404, description = "Rate plan not found")
    ),
    security(("bearer_auth" = [])),
    tag = "rate-plans"
)]
pub async fn get_rate_plan_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((org_id, hotel_id, id)): Path<(Uuid, Uuid, Uuid)>,
) -> ApiResult<Json<ApiResponse<RatePlan>>> {
    authorize_hotel(state.directory.as_ref(), &user, org_id, hotel_id).await?;

    let plan = state.rate_plan_service.get(hotel_id, id).await?;
    Ok(Json(ApiResponse::ok("Rate plan retrieved successfully", plan)))
}

/// Handler for PATCH /organizations/:org_id/hotels/:hotel_id/rate-plans/:id
#[utoipa::path(
    patch,
    path = "/organizations/{org_id}/hotels/{hotel_id}/rate-plans/{id}",
    params(
        ("org_id" = Uuid, Path, description = "Organization ID"),
        ("hotel_id" = Uuid, Path, description = "Hotel ID"),
        ("id" = Uuid, Path, description = "Rate plan ID")
    ),
    request_body = UpdateRatePlanRequest,
    responses(
        (status = 200, description = "Rate plan updated", body = RatePlan),
        (status = 400, description = "Invalid update or channel collision"),
        (status = 404, description = "Rate plan not found"),
        (status = 409, description = "Code already used in this hotel")
    ),
    security(("bearer_auth" = [])),
    tag = "rate-plans"
)]
pub async fn update_rate_plan_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((org_id, hotel_id, id)): Path<(Uuid, Uuid, Uuid)>,
    Json(request): Json<UpdateRatePlanRequest>,
) -> ApiResult<Json<ApiResponse<RatePlan>>> {
    authorize_hotel_mutation(state.directory.as_ref(), &user, org_id, hotel_id).await?;

    let plan = state.rate_plan_service.update(hotel_id, id, request).await?;
    Ok(Json(ApiResponse::ok("Rate plan updated successfully", plan)))
}

/// Handler for DELETE /organizations/:org_id/hotels/:hotel_id/rate-plans/:id
#[utoipa::path(
    delete,
    path = "/organizations/{org_id}/hotels/{hotel_id}/rate-plans/{id}",
    params(
        ("org_id" = Uuid, Path, description = "Organization ID"),
        ("hotel_id" = Uuid, Path, description = "Hotel ID"),
        ("id" = Uuid, Path, description = "Rate plan ID")
    ),
    responses(
        (status = 204, description = "Rate plan soft-deleted"),
        (status = 404, description = "Rate plan not found"),
        (status = 409, description = "Active reservations reference the plan")
    ),
    security(("bearer_auth" = [])),
    tag = "rate-plans"
)]
pub async fn delete_rate_plan_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((org_id, hotel_id, id)): Path<(Uuid, Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    authorize_hotel_mutation(state.directory.as_ref(), &user, org_id, hotel_id).await?;

    state.rate_plan_service.delete(hotel_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for GET /organizations/:org_id/hotels/:hotel_id/rate-plans/:id/overrides
#[utoipa::path(
    get,
    path = "/organizations/{org_id}/hotels/{hotel_id}/rate-plans/{id}/overrides",
    params(
        ("org_id" = Uuid, Path, description = "Organization ID"),
        ("hotel_id" = Uuid, Path, description = "Hotel ID"),
        ("id" = Uuid, Path, description = "Rate plan ID"),
        DateRangeQuery
    ),
    responses((status = 200, description = "Overrides in the inclusive range", body = Vec<RateOverride>)),
    security(("bearer_auth" = [])),
    tag = "rate-overrides"
)]
pub async fn get_overrides_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((org_id, hotel_id, id)): Path<(Uuid, Uuid, Uuid)>,
    Query(range): Query<DateRangeQuery>,
) -> ApiResult<Json<ApiResponse<Vec<RateOverride>>>> {
    authorize_hotel(state.directory.as_ref(), &user, org_id, hotel_id).await?;

    let overrides = state
        .rate_plan_service
        .get_overrides(hotel_id, id, range.from, range.to)
        .await?;
    Ok(Json(ApiResponse::ok("Rate overrides retrieved successfully", overrides)))
}

/// Handler for PUT /organizations/:org_id/hotels/:hotel_id/rate-plans/:id/overrides
#[utoipa::path(
    put,
    path = "/organizations/{org_id}/hotels/{hotel_id}/rate-plans/{id}/overrides",
    params(
        ("org_id" = Uuid, Path, description = "Organization ID"),
        ("hotel_id" = Uuid, Path, description = "Hotel ID"),
        ("id" = Uuid, Path, description = "Rate plan ID")
    ),
    request_body = OverridePatch,
    responses(
        (status = 200, description = "Override stored", body = RateOverride),
        (status = 404, description = "Rate plan not found")
    ),
    security(("bearer_auth" = [])),
    tag = "rate-overrides"
)]
pub async fn upsert_override_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((org_id, hotel_id, id)): Path<(Uuid, Uuid, Uuid)>,
    Json(patch): Json<OverridePatch>,
) -> ApiResult<Json<ApiResponse<RateOverride>>> {
    authorize_hotel_mutation(state.directory.as_ref(), &user, org_id, hotel_id).await?;

    let saved = state
        .rate_plan_service
        .upsert_override(hotel_id, id, patch)
        .await?;
    Ok(Json(ApiResponse::ok("Rate override saved successfully", saved)))
}

/// Handler for POST /organizations/:org_id/hotels/:hotel_id/rate-plans/:id/overrides/bulk
#[utoipa::path(
    post,
    path = "/organizations/{org_id}/hotels/{hotel_id}/rate-plans/{id}/overrides/bulk",
    params(
        ("org_id" = Uuid, Path, description = "Organization ID"),
        ("hotel_id" = Uuid, Path, description = "Hotel ID"),
        ("id" = Uuid, Path, description = "Rate plan ID")
    ),
    request_body = BulkOverrideRequest,
    responses(
        (status = 200, description = "All entries written", body = BulkWriteResult),
        (status = 404, description = "Rate plan not found")
    ),
    security(("bearer_auth" = [])),
    tag = "rate-overrides"
)]
pub async fn bulk_upsert_overrides_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((org_id, hotel_id, id)): Path<(Uuid, Uuid, Uuid)>,
    Json(request): Json<BulkOverrideRequest>,
) -> ApiResult<Json<ApiResponse<BulkWriteResult>>> {
    authorize_hotel_mutation(state.directory.as_ref(), &user, org_id, hotel_id).await?;

    let result = state
        .rate_plan_service
        .bulk_upsert_overrides(hotel_id, id, request)
        .await?;
    Ok(Json(ApiResponse::ok("Rate overrides saved successfully", result)))
}

/// Handler for DELETE /organizations/:org_id/hotels/:hotel_id/rate-plans/:id/overrides/:date
#[utoipa::path(
    delete,
    path = "/organizations/{org_id}/hotels/{hotel_id}/rate-plans/{id}/overrides/{date}",
    params(
        ("org_id" = Uuid, Path, description = "Organization ID"),
        ("hotel_id" = Uuid, Path, description = "Hotel ID"),
        ("id" = Uuid, Path, description = "Rate plan ID"),
        ("date" = String, Path, description = "Override date (YYYY-MM-DD)")
    ),
    responses(
        (status = 204, description = "Override removed"),
        (status = 404, description = "Rate plan or override not found")
    ),
    security(("bearer_auth" = [])),
    tag = "rate-overrides"
)]
pub async fn delete_override_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((org_id, hotel_id, id, date)): Path<(Uuid, Uuid, Uuid, String)>,
) -> ApiResult<StatusCode> {
    authorize_hotel_mutation(state.directory.as_ref(), &user, org_id, hotel_id).await?;

    let date = parse_wire_date(&date).map_err(ApiError::BadRequest)?;
    state
        .rate_plan_service
        .delete_override(hotel_id, id, date)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
