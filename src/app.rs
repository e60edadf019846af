// Application wiring: shared state, router and OpenAPI document

use std::sync::Arc;

use axum::{
    extract::{FromRef, State},
    routing::{get, patch, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::TokenService;
use crate::config::AppConfig;
use crate::db::DbPool;
use crate::hotels::{HotelDirectory, PgHotelDirectory};
use crate::inventory::{self, AvailabilityChecker, InventoryRepository, InventoryService, PgInventoryRepository};
use crate::metrics::{MetricsSummary, PerformanceMetrics};
use crate::rate_plans::{
    self, PgRateOverrideRepository, PgRatePlanRepository, RateCalculationEngine,
    RateOverrideRepository, RatePlanRepository, RatePlanService,
};
use crate::reservations::{self, PgReservationRepository, ReservationRepository, ReservationService};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        rate_plans::calculate_rates_handler,
        rate_plans::create_rate_plan_handler,
        rate_plans::list_rate_plans_handler,
        rate_plans::applicable_rate_plans_handler,
        rate_plans::get_rate_plan_handler,
        rate_plans::update_rate_plan_handler,
        rate_plans::delete_rate_plan_handler,
        rate_plans::get_overrides_handler,
        rate_plans::upsert_override_handler,
        rate_plans::bulk_upsert_overrides_handler,
        rate_plans::delete_override_handler,
        inventory::get_inventory_handler,
        inventory::upsert_inventory_handler,
        inventory::bulk_upsert_inventory_handler,
        inventory::availability_handler,
        reservations::update_reservation_status_handler,
        metrics_handler,
    ),
    components(
        schemas(
            rate_plans::RatePlan,
            rate_plans::PricingType,
            rate_plans::MealPlan,
            rate_plans::CreateRatePlanRequest,
            rate_plans::UpdateRatePlanRequest,
            rate_plans::RateOverride,
            rate_plans::OverridePatch,
            rate_plans::BulkOverrideRequest,
            rate_plans::BulkWriteResult,
            rate_plans::CalculateRatesRequest,
            rate_plans::RateCalculationResult,
            rate_plans::RateOffer,
            rate_plans::NightlyRate,
            rate_plans::RestrictionCompliance,
            rate_plans::Inclusions,
            rate_plans::rules::AppliedRule,
            inventory::RoomInventory,
            inventory::InventoryPatch,
            inventory::BulkInventoryRequest,
            inventory::AvailabilityResult,
            inventory::AvailabilitySource,
            reservations::Reservation,
            reservations::ReservationStatus,
            reservations::UpdateReservationStatusRequest,
            MetricsSummary,
            crate::metrics::OperationSummary,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "rate-plans", description = "Rate plan registry and rate calculation"),
        (name = "rate-overrides", description = "Per-date rate overrides"),
        (name = "inventory", description = "Inventory ledger and availability"),
        (name = "reservations", description = "Reservation status workflow"),
        (name = "monitoring", description = "Health and metrics")
    ),
    info(
        title = "Hotel Rates API",
        version = "1.0.0",
        description = "Rate plan pricing and availability engine"
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<dyn HotelDirectory>,
    pub rate_plan_service: RatePlanService,
    pub engine: RateCalculationEngine,
    pub inventory_service: InventoryService,
    pub availability: AvailabilityChecker,
    pub reservation_service: ReservationService,
    pub metrics: PerformanceMetrics,
    pub tokens: TokenService,
}

impl FromRef<AppState> for TokenService {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}

/// Store handles the services are built from
pub struct Stores {
    pub directory: Arc<dyn HotelDirectory>,
    pub rate_plans: Arc<dyn RatePlanRepository>,
    pub overrides: Arc<dyn RateOverrideRepository>,
    pub inventory: Arc<dyn InventoryRepository>,
    pub reservations: Arc<dyn ReservationRepository>,
}

impl Stores {
    /// Postgres-backed stores sharing one pool
    pub fn postgres(pool: DbPool) -> Self {
        Self {
            directory: Arc::new(PgHotelDirectory::new(pool.clone())),
            rate_plans: Arc::new(PgRatePlanRepository::new(pool.clone())),
            overrides: Arc::new(PgRateOverrideRepository::new(pool.clone())),
            inventory: Arc::new(PgInventoryRepository::new(pool.clone())),
            reservations: Arc::new(PgReservationRepository::new(pool)),
        }
    }
}

impl AppState {
    pub fn new(stores: Stores, tax_rate: Decimal, max_stay_nights: u32, tokens: TokenService) -> Self {
        let metrics = PerformanceMetrics::new();

        Self {
            rate_plan_service: RatePlanService::new(
                stores.directory.clone(),
                stores.rate_plans.clone(),
                stores.overrides.clone(),
                stores.reservations.clone(),
            ),
            engine: RateCalculationEngine::new(
                stores.directory.clone(),
                stores.rate_plans,
                stores.overrides,
                tax_rate,
                max_stay_nights,
                metrics.clone(),
            ),
            inventory_service: InventoryService::new(stores.directory.clone(), stores.inventory.clone()),
            availability: AvailabilityChecker::new(
                stores.directory.clone(),
                stores.inventory,
                stores.reservations.clone(),
                max_stay_nights,
                metrics.clone(),
            ),
            reservation_service: ReservationService::new(stores.reservations),
            directory: stores.directory,
            metrics,
            tokens,
        }
    }

    /// State backed by Postgres, configured from `AppConfig`
    pub fn from_config(pool: DbPool, config: &AppConfig) -> Self {
        Self::new(
            Stores::postgres(pool),
            config.tax_rate,
            config.max_stay_nights,
            TokenService::new(config.jwt_secret.clone()),
        )
    }
}

/// Handler for GET /health
async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Handler for GET /metrics
#[utoipa::path(
    get,
    path = "/metrics",
    responses((status = 200, description = "Engine timing counters", body = MetricsSummary)),
    tag = "monitoring"
)]
pub async fn metrics_handler(State(state): State<AppState>) -> Json<MetricsSummary> {
    state.metrics.log_summary();
    Json(state.metrics.summary())
}

/// Creates and configures the application router
/// Maps all API endpoints to their handlers and adds CORS and tracing middleware
pub fn create_router(state: AppState) -> Router {
    // Configure CORS to allow all origins, methods, and headers
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let hotel_routes = Router::new()
        // Rate plans
        .route(
            "/rate-plans",
            post(rate_plans::create_rate_plan_handler).get(rate_plans::list_rate_plans_handler),
        )
        .route("/rate-plans/calculate", post(rate_plans::calculate_rates_handler))
        .route("/rate-plans/applicable", get(rate_plans::applicable_rate_plans_handler))
        .route(
            "/rate-plans/:id",
            get(rate_plans::get_rate_plan_handler)
                .patch(rate_plans::update_rate_plan_handler)
                .delete(rate_plans::delete_rate_plan_handler),
        )
        // Rate overrides
        .route(
            "/rate-plans/:id/overrides",
            get(rate_plans::get_overrides_handler).put(rate_plans::upsert_override_handler),
        )
        .route(
            "/rate-plans/:id/overrides/bulk",
            post(rate_plans::bulk_upsert_overrides_handler),
        )
        .route(
            "/rate-plans/:id/overrides/:date",
            axum::routing::delete(rate_plans::delete_override_handler),
        )
        // Inventory and availability
        .route(
            "/room-types/:id/inventory",
            get(inventory::get_inventory_handler).put(inventory::upsert_inventory_handler),
        )
        .route(
            "/room-types/:id/inventory/bulk",
            post(inventory::bulk_upsert_inventory_handler),
        )
        .route("/room-types/:id/availability", get(inventory::availability_handler))
        // Reservations
        .route(
            "/reservations/:id/status",
            patch(reservations::update_reservation_status_handler),
        );

    Router::new()
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .nest("/organizations/:org_id/hotels/:hotel_id", hotel_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
