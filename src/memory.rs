// In-memory store implementations used to drive services and the router in
// tests without a database.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::app::Stores;
use crate::error::{ApiError, ApiResult};
use crate::hotels::{HotelDirectory, RoomType};
use crate::inventory::{stays_overlap, InventoryPatch, InventoryRepository, RoomInventory};
use crate::rate_plans::{OverridePatch, RateOverride, RateOverrideRepository, RatePlan, RatePlanRepository};
use crate::reservations::{Reservation, ReservationRepository, ReservationStatus, StatusMachine};

#[derive(Default)]
pub struct MemoryHotelDirectory {
    hotels: RwLock<HashMap<Uuid, Uuid>>,
    room_types: RwLock<Vec<RoomType>>,
    sellable_rooms: RwLock<HashMap<Uuid, i64>>,
}

impl MemoryHotelDirectory {
    pub async fn add_hotel(&self, organization_id: Uuid) -> Uuid {
        let hotel_id = Uuid::new_v4();
        self.hotels.write().await.insert(hotel_id, organization_id);
        hotel_id
    }

    pub async fn add_room_type(&self, hotel_id: Uuid, name: &str, rooms: i64) -> RoomType {
        let room_type = RoomType {
            id: Uuid::new_v4(),
            hotel_id,
            code: name.to_uppercase().replace(' ', "_"),
            name: name.to_string(),
            deleted_at: None,
        };
        self.room_types.write().await.push(room_type.clone());
        self.sellable_rooms.write().await.insert(room_type.id, rooms);
        room_type
    }
}

#[async_trait]
impl HotelDirectory for MemoryHotelDirectory {
    async fn hotel_in_organization(&self, organization_id: Uuid, hotel_id: Uuid) -> ApiResult<bool> {
        Ok(self.hotels.read().await.get(&hotel_id) == Some(&organization_id))
    }

    async fn find_room_type(&self, hotel_id: Uuid, room_type_id: Uuid) -> ApiResult<Option<RoomType>> {
        Ok(self
            .room_types
            .read()
            .await
            .iter()
            .find(|rt| rt.id == room_type_id && rt.hotel_id == hotel_id && rt.deleted_at.is_none())
            .cloned())
    }

    async fn count_sellable_rooms(&self, room_type_id: Uuid) -> ApiResult<i64> {
        Ok(self
            .sellable_rooms
            .read()
            .await
            .get(&room_type_id)
            .copied()
            .unwrap_or(0))
    }
}

#[derive(Default)]
pub struct MemoryRatePlans {
    plans: RwLock<Vec<RatePlan>>,
}

impl MemoryRatePlans {
    fn live(plan: &RatePlan, hotel_id: Uuid) -> bool {
        plan.hotel_id == hotel_id && plan.deleted_at.is_none()
    }
}

/// Mirrors the applicable-plan filter of the Postgres query
fn is_applicable(
    plan: &RatePlan,
    check_in: NaiveDate,
    channel_code: Option<&str>,
    is_public: Option<bool>,
) -> bool {
    plan.is_active
        && plan.deleted_at.is_none()
        && plan.valid_from.map_or(true, |from| from <= check_in)
        && plan.valid_until.map_or(true, |until| check_in <= until)
        && channel_code.map_or(true, |channel| plan.channel_codes.iter().any(|c| c == channel))
        && is_public.map_or(true, |public| plan.is_public == public)
}

#[async_trait]
impl RatePlanRepository for MemoryRatePlans {
    async fn insert(&self, plan: &RatePlan) -> ApiResult<RatePlan> {
        let mut plans = self.plans.write().await;
        if plans
            .iter()
            .any(|p| Self::live(p, plan.hotel_id) && p.code == plan.code)
        {
            return Err(ApiError::conflict(format!(
                "Rate plan with code '{}' already exists",
                plan.code
            )));
        }
        plans.push(plan.clone());
        Ok(plan.clone())
    }

    async fn find_by_id(&self, hotel_id: Uuid, id: Uuid) -> ApiResult<Option<RatePlan>> {
        Ok(self
            .plans
            .read()
            .await
            .iter()
            .find(|p| p.id == id && Self::live(p, hotel_id))
            .cloned())
    }

    async fn find_by_code(&self, hotel_id: Uuid, code: &str) -> ApiResult<Option<RatePlan>> {
        Ok(self
            .plans
            .read()
            .await
            .iter()
            .find(|p| p.code == code && Self::live(p, hotel_id))
            .cloned())
    }

    async fn list(&self, hotel_id: Uuid, room_type_id: Option<Uuid>) -> ApiResult<Vec<RatePlan>> {
        let mut plans: Vec<RatePlan> = self
            .plans
            .read()
            .await
            .iter()
            .filter(|p| Self::live(p, hotel_id))
            .filter(|p| room_type_id.map_or(true, |rt| p.room_type_id == rt))
            .cloned()
            .collect();
        plans.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(plans)
    }

    async fn find_applicable(
        &self,
        hotel_id: Uuid,
        room_type_id: Uuid,
        check_in: NaiveDate,
        channel_code: Option<&str>,
        is_public: Option<bool>,
    ) -> ApiResult<Vec<RatePlan>> {
        let mut plans: Vec<RatePlan> = self
            .plans
            .read()
            .await
            .iter()
            .filter(|p| p.hotel_id == hotel_id && p.room_type_id == room_type_id)
            .filter(|p| is_applicable(p, check_in, channel_code, is_public))
            .cloned()
            .collect();
        plans.sort_by(|a, b| a.base_rate.cmp(&b.base_rate));
        Ok(plans)
    }

    async fn find_public_for_room_type(&self, room_type_id: Uuid) -> ApiResult<Vec<RatePlan>> {
        Ok(self
            .plans
            .read()
            .await
            .iter()
            .filter(|p| p.room_type_id == room_type_id && p.is_public && p.is_active && p.deleted_at.is_none())
            .cloned()
            .collect())
    }

    async fn update(&self, plan: &RatePlan) -> ApiResult<RatePlan> {
        let mut plans = self.plans.write().await;
        let slot = plans
            .iter_mut()
            .find(|p| p.id == plan.id && Self::live(p, plan.hotel_id))
            .ok_or_else(|| ApiError::not_found("RatePlan", plan.id))?;

        let mut updated = plan.clone();
        updated.updated_at = Utc::now();
        *slot = updated.clone();
        Ok(updated)
    }

    async fn soft_delete(&self, hotel_id: Uuid, id: Uuid) -> ApiResult<bool> {
        let mut plans = self.plans.write().await;
        match plans.iter_mut().find(|p| p.id == id && Self::live(p, hotel_id)) {
            Some(plan) => {
                let now = Utc::now();
                plan.deleted_at = Some(now);
                plan.is_active = false;
                plan.updated_at = now;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[derive(Default)]
pub struct MemoryRateOverrides {
    rows: RwLock<HashMap<(Uuid, NaiveDate), RateOverride>>,
}

fn merge_override(
    rows: &mut HashMap<(Uuid, NaiveDate), RateOverride>,
    rate_plan_id: Uuid,
    patch: &OverridePatch,
) -> RateOverride {
    let now = Utc::now();
    let row = rows
        .entry((rate_plan_id, patch.date))
        .or_insert_with(|| RateOverride {
            id: Uuid::new_v4(),
            rate_plan_id,
            date: patch.date,
            rate: None,
            stop_sell: false,
            min_stay: None,
            reason: None,
            created_at: now,
            updated_at: now,
        });

    row.rate = patch.rate.or(row.rate);
    row.stop_sell = patch.stop_sell.unwrap_or(row.stop_sell);
    row.min_stay = patch.min_stay.or(row.min_stay);
    row.reason = patch.reason.clone().or(row.reason.take());
    row.updated_at = now;
    row.clone()
}

impl MemoryRateOverrides {
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }
}

#[async_trait]
impl RateOverrideRepository for MemoryRateOverrides {
    async fn find_range(
        &self,
        rate_plan_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> ApiResult<Vec<RateOverride>> {
        let mut found: Vec<RateOverride> = self
            .rows
            .read()
            .await
            .values()
            .filter(|o| o.rate_plan_id == rate_plan_id && o.date >= from && o.date <= to)
            .cloned()
            .collect();
        found.sort_by_key(|o| o.date);
        Ok(found)
    }

    async fn upsert(&self, rate_plan_id: Uuid, patch: &OverridePatch) -> ApiResult<RateOverride> {
        Ok(merge_override(&mut *self.rows.write().await, rate_plan_id, patch))
    }

    async fn bulk_upsert(&self, rate_plan_id: Uuid, patches: &[OverridePatch]) -> ApiResult<u64> {
        let mut rows = self.rows.write().await;
        for patch in patches {
            merge_override(&mut rows, rate_plan_id, patch);
        }
        Ok(patches.len() as u64)
    }

    async fn delete(&self, rate_plan_id: Uuid, date: NaiveDate) -> ApiResult<bool> {
        Ok(self.rows.write().await.remove(&(rate_plan_id, date)).is_some())
    }
}

#[derive(Default)]
pub struct MemoryInventory {
    rows: RwLock<HashMap<(Uuid, NaiveDate), RoomInventory>>,
}

fn merge_inventory(
    rows: &mut HashMap<(Uuid, NaiveDate), RoomInventory>,
    room_type_id: Uuid,
    patch: &InventoryPatch,
    default_total: i32,
) -> RoomInventory {
    let now = Utc::now();
    let row = rows
        .entry((room_type_id, patch.date))
        .or_insert_with(|| RoomInventory {
            id: Uuid::new_v4(),
            room_type_id,
            date: patch.date,
            total_rooms: default_total,
            out_of_order: 0,
            blocked: 0,
            sold: 0,
            overbooking_limit: 0,
            available: 0,
            stop_sell: false,
            min_stay: None,
            max_stay: None,
            closed_to_arrival: false,
            closed_to_departure: false,
            rate_override: None,
            reason: None,
            created_at: now,
            updated_at: now,
        });

    row.total_rooms = patch.total_rooms.unwrap_or(row.total_rooms);
    row.out_of_order = patch.out_of_order.unwrap_or(row.out_of_order);
    row.blocked = patch.blocked.unwrap_or(row.blocked);
    row.sold = patch.sold.unwrap_or(row.sold);
    row.overbooking_limit = patch.overbooking_limit.unwrap_or(row.overbooking_limit);
    row.stop_sell = patch.stop_sell.unwrap_or(row.stop_sell);
    row.min_stay = patch.min_stay.or(row.min_stay);
    row.max_stay = patch.max_stay.or(row.max_stay);
    row.closed_to_arrival = patch.closed_to_arrival.unwrap_or(row.closed_to_arrival);
    row.closed_to_departure = patch.closed_to_departure.unwrap_or(row.closed_to_departure);
    row.rate_override = patch.rate_override.or(row.rate_override);
    row.reason = patch.reason.clone().or(row.reason.take());
    row.updated_at = now;
    row.recompute_available();
    row.clone()
}

#[async_trait]
impl InventoryRepository for MemoryInventory {
    async fn find_range(
        &self,
        room_type_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> ApiResult<Vec<RoomInventory>> {
        let mut found: Vec<RoomInventory> = self
            .rows
            .read()
            .await
            .values()
            .filter(|r| r.room_type_id == room_type_id && r.date >= from && r.date <= to)
            .cloned()
            .collect();
        found.sort_by_key(|r| r.date);
        Ok(found)
    }

    async fn upsert(
        &self,
        room_type_id: Uuid,
        patch: &InventoryPatch,
        default_total: i32,
    ) -> ApiResult<RoomInventory> {
        Ok(merge_inventory(
            &mut *self.rows.write().await,
            room_type_id,
            patch,
            default_total,
        ))
    }

    async fn bulk_upsert(
        &self,
        room_type_id: Uuid,
        patches: &[InventoryPatch],
        default_total: i32,
    ) -> ApiResult<u64> {
        let mut rows = self.rows.write().await;
        for patch in patches {
            merge_inventory(&mut rows, room_type_id, patch, default_total);
        }
        Ok(patches.len() as u64)
    }
}

struct MemoryReservationRoom {
    reservation_id: Uuid,
    room_type_id: Uuid,
    check_in: NaiveDate,
    check_out: NaiveDate,
}

#[derive(Default)]
pub struct MemoryReservations {
    reservations: RwLock<Vec<Reservation>>,
    rooms: RwLock<Vec<MemoryReservationRoom>>,
}

impl MemoryReservations {
    /// Seed a single-room reservation
    pub async fn add(
        &self,
        hotel_id: Uuid,
        room_type_id: Uuid,
        rate_plan_id: Option<Uuid>,
        status: ReservationStatus,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Reservation {
        let now = Utc::now();
        let reservation = Reservation {
            id: Uuid::new_v4(),
            hotel_id,
            rate_plan_id,
            status,
            check_in,
            check_out,
            created_at: now,
            updated_at: now,
        };
        self.reservations.write().await.push(reservation.clone());
        self.rooms.write().await.push(MemoryReservationRoom {
            reservation_id: reservation.id,
            room_type_id,
            check_in,
            check_out,
        });
        reservation
    }
}

#[async_trait]
impl ReservationRepository for MemoryReservations {
    async fn count_overlapping_rooms(
        &self,
        room_type_id: Uuid,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> ApiResult<i64> {
        let reservations = self.reservations.read().await;
        let count = self
            .rooms
            .read()
            .await
            .iter()
            .filter(|room| room.room_type_id == room_type_id)
            .filter(|room| stays_overlap(room.check_in, room.check_out, check_in, check_out))
            .filter(|room| {
                reservations
                    .iter()
                    .any(|r| r.id == room.reservation_id && r.status.holds_inventory())
            })
            .count();
        Ok(count as i64)
    }

    async fn has_active_for_rate_plan(&self, rate_plan_id: Uuid) -> ApiResult<bool> {
        Ok(self
            .reservations
            .read()
            .await
            .iter()
            .any(|r| r.rate_plan_id == Some(rate_plan_id) && r.status.holds_inventory()))
    }

    async fn find_by_id(&self, hotel_id: Uuid, id: Uuid) -> ApiResult<Option<Reservation>> {
        Ok(self
            .reservations
            .read()
            .await
            .iter()
            .find(|r| r.id == id && r.hotel_id == hotel_id)
            .cloned())
    }

    async fn update_status(
        &self,
        hotel_id: Uuid,
        id: Uuid,
        to: ReservationStatus,
    ) -> ApiResult<Reservation> {
        let mut reservations = self.reservations.write().await;
        let reservation = reservations
            .iter_mut()
            .find(|r| r.id == id && r.hotel_id == hotel_id)
            .ok_or_else(|| ApiError::not_found("Reservation", id))?;

        StatusMachine::transition(reservation.status, to).map_err(ApiError::BadRequest)?;
        if reservation.status != to {
            reservation.status = to;
            reservation.updated_at = Utc::now();
        }
        Ok(reservation.clone())
    }
}

/// Concrete in-memory stores plus the trait-object view the app state needs
pub struct MemoryStores {
    pub directory: Arc<MemoryHotelDirectory>,
    pub rate_plans: Arc<MemoryRatePlans>,
    pub overrides: Arc<MemoryRateOverrides>,
    pub inventory: Arc<MemoryInventory>,
    pub reservations: Arc<MemoryReservations>,
}

impl MemoryStores {
    pub fn new() -> Self {
        Self {
            directory: Arc::new(MemoryHotelDirectory::default()),
            rate_plans: Arc::new(MemoryRatePlans::default()),
            overrides: Arc::new(MemoryRateOverrides::default()),
            inventory: Arc::new(MemoryInventory::default()),
            reservations: Arc::new(MemoryReservations::default()),
        }
    }

    pub fn stores(&self) -> Stores {
        Stores {
            directory: self.directory.clone(),
            rate_plans: self.rate_plans.clone(),
            overrides: self.overrides.clone(),
            inventory: self.inventory.clone(),
            reservations: self.reservations.clone(),
        }
    }
}

/// A hotel with one room type, ready for plans and reservations
pub struct Fixture {
    pub stores: MemoryStores,
    pub organization_id: Uuid,
    pub hotel_id: Uuid,
    pub room_type: RoomType,
}

impl Fixture {
    pub async fn new(rooms: i64) -> Self {
        let stores = MemoryStores::new();
        let organization_id = Uuid::new_v4();
        let hotel_id = stores.directory.add_hotel(organization_id).await;
        let room_type = stores
            .directory
            .add_room_type(hotel_id, "Deluxe King", rooms)
            .await;

        Self {
            stores,
            organization_id,
            hotel_id,
            room_type,
        }
    }

    pub fn rate_plan_service(&self) -> crate::rate_plans::RatePlanService {
        crate::rate_plans::RatePlanService::new(
            self.stores.directory.clone(),
            self.stores.rate_plans.clone(),
            self.stores.overrides.clone(),
            self.stores.reservations.clone(),
        )
    }

    /// Create a plan from a JSON request body merged over sensible defaults
    pub async fn create_plan(&self, code: &str, base_rate: f64, extra: serde_json::Value) -> RatePlan {
        let request = plan_request(self.room_type.id, code, base_rate, extra);
        match self.rate_plan_service().create(self.hotel_id, request).await {
            Ok(plan) => plan,
            Err(e) => panic!("fixture plan {} rejected: {}", code, e),
        }
    }
}

/// Build a create request the way a client would send it
pub fn plan_request(
    room_type_id: Uuid,
    code: &str,
    base_rate: f64,
    extra: serde_json::Value,
) -> crate::rate_plans::CreateRatePlanRequest {
    let mut body = serde_json::json!({
        "roomTypeId": room_type_id,
        "code": code,
        "name": format!("{} plan", code),
        "baseRate": base_rate,
    });
    if let (Some(target), Some(fields)) = (body.as_object_mut(), extra.as_object()) {
        for (key, value) in fields {
            target.insert(key.clone(), value.clone());
        }
    }
    match serde_json::from_value(body) {
        Ok(request) => request,
        Err(e) => panic!("invalid fixture request: {}", e),
    }
}
