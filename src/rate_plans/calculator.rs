// Rate Calculation Engine
//
// Prices every applicable rate plan of a room type for a stay and ranks the
// resulting offers by total. This is a pure read path.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use uuid::Uuid;

use crate::dates::{days_in_advance, last_night, stay_length, stay_nights};
use crate::error::{ApiError, ApiResult};
use crate::hotels::HotelDirectory;
use crate::metrics::PerformanceMetrics;
use crate::rate_plans::rules::{apply_rules, RateOverflow, RuleContext};
use crate::rate_plans::{
    CalculateRatesRequest, Inclusions, NightlyRate, RateCalculationResult, RateOffer,
    RateOverride, RateOverrideRepository, RatePlan, RatePlanRepository,
};

/// Round a money amount to cents, halves away from zero
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[derive(Clone)]
pub struct RateCalculationEngine {
    directory: Arc<dyn HotelDirectory>,
    rate_plans: Arc<dyn RatePlanRepository>,
    overrides: Arc<dyn RateOverrideRepository>,
    tax_rate: Decimal,
    max_stay_nights: u32,
    metrics: PerformanceMetrics,
}

impl RateCalculationEngine {
    pub fn new(
        directory: Arc<dyn HotelDirectory>,
        rate_plans: Arc<dyn RatePlanRepository>,
        overrides: Arc<dyn RateOverrideRepository>,
        tax_rate: Decimal,
        max_stay_nights: u32,
        metrics: PerformanceMetrics,
    ) -> Self {
        Self {
            directory,
            rate_plans,
            overrides,
            tax_rate,
            max_stay_nights,
            metrics,
        }
    }

    /// Price a stay as of now
    pub async fn calculate(
        &self,
        hotel_id: Uuid,
        request: &CalculateRatesRequest,
    ) -> ApiResult<RateCalculationResult> {
        self.calculate_at(hotel_id, request, Utc::now()).await
    }

    /// Price a stay as if booked at `now`
    ///
    /// # Returns
    /// Offers for every plan whose restrictions the stay satisfies, cheapest
    /// total first. An empty list is a valid answer, not an error.
    pub async fn calculate_at(
        &self,
        hotel_id: Uuid,
        request: &CalculateRatesRequest,
        now: DateTime<Utc>,
    ) -> ApiResult<RateCalculationResult> {
        let _timer = self.metrics.start_rate_calculation();

        // 1. Room type must be a live room type of the hotel
        let room_type = self
            .directory
            .find_room_type(hotel_id, request.room_type_id)
            .await?
            .ok_or_else(|| ApiError::not_found("RoomType", request.room_type_id))?;

        // 2. Stay length
        let nights = stay_length(request.check_in, request.check_out, self.max_stay_nights)
            .map_err(ApiError::bad_request)?;

        // 3. Plans valid on the check-in date, public and private alike
        let plans = self
            .rate_plans
            .find_applicable(
                hotel_id,
                room_type.id,
                request.check_in,
                request.channel_code.as_deref(),
                None,
            )
            .await?;

        let advance = days_in_advance(request.check_in, now);
        tracing::debug!(
            room_type_id = %room_type.id,
            nights,
            days_in_advance = advance,
            candidates = plans.len(),
            "Calculating rates"
        );

        // 4-7. Price each plan that satisfies its restrictions
        let mut offers = Vec::with_capacity(plans.len());
        for plan in &plans {
            if let Some(offer) = self
                .price_plan(plan, request.check_in, request.check_out, nights, advance)
                .await?
            {
                offers.push(offer);
            }
        }

        // 8. Cheapest total first; ties keep base-rate order
        offers.sort_by(|a, b| a.total.cmp(&b.total));
        let best_available_rate = offers.first().map(|offer| offer.total);

        Ok(RateCalculationResult {
            room_type_id: room_type.id,
            room_type_name: room_type.name,
            available_rate_plans: offers,
            best_available_rate,
        })
    }

    async fn price_plan(
        &self,
        plan: &RatePlan,
        check_in: NaiveDate,
        check_out: NaiveDate,
        nights: i64,
        days_in_advance: i64,
    ) -> ApiResult<Option<RateOffer>> {
        let restrictions = plan.restriction_compliance(nights, days_in_advance);
        if !restrictions.all_met() {
            tracing::debug!(
                code = %plan.code,
                ?restrictions,
                "Rate plan excluded by stay restrictions"
            );
            return Ok(None);
        }

        // One lookup per plan covering the whole stay
        let overrides: HashMap<NaiveDate, RateOverride> = self
            .overrides
            .find_range(plan.id, check_in, last_night(check_out))
            .await?
            .into_iter()
            .map(|o| (o.date, o))
            .collect();

        let priced = stay_nights(check_in, nights)
            .map(|date| self.price_night(plan, overrides.get(&date), date, nights, days_in_advance))
            .collect::<Result<Vec<NightlyRate>, RateOverflow>>()
            .and_then(|nightly_rates| {
                let subtotal = nightly_rates
                    .iter()
                    .try_fold(Decimal::ZERO, |sum, night| sum.checked_add(night.rate))
                    .ok_or(RateOverflow)?;
                let taxes = subtotal.checked_mul(self.tax_rate).map(round_money).ok_or(RateOverflow)?;
                let total = subtotal.checked_add(taxes).map(round_money).ok_or(RateOverflow)?;
                Ok((nightly_rates, subtotal, taxes, total))
            });

        let (nightly_rates, subtotal, taxes, total) = priced.map_err(|e| {
            tracing::warn!(code = %plan.code, "Rate plan cannot be priced: {}", e);
            ApiError::bad_request(format!("Rate plan '{}': {}", plan.code, e))
        })?;

        Ok(Some(RateOffer {
            rate_plan_id: plan.id,
            code: plan.code.clone(),
            name: plan.name.clone(),
            pricing_type: plan.pricing_type,
            currency: plan.currency.clone(),
            nights,
            nightly_rates,
            subtotal,
            taxes,
            total,
            restrictions,
            inclusions: Inclusions {
                meal_plan: plan.meal_plan,
                amenities: plan.amenities.clone(),
            },
            is_refundable: plan.is_refundable,
            cancellation_policy: plan.cancellation_policy.clone(),
        }))
    }

    fn price_night(
        &self,
        plan: &RatePlan,
        rate_override: Option<&RateOverride>,
        date: NaiveDate,
        length_of_stay: i64,
        days_in_advance: i64,
    ) -> Result<NightlyRate, RateOverflow> {
        let override_rate = rate_override.and_then(|o| o.rate);
        let base_rate = override_rate.unwrap_or(plan.base_rate);

        // TODO: feed real occupancy once the inventory ledger exposes a per-date occupancy percentage
        let ctx = RuleContext {
            date,
            days_in_advance,
            length_of_stay,
            occupancy_percent: Decimal::ZERO,
        };
        let (adjusted, applied_rules) = apply_rules(base_rate, &plan.pricing_rules, &ctx)?;

        Ok(NightlyRate {
            date,
            base_rate,
            has_override: override_rate.is_some(),
            stop_sell: rate_override.map_or(false, |o| o.stop_sell),
            applied_rules,
            rate: round_money(adjusted).max(Decimal::ZERO),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::Fixture;
    use crate::rate_plans::OverridePatch;
    use chrono::{NaiveTime, TimeZone};
    use rust_decimal_macros::dec;
    use serde_json::json;

    const MAX_NIGHTS: u32 = 30;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    /// `days` whole days before midnight UTC of `check_in`
    fn booked_days_before(check_in: NaiveDate, days: i64) -> DateTime<Utc> {
        Utc.from_utc_datetime(&check_in.and_time(NaiveTime::MIN)) - chrono::Duration::days(days)
    }

    fn engine(fixture: &Fixture) -> RateCalculationEngine {
        RateCalculationEngine::new(
            fixture.stores.directory.clone(),
            fixture.stores.rate_plans.clone(),
            fixture.stores.overrides.clone(),
            dec!(0.15),
            MAX_NIGHTS,
            PerformanceMetrics::new(),
        )
    }

    fn stay(fixture: &Fixture, check_in: NaiveDate, check_out: NaiveDate) -> CalculateRatesRequest {
        CalculateRatesRequest {
            room_type_id: fixture.room_type.id,
            check_in,
            check_out,
            channel_code: None,
        }
    }

    #[test]
    fn test_round_money_half_away_from_zero() {
        assert_eq!(round_money(dec!(10.005)), dec!(10.01));
        assert_eq!(round_money(dec!(10.004)), dec!(10.00));
        assert_eq!(round_money(dec!(-10.005)), dec!(-10.01));
        assert_eq!(round_money(dec!(44.995)), dec!(45.00));
    }

    #[tokio::test]
    async fn test_plain_plan_prices_base_rate_every_night() {
        let fixture = Fixture::new(5).await;
        fixture.create_plan("STD-RATE", 100.0, json!({})).await;

        let check_in = date(6, 1);
        let result = engine(&fixture)
            .calculate_at(
                fixture.hotel_id,
                &stay(&fixture, check_in, date(6, 4)),
                booked_days_before(check_in, 5),
            )
            .await
            .unwrap();

        assert_eq!(result.room_type_name, "Deluxe King");
        assert_eq!(result.available_rate_plans.len(), 1);
        let offer = &result.available_rate_plans[0];
        assert_eq!(offer.nights, 3);
        assert!(offer.nightly_rates.iter().all(|n| n.rate == dec!(100)));
        assert_eq!(offer.subtotal, dec!(300));
        assert_eq!(offer.taxes, dec!(45));
        assert_eq!(offer.total, dec!(345));
        assert_eq!(result.best_available_rate, Some(dec!(345)));
    }

    #[tokio::test]
    async fn test_override_replaces_base_for_its_night() {
        let fixture = Fixture::new(5).await;
        let plan = fixture.create_plan("STD-RATE", 100.0, json!({})).await;

        let mut patch = OverridePatch::for_date(date(6, 2));
        patch.rate = Some(dec!(80));
        fixture
            .rate_plan_service()
            .upsert_override(fixture.hotel_id, plan.id, patch)
            .await
            .unwrap();

        let check_in = date(6, 1);
        let result = engine(&fixture)
            .calculate_at(
                fixture.hotel_id,
                &stay(&fixture, check_in, date(6, 4)),
                booked_days_before(check_in, 5),
            )
            .await
            .unwrap();

        let offer = &result.available_rate_plans[0];
        let rates: Vec<Decimal> = offer.nightly_rates.iter().map(|n| n.rate).collect();
        assert_eq!(rates, vec![dec!(100), dec!(80), dec!(100)]);
        assert!(offer.nightly_rates[1].has_override);
        assert_eq!(offer.nightly_rates[1].base_rate, dec!(80));
        assert!(!offer.nightly_rates[0].has_override);
        assert_eq!(offer.subtotal, dec!(280));
        assert_eq!(offer.taxes, dec!(42));
        assert_eq!(offer.total, dec!(322));
    }

    #[tokio::test]
    async fn test_early_bird_discount_depends_on_booking_date() {
        let fixture = Fixture::new(5).await;
        fixture
            .create_plan(
                "EARLY",
                100.0,
                json!({
                    "pricingRules": [{
                        "type": "EARLY_BIRD",
                        "name": "Book ahead",
                        "condition": { "daysInAdvance": 14 },
                        "adjustment": { "type": "PERCENTAGE", "operation": "SUBTRACT", "value": 10 },
                        "priority": 1
                    }]
                }),
            )
            .await;

        let check_in = date(7, 1);
        let request = stay(&fixture, check_in, date(7, 3));

        let early = engine(&fixture)
            .calculate_at(fixture.hotel_id, &request, booked_days_before(check_in, 20))
            .await
            .unwrap();
        let offer = &early.available_rate_plans[0];
        assert!(offer.nightly_rates.iter().all(|n| n.rate == dec!(90)));
        assert_eq!(offer.nightly_rates[0].applied_rules.len(), 1);
        assert_eq!(offer.nightly_rates[0].applied_rules[0].amount, dec!(-10));
        assert_eq!(offer.subtotal, dec!(180));

        let late = engine(&fixture)
            .calculate_at(fixture.hotel_id, &request, booked_days_before(check_in, 10))
            .await
            .unwrap();
        let offer = &late.available_rate_plans[0];
        assert!(offer.nightly_rates.iter().all(|n| n.rate == dec!(100)));
        assert!(offer.nightly_rates[0].applied_rules.is_empty());
    }

    #[tokio::test]
    async fn test_rules_compound_against_running_rate() {
        let fixture = Fixture::new(5).await;
        fixture
            .create_plan(
                "STACKED",
                100.0,
                json!({
                    "pricingRules": [
                        {
                            "type": "LENGTH_OF_STAY",
                            "condition": { "minNights": 1 },
                            "adjustment": { "type": "PERCENTAGE", "operation": "SUBTRACT", "value": 10 },
                            "priority": 5
                        },
                        {
                            "type": "LENGTH_OF_STAY",
                            "condition": { "minNights": 1 },
                            "adjustment": { "type": "PERCENTAGE", "operation": "SUBTRACT", "value": 10 },
                            "priority": 10
                        }
                    ]
                }),
            )
            .await;

        let check_in = date(8, 1);
        let result = engine(&fixture)
            .calculate_at(
                fixture.hotel_id,
                &stay(&fixture, check_in, date(8, 2)),
                booked_days_before(check_in, 3),
            )
            .await
            .unwrap();

        let night = &result.available_rate_plans[0].nightly_rates[0];
        assert_eq!(night.rate, dec!(81));
        let priorities: Vec<i32> = night.applied_rules.iter().map(|r| r.priority).collect();
        assert_eq!(priorities, vec![10, 5]);
    }

    #[tokio::test]
    async fn test_min_stay_filters_short_stays() {
        let fixture = Fixture::new(5).await;
        fixture
            .create_plan("LONG", 100.0, json!({ "minStay": 3 }))
            .await;

        let check_in = date(9, 1);
        let now = booked_days_before(check_in, 5);

        let two_nights = engine(&fixture)
            .calculate_at(fixture.hotel_id, &stay(&fixture, check_in, date(9, 3)), now)
            .await
            .unwrap();
        assert!(two_nights.available_rate_plans.is_empty());
        assert_eq!(two_nights.best_available_rate, None);

        let three_nights = engine(&fixture)
            .calculate_at(fixture.hotel_id, &stay(&fixture, check_in, date(9, 4)), now)
            .await
            .unwrap();
        assert_eq!(three_nights.available_rate_plans.len(), 1);
        assert!(three_nights.available_rate_plans[0].restrictions.all_met());
    }

    #[tokio::test]
    async fn test_offers_ranked_by_total_not_base_rate() {
        let fixture = Fixture::new(5).await;
        fixture.create_plan("FLEX", 80.0, json!({})).await;
        fixture
            .create_plan(
                "PROMO",
                100.0,
                json!({
                    "isPublic": false,
                    "pricingRules": [{
                        "type": "LENGTH_OF_STAY",
                        "condition": { "minNights": 2 },
                        "adjustment": { "type": "PERCENTAGE", "operation": "SUBTRACT", "value": 50 }
                    }]
                }),
            )
            .await;

        let check_in = date(10, 1);
        let result = engine(&fixture)
            .calculate_at(
                fixture.hotel_id,
                &stay(&fixture, check_in, date(10, 3)),
                booked_days_before(check_in, 5),
            )
            .await
            .unwrap();

        let codes: Vec<&str> = result
            .available_rate_plans
            .iter()
            .map(|o| o.code.as_str())
            .collect();
        assert_eq!(codes, vec!["PROMO", "FLEX"]);
        assert_eq!(result.best_available_rate, Some(dec!(115)));
    }

    #[tokio::test]
    async fn test_stop_sell_override_is_flagged() {
        let fixture = Fixture::new(5).await;
        let plan = fixture.create_plan("STD-RATE", 100.0, json!({})).await;

        let mut patch = OverridePatch::for_date(date(6, 1));
        patch.stop_sell = Some(true);
        fixture
            .rate_plan_service()
            .upsert_override(fixture.hotel_id, plan.id, patch)
            .await
            .unwrap();

        let check_in = date(6, 1);
        let result = engine(&fixture)
            .calculate_at(
                fixture.hotel_id,
                &stay(&fixture, check_in, date(6, 2)),
                booked_days_before(check_in, 5),
            )
            .await
            .unwrap();

        let night = &result.available_rate_plans[0].nightly_rates[0];
        assert!(night.stop_sell);
        assert!(!night.has_override);
        assert_eq!(night.rate, dec!(100));
    }

    #[tokio::test]
    async fn test_no_plans_is_an_empty_answer() {
        let fixture = Fixture::new(5).await;

        let result = engine(&fixture)
            .calculate(fixture.hotel_id, &stay(&fixture, date(6, 1), date(6, 3)))
            .await
            .unwrap();

        assert!(result.available_rate_plans.is_empty());
        assert_eq!(result.best_available_rate, None);
    }

    #[tokio::test]
    async fn test_structural_errors() {
        let fixture = Fixture::new(5).await;
        let engine = engine(&fixture);

        let same_day = engine
            .calculate(fixture.hotel_id, &stay(&fixture, date(6, 1), date(6, 1)))
            .await;
        assert!(matches!(same_day, Err(ApiError::BadRequest(_))));

        let mut request = stay(&fixture, date(6, 1), date(6, 2));
        request.room_type_id = Uuid::new_v4();
        let missing = engine.calculate(fixture.hotel_id, &request).await;
        assert!(matches!(missing, Err(ApiError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_stay_length_is_capped() {
        let fixture = Fixture::new(5).await;
        fixture.create_plan("BAR", 100.0, json!({})).await;
        let engine = engine(&fixture);
        let check_in = date(6, 1);
        let now = booked_days_before(check_in, 5);

        let longest = engine
            .calculate_at(
                fixture.hotel_id,
                &stay(&fixture, check_in, check_in + chrono::Duration::days(30)),
                now,
            )
            .await
            .unwrap();
        assert_eq!(longest.available_rate_plans[0].nights, 30);

        let too_long = engine
            .calculate_at(
                fixture.hotel_id,
                &stay(&fixture, check_in, check_in + chrono::Duration::days(31)),
                now,
            )
            .await;
        assert!(matches!(too_long, Err(ApiError::BadRequest(_))));

        let mut request = stay(&fixture, check_in, check_in);
        request.check_in = NaiveDate::MIN;
        request.check_out = NaiveDate::MAX;
        let absurd = engine.calculate_at(fixture.hotel_id, &request, now).await;
        assert!(matches!(absurd, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_out_of_range_rates_are_rejected_not_panicking() {
        let fixture = Fixture::new(5).await;
        let mut plan = fixture.create_plan("STACKED", 100.0, json!({})).await;

        // Stored before adjustment bounds existed
        let huge = crate::rate_plans::rules::Adjustment {
            kind: crate::rate_plans::rules::AdjustmentKind::Percentage,
            operation: crate::rate_plans::rules::AdjustmentOperation::Add,
            value: Decimal::from_i128_with_scale(10i128.pow(27), 0),
        };
        let every_stay = crate::rate_plans::rules::RuleTrigger::LengthOfStay {
            min_nights: 0,
            max_nights: None,
        };
        plan.pricing_rules = vec![
            crate::rate_plans::rules::PricingRule {
                name: None,
                trigger: every_stay.clone(),
                adjustment: huge.clone(),
                priority: 2,
            },
            crate::rate_plans::rules::PricingRule {
                name: None,
                trigger: every_stay,
                adjustment: huge,
                priority: 1,
            },
        ];
        fixture.stores.rate_plans.update(&plan).await.unwrap();

        let check_in = date(6, 1);
        let result = engine(&fixture)
            .calculate_at(
                fixture.hotel_id,
                &stay(&fixture, check_in, date(6, 3)),
                booked_days_before(check_in, 5),
            )
            .await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_subtotal_overflow_is_rejected() {
        let fixture = Fixture::new(5).await;
        fixture.create_plan("PALACE", 5e28, json!({})).await;

        let check_in = date(6, 1);
        let result = engine(&fixture)
            .calculate_at(
                fixture.hotel_id,
                &stay(&fixture, check_in, date(6, 3)),
                booked_days_before(check_in, 5),
            )
            .await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_each_calculation_is_timed() {
        let fixture = Fixture::new(5).await;
        let metrics = PerformanceMetrics::new();
        let engine = RateCalculationEngine::new(
            fixture.stores.directory.clone(),
            fixture.stores.rate_plans.clone(),
            fixture.stores.overrides.clone(),
            dec!(0.15),
            MAX_NIGHTS,
            metrics.clone(),
        );

        engine
            .calculate(fixture.hotel_id, &stay(&fixture, date(6, 1), date(6, 2)))
            .await
            .unwrap();
        let _ = engine
            .calculate(fixture.hotel_id, &stay(&fixture, date(6, 2), date(6, 1)))
            .await;

        assert_eq!(metrics.summary().rate_calculations.count, 2);
    }
}
