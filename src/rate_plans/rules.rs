// Pricing Rule Evaluator
//
// Rules live in the rate plan's JSONB column as untyped documents. They are
// parsed into `PricingRule` at the serde boundary so the evaluator only ever
// sees typed triggers and adjustments.

use chrono::{Datelike, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashSet;
use thiserror::Error;

/// Largest percentage an increasing adjustment may carry
const MAX_PERCENTAGE: Decimal = Decimal::ONE_THOUSAND;

/// Largest fixed amount an adjustment may carry
const MAX_FIXED_AMOUNT: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Applying rules pushed a rate outside what `Decimal` can represent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Pricing rules produce a rate outside the supported range")]
pub struct RateOverflow;

/// What makes a rule fire
#[derive(Debug, Clone, PartialEq)]
pub enum RuleTrigger {
    /// Fires when the booking is made at least `days_in_advance` days ahead
    EarlyBird { days_in_advance: i64 },
    /// Fires when the booking is made at most `days_in_advance` days ahead
    LastMinute { days_in_advance: i64 },
    /// Fires when `min_nights <= length_of_stay <= max_nights`
    LengthOfStay {
        min_nights: i64,
        max_nights: Option<i64>,
    },
    /// Fires when occupancy (percent) reaches the threshold
    OccupancyBased { occupancy_threshold: Decimal },
    /// Fires on the listed weekdays, 0 = Sunday .. 6 = Saturday
    DayOfWeek { days_of_week: Vec<u32> },
    /// A rule type this service does not understand; never fires
    Unknown { rule_type: String, condition: Value },
}

impl RuleTrigger {
    pub fn type_name(&self) -> &str {
        match self {
            RuleTrigger::EarlyBird { .. } => "EARLY_BIRD",
            RuleTrigger::LastMinute { .. } => "LAST_MINUTE",
            RuleTrigger::LengthOfStay { .. } => "LENGTH_OF_STAY",
            RuleTrigger::OccupancyBased { .. } => "OCCUPANCY_BASED",
            RuleTrigger::DayOfWeek { .. } => "DAY_OF_WEEK",
            RuleTrigger::Unknown { rule_type, .. } => rule_type,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdjustmentKind {
    Percentage,
    FixedAmount,
    #[serde(other)]
    Unknown,
}

/// MULTIPLY behaves exactly like ADD
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdjustmentOperation {
    #[default]
    Add,
    Subtract,
    Multiply,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adjustment {
    #[serde(rename = "type")]
    pub kind: AdjustmentKind,
    #[serde(default)]
    pub operation: AdjustmentOperation,
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
}

impl Adjustment {
    /// Magnitude checks; the operation carries the sign
    pub fn check_bounds(&self) -> Result<(), String> {
        if self.value.is_sign_negative() && !self.value.is_zero() {
            return Err(format!(
                "Adjustment value {} must not be negative; use SUBTRACT to discount",
                self.value
            ));
        }

        let limit = match (self.kind, self.operation) {
            (AdjustmentKind::Percentage, AdjustmentOperation::Subtract) => Decimal::ONE_HUNDRED,
            (AdjustmentKind::Percentage, _) => MAX_PERCENTAGE,
            (AdjustmentKind::FixedAmount, _) => MAX_FIXED_AMOUNT,
            (AdjustmentKind::Unknown, _) => return Ok(()),
        };
        if self.value > limit {
            return Err(format!(
                "Adjustment value {} exceeds the maximum of {} for this adjustment",
                self.value, limit
            ));
        }
        Ok(())
    }
}

/// A typed pricing rule attached to a rate plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPricingRule", into = "RawPricingRule")]
pub struct PricingRule {
    pub name: Option<String>,
    pub trigger: RuleTrigger,
    pub adjustment: Adjustment,
    /// Higher priorities are applied first
    pub priority: i32,
}

/// Document form of a rule, as stored in JSONB and sent over the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPricingRule {
    #[serde(rename = "type")]
    pub rule_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub condition: Value,
    pub adjustment: Adjustment,
    #[serde(default)]
    pub priority: i32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdvanceCondition {
    days_in_advance: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LengthOfStayCondition {
    #[serde(default)]
    min_nights: i64,
    #[serde(default)]
    max_nights: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OccupancyCondition {
    #[serde(with = "rust_decimal::serde::float")]
    occupancy_threshold: Decimal,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DayOfWeekCondition {
    days_of_week: Vec<u32>,
}

fn parse_condition<T: serde::de::DeserializeOwned>(
    rule_type: &str,
    condition: Value,
) -> Result<T, String> {
    serde_json::from_value(condition)
        .map_err(|e| format!("Invalid condition for {} rule: {}", rule_type, e))
}

impl TryFrom<RawPricingRule> for PricingRule {
    type Error = String;

    fn try_from(raw: RawPricingRule) -> Result<Self, Self::Error> {
        let rule_type = raw.rule_type.as_str();
        let trigger = match rule_type {
            "EARLY_BIRD" => {
                let c: AdvanceCondition = parse_condition(rule_type, raw.condition)?;
                RuleTrigger::EarlyBird {
                    days_in_advance: c.days_in_advance,
                }
            }
            "LAST_MINUTE" => {
                let c: AdvanceCondition = parse_condition(rule_type, raw.condition)?;
                RuleTrigger::LastMinute {
                    days_in_advance: c.days_in_advance,
                }
            }
            "LENGTH_OF_STAY" => {
                let condition = if raw.condition.is_null() {
                    json!({})
                } else {
                    raw.condition
                };
                let c: LengthOfStayCondition = parse_condition(rule_type, condition)?;
                RuleTrigger::LengthOfStay {
                    min_nights: c.min_nights,
                    max_nights: c.max_nights,
                }
            }
            "OCCUPANCY_BASED" => {
                let c: OccupancyCondition = parse_condition(rule_type, raw.condition)?;
                RuleTrigger::OccupancyBased {
                    occupancy_threshold: c.occupancy_threshold,
                }
            }
            "DAY_OF_WEEK" => {
                let c: DayOfWeekCondition = parse_condition(rule_type, raw.condition)?;
                if let Some(day) = c.days_of_week.iter().find(|d| **d > 6) {
                    return Err(format!(
                        "Invalid condition for DAY_OF_WEEK rule: day {} is outside 0..=6",
                        day
                    ));
                }
                RuleTrigger::DayOfWeek {
                    days_of_week: c.days_of_week,
                }
            }
            _ => RuleTrigger::Unknown {
                rule_type: raw.rule_type.clone(),
                condition: raw.condition,
            },
        };
        raw.adjustment
            .check_bounds()
            .map_err(|e| format!("Invalid adjustment for {} rule: {}", raw.rule_type, e))?;

        Ok(PricingRule {
            name: raw.name,
            trigger,
            adjustment: raw.adjustment,
            priority: raw.priority,
        })
    }
}

impl From<PricingRule> for RawPricingRule {
    fn from(rule: PricingRule) -> Self {
        let rule_type = rule.trigger.type_name().to_string();
        let condition = match rule.trigger {
            RuleTrigger::EarlyBird { days_in_advance }
            | RuleTrigger::LastMinute { days_in_advance } => {
                json!({ "daysInAdvance": days_in_advance })
            }
            RuleTrigger::LengthOfStay {
                min_nights,
                max_nights,
            } => match max_nights {
                Some(max) => json!({ "minNights": min_nights, "maxNights": max }),
                None => json!({ "minNights": min_nights }),
            },
            RuleTrigger::OccupancyBased {
                occupancy_threshold,
            } => json!({ "occupancyThreshold": occupancy_threshold.to_f64() }),
            RuleTrigger::DayOfWeek { days_of_week } => json!({ "daysOfWeek": days_of_week }),
            RuleTrigger::Unknown { condition, .. } => condition,
        };

        RawPricingRule {
            rule_type,
            name: rule.name,
            condition,
            adjustment: rule.adjustment,
            priority: rule.priority,
        }
    }
}

/// Inputs a rule can react to for a single night
#[derive(Debug, Clone, Copy)]
pub struct RuleContext {
    pub date: NaiveDate,
    pub days_in_advance: i64,
    pub length_of_stay: i64,
    pub occupancy_percent: Decimal,
}

/// Record of a rule that fired for a night
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppliedRule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub rule_type: String,
    pub priority: i32,
    /// Amount added to the running rate (negative for discounts)
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

/// Decide whether a rule fires for the given night
pub fn applies(rule: &PricingRule, ctx: &RuleContext) -> bool {
    match &rule.trigger {
        RuleTrigger::EarlyBird { days_in_advance } => ctx.days_in_advance >= *days_in_advance,
        RuleTrigger::LastMinute { days_in_advance } => ctx.days_in_advance <= *days_in_advance,
        RuleTrigger::LengthOfStay {
            min_nights,
            max_nights,
        } => {
            ctx.length_of_stay >= *min_nights
                && max_nights.map_or(true, |max| ctx.length_of_stay <= max)
        }
        RuleTrigger::OccupancyBased {
            occupancy_threshold,
        } => ctx.occupancy_percent >= *occupancy_threshold,
        RuleTrigger::DayOfWeek { days_of_week } => {
            days_of_week.contains(&ctx.date.weekday().num_days_from_sunday())
        }
        RuleTrigger::Unknown { .. } => false,
    }
}

/// Amount an adjustment contributes against `rate`
pub fn adjust(rate: Decimal, adjustment: &Adjustment) -> Result<Decimal, RateOverflow> {
    let magnitude = match adjustment.kind {
        AdjustmentKind::Percentage => rate
            .checked_mul(adjustment.value)
            .and_then(|scaled| scaled.checked_div(Decimal::ONE_HUNDRED))
            .ok_or(RateOverflow)?,
        AdjustmentKind::FixedAmount => adjustment.value,
        AdjustmentKind::Unknown => return Ok(Decimal::ZERO),
    };

    Ok(match adjustment.operation {
        AdjustmentOperation::Subtract => -magnitude,
        AdjustmentOperation::Add | AdjustmentOperation::Multiply => magnitude,
    })
}

/// Apply every firing rule to `base`, highest priority first.
///
/// Each delta is computed against the running rate, so percentage rules
/// compound. Rules sharing a priority keep their list order.
///
/// # Returns
/// The adjusted (unrounded) rate and the rules that fired, in application
/// order, or `RateOverflow` when the running rate leaves the `Decimal` range
pub fn apply_rules(
    base: Decimal,
    rules: &[PricingRule],
    ctx: &RuleContext,
) -> Result<(Decimal, Vec<AppliedRule>), RateOverflow> {
    let mut firing: Vec<&PricingRule> = rules.iter().filter(|rule| applies(rule, ctx)).collect();
    // Vec::sort_by is stable
    firing.sort_by(|a, b| b.priority.cmp(&a.priority));

    let mut seen = HashSet::new();
    if firing.iter().any(|rule| !seen.insert(rule.priority)) {
        tracing::debug!(
            date = %ctx.date,
            "Multiple pricing rules share a priority; applying in list order"
        );
    }

    let mut rate = base;
    let mut applied = Vec::with_capacity(firing.len());
    for rule in firing {
        let delta = adjust(rate, &rule.adjustment)?;
        rate = rate.checked_add(delta).ok_or(RateOverflow)?;
        applied.push(AppliedRule {
            name: rule.name.clone(),
            rule_type: rule.trigger.type_name().to_string(),
            priority: rule.priority,
            amount: delta,
        });
    }

    Ok((rate, applied))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ctx(days_in_advance: i64, length_of_stay: i64) -> RuleContext {
        RuleContext {
            // 2025-06-01 is a Sunday
            date: date(2025, 6, 1),
            days_in_advance,
            length_of_stay,
            occupancy_percent: Decimal::ZERO,
        }
    }

    fn percent(operation: AdjustmentOperation, value: Decimal) -> Adjustment {
        Adjustment {
            kind: AdjustmentKind::Percentage,
            operation,
            value,
        }
    }

    fn rule(trigger: RuleTrigger, adjustment: Adjustment, priority: i32) -> PricingRule {
        PricingRule {
            name: None,
            trigger,
            adjustment,
            priority,
        }
    }

    #[test]
    fn test_early_bird_threshold() {
        let r = rule(
            RuleTrigger::EarlyBird { days_in_advance: 14 },
            percent(AdjustmentOperation::Subtract, dec!(10)),
            0,
        );
        assert!(applies(&r, &ctx(14, 1)));
        assert!(applies(&r, &ctx(20, 1)));
        assert!(!applies(&r, &ctx(13, 1)));
    }

    #[test]
    fn test_last_minute_threshold() {
        let r = rule(
            RuleTrigger::LastMinute { days_in_advance: 2 },
            percent(AdjustmentOperation::Subtract, dec!(15)),
            0,
        );
        assert!(applies(&r, &ctx(0, 1)));
        assert!(applies(&r, &ctx(2, 1)));
        assert!(!applies(&r, &ctx(3, 1)));
    }

    #[test]
    fn test_length_of_stay_bounds() {
        let bounded = rule(
            RuleTrigger::LengthOfStay {
                min_nights: 3,
                max_nights: Some(7),
            },
            percent(AdjustmentOperation::Subtract, dec!(5)),
            0,
        );
        assert!(!applies(&bounded, &ctx(0, 2)));
        assert!(applies(&bounded, &ctx(0, 3)));
        assert!(applies(&bounded, &ctx(0, 7)));
        assert!(!applies(&bounded, &ctx(0, 8)));

        let open_ended = rule(
            RuleTrigger::LengthOfStay {
                min_nights: 0,
                max_nights: None,
            },
            percent(AdjustmentOperation::Subtract, dec!(5)),
            0,
        );
        assert!(applies(&open_ended, &ctx(0, 365)));
    }

    #[test]
    fn test_occupancy_rule_silent_at_zero_occupancy() {
        let r = rule(
            RuleTrigger::OccupancyBased {
                occupancy_threshold: dec!(80),
            },
            percent(AdjustmentOperation::Add, dec!(20)),
            0,
        );
        assert!(!applies(&r, &ctx(0, 1)));

        let mut busy = ctx(0, 1);
        busy.occupancy_percent = dec!(85);
        assert!(applies(&r, &busy));
    }

    #[test]
    fn test_day_of_week_uses_sunday_zero() {
        let weekend = rule(
            RuleTrigger::DayOfWeek {
                days_of_week: vec![0, 6],
            },
            percent(AdjustmentOperation::Add, dec!(20)),
            0,
        );
        // Sunday
        assert!(applies(&weekend, &ctx(0, 1)));

        let mut monday = ctx(0, 1);
        monday.date = date(2025, 6, 2);
        assert!(!applies(&weekend, &monday));

        let mut saturday = ctx(0, 1);
        saturday.date = date(2025, 6, 7);
        assert!(applies(&weekend, &saturday));
    }

    #[test]
    fn test_unknown_rule_never_fires() {
        let raw: RawPricingRule = serde_json::from_value(json!({
            "type": "LOYALTY_TIER",
            "condition": { "tier": "GOLD" },
            "adjustment": { "type": "PERCENTAGE", "operation": "SUBTRACT", "value": 50 }
        }))
        .unwrap();
        let r = PricingRule::try_from(raw).unwrap();

        assert!(matches!(r.trigger, RuleTrigger::Unknown { .. }));
        assert!(!applies(&r, &ctx(100, 10)));
    }

    #[test]
    fn test_adjust_percentage_and_fixed() {
        assert_eq!(
            adjust(dec!(200), &percent(AdjustmentOperation::Subtract, dec!(10))).unwrap(),
            dec!(-20)
        );
        assert_eq!(
            adjust(dec!(200), &percent(AdjustmentOperation::Add, dec!(10))).unwrap(),
            dec!(20)
        );

        let fixed = Adjustment {
            kind: AdjustmentKind::FixedAmount,
            operation: AdjustmentOperation::Subtract,
            value: dec!(25),
        };
        assert_eq!(adjust(dec!(200), &fixed).unwrap(), dec!(-25));
    }

    #[test]
    fn test_multiply_behaves_like_add() {
        assert_eq!(
            adjust(dec!(100), &percent(AdjustmentOperation::Multiply, dec!(10))).unwrap(),
            dec!(10)
        );
    }

    #[test]
    fn test_unknown_adjustment_kind_is_zero() {
        let adjustment: Adjustment =
            serde_json::from_value(json!({ "type": "SURGE", "operation": "ADD", "value": 30 }))
                .unwrap();
        assert_eq!(adjustment.kind, AdjustmentKind::Unknown);
        assert_eq!(adjust(dec!(100), &adjustment).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_rules_compound_by_priority() {
        let rules = vec![
            rule(
                RuleTrigger::LengthOfStay {
                    min_nights: 0,
                    max_nights: None,
                },
                percent(AdjustmentOperation::Subtract, dec!(10)),
                5,
            ),
            rule(
                RuleTrigger::EarlyBird { days_in_advance: 0 },
                percent(AdjustmentOperation::Add, dec!(20)),
                10,
            ),
        ];

        let (rate, applied) = apply_rules(dec!(100), &rules, &ctx(30, 3)).unwrap();

        // +20% first (priority 10): 120, then -10% of 120: 108
        assert_eq!(rate, dec!(108));
        assert_eq!(applied.len(), 2);
        assert_eq!(applied[0].rule_type, "EARLY_BIRD");
        assert_eq!(applied[0].amount, dec!(20));
        assert_eq!(applied[1].amount, dec!(-12));
    }

    #[test]
    fn test_equal_priorities_keep_list_order() {
        let rules = vec![
            rule(
                RuleTrigger::EarlyBird { days_in_advance: 0 },
                Adjustment {
                    kind: AdjustmentKind::FixedAmount,
                    operation: AdjustmentOperation::Add,
                    value: dec!(10),
                },
                1,
            ),
            rule(
                RuleTrigger::EarlyBird { days_in_advance: 0 },
                percent(AdjustmentOperation::Add, dec!(50)),
                1,
            ),
        ];

        let (rate, _) = apply_rules(dec!(100), &rules, &ctx(5, 1)).unwrap();
        // (100 + 10) * 1.5
        assert_eq!(rate, dec!(165));
    }

    #[test]
    fn test_raw_round_trip_keeps_condition() {
        let document = json!({
            "type": "EARLY_BIRD",
            "name": "Book early",
            "condition": { "daysInAdvance": 14 },
            "adjustment": { "type": "PERCENTAGE", "operation": "SUBTRACT", "value": 10 },
            "priority": 3
        });
        let parsed: PricingRule = serde_json::from_value(document).unwrap();
        assert_eq!(
            parsed.trigger,
            RuleTrigger::EarlyBird { days_in_advance: 14 }
        );

        let back = serde_json::to_value(&parsed).unwrap();
        assert_eq!(back["type"], "EARLY_BIRD");
        assert_eq!(back["condition"]["daysInAdvance"], 14);
        assert_eq!(back["priority"], 3);
    }

    #[test]
    fn test_malformed_known_condition_rejected() {
        let result: Result<PricingRule, _> = serde_json::from_value(json!({
            "type": "DAY_OF_WEEK",
            "condition": { "daysOfWeek": [1, 9] },
            "adjustment": { "type": "PERCENTAGE", "value": 10 }
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_threshold_rules_require_condition() {
        for rule_type in ["EARLY_BIRD", "LAST_MINUTE", "OCCUPANCY_BASED"] {
            let result: Result<PricingRule, _> = serde_json::from_value(json!({
                "type": rule_type,
                "adjustment": { "type": "PERCENTAGE", "operation": "SUBTRACT", "value": 10 }
            }));
            let message = result.unwrap_err().to_string();
            assert!(message.contains(rule_type), "{}", message);
        }
    }

    #[test]
    fn test_adjustment_values_are_bounded() {
        let parse = |adjustment: Value| -> Result<PricingRule, serde_json::Error> {
            serde_json::from_value(json!({
                "type": "LENGTH_OF_STAY",
                "condition": { "minNights": 1 },
                "adjustment": adjustment
            }))
        };

        assert!(parse(json!({ "type": "PERCENTAGE", "operation": "SUBTRACT", "value": 100 })).is_ok());
        assert!(parse(json!({ "type": "PERCENTAGE", "operation": "SUBTRACT", "value": 150 })).is_err());
        assert!(parse(json!({ "type": "PERCENTAGE", "operation": "ADD", "value": 1000 })).is_ok());
        assert!(parse(json!({ "type": "PERCENTAGE", "operation": "ADD", "value": 1e27 })).is_err());
        assert!(parse(json!({ "type": "PERCENTAGE", "operation": "ADD", "value": -5 })).is_err());
        assert!(parse(json!({ "type": "FIXED_AMOUNT", "operation": "ADD", "value": 2000000 })).is_err());
        assert!(parse(json!({ "type": "SURGE", "operation": "ADD", "value": 1e27 })).is_ok());
    }

    #[test]
    fn test_overflowing_rules_report_error() {
        let huge_value = Decimal::from_i128_with_scale(10i128.pow(27), 0);
        let huge = Adjustment {
            kind: AdjustmentKind::Percentage,
            operation: AdjustmentOperation::Add,
            value: huge_value,
        };
        assert_eq!(adjust(huge_value, &huge), Err(RateOverflow));

        let stacked = vec![
            rule(
                RuleTrigger::LengthOfStay {
                    min_nights: 0,
                    max_nights: None,
                },
                huge.clone(),
                2,
            ),
            rule(
                RuleTrigger::LengthOfStay {
                    min_nights: 0,
                    max_nights: None,
                },
                huge,
                1,
            ),
        ];
        assert_eq!(apply_rules(dec!(100), &stacked, &ctx(0, 2)), Err(RateOverflow));

        let fixed = Adjustment {
            kind: AdjustmentKind::FixedAmount,
            operation: AdjustmentOperation::Add,
            value: Decimal::MAX,
        };
        let topped = vec![rule(RuleTrigger::EarlyBird { days_in_advance: 0 }, fixed, 0)];
        assert_eq!(apply_rules(Decimal::MAX, &topped, &ctx(1, 1)), Err(RateOverflow));
    }

    proptest! {
        #[test]
        fn prop_no_rules_returns_base(cents in 0i64..10_000_000, advance in -30i64..400, nights in 1i64..60) {
            let base = Decimal::new(cents, 2);
            let (rate, applied) = apply_rules(base, &[], &ctx(advance, nights)).unwrap();
            prop_assert_eq!(rate, base);
            prop_assert!(applied.is_empty());
        }

        #[test]
        fn prop_two_percent_rules_compound(cents in 1i64..1_000_000, a in 0i64..100, b in 0i64..100) {
            let base = Decimal::new(cents, 2);
            let rules = vec![
                rule(RuleTrigger::EarlyBird { days_in_advance: 0 }, percent(AdjustmentOperation::Add, Decimal::from(b)), 1),
                rule(RuleTrigger::EarlyBird { days_in_advance: 0 }, percent(AdjustmentOperation::Subtract, Decimal::from(a)), 2),
            ];
            let (rate, _) = apply_rules(base, &rules, &ctx(10, 1)).unwrap();

            let after_first = base - base * Decimal::from(a) / Decimal::ONE_HUNDRED;
            let expected = after_first + after_first * Decimal::from(b) / Decimal::ONE_HUNDRED;
            prop_assert_eq!(rate, expected);
        }
    }
}
