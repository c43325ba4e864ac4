//! Waste collection piece rates.
//!
//! A collection day is paid per container emptied: the size rate plus a
//! category add-on, scaled by route difficulty, plus weather compensation and
//! per-container surcharges. The result is floored at the daily guarantee.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::{HUNDRED, apply_guarantee, round_money};
use crate::error::EngineResult;
use crate::models::Employee;
use crate::validation::ValidationResult;

use super::EntitlementCalculator;

/// Container sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerSize {
    /// 140 litre bin.
    L140,
    /// 240 litre bin.
    L240,
    /// 400 litre bin.
    L400,
    /// 660 litre container.
    L660,
    /// 1000 litre container.
    L1000,
    /// Underground container.
    Underground,
}

/// Waste categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WasteCategory {
    /// Residual household waste.
    Residual,
    /// Food and garden waste.
    Organic,
    /// Paper and plastic.
    PaperPlastic,
    /// Glass and metal.
    Glass,
    /// Hazardous waste.
    Hazardous,
}

/// Weather on the collection day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    /// Rain.
    Rain,
    /// Snow.
    Snow,
    /// Ice.
    Ice,
    /// Heat.
    Heat,
}

/// Piece rates and compensation for waste collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WastePolicy {
    /// 140 L rate.
    pub rate_140l: Decimal,
    /// 240 L rate.
    pub rate_240l: Decimal,
    /// 400 L rate.
    pub rate_400l: Decimal,
    /// 660 L rate.
    pub rate_660l: Decimal,
    /// 1000 L rate.
    pub rate_1000l: Decimal,
    /// Underground container rate.
    pub rate_underground: Decimal,
    /// Organic add-on.
    pub organic_addon: Decimal,
    /// Paper/plastic add-on.
    pub paper_plastic_addon: Decimal,
    /// Glass add-on.
    pub glass_addon: Decimal,
    /// Hazardous add-on.
    pub hazardous_addon: Decimal,
    /// Lowest route difficulty factor.
    pub min_difficulty: Decimal,
    /// Highest route difficulty factor.
    pub max_difficulty: Decimal,
    /// Rain compensation percentage.
    pub rain_percent: Decimal,
    /// Snow compensation percentage.
    pub snow_percent: Decimal,
    /// Ice compensation percentage.
    pub ice_percent: Decimal,
    /// Heat compensation percentage.
    pub heat_percent: Decimal,
    /// Surcharge per underground container.
    pub underground_surcharge: Decimal,
    /// Surcharge per locked container.
    pub locked_surcharge: Decimal,
    /// Surcharge per heavy container.
    pub heavy_surcharge: Decimal,
    /// Surcharge per hard-to-access container.
    pub hard_access_surcharge: Decimal,
    /// Daily guaranteed minimum.
    pub daily_guarantee: Decimal,
    /// Clause citation.
    pub legal_reference: String,
}

impl Default for WastePolicy {
    fn default() -> Self {
        Self {
            rate_140l: Decimal::new(320, 2),
            rate_240l: Decimal::new(380, 2),
            rate_400l: Decimal::new(510, 2),
            rate_660l: Decimal::new(750, 2),
            rate_1000l: Decimal::new(980, 2),
            rate_underground: Decimal::new(1400, 2),
            organic_addon: Decimal::new(40, 2),
            paper_plastic_addon: Decimal::new(20, 2),
            glass_addon: Decimal::new(60, 2),
            hazardous_addon: Decimal::new(200, 2),
            min_difficulty: Decimal::ONE,
            max_difficulty: Decimal::new(15, 1),
            rain_percent: Decimal::from(10),
            snow_percent: Decimal::from(15),
            ice_percent: Decimal::from(20),
            heat_percent: Decimal::from(10),
            underground_surcharge: Decimal::new(500, 2),
            locked_surcharge: Decimal::new(150, 2),
            heavy_surcharge: Decimal::new(300, 2),
            hard_access_surcharge: Decimal::new(250, 2),
            daily_guarantee: Decimal::new(125000, 2),
            legal_reference: "§ 15 Akkord for renovation".to_string(),
        }
    }
}

impl WastePolicy {
    /// Size rate plus category add-on for one container.
    pub fn unit_rate(&self, size: ContainerSize, category: WasteCategory) -> Decimal {
        let size_rate = match size {
            ContainerSize::L140 => self.rate_140l,
            ContainerSize::L240 => self.rate_240l,
            ContainerSize::L400 => self.rate_400l,
            ContainerSize::L660 => self.rate_660l,
            ContainerSize::L1000 => self.rate_1000l,
            ContainerSize::Underground => self.rate_underground,
        };
        let addon = match category {
            WasteCategory::Residual => Decimal::ZERO,
            WasteCategory::Organic => self.organic_addon,
            WasteCategory::PaperPlastic => self.paper_plastic_addon,
            WasteCategory::Glass => self.glass_addon,
            WasteCategory::Hazardous => self.hazardous_addon,
        };
        size_rate + addon
    }

    /// Weather compensation percentage.
    pub fn weather_percent(&self, weather: WeatherCondition) -> Decimal {
        match weather {
            WeatherCondition::Rain => self.rain_percent,
            WeatherCondition::Snow => self.snow_percent,
            WeatherCondition::Ice => self.ice_percent,
            WeatherCondition::Heat => self.heat_percent,
        }
    }
}

/// Containers of one size and category emptied during the day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerPickup {
    /// Container size.
    pub size: ContainerSize,
    /// Waste category.
    pub category: WasteCategory,
    /// Number of containers.
    pub count: u32,
    /// How many of them were underground.
    #[serde(default)]
    pub underground: u32,
    /// How many of them were locked.
    #[serde(default)]
    pub locked: u32,
    /// How many of them were heavy.
    #[serde(default)]
    pub heavy: u32,
    /// How many of them were hard to access.
    #[serde(default)]
    pub hard_to_access: u32,
}

/// One waste collection day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WasteRequest {
    /// Collection date.
    pub date: NaiveDate,
    /// Containers emptied.
    pub pickups: Vec<ContainerPickup>,
    /// Route difficulty factor (1.0–1.5).
    pub route_difficulty: Decimal,
    /// Weather condition, if compensable.
    #[serde(default)]
    pub weather: Option<WeatherCondition>,
}

/// A priced collection day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WasteCalculation {
    /// The collector.
    pub employee_id: String,
    /// Collection date.
    pub date: NaiveDate,
    /// Containers emptied.
    pub container_count: u32,
    /// Piece-rate pay before difficulty.
    pub base_piece_pay: Decimal,
    /// Difficulty factor as requested.
    pub requested_difficulty: Decimal,
    /// Difficulty factor applied (clamped to the allowed range).
    pub applied_difficulty: Decimal,
    /// Piece-rate pay after difficulty.
    pub adjusted_piece_pay: Decimal,
    /// Weather compensation percentage applied.
    pub weather_percent: Decimal,
    /// Weather compensation.
    pub weather_compensation: Decimal,
    /// Per-container surcharges.
    pub surcharges: Decimal,
    /// Pay before the guarantee.
    pub computed_pay: Decimal,
    /// Daily guarantee.
    pub daily_guarantee: Decimal,
    /// Guarantee − computed pay when positive.
    pub guarantee_top_up: Decimal,
    /// Pay after the guarantee.
    pub payable: Decimal,
    /// Pickups with more flagged containers than emptied ones.
    pub inconsistent_pickups: usize,
    /// Clause citation.
    pub legal_reference: String,
}

/// Prices waste collection days.
#[derive(Debug, Clone, Default)]
pub struct WasteCalculator {
    policy: WastePolicy,
}

impl WasteCalculator {
    /// Creates a calculator with the given rates.
    pub fn new(policy: WastePolicy) -> Self {
        Self { policy }
    }
}

impl EntitlementCalculator for WasteCalculator {
    type Request = WasteRequest;
    type Calculation = WasteCalculation;

    fn calculate(
        &self,
        employee: &Employee,
        request: &WasteRequest,
    ) -> EngineResult<WasteCalculation> {
        let policy = &self.policy;

        let mut container_count: u32 = 0;
        let mut base_piece_pay = Decimal::ZERO;
        let mut surcharges = Decimal::ZERO;
        let mut inconsistent_pickups = 0;

        for pickup in &request.pickups {
            container_count = container_count.saturating_add(pickup.count);
            base_piece_pay +=
                policy.unit_rate(pickup.size, pickup.category) * Decimal::from(pickup.count);
            surcharges += Decimal::from(pickup.underground) * policy.underground_surcharge
                + Decimal::from(pickup.locked) * policy.locked_surcharge
                + Decimal::from(pickup.heavy) * policy.heavy_surcharge
                + Decimal::from(pickup.hard_to_access) * policy.hard_access_surcharge;
            let flagged = [
                pickup.underground,
                pickup.locked,
                pickup.heavy,
                pickup.hard_to_access,
            ];
            if flagged.iter().any(|n| *n > pickup.count) {
                inconsistent_pickups += 1;
            }
        }

        let applied_difficulty = request
            .route_difficulty
            .clamp(policy.min_difficulty, policy.max_difficulty);
        let adjusted_piece_pay = base_piece_pay * applied_difficulty;
        let weather_percent = request
            .weather
            .map(|w| policy.weather_percent(w))
            .unwrap_or(Decimal::ZERO);
        let weather_compensation = round_money(adjusted_piece_pay * weather_percent / HUNDRED);
        let computed_pay =
            round_money(adjusted_piece_pay) + weather_compensation + round_money(surcharges);
        let guarantee = apply_guarantee(computed_pay, policy.daily_guarantee);

        Ok(WasteCalculation {
            employee_id: employee.id.clone(),
            date: request.date,
            container_count,
            base_piece_pay: round_money(base_piece_pay),
            requested_difficulty: request.route_difficulty,
            applied_difficulty,
            adjusted_piece_pay: round_money(adjusted_piece_pay),
            weather_percent,
            weather_compensation,
            surcharges: round_money(surcharges),
            computed_pay,
            daily_guarantee: policy.daily_guarantee,
            guarantee_top_up: guarantee.top_up,
            payable: guarantee.payable,
            inconsistent_pickups,
            legal_reference: policy.legal_reference.clone(),
        })
    }

    fn validate(&self, _employee: &Employee, calculation: &WasteCalculation) -> ValidationResult {
        let mut result = ValidationResult::new();

        if calculation.requested_difficulty != calculation.applied_difficulty {
            result.push_error(
                "WASTE_DIFFICULTY_OUT_OF_RANGE",
                format!(
                    "route difficulty {} outside {}–{}, {} applied",
                    calculation.requested_difficulty.normalize(),
                    self.policy.min_difficulty.normalize(),
                    self.policy.max_difficulty.normalize(),
                    calculation.applied_difficulty.normalize()
                ),
            );
        }
        if calculation.inconsistent_pickups > 0 {
            result.push_error(
                "WASTE_SURCHARGE_COUNT_INVALID",
                format!(
                    "{} pickup(s) flag more containers than were emptied",
                    calculation.inconsistent_pickups
                ),
            );
        }
        if calculation.container_count == 0 {
            result.push_warning("WASTE_NO_CONTAINERS", "no containers recorded for the day");
        }
        if calculation.guarantee_top_up > Decimal::ZERO {
            result.push_warning(
                "WASTE_GUARANTEE_APPLIED",
                format!(
                    "piece rate {} below the daily guarantee, topped up by {}",
                    calculation.computed_pay, calculation.guarantee_top_up
                ),
            );
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_support::warehouse_worker;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn pickup(size: ContainerSize, category: WasteCategory, count: u32) -> ContainerPickup {
        ContainerPickup {
            size,
            category,
            count,
            underground: 0,
            locked: 0,
            heavy: 0,
            hard_to_access: 0,
        }
    }

    fn request(pickups: Vec<ContainerPickup>, difficulty: &str) -> WasteRequest {
        WasteRequest {
            date: NaiveDate::from_ymd_opt(2025, 3, 4).unwrap(),
            pickups,
            route_difficulty: dec(difficulty),
            weather: None,
        }
    }

    /// WC-001: piece rate above the guarantee
    #[test]
    fn test_wc_001_above_guarantee() {
        let calculation = WasteCalculator::default()
            .calculate(
                &warehouse_worker(),
                &request(
                    vec![pickup(ContainerSize::L240, WasteCategory::Organic, 300)],
                    "1.0",
                ),
            )
            .unwrap();

        assert_eq!(calculation.computed_pay, dec("1260.00"));
        assert_eq!(calculation.guarantee_top_up, Decimal::ZERO);
        assert_eq!(calculation.payable, dec("1260.00"));
    }

    /// WC-002: difficulty, snow and locked surcharge below the guarantee
    #[test]
    fn test_wc_002_topped_up_to_guarantee() {
        let mut locked = pickup(ContainerSize::L240, WasteCategory::Residual, 100);
        locked.locked = 10;
        let mut req = request(vec![locked], "1.2");
        req.weather = Some(WeatherCondition::Snow);
        let calc = WasteCalculator::default();
        let calculation = calc.calculate(&warehouse_worker(), &req).unwrap();

        assert_eq!(calculation.base_piece_pay, dec("380.00"));
        assert_eq!(calculation.adjusted_piece_pay, dec("456.00"));
        assert_eq!(calculation.weather_compensation, dec("68.40"));
        assert_eq!(calculation.surcharges, dec("15.00"));
        assert_eq!(calculation.computed_pay, dec("539.40"));
        assert_eq!(calculation.guarantee_top_up, dec("710.60"));
        assert_eq!(calculation.payable, dec("1250.00"));
        assert!(calc
            .validate(&warehouse_worker(), &calculation)
            .has_warning("WASTE_GUARANTEE_APPLIED"));
    }

    /// WC-003: out-of-range difficulty is clamped and reported
    #[test]
    fn test_wc_003_difficulty_clamped() {
        let calc = WasteCalculator::default();
        let calculation = calc
            .calculate(
                &warehouse_worker(),
                &request(
                    vec![pickup(ContainerSize::Underground, WasteCategory::Hazardous, 100)],
                    "1.8",
                ),
            )
            .unwrap();

        assert_eq!(calculation.applied_difficulty, dec("1.5"));
        // 100 × 16.00 × 1.5
        assert_eq!(calculation.computed_pay, dec("2400.00"));
        let validation = calc.validate(&warehouse_worker(), &calculation);
        assert!(!validation.is_valid);
        assert!(validation.has_error("WASTE_DIFFICULTY_OUT_OF_RANGE"));
    }

    /// WC-004: an empty day earns the guarantee
    #[test]
    fn test_wc_004_empty_day() {
        let calc = WasteCalculator::default();
        let calculation = calc
            .calculate(&warehouse_worker(), &request(Vec::new(), "1.0"))
            .unwrap();
        assert_eq!(calculation.payable, dec("1250.00"));
        assert!(calc
            .validate(&warehouse_worker(), &calculation)
            .has_warning("WASTE_NO_CONTAINERS"));
    }

    #[test]
    fn test_unit_rates() {
        let policy = WastePolicy::default();
        assert_eq!(policy.unit_rate(ContainerSize::L140, WasteCategory::Glass), dec("3.80"));
        assert_eq!(
            policy.unit_rate(ContainerSize::L1000, WasteCategory::PaperPlastic),
            dec("10.00")
        );
    }

    #[test]
    fn test_container_count_saturates() {
        let calculation = WasteCalculator::default()
            .calculate(
                &warehouse_worker(),
                &request(
                    vec![
                        pickup(ContainerSize::L140, WasteCategory::Glass, u32::MAX),
                        pickup(ContainerSize::L140, WasteCategory::Glass, 1),
                    ],
                    "1.0",
                ),
            )
            .unwrap();
        assert_eq!(calculation.container_count, u32::MAX);
        assert!(calculation.base_piece_pay > Decimal::ZERO);
    }

    #[test]
    fn test_more_flagged_than_emptied() {
        let mut bad = pickup(ContainerSize::L660, WasteCategory::Residual, 2);
        bad.heavy = 3;
        let calc = WasteCalculator::default();
        let calculation = calc
            .calculate(&warehouse_worker(), &request(vec![bad], "1.0"))
            .unwrap();
        assert!(calc
            .validate(&warehouse_worker(), &calculation)
            .has_error("WASTE_SURCHARGE_COUNT_INVALID"));
    }
}
