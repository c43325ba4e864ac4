//! Warehouse and terminal shift pay.
//!
//! A shift is paid hours × (base rate + temperature differential + zone
//! supplement + terminal supplement), plus a flat bonus for shifts starting
//! at night.

use chrono::{DateTime, FixedOffset, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::{CityZone, city_zone, round_money};
use crate::error::{EngineError, EngineResult};
use crate::models::Employee;
use crate::validation::ValidationResult;

use super::EntitlementCalculator;

/// Temperature of the work area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemperatureZone {
    /// Normal temperature.
    Ambient,
    /// Chilled storage.
    Chilled,
    /// Frozen storage.
    Frozen,
    /// Deep-frozen storage.
    DeepFrozen,
}

/// Geographic pay zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeographicZone {
    /// No supplement.
    Zone0,
    /// Lowest supplement.
    Zone1,
    /// Middle supplement.
    Zone2,
    /// Capital supplement.
    Zone3,
}

impl From<CityZone> for GeographicZone {
    fn from(zone: CityZone) -> Self {
        match zone {
            CityZone::Capital => GeographicZone::Zone3,
            CityZone::RegionalCity => GeographicZone::Zone2,
            CityZone::Zealand => GeographicZone::Zone1,
            CityZone::Provincial => GeographicZone::Zone0,
        }
    }
}

/// The kind of terminal work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalWork {
    /// Ordinary warehouse work.
    Standard,
    /// Terminal handling.
    Terminal,
    /// Terminal cross-docking.
    CrossDock,
    /// Terminal sorting.
    Sorting,
}

/// Warehouse rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarehousePolicy {
    /// Base hourly rate when the employee has no personal rate.
    pub base_hourly_rate: Decimal,
    /// Chilled differential per hour.
    pub chilled_rate: Decimal,
    /// Frozen differential per hour.
    pub frozen_rate: Decimal,
    /// Deep-frozen differential per hour.
    pub deep_frozen_rate: Decimal,
    /// Zone 1 supplement per hour.
    pub zone1_rate: Decimal,
    /// Zone 2 supplement per hour.
    pub zone2_rate: Decimal,
    /// Zone 3 supplement per hour.
    pub zone3_rate: Decimal,
    /// Terminal supplement per hour.
    pub terminal_rate: Decimal,
    /// Cross-dock supplement per hour on top of the terminal supplement.
    pub cross_dock_rate: Decimal,
    /// Sorting supplement per hour on top of the terminal supplement.
    pub sorting_rate: Decimal,
    /// Flat bonus for a shift starting at night.
    pub night_bonus: Decimal,
    /// Night window start (inclusive).
    pub night_start: NaiveTime,
    /// Night window end (exclusive).
    pub night_end: NaiveTime,
    /// Longest shift before a warning, in hours.
    pub max_shift_hours: Decimal,
    /// Longest deep-frozen shift before a warning, in hours.
    pub max_deep_frozen_hours: Decimal,
    /// Clause citation.
    pub legal_reference: String,
}

impl Default for WarehousePolicy {
    fn default() -> Self {
        Self {
            base_hourly_rate: Decimal::new(15800, 2),
            chilled_rate: Decimal::new(800, 2),
            frozen_rate: Decimal::new(1400, 2),
            deep_frozen_rate: Decimal::new(2000, 2),
            zone1_rate: Decimal::new(400, 2),
            zone2_rate: Decimal::new(800, 2),
            zone3_rate: Decimal::new(1200, 2),
            terminal_rate: Decimal::new(500, 2),
            cross_dock_rate: Decimal::new(300, 2),
            sorting_rate: Decimal::new(200, 2),
            night_bonus: Decimal::new(15000, 2),
            night_start: NaiveTime::from_hms_opt(22, 0, 0).unwrap_or(NaiveTime::MIN),
            night_end: NaiveTime::from_hms_opt(6, 0, 0).unwrap_or(NaiveTime::MIN),
            max_shift_hours: Decimal::from(12),
            max_deep_frozen_hours: Decimal::from(6),
            legal_reference: "§ 5 Tillæg, Lager- og terminaloverenskomsten".to_string(),
        }
    }
}

impl WarehousePolicy {
    /// Temperature differential per hour.
    pub fn temperature_rate(&self, zone: TemperatureZone) -> Decimal {
        match zone {
            TemperatureZone::Ambient => Decimal::ZERO,
            TemperatureZone::Chilled => self.chilled_rate,
            TemperatureZone::Frozen => self.frozen_rate,
            TemperatureZone::DeepFrozen => self.deep_frozen_rate,
        }
    }

    /// Geographic supplement per hour.
    pub fn zone_rate(&self, zone: GeographicZone) -> Decimal {
        match zone {
            GeographicZone::Zone0 => Decimal::ZERO,
            GeographicZone::Zone1 => self.zone1_rate,
            GeographicZone::Zone2 => self.zone2_rate,
            GeographicZone::Zone3 => self.zone3_rate,
        }
    }

    /// Terminal supplement per hour.
    pub fn terminal_supplement(&self, work: TerminalWork) -> Decimal {
        match work {
            TerminalWork::Standard => Decimal::ZERO,
            TerminalWork::Terminal => self.terminal_rate,
            TerminalWork::CrossDock => self.terminal_rate + self.cross_dock_rate,
            TerminalWork::Sorting => self.terminal_rate + self.sorting_rate,
        }
    }

    /// Returns true if a shift starting at `time` earns the night bonus.
    pub fn is_night_start(&self, time: NaiveTime) -> bool {
        if self.night_start <= self.night_end {
            time >= self.night_start && time < self.night_end
        } else {
            time >= self.night_start || time < self.night_end
        }
    }
}

/// One warehouse shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarehouseRequest {
    /// Identifier of the shift (for error reporting).
    pub shift_id: String,
    /// Shift start.
    pub start: DateTime<FixedOffset>,
    /// Shift end.
    pub end: DateTime<FixedOffset>,
    /// Unpaid break.
    #[serde(default)]
    pub break_minutes: u32,
    /// Temperature of the work area.
    pub temperature_zone: TemperatureZone,
    /// Geographic zone; derived from the employee's postal code when absent.
    #[serde(default)]
    pub geographic_zone: Option<GeographicZone>,
    /// Terminal work performed.
    pub terminal_work: TerminalWork,
}

/// A priced warehouse shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarehouseCalculation {
    /// The employee.
    pub employee_id: String,
    /// The shift.
    pub shift_id: String,
    /// Paid hours.
    pub hours: Decimal,
    /// Base rate used.
    pub base_hourly_rate: Decimal,
    /// Base pay.
    pub base_pay: Decimal,
    /// Temperature zone.
    pub temperature_zone: TemperatureZone,
    /// Temperature differential pay.
    pub temperature_pay: Decimal,
    /// Geographic zone applied.
    pub geographic_zone: GeographicZone,
    /// True when the zone was derived from the postal code.
    pub zone_derived: bool,
    /// Zone supplement pay.
    pub zone_pay: Decimal,
    /// Terminal supplement pay.
    pub terminal_pay: Decimal,
    /// Night bonus.
    pub night_bonus: Decimal,
    /// Total shift pay.
    pub total_pay: Decimal,
    /// Clause citation.
    pub legal_reference: String,
}

/// Prices warehouse and terminal shifts.
#[derive(Debug, Clone, Default)]
pub struct WarehouseCalculator {
    policy: WarehousePolicy,
}

impl WarehouseCalculator {
    /// Creates a calculator with the given rates.
    pub fn new(policy: WarehousePolicy) -> Self {
        Self { policy }
    }
}

impl EntitlementCalculator for WarehouseCalculator {
    type Request = WarehouseRequest;
    type Calculation = WarehouseCalculation;

    fn calculate(
        &self,
        employee: &Employee,
        request: &WarehouseRequest,
    ) -> EngineResult<WarehouseCalculation> {
        let policy = &self.policy;
        if request.end < request.start {
            return Err(EngineError::InvalidTimeEntry {
                entry_id: request.shift_id.clone(),
                message: format!("shift ends at {} before it starts at {}", request.end, request.start),
            });
        }

        let minutes = ((request.end - request.start).num_minutes()
            - i64::from(request.break_minutes))
        .max(0);
        let hours = Decimal::from(minutes) / Decimal::from(60);

        let base_hourly_rate = employee.base_hourly_rate.unwrap_or(policy.base_hourly_rate);
        let (geographic_zone, zone_derived) = match request.geographic_zone {
            Some(zone) => (zone, false),
            None => (GeographicZone::from(city_zone(&employee.postal_code)), true),
        };

        let base_pay = round_money(hours * base_hourly_rate);
        let temperature_pay = round_money(hours * policy.temperature_rate(request.temperature_zone));
        let zone_pay = round_money(hours * policy.zone_rate(geographic_zone));
        let terminal_pay = round_money(hours * policy.terminal_supplement(request.terminal_work));
        let night_bonus = if policy.is_night_start(request.start.time()) {
            policy.night_bonus
        } else {
            Decimal::ZERO
        };

        Ok(WarehouseCalculation {
            employee_id: employee.id.clone(),
            shift_id: request.shift_id.clone(),
            hours,
            base_hourly_rate,
            base_pay,
            temperature_zone: request.temperature_zone,
            temperature_pay,
            geographic_zone,
            zone_derived,
            zone_pay,
            terminal_pay,
            night_bonus,
            total_pay: base_pay + temperature_pay + zone_pay + terminal_pay + night_bonus,
            legal_reference: policy.legal_reference.clone(),
        })
    }

    fn validate(
        &self,
        _employee: &Employee,
        calculation: &WarehouseCalculation,
    ) -> ValidationResult {
        let mut result = ValidationResult::new();

        if calculation.hours > self.policy.max_shift_hours {
            result.push_warning(
                "WAREHOUSE_SHIFT_TOO_LONG",
                format!(
                    "{} hour shift exceeds {} hours",
                    calculation.hours.round_dp(2).normalize(),
                    self.policy.max_shift_hours.normalize()
                ),
            );
        }
        if calculation.temperature_zone == TemperatureZone::DeepFrozen
            && calculation.hours > self.policy.max_deep_frozen_hours
        {
            result.push_warning(
                "WAREHOUSE_DEEP_FROZEN_TOO_LONG",
                format!(
                    "{} hours in deep-frozen storage exceeds {} hours",
                    calculation.hours.round_dp(2).normalize(),
                    self.policy.max_deep_frozen_hours.normalize()
                ),
            );
        }

        result
    }
}
