//! API request and response types.
//!
//! Field names are camelCase, matching the published `/api/calculate`
//! contract.

use serde::{Deserialize, Serialize};

use crate::tariff::{AnnualSummary, CalculationResult, Month, MonthRecord, MonthTable, Season};

/// Body of `POST /api/calculate`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnualRequest {
    /// Annual consumption (kWh).
    pub annual_consumption: f64,
    /// Annual solar generation (kWh).
    pub solar_generation: f64,
    /// Battery capacity (kW).
    pub battery_capacity: f64,
    /// Service size (amps).
    pub amp_service: u32,
}

/// Body of `POST /api/calculate/monthly`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRequest {
    /// Battery capacity (kW); must be a demand-matrix column.
    pub battery_capacity: f64,
    /// Service size (amps).
    pub amp_service: u32,
    /// Consumption per month (kWh), keyed by month name.
    pub monthly_consumption: MonthTable<f64>,
    /// Solar generation per month (kWh), keyed by month name.
    pub monthly_solar_generation: MonthTable<f64>,
    /// Annual consumption used for the demand bracket (kWh).
    pub total_consumption: f64,
    /// Annual solar generation reported in the summary (kWh).
    pub total_solar_generation: f64,
}

/// Response of both calculate endpoints.
#[derive(Debug, Serialize)]
pub struct CalculateResponse {
    /// Twelve month records, January first.
    pub breakdown: Vec<MonthBreakdown>,
    /// Annual totals.
    pub summary: SummaryRecord,
}

/// One month of the breakdown.
///
/// Maps internal `MonthRecord` fields to the public contract:
/// - `consumption_kwh` → `monthConsumption`
/// - `solar_kwh` → `monthSolar`
/// - `battery_offset_kwh` → `batteryUsed`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthBreakdown {
    pub month: Month,
    pub season: Season,
    pub month_consumption: f64,
    pub month_solar: f64,
    pub on_peak_consumption: f64,
    pub on_peak_solar: f64,
    pub off_peak_consumption: f64,
    pub off_peak_solar: f64,
    pub battery_used: f64,
    pub on_peak_net: f64,
    pub off_peak_net: f64,
    pub on_peak_rate: f64,
    pub off_peak_rate: f64,
    pub on_peak_cost: f64,
    pub on_peak_credit: f64,
    pub off_peak_cost: f64,
    pub off_peak_credit: f64,
    pub demand_kw: f64,
    pub demand_charge: f64,
    pub service_charge: f64,
    pub solar_credits: f64,
    pub final_month_cost: f64,
}

impl From<&MonthRecord> for MonthBreakdown {
    fn from(r: &MonthRecord) -> Self {
        Self {
            month: r.month,
            season: r.season,
            month_consumption: r.consumption_kwh,
            month_solar: r.solar_kwh,
            on_peak_consumption: r.on_peak_consumption_kwh,
            on_peak_solar: r.on_peak_solar_kwh,
            off_peak_consumption: r.off_peak_consumption_kwh,
            off_peak_solar: r.off_peak_solar_kwh,
            battery_used: r.battery_offset_kwh,
            on_peak_net: r.on_peak_net_kwh,
            off_peak_net: r.off_peak_net_kwh,
            on_peak_rate: r.on_peak_rate,
            off_peak_rate: r.off_peak_rate,
            on_peak_cost: r.on_peak_cost,
            on_peak_credit: r.on_peak_credit,
            off_peak_cost: r.off_peak_cost,
            off_peak_credit: r.off_peak_credit,
            demand_kw: r.demand_kw,
            demand_charge: r.demand_charge,
            service_charge: r.service_charge,
            solar_credits: r.solar_credits,
            final_month_cost: r.final_month_cost,
        }
    }
}

/// Annual summary.
///
/// `totalSolarCredits` carries the summed on/off-peak energy credits (the
/// figure subtracted in `grandTotal`); the summed apportioned monthly solar
/// credits are `totalApportionedSolarCredits`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRecord {
    pub annual_consumption: f64,
    pub solar_generation: f64,
    pub battery_capacity: f64,
    pub amp_service: u32,
    pub total_service_charge: f64,
    pub total_on_peak_cost: f64,
    pub total_off_peak_cost: f64,
    pub total_demand_cost: f64,
    pub total_solar_credits: f64,
    pub total_apportioned_solar_credits: f64,
    pub total_final_month_cost: f64,
    pub grand_total: f64,
    pub grand_total_monthly: f64,
}

impl From<&AnnualSummary> for SummaryRecord {
    fn from(s: &AnnualSummary) -> Self {
        Self {
            annual_consumption: s.annual_consumption_kwh,
            solar_generation: s.solar_generation_kwh,
            battery_capacity: s.battery_capacity_kw,
            amp_service: s.amp_service,
            total_service_charge: s.total_service_charge,
            total_on_peak_cost: s.total_on_peak_cost,
            total_off_peak_cost: s.total_off_peak_cost,
            total_demand_cost: s.total_demand_cost,
            total_solar_credits: s.total_credits,
            total_apportioned_solar_credits: s.total_solar_credits,
            total_final_month_cost: s.total_final_month_cost,
            grand_total: s.grand_total,
            grand_total_monthly: s.grand_total_monthly,
        }
    }
}

impl From<&CalculationResult> for CalculateResponse {
    fn from(r: &CalculationResult) -> Self {
        Self {
            breakdown: r.breakdown.iter().map(MonthBreakdown::from).collect(),
            summary: SummaryRecord::from(&r.summary),
        }
    }
}

/// Error response body for failed calculations.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
    /// Error kind, e.g. `"OutOfRange"`.
    pub kind: String,
}
