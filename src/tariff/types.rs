//! Calculation output: per-month line items and the annual summary.

use std::fmt;

use serde::Serialize;

use super::demand::DemandBasis;
use super::season::{Month, Season};

/// Complete bill breakdown for one calendar month.
///
/// Energy figures are kWh, rates are currency per kWh, everything else is
/// currency unless noted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthRecord {
    pub month: Month,
    pub season: Season,
    /// Grid consumption before any offset.
    pub consumption_kwh: f64,
    /// Solar generation.
    pub solar_kwh: f64,
    pub on_peak_consumption_kwh: f64,
    pub on_peak_solar_kwh: f64,
    pub off_peak_consumption_kwh: f64,
    pub off_peak_solar_kwh: f64,
    /// Energy shifted by the battery this month.
    pub battery_offset_kwh: f64,
    /// On-peak draw after solar and battery; never negative.
    pub on_peak_net_kwh: f64,
    /// Off-peak draw after solar, plus battery charging; negative means export.
    pub off_peak_net_kwh: f64,
    pub on_peak_rate: f64,
    pub off_peak_rate: f64,
    pub on_peak_cost: f64,
    /// Always zero: `on_peak_net_kwh` is clamped before the credit check.
    pub on_peak_credit: f64,
    pub off_peak_cost: f64,
    pub off_peak_credit: f64,
    /// Demand billed for the month (kW).
    pub demand_kw: f64,
    pub demand_charge: f64,
    pub service_charge: f64,
    /// Blended solar credit valuation; may be negative.
    pub solar_credits: f64,
    pub final_month_cost: f64,
}

/// Annual totals over the twelve month records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnualSummary {
    pub annual_consumption_kwh: f64,
    pub solar_generation_kwh: f64,
    pub battery_capacity_kw: f64,
    pub amp_service: u32,
    pub demand_basis: DemandBasis,
    pub total_service_charge: f64,
    pub total_on_peak_cost: f64,
    pub total_off_peak_cost: f64,
    pub total_demand_cost: f64,
    /// Sum of on-peak and off-peak energy credits.
    pub total_credits: f64,
    pub total_solar_credits: f64,
    pub total_final_month_cost: f64,
    /// Service + on-peak + off-peak + demand, less `total_credits`.
    pub grand_total: f64,
    /// `grand_total / 12`.
    pub grand_total_monthly: f64,
}

/// Result of one bill calculation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculationResult {
    /// One record per month, January first.
    pub breakdown: Vec<MonthRecord>,
    pub summary: AnnualSummary,
}

impl fmt::Display for MonthRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<9} {:<11} | use={:>8.1} kWh  solar={:>8.1} kWh | \
             on={:>7.1} kWh ${:>7.2}  off={:>8.1} kWh ${:>7.2} | \
             demand={:.1} kW ${:>6.2}  svc=${:.2}  credit=${:>7.2} | total=${:>8.2}",
            self.month.name(),
            self.season.name(),
            self.consumption_kwh,
            self.solar_kwh,
            self.on_peak_net_kwh,
            self.on_peak_cost,
            self.off_peak_net_kwh,
            self.off_peak_cost,
            self.demand_kw,
            self.demand_charge,
            self.service_charge,
            self.solar_credits,
            self.final_month_cost,
        )
    }
}

impl fmt::Display for AnnualSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Annual Summary ---")?;
        writeln!(
            f,
            "Consumption:           {:.1} kWh",
            self.annual_consumption_kwh
        )?;
        writeln!(f, "Solar generation:      {:.1} kWh", self.solar_generation_kwh)?;
        writeln!(
            f,
            "Battery / service:     {} kW / {} A",
            self.battery_capacity_kw, self.amp_service
        )?;
        writeln!(f, "Service charges:       ${:.2}", self.total_service_charge)?;
        writeln!(f, "On-peak energy:        ${:.2}", self.total_on_peak_cost)?;
        writeln!(f, "Off-peak energy:       ${:.2}", self.total_off_peak_cost)?;
        writeln!(f, "Demand charges:        ${:.2}", self.total_demand_cost)?;
        writeln!(f, "Energy credits:        ${:.2}", self.total_credits)?;
        writeln!(f, "Solar credits:         ${:.2}", self.total_solar_credits)?;
        writeln!(f, "Grand total:           ${:.2}", self.grand_total)?;
        write!(f, "Monthly average:       ${:.2}", self.grand_total_monthly)
    }
}
