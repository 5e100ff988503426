//! Bill calculator: the monthly allocator, the annual aggregator, and the two
//! input adapters that feed them.

use tracing::{debug, info};

use super::demand::DemandBasis;
use super::error::{TariffError, ensure_non_negative};
use super::pricing::price_demand;
use super::season::{Month, MonthTable};
use super::tables::{RateSchedule, RateTables};
use super::types::{AnnualSummary, CalculationResult, MonthRecord};

/// Consumption and solar generation for one month (kWh).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthUsage {
    pub consumption_kwh: f64,
    pub solar_kwh: f64,
}

/// Everything the annual aggregator needs for one calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct BillInput {
    /// Per-month figures handed to the allocator.
    pub usage: MonthTable<MonthUsage>,
    /// Annual consumption reported in the summary.
    pub annual_consumption_kwh: f64,
    /// Annual solar generation reported in the summary.
    pub solar_generation_kwh: f64,
    pub battery_capacity_kw: f64,
    pub amp_service: u32,
    pub demand: DemandBasis,
}

/// Tariff calculator bound to one immutable set of rate tables.
///
/// Holds no other state; one instance can serve any number of calculations,
/// including concurrently behind an `Arc`.
///
/// # Examples
///
/// ```
/// use tou_bill::tariff::{Calculator, RateTables};
///
/// let calc = Calculator::new(RateTables::reference());
/// let result = calc.compute_from_annual_totals(20000.0, 15000.0, 10.0, 200).unwrap();
/// assert_eq!(result.breakdown.len(), 12);
/// ```
#[derive(Debug, Clone)]
pub struct Calculator {
    tables: RateTables,
}

impl Calculator {
    /// Creates a calculator over `tables`.
    pub fn new(tables: RateTables) -> Self {
        Self { tables }
    }

    /// Returns the rate tables in use.
    pub fn tables(&self) -> &RateTables {
        &self.tables
    }

    /// Spreads annual totals over the months with the tables' monthly
    /// profiles and bills demand at the fixed per-season values.
    ///
    /// # Errors
    ///
    /// Returns `TariffError::InvalidInput` for negative or non-finite inputs.
    pub fn compute_from_annual_totals(
        &self,
        annual_consumption_kwh: f64,
        solar_generation_kwh: f64,
        battery_capacity_kw: f64,
        amp_service: u32,
    ) -> Result<CalculationResult, TariffError> {
        let annual = ensure_non_negative("annual consumption", annual_consumption_kwh)?;
        let solar = ensure_non_negative("solar generation", solar_generation_kwh)?;

        let usage = MonthTable::from_fn(|m| MonthUsage {
            consumption_kwh: annual * (self.tables.consumption_weights_pct.get(m) / 100.0),
            solar_kwh: solar * (self.tables.solar_share_pct.get(m) / 100.0),
        });

        self.compute_annual(&BillInput {
            usage,
            annual_consumption_kwh: annual,
            solar_generation_kwh: solar,
            battery_capacity_kw,
            amp_service,
            demand: DemandBasis::Fixed,
        })
    }

    /// Uses per-month figures directly and resolves demand from the matrix
    /// by `total_consumption_kwh` and battery size.
    ///
    /// # Errors
    ///
    /// * `InvalidInput` for an unsupported battery capacity or a negative or
    ///   non-finite figure.
    /// * `OutOfRange` when `total_consumption_kwh` exceeds every bracket.
    pub fn compute_from_monthly_detail(
        &self,
        battery_capacity_kw: f64,
        amp_service: u32,
        monthly_consumption: &MonthTable<f64>,
        monthly_solar_generation: &MonthTable<f64>,
        total_consumption_kwh: f64,
        total_solar_generation_kwh: f64,
    ) -> Result<CalculationResult, TariffError> {
        let total_consumption = ensure_non_negative("total consumption", total_consumption_kwh)?;
        let total_solar = ensure_non_negative("total solar generation", total_solar_generation_kwh)?;

        let usage = MonthTable::from_fn(|m| MonthUsage {
            consumption_kwh: *monthly_consumption.get(m),
            solar_kwh: *monthly_solar_generation.get(m),
        });

        self.compute_annual(&BillInput {
            usage,
            annual_consumption_kwh: total_consumption,
            solar_generation_kwh: total_solar,
            battery_capacity_kw,
            amp_service,
            demand: DemandBasis::Matrix {
                total_consumption_kwh: total_consumption,
                battery_capacity_kw,
            },
        })
    }

    /// Runs the allocator over all twelve months and totals the results.
    ///
    /// # Errors
    ///
    /// Fails with the first month's error; no partial result is returned.
    pub fn compute_annual(&self, input: &BillInput) -> Result<CalculationResult, TariffError> {
        let battery_capacity = ensure_non_negative("battery capacity", input.battery_capacity_kw)?;
        let battery_offset = self.tables.battery_monthly_offset(battery_capacity);

        let mut breakdown = Vec::with_capacity(12);
        let mut total_service = 0.0;
        let mut total_on_peak = 0.0;
        let mut total_off_peak = 0.0;
        let mut total_demand = 0.0;
        let mut total_credits = 0.0;
        let mut total_solar_credits = 0.0;
        let mut total_final = 0.0;

        for (month, usage) in input.usage.iter() {
            let record = self.allocate_month(
                month,
                usage.consumption_kwh,
                usage.solar_kwh,
                battery_offset,
                input.amp_service,
                &input.demand,
            )?;

            total_service += record.service_charge;
            total_on_peak += record.on_peak_cost;
            total_off_peak += record.off_peak_cost;
            total_demand += record.demand_charge;
            total_credits += record.on_peak_credit + record.off_peak_credit;
            total_solar_credits += record.solar_credits;
            total_final += record.final_month_cost;
            breakdown.push(record);
        }

        let grand_total =
            total_service + total_on_peak + total_off_peak + total_demand - total_credits;

        let summary = AnnualSummary {
            annual_consumption_kwh: input.annual_consumption_kwh,
            solar_generation_kwh: input.solar_generation_kwh,
            battery_capacity_kw: battery_capacity,
            amp_service: input.amp_service,
            demand_basis: input.demand,
            total_service_charge: total_service,
            total_on_peak_cost: total_on_peak,
            total_off_peak_cost: total_off_peak,
            total_demand_cost: total_demand,
            total_credits,
            total_solar_credits,
            total_final_month_cost: total_final,
            grand_total,
            grand_total_monthly: grand_total / 12.0,
        };

        info!(
            grand_total = summary.grand_total,
            annual_kwh = summary.annual_consumption_kwh,
            "bill calculated"
        );

        Ok(CalculationResult { breakdown, summary })
    }

    /// Bills one month.
    ///
    /// Consumption and solar are split into on-peak and off-peak shares.
    /// Solar and battery offset the on-peak side first, which is clamped at
    /// zero; the battery energy is then drawn back in off-peak as charging.
    ///
    /// # Errors
    ///
    /// * `InvalidInput` for negative or non-finite figures, or from demand
    ///   resolution.
    /// * `OutOfRange` from a matrix demand lookup.
    /// * `ArithmeticIndeterminate` if the month's cost is not finite.
    pub fn allocate_month(
        &self,
        month: Month,
        consumption_kwh: f64,
        solar_kwh: f64,
        battery_offset_kwh: f64,
        amp_service: u32,
        demand: &DemandBasis,
    ) -> Result<MonthRecord, TariffError> {
        let consumption = ensure_non_negative(&format!("{month} consumption"), consumption_kwh)?;
        let solar = ensure_non_negative(&format!("{month} solar generation"), solar_kwh)?;
        let battery_offset = ensure_non_negative("battery offset", battery_offset_kwh)?;

        let season = self.tables.season_of(month);
        let rates = *self.tables.rates.get(season);
        let split = *self.tables.peak_split.get(season);

        let on_peak_consumption = consumption * split.on_peak;
        let on_peak_solar = solar * self.tables.peak_solar_factors.get(month);
        let on_peak_net = (on_peak_consumption - on_peak_solar - battery_offset).max(0.0);
        // The clamp above keeps the on-peak credit at zero. Left as published.
        let (on_peak_cost, on_peak_credit) = bill_energy(on_peak_net, rates.on_peak);

        let off_peak_consumption = consumption * split.off_peak;
        let off_peak_solar = solar - on_peak_solar;
        let off_peak_net = off_peak_consumption - off_peak_solar + battery_offset;
        let (off_peak_cost, off_peak_credit) = bill_energy(off_peak_net, rates.off_peak);

        let demand_kw = demand.resolve(&self.tables, season)?;
        let demand_charge = price_demand(self.tables.demand_charges.get(season), demand_kw)?;
        let service_charge = self.tables.service_charge(amp_service);

        let solar_credits =
            apportion_solar_credit(month, consumption - solar, on_peak_net, off_peak_net, rates);

        let final_month_cost =
            service_charge + on_peak_cost + off_peak_cost + demand_charge - solar_credits;
        if !final_month_cost.is_finite() {
            return Err(TariffError::ArithmeticIndeterminate(format!(
                "{month} cost evaluated to {final_month_cost}"
            )));
        }

        debug!(
            %month,
            %season,
            on_peak_net,
            off_peak_net,
            demand_kw,
            final_month_cost,
            "month allocated"
        );

        Ok(MonthRecord {
            month,
            season,
            consumption_kwh: consumption,
            solar_kwh: solar,
            on_peak_consumption_kwh: on_peak_consumption,
            on_peak_solar_kwh: on_peak_solar,
            off_peak_consumption_kwh: off_peak_consumption,
            off_peak_solar_kwh: off_peak_solar,
            battery_offset_kwh: battery_offset,
            on_peak_net_kwh: on_peak_net,
            off_peak_net_kwh: off_peak_net,
            on_peak_rate: rates.on_peak,
            off_peak_rate: rates.off_peak,
            on_peak_cost,
            on_peak_credit,
            off_peak_cost,
            off_peak_credit,
            demand_kw,
            demand_charge,
            service_charge,
            solar_credits,
            final_month_cost,
        })
    }
}

/// Splits a net energy figure into `(cost, credit)` at `rate`.
fn bill_energy(net_kwh: f64, rate: f64) -> (f64, f64) {
    let cost = if net_kwh > 0.0 { net_kwh * rate } else { 0.0 };
    let credit = if net_kwh < 0.0 {
        net_kwh.abs() * rate
    } else {
        0.0
    };
    (cost, credit)
}

/// Values `net_kwh` (consumption less solar) at a blend of the on-peak and
/// off-peak rates, weighted by each side's share of the combined net draw.
///
/// Returns zero when the combined net draw is exactly zero.
fn apportion_solar_credit(
    month: Month,
    net_kwh: f64,
    on_peak_net: f64,
    off_peak_net: f64,
    rates: RateSchedule,
) -> f64 {
    let combined = on_peak_net + off_peak_net;
    if combined == 0.0 {
        debug!(%month, "zero combined net draw, solar credit set to 0");
        return 0.0;
    }
    net_kwh * (off_peak_net / combined) * rates.off_peak
        + net_kwh * (on_peak_net / combined) * rates.on_peak
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tariff::season::Season;

    fn calc() -> Calculator {
        Calculator::new(RateTables::reference())
    }

    fn allocate(month: Month, consumption: f64, solar: f64, battery: f64) -> MonthRecord {
        calc()
            .allocate_month(month, consumption, solar, battery, 200, &DemandBasis::Fixed)
            .unwrap_or_else(|e| panic!("allocation failed: {e}"))
    }

    #[test]
    fn no_solar_no_battery_bills_plain_split() {
        let consumption = 1000.0;
        let r = allocate(Month::January, consumption, 0.0, 0.0);
        assert_eq!(r.season, Season::Winter);
        assert_eq!(r.on_peak_cost, consumption * 0.25 * 0.0674);
        assert_eq!(r.off_peak_cost, consumption * 0.75 * 0.0634);
        assert_eq!(r.on_peak_credit, 0.0);
        assert_eq!(r.off_peak_credit, 0.0);
    }

    #[test]
    fn no_solar_no_battery_credit_cancels_energy_cost() {
        // With no offsets the blended credit equals the energy bill, leaving
        // service plus demand.
        let r = allocate(Month::July, 2500.0, 0.0, 0.0);
        assert!((r.final_month_cost - (r.service_charge + r.demand_charge)).abs() < 1e-9);
    }

    #[test]
    fn summer_uses_thirty_seventy_split() {
        let r = allocate(Month::June, 1000.0, 0.0, 0.0);
        assert_eq!(r.season, Season::Summer);
        assert!((r.on_peak_consumption_kwh - 300.0).abs() < 1e-9);
        assert!((r.off_peak_consumption_kwh - 700.0).abs() < 1e-9);
        assert_eq!(r.on_peak_rate, 0.0663);
        assert_eq!(r.off_peak_rate, 0.0561);
    }

    #[test]
    fn on_peak_net_is_clamped_and_credit_stays_zero() {
        // Battery far exceeds on-peak draw.
        let r = allocate(Month::August, 500.0, 2000.0, 220.0);
        assert_eq!(r.on_peak_net_kwh, 0.0);
        assert_eq!(r.on_peak_cost, 0.0);
        assert_eq!(r.on_peak_credit, 0.0);
    }

    #[test]
    fn surplus_solar_becomes_off_peak_credit() {
        let r = allocate(Month::May, 500.0, 3000.0, 0.0);
        let on_solar = 3000.0 * 0.3555;
        let expected_off_net = 500.0 * 0.70 - (3000.0 - on_solar);
        assert!((r.off_peak_net_kwh - expected_off_net).abs() < 1e-9);
        assert!(r.off_peak_net_kwh < 0.0);
        assert_eq!(r.off_peak_cost, 0.0);
        assert!((r.off_peak_credit - expected_off_net.abs() * 0.0561).abs() < 1e-9);
        // on-peak net clamps to zero, so the whole negative net is valued off-peak
        assert_eq!(r.on_peak_net_kwh, 0.0);
        assert!((r.solar_credits - (500.0 - 3000.0) * 0.0561).abs() < 1e-9);
        assert!((r.solar_credits + 140.25).abs() < 1e-9);
    }

    #[test]
    fn battery_offset_moves_to_off_peak() {
        let r = allocate(Month::March, 1000.0, 0.0, 100.0);
        assert!((r.on_peak_net_kwh - 150.0).abs() < 1e-9);
        assert!((r.off_peak_net_kwh - 850.0).abs() < 1e-9);
        assert_eq!(r.battery_offset_kwh, 100.0);
        let blended = 1000.0 * (0.85 * 0.0634 + 0.15 * 0.0674);
        assert!((r.solar_credits - blended).abs() < 1e-9);
        assert!((r.solar_credits - 64.0).abs() < 1e-9);
    }

    #[test]
    fn zero_combined_net_gives_zero_solar_credit() {
        let r = allocate(Month::February, 0.0, 0.0, 0.0);
        assert_eq!(r.solar_credits, 0.0);
        assert!(r.final_month_cost.is_finite());
    }

    #[test]
    fn service_charge_follows_amperage() {
        let c = calc();
        let high = c
            .allocate_month(Month::April, 100.0, 0.0, 0.0, 400, &DemandBasis::Fixed)
            .map(|r| r.service_charge);
        assert_eq!(high, Ok(45.44));
    }

    #[test]
    fn negative_consumption_rejected() {
        let err = calc().allocate_month(Month::April, -5.0, 0.0, 0.0, 200, &DemandBasis::Fixed);
        assert!(matches!(err, Err(TariffError::InvalidInput(_))));
    }

    #[test]
    fn fixed_demand_priced_by_season() {
        let r = allocate(Month::July, 1000.0, 0.0, 0.0);
        // 4 kW summer-peak: 3 * 9.43 + 1 * 17.51
        assert_eq!(r.demand_kw, 4.0);
        assert!((r.demand_charge - (3.0 * 9.43 + 17.51)).abs() < 1e-9);
    }

    #[test]
    fn matrix_demand_errors_propagate() {
        let c = calc();
        let basis = DemandBasis::Matrix {
            total_consumption_kwh: 10000.0,
            battery_capacity_kw: 12.0,
        };
        let err = c.allocate_month(Month::June, 800.0, 0.0, 0.0, 200, &basis);
        assert!(matches!(err, Err(TariffError::InvalidInput(_))));
    }

    #[test]
    fn non_finite_cost_is_indeterminate() {
        let mut tables = RateTables::reference();
        tables.rates.winter.on_peak = f64::INFINITY;
        let c = Calculator::new(tables);
        let err = c.allocate_month(Month::January, 100.0, 0.0, 0.0, 200, &DemandBasis::Fixed);
        assert!(matches!(err, Err(TariffError::ArithmeticIndeterminate(_))));
    }

    #[test]
    fn annual_totals_match_breakdown() {
        let result = calc().compute_from_annual_totals(20000.0, 15000.0, 10.0, 200);
        let Ok(result) = result else {
            panic!("calculation failed: {result:?}");
        };
        let sum = |f: fn(&MonthRecord) -> f64| result.breakdown.iter().map(f).sum::<f64>();
        let s = &result.summary;
        assert!((s.total_service_charge - sum(|r| r.service_charge)).abs() < 1e-6);
        assert!((s.total_on_peak_cost - sum(|r| r.on_peak_cost)).abs() < 1e-6);
        assert!((s.total_off_peak_cost - sum(|r| r.off_peak_cost)).abs() < 1e-6);
        assert!((s.total_demand_cost - sum(|r| r.demand_charge)).abs() < 1e-6);
        assert!((s.total_credits - sum(|r| r.on_peak_credit + r.off_peak_credit)).abs() < 1e-6);
        assert!((s.total_solar_credits - sum(|r| r.solar_credits)).abs() < 1e-6);
        assert!((s.total_final_month_cost - sum(|r| r.final_month_cost)).abs() < 1e-6);
    }

    #[test]
    fn annual_mode_spreads_by_weights() {
        let result = calc().compute_from_annual_totals(10000.0, 5000.0, 0.0, 200);
        let july = result.as_ref().map(|r| r.breakdown[6].clone());
        let july = july.unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(july.month, Month::July);
        assert!((july.consumption_kwh - 1413.0).abs() < 1e-9);
        assert!((july.solar_kwh - 755.5).abs() < 1e-9);
        assert_eq!(july.demand_kw, 4.0);
    }

    #[test]
    fn monthly_mode_uses_matrix_demand() {
        let consumption = MonthTable::from_fn(|_| 1000.0);
        let solar = MonthTable::from_fn(|_| 0.0);
        let result =
            calc().compute_from_monthly_detail(10.0, 200, &consumption, &solar, 12000.0, 0.0);
        let Ok(result) = result else {
            panic!("calculation failed: {result:?}");
        };
        // 12000 kWh falls in the 15000 bracket, 10 kW column.
        assert_eq!(result.breakdown[0].demand_kw, 1.7);
        assert_eq!(result.breakdown[5].demand_kw, 3.0);
        assert_eq!(result.breakdown[6].demand_kw, 3.9);
        assert_eq!(result.summary.annual_consumption_kwh, 12000.0);
    }
}
