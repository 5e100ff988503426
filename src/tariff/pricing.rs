//! Progressive (tiered) demand-charge pricing.

use super::error::{TariffError, ensure_non_negative};
use super::tables::DemandSchedule;

/// Prices `demand_kw` against a tiered schedule.
///
/// Each slice of demand is billed at the rate of the tier it falls into:
/// the first `tiers[0].block_kw` at `tiers[0].rate`, the next
/// `tiers[1].block_kw` at `tiers[1].rate`, and so on, with anything left
/// after the last bounded tier billed at `above_rate`.
///
/// # Errors
///
/// Returns `TariffError::InvalidInput` if `demand_kw` is negative or not finite.
///
/// # Examples
///
/// ```
/// use tou_bill::tariff::pricing::price_demand;
/// use tou_bill::tariff::tables::RateTables;
///
/// let tables = RateTables::reference();
/// let charge = price_demand(&tables.demand_charges.winter, 5.0).unwrap();
/// assert!((charge - (3.0 * 3.49 + 2.0 * 5.58)).abs() < 1e-9);
/// ```
pub fn price_demand(schedule: &DemandSchedule, demand_kw: f64) -> Result<f64, TariffError> {
    let mut remaining = ensure_non_negative("demand_kw", demand_kw)?;
    let mut charge = 0.0;

    for tier in &schedule.tiers {
        if remaining <= tier.block_kw {
            return Ok(charge + remaining * tier.rate);
        }
        charge += tier.block_kw * tier.rate;
        remaining -= tier.block_kw;
    }

    Ok(charge + remaining * schedule.above_rate)
}
