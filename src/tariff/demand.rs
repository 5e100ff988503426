//! Resolution of the billed peak demand (kW) for a month.

use serde::Serialize;

use super::error::{TariffError, ensure_non_negative};
use super::season::Season;
use super::tables::{DemandMatrix, RateTables};

/// How billed demand is determined for a calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DemandBasis {
    /// Constant per-season demand, used when only annual totals are known.
    Fixed,
    /// Matrix lookup by annual consumption bracket and battery size.
    Matrix {
        total_consumption_kwh: f64,
        battery_capacity_kw: f64,
    },
}

impl DemandBasis {
    /// Resolves the demand to bill for `season`.
    ///
    /// # Errors
    ///
    /// Propagates the errors of [`lookup_demand_kw`] in matrix mode.
    pub fn resolve(&self, tables: &RateTables, season: Season) -> Result<f64, TariffError> {
        match *self {
            DemandBasis::Fixed => Ok(fixed_demand_kw(tables, season)),
            DemandBasis::Matrix {
                total_consumption_kwh,
                battery_capacity_kw,
            } => lookup_demand_kw(
                &tables.demand_matrix,
                season,
                total_consumption_kwh,
                battery_capacity_kw,
            ),
        }
    }
}

/// Constant demand for `season`.
pub fn fixed_demand_kw(tables: &RateTables, season: Season) -> f64 {
    *tables.fixed_demand_kw.get(season)
}

/// Looks up demand in the matrix.
///
/// Picks the first row for `season` (rows ascend by `yearly`) whose ceiling
/// is at least `total_consumption_kwh`, then the column for
/// `battery_capacity_kw`.
///
/// # Errors
///
/// * `InvalidInput` if the battery capacity is not a matrix column, the
///   season has no rows, or the consumption is negative or not finite.
/// * `OutOfRange` if the consumption exceeds the largest bracket.
pub fn lookup_demand_kw(
    matrix: &DemandMatrix,
    season: Season,
    total_consumption_kwh: f64,
    battery_capacity_kw: f64,
) -> Result<f64, TariffError> {
    let column = matrix
        .battery_capacities_kw
        .iter()
        .position(|&c| f64::from(c) == battery_capacity_kw)
        .ok_or_else(|| {
            let allowed: Vec<String> = matrix
                .battery_capacities_kw
                .iter()
                .map(u32::to_string)
                .collect();
            TariffError::InvalidInput(format!(
                "battery capacity {battery_capacity_kw} kW is not supported, expected one of: {}",
                allowed.join(", ")
            ))
        })?;

    let rows = matrix.rows.get(season);
    if rows.is_empty() {
        return Err(TariffError::InvalidInput(format!(
            "no demand matrix rows for season {season}"
        )));
    }

    let total = ensure_non_negative("total consumption", total_consumption_kwh)?;
    let row = rows.iter().find(|r| r.yearly >= total).ok_or_else(|| {
        let ceiling = rows.last().map_or(0.0, |r| r.yearly);
        TariffError::OutOfRange(format!(
            "annual consumption {total} kWh exceeds the largest {season} bracket ({ceiling} kWh)"
        ))
    })?;

    row.demand_kw.get(column).copied().ok_or_else(|| {
        TariffError::InvalidInput(format!(
            "{season} bracket {} kWh has no value for {battery_capacity_kw} kW",
            row.yearly
        ))
    })
}
