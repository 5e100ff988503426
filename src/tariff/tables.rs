//! Tariff reference data: rates, demand tiers, service charges, and the
//! monthly profiles used to spread annual figures.
//!
//! [`RateTables::reference`] carries the published residential time-of-use
//! rates, splits and profiles, plus a placeholder demand matrix. Alternate
//! tables can be loaded from TOML through the scenario config; a loaded value
//! is never mutated.

use serde::{Deserialize, Serialize};

use super::season::{Month, MonthTable, Season, SeasonTable, season_of};

/// On-peak and off-peak energy rates for one season (currency per kWh).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RateSchedule {
    pub on_peak: f64,
    pub off_peak: f64,
}

/// Share of a month's consumption falling in the on-peak and off-peak windows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PeakSplit {
    /// Fraction billed on-peak (0.0 to 1.0).
    pub on_peak: f64,
    /// Fraction billed off-peak (0.0 to 1.0).
    pub off_peak: f64,
}

/// A bounded demand tier: the next `block_kw` of demand is billed at `rate`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DemandTier {
    /// Width of the tier in kW.
    pub block_kw: f64,
    /// Currency per kW.
    pub rate: f64,
}

/// Progressive demand-charge schedule for one season.
///
/// Bounded tiers are consumed in order; whatever demand remains after the
/// last bounded tier is billed at `above_rate`, so the top tier is unbounded
/// by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DemandSchedule {
    pub tiers: Vec<DemandTier>,
    pub above_rate: f64,
}

/// One demand-matrix row: resolved demand per battery-capacity column for
/// customers whose annual consumption is at most `yearly`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DemandRow {
    /// Annual consumption ceiling of this bracket (kWh).
    pub yearly: f64,
    /// Demand (kW), one entry per `DemandMatrix::battery_capacities_kw` column.
    pub demand_kw: Vec<f64>,
}

/// Demand lookup keyed by season, annual consumption bracket and battery size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DemandMatrix {
    /// Supported battery capacities (kW); also the column order of each row.
    pub battery_capacities_kw: Vec<u32>,
    /// Rows per season, ascending by `yearly`.
    pub rows: SeasonTable<Vec<DemandRow>>,
}

/// Monthly service charge by electrical service size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceCharges {
    /// Amperage above which the high-tier fee applies.
    pub threshold_amps: u32,
    /// Fee for services up to and including `threshold_amps`.
    pub standard: f64,
    /// Fee for services above `threshold_amps`.
    pub high_tier: f64,
}

/// Complete set of tariff reference data consumed by the calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RateTables {
    /// Months belonging to each season.
    pub seasons: SeasonTable<Vec<Month>>,
    pub rates: SeasonTable<RateSchedule>,
    pub peak_split: SeasonTable<PeakSplit>,
    pub demand_charges: SeasonTable<DemandSchedule>,
    /// Billed demand when no per-customer matrix lookup is made (kW).
    pub fixed_demand_kw: SeasonTable<f64>,
    pub demand_matrix: DemandMatrix,
    pub service: ServiceCharges,
    /// Fraction of each month's solar output that lands in on-peak hours.
    pub peak_solar_factors: MonthTable<f64>,
    /// Percentage of annual consumption falling in each month.
    pub consumption_weights_pct: MonthTable<f64>,
    /// Percentage of annual solar generation assigned to each month. The
    /// reference shares total 129.02%.
    pub solar_share_pct: MonthTable<f64>,
    /// Days per month the battery cycles; monthly offset = capacity * days.
    pub battery_days_per_month: f64,
}

impl Default for RateTables {
    fn default() -> Self {
        Self::reference()
    }
}

impl RateTables {
    /// The published reference tariff.
    pub fn reference() -> Self {
        use Month::*;

        Self {
            seasons: SeasonTable {
                winter: vec![January, February, March, April, November, December],
                summer: vec![May, June, September, October],
                summer_peak: vec![July, August],
            },
            rates: SeasonTable {
                // 5am-9am & 5pm-9pm
                winter: RateSchedule {
                    on_peak: 0.0674,
                    off_peak: 0.0634,
                },
                // 2pm-8pm
                summer: RateSchedule {
                    on_peak: 0.0663,
                    off_peak: 0.0561,
                },
                // 2pm-8pm
                summer_peak: RateSchedule {
                    on_peak: 0.0823,
                    off_peak: 0.0613,
                },
            },
            peak_split: SeasonTable {
                winter: PeakSplit {
                    on_peak: 0.25,
                    off_peak: 0.75,
                },
                summer: PeakSplit {
                    on_peak: 0.30,
                    off_peak: 0.70,
                },
                summer_peak: PeakSplit {
                    on_peak: 0.30,
                    off_peak: 0.70,
                },
            },
            demand_charges: SeasonTable {
                winter: three_tier(3.49, 5.58, 9.57),
                summer: three_tier(7.89, 14.37, 27.28),
                summer_peak: three_tier(9.43, 17.51, 33.59),
            },
            fixed_demand_kw: SeasonTable {
                winter: 1.0,
                summer: 3.0,
                summer_peak: 4.0,
            },
            demand_matrix: reference_demand_matrix(),
            service: ServiceCharges {
                threshold_amps: 200,
                standard: 32.44,
                high_tier: 45.44,
            },
            peak_solar_factors: month_values([
                0.0443, 0.0679, 0.0988, 0.1315, 0.3555, 0.3636, 0.3654, 0.3609, 0.3311, 0.2982,
                0.0656, 0.0511,
            ]),
            consumption_weights_pct: month_values([
                7.13, 6.19, 5.35, 5.48, 7.15, 10.09, 14.13, 14.17, 11.62, 8.43, 4.74, 5.52,
            ]),
            solar_share_pct: month_values([
                7.31, 10.90, 12.23, 13.22, 13.67, 15.23, 15.11, 14.15, 10.80, 6.93, 5.01, 4.46,
            ]),
            battery_days_per_month: 22.0,
        }
    }

    /// Season containing `month`.
    pub fn season_of(&self, month: Month) -> Season {
        season_of(&self.seasons, month)
    }

    /// Monthly service fee for a service of `amp_service` amps.
    pub fn service_charge(&self, amp_service: u32) -> f64 {
        if amp_service > self.service.threshold_amps {
            self.service.high_tier
        } else {
            self.service.standard
        }
    }

    /// Energy the battery shifts per month for a battery of `capacity_kw`.
    pub fn battery_monthly_offset(&self, capacity_kw: f64) -> f64 {
        capacity_kw * self.battery_days_per_month
    }
}

/// 3 kW, then 10 kW, then everything above.
fn three_tier(first: f64, second: f64, above: f64) -> DemandSchedule {
    DemandSchedule {
        tiers: vec![
            DemandTier {
                block_kw: 3.0,
                rate: first,
            },
            DemandTier {
                block_kw: 10.0,
                rate: second,
            },
        ],
        above_rate: above,
    }
}

fn month_values(v: [f64; 12]) -> MonthTable<f64> {
    MonthTable::from_fn(|m| v[m as usize])
}

fn rows(table: &[(f64, [f64; 9])]) -> Vec<DemandRow> {
    table
        .iter()
        .map(|(yearly, demand)| DemandRow {
            yearly: *yearly,
            demand_kw: demand.to_vec(),
        })
        .collect()
}

/// Placeholder demand matrix.
///
/// Columns and bracket ceilings follow the published tariff, but it lists no
/// cell values. These rise with consumption and fall with battery size;
/// supply real figures through `[tariff.demand_matrix]`.
#[rustfmt::skip]
fn reference_demand_matrix() -> DemandMatrix {
    DemandMatrix {
        battery_capacities_kw: vec![5, 10, 15, 20, 25, 30, 35, 40, 45],
        rows: SeasonTable {
            winter: rows(&[
                (6000.0,  [0.7, 0.7, 0.6, 0.6, 0.6, 0.5, 0.5, 0.5, 0.5]),
                (10000.0, [1.1, 1.1, 1.1, 1.0, 0.9, 0.9, 0.8, 0.8, 0.8]),
                (15000.0, [1.7, 1.7, 1.6, 1.5, 1.4, 1.4, 1.3, 1.2, 1.1]),
                (20000.0, [2.3, 2.2, 2.1, 2.0, 1.9, 1.8, 1.7, 1.6, 1.5]),
                (25000.0, [2.9, 2.8, 2.6, 2.5, 2.4, 2.2, 2.1, 2.0, 1.9]),
                (30000.0, [3.5, 3.3, 3.1, 3.0, 2.9, 2.7, 2.5, 2.4, 2.2]),
                (40000.0, [4.6, 4.4, 4.2, 4.0, 3.8, 3.6, 3.4, 3.2, 3.0]),
                (51000.0, [5.9, 5.6, 5.4, 5.1, 4.8, 4.6, 4.3, 4.1, 3.8]),
            ]),
            summer: rows(&[
                (6000.0,  [1.3, 1.2, 1.2, 1.1, 1.0, 1.0, 0.9, 0.9, 0.8]),
                (10000.0, [2.1, 2.0, 1.9, 1.8, 1.7, 1.7, 1.6, 1.5, 1.4]),
                (15000.0, [3.2, 3.0, 2.9, 2.8, 2.6, 2.5, 2.3, 2.2, 2.1]),
                (20000.0, [4.2, 4.0, 3.9, 3.7, 3.5, 3.3, 3.1, 2.9, 2.8]),
                (25000.0, [5.3, 5.0, 4.8, 4.6, 4.4, 4.1, 3.9, 3.7, 3.4]),
                (30000.0, [6.3, 6.0, 5.8, 5.5, 5.2, 5.0, 4.7, 4.4, 4.1]),
                (40000.0, [8.4, 8.1, 7.7, 7.3, 7.0, 6.6, 6.2, 5.9, 5.5]),
                (51000.0, [10.8, 10.3, 9.8, 9.4, 8.9, 8.4, 7.9, 7.5, 7.0]),
            ]),
            summer_peak: rows(&[
                (6000.0,  [1.6, 1.5, 1.5, 1.4, 1.3, 1.3, 1.2, 1.1, 1.1]),
                (10000.0, [2.7, 2.6, 2.5, 2.3, 2.2, 2.1, 2.0, 1.9, 1.8]),
                (15000.0, [4.0, 3.9, 3.7, 3.5, 3.3, 3.2, 3.0, 2.8, 2.6]),
                (20000.0, [5.4, 5.1, 4.9, 4.7, 4.4, 4.2, 4.0, 3.7, 3.5]),
                (25000.0, [6.7, 6.4, 6.1, 5.8, 5.5, 5.3, 5.0, 4.7, 4.4]),
                (30000.0, [8.1, 7.7, 7.4, 7.0, 6.7, 6.3, 6.0, 5.6, 5.2]),
                (40000.0, [10.7, 10.3, 9.8, 9.3, 8.9, 8.4, 7.9, 7.5, 7.0]),
                (51000.0, [13.7, 13.1, 12.5, 11.9, 11.3, 10.7, 10.1, 9.5, 8.9]),
            ]),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_month_in_exactly_one_season() {
        let tables = RateTables::reference();
        let mut seen: Vec<Month> = tables
            .seasons
            .iter()
            .flat_map(|(_, months)| months.iter().copied())
            .collect();
        assert_eq!(seen.len(), 12);
        seen.sort();
        seen.dedup();
        assert_eq!(seen, Month::ALL.to_vec());
    }

    #[test]
    fn reference_seasons() {
        let tables = RateTables::reference();
        assert_eq!(tables.season_of(Month::January), Season::Winter);
        assert_eq!(tables.season_of(Month::November), Season::Winter);
        assert_eq!(tables.season_of(Month::May), Season::Summer);
        assert_eq!(tables.season_of(Month::October), Season::Summer);
        assert_eq!(tables.season_of(Month::July), Season::SummerPeak);
        assert_eq!(tables.season_of(Month::August), Season::SummerPeak);
    }

    #[test]
    fn monthly_profile_totals() {
        let tables = RateTables::reference();
        assert!((tables.consumption_weights_pct.total() - 100.0).abs() < 1e-9);
        // published solar shares overshoot the annual figure
        assert!((tables.solar_share_pct.total() - 129.02).abs() < 1e-9);
    }

    #[test]
    fn service_charge_threshold_is_exclusive() {
        let tables = RateTables::reference();
        assert_eq!(tables.service_charge(100), 32.44);
        assert_eq!(tables.service_charge(200), 32.44);
        assert_eq!(tables.service_charge(201), 45.44);
        assert_eq!(tables.service_charge(400), 45.44);
    }

    #[test]
    fn battery_offset_uses_cycling_days() {
        let tables = RateTables::reference();
        assert_eq!(tables.battery_monthly_offset(10.0), 220.0);
        assert_eq!(tables.battery_monthly_offset(0.0), 0.0);
    }

    #[test]
    fn matrix_rows_have_one_value_per_capacity() {
        let matrix = RateTables::reference().demand_matrix;
        let width = matrix.battery_capacities_kw.len();
        for (_, rows) in matrix.rows.iter() {
            assert_eq!(rows.last().map(|r| r.yearly), Some(51000.0));
            assert!(rows.iter().all(|r| r.demand_kw.len() == width));
        }
    }
}
