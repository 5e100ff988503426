//! Shared test fixtures for integration tests.

use tou_bill::tariff::{CalculationResult, Calculator, Month, MonthTable, RateTables};

/// Tolerance for comparing summed currency figures.
pub const TOLERANCE: f64 = 1e-6;

/// Calculator bound to the reference tariff.
pub fn reference_calculator() -> Calculator {
    Calculator::new(RateTables::reference())
}

/// Reference customer: 20000 kWh, 15000 kWh solar, 10 kW battery, 200 A.
pub fn demo_result() -> CalculationResult {
    reference_calculator()
        .compute_from_annual_totals(20000.0, 15000.0, 10.0, 200)
        .expect("demo calculation should succeed")
}

/// Month table spreading `total` evenly over the year.
pub fn flat_months(total: f64) -> MonthTable<f64> {
    MonthTable::from_fn(|_| total / 12.0)
}

/// Month table with a summer-heavy consumption shape summing to `total`.
pub fn summer_heavy_months(total: f64) -> MonthTable<f64> {
    const SHAPE: [f64; 12] = [6.0, 5.0, 5.0, 5.5, 7.0, 10.0, 14.0, 14.0, 12.0, 9.0, 6.0, 6.5];
    let sum: f64 = SHAPE.iter().sum();
    MonthTable::from_fn(|m| {
        let idx = Month::ALL.iter().position(|&x| x == m).unwrap_or(0);
        total * SHAPE[idx] / sum
    })
}
