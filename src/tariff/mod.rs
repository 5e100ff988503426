//! Time-of-use tariff calculation engine.
//!
//! Leaf-to-root: [`tables`] holds the reference data, [`season`] classifies
//! months, [`demand`] resolves billed kW, [`pricing`] applies the tiered
//! demand schedule, and [`engine`] allocates each month and aggregates the
//! year.

/// Demand resolution (fixed or matrix lookup).
pub mod demand;
pub mod engine;
pub mod error;
/// Tiered demand-charge pricing.
pub mod pricing;
/// Months, seasons, and per-month / per-season tables.
pub mod season;
pub mod tables;
pub mod types;

pub use demand::DemandBasis;
pub use engine::{BillInput, Calculator, MonthUsage};
pub use error::TariffError;
pub use season::{Month, MonthTable, Season, SeasonTable};
pub use tables::RateTables;
pub use types::{AnnualSummary, CalculationResult, MonthRecord};
