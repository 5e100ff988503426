//! Time-of-use electricity bill estimator.
//!
//! Splits a customer's consumption and solar generation into months and
//! on/off-peak periods, applies seasonal rates, tiered demand charges and a
//! fixed service charge, and rolls the result up into an annual summary.

/// REST API over the calculator (feature `api`).
#[cfg(feature = "api")]
pub mod api;
pub mod config;
pub mod io;
pub mod tariff;
pub mod telemetry;
