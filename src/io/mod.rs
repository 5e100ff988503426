//! CSV import and export.

/// CSV export of the monthly breakdown.
pub mod export;
/// CSV import of monthly consumption and solar figures.
pub mod monthly;
