//! CSV import of per-month consumption and solar generation.
//!
//! Expected layout, one row per calendar month in any order:
//!
//! ```text
//! month,consumption_kwh,solar_kwh
//! January,1426,1096
//! ...
//! ```

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::config::MonthlyUsageConfig;
use crate::tariff::{Month, MonthTable, TariffError};

#[derive(Debug, Deserialize)]
struct MonthlyRow {
    month: String,
    consumption_kwh: f64,
    solar_kwh: f64,
}

/// Reads monthly figures from a CSV file.
///
/// # Errors
///
/// Returns `TariffError::InvalidInput` if the file cannot be opened or any
/// row is malformed (see [`read_monthly_csv`]).
pub fn load_monthly_csv(path: &Path) -> Result<MonthlyUsageConfig, TariffError> {
    let file = File::open(path).map_err(|e| {
        TariffError::InvalidInput(format!("cannot read \"{}\": {e}", path.display()))
    })?;
    read_monthly_csv(file)
}

/// Reads monthly figures from any CSV source.
///
/// Month names are matched case-insensitively. Totals are left unset so the
/// calculation uses the column sums.
///
/// # Errors
///
/// Returns `TariffError::InvalidInput` for unparseable rows, unknown month
/// names, or a month that is missing or repeated.
pub fn read_monthly_csv(reader: impl Read) -> Result<MonthlyUsageConfig, TariffError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut consumption = Vec::with_capacity(12);
    let mut solar = Vec::with_capacity(12);
    for (line, result) in rdr.deserialize::<MonthlyRow>().enumerate() {
        let row = result
            .map_err(|e| TariffError::InvalidInput(format!("monthly CSV row {}: {e}", line + 1)))?;
        let month: Month = row.month.parse()?;
        consumption.push((month, row.consumption_kwh));
        solar.push((month, row.solar_kwh));
    }

    Ok(MonthlyUsageConfig {
        consumption: MonthTable::from_entries(consumption)?,
        solar: MonthTable::from_entries(solar)?,
        total_consumption_kwh: None,
        total_solar_generation_kwh: None,
    })
}
