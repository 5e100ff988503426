//! CSV export for the monthly bill breakdown.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::tariff::MonthRecord;

/// Column header for the breakdown CSV.
const HEADER: &str = "month,season,consumption_kwh,solar_kwh,\
                      on_peak_net_kwh,off_peak_net_kwh,on_peak_cost,off_peak_cost,\
                      demand_charge,service_charge,solar_credits,final_month_cost";

/// Exports the monthly breakdown to a CSV file at the given path.
///
/// Writes a header row followed by one data row per month. Produces
/// deterministic output for identical inputs.
///
/// # Arguments
///
/// * `breakdown` - Month records in calendar order
/// * `path` - Output file path
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(breakdown: &[MonthRecord], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(breakdown, buf)
}

/// Writes the monthly breakdown as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(breakdown: &[MonthRecord], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(',').map(str::trim))?;

    for r in breakdown {
        wtr.write_record(&[
            r.month.name().to_string(),
            r.season.name().to_string(),
            format!("{:.2}", r.consumption_kwh),
            format!("{:.2}", r.solar_kwh),
            format!("{:.2}", r.on_peak_net_kwh),
            format!("{:.2}", r.off_peak_net_kwh),
            format!("{:.4}", r.on_peak_cost),
            format!("{:.4}", r.off_peak_cost),
            format!("{:.4}", r.demand_charge),
            format!("{:.4}", r.service_charge),
            format!("{:.4}", r.solar_credits),
            format!("{:.4}", r.final_month_cost),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
