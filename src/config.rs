//! TOML-based scenario configuration and preset definitions.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tariff::{CalculationResult, Calculator, Month, MonthTable, RateTables, TariffError};

/// Top-level scenario: who is being billed and under which tariff.
///
/// Both sections default, so an empty file is the `demo` customer on the
/// reference tariff. Load from TOML with [`ScenarioConfig::from_toml_file`]
/// or pick a built-in with [`ScenarioConfig::from_preset`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Customer consumption, solar, battery and service size.
    #[serde(default)]
    pub customer: CustomerConfig,
    /// Tariff tables; any table left out keeps its reference value.
    #[serde(default)]
    pub tariff: RateTables,
}

/// Customer inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CustomerConfig {
    /// Annual grid consumption (kWh).
    pub annual_consumption_kwh: f64,
    /// Annual solar generation (kWh).
    pub solar_generation_kwh: f64,
    /// Battery capacity (kW). Monthly-detail mode only accepts matrix columns.
    pub battery_capacity_kw: f64,
    /// Electrical service size (amps).
    pub amp_service: u32,
    /// Per-month figures. When present, the calculation switches to
    /// monthly-detail mode and the annual figures above are ignored.
    pub monthly: Option<MonthlyUsageConfig>,
}

impl Default for CustomerConfig {
    fn default() -> Self {
        Self {
            annual_consumption_kwh: 20000.0,
            solar_generation_kwh: 15000.0,
            battery_capacity_kw: 10.0,
            amp_service: 200,
            monthly: None,
        }
    }
}

/// Monthly consumption and solar tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MonthlyUsageConfig {
    pub consumption: MonthTable<f64>,
    pub solar: MonthTable<f64>,
    /// Overrides the sum of `consumption` for the demand bracket lookup.
    #[serde(default)]
    pub total_consumption_kwh: Option<f64>,
    /// Overrides the sum of `solar` in the summary.
    #[serde(default)]
    pub total_solar_generation_kwh: Option<f64>,
}

impl CustomerConfig {
    /// Runs the calculation this customer describes.
    ///
    /// # Errors
    ///
    /// Propagates any `TariffError` from the calculator.
    pub fn calculate(&self, calculator: &Calculator) -> Result<CalculationResult, TariffError> {
        match &self.monthly {
            Some(m) => calculator.compute_from_monthly_detail(
                self.battery_capacity_kw,
                self.amp_service,
                &m.consumption,
                &m.solar,
                m.total_consumption_kwh.unwrap_or_else(|| m.consumption.total()),
                m.total_solar_generation_kwh.unwrap_or_else(|| m.solar.total()),
            ),
            None => calculator.compute_from_annual_totals(
                self.annual_consumption_kwh,
                self.solar_generation_kwh,
                self.battery_capacity_kw,
                self.amp_service,
            ),
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"customer.amp_service"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl ScenarioConfig {
    /// The demo customer: 20 MWh/yr, 15 MWh solar, 10 kW battery, 200 A.
    pub fn demo() -> Self {
        Self::default()
    }

    /// Grid-only customer with no solar and no battery.
    pub fn no_solar() -> Self {
        Self {
            customer: CustomerConfig {
                annual_consumption_kwh: 12000.0,
                solar_generation_kwh: 0.0,
                battery_capacity_kw: 0.0,
                ..CustomerConfig::default()
            },
            tariff: RateTables::reference(),
        }
    }

    /// Large home on a 400 A service with a big array and battery.
    pub fn large_service() -> Self {
        Self {
            customer: CustomerConfig {
                annual_consumption_kwh: 45000.0,
                solar_generation_kwh: 30000.0,
                battery_capacity_kw: 20.0,
                amp_service: 400,
                monthly: None,
            },
            tariff: RateTables::reference(),
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["demo", "no_solar", "large_service"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "demo" => Ok(Self::demo()),
            "no_solar" => Ok(Self::no_solar()),
            "large_service" => Ok(Self::large_service()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Replaces the tariff with one read from a standalone TOML file.
    ///
    /// The file holds the `[tariff]` tables at top level; omitted tables keep
    /// their reference values.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or parsed.
    pub fn load_tariff_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("tariff", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        self.tariff =
            toml::from_str(&content).map_err(|e| ConfigError::new("tariff", e.to_string()))?;
        Ok(())
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let c = &self.customer;

        non_negative(&mut errors, "customer.annual_consumption_kwh", c.annual_consumption_kwh);
        non_negative(&mut errors, "customer.solar_generation_kwh", c.solar_generation_kwh);
        non_negative(&mut errors, "customer.battery_capacity_kw", c.battery_capacity_kw);
        if c.amp_service == 0 {
            errors.push(ConfigError::new("customer.amp_service", "must be > 0"));
        }

        if let Some(m) = &c.monthly {
            for (month, v) in m.consumption.iter() {
                non_negative(&mut errors, &format!("customer.monthly.consumption.{month}"), *v);
            }
            for (month, v) in m.solar.iter() {
                non_negative(&mut errors, &format!("customer.monthly.solar.{month}"), *v);
            }
            if let Some(total) = m.total_consumption_kwh {
                non_negative(&mut errors, "customer.monthly.total_consumption_kwh", total);
            }
            if let Some(total) = m.total_solar_generation_kwh {
                non_negative(&mut errors, "customer.monthly.total_solar_generation_kwh", total);
            }
            let capacity = c.battery_capacity_kw;
            let supported = &self.tariff.demand_matrix.battery_capacities_kw;
            if !supported.iter().any(|&s| f64::from(s) == capacity) {
                errors.push(ConfigError::new(
                    "customer.battery_capacity_kw",
                    format!("monthly mode requires one of {supported:?}, got {capacity}"),
                ));
            }
        }

        errors.extend(validate_tables(&self.tariff));
        errors
    }
}

/// Checks the structural invariants of a set of rate tables.
///
/// Returns an empty vector if the tables are usable.
pub fn validate_tables(t: &RateTables) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    for month in Month::ALL {
        let owners: Vec<&str> = t
            .seasons
            .iter()
            .filter(|(_, months)| months.contains(&month))
            .map(|(season, _)| season.name())
            .collect();
        match owners.len() {
            1 => {}
            0 => errors.push(ConfigError::new(
                "tariff.seasons",
                format!("{month} is not assigned to any season"),
            )),
            _ => errors.push(ConfigError::new(
                "tariff.seasons",
                format!("{month} is assigned to {}", owners.join(" and ")),
            )),
        }
    }

    for (season, r) in t.rates.iter() {
        non_negative(&mut errors, &format!("tariff.rates.{season}.on_peak"), r.on_peak);
        non_negative(&mut errors, &format!("tariff.rates.{season}.off_peak"), r.off_peak);
    }

    for (season, split) in t.peak_split.iter() {
        for (name, v) in [("on_peak", split.on_peak), ("off_peak", split.off_peak)] {
            if !(0.0..=1.0).contains(&v) {
                errors.push(ConfigError::new(
                    format!("tariff.peak_split.{season}.{name}"),
                    "must be in [0.0, 1.0]",
                ));
            }
        }
    }

    for (season, schedule) in t.demand_charges.iter() {
        let field = format!("tariff.demand_charges.{season}");
        for (i, tier) in schedule.tiers.iter().enumerate() {
            if !(tier.block_kw.is_finite() && tier.block_kw > 0.0) {
                errors.push(ConfigError::new(
                    format!("{field}.tiers[{i}].block_kw"),
                    "must be a finite number > 0",
                ));
            }
            non_negative(&mut errors, &format!("{field}.tiers[{i}].rate"), tier.rate);
        }
        non_negative(&mut errors, &format!("{field}.above_rate"), schedule.above_rate);
    }

    for (season, kw) in t.fixed_demand_kw.iter() {
        non_negative(&mut errors, &format!("tariff.fixed_demand_kw.{season}"), *kw);
    }

    let matrix = &t.demand_matrix;
    let width = matrix.battery_capacities_kw.len();
    if width == 0 {
        errors.push(ConfigError::new(
            "tariff.demand_matrix.battery_capacities_kw",
            "must not be empty",
        ));
    } else if !matrix.battery_capacities_kw.windows(2).all(|w| w[0] < w[1]) {
        errors.push(ConfigError::new(
            "tariff.demand_matrix.battery_capacities_kw",
            "must be strictly ascending",
        ));
    }
    for (season, rows) in matrix.rows.iter() {
        let field = format!("tariff.demand_matrix.rows.{season}");
        if rows.is_empty() {
            errors.push(ConfigError::new(field.clone(), "must have at least one row"));
        }
        if !rows.windows(2).all(|w| w[0].yearly < w[1].yearly) {
            errors.push(ConfigError::new(
                field.clone(),
                "rows must be strictly ascending by yearly",
            ));
        }
        for (i, row) in rows.iter().enumerate() {
            non_negative(&mut errors, &format!("{field}[{i}].yearly"), row.yearly);
            if row.demand_kw.len() != width {
                errors.push(ConfigError::new(
                    format!("{field}[{i}].demand_kw"),
                    format!("expected {width} values, got {}", row.demand_kw.len()),
                ));
            }
            for (j, kw) in row.demand_kw.iter().enumerate() {
                non_negative(&mut errors, &format!("{field}[{i}].demand_kw[{j}]"), *kw);
            }
        }
    }

    for (month, f) in t.peak_solar_factors.iter() {
        if !(0.0..=1.0).contains(f) {
            errors.push(ConfigError::new(
                format!("tariff.peak_solar_factors.{month}"),
                "must be in [0.0, 1.0]",
            ));
        }
    }
    for (name, table) in [
        ("consumption_weights_pct", &t.consumption_weights_pct),
        ("solar_share_pct", &t.solar_share_pct),
    ] {
        for (month, v) in table.iter() {
            non_negative(&mut errors, &format!("tariff.{name}.{month}"), *v);
        }
    }

    non_negative(&mut errors, "tariff.battery_days_per_month", t.battery_days_per_month);
    errors
}

fn non_negative(errors: &mut Vec<ConfigError>, field: &str, value: f64) {
    if !(value.is_finite() && value >= 0.0) {
        errors.push(ConfigError::new(field, "must be a finite number >= 0"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tariff::tables::DemandTier;

    #[test]
    fn demo_preset_valid() {
        let cfg = ScenarioConfig::demo();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "demo should be valid: {errors:?}");
    }

    #[test]
    fn from_preset_unknown() {
        let err = ScenarioConfig::from_preset("nonexistent");
        assert!(err.is_err());
        let e = err.unwrap_err();
        assert!(e.message.contains("unknown preset"));
    }

    #[test]
    fn all_presets_are_valid() {
        for name in ScenarioConfig::PRESETS {
            let cfg = ScenarioConfig::from_preset(name);
            assert!(cfg.is_ok(), "preset \"{name}\" should load");
            let errors = cfg.as_ref().map(|c| c.validate()).unwrap_or_default();
            assert!(
                errors.is_empty(),
                "preset \"{name}\" should be valid: {errors:?}"
            );
        }
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let toml = r#"
[customer]
annual_consumption_kwh = 9000.0
"#;
        let cfg = ScenarioConfig::from_toml_str(toml);
        assert!(cfg.is_ok(), "partial TOML should parse: {:?}", cfg.err());
        let cfg = cfg.ok();
        assert_eq!(cfg.as_ref().map(|c| c.customer.annual_consumption_kwh), Some(9000.0));
        assert_eq!(cfg.as_ref().map(|c| c.customer.amp_service), Some(200));
        assert_eq!(cfg.as_ref().map(|c| c.tariff.clone()), Some(RateTables::reference()));
    }

    #[test]
    fn tariff_table_override() {
        let toml = r#"
[tariff.service]
threshold_amps = 100
standard = 20.0
high_tier = 30.0

[tariff.fixed_demand_kw]
WINTER = 2.0
SUMMER = 2.0
SUMMER_PEAK = 2.0
"#;
        let cfg = ScenarioConfig::from_toml_str(toml);
        assert!(cfg.is_ok(), "override should parse: {:?}", cfg.err());
        let cfg = cfg.ok();
        assert_eq!(cfg.as_ref().map(|c| c.tariff.service_charge(150)), Some(30.0));
        assert_eq!(cfg.as_ref().map(|c| c.tariff.fixed_demand_kw.summer), Some(2.0));
        // untouched tables keep reference values
        assert_eq!(cfg.as_ref().map(|c| c.tariff.rates.winter.on_peak), Some(0.0674));
    }

    #[test]
    fn monthly_section_parses() {
        let toml = r#"
[customer]
battery_capacity_kw = 15.0

[customer.monthly.consumption]
January = 900.0
February = 800.0
March = 700.0
April = 700.0
May = 900.0
June = 1300.0
July = 1800.0
August = 1800.0
September = 1500.0
October = 1100.0
November = 600.0
December = 700.0

[customer.monthly.solar]
January = 300.0
February = 450.0
March = 500.0
April = 550.0
May = 570.0
June = 630.0
July = 620.0
August = 590.0
September = 450.0
October = 290.0
November = 210.0
December = 190.0
"#;
        let cfg = ScenarioConfig::from_toml_str(toml);
        assert!(cfg.is_ok(), "monthly TOML should parse: {:?}", cfg.err());
        let cfg = cfg.ok();
        let monthly = cfg.as_ref().and_then(|c| c.customer.monthly.clone());
        assert_eq!(monthly.as_ref().map(|m| m.consumption.total()), Some(12800.0));
        assert!(cfg.map(|c| c.validate().is_empty()).unwrap_or(false));
    }

    #[test]
    fn missing_month_in_monthly_section_rejected() {
        let toml = r#"
[customer.monthly.consumption]
January = 900.0

[customer.monthly.solar]
January = 300.0
"#;
        assert!(ScenarioConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[customer]
amp_service = 200
bogus_field = true
"#;
        assert!(ScenarioConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn validation_catches_negative_consumption() {
        let mut cfg = ScenarioConfig::demo();
        cfg.customer.annual_consumption_kwh = -1.0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "customer.annual_consumption_kwh"));
    }

    #[test]
    fn validation_catches_unsupported_battery_in_monthly_mode() {
        let mut cfg = ScenarioConfig::demo();
        cfg.customer.battery_capacity_kw = 12.0;
        cfg.customer.monthly = Some(MonthlyUsageConfig {
            consumption: MonthTable::from_fn(|_| 1000.0),
            solar: MonthTable::from_fn(|_| 0.0),
            total_consumption_kwh: None,
            total_solar_generation_kwh: None,
        });
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "customer.battery_capacity_kw"));
    }

    #[test]
    fn validation_catches_overlapping_seasons() {
        let mut cfg = ScenarioConfig::demo();
        cfg.tariff.seasons.summer.push(Month::January);
        let errors = cfg.validate();
        assert!(errors
            .iter()
            .any(|e| e.field == "tariff.seasons" && e.message.contains("January")));
    }

    #[test]
    fn validation_catches_empty_tier_block() {
        let mut cfg = ScenarioConfig::demo();
        cfg.tariff.demand_charges.summer.tiers = vec![
            DemandTier {
                block_kw: 10.0,
                rate: 1.0,
            },
            DemandTier {
                block_kw: 0.0,
                rate: 2.0,
            },
        ];
        let errors = cfg.validate();
        assert!(errors
            .iter()
            .any(|e| e.field == "tariff.demand_charges.SUMMER.tiers[1].block_kw"));
    }

    #[test]
    fn validation_accepts_narrowing_tier_widths() {
        let mut cfg = ScenarioConfig::demo();
        cfg.tariff.demand_charges.summer.tiers = vec![
            DemandTier {
                block_kw: 10.0,
                rate: 1.0,
            },
            DemandTier {
                block_kw: 3.0,
                rate: 2.0,
            },
        ];
        let errors = cfg.validate();
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    }

    #[test]
    fn validation_catches_ragged_matrix_row() {
        let mut cfg = ScenarioConfig::demo();
        cfg.tariff.demand_matrix.rows.winter[2].demand_kw.pop();
        let errors = cfg.validate();
        assert!(errors
            .iter()
            .any(|e| e.field == "tariff.demand_matrix.rows.WINTER[2].demand_kw"));
    }

    #[test]
    fn validation_catches_bad_matrix_values() {
        let mut cfg = ScenarioConfig::demo();
        cfg.tariff.demand_matrix.rows.summer[1].demand_kw[3] = -0.5;
        cfg.tariff.demand_matrix.rows.winter[0].yearly = f64::NAN;
        let errors = cfg.validate();
        assert!(errors
            .iter()
            .any(|e| e.field == "tariff.demand_matrix.rows.SUMMER[1].demand_kw[3]"));
        assert!(errors
            .iter()
            .any(|e| e.field == "tariff.demand_matrix.rows.WINTER[0].yearly"));
    }

    #[test]
    fn tariff_file_replaces_tables() {
        let path = std::env::temp_dir()
            .join(format!("tou-bill-tariff-{}.toml", std::process::id()));
        let written = fs::write(&path, "battery_days_per_month = 30.0\n");
        assert!(written.is_ok());

        let mut cfg = ScenarioConfig::demo();
        let loaded = cfg.load_tariff_file(&path);
        let _ = fs::remove_file(&path);

        assert!(loaded.is_ok(), "tariff file should load: {loaded:?}");
        assert_eq!(cfg.tariff.battery_monthly_offset(10.0), 300.0);
        assert_eq!(cfg.tariff.rates, RateTables::reference().rates);
    }

    #[test]
    fn presets_calculate() {
        for name in ScenarioConfig::PRESETS {
            let cfg = ScenarioConfig::from_preset(name).unwrap_or_default();
            let calc = Calculator::new(cfg.tariff.clone());
            let result = cfg.customer.calculate(&calc);
            assert!(result.is_ok(), "preset \"{name}\" failed: {:?}", result.err());
        }
    }
}
