//! Command-line argument parsing for the `tou-bill` binary.

use std::path::PathBuf;

/// Parsed CLI arguments.
#[derive(Debug, Default)]
pub struct CliArgs {
    pub scenario: Option<PathBuf>,
    pub preset: Option<String>,
    pub annual_consumption: Option<f64>,
    pub solar_generation: Option<f64>,
    pub battery_capacity: Option<f64>,
    pub amp_service: Option<u32>,
    pub monthly_csv: Option<PathBuf>,
    pub tariff: Option<PathBuf>,
    pub csv_out: Option<PathBuf>,
    pub json: bool,
    pub help: bool,
    #[cfg(feature = "api")]
    pub serve: bool,
    #[cfg(feature = "api")]
    pub port: Option<u16>,
}

pub fn print_help() {
    eprintln!("tou-bill: time-of-use electricity bill estimator");
    eprintln!();
    eprintln!("Usage: tou-bill [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>             Load scenario from TOML config file");
    eprintln!("  --preset <name>               Use a built-in preset (demo, no_solar, large_service)");
    eprintln!("  --annual-consumption <kWh>    Override annual consumption");
    eprintln!("  --solar-generation <kWh>      Override annual solar generation");
    eprintln!("  --battery-capacity <kW>       Override battery capacity");
    eprintln!("  --amp-service <A>             Override service size");
    eprintln!("  --monthly <path>              Bill from per-month figures in a CSV file");
    eprintln!("  --tariff <path>               Load rate tables from a TOML file");
    eprintln!("  --csv-out <path>              Export the monthly breakdown to CSV");
    eprintln!("  --json                        Print the result as JSON");
    #[cfg(feature = "api")]
    {
        eprintln!("  --serve                       Start REST API server instead of printing a bill");
        eprintln!("  --port <u16>                  API server port (default: 3000)");
    }
    eprintln!("  --help                        Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the demo preset is used.");
}

/// Parses arguments (without the program name).
///
/// # Errors
///
/// Returns a message for a missing or malformed value, an unknown flag, a
/// repeated flag, or both `--scenario` and `--preset`.
pub fn parse_args_from(args: &[String]) -> Result<CliArgs, String> {
    let mut cli = CliArgs::default();

    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--help" | "-h" => cli.help = true,
            "--scenario" => set_once(&mut cli.scenario, flag, value(args, &mut i, flag)?.into())?,
            "--preset" => set_once(&mut cli.preset, flag, value(args, &mut i, flag)?.to_string())?,
            "--annual-consumption" => {
                set_once(&mut cli.annual_consumption, flag, number(args, &mut i, flag)?)?;
            }
            "--solar-generation" => {
                set_once(&mut cli.solar_generation, flag, number(args, &mut i, flag)?)?;
            }
            "--battery-capacity" => {
                set_once(&mut cli.battery_capacity, flag, number(args, &mut i, flag)?)?;
            }
            "--amp-service" => {
                set_once(&mut cli.amp_service, flag, number(args, &mut i, flag)?)?;
            }
            "--monthly" => {
                set_once(&mut cli.monthly_csv, flag, value(args, &mut i, flag)?.into())?;
            }
            "--tariff" => set_once(&mut cli.tariff, flag, value(args, &mut i, flag)?.into())?,
            "--csv-out" => set_once(&mut cli.csv_out, flag, value(args, &mut i, flag)?.into())?,
            "--json" => cli.json = true,
            #[cfg(feature = "api")]
            "--serve" => cli.serve = true,
            #[cfg(feature = "api")]
            "--port" => set_once(&mut cli.port, flag, number(args, &mut i, flag)?)?,
            other => return Err(format!("unknown argument \"{other}\"")),
        }
        i += 1;
    }

    if cli.scenario.is_some() && cli.preset.is_some() {
        return Err("--scenario and --preset are mutually exclusive".to_string());
    }

    Ok(cli)
}

fn value<'a>(args: &'a [String], i: &mut usize, flag: &str) -> Result<&'a str, String> {
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| format!("{flag} requires a value"))
}

fn number<T: std::str::FromStr>(args: &[String], i: &mut usize, flag: &str) -> Result<T, String> {
    let raw = value(args, i, flag)?;
    raw.parse()
        .map_err(|_| format!("{flag} value \"{raw}\" is not a valid number"))
}

fn set_once<T>(slot: &mut Option<T>, flag: &str, v: T) -> Result<(), String> {
    if slot.replace(v).is_some() {
        return Err(format!("{flag} provided more than once"));
    }
    Ok(())
}
