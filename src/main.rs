//! tou-bill entry point: CLI wiring and config-driven bill calculation.

mod cli;

use std::path::Path;
use std::process;

use tou_bill::config::ScenarioConfig;
use tou_bill::io::export::export_csv;
use tou_bill::io::monthly::load_monthly_csv;
use tou_bill::tariff::Calculator;
use tou_bill::telemetry::init_tracing;

use cli::{CliArgs, parse_args_from, print_help};

#[cfg(feature = "api")]
const DEFAULT_PORT: u16 = 3000;

/// Loads the scenario and applies every override flag.
fn build_scenario(cli: &CliArgs) -> Result<ScenarioConfig, String> {
    // --scenario takes priority, then --preset, then the demo default
    let mut scenario = if let Some(ref path) = cli.scenario {
        ScenarioConfig::from_toml_file(path).map_err(|e| e.to_string())?
    } else if let Some(ref name) = cli.preset {
        ScenarioConfig::from_preset(name).map_err(|e| e.to_string())?
    } else {
        ScenarioConfig::demo()
    };

    let customer = &mut scenario.customer;
    if let Some(v) = cli.annual_consumption {
        customer.annual_consumption_kwh = v;
    }
    if let Some(v) = cli.solar_generation {
        customer.solar_generation_kwh = v;
    }
    if let Some(v) = cli.battery_capacity {
        customer.battery_capacity_kw = v;
    }
    if let Some(v) = cli.amp_service {
        customer.amp_service = v;
    }
    if let Some(ref path) = cli.monthly_csv {
        customer.monthly = Some(load_monthly_csv(path).map_err(|e| e.to_string())?);
    }
    if let Some(ref path) = cli.tariff {
        scenario
            .load_tariff_file(path)
            .map_err(|e| e.to_string())?;
    }

    Ok(scenario)
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = match parse_args_from(&args) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("error: {e}");
            print_help();
            process::exit(1);
        }
    };
    if cli.help {
        print_help();
        process::exit(0);
    }

    init_tracing("info");

    let scenario = match build_scenario(&cli) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    // Validate
    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    let calculator = Calculator::new(scenario.tariff.clone());

    // Start API server if requested
    #[cfg(feature = "api")]
    if cli.serve {
        use std::net::SocketAddr;
        use std::sync::Arc;

        let state = Arc::new(tou_bill::api::AppState { calculator });
        let addr = SocketAddr::from(([0, 0, 0, 0], cli.port.unwrap_or(DEFAULT_PORT)));
        let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
            eprintln!("error: failed to create tokio runtime: {e}");
            process::exit(1);
        });
        if let Err(e) = rt.block_on(tou_bill::api::serve(state, addr)) {
            eprintln!("error: API server failed: {e}");
            process::exit(1);
        }
        return;
    }

    let result = match scenario.customer.calculate(&calculator) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    if cli.json {
        match serde_json::to_string_pretty(&result) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("error: failed to serialize result: {e}");
                process::exit(1);
            }
        }
    } else {
        for r in &result.breakdown {
            println!("{r}");
        }
        println!("\n{}", result.summary);
    }

    // Export CSV if requested
    if let Some(ref path) = cli.csv_out {
        if let Err(e) = export_csv(&result.breakdown, Path::new(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Breakdown written to {}", path.display());
    }
}
