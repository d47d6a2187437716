use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use sharkfin_runner::{RunConfig, run};

const USAGE: &str = "\
sharkfin: attention-driven market simulation

USAGE:
    sharkfin [--config <PATH>] [--report]

OPTIONS:
    -c, --config <PATH>   Run configuration as JSON (defaults apply when omitted)
    -r, --report          Print the full run report, not just the summary statistics
    -h, --help            Show this message

RUST_LOG sets the log filter (default: info).
";

struct Options {
    config: Option<String>,
    full_report: bool,
}

/// `Ok(None)` means help was requested.
fn parse_options(mut args: impl Iterator<Item = String>) -> Result<Option<Options>, String> {
    let mut options = Options {
        config: None,
        full_report: false,
    };
    while let Some(flag) = args.next() {
        match flag.as_str() {
            "-h" | "--help" => return Ok(None),
            "-r" | "--report" => options.full_report = true,
            "-c" | "--config" => {
                let path = args.next().ok_or("--config needs a path")?;
                options.config = Some(path);
            }
            other => return Err(format!("unrecognised argument `{other}`")),
        }
    }
    Ok(Some(options))
}

fn simulate(options: Options) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &options.config {
        Some(path) => {
            tracing::info!("Reading run configuration from {}", path);
            RunConfig::from_file(path)?
        }
        None => RunConfig::default(),
    };
    tracing::info!(
        "Simulating {} quarter(s) of {} run(s) with {} expectations",
        config.simulation.quarters,
        config.simulation.runs_per_quarter,
        config.expectations.name()
    );

    let report = run(&config)?;
    let stats = report.stats();
    if let Some(failure) = &stats.failure {
        tracing::warn!("Market stopped early with {:?}: {}", stats.status, failure);
    }

    let rendered = if options.full_report {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string_pretty(stats)?
    };
    println!("{rendered}");
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    match parse_options(std::env::args().skip(1)) {
        Ok(None) => {
            print!("{USAGE}");
            ExitCode::SUCCESS
        }
        Ok(Some(options)) => match simulate(options) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                tracing::error!("Simulation failed: {}", err);
                ExitCode::FAILURE
            }
        },
        Err(problem) => {
            eprintln!("error: {problem}\n\n{USAGE}");
            ExitCode::from(2)
        }
    }
}
