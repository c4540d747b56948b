use clap::{Parser, Subcommand};
use om_simulator_core_rs::replicate::replicate_seed;
use om_simulator_core_rs::{compute_config_hash, run_replicate_tabular, Scenario};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "om-sim")]
#[command(about = "Offshore O&M event generation and maintenance scheduling")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run replicates of a scenario and print their summaries as JSON
    Run {
        /// Scenario file (JSON)
        scenario: PathBuf,
        /// Number of replicates
        #[arg(short = 'n', long = "replicates", default_value_t = 1)]
        replicates: u64,
        /// Base seed (defaults to the scenario's rng_seed)
        #[arg(short = 's', long = "seed")]
        seed: Option<u64>,
        /// Pretty-print the JSON output
        #[arg(short = 'p', long = "pretty")]
        pretty: bool,
        /// Write the JSON output to a file instead of stdout
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
    },

    /// Parse and validate a scenario, printing its configuration hash
    Validate {
        /// Scenario file (JSON)
        scenario: PathBuf,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn,om_simulator_core_rs=info".into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_scenario(path: &Path) -> Result<Scenario, String> {
    let text = fs::read_to_string(path).map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    Scenario::from_json(&text).map_err(|e| format!("invalid scenario {}: {}", path.display(), e))
}

fn run(
    scenario: &Path,
    replicates: u64,
    seed: Option<u64>,
    pretty: bool,
    output: Option<&Path>,
) -> Result<bool, String> {
    let scenario = load_scenario(scenario)?;
    let base_seed = seed.unwrap_or(scenario.config.rng_seed);
    let config_hash = compute_config_hash(&scenario.config).map_err(|e| e.to_string())?;

    let mut summaries = Vec::new();
    let mut aborted = Vec::new();
    for index in 0..replicates {
        let seed = replicate_seed(base_seed, index);
        match run_replicate_tabular(&scenario, seed) {
            Ok(result) => summaries.push(result.summary),
            Err(err) => {
                warn!(index, seed, error = %err, "replicate aborted");
                aborted.push(json!({
                    "index": index,
                    "seed": seed,
                    "error": err.to_string(),
                    "no_solutions_found": err.is_no_solutions_found(),
                }));
            }
        }
    }
    info!(completed = summaries.len(), aborted = aborted.len(), "all replicates processed");

    let report = json!({
        "config_hash": config_hash,
        "base_seed": base_seed,
        "replicates": summaries,
        "aborted": aborted,
    });
    let text = if pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    }
    .map_err(|e| e.to_string())?;

    match output {
        Some(path) => fs::write(path, text).map_err(|e| format!("cannot write {}: {}", path.display(), e))?,
        None => println!("{}", text),
    }
    Ok(!summaries.is_empty() || replicates == 0)
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            scenario,
            replicates,
            seed,
            pretty,
            output,
        } => run(&scenario, replicates, seed, pretty, output.as_deref()),
        Commands::Validate { scenario } => load_scenario(&scenario).and_then(|s| {
            let hash = compute_config_hash(&s.config).map_err(|e| e.to_string())?;
            println!("{}", hash);
            Ok(true)
        }),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            error!("every replicate aborted");
            ExitCode::FAILURE
        }
        Err(message) => {
            error!("{}", message);
            ExitCode::FAILURE
        }
    }
}
