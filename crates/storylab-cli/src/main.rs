use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use storylab_ingest::Experiment;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "storylab", version = "0.1.0", about = "Experiment log ingestion CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load an experiment log and persist the parsed record tree.
    Load {
        /// Experiment's log file.
        log: PathBuf,
        /// Directory holding the per-sample detail documents.
        dir: PathBuf,
        /// Output JSON file.
        out: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Parse an experiment log and print a summary without persisting.
    Describe {
        /// Experiment's log file.
        log: PathBuf,
        /// Directory holding the per-sample detail documents.
        dir: PathBuf,
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let json_mode = command_json_mode(&cli.command);
    match run_command(cli.command) {
        Ok(Some(payload)) => {
            emit_json(&payload);
            Ok(())
        }
        Ok(None) => Ok(()),
        Err(err) => {
            if json_mode {
                emit_json(&json_error("command_failed", err.to_string(), json!({})));
                std::process::exit(1);
            }
            Err(err)
        }
    }
}

fn run_command(command: Commands) -> Result<Option<Value>> {
    match command {
        Commands::Load { log, dir, out, json } => {
            let experiments = storylab_ingest::load_experiments(&log, &dir)?;
            fs::write(&out, serde_json::to_vec_pretty(&experiments)?)?;
            tracing::info!(
                experiments = experiments.len(),
                out = %out.display(),
                "record tree persisted"
            );
            if json {
                return Ok(Some(json!({
                    "ok": true,
                    "command": "load",
                    "experiments": experiments.len(),
                    "out": out.display().to_string()
                })));
            }
            println!("experiments: {}", experiments.len());
            println!("out: {}", out.display());
        }
        Commands::Describe { log, dir, json } => {
            let experiments = storylab_ingest::load_experiments(&log, &dir)?;
            if json {
                return Ok(Some(json!({
                    "ok": true,
                    "command": "describe",
                    "experiments": experiments
                        .iter()
                        .map(experiment_to_json)
                        .collect::<Vec<_>>()
                })));
            }
            for (index, experiment) in experiments.iter().enumerate() {
                if index > 0 {
                    println!();
                }
                print_experiment(experiment);
            }
        }
    }
    Ok(None)
}

fn sample_count(experiment: &Experiment) -> usize {
    experiment
        .instances
        .iter()
        .map(|instance| instance.samples.len())
        .sum()
}

fn experiment_to_json(experiment: &Experiment) -> Value {
    json!({
        "story": experiment.story.to_string(),
        "sentence": experiment.sentence,
        "character": experiment.character,
        "instances": experiment.instances.len(),
        "samples": sample_count(experiment)
    })
}

fn print_experiment(experiment: &Experiment) {
    println!("story: {}", experiment.story);
    println!("sentence: {}", experiment.sentence);
    println!("character: {}", experiment.character);
    println!("instances: {}", experiment.instances.len());
    println!("samples: {}", sample_count(experiment));
}

fn emit_json(value: &Value) {
    match serde_json::to_string(value) {
        Ok(s) => println!("{}", s),
        Err(_) => println!(
            "{{\"ok\":false,\"error\":{{\"code\":\"serialization_error\",\"message\":\"failed to serialize JSON payload\",\"details\":{{}}}}}}"
        ),
    }
}

fn json_error(code: &str, message: String, details: Value) -> Value {
    json!({
        "ok": false,
        "error": {
            "code": code,
            "message": message,
            "details": details
        }
    })
}

fn command_json_mode(command: &Commands) -> bool {
    match command {
        Commands::Load { json, .. } | Commands::Describe { json, .. } => *json,
    }
}
