mod commands;
mod config;
mod fasta;

use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Transmembrane topology prediction with TMHMM models.
#[derive(Parser)]
#[command(
    name = "tmhmm",
    version,
    about = "Transmembrane topology prediction with TMHMM models"
)]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Path to a TOML config file (label names, default model)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG wins
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict the topology of every sequence in a FASTA file
    Decode {
        /// Path to the model file (defaults to `model` from the config file)
        #[arg(long)]
        model: Option<PathBuf>,
        /// Path to the FASTA file of sequences
        sequences: PathBuf,
    },

    /// Show the matrix form of a model
    Inspect {
        /// Path to the model file
        model: PathBuf,
    },
}

fn init_logging(verbose: u8, quiet: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let config = match config::load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(msg) => {
            report_error(&msg, cli.output, cli.quiet);
            process::exit(1);
        }
    };

    match cli.command {
        Commands::Decode { model, sequences } => {
            let Some(model) = model.or_else(|| config.model.clone()) else {
                report_error(
                    "no model given: pass --model or set `model` in the config file",
                    cli.output,
                    cli.quiet,
                );
                process::exit(1);
            };
            commands::decode::cmd_decode(&model, &sequences, &config, cli.output, cli.quiet);
        }
        Commands::Inspect { model } => {
            commands::inspect::cmd_inspect(&model, cli.output, cli.quiet);
        }
    }
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}

/// Report a core error; JSON mode prints its structured form.
pub(crate) fn report_model_error(e: &tmhmm_core::HmmError, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Json => {
            let err_json = serde_json::to_string_pretty(&e.to_json_value())
                .unwrap_or_else(|_| format!("{{\"error\": \"{:?}\"}}", e));
            eprintln!("{}", err_json);
        }
        OutputFormat::Text => eprintln!("error: {}", e),
    }
}
