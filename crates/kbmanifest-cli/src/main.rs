//! kbmanifest CLI - render KubeBlocks custom resources into manifests

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod display;
mod error;
mod exit_codes;

use commands::Context;
use error::Result;

/// Environment variable selecting the log format (`text` or `json`)
const LOG_FORMAT_ENV: &str = "KBMANIFEST_LOG_FORMAT";

#[derive(Parser)]
#[command(name = "kbmanifest")]
#[command(author = "kbmanifest Contributors")]
#[command(version)]
#[command(
    about = "Render KubeBlocks custom resources into Kubernetes manifests",
    long_about = None
)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,

    /// Tool configuration file (default: ~/.config/kbmanifest/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Extra directory of kind tables (repeatable)
    #[arg(long = "schema-dir", global = true)]
    schema_dirs: Vec<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List available data sources
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the attributes of a data source
    Schema {
        /// Data source name, Kind or group/version/Kind
        data_source: String,

        /// Print the JSON Schema used for validation
        #[arg(long)]
        json_schema: bool,
    },

    /// Validate a configuration
    Validate {
        /// Data source name, Kind or group/version/Kind
        data_source: String,

        /// Configuration file(s) to merge (YAML or JSON)
        #[arg(short = 'f', long = "values")]
        values: Vec<PathBuf>,

        /// Set attributes on command line (key=value)
        #[arg(long = "set")]
        set: Vec<String>,

        /// Output validation results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render a configuration to a manifest
    Render {
        /// Data source name, Kind or group/version/Kind
        data_source: String,

        /// Configuration file(s) to merge (YAML or JSON)
        #[arg(short = 'f', long = "values")]
        values: Vec<PathBuf>,

        /// Set attributes on command line (key=value)
        #[arg(long = "set")]
        set: Vec<String>,

        /// Write the manifest to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the full data source state (configuration plus yaml) as JSON
        #[arg(long)]
        state: bool,
    },
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    let log_format = std::env::var(LOG_FORMAT_ENV).unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let ctx = Context::load(cli.config.as_deref(), &cli.schema_dirs)?;

    match cli.command {
        Commands::List { json } => commands::list::run(&ctx, json),

        Commands::Schema {
            data_source,
            json_schema,
        } => commands::schema::run(&ctx, &data_source, json_schema),

        Commands::Validate {
            data_source,
            values,
            set,
            json,
        } => commands::validate::run(&ctx, &data_source, &values, &set, json),

        Commands::Render {
            data_source,
            values,
            set,
            output,
            state,
        } => commands::render::run(&ctx, &data_source, &values, &set, output.as_deref(), state),
    }
}

fn main() {
    // Setup miette for nice error display
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_tracing(cli.debug);

    let code = match run(cli) {
        Ok(()) => exit_codes::SUCCESS,
        Err(err) => {
            let code = err.exit_code();
            eprintln!("{:?}", miette::Report::new(err));
            code
        }
    };

    std::process::exit(code);
}
