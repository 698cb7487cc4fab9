//! nix-builder CLI
//!
//! Evaluates a deployment configuration with `nix-build` and prints the
//! resulting store path.
//!
//! ## Commands
//!
//! - `eval`: evaluate a deployment file, optionally with argument overrides
//! - `check`: verify that nix-build and the bundled entry point are present

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use nix_builder::{
    is_nix_available, parse_arg_pair, Args, BuilderConfig, Evaluator, JsonDeployment,
};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "nix-builder")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Evaluate deployment configurations with nix-build", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Directory containing the bundled default.nix
    #[arg(long, global = true, env = "NIX_BUILDER_WORKDIR")]
    workdir: Option<PathBuf>,

    /// nix-build executable
    #[arg(long = "nix-build", global = true, env = "NIX_BUILDER_PROGRAM")]
    program: Option<PathBuf>,

    /// Seconds to wait for nix-build, 0 waits forever (default from NIX_BUILDER_TIMEOUT)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Pass --show-trace to nix-build
    #[arg(long, global = true)]
    show_trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a deployment and print the resulting store path
    Eval {
        /// Deployment configuration file
        file: PathBuf,

        /// JSON file holding the deployment's stored arguments
        #[arg(long)]
        args_file: Option<PathBuf>,

        /// Override an argument for this evaluation (KEY=VALUE, VALUE may be JSON)
        #[arg(long = "arg", value_name = "KEY=VALUE")]
        overrides: Vec<String>,

        /// Print the loaded spec after the store path
        #[arg(long)]
        print_spec: bool,
    },

    /// Check that nix-build and the entry point are available
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    nix_builder::init_tracing(cli.json, level);

    let config = build_config(
        cli.workdir,
        cli.program,
        cli.timeout,
        cli.show_trace,
    );

    match cli.command {
        Commands::Eval {
            file,
            args_file,
            overrides,
            print_spec,
        } => cmd_eval(config, &file, args_file.as_deref(), &overrides, print_spec).await,
        Commands::Check => cmd_check(&config),
    }
}

/// Environment first, then explicit flags on top
fn build_config(
    workdir: Option<PathBuf>,
    program: Option<PathBuf>,
    timeout: Option<u64>,
    show_trace: bool,
) -> BuilderConfig {
    let mut config = BuilderConfig::from_env();
    if let Some(workdir) = workdir {
        config.workdir = workdir;
    }
    if let Some(program) = program {
        config.program = program;
    }
    if let Some(secs) = timeout {
        config.timeout_secs = secs;
    }
    if show_trace {
        config = config.with_extra_arg("--show-trace");
    }
    config
}

/// Read stored arguments from a JSON object file
fn read_args_file(path: &Path) -> Result<Args> {
    let content = std::fs::read_to_string(path)
        .context(format!("Failed to read args file: {:?}", path))?;
    match serde_json::from_str(&content).context(format!("Invalid JSON in {:?}", path))? {
        Value::Object(map) => Ok(map),
        _ => bail!("Args file {:?} must contain a JSON object", path),
    }
}

fn parse_overrides(pairs: &[String]) -> Result<Args> {
    let mut overrides = Args::new();
    for pair in pairs {
        let (key, value) = parse_arg_pair(pair)?;
        overrides.insert(key, value);
    }
    Ok(overrides)
}

/// Evaluate a deployment file
async fn cmd_eval(
    config: BuilderConfig,
    file: &Path,
    args_file: Option<&Path>,
    overrides: &[String],
    print_spec: bool,
) -> Result<()> {
    // Nix parses --arg values as expressions, so relative names need a path form
    let file = std::path::absolute(file)
        .context(format!("Failed to resolve deployment file: {:?}", file))?;

    let stored = match args_file {
        Some(path) => read_args_file(path)?,
        None => Args::new(),
    };
    let overrides = parse_overrides(overrides)?;

    info!("Evaluating {:?} using {:?}", file, config.entry_point());
    let mut evaluator = Evaluator::new(JsonDeployment::new(&file).with_args(stored), config);
    let deployment = evaluator
        .eval(Some(overrides))
        .await
        .context(format!("Failed to evaluate {:?}", file))?;

    if let Some(path) = deployment.spec_path() {
        println!("{}", path.display());
    }
    if print_spec {
        if let Some(spec) = deployment.spec() {
            println!("{}", serde_json::to_string_pretty(spec)?);
        }
    }

    Ok(())
}

/// Report evaluator availability
fn cmd_check(config: &BuilderConfig) -> Result<()> {
    let nix = is_nix_available(&config.program);
    let entry = config.has_entry_point();

    println!(
        "Evaluator: {} ({})",
        config.program.display(),
        if nix { "available" } else { "NOT found" }
    );
    println!(
        "Entry point: {} ({})",
        config.entry_point().display(),
        if entry { "present" } else { "missing" }
    );

    if !nix || !entry {
        bail!("nix-builder is not ready");
    }
    Ok(())
}
