//! Phase Host
//!
//! Runs JavaScript against exposed `Phase` objects on QuickJS, lists the
//! exposed methods, or performs one-shot calls.

mod config;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use bridge_quickjs::JsHost;
use bridge_runtime::{Bridge, ParamType, ResponseMode};
use phase::Phase;

use config::HostConfig;

/// Phase bridge host
#[derive(Parser, Debug)]
#[command(name = "phase-host")]
#[command(about = "Expose Phase objects to JavaScript", long_about = None)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Render results as bare arrays and plain error messages
    #[arg(long)]
    legacy: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate a script with the factory installed as a global
    Run {
        /// Script to evaluate
        script: PathBuf,
    },
    /// List exposed methods
    Methods,
    /// Call one method on a fresh instance
    Call {
        /// Exposed method name
        method: String,
        /// JSON-array argument string, e.g. "[2,3]"
        args: Option<String>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = HostConfig::load_or_default(args.config.as_deref())
        .context("Failed to load configuration")?;
    if args.legacy {
        config.bridge.response_mode = ResponseMode::Legacy;
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    debug!(?config, "Starting phase-host v{}", env!("CARGO_PKG_VERSION"));

    let bridge = Bridge::<Phase>::new(config.bridge.clone());

    match args.command {
        Command::Run { script } => run_script(&bridge, &script),
        Command::Methods => {
            list_methods(&bridge);
            Ok(())
        }
        Command::Call { method, args } => {
            let bound = bridge.instantiate()?;
            println!("{}", bound.respond(&method, args.as_deref()));
            Ok(())
        }
    }
}

fn run_script(bridge: &Bridge<Phase>, path: &Path) -> Result<()> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script {}", path.display()))?;

    let host = JsHost::new()?;
    host.install(bridge)?;
    info!("Running {}", path.display());

    let result = host.eval_file(&path.display().to_string(), &source)?;
    if !result.is_null() {
        println!("{}", serde_json::to_string_pretty(&result)?);
    }

    host.gc();
    Ok(())
}

fn list_methods(bridge: &Bridge<Phase>) {
    for info in bridge.table().describe() {
        let params: Vec<String> = info.params.iter().map(ParamType::to_string).collect();
        match &info.description {
            Some(desc) => println!("{}({})  {}", info.method_name, params.join(", "), desc),
            None => println!("{}({})", info.method_name, params.join(", ")),
        }
    }
}
