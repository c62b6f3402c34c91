//! Tech tree development tools.
//!
//! # Usage
//!
//! ```bash
//! # Check a data directory for broken references and cycles
//! cargo run -p tech_tools -- validate assets/data
//!
//! # Print every connector as the tree view would draw it
//! cargo run -p tech_tools -- routes assets/data --corners
//!
//! # Play the tree forward and report pacing as JSON
//! cargo run -p tech_tools -- simulate assets/data --rounds 40 --json
//! ```
//!
//! Logs go to stderr; set `RUST_LOG=debug` for engine detail.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tech_tools::dataset::DataSet;
use tech_tools::error::{Result, ToolError};
use tech_tools::routes::{render_text, route_lines, strategy_counts};
use tech_tools::simulate::{simulate, SimulationConfig};
use tech_tools::validate::validate_data_directory;

#[derive(Parser)]
#[command(name = "tech-tools")]
#[command(about = "Development tools for tech-tree data")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate data files
    Validate {
        /// Path to data directory
        #[arg(default_value = "assets/data")]
        path: PathBuf,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print routed connectors
    Routes {
        /// Path to data directory
        #[arg(default_value = "assets/data")]
        path: PathBuf,

        /// Use the plain horizontal-first bend for every connector
        #[arg(long)]
        dumb: bool,

        /// Collapse straight runs to their corners
        #[arg(long)]
        corners: bool,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Simulate research progression
    Simulate {
        /// Path to data directory
        #[arg(default_value = "assets/data")]
        path: PathBuf,

        /// Rounds to play
        #[arg(short, long, default_value = "20")]
        rounds: u32,

        /// Income per minable resource per round
        #[arg(short, long, default_value = "25")]
        income: u32,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli.command) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Validate { path, json } => {
            tracing::info!("Validating data files in: {}", path.display());
            let summary = validate_data_directory(&path)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            }
            if summary.is_clean() {
                tracing::info!(
                    nodes = summary.nodes,
                    unmapped = summary.unmapped.len(),
                    "Validation passed"
                );
                Ok(())
            } else {
                Err(ToolError::Invalid(summary.error_count()))
            }
        }
        Commands::Routes {
            path,
            dumb,
            corners,
            json,
        } => {
            let context = load(&path)?;
            let lines = route_lines(&context, !dumb, corners);
            if json {
                println!("{}", serde_json::to_string_pretty(&lines)?);
            } else {
                print!("{}", render_text(&lines));
                for (strategy, count) in strategy_counts(&lines) {
                    tracing::info!("{strategy}: {count}");
                }
            }
            Ok(())
        }
        Commands::Simulate {
            path,
            rounds,
            income,
            json,
        } => {
            let mut context = load(&path)?;
            let summary = simulate(&mut context, &SimulationConfig { rounds, income })?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                for event in &summary.events {
                    let how = if event.paid { "researched" } else { "discovered" };
                    println!("round {:>3}: {how} {}", event.round, event.node);
                }
                println!("{}/{} nodes researched", summary.researched, summary.total);
                for name in &summary.still_locked {
                    println!("never unlocked: {name}");
                }
            }
            Ok(())
        }
    }
}

fn load(path: &Path) -> Result<tech_core::context::ResearchContext> {
    DataSet::load(path)?.into_context()
}
