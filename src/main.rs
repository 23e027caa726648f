use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use karat::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Run the pricing API server
    Serve,
    /// Recompute every stored product price once
    Refresh,
    /// Show the current gold price per gram
    Quote {
        /// Purity such as 18 or 21k; common purities when omitted
        karat: Option<String>,
    },
}

impl From<Commands> for karat::AppCommand {
    fn from(cmd: Commands) -> karat::AppCommand {
        match cmd {
            Commands::Serve => karat::AppCommand::Serve,
            Commands::Refresh => karat::AppCommand::Refresh,
            Commands::Quote { karat: purity } => karat::AppCommand::Quote { karat: purity },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => karat::cli::setup::setup(),
        Some(cmd) => karat::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
