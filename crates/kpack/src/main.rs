//! Knowledge Pack CLI - docs server with a GitHub-backed CMS.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "kpack")]
#[command(about = "Documentation server with a GitHub-backed CMS")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to kpack.toml config file
    #[arg(short, long, default_value = "kpack.toml")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Scaffold content and CMS admin files
    Init {
        /// Overwrite existing files
        #[arg(short, long)]
        yes: bool,
    },

    /// Run the docs server
    Serve {
        /// Port to listen on (defaults to config or 3001)
        #[arg(short, long)]
        port: Option<u16>,

        /// Rebuild the search index when content changes
        #[arg(short, long)]
        watch: bool,

        /// Open the admin UI in a browser
        #[arg(long)]
        open: bool,
    },

    /// Write the search index as JSON
    Index {
        /// Output file
        #[arg(short, long, default_value = "search-index.json")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    fmt().with_env_filter(filter).with_target(false).init();

    let file_config = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init { yes } => {
            commands::init::run(file_config.into_server_config(), &cli.config, yes)?;
        }
        Commands::Serve { port, watch, open } => {
            let mut server_config = file_config.into_server_config();
            if let Some(port) = port {
                server_config.port = port;
            }
            server_config.watch = watch;
            commands::serve::run(server_config, open).await?;
        }
        Commands::Index { output } => {
            commands::index::run(file_config.into_server_config(), &output)?;
        }
    }

    Ok(())
}
