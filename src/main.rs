mod app;
mod client;
mod commands;
mod config;
mod dispatcher;
mod events;
mod health;
mod logging;
mod model;
mod state;
mod store;
mod ui;

use anyhow::Result;
use clap::{Parser, Subcommand};
use config::Config;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "chatdesk")]
#[command(version)]
#[command(about = "Terminal chat client for a remote assistant service", long_about = None)]
struct Cli {
    /// Service base URL (overrides config file and CHATDESK_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Config file to use instead of ~/.chatdesk/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive chat UI (default)
    Tui,
    /// Check whether the service is reachable
    Health,
    /// Send one message and print the reply
    Send { text: String },
    /// Write a config file with the current settings
    Init {
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?
        .with_env(|key| std::env::var(key).ok())
        .with_base_url(cli.base_url);

    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => {
            let _guard = logging::init_file(&config.logs_dir(), cli.verbose)?;
            app::run(config).await
        }
        Commands::Health => {
            logging::init_stderr(cli.verbose);
            commands::check_health(&config).await
        }
        Commands::Send { text } => {
            logging::init_stderr(cli.verbose);
            commands::send_message(&config, &text).await
        }
        Commands::Init { force } => {
            logging::init_stderr(cli.verbose);
            commands::init_config(&config, force)
        }
    }
}
