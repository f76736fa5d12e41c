use anyhow::Result;
use clap::{Parser, Subcommand};

use newscheck::{cli, config, logging};

#[derive(Debug, Parser)]
#[command(name = "newscheck")]
#[command(about = "Fake news detection frontend: asset server and API client")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Serve the frontend assets over HTTP
    Serve {
        /// Port to listen on (default: 3000, or $PORT)
        #[arg(long)]
        port: Option<u16>,
        /// Directory to serve; must contain index.html (default: ui)
        #[arg(long)]
        root: Option<String>,
        /// Interface to bind (default: 127.0.0.1)
        #[arg(long)]
        host: Option<String>,
    },
    /// Classify an article; reads stdin when no text is given
    Analyze {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },
    /// Paste articles line by line and analyze them interactively
    Interactive,
    /// Check the classification API and local configuration
    Health,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write the default config to ~/.newscheck/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set a dotted key, e.g. `server.port 8000`
    Set { key: String, value: String },
    /// Reset the global config to defaults
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();
    let loaded = config::load_with_warnings();
    logging::init(&loaded.config.logging.level);
    loaded.report();
    let cfg = loaded.config;

    match app.command {
        Commands::Serve { port, root, host } => {
            cli::run_serve(&cfg, cli::ServeOverrides { port, root, host })
        }
        Commands::Analyze { text } => {
            if !cli::run_analyze(&cfg, &text)? {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Interactive => cli::run_interactive(&cfg),
        Commands::Health => cli::run_health(&cfg),
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
    }
}
