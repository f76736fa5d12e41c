//! CLI command implementations.
//!
//! Provides subcommand handlers for:
//! - `newscheck serve`: run the static asset server
//! - `newscheck analyze "text"`: one-shot classification in the terminal
//! - `newscheck interactive`: line-based session driving the controller
//! - `newscheck health`: check the classification API, show config status
//! - `newscheck config show|init|set|reset`: configuration management

use std::io::{BufRead, Read};
use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use tracing::info;

use crate::api::HttpApi;
use crate::config::{self, NewscheckConfig};
use crate::controller::{Controller, TerminalView, UiState};
use crate::server::resolve::INDEX_FILE;
use crate::server::{Shutdown, StaticServer};

/// Per-invocation overrides for `newscheck serve`.
#[derive(Debug, Default, Clone)]
pub struct ServeOverrides {
    pub port: Option<u16>,
    pub root: Option<String>,
    pub host: Option<String>,
}

impl ServeOverrides {
    fn apply(self, cfg: &mut NewscheckConfig) {
        if let Some(port) = self.port {
            cfg.server.port = port;
        }
        if let Some(root) = self.root {
            cfg.server.root_dir = root;
        }
        if let Some(host) = self.host {
            cfg.server.host = host;
        }
    }
}

// ---------------------------------------------------------------------------
// newscheck serve
// ---------------------------------------------------------------------------

/// Run the asset server until Ctrl-C / SIGTERM.
pub fn run_serve(cfg: &NewscheckConfig, overrides: ServeOverrides) -> Result<()> {
    let mut cfg = cfg.clone();
    overrides.apply(&mut cfg);

    let server = StaticServer::bind(&cfg.server)?;
    let shutdown = Shutdown::new();
    shutdown.install_signal_handlers()?;

    let port = server
        .local_addr()
        .map(|addr| addr.port())
        .unwrap_or(cfg.server.port);

    println!("{}", "newscheck frontend server".bold().cyan());
    println!("  Serving files from: {}", server.root().display());
    println!("  Frontend URL:       http://localhost:{port}");
    println!("  API backend:        {}", cfg.api.base_url);
    println!("Press Ctrl+C to stop.\n");
    info!(port, root = %server.root().display(), "server started");

    server.run(&shutdown)?;
    println!("\nFrontend server stopped");
    Ok(())
}

// ---------------------------------------------------------------------------
// newscheck analyze
// ---------------------------------------------------------------------------

/// Classify one article. Returns `false` when the analysis ended in error.
///
/// Reads the article from stdin when `text` is empty.
pub fn run_analyze(cfg: &NewscheckConfig, text: &[String]) -> Result<bool> {
    let input = if text.is_empty() {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed reading article text from stdin")?;
        buf
    } else {
        text.join(" ")
    };

    let api = HttpApi::from_config(&cfg.api);
    let mut controller = Controller::new(api, TerminalView::stdout(false));
    controller.check_api_health();
    controller.set_input(input);
    controller.analyze_news();

    Ok(matches!(controller.state(), UiState::Success(_)))
}

// ---------------------------------------------------------------------------
// newscheck interactive
// ---------------------------------------------------------------------------

/// Line-oriented stand-in for the browser page.
///
/// Each line is appended to the article buffer. An empty line submits,
/// `:retry` repeats the last analysis, `:clear` empties the buffer and
/// `:quit` (or EOF) ends the session.
pub fn run_interactive(cfg: &NewscheckConfig) -> Result<()> {
    let api = HttpApi::from_config(&cfg.api);
    let mut controller = Controller::new(api, TerminalView::stdout(true));

    println!("{}", "newscheck interactive".bold().cyan());
    println!(
        "  {}",
        "Paste article text. Empty line analyzes, :retry, :clear, :quit.".dimmed()
    );
    controller.check_api_health();

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("failed reading from stdin")?;
        match Command::parse(&line) {
            Command::Quit => break,
            Command::Clear => controller.set_input(String::new()),
            Command::Retry => controller.retry(),
            Command::Submit => controller.analyze_news(),
            Command::Append(text) => {
                let mut buffer = controller.input().to_string();
                if !buffer.is_empty() {
                    buffer.push('\n');
                }
                buffer.push_str(text);
                controller.set_input(buffer);
            }
        }
    }

    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Quit,
    Clear,
    Retry,
    Submit,
    Append(&'a str),
}

impl<'a> Command<'a> {
    fn parse(line: &'a str) -> Self {
        match line.trim() {
            ":quit" | ":q" => Self::Quit,
            ":clear" => Self::Clear,
            ":retry" => Self::Retry,
            "" => Self::Submit,
            _ => Self::Append(line),
        }
    }
}

// ---------------------------------------------------------------------------
// newscheck health
// ---------------------------------------------------------------------------

pub fn run_health(cfg: &NewscheckConfig) -> Result<()> {
    println!("{}", "newscheck Health Check".bold().cyan());
    println!("{}", "=".repeat(40));

    let global_exists = config::global_config_file().is_some_and(|p| p.exists());
    let project_exists = config::project_config_file().is_some_and(|p| p.exists());
    print_health_item(
        "Global config",
        global_exists,
        if global_exists {
            "~/.newscheck/config.toml found"
        } else {
            "not found (run `newscheck config init` to create)"
        },
    );
    print_health_item(
        "Project config",
        project_exists,
        if project_exists {
            ".newscheck.toml found"
        } else {
            "none (optional)"
        },
    );

    let root = Path::new(&cfg.server.root_dir);
    let index_ok = root.join(INDEX_FILE).is_file();
    print_health_item(
        "Asset root",
        index_ok,
        &if index_ok {
            format!("{}/index.html present", root.display())
        } else {
            format!("{}/index.html missing", root.display())
        },
    );

    let api = HttpApi::from_config(&cfg.api);
    let mut controller = Controller::new(api, TerminalView::new(std::io::sink(), false));
    let status = controller.check_api_health();
    print_health_item(
        "Classification API",
        status.is_online(),
        &format!("{} ({})", status.label(), cfg.api.base_url),
    );

    Ok(())
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<22} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// newscheck config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective newscheck Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    if let Some(path) = config::global_config_file() {
        let state = if path.exists() { "loaded" } else { "not found" };
        println!("  {} {} ({state})", "Global:".dimmed(), path.display());
    }
    if let Some(path) = config::project_config_file() {
        let state = if path.exists() { "loaded" } else { "not found" };
        println!("  {} {} ({state})", "Project:".dimmed(), path.display());
    }
    Ok(())
}

pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!("{} {}", "Created".green(), path.display());
    Ok(())
}

pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} {key} = {value}", "Set".green());
    Ok(())
}

pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!("{} {}", "Reset".green(), path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
