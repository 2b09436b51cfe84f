use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Result, anyhow};
use clap::Parser;
use grocer_core::Config;
use tracing_subscriber::EnvFilter;

mod app;
mod handler;
mod tui;
mod ui;
mod view;

use app::App;
use tui::{EventHandler, TICK_RATE};

#[derive(Parser)]
#[command(name = "grocer-genie")]
#[command(about = "Chat with the Grocer Genie meal-planning assistant", version)]
struct Cli {
    /// Assistant endpoint (overrides the config file)
    #[arg(short, long)]
    endpoint: Option<String>,
    /// Config file to read instead of the default location
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Where to write the log (overrides the config file)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, config_error) = load_config(cli.config.as_deref())?;

    let log_path = match cli.log_file.or_else(|| config.log_file.clone()) {
        Some(path) => path,
        None => Config::default_log_path()?,
    };
    init_logging(&log_path)?;
    if let Some(err) = config_error {
        tracing::warn!(error = %err, "ignoring unreadable config file, using defaults");
    }

    let endpoint = cli
        .endpoint
        .unwrap_or_else(|| config.endpoint_or_default().to_string());
    tracing::info!(%endpoint, "starting grocer-genie");

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let result = run(&mut terminal, App::new(&endpoint)).await;
    tui::restore()?;

    if let Err(err) = &result {
        tracing::error!(error = %err, "exited with error");
    }
    result
}

async fn run(terminal: &mut tui::Tui, mut app: App) -> Result<()> {
    let mut events = EventHandler::new(TICK_RATE);

    loop {
        terminal.draw(|frame| ui::render(&mut app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(&mut app, event),
            None => break,
        }

        app.poll_request().await;
        app.probe_images();
        app.apply_failed_images();

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// An explicit config path must parse. A broken file at the default
/// location falls back to defaults, handing the error back to be logged.
fn load_config(explicit: Option<&Path>) -> Result<(Config, Option<anyhow::Error>)> {
    match explicit {
        Some(path) => Ok((Config::load_from(path)?, None)),
        None => Ok(fallback_config(Config::load())),
    }
}

fn fallback_config(loaded: Result<Config>) -> (Config, Option<anyhow::Error>) {
    match loaded {
        Ok(config) => (config, None),
        Err(err) => (Config::new(), Some(err)),
    }
}

/// Log to a file: the terminal belongs to the UI while it runs.
fn init_logging(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
