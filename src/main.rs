// Re-export library modules so binary-internal modules can use crate::api:: and crate::error::
pub(crate) use daynote::{api, error};

mod app;
mod config;
mod edit_buffer;
mod keys;
mod ui;

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "daynote", version, about = "Daily notes in the terminal")]
struct Cli {
    /// Route to open: `/`, `/dates/YYYY-MM-DD` or any other path
    #[arg(default_value = "/")]
    route: String,

    /// Override the config file location
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,
}

fn default_config_path() -> PathBuf {
    AppConfig::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("config.toml")
}

/// Log to a file next to the config; the terminal belongs to the UI.
/// `RUST_LOG` wins over the configured level.
fn init_tracing(level: &str, log_path: &Path) -> error::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if let Err(e) = fmt()
        .with_env_filter(env_filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
    {
        eprintln!("Logging disabled: {}", e);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let path = cli.config.clone().unwrap_or_else(default_config_path);

    if !path.exists() {
        AppConfig::write_default(&path)?;
        eprintln!(
            "Created default config at: {}\nPlease edit it with your notes server URL and API token, then run again.",
            path.display()
        );
        return Ok(());
    }

    let config = match AppConfig::load_from_path(&path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", path.display(), e);
            eprintln!("Fix the config file or delete it to regenerate defaults.");
            return Ok(());
        }
    };

    if cli.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let log_path = path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join("daynote.log");
    init_tracing(&config.log.level, &log_path)?;
    tracing::info!(config = %path.display(), "config loaded");

    let mut terminal = ratatui::init();

    // Enable enhanced keyboard protocol (reports Cmd/Super on supported terminals)
    let _ = crossterm::execute!(
        std::io::stdout(),
        crossterm::event::PushKeyboardEnhancementFlags(
            crossterm::event::KeyboardEnhancementFlags::REPORT_ALL_KEYS_AS_ESCAPE_CODES
        )
    );

    let hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = crossterm::execute!(
            std::io::stdout(),
            crossterm::event::PopKeyboardEnhancementFlags
        );
        ratatui::restore();
        hook(info);
    }));

    let result = app::run(&config, &cli.route, &mut terminal).await;

    let _ = crossterm::execute!(
        std::io::stdout(),
        crossterm::event::PopKeyboardEnhancementFlags
    );
    ratatui::restore();

    if let Err(e) = result {
        tracing::error!(error = %e, "exited with error");
        eprintln!("Error: {}", e);
    }

    Ok(())
}
