use clap::Parser;
use prism_app::{App, AppConfig};
use prism_core::config::load_toml;
use std::process::ExitCode;

/// PRISM trading execution core: loads a config file, wires the subscriber,
/// coordinator, scheduler, and notifier, and runs until an OS shutdown
/// signal arrives.
#[derive(Parser, Debug)]
#[command(name = "prism", version, about = "PRISM trading execution core")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "config.toml")]
    config: std::path::PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config: AppConfig = match load_toml(&cli.config) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("failed to load {}: {err}", cli.config.display());
            return ExitCode::FAILURE;
        }
    };

    if config.logging.json {
        prism_core::logging::init_json_logging();
    } else {
        prism_core::logging::init_logging();
    }

    let app = match App::build(config) {
        Ok(app) => app,
        Err(err) => {
            tracing::error!(%err, "failed to wire prism");
            return ExitCode::FAILURE;
        }
    };

    app.run().await;
    ExitCode::SUCCESS
}
