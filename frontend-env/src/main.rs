// Forbid unwrap() in production code.
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use frontend_env::{EnvironmentConfig, Format, config, render, server};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Build, check and serve the frontend environment record.
#[derive(Parser)]
#[command(name = "frontend-env", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate the configured record and report every problem.
    Check,
    /// Print the rendered record to stdout.
    Show {
        /// Output format: ts or json.
        #[arg(long, default_value = "ts")]
        format: Format,
    },
    /// Write the rendered record to a file.
    Render {
        /// Output format: ts or json.
        #[arg(long, default_value = "ts")]
        format: Format,
        /// Destination path, e.g. src/environments/environment.ts.
        #[arg(long)]
        out: PathBuf,
    },
    /// Serve the record over HTTP.
    Serve {
        /// Port to listen on (overrides FRONTEND_ENV_LISTEN_PORT).
        #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "frontend_env=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Check => check(),
        Command::Show { format } => match load() {
            Some(config) => show(&config, format),
            None => ExitCode::FAILURE,
        },
        Command::Render { format, out } => match load() {
            Some(config) => write(&config, format, &out),
            None => ExitCode::FAILURE,
        },
        Command::Serve { port } => match load() {
            Some(config) => {
                let port = config.serve_port(port);
                match server::serve(config.environment, port).await {
                    Ok(()) => ExitCode::SUCCESS,
                    Err(e) => {
                        tracing::error!("Server error: {e}");
                        ExitCode::FAILURE
                    }
                }
            }
            None => ExitCode::FAILURE,
        },
    }
}

/// Report every configuration problem, not just the first.
fn check() -> ExitCode {
    let problems = config::check_from_env();
    if problems.is_empty() {
        tracing::info!("environment is valid");
        return ExitCode::SUCCESS;
    }
    for problem in &problems {
        tracing::error!("{problem}");
    }
    ExitCode::FAILURE
}

fn load() -> Option<EnvironmentConfig> {
    match EnvironmentConfig::from_env() {
        Ok(config) => {
            tracing::debug!(
                "Loaded configuration: production={}, api_server_url={}, auth0_domain={}",
                config.environment.production,
                config.environment.api_server_url,
                config.environment.auth0.domain()
            );
            Some(config)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {e}");
            None
        }
    }
}

fn show(config: &EnvironmentConfig, format: Format) -> ExitCode {
    match format.render(&config.environment) {
        Ok(rendered) => {
            print!("{rendered}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Failed to render environment: {e}");
            ExitCode::FAILURE
        }
    }
}

fn write(config: &EnvironmentConfig, format: Format, out: &Path) -> ExitCode {
    match render::write_artifact(&config.environment, format, out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Failed to write {}: {e}", out.display());
            ExitCode::FAILURE
        }
    }
}
