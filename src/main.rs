mod cli;
mod commands;
mod config;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use config::{CloudConfig, Overrides};
use nexus::ConnectionSettings;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

/// Global context for the application
pub struct Context {
    pub quiet: bool,
    pub auto_confirm: bool,
    pub settings: ConnectionSettings,
    pub config_path: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let verbose = cli.verbose;
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            ui::error(&format!("{err:#}"));
            let code = match err.downcast_ref::<nexus::Error>() {
                Some(e) => {
                    let category = e.category();
                    if verbose > 0 {
                        ui::dim(category.advice());
                    }
                    category.exit_code()
                }
                None => nexus::ErrorCategory::Other.exit_code(),
            };
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_path = config::config_path(cli.config.as_deref())?;
    let file_config = CloudConfig::load_from(&config_path)?;
    let resolved = file_config.resolve(&Overrides {
        server: cli.server,
        api_key: cli.api_key,
        auto_confirm: cli.auto_confirm,
    });
    log::debug!("Using server {}", resolved.settings.server);

    let ctx = Context {
        quiet: cli.quiet,
        auto_confirm: resolved.auto_confirm,
        settings: resolved.settings,
        config_path,
    };

    match cli.command {
        Command::Endpoint(cmd) => commands::endpoint::run(&ctx, cmd),
        Command::Config(cmd) => commands::config::run(&ctx, cmd),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "cloudctl", &mut io::stdout());
            Ok(())
        }
    }
}
