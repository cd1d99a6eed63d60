mod cli;
mod error_fmt;
mod run;

use clap::Parser;
use eyre::WrapErr;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE};

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(e) = real_main(cli) {
        let code = error_fmt::exit_code_for_error(&e);
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", error_fmt::format_error_json(&e));
        } else {
            eprintln!("{}", error_fmt::humanize(&e));
        }
        std::process::exit(code);
    }
}

fn real_main(cli: Cli) -> eyre::Result<()> {
    // Pretty reports for anything that escapes; ignore a second install.
    let _ = color_eyre::install();

    let cfg = run::load_config(&cli.config)?;
    init_tracing(cli.json, cli.log_level.as_deref(), &cfg.logging)?;
    tracing::debug!(config = %cli.config.display(), "config loaded");

    match cli.cmd {
        Commands::Run {
            cycles,
            no_diagnostics,
        } => run::cmd_run(&cfg, cycles, no_diagnostics, cli.json).map(|_| ()),
        Commands::SelfCheck => run::cmd_self_check(&cfg, cli.json),
        Commands::Threshold { set } => run::cmd_threshold(&cfg, set, cli.json),
    }
}

/// Console logs go to stderr so stdout stays free for diagnostic lines.
///
/// Precedence for the console filter: `RUST_LOG`, then `--log-level`, then
/// `[logging] level`, then `info`.
fn init_tracing(
    json: bool,
    cli_level: Option<&str>,
    logging: &fan_config::Logging,
) -> eyre::Result<()> {
    let level = cli_level
        .or(logging.level.as_deref())
        .unwrap_or("info");
    let filter = match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => EnvFilter::try_new(level)
            .map_err(|e| fan_core::error::FanError::Config(format!("log level {level:?}: {e}")))?,
    };

    let file_layer = match logging.file.as_deref() {
        Some(file) => {
            let path = std::path::Path::new(file);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| std::path::Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| fan_core::error::FanError::Config(format!("logging.file {file:?} has no file name")))?;
            let appender = match logging.rotation.as_deref().unwrap_or("never") {
                "daily" => tracing_appender::rolling::daily(dir, name),
                "hourly" => tracing_appender::rolling::hourly(dir, name),
                _ => tracing_appender::rolling::never(dir, name),
            };
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            Some(fmt::layer().json().with_ansi(false).with_writer(writer))
        }
        None => None,
    };

    let registry = tracing_subscriber::registry().with(filter).with(file_layer);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
            .wrap_err("installing JSON log subscriber")?;
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()
            .wrap_err("installing log subscriber")?;
    }
    Ok(())
}
