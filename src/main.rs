use anyhow::Context;
use clap::Parser;
use toolshell::cli::{Cli, Command};
use toolshell::config::{Config, ConfigStore};
use toolshell::logging::{default_log_path, init_tracing};
use toolshell::{headless, ui};
use tracing::info;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // The console owns the screen, so it logs to a file unless told otherwise.
    let log_file = match (&cli.command, &cli.log_file) {
        (_, Some(path)) => Some(path.clone()),
        (None, None) => Some(default_log_path()),
        (Some(_), None) => None,
    };
    init_tracing(log_file.as_deref())?;

    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let config = Config::load_from(&config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;
    info!(path = %config_path.display(), "Config loaded");
    let store = ConfigStore::new(config, config_path);
    let context = cli.build_context();

    let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
    match cli.command {
        Some(Command::Build { target }) => {
            let code = runtime.block_on(headless::run_build(store, context, target.into()))?;
            if code != 0 {
                std::process::exit(code);
            }
        }
        None => {
            let _runtime = runtime.enter();
            ui::run(store, context).context("console failed")?;
        }
    }
    Ok(())
}
