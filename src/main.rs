mod catalog;
mod cli;
mod config;
mod daemon;
mod describe;
mod environment;
mod error;
mod i18n;
mod nav;
mod scrape;
mod status;
#[cfg(test)]
mod testing;
mod tui;

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::sync::Arc;

fn init_logger(log_file: Option<&std::path::Path>) -> Result<()> {
    // off unless RUST_LOG asks for it, the TUI owns the terminal
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("off"));
    builder.format(|buf, record| {
        writeln!(
            buf,
            "{} {:<5} {}: {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            record.level(),
            record.target(),
            record.args()
        )
    });
    if let Some(path) = log_file {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("cannot open log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    init_logger(cli.log_file.as_deref())?;

    let config = config::Config::load_or_default()?;
    let daemon_url = cli.daemon_url(&config).to_string();

    // --lang > stored preference > system locale
    let lang = i18n::resolve_language(
        cli.lang.as_deref(),
        config.language.as_deref(),
        i18n::system_locale().as_deref(),
    );
    let i18n = i18n::I18n::load(lang, config.locales_dir.as_deref());
    log::info!("starting in {} against {}", lang, daemon_url);

    let daemon: Arc<dyn daemon::Daemon> =
        Arc::new(daemon::DaemonClient::new(&daemon_url, config.request_timeout())?);
    let site = Arc::new(scrape::PackageSite::new(&config)?);
    let catalog = match catalog::Catalog::load_or_builtin(config.catalog_path.as_deref()) {
        Ok(catalog) => catalog,
        Err(e) => {
            log::error!("{:#}; using the built-in catalog", e);
            catalog::Catalog::builtin()?
        }
    };
    let environment = environment::spawn_detector(daemon.clone());

    let services = tui::state::Services {
        daemon,
        site,
        catalog: Arc::new(catalog),
        environment,
        ready_timeout: config.request_timeout(),
    };
    let app = tui::state::App::new(config, i18n, cli.start_location());

    tui::run(app, services).await
}
