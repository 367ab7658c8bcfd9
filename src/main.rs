use std::path::Path;

use anyhow::{Context, Result};
use par_nvim::app::App;
use par_nvim::cli;
use par_nvim_config::Config;
use tokio::runtime::Runtime;

fn main() {
    // Process CLI arguments first (before logging init for cleaner output)
    let runtime_options = cli::process_cli();

    // CLI --log-level takes precedence, then RUST_LOG, then config (applied below).
    par_nvim::debug::init_log_bridge(runtime_options.log_level);

    log::info!("Starting par-nvim {}", par_nvim::VERSION);

    let code = match run(runtime_options) {
        Ok(code) => code,
        Err(e) => {
            log::error!("{e:#}");
            eprintln!("par-nvim: error: {e:#}");
            1
        }
    };
    log::logger().flush();
    std::process::exit(code);
}

fn run(runtime_options: cli::RuntimeOptions) -> Result<i32> {
    let config = match &runtime_options.config_path {
        Some(path) => load_config(path)?,
        None => Config::load().context("failed to load configuration")?,
    };
    par_nvim::debug::apply_config_level(config.log_level);

    let runtime = Runtime::new()?;
    let result = runtime.block_on(App::new(runtime_options, config).run());

    // Don't block forever on a reader task still parked on stdin.
    log::info!("Connection closed, shutting down runtime");
    runtime.shutdown_timeout(std::time::Duration::from_secs(2));

    let reason = result?;
    Ok(reason.exit_code())
}

fn load_config(path: &Path) -> Result<Config> {
    Config::load_from(path).with_context(|| format!("failed to load configuration from {path:?}"))
}
