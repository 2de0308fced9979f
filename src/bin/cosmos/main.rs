//! cosmos - terminal front panel for the step-sequenced voice
//!
//! Run with: cargo run --release [config.json]
//!
//! Logs go to `cosmos.log` (filter with `RUST_LOG`).

mod app;
mod keys;
mod ui;

use color_eyre::eyre::{Result as EyreResult, WrapErr};
use cosmos_dsp::engine::EngineConfig;
use std::fs::File;

const LOG_FILE: &str = "cosmos.log";

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    init_logging()?;

    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::from_json_file(&path)
            .wrap_err_with(|| format!("failed to load config from {}", path))?,
        None => EngineConfig::default(),
    };

    let mut terminal = ratatui::init();
    let res = app::run(&mut terminal, config);
    ratatui::restore();
    res
}

/// Route `log` output to a file so it never tears the TUI.
fn init_logging() -> EyreResult<()> {
    let file = File::create(LOG_FILE).wrap_err_with(|| format!("failed to create {}", LOG_FILE))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}
