//! Desktop Grid Snapper
//!
//! Keeps desktop icons on a per-monitor grid. Alt+Arrow moves the selected
//! icons one cell, and icons dropped after a mouse drag snap to the nearest
//! cell. A translucent overlay shows the grid on every monitor.

#![cfg_attr(not(windows), allow(dead_code))]
#![cfg_attr(all(windows, not(debug_assertions)), windows_subsystem = "windows")]

use std::path::PathBuf;

use clap::Parser;

mod app;
mod config;
mod domain;
mod input;
#[cfg(windows)]
mod platform;
mod ui;

/// Snap desktop icons to a grid
#[derive(Parser, Debug)]
#[command(name = "desktop-grid-snapper")]
#[command(version, about, long_about = None)]
struct Args {
    /// Start with the grid overlays hidden (Ctrl+Alt+G shows them)
    #[arg(long)]
    silent: bool,

    /// Settings file (defaults to `%APPDATA%\DesktopGridSnapper\settings.json`)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Input polling interval in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 80)]
    interval_ms: u32,
}

impl Args {
    fn tick_interval_ms(&self) -> u32 {
        self.interval_ms.clamp(16, 1000)
    }

    fn settings_path(&self) -> Option<PathBuf> {
        self.config.clone().or_else(config::AppSettings::default_path)
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    #[cfg(windows)]
    {
        let options = app::runner::RunOptions {
            settings_path: args.settings_path(),
            silent: args.silent,
            interval_ms: args.tick_interval_ms(),
        };
        log::info!(
            "Starting desktop-grid-snapper, tick every {} ms",
            options.interval_ms
        );

        if let Err(e) = app::runner::run(options) {
            log::error!("{e}");
            std::process::exit(1);
        }
    }

    #[cfg(not(windows))]
    {
        log::error!(
            "desktop-grid-snapper needs the Windows shell; nothing to do here (settings would be read from {:?})",
            args.settings_path()
        );
        std::process::exit(1);
    }
}
