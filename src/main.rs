//! Imgforge: Interactive Image & PDF Wizard
//!
//! Thin binary shell: parse arguments, wire up logging, settings and the
//! worker channels, then hand control to the TUI event loop.

use std::sync::Arc;
use std::thread;

use anyhow::Result;
use clap::Parser;
use console::style;
use tracing::info;

use imgforge::cli::Cli;
use imgforge::files::{self, SystemOpener};
use imgforge::jobs::MagickDispatcher;
use imgforge::settings::Settings;
use imgforge::tui::{self, app::App};
use imgforge::{deps, logging};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logging is best-effort: a read-only config dir should not keep the
    // wizard from running.
    let _guard = logging::init(&cli.log_level).ok();
    info!(version = env!("CARGO_PKG_VERSION"), "imgforge starting");

    let settings = Settings::load();
    let start_dir = cli.dir.clone().unwrap_or_else(files::default_browse_dir);

    // The readiness probe runs off the event loop; its report arrives as a
    // message like any other completion.
    let (ready_tx, ready_rx) = crossbeam_channel::unbounded();
    thread::spawn(move || {
        let _ = ready_tx.send(deps::check_tools());
    });

    let (job_tx, job_rx) = crossbeam_channel::unbounded();
    let dispatcher = MagickDispatcher::new(job_tx);

    let mut app = App::new(settings, start_dir, Arc::new(SystemOpener));
    tui::run(&mut app, &dispatcher, &job_rx, &ready_rx)?;

    println!();
    println!("  {}", style("Thanks for using Imgforge!").cyan().bold());
    println!();
    Ok(())
}
