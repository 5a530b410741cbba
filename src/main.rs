//! `microspec-gui` - Live spectrum viewer for the Chromation spectrometer dev-kit
//!
//! Connects to the dev-kit, configures it and plots every captured frame until
//! the user quits with `q`, `Esc`, the gamepad Back button or by closing the
//! window.

#![expect(
    missing_docs,
    reason = "Slint-generated code from include_modules! lacks doc comments"
)]
#![allow(clippy::unwrap_used)] // Slint-generated code from include_modules! uses .unwrap() extensively

// GUI module is only in the binary, not the library
mod gui;

use anyhow::{Context, Result};
use gui::GuiController;
use microspec_gui::{
    config::ConfigManager,
    controller::AppController,
    device::{self, DevKit},
    error::{MicrospecError, get_user_friendly_error},
    utils,
};
use tracing::{error, info};

// Include Slint-generated code
slint::include_modules!();

/// Main entry point for the application
///
/// Startup runs in phases: logging, configuration, dev-kit connection and
/// setup, then the GUI event loop. Any failure ends the process with a
/// non-zero status.
fn main() -> Result<()> {
    utils::init_logging().context("Failed to initialize logging system")?;

    info!("microspec-gui v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = ConfigManager::load().context("Failed to load application configuration")?;
    info!(
        "Configuration loaded: {:?} backend, {:?} binning, {} fps",
        config.device.backend, config.sensor.binning, config.display.frame_rate
    );

    let mut kit = device::open(&config.device)
        .map_err(report)
        .context("Failed to open the dev-kit")?;
    info!("Connected to dev-kit {}", kit.serial_number());

    device::configure_devkit(
        &mut kit,
        config.sensor_config(),
        config.initial_exposure(),
        &config.auto_expose_config(),
    )
    .map_err(report)
    .context("Failed to configure the dev-kit")?;

    let app_controller = AppController::new(kit, &config)
        .map_err(report)
        .context("Failed to create application controller")?;

    info!("Creating GUI controller");
    let gui_controller = GuiController::new(app_controller, config.display.frame_rate)
        .context("Failed to create GUI controller")?;

    info!("Starting GUI event loop");
    gui_controller
        .run()
        .context("GUI event loop terminated with error")?;

    info!("microspec-gui shutting down");

    Ok(())
}

/// Log the troubleshooting text for a startup error before it propagates
fn report(e: MicrospecError) -> MicrospecError {
    error!("{}", get_user_friendly_error(&e));
    e
}
