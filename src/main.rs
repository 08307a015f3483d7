//! Pinned camera widget
//!
//! Shows the webcam in a small frameless, always-on-top window that can be
//! moved, resized from its edges and closed from its hover button or context
//! menu.

// The core builds everywhere; only Windows has a host to run it in
#![cfg_attr(not(windows), allow(dead_code))]

mod app;
mod capture;
mod config;
mod domain;
#[cfg(windows)]
mod platform;
mod ui;

use crate::app::AppError;
use crate::config::WidgetConfig;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = WidgetConfig::default();
    log::debug!("Widget configuration: {config:?}");

    match run(config) {
        Ok(()) => log::info!("Widget closed"),
        Err(AppError::DeviceOpen(err)) => {
            log::error!("Failed to open webcam: {err}");
            eprintln!("Error: Cannot open webcam.");
            std::process::exit(1);
        }
        Err(err) => {
            log::error!("{err}");
            std::process::exit(1);
        }
    }
}

#[cfg(windows)]
fn run(config: WidgetConfig) -> Result<(), AppError> {
    use crate::app::WidgetController;
    use crate::capture::media_foundation::MediaFoundationCamera;
    use crate::platform::{WidgetWindow, window};

    let controller = WidgetController::launch(
        config,
        |index| {
            let camera = MediaFoundationCamera::open(index)?;
            let (width, height) = camera.frame_size();
            log::info!("Opened webcam {index} at {width}x{height}");
            Ok(camera)
        },
        WidgetWindow::create,
    )?;

    window::run(controller).map_err(|err| AppError::EventLoop(Box::new(err)))
}

#[cfg(not(windows))]
fn run(config: WidgetConfig) -> Result<(), AppError> {
    config.validate()?;
    Err(AppError::Unsupported)
}
