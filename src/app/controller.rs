//! Widget controller and coordination layer
//!
//! The controller is the application context: it is created once by
//! `launch`, owns the camera and the window host, and receives every host
//! event through `dispatch`. It runs the interaction state machine, applies
//! its effects, polls frames on timer ticks and guarantees the camera is
//! released exactly once, before the window goes away.

use std::ops::ControlFlow;

use thiserror::Error;
use tiny_skia::Pixmap;

use crate::app::host::{HostEvent, MenuCommand, WidgetHost};
use crate::capture::{CameraDevice, CameraError};
use crate::config::{ConfigError, WidgetConfig};
use crate::domain::chrome::CloseButton;
use crate::domain::core::Rect;
use crate::domain::hit_zone::{CursorShape, HitZones};
use crate::domain::interaction::{self, Effect, Interaction, PointerEvent, WidgetView};
use crate::ui::{RendererError, WidgetLayout, WidgetRenderer};

/// Application errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid widget configuration: {0}")]
    Config(#[from] ConfigError),

    /// The camera could not be opened; fatal at startup
    #[error("Cannot open webcam: {0}")]
    DeviceOpen(#[source] CameraError),

    #[error("Failed to create widget window: {0}")]
    WindowCreation(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Widget event loop failed: {0}")]
    EventLoop(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("No window host is available on this platform")]
    Unsupported,
}

/// Main widget controller
pub struct WidgetController<C: CameraDevice, H: WidgetHost> {
    config: WidgetConfig,
    /// `None` once the device has been released
    camera: Option<C>,
    host: H,
    /// Current screen rectangle
    geometry: Rect,
    zones: HitZones,
    interaction: Interaction,
    close_button: CloseButton,
    renderer: WidgetRenderer,
    /// Latest converted camera image
    image: Option<Pixmap>,
    closed: bool,
}

impl<C: CameraDevice, H: WidgetHost> WidgetController<C, H> {
    /// Opens the camera, creates the window and shows the widget
    ///
    /// The camera is opened first: if that fails no window is ever created.
    ///
    /// # Arguments
    /// * `config` - Widget settings, validated before anything is opened
    /// * `open_camera` - Opens the camera device for an index
    /// * `create_host` - Creates the (still hidden) window
    pub fn launch(
        config: WidgetConfig,
        open_camera: impl FnOnce(u32) -> Result<C, CameraError>,
        create_host: impl FnOnce(&WidgetConfig) -> Result<H, H::Error>,
    ) -> Result<Self, AppError> {
        config.validate()?;

        let mut camera = open_camera(config.device_index).map_err(AppError::DeviceOpen)?;

        let host = match create_host(&config) {
            Ok(host) => host,
            Err(err) => {
                camera.release();
                return Err(AppError::WindowCreation(Box::new(err)));
            }
        };

        let geometry = config.initial_geometry;
        let mut controller = Self {
            zones: HitZones::for_rect(geometry, config.grip_size),
            close_button: CloseButton::new(
                geometry.w,
                config.close_button_size,
                config.close_button_margin,
            ),
            config,
            camera: Some(camera),
            host,
            geometry,
            interaction: Interaction::Idle,
            renderer: WidgetRenderer::new(),
            image: None,
            closed: false,
        };

        controller.render();
        controller.host.show();
        log::info!(
            "Widget shown at ({}, {}) {}x{}",
            geometry.x,
            geometry.y,
            geometry.w,
            geometry.h
        );

        Ok(controller)
    }

    /// Handles one host event
    ///
    /// Returns `ControlFlow::Break` once the widget has been closed.
    pub fn dispatch(&mut self, event: HostEvent) -> ControlFlow<()> {
        if self.closed {
            return ControlFlow::Break(());
        }

        match event {
            HostEvent::Tick => {
                self.tick();
                ControlFlow::Continue(())
            }
            HostEvent::CloseRequested => {
                self.shutdown();
                ControlFlow::Break(())
            }
            HostEvent::Pointer(pointer) => self.on_pointer(&pointer),
        }
    }

    /// Polls one frame and repaints on success
    ///
    /// A failed read or a malformed frame leaves the previous image on screen.
    pub fn tick(&mut self) {
        let Some(camera) = self.camera.as_mut() else {
            return;
        };

        let frame = match camera.read_frame() {
            Ok(frame) => frame,
            Err(err) => {
                log::trace!("Skipping frame: {err}");
                return;
            }
        };

        match frame.to_display_image() {
            Ok(image) => {
                self.image = Some(image);
                self.render();
            }
            Err(err) => log::trace!("Skipping malformed frame: {err}"),
        }
    }

    fn on_pointer(&mut self, event: &PointerEvent) -> ControlFlow<()> {
        let chrome = self.close_button.on_pointer(event, self.interaction.is_idle());
        if chrome.close {
            self.shutdown();
            return ControlFlow::Break(());
        }

        let mut repaint = chrome.repaint;

        if chrome.captured {
            // The button keeps the normal cursor even over a resize grip
            self.host.set_cursor(CursorShape::Arrow);
        } else {
            let view = WidgetView {
                geometry: self.geometry,
                zones: &self.zones,
                min_width: self.config.min_width,
                min_height: self.config.min_height,
            };
            let transition = interaction::handle(event, self.interaction, &view);
            self.interaction = transition.state;

            for effect in transition.effects {
                match effect {
                    Effect::SetGeometry(rect) => repaint |= self.apply_geometry(rect),
                    Effect::SetCursor(cursor) => self.host.set_cursor(cursor),
                    Effect::ShowContextMenu(at) => {
                        if let Some(MenuCommand::Close) = self.host.show_context_menu(at) {
                            self.shutdown();
                            return ControlFlow::Break(());
                        }
                    }
                }
            }
        }

        if repaint {
            self.render();
        }
        ControlFlow::Continue(())
    }

    /// Commits a new window rectangle; returns whether the size changed
    fn apply_geometry(&mut self, rect: Rect) -> bool {
        if let Err(err) = self.host.set_geometry(rect) {
            log::warn!("Failed to set widget geometry {rect:?}: {err}");
            return false;
        }

        let resized = rect.w != self.geometry.w || rect.h != self.geometry.h;
        self.geometry = rect;

        if resized {
            self.zones = HitZones::for_rect(rect, self.config.grip_size);
            self.close_button.relayout(rect.w);
        }
        resized
    }

    /// Composes the widget surface and hands it to the host
    fn render(&mut self) {
        if let Err(err) = self.try_render() {
            log::warn!("Widget rendering failed: {err}");
        }
    }

    fn try_render(&mut self) -> Result<(), RendererError> {
        let image_size = self.image.as_ref().map(|image| (image.width(), image.height()));
        let layout = WidgetLayout::new(
            self.geometry,
            image_size,
            &self.close_button,
            self.config.corner_radius,
        )?;
        let surface = self.renderer.render_layout(&layout, self.image.as_ref())?;

        if let Err(err) = self.host.present(&surface, self.geometry) {
            log::warn!("Failed to present widget surface: {err}");
        }
        Ok(())
    }

    /// Releases the camera, then tears down the window
    ///
    /// Safe to call more than once; only the first call has any effect.
    pub fn shutdown(&mut self) {
        if let Some(mut camera) = self.camera.take() {
            log::info!("Closing the application and releasing webcam.");
            camera.release();
        }

        if !self.closed {
            self.closed = true;
            self.host.destroy();
        }
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }
}

#[cfg(test)]
impl<C: CameraDevice, H: WidgetHost> WidgetController<C, H> {
    fn geometry(&self) -> Rect {
        self.geometry
    }

    fn interaction(&self) -> Interaction {
        self.interaction
    }

    /// Image currently on screen
    fn image(&self) -> Option<&Pixmap> {
        self.image.as_ref()
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

impl<C: CameraDevice, H: WidgetHost> Drop for WidgetController<C, H> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
