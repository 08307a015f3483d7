use std::time::Duration;

use thiserror::Error;

use crate::domain::core::Rect;

/// Compiled-in settings for the pinned camera widget
///
/// The widget has no configuration file or command-line flags; every value
/// comes from the associated constants below.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetConfig {
    /// Camera device index to open
    pub device_index: u32,
    /// Screen rectangle the widget starts at
    pub initial_geometry: Rect,
    pub min_width: i32,
    pub min_height: i32,
    /// Thickness of the virtual resize grips
    pub grip_size: i32,
    /// Timer period for frame polling
    pub refresh_interval: Duration,
    pub close_button_size: i32,
    /// Distance between the close button and the top/right edges
    pub close_button_margin: i32,
    pub corner_radius: f32,
}

impl WidgetConfig {
    pub const DEFAULT_DEVICE_INDEX: u32 = 0;
    pub const DEFAULT_GEOMETRY: Rect = Rect {
        x: 100,
        y: 100,
        w: 320,
        h: 240,
    };
    pub const MIN_WIDTH: i32 = 120;
    pub const MIN_HEIGHT: i32 = 90;
    pub const GRIP_SIZE: i32 = 8;
    pub const REFRESH_INTERVAL_MS: u64 = 20;
    pub const CLOSE_BUTTON_SIZE: i32 = 20;
    pub const CLOSE_BUTTON_MARGIN: i32 = 5;
    pub const CORNER_RADIUS: f32 = 10.0;

    /// Checks that the settings describe a usable widget
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_width <= 0 || self.min_height <= 0 {
            return Err(ConfigError::InvalidMinimumSize {
                width: self.min_width,
                height: self.min_height,
            });
        }

        let geometry = self.initial_geometry;
        if geometry.w < self.min_width || geometry.h < self.min_height {
            return Err(ConfigError::InitialSizeBelowMinimum {
                width: geometry.w,
                height: geometry.h,
            });
        }

        // Edge strips need room between the corner squares
        if self.grip_size <= 0 || 2 * self.grip_size >= self.min_width.min(self.min_height) {
            return Err(ConfigError::InvalidGripSize(self.grip_size));
        }

        if self.refresh_interval.is_zero() {
            return Err(ConfigError::ZeroRefreshInterval);
        }

        if self.close_button_size <= 0
            || self.close_button_size + 2 * self.close_button_margin > self.min_width
        {
            return Err(ConfigError::InvalidCloseButton {
                size: self.close_button_size,
                margin: self.close_button_margin,
            });
        }

        Ok(())
    }
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            device_index: Self::DEFAULT_DEVICE_INDEX,
            initial_geometry: Self::DEFAULT_GEOMETRY,
            min_width: Self::MIN_WIDTH,
            min_height: Self::MIN_HEIGHT,
            grip_size: Self::GRIP_SIZE,
            refresh_interval: Duration::from_millis(Self::REFRESH_INTERVAL_MS),
            close_button_size: Self::CLOSE_BUTTON_SIZE,
            close_button_margin: Self::CLOSE_BUTTON_MARGIN,
            corner_radius: Self::CORNER_RADIUS,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Minimum size must be positive, got {width}x{height}")]
    InvalidMinimumSize { width: i32, height: i32 },

    #[error("Initial size {width}x{height} is below the minimum size")]
    InitialSizeBelowMinimum { width: i32, height: i32 },

    #[error("Grip size {0} does not fit the minimum widget size")]
    InvalidGripSize(i32),

    #[error("Refresh interval must be greater than zero")]
    ZeroRefreshInterval,

    #[error("Close button of size {size} with margin {margin} does not fit the widget")]
    InvalidCloseButton { size: i32, margin: i32 },
}
