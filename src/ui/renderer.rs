//! Widget surface rendering
//!
//! Composes the widget surface with tiny-skia: a black rounded backdrop,
//! the latest camera image stretched to fill it, and the close button on
//! top. Layout calculation is kept separate from rasterization so the
//! geometry can be tested without inspecting pixels.

use tiny_skia::{
    Color, FillRule, FilterQuality, Mask, Paint, Path, PathBuilder, Pixmap, PixmapPaint, Stroke,
    Transform,
};

use crate::domain::chrome::CloseButton;
use crate::domain::core::Rect;

/// Rendering errors
#[derive(Debug, thiserror::Error)]
pub enum RendererError {
    #[error("Failed to create pixmap for rendering")]
    PixmapCreationFailed,

    #[error("Invalid surface dimensions: {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },

    #[error("Failed to build clip mask")]
    MaskCreationFailed,
}

/// Pre-calculated close button geometry
#[derive(Debug, Clone, PartialEq)]
pub struct CloseButtonLayout {
    pub center_x: f32,
    pub center_y: f32,
    pub radius: f32,
    /// Half the length of each cross stroke along one axis
    pub cross_half: f32,
    pub fill: Color,
}

/// Pre-calculated layout for one widget frame
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetLayout {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub corner_radius: f32,
    /// Scale applied to the camera image so it fills the canvas
    pub image_scale: Option<(f32, f32)>,
    pub close_button: Option<CloseButtonLayout>,
}

impl WidgetLayout {
    /// Translucent black, as in `rgba(0, 0, 0, 0.5)`
    const BUTTON_IDLE: (u8, u8, u8, u8) = (0, 0, 0, 128);
    /// Translucent red, as in `rgba(255, 0, 0, 0.7)`
    const BUTTON_HOVER: (u8, u8, u8, u8) = (255, 0, 0, 179);

    /// Builds the layout for a widget of `size`
    ///
    /// # Arguments
    /// * `size` - Widget rectangle; only width and height are used
    /// * `image_size` - Dimensions of the current camera image, if any
    /// * `close_button` - Close button state (drawn only when visible)
    /// * `corner_radius` - Radius of the rounded backdrop
    pub fn new(
        size: Rect,
        image_size: Option<(u32, u32)>,
        close_button: &CloseButton,
        corner_radius: f32,
    ) -> Result<Self, RendererError> {
        if size.is_empty() {
            return Err(RendererError::InvalidDimensions {
                width: size.w,
                height: size.h,
            });
        }

        let image_scale = image_size
            .filter(|(w, h)| *w > 0 && *h > 0)
            .map(|(w, h)| (size.w as f32 / w as f32, size.h as f32 / h as f32));

        let close_button = close_button.is_visible().then(|| {
            let rect = close_button.rect();
            let (r, g, b, a) = if close_button.is_hovered() {
                Self::BUTTON_HOVER
            } else {
                Self::BUTTON_IDLE
            };
            CloseButtonLayout {
                center_x: rect.x as f32 + rect.w as f32 / 2.0,
                center_y: rect.y as f32 + rect.h as f32 / 2.0,
                radius: rect.w.min(rect.h) as f32 / 2.0,
                cross_half: rect.w.min(rect.h) as f32 / 5.0,
                fill: Color::from_rgba8(r, g, b, a),
            }
        });

        Ok(Self {
            canvas_width: size.w as u32,
            canvas_height: size.h as u32,
            corner_radius: corner_radius.min(size.w.min(size.h) as f32 / 2.0).max(0.0),
            image_scale,
            close_button,
        })
    }
}

/// Renders widget layouts into premultiplied RGBA pixmaps
#[derive(Debug, Default)]
pub struct WidgetRenderer;

impl WidgetRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Renders a layout, drawing `image` when the layout has an image scale
    pub fn render_layout(
        &self,
        layout: &WidgetLayout,
        image: Option<&Pixmap>,
    ) -> Result<Pixmap, RendererError> {
        let mut pixmap = Pixmap::new(layout.canvas_width, layout.canvas_height)
            .ok_or(RendererError::PixmapCreationFailed)?;
        pixmap.fill(Color::TRANSPARENT);

        let backdrop = rounded_rect_path(
            layout.canvas_width as f32,
            layout.canvas_height as f32,
            layout.corner_radius,
        )
        .ok_or(RendererError::InvalidDimensions {
            width: layout.canvas_width as i32,
            height: layout.canvas_height as i32,
        })?;

        let mut paint = Paint::default();
        paint.set_color(Color::BLACK);
        paint.anti_alias = true;
        pixmap.fill_path(&backdrop, &paint, FillRule::Winding, Transform::identity(), None);

        if let (Some(image), Some((sx, sy))) = (image, layout.image_scale) {
            let mut clip = Mask::new(layout.canvas_width, layout.canvas_height)
                .ok_or(RendererError::MaskCreationFailed)?;
            clip.fill_path(&backdrop, FillRule::Winding, true, Transform::identity());

            let image_paint = PixmapPaint {
                quality: FilterQuality::Bilinear,
                ..PixmapPaint::default()
            };
            pixmap.draw_pixmap(
                0,
                0,
                image.as_ref(),
                &image_paint,
                Transform::from_scale(sx, sy),
                Some(&clip),
            );
        }

        if let Some(button) = &layout.close_button {
            self.render_close_button(&mut pixmap, button);
        }

        Ok(pixmap)
    }

    fn render_close_button(&self, pixmap: &mut Pixmap, button: &CloseButtonLayout) {
        let mut paint = Paint::default();
        paint.anti_alias = true;

        let disc = PathBuilder::from_circle(button.center_x, button.center_y, button.radius);
        if let Some(disc) = disc {
            paint.set_color(button.fill);
            pixmap.fill_path(&disc, &paint, FillRule::Winding, Transform::identity(), None);
        }

        let (cx, cy, d) = (button.center_x, button.center_y, button.cross_half);
        let mut cross = PathBuilder::new();
        cross.move_to(cx - d, cy - d);
        cross.line_to(cx + d, cy + d);
        cross.move_to(cx + d, cy - d);
        cross.line_to(cx - d, cy + d);

        if let Some(path) = cross.finish() {
            paint.set_color(Color::WHITE);
            let stroke = Stroke {
                width: 2.0,
                ..Stroke::default()
            };
            pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        }
    }
}

/// Builds a rounded rectangle covering `(0, 0, width, height)`
fn rounded_rect_path(width: f32, height: f32, radius: f32) -> Option<Path> {
    if radius <= 0.0 {
        return Some(PathBuilder::from_rect(tiny_skia::Rect::from_xywh(
            0.0, 0.0, width, height,
        )?));
    }

    // Cubic approximation of a quarter circle
    let k = radius * 0.552_284_8;
    let (w, h, r) = (width, height, radius);

    let mut pb = PathBuilder::new();
    pb.move_to(r, 0.0);
    pb.line_to(w - r, 0.0);
    pb.cubic_to(w - r + k, 0.0, w, r - k, w, r);
    pb.line_to(w, h - r);
    pb.cubic_to(w, h - r + k, w - r + k, h, w - r, h);
    pb.line_to(r, h);
    pb.cubic_to(r - k, h, 0.0, h - r + k, 0.0, h - r);
    pb.line_to(0.0, r);
    pb.cubic_to(0.0, r - k, r - k, 0.0, r, 0.0);
    pb.close();
    pb.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::core::Point;
    use crate::domain::interaction::PointerEvent;

    fn rgba_at(pixmap: &Pixmap, x: u32, y: u32) -> [u8; 4] {
        let pixel = pixmap.pixel(x, y).unwrap();
        [pixel.red(), pixel.green(), pixel.blue(), pixel.alpha()]
    }

    fn solid_image(width: u32, height: u32, color: Color) -> Pixmap {
        let mut image = Pixmap::new(width, height).unwrap();
        image.fill(color);
        image
    }

    fn visible_button(width: i32, hover_at: Option<Point>) -> CloseButton {
        let mut button = CloseButton::new(width, 20, 5);
        button.on_pointer(&PointerEvent::Entered, true);
        if let Some(local) = hover_at {
            button.on_pointer(
                &PointerEvent::Moved {
                    local,
                    global: local,
                },
                true,
            );
        }
        button
    }

    #[test]
    fn layout_scales_image_to_canvas() {
        let button = CloseButton::new(320, 20, 5);
        let layout =
            WidgetLayout::new(Rect::new(100, 100, 320, 240), Some((640, 480)), &button, 10.0)
                .unwrap();

        assert_eq!(layout.canvas_width, 320);
        assert_eq!(layout.canvas_height, 240);
        assert_eq!(layout.image_scale, Some((0.5, 0.5)));
        assert!(layout.close_button.is_none(), "hidden button has no layout");
    }

    #[test]
    fn layout_places_visible_button() {
        let button = visible_button(320, None);
        let layout = WidgetLayout::new(Rect::new(0, 0, 320, 240), None, &button, 10.0).unwrap();

        let close = layout.close_button.unwrap();
        assert_eq!((close.center_x, close.center_y), (305.0, 15.0));
        assert_eq!(close.radius, 10.0);
        assert_eq!(layout.image_scale, None);
    }

    #[test]
    fn layout_rejects_empty_canvas() {
        let button = CloseButton::new(0, 20, 5);
        let result = WidgetLayout::new(Rect::new(0, 0, 0, 240), None, &button, 10.0);
        assert!(matches!(result, Err(RendererError::InvalidDimensions { .. })));
    }

    #[test]
    fn corners_are_transparent_and_center_is_black() {
        let renderer = WidgetRenderer::new();
        let button = CloseButton::new(320, 20, 5);
        let layout = WidgetLayout::new(Rect::new(0, 0, 320, 240), None, &button, 10.0).unwrap();

        let pixmap = renderer.render_layout(&layout, None).unwrap();
        assert_eq!((pixmap.width(), pixmap.height()), (320, 240));
        assert_eq!(rgba_at(&pixmap, 0, 0)[3], 0);
        assert_eq!(rgba_at(&pixmap, 160, 120), [0, 0, 0, 255]);
    }

    #[test]
    fn image_fills_the_widget() {
        let renderer = WidgetRenderer::new();
        let button = CloseButton::new(320, 20, 5);
        let image = solid_image(4, 3, Color::from_rgba8(0, 0, 255, 255));
        let layout =
            WidgetLayout::new(Rect::new(0, 0, 320, 240), Some((4, 3)), &button, 10.0).unwrap();

        let pixmap = renderer.render_layout(&layout, Some(&image)).unwrap();
        for (x, y) in [(160, 120), (20, 200)] {
            let [r, g, b, a] = rgba_at(&pixmap, x, y);
            assert!(r <= 2 && g <= 2 && b >= 253 && a == 255, "({x}, {y}) = {r} {g} {b} {a}");
        }
        assert_eq!(rgba_at(&pixmap, 0, 0)[3], 0, "image is clipped to the rounded corners");
    }

    #[test]
    fn close_button_darkens_then_highlights() {
        let renderer = WidgetRenderer::new();
        let image = solid_image(2, 2, Color::WHITE);

        let idle = visible_button(320, None);
        let layout =
            WidgetLayout::new(Rect::new(0, 0, 320, 240), Some((2, 2)), &idle, 10.0).unwrap();
        let pixmap = renderer.render_layout(&layout, Some(&image)).unwrap();
        // Left of the cross, inside the disc
        let [r, g, b, a] = rgba_at(&pixmap, 298, 15);
        assert_eq!(a, 255);
        assert!(r < 200 && g < 200 && b < 200, "idle button darkens: {r} {g} {b}");

        let hovered = visible_button(320, Some(Point::new(305, 15)));
        let layout =
            WidgetLayout::new(Rect::new(0, 0, 320, 240), Some((2, 2)), &hovered, 10.0).unwrap();
        let pixmap = renderer.render_layout(&layout, Some(&image)).unwrap();
        let [r, g, b, _] = rgba_at(&pixmap, 298, 15);
        assert!(r > 200 && g < 150 && b < 150, "hovered button is red: {r} {g} {b}");
    }
}
