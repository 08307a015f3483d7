//! General Windows platform utilities
//!
//! Small conversions between Win32 message parameters and domain types.

use windows::Win32::Foundation::{HWND, LPARAM, POINT};
use windows::Win32::Graphics::Gdi::ClientToScreen;
use windows::Win32::UI::WindowsAndMessaging::{
    GetCursorPos, IDC_ARROW, IDC_SIZENESW, IDC_SIZENS, IDC_SIZENWSE, IDC_SIZEWE, LoadCursorW,
    SetCursor,
};
use windows::core::PCWSTR;

use crate::domain::core::Point;
use crate::domain::hit_zone::CursorShape;

/// Decodes the signed x/y pair packed into a mouse message's LPARAM
///
/// Coordinates are 16-bit signed values; on multi-monitor setups they can be
/// negative, so the words must be sign extended.
pub fn point_from_lparam(lparam: LPARAM) -> Point {
    let raw = lparam.0 as u32;
    Point::new((raw & 0xFFFF) as u16 as i16 as i32, (raw >> 16) as u16 as i16 as i32)
}

/// Keyboard-invoked context menus (Shift+F10, menu key) carry (-1, -1)
pub fn is_keyboard_invocation(point: Point) -> bool {
    point == Point::new(-1, -1)
}

/// Converts a window-local point to screen coordinates
pub fn client_to_screen(hwnd: HWND, local: Point) -> Point {
    let mut point = POINT {
        x: local.x,
        y: local.y,
    };
    unsafe {
        // On failure the local point is returned unchanged
        let _ = ClientToScreen(hwnd, &mut point);
    }
    Point::new(point.x, point.y)
}

/// Whether a WM_CAPTURECHANGED for `hwnd` means some other window took the
/// mouse. The LPARAM carries the window gaining capture, null when released.
pub fn capture_taken_by_other(hwnd: HWND, new_capture: LPARAM) -> bool {
    new_capture.0 != hwnd.0
}

/// Current pointer position in screen coordinates
pub fn cursor_position() -> Option<Point> {
    let mut point = POINT::default();
    unsafe { GetCursorPos(&mut point).ok()? };
    Some(Point::new(point.x, point.y))
}

/// System cursor resource for a cursor shape
pub fn cursor_resource(shape: CursorShape) -> PCWSTR {
    match shape {
        CursorShape::Arrow => IDC_ARROW,
        CursorShape::ResizeVertical => IDC_SIZENS,
        CursorShape::ResizeHorizontal => IDC_SIZEWE,
        CursorShape::ResizeDiagonalNwSe => IDC_SIZENWSE,
        CursorShape::ResizeDiagonalNeSw => IDC_SIZENESW,
    }
}

/// Loads and applies a system cursor
pub fn apply_cursor(shape: CursorShape) {
    match unsafe { LoadCursorW(None, cursor_resource(shape)) } {
        Ok(cursor) => unsafe {
            SetCursor(cursor);
        },
        Err(err) => log::debug!("Failed to load cursor {shape:?}: {err}"),
    }
}

/// Copies premultiplied RGBA pixels into a BGRA DIB buffer
pub fn copy_rgba_to_bgra(src: &[u8], dst: &mut [u8]) {
    for (from, to) in src.chunks_exact(4).zip(dst.chunks_exact_mut(4)) {
        to[0] = from[2];
        to[1] = from[1];
        to[2] = from[0];
        to[3] = from[3];
    }
}
