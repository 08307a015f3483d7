//! Layered widget window
//!
//! A frameless, always-on-top popup with per-pixel alpha. Composed surfaces
//! are pushed with `UpdateLayeredWindow`, so the rounded corners are truly
//! transparent. The window procedure translates Win32 mouse, timer and close
//! messages into `HostEvent`s and hands them to the controller one at a time.
//!
//! `TrackPopupMenu` runs a nested message loop while the controller is still
//! borrowed. Events that arrive during that loop find the controller busy and
//! are dropped.

#![allow(unsafe_op_in_unsafe_fn)]

use std::cell::{Cell, RefCell};
use std::ffi::c_void;
use std::sync::OnceLock;

use windows::Win32::Foundation::{COLORREF, HINSTANCE, HWND, LPARAM, LRESULT, POINT, SIZE, WPARAM};
use windows::Win32::Graphics::Gdi::{
    AC_SRC_ALPHA, AC_SRC_OVER, BI_RGB, BITMAPINFO, BITMAPINFOHEADER, BLENDFUNCTION,
    CreateCompatibleDC, CreateDIBSection, DIB_RGB_COLORS, DeleteDC, DeleteObject, GetDC, HDC,
    HGDIOBJ, ReleaseDC, SelectObject,
};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    ReleaseCapture, SetCapture, TME_LEAVE, TRACKMOUSEEVENT, TrackMouseEvent,
};
use windows::Win32::UI::WindowsAndMessaging::{
    AppendMenuW, CreatePopupMenu, CreateWindowExW, DefWindowProcW, DestroyMenu, DestroyWindow,
    DispatchMessageW, GWLP_USERDATA, GetMessageW, GetWindowLongPtrW, KillTimer, MF_STRING, MSG,
    PostMessageW, PostQuitMessage, RegisterClassW, SW_SHOW, SWP_NOACTIVATE, SWP_NOZORDER,
    SetForegroundWindow, SetTimer, SetWindowLongPtrW, SetWindowPos, ShowWindow, TPM_NONOTIFY,
    TPM_RETURNCMD, TPM_RIGHTBUTTON, TrackPopupMenu, TranslateMessage, ULW_ALPHA,
    UpdateLayeredWindow, WM_CAPTURECHANGED, WM_CLOSE, WM_CONTEXTMENU, WM_DESTROY, WM_LBUTTONDOWN,
    WM_LBUTTONUP, WM_MBUTTONDOWN, WM_MBUTTONUP, WM_MOUSELEAVE, WM_MOUSEMOVE, WM_NULL,
    WM_RBUTTONDOWN, WM_RBUTTONUP, WM_TIMER, WNDCLASSW,
    WS_EX_LAYERED, WS_EX_TOOLWINDOW, WS_EX_TOPMOST, WS_POPUP,
};
use windows::core::{PCWSTR, w};

use crate::app::host::{HostEvent, MenuCommand, WidgetHost};
use crate::app::WidgetController;
use crate::capture::CameraDevice;
use crate::config::WidgetConfig;
use crate::domain::core::{Point, Rect};
use crate::domain::hit_zone::CursorShape;
use crate::domain::interaction::{PointerButton, PointerEvent};
use crate::platform::windows::{
    apply_cursor, capture_taken_by_other, client_to_screen, copy_rgba_to_bgra, cursor_position,
    is_keyboard_invocation, point_from_lparam,
};

const WINDOW_CLASS: PCWSTR = w!("PinnedCameraWidget");
const FRAME_TIMER_ID: usize = 1;
const MENU_CLOSE_ID: usize = 100;

/// Window errors
#[derive(Debug, thiserror::Error)]
pub enum WindowError {
    #[error("Failed to register widget window class")]
    ClassRegistrationFailed,

    #[error("Failed to create widget window")]
    CreationFailed,

    #[error("Failed to start the frame timer")]
    TimerFailed,

    #[error("Failed to position widget window: {0}")]
    PositionFailed(String),

    #[error("Failed to get screen device context")]
    DeviceContextFailed,

    #[error("Failed to create memory device context")]
    MemoryDeviceContextFailed,

    #[error("Failed to create DIB section")]
    DibSectionCreationFailed,

    #[error("Failed to select bitmap into device context")]
    BitmapSelectionFailed,

    #[error("Failed to update layered window")]
    LayerUpdateFailed,

    #[error("Windows API error: {0}")]
    Win32Error(String),
}

/// Win32 host of the widget
pub struct WidgetWindow {
    hwnd: HWND,
}

impl WidgetWindow {
    /// Creates the hidden layered popup at the configured geometry
    pub fn create(config: &WidgetConfig) -> Result<Self, WindowError> {
        let module = unsafe { GetModuleHandleW(None) }
            .map_err(|err| WindowError::Win32Error(err.to_string()))?;
        let instance: HINSTANCE = module.into();

        register_window_class(instance)?;

        let rect = config.initial_geometry;
        let hwnd = unsafe {
            CreateWindowExW(
                WS_EX_LAYERED | WS_EX_TOPMOST | WS_EX_TOOLWINDOW,
                WINDOW_CLASS,
                w!("Pinned Camera"),
                WS_POPUP,
                rect.x,
                rect.y,
                rect.w,
                rect.h,
                None,
                None,
                instance,
                None,
            )
        };

        if hwnd.0 == 0 {
            return Err(WindowError::CreationFailed);
        }

        log::debug!("Created widget window {hwnd:?}");
        Ok(Self { hwnd })
    }

    pub fn hwnd(&self) -> HWND {
        self.hwnd
    }

    fn is_alive(&self) -> bool {
        self.hwnd.0 != 0
    }

    /// Pushes a premultiplied RGBA surface to the layered window at `geometry`
    fn present_pixmap(
        &self,
        pixmap: &tiny_skia::Pixmap,
        geometry: Rect,
    ) -> Result<(), WindowError> {
        let size = SIZE {
            cx: pixmap.width() as i32,
            cy: pixmap.height() as i32,
        };

        let screen = ScreenDc::acquire()?;
        let memory = MemoryDc::compatible_with(&screen)?;
        let (bitmap, pixels) = DibSection::top_down(&memory, size)?;
        copy_rgba_to_bgra(pixmap.data(), pixels);
        let _selected = memory.select(&bitmap)?;

        let dst_point = POINT {
            x: geometry.x,
            y: geometry.y,
        };
        let src_point = POINT { x: 0, y: 0 };
        let blend = BLENDFUNCTION {
            BlendOp: AC_SRC_OVER as u8,
            BlendFlags: 0,
            SourceConstantAlpha: 255,
            AlphaFormat: AC_SRC_ALPHA as u8,
        };

        unsafe {
            UpdateLayeredWindow(
                self.hwnd,
                screen.0,
                Some(&dst_point),
                Some(&size),
                memory.0,
                Some(&src_point),
                COLORREF(0),
                Some(&blend),
                ULW_ALPHA,
            )
        }
        .map_err(|_| WindowError::LayerUpdateFailed)
    }
}

/// Screen device context, released on drop
struct ScreenDc(HDC);

impl ScreenDc {
    fn acquire() -> Result<Self, WindowError> {
        let dc = unsafe { GetDC(HWND(0)) };
        if dc.0 == 0 {
            return Err(WindowError::DeviceContextFailed);
        }
        Ok(Self(dc))
    }
}

impl Drop for ScreenDc {
    fn drop(&mut self) {
        unsafe {
            ReleaseDC(HWND(0), self.0);
        }
    }
}

/// Memory device context, deleted on drop
struct MemoryDc(HDC);

impl MemoryDc {
    fn compatible_with(screen: &ScreenDc) -> Result<Self, WindowError> {
        let dc = unsafe { CreateCompatibleDC(screen.0) };
        if dc.0 == 0 {
            return Err(WindowError::MemoryDeviceContextFailed);
        }
        Ok(Self(dc))
    }

    /// Selects a bitmap until the returned guard is dropped
    fn select(&self, bitmap: &DibSection) -> Result<Selection, WindowError> {
        let previous = unsafe { SelectObject(self.0, bitmap.0) };
        if previous.0 == 0 {
            return Err(WindowError::BitmapSelectionFailed);
        }
        Ok(Selection {
            dc: self.0,
            previous,
        })
    }
}

impl Drop for MemoryDc {
    fn drop(&mut self) {
        unsafe {
            DeleteDC(self.0);
        }
    }
}

/// 32-bit top-down DIB section, deleted on drop
struct DibSection(HGDIOBJ);

impl DibSection {
    /// Creates the bitmap and returns it with its writable pixel buffer
    fn top_down<'a>(memory: &MemoryDc, size: SIZE) -> Result<(Self, &'a mut [u8]), WindowError> {
        let mut bitmap_info = BITMAPINFO::default();
        bitmap_info.bmiHeader = BITMAPINFOHEADER {
            biSize: std::mem::size_of::<BITMAPINFOHEADER>() as u32,
            biWidth: size.cx,
            biHeight: -size.cy,
            biPlanes: 1,
            biBitCount: 32,
            biCompression: BI_RGB.0,
            ..Default::default()
        };

        let mut bits: *mut c_void = std::ptr::null_mut();
        let bitmap = unsafe {
            CreateDIBSection(memory.0, &bitmap_info, DIB_RGB_COLORS, &mut bits, None, 0)
        }
        .map_err(|_| WindowError::DibSectionCreationFailed)?;
        let section = Self(bitmap.into());

        if bits.is_null() {
            return Err(WindowError::DibSectionCreationFailed);
        }

        let len = size.cx as usize * size.cy as usize * 4;
        // The buffer lives as long as the section; callers drop it first
        let pixels = unsafe { std::slice::from_raw_parts_mut(bits as *mut u8, len) };
        Ok((section, pixels))
    }
}

impl Drop for DibSection {
    fn drop(&mut self) {
        unsafe {
            DeleteObject(self.0);
        }
    }
}

/// Restores the previously selected object on drop
struct Selection {
    dc: HDC,
    previous: HGDIOBJ,
}

impl Drop for Selection {
    fn drop(&mut self) {
        unsafe {
            SelectObject(self.dc, self.previous);
        }
    }
}

impl WidgetHost for WidgetWindow {
    type Error = WindowError;

    fn set_geometry(&mut self, rect: Rect) -> Result<(), WindowError> {
        unsafe {
            SetWindowPos(
                self.hwnd,
                HWND(0),
                rect.x,
                rect.y,
                rect.w,
                rect.h,
                SWP_NOACTIVATE | SWP_NOZORDER,
            )
        }
        .map_err(|err| WindowError::PositionFailed(err.to_string()))
    }

    fn set_cursor(&mut self, cursor: CursorShape) {
        apply_cursor(cursor);
    }

    fn present(&mut self, surface: &tiny_skia::Pixmap, geometry: Rect) -> Result<(), WindowError> {
        if !self.is_alive() {
            return Ok(());
        }
        self.present_pixmap(surface, geometry)
    }

    fn show_context_menu(&mut self, at: Point) -> Option<MenuCommand> {
        unsafe {
            let menu = match CreatePopupMenu() {
                Ok(menu) => menu,
                Err(err) => {
                    log::warn!("Failed to create context menu: {err}");
                    return None;
                }
            };

            if let Err(err) = AppendMenuW(menu, MF_STRING, MENU_CLOSE_ID, w!("Close")) {
                log::warn!("Failed to populate context menu: {err}");
                let _ = DestroyMenu(menu);
                return None;
            }

            // Without foreground the menu would not dismiss on an outside click
            let _ = SetForegroundWindow(self.hwnd);
            let picked = TrackPopupMenu(
                menu,
                TPM_RETURNCMD | TPM_RIGHTBUTTON | TPM_NONOTIFY,
                at.x,
                at.y,
                0,
                self.hwnd,
                None,
            );
            let _ = PostMessageW(self.hwnd, WM_NULL, WPARAM(0), LPARAM(0));
            let _ = DestroyMenu(menu);

            (picked.0 as usize == MENU_CLOSE_ID).then_some(MenuCommand::Close)
        }
    }

    fn show(&mut self) {
        unsafe {
            ShowWindow(self.hwnd, SW_SHOW);
        }
    }

    fn destroy(&mut self) {
        if !self.is_alive() {
            return;
        }
        let hwnd = std::mem::replace(&mut self.hwnd, HWND(0));
        unsafe {
            let _ = KillTimer(hwnd, FRAME_TIMER_ID);
            if let Err(err) = DestroyWindow(hwnd) {
                log::warn!("Failed to destroy widget window: {err}");
            }
        }
    }
}

/// Type-erased receiver of host events
trait EventSink {
    /// Returns false when the event had to be dropped
    fn deliver(&self, event: HostEvent) -> bool;
}

struct ControllerSink<C: CameraDevice> {
    controller: RefCell<WidgetController<C, WidgetWindow>>,
}

impl<C: CameraDevice> EventSink for ControllerSink<C> {
    fn deliver(&self, event: HostEvent) -> bool {
        match self.controller.try_borrow_mut() {
            Ok(mut controller) => {
                let _ = controller.dispatch(event);
                true
            }
            Err(_) => {
                log::trace!("Dropping {event:?} delivered while the widget is busy");
                false
            }
        }
    }
}

/// Per-window state reachable from the window procedure
struct WindowSlot {
    /// Whether a WM_MOUSELEAVE notification is pending
    tracking_leave: Cell<bool>,
    sink: Box<dyn EventSink>,
}

/// Runs the widget until it is closed
///
/// Attaches the controller to its window, starts the frame timer and pumps
/// messages until the window is destroyed.
pub fn run<C: CameraDevice + 'static>(
    controller: WidgetController<C, WidgetWindow>,
) -> Result<(), WindowError> {
    let hwnd = controller.host().hwnd();
    let interval_ms = controller
        .config()
        .refresh_interval
        .as_millis()
        .clamp(1, u32::MAX as u128) as u32;

    let slot = Box::into_raw(Box::new(WindowSlot {
        tracking_leave: Cell::new(false),
        sink: Box::new(ControllerSink {
            controller: RefCell::new(controller),
        }),
    }));

    unsafe {
        SetWindowLongPtrW(hwnd, GWLP_USERDATA, slot as isize);
    }

    let result = if unsafe { SetTimer(hwnd, FRAME_TIMER_ID, interval_ms, None) } == 0 {
        Err(WindowError::TimerFailed)
    } else {
        log::debug!("Frame timer started at {interval_ms} ms");
        pump_messages();
        Ok(())
    };

    unsafe {
        // Dropping the slot drops the controller, which releases the camera
        // and destroys the window if the loop ended some other way.
        SetWindowLongPtrW(hwnd, GWLP_USERDATA, 0);
        drop(Box::from_raw(slot));
    }

    result
}

fn pump_messages() {
    let mut msg = MSG::default();
    loop {
        let result = unsafe { GetMessageW(&mut msg, None, 0, 0) };
        if result.0 == 0 {
            break; // WM_QUIT
        } else if result.0 == -1 {
            log::error!("GetMessageW failed; leaving the message loop");
            break;
        }

        unsafe {
            TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
    }
}

fn register_window_class(instance: HINSTANCE) -> Result<(), WindowError> {
    static REGISTERED: OnceLock<bool> = OnceLock::new();

    let registered = *REGISTERED.get_or_init(|| {
        // No class cursor: the widget sets its own on every hover move
        let wc = WNDCLASSW {
            lpfnWndProc: Some(widget_window_proc),
            hInstance: instance,
            lpszClassName: WINDOW_CLASS,
            ..Default::default()
        };
        unsafe { RegisterClassW(&wc) != 0 }
    });

    if registered {
        Ok(())
    } else {
        Err(WindowError::ClassRegistrationFailed)
    }
}

unsafe fn window_slot(hwnd: HWND) -> Option<&'static WindowSlot> {
    let ptr = GetWindowLongPtrW(hwnd, GWLP_USERDATA) as *const WindowSlot;
    if ptr.is_null() { None } else { Some(&*ptr) }
}

fn start_leave_tracking(hwnd: HWND) {
    let mut tracking = TRACKMOUSEEVENT {
        cbSize: std::mem::size_of::<TRACKMOUSEEVENT>() as u32,
        dwFlags: TME_LEAVE,
        hwndTrack: hwnd,
        dwHoverTime: 0,
    };
    if let Err(err) = unsafe { TrackMouseEvent(&mut tracking) } {
        log::debug!("TrackMouseEvent failed: {err}");
    }
}

fn pressed(hwnd: HWND, button: PointerButton, lparam: LPARAM) -> HostEvent {
    let local = point_from_lparam(lparam);
    HostEvent::Pointer(PointerEvent::Pressed {
        button,
        local,
        global: client_to_screen(hwnd, local),
    })
}

unsafe extern "system" fn widget_window_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    // Reached synchronously from DestroyWindow while the controller is borrowed
    if msg == WM_DESTROY {
        PostQuitMessage(0);
        return LRESULT(0);
    }

    let Some(slot) = window_slot(hwnd) else {
        return DefWindowProcW(hwnd, msg, wparam, lparam);
    };

    let event = match msg {
        WM_TIMER if wparam.0 == FRAME_TIMER_ID => HostEvent::Tick,
        WM_CLOSE => HostEvent::CloseRequested,
        WM_MOUSEMOVE => {
            if !slot.tracking_leave.get() {
                start_leave_tracking(hwnd);
                slot.tracking_leave.set(true);
                slot.sink.deliver(HostEvent::Pointer(PointerEvent::Entered));
            }
            let local = point_from_lparam(lparam);
            HostEvent::Pointer(PointerEvent::Moved {
                local,
                global: client_to_screen(hwnd, local),
            })
        }
        WM_MOUSELEAVE => {
            slot.tracking_leave.set(false);
            HostEvent::Pointer(PointerEvent::Left)
        }
        WM_LBUTTONDOWN => {
            SetCapture(hwnd);
            pressed(hwnd, PointerButton::Primary, lparam)
        }
        WM_LBUTTONUP => {
            // Deliver the release before ReleaseCapture raises WM_CAPTURECHANGED
            slot.sink.deliver(HostEvent::Pointer(PointerEvent::Released {
                button: PointerButton::Primary,
            }));
            let _ = ReleaseCapture();
            return LRESULT(0);
        }
        WM_CAPTURECHANGED if capture_taken_by_other(hwnd, lparam) => {
            HostEvent::Pointer(PointerEvent::CaptureLost)
        }
        WM_MBUTTONDOWN => pressed(hwnd, PointerButton::Middle, lparam),
        WM_MBUTTONUP => HostEvent::Pointer(PointerEvent::Released {
            button: PointerButton::Middle,
        }),
        WM_RBUTTONDOWN => pressed(hwnd, PointerButton::Secondary, lparam),
        WM_RBUTTONUP => {
            slot.sink.deliver(HostEvent::Pointer(PointerEvent::Released {
                button: PointerButton::Secondary,
            }));
            // Default processing raises WM_CONTEXTMENU
            return DefWindowProcW(hwnd, msg, wparam, lparam);
        }
        WM_CONTEXTMENU => {
            let mut global = point_from_lparam(lparam);
            if is_keyboard_invocation(global) {
                global = cursor_position()
                    .unwrap_or_else(|| client_to_screen(hwnd, Point::default()));
            }
            HostEvent::Pointer(PointerEvent::ContextRequested { global })
        }
        _ => return DefWindowProcW(hwnd, msg, wparam, lparam),
    };

    slot.sink.deliver(event);
    LRESULT(0)
}
