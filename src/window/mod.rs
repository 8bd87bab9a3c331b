//! Represents the native window that a render backend presents into.

mod headless;
pub use self::headless::HeadlessWindow;

#[cfg(not(target_arch = "wasm32"))]
mod glutin;
#[cfg(not(target_arch = "wasm32"))]
pub use self::glutin::GlutinWindow;

use std::os::raw::c_void;
use std::ptr;

use crate::errors::*;
use crate::math::Vector2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowParams {
    /// Sets the title of window.
    pub title: String,
    /// Sets the size in *points* of the client area of the window.
    pub size: Vector2<u32>,
    /// Sets the multisampling level to request. A value of 0 indicates that
    /// multisampling must not be enabled.
    pub multisample: u16,
    /// Specifies whether should we have vsync.
    pub vsync: bool,
}

impl Default for WindowParams {
    fn default() -> Self {
        WindowParams {
            title: "Window".to_owned(),
            size: Vector2::new(640, 320),
            multisample: 2,
            vsync: false,
        }
    }
}

/// The platform services a render backend relies on.
pub trait Window {
    /// The dimensions of the client area in pixels.
    fn dimensions(&self) -> Vector2<u32>;

    fn resize(&self, dimensions: Vector2<u32>);

    /// Pumps pending platform events. Returns false once the window was asked to
    /// close.
    fn poll_events(&self) -> bool {
        true
    }

    /// Presents the default framebuffer. Only meaningful for GL contexts.
    fn swap_buffers(&self) -> Result<()>;

    /// Resolves a GL function pointer of the current context.
    fn get_proc_address(&self, _: &str) -> *const c_void {
        ptr::null()
    }

    /// The native window handle (a `HWND` on windows), or null.
    fn native_handle(&self) -> *mut c_void {
        ptr::null_mut()
    }

    /// Terminates the application after a failure that can not be recovered from,
    /// like a backend refusing to create a resource.
    fn fatal_error(&self, msg: &str) -> ! {
        error!("{}", msg);
        panic!("{}", msg);
    }
}
