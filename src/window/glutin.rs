use std::cell::{Cell, RefCell};
use std::os::raw::c_void;

use gl;
use glutin;
use glutin::GlContext;

use crate::errors::*;
use crate::math::Vector2;

use super::{Window, WindowParams};

enum Surface {
    /// A window with a current GL context.
    Gl(glutin::GlWindow),
    /// A bare window, for backends that manage their own swap chain.
    Plain(glutin::Window),
}

pub struct GlutinWindow {
    surface: Surface,
    events_loop: RefCell<glutin::EventsLoop>,
    closed: Cell<bool>,
}

impl GlutinWindow {
    fn builder(params: &WindowParams) -> glutin::WindowBuilder {
        glutin::WindowBuilder::new()
            .with_title(params.title.clone())
            .with_dimensions(glutin::dpi::LogicalSize::new(
                f64::from(params.size.x),
                f64::from(params.size.y),
            ))
    }

    /// Creates a window with an OpenGL context, and loads the GL function pointers.
    pub fn gl(params: &WindowParams) -> Result<Self> {
        let context = glutin::ContextBuilder::new()
            .with_multisampling(params.multisample)
            .with_gl_profile(glutin::GlProfile::Core)
            .with_gl(glutin::GlRequest::Latest)
            .with_vsync(params.vsync);

        let events_loop = glutin::EventsLoop::new();
        let window = glutin::GlWindow::new(Self::builder(params), context, &events_loop)
            .map_err(|err| format_err!("{}", err))?;

        unsafe {
            window.make_current().map_err(|err| format_err!("{}", err))?;
            gl::load_with(|symbol| window.get_proc_address(symbol) as *const _);
        }

        Ok(GlutinWindow {
            surface: Surface::Gl(window),
            events_loop: RefCell::new(events_loop),
            closed: Cell::new(false),
        })
    }

    /// Creates a window without any graphics context.
    pub fn plain(params: &WindowParams) -> Result<Self> {
        let events_loop = glutin::EventsLoop::new();
        let window = Self::builder(params)
            .build(&events_loop)
            .map_err(|err| format_err!("{}", err))?;

        Ok(GlutinWindow {
            surface: Surface::Plain(window),
            events_loop: RefCell::new(events_loop),
            closed: Cell::new(false),
        })
    }

    fn window(&self) -> &glutin::Window {
        match self.surface {
            Surface::Gl(ref v) => v.window(),
            Surface::Plain(ref v) => v,
        }
    }
}

impl Window for GlutinWindow {
    fn poll_events(&self) -> bool {
        let mut closed = self.closed.get();
        self.events_loop.borrow_mut().poll_events(|v| {
            if let glutin::Event::WindowEvent {
                event: glutin::WindowEvent::CloseRequested,
                ..
            } = v
            {
                closed = true;
            }
        });

        self.closed.set(closed);
        !closed
    }

    fn dimensions(&self) -> Vector2<u32> {
        let window = self.window();
        let dpr = window.get_hidpi_factor();
        match window.get_inner_size() {
            Some(size) => {
                let size = size.to_physical(dpr);
                Vector2::new(size.width as u32, size.height as u32)
            }
            None => Vector2::new(0, 0),
        }
    }

    fn resize(&self, dimensions: Vector2<u32>) {
        let size = glutin::dpi::PhysicalSize::new(f64::from(dimensions.x), f64::from(dimensions.y));
        if let Surface::Gl(ref window) = self.surface {
            window.resize(size);
        }
    }

    fn swap_buffers(&self) -> Result<()> {
        if let Surface::Gl(ref window) = self.surface {
            window
                .swap_buffers()
                .map_err(|err| format_err!("{}", err))?;
        }

        Ok(())
    }

    fn get_proc_address(&self, symbol: &str) -> *const c_void {
        match self.surface {
            Surface::Gl(ref window) => window.get_proc_address(symbol) as *const c_void,
            Surface::Plain(_) => ::std::ptr::null(),
        }
    }

    #[cfg(windows)]
    fn native_handle(&self) -> *mut c_void {
        use glutin::os::windows::WindowExt;
        self.window().get_hwnd() as *mut c_void
    }
}
