//! Bootstraps the renderer from `Settings`.
//!
//! `launch` creates the window, the backend and the `ImmContext` on top of it.
//! This is the only place where the render system is initialized, and dropping the
//! returned context shuts it down again.
//!
//! # Application
//!
//! For the common case of a single window with a frame loop, `run` drives an
//! `Application` until the window is closed or one of its methods fails.

pub mod settings;
pub use self::settings::Settings;

use std::rc::Rc;

use crate::errors::*;
use crate::imm::ImmContext;
use crate::video::backends::BackendKind;
use crate::video::Device;
use crate::window::{HeadlessWindow, Window};

/// `Application` is a user-friendly facade to building application, which defines a number
/// of event functions that get executed in a pre-determined order.
pub trait Application {
    /// `Application::on_update` is called every frame, between `begin_frame` and
    /// `end_frame`. Its the main workhorse function for frame updates.
    fn on_update(&mut self, imm: &mut ImmContext) -> Result<()>;

    /// `Application::on_exit` is called once the frame loop stopped.
    fn on_exit(&mut self, _: &mut ImmContext) -> Result<()> {
        Ok(())
    }
}

/// Creates the window, the backend of `settings.backend` and an `ImmContext`.
pub fn launch(settings: Settings) -> Result<ImmContext> {
    let window = create_window(&settings)?;
    let device = Device::new(settings.backend, window, settings.video)?;

    info!(
        "Launched {:?} renderer with settings: {:#?}",
        settings.backend, settings
    );

    Ok(ImmContext::new(device, settings.imm))
}

fn create_window(settings: &Settings) -> Result<Rc<dyn Window>> {
    match settings.backend {
        BackendKind::Headless => Ok(Rc::new(HeadlessWindow::new(settings.window.size))),
        #[cfg(not(target_arch = "wasm32"))]
        BackendKind::OpenGL => Ok(Rc::new(crate::window::GlutinWindow::gl(&settings.window)?)),
        #[cfg(not(target_arch = "wasm32"))]
        BackendKind::Direct3D11 => Ok(Rc::new(crate::window::GlutinWindow::plain(
            &settings.window,
        )?)),
        #[cfg(target_arch = "wasm32")]
        v => bail!("{:?} is not supported on this platform.", v),
    }
}

/// Launches the renderer and runs `application` until the window is closed.
pub fn run<T: Application>(settings: Settings, mut application: T) -> Result<()> {
    let mut imm = launch(settings)?;

    while imm.device().window().poll_events() {
        imm.begin_frame()?;
        application.on_update(&mut imm)?;
        imm.end_frame()?;
    }

    application.on_exit(&mut imm)?;
    Ok(())
}
