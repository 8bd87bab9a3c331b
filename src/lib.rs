//! # What is This?
//!
//! `pastel` is a small 2D renderer. A backend-agnostic `Device` describes buffers,
//! shaders, samplers, textures, render passes and pipelines with plain descriptors,
//! and hands them to one of several swappable backends (OpenGL, Direct3D 11, or a
//! headless one for tests). On top of it sits an immediate-mode drawing layer that
//! batches vertex data, lazily rebuilds passes and pipelines only when their state
//! changes, and exposes a handful of 2D primitive and sprite helpers.
//!
//! ```rust,ignore
//! let mut imm = pastel::application::launch(settings)?;
//!
//! imm.begin_frame()?;
//! imm.imm_clear(Color::black())?;
//! imm.imm_rect_filled(10.0, 10.0, 64.0, 32.0, Color::red())?;
//! imm.end_frame()?;
//! ```

#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;
#[macro_use]
extern crate serde;

extern crate bytemuck;
extern crate cgmath;
extern crate serde_json;
extern crate smallvec;

#[cfg(not(target_arch = "wasm32"))]
extern crate gl;
#[cfg(not(target_arch = "wasm32"))]
extern crate glutin;
#[cfg(windows)]
extern crate winapi;

#[macro_use]
pub mod utils;
pub mod errors;
pub mod math;

pub mod application;
#[macro_use]
pub mod video;
pub mod imm;
pub mod post_process;
pub mod window;

pub mod prelude;
