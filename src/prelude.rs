//! Commonly used types, re-exported for convenience.

pub use crate::application::{self, Application, Settings};
pub use crate::errors::Result;
pub use crate::imm::{ImmClip, ImmContext, ImmParams, ImmSampler, ImmStats};
pub use crate::math::{Color, Matrix4, Rect, Vector2};
pub use crate::post_process::{PostEffect, PostProcessStack};
pub use crate::video::prelude::*;
pub use crate::window::{HeadlessWindow, Window, WindowParams};
