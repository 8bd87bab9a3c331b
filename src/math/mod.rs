//! Math types shared by the renderer. Vectors and matrices come from `cgmath`.

pub use cgmath::*;

pub mod color;
pub use self::color::Color;

pub mod rect;
pub use self::rect::Rect;

/// Builds the default 2D projection for a surface of `w` by `h` pixels, with the
/// origin at the top-left corner and y growing downwards.
#[inline]
pub fn screen_ortho(w: f32, h: f32) -> Matrix4<f32> {
    ortho(0.0, w, h, 0.0, -1.0, 1.0)
}
