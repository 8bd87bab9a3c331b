//! Textured quads, optionally clipped, scaled and rotated, and a batching mode
//! that appends many quads of one texture to a single draw.

use crate::math::{Color, Matrix4, Rad, Rect, Vector2, Vector3, Vector4};
use crate::video::assets::prelude::{DrawMode, TextureHandle};
use crate::video::errors::*;

use super::ImmContext;

/// A sub-rect of a texture in pixels.
pub type ImmClip = Rect;

/// The corners and texture coordinates of a textured quad.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Quad {
    pub bl: Vector2<f32>,
    pub tl: Vector2<f32>,
    pub tr: Vector2<f32>,
    pub br: Vector2<f32>,
    /// Texture coordinates of the top-left corner.
    pub st1: Vector2<f32>,
    /// Texture coordinates of the bottom-right corner.
    pub st2: Vector2<f32>,
}

impl Quad {
    /// Builds the quad of a `size` texture, centered at `(x, y)`.
    pub fn new(size: Vector2<f32>, x: f32, y: f32, clip: Option<ImmClip>) -> Self {
        Quad::with_transform(size, x, y, 1.0, 1.0, 0.0, None, clip)
    }

    /// Builds the quad of a `size` texture, scaled and rotated by `angle` radians
    /// around its anchor, with the anchor placed at `(x, y)`. The anchor is a
    /// fraction of the clip size and defaults to its center.
    pub fn with_transform(
        size: Vector2<f32>,
        x: f32,
        y: f32,
        sx: f32,
        sy: f32,
        angle: f32,
        anchor: Option<Vector2<f32>>,
        clip: Option<ImmClip>,
    ) -> Self {
        let clip = clip.unwrap_or_else(|| Rect::from_size(size.x, size.y));
        let anchor = anchor.unwrap_or_else(|| Vector2::new(0.5, 0.5));
        let (ax, ay) = (anchor.x * clip.w, anchor.y * clip.h);

        let transform = Matrix4::from_translation(Vector3::new(x, y, 0.0))
            * Matrix4::from_nonuniform_scale(sx, sy, 1.0)
            * Matrix4::from_angle_z(Rad(angle))
            * Matrix4::from_translation(Vector3::new(-x, -y, 0.0))
            * Matrix4::from_translation(Vector3::new(x - ax, y - ay, 0.0));

        let corner = |cx: f32, cy: f32| {
            let v = transform * Vector4::new(cx, cy, 0.0, 1.0);
            Vector2::new(v.x, v.y)
        };

        Quad {
            bl: corner(0.0, clip.h),
            tl: corner(0.0, 0.0),
            tr: corner(clip.w, 0.0),
            br: corner(clip.w, clip.h),
            st1: Vector2::new(clip.x / size.x, clip.y / size.y),
            st2: Vector2::new(clip.right() / size.x, clip.bottom() / size.y),
        }
    }
}

impl ImmContext {
    fn texture_size(&self, texture: TextureHandle) -> Result<Vector2<f32>> {
        self.device
            .get_texture_size(texture)
            .map(|v| Vector2::new(v.x as f32, v.y as f32))
            .ok_or_else(|| Error::TextureHandleInvalid(texture))
    }

    fn textured(&mut self, v: Vector2<f32>, s: f32, t: f32, color: Color) -> Result<()> {
        self.imm_position(v.x, v.y, 0.0, 1.0)?;
        self.imm_texcoord(s, t, 0.0, 0.0)?;
        self.imm_color(color.r, color.g, color.b, color.a)
    }

    fn quad_strip(&mut self, texture: TextureHandle, quad: &Quad, color: Color) -> Result<()> {
        let (st1, st2) = (quad.st1, quad.st2);

        self.imm_set_texture(Some(texture), 0)?;
        self.draw_with(DrawMode::TriangleStrip, |imm| {
            imm.textured(quad.bl, st1.x, st2.y, color)?;
            imm.textured(quad.tl, st1.x, st1.y, color)?;
            imm.textured(quad.br, st2.x, st2.y, color)?;
            imm.textured(quad.tr, st2.x, st1.y, color)
        })
    }

    /// Appends the six vertices of `quad`, or nothing if they do not fit. The
    /// batch stays open either way.
    fn quad_batched(&mut self, quad: &Quad, color: Color) -> Result<()> {
        self.reserve(6)?;

        let (st1, st2) = (quad.st1, quad.st2);

        self.textured(quad.bl, st1.x, st2.y, color)?;
        self.textured(quad.tl, st1.x, st1.y, color)?;
        self.textured(quad.tr, st2.x, st1.y, color)?;
        self.textured(quad.tr, st2.x, st1.y, color)?;
        self.textured(quad.br, st2.x, st2.y, color)?;
        self.textured(quad.bl, st1.x, st2.y, color)
    }

    /// Draws `texture`, or the `clip` part of it, centered at `(x, y)`.
    pub fn imm_texture(
        &mut self,
        texture: TextureHandle,
        x: f32,
        y: f32,
        clip: Option<ImmClip>,
        color: Color,
    ) -> Result<()> {
        let quad = Quad::new(self.texture_size(texture)?, x, y, clip);
        self.quad_strip(texture, &quad, color)
    }

    /// Draws `texture` scaled and rotated around its anchor. The transform is
    /// applied to the vertices on the CPU, so the current model matrix still
    /// applies on top of it.
    pub fn imm_texture_ex(
        &mut self,
        texture: TextureHandle,
        x: f32,
        y: f32,
        sx: f32,
        sy: f32,
        angle: f32,
        anchor: Option<Vector2<f32>>,
        clip: Option<ImmClip>,
        color: Color,
    ) -> Result<()> {
        let size = self.texture_size(texture)?;
        let quad = Quad::with_transform(size, x, y, sx, sy, angle, anchor, clip);
        self.quad_strip(texture, &quad, color)
    }

    /// Opens a draw that `imm_texture_batched` appends quads of `texture` to.
    pub fn imm_begin_texture_batch(&mut self, texture: TextureHandle) -> Result<()> {
        if self.drawing {
            return Err(Error::AlreadyDrawing);
        }

        self.texture_size(texture)?;
        self.imm_set_texture(Some(texture), 0)?;
        self.imm_begin(DrawMode::Triangles)?;
        self.texture_batch = true;
        Ok(())
    }

    pub fn imm_end_texture_batch(&mut self) -> Result<()> {
        if !self.texture_batch {
            return Err(Error::NoTextureBatch);
        }

        self.imm_end()
    }

    fn batch_size(&self) -> Result<Vector2<f32>> {
        match self.textures[0] {
            Some(texture) if self.texture_batch => self.texture_size(texture),
            _ => Err(Error::NoTextureBatch),
        }
    }

    /// Appends a quad to the open texture batch.
    pub fn imm_texture_batched(
        &mut self,
        x: f32,
        y: f32,
        clip: Option<ImmClip>,
        color: Color,
    ) -> Result<()> {
        let quad = Quad::new(self.batch_size()?, x, y, clip);
        self.quad_batched(&quad, color)
    }

    pub fn imm_texture_batched_ex(
        &mut self,
        x: f32,
        y: f32,
        sx: f32,
        sy: f32,
        angle: f32,
        anchor: Option<Vector2<f32>>,
        clip: Option<ImmClip>,
        color: Color,
    ) -> Result<()> {
        let size = self.batch_size()?;
        let quad = Quad::with_transform(size, x, y, sx, sy, angle, anchor, clip);
        self.quad_batched(&quad, color)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn near(a: Vector2<f32>, x: f32, y: f32) -> bool {
        (a.x - x).abs() < 1e-3 && (a.y - y).abs() < 1e-3
    }

    #[test]
    fn centered() {
        let quad = Quad::new(Vector2::new(50.0, 50.0), 100.0, 100.0, None);
        assert!(near(quad.tl, 75.0, 75.0));
        assert!(near(quad.br, 125.0, 125.0));
        assert!(near(quad.st1, 0.0, 0.0));
        assert!(near(quad.st2, 1.0, 1.0));
    }

    #[test]
    fn clipped() {
        let clip = Rect::new(16.0, 0.0, 16.0, 32.0);
        let quad = Quad::new(Vector2::new(64.0, 32.0), 0.0, 0.0, Some(clip));

        assert!(near(quad.tl, -8.0, -16.0));
        assert!(near(quad.br, 8.0, 16.0));
        assert!(near(quad.st1, 0.25, 0.0));
        assert!(near(quad.st2, 0.5, 1.0));
    }

    #[test]
    fn transformed() {
        let size = Vector2::new(20.0, 10.0);

        // Anchored at the top-left corner, scaled twice as large.
        let anchor = Some(Vector2::new(0.0, 0.0));
        let quad = Quad::with_transform(size, 10.0, 10.0, 2.0, 2.0, 0.0, anchor, None);
        assert!(near(quad.tl, 10.0, 10.0));
        assert!(near(quad.br, 50.0, 30.0));

        // A quarter turn around the center.
        let angle = ::std::f32::consts::FRAC_PI_2;
        let quad = Quad::with_transform(size, 0.0, 0.0, 1.0, 1.0, angle, None, None);
        assert!(near(quad.tl, 5.0, -10.0));
        assert!(near(quad.br, -5.0, 10.0));
    }
}
