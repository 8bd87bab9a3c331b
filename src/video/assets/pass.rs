//! A render pass binds a fixed set of targets. Changing any target means creating
//! a new pass.

use smallvec::SmallVec;

use crate::math::Color;

use super::texture::TextureHandle;

impl_handle!(RenderPassHandle);

/// A color target of a render pass.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum RenderTarget {
    /// The default framebuffer of the window.
    Backbuffer,
    Texture(TextureHandle),
}

impl Default for RenderTarget {
    fn default() -> Self {
        RenderTarget::Backbuffer
    }
}

impl From<Option<TextureHandle>> for RenderTarget {
    fn from(v: Option<TextureHandle>) -> Self {
        match v {
            Some(texture) => RenderTarget::Texture(texture),
            None => RenderTarget::Backbuffer,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderPassParams {
    pub colors: SmallVec<[RenderTarget; 4]>,
    /// Ignored by passes that render into the backbuffer.
    pub depth_stencil: Option<TextureHandle>,
    pub clear: bool,
    pub clear_color: Color,
}

impl Default for RenderPassParams {
    fn default() -> Self {
        let mut colors = SmallVec::new();
        colors.push(RenderTarget::Backbuffer);

        RenderPassParams {
            colors,
            depth_stencil: None,
            clear: false,
            clear_color: Color::black(),
        }
    }
}

impl RenderPassParams {
    /// Returns true if this pass renders into the window.
    #[inline]
    pub fn is_backbuffer(&self) -> bool {
        self.colors.len() == 1 && self.colors[0] == RenderTarget::Backbuffer
    }
}
