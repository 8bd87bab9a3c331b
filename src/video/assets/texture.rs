//! Textures, which are sampled by shaders or rendered into as pass targets.

use crate::math::Vector2;

impl_handle!(TextureHandle);

backend_enum! {
    pub enum TextureType {
        Texture2D,
    }
}

backend_enum! {
    pub enum TextureFormat {
        R8,
        RGBA8,
        D24S8,
    }
}

impl TextureFormat {
    #[inline]
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            TextureFormat::R8 => 1,
            TextureFormat::RGBA8 => 4,
            TextureFormat::D24S8 => 4,
        }
    }

    #[inline]
    pub fn is_depth(self) -> bool {
        self == TextureFormat::D24S8
    }
}

/// The parameters of a texture object.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TextureParams {
    pub typ: TextureType,
    pub format: TextureFormat,
    pub dimensions: Vector2<u32>,
}

impl Default for TextureParams {
    fn default() -> Self {
        TextureParams {
            typ: TextureType::Texture2D,
            format: TextureFormat::RGBA8,
            dimensions: Vector2::new(0, 0),
        }
    }
}

impl TextureParams {
    pub fn new(format: TextureFormat, w: u32, h: u32) -> Self {
        TextureParams {
            format,
            dimensions: Vector2::new(w, h),
            ..Default::default()
        }
    }

    /// Size in bytes of the whole image.
    #[inline]
    pub fn bytes(&self) -> usize {
        self.format.bytes_per_pixel() * self.dimensions.x as usize * self.dimensions.y as usize
    }
}
