use gl;
use gl::types::*;

use super::super::super::assets::prelude::*;

impl From<BufferType> for GLenum {
    fn from(typ: BufferType) -> Self {
        match typ {
            BufferType::Vertex => gl::ARRAY_BUFFER,
            BufferType::Element => gl::ELEMENT_ARRAY_BUFFER,
            BufferType::Uniform => gl::UNIFORM_BUFFER,
        }
    }
}

impl From<BufferUsage> for GLenum {
    fn from(usage: BufferUsage) -> Self {
        match usage {
            BufferUsage::Static => gl::STATIC_DRAW,
            BufferUsage::Dynamic => gl::DYNAMIC_DRAW,
            BufferUsage::Stream => gl::STREAM_DRAW,
        }
    }
}

impl From<ElementType> for GLenum {
    fn from(typ: ElementType) -> Self {
        match typ {
            ElementType::UnsignedShort => gl::UNSIGNED_SHORT,
            ElementType::UnsignedInt => gl::UNSIGNED_INT,
        }
    }
}

impl From<SamplerFilter> for GLenum {
    fn from(filter: SamplerFilter) -> Self {
        match filter {
            SamplerFilter::Nearest => gl::NEAREST,
            SamplerFilter::Linear => gl::LINEAR,
        }
    }
}

impl From<SamplerWrap> for GLenum {
    fn from(wrap: SamplerWrap) -> Self {
        match wrap {
            SamplerWrap::Repeat => gl::REPEAT,
            SamplerWrap::Clamp => gl::CLAMP_TO_EDGE,
        }
    }
}

impl From<TextureType> for GLenum {
    fn from(typ: TextureType) -> Self {
        match typ {
            TextureType::Texture2D => gl::TEXTURE_2D,
        }
    }
}

/// Internal format, pixel format and component type of a texture format.
impl From<TextureFormat> for (GLenum, GLenum, GLenum) {
    fn from(format: TextureFormat) -> Self {
        match format {
            TextureFormat::R8 => (gl::R8, gl::RED, gl::UNSIGNED_BYTE),
            TextureFormat::RGBA8 => (gl::RGBA8, gl::RGBA, gl::UNSIGNED_BYTE),
            TextureFormat::D24S8 => (
                gl::DEPTH24_STENCIL8,
                gl::DEPTH_STENCIL,
                gl::UNSIGNED_INT_24_8,
            ),
        }
    }
}

impl From<DrawMode> for GLenum {
    fn from(mode: DrawMode) -> Self {
        match mode {
            DrawMode::Points => gl::POINTS,
            DrawMode::Lines => gl::LINES,
            DrawMode::LineStrip => gl::LINE_STRIP,
            DrawMode::Triangles => gl::TRIANGLES,
            DrawMode::TriangleStrip => gl::TRIANGLE_STRIP,
        }
    }
}

/// `gl::NONE` disables face culling.
impl From<CullFace> for GLenum {
    fn from(face: CullFace) -> Self {
        match face {
            CullFace::None => gl::NONE,
            CullFace::Front => gl::FRONT,
            CullFace::Back => gl::BACK,
        }
    }
}

impl From<DepthOp> for GLenum {
    fn from(op: DepthOp) -> Self {
        match op {
            DepthOp::Never => gl::NEVER,
            DepthOp::Equal => gl::EQUAL,
            DepthOp::NotEqual => gl::NOTEQUAL,
            DepthOp::Less => gl::LESS,
            DepthOp::LessEqual => gl::LEQUAL,
            DepthOp::Greater => gl::GREATER,
            DepthOp::GreaterEqual => gl::GEQUAL,
            DepthOp::Always => gl::ALWAYS,
        }
    }
}

/// Source and destination factors, `None` disables blending.
pub fn blend_factors(mode: BlendMode) -> Option<(GLenum, GLenum)> {
    match mode {
        BlendMode::None => None,
        BlendMode::Alpha => Some((gl::SRC_ALPHA, gl::ONE_MINUS_SRC_ALPHA)),
        BlendMode::PremultipliedAlpha => Some((gl::ONE, gl::ONE_MINUS_SRC_ALPHA)),
    }
}

/// Component type, component count and normalization of an attribute.
impl From<AttribType> for (GLenum, GLint, GLboolean) {
    fn from(typ: AttribType) -> Self {
        match typ {
            AttribType::UByte4 => (gl::UNSIGNED_BYTE, 4, gl::TRUE),
            AttribType::Float1 => (gl::FLOAT, 1, gl::FALSE),
            AttribType::Float2 => (gl::FLOAT, 2, gl::FALSE),
            AttribType::Float3 => (gl::FLOAT, 3, gl::FALSE),
            AttribType::Float4 => (gl::FLOAT, 4, gl::FALSE),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashSet;

    fn distinct<T: Copy, V: Eq + ::std::hash::Hash>(variants: &[T], map: impl Fn(T) -> V) {
        let values: HashSet<V> = variants.iter().map(|v| map(*v)).collect();
        assert_eq!(values.len(), variants.len());
    }

    #[test]
    fn every_variant_is_mapped() {
        distinct(BufferType::VARIANTS, GLenum::from);
        distinct(BufferUsage::VARIANTS, GLenum::from);
        distinct(ElementType::VARIANTS, GLenum::from);
        distinct(SamplerFilter::VARIANTS, GLenum::from);
        distinct(SamplerWrap::VARIANTS, GLenum::from);
        distinct(TextureType::VARIANTS, GLenum::from);
        distinct(TextureFormat::VARIANTS, <(GLenum, GLenum, GLenum)>::from);
        distinct(DrawMode::VARIANTS, GLenum::from);
        distinct(CullFace::VARIANTS, GLenum::from);
        distinct(DepthOp::VARIANTS, GLenum::from);
        distinct(BlendMode::VARIANTS, blend_factors);
        distinct(AttribType::VARIANTS, <(GLenum, GLint, GLboolean)>::from);
    }

    #[test]
    fn blending() {
        assert_eq!(blend_factors(BlendMode::None), None);
        assert_eq!(
            blend_factors(BlendMode::Alpha),
            Some((gl::SRC_ALPHA, gl::ONE_MINUS_SRC_ALPHA))
        );
    }
}
