//! Pipeline state object that containing immutable render state and vertex-layout.

use smallvec::SmallVec;

use crate::video::MAX_VERTEX_ATTRIBS;

use super::pass::RenderPassHandle;
use super::shader::ShaderHandle;

impl_handle!(RenderPipelineHandle);

backend_enum! {
    /// Primitive topology.
    pub enum DrawMode {
        Points,
        Lines,
        LineStrip,
        Triangles,
        TriangleStrip,
    }
}

backend_enum! {
    pub enum BlendMode {
        None,
        /// Source-over blending, `src * a + dst * (1 - a)`.
        Alpha,
        /// Source-over blending with colors already multiplied by alpha.
        PremultipliedAlpha,
    }
}

backend_enum! {
    /// Specify whether front- or back-facing polygons can be culled.
    pub enum CullFace {
        None,
        Front,
        Back,
    }
}

backend_enum! {
    /// A pixel-wise depth comparison function.
    pub enum DepthOp {
        Never,
        Equal,
        NotEqual,
        Less,
        LessEqual,
        Greater,
        GreaterEqual,
        Always,
    }
}

backend_enum! {
    /// Component type and arity of a vertex attribute.
    pub enum AttribType {
        /// Four normalized unsigned bytes.
        UByte4,
        Float1,
        Float2,
        Float3,
        Float4,
    }
}

impl AttribType {
    /// Number of components.
    #[inline]
    pub fn components(self) -> usize {
        match self {
            AttribType::UByte4 => 4,
            AttribType::Float1 => 1,
            AttribType::Float2 => 2,
            AttribType::Float3 => 3,
            AttribType::Float4 => 4,
        }
    }

    /// Size in bytes.
    #[inline]
    pub fn size(self) -> usize {
        match self {
            AttribType::UByte4 => 4,
            _ => self.components() * 4,
        }
    }
}

/// A single attribute of a vertex record.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct VertexAttrib {
    /// Shader input location.
    pub index: u32,
    /// HLSL semantic name, e.g. `POSITION` or `TEXCOORD`.
    pub semantic: &'static str,
    pub semantic_index: u32,
    pub typ: AttribType,
    /// Byte offset inside the vertex record.
    pub offset: usize,
    pub enabled: bool,
}

/// The layout of one interleaved vertex record. Attributes could be masked out per
/// draw, the stride never changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct VertexLayout {
    pub attribs: SmallVec<[VertexAttrib; MAX_VERTEX_ATTRIBS]>,
    pub stride: usize,
}

impl VertexLayout {
    pub fn new(stride: usize) -> Self {
        VertexLayout {
            attribs: SmallVec::new(),
            stride,
        }
    }

    /// Appends an enabled attribute.
    pub fn with(
        mut self,
        index: u32,
        semantic: &'static str,
        semantic_index: u32,
        typ: AttribType,
        offset: usize,
    ) -> Self {
        debug_assert!(self.attribs.len() < MAX_VERTEX_ATTRIBS);
        debug_assert!(offset + typ.size() <= self.stride);

        self.attribs.push(VertexAttrib {
            index,
            semantic,
            semantic_index,
            typ,
            offset,
            enabled: true,
        });
        self
    }
}

/// A set of attribute indices that should be fed from the vertex buffer.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct AttribMask(pub u16);

impl AttribMask {
    #[inline]
    pub fn all() -> Self {
        AttribMask(0xFFFF)
    }

    #[inline]
    pub fn none() -> Self {
        AttribMask(0)
    }

    #[inline]
    pub fn with(self, index: u32) -> Self {
        AttribMask(self.0 | (1 << index))
    }

    #[inline]
    pub fn contains(self, index: u32) -> bool {
        index < 16 && (self.0 & (1 << index)) != 0
    }
}

impl<'a> From<&'a VertexLayout> for AttribMask {
    fn from(layout: &'a VertexLayout) -> Self {
        layout
            .attribs
            .iter()
            .filter(|v| v.enabled)
            .fold(AttribMask::none(), |mask, v| mask.with(v.index))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderPipelineParams {
    pub layout: VertexLayout,
    pub pass: RenderPassHandle,
    pub shader: ShaderHandle,
    pub draw_mode: DrawMode,
    pub blend: BlendMode,
    pub cull: CullFace,
    pub depth_op: DepthOp,
    pub depth_read: bool,
    pub depth_write: bool,
}

impl RenderPipelineParams {
    pub fn new(pass: RenderPassHandle, shader: ShaderHandle) -> Self {
        RenderPipelineParams {
            layout: VertexLayout::default(),
            pass,
            shader,
            draw_mode: DrawMode::Triangles,
            blend: BlendMode::None,
            cull: CullFace::Back,
            depth_op: DepthOp::Less,
            depth_read: true,
            depth_write: true,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn mask() {
        let layout = VertexLayout::new(32)
            .with(0, "POSITION", 0, AttribType::Float4, 0)
            .with(3, "TEXCOORD", 0, AttribType::Float4, 16);

        let mask = AttribMask::from(&layout);
        assert!(mask.contains(0));
        assert!(!mask.contains(1));
        assert!(mask.contains(3));
        assert!(!mask.contains(16));
        assert!(AttribMask::all().contains(15));
        assert!(!AttribMask::none().contains(0));
    }

    #[test]
    fn attrib_sizes() {
        assert_eq!(AttribType::UByte4.size(), 4);
        assert_eq!(AttribType::Float3.size(), 12);
        assert_eq!(AttribType::VARIANTS.len(), 5);
    }
}
