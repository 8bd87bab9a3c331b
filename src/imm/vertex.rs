use std::mem;

use crate::math::Matrix4;
use crate::video::assets::prelude::{AttribMask, AttribType, VertexLayout};

/// The single interleaved vertex record of every imm draw. Attributes that were
/// not emitted are masked out per draw, the stride never changes.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ImmVertex {
    pub position: [f32; 4],
    pub normal: [f32; 4],
    pub color: [f32; 4],
    pub texcoord: [f32; 4],
    pub userdata0: [f32; 4],
    pub userdata1: [f32; 4],
    pub userdata2: [f32; 4],
    pub userdata3: [f32; 4],
}

/// The vertex attributes of `ImmVertex`, in the order of their shader locations.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ImmAttrib {
    Position = 0,
    Normal = 1,
    Color = 2,
    Texcoord = 3,
    Userdata0 = 4,
    Userdata1 = 5,
    Userdata2 = 6,
    Userdata3 = 7,
}

/// Number of attributes in `ImmVertex`.
pub const IMM_ATTRIBS: usize = 8;

impl ImmVertex {
    pub fn layout() -> VertexLayout {
        let stride = mem::size_of::<ImmVertex>();
        let f4 = AttribType::Float4;

        VertexLayout::new(stride)
            .with(0, "POSITION", 0, f4, 0)
            .with(1, "NORMAL", 0, f4, 16)
            .with(2, "COLOR", 0, f4, 32)
            .with(3, "TEXCOORD", 0, f4, 48)
            .with(4, "USERDATA", 0, f4, 64)
            .with(5, "USERDATA", 1, f4, 80)
            .with(6, "USERDATA", 2, f4, 96)
            .with(7, "USERDATA", 3, f4, 112)
    }

    #[inline]
    pub fn attrib_mut(&mut self, attrib: ImmAttrib) -> &mut [f32; 4] {
        match attrib {
            ImmAttrib::Position => &mut self.position,
            ImmAttrib::Normal => &mut self.normal,
            ImmAttrib::Color => &mut self.color,
            ImmAttrib::Texcoord => &mut self.texcoord,
            ImmAttrib::Userdata0 => &mut self.userdata0,
            ImmAttrib::Userdata1 => &mut self.userdata1,
            ImmAttrib::Userdata2 => &mut self.userdata2,
            ImmAttrib::Userdata3 => &mut self.userdata3,
        }
    }
}

/// Per-attribute running counts of the current draw. Each count is also the write
/// cursor of its attribute.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct AttribCounts(pub [usize; IMM_ATTRIBS]);

impl AttribCounts {
    #[inline]
    pub fn get(&self, attrib: ImmAttrib) -> usize {
        self.0[attrib as usize]
    }

    /// The attributes that received at least one value.
    pub fn mask(&self) -> AttribMask {
        self.0
            .iter()
            .enumerate()
            .filter(|&(_, &n)| n > 0)
            .fold(AttribMask::none(), |mask, (i, _)| mask.with(i as u32))
    }
}

/// The built-in uniform block, bound to slot 0. Laid out for both `std140` and
/// HLSL constant buffer packing.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ImmUniforms {
    pub projection: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    /// `1.0` if textures are sampled. The rest pads the block to 16 bytes.
    pub use_texture: [f32; 4],
}

impl ImmUniforms {
    pub fn new(
        projection: Matrix4<f32>,
        view: Matrix4<f32>,
        model: Matrix4<f32>,
        use_texture: bool,
    ) -> Self {
        ImmUniforms {
            projection: projection.into(),
            view: view.into(),
            model: model.into(),
            use_texture: [if use_texture { 1.0 } else { 0.0 }, 0.0, 0.0, 0.0],
        }
    }
}
