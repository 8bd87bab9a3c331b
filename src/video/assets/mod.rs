//! Plain descriptors of the GPU objects a `Device` could create. They carry no
//! native state, every backend translates them on its own.

/// Declares a backend-facing enum. Every variant is listed in `VARIANTS`, so each
/// backend could prove that all of them have a native mapping.
macro_rules! backend_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($(#[$vmeta:meta])* $variant:ident,)+ }
    ) => {
        $(#[$meta])*
        #[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
        }

        impl $name {
            pub const VARIANTS: &'static [$name] = &[$($name::$variant,)+];
        }
    };
}

pub mod buffer;
pub mod pass;
pub mod pipeline;
pub mod sampler;
pub mod shader;
pub mod texture;

pub mod prelude {
    pub use super::buffer::{BufferHandle, BufferParams, BufferType, BufferUsage, ElementType};
    pub use super::pass::{RenderPassHandle, RenderPassParams, RenderTarget};
    pub use super::pipeline::{
        AttribMask, AttribType, BlendMode, CullFace, DepthOp, DrawMode, RenderPipelineHandle,
        RenderPipelineParams, VertexAttrib, VertexLayout,
    };
    pub use super::sampler::{SamplerFilter, SamplerHandle, SamplerParams, SamplerWrap};
    pub use super::shader::{ShaderHandle, ShaderParams, UniformParams, UniformType};
    pub use super::texture::{TextureFormat, TextureHandle, TextureParams, TextureType};
}
