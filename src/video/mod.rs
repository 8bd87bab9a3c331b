//! A backend-agnostic render device.
//!
//! GPU objects are described with plain descriptors (`BufferParams`, `ShaderParams`,
//! `SamplerParams`, `TextureParams`, `RenderPassParams` and `RenderPipelineParams`)
//! and handed to a `Device`. The device keeps the descriptors in handle pools and
//! forwards every operation to one `backends::Visitor`, which owns the native
//! objects of exactly one graphics API.
//!
//! ```rust,ignore
//! let vbo = device.create_buffer(BufferParams::vertex(BufferUsage::Dynamic, 1024), None);
//! let pass = device.create_render_pass(RenderPassParams::default());
//! let pipeline = device.create_render_pipeline(RenderPipelineParams::new(pass, shader));
//!
//! device.begin_render_pass(pass)?;
//! device.bind_pipeline(pipeline)?;
//! device.bind_buffer(vbo, 0)?;
//! device.draw_arrays(3)?;
//! device.end_render_pass()?;
//! ```

/// Maximum number of color attachments of a render pass.
pub const MAX_COLOR_TARGETS: usize = 16;
/// Maximum number of attributes in a vertex layout.
pub const MAX_VERTEX_ATTRIBS: usize = 16;
/// Maximum number of uniform declarations of a shader.
pub const MAX_SHADER_UNIFORMS: usize = 32;
/// Number of texture units that could be bound at the same time.
pub const MAX_TEXTURE_UNITS: usize = 16;

pub mod assets;
pub mod backends;
pub mod device;
pub mod errors;

pub use self::device::Device;

pub mod prelude {
    pub use super::assets::prelude::*;
    pub use super::backends::headless::{DrawRecord, HeadlessInspector};
    pub use super::backends::{BackendKind, GlslProfile, VideoParams, Visitor};
    pub use super::device::Device;
    pub use super::errors::Error as VideoError;
}
