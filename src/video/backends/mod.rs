//! The backend of renderer, which should be responsible for only one thing:
//! translating descriptors and draw calls into one low-level graphics API.

pub mod headless;
mod utils;

#[cfg(not(target_arch = "wasm32"))]
pub mod gl;

#[cfg(windows)]
pub mod d3d11;

use crate::errors::*;
use crate::math::{Rect, Vector2};
use crate::window::Window;

use super::assets::prelude::*;

/// The graphics API a `Device` renders with.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum BackendKind {
    OpenGL,
    Direct3D11,
    Headless,
}

impl Default for BackendKind {
    fn default() -> Self {
        if cfg!(windows) {
            BackendKind::Direct3D11
        } else {
            BackendKind::OpenGL
        }
    }
}

/// GLSL dialect, which picks the preamble injected ahead of shader sources.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum GlslProfile {
    Core330,
    Core430,
    Es300,
}

impl Default for GlslProfile {
    fn default() -> Self {
        GlslProfile::Core330
    }
}

impl GlslProfile {
    pub fn vertex_preamble(self) -> &'static str {
        match self {
            GlslProfile::Core330 => "#version 330\n#define VERT_SHADER 1\n",
            GlslProfile::Core430 => "#version 430\n#define VERT_SHADER 1\n",
            GlslProfile::Es300 => "#version 300 es\n#define VERT_SHADER 1\nprecision mediump float;\n",
        }
    }

    pub fn fragment_preamble(self) -> &'static str {
        match self {
            GlslProfile::Core330 => "#version 330\n#define FRAG_SHADER 1\n",
            GlslProfile::Core430 => "#version 430\n#define FRAG_SHADER 1\n",
            GlslProfile::Es300 => "#version 300 es\n#define FRAG_SHADER 1\nprecision mediump float;\n",
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoParams {
    pub glsl: GlslProfile,
    /// Treats shader compile and link failures like every other resource creation
    /// failure, and terminates.
    pub fatal_shader_errors: bool,
}

/// One native implementation of the descriptor contract. Every method maps to a
/// single device operation, and all of them are called from the thread that owns
/// the graphics context.
///
/// Handles are validated by the `Device` before they reach a visitor.
pub trait Visitor {
    unsafe fn create_buffer(
        &mut self,
        handle: BufferHandle,
        params: &BufferParams,
        data: Option<&[u8]>,
    ) -> Result<()>;

    /// Replaces the content of a buffer, growing its storage if `data` does not fit
    /// into the current capacity. The handle keeps addressing the same buffer.
    unsafe fn update_buffer(&mut self, handle: BufferHandle, data: &[u8]) -> Result<()>;

    unsafe fn delete_buffer(&mut self, handle: BufferHandle) -> Result<()>;

    /// Compiles a combined vertex and fragment source.
    unsafe fn create_shader(
        &mut self,
        handle: ShaderHandle,
        params: &ShaderParams,
        source: &[u8],
    ) -> Result<()>;

    unsafe fn delete_shader(&mut self, handle: ShaderHandle) -> Result<()>;

    unsafe fn create_sampler(&mut self, handle: SamplerHandle, params: &SamplerParams)
        -> Result<()>;

    unsafe fn delete_sampler(&mut self, handle: SamplerHandle) -> Result<()>;

    unsafe fn create_texture(
        &mut self,
        handle: TextureHandle,
        params: &TextureParams,
        data: Option<&[u8]>,
    ) -> Result<()>;

    /// Recreates the storage of a texture, its content is undefined afterwards.
    unsafe fn resize_texture(&mut self, handle: TextureHandle, dimensions: Vector2<u32>)
        -> Result<()>;

    unsafe fn delete_texture(&mut self, handle: TextureHandle) -> Result<()>;

    unsafe fn create_render_pass(
        &mut self,
        handle: RenderPassHandle,
        params: &RenderPassParams,
    ) -> Result<()>;

    unsafe fn delete_render_pass(&mut self, handle: RenderPassHandle) -> Result<()>;

    unsafe fn create_render_pipeline(
        &mut self,
        handle: RenderPipelineHandle,
        params: &RenderPipelineParams,
    ) -> Result<()>;

    unsafe fn delete_render_pipeline(&mut self, handle: RenderPipelineHandle) -> Result<()>;

    unsafe fn set_viewport(&mut self, viewport: Rect) -> Result<()>;

    /// Restricts rendering to `rect`, given in pixels from the top-left corner of a
    /// surface with `dimensions`.
    unsafe fn begin_scissor(&mut self, rect: Rect, dimensions: Vector2<u32>) -> Result<()>;

    unsafe fn end_scissor(&mut self) -> Result<()>;

    /// Binds the targets of a pass, and clears them if the pass asks for it.
    unsafe fn begin_render_pass(&mut self, handle: RenderPassHandle) -> Result<()>;

    unsafe fn end_render_pass(&mut self) -> Result<()>;

    unsafe fn bind_pipeline(&mut self, handle: RenderPipelineHandle) -> Result<()>;

    /// Binds a buffer. Vertex buffers feed the attributes of the bound pipeline that
    /// are enabled in `mask`, uniform buffers are bound to `slot`.
    unsafe fn bind_buffer(&mut self, handle: BufferHandle, slot: u32, mask: AttribMask)
        -> Result<()>;

    unsafe fn bind_texture(
        &mut self,
        texture: TextureHandle,
        sampler: Option<SamplerHandle>,
        unit: u32,
    ) -> Result<()>;

    unsafe fn draw_arrays(&mut self, count: u32) -> Result<()>;

    unsafe fn draw_elements(&mut self, count: u32, typ: ElementType, offset: usize)
        -> Result<()>;

    /// Called whenever the window changed its dimensions.
    unsafe fn resize_backbuffer(&mut self, dimensions: Vector2<u32>) -> Result<()>;

    unsafe fn present(&mut self, window: &dyn Window) -> Result<()>;
}

/// Creates the visitor of `kind`, rendering into `window`.
pub fn new(kind: BackendKind, window: &dyn Window, params: &VideoParams) -> Result<Box<dyn Visitor>> {
    match kind {
        BackendKind::Headless => Ok(new_headless().0),

        #[cfg(not(target_arch = "wasm32"))]
        BackendKind::OpenGL => {
            let visitor = unsafe { self::gl::visitor::GLVisitor::new(window, params.glsl)? };
            Ok(Box::new(visitor))
        }

        #[cfg(windows)]
        BackendKind::Direct3D11 => {
            let visitor = unsafe { self::d3d11::visitor::D3D11Visitor::new(window)? };
            Ok(Box::new(visitor))
        }

        #[allow(unreachable_patterns)]
        _ => bail!("{:?} backend is not available on this platform.", kind),
    }
}

/// Creates a headless visitor, and the inspector that observes it.
pub fn new_headless() -> (Box<dyn Visitor>, headless::HeadlessInspector) {
    let visitor = headless::HeadlessVisitor::new();
    let inspector = visitor.inspector();
    (Box::new(visitor), inspector)
}
