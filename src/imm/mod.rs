//! An immediate-mode drawing layer on top of `Device`.
//!
//! Vertex attributes are pushed one at a time between `imm_begin` and `imm_end`,
//! and flushed as a single draw call. The render pass and pipeline behind a draw
//! are only recreated when the state they are built from changed.
//!
//! ```rust,ignore
//! imm.imm_set_texture(Some(sprite), 0)?;
//! imm.imm_begin(DrawMode::TriangleStrip)?;
//! imm.imm_position(0.0, 32.0, 0.0, 1.0)?;
//! imm.imm_texcoord(0.0, 1.0, 0.0, 0.0)?;
//! // ...
//! imm.imm_end()?;
//! ```
//!
//! Each attribute keeps its own running count, which is also the index it writes
//! next. The position count is the number of vertices drawn. Callers are expected
//! to push matching counts: the scratch vertices are not cleared between draws, so
//! a vertex without a color of its own reuses whatever color a previous draw left
//! at that index. Attributes that were not pushed at all are disabled for the draw.

mod batch;
mod primitives;
mod texture;
mod vertex;

pub use self::batch::Rebuild;
pub use self::primitives::circle_points;
pub use self::texture::{ImmClip, Quad};
pub use self::vertex::{AttribCounts, ImmAttrib, ImmUniforms, ImmVertex};

use std::mem;

use crate::math::{self, Color, Matrix4, Rect, SquareMatrix};
use crate::video::assets::prelude::*;
use crate::video::backends::BackendKind;
use crate::video::errors::*;
use crate::video::Device;

/// Number of uniform slots. Slot 0 holds the built-in `ImmUniforms`.
pub const IMM_MAX_UNIFORMS: usize = 8;
/// Number of texture and sampler slots.
pub const IMM_MAX_TEXTURES: usize = 16;

const IMM_GLSL: &[u8] = include_bytes!("../video/shaders/imm.glsl");
const IMM_HLSL: &[u8] = include_bytes!("../video/shaders/imm.hlsl");

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImmParams {
    /// Capacity of the scratch vertex array. Pushing more vertices into a single
    /// draw fails with `CapacityExceeded`.
    pub max_vertices: usize,
    /// Initial size of the buffers backing custom uniform blobs.
    pub uniform_buffer_bytes: usize,
}

impl Default for ImmParams {
    fn default() -> Self {
        ImmParams {
            max_vertices: 16384,
            uniform_buffer_bytes: 4096,
        }
    }
}

/// The samplers an `ImmContext` creates up front.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImmSampler {
    ClampNearest,
    ClampLinear,
    RepeatNearest,
    RepeatLinear,
}

impl ImmSampler {
    pub const VARIANTS: &'static [ImmSampler] = &[
        ImmSampler::ClampNearest,
        ImmSampler::ClampLinear,
        ImmSampler::RepeatNearest,
        ImmSampler::RepeatLinear,
    ];

    fn params(self) -> SamplerParams {
        match self {
            ImmSampler::ClampNearest => SamplerParams::new(SamplerFilter::Nearest, SamplerWrap::Clamp),
            ImmSampler::ClampLinear => SamplerParams::new(SamplerFilter::Linear, SamplerWrap::Clamp),
            ImmSampler::RepeatNearest => {
                SamplerParams::new(SamplerFilter::Nearest, SamplerWrap::Repeat)
            }
            ImmSampler::RepeatLinear => SamplerParams::new(SamplerFilter::Linear, SamplerWrap::Repeat),
        }
    }
}

/// Counters of the expensive work an `ImmContext` did.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct ImmStats {
    pub pass_rebuilds: u32,
    pub pipeline_rebuilds: u32,
    pub draws: u32,
}

/// The immediate-mode drawing context. It owns the `Device`.
pub struct ImmContext {
    device: Device,
    params: ImmParams,

    vertices: Vec<ImmVertex>,
    counts: AttribCounts,
    layout: VertexLayout,
    vbo: BufferHandle,
    ubos: [Option<BufferHandle>; IMM_MAX_UNIFORMS],
    def_shader: ShaderHandle,
    def_samplers: [SamplerHandle; 4],

    color_target: Option<TextureHandle>,
    depth_target: Option<TextureHandle>,
    shader: Option<ShaderHandle>,
    samplers: [Option<SamplerHandle>; IMM_MAX_TEXTURES],
    textures: [Option<TextureHandle>; IMM_MAX_TEXTURES],
    uniforms: [Option<Vec<u8>>; IMM_MAX_UNIFORMS],
    viewport: Rect,
    projection: Matrix4<f32>,
    view: Matrix4<f32>,
    model: Matrix4<f32>,
    depth_read: bool,
    depth_write: bool,

    draw_mode: DrawMode,
    should_clear: bool,
    clear_color: Color,
    pass: Option<RenderPassHandle>,
    pipeline: Option<RenderPipelineHandle>,
    rebuild: Rebuild,
    drawing: bool,
    texture_batch: bool,
    stats: ImmStats,
}

impl ImmContext {
    /// Creates the default shader, samplers and buffers on `device`.
    pub fn new(mut device: Device, params: ImmParams) -> Self {
        let layout = ImmVertex::layout();
        let vbo_size = params.max_vertices * layout.stride;
        let vbo = device.create_buffer(BufferParams::vertex(BufferUsage::Dynamic, vbo_size), None);

        let ubo_size = mem::size_of::<ImmUniforms>();
        let mut ubos = [None; IMM_MAX_UNIFORMS];
        ubos[0] = Some(device.create_buffer(BufferParams::uniform(BufferUsage::Dynamic, ubo_size), None));

        let source = match device.backend() {
            BackendKind::Direct3D11 => IMM_HLSL,
            _ => IMM_GLSL,
        };

        let shader_params = ShaderParams::default()
            .with("ImmUniforms", UniformType::Buffer, 0)
            .with("u_texture", UniformType::Texture, 0);
        let def_shader = device.create_shader(shader_params, source);

        let def_samplers = [
            device.create_sampler(ImmSampler::ClampNearest.params()),
            device.create_sampler(ImmSampler::ClampLinear.params()),
            device.create_sampler(ImmSampler::RepeatNearest.params()),
            device.create_sampler(ImmSampler::RepeatLinear.params()),
        ];

        let dimensions = device.dimensions();
        let (w, h) = (dimensions.x as f32, dimensions.y as f32);

        ImmContext {
            params,
            vertices: vec![ImmVertex::default(); params.max_vertices],
            counts: AttribCounts::default(),
            layout,
            vbo,
            ubos,
            def_shader,
            def_samplers,
            color_target: None,
            depth_target: None,
            shader: None,
            samplers: [None; IMM_MAX_TEXTURES],
            textures: [None; IMM_MAX_TEXTURES],
            uniforms: Default::default(),
            viewport: Rect::from_size(w, h),
            projection: math::screen_ortho(w, h),
            view: Matrix4::identity(),
            model: Matrix4::identity(),
            depth_read: false,
            depth_write: false,
            draw_mode: DrawMode::Triangles,
            should_clear: false,
            clear_color: Color::black(),
            pass: None,
            pipeline: None,
            rebuild: Rebuild::Pass,
            drawing: false,
            texture_batch: false,
            stats: ImmStats::default(),
            device,
        }
    }

    #[inline]
    pub fn device(&self) -> &Device {
        &self.device
    }

    #[inline]
    pub fn device_mut(&mut self) -> &mut Device {
        &mut self.device
    }

    #[inline]
    pub fn params(&self) -> &ImmParams {
        &self.params
    }

    #[inline]
    pub fn stats(&self) -> ImmStats {
        self.stats
    }

    /// Returns true between `imm_begin` and `imm_end`.
    #[inline]
    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    /// The shader used while no shader is set.
    #[inline]
    pub fn default_shader(&self) -> ShaderHandle {
        self.def_shader
    }

    /// The render pass of the last draw.
    #[inline]
    pub fn render_pass(&self) -> Option<RenderPassHandle> {
        self.pass
    }

    /// The render pipeline of the last draw.
    #[inline]
    pub fn render_pipeline(&self) -> Option<RenderPipelineHandle> {
        self.pipeline
    }

    /// The vertex buffer every draw is uploaded to.
    #[inline]
    pub fn vertex_buffer(&self) -> BufferHandle {
        self.vbo
    }

    /// The uniform buffer bound at `slot`, once something has been uploaded to it.
    #[inline]
    pub fn uniform_buffer(&self, slot: usize) -> Option<BufferHandle> {
        self.ubos.get(slot).and_then(|v| *v)
    }
}

impl ImmContext {
    /// Starts a frame: picks up window resizes and resets all state.
    pub fn begin_frame(&mut self) -> Result<()> {
        self.device.maybe_resize_backbuffer()?;
        self.imm_reset()
    }

    pub fn end_frame(&mut self) -> Result<()> {
        if self.drawing {
            return Err(Error::AlreadyDrawing);
        }

        self.device.present()
    }

    /// Clears the current targets with `color`.
    pub fn imm_clear(&mut self, color: Color) -> Result<()> {
        if self.clear_color != color {
            self.clear_color = color;
            self.rebuild.mark(Rebuild::Pass);
        }

        let mode = self.draw_mode;
        self.begin(mode, true)?;
        self.imm_end()
    }

    /// Resets every piece of state to its default: no targets, textures or
    /// uniforms, the default shader, a viewport and projection covering the window,
    /// and no depth testing.
    pub fn imm_reset(&mut self) -> Result<()> {
        if self.drawing {
            return Err(Error::AlreadyDrawing);
        }

        let dimensions = self.device.dimensions();
        let (w, h) = (dimensions.x as f32, dimensions.y as f32);

        self.color_target = None;
        self.depth_target = None;
        self.shader = None;
        self.samplers = [None; IMM_MAX_TEXTURES];
        self.textures = [None; IMM_MAX_TEXTURES];
        self.uniforms = Default::default();
        self.viewport = Rect::from_size(w, h);
        self.projection = math::screen_ortho(w, h);
        self.view = Matrix4::identity();
        self.model = Matrix4::identity();
        self.depth_read = false;
        self.depth_write = false;
        self.rebuild.mark(Rebuild::Pass);
        Ok(())
    }
}

fn check_slot(slot: usize, max: usize) -> Result<()> {
    if slot >= max {
        Err(Error::InvalidSlot { slot, max })
    } else {
        Ok(())
    }
}

impl ImmContext {
    /// Renders into `target`, or into the backbuffer with `None`.
    pub fn imm_set_color_target(&mut self, target: Option<TextureHandle>) {
        if self.color_target != target {
            self.color_target = target;
            self.rebuild.mark(Rebuild::Pass);
        }
    }

    pub fn imm_set_depth_target(&mut self, target: Option<TextureHandle>) {
        if self.depth_target != target {
            self.depth_target = target;
            self.rebuild.mark(Rebuild::Pass);
        }
    }

    /// Sets the shader of the following draws, `None` selects the built-in one. It
    /// can not change once a draw has started.
    pub fn imm_set_shader(&mut self, shader: Option<ShaderHandle>) -> Result<()> {
        if self.drawing {
            return Err(Error::ShaderLocked("shader"));
        }

        if self.shader != shader {
            self.shader = shader;
            self.rebuild.mark(Rebuild::Pipeline);
        }

        Ok(())
    }

    pub fn imm_set_depth_read(&mut self, enable: bool) -> Result<()> {
        if self.drawing {
            return Err(Error::ShaderLocked("depth read"));
        }

        if self.depth_read != enable {
            self.depth_read = enable;
            self.rebuild.mark(Rebuild::Pipeline);
        }

        Ok(())
    }

    pub fn imm_set_depth_write(&mut self, enable: bool) -> Result<()> {
        if self.drawing {
            return Err(Error::ShaderLocked("depth write"));
        }

        if self.depth_write != enable {
            self.depth_write = enable;
            self.rebuild.mark(Rebuild::Pipeline);
        }

        Ok(())
    }

    /// Sets the sampler of a texture slot. Slots without one sample with
    /// `ImmSampler::ClampNearest`.
    pub fn imm_set_sampler(&mut self, sampler: Option<SamplerHandle>, slot: usize) -> Result<()> {
        check_slot(slot, IMM_MAX_TEXTURES)?;
        self.samplers[slot] = sampler;
        Ok(())
    }

    pub fn imm_set_texture(&mut self, texture: Option<TextureHandle>, slot: usize) -> Result<()> {
        check_slot(slot, IMM_MAX_TEXTURES)?;
        self.textures[slot] = texture;
        Ok(())
    }

    /// Sets a custom uniform blob, uploaded to the uniform buffer bound at `slot`
    /// on every `imm_end`. The bytes are copied. Slot 0 is reserved.
    pub fn set_uniforms(&mut self, data: Option<&[u8]>, slot: usize) -> Result<()> {
        if slot == 0 {
            return Err(Error::InvalidSlot {
                slot,
                max: IMM_MAX_UNIFORMS,
            });
        }

        check_slot(slot, IMM_MAX_UNIFORMS)?;
        self.uniforms[slot] = data.map(|v| v.to_vec());
        Ok(())
    }

    #[inline]
    pub fn imm_set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
    }

    #[inline]
    pub fn imm_set_projection(&mut self, projection: Matrix4<f32>) {
        self.projection = projection;
    }

    #[inline]
    pub fn imm_set_view(&mut self, view: Matrix4<f32>) {
        self.view = view;
    }

    #[inline]
    pub fn imm_set_model(&mut self, model: Matrix4<f32>) {
        self.model = model;
    }
}

impl ImmContext {
    #[inline]
    pub fn imm_get_color_target(&self) -> Option<TextureHandle> {
        self.color_target
    }

    #[inline]
    pub fn imm_get_depth_target(&self) -> Option<TextureHandle> {
        self.depth_target
    }

    #[inline]
    pub fn imm_get_shader(&self) -> Option<ShaderHandle> {
        self.shader
    }

    pub fn imm_get_sampler(&self, slot: usize) -> Option<SamplerHandle> {
        self.samplers.get(slot).and_then(|v| *v)
    }

    pub fn imm_get_texture(&self, slot: usize) -> Option<TextureHandle> {
        self.textures.get(slot).and_then(|v| *v)
    }

    pub fn get_uniforms(&self, slot: usize) -> Option<&[u8]> {
        self.uniforms
            .get(slot)
            .and_then(|v| v.as_ref())
            .map(|v| v.as_slice())
    }

    #[inline]
    pub fn imm_get_viewport(&self) -> Rect {
        self.viewport
    }

    #[inline]
    pub fn imm_get_projection(&self) -> Matrix4<f32> {
        self.projection
    }

    #[inline]
    pub fn imm_get_view(&self) -> Matrix4<f32> {
        self.view
    }

    #[inline]
    pub fn imm_get_model(&self) -> Matrix4<f32> {
        self.model
    }

    #[inline]
    pub fn imm_get_depth_read(&self) -> bool {
        self.depth_read
    }

    #[inline]
    pub fn imm_get_depth_write(&self) -> bool {
        self.depth_write
    }

    /// One of the samplers created along with the context.
    #[inline]
    pub fn imm_get_def_sampler(&self, sampler: ImmSampler) -> SamplerHandle {
        self.def_samplers[sampler as usize]
    }
}

impl Drop for ImmContext {
    fn drop(&mut self) {
        if let Some(pipeline) = self.pipeline.take() {
            self.device.delete_render_pipeline(pipeline);
        }

        if let Some(pass) = self.pass.take() {
            self.device.delete_render_pass(pass);
        }

        for v in self.ubos.iter().filter_map(|v| *v) {
            self.device.delete_buffer(v);
        }

        for &v in &self.def_samplers {
            self.device.delete_sampler(v);
        }

        self.device.delete_shader(self.def_shader);
        self.device.delete_buffer(self.vbo);
    }
}
