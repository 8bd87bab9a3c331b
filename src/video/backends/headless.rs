//! A visitor without any native graphics API. It keeps just enough state to tell
//! what would have been rendered, which `HeadlessInspector` exposes to tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::errors::*;
use crate::math::{Rect, Vector2};
use crate::window::Window;

use super::super::assets::prelude::*;
use super::Visitor;

/// A single recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawRecord {
    pub pass: RenderPassHandle,
    pub pipeline: RenderPipelineHandle,
    /// The first color target of the pass.
    pub target: RenderTarget,
    pub shader: ShaderHandle,
    pub mode: DrawMode,
    pub count: u32,
    /// `Some` for indexed draws.
    pub elements: Option<ElementType>,
    /// Bound textures as `(unit, texture, sampler)`.
    pub textures: Vec<(u32, TextureHandle, Option<SamplerHandle>)>,
    /// Bound uniform buffers as `(slot, buffer)`.
    pub uniforms: Vec<(u32, BufferHandle)>,
    pub vertex_buffer: Option<BufferHandle>,
    pub mask: AttribMask,
    /// Whether the pass of this draw clears its targets.
    pub clear: bool,
}

#[derive(Debug, Clone)]
struct HeadlessBuffer {
    params: BufferParams,
    bytes: Vec<u8>,
    capacity: usize,
    allocations: u32,
}

struct HeadlessState {
    buffers: HashMap<BufferHandle, HeadlessBuffer>,
    shaders: HashMap<ShaderHandle, ShaderParams>,
    samplers: HashMap<SamplerHandle, SamplerParams>,
    textures: HashMap<TextureHandle, TextureParams>,
    passes: HashMap<RenderPassHandle, RenderPassParams>,
    pipelines: HashMap<RenderPipelineHandle, RenderPipelineParams>,
    passes_created: usize,
    pipelines_created: usize,

    pass: Option<RenderPassHandle>,
    pipeline: Option<RenderPipelineHandle>,
    textures_bound: Vec<(u32, TextureHandle, Option<SamplerHandle>)>,
    uniforms_bound: Vec<(u32, BufferHandle)>,
    vertex_buffer: Option<(BufferHandle, AttribMask)>,

    draws: Vec<DrawRecord>,
    frames: u32,
    backbuffer: Vector2<u32>,
    viewport: Rect,
    scissor: Option<Rect>,
}

impl Default for HeadlessState {
    fn default() -> Self {
        HeadlessState {
            buffers: HashMap::new(),
            shaders: HashMap::new(),
            samplers: HashMap::new(),
            textures: HashMap::new(),
            passes: HashMap::new(),
            pipelines: HashMap::new(),
            passes_created: 0,
            pipelines_created: 0,
            pass: None,
            pipeline: None,
            textures_bound: Vec::new(),
            uniforms_bound: Vec::new(),
            vertex_buffer: None,
            draws: Vec::new(),
            frames: 0,
            backbuffer: Vector2::new(0, 0),
            viewport: Rect::default(),
            scissor: None,
        }
    }
}

pub struct HeadlessVisitor {
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessVisitor {
    pub fn new() -> Self {
        HeadlessVisitor {
            state: Rc::new(RefCell::new(HeadlessState::default())),
        }
    }

    pub fn inspector(&self) -> HeadlessInspector {
        HeadlessInspector {
            state: self.state.clone(),
        }
    }

    fn record(&mut self, count: u32, elements: Option<ElementType>) -> Result<()> {
        let mut state = self.state.borrow_mut();

        let pass = match state.pass {
            Some(pass) => pass,
            None => bail!("Draw call outside of a render pass."),
        };

        let pipeline = match state.pipeline {
            Some(pipeline) => pipeline,
            None => bail!("Draw call without pipeline."),
        };

        let (mode, shader) = match state.pipelines.get(&pipeline) {
            Some(params) => (params.draw_mode, params.shader),
            None => bail!("{} is invalid.", pipeline),
        };

        let (target, clear) = match state.passes.get(&pass) {
            Some(params) => (params.colors.first().cloned().unwrap_or_default(), params.clear),
            None => bail!("{} is invalid.", pass),
        };

        let record = DrawRecord {
            pass,
            pipeline,
            target,
            shader,
            mode,
            count,
            elements,
            textures: state.textures_bound.clone(),
            uniforms: state.uniforms_bound.clone(),
            vertex_buffer: state.vertex_buffer.map(|v| v.0),
            mask: state.vertex_buffer.map(|v| v.1).unwrap_or_default(),
            clear,
        };

        state.draws.push(record);
        Ok(())
    }
}

impl Default for HeadlessVisitor {
    fn default() -> Self {
        HeadlessVisitor::new()
    }
}

impl Visitor for HeadlessVisitor {
    unsafe fn create_buffer(
        &mut self,
        handle: BufferHandle,
        params: &BufferParams,
        data: Option<&[u8]>,
    ) -> Result<()> {
        let size = data.map(|v| v.len()).unwrap_or(0).max(params.size);
        let mut bytes = vec![0; size];
        if let Some(data) = data {
            bytes[..data.len()].copy_from_slice(data);
        }

        let buffer = HeadlessBuffer {
            params: *params,
            bytes,
            capacity: size,
            allocations: 1,
        };

        self.state.borrow_mut().buffers.insert(handle, buffer);
        Ok(())
    }

    unsafe fn update_buffer(&mut self, handle: BufferHandle, data: &[u8]) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let buffer = state
            .buffers
            .get_mut(&handle)
            .ok_or_else(|| format_err!("{} is invalid.", handle))?;

        if data.len() > buffer.capacity {
            buffer.capacity = data.len();
            buffer.allocations += 1;
            buffer.bytes = data.to_vec();
        } else {
            buffer.bytes[..data.len()].copy_from_slice(data);
        }

        Ok(())
    }

    unsafe fn delete_buffer(&mut self, handle: BufferHandle) -> Result<()> {
        self.state.borrow_mut().buffers.remove(&handle);
        Ok(())
    }

    unsafe fn create_shader(
        &mut self,
        handle: ShaderHandle,
        params: &ShaderParams,
        source: &[u8],
    ) -> Result<()> {
        if source.is_empty() {
            bail!("Shader source is empty.");
        }

        self.state
            .borrow_mut()
            .shaders
            .insert(handle, params.clone());
        Ok(())
    }

    unsafe fn delete_shader(&mut self, handle: ShaderHandle) -> Result<()> {
        self.state.borrow_mut().shaders.remove(&handle);
        Ok(())
    }

    unsafe fn create_sampler(
        &mut self,
        handle: SamplerHandle,
        params: &SamplerParams,
    ) -> Result<()> {
        self.state.borrow_mut().samplers.insert(handle, *params);
        Ok(())
    }

    unsafe fn delete_sampler(&mut self, handle: SamplerHandle) -> Result<()> {
        self.state.borrow_mut().samplers.remove(&handle);
        Ok(())
    }

    unsafe fn create_texture(
        &mut self,
        handle: TextureHandle,
        params: &TextureParams,
        data: Option<&[u8]>,
    ) -> Result<()> {
        if let Some(data) = data {
            if data.len() < params.bytes() {
                bail!("Texture data of {} bytes is too small for {:?}.", data.len(), params);
            }
        }

        self.state.borrow_mut().textures.insert(handle, *params);
        Ok(())
    }

    unsafe fn resize_texture(
        &mut self,
        handle: TextureHandle,
        dimensions: Vector2<u32>,
    ) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let params = state
            .textures
            .get_mut(&handle)
            .ok_or_else(|| format_err!("{} is invalid.", handle))?;

        params.dimensions = dimensions;
        Ok(())
    }

    unsafe fn delete_texture(&mut self, handle: TextureHandle) -> Result<()> {
        self.state.borrow_mut().textures.remove(&handle);
        Ok(())
    }

    unsafe fn create_render_pass(
        &mut self,
        handle: RenderPassHandle,
        params: &RenderPassParams,
    ) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.passes.insert(handle, params.clone());
        state.passes_created += 1;
        Ok(())
    }

    unsafe fn delete_render_pass(&mut self, handle: RenderPassHandle) -> Result<()> {
        self.state.borrow_mut().passes.remove(&handle);
        Ok(())
    }

    unsafe fn create_render_pipeline(
        &mut self,
        handle: RenderPipelineHandle,
        params: &RenderPipelineParams,
    ) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if !state.shaders.contains_key(&params.shader) {
            bail!("{} is invalid.", params.shader);
        }

        state.pipelines.insert(handle, params.clone());
        state.pipelines_created += 1;
        Ok(())
    }

    unsafe fn delete_render_pipeline(&mut self, handle: RenderPipelineHandle) -> Result<()> {
        self.state.borrow_mut().pipelines.remove(&handle);
        Ok(())
    }

    unsafe fn set_viewport(&mut self, viewport: Rect) -> Result<()> {
        self.state.borrow_mut().viewport = viewport;
        Ok(())
    }

    unsafe fn begin_scissor(&mut self, rect: Rect, _: Vector2<u32>) -> Result<()> {
        self.state.borrow_mut().scissor = Some(rect);
        Ok(())
    }

    unsafe fn end_scissor(&mut self) -> Result<()> {
        self.state.borrow_mut().scissor = None;
        Ok(())
    }

    unsafe fn begin_render_pass(&mut self, handle: RenderPassHandle) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.pass = Some(handle);
        state.pipeline = None;
        state.textures_bound.clear();
        state.uniforms_bound.clear();
        state.vertex_buffer = None;
        Ok(())
    }

    unsafe fn end_render_pass(&mut self) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.pass = None;
        state.pipeline = None;
        Ok(())
    }

    unsafe fn bind_pipeline(&mut self, handle: RenderPipelineHandle) -> Result<()> {
        self.state.borrow_mut().pipeline = Some(handle);
        Ok(())
    }

    unsafe fn bind_buffer(
        &mut self,
        handle: BufferHandle,
        slot: u32,
        mask: AttribMask,
    ) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let typ = match state.buffers.get(&handle) {
            Some(buffer) => buffer.params.typ,
            None => bail!("{} is invalid.", handle),
        };

        match typ {
            BufferType::Vertex => state.vertex_buffer = Some((handle, mask)),
            BufferType::Uniform => {
                state.uniforms_bound.retain(|v| v.0 != slot);
                state.uniforms_bound.push((slot, handle));
            }
            BufferType::Element => {}
        }

        Ok(())
    }

    unsafe fn bind_texture(
        &mut self,
        texture: TextureHandle,
        sampler: Option<SamplerHandle>,
        unit: u32,
    ) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.textures_bound.retain(|v| v.0 != unit);
        state.textures_bound.push((unit, texture, sampler));
        Ok(())
    }

    unsafe fn draw_arrays(&mut self, count: u32) -> Result<()> {
        self.record(count, None)
    }

    unsafe fn draw_elements(&mut self, count: u32, typ: ElementType, _: usize) -> Result<()> {
        self.record(count, Some(typ))
    }

    unsafe fn resize_backbuffer(&mut self, dimensions: Vector2<u32>) -> Result<()> {
        self.state.borrow_mut().backbuffer = dimensions;
        Ok(())
    }

    unsafe fn present(&mut self, window: &dyn Window) -> Result<()> {
        self.state.borrow_mut().frames += 1;
        window.swap_buffers()
    }
}

/// A read-only view into the state of a `HeadlessVisitor`.
#[derive(Clone)]
pub struct HeadlessInspector {
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessInspector {
    /// The current content of a buffer.
    pub fn buffer_bytes(&self, handle: BufferHandle) -> Option<Vec<u8>> {
        self.state
            .borrow()
            .buffers
            .get(&handle)
            .map(|v| v.bytes.clone())
    }

    pub fn buffer_capacity(&self, handle: BufferHandle) -> Option<usize> {
        self.state.borrow().buffers.get(&handle).map(|v| v.capacity)
    }

    /// How many times the storage of a buffer has been allocated.
    pub fn buffer_allocations(&self, handle: BufferHandle) -> Option<u32> {
        self.state
            .borrow()
            .buffers
            .get(&handle)
            .map(|v| v.allocations)
    }

    pub fn texture_dimensions(&self, handle: TextureHandle) -> Option<Vector2<u32>> {
        self.state
            .borrow()
            .textures
            .get(&handle)
            .map(|v| v.dimensions)
    }

    pub fn has_shader(&self, handle: ShaderHandle) -> bool {
        self.state.borrow().shaders.contains_key(&handle)
    }

    pub fn has_sampler(&self, handle: SamplerHandle) -> bool {
        self.state.borrow().samplers.contains_key(&handle)
    }

    pub fn render_pass(&self, handle: RenderPassHandle) -> Option<RenderPassParams> {
        self.state.borrow().passes.get(&handle).cloned()
    }

    pub fn render_pipeline(&self, handle: RenderPipelineHandle) -> Option<RenderPipelineParams> {
        self.state.borrow().pipelines.get(&handle).cloned()
    }

    /// Number of passes created since the visitor was made.
    pub fn passes_created(&self) -> usize {
        self.state.borrow().passes_created
    }

    /// Number of pipelines created since the visitor was made.
    pub fn pipelines_created(&self) -> usize {
        self.state.borrow().pipelines_created
    }

    /// Number of passes that have been created and not deleted.
    pub fn live_passes(&self) -> usize {
        self.state.borrow().passes.len()
    }

    pub fn live_pipelines(&self) -> usize {
        self.state.borrow().pipelines.len()
    }

    pub fn live_buffers(&self) -> usize {
        self.state.borrow().buffers.len()
    }

    pub fn live_textures(&self) -> usize {
        self.state.borrow().textures.len()
    }

    pub fn draws(&self) -> Vec<DrawRecord> {
        self.state.borrow().draws.clone()
    }

    pub fn last_draw(&self) -> Option<DrawRecord> {
        self.state.borrow().draws.last().cloned()
    }

    pub fn clear_draws(&self) {
        self.state.borrow_mut().draws.clear();
    }

    /// Number of presented frames.
    pub fn frames(&self) -> u32 {
        self.state.borrow().frames
    }

    pub fn backbuffer(&self) -> Vector2<u32> {
        self.state.borrow().backbuffer
    }

    pub fn viewport(&self) -> Rect {
        self.state.borrow().viewport
    }

    pub fn scissor(&self) -> Option<Rect> {
        self.state.borrow().scissor
    }
}
