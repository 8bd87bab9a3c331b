use std::rc::Rc;

use crate::math::{Rect, Vector2};
use crate::utils::prelude::ObjectPool;
use crate::window::Window;

use super::assets::prelude::*;
use super::backends::{self, headless::HeadlessInspector, BackendKind, VideoParams, Visitor};
use super::errors::*;
use super::{MAX_COLOR_TARGETS, MAX_SHADER_UNIFORMS, MAX_TEXTURE_UNITS};

struct ShaderEntry {
    params: ShaderParams,
    /// False if the backend failed to compile the shader.
    valid: bool,
}

struct PipelineEntry {
    params: RenderPipelineParams,
    /// False if the pipeline uses an invalid shader, it draws nothing.
    valid: bool,
}

/// The single owner of a graphics backend.
///
/// `Device` keeps the descriptors of every live object in handle pools and
/// validates every call before it reaches the `Visitor`. Creating an object never
/// fails from the caller's point of view: a backend that refuses to create one
/// terminates the application through `Window::fatal_error`. Deleting is idempotent,
/// stale handles are ignored with a warning.
pub struct Device {
    kind: BackendKind,
    params: VideoParams,
    visitor: Box<dyn Visitor>,
    window: Rc<dyn Window>,
    dimensions: Vector2<u32>,

    buffers: ObjectPool<BufferHandle, BufferParams>,
    shaders: ObjectPool<ShaderHandle, ShaderEntry>,
    samplers: ObjectPool<SamplerHandle, SamplerParams>,
    textures: ObjectPool<TextureHandle, TextureParams>,
    passes: ObjectPool<RenderPassHandle, RenderPassParams>,
    pipelines: ObjectPool<RenderPipelineHandle, PipelineEntry>,

    pass: Option<RenderPassHandle>,
    pipeline: Option<RenderPipelineHandle>,
    pipeline_valid: bool,
    scissor: bool,
}

impl Device {
    /// Creates the backend of `kind` for `window`. This is where the render system
    /// gets initialized, dropping the device shuts it down.
    pub fn new(kind: BackendKind, window: Rc<dyn Window>, params: VideoParams) -> Result<Self> {
        let visitor = backends::new(kind, window.as_ref(), &params)?;
        Ok(Device::with_visitor(kind, visitor, window, params))
    }

    /// Creates a device without any native graphics API, and the inspector that
    /// observes what it would have rendered.
    pub fn headless(window: Rc<dyn Window>) -> (Self, HeadlessInspector) {
        let (visitor, inspector) = backends::new_headless();
        let device = Device::with_visitor(
            BackendKind::Headless,
            visitor,
            window,
            VideoParams::default(),
        );

        (device, inspector)
    }

    pub fn with_visitor(
        kind: BackendKind,
        visitor: Box<dyn Visitor>,
        window: Rc<dyn Window>,
        params: VideoParams,
    ) -> Self {
        let dimensions = window.dimensions();

        let mut device = Device {
            kind,
            params,
            visitor,
            window,
            dimensions,
            buffers: ObjectPool::new(),
            shaders: ObjectPool::new(),
            samplers: ObjectPool::new(),
            textures: ObjectPool::new(),
            passes: ObjectPool::new(),
            pipelines: ObjectPool::new(),
            pass: None,
            pipeline: None,
            pipeline_valid: false,
            scissor: false,
        };

        unsafe {
            if let Err(err) = device.visitor.resize_backbuffer(dimensions) {
                device.fatal("resize the backbuffer", err);
            }
        }

        info!(
            "Device {:?} initialized, backbuffer {}x{}.",
            kind, dimensions.x, dimensions.y
        );

        device
    }

    #[inline]
    pub fn backend(&self) -> BackendKind {
        self.kind
    }

    #[inline]
    pub fn params(&self) -> &VideoParams {
        &self.params
    }

    #[inline]
    pub fn window(&self) -> &Rc<dyn Window> {
        &self.window
    }

    /// The dimensions of the backbuffer in pixels.
    #[inline]
    pub fn dimensions(&self) -> Vector2<u32> {
        self.dimensions
    }

    fn fatal<T: ::std::fmt::Display>(&self, what: &str, err: T) -> ! {
        self.window
            .fatal_error(&format!("Failed to {}: {}", what, err))
    }
}

impl Device {
    /// Creates a buffer, filled with `data` if given. The capacity is the larger
    /// of `params.size` and the length of `data`.
    pub fn create_buffer(&mut self, params: BufferParams, data: Option<&[u8]>) -> BufferHandle {
        let handle = self.buffers.create(params);

        unsafe {
            if let Err(err) = self.visitor.create_buffer(handle, &params, data) {
                self.fatal("create buffer", err);
            }
        }

        handle
    }

    /// Replaces the content of a mutable buffer. Payloads larger than the current
    /// capacity grow the buffer, the handle stays valid.
    pub fn update_buffer(&mut self, handle: BufferHandle, data: &[u8]) -> Result<()> {
        let params = self
            .buffers
            .get_mut(handle)
            .ok_or_else(|| Error::BufferHandleInvalid(handle))?;

        if !params.is_mutable() {
            return Err(Error::UpdateImmutableBuffer);
        }

        params.size = params.size.max(data.len());

        unsafe {
            self.visitor.update_buffer(handle, data)?;
        }

        Ok(())
    }

    /// Gets the `BufferParams`, with `size` being the current capacity.
    #[inline]
    pub fn buffer(&self, handle: BufferHandle) -> Option<BufferParams> {
        self.buffers.get(handle).cloned()
    }

    pub fn delete_buffer(&mut self, handle: BufferHandle) {
        if self.buffers.free(handle).is_none() {
            warn!("{} has been deleted already.", handle);
            return;
        }

        unsafe {
            if let Err(err) = self.visitor.delete_buffer(handle) {
                warn!("{}", err);
            }
        }
    }
}

impl Device {
    /// Creates a shader from a combined vertex and fragment source.
    ///
    /// Compile and link failures are logged and yield a shader that draws nothing,
    /// unless `VideoParams::fatal_shader_errors` is set.
    pub fn create_shader(&mut self, params: ShaderParams, source: &[u8]) -> ShaderHandle {
        if params.uniforms.len() > MAX_SHADER_UNIFORMS {
            let err = format!(
                "{} uniforms declared, at most {} are supported.",
                params.uniforms.len(),
                MAX_SHADER_UNIFORMS
            );
            self.fatal("create shader", err);
        }

        let handle = self.shaders.create(ShaderEntry {
            params: params.clone(),
            valid: true,
        });

        let result = unsafe { self.visitor.create_shader(handle, &params, source) };
        if let Err(err) = result {
            let err = Error::ShaderCreationFailure(err.to_string());
            if self.params.fatal_shader_errors {
                self.fatal("create shader", err);
            }

            error!("{}", err);
            if let Some(v) = self.shaders.get_mut(handle) {
                v.valid = false;
            }
        }

        handle
    }

    #[inline]
    pub fn shader(&self, handle: ShaderHandle) -> Option<ShaderParams> {
        self.shaders.get(handle).map(|v| v.params.clone())
    }

    /// Returns true if the shader is alive and compiled successfully.
    #[inline]
    pub fn is_shader_valid(&self, handle: ShaderHandle) -> bool {
        self.shaders.get(handle).map(|v| v.valid).unwrap_or(false)
    }

    pub fn delete_shader(&mut self, handle: ShaderHandle) {
        match self.shaders.free(handle) {
            Some(ShaderEntry { valid: true, .. }) => unsafe {
                if let Err(err) = self.visitor.delete_shader(handle) {
                    warn!("{}", err);
                }
            },
            Some(_) => {}
            None => warn!("{} has been deleted already.", handle),
        }
    }
}

impl Device {
    pub fn create_sampler(&mut self, params: SamplerParams) -> SamplerHandle {
        let handle = self.samplers.create(params);

        unsafe {
            if let Err(err) = self.visitor.create_sampler(handle, &params) {
                self.fatal("create sampler", err);
            }
        }

        handle
    }

    #[inline]
    pub fn sampler(&self, handle: SamplerHandle) -> Option<SamplerParams> {
        self.samplers.get(handle).cloned()
    }

    pub fn delete_sampler(&mut self, handle: SamplerHandle) {
        if self.samplers.free(handle).is_none() {
            warn!("{} has been deleted already.", handle);
            return;
        }

        unsafe {
            if let Err(err) = self.visitor.delete_sampler(handle) {
                warn!("{}", err);
            }
        }
    }
}

impl Device {
    /// Creates a texture, with its initial content if `data` is given.
    pub fn create_texture(&mut self, params: TextureParams, data: Option<&[u8]>) -> TextureHandle {
        let handle = self.textures.create(params);

        unsafe {
            if let Err(err) = self.visitor.create_texture(handle, &params, data) {
                self.fatal("create texture", err);
            }
        }

        handle
    }

    /// Recreates the storage of a texture with new dimensions. The handle stays
    /// the same, the content is undefined afterwards.
    pub fn resize_texture(&mut self, handle: TextureHandle, w: u32, h: u32) -> Result<()> {
        let dimensions = Vector2::new(w, h);

        {
            let params = self
                .textures
                .get_mut(handle)
                .ok_or_else(|| Error::TextureHandleInvalid(handle))?;

            if params.dimensions == dimensions {
                return Ok(());
            }

            params.dimensions = dimensions;
        }

        unsafe {
            if let Err(err) = self.visitor.resize_texture(handle, dimensions) {
                self.fatal("resize texture", err);
            }
        }

        Ok(())
    }

    #[inline]
    pub fn texture(&self, handle: TextureHandle) -> Option<TextureParams> {
        self.textures.get(handle).cloned()
    }

    #[inline]
    pub fn get_texture_size(&self, handle: TextureHandle) -> Option<Vector2<u32>> {
        self.textures.get(handle).map(|v| v.dimensions)
    }

    #[inline]
    pub fn get_texture_width(&self, handle: TextureHandle) -> Option<u32> {
        self.get_texture_size(handle).map(|v| v.x)
    }

    #[inline]
    pub fn get_texture_height(&self, handle: TextureHandle) -> Option<u32> {
        self.get_texture_size(handle).map(|v| v.y)
    }

    pub fn delete_texture(&mut self, handle: TextureHandle) {
        if self.textures.free(handle).is_none() {
            warn!("{} has been deleted already.", handle);
            return;
        }

        unsafe {
            if let Err(err) = self.visitor.delete_texture(handle) {
                warn!("{}", err);
            }
        }
    }
}

impl Device {
    /// Creates a render pass. Every texture target must be alive.
    pub fn create_render_pass(&mut self, params: RenderPassParams) -> RenderPassHandle {
        if params.colors.len() > MAX_COLOR_TARGETS {
            self.fatal("create render pass", Error::TooManyColorAttachments);
        }

        let textures = params
            .colors
            .iter()
            .filter_map(|v| match *v {
                RenderTarget::Texture(t) => Some(t),
                RenderTarget::Backbuffer => None,
            })
            .chain(params.depth_stencil);

        for v in textures {
            if !self.textures.contains(v) {
                self.fatal("create render pass", Error::TextureHandleInvalid(v));
            }
        }

        let handle = self.passes.create(params.clone());

        unsafe {
            if let Err(err) = self.visitor.create_render_pass(handle, &params) {
                self.fatal("create render pass", err);
            }
        }

        handle
    }

    #[inline]
    pub fn render_pass(&self, handle: RenderPassHandle) -> Option<RenderPassParams> {
        self.passes.get(handle).cloned()
    }

    pub fn delete_render_pass(&mut self, handle: RenderPassHandle) {
        if self.passes.free(handle).is_none() {
            warn!("{} has been deleted already.", handle);
            return;
        }

        unsafe {
            if let Err(err) = self.visitor.delete_render_pass(handle) {
                warn!("{}", err);
            }
        }
    }

    /// Creates a render pipeline. A pipeline built on a shader that failed to
    /// compile is still created, but it draws nothing.
    pub fn create_render_pipeline(&mut self, params: RenderPipelineParams) -> RenderPipelineHandle {
        if !self.passes.contains(params.pass) {
            self.fatal(
                "create render pipeline",
                Error::RenderPassHandleInvalid(params.pass),
            );
        }

        let valid = match self.shaders.get(params.shader) {
            Some(v) => v.valid,
            None => self.fatal(
                "create render pipeline",
                Error::ShaderHandleInvalid(params.shader),
            ),
        };

        let handle = self.pipelines.create(PipelineEntry {
            params: params.clone(),
            valid,
        });

        if valid {
            unsafe {
                if let Err(err) = self.visitor.create_render_pipeline(handle, &params) {
                    self.fatal("create render pipeline", err);
                }
            }
        }

        handle
    }

    #[inline]
    pub fn render_pipeline(&self, handle: RenderPipelineHandle) -> Option<RenderPipelineParams> {
        self.pipelines.get(handle).map(|v| v.params.clone())
    }

    pub fn delete_render_pipeline(&mut self, handle: RenderPipelineHandle) {
        let entry = match self.pipelines.free(handle) {
            Some(v) => v,
            None => {
                warn!("{} has been deleted already.", handle);
                return;
            }
        };

        if self.pipeline == Some(handle) {
            self.pipeline = None;
        }

        if entry.valid {
            unsafe {
                if let Err(err) = self.visitor.delete_render_pipeline(handle) {
                    warn!("{}", err);
                }
            }
        }
    }
}

impl Device {
    /// Sets the viewport in pixels, with the origin at the top-left corner.
    pub fn set_viewport(&mut self, viewport: Rect) -> Result<()> {
        unsafe {
            self.visitor.set_viewport(viewport)?;
        }

        Ok(())
    }

    /// Restricts rendering to `rect`, in pixels from the top-left corner.
    pub fn begin_scissor(&mut self, rect: Rect) -> Result<()> {
        unsafe {
            self.visitor.begin_scissor(rect, self.dimensions)?;
        }

        self.scissor = true;
        Ok(())
    }

    pub fn end_scissor(&mut self) -> Result<()> {
        if self.scissor {
            unsafe {
                self.visitor.end_scissor()?;
            }

            self.scissor = false;
        }

        Ok(())
    }

    /// Starts a render pass. Passes do not nest.
    pub fn begin_render_pass(&mut self, handle: RenderPassHandle) -> Result<()> {
        if self.pass.is_some() {
            return Err(Error::PassAlreadyStarted);
        }

        if !self.passes.contains(handle) {
            return Err(Error::RenderPassHandleInvalid(handle));
        }

        unsafe {
            self.visitor.begin_render_pass(handle)?;
        }

        self.pass = Some(handle);
        self.pipeline = None;
        Ok(())
    }

    pub fn end_render_pass(&mut self) -> Result<()> {
        if self.pass.is_none() {
            return Err(Error::PassNotStarted);
        }

        self.pass = None;
        self.pipeline = None;

        unsafe {
            self.visitor.end_render_pass()?;
        }

        Ok(())
    }

    /// Returns the render pass that has been started, if any.
    #[inline]
    pub fn current_pass(&self) -> Option<RenderPassHandle> {
        self.pass
    }

    pub fn bind_pipeline(&mut self, handle: RenderPipelineHandle) -> Result<()> {
        if self.pass.is_none() {
            return Err(Error::PipelineOutsidePass);
        }

        let valid = self
            .pipelines
            .get(handle)
            .map(|v| v.valid)
            .ok_or_else(|| Error::RenderPipelineHandleInvalid(handle))?;

        if valid {
            unsafe {
                self.visitor.bind_pipeline(handle)?;
            }
        }

        self.pipeline = Some(handle);
        self.pipeline_valid = valid;
        Ok(())
    }

    /// Binds a buffer. Vertex buffers feed every enabled attribute of the bound
    /// pipeline, uniform buffers are bound to `slot`.
    #[inline]
    pub fn bind_buffer(&mut self, handle: BufferHandle, slot: u32) -> Result<()> {
        self.bind_buffer_with_mask(handle, slot, AttribMask::all())
    }

    /// Binds a vertex buffer, feeding only the attributes in `mask`. A partial mask
    /// on any other kind of buffer is a `BufferTypeMismatch`.
    pub fn bind_buffer_with_mask(
        &mut self,
        handle: BufferHandle,
        slot: u32,
        mask: AttribMask,
    ) -> Result<()> {
        let typ = self
            .buffers
            .get(handle)
            .map(|v| v.typ)
            .ok_or_else(|| Error::BufferHandleInvalid(handle))?;

        if typ != BufferType::Vertex && mask != AttribMask::all() {
            return Err(Error::BufferTypeMismatch {
                expected: BufferType::Vertex,
                found: typ,
            });
        }

        match typ {
            BufferType::Vertex => {
                if self.pipeline.is_none() {
                    return Err(Error::PipelineNotBound);
                }
            }
            BufferType::Uniform => {
                if slot as usize >= MAX_SHADER_UNIFORMS {
                    return Err(Error::InvalidSlot {
                        slot: slot as usize,
                        max: MAX_SHADER_UNIFORMS,
                    });
                }
            }
            BufferType::Element => {}
        }

        if !self.pipeline_valid {
            return Ok(());
        }

        unsafe {
            self.visitor.bind_buffer(handle, slot, mask)?;
        }

        Ok(())
    }

    /// Binds a texture to `unit`. Without a sampler the backend default is used.
    pub fn bind_texture(
        &mut self,
        texture: TextureHandle,
        sampler: Option<SamplerHandle>,
        unit: u32,
    ) -> Result<()> {
        if unit as usize >= MAX_TEXTURE_UNITS {
            return Err(Error::InvalidSlot {
                slot: unit as usize,
                max: MAX_TEXTURE_UNITS,
            });
        }

        if !self.textures.contains(texture) {
            return Err(Error::TextureHandleInvalid(texture));
        }

        if let Some(v) = sampler {
            if !self.samplers.contains(v) {
                return Err(Error::SamplerHandleInvalid(v));
            }
        }

        if !self.pipeline_valid {
            return Ok(());
        }

        unsafe {
            self.visitor.bind_texture(texture, sampler, unit)?;
        }

        Ok(())
    }

    fn check_draw(&self) -> Result<bool> {
        if self.pass.is_none() {
            return Err(Error::PassNotStarted);
        }

        if self.pipeline.is_none() {
            return Err(Error::PipelineNotBound);
        }

        Ok(self.pipeline_valid)
    }

    /// Draws `count` vertices of the bound vertex buffer. Drawing nothing is a no-op.
    pub fn draw_arrays(&mut self, count: u32) -> Result<()> {
        if count == 0 {
            return Ok(());
        }

        if self.check_draw()? {
            unsafe {
                self.visitor.draw_arrays(count)?;
            }
        }

        Ok(())
    }

    /// Draws `count` indices of the bound element buffer, starting at `offset` bytes.
    pub fn draw_elements(&mut self, count: u32, typ: ElementType, offset: usize) -> Result<()> {
        if count == 0 {
            return Ok(());
        }

        if self.check_draw()? {
            unsafe {
                self.visitor.draw_elements(count, typ, offset)?;
            }
        }

        Ok(())
    }
}

impl Device {
    /// Notifies the backend if the window changed its dimensions since the last
    /// call. Returns true if the backbuffer has been resized.
    pub fn maybe_resize_backbuffer(&mut self) -> Result<bool> {
        let dimensions = self.window.dimensions();
        if dimensions == self.dimensions {
            return Ok(false);
        }

        debug!(
            "Resizes backbuffer from {:?} to {:?}.",
            self.dimensions, dimensions
        );

        self.dimensions = dimensions;
        unsafe {
            self.visitor.resize_backbuffer(dimensions)?;
        }

        Ok(true)
    }

    /// Presents the backbuffer to the window.
    pub fn present(&mut self) -> Result<()> {
        if self.pass.is_some() {
            return Err(Error::PassAlreadyStarted);
        }

        unsafe {
            self.visitor.present(self.window.as_ref())?;
        }

        Ok(())
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        if self.pass.is_some() {
            let _ = self.end_render_pass();
        }

        for v in self.pipelines.handles() {
            self.delete_render_pipeline(v);
        }

        for v in self.passes.handles() {
            self.delete_render_pass(v);
        }

        for v in self.textures.handles() {
            self.delete_texture(v);
        }

        for v in self.samplers.handles() {
            self.delete_sampler(v);
        }

        for v in self.shaders.handles() {
            self.delete_shader(v);
        }

        for v in self.buffers.handles() {
            self.delete_buffer(v);
        }

        info!("Device {:?} shut down.", self.kind);
    }
}
