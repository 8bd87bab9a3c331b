use std::ffi::CString;
use std::os::raw::c_void;
use std::ptr;

use gl;
use gl::types::*;
use smallvec::SmallVec;

use crate::errors::*;
use crate::math::{Rect, Vector2};
use crate::window::Window;

use super::super::super::assets::prelude::*;
use super::super::utils::DataVec;
use super::super::{GlslProfile, Visitor};
use super::capabilities::Capabilities;
use super::types;

#[derive(Debug)]
struct GLBufferData {
    id: GLuint,
    params: BufferParams,
    capacity: usize,
}

#[derive(Debug)]
struct GLShaderData {
    id: GLuint,
    params: ShaderParams,
}

#[derive(Debug)]
struct GLTextureData {
    id: GLuint,
    params: TextureParams,
}

#[derive(Debug)]
struct GLRenderPassData {
    /// `None` for the default framebuffer.
    fbo: Option<GLuint>,
    params: RenderPassParams,
}

#[derive(Debug, Copy, Clone)]
enum GLUniform {
    Block { index: GLuint, bind: GLuint },
    Texture { location: GLint, bind: GLint },
}

#[derive(Debug)]
struct GLPipelineData {
    program: GLuint,
    params: RenderPipelineParams,
    uniforms: SmallVec<[GLUniform; 8]>,
}

/// Mirrors the fixed-function state of the context, so redundant GL calls are skipped.
struct GLMutableState {
    program: Option<GLuint>,
    cull: Option<CullFace>,
    depth_read: Option<bool>,
    depth_write: Option<bool>,
    depth_op: Option<DepthOp>,
    blend: Option<BlendMode>,
    viewport: Option<Rect>,
    scissor: bool,
}

pub struct GLVisitor {
    state: GLMutableState,
    capabilities: Capabilities,
    glsl: GlslProfile,
    vao: GLuint,
    pipeline: Option<RenderPipelineHandle>,
    buffers: DataVec<GLBufferData>,
    shaders: DataVec<GLShaderData>,
    samplers: DataVec<GLuint>,
    textures: DataVec<GLTextureData>,
    passes: DataVec<GLRenderPassData>,
    pipelines: DataVec<GLPipelineData>,
}

impl GLVisitor {
    /// Creates a visitor for the GL context of `window`, which must be current on
    /// this thread.
    pub unsafe fn new(window: &dyn Window, glsl: GlslProfile) -> Result<Self> {
        gl::load_with(|symbol| window.get_proc_address(symbol) as *const _);

        let capabilities = Capabilities::parse()?;
        info!("GLVisitor {:#?}", capabilities);

        if !capabilities.is_supported() {
            bail!(
                "The OpenGL implementation {:?} is too old, 3.3 or ES 3.0 is required.",
                capabilities.version
            );
        }

        let requested = glsl;
        let glsl = capabilities.glsl(requested);
        if glsl != requested {
            warn!("{:?} is not available, compiles shaders as {:?}.", requested, glsl);
        }

        // One vertex array object is all we need, attributes are re-specified on
        // every vertex buffer bind.
        let mut vao = 0;
        gl::GenVertexArrays(1, &mut vao);
        gl::BindVertexArray(vao);
        gl::PixelStorei(gl::UNPACK_ALIGNMENT, 1);
        check()?;

        let state = GLMutableState {
            program: None,
            cull: None,
            depth_read: None,
            depth_write: None,
            depth_op: None,
            blend: None,
            viewport: None,
            scissor: false,
        };

        Ok(GLVisitor {
            state,
            capabilities,
            glsl,
            vao,
            pipeline: None,
            buffers: DataVec::new(),
            shaders: DataVec::new(),
            samplers: DataVec::new(),
            textures: DataVec::new(),
            passes: DataVec::new(),
            pipelines: DataVec::new(),
        })
    }
}

impl Drop for GLVisitor {
    fn drop(&mut self) {
        unsafe {
            // Pipelines only borrow programs owned by shaders.
            self.pipelines.drain();

            for v in self.passes.drain() {
                if let Some(fbo) = v.fbo {
                    gl::DeleteFramebuffers(1, &fbo);
                }
            }

            for v in self.textures.drain() {
                gl::DeleteTextures(1, &v.id);
            }

            for v in self.samplers.drain() {
                gl::DeleteSamplers(1, &v);
            }

            for v in self.shaders.drain() {
                gl::DeleteProgram(v.id);
            }

            for v in self.buffers.drain() {
                gl::DeleteBuffers(1, &v.id);
            }

            gl::DeleteVertexArrays(1, &self.vao);
        }
    }
}

impl Visitor for GLVisitor {
    unsafe fn create_buffer(
        &mut self,
        handle: BufferHandle,
        params: &BufferParams,
        data: Option<&[u8]>,
    ) -> Result<()> {
        let mut id = 0;
        gl::GenBuffers(1, &mut id);
        if id == 0 {
            bail!("[GL] Failed to generate buffer object.");
        }

        let target: GLenum = params.typ.into();
        gl::BindBuffer(target, id);

        let value = match data {
            Some(v) if !v.is_empty() => v.as_ptr() as *const c_void,
            _ => ptr::null(),
        };

        let size = data.map(|v| v.len()).unwrap_or(0).max(params.size);
        gl::BufferData(target, size as GLsizeiptr, value, params.usage.into());
        check()?;

        self.buffers.create(
            handle,
            GLBufferData {
                id,
                params: *params,
                capacity: size,
            },
        );

        Ok(())
    }

    unsafe fn update_buffer(&mut self, handle: BufferHandle, data: &[u8]) -> Result<()> {
        let buffer = self
            .buffers
            .get_mut(handle)
            .ok_or_else(|| format_err!("{} is invalid.", handle))?;

        if data.is_empty() {
            return Ok(());
        }

        let target: GLenum = buffer.params.typ.into();
        gl::BindBuffer(target, buffer.id);

        if data.len() > buffer.capacity {
            // Re-specifies the storage, the buffer name stays the same.
            gl::BufferData(
                target,
                data.len() as GLsizeiptr,
                data.as_ptr() as *const c_void,
                buffer.params.usage.into(),
            );

            buffer.capacity = data.len();
        } else {
            gl::BufferSubData(
                target,
                0,
                data.len() as GLsizeiptr,
                data.as_ptr() as *const c_void,
            );
        }

        check()
    }

    unsafe fn delete_buffer(&mut self, handle: BufferHandle) -> Result<()> {
        let buffer = self
            .buffers
            .free(handle)
            .ok_or_else(|| format_err!("{} is invalid.", handle))?;

        gl::DeleteBuffers(1, &buffer.id);
        check()
    }

    unsafe fn create_shader(
        &mut self,
        handle: ShaderHandle,
        params: &ShaderParams,
        source: &[u8],
    ) -> Result<()> {
        let vs = Self::compile(gl::VERTEX_SHADER, self.glsl.vertex_preamble(), source)?;
        let fs = match Self::compile(gl::FRAGMENT_SHADER, self.glsl.fragment_preamble(), source)
        {
            Ok(fs) => fs,
            Err(err) => {
                gl::DeleteShader(vs);
                return Err(err);
            }
        };

        let id = Self::link(&[vs, fs]);

        gl::DeleteShader(vs);
        gl::DeleteShader(fs);

        let id = id?;
        check()?;

        self.shaders.create(
            handle,
            GLShaderData {
                id,
                params: params.clone(),
            },
        );

        Ok(())
    }

    unsafe fn delete_shader(&mut self, handle: ShaderHandle) -> Result<()> {
        let shader = self
            .shaders
            .free(handle)
            .ok_or_else(|| format_err!("{} is invalid.", handle))?;

        if self.state.program == Some(shader.id) {
            self.state.program = None;
        }

        gl::DeleteProgram(shader.id);
        check()
    }

    unsafe fn create_sampler(
        &mut self,
        handle: SamplerHandle,
        params: &SamplerParams,
    ) -> Result<()> {
        let mut id = 0;
        gl::GenSamplers(1, &mut id);
        if id == 0 {
            bail!("[GL] Failed to generate sampler object.");
        }

        let filter: GLenum = params.filter.into();
        gl::SamplerParameteri(id, gl::TEXTURE_MIN_FILTER, filter as GLint);
        gl::SamplerParameteri(id, gl::TEXTURE_MAG_FILTER, filter as GLint);

        let wrap_x: GLenum = params.wrap_x.into();
        let wrap_y: GLenum = params.wrap_y.into();
        let wrap_z: GLenum = params.wrap_z.into();
        gl::SamplerParameteri(id, gl::TEXTURE_WRAP_S, wrap_x as GLint);
        gl::SamplerParameteri(id, gl::TEXTURE_WRAP_T, wrap_y as GLint);
        gl::SamplerParameteri(id, gl::TEXTURE_WRAP_R, wrap_z as GLint);
        check()?;

        self.samplers.create(handle, id);
        Ok(())
    }

    unsafe fn delete_sampler(&mut self, handle: SamplerHandle) -> Result<()> {
        let id = self
            .samplers
            .free(handle)
            .ok_or_else(|| format_err!("{} is invalid.", handle))?;

        gl::DeleteSamplers(1, &id);
        check()
    }

    unsafe fn create_texture(
        &mut self,
        handle: TextureHandle,
        params: &TextureParams,
        data: Option<&[u8]>,
    ) -> Result<()> {
        if let Some(v) = data {
            if v.len() < params.bytes() {
                bail!(
                    "Texture data of {} bytes is too small for {:?}.",
                    v.len(),
                    params
                );
            }
        }

        let mut id = 0;
        gl::GenTextures(1, &mut id);
        if id == 0 {
            bail!("[GL] Failed to generate texture object.");
        }

        Self::alloc_texture(id, params, data)?;
        self.textures.create(
            handle,
            GLTextureData {
                id,
                params: *params,
            },
        );

        Ok(())
    }

    unsafe fn resize_texture(
        &mut self,
        handle: TextureHandle,
        dimensions: Vector2<u32>,
    ) -> Result<()> {
        let texture = self
            .textures
            .get_mut(handle)
            .ok_or_else(|| format_err!("{} is invalid.", handle))?;

        texture.params.dimensions = dimensions;
        Self::alloc_texture(texture.id, &texture.params, None)
    }

    unsafe fn delete_texture(&mut self, handle: TextureHandle) -> Result<()> {
        let texture = self
            .textures
            .free(handle)
            .ok_or_else(|| format_err!("{} is invalid.", handle))?;

        gl::DeleteTextures(1, &texture.id);
        check()
    }

    unsafe fn create_render_pass(
        &mut self,
        handle: RenderPassHandle,
        params: &RenderPassParams,
    ) -> Result<()> {
        if params.colors.len() as u32 > self.capabilities.max_color_attachments {
            bail!(
                "Too many color attachments ({} > {}).",
                params.colors.len(),
                self.capabilities.max_color_attachments
            );
        }

        let fbo = if params.is_backbuffer() {
            None
        } else {
            let mut id = 0;
            gl::GenFramebuffers(1, &mut id);
            if id == 0 {
                bail!("[GL] Failed to generate framebuffer object.");
            }

            gl::BindFramebuffer(gl::FRAMEBUFFER, id);
            if let Err(err) = self.attach_targets(params) {
                gl::BindFramebuffer(gl::FRAMEBUFFER, 0);
                gl::DeleteFramebuffers(1, &id);
                return Err(err);
            }

            gl::BindFramebuffer(gl::FRAMEBUFFER, 0);
            Some(id)
        };

        self.passes.create(
            handle,
            GLRenderPassData {
                fbo,
                params: params.clone(),
            },
        );

        Ok(())
    }

    unsafe fn delete_render_pass(&mut self, handle: RenderPassHandle) -> Result<()> {
        let pass = self
            .passes
            .free(handle)
            .ok_or_else(|| format_err!("{} is invalid.", handle))?;

        if let Some(fbo) = pass.fbo {
            gl::DeleteFramebuffers(1, &fbo);
        }

        check()
    }

    unsafe fn create_render_pipeline(
        &mut self,
        handle: RenderPipelineHandle,
        params: &RenderPipelineParams,
    ) -> Result<()> {
        let shader = self
            .shaders
            .get(params.shader)
            .ok_or_else(|| format_err!("{} is invalid.", params.shader))?;

        let mut uniforms = SmallVec::new();
        for v in &shader.params.uniforms {
            let name = CString::new(v.name.as_bytes())
                .map_err(|_| format_err!("Uniform name {:?} contains a nul byte.", v.name))?;

            match v.typ {
                UniformType::Buffer => {
                    let index = gl::GetUniformBlockIndex(shader.id, name.as_ptr());
                    if index == gl::INVALID_INDEX {
                        warn!("Uniform block {:?} is not active in {}.", v.name, params.shader);
                        continue;
                    }

                    uniforms.push(GLUniform::Block {
                        index,
                        bind: v.bind,
                    });
                }
                UniformType::Texture => {
                    let location = gl::GetUniformLocation(shader.id, name.as_ptr());
                    if location == -1 {
                        warn!("Uniform {:?} is not active in {}.", v.name, params.shader);
                        continue;
                    }

                    uniforms.push(GLUniform::Texture {
                        location,
                        bind: v.bind as GLint,
                    });
                }
            }
        }

        check()?;

        self.pipelines.create(
            handle,
            GLPipelineData {
                program: shader.id,
                params: params.clone(),
                uniforms,
            },
        );

        Ok(())
    }

    unsafe fn delete_render_pipeline(&mut self, handle: RenderPipelineHandle) -> Result<()> {
        self.pipelines
            .free(handle)
            .ok_or_else(|| format_err!("{} is invalid.", handle))?;

        if self.pipeline == Some(handle) {
            self.pipeline = None;
        }

        Ok(())
    }

    unsafe fn set_viewport(&mut self, viewport: Rect) -> Result<()> {
        if self.state.viewport != Some(viewport) {
            gl::Viewport(
                viewport.x as GLint,
                viewport.y as GLint,
                viewport.w as GLsizei,
                viewport.h as GLsizei,
            );

            self.state.viewport = Some(viewport);
            check()?;
        }

        Ok(())
    }

    unsafe fn begin_scissor(&mut self, rect: Rect, dimensions: Vector2<u32>) -> Result<()> {
        // GL places the origin at the bottom-left corner.
        let rect = rect.flip_y(dimensions.y as f32);
        gl::Scissor(
            rect.x as GLint,
            rect.y as GLint,
            rect.w as GLsizei,
            rect.h as GLsizei,
        );

        if !self.state.scissor {
            gl::Enable(gl::SCISSOR_TEST);
            self.state.scissor = true;
        }

        check()
    }

    unsafe fn end_scissor(&mut self) -> Result<()> {
        if self.state.scissor {
            gl::Disable(gl::SCISSOR_TEST);
            self.state.scissor = false;
        }

        check()
    }

    unsafe fn begin_render_pass(&mut self, handle: RenderPassHandle) -> Result<()> {
        let pass = self
            .passes
            .get(handle)
            .ok_or_else(|| format_err!("{} is invalid.", handle))?;

        gl::BindFramebuffer(gl::FRAMEBUFFER, pass.fbo.unwrap_or(0));

        if pass.params.clear {
            let mut bits = 0;
            if !pass.params.colors.is_empty() {
                bits |= gl::COLOR_BUFFER_BIT;
            }

            if pass.fbo.is_some() && pass.params.depth_stencil.is_some() {
                bits |= gl::DEPTH_BUFFER_BIT | gl::STENCIL_BUFFER_BIT;
                // Depth writes must be enabled for the clear to reach the buffer.
                Self::set_depth_write(&mut self.state, true);
            }

            if bits != 0 {
                let c = pass.params.clear_color;
                gl::ClearColor(c.r, c.g, c.b, c.a);
                gl::Clear(bits);
            }
        }

        self.pipeline = None;
        check()
    }

    unsafe fn end_render_pass(&mut self) -> Result<()> {
        self.pipeline = None;
        Ok(())
    }

    unsafe fn bind_pipeline(&mut self, handle: RenderPipelineHandle) -> Result<()> {
        let pipeline = self
            .pipelines
            .get(handle)
            .ok_or_else(|| format_err!("{} is invalid.", handle))?;

        if self.state.program != Some(pipeline.program) {
            gl::UseProgram(pipeline.program);
            self.state.program = Some(pipeline.program);
        }

        for v in &pipeline.uniforms {
            match *v {
                GLUniform::Block { index, bind } => {
                    gl::UniformBlockBinding(pipeline.program, index, bind)
                }
                GLUniform::Texture { location, bind } => gl::Uniform1i(location, bind),
            }
        }

        let params = &pipeline.params;
        Self::set_depth_test(&mut self.state, params.depth_read, params.depth_op);
        Self::set_depth_write(&mut self.state, params.depth_write);
        Self::set_cull_face(&mut self.state, params.cull);
        Self::set_blend(&mut self.state, params.blend);

        self.pipeline = Some(handle);
        check()
    }

    unsafe fn bind_buffer(
        &mut self,
        handle: BufferHandle,
        slot: u32,
        mask: AttribMask,
    ) -> Result<()> {
        let buffer = self
            .buffers
            .get(handle)
            .ok_or_else(|| format_err!("{} is invalid.", handle))?;

        match buffer.params.typ {
            BufferType::Uniform => {
                gl::BindBufferBase(gl::UNIFORM_BUFFER, slot, buffer.id);
            }
            BufferType::Element => {
                gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, buffer.id);
            }
            BufferType::Vertex => {
                gl::BindBuffer(gl::ARRAY_BUFFER, buffer.id);

                let pipeline = self
                    .pipeline
                    .and_then(|v| self.pipelines.get(v))
                    .ok_or_else(|| format_err!("Vertex buffers require a bound pipeline."))?;

                let layout = &pipeline.params.layout;
                for v in &layout.attribs {
                    if v.enabled && mask.contains(v.index) {
                        let (typ, size, normalized) = v.typ.into();
                        gl::EnableVertexAttribArray(v.index);
                        gl::VertexAttribPointer(
                            v.index,
                            size,
                            typ,
                            normalized,
                            layout.stride as GLsizei,
                            v.offset as *const c_void,
                        );
                    } else {
                        gl::DisableVertexAttribArray(v.index);
                    }
                }
            }
        }

        check()
    }

    unsafe fn bind_texture(
        &mut self,
        texture: TextureHandle,
        sampler: Option<SamplerHandle>,
        unit: u32,
    ) -> Result<()> {
        if unit >= self.capabilities.max_combined_texture_image_units {
            bail!("Texture unit {} is out of range.", unit);
        }

        let texture = self
            .textures
            .get(texture)
            .ok_or_else(|| format_err!("{} is invalid.", texture))?;

        let sampler = match sampler {
            Some(v) => *self
                .samplers
                .get(v)
                .ok_or_else(|| format_err!("{} is invalid.", v))?,
            None => 0,
        };

        gl::ActiveTexture(gl::TEXTURE0 + unit);
        gl::BindTexture(texture.params.typ.into(), texture.id);
        gl::BindSampler(unit, sampler);
        check()
    }

    unsafe fn draw_arrays(&mut self, count: u32) -> Result<()> {
        let mode = self.draw_mode()?;
        gl::DrawArrays(mode, 0, count as GLsizei);
        check()
    }

    unsafe fn draw_elements(&mut self, count: u32, typ: ElementType, offset: usize) -> Result<()> {
        let mode = self.draw_mode()?;
        gl::DrawElements(
            mode,
            count as GLsizei,
            typ.into(),
            offset as *const c_void,
        );
        check()
    }

    unsafe fn resize_backbuffer(&mut self, _: Vector2<u32>) -> Result<()> {
        // The default framebuffer follows the window.
        Ok(())
    }

    unsafe fn present(&mut self, window: &dyn Window) -> Result<()> {
        window.swap_buffers()
    }
}

impl GLVisitor {
    unsafe fn draw_mode(&self) -> Result<GLenum> {
        let pipeline = self
            .pipeline
            .and_then(|v| self.pipelines.get(v))
            .ok_or_else(|| format_err!("Draw call without pipeline."))?;

        Ok(pipeline.params.draw_mode.into())
    }

    unsafe fn attach_targets(&self, params: &RenderPassParams) -> Result<()> {
        let mut draw_buffers: SmallVec<[GLenum; 4]> = SmallVec::new();

        for (i, target) in params.colors.iter().enumerate() {
            let texture = match *target {
                RenderTarget::Texture(v) => self
                    .textures
                    .get(v)
                    .ok_or_else(|| format_err!("{} is invalid.", v))?,
                RenderTarget::Backbuffer => {
                    bail!("The backbuffer can not be mixed with texture targets.")
                }
            };

            if texture.params.format.is_depth() {
                bail!("Color target {} has a depth format.", i);
            }

            let attachment = gl::COLOR_ATTACHMENT0 + i as GLenum;
            gl::FramebufferTexture2D(
                gl::FRAMEBUFFER,
                attachment,
                gl::TEXTURE_2D,
                texture.id,
                0,
            );

            draw_buffers.push(attachment);
        }

        if let Some(v) = params.depth_stencil {
            let texture = self
                .textures
                .get(v)
                .ok_or_else(|| format_err!("{} is invalid.", v))?;

            if !texture.params.format.is_depth() {
                bail!("Depth target {} has a color format.", v);
            }

            gl::FramebufferTexture2D(
                gl::FRAMEBUFFER,
                gl::DEPTH_STENCIL_ATTACHMENT,
                gl::TEXTURE_2D,
                texture.id,
                0,
            );
        }

        if draw_buffers.is_empty() {
            gl::DrawBuffer(gl::NONE);
        } else {
            gl::DrawBuffers(draw_buffers.len() as GLsizei, draw_buffers.as_ptr());
        }

        match gl::CheckFramebufferStatus(gl::FRAMEBUFFER) {
            gl::FRAMEBUFFER_COMPLETE => check(),

            gl::FRAMEBUFFER_INCOMPLETE_ATTACHMENT => bail!(
                "[GL] Render pass is incomplete. At least one attachment has a width or height \
                 of zero, or a format that can not be rendered into."
            ),

            gl::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT => {
                bail!("[GL] Render pass is incomplete. No images are attached to the framebuffer.")
            }

            gl::FRAMEBUFFER_UNSUPPORTED => bail!(
                "[GL] Render pass is incomplete. The combination of internal formats of the \
                 attached images violates an implementation-dependent set of restrictions."
            ),

            _ => bail!("[GL] Render pass is incomplete."),
        }
    }

    unsafe fn alloc_texture(id: GLuint, params: &TextureParams, data: Option<&[u8]>) -> Result<()> {
        let target: GLenum = params.typ.into();
        let (internal_format, format, pixel_type) = params.format.into();

        let value = match data {
            Some(v) if !v.is_empty() => v.as_ptr() as *const c_void,
            _ => ptr::null(),
        };

        gl::BindTexture(target, id);
        gl::TexImage2D(
            target,
            0,
            internal_format as GLint,
            params.dimensions.x as GLsizei,
            params.dimensions.y as GLsizei,
            0,
            format,
            pixel_type,
            value,
        );

        // Sampling state lives in sampler objects, the texture itself is never mipmapped.
        gl::TexParameteri(target, gl::TEXTURE_MAX_LEVEL, 0);
        gl::BindTexture(target, 0);
        check()
    }

    unsafe fn compile(stage: GLenum, preamble: &str, source: &[u8]) -> Result<GLuint> {
        let shader = gl::CreateShader(stage);
        if shader == 0 {
            bail!("[GL] Failed to create shader object.");
        }

        let sources = [preamble.as_ptr() as *const GLchar, source.as_ptr() as *const GLchar];
        let lens = [preamble.len() as GLint, source.len() as GLint];
        gl::ShaderSource(shader, 2, sources.as_ptr(), lens.as_ptr());
        gl::CompileShader(shader);

        let mut status = GLint::from(gl::FALSE);
        gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut status);

        if status != GLint::from(gl::TRUE) {
            let mut len = 0;
            gl::GetShaderiv(shader, gl::INFO_LOG_LENGTH, &mut len);
            let mut buf = vec![0u8; len.max(1) as usize];
            gl::GetShaderInfoLog(shader, len, ptr::null_mut(), buf.as_mut_ptr() as *mut GLchar);
            gl::DeleteShader(shader);

            let stage = if stage == gl::VERTEX_SHADER {
                "vertex"
            } else {
                "fragment"
            };

            bail!(
                "[GL] Failed to compile {} shader:\n{}",
                stage,
                String::from_utf8_lossy(&buf).trim_end_matches('\0')
            );
        }

        Ok(shader)
    }

    unsafe fn link(shaders: &[GLuint]) -> Result<GLuint> {
        let program = gl::CreateProgram();
        for &v in shaders {
            gl::AttachShader(program, v);
        }

        gl::LinkProgram(program);

        for &v in shaders {
            gl::DetachShader(program, v);
        }

        let mut status = GLint::from(gl::FALSE);
        gl::GetProgramiv(program, gl::LINK_STATUS, &mut status);

        if status != GLint::from(gl::TRUE) {
            let mut len: GLint = 0;
            gl::GetProgramiv(program, gl::INFO_LOG_LENGTH, &mut len);
            let mut buf = vec![0u8; len.max(1) as usize];
            gl::GetProgramInfoLog(program, len, ptr::null_mut(), buf.as_mut_ptr() as *mut GLchar);
            gl::DeleteProgram(program);

            bail!(
                "[GL] Failed to link program:\n{}",
                String::from_utf8_lossy(&buf).trim_end_matches('\0')
            );
        }

        Ok(program)
    }
}

impl GLVisitor {
    /// Specify whether front- or back-facing polygons can be culled.
    unsafe fn set_cull_face(state: &mut GLMutableState, face: CullFace) {
        if state.cull != Some(face) {
            if face == CullFace::None {
                gl::Disable(gl::CULL_FACE);
            } else {
                gl::Enable(gl::CULL_FACE);
                gl::CullFace(face.into());
            }

            state.cull = Some(face);
        }
    }

    unsafe fn set_depth_test(state: &mut GLMutableState, read: bool, op: DepthOp) {
        if state.depth_read != Some(read) {
            if read {
                gl::Enable(gl::DEPTH_TEST);
            } else {
                gl::Disable(gl::DEPTH_TEST);
            }

            state.depth_read = Some(read);
        }

        if state.depth_op != Some(op) {
            gl::DepthFunc(op.into());
            state.depth_op = Some(op);
        }
    }

    unsafe fn set_depth_write(state: &mut GLMutableState, write: bool) {
        if state.depth_write != Some(write) {
            gl::DepthMask(if write { gl::TRUE } else { gl::FALSE });
            state.depth_write = Some(write);
        }
    }

    /// Specifies how source and destination are combined.
    unsafe fn set_blend(state: &mut GLMutableState, blend: BlendMode) {
        if state.blend != Some(blend) {
            match types::blend_factors(blend) {
                Some((src, dst)) => {
                    gl::BlendFunc(src, dst);
                    gl::BlendEquation(gl::FUNC_ADD);
                    gl::Enable(gl::BLEND);
                }
                None => gl::Disable(gl::BLEND),
            }

            state.blend = Some(blend);
        }
    }
}

unsafe fn check() -> Result<()> {
    match gl::GetError() {
        gl::NO_ERROR => Ok(()),

        gl::INVALID_ENUM => {
            bail!("[GL] An unacceptable value is specified for an enumerated argument.")
        }

        gl::INVALID_VALUE => bail!("[GL] A numeric argument is out of range."),

        gl::INVALID_OPERATION => {
            bail!("[GL] The specified operation is not allowed in the current state.")
        }

        gl::INVALID_FRAMEBUFFER_OPERATION => bail!(
            "[GL] The command is trying to render to or read from the framebuffer while the \
             currently bound framebuffer is not framebuffer complete."
        ),

        gl::OUT_OF_MEMORY => bail!("[GL] There is not enough memory left to execute the command."),
        _ => bail!("[GL] Oops, Unknown OpenGL error."),
    }
}
