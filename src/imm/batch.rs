use smallvec::SmallVec;

use crate::video::assets::prelude::*;
use crate::video::errors::*;

use super::vertex::{AttribCounts, ImmAttrib, ImmUniforms, ImmVertex};
use super::{ImmContext, ImmSampler};

/// What has to be recreated before the next draw. A pipeline references its pass,
/// so a dirty pass implies a dirty pipeline.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rebuild {
    Clean,
    Pipeline,
    Pass,
}

impl Rebuild {
    #[inline]
    pub fn mark(&mut self, v: Rebuild) {
        *self = ::std::cmp::max(*self, v);
    }
}

impl ImmContext {
    /// Starts a draw with `mode`. Draws do not nest.
    #[inline]
    pub fn imm_begin(&mut self, mode: DrawMode) -> Result<()> {
        self.begin(mode, false)
    }

    pub(super) fn begin(&mut self, mode: DrawMode, clear: bool) -> Result<()> {
        if self.drawing {
            return Err(Error::AlreadyDrawing);
        }

        if self.should_clear != clear {
            self.should_clear = clear;
            self.rebuild.mark(Rebuild::Pass);
        }

        if self.draw_mode != mode {
            self.draw_mode = mode;
            self.rebuild.mark(Rebuild::Pipeline);
        }

        if self.rebuild == Rebuild::Pass {
            self.rebuild_pass();
        }

        if self.rebuild >= Rebuild::Pipeline {
            self.rebuild_pipeline();
        }

        self.rebuild = Rebuild::Clean;
        self.counts = AttribCounts::default();
        self.drawing = true;
        Ok(())
    }

    fn rebuild_pass(&mut self) {
        if let Some(pass) = self.pass.take() {
            self.device.delete_render_pass(pass);
        }

        let mut colors = SmallVec::new();
        colors.push(RenderTarget::from(self.color_target));

        let params = RenderPassParams {
            colors,
            depth_stencil: self.depth_target,
            clear: self.should_clear,
            clear_color: self.clear_color,
        };

        self.pass = Some(self.device.create_render_pass(params));
        self.stats.pass_rebuilds += 1;
        trace!("Rebuilds imm render pass, {} so far.", self.stats.pass_rebuilds);
    }

    fn rebuild_pipeline(&mut self) {
        if let Some(pipeline) = self.pipeline.take() {
            self.device.delete_render_pipeline(pipeline);
        }

        let pass = match self.pass {
            Some(pass) => pass,
            None => return,
        };

        let mut params = RenderPipelineParams::new(pass, self.shader.unwrap_or(self.def_shader));
        params.layout = self.layout.clone();
        params.draw_mode = self.draw_mode;
        params.blend = BlendMode::Alpha;
        params.cull = CullFace::None;
        params.depth_read = self.depth_read;
        params.depth_write = self.depth_write;

        self.pipeline = Some(self.device.create_render_pipeline(params));
        self.stats.pipeline_rebuilds += 1;
        trace!(
            "Rebuilds imm render pipeline, {} so far.",
            self.stats.pipeline_rebuilds
        );
    }

    /// Flushes the vertices pushed since `imm_begin` as one draw call.
    pub fn imm_end(&mut self) -> Result<()> {
        if !self.drawing {
            return Err(Error::NotDrawing);
        }

        self.drawing = false;
        self.texture_batch = false;

        let (pass, pipeline) = match (self.pass, self.pipeline) {
            (Some(pass), Some(pipeline)) => (pass, pipeline),
            _ => return Ok(()),
        };

        self.device.set_viewport(self.viewport)?;
        self.device.begin_render_pass(pass)?;

        let result = self.flush(pipeline);
        let end = self.device.end_render_pass();
        result.and(end)
    }

    fn flush(&mut self, pipeline: RenderPipelineHandle) -> Result<()> {
        self.device.bind_pipeline(pipeline)?;

        let use_texture = self.counts.get(ImmAttrib::Texcoord) > 0
            && self.textures.iter().any(|v| v.is_some());

        if use_texture {
            let def = self.imm_get_def_sampler(ImmSampler::ClampNearest);
            for (unit, texture) in self.textures.iter().enumerate() {
                if let Some(texture) = *texture {
                    let sampler = self.samplers[unit].unwrap_or(def);
                    self.device.bind_texture(texture, Some(sampler), unit as u32)?;
                }
            }
        }

        let uniforms = ImmUniforms::new(self.projection, self.view, self.model, use_texture);
        if let Some(ubo) = self.ubos[0] {
            self.device
                .update_buffer(ubo, bytemuck::cast_slice(&[uniforms]))?;
            self.device.bind_buffer(ubo, 0)?;
        }

        for slot in 1..self.uniforms.len() {
            let bytes = match self.uniforms[slot] {
                Some(ref bytes) => bytes,
                None => continue,
            };

            let ubo = match self.ubos[slot] {
                Some(ubo) => ubo,
                None => {
                    let size = ::std::cmp::max(self.params.uniform_buffer_bytes, bytes.len());
                    let params = BufferParams::uniform(BufferUsage::Dynamic, size);
                    let ubo = self.device.create_buffer(params, None);
                    self.ubos[slot] = Some(ubo);
                    ubo
                }
            };

            self.device.update_buffer(ubo, bytes)?;
            self.device.bind_buffer(ubo, slot as u32)?;
        }

        let count = self.counts.get(ImmAttrib::Position);
        if count > 0 {
            let vertices = &self.vertices[..count];
            self.device
                .update_buffer(self.vbo, bytemuck::cast_slice(vertices))?;
        }

        self.device
            .bind_buffer_with_mask(self.vbo, 0, self.counts.mask())?;
        self.device.draw_arrays(count as u32)?;

        if count > 0 {
            self.stats.draws += 1;
        }

        Ok(())
    }

    /// Runs `f` as one complete draw. If `f` fails, the draw is dropped without
    /// being flushed and the context is ready for the next `imm_begin`.
    pub(super) fn draw_with<F>(&mut self, mode: DrawMode, f: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.imm_begin(mode)?;

        if let Err(err) = f(self) {
            self.drawing = false;
            self.texture_batch = false;
            return Err(err);
        }

        self.imm_end()
    }

    /// Fails without writing anything unless `n` more vertices fit.
    pub(super) fn reserve(&self, n: usize) -> Result<()> {
        if self.counts.get(ImmAttrib::Position) + n > self.vertices.len() {
            return Err(Error::CapacityExceeded {
                capacity: self.vertices.len(),
            });
        }

        Ok(())
    }

    fn emit(&mut self, attrib: ImmAttrib, v: [f32; 4]) -> Result<()> {
        if !self.drawing {
            return Err(Error::NotDrawing);
        }

        let index = self.counts.get(attrib);
        if index >= self.vertices.len() {
            return Err(Error::CapacityExceeded {
                capacity: self.vertices.len(),
            });
        }

        *self.vertices[index].attrib_mut(attrib) = v;
        self.counts.0[attrib as usize] += 1;
        Ok(())
    }

    /// Pushes a position. The number of positions is the number of vertices drawn.
    #[inline]
    pub fn imm_position(&mut self, x: f32, y: f32, z: f32, w: f32) -> Result<()> {
        self.emit(ImmAttrib::Position, [x, y, z, w])
    }

    #[inline]
    pub fn imm_normal(&mut self, x: f32, y: f32, z: f32, w: f32) -> Result<()> {
        self.emit(ImmAttrib::Normal, [x, y, z, w])
    }

    #[inline]
    pub fn imm_color(&mut self, r: f32, g: f32, b: f32, a: f32) -> Result<()> {
        self.emit(ImmAttrib::Color, [r, g, b, a])
    }

    #[inline]
    pub fn imm_texcoord(&mut self, s: f32, t: f32, p: f32, q: f32) -> Result<()> {
        self.emit(ImmAttrib::Texcoord, [s, t, p, q])
    }

    #[inline]
    pub fn imm_userdata0(&mut self, x: f32, y: f32, z: f32, w: f32) -> Result<()> {
        self.emit(ImmAttrib::Userdata0, [x, y, z, w])
    }

    #[inline]
    pub fn imm_userdata1(&mut self, x: f32, y: f32, z: f32, w: f32) -> Result<()> {
        self.emit(ImmAttrib::Userdata1, [x, y, z, w])
    }

    #[inline]
    pub fn imm_userdata2(&mut self, x: f32, y: f32, z: f32, w: f32) -> Result<()> {
        self.emit(ImmAttrib::Userdata2, [x, y, z, w])
    }

    #[inline]
    pub fn imm_userdata3(&mut self, x: f32, y: f32, z: f32, w: f32) -> Result<()> {
        self.emit(ImmAttrib::Userdata3, [x, y, z, w])
    }

    /// Running count of `attrib` in the current draw.
    #[inline]
    pub fn imm_count(&self, attrib: ImmAttrib) -> usize {
        self.counts.get(attrib)
    }

    /// The scratch vertex at `index`.
    #[inline]
    pub fn imm_vertex(&self, index: usize) -> Option<&ImmVertex> {
        self.vertices.get(index)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn mark() {
        let mut v = Rebuild::Clean;
        v.mark(Rebuild::Pipeline);
        assert_eq!(v, Rebuild::Pipeline);

        v.mark(Rebuild::Pass);
        assert_eq!(v, Rebuild::Pass);

        v.mark(Rebuild::Pipeline);
        assert_eq!(v, Rebuild::Pass);

        v.mark(Rebuild::Clean);
        assert_eq!(v, Rebuild::Pass);
    }
}
