//! A stack of full-screen effects, applied in order with two ping-pong targets.
//!
//! Each effect is a shader that samples the output of the previous one from
//! texture slot 0, plus up to `POST_EFFECT_TEXTURES` extra textures in the slots
//! after it. Custom uniforms of an effect are bound to uniform slot 1.
//!
//! ```rust,ignore
//! let mut stack = PostProcessStack::new(imm.device_mut());
//! stack.push(PostEffect::new("vignette", vignette))?;
//!
//! let output = stack.perform(&mut imm, scene)?;
//! imm.imm_texture(output, w * 0.5, h * 0.5, None, Color::white())?;
//! ```

use crate::errors::*;
use crate::imm::ImmContext;
use crate::math::{self, Color, Rect, Vector2};
use crate::video::assets::prelude::*;
use crate::video::Device;

/// Maximum number of effects in a `PostProcessStack`.
pub const MAX_POST_EFFECTS: usize = 32;
/// Number of extra textures an effect could sample.
pub const POST_EFFECT_TEXTURES: usize = 8;

#[derive(Debug, Clone, PartialEq)]
pub struct PostEffect {
    pub name: String,
    pub shader: ShaderHandle,
    /// Extra textures, bound to the texture slots `1..=POST_EFFECT_TEXTURES`.
    pub textures: [Option<TextureHandle>; POST_EFFECT_TEXTURES],
    pub samplers: [Option<SamplerHandle>; POST_EFFECT_TEXTURES],
    /// The sampler of the input texture, or the default one.
    pub input_sampler: Option<SamplerHandle>,
    pub uniforms: Option<Vec<u8>>,
    /// The dimensions of the output, or the dimensions of the input.
    pub output: Option<Vector2<u32>>,
}

impl PostEffect {
    pub fn new<T: Into<String>>(name: T, shader: ShaderHandle) -> Self {
        PostEffect {
            name: name.into(),
            shader,
            textures: [None; POST_EFFECT_TEXTURES],
            samplers: [None; POST_EFFECT_TEXTURES],
            input_sampler: None,
            uniforms: None,
            output: None,
        }
    }

    /// Adds an extra texture at `index`, which is sampled from slot `index + 1`.
    pub fn with_texture(
        mut self,
        index: usize,
        texture: TextureHandle,
        sampler: Option<SamplerHandle>,
    ) -> Self {
        debug_assert!(index < POST_EFFECT_TEXTURES);

        self.textures[index] = Some(texture);
        self.samplers[index] = sampler;
        self
    }

    pub fn with_input_sampler(mut self, sampler: SamplerHandle) -> Self {
        self.input_sampler = Some(sampler);
        self
    }

    pub fn with_uniforms(mut self, bytes: &[u8]) -> Self {
        self.uniforms = Some(bytes.to_vec());
        self
    }

    pub fn with_output(mut self, w: u32, h: u32) -> Self {
        self.output = Some(Vector2::new(w, h));
        self
    }
}

pub struct PostProcessStack {
    effects: Vec<PostEffect>,
    targets: [TextureHandle; 2],
}

impl PostProcessStack {
    /// Creates the ping-pong targets at the size of the backbuffer.
    pub fn new(device: &mut Device) -> Self {
        let dimensions = device.dimensions();
        let params = TextureParams::new(TextureFormat::RGBA8, dimensions.x, dimensions.y);

        PostProcessStack {
            effects: Vec::new(),
            targets: [
                device.create_texture(params, None),
                device.create_texture(params, None),
            ],
        }
    }

    pub fn push(&mut self, effect: PostEffect) -> Result<()> {
        if self.effects.len() >= MAX_POST_EFFECTS {
            bail!(
                "Can not push {}, there are already {} post effects.",
                effect.name,
                MAX_POST_EFFECTS
            );
        }

        self.effects.push(effect);
        Ok(())
    }

    #[inline]
    pub fn pop(&mut self) -> Option<PostEffect> {
        self.effects.pop()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.effects.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    #[inline]
    pub fn effects(&self) -> &[PostEffect] {
        &self.effects
    }

    #[inline]
    pub fn targets(&self) -> [TextureHandle; 2] {
        self.targets
    }

    /// Runs every effect over `input` and returns the texture holding the result.
    /// Without any effect that is `input` itself. All imm state is reset.
    pub fn perform(&mut self, imm: &mut ImmContext, input: TextureHandle) -> Result<TextureHandle> {
        let dimensions = match imm.device().get_texture_size(input) {
            Some(v) => v,
            None => bail!("{} is invalid.", input),
        };

        imm.imm_reset()?;

        if self.effects.is_empty() {
            return Ok(input);
        }

        for &v in &self.targets {
            if imm.device().get_texture_size(v) != Some(dimensions) {
                imm.device_mut()
                    .resize_texture(v, dimensions.x, dimensions.y)?;
            }
        }

        prepare(imm, dimensions);
        imm.imm_set_color_target(Some(self.targets[0]));
        imm.imm_set_texture(Some(input), 0)?;
        imm.imm_set_shader(None)?;
        fullscreen(imm, dimensions, Some(Color::white()))?;

        let (mut src, mut dst) = (self.targets[0], self.targets[1]);

        for effect in &self.effects {
            let output = effect.output.unwrap_or(dimensions);
            if imm.device().get_texture_size(dst) != Some(output) {
                imm.device_mut().resize_texture(dst, output.x, output.y)?;
            }

            prepare(imm, output);
            imm.imm_set_color_target(Some(dst));
            imm.imm_set_texture(Some(src), 0)?;
            imm.imm_set_sampler(effect.input_sampler, 0)?;
            imm.imm_set_shader(Some(effect.shader))?;

            for i in 0..POST_EFFECT_TEXTURES {
                imm.imm_set_texture(effect.textures[i], i + 1)?;
                imm.imm_set_sampler(effect.samplers[i], i + 1)?;
            }

            imm.set_uniforms(effect.uniforms.as_ref().map(|v| v.as_slice()), 1)?;
            fullscreen(imm, output, None)?;

            ::std::mem::swap(&mut src, &mut dst);
        }

        Ok(src)
    }

    /// Deletes the ping-pong targets.
    pub fn destroy(self, device: &mut Device) {
        for &v in &self.targets {
            device.delete_texture(v);
        }
    }
}

fn prepare(imm: &mut ImmContext, dimensions: Vector2<u32>) {
    let (w, h) = (dimensions.x as f32, dimensions.y as f32);
    imm.imm_set_projection(math::screen_ortho(w, h));
    imm.imm_set_viewport(Rect::from_size(w, h));
}

/// Draws a quad covering a `dimensions` target. Texture coordinates are flipped
/// vertically, so render targets are sampled upright.
fn fullscreen(imm: &mut ImmContext, dimensions: Vector2<u32>, color: Option<Color>) -> Result<()> {
    let (w, h) = (dimensions.x as f32, dimensions.y as f32);
    let corners = [(0.0, h, 0.0, 0.0), (0.0, 0.0, 0.0, 1.0), (w, h, 1.0, 0.0), (w, 0.0, 1.0, 1.0)];

    imm.imm_begin(DrawMode::TriangleStrip)?;
    for &(x, y, s, t) in &corners {
        imm.imm_position(x, y, 0.0, 1.0)?;
        imm.imm_texcoord(s, t, 0.0, 0.0)?;

        if let Some(c) = color {
            imm.imm_color(c.r, c.g, c.b, c.a)?;
        }
    }

    imm.imm_end()?;
    Ok(())
}
