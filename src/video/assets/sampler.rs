//! Immutable texture sampling state.

impl_handle!(SamplerHandle);

backend_enum! {
    /// Specify how the texture is used whenever the pixel being sampled.
    pub enum SamplerFilter {
        Nearest,
        Linear,
    }
}

backend_enum! {
    /// Sets the wrap parameter for texture coordinates outside [0, 1].
    pub enum SamplerWrap {
        Repeat,
        Clamp,
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SamplerParams {
    pub filter: SamplerFilter,
    pub wrap_x: SamplerWrap,
    pub wrap_y: SamplerWrap,
    pub wrap_z: SamplerWrap,
}

impl Default for SamplerParams {
    fn default() -> Self {
        SamplerParams::new(SamplerFilter::Nearest, SamplerWrap::Clamp)
    }
}

impl SamplerParams {
    /// Creates a sampler that wraps all three axes the same way.
    #[inline]
    pub fn new(filter: SamplerFilter, wrap: SamplerWrap) -> Self {
        SamplerParams {
            filter,
            wrap_x: wrap,
            wrap_y: wrap,
            wrap_z: wrap,
        }
    }
}
