//! Compiled programs, built from a combined vertex and fragment source.
//!
//! A single source blob carries both stages. Backends compile it twice, once with
//! `VERT_SHADER` and once with `FRAG_SHADER` defined, so the source selects its
//! stage with `#ifdef` blocks.

use smallvec::SmallVec;

impl_handle!(ShaderHandle);

backend_enum! {
    /// Uniform declaration kind.
    pub enum UniformType {
        /// A uniform block backed by a uniform buffer.
        Buffer,
        /// A sampled texture.
        Texture,
    }
}

/// A named uniform declaration and the slot it is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformParams {
    pub name: String,
    pub typ: UniformType,
    pub bind: u32,
}

impl UniformParams {
    pub fn new<T: Into<String>>(name: T, typ: UniformType, bind: u32) -> Self {
        UniformParams {
            name: name.into(),
            typ,
            bind,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShaderParams {
    pub uniforms: SmallVec<[UniformParams; 8]>,
}

impl ShaderParams {
    /// Declares an uniform.
    pub fn with<T: Into<String>>(mut self, name: T, typ: UniformType, bind: u32) -> Self {
        self.uniforms.push(UniformParams::new(name, typ, bind));
        self
    }
}
