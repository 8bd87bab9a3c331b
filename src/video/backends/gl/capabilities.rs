use std::ffi::CStr;

use gl;
use gl::types::*;

use crate::errors::*;
use crate::video::backends::GlslProfile;

/// The version of a GL context, as reported by `GL_VERSION`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Version {
    /// True for OpenGL ES and WebGL 2 contexts.
    pub es: bool,
    pub major: u8,
    pub minor: u8,
}

impl Version {
    /// Parses a `GL_VERSION` string, e.g. `4.5.0 NVIDIA 390.77` or `OpenGL ES 3.0 Mesa`.
    pub fn parse(desc: &str) -> Result<Version> {
        let mut es = false;
        let mut numbers = desc;

        for prefix in &["OpenGL ES-CM ", "OpenGL ES-CL ", "OpenGL ES "] {
            if desc.starts_with(prefix) {
                es = true;
                numbers = &desc[prefix.len()..];
                break;
            }
        }

        let numbers = numbers.split_whitespace().next().unwrap_or("");
        let mut iter = numbers.split('.').map(|v| v.parse::<u8>());

        match (iter.next(), iter.next()) {
            (Some(Ok(major)), Some(Ok(minor))) => Ok(Version { es, major, minor }),
            _ => bail!("[GL] Unrecognized version string {:?}.", desc),
        }
    }

    /// Returns true if this is a desktop context of at least `major.minor`.
    #[inline]
    pub fn gl(&self, major: u8, minor: u8) -> bool {
        !self.es && (self.major, self.minor) >= (major, minor)
    }

    /// Returns true if this is an ES context of at least `major.minor`.
    #[inline]
    pub fn es(&self, major: u8, minor: u8) -> bool {
        self.es && (self.major, self.minor) >= (major, minor)
    }
}

unsafe fn get_string(id: GLenum) -> Result<String> {
    let s = gl::GetString(id);
    if s.is_null() {
        bail!("[GL] glGetString({:#x}) returned null.", id);
    }

    Ok(CStr::from_ptr(s as *const _).to_string_lossy().into_owned())
}

unsafe fn get_integer(id: GLenum) -> u32 {
    let mut v = 0;
    gl::GetIntegerv(id, &mut v);
    v.max(0) as u32
}

/// The limits of the current context. They never change once queried.
#[derive(Debug)]
pub struct Capabilities {
    pub version: Version,
    pub vendor: String,
    pub renderer: String,
    /// Texture units usable by a single program.
    pub max_combined_texture_image_units: u32,
    pub max_uniform_buffer_bindings: u32,
    pub max_color_attachments: u32,
    pub max_vertex_attribs: u32,
}

impl Capabilities {
    pub unsafe fn parse() -> Result<Capabilities> {
        Ok(Capabilities {
            version: Version::parse(&get_string(gl::VERSION)?)?,
            vendor: get_string(gl::VENDOR)?,
            renderer: get_string(gl::RENDERER)?,
            max_combined_texture_image_units: get_integer(gl::MAX_COMBINED_TEXTURE_IMAGE_UNITS),
            max_uniform_buffer_bindings: get_integer(gl::MAX_UNIFORM_BUFFER_BINDINGS),
            max_color_attachments: get_integer(gl::MAX_COLOR_ATTACHMENTS),
            max_vertex_attribs: get_integer(gl::MAX_VERTEX_ATTRIBS),
        })
    }

    /// Uniform buffers, sampler objects and vertex array objects are core since 3.3
    /// and ES 3.0.
    pub fn is_supported(&self) -> bool {
        self.version.gl(3, 3) || self.version.es(3, 0)
    }

    /// Picks the shader dialect to compile with. ES contexts only understand
    /// `Es300`, and `Core430` needs a 4.3 context.
    pub fn glsl(&self, requested: GlslProfile) -> GlslProfile {
        if self.version.es {
            return GlslProfile::Es300;
        }

        match requested {
            GlslProfile::Core430 if !self.version.gl(4, 3) => GlslProfile::Core330,
            GlslProfile::Es300 => GlslProfile::Core330,
            v => v,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn version() {
        let v = Version::parse("4.5.0 NVIDIA 390.77").unwrap();
        assert_eq!(v, Version { es: false, major: 4, minor: 5 });
        assert!(v.gl(3, 3));
        assert!(!v.es(3, 0));

        let v = Version::parse("OpenGL ES 3.0 Mesa 18.0").unwrap();
        assert!(v.es(3, 0));
        assert!(!v.gl(3, 0));

        assert!(Version::parse("garbage").is_err());
        assert!(Version::parse("").is_err());
    }
}
