use cgmath::{Vector3, Vector4};

/// A RGBA `Color`. Each color component is a floating point value
/// with a range from 0 to 1.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    #[inline]
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Color { r, g, b, a }
    }

    /// Creates an opaque `Color` from RGB components.
    #[inline]
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Color { r, g, b, a: 1.0 }
    }

    /// Clip to [0.0, 1.0] range.
    pub fn clip(&self) -> Self {
        Color {
            r: self.r.max(0.0).min(1.0),
            g: self.g.max(0.0).min(1.0),
            b: self.b.max(0.0).min(1.0),
            a: self.a.max(0.0).min(1.0),
        }
    }

    #[inline]
    pub fn rgba(&self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn white() -> Self {
        Color::new(1.0, 1.0, 1.0, 1.0)
    }

    pub fn black() -> Self {
        Color::new(0.0, 0.0, 0.0, 1.0)
    }

    pub fn red() -> Self {
        Color::new(1.0, 0.0, 0.0, 1.0)
    }

    pub fn green() -> Self {
        Color::new(0.0, 1.0, 0.0, 1.0)
    }

    pub fn blue() -> Self {
        Color::new(0.0, 0.0, 1.0, 1.0)
    }

    pub fn transparent() -> Self {
        Color::new(0.0, 0.0, 0.0, 0.0)
    }
}

impl From<[f32; 4]> for Color {
    fn from(v: [f32; 4]) -> Self {
        Color::new(v[0], v[1], v[2], v[3])
    }
}

impl From<Vector4<f32>> for Color {
    fn from(v: Vector4<f32>) -> Self {
        Color::new(v.x, v.y, v.z, v.w)
    }
}

impl From<Vector3<f32>> for Color {
    fn from(v: Vector3<f32>) -> Self {
        Color::rgb(v.x, v.y, v.z)
    }
}

impl From<Color> for [u8; 4] {
    fn from(c: Color) -> [u8; 4] {
        let v = c.clip();
        [
            (v.r * 255.0) as u8,
            (v.g * 255.0) as u8,
            (v.b * 255.0) as u8,
            (v.a * 255.0) as u8,
        ]
    }
}

/// Creates `Color` from a u32 encoded `RGBA`.
impl From<u32> for Color {
    fn from(encoded: u32) -> Self {
        Color::new(
            ((encoded >> 24) & 0xFF) as f32 / 255.0,
            ((encoded >> 16) & 0xFF) as f32 / 255.0,
            ((encoded >> 8) & 0xFF) as f32 / 255.0,
            (encoded & 0xFF) as f32 / 255.0,
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn encode() {
        let c = Color::from(0xFF00_80FF);
        assert_eq!(c.r, 1.0);
        assert_eq!(c.g, 0.0);
        assert!((c.b - 128.0 / 255.0).abs() < 1e-6);

        let bytes: [u8; 4] = Color::new(2.0, -1.0, 0.5, 1.0).into();
        assert_eq!(bytes, [255, 0, 127, 255]);
    }
}
