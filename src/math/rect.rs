/// A floating point rectangle with its origin at the top-left corner.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    #[inline]
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Rect { x, y, w, h }
    }

    /// Creates a rect that covers a `w` by `h` surface.
    #[inline]
    pub fn from_size(w: f32, h: f32) -> Self {
        Rect::new(0.0, 0.0, w, h)
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Returns the rect with the y axis flipped inside a surface of height `surface`,
    /// for APIs with their origin at the bottom-left.
    #[inline]
    pub fn flip_y(&self, surface: f32) -> Self {
        Rect::new(self.x, surface - (self.y + self.h), self.w, self.h)
    }
}
