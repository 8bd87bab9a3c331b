use std::cell::Cell;

use crate::errors::*;
use crate::math::Vector2;

use super::Window;

/// A window without any native surface, used with the headless backend.
pub struct HeadlessWindow {
    dimensions: Cell<Vector2<u32>>,
    swaps: Cell<u32>,
}

impl HeadlessWindow {
    pub fn new(dimensions: Vector2<u32>) -> Self {
        HeadlessWindow {
            dimensions: Cell::new(dimensions),
            swaps: Cell::new(0),
        }
    }

    /// Number of times `swap_buffers` has been called.
    #[inline]
    pub fn swaps(&self) -> u32 {
        self.swaps.get()
    }
}

impl Default for HeadlessWindow {
    fn default() -> Self {
        HeadlessWindow::new(Vector2::new(640, 320))
    }
}

impl Window for HeadlessWindow {
    #[inline]
    fn dimensions(&self) -> Vector2<u32> {
        self.dimensions.get()
    }

    #[inline]
    fn resize(&self, dimensions: Vector2<u32>) {
        self.dimensions.set(dimensions);
    }

    #[inline]
    fn swap_buffers(&self) -> Result<()> {
        self.swaps.set(self.swaps.get() + 1);
        Ok(())
    }
}
