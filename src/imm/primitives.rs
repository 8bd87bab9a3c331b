//! Single-shape helpers. Each one is a complete `imm_begin`/`imm_end` bracket.

use std::f32::consts::PI;

use crate::math::{Color, Vector2};
use crate::video::assets::prelude::DrawMode;
use crate::video::errors::*;

use super::ImmContext;

/// The points of a circle with `n` segments, starting at angle zero.
pub fn circle_points(x: f32, y: f32, r: f32, n: u32) -> Vec<Vector2<f32>> {
    (0..n)
        .map(|i| {
            let theta = 2.0 * PI * i as f32 / n as f32;
            Vector2::new(x + r * theta.cos(), y + r * theta.sin())
        })
        .collect()
}

impl ImmContext {
    fn vertex2(&mut self, x: f32, y: f32, color: Color) -> Result<()> {
        self.imm_position(x, y, 0.0, 1.0)?;
        self.imm_color(color.r, color.g, color.b, color.a)
    }

    pub fn imm_point(&mut self, x: f32, y: f32, color: Color) -> Result<()> {
        self.draw_with(DrawMode::Points, |imm| imm.vertex2(x, y, color))
    }

    pub fn imm_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, color: Color) -> Result<()> {
        self.draw_with(DrawMode::Lines, |imm| {
            imm.vertex2(x1, y1, color)?;
            imm.vertex2(x2, y2, color)
        })
    }

    /// Draws the outline of a `w` by `h` rect. Edges are offset by half a pixel to
    /// land on pixel centers.
    pub fn imm_rect_outline(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) -> Result<()> {
        let (x1, y1) = (x + 0.5, y + 0.5);
        let (x2, y2) = (x1 + w, y1 + h);

        self.draw_with(DrawMode::LineStrip, |imm| {
            imm.vertex2(x1, y1, color)?;
            imm.vertex2(x2, y1, color)?;
            imm.vertex2(x2, y2, color)?;
            imm.vertex2(x1, y2, color)?;
            imm.vertex2(x1, y1, color)
        })
    }

    pub fn imm_rect_filled(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) -> Result<()> {
        let (x1, y1) = (x, y);
        let (x2, y2) = (x + w, y + h);

        self.draw_with(DrawMode::TriangleStrip, |imm| {
            imm.vertex2(x1, y2, color)?;
            imm.vertex2(x1, y1, color)?;
            imm.vertex2(x2, y2, color)?;
            imm.vertex2(x2, y1, color)
        })
    }

    /// Draws the outline of a circle with `n` segments, as a closed line strip of
    /// `n + 1` vertices.
    pub fn imm_circle_outline(&mut self, x: f32, y: f32, r: f32, n: u32, color: Color) -> Result<()> {
        let points = circle_points(x, y, r, n);
        if points.is_empty() {
            return Ok(());
        }

        self.draw_with(DrawMode::LineStrip, |imm| {
            for p in points.iter().chain(points.first()) {
                imm.vertex2(p.x, p.y, color)?;
            }

            Ok(())
        })
    }

    /// Draws a filled circle with `n` segments, one triangle per segment fanning
    /// out of the center.
    pub fn imm_circle_filled(&mut self, x: f32, y: f32, r: f32, n: u32, color: Color) -> Result<()> {
        let points = circle_points(x, y, r, n);
        if points.is_empty() {
            return Ok(());
        }

        self.draw_with(DrawMode::Triangles, |imm| {
            for i in 0..points.len() {
                let a = points[i];
                let b = points[(i + 1) % points.len()];

                imm.vertex2(a.x, a.y, color)?;
                imm.vertex2(x, y, color)?;
                imm.vertex2(b.x, b.y, color)?;
            }

            Ok(())
        })
    }
}
