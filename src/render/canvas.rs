//! The 2D canvas the renderer draws into
//!
//! Canvas space is millimetres with Y pointing up and the origin at the
//! page's bottom-left corner; backends own the mapping to device space.
//! Paths are `tiny_skia_path::Path` values — the same type both the raster
//! and the PDF sink consume.

use std::ops::{Deref, DerefMut};

use crate::error::Result;
use crate::model::page::FillRule;
use crate::model::scalar::Rgba;

/// Millimetres to PostScript points.
pub const PT_PER_MM: f64 = 2.83465;

/// Stroke end-cap style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

/// Stroke join style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

/// A gradient stop with its resolved colour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub position: f64,
    pub color: Rgba,
}

/// Linear gradient in canvas coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearGradient {
    pub start: (f64, f64),
    pub end: (f64, f64),
    pub stops: Vec<GradientStop>,
}

/// Radial gradient in canvas coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct RadialGradient {
    pub start: (f64, f64),
    pub start_radius: f64,
    pub end: (f64, f64),
    pub end_radius: f64,
    pub stops: Vec<GradientStop>,
}

/// What to paint with.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Rgba),
    Linear(LinearGradient),
    Radial(RadialGradient),
}

impl Paint {
    /// The solid colour a backend without gradient support falls back to.
    pub fn fallback_color(&self) -> Rgba {
        match self {
            Paint::Solid(c) => *c,
            Paint::Linear(g) => g.stops.first().map(|s| s.color).unwrap_or_default(),
            Paint::Radial(g) => g.stops.first().map(|s| s.color).unwrap_or_default(),
        }
    }
}

/// Resolved stroke parameters, widths in millimetres.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeStyle {
    pub width: f64,
    pub cap: LineCap,
    pub join: LineJoin,
    pub miter_limit: f64,
    /// Dash array and offset; `None` is a solid line.
    pub dash: Option<(Vec<f64>, f64)>,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        StrokeStyle {
            width: 1.0,
            cap: LineCap::Butt,
            join: LineJoin::Miter,
            miter_limit: 3.528,
            dash: None,
        }
    }
}

/// The drawing operations the renderer emits.
///
/// `push` saves the transform and clip state, `pop` restores it; every push
/// must be matched by a pop on every exit path (see [`Frame`]).
pub trait Canvas {
    /// Page size in millimetres.
    fn size(&self) -> (f64, f64);

    fn push(&mut self);
    fn pop(&mut self);

    fn translate(&mut self, tx: f64, ty: f64);
    fn scale(&mut self, sx: f64, sy: f64);
    /// Counter-clockwise rotation in degrees.
    fn rotate(&mut self, degrees: f64);

    /// Intersect the current clip with the given region.
    fn set_clip(&mut self, path: &tiny_skia_path::Path, rule: FillRule);

    fn fill_path(&mut self, path: &tiny_skia_path::Path, paint: &Paint, rule: FillRule);
    fn stroke_path(&mut self, path: &tiny_skia_path::Path, paint: &Paint, stroke: &StrokeStyle);

    /// Draw a decoded image at the origin, one canvas unit per pixel; the
    /// caller scales the frame to the target size beforehand.
    fn draw_image(&mut self, image: &image::RgbaImage) -> Result<()>;
}

/// Scope guard for a saved canvas frame: pops on drop, even on early exits.
pub struct Frame<'a, C: Canvas + ?Sized> {
    canvas: &'a mut C,
}

impl<'a, C: Canvas + ?Sized> Frame<'a, C> {
    pub fn push(canvas: &'a mut C) -> Self {
        canvas.push();
        Frame { canvas }
    }
}

impl<C: Canvas + ?Sized> Deref for Frame<'_, C> {
    type Target = C;

    fn deref(&self) -> &C {
        self.canvas
    }
}

impl<C: Canvas + ?Sized> DerefMut for Frame<'_, C> {
    fn deref_mut(&mut self) -> &mut C {
        self.canvas
    }
}

impl<C: Canvas + ?Sized> Drop for Frame<'_, C> {
    fn drop(&mut self) {
        self.canvas.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paint_fallback_color() {
        let solid = Paint::Solid(Rgba::new(1, 2, 3, 255));
        assert_eq!(solid.fallback_color(), Rgba::new(1, 2, 3, 255));

        let gradient = Paint::Linear(LinearGradient {
            start: (0.0, 0.0),
            end: (1.0, 0.0),
            stops: vec![
                GradientStop { position: 0.0, color: Rgba::new(9, 9, 9, 255) },
                GradientStop { position: 1.0, color: Rgba::new(0, 0, 0, 255) },
            ],
        });
        assert_eq!(gradient.fallback_color(), Rgba::new(9, 9, 9, 255));
    }

    #[test]
    fn test_frame_pops_on_drop() {
        struct Counting {
            depth: i32,
            max_depth: i32,
        }
        impl Canvas for Counting {
            fn size(&self) -> (f64, f64) {
                (0.0, 0.0)
            }
            fn push(&mut self) {
                self.depth += 1;
                self.max_depth = self.max_depth.max(self.depth);
            }
            fn pop(&mut self) {
                self.depth -= 1;
            }
            fn translate(&mut self, _: f64, _: f64) {}
            fn scale(&mut self, _: f64, _: f64) {}
            fn rotate(&mut self, _: f64) {}
            fn set_clip(&mut self, _: &tiny_skia_path::Path, _: FillRule) {}
            fn fill_path(&mut self, _: &tiny_skia_path::Path, _: &Paint, _: FillRule) {}
            fn stroke_path(&mut self, _: &tiny_skia_path::Path, _: &Paint, _: &StrokeStyle) {}
            fn draw_image(&mut self, _: &image::RgbaImage) -> Result<()> {
                Ok(())
            }
        }

        let mut canvas = Counting { depth: 0, max_depth: 0 };
        {
            let mut frame = Frame::push(&mut canvas);
            frame.translate(1.0, 1.0);
            {
                let _inner = Frame::push(&mut *frame);
            }
        }
        assert_eq!(canvas.depth, 0);
        assert_eq!(canvas.max_depth, 2);
    }
}
