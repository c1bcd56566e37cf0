//! tiny-skia raster backend
//!
//! Canvas millimetres map to pixels at `dpi / 25.4`, with the base
//! transform flipping Y so the canvas origin sits at the bottom-left.
//! Clips become alpha masks intersected per frame.

use std::sync::Arc;

use log::debug;
use tiny_skia as sk;

use crate::error::{Error, Result};
use crate::model::page::FillRule;
use crate::render::canvas::{Canvas, LineCap, LineJoin, Paint, StrokeStyle};

#[derive(Clone)]
struct FrameState {
    ts: sk::Transform,
    mask: Option<Arc<sk::Mask>>,
}

pub struct RasterCanvas {
    pixmap: sk::Pixmap,
    size_mm: (f64, f64),
    current: FrameState,
    stack: Vec<FrameState>,
}

impl RasterCanvas {
    /// A transparent canvas for a page of the given size in millimetres.
    pub fn new(width_mm: f64, height_mm: f64, dpi: f64) -> Result<RasterCanvas> {
        let scale = (dpi / 25.4) as f32;
        let px_w = ((width_mm as f32) * scale).round().max(1.0) as u32;
        let px_h = ((height_mm as f32) * scale).round().max(1.0) as u32;
        let pixmap = sk::Pixmap::new(px_w, px_h)
            .ok_or_else(|| Error::Render(format!("cannot allocate {px_w}x{px_h} canvas")))?;
        let base = sk::Transform::from_row(scale, 0.0, 0.0, -scale, 0.0, px_h as f32);
        Ok(RasterCanvas {
            pixmap,
            size_mm: (width_mm, height_mm),
            current: FrameState { ts: base, mask: None },
            stack: Vec::new(),
        })
    }

    pub fn pixel_size(&self) -> (u32, u32) {
        (self.pixmap.width(), self.pixmap.height())
    }

    /// The rendered result as a straight-alpha RGBA image.
    pub fn to_image(&self) -> image::RgbaImage {
        let (w, h) = self.pixel_size();
        let mut out = image::RgbaImage::new(w, h);
        for (src, dst) in self.pixmap.pixels().iter().zip(out.pixels_mut()) {
            let c = src.demultiply();
            *dst = image::Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
        }
        out
    }

    fn sk_paint(&self, paint: &Paint) -> sk::Paint<'static> {
        let mut sk_paint = sk::Paint::default();
        sk_paint.anti_alias = true;
        match paint {
            Paint::Solid(c) => sk_paint.set_color_rgba8(c.r, c.g, c.b, c.a),
            Paint::Linear(g) => {
                let stops = to_sk_stops(&g.stops);
                match sk::LinearGradient::new(
                    sk::Point::from_xy(g.start.0 as f32, g.start.1 as f32),
                    sk::Point::from_xy(g.end.0 as f32, g.end.1 as f32),
                    stops,
                    sk::SpreadMode::Pad,
                    sk::Transform::identity(),
                ) {
                    Some(shader) => sk_paint.shader = shader,
                    None => set_fallback(&mut sk_paint, paint),
                }
            }
            Paint::Radial(g) => {
                let stops = to_sk_stops(&g.stops);
                match sk::RadialGradient::new(
                    sk::Point::from_xy(g.start.0 as f32, g.start.1 as f32),
                    sk::Point::from_xy(g.end.0 as f32, g.end.1 as f32),
                    g.end_radius.max(g.start_radius) as f32,
                    stops,
                    sk::SpreadMode::Pad,
                    sk::Transform::identity(),
                ) {
                    Some(shader) => sk_paint.shader = shader,
                    None => set_fallback(&mut sk_paint, paint),
                }
            }
        }
        sk_paint
    }
}

fn set_fallback(sk_paint: &mut sk::Paint, paint: &Paint) {
    let c = paint.fallback_color();
    sk_paint.set_color_rgba8(c.r, c.g, c.b, c.a);
}

fn to_sk_stops(stops: &[crate::render::canvas::GradientStop]) -> Vec<sk::GradientStop> {
    stops
        .iter()
        .map(|s| {
            sk::GradientStop::new(
                s.position as f32,
                sk::Color::from_rgba8(s.color.r, s.color.g, s.color.b, s.color.a),
            )
        })
        .collect()
}

fn to_sk_rule(rule: FillRule) -> sk::FillRule {
    match rule {
        FillRule::NonZero => sk::FillRule::Winding,
        FillRule::EvenOdd => sk::FillRule::EvenOdd,
    }
}

fn to_sk_stroke(stroke: &StrokeStyle) -> sk::Stroke {
    // tiny-skia requires an even dash count; odd patterns repeat once.
    let dash = stroke.dash.as_ref().and_then(|(array, offset)| {
        let len = if array.len() % 2 == 1 { array.len() * 2 } else { array.len() };
        let array: Vec<f32> = array.iter().map(|v| *v as f32).cycle().take(len).collect();
        sk::StrokeDash::new(array, *offset as f32)
    });
    sk::Stroke {
        width: stroke.width as f32,
        miter_limit: stroke.miter_limit as f32,
        line_cap: match stroke.cap {
            LineCap::Butt => sk::LineCap::Butt,
            LineCap::Round => sk::LineCap::Round,
            LineCap::Square => sk::LineCap::Square,
        },
        line_join: match stroke.join {
            LineJoin::Miter => sk::LineJoin::Miter,
            LineJoin::Round => sk::LineJoin::Round,
            LineJoin::Bevel => sk::LineJoin::Bevel,
        },
        dash,
    }
}

impl Canvas for RasterCanvas {
    fn size(&self) -> (f64, f64) {
        self.size_mm
    }

    fn push(&mut self) {
        self.stack.push(self.current.clone());
    }

    fn pop(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.current = state;
        }
    }

    fn translate(&mut self, tx: f64, ty: f64) {
        self.current.ts = self.current.ts.pre_translate(tx as f32, ty as f32);
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.current.ts = self.current.ts.pre_scale(sx as f32, sy as f32);
    }

    fn rotate(&mut self, degrees: f64) {
        self.current.ts =
            self.current.ts.pre_concat(sk::Transform::from_rotate(degrees as f32));
    }

    fn set_clip(&mut self, path: &tiny_skia_path::Path, rule: FillRule) {
        let Some(device_path) = path.clone().transform(self.current.ts) else {
            debug!("clip path not representable, skipping");
            return;
        };
        let mask = match &self.current.mask {
            Some(existing) => {
                let mut mask = (**existing).clone();
                mask.intersect_path(&device_path, to_sk_rule(rule), false, sk::Transform::identity());
                mask
            }
            None => {
                let (w, h) = self.pixel_size();
                let Some(mut mask) = sk::Mask::new(w, h) else { return };
                mask.fill_path(&device_path, to_sk_rule(rule), false, sk::Transform::identity());
                mask
            }
        };
        self.current.mask = Some(Arc::new(mask));
    }

    fn fill_path(&mut self, path: &tiny_skia_path::Path, paint: &Paint, rule: FillRule) {
        let sk_paint = self.sk_paint(paint);
        self.pixmap.fill_path(
            path,
            &sk_paint,
            to_sk_rule(rule),
            self.current.ts,
            self.current.mask.as_deref(),
        );
    }

    fn stroke_path(&mut self, path: &tiny_skia_path::Path, paint: &Paint, stroke: &StrokeStyle) {
        if stroke.width <= 0.0 {
            return;
        }
        let sk_paint = self.sk_paint(paint);
        self.pixmap.stroke_path(
            path,
            &sk_paint,
            &to_sk_stroke(stroke),
            self.current.ts,
            self.current.mask.as_deref(),
        );
    }

    fn draw_image(&mut self, image: &image::RgbaImage) -> Result<()> {
        let (w, h) = (image.width(), image.height());
        let mut texture = sk::Pixmap::new(w, h)
            .ok_or_else(|| Error::Render(format!("cannot allocate {w}x{h} texture")))?;
        for (src, dst) in image.pixels().zip(texture.pixels_mut()) {
            let [r, g, b, a] = src.0;
            *dst = sk::ColorU8::from_rgba(r, g, b, a).premultiply();
        }

        // The image occupies [0,w]x[0,h] in the Y-up frame; flip the
        // pattern sampling so the top row lands at the top.
        let mut paint = sk::Paint::default();
        paint.shader = sk::Pattern::new(
            texture.as_ref(),
            sk::SpreadMode::Pad,
            sk::FilterQuality::Bilinear,
            1.0,
            sk::Transform::from_row(1.0, 0.0, 0.0, -1.0, 0.0, h as f32),
        );
        let rect = sk::Rect::from_xywh(0.0, 0.0, w as f32, h as f32)
            .ok_or_else(|| Error::Render("empty image rect".to_string()))?;
        self.pixmap.fill_rect(rect, &paint, self.current.ts, self.current.mask.as_deref());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::scalar::BLACK;

    fn rect(x: f32, y: f32, w: f32, h: f32) -> tiny_skia_path::Path {
        tiny_skia_path::PathBuilder::from_rect(
            tiny_skia_path::Rect::from_xywh(x, y, w, h).unwrap(),
        )
    }

    #[test]
    fn test_pixel_dimensions() {
        let canvas = RasterCanvas::new(100.0, 100.0, 72.0).unwrap();
        assert_eq!(canvas.pixel_size(), (283, 283));

        let canvas = RasterCanvas::new(210.0, 297.0, 300.0).unwrap();
        assert_eq!(canvas.pixel_size(), (2480, 3508));
    }

    #[test]
    fn test_y_up_fill_lands_at_image_bottom() {
        let mut canvas = RasterCanvas::new(10.0, 10.0, 25.4).unwrap();
        // A 10x2mm bar along the canvas bottom (y in [0,2]).
        canvas.fill_path(&rect(0.0, 0.0, 10.0, 2.0), &Paint::Solid(BLACK), FillRule::NonZero);
        let img = canvas.to_image();
        // Bottom of the canvas is the last image row.
        assert_eq!(img.get_pixel(5, 9).0[3], 255);
        assert_eq!(img.get_pixel(5, 0).0[3], 0);
    }

    #[test]
    fn test_push_pop_restores_transform() {
        let mut canvas = RasterCanvas::new(10.0, 10.0, 25.4).unwrap();
        canvas.push();
        canvas.translate(5.0, 5.0);
        canvas.pop();
        canvas.fill_path(&rect(0.0, 0.0, 2.0, 2.0), &Paint::Solid(BLACK), FillRule::NonZero);
        let img = canvas.to_image();
        // Without the translate, the square sits at the bottom-left.
        assert_eq!(img.get_pixel(1, 9).0[3], 255);
        assert_eq!(img.get_pixel(6, 4).0[3], 0);
    }

    #[test]
    fn test_clip_masks_fill() {
        let mut canvas = RasterCanvas::new(10.0, 10.0, 25.4).unwrap();
        canvas.push();
        canvas.set_clip(&rect(0.0, 0.0, 5.0, 10.0), FillRule::NonZero);
        canvas.fill_path(&rect(0.0, 0.0, 10.0, 10.0), &Paint::Solid(BLACK), FillRule::NonZero);
        canvas.pop();
        let img = canvas.to_image();
        // Left half filled, right half clipped away.
        assert_eq!(img.get_pixel(2, 5).0[3], 255);
        assert_eq!(img.get_pixel(8, 5).0[3], 0);
    }

    #[test]
    fn test_draw_image_upright() {
        let mut canvas = RasterCanvas::new(4.0, 4.0, 25.4).unwrap();
        // 2x2 image: opaque top row, transparent bottom row.
        let mut img = image::RgbaImage::new(2, 2);
        img.put_pixel(0, 0, image::Rgba([255, 0, 0, 255]));
        img.put_pixel(1, 0, image::Rgba([255, 0, 0, 255]));
        canvas.push();
        canvas.translate(0.0, 2.0);
        canvas.draw_image(&img).unwrap();
        canvas.pop();
        let out = canvas.to_image();
        // Image top row should be the upper of the two drawn rows.
        assert!(out.get_pixel(0, 0).0[3] > 0);
        assert_eq!(out.get_pixel(0, 3).0[3], 0);
    }
}
