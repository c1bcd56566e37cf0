//! krilla PDF backend
//!
//! One krilla page surface per rendered page, sized in points. Canvas
//! millimetres map to points through the flipped base transform; every draw
//! call runs inside its own krilla transform push so PDF stroke scaling
//! follows the frame stack. Gradients are flattened to their first stop's
//! solid colour.

use std::io::Cursor;

use krilla::path::{
    Fill, FillRule as PdfFillRule, LineCap as PdfLineCap, LineJoin as PdfLineJoin, Stroke,
    StrokeDash,
};
use krilla::surface::Surface;
use tiny_skia_path::{NormalizedF32, Transform};

use crate::error::{Error, Result};
use crate::model::page::FillRule;
use crate::render::canvas::{Canvas, LineCap, LineJoin, Paint, StrokeStyle, PT_PER_MM};

#[derive(Clone, Copy)]
struct PdfFrame {
    ts: Transform,
    /// krilla pushes (clips) owned by this frame.
    pushes: usize,
}

pub struct PdfCanvas<'a, 'b> {
    surface: &'a mut Surface<'b>,
    size_mm: (f64, f64),
    current: PdfFrame,
    stack: Vec<PdfFrame>,
}

impl<'a, 'b> PdfCanvas<'a, 'b> {
    pub fn new(surface: &'a mut Surface<'b>, width_mm: f64, height_mm: f64) -> Self {
        let k = PT_PER_MM as f32;
        let base = Transform::from_row(k, 0.0, 0.0, -k, 0.0, (height_mm * PT_PER_MM) as f32);
        PdfCanvas {
            surface,
            size_mm: (width_mm, height_mm),
            current: PdfFrame { ts: base, pushes: 0 },
            stack: Vec::new(),
        }
    }

    /// Average absolute scale of the current transform, used to size
    /// strokes in device points.
    fn scale_factor(&self) -> f64 {
        let ts = self.current.ts;
        let sx = (ts.sx * ts.sx + ts.ky * ts.ky).sqrt();
        let sy = (ts.kx * ts.kx + ts.sy * ts.sy).sqrt();
        ((sx + sy) / 2.0) as f64
    }
}

fn to_pdf_rule(rule: FillRule) -> PdfFillRule {
    match rule {
        FillRule::NonZero => PdfFillRule::NonZero,
        FillRule::EvenOdd => PdfFillRule::EvenOdd,
    }
}

fn to_pdf_fill(paint: &Paint, rule: FillRule) -> Fill {
    let color = paint.fallback_color();
    Fill {
        paint: krilla::color::rgb::Color::new(color.r, color.g, color.b).into(),
        opacity: NormalizedF32::new(color.a as f32 / 255.0).unwrap_or(NormalizedF32::ONE),
        rule: to_pdf_rule(rule),
    }
}

fn to_pdf_stroke(paint: &Paint, stroke: &StrokeStyle, scale: f64) -> Stroke {
    let color = paint.fallback_color();
    let dash = stroke.dash.as_ref().map(|(array, offset)| StrokeDash {
        array: array.iter().map(|v| (*v * scale) as f32).collect(),
        offset: (*offset * scale) as f32,
    });
    Stroke {
        paint: krilla::color::rgb::Color::new(color.r, color.g, color.b).into(),
        width: (stroke.width * scale) as f32,
        miter_limit: stroke.miter_limit as f32,
        line_cap: match stroke.cap {
            LineCap::Butt => PdfLineCap::Butt,
            LineCap::Round => PdfLineCap::Round,
            LineCap::Square => PdfLineCap::Square,
        },
        line_join: match stroke.join {
            LineJoin::Miter => PdfLineJoin::Miter,
            LineJoin::Round => PdfLineJoin::Round,
            LineJoin::Bevel => PdfLineJoin::Bevel,
        },
        opacity: NormalizedF32::new(color.a as f32 / 255.0).unwrap_or(NormalizedF32::ONE),
        dash,
        ..Stroke::default()
    }
}

impl Canvas for PdfCanvas<'_, '_> {
    fn size(&self) -> (f64, f64) {
        self.size_mm
    }

    fn push(&mut self) {
        self.stack.push(self.current);
        self.current.pushes = 0;
    }

    fn pop(&mut self) {
        for _ in 0..self.current.pushes {
            self.surface.pop();
        }
        if let Some(frame) = self.stack.pop() {
            self.current = frame;
        }
    }

    fn translate(&mut self, tx: f64, ty: f64) {
        self.current.ts = self.current.ts.pre_translate(tx as f32, ty as f32);
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.current.ts = self.current.ts.pre_scale(sx as f32, sy as f32);
    }

    fn rotate(&mut self, degrees: f64) {
        self.current.ts = self.current.ts.pre_concat(Transform::from_rotate(degrees as f32));
    }

    fn set_clip(&mut self, path: &tiny_skia_path::Path, rule: FillRule) {
        let Some(device_path) = path.clone().transform(self.current.ts) else {
            return;
        };
        self.surface.push_clip_path(&device_path, &to_pdf_rule(rule));
        self.current.pushes += 1;
    }

    fn fill_path(&mut self, path: &tiny_skia_path::Path, paint: &Paint, rule: FillRule) {
        let Some(device_path) = path.clone().transform(self.current.ts) else {
            return;
        };
        self.surface.fill_path(&device_path, to_pdf_fill(paint, rule));
    }

    fn stroke_path(&mut self, path: &tiny_skia_path::Path, paint: &Paint, stroke: &StrokeStyle) {
        if stroke.width <= 0.0 {
            return;
        }
        let Some(device_path) = path.clone().transform(self.current.ts) else {
            return;
        };
        self.surface
            .stroke_path(&device_path, to_pdf_stroke(paint, stroke, self.scale_factor()));
    }

    fn draw_image(&mut self, image: &image::RgbaImage) -> Result<()> {
        let (w, h) = (image.width(), image.height());
        let mut png = Vec::new();
        image::DynamicImage::ImageRgba8(image.clone())
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)?;
        let pdf_image = krilla::image::Image::from_png(&png)
            .ok_or_else(|| Error::Render("PDF image embedding failed".to_string()))?;

        // Flip back to krilla's top-left image placement within the Y-up
        // canvas frame.
        let ts = self
            .current
            .ts
            .pre_concat(Transform::from_row(1.0, 0.0, 0.0, -1.0, 0.0, h as f32));
        self.surface.push_transform(&ts);
        let size = krilla::geom::Size::from_wh(w as f32, h as f32)
            .ok_or_else(|| Error::Render("empty image".to_string()))?;
        self.surface.draw_image(pdf_image, size);
        self.surface.pop();
        Ok(())
    }
}
