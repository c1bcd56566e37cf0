//! Text object rendering
//!
//! Each character of a text code is placed individually: the code's start
//! position advanced by the delta arrays, converted to canvas coordinates,
//! and the glyph outline filled there. There is no shaping pass; OFD files
//! carry the positions.

use log::{debug, warn};
use ttf_parser::OutlineBuilder;

use crate::model::page::{CtText, FillRule};
use crate::model::res::DrawParam;
use crate::model::scalar::StBox;
use crate::render::canvas::{Canvas, Frame, Paint};
use crate::render::{style, Renderer};

impl Renderer<'_> {
    pub(crate) fn draw_text_object(
        &mut self,
        canvas: &mut dyn Canvas,
        text: &CtText,
        layer_dp: Option<&DrawParam>,
        pb: StBox,
    ) {
        let weight = if text.weight == 0 { 400 } else { text.weight };
        let bold = weight >= 700;
        let Some(font) = self.fonts.load(self.doc, self.archive, text.font, bold, text.italic)
        else {
            warn!("no usable font for text object (font {})", text.font);
            return;
        };
        let Some(face) = font.face() else {
            warn!("font {} data became unparseable", text.font);
            return;
        };

        let object_dp = self.object_draw_param(&text.unit);
        let Some(fill) = style::text_fill(text, layer_dp, object_dp.as_ref()) else {
            return;
        };

        let mut size = text.size;
        if let Some(m) = &text.unit.ctm {
            let y_scale = m.y_scale();
            if y_scale > 0.0 {
                size *= y_scale;
            }
        }
        let h_scale = if text.h_scale == 0.0 { 1.0 } else { text.h_scale };
        let upem = face.units_per_em() as f64;
        if upem <= 0.0 || size <= 0.0 {
            return;
        }
        let scale = size / upem;

        let (bx, by) = (text.unit.boundary.x, text.unit.boundary.y);
        let h = pb.h;

        for code in &text.codes {
            let mut pos_x = code.x;
            let mut pos_y = code.y;
            for (i, ch) in code.value.chars().enumerate() {
                if i >= 1 {
                    if let Some(d) = code.delta_x.get(i - 1) {
                        pos_x += d;
                    }
                    if let Some(d) = code.delta_y.get(i - 1) {
                        pos_y += d;
                    }
                }
                let Some(glyph) = glyph_path(&face, ch) else {
                    debug!("glyph for {ch:?} missing in font {}", text.font);
                    continue;
                };

                match &text.unit.ctm {
                    Some(m) if m.rotation() != 0.0 => {
                        let (tx, ty) = m.transform(pos_x, pos_y);
                        let mut frame = Frame::push(&mut *canvas);
                        frame.translate(tx + bx, h - (ty + by));
                        frame.rotate(-m.rotation_degrees());
                        draw_glyph(&mut *frame, &glyph, scale * h_scale, scale, &fill);
                    }
                    Some(m) => {
                        let (tx, ty) = m.transform(pos_x, pos_y);
                        let mut frame = Frame::push(&mut *canvas);
                        frame.translate(tx + bx, h - (ty + by));
                        draw_glyph(&mut *frame, &glyph, scale * h_scale, scale, &fill);
                    }
                    None => {
                        let mut frame = Frame::push(&mut *canvas);
                        frame.translate(pos_x + bx, h - (pos_y + by));
                        draw_glyph(&mut *frame, &glyph, scale * h_scale, scale, &fill);
                    }
                }
            }
        }
    }
}

/// Fill a glyph outline at the current origin. Font units are Y-up like the
/// canvas, so only scaling is needed.
fn draw_glyph(
    canvas: &mut dyn Canvas,
    glyph: &tiny_skia_path::Path,
    sx: f64,
    sy: f64,
    fill: &Paint,
) {
    canvas.scale(sx, sy);
    canvas.fill_path(glyph, fill, FillRule::NonZero);
}

/// The outline of one character as a path in font units.
fn glyph_path(face: &ttf_parser::Face, ch: char) -> Option<tiny_skia_path::Path> {
    let glyph = face.glyph_index(ch)?;
    let mut sink = OutlineSink(tiny_skia_path::PathBuilder::new());
    face.outline_glyph(glyph, &mut sink)?;
    sink.0.finish()
}

struct OutlineSink(tiny_skia_path::PathBuilder);

impl OutlineBuilder for OutlineSink {
    fn move_to(&mut self, x: f32, y: f32) {
        self.0.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.0.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.0.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.0.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.0.close();
    }
}
