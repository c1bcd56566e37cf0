//! Path object rendering
//!
//! Paths are baked into canvas coordinates point by point: the object's
//! boundary origin is added and the page height flips Y. When a CTM is
//! present each point goes through it first. Arc segments are flattened to
//! cubics in canvas space, radii taken as-is.

use log::debug;

use crate::model::page::{ClipArea, CtPath};
use crate::model::path::{PathCommand, PathData};
use crate::model::res::DrawParam;
use crate::model::scalar::{Matrix, Pos, StBox};
use crate::render::canvas::{Canvas, Frame};
use crate::render::{style, Renderer};

impl Renderer<'_> {
    /// Draw one path object (or clip-area path) onto the canvas.
    pub(crate) fn draw_path_object(
        &mut self,
        canvas: &mut dyn Canvas,
        ct: &CtPath,
        layer_dp: Option<&DrawParam>,
        pb: StBox,
    ) {
        let mut frame = Frame::push(&mut *canvas);
        self.paint_ct_path(&mut *frame, ct, layer_dp, ct.unit.ctm.as_ref(), pb);

        // Clip areas are painted with their own style, each under its own
        // matrix but with the outer object's boundary offset.
        for clip in &ct.unit.clips {
            for area in &clip.areas {
                self.paint_clip_area(&mut *frame, area, &ct.unit.boundary, pb);
            }
        }
    }

    fn paint_clip_area(
        &mut self,
        canvas: &mut dyn Canvas,
        area: &ClipArea,
        outer_boundary: &StBox,
        pb: StBox,
    ) {
        let Some(path) = &area.path else { return };
        let dp = area.draw_param.and_then(|id| self.doc.draw_param(id));
        let mut shaped = path.clone();
        shaped.unit.boundary = *outer_boundary;
        self.paint_ct_path(canvas, &shaped, dp.as_ref(), area.ctm.as_ref(), pb);
    }

    /// Resolve style and issue the fill/stroke calls for one path payload.
    fn paint_ct_path(
        &mut self,
        canvas: &mut dyn Canvas,
        ct: &CtPath,
        layer_dp: Option<&DrawParam>,
        ctm: Option<&Matrix>,
        pb: StBox,
    ) {
        if ct.data.is_empty() {
            return;
        }
        let offset = (ct.unit.boundary.x, ct.unit.boundary.y);
        let height = pb.h;
        let transform = page_transform(ctm, offset, height);

        let Some(path) = build_path(&ct.data, &transform) else {
            debug!("path object produced no geometry");
            return;
        };

        let object_dp = self.object_draw_param(&ct.unit);
        let resolved = style::path_style(ct, layer_dp, object_dp.as_ref());

        if let Some(fill) = &resolved.fill {
            canvas.fill_path(&path, fill, resolved.rule);
        }
        if let Some((paint, stroke)) = &resolved.stroke {
            canvas.stroke_path(&path, paint, stroke);
        }
    }
}

/// The per-point object-to-canvas transform used for path rendering.
pub(crate) fn page_transform(
    ctm: Option<&Matrix>,
    offset: (f64, f64),
    height: f64,
) -> impl Fn(Pos) -> (f64, f64) + '_ {
    let (ox, oy) = offset;
    move |pt: Pos| match ctm {
        None => (pt.x + ox, height - (pt.y + oy)),
        Some(m) => {
            let (tx, ty) = m.transform_pos(pt);
            (tx + ox, height - (ty + oy))
        }
    }
}

/// Build a canvas path from path data, applying `transform` to every point.
pub(crate) fn build_path(
    data: &PathData,
    transform: &impl Fn(Pos) -> (f64, f64),
) -> Option<tiny_skia_path::Path> {
    let mut builder = tiny_skia_path::PathBuilder::new();
    // Current point in canvas space, for arc flattening.
    let mut current: Option<(f64, f64)> = None;

    for cmd in &data.0 {
        match cmd {
            PathCommand::Move(p) => {
                let (x, y) = transform(*p);
                builder.move_to(x as f32, y as f32);
                current = Some((x, y));
            }
            PathCommand::Line(p) => {
                let (x, y) = transform(*p);
                builder.line_to(x as f32, y as f32);
                current = Some((x, y));
            }
            PathCommand::Quad(c, p) => {
                let (cx, cy) = transform(*c);
                let (x, y) = transform(*p);
                builder.quad_to(cx as f32, cy as f32, x as f32, y as f32);
                current = Some((x, y));
            }
            PathCommand::Cubic(c1, c2, p) => {
                let (x1, y1) = transform(*c1);
                let (x2, y2) = transform(*c2);
                let (x, y) = transform(*p);
                builder.cubic_to(x1 as f32, y1 as f32, x2 as f32, y2 as f32, x as f32, y as f32);
                current = Some((x, y));
            }
            PathCommand::Arc(arc) => {
                let (ex, ey) = transform(arc.end);
                if let Some((sx, sy)) = current {
                    for seg in arc_to_cubics(
                        sx,
                        sy,
                        arc.rx,
                        arc.ry,
                        arc.rotation,
                        arc.large_arc,
                        arc.sweep,
                        ex,
                        ey,
                    ) {
                        builder.cubic_to(
                            seg[0] as f32,
                            seg[1] as f32,
                            seg[2] as f32,
                            seg[3] as f32,
                            seg[4] as f32,
                            seg[5] as f32,
                        );
                    }
                } else {
                    builder.move_to(ex as f32, ey as f32);
                }
                current = Some((ex, ey));
            }
            PathCommand::Close => builder.close(),
        }
    }
    builder.finish()
}

/// Flatten an SVG-style endpoint arc into cubic segments of at most 90°.
/// Returns `(c1x, c1y, c2x, c2y, x, y)` tuples.
#[allow(clippy::too_many_arguments)]
fn arc_to_cubics(
    x1: f64,
    y1: f64,
    rx: f64,
    ry: f64,
    rotation_deg: f64,
    large_arc: bool,
    sweep: bool,
    x2: f64,
    y2: f64,
) -> Vec<[f64; 6]> {
    if rx == 0.0 || ry == 0.0 || (x1 == x2 && y1 == y2) {
        // Degenerate arcs become a straight segment.
        return vec![[x1, y1, x2, y2, x2, y2]];
    }

    let phi = rotation_deg.to_radians();
    let (sin_phi, cos_phi) = phi.sin_cos();

    // Endpoint to centre parameterisation.
    let dx = (x1 - x2) / 2.0;
    let dy = (y1 - y2) / 2.0;
    let x1p = cos_phi * dx + sin_phi * dy;
    let y1p = -sin_phi * dx + cos_phi * dy;

    let mut rx = rx.abs();
    let mut ry = ry.abs();
    let lambda = (x1p * x1p) / (rx * rx) + (y1p * y1p) / (ry * ry);
    if lambda > 1.0 {
        let s = lambda.sqrt();
        rx *= s;
        ry *= s;
    }

    let num = (rx * rx) * (ry * ry) - (rx * rx) * (y1p * y1p) - (ry * ry) * (x1p * x1p);
    let den = (rx * rx) * (y1p * y1p) + (ry * ry) * (x1p * x1p);
    let mut coefficient = (num.max(0.0) / den).sqrt();
    if large_arc == sweep {
        coefficient = -coefficient;
    }
    let cxp = coefficient * rx * y1p / ry;
    let cyp = -coefficient * ry * x1p / rx;

    let cx = cos_phi * cxp - sin_phi * cyp + (x1 + x2) / 2.0;
    let cy = sin_phi * cxp + cos_phi * cyp + (y1 + y2) / 2.0;

    let angle = |ux: f64, uy: f64, vx: f64, vy: f64| -> f64 {
        let dot = ux * vx + uy * vy;
        let len = (ux * ux + uy * uy).sqrt() * (vx * vx + vy * vy).sqrt();
        let mut a = (dot / len).clamp(-1.0, 1.0).acos();
        if ux * vy - uy * vx < 0.0 {
            a = -a;
        }
        a
    };

    let theta1 = angle(1.0, 0.0, (x1p - cxp) / rx, (y1p - cyp) / ry);
    let mut dtheta = angle(
        (x1p - cxp) / rx,
        (y1p - cyp) / ry,
        (-x1p - cxp) / rx,
        (-y1p - cyp) / ry,
    );
    if !sweep && dtheta > 0.0 {
        dtheta -= std::f64::consts::TAU;
    } else if sweep && dtheta < 0.0 {
        dtheta += std::f64::consts::TAU;
    }

    let segments = (dtheta.abs() / std::f64::consts::FRAC_PI_2).ceil().max(1.0) as usize;
    let delta = dtheta / segments as f64;
    // Control-point distance for a circular arc segment of `delta` radians.
    let t = 4.0 / 3.0 * (delta / 4.0).tan();

    let point_at = |theta: f64| -> (f64, f64) {
        let (sin_t, cos_t) = theta.sin_cos();
        (
            cx + rx * cos_t * cos_phi - ry * sin_t * sin_phi,
            cy + rx * cos_t * sin_phi + ry * sin_t * cos_phi,
        )
    };
    let derivative_at = |theta: f64| -> (f64, f64) {
        let (sin_t, cos_t) = theta.sin_cos();
        (
            -rx * sin_t * cos_phi - ry * cos_t * sin_phi,
            -rx * sin_t * sin_phi + ry * cos_t * cos_phi,
        )
    };

    let mut cubics = Vec::with_capacity(segments);
    let mut theta = theta1;
    for _ in 0..segments {
        let theta_next = theta + delta;
        let (px, py) = point_at(theta);
        let (nx, ny) = point_at(theta_next);
        let (d1x, d1y) = derivative_at(theta);
        let (d2x, d2y) = derivative_at(theta_next);
        cubics.push([
            px + t * d1x,
            py + t * d1y,
            nx - t * d2x,
            ny - t * d2y,
            nx,
            ny,
        ]);
        theta = theta_next;
    }
    cubics
}
