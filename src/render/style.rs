//! Effective-style resolution
//!
//! Styles are resolved into fresh records at render time: canvas defaults,
//! then the layer's draw parameter chain, then the object's own draw
//! parameter, then inline attributes, then colour overrides.

use crate::model::page::{ColorKind, CtColor, CtPath, CtText, FillRule, GraphicUnit};
use crate::model::res::DrawParam;
use crate::model::scalar::{Rgba, BLACK};
use crate::render::canvas::{
    GradientStop, LinearGradient, LineCap, LineJoin, Paint, RadialGradient, StrokeStyle,
};

/// Stroke widths are declared in millimetres but observed output uses this
/// conversion before hitting the canvas.
pub const STROKE_WIDTH_FACTOR: f64 = 0.353;

/// Accumulated style state before object-level overrides.
#[derive(Debug, Clone)]
pub struct BaseStyle {
    pub fill_paint: Paint,
    pub stroke_paint: Paint,
    pub line_width: f64,
    pub cap: LineCap,
    pub join: LineJoin,
    pub miter_limit: f64,
    pub dash: Option<(Vec<f64>, f64)>,
}

impl Default for BaseStyle {
    fn default() -> Self {
        BaseStyle {
            fill_paint: Paint::Solid(BLACK),
            stroke_paint: Paint::Solid(BLACK),
            line_width: 1.0,
            cap: LineCap::Butt,
            join: LineJoin::Miter,
            miter_limit: 3.528,
            dash: None,
        }
    }
}

impl BaseStyle {
    /// Overlay a (merged) draw parameter; absent fields keep their value.
    pub fn apply_draw_param(&mut self, dp: &DrawParam) {
        if dp.line_width > 0.0 {
            self.line_width = dp.line_width;
        }
        if !dp.cap.is_empty() {
            self.cap = line_cap(Some(&dp.cap));
        }
        if !dp.join.is_empty() {
            self.join = line_join(Some(&dp.join));
        }
        if dp.miter_limit > 0.0 {
            self.miter_limit = dp.miter_limit;
        }
        if let Some(pattern) = &dp.dash_pattern {
            self.dash = Some((pattern.0.clone(), dp.dash_offset));
        }
        if let Some(fill) = &dp.fill_color {
            self.fill_paint = resolve_color(fill);
        }
        if let Some(stroke) = &dp.stroke_color {
            self.stroke_paint = resolve_color(stroke);
        }
    }
}

pub fn line_cap(s: Option<&str>) -> LineCap {
    match s {
        Some("Round") => LineCap::Round,
        Some("Square") => LineCap::Square,
        _ => LineCap::Butt,
    }
}

pub fn line_join(s: Option<&str>) -> LineJoin {
    match s {
        Some("Round") => LineJoin::Round,
        Some("Bevel") => LineJoin::Bevel,
        _ => LineJoin::Miter,
    }
}

/// Resolve a colour description into a paint.
///
/// Solid values honour the transparency attribute (`255 - alpha`, applied
/// only when the attribute actually reduces opacity). Axial and radial
/// shadings become gradients; Gouraud, lattice and pattern shadings fall
/// back to solid black.
pub fn resolve_color(color: &CtColor) -> Paint {
    match &color.kind {
        ColorKind::Solid(value) => {
            let mut rgba = *value;
            if let Some(alpha) = color.alpha {
                if alpha < 255 {
                    rgba.a = 255 - alpha;
                }
            }
            Paint::Solid(rgba)
        }
        ColorKind::Axial(axial) => {
            let mut stops = gradient_stops(
                axial.segments.iter().map(|s| (s.position, &s.color)),
            );
            // Some producers emit two segments both at position 0; treat the
            // second as the far end.
            if stops.len() == 2 && stops[0].position == 0.0 && stops[1].position == 0.0 {
                stops[1].position = 1.0;
            }
            Paint::Linear(LinearGradient {
                start: (axial.start.x, axial.start.y),
                end: (axial.end.x, axial.end.y),
                stops,
            })
        }
        ColorKind::Radial(radial) => Paint::Radial(RadialGradient {
            start: (radial.start.x, radial.start.y),
            start_radius: radial.start_radius,
            end: (radial.end.x, radial.end.y),
            end_radius: radial.end_radius,
            stops: gradient_stops(radial.segments.iter().map(|s| (s.position, &s.color))),
        }),
        ColorKind::Gouraud(_) | ColorKind::LatticeGouraud(_) | ColorKind::Pattern(_) => {
            Paint::Solid(BLACK)
        }
    }
}

fn gradient_stops<'a>(
    segments: impl Iterator<Item = (f64, &'a CtColor)>,
) -> Vec<GradientStop> {
    segments
        .map(|(position, color)| GradientStop {
            position: position.clamp(0.0, 1.0),
            color: solid_of(color),
        })
        .collect()
}

/// The plain colour of a gradient stop; nested shadings degrade to black.
fn solid_of(color: &CtColor) -> Rgba {
    match resolve_color(color) {
        Paint::Solid(rgba) => rgba,
        _ => BLACK,
    }
}

/// The resolved drawing instructions for a path object.
#[derive(Debug, Clone)]
pub struct PathStyle {
    pub fill: Option<Paint>,
    pub rule: FillRule,
    pub stroke: Option<(Paint, StrokeStyle)>,
}

/// Resolve the effective style of a path object.
///
/// `layer_dp` and `object_dp` are already-merged draw parameter chains of
/// the containing layer and of the object's own reference.
pub fn path_style(
    path: &CtPath,
    layer_dp: Option<&DrawParam>,
    object_dp: Option<&DrawParam>,
) -> PathStyle {
    let mut base = BaseStyle::default();
    if let Some(dp) = layer_dp {
        base.apply_draw_param(dp);
    }
    if let Some(dp) = object_dp {
        base.apply_draw_param(dp);
    }

    let fill = if path.fill {
        let mut paint = match &path.fill_color {
            Some(color) => resolve_color(color),
            None => base.fill_paint.clone(),
        };
        // The graphic unit's own transparency overrides the colour's.
        if let (Paint::Solid(rgba), Some(alpha)) = (&mut paint, path.unit.alpha) {
            rgba.a = 255 - alpha;
        }
        Some(paint)
    } else {
        None
    };

    let stroke = if path.stroke {
        let paint = match &path.stroke_color {
            Some(color) => resolve_color(color),
            None => base.stroke_paint.clone(),
        };
        Some((paint, stroke_style(&path.unit, &base)))
    } else {
        None
    };

    PathStyle { fill, rule: path.rule, stroke }
}

fn stroke_style(unit: &GraphicUnit, base: &BaseStyle) -> StrokeStyle {
    let declared = unit.line_width.unwrap_or(base.line_width);
    let dash = match &unit.dash_pattern {
        Some(pattern) => Some((pattern.0.clone(), unit.dash_offset)),
        None => base.dash.clone(),
    };
    StrokeStyle {
        width: declared.max(1.0) * STROKE_WIDTH_FACTOR,
        cap: match unit.cap.as_deref() {
            Some(c) => line_cap(Some(c)),
            None => base.cap,
        },
        join: match unit.join.as_deref() {
            Some(j) => line_join(Some(j)),
            None => base.join,
        },
        miter_limit: unit.miter_limit.unwrap_or(base.miter_limit),
        dash,
    }
}

/// The resolved fill paint of a text object.
pub fn text_fill(
    text: &CtText,
    layer_dp: Option<&DrawParam>,
    object_dp: Option<&DrawParam>,
) -> Option<Paint> {
    if !text.fill {
        return None;
    }
    let mut base = BaseStyle::default();
    if let Some(dp) = layer_dp {
        base.apply_draw_param(dp);
    }
    if let Some(dp) = object_dp {
        base.apply_draw_param(dp);
    }
    Some(match &text.fill_color {
        Some(color) => resolve_color(color),
        None => base.fill_paint,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::page::{AxialShd, PathObject, Segment};
    use crate::model::scalar::Pos;

    fn simple_path(xml_text: &str) -> CtPath {
        let doc = roxmltree::Document::parse(xml_text).unwrap();
        PathObject::from_node(doc.root_element()).unwrap().path
    }

    #[test]
    fn test_defaults_fill_only() {
        let path = simple_path(
            r#"<PathObject ID="1" Boundary="0 0 10 10" Fill="true" Stroke="false">
                 <AbbreviatedData>M 0 0 L 1 1</AbbreviatedData>
               </PathObject>"#,
        );
        let style = path_style(&path, None, None);
        assert_eq!(style.fill, Some(Paint::Solid(BLACK)));
        assert!(style.stroke.is_none());
        assert_eq!(style.rule, FillRule::NonZero);
    }

    #[test]
    fn test_stroke_width_conversion() {
        let path = simple_path(
            r#"<PathObject ID="1" Boundary="0 0 10 10" LineWidth="2">
                 <AbbreviatedData>M 0 0 L 1 1</AbbreviatedData>
               </PathObject>"#,
        );
        let style = path_style(&path, None, None);
        let (_, stroke) = style.stroke.unwrap();
        assert!((stroke.width - 2.0 * STROKE_WIDTH_FACTOR).abs() < 1e-9);

        // Widths below 1mm are clamped up before conversion.
        let thin = simple_path(
            r#"<PathObject ID="1" Boundary="0 0 10 10" LineWidth="0.25">
                 <AbbreviatedData>M 0 0 L 1 1</AbbreviatedData>
               </PathObject>"#,
        );
        let (_, stroke) = path_style(&thin, None, None).stroke.unwrap();
        assert!((stroke.width - STROKE_WIDTH_FACTOR).abs() < 1e-9);
    }

    #[test]
    fn test_alpha_is_transparency() {
        let path = simple_path(
            r#"<PathObject ID="1" Boundary="0 0 10 10" Fill="true" Alpha="55">
                 <FillColor Value="10 20 30"/>
                 <AbbreviatedData>M 0 0 L 1 1</AbbreviatedData>
               </PathObject>"#,
        );
        let style = path_style(&path, None, None);
        assert_eq!(style.fill, Some(Paint::Solid(Rgba::new(10, 20, 30, 200))));
    }

    #[test]
    fn test_color_alpha_attribute() {
        let doc = roxmltree::Document::parse(r#"<Color Value="1 2 3" Alpha="100"/>"#).unwrap();
        let color = CtColor::from_node(doc.root_element()).unwrap();
        assert_eq!(resolve_color(&color), Paint::Solid(Rgba::new(1, 2, 3, 155)));

        // A full-opacity attribute keeps the colour opaque.
        let doc = roxmltree::Document::parse(r#"<Color Value="1 2 3" Alpha="255"/>"#).unwrap();
        let color = CtColor::from_node(doc.root_element()).unwrap();
        assert_eq!(resolve_color(&color), Paint::Solid(Rgba::new(1, 2, 3, 255)));
    }

    #[test]
    fn test_draw_param_layers() {
        let mut layer_dp = DrawParam::default();
        layer_dp.line_width = 4.0;
        layer_dp.cap = "Round".to_string();
        layer_dp.stroke_color = Some(CtColor::solid(Rgba::new(200, 0, 0, 255)));

        let mut object_dp = DrawParam::default();
        object_dp.cap = "Square".to_string();

        let path = simple_path(
            r#"<PathObject ID="1" Boundary="0 0 10 10">
                 <AbbreviatedData>M 0 0 L 1 1</AbbreviatedData>
               </PathObject>"#,
        );
        let style = path_style(&path, Some(&layer_dp), Some(&object_dp));
        let (paint, stroke) = style.stroke.unwrap();
        // Object dp overrides layer dp, layer dp fills the rest.
        assert_eq!(stroke.cap, LineCap::Square);
        assert!((stroke.width - 4.0 * STROKE_WIDTH_FACTOR).abs() < 1e-9);
        assert_eq!(paint, Paint::Solid(Rgba::new(200, 0, 0, 255)));
    }

    #[test]
    fn test_gradient_zero_zero_snap() {
        let axial = AxialShd {
            segments: vec![
                Segment { position: 0.0, color: CtColor::solid(Rgba::new(255, 0, 0, 255)) },
                Segment { position: 0.0, color: CtColor::solid(Rgba::new(0, 0, 255, 255)) },
            ],
            map_type: None,
            map_unit: 0.0,
            extend: 0,
            start: Pos::new(0.0, 0.0),
            end: Pos::new(10.0, 0.0),
        };
        let color = CtColor {
            kind: ColorKind::Axial(axial),
            color_space: None,
            index: None,
            alpha: None,
        };
        match resolve_color(&color) {
            Paint::Linear(gradient) => {
                assert_eq!(gradient.stops[0].position, 0.0);
                assert_eq!(gradient.stops[1].position, 1.0);
            }
            other => panic!("expected linear gradient, got {other:?}"),
        }
    }

    #[test]
    fn test_unsupported_shading_falls_back_to_black() {
        let doc = roxmltree::Document::parse(
            r#"<FillColor><GouraudShd><Point X="0" Y="0" EdgeFlag="0"><Color Value="9 9 9"/></Point></GouraudShd></FillColor>"#,
        )
        .unwrap();
        let color = CtColor::from_node(doc.root_element()).unwrap();
        assert_eq!(resolve_color(&color), Paint::Solid(BLACK));
    }

    #[test]
    fn test_text_fill_disabled() {
        let doc = roxmltree::Document::parse(
            r#"<TextObject ID="1" Boundary="0 0 10 10" Font="3" Size="4" Fill="false">
                 <TextCode X="0" Y="0">a</TextCode>
               </TextObject>"#,
        )
        .unwrap();
        let text = crate::model::page::TextObject::from_node(doc.root_element()).unwrap().text;
        assert!(text_fill(&text, None, None).is_none());
    }
}
