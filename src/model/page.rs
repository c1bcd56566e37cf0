//! Page content: layers, blocks and graphic objects

use roxmltree::Node;

use crate::error::Result;
use crate::model::loc::Loc;
use crate::model::path::PathData;
use crate::model::scalar::{
    parse_id, FloatArray, Id, IntArray, Matrix, Pos, RefId, Rgba, StBox,
};
use crate::xml;

/// A parsed page-content or template-content file.
#[derive(Debug, Clone, Default)]
pub struct PageContent {
    pub templates: Vec<TemplateRef>,
    pub page_res: Vec<Loc>,
    /// Absent areas inherit `CommonData.PageArea` during parsing.
    pub area: Option<PageArea>,
    pub layers: Vec<Layer>,
    pub actions: Vec<Action>,
}

/// Reference from a page to a template page, with a Z-order hint.
#[derive(Debug, Clone)]
pub struct TemplateRef {
    pub template_id: RefId,
    /// `Background` or `Foreground`; empty means unspecified.
    pub z_order: String,
}

/// Page area boxes; only `physical_box` is required.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageArea {
    pub physical_box: StBox,
    pub application_box: Option<StBox>,
    pub content_box: Option<StBox>,
    pub bleed_box: Option<StBox>,
}

impl PageArea {
    pub(crate) fn from_node(node: Node) -> Result<Self> {
        let parse_opt = |name: &str| -> Result<Option<StBox>> {
            match xml::child_text(node, name) {
                Some(t) if !t.is_empty() => Ok(Some(StBox::parse(&t)?)),
                _ => Ok(None),
            }
        };
        Ok(PageArea {
            physical_box: parse_opt("PhysicalBox")?.unwrap_or_default(),
            application_box: parse_opt("ApplicationBox")?,
            content_box: parse_opt("ContentBox")?,
            bleed_box: parse_opt("BleedBox")?,
        })
    }
}

/// Layer type as declared in the content file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayerKind {
    #[default]
    Body,
    Background,
    Foreground,
    Custom,
}

impl LayerKind {
    fn parse(s: &str) -> LayerKind {
        match s {
            "Background" => LayerKind::Background,
            "Foreground" => LayerKind::Foreground,
            "Custom" => LayerKind::Custom,
            _ => LayerKind::Body,
        }
    }
}

/// An ordered, typed group of graphic objects within a page.
#[derive(Debug, Clone)]
pub struct Layer {
    pub id: Id,
    pub kind: LayerKind,
    pub draw_param: Option<RefId>,
    pub content: PageBlock,
}

/// The recursive block of graphic objects shared by layers, page blocks,
/// annotation appearances and composite cells.
#[derive(Debug, Clone, Default)]
pub struct PageBlock {
    pub blocks: Vec<PageBlock>,
    pub images: Vec<ImageObject>,
    pub paths: Vec<PathObject>,
    pub texts: Vec<TextObject>,
    pub composites: Vec<CompositeObject>,
}

impl PageBlock {
    pub(crate) fn from_node(node: Node) -> Result<Self> {
        let mut block = PageBlock::default();
        for child in node.children().filter(|n| n.is_element()) {
            match child.tag_name().name() {
                "PageBlock" => block.blocks.push(PageBlock::from_node(child)?),
                "ImageObject" => block.images.push(ImageObject::from_node(child)?),
                "PathObject" => block.paths.push(PathObject::from_node(child)?),
                "TextObject" => block.texts.push(TextObject::from_node(child)?),
                "CompositeObject" => block.composites.push(CompositeObject::from_node(child)?),
                _ => {}
            }
        }
        Ok(block)
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
            && self.images.is_empty()
            && self.paths.is_empty()
            && self.texts.is_empty()
            && self.composites.is_empty()
    }
}

/// Attributes shared by every graphic object.
#[derive(Debug, Clone, Default)]
pub struct GraphicUnit {
    pub boundary: StBox,
    pub name: Option<String>,
    pub visible: bool,
    pub ctm: Option<Matrix>,
    pub draw_param: Option<RefId>,
    pub line_width: Option<f64>,
    pub cap: Option<String>,
    pub join: Option<String>,
    pub miter_limit: Option<f64>,
    pub dash_offset: f64,
    pub dash_pattern: Option<FloatArray>,
    /// Transparency override, 0..=255.
    pub alpha: Option<u8>,
    pub clips: Vec<Clip>,
    pub actions: Vec<Action>,
}

impl GraphicUnit {
    pub(crate) fn from_node(node: Node) -> Result<Self> {
        let boundary = match xml::attr(node, "Boundary") {
            Some(v) => StBox::parse(v)?,
            None => StBox::default(),
        };
        let ctm = match xml::attr(node, "CTM") {
            Some(v) => Some(Matrix::parse(v)?),
            None => None,
        };
        let draw_param = match xml::attr(node, "DrawParam") {
            Some(v) => Some(parse_id(v)?),
            None => None,
        };
        let line_width = match xml::attr(node, "LineWidth") {
            Some(_) => Some(xml::attr_f64(node, "LineWidth", 0.0)?),
            None => None,
        };
        let miter_limit = match xml::attr(node, "MiterLimit") {
            Some(_) => Some(xml::attr_f64(node, "MiterLimit", 0.0)?),
            None => None,
        };
        let alpha = match xml::attr(node, "Alpha") {
            Some(v) => Some(v.parse::<u8>().map_err(|e| {
                crate::error::Error::Parse(format!("Alpha='{v}': {e}"))
            })?),
            None => None,
        };
        let mut clips = Vec::new();
        if let Some(clips_node) = xml::child(node, "Clips") {
            for clip in xml::children(clips_node, "Clip") {
                clips.push(Clip::from_node(clip)?);
            }
        }
        let mut actions = Vec::new();
        if let Some(actions_node) = xml::child(node, "Actions") {
            for action in xml::children(actions_node, "Action") {
                actions.push(Action::from_node(action)?);
            }
        }
        Ok(GraphicUnit {
            boundary,
            name: xml::attr(node, "Name").map(str::to_string),
            visible: xml::attr_bool(node, "Visible", true),
            ctm,
            draw_param,
            line_width,
            cap: xml::attr(node, "Cap").map(str::to_string),
            join: xml::attr(node, "Join").map(str::to_string),
            miter_limit,
            dash_offset: xml::attr_f64(node, "DashOffset", 0.0)?,
            dash_pattern: xml::attr(node, "DashPattern").map(FloatArray::parse),
            alpha,
            clips,
            actions,
        })
    }
}

/// A clip region: the union of its areas.
#[derive(Debug, Clone)]
pub struct Clip {
    pub areas: Vec<ClipArea>,
}

impl Clip {
    fn from_node(node: Node) -> Result<Self> {
        let mut areas = Vec::new();
        for area in xml::children(node, "Area") {
            let path = match xml::child(area, "Path") {
                Some(p) => Some(CtPath::from_node(p)?),
                None => None,
            };
            let draw_param = match xml::attr(area, "DrawParam") {
                Some(v) => Some(parse_id(v)?),
                None => None,
            };
            let ctm = match xml::attr(area, "CTM") {
                Some(v) => Some(Matrix::parse(v)?),
                None => None,
            };
            areas.push(ClipArea { path, draw_param, ctm });
        }
        Ok(Clip { areas })
    }
}

#[derive(Debug, Clone)]
pub struct ClipArea {
    pub path: Option<CtPath>,
    pub draw_param: Option<RefId>,
    pub ctm: Option<Matrix>,
}

/// Fill rule for path objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillRule {
    #[default]
    NonZero,
    EvenOdd,
}

/// The path payload shared by `PathObject` and clip areas.
#[derive(Debug, Clone)]
pub struct CtPath {
    pub unit: GraphicUnit,
    /// `Stroke="false"` disables stroking; anything else enables it.
    pub stroke: bool,
    pub fill: bool,
    pub rule: FillRule,
    pub stroke_color: Option<CtColor>,
    pub fill_color: Option<CtColor>,
    pub data: PathData,
}

impl CtPath {
    pub(crate) fn from_node(node: Node) -> Result<Self> {
        let data = match xml::child_text(node, "AbbreviatedData") {
            Some(text) => PathData::parse(&text)?,
            None => PathData::default(),
        };
        Ok(CtPath {
            unit: GraphicUnit::from_node(node)?,
            stroke: xml::attr(node, "Stroke") != Some("false"),
            fill: xml::attr_bool(node, "Fill", false),
            rule: match xml::attr(node, "Rule") {
                Some("Even-Odd") => FillRule::EvenOdd,
                _ => FillRule::NonZero,
            },
            stroke_color: parse_color_child(node, "StrokeColor")?,
            fill_color: parse_color_child(node, "FillColor")?,
            data,
        })
    }
}

#[derive(Debug, Clone)]
pub struct PathObject {
    pub id: Id,
    pub path: CtPath,
}

impl PathObject {
    pub(crate) fn from_node(node: Node) -> Result<Self> {
        Ok(PathObject {
            id: xml::attr_u64(node, "ID", 0)?,
            path: CtPath::from_node(node)?,
        })
    }
}

/// The text payload of a `TextObject`.
#[derive(Debug, Clone)]
pub struct CtText {
    pub unit: GraphicUnit,
    pub font: RefId,
    /// Glyph size in millimetres.
    pub size: f64,
    pub stroke: bool,
    pub fill: bool,
    /// Horizontal scaling, default 1.0.
    pub h_scale: f64,
    pub read_direction: i64,
    pub char_direction: i64,
    /// 0, 100, ..., 1000; 0 means unspecified (400).
    pub weight: i64,
    pub italic: bool,
    pub fill_color: Option<CtColor>,
    pub stroke_color: Option<CtColor>,
    pub transforms: Vec<CgTransform>,
    pub codes: Vec<TextCode>,
}

impl CtText {
    pub(crate) fn from_node(node: Node) -> Result<Self> {
        let mut transforms = Vec::new();
        for t in xml::children(node, "CGTransform") {
            transforms.push(CgTransform {
                code_position: xml::attr_i64(t, "CodePosition", 0)?,
                code_count: xml::attr_i64(t, "CodeCount", 0)?,
                glyph_count: xml::attr_i64(t, "GlyphCount", 0)?,
                glyphs: IntArray::parse(&xml::child_text(t, "Glyphs").unwrap_or_default()),
            });
        }
        let mut codes = Vec::new();
        for c in xml::children(node, "TextCode") {
            codes.push(TextCode {
                x: xml::attr_f64(c, "X", 0.0)?,
                y: xml::attr_f64(c, "Y", 0.0)?,
                delta_x: xml::attr(c, "DeltaX").map(FloatArray::parse).unwrap_or_default(),
                delta_y: xml::attr(c, "DeltaY").map(FloatArray::parse).unwrap_or_default(),
                value: xml::text(c),
            });
        }
        Ok(CtText {
            unit: GraphicUnit::from_node(node)?,
            font: xml::attr_u64(node, "Font", 0)?,
            size: xml::attr_f64(node, "Size", 0.0)?,
            stroke: xml::attr_bool(node, "Stroke", false),
            fill: xml::attr(node, "Fill") != Some("false"),
            h_scale: xml::attr_f64(node, "HScale", 0.0)?,
            read_direction: xml::attr_i64(node, "ReadDirection", 0)?,
            char_direction: xml::attr_i64(node, "CharDirection", 0)?,
            weight: xml::attr_i64(node, "Weight", 0)?,
            italic: xml::attr_bool(node, "Italic", false),
            fill_color: parse_color_child(node, "FillColor")?,
            stroke_color: parse_color_child(node, "StrokeColor")?,
            transforms,
            codes,
        })
    }
}

/// One run of characters with a start position and per-glyph deltas.
#[derive(Debug, Clone)]
pub struct TextCode {
    pub x: f64,
    pub y: f64,
    pub delta_x: FloatArray,
    pub delta_y: FloatArray,
    pub value: String,
}

/// Glyph-index substitution table; parsed and carried, not consumed by the
/// outline renderer.
#[derive(Debug, Clone)]
pub struct CgTransform {
    pub code_position: i64,
    pub code_count: i64,
    pub glyph_count: i64,
    pub glyphs: IntArray,
}

#[derive(Debug, Clone)]
pub struct TextObject {
    pub id: Id,
    pub text: CtText,
}

impl TextObject {
    pub(crate) fn from_node(node: Node) -> Result<Self> {
        Ok(TextObject {
            id: xml::attr_u64(node, "ID", 0)?,
            text: CtText::from_node(node)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ImageObject {
    pub id: Id,
    pub unit: GraphicUnit,
    pub resource_id: RefId,
    pub substitution: Option<RefId>,
    pub image_mask: Option<RefId>,
}

impl ImageObject {
    pub(crate) fn from_node(node: Node) -> Result<Self> {
        let substitution = match xml::attr(node, "Substitution") {
            Some(v) => Some(parse_id(v)?),
            None => None,
        };
        let image_mask = match xml::attr(node, "ImageMask") {
            Some(v) => Some(parse_id(v)?),
            None => None,
        };
        Ok(ImageObject {
            id: xml::attr_u64(node, "ID", 0)?,
            unit: GraphicUnit::from_node(node)?,
            resource_id: xml::attr_u64(node, "ResourceID", 0)?,
            substitution,
            image_mask,
        })
    }
}

#[derive(Debug, Clone)]
pub struct CompositeObject {
    pub id: Id,
    pub unit: GraphicUnit,
    pub resource_id: RefId,
}

impl CompositeObject {
    pub(crate) fn from_node(node: Node) -> Result<Self> {
        Ok(CompositeObject {
            id: xml::attr_u64(node, "ID", 0)?,
            unit: GraphicUnit::from_node(node)?,
            resource_id: xml::attr_u64(node, "ResourceID", 0)?,
        })
    }
}

/// A colour description: exactly one of the variants is present in the file.
#[derive(Debug, Clone)]
pub struct CtColor {
    pub kind: ColorKind,
    pub color_space: Option<RefId>,
    pub index: Option<u64>,
    /// Transparency, 0..=255; resolved as `255 - alpha`.
    pub alpha: Option<u8>,
}

#[derive(Debug, Clone)]
pub enum ColorKind {
    Solid(Rgba),
    Axial(AxialShd),
    Radial(RadialShd),
    Gouraud(GouraudShd),
    LatticeGouraud(LatticeGouraudShd),
    Pattern(PatternDef),
}

impl CtColor {
    pub(crate) fn from_node(node: Node) -> Result<Self> {
        let kind = if let Some(axial) = xml::child(node, "AxialShd") {
            ColorKind::Axial(AxialShd::from_node(axial)?)
        } else if let Some(radial) = xml::child(node, "RadialShd") {
            ColorKind::Radial(RadialShd::from_node(radial)?)
        } else if let Some(gouraud) = xml::child(node, "GouraudShd") {
            ColorKind::Gouraud(GouraudShd::from_node(gouraud)?)
        } else if let Some(lattice) = xml::child(node, "LaGouraudShd") {
            ColorKind::LatticeGouraud(LatticeGouraudShd::from_node(lattice)?)
        } else if let Some(pattern) = xml::child(node, "Pattern") {
            ColorKind::Pattern(PatternDef::from_node(pattern)?)
        } else {
            // No Value and no Index means all channels zero.
            ColorKind::Solid(Rgba::parse(xml::attr(node, "Value").unwrap_or(""))?)
        };
        let color_space = match xml::attr(node, "ColorSpace") {
            Some(v) => Some(parse_id(v)?),
            None => None,
        };
        let index = match xml::attr(node, "Index") {
            Some(v) => Some(v.parse::<u64>().map_err(|e| {
                crate::error::Error::Parse(format!("Index='{v}': {e}"))
            })?),
            None => None,
        };
        let alpha = match xml::attr(node, "Alpha") {
            Some(v) => Some(v.parse::<u8>().map_err(|e| {
                crate::error::Error::Parse(format!("Alpha='{v}': {e}"))
            })?),
            None => None,
        };
        Ok(CtColor { kind, color_space, index, alpha })
    }

    /// A plain opaque colour.
    pub fn solid(rgba: Rgba) -> CtColor {
        CtColor { kind: ColorKind::Solid(rgba), color_space: None, index: None, alpha: None }
    }
}

fn parse_color_child(node: Node, name: &str) -> Result<Option<CtColor>> {
    match xml::child(node, name) {
        Some(c) => Ok(Some(CtColor::from_node(c)?)),
        None => Ok(None),
    }
}

/// One stop of a gradient.
#[derive(Debug, Clone)]
pub struct Segment {
    pub position: f64,
    pub color: CtColor,
}

fn parse_segments(node: Node) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    for seg in xml::children(node, "Segment") {
        let color = xml::child(seg, "Color")
            .map(CtColor::from_node)
            .transpose()?
            .unwrap_or_else(|| CtColor::solid(crate::model::scalar::BLACK));
        segments.push(Segment { position: xml::attr_f64(seg, "Position", 0.0)?, color });
    }
    Ok(segments)
}

/// Linear (axial) gradient.
#[derive(Debug, Clone)]
pub struct AxialShd {
    pub segments: Vec<Segment>,
    pub map_type: Option<String>,
    pub map_unit: f64,
    pub extend: i64,
    pub start: Pos,
    pub end: Pos,
}

impl AxialShd {
    fn from_node(node: Node) -> Result<Self> {
        Ok(AxialShd {
            segments: parse_segments(node)?,
            map_type: xml::attr(node, "MapType").map(str::to_string),
            map_unit: xml::attr_f64(node, "MapUnit", 0.0)?,
            extend: xml::attr_i64(node, "Extend", 0)?,
            start: Pos::parse(xml::req_attr(node, "StartPoint")?)?,
            end: Pos::parse(xml::req_attr(node, "EndPoint")?)?,
        })
    }
}

/// Radial gradient.
#[derive(Debug, Clone)]
pub struct RadialShd {
    pub segments: Vec<Segment>,
    pub start: Pos,
    pub start_radius: f64,
    pub end: Pos,
    pub end_radius: f64,
    pub eccentricity: f64,
    pub angle: f64,
    pub extend: i64,
}

impl RadialShd {
    fn from_node(node: Node) -> Result<Self> {
        Ok(RadialShd {
            segments: parse_segments(node)?,
            start: Pos::parse(xml::req_attr(node, "StartPoint")?)?,
            start_radius: xml::attr_f64(node, "StartRadius", 0.0)?,
            end: Pos::parse(xml::req_attr(node, "EndPoint")?)?,
            end_radius: xml::attr_f64(node, "EndRadius", 0.0)?,
            eccentricity: xml::attr_f64(node, "Eccentricity", 0.0)?,
            angle: xml::attr_f64(node, "Angle", 0.0)?,
            extend: xml::attr_i64(node, "Extend", 0)?,
        })
    }
}

/// Gouraud shading; parsed for completeness, rendered as solid black.
#[derive(Debug, Clone)]
pub struct GouraudShd {
    pub points: Vec<GouraudPoint>,
    pub extend: i64,
}

#[derive(Debug, Clone)]
pub struct GouraudPoint {
    pub x: f64,
    pub y: f64,
    pub edge_flag: i64,
    pub color: CtColor,
}

impl GouraudShd {
    fn from_node(node: Node) -> Result<Self> {
        let mut points = Vec::new();
        for p in xml::children(node, "Point") {
            let color = xml::child(p, "Color")
                .map(CtColor::from_node)
                .transpose()?
                .unwrap_or_else(|| CtColor::solid(crate::model::scalar::BLACK));
            points.push(GouraudPoint {
                x: xml::attr_f64(p, "X", 0.0)?,
                y: xml::attr_f64(p, "Y", 0.0)?,
                edge_flag: xml::attr_i64(p, "EdgeFlag", 0)?,
                color,
            });
        }
        Ok(GouraudShd { points, extend: xml::attr_i64(node, "Extend", 0)? })
    }
}

/// Lattice-form Gouraud shading; parsed for completeness, rendered as solid
/// black.
#[derive(Debug, Clone)]
pub struct LatticeGouraudShd {
    pub points: Vec<GouraudPoint>,
    pub vertices_per_row: i64,
    pub extend: i64,
}

impl LatticeGouraudShd {
    fn from_node(node: Node) -> Result<Self> {
        let mut points = Vec::new();
        for p in xml::children(node, "Point") {
            let color = xml::child(p, "Color")
                .map(CtColor::from_node)
                .transpose()?
                .unwrap_or_else(|| CtColor::solid(crate::model::scalar::BLACK));
            points.push(GouraudPoint {
                x: xml::attr_f64(p, "X", 0.0)?,
                y: xml::attr_f64(p, "Y", 0.0)?,
                edge_flag: 0,
                color,
            });
        }
        Ok(LatticeGouraudShd {
            points,
            vertices_per_row: xml::attr_i64(node, "VerticesPerRow", 0)?,
            extend: xml::attr_i64(node, "Extend", 0)?,
        })
    }
}

/// Tiled pattern fill; parsed for completeness, rendered as solid black.
#[derive(Debug, Clone)]
pub struct PatternDef {
    pub width: f64,
    pub height: f64,
    pub x_step: f64,
    pub y_step: f64,
    pub reflect_method: Option<String>,
    pub relative_to: Option<String>,
    pub cell: PageBlock,
}

impl PatternDef {
    fn from_node(node: Node) -> Result<Self> {
        let cell = match xml::child(node, "CellContent") {
            Some(c) => PageBlock::from_node(c)?,
            None => PageBlock::default(),
        };
        Ok(PatternDef {
            width: xml::attr_f64(node, "Width", 0.0)?,
            height: xml::attr_f64(node, "Height", 0.0)?,
            x_step: xml::attr_f64(node, "XStep", 0.0)?,
            y_step: xml::attr_f64(node, "YStep", 0.0)?,
            reflect_method: xml::attr(node, "ReflectMethod").map(str::to_string),
            relative_to: xml::attr(node, "RelativeTo").map(str::to_string),
            cell,
        })
    }
}

/// Navigation destination of a goto action.
#[derive(Debug, Clone)]
pub struct Dest {
    pub kind: String,
    pub page_id: RefId,
    pub left: Option<f64>,
    pub top: Option<f64>,
    pub right: Option<f64>,
    pub bottom: Option<f64>,
    pub zoom: Option<f64>,
}

impl Dest {
    fn from_node(node: Node) -> Result<Self> {
        let opt = |name: &str| -> Result<Option<f64>> {
            match xml::attr(node, name) {
                Some(_) => Ok(Some(xml::attr_f64(node, name, 0.0)?)),
                None => Ok(None),
            }
        };
        Ok(Dest {
            kind: xml::attr(node, "Type").unwrap_or("XYZ").to_string(),
            page_id: xml::attr_u64(node, "PageID", 0)?,
            left: opt("Left")?,
            top: opt("Top")?,
            right: opt("Right")?,
            bottom: opt("Bottom")?,
            zoom: opt("Zoom")?,
        })
    }
}

/// An interactive action. Rendering treats all of these as no-ops.
#[derive(Debug, Clone)]
pub struct Action {
    pub event: String,
    pub kind: ActionKind,
}

#[derive(Debug, Clone)]
pub enum ActionKind {
    Goto { dest: Option<Dest>, bookmark: Option<String> },
    Uri { uri: String, base: Option<String>, target: Option<String> },
    GotoAttach { attach_id: String, new_window: bool },
    Sound { resource_id: RefId },
    Movie { resource_id: RefId, operator: Option<String> },
    Unknown,
}

impl Action {
    pub(crate) fn from_node(node: Node) -> Result<Self> {
        let kind = if let Some(goto) = xml::child(node, "Goto") {
            let dest = match xml::child(goto, "Dest") {
                Some(d) => Some(Dest::from_node(d)?),
                None => None,
            };
            let bookmark = xml::child(goto, "Bookmark")
                .and_then(|b| xml::attr(b, "Name"))
                .map(str::to_string);
            ActionKind::Goto { dest, bookmark }
        } else if let Some(uri) = xml::child(node, "URI") {
            ActionKind::Uri {
                uri: xml::attr(uri, "URI").unwrap_or("").to_string(),
                base: xml::attr(uri, "Base").map(str::to_string),
                target: xml::attr(uri, "Target").map(str::to_string),
            }
        } else if let Some(gota) = xml::child(node, "GotoA") {
            ActionKind::GotoAttach {
                attach_id: xml::attr(gota, "AttachID").unwrap_or("").to_string(),
                new_window: xml::attr_bool(gota, "NewWindow", false),
            }
        } else if let Some(sound) = xml::child(node, "Sound") {
            ActionKind::Sound { resource_id: xml::attr_u64(sound, "ResourceID", 0)? }
        } else if let Some(movie) = xml::child(node, "Movie") {
            ActionKind::Movie {
                resource_id: xml::attr_u64(movie, "ResourceID", 0)?,
                operator: xml::attr(movie, "Operator").map(str::to_string),
            }
        } else {
            ActionKind::Unknown
        };
        Ok(Action { event: xml::attr(node, "Event").unwrap_or("").to_string(), kind })
    }
}

impl PageContent {
    pub(crate) fn from_node(node: Node) -> Result<Self> {
        let mut templates = Vec::new();
        for t in xml::children(node, "Template") {
            templates.push(TemplateRef {
                template_id: xml::attr_u64(t, "TemplateID", 0)?,
                z_order: xml::attr(t, "ZOrder").unwrap_or("").to_string(),
            });
        }
        let page_res = xml::children(node, "PageRes")
            .map(|n| Loc::from(xml::text(n)))
            .collect();
        let area = match xml::child(node, "Area") {
            Some(a) => Some(PageArea::from_node(a)?),
            None => None,
        };
        let mut layers = Vec::new();
        if let Some(content) = xml::child(node, "Content") {
            for layer in xml::children(content, "Layer") {
                let draw_param = match xml::attr(layer, "DrawParam") {
                    Some(v) => Some(parse_id(v)?),
                    None => None,
                };
                layers.push(Layer {
                    id: xml::attr_u64(layer, "ID", 0)?,
                    kind: LayerKind::parse(xml::attr(layer, "Type").unwrap_or("")),
                    draw_param,
                    content: PageBlock::from_node(layer)?,
                });
            }
        }
        let mut actions = Vec::new();
        if let Some(actions_node) = xml::child(node, "Actions") {
            for action in xml::children(actions_node, "Action") {
                actions.push(Action::from_node(action)?);
            }
        }
        Ok(PageContent { templates, page_res, area, layers, actions })
    }
}
