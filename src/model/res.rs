//! Resource files: colour spaces, draw parameters, fonts and media

use roxmltree::Node;

use crate::error::Result;
use crate::model::loc::Loc;
use crate::model::page::{CtColor, PageBlock};
use crate::model::scalar::{parse_id, FloatArray, Id, RefId};
use crate::xml;

/// A parsed `PublicRes`/`DocumentRes`/`PageRes` file.
#[derive(Debug, Clone, Default)]
pub struct Res {
    pub base_loc: Loc,
    pub color_spaces: Vec<ColorSpace>,
    pub draw_params: Vec<DrawParam>,
    pub fonts: Vec<FontRes>,
    pub medias: Vec<MultiMedia>,
    pub composites: Vec<CompositeGraphicUnit>,
}

impl Res {
    pub(crate) fn from_node(node: Node) -> Result<Self> {
        let mut res = Res {
            base_loc: Loc::from(xml::attr(node, "BaseLoc").unwrap_or("")),
            ..Res::default()
        };
        if let Some(list) = xml::child(node, "ColorSpaces") {
            for cs in xml::children(list, "ColorSpace") {
                res.color_spaces.push(ColorSpace::from_node(cs)?);
            }
        }
        if let Some(list) = xml::child(node, "DrawParams") {
            for dp in xml::children(list, "DrawParam") {
                res.draw_params.push(DrawParam::from_node(dp)?);
            }
        }
        if let Some(list) = xml::child(node, "Fonts") {
            for f in xml::children(list, "Font") {
                res.fonts.push(FontRes::from_node(f)?);
            }
        }
        if let Some(list) = xml::child(node, "MultiMedias") {
            for m in xml::children(list, "MultiMedia") {
                res.medias.push(MultiMedia::from_node(m)?);
            }
        }
        if let Some(list) = xml::child(node, "CompositeGraphicUnits") {
            for c in xml::children(list, "CompositeGraphicUnit") {
                res.composites.push(CompositeGraphicUnit::from_node(c)?);
            }
        }
        Ok(res)
    }
}

/// A colour space declaration. Only the RGB default is consumed while
/// rendering; the rest is carried for completeness.
#[derive(Debug, Clone)]
pub struct ColorSpace {
    pub id: Id,
    /// `GRAY`, `RGB` or `CMYK`.
    pub kind: String,
    pub bits_per_component: i64,
    pub profile: Option<Loc>,
    pub palette: Vec<FloatArray>,
}

impl ColorSpace {
    fn from_node(node: Node) -> Result<Self> {
        let mut palette = Vec::new();
        if let Some(p) = xml::child(node, "Palette") {
            for cv in xml::children(p, "CV") {
                palette.push(FloatArray::parse(&xml::text(cv)));
            }
        }
        Ok(ColorSpace {
            id: xml::attr_u64(node, "ID", 0)?,
            kind: xml::attr(node, "Type").unwrap_or("RGB").to_string(),
            bits_per_component: xml::attr_i64(node, "BitsPerComponent", 8)?,
            profile: xml::attr(node, "Profile").map(Loc::from),
            palette,
        })
    }
}

/// A reusable bundle of stroke/fill attributes, with optional inheritance
/// through `relative`.
#[derive(Debug, Clone, Default)]
pub struct DrawParam {
    pub id: Id,
    pub relative: Option<RefId>,
    pub line_width: f64,
    pub join: String,
    pub cap: String,
    pub dash_offset: f64,
    pub dash_pattern: Option<FloatArray>,
    pub miter_limit: f64,
    pub fill_color: Option<CtColor>,
    pub stroke_color: Option<CtColor>,
}

impl DrawParam {
    fn from_node(node: Node) -> Result<Self> {
        let relative = match xml::attr(node, "Relative") {
            Some(v) => Some(parse_id(v)?),
            None => None,
        };
        let fill_color = match xml::child(node, "FillColor") {
            Some(c) => Some(CtColor::from_node(c)?),
            None => None,
        };
        let stroke_color = match xml::child(node, "StrokeColor") {
            Some(c) => Some(CtColor::from_node(c)?),
            None => None,
        };
        Ok(DrawParam {
            id: xml::attr_u64(node, "ID", 0)?,
            relative,
            line_width: xml::attr_f64(node, "LineWidth", 0.0)?,
            join: xml::attr(node, "Join").unwrap_or("").to_string(),
            cap: xml::attr(node, "Cap").unwrap_or("").to_string(),
            dash_offset: xml::attr_f64(node, "DashOffset", 0.0)?,
            dash_pattern: xml::attr(node, "DashPattern").map(FloatArray::parse),
            miter_limit: xml::attr_f64(node, "MiterLimit", 0.0)?,
            fill_color,
            stroke_color,
        })
    }
}

/// A font resource.
#[derive(Debug, Clone, Default)]
pub struct FontRes {
    pub id: Id,
    pub font_name: String,
    pub family_name: Option<String>,
    pub charset: Option<String>,
    pub italic: bool,
    pub bold: bool,
    pub serif: bool,
    pub fixed_width: bool,
    /// Embedded font file; relative locations are rebased during parsing.
    pub font_file: Option<Loc>,
}

impl FontRes {
    fn from_node(node: Node) -> Result<Self> {
        Ok(FontRes {
            id: xml::attr_u64(node, "ID", 0)?,
            font_name: xml::attr(node, "FontName").unwrap_or("").to_string(),
            family_name: xml::attr(node, "FamilyName").map(str::to_string),
            charset: xml::attr(node, "Charset").map(str::to_string),
            italic: xml::attr_bool(node, "Italic", false),
            bold: xml::attr_bool(node, "Bold", false),
            serif: xml::attr_bool(node, "Serif", false),
            fixed_width: xml::attr_bool(node, "FixedWidth", false),
            font_file: xml::child_text(node, "FontFile")
                .filter(|t| !t.is_empty())
                .map(Loc::from),
        })
    }
}

/// An embedded media resource.
#[derive(Debug, Clone)]
pub struct MultiMedia {
    pub id: Id,
    /// `Image`, `Audio` or `Video`.
    pub kind: String,
    pub format: Option<String>,
    /// Relative locations are rebased during parsing.
    pub media_file: Loc,
}

impl MultiMedia {
    fn from_node(node: Node) -> Result<Self> {
        Ok(MultiMedia {
            id: xml::attr_u64(node, "ID", 0)?,
            kind: xml::attr(node, "Type").unwrap_or("Image").to_string(),
            format: xml::attr(node, "Format").map(str::to_string),
            media_file: Loc::from(xml::child_text(node, "MediaFile").unwrap_or_default()),
        })
    }
}

/// A reusable composite drawing; referenced by `CompositeObject`.
#[derive(Debug, Clone)]
pub struct CompositeGraphicUnit {
    pub id: Id,
    pub width: f64,
    pub height: f64,
    pub content: PageBlock,
}

impl CompositeGraphicUnit {
    fn from_node(node: Node) -> Result<Self> {
        let content = match xml::child(node, "Content") {
            Some(c) => PageBlock::from_node(c)?,
            None => PageBlock::default(),
        };
        Ok(CompositeGraphicUnit {
            id: xml::attr_u64(node, "ID", 0)?,
            width: xml::attr_f64(node, "Width", 0.0)?,
            height: xml::attr_f64(node, "Height", 0.0)?,
            content,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_res() {
        let doc = roxmltree::Document::parse(
            r#"<ofd:Res xmlns:ofd="http://www.ofdspec.org/2016" BaseLoc="Res">
                 <ofd:ColorSpaces>
                   <ofd:ColorSpace ID="4" Type="RGB" BitsPerComponent="8"/>
                 </ofd:ColorSpaces>
                 <ofd:DrawParams>
                   <ofd:DrawParam ID="7" Relative="8" LineWidth="0.5" Cap="Round" DashPattern="1 2">
                     <ofd:StrokeColor Value="10 20 30"/>
                   </ofd:DrawParam>
                 </ofd:DrawParams>
                 <ofd:Fonts>
                   <ofd:Font ID="30" FontName="宋体" Bold="true">
                     <ofd:FontFile>font_0.ttf</ofd:FontFile>
                   </ofd:Font>
                 </ofd:Fonts>
                 <ofd:MultiMedias>
                   <ofd:MultiMedia ID="40" Type="Image" Format="PNG">
                     <ofd:MediaFile>image_0.png</ofd:MediaFile>
                   </ofd:MultiMedia>
                 </ofd:MultiMedias>
               </ofd:Res>"#,
        )
        .unwrap();
        let res = Res::from_node(doc.root_element()).unwrap();
        assert_eq!(res.base_loc.as_str(), "Res");
        assert_eq!(res.color_spaces.len(), 1);

        let dp = &res.draw_params[0];
        assert_eq!(dp.id, 7);
        assert_eq!(dp.relative, Some(8));
        assert_eq!(dp.line_width, 0.5);
        assert_eq!(dp.cap, "Round");
        assert_eq!(dp.dash_pattern.as_ref().unwrap().0, vec![1.0, 2.0]);
        assert!(dp.stroke_color.is_some());

        let font = &res.fonts[0];
        assert_eq!(font.font_name, "宋体");
        assert!(font.bold);
        assert_eq!(font.font_file.as_ref().unwrap().as_str(), "font_0.ttf");

        let media = &res.medias[0];
        assert_eq!(media.id, 40);
        assert_eq!(media.media_file.as_str(), "image_0.png");
    }
}
