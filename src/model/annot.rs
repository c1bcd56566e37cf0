//! Annotation index and per-page annotation files

use roxmltree::Node;

use crate::error::{Error, Result};
use crate::model::loc::Loc;
use crate::model::page::PageBlock;
use crate::model::scalar::{DateTime, RefId, StBox};
use crate::xml;

/// The top-level annotations index: one file location per page.
#[derive(Debug, Clone, Default)]
pub struct Annotations {
    pub pages: Vec<AnnotPageRef>,
}

impl Annotations {
    pub(crate) fn from_node(node: Node) -> Result<Self> {
        let mut pages = Vec::new();
        for p in xml::children(node, "Page") {
            pages.push(AnnotPageRef {
                page_id: xml::attr_u64(p, "PageID", 0)?,
                file_loc: Loc::from(xml::child_text(p, "FileLoc").unwrap_or_default()),
            });
        }
        Ok(Annotations { pages })
    }
}

#[derive(Debug, Clone)]
pub struct AnnotPageRef {
    pub page_id: RefId,
    pub file_loc: Loc,
}

/// A per-page annotation file.
#[derive(Debug, Clone, Default)]
pub struct PageAnnot {
    pub annots: Vec<Annot>,
}

impl PageAnnot {
    pub(crate) fn from_node(node: Node) -> Result<Self> {
        let mut annots = Vec::new();
        for a in xml::children(node, "Annot") {
            annots.push(Annot::from_node(a)?);
        }
        Ok(PageAnnot { annots })
    }
}

/// Annotation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotType {
    Link,
    Path,
    Highlight,
    Stamp,
    Watermark,
}

impl AnnotType {
    fn parse(s: &str) -> Result<Self> {
        match s {
            "Link" => Ok(AnnotType::Link),
            "Path" => Ok(AnnotType::Path),
            "Highlight" => Ok(AnnotType::Highlight),
            "Stamp" => Ok(AnnotType::Stamp),
            "Watermark" => Ok(AnnotType::Watermark),
            other => Err(Error::Parse(format!("invalid annotation type '{other}'"))),
        }
    }
}

/// A single annotation record.
#[derive(Debug, Clone)]
pub struct Annot {
    pub id: String,
    pub kind: AnnotType,
    pub creator: String,
    pub last_mod_date: Option<DateTime>,
    pub visible: bool,
    pub subtype: Option<String>,
    pub print: bool,
    pub no_zoom: bool,
    pub no_rotate: bool,
    pub read_only: bool,
    pub remark: Option<String>,
    pub parameters: Vec<(String, String)>,
    pub appearance: Option<Appearance>,
}

impl Annot {
    fn from_node(node: Node) -> Result<Self> {
        let appearance = match xml::child(node, "Appearance") {
            Some(a) => {
                let boundary = match xml::attr(a, "Boundary") {
                    Some(v) => Some(StBox::parse(v)?),
                    None => None,
                };
                Some(Appearance { boundary, block: PageBlock::from_node(a)? })
            }
            None => None,
        };
        let mut parameters = Vec::new();
        if let Some(params) = xml::child(node, "Parameters") {
            for p in xml::children(params, "Parameter") {
                parameters.push((xml::attr(p, "Name").unwrap_or("").to_string(), xml::text(p)));
            }
        }
        Ok(Annot {
            id: xml::attr(node, "ID").unwrap_or("").to_string(),
            kind: AnnotType::parse(xml::req_attr(node, "Type")?)?,
            creator: xml::attr(node, "Creator").unwrap_or("").to_string(),
            last_mod_date: xml::attr(node, "LastModDate").and_then(|t| DateTime::parse(t).ok()),
            visible: xml::attr_bool(node, "Visible", true),
            subtype: xml::attr(node, "Subtype").map(str::to_string),
            print: xml::attr_bool(node, "Print", true),
            no_zoom: xml::attr_bool(node, "NoZoom", false),
            no_rotate: xml::attr_bool(node, "NoRotate", false),
            read_only: xml::attr_bool(node, "ReadOnly", false),
            remark: xml::child_text(node, "Remark"),
            parameters,
            appearance,
        })
    }
}

/// The drawable appearance of an annotation: a page block with its own
/// boundary, composed shifted into the page.
#[derive(Debug, Clone)]
pub struct Appearance {
    pub boundary: Option<StBox>,
    pub block: PageBlock,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_annotations_index() {
        let doc = roxmltree::Document::parse(
            r#"<ofd:Annotations xmlns:ofd="http://www.ofdspec.org/2016">
                 <ofd:Page PageID="1"><ofd:FileLoc>Page_0/Annotation.xml</ofd:FileLoc></ofd:Page>
                 <ofd:Page PageID="2"><ofd:FileLoc>Page_1/Annotation.xml</ofd:FileLoc></ofd:Page>
               </ofd:Annotations>"#,
        )
        .unwrap();
        let index = Annotations::from_node(doc.root_element()).unwrap();
        assert_eq!(index.pages.len(), 2);
        assert_eq!(index.pages[1].page_id, 2);
        assert_eq!(index.pages[1].file_loc.as_str(), "Page_1/Annotation.xml");
    }

    #[test]
    fn test_parse_page_annot() {
        let doc = roxmltree::Document::parse(
            r#"<ofd:PageAnnot xmlns:ofd="http://www.ofdspec.org/2016">
                 <ofd:Annot ID="80" Type="Stamp" Creator="tester" LastModDate="2024-01-05">
                   <ofd:Appearance Boundary="5 6 30 20">
                     <ofd:PathObject ID="81" Boundary="0 0 30 20" Fill="true">
                       <ofd:AbbreviatedData>M 0 0 L 30 0 L 30 20 C</ofd:AbbreviatedData>
                     </ofd:PathObject>
                   </ofd:Appearance>
                 </ofd:Annot>
               </ofd:PageAnnot>"#,
        )
        .unwrap();
        let page = PageAnnot::from_node(doc.root_element()).unwrap();
        assert_eq!(page.annots.len(), 1);
        let annot = &page.annots[0];
        assert_eq!(annot.kind, AnnotType::Stamp);
        assert!(annot.last_mod_date.is_some());
        let appearance = annot.appearance.as_ref().unwrap();
        assert_eq!(appearance.boundary.unwrap(), StBox::new(5.0, 6.0, 30.0, 20.0));
        assert_eq!(appearance.block.paths.len(), 1);
    }

    #[test]
    fn test_unknown_annot_type_is_error() {
        let doc =
            roxmltree::Document::parse(r#"<PageAnnot><Annot ID="1" Type="Bogus"/></PageAnnot>"#)
                .unwrap();
        assert!(PageAnnot::from_node(doc.root_element()).is_err());
    }
}
