//! Root descriptor and per-document metadata

use roxmltree::Node;

use crate::error::{Error, Result};
use crate::model::loc::Loc;
use crate::model::page::{Action, PageArea};
use crate::model::scalar::{DateTime, Id, RefId};
use crate::xml;

/// The parsed `OFD.xml` at the archive root.
#[derive(Debug, Clone)]
pub struct OfdRoot {
    pub version: String,
    pub doc_type: String,
    pub bodies: Vec<DocBody>,
}

impl OfdRoot {
    pub(crate) fn from_node(node: Node) -> Result<Self> {
        let mut bodies = Vec::new();
        for body in xml::children(node, "DocBody") {
            bodies.push(DocBody::from_node(body)?);
        }
        if bodies.is_empty() {
            return Err(Error::Parse("OFD.xml contains no DocBody".to_string()));
        }
        Ok(OfdRoot {
            version: xml::attr(node, "Version").unwrap_or("").to_string(),
            doc_type: xml::attr(node, "DocType").unwrap_or("").to_string(),
            bodies,
        })
    }
}

/// One logical document within the archive.
#[derive(Debug, Clone)]
pub struct DocBody {
    pub doc_info: DocInfo,
    pub doc_root: Loc,
    pub versions: Vec<DocVersion>,
    pub signatures: Option<Loc>,
}

impl DocBody {
    fn from_node(node: Node) -> Result<Self> {
        let doc_info = match xml::child(node, "DocInfo") {
            Some(info) => DocInfo::from_node(info)?,
            None => DocInfo::default(),
        };
        let doc_root = Loc::from(
            xml::child_text(node, "DocRoot")
                .ok_or_else(|| Error::Parse("DocBody missing DocRoot".to_string()))?,
        );
        let mut versions = Vec::new();
        if let Some(list) = xml::child(node, "Versions") {
            for v in xml::children(list, "Version") {
                versions.push(DocVersion {
                    id: xml::attr(v, "ID").unwrap_or("").to_string(),
                    index: xml::attr_i64(v, "Index", 0)?,
                    current: xml::attr_bool(v, "Current", false),
                    base_loc: Loc::from(xml::attr(v, "BaseLoc").unwrap_or("")),
                });
            }
        }
        Ok(DocBody {
            doc_info,
            doc_root,
            versions,
            signatures: xml::child_text(node, "Signatures").map(Loc::from),
        })
    }
}

/// A document version entry.
#[derive(Debug, Clone)]
pub struct DocVersion {
    pub id: String,
    pub index: i64,
    pub current: bool,
    pub base_loc: Loc,
}

/// Document metadata.
#[derive(Debug, Clone, Default)]
pub struct DocInfo {
    pub doc_id: String,
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub abstract_text: Option<String>,
    pub creation_date: Option<DateTime>,
    pub mod_date: Option<DateTime>,
    pub doc_usage: Option<String>,
    pub cover: Option<Loc>,
    pub keywords: Vec<String>,
    pub creator: Option<String>,
    pub creator_version: Option<String>,
    pub custom_data: Vec<(String, String)>,
}

impl DocInfo {
    fn from_node(node: Node) -> Result<Self> {
        let parse_date = |name: &str| -> Option<DateTime> {
            // Malformed metadata dates are not worth failing the open over.
            xml::child_text(node, name).and_then(|t| DateTime::parse(&t).ok())
        };
        let mut keywords = Vec::new();
        if let Some(list) = xml::child(node, "Keywords") {
            for k in xml::children(list, "Keyword") {
                keywords.push(xml::text(k));
            }
        }
        let mut custom_data = Vec::new();
        if let Some(list) = xml::child(node, "CustomDatas") {
            for d in xml::children(list, "CustomData") {
                custom_data.push((xml::attr(d, "Name").unwrap_or("").to_string(), xml::text(d)));
            }
        }
        Ok(DocInfo {
            doc_id: xml::child_text(node, "DocID").unwrap_or_default(),
            title: xml::child_text(node, "Title"),
            author: xml::child_text(node, "Author"),
            subject: xml::child_text(node, "Subject"),
            abstract_text: xml::child_text(node, "Abstract"),
            creation_date: parse_date("CreationDate"),
            mod_date: parse_date("ModDate"),
            doc_usage: xml::child_text(node, "DocUsage"),
            cover: xml::child_text(node, "Cover").map(Loc::from),
            keywords,
            creator: xml::child_text(node, "Creator"),
            creator_version: xml::child_text(node, "CreatorVersion"),
            custom_data,
        })
    }
}

/// The parsed `Document.xml`.
#[derive(Debug, Clone)]
pub struct DocumentDesc {
    pub common_data: CommonData,
    pub pages: Vec<PageRef>,
    pub outlines: Vec<OutlineElem>,
    pub bookmarks: Vec<Bookmark>,
    pub permissions: Option<Permission>,
    pub actions: Vec<Action>,
    pub annotations: Option<Loc>,
    pub custom_tags: Option<Loc>,
    pub attachments: Option<Loc>,
    pub extensions: Option<Loc>,
}

impl DocumentDesc {
    pub(crate) fn from_node(node: Node) -> Result<Self> {
        let common_data = match xml::child(node, "CommonData") {
            Some(cd) => CommonData::from_node(cd)?,
            None => return Err(Error::Parse("Document missing CommonData".to_string())),
        };
        let mut pages = Vec::new();
        if let Some(list) = xml::child(node, "Pages") {
            for p in xml::children(list, "Page") {
                pages.push(PageRef {
                    id: xml::attr_u64(p, "ID", 0)?,
                    base_loc: Loc::from(xml::req_attr(p, "BaseLoc")?),
                });
            }
        }
        let mut outlines = Vec::new();
        if let Some(list) = xml::child(node, "Outlines") {
            for o in xml::children(list, "OutlineElem") {
                outlines.push(OutlineElem::from_node(o)?);
            }
        }
        let mut bookmarks = Vec::new();
        if let Some(list) = xml::child(node, "Bookmarks") {
            for b in xml::children(list, "Bookmark") {
                bookmarks.push(Bookmark {
                    name: xml::attr(b, "Name").unwrap_or("").to_string(),
                });
            }
        }
        let permissions = match xml::child(node, "Permissions") {
            Some(p) => Some(Permission::from_node(p)?),
            None => None,
        };
        let mut actions = Vec::new();
        if let Some(list) = xml::child(node, "Actions") {
            for a in xml::children(list, "Action") {
                actions.push(Action::from_node(a)?);
            }
        }
        Ok(DocumentDesc {
            common_data,
            pages,
            outlines,
            bookmarks,
            permissions,
            actions,
            annotations: xml::child_text(node, "Annotations").map(Loc::from),
            custom_tags: xml::child_text(node, "CustomTags").map(Loc::from),
            attachments: xml::child_text(node, "Attachments").map(Loc::from),
            extensions: xml::child_text(node, "Extensions").map(Loc::from),
        })
    }
}

/// Shared document data: default page area, resources, templates.
#[derive(Debug, Clone)]
pub struct CommonData {
    pub max_unit_id: Id,
    pub page_area: Option<PageArea>,
    pub public_res: Vec<Loc>,
    pub document_res: Vec<Loc>,
    pub template_pages: Vec<TemplatePage>,
    pub default_cs: Option<RefId>,
}

impl CommonData {
    fn from_node(node: Node) -> Result<Self> {
        let page_area = match xml::child(node, "PageArea") {
            Some(a) => Some(PageArea::from_node(a)?),
            None => None,
        };
        let mut template_pages = Vec::new();
        for t in xml::children(node, "TemplatePage") {
            template_pages.push(TemplatePage {
                id: xml::attr_u64(t, "ID", 0)?,
                name: xml::attr(t, "Name").map(str::to_string),
                z_order: xml::attr(t, "ZOrder").map(str::to_string),
                base_loc: Loc::from(xml::req_attr(t, "BaseLoc")?),
            });
        }
        let default_cs = match xml::attr(node, "DefaultCS") {
            Some(_) => Some(xml::attr_u64(node, "DefaultCS", 0)?),
            None => xml::child_text(node, "DefaultCS")
                .map(|t| t.parse::<u64>().map_err(|e| Error::Parse(format!("DefaultCS: {e}"))))
                .transpose()?,
        };
        Ok(CommonData {
            max_unit_id: xml::child_text(node, "MaxUnitID")
                .map(|t| t.parse::<u64>().unwrap_or(0))
                .unwrap_or(0),
            page_area,
            public_res: xml::children(node, "PublicRes").map(|n| Loc::from(xml::text(n))).collect(),
            document_res: xml::children(node, "DocumentRes")
                .map(|n| Loc::from(xml::text(n)))
                .collect(),
            template_pages,
            default_cs,
        })
    }
}

/// A shared template page declaration.
#[derive(Debug, Clone)]
pub struct TemplatePage {
    pub id: Id,
    pub name: Option<String>,
    pub z_order: Option<String>,
    pub base_loc: Loc,
}

/// Reference from the document to a page-content file.
#[derive(Debug, Clone)]
pub struct PageRef {
    pub id: Id,
    pub base_loc: Loc,
}

/// A document outline entry.
#[derive(Debug, Clone)]
pub struct OutlineElem {
    pub title: String,
    pub count: Option<i64>,
    pub expanded: bool,
    pub actions: Vec<Action>,
    pub children: Vec<OutlineElem>,
}

impl OutlineElem {
    fn from_node(node: Node) -> Result<Self> {
        let mut actions = Vec::new();
        if let Some(list) = xml::child(node, "Actions") {
            for a in xml::children(list, "Action") {
                actions.push(Action::from_node(a)?);
            }
        }
        let mut children = Vec::new();
        for c in xml::children(node, "OutlineElem") {
            children.push(OutlineElem::from_node(c)?);
        }
        let count = match xml::attr(node, "Count") {
            Some(_) => Some(xml::attr_i64(node, "Count", 0)?),
            None => None,
        };
        Ok(OutlineElem {
            title: xml::attr(node, "Title").unwrap_or("").to_string(),
            count,
            expanded: xml::attr_bool(node, "Expanded", true),
            actions,
            children,
        })
    }
}

/// A named bookmark.
#[derive(Debug, Clone)]
pub struct Bookmark {
    pub name: String,
}

/// Document permission flags. Parsed and carried; the renderer does not
/// enforce them.
#[derive(Debug, Clone, Default)]
pub struct Permission {
    pub edit: Option<bool>,
    pub annot: Option<bool>,
    pub export: Option<bool>,
    pub signature: Option<bool>,
    pub watermark: Option<bool>,
    pub print_screen: Option<bool>,
    pub printable: Option<bool>,
    pub print_copies: Option<i64>,
    pub valid_start: Option<DateTime>,
    pub valid_end: Option<DateTime>,
}

impl Permission {
    fn from_node(node: Node) -> Result<Self> {
        let flag = |name: &str| -> Option<bool> {
            xml::child_text(node, name).map(|t| t == "true" || t == "1")
        };
        let mut printable = None;
        let mut print_copies = None;
        if let Some(print) = xml::child(node, "Print") {
            printable = Some(xml::attr_bool(print, "Printable", true));
            print_copies = Some(xml::attr_i64(print, "Copies", 0)?);
        }
        let mut valid_start = None;
        let mut valid_end = None;
        if let Some(period) = xml::child(node, "ValidPeriod") {
            valid_start = xml::attr(period, "StartDate").and_then(|t| DateTime::parse(t).ok());
            valid_end = xml::attr(period, "EndDate").and_then(|t| DateTime::parse(t).ok());
        }
        Ok(Permission {
            edit: flag("Edit"),
            annot: flag("Annot"),
            export: flag("Export"),
            signature: flag("Signature"),
            watermark: flag("Watermark"),
            print_screen: flag("PrintScreen"),
            printable,
            print_copies,
            valid_start,
            valid_end,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_root() {
        let doc = roxmltree::Document::parse(
            r#"<ofd:OFD xmlns:ofd="http://www.ofdspec.org/2016" Version="1.1" DocType="OFD">
                 <ofd:DocBody>
                   <ofd:DocInfo>
                     <ofd:DocID>abc</ofd:DocID>
                     <ofd:Title>Hello</ofd:Title>
                     <ofd:CreationDate>2024-02-01</ofd:CreationDate>
                   </ofd:DocInfo>
                   <ofd:DocRoot>Doc_0/Document.xml</ofd:DocRoot>
                   <ofd:Signatures>Doc_0/Signs/Signatures.xml</ofd:Signatures>
                 </ofd:DocBody>
               </ofd:OFD>"#,
        )
        .unwrap();
        let root = OfdRoot::from_node(doc.root_element()).unwrap();
        assert_eq!(root.version, "1.1");
        assert_eq!(root.bodies.len(), 1);
        let body = &root.bodies[0];
        assert_eq!(body.doc_root.as_str(), "Doc_0/Document.xml");
        assert_eq!(body.doc_info.title.as_deref(), Some("Hello"));
        assert!(body.doc_info.creation_date.is_some());
        assert_eq!(body.signatures.as_ref().unwrap().as_str(), "Doc_0/Signs/Signatures.xml");
    }

    #[test]
    fn test_root_without_bodies_is_error() {
        let doc = roxmltree::Document::parse(r#"<OFD Version="1.0"/>"#).unwrap();
        assert!(OfdRoot::from_node(doc.root_element()).is_err());
    }

    #[test]
    fn test_parse_document_desc() {
        let doc = roxmltree::Document::parse(
            r#"<ofd:Document xmlns:ofd="http://www.ofdspec.org/2016">
                 <ofd:CommonData>
                   <ofd:MaxUnitID>99</ofd:MaxUnitID>
                   <ofd:PageArea><ofd:PhysicalBox>0 0 210 297</ofd:PhysicalBox></ofd:PageArea>
                   <ofd:PublicRes>PublicRes.xml</ofd:PublicRes>
                   <ofd:DocumentRes>DocumentRes.xml</ofd:DocumentRes>
                   <ofd:TemplatePage ID="2" ZOrder="Background" BaseLoc="Tpls/Tpl_0/Content.xml"/>
                 </ofd:CommonData>
                 <ofd:Pages>
                   <ofd:Page ID="1" BaseLoc="Pages/Page_0/Content.xml"/>
                 </ofd:Pages>
                 <ofd:Annotations>Annots/Annotations.xml</ofd:Annotations>
               </ofd:Document>"#,
        )
        .unwrap();
        let desc = DocumentDesc::from_node(doc.root_element()).unwrap();
        assert_eq!(desc.common_data.max_unit_id, 99);
        assert_eq!(desc.common_data.template_pages.len(), 1);
        assert_eq!(desc.common_data.public_res.len(), 1);
        assert_eq!(desc.pages.len(), 1);
        assert_eq!(desc.pages[0].base_loc.as_str(), "Pages/Page_0/Content.xml");
        assert_eq!(desc.annotations.as_ref().unwrap().as_str(), "Annots/Annotations.xml");
    }

    #[test]
    fn test_document_requires_common_data() {
        let doc = roxmltree::Document::parse("<Document/>").unwrap();
        assert!(DocumentDesc::from_node(doc.root_element()).is_err());
    }
}
