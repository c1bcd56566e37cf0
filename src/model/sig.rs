//! Signature index and signature descriptors
//!
//! Only the visual part of a signature is consumed: the stamp annotations
//! and the seal payload location. Check values are carried but never
//! verified.

use roxmltree::Node;

use crate::error::Result;
use crate::model::loc::Loc;
use crate::model::scalar::{Id, RefId, StBox};
use crate::xml;

/// The per-document signatures index file.
#[derive(Debug, Clone, Default)]
pub struct SignaturesIndex {
    pub max_sign_id: Option<String>,
    pub entries: Vec<SignatureRef>,
}

impl SignaturesIndex {
    pub(crate) fn from_node(node: Node) -> Result<Self> {
        let mut entries = Vec::new();
        for s in xml::children(node, "Signature") {
            entries.push(SignatureRef {
                id: xml::attr_u64(s, "ID", 0)?,
                base_loc: Loc::from(xml::attr(s, "BaseLoc").unwrap_or("")),
            });
        }
        Ok(SignaturesIndex {
            max_sign_id: xml::child_text(node, "MaxSignId"),
            entries,
        })
    }
}

/// One entry in the signatures index.
#[derive(Debug, Clone)]
pub struct SignatureRef {
    pub id: Id,
    pub base_loc: Loc,
}

/// A parsed `Signature.xml`.
#[derive(Debug, Clone)]
pub struct Signature {
    pub signed_info: SignedInfo,
    pub signed_value: Loc,
}

impl Signature {
    pub(crate) fn from_node(node: Node) -> Result<Self> {
        let signed_info = match xml::child(node, "SignedInfo") {
            Some(info) => SignedInfo::from_node(info)?,
            None => SignedInfo::default(),
        };
        Ok(Signature {
            signed_info,
            signed_value: Loc::from(xml::child_text(node, "SignedValue").unwrap_or_default()),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct SignedInfo {
    pub provider: Option<Provider>,
    pub signature_method: Option<String>,
    pub signature_date_time: Option<String>,
    pub references_check_method: Option<String>,
    pub references: Vec<Reference>,
    pub stamp_annots: Vec<StampAnnot>,
    /// Location of a separate seal file, relative to the signature file.
    pub seal: Option<Loc>,
}

impl SignedInfo {
    fn from_node(node: Node) -> Result<Self> {
        let provider = xml::child(node, "Provider").map(|p| Provider {
            name: xml::attr(p, "ProviderName").unwrap_or("").to_string(),
            version: xml::attr(p, "Version").map(str::to_string),
            company: xml::attr(p, "Company").map(str::to_string),
        });
        let mut references_check_method = None;
        let mut references = Vec::new();
        if let Some(refs) = xml::child(node, "References") {
            references_check_method = xml::attr(refs, "CheckMethod").map(str::to_string);
            for r in xml::children(refs, "Reference") {
                references.push(Reference {
                    file_ref: Loc::from(xml::attr(r, "FileRef").unwrap_or("")),
                    check_value: xml::child_text(r, "CheckValue").unwrap_or_default(),
                });
            }
        }
        let mut stamp_annots = Vec::new();
        for s in xml::children(node, "StampAnnot") {
            stamp_annots.push(StampAnnot::from_node(s)?);
        }
        let seal = xml::child(node, "Seal")
            .and_then(|s| xml::child_text(s, "BaseLoc"))
            .map(Loc::from);
        Ok(SignedInfo {
            provider,
            signature_method: xml::child_text(node, "SignatureMethod"),
            signature_date_time: xml::child_text(node, "SignatureDateTime"),
            references_check_method,
            references,
            stamp_annots,
            seal,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Provider {
    pub name: String,
    pub version: Option<String>,
    pub company: Option<String>,
}

/// A signed file with its (unverified) digest.
#[derive(Debug, Clone)]
pub struct Reference {
    pub file_ref: Loc,
    pub check_value: String,
}

/// Placement of a visual seal on a page.
#[derive(Debug, Clone)]
pub struct StampAnnot {
    pub id: String,
    pub page_ref: RefId,
    pub boundary: StBox,
    pub clip: Option<StBox>,
}

impl StampAnnot {
    fn from_node(node: Node) -> Result<Self> {
        let clip = match xml::attr(node, "Clip") {
            Some(v) => Some(StBox::parse(v)?),
            None => None,
        };
        Ok(StampAnnot {
            id: xml::attr(node, "ID").unwrap_or("").to_string(),
            page_ref: xml::attr_u64(node, "PageRef", 0)?,
            boundary: StBox::parse(xml::req_attr(node, "Boundary")?)?,
            clip,
        })
    }
}
