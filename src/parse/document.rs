//! Per-document parsing: pages, templates, resources, annotations, seals

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use log::{debug, error};

use crate::archive::ArchiveCache;
use crate::error::Result;
use crate::model::annot::{Annotations, PageAnnot};
use crate::model::doc::{DocBody, DocumentDesc};
use crate::model::loc::Loc;
use crate::model::page::{PageArea, PageContent};
use crate::model::res::{ColorSpace, DrawParam, FontRes, MultiMedia, Res};
use crate::model::scalar::{Id, StBox};
use crate::model::sig::{Signature, SignaturesIndex};
use crate::parse::seal::{self, SealData};

/// A page with its inherited area resolved.
#[derive(Debug, Clone)]
pub struct Page {
    pub id: Id,
    pub area: PageArea,
    pub content: PageContent,
}

/// A seal payload positioned on a page.
#[derive(Debug, Clone)]
pub struct SealInfo {
    pub stamp: crate::model::sig::StampAnnot,
    pub data: Arc<SealData>,
}

/// A fully parsed document: the descriptor plus flattened, id-indexed
/// resource maps and the per-page annotation and seal indices.
pub struct Document {
    /// Directory of `DocRoot`; the base for page and resource locations.
    pub base_loc: Loc,
    pub desc: DocumentDesc,
    pub pages: Vec<Page>,
    pub templates: HashMap<Id, PageContent>,
    pub draw_params: HashMap<Id, DrawParam>,
    pub media: HashMap<Id, MultiMedia>,
    pub fonts: HashMap<Id, FontRes>,
    pub color_spaces: HashMap<Id, ColorSpace>,
    pub signatures: HashMap<Id, Signature>,
    /// Page id → seals stamped onto it.
    pub seals: HashMap<Id, Vec<SealInfo>>,
    /// Page id → annotations drawn over it.
    pub annotations: HashMap<Id, PageAnnot>,
}

impl Document {
    pub(crate) fn parse(archive: &ArchiveCache, body: &DocBody) -> Result<Document> {
        let doc_root = body.doc_root.resolve(&Loc::from("/"));
        let base_loc = doc_root.dir();
        let desc = archive.read_xml(doc_root.as_str(), DocumentDesc::from_node)?;

        let mut doc = Document {
            base_loc,
            pages: Vec::new(),
            templates: HashMap::new(),
            draw_params: HashMap::new(),
            media: HashMap::new(),
            fonts: HashMap::new(),
            color_spaces: HashMap::new(),
            signatures: HashMap::new(),
            seals: HashMap::new(),
            annotations: HashMap::new(),
            desc,
        };

        doc.parse_pages(archive)?;
        doc.parse_templates(archive)?;
        // PublicRes failures are logged and skipped; DocumentRes is strict.
        let public_res = doc.desc.common_data.public_res.clone();
        if let Err(e) = doc.parse_res_list(archive, &public_res) {
            error!("public resource parse failed: {e}");
        }
        let document_res = doc.desc.common_data.document_res.clone();
        doc.parse_res_list(archive, &document_res)?;
        doc.parse_annotations(archive)?;
        doc.parse_signatures(archive, body.signatures.as_ref())?;
        Ok(doc)
    }

    fn parse_pages(&mut self, archive: &ArchiveCache) -> Result<()> {
        let default_area = self.desc.common_data.page_area;
        for page_ref in &self.desc.pages {
            let loc = page_ref.base_loc.resolve(&self.base_loc);
            let content = archive.read_xml(loc.as_str(), PageContent::from_node)?;
            let area = content
                .area
                .or(default_area)
                .unwrap_or(PageArea {
                    physical_box: StBox::default(),
                    application_box: None,
                    content_box: None,
                    bleed_box: None,
                });
            self.pages.push(Page { id: page_ref.id, area, content });
        }
        Ok(())
    }

    fn parse_templates(&mut self, archive: &ArchiveCache) -> Result<()> {
        for tpl in &self.desc.common_data.template_pages {
            let loc = tpl.base_loc.resolve(&self.base_loc);
            let content = archive.read_xml(loc.as_str(), PageContent::from_node)?;
            self.templates.insert(tpl.id, content);
        }
        Ok(())
    }

    /// Parse resource files in order and flatten their contents into the
    /// id-indexed maps; a later parse wins on id collisions.
    fn parse_res_list(&mut self, archive: &ArchiveCache, locations: &[Loc]) -> Result<()> {
        for res_loc in locations {
            let loc = res_loc.resolve(&self.base_loc);
            let res = archive.read_xml(loc.as_str(), Res::from_node)?;
            self.absorb_res(res);
        }
        Ok(())
    }

    fn absorb_res(&mut self, res: Res) {
        for cs in res.color_spaces {
            self.color_spaces.insert(cs.id, cs);
        }
        for dp in res.draw_params {
            self.draw_params.insert(dp.id, dp);
        }
        for mut font in res.fonts {
            if let Some(file) = font.font_file.take() {
                font.font_file = Some(self.rebase(&res.base_loc, file));
            }
            self.fonts.insert(font.id, font);
        }
        for mut media in res.medias {
            media.media_file = self.rebase(&res.base_loc, media.media_file);
            self.media.insert(media.id, media);
        }
    }

    /// Relative resource files live under `<docBase>/<resBase>/`.
    fn rebase(&self, res_base: &Loc, file: Loc) -> Loc {
        if file.is_absolute() {
            return file.clean();
        }
        file.resolve(&self.base_loc.join(res_base.as_str()))
    }

    fn parse_annotations(&mut self, archive: &ArchiveCache) -> Result<()> {
        let Some(index_loc) = self.desc.annotations.clone() else {
            return Ok(());
        };
        let index_loc = index_loc.resolve(&self.base_loc);
        let index = archive.read_xml(index_loc.as_str(), Annotations::from_node)?;
        let dir = index_loc.dir();
        for page in index.pages {
            let file = page.file_loc.resolve(&dir);
            match archive.read_xml(file.as_str(), PageAnnot::from_node) {
                Ok(annot) => {
                    self.annotations.insert(page.page_id, annot);
                }
                Err(e) => error!("annotation file {file} skipped: {e}"),
            }
        }
        Ok(())
    }

    fn parse_signatures(&mut self, archive: &ArchiveCache, index: Option<&Loc>) -> Result<()> {
        let Some(index_loc) = index else {
            return Ok(());
        };
        let index_loc = index_loc.resolve(&Loc::from("/"));
        let index = archive.read_xml(index_loc.as_str(), SignaturesIndex::from_node)?;
        let dir = index_loc.dir();

        for entry in index.entries {
            let sig_loc = entry.base_loc.resolve(&dir);
            let sig = archive.read_xml(sig_loc.as_str(), Signature::from_node)?;
            let sig_dir = sig_loc.dir();

            let seal_data = if let Some(seal_loc) = &sig.signed_info.seal {
                let seal_file = seal_loc.resolve(&sig_dir);
                let bytes = archive.read_bytes(seal_file.as_str())?;
                match seal::extract_seal(&bytes) {
                    Ok(data) => Some(Arc::new(data)),
                    Err(e) => {
                        error!("seal extraction failed ({seal_file}): {e}");
                        None
                    }
                }
            } else if !sig.signed_info.stamp_annots.is_empty() {
                let value_file = sig.signed_value.resolve(&sig_dir);
                let bytes = archive.read_bytes(value_file.as_str())?;
                Some(Arc::new(seal::extract_seal(&bytes)?))
            } else {
                None
            };

            if let Some(data) = seal_data {
                for stamp in &sig.signed_info.stamp_annots {
                    self.seals.entry(stamp.page_ref).or_default().push(SealInfo {
                        stamp: stamp.clone(),
                        data: Arc::clone(&data),
                    });
                }
            }
            self.signatures.insert(entry.id, sig);
        }
        Ok(())
    }

    /// The effective draw parameter for `id`: the inheritance chain merged
    /// into a fresh record, child fields winning where they are non-default.
    pub fn draw_param(&self, id: Id) -> Option<DrawParam> {
        self.draw_param_merged(id, &mut HashSet::new())
    }

    fn draw_param_merged(&self, id: Id, visited: &mut HashSet<Id>) -> Option<DrawParam> {
        let dp = self.draw_params.get(&id)?;
        let Some(parent_id) = dp.relative else {
            return Some(dp.clone());
        };
        // A cycle falls back to the child's direct values.
        if !visited.insert(id) {
            debug!("draw param {id} is part of an inheritance cycle");
            return Some(dp.clone());
        }
        let Some(parent) = self.draw_param_merged(parent_id, visited) else {
            return Some(dp.clone());
        };

        let mut merged = parent;
        merged.id = dp.id;
        merged.relative = dp.relative;
        if dp.line_width > 0.0 {
            merged.line_width = dp.line_width;
        }
        if !dp.join.is_empty() {
            merged.join = dp.join.clone();
        }
        if !dp.cap.is_empty() {
            merged.cap = dp.cap.clone();
        }
        if dp.dash_offset > 0.0 {
            merged.dash_offset = dp.dash_offset;
        }
        if dp.dash_pattern.is_some() {
            merged.dash_pattern = dp.dash_pattern.clone();
        }
        if dp.miter_limit > 0.0 {
            merged.miter_limit = dp.miter_limit;
        }
        if dp.fill_color.is_some() {
            merged.fill_color = dp.fill_color.clone();
        }
        if dp.stroke_color.is_some() {
            merged.stroke_color = dp.stroke_color.clone();
        }
        Some(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::res::DrawParam;

    fn doc_with_params(params: Vec<DrawParam>) -> Document {
        let mut draw_params = HashMap::new();
        for p in params {
            draw_params.insert(p.id, p);
        }
        Document {
            base_loc: Loc::from("/Doc_0"),
            desc: empty_desc(),
            pages: Vec::new(),
            templates: HashMap::new(),
            draw_params,
            media: HashMap::new(),
            fonts: HashMap::new(),
            color_spaces: HashMap::new(),
            signatures: HashMap::new(),
            seals: HashMap::new(),
            annotations: HashMap::new(),
        }
    }

    fn empty_desc() -> DocumentDesc {
        let xml_text = r#"<Document>
            <CommonData><PageArea><PhysicalBox>0 0 210 297</PhysicalBox></PageArea></CommonData>
        </Document>"#;
        let doc = roxmltree::Document::parse(xml_text).unwrap();
        DocumentDesc::from_node(doc.root_element()).unwrap()
    }

    fn param(id: Id, relative: Option<Id>) -> DrawParam {
        DrawParam { id, relative, ..DrawParam::default() }
    }

    #[test]
    fn test_draw_param_without_parent() {
        let mut p = param(1, None);
        p.line_width = 2.0;
        let doc = doc_with_params(vec![p]);
        assert_eq!(doc.draw_param(1).unwrap().line_width, 2.0);
        assert!(doc.draw_param(99).is_none());
    }

    #[test]
    fn test_draw_param_inherits_parent_fields() {
        let mut parent = param(1, None);
        parent.line_width = 2.0;
        parent.cap = "Round".to_string();
        parent.dash_pattern = Some(crate::model::FloatArray(vec![1.0, 2.0]));

        let mut child = param(2, Some(1));
        child.cap = "Square".to_string();

        let doc = doc_with_params(vec![parent, child]);
        let merged = doc.draw_param(2).unwrap();
        // Child's non-default value wins, parent fills the rest.
        assert_eq!(merged.cap, "Square");
        assert_eq!(merged.line_width, 2.0);
        assert_eq!(merged.dash_pattern.as_ref().unwrap().0, vec![1.0, 2.0]);
    }

    #[test]
    fn test_draw_param_child_dash_pattern_wins() {
        let mut parent = param(1, None);
        parent.dash_pattern = Some(crate::model::FloatArray(vec![9.0]));
        let mut child = param(2, Some(1));
        child.dash_pattern = Some(crate::model::FloatArray(vec![1.0, 2.0]));

        let doc = doc_with_params(vec![parent, child]);
        let merged = doc.draw_param(2).unwrap();
        assert_eq!(merged.dash_pattern.as_ref().unwrap().0, vec![1.0, 2.0]);
    }

    #[test]
    fn test_draw_param_chain_of_three() {
        let mut a = param(1, None);
        a.line_width = 3.0;
        a.join = "Bevel".to_string();
        let b = param(2, Some(1));
        let mut c = param(3, Some(2));
        c.join = "Round".to_string();

        let doc = doc_with_params(vec![a, b, c]);
        let merged = doc.draw_param(3).unwrap();
        assert_eq!(merged.line_width, 3.0);
        assert_eq!(merged.join, "Round");
    }

    #[test]
    fn test_draw_param_cycle_terminates() {
        let mut a = param(1, Some(2));
        a.line_width = 1.5;
        let mut b = param(2, Some(1));
        b.line_width = 2.5;

        let doc = doc_with_params(vec![a, b]);
        // Must terminate and keep the queried child's direct value.
        let merged = doc.draw_param(1).unwrap();
        assert_eq!(merged.line_width, 1.5);
        let merged = doc.draw_param(2).unwrap();
        assert_eq!(merged.line_width, 2.5);
    }

    #[test]
    fn test_draw_param_dangling_parent() {
        let mut child = param(2, Some(77));
        child.cap = "Round".to_string();
        let doc = doc_with_params(vec![child]);
        let merged = doc.draw_param(2).unwrap();
        assert_eq!(merged.cap, "Round");
    }

    #[test]
    fn test_rebase_resource_paths() {
        let doc = doc_with_params(vec![]);
        assert_eq!(
            doc.rebase(&Loc::from("Res"), Loc::from("image.png")).as_str(),
            "/Doc_0/Res/image.png"
        );
        assert_eq!(
            doc.rebase(&Loc::from(""), Loc::from("image.png")).as_str(),
            "/Doc_0/image.png"
        );
        assert_eq!(
            doc.rebase(&Loc::from("Res"), Loc::from("/abs/image.png")).as_str(),
            "/abs/image.png"
        );
    }
}
