//! Page composition and rendering
//!
//! The renderer walks a parsed document and issues draw calls to a
//! [`Canvas`]. Composition order per page: templates (background layers
//! first), the page's own layers (background first), seals, annotations.

pub mod canvas;
pub mod font;
mod image;
mod path;
pub mod pdf;
pub mod raster;
mod seal;
pub mod style;
mod text;

use log::{debug, error};

use crate::archive::ArchiveCache;
use crate::error::Result;
use crate::model::page::{Layer, LayerKind, PageBlock, TemplateRef};
use crate::model::res::DrawParam;
use crate::model::scalar::{Rgba, StBox};
use crate::parse::{Document, Page};
use canvas::{Canvas, Paint};
use font::FontLoader;

pub use canvas::PT_PER_MM;

/// Renders pages of one document onto a canvas.
pub struct Renderer<'a> {
    doc: &'a Document,
    archive: &'a ArchiveCache,
    background: Rgba,
    fonts: FontLoader,
}

impl<'a> Renderer<'a> {
    pub fn new(doc: &'a Document, archive: &'a ArchiveCache, background: Rgba) -> Renderer<'a> {
        Renderer { doc, archive, background, fonts: FontLoader::new() }
    }

    /// Render a full page: background fill, then the composition.
    pub fn render_page(
        &mut self,
        canvas: &mut dyn Canvas,
        page: &Page,
        draw_seals: bool,
    ) -> Result<()> {
        let pb = page.area.physical_box;
        if self.background.a > 0 {
            if let Some(rect) = rect_path(0.0, 0.0, pb.w, pb.h) {
                canvas.fill_path(
                    &rect,
                    &Paint::Solid(self.background),
                    crate::model::page::FillRule::NonZero,
                );
            }
        }
        self.render_page_content(canvas, page, draw_seals);
        Ok(())
    }

    /// Compose templates, layers, seals and annotations, in that order.
    pub(crate) fn render_page_content(
        &mut self,
        canvas: &mut dyn Canvas,
        page: &Page,
        draw_seals: bool,
    ) {
        let pb = page.area.physical_box;
        let templates = &page.content.templates;
        for template in templates.iter().filter(|t| t.z_order == "Background") {
            self.render_template(canvas, template, pb);
        }
        for template in templates.iter().filter(|t| t.z_order != "Background") {
            self.render_template(canvas, template, pb);
        }
        self.render_layers(canvas, &page.content.layers, pb);

        if draw_seals {
            if let Some(seals) = self.doc.seals.get(&page.id) {
                for info in seals {
                    if let Err(e) = self.draw_seal(canvas, info, pb) {
                        error!("seal render failed: {e}");
                    }
                }
            }
        }

        if let Some(annots) = self.doc.annotations.get(&page.id) {
            for annot in &annots.annots {
                let Some(appearance) = &annot.appearance else { continue };
                let shift = appearance.boundary.unwrap_or_default();
                self.render_block_shifted(canvas, &appearance.block, &shift, None, pb);
            }
        }
    }

    fn render_template(&mut self, canvas: &mut dyn Canvas, template: &TemplateRef, pb: StBox) {
        let Some(content) = self.doc.templates.get(&template.template_id) else {
            debug!("template {} not found", template.template_id);
            return;
        };
        self.render_layers(canvas, &content.layers, pb);
    }

    /// Background layers first, then everything else, in document order.
    fn render_layers(&mut self, canvas: &mut dyn Canvas, layers: &[Layer], pb: StBox) {
        for layer in layers.iter().filter(|l| l.kind == LayerKind::Background) {
            self.render_layer(canvas, layer, pb);
        }
        for layer in layers.iter().filter(|l| l.kind != LayerKind::Background) {
            self.render_layer(canvas, layer, pb);
        }
    }

    fn render_layer(&mut self, canvas: &mut dyn Canvas, layer: &Layer, pb: StBox) {
        let dp = layer.draw_param.and_then(|id| self.doc.draw_param(id));
        self.render_block(canvas, &layer.content, dp.as_ref(), pb);
    }

    /// Depth-first block walk: inner blocks, then images, paths, texts.
    fn render_block(
        &mut self,
        canvas: &mut dyn Canvas,
        block: &PageBlock,
        dp: Option<&DrawParam>,
        pb: StBox,
    ) {
        for inner in &block.blocks {
            self.render_block(canvas, inner, dp, pb);
        }
        for object in &block.images {
            self.draw_image_object(canvas, object, pb);
        }
        for object in &block.paths {
            self.draw_path_object(canvas, &object.path, dp, pb);
        }
        for object in &block.texts {
            self.draw_text_object(canvas, &object.text, dp, pb);
        }
        for object in &block.composites {
            // Composite vector resources are parsed but not rendered.
            debug!("composite object {} skipped", object.id);
        }
    }

    /// Render a block with every object boundary shifted, as used for
    /// annotation appearances.
    fn render_block_shifted(
        &mut self,
        canvas: &mut dyn Canvas,
        block: &PageBlock,
        shift: &StBox,
        dp: Option<&DrawParam>,
        pb: StBox,
    ) {
        for inner in &block.blocks {
            self.render_block_shifted(canvas, inner, shift, dp, pb);
        }
        for object in &block.images {
            let mut object = object.clone();
            object.unit.boundary = object.unit.boundary.copy_and_shift(shift);
            self.draw_image_object(canvas, &object, pb);
        }
        for object in &block.paths {
            let mut path = object.path.clone();
            path.unit.boundary = path.unit.boundary.copy_and_shift(shift);
            self.draw_path_object(canvas, &path, dp, pb);
        }
        for object in &block.texts {
            let mut text = object.text.clone();
            text.unit.boundary = text.unit.boundary.copy_and_shift(shift);
            self.draw_text_object(canvas, &text, dp, pb);
        }
    }

    /// The merged draw-parameter chain of an object's own reference.
    fn object_draw_param(&self, unit: &crate::model::page::GraphicUnit) -> Option<DrawParam> {
        unit.draw_param.and_then(|id| self.doc.draw_param(id))
    }
}

/// An axis-aligned rectangle as a canvas path.
pub(crate) fn rect_path(x: f64, y: f64, w: f64, h: f64) -> Option<tiny_skia_path::Path> {
    let rect = tiny_skia_path::Rect::from_xywh(x as f32, y as f32, w as f32, h as f32)?;
    Some(tiny_skia_path::PathBuilder::from_rect(rect))
}
