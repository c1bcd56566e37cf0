//! Seal rendering
//!
//! Raster seals are drawn like images, fitted to the stamp boundary.
//! OFD seals open the nested archive and render its first page without its
//! own seals; the recursive render carries its own font loader, so the
//! outer document's loader is untouched on every exit path.

use crate::error::{Error, Result};
use crate::model::scalar::{StBox, TRANSPARENT};
use crate::parse::{Ofd, SealInfo};
use crate::render::canvas::{Canvas, Frame};
use crate::render::Renderer;

impl Renderer<'_> {
    pub(crate) fn draw_seal(
        &mut self,
        canvas: &mut dyn Canvas,
        info: &SealInfo,
        pb: StBox,
    ) -> Result<()> {
        let boundary = info.stamp.boundary;

        if infer::is_image(&info.data.data) {
            let image = image::load_from_memory(&info.data.data)?.to_rgba8();
            let (img_w, img_h) = (image.width() as f64, image.height() as f64);
            if img_w <= 0.0 || img_h <= 0.0 {
                return Ok(());
            }
            let mut frame = Frame::push(&mut *canvas);
            frame.translate(boundary.x, pb.h - (boundary.y + boundary.h));
            frame.scale(boundary.w / img_w, boundary.h / img_h);
            return frame.draw_image(&image);
        }

        if info.data.file_type == "ofd" {
            let inner = Ofd::from_bytes(info.data.data.clone())?;
            let Some(doc) = inner.documents.first() else {
                return Ok(());
            };
            let Some(page) = doc.pages.first() else {
                return Ok(());
            };
            let seal_box = page.area.physical_box;
            if seal_box.w <= 0.0 || seal_box.h <= 0.0 {
                return Err(Error::Render("seal page has no physical box".to_string()));
            }

            let mut renderer = Renderer::new(doc, inner.archive(), TRANSPARENT);
            let mut frame = Frame::push(&mut *canvas);
            frame.translate(boundary.x, pb.h - (boundary.y + boundary.h));
            frame.scale(boundary.w / seal_box.w, boundary.h / seal_box.h);
            renderer.render_page_content(&mut *frame, page, false);
        }
        Ok(())
    }
}
