//! Image object rendering

use log::{debug, error};

use crate::model::page::ImageObject;
use crate::model::scalar::StBox;
use crate::render::canvas::{Canvas, Frame};
use crate::render::Renderer;

impl Renderer<'_> {
    /// Draw an image object. Missing media references and undecodable
    /// images are logged and skipped.
    pub(crate) fn draw_image_object(
        &mut self,
        canvas: &mut dyn Canvas,
        object: &ImageObject,
        pb: StBox,
    ) {
        let Some(media) = self.doc.media.get(&object.resource_id) else {
            debug!("image resource {} not found", object.resource_id);
            return;
        };
        let image = match self.archive.read_image(media.media_file.clean().as_str()) {
            Ok(image) => image,
            Err(e) => {
                error!("image {} decode failed: {e}", media.media_file);
                return;
            }
        };
        let (img_w, img_h) = (image.width() as f64, image.height() as f64);
        if img_w <= 0.0 || img_h <= 0.0 {
            return;
        }

        let boundary = object.unit.boundary;
        let mut frame = Frame::push(&mut *canvas);
        match &object.unit.ctm {
            Some(m) => {
                let (tx, ty) = m.transform(0.0, 0.0);
                let y = pb.h - (ty + boundary.y + boundary.h);
                frame.translate(tx + boundary.x, y);
                frame.scale(m.a / img_w, m.d / img_h);
            }
            None => {
                let y = pb.h - (boundary.y + boundary.h);
                frame.translate(boundary.x, y);
                frame.scale(boundary.w / img_w, boundary.h / img_h);
            }
        }
        if let Err(e) = frame.draw_image(&image) {
            error!("image {} draw failed: {e}", media.media_file);
        }
    }
}
