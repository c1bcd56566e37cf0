//! Raster conversion

use std::io::{Cursor, Write};

use image::imageops::FilterType;
use image::RgbaImage;

use crate::convert::Source;
use crate::error::{Error, Result};
use crate::model::scalar::{Rgba, TRANSPARENT};
use crate::parse::{Document, Page};
use crate::render::raster::RasterCanvas;
use crate::render::Renderer;

/// Raster output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
}

/// A per-page output sink.
pub type FileWriter<'a> = Box<dyn FnMut(usize) -> Result<Box<dyn Write + 'a>> + 'a>;

/// A per-page decoded-image sink.
pub type ImageWriter<'a> = Box<dyn FnMut(usize, RgbaImage) -> Result<()> + 'a>;

/// Options for rendering a document to images.
///
/// At least one of `file_writer`/`image_writer` must be set. `page` is
/// one-based; zero renders every page. `thumbnail` bounds the longest edge
/// in pixels, zero disables it.
pub struct ImageOptions<'a> {
    pub dpi: f64,
    pub format: OutputFormat,
    pub bg_color: Rgba,
    pub page: usize,
    pub thumbnail: u32,
    pub file_writer: Option<FileWriter<'a>>,
    pub image_writer: Option<ImageWriter<'a>>,
}

impl Default for ImageOptions<'_> {
    fn default() -> Self {
        ImageOptions {
            dpi: 300.0,
            format: OutputFormat::Png,
            bg_color: TRANSPARENT,
            page: 0,
            thumbnail: 0,
            file_writer: None,
            image_writer: None,
        }
    }
}

/// Render an OFD document to PNG or JPEG images.
pub fn to_images(source: impl Into<Source>, mut options: ImageOptions) -> Result<()> {
    if options.file_writer.is_none() && options.image_writer.is_none() {
        return Err(Error::InvalidConfig("no image output writer configured"));
    }

    let ofd = source.into().open()?;
    let doc = ofd
        .documents
        .first()
        .ok_or_else(|| Error::Render("archive contains no document".to_string()))?;
    if doc.pages.is_empty() {
        return Err(Error::Render("document has no pages".to_string()));
    }

    let mut renderer = Renderer::new(doc, ofd.archive(), options.bg_color);

    if options.page > 0 {
        // A one-based page beyond the document quietly produces nothing.
        if options.page > doc.pages.len() {
            return Ok(());
        }
        let index = options.page - 1;
        return render_one(&mut renderer, doc, index, &mut options);
    }
    for index in 0..doc.pages.len() {
        render_one(&mut renderer, doc, index, &mut options)?;
    }
    Ok(())
}

fn render_one(
    renderer: &mut Renderer,
    doc: &Document,
    index: usize,
    options: &mut ImageOptions,
) -> Result<()> {
    let page: &Page = &doc.pages[index];
    let pb = page.area.physical_box;
    let mut canvas = RasterCanvas::new(pb.w, pb.h, options.dpi)?;
    renderer.render_page(&mut canvas, page, true)?;

    let page_number = index + 1;
    let image = canvas.to_image();

    if let Some(writer) = options.file_writer.as_mut() {
        let mut sink = writer(page_number)?;
        let encoded = encode(&image, options.format)?;
        sink.write_all(&encoded)?;
    }

    if let Some(writer) = options.image_writer.as_mut() {
        let image = if options.thumbnail > 0 {
            resize_thumbnail(&image, options.thumbnail)
        } else {
            image.clone()
        };
        writer(page_number, image)?;
    }
    Ok(())
}

fn encode(image: &RgbaImage, format: OutputFormat) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    match format {
        OutputFormat::Png => {
            image::DynamicImage::ImageRgba8(image.clone())
                .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;
        }
        OutputFormat::Jpeg => {
            // JPEG has no alpha channel.
            image::DynamicImage::ImageRgba8(image.clone())
                .to_rgb8()
                .write_with_encoder(image::codecs::jpeg::JpegEncoder::new(&mut Cursor::new(
                    &mut buf,
                )))?;
        }
    }
    Ok(buf)
}

/// Proportional resize so the longest edge equals `target`, Lanczos filter.
fn resize_thumbnail(image: &RgbaImage, target: u32) -> RgbaImage {
    let (w, h) = (image.width(), image.height());
    let (nw, nh) = if w > h {
        (target, ((h as f64 / w as f64) * target as f64).round().max(1.0) as u32)
    } else {
        (((w as f64 / h as f64) * target as f64).round().max(1.0) as u32, target)
    };
    image::imageops::resize(image, nw, nh, FilterType::Lanczos3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_a_writer() {
        let result = to_images(Vec::new(), ImageOptions::default());
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_thumbnail_longest_edge() {
        let image = RgbaImage::new(400, 100);
        let thumb = resize_thumbnail(&image, 100);
        assert_eq!((thumb.width(), thumb.height()), (100, 25));

        let image = RgbaImage::new(100, 400);
        let thumb = resize_thumbnail(&image, 100);
        assert_eq!((thumb.width(), thumb.height()), (25, 100));
    }

    #[test]
    fn test_encode_formats() {
        let image = RgbaImage::new(4, 4);
        let png = encode(&image, OutputFormat::Png).unwrap();
        assert_eq!(&png[1..4], b"PNG");
        let jpeg = encode(&image, OutputFormat::Jpeg).unwrap();
        assert_eq!(&jpeg[..2], &[0xff, 0xd8]);
    }
}
