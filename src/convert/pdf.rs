//! PDF conversion

use std::io::Write;

use krilla::PageSettings;

use crate::convert::Source;
use crate::error::{Error, Result};
use crate::model::scalar::TRANSPARENT;
use crate::render::pdf::PdfCanvas;
use crate::render::{Renderer, PT_PER_MM};

/// Render every page of an OFD document into a single PDF stream.
///
/// Each output page is sized from the source page's physical box in
/// millimetres. A per-page render failure aborts the conversion.
pub fn to_pdf(source: impl Into<Source>, output: &mut dyn Write) -> Result<()> {
    let ofd = source.into().open()?;
    let doc = ofd
        .documents
        .first()
        .ok_or_else(|| Error::Render("archive contains no document".to_string()))?;
    if doc.pages.is_empty() {
        return Err(Error::Render("document has no pages".to_string()));
    }

    let mut renderer = Renderer::new(doc, ofd.archive(), TRANSPARENT);
    let mut pdf = krilla::Document::new();

    for (index, page) in doc.pages.iter().enumerate() {
        let pb = page.area.physical_box;
        let (w_pt, h_pt) = ((pb.w * PT_PER_MM) as f32, (pb.h * PT_PER_MM) as f32);
        let mut pdf_page = pdf.start_page_with(PageSettings::new(w_pt, h_pt));
        let mut surface = pdf_page.surface();
        let mut canvas = PdfCanvas::new(&mut surface, pb.w, pb.h);
        renderer
            .render_page(&mut canvas, page, true)
            .map_err(|e| Error::Render(format!("page {}: {e}", index + 1)))?;
    }

    let bytes = pdf.finish().map_err(|e| Error::Render(format!("PDF finish: {e:?}")))?;
    output.write_all(&bytes)?;
    Ok(())
}
