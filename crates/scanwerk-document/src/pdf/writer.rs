// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer: wrap a page image in a one-page PDF using `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`.
//
// The page is exactly as large as the image: one pixel maps to one point and
// the image is drawn at the origin without scaling. Configured paper sizes are
// not applied here.

use std::path::Path;

use image::DynamicImage;
use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, RawImageData,
    RawImageFormat, XObjectTransform,
};
use scanwerk_core::error::{Result, ScanwerkError};
use tracing::{debug, info, instrument, warn};

/// Points per inch. At this DPI one image pixel renders as one point.
const POINTS_PER_INCH: f32 = 72.0;
const MM_PER_INCH: f32 = 25.4;

/// Page edge length in millimetres for `pixels` at one point per pixel.
fn pixels_to_mm(pixels: u32) -> Mm {
    Mm(pixels as f32 * MM_PER_INCH / POINTS_PER_INCH)
}

/// Creates single-page PDF documents from page images.
pub struct PdfWriter {
    /// Title metadata embedded in the PDF /Info dictionary.
    title: String,
}

impl PdfWriter {
    pub fn new() -> Self {
        Self {
            title: "Scanned Document".into(),
        }
    }

    /// Set a title for the PDF metadata.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Create a PDF with one page the size of `image`, in points.
    #[instrument(skip(self, image), fields(width = image.width(), height = image.height()))]
    pub fn create_from_image(&self, image: &DynamicImage) -> Result<Vec<u8>> {
        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 {
            return Err(ScanwerkError::Pdf(format!(
                "cannot place an empty image ({width}x{height})"
            )));
        }

        // Convert to RGB8 for printpdf.
        let rgb = image.to_rgb8();
        let raw = RawImage {
            pixels: RawImageData::U8(rgb.into_raw()),
            width: width as usize,
            height: height as usize,
            data_format: RawImageFormat::RGB8,
            tag: Vec::new(),
        };

        let mut doc = PdfDocument::new(&self.title);
        let xobject_id = doc.add_image(&raw);

        let ops = vec![Op::UseXobject {
            id: xobject_id,
            transform: XObjectTransform {
                translate_x: Some(Pt(0.0)),
                translate_y: Some(Pt(0.0)),
                scale_x: Some(1.0),
                scale_y: Some(1.0),
                dpi: Some(POINTS_PER_INCH),
                rotate: None,
            },
        }];

        let page = PdfPage::new(pixels_to_mm(width), pixels_to_mm(height), ops);
        doc.with_pages(vec![page]);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = doc.save(&PdfSaveOptions::default(), &mut warnings);
        if !warnings.is_empty() {
            warn!(count = warnings.len(), "printpdf reported warnings");
        }

        debug!(bytes = output.len(), "image PDF assembled");
        Ok(output)
    }

    /// Create an image PDF and write it directly to a file.
    pub fn write_image_to_file(&self, image: &DynamicImage, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.create_from_image(image)?;
        std::fs::write(path.as_ref(), &bytes)?;
        info!("Wrote image PDF to {}", path.as_ref().display());
        Ok(())
    }
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}
