// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image export: encode a captured page in the configured format and write it
// to disk.

use std::io::Cursor;
use std::path::Path;

use image::DynamicImage;
use image::codecs::jpeg::JpegEncoder;
use scanwerk_core::config::{ExportConfig, IMAGE_QUALITY_RANGE};
use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::ImageFormat;
use tracing::{debug, info, instrument};

/// Encodes page images for export.
///
/// Quality drives the lossy formats (JPEG and WEBP). PNG ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageExporter {
    format: ImageFormat,
    quality: u8,
}

impl ImageExporter {
    /// Quality is clamped to 1..=100.
    pub fn new(format: ImageFormat, quality: u8) -> Self {
        Self {
            format,
            quality: quality.clamp(IMAGE_QUALITY_RANGE.0, IMAGE_QUALITY_RANGE.1),
        }
    }

    pub fn from_config(config: &ExportConfig) -> Self {
        Self::new(config.image_format, config.image_quality)
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// File extension for the configured format, without the dot.
    pub fn extension(&self) -> &'static str {
        self.format.extension()
    }

    /// Encode `image` into the configured format.
    #[instrument(skip(self, image), fields(format = ?self.format, quality = self.quality))]
    pub fn encode(&self, image: &DynamicImage) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        match self.format {
            ImageFormat::Jpeg => {
                let rgb = image.to_rgb8();
                let encoder = JpegEncoder::new_with_quality(&mut buffer, self.quality);
                rgb.write_with_encoder(encoder).map_err(|err| {
                    ScanwerkError::Image(format!("JPEG encoding failed: {err}"))
                })?;
            }
            ImageFormat::Png => {
                image
                    .write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)
                    .map_err(|err| ScanwerkError::Image(format!("PNG encoding failed: {err}")))?;
            }
            ImageFormat::Webp => {
                // libwebp only takes 8-bit RGB or RGBA.
                let pixels = if image.color().has_alpha() {
                    DynamicImage::ImageRgba8(image.to_rgba8())
                } else {
                    DynamicImage::ImageRgb8(image.to_rgb8())
                };
                let encoder = webp::Encoder::from_image(&pixels).map_err(|err| {
                    ScanwerkError::Image(format!("WEBP encoding failed: {err}"))
                })?;
                buffer.extend_from_slice(&encoder.encode(f32::from(self.quality)));
            }
        }
        debug!(bytes = buffer.len(), lossy = self.format.is_lossy(), "image encoded");
        Ok(buffer)
    }

    /// Encode `image` and write it to `path`.
    pub fn write_to_file(&self, image: &DynamicImage, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.encode(image)?;
        std::fs::write(path.as_ref(), &bytes)?;
        info!(path = %path.as_ref().display(), bytes = bytes.len(), "image written");
        Ok(())
    }
}

impl Default for ImageExporter {
    fn default() -> Self {
        Self::from_config(&ExportConfig::default())
    }
}
