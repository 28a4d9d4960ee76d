// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanner configuration: the immutable settings bundle and the builders that
// assemble it.
//
// Every numeric setter clamps into range instead of rejecting. A caller
// passing `image_quality(500)` gets 100, not an error.

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info};

use crate::error::{Result, ScanwerkError};

/// Inclusive bounds for the number of pages one capture may return.
pub const PAGE_LIMIT_RANGE: (u32, u32) = (1, 10);

/// Inclusive bounds for lossy encoder quality.
pub const IMAGE_QUALITY_RANGE: (u8, u8) = (1, 100);

/// Language used when the configured list ends up empty.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Capture experience requested from the scanning service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScannerMode {
    /// Full experience: cropping, filters, cleanup.
    #[default]
    Full,
    /// Basic capture with cropping only.
    Base,
}

/// Encoding used when persisting a page as an image file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImageFormat {
    #[default]
    Jpeg,
    Png,
    Webp,
}

impl ImageFormat {
    /// File extension written for this format (lowercase format name).
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }

    /// MIME type of the encoded output.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
        }
    }

    /// Whether the quality setting has any effect on the encoder.
    pub fn is_lossy(&self) -> bool {
        matches!(self, Self::Jpeg | Self::Webp)
    }
}

/// Page size requested for generated PDFs.
///
/// Accepted and stored, but PDF pages are always sized to the source image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PdfPageSize {
    #[default]
    A4,
    Letter,
    Legal,
}

/// Text recognition settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Run recognition automatically after every successful capture.
    pub auto_ocr: bool,
    /// Ordered, de-duplicated language codes. Never empty.
    pub languages: Vec<String>,
    /// Minimum proxy confidence (0.0..=1.0) for a recognition to succeed.
    pub min_confidence: f32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            auto_ocr: false,
            languages: vec![DEFAULT_LANGUAGE.to_string()],
            min_confidence: 0.5,
        }
    }
}

/// File export settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub image_format: ImageFormat,
    /// Encoder quality, 1..=100. Only lossy formats use it.
    #[serde(deserialize_with = "deserialize_quality")]
    pub image_quality: u8,
    /// Carried for API compatibility; no operation reads it.
    pub auto_generate_pdf: bool,
    pub pdf_page_size: PdfPageSize,
    /// Subdirectory under the storage root. `None` selects the per-kind default.
    pub output_directory: Option<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            image_format: ImageFormat::Jpeg,
            image_quality: 90,
            auto_generate_pdf: false,
            pdf_page_size: PdfPageSize::A4,
            output_directory: None,
        }
    }
}

/// Presentation hints for the host UI. Not consumed by the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Theme colour as a hex string, e.g. `#2196F3`.
    pub theme_color: Option<String>,
    pub show_tips: bool,
    pub app_name: Option<String>,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme_color: None,
            show_tips: true,
            app_name: None,
        }
    }
}

/// The complete, immutable scanner settings bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    pub scanner_mode: ScannerMode,
    /// Maximum pages per capture, 1..=10.
    #[serde(deserialize_with = "deserialize_page_limit")]
    pub page_limit: u32,
    /// Allow importing pages from the device gallery.
    pub gallery_import: bool,
    pub ocr: OcrConfig,
    pub export: ExportConfig,
    pub ui: UiConfig,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            scanner_mode: ScannerMode::Full,
            page_limit: PAGE_LIMIT_RANGE.1,
            gallery_import: true,
            ocr: OcrConfig::default(),
            export: ExportConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

impl ScannerConfig {
    /// Start a fluent builder from the defaults.
    pub fn builder() -> ScannerConfigBuilder {
        ScannerConfigBuilder::new()
    }

    /// Load a configuration from a JSON file.
    ///
    /// Missing fields take their defaults and out-of-range values are clamped
    /// exactly as the builder would clamp them.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data).map_err(|err| {
            ScanwerkError::Config(format!("invalid config {}: {err}", path.display()))
        })?;
        info!(path = %path.display(), "scanner config loaded");
        Ok(config.normalized())
    }

    /// Write the configuration as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        debug!(path = %path.as_ref().display(), "scanner config saved");
        Ok(())
    }

    /// Apply every clamp and normalisation rule the builders enforce.
    pub fn normalized(mut self) -> Self {
        self.page_limit = clamp_page_limit(i64::from(self.page_limit));
        self.ocr.min_confidence = clamp_confidence(self.ocr.min_confidence);
        self.ocr.languages = normalize_languages(self.ocr.languages);
        self.export.image_quality = clamp_quality(i64::from(self.export.image_quality));
        self
    }
}

// -- Clamp helpers -----------------------------------------------------------

fn clamp_page_limit(limit: i64) -> u32 {
    let (lo, hi) = PAGE_LIMIT_RANGE;
    limit.clamp(i64::from(lo), i64::from(hi)) as u32
}

fn clamp_quality(quality: i64) -> u8 {
    let (lo, hi) = IMAGE_QUALITY_RANGE;
    quality.clamp(i64::from(lo), i64::from(hi)) as u8
}

fn clamp_confidence(confidence: f32) -> f32 {
    // NaN compares false with everything; treat it as the lower bound.
    if confidence.is_nan() {
        return 0.0;
    }
    confidence.clamp(0.0, 1.0)
}

// Stored files may carry any integer; out-of-range values clamp.
fn deserialize_page_limit<'de, D: Deserializer<'de>>(de: D) -> std::result::Result<u32, D::Error> {
    i64::deserialize(de).map(clamp_page_limit)
}

fn deserialize_quality<'de, D: Deserializer<'de>>(de: D) -> std::result::Result<u8, D::Error> {
    i64::deserialize(de).map(clamp_quality)
}

/// Trim, drop blanks, remove duplicates keeping first occurrence, and fall
/// back to the default language when nothing is left.
fn normalize_languages<I, S>(languages: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut out: Vec<String> = Vec::new();
    for lang in languages {
        let lang: String = lang.into();
        let lang = lang.trim();
        if lang.is_empty() || out.iter().any(|seen| seen == lang) {
            continue;
        }
        out.push(lang.to_string());
    }
    if out.is_empty() {
        out.push(DEFAULT_LANGUAGE.to_string());
    }
    out
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Fluent assembler for [`ScannerConfig`].
///
/// ```
/// use scanwerk_core::{ImageFormat, ScannerConfig, ScannerMode};
///
/// let config = ScannerConfig::builder()
///     .scanner_mode(ScannerMode::Full)
///     .page_limit(5)
///     .configure_ocr(|ocr| ocr.auto_ocr(true).min_confidence(0.6))
///     .configure_export(|export| export.image_format(ImageFormat::Png))
///     .build();
///
/// assert_eq!(config.page_limit, 5);
/// assert!(config.ocr.auto_ocr);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScannerConfigBuilder {
    config: ScannerConfig,
}

impl ScannerConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue building from an existing bundle.
    pub fn from_config(config: ScannerConfig) -> Self {
        Self {
            config: config.normalized(),
        }
    }

    pub fn scanner_mode(mut self, mode: ScannerMode) -> Self {
        self.config.scanner_mode = mode;
        self
    }

    /// Clamped to 1..=10.
    pub fn page_limit(mut self, limit: i64) -> Self {
        self.config.page_limit = clamp_page_limit(limit);
        self
    }

    pub fn gallery_import(mut self, enabled: bool) -> Self {
        self.config.gallery_import = enabled;
        self
    }

    /// Replace the OCR settings with whatever `f` configures on a fresh
    /// sub-builder.
    pub fn configure_ocr(mut self, f: impl FnOnce(OcrConfigBuilder) -> OcrConfigBuilder) -> Self {
        self.config.ocr = f(OcrConfigBuilder::new()).build();
        self
    }

    /// Replace the export settings with whatever `f` configures on a fresh
    /// sub-builder.
    pub fn configure_export(
        mut self,
        f: impl FnOnce(ExportConfigBuilder) -> ExportConfigBuilder,
    ) -> Self {
        self.config.export = f(ExportConfigBuilder::new()).build();
        self
    }

    /// Replace the UI hints with whatever `f` configures on a fresh
    /// sub-builder.
    pub fn configure_ui(mut self, f: impl FnOnce(UiConfigBuilder) -> UiConfigBuilder) -> Self {
        self.config.ui = f(UiConfigBuilder::new()).build();
        self
    }

    pub fn build(self) -> ScannerConfig {
        self.config
    }
}

/// Sub-builder for [`OcrConfig`].
#[derive(Debug, Clone, Default)]
pub struct OcrConfigBuilder {
    config: OcrConfig,
}

impl OcrConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn auto_ocr(mut self, enabled: bool) -> Self {
        self.config.auto_ocr = enabled;
        self
    }

    /// Replace the language list. Blanks and duplicates are dropped; an empty
    /// list falls back to `en`.
    pub fn languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.languages = normalize_languages(languages);
        self
    }

    /// Clamped to 0.0..=1.0.
    pub fn min_confidence(mut self, confidence: f32) -> Self {
        self.config.min_confidence = clamp_confidence(confidence);
        self
    }

    pub fn build(self) -> OcrConfig {
        self.config
    }
}

/// Sub-builder for [`ExportConfig`].
#[derive(Debug, Clone, Default)]
pub struct ExportConfigBuilder {
    config: ExportConfig,
}

impl ExportConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn image_format(mut self, format: ImageFormat) -> Self {
        self.config.image_format = format;
        self
    }

    /// Clamped to 1..=100.
    pub fn image_quality(mut self, quality: i64) -> Self {
        self.config.image_quality = clamp_quality(quality);
        self
    }

    pub fn auto_generate_pdf(mut self, enabled: bool) -> Self {
        self.config.auto_generate_pdf = enabled;
        self
    }

    pub fn pdf_page_size(mut self, size: PdfPageSize) -> Self {
        self.config.pdf_page_size = size;
        self
    }

    pub fn output_directory(mut self, directory: impl Into<String>) -> Self {
        self.config.output_directory = Some(directory.into());
        self
    }

    pub fn build(self) -> ExportConfig {
        self.config
    }
}

/// Sub-builder for [`UiConfig`].
#[derive(Debug, Clone, Default)]
pub struct UiConfigBuilder {
    config: UiConfig,
}

impl UiConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn theme_color(mut self, color: impl Into<String>) -> Self {
        self.config.theme_color = Some(color.into());
        self
    }

    pub fn show_tips(mut self, enabled: bool) -> Self {
        self.config.show_tips = enabled;
        self
    }

    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        self.config.app_name = Some(name.into());
        self
    }

    pub fn build(self) -> UiConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = ScannerConfig::default();
        assert_eq!(config.scanner_mode, ScannerMode::Full);
        assert_eq!(config.page_limit, 10);
        assert!(config.gallery_import);
        assert!(!config.ocr.auto_ocr);
        assert_eq!(config.ocr.languages, vec!["en".to_string()]);
        assert_eq!(config.ocr.min_confidence, 0.5);
        assert_eq!(config.export.image_format, ImageFormat::Jpeg);
        assert_eq!(config.export.image_quality, 90);
        assert!(config.export.output_directory.is_none());
        assert!(config.ui.show_tips);
    }

    #[test]
    fn quality_is_clamped() {
        for (input, expected) in [(-5, 1), (0, 1), (1, 1), (55, 55), (100, 100), (500, 100)] {
            let export = ExportConfigBuilder::new().image_quality(input).build();
            assert_eq!(export.image_quality, expected, "quality {input}");
        }
    }

    #[test]
    fn page_limit_is_clamped() {
        for (input, expected) in [(-3, 1), (0, 1), (1, 1), (5, 5), (10, 10), (11, 10)] {
            let config = ScannerConfig::builder().page_limit(input).build();
            assert_eq!(config.page_limit, expected, "page limit {input}");
        }
    }

    #[test]
    fn min_confidence_is_clamped() {
        for (input, expected) in [(-0.5, 0.0), (0.0, 0.0), (0.6, 0.6), (1.0, 1.0), (7.0, 1.0)] {
            let ocr = OcrConfigBuilder::new().min_confidence(input).build();
            assert_eq!(ocr.min_confidence, expected, "confidence {input}");
        }
        let nan = OcrConfigBuilder::new().min_confidence(f32::NAN).build();
        assert_eq!(nan.min_confidence, 0.0);
    }

    #[test]
    fn languages_are_deduplicated_and_never_empty() {
        let ocr = OcrConfigBuilder::new()
            .languages(["en", "es", " en ", "", "fr", "es"])
            .build();
        assert_eq!(ocr.languages, vec!["en", "es", "fr"]);

        let empty = OcrConfigBuilder::new().languages(Vec::<String>::new()).build();
        assert_eq!(empty.languages, vec!["en"]);
    }

    #[test]
    fn unconfigured_sub_builders_take_defaults() {
        let config = ScannerConfig::builder()
            .configure_ocr(|ocr| ocr.auto_ocr(true))
            .build();
        assert!(config.ocr.auto_ocr);
        assert_eq!(config.export, ExportConfig::default());
        assert_eq!(config.ui, UiConfig::default());
    }

    #[test]
    fn reconfiguring_a_sub_builder_starts_from_defaults() {
        let config = ScannerConfig::builder()
            .configure_export(|e| e.image_quality(40).output_directory("Receipts"))
            .configure_export(|e| e.image_format(ImageFormat::Png))
            .build();
        assert_eq!(config.export.image_format, ImageFormat::Png);
        assert_eq!(config.export.image_quality, 90);
        assert!(config.export.output_directory.is_none());
    }

    #[test]
    fn full_demo_configuration() {
        let config = ScannerConfig::builder()
            .scanner_mode(ScannerMode::Base)
            .page_limit(5)
            .gallery_import(false)
            .configure_ocr(|o| o.auto_ocr(true).languages(["en", "es"]).min_confidence(0.6))
            .configure_export(|e| {
                e.image_format(ImageFormat::Webp)
                    .image_quality(95)
                    .auto_generate_pdf(true)
                    .pdf_page_size(PdfPageSize::Legal)
                    .output_directory("SmartScannerDemo")
            })
            .configure_ui(|u| u.theme_color("#2196F3").show_tips(false).app_name("Demo"))
            .build();

        assert_eq!(config.scanner_mode, ScannerMode::Base);
        assert!(!config.gallery_import);
        assert_eq!(config.ocr.languages, vec!["en", "es"]);
        assert_eq!(config.export.pdf_page_size, PdfPageSize::Legal);
        assert_eq!(config.export.output_directory.as_deref(), Some("SmartScannerDemo"));
        assert_eq!(config.ui.theme_color.as_deref(), Some("#2196F3"));
        assert_eq!(config.ui.app_name.as_deref(), Some("Demo"));
    }

    #[test]
    fn format_extensions() {
        assert_eq!(ImageFormat::Jpeg.extension(), "jpeg");
        assert_eq!(ImageFormat::Png.extension(), "png");
        assert_eq!(ImageFormat::Webp.extension(), "webp");
        assert!(ImageFormat::Jpeg.is_lossy());
        assert!(ImageFormat::Webp.is_lossy());
        assert!(!ImageFormat::Png.is_lossy());
        assert_eq!(ImageFormat::Jpeg.mime_type(), "image/jpeg");
        assert_eq!(ImageFormat::Png.mime_type(), "image/png");
        assert_eq!(ImageFormat::Webp.mime_type(), "image/webp");
    }

    #[test]
    fn load_clamps_out_of_range_values() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("scanner.json");
        std::fs::write(
            &path,
            r#"{ "page_limit": 40, "ocr": { "min_confidence": 3.5, "languages": [] },
                 "export": { "image_format": "PNG", "image_quality": 0 } }"#,
        )
        .expect("write config");

        let config = ScannerConfig::load(&path).expect("load");
        assert_eq!(config.page_limit, 10);
        assert_eq!(config.ocr.min_confidence, 1.0);
        assert_eq!(config.ocr.languages, vec!["en"]);
        assert_eq!(config.export.image_format, ImageFormat::Png);
        assert_eq!(config.export.image_quality, 1);
        assert!(config.gallery_import, "missing fields take defaults");
    }

    #[test]
    fn load_clamps_values_outside_the_stored_integer_types() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("scanner.json");
        std::fs::write(&path, r#"{"page_limit": -3, "export": {"image_quality": 500}}"#)
            .expect("write config");

        let config = ScannerConfig::load(&path).expect("load");
        assert_eq!(config.page_limit, 1);
        assert_eq!(config.export.image_quality, 100);
        assert_eq!(config.export.image_format, ImageFormat::Jpeg);
    }

    #[test]
    fn save_then_load_preserves_bundle() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("scanner.json");
        let config = ScannerConfig::builder()
            .page_limit(3)
            .configure_export(|e| e.output_directory("Out"))
            .build();
        config.save(&path).expect("save");
        assert_eq!(ScannerConfig::load(&path).expect("load"), config);
    }

    #[test]
    fn load_rejects_malformed_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").expect("write");
        assert!(matches!(
            ScannerConfig::load(&path),
            Err(ScanwerkError::Config(_))
        ));
    }
}
