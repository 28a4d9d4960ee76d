// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Fluent construction of a `DocumentScanner`.

use std::path::PathBuf;
use std::sync::Arc;

use scanwerk_bridge::{DocumentCaptureService, TextRecognitionService};
use scanwerk_core::{
    ExportConfigBuilder, OcrConfigBuilder, ScannerConfig, ScannerConfigBuilder, ScannerMode,
    UiConfigBuilder,
};

use crate::scanner::DocumentScanner;
use crate::storage;

/// Builder for [`DocumentScanner`].
///
/// Configuration setters clamp out-of-range values and never fail. Services
/// not supplied default to the platform's own; the storage root defaults to
/// [`storage::default_storage_root`].
///
/// ```no_run
/// use scanwerk_sdk::{DocumentScanner, ImageFormat};
///
/// let scanner = DocumentScanner::builder()
///     .page_limit(3)
///     .configure_ocr(|ocr| ocr.auto_ocr(true).languages(["en", "de"]))
///     .configure_export(|export| export.image_format(ImageFormat::Png))
///     .storage_root("/tmp/scans")
///     .build();
/// ```
#[derive(Default)]
pub struct DocumentScannerBuilder {
    config: ScannerConfigBuilder,
    capture: Option<Arc<dyn DocumentCaptureService>>,
    recognizer: Option<Arc<dyn TextRecognitionService>>,
    storage_root: Option<PathBuf>,
}

impl DocumentScannerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration, e.g. one loaded from disk.
    pub fn config(mut self, config: ScannerConfig) -> Self {
        self.config = ScannerConfigBuilder::from_config(config);
        self
    }

    pub fn scanner_mode(mut self, mode: ScannerMode) -> Self {
        self.config = self.config.scanner_mode(mode);
        self
    }

    /// Clamped to 1..=10.
    pub fn page_limit(mut self, limit: i64) -> Self {
        self.config = self.config.page_limit(limit);
        self
    }

    pub fn gallery_import(mut self, enabled: bool) -> Self {
        self.config = self.config.gallery_import(enabled);
        self
    }

    /// Replace the OCR settings with what `f` builds from defaults.
    pub fn configure_ocr(mut self, f: impl FnOnce(OcrConfigBuilder) -> OcrConfigBuilder) -> Self {
        self.config = self.config.configure_ocr(f);
        self
    }

    pub fn configure_export(
        mut self,
        f: impl FnOnce(ExportConfigBuilder) -> ExportConfigBuilder,
    ) -> Self {
        self.config = self.config.configure_export(f);
        self
    }

    pub fn configure_ui(mut self, f: impl FnOnce(UiConfigBuilder) -> UiConfigBuilder) -> Self {
        self.config = self.config.configure_ui(f);
        self
    }

    pub fn capture_service(mut self, service: Arc<dyn DocumentCaptureService>) -> Self {
        self.capture = Some(service);
        self
    }

    pub fn recognition_service(mut self, service: Arc<dyn TextRecognitionService>) -> Self {
        self.recognizer = Some(service);
        self
    }

    /// Directory the output subdirectories are created under.
    pub fn storage_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.storage_root = Some(root.into());
        self
    }

    pub fn build(self) -> DocumentScanner {
        DocumentScanner::from_parts(
            self.config.build(),
            self.capture
                .unwrap_or_else(scanwerk_bridge::platform_capture_service),
            self.recognizer.unwrap_or_else(default_recognition_service),
            self.storage_root
                .unwrap_or_else(storage::default_storage_root),
        )
    }
}

/// On desktop builds with the `ocr` feature, the in-process `ocrs` engine
/// when its models are installed. Otherwise the platform recognizer.
fn default_recognition_service() -> Arc<dyn TextRecognitionService> {
    #[cfg(all(feature = "ocr", not(target_os = "android")))]
    {
        match scanwerk_document::OcrsRecognizer::with_defaults() {
            Ok(recognizer) => return Arc::new(recognizer),
            Err(err) => tracing::warn!(error = %err, "ocrs unavailable, using platform recognizer"),
        }
    }
    scanwerk_bridge::platform_recognition_service()
}
