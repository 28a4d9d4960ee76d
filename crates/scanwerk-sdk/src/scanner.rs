// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `DocumentScanner`: drives one capture → recognise → persist session.
//
// Every operation returns its outcome and also hands it to the matching
// listener. Blocking work (page loading, recognition, encoding, file I/O) runs
// on Tokio's blocking pool; the outcome is delivered on the caller's task once
// that work completes. No operation returns an internal error: each failure is
// translated into the closed `ScanError` set.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use image::DynamicImage;
use scanwerk_bridge::{
    BridgeError, CapturePayload, CaptureRequest, DocumentCaptureService, RESULT_OK, ScanLauncher,
    TextRecognitionService,
};
use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::{
    CaptureOutcome, FileOperationType, PersistOutcome, RecognitionOutcome, ScanError,
    ScanMetadata, ScanResult, ScannerConfig, SessionState,
};
use scanwerk_document::{ImageExporter, PdfWriter};
use tokio::task::{JoinError, spawn_blocking};
use tracing::{debug, info, instrument, warn};

use crate::builder::DocumentScannerBuilder;
use crate::confidence::text_confidence;
use crate::listeners::{FileOperationListener, ListenerSlot, OcrListener, ScanListener};
use crate::storage;

/// Message reported when the capture service refuses to start without
/// saying why.
const DEFAULT_START_FAILURE: &str = "Scanner initialization failed";

/// Orchestrates document capture, text recognition, and export.
///
/// Build one with [`DocumentScanner::builder`]. The configuration is fixed for
/// the scanner's lifetime.
pub struct DocumentScanner {
    config: Arc<ScannerConfig>,
    capture: Arc<dyn DocumentCaptureService>,
    recognizer: Arc<dyn TextRecognitionService>,
    storage_root: PathBuf,
    scan_listener: ListenerSlot<dyn ScanListener>,
    ocr_listener: ListenerSlot<dyn OcrListener>,
    file_listener: ListenerSlot<dyn FileOperationListener>,
    state: Mutex<SessionState>,
}

impl DocumentScanner {
    pub fn builder() -> DocumentScannerBuilder {
        DocumentScannerBuilder::new()
    }

    pub(crate) fn from_parts(
        config: ScannerConfig,
        capture: Arc<dyn DocumentCaptureService>,
        recognizer: Arc<dyn TextRecognitionService>,
        storage_root: PathBuf,
    ) -> Self {
        info!(
            capture = capture.name(),
            recognizer = recognizer.name(),
            root = %storage_root.display(),
            "document scanner ready"
        );
        Self {
            config: Arc::new(config),
            capture,
            recognizer,
            storage_root,
            scan_listener: ListenerSlot::new(),
            ocr_listener: ListenerSlot::new(),
            file_listener: ListenerSlot::new(),
            state: Mutex::new(SessionState::Idle),
        }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// Directory the output subdirectories are created under.
    pub fn storage_root(&self) -> &Path {
        &self.storage_root
    }

    /// Where the most recent operation left the session.
    pub fn session_state(&self) -> SessionState {
        match self.state.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    // -- Listeners ------------------------------------------------------------

    /// Replace the capture listener. Outcomes not yet delivered go to the new
    /// one.
    pub fn set_scan_listener(&self, listener: Arc<dyn ScanListener>) {
        self.scan_listener.set(Some(listener));
    }

    pub fn set_ocr_listener(&self, listener: Arc<dyn OcrListener>) {
        self.ocr_listener.set(Some(listener));
    }

    pub fn set_file_listener(&self, listener: Arc<dyn FileOperationListener>) {
        self.file_listener.set(Some(listener));
    }

    pub fn clear_listeners(&self) {
        self.scan_listener.set(None);
        self.ocr_listener.set(None);
        self.file_listener.set(None);
    }

    // -- Capture --------------------------------------------------------------

    /// Ask the capture service for a launch token and hand it to `launcher`.
    ///
    /// The capture result arrives later through the platform and must be fed
    /// to [`process_scan_result`](Self::process_scan_result). Failures are
    /// sent to the scan listener as well as returned.
    #[instrument(skip_all, fields(mode = ?self.config.scanner_mode, page_limit = self.config.page_limit))]
    pub async fn start_scanning<L>(&self, launcher: &L) -> std::result::Result<(), ScanError>
    where
        L: ScanLauncher + ?Sized,
    {
        self.transition(SessionState::Capturing);

        let request = CaptureRequest::from(self.config.as_ref());
        let capture = Arc::clone(&self.capture);
        let token = match spawn_blocking(move || capture.start_scan_intent(&request)).await {
            Ok(Ok(token)) => token,
            Ok(Err(err)) => return Err(self.fail_capture(start_failure(&err), &err)),
            Err(join) => {
                return Err(self.fail_capture(ScanError::ScannerInitializationFailed, &join));
            }
        };

        debug!(?token, "launch token obtained");
        if let Err(err) = launcher.launch(token) {
            return Err(self.fail_capture(ScanError::GenericError(err.to_string()), &err));
        }

        info!("capture UI launched");
        Ok(())
    }

    /// Consume the platform's capture result.
    ///
    /// `result_code` is the activity result code; anything but
    /// [`RESULT_OK`] is a cancellation. Only the first page is used. With
    /// auto-OCR enabled, recognition runs on the captured image after the
    /// success notification and before this call returns.
    #[instrument(skip(self, payload), fields(pages = payload.as_ref().map(|p| p.pages.len())))]
    pub async fn process_scan_result(
        &self,
        result_code: i32,
        payload: Option<CapturePayload>,
    ) -> CaptureOutcome {
        let payload = match payload {
            Some(payload) if result_code == RESULT_OK => payload,
            _ => {
                info!(result_code, "capture cancelled");
                self.transition(SessionState::Cancelled);
                let outcome = CaptureOutcome::Cancelled;
                self.scan_listener.deliver(&outcome);
                return outcome;
            }
        };

        let Some(uri) = payload.first_page_uri().map(str::to_owned) else {
            warn!("capture result has no page image");
            return self.capture_failed(ScanError::ImageProcessingFailed);
        };

        let capture = Arc::clone(&self.capture);
        let page_uri = uri.clone();
        let decoded = spawn_blocking(move || -> Result<DynamicImage> {
            let bytes = capture
                .load_page(&page_uri)
                .map_err(|err| ScanwerkError::Bridge(err.to_string()))?;
            image::load_from_memory(&bytes).map_err(|err| ScanwerkError::Image(err.to_string()))
        })
        .await;

        let image = match flatten(decoded) {
            Ok(image) => Arc::new(image),
            Err(err) => {
                warn!(uri, error = %err, "captured page could not be decoded");
                return self.capture_failed(ScanError::ImageProcessingFailed);
            }
        };

        let result = ScanResult {
            metadata: Some(ScanMetadata::captured_now(image.width(), image.height())),
            image,
            image_uri: uri,
            extracted_text: None,
            confidence: None,
        };
        info!(
            width = result.image.width(),
            height = result.image.height(),
            "page captured"
        );

        self.transition(SessionState::Captured);
        let outcome = CaptureOutcome::Success(result);
        self.scan_listener.deliver(&outcome);

        if self.config.ocr.auto_ocr {
            if let CaptureOutcome::Success(result) = &outcome {
                self.perform_ocr(Arc::clone(&result.image)).await;
            }
        }
        outcome
    }

    // -- Recognition ----------------------------------------------------------

    /// Recognise text in `image`.
    ///
    /// Succeeds only when the proxy confidence reaches the configured
    /// minimum.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub async fn perform_ocr(&self, image: Arc<DynamicImage>) -> RecognitionOutcome {
        self.transition(SessionState::Recognizing);

        let recognizer = Arc::clone(&self.recognizer);
        let languages = self.config.ocr.languages.clone();
        let recognized = spawn_blocking(move || {
            recognizer
                .recognize(&image, &languages)
                .map_err(|err| ScanwerkError::Ocr(err.to_string()))
        })
        .await;

        let min_confidence = self.config.ocr.min_confidence;
        let outcome = match flatten(recognized) {
            Ok(text) => {
                let confidence = text_confidence(&text);
                if confidence >= min_confidence {
                    info!(confidence, chars = text.chars().count(), "text extracted");
                    RecognitionOutcome::Success { text, confidence }
                } else {
                    warn!(confidence, min_confidence, "recognised text below confidence threshold");
                    RecognitionOutcome::Error(ScanError::OcrProcessingFailed)
                }
            }
            Err(err) => {
                warn!(error = %err, "text recognition failed");
                RecognitionOutcome::Error(ScanError::OcrProcessingFailed)
            }
        };

        self.transition(if outcome.is_success() {
            SessionState::Recognized
        } else {
            SessionState::RecognitionFailed
        });
        self.ocr_listener.deliver(&outcome);
        outcome
    }

    // -- Persistence ----------------------------------------------------------

    /// Encode `image` in the configured format and write it under the image
    /// output directory. `filename` replaces the generated
    /// `scan_<millis>.<ext>` name.
    pub async fn save_as_image(
        &self,
        image: Arc<DynamicImage>,
        filename: Option<&str>,
    ) -> PersistOutcome {
        let exporter = ImageExporter::from_config(&self.config.export);
        self.persist(
            FileOperationType::Image,
            filename,
            exporter.extension(),
            ScanError::FileSaveFailed,
            move |path| exporter.write_to_file(&image, path),
        )
        .await
    }

    /// Write `image` as a one-page PDF, one point per pixel.
    ///
    /// The configured PDF page size is not applied.
    pub async fn save_as_pdf(
        &self,
        image: Arc<DynamicImage>,
        filename: Option<&str>,
    ) -> PersistOutcome {
        let title = self
            .config
            .ui
            .app_name
            .clone()
            .unwrap_or_else(|| "Scanned Document".to_string());
        self.persist(
            FileOperationType::Pdf,
            filename,
            "pdf",
            ScanError::PdfGenerationFailed,
            move |path| PdfWriter::new().with_title(title).write_image_to_file(&image, path),
        )
        .await
    }

    /// Write recognised text as UTF-8.
    pub async fn save_text(&self, text: impl Into<String>, filename: Option<&str>) -> PersistOutcome {
        let text = text.into();
        self.persist(
            FileOperationType::Text,
            filename,
            "txt",
            ScanError::FileSaveFailed,
            move |path| Ok(std::fs::write(path, text.as_bytes())?),
        )
        .await
    }

    #[instrument(skip(self, filename, failure, write))]
    async fn persist<F>(
        &self,
        kind: FileOperationType,
        filename: Option<&str>,
        extension: &'static str,
        failure: ScanError,
        write: F,
    ) -> PersistOutcome
    where
        F: FnOnce(&Path) -> Result<()> + Send + 'static,
    {
        self.transition(SessionState::Persisting);

        let dir = storage::output_dir(
            &self.storage_root,
            self.config.export.output_directory.as_deref(),
            kind,
        );
        let name = filename
            .map(str::to_owned)
            .unwrap_or_else(|| storage::timestamped_file_name(extension));

        let written = spawn_blocking(move || -> Result<PathBuf> {
            std::fs::create_dir_all(&dir)?;
            let path = std::path::absolute(dir.join(name))?;
            write(&path)?;
            Ok(path)
        })
        .await;

        let outcome = match flatten(written) {
            Ok(path) => {
                info!(path = %path.display(), %kind, "file saved");
                PersistOutcome::Success { path, kind }
            }
            Err(err) => {
                warn!(error = %err, %kind, "file could not be saved");
                PersistOutcome::Error(failure)
            }
        };

        self.transition(if outcome.is_success() {
            SessionState::Persisted
        } else {
            SessionState::PersistFailed
        });
        self.file_listener.deliver(&outcome);
        outcome
    }

    // -- Helpers --------------------------------------------------------------

    fn capture_failed(&self, error: ScanError) -> CaptureOutcome {
        self.transition(SessionState::CaptureFailed);
        let outcome = CaptureOutcome::Error(error);
        self.scan_listener.deliver(&outcome);
        outcome
    }

    fn fail_capture(&self, error: ScanError, cause: &dyn std::fmt::Display) -> ScanError {
        warn!(%cause, kind = %error, "scanner could not be started");
        self.capture_failed(error.clone());
        error
    }

    /// Record the new session state. Overlapping operations are not excluded,
    /// so an unexpected transition is logged and accepted.
    fn transition(&self, next: SessionState) {
        let mut guard = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if !guard.can_transition_to(next) {
            debug!(from = ?*guard, to = ?next, "out-of-order session transition");
        }
        *guard = next;
    }
}

/// Scan error for a capture service that refused to produce a launch token.
fn start_failure(err: &BridgeError) -> ScanError {
    match err {
        BridgeError::Initialization(_) => ScanError::ScannerInitializationFailed,
        BridgeError::Unavailable(_) => ScanError::MlKitNotAvailable,
        BridgeError::Request(message) if message.trim().is_empty() => {
            ScanError::GenericError(DEFAULT_START_FAILURE.to_string())
        }
        BridgeError::Request(message) => ScanError::GenericError(message.clone()),
        other => ScanError::GenericError(other.to_string()),
    }
}

/// Fold a blocking task's join failure into the task's own error type.
fn flatten<T>(joined: std::result::Result<Result<T>, JoinError>) -> Result<T> {
    match joined {
        Ok(inner) => inner,
        Err(join) => Err(ScanwerkError::Bridge(format!("background task failed: {join}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_failures_map_to_scan_errors() {
        assert_eq!(
            start_failure(&BridgeError::Initialization("no client".into())),
            ScanError::ScannerInitializationFailed
        );
        assert_eq!(
            start_failure(&BridgeError::Unavailable("document scanner")),
            ScanError::MlKitNotAvailable
        );
        assert_eq!(
            start_failure(&BridgeError::Request("quota exceeded".into())),
            ScanError::GenericError("quota exceeded".into())
        );
        assert_eq!(
            start_failure(&BridgeError::Request(String::new())),
            ScanError::GenericError("Scanner initialization failed".into())
        );
    }

    #[tokio::test]
    async fn join_failures_flatten_into_errors() {
        let joined = spawn_blocking(|| -> Result<()> { panic!("worker died") }).await;
        assert!(matches!(flatten(joined), Err(ScanwerkError::Bridge(_))));
    }
}
