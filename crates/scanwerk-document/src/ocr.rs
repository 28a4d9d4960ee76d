// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Desktop text recognition backed by the `ocrs` crate, a pure-Rust OCR engine
// running neural network models via `rten`.
//
// # Feature Gate
//
// Only compiled with the `ocr` feature:
//
// ```toml
// scanwerk-document = { path = "crates/scanwerk-document", features = ["ocr"] }
// ```
//
// # Model Setup
//
// The engine needs two model files:
//
// - **Detection model** (`text-detection.rten`) locates text regions.
// - **Recognition model** (`text-recognition.rten`) decodes characters.
//
// Running `ocrs-cli` once downloads both into `$XDG_CACHE_HOME/ocrs`
// (typically `~/.cache/ocrs`), which is where `OcrModelPaths::default` looks.

use std::path::{Path, PathBuf};

use image::DynamicImage;
use ocrs::{ImageSource, OcrEngine, OcrEngineParams};
use rten::Model;
use scanwerk_bridge::{BridgeError, BridgeResult, TextRecognitionService};
use tracing::{debug, info, instrument};

const DETECTION_MODEL_FILENAME: &str = "text-detection.rten";
const RECOGNITION_MODEL_FILENAME: &str = "text-recognition.rten";

/// `$XDG_CACHE_HOME/ocrs`, falling back to `~/.cache/ocrs`.
fn default_model_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CACHE_HOME") {
        PathBuf::from(xdg).join("ocrs")
    } else if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".cache").join("ocrs")
    } else {
        PathBuf::from("ocrs-models")
    }
}

/// Locations of the detection and recognition models.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrModelPaths {
    pub detection: PathBuf,
    pub recognition: PathBuf,
}

impl Default for OcrModelPaths {
    fn default() -> Self {
        Self::from_dir(default_model_dir())
    }
}

impl OcrModelPaths {
    /// Expects `dir` to hold `text-detection.rten` and `text-recognition.rten`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            detection: dir.join(DETECTION_MODEL_FILENAME),
            recognition: dir.join(RECOGNITION_MODEL_FILENAME),
        }
    }

    /// Whether both model files exist.
    pub fn available(&self) -> bool {
        self.detection.exists() && self.recognition.exists()
    }

    fn validate(&self) -> BridgeResult<()> {
        for path in [&self.detection, &self.recognition] {
            if !path.exists() {
                return Err(BridgeError::Initialization(format!(
                    "OCR model not found at {}; run `ocrs-cli` once to download models",
                    path.display()
                )));
            }
        }
        Ok(())
    }
}

/// [`TextRecognitionService`] running the `ocrs` engine in-process.
///
/// Model loading is the expensive step; build one recognizer and share it.
/// `ocrs` and `rten` are very slow in debug builds.
pub struct OcrsRecognizer {
    engine: OcrEngine,
}

impl OcrsRecognizer {
    #[instrument(skip_all, fields(
        detection = %paths.detection.display(),
        recognition = %paths.recognition.display(),
    ))]
    pub fn new(paths: &OcrModelPaths) -> BridgeResult<Self> {
        paths.validate()?;

        let load = |path: &Path| {
            Model::load_file(path).map_err(|err| {
                BridgeError::Initialization(format!(
                    "failed to load model from {}: {err}",
                    path.display()
                ))
            })
        };

        info!("Loading OCR models");
        let engine = OcrEngine::new(OcrEngineParams {
            detection_model: Some(load(&paths.detection)?),
            recognition_model: Some(load(&paths.recognition)?),
            ..Default::default()
        })
        .map_err(|err| BridgeError::Initialization(format!("failed to initialise OCR engine: {err}")))?;

        info!("OCR engine ready");
        Ok(Self { engine })
    }

    /// Load models from the default cache directory.
    pub fn with_defaults() -> BridgeResult<Self> {
        Self::new(&OcrModelPaths::default())
    }
}

impl TextRecognitionService for OcrsRecognizer {
    fn name(&self) -> &str {
        "ocrs"
    }

    /// Lines are joined with newlines. The bundled models are Latin-only, so
    /// `languages` is not consulted.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    fn recognize(&self, image: &DynamicImage, languages: &[String]) -> BridgeResult<String> {
        debug!(?languages, "Starting OCR text recognition");

        let rgb = image.to_rgb8();
        let (width, height) = rgb.dimensions();

        let source = ImageSource::from_bytes(rgb.as_raw(), (width, height)).map_err(|err| {
            BridgeError::Recognition(format!(
                "failed to create image source ({width}x{height}): {err}"
            ))
        })?;

        let input = self
            .engine
            .prepare_input(source)
            .map_err(|err| BridgeError::Recognition(format!("OCR preprocessing failed: {err}")))?;

        let text = self
            .engine
            .get_text(&input)
            .map_err(|err| BridgeError::Recognition(format!("OCR text recognition failed: {err}")))?;

        debug!(lines = text.lines().count(), chars = text.chars().count(), "OCR complete");
        Ok(text)
    }
}
