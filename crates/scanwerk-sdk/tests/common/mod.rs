// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Test doubles shared by the orchestrator integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, mpsc};

use image::{DynamicImage, Rgb, RgbImage};
use scanwerk_bridge::{BridgeError, BridgeResult, CaptureRequest, LaunchToken};
use scanwerk_sdk::{
    DocumentCaptureService, DocumentScanner, DocumentScannerBuilder, FileOperationListener,
    FileOperationType, OcrListener, ScanError, ScanLauncher, ScanListener, ScanResult,
    TextRecognitionService,
};
use tokio::sync::oneshot;

pub const PAGE_URI: &str = "content://scans/page-1.jpg";

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

pub fn page_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, _| {
        if x % 2 == 0 { Rgb([240, 240, 240]) } else { Rgb([30, 30, 30]) }
    }))
}

pub fn png_bytes(image: &DynamicImage) -> Vec<u8> {
    let mut out = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
        .expect("encode PNG");
    out
}

// ---------------------------------------------------------------------------
// Capture service
// ---------------------------------------------------------------------------

/// How the fake capture service answers `start_scan_intent`.
#[derive(Debug, Clone)]
pub enum StartBehavior {
    Token,
    Initialization,
    Unavailable,
    Request(String),
}

pub struct FakeCapture {
    start: StartBehavior,
    pages: HashMap<String, Vec<u8>>,
    requests: Mutex<Vec<CaptureRequest>>,
}

impl FakeCapture {
    pub fn new(start: StartBehavior) -> Self {
        Self {
            start,
            pages: HashMap::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_page(mut self, uri: &str, bytes: Vec<u8>) -> Self {
        self.pages.insert(uri.to_string(), bytes);
        self
    }

    pub fn requests(&self) -> Vec<CaptureRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl DocumentCaptureService for FakeCapture {
    fn name(&self) -> &str {
        "fake capture"
    }

    fn start_scan_intent(&self, request: &CaptureRequest) -> BridgeResult<LaunchToken> {
        self.requests.lock().unwrap().push(*request);
        match &self.start {
            StartBehavior::Token => Ok(LaunchToken::Pages(self.pages.keys().cloned().collect())),
            StartBehavior::Initialization => {
                Err(BridgeError::Initialization("client build failed".into()))
            }
            StartBehavior::Unavailable => Err(BridgeError::Unavailable("document scanner")),
            StartBehavior::Request(msg) => Err(BridgeError::Request(msg.clone())),
        }
    }

    fn load_page(&self, image_uri: &str) -> BridgeResult<Vec<u8>> {
        self.pages
            .get(image_uri)
            .cloned()
            .ok_or_else(|| BridgeError::Io(format!("no such page {image_uri}")))
    }
}

// ---------------------------------------------------------------------------
// Launchers
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct CountingLauncher {
    pub launched: Mutex<usize>,
}

impl ScanLauncher for CountingLauncher {
    fn launch(&self, _token: LaunchToken) -> BridgeResult<()> {
        *self.launched.lock().unwrap() += 1;
        Ok(())
    }
}

pub struct RejectingLauncher;

impl ScanLauncher for RejectingLauncher {
    fn launch(&self, _token: LaunchToken) -> BridgeResult<()> {
        Err(BridgeError::Request("no activity to launch from".into()))
    }
}

// ---------------------------------------------------------------------------
// Recognizers
// ---------------------------------------------------------------------------

/// Returns a fixed answer for every image.
pub struct FixedRecognizer {
    answer: Result<String, String>,
    pub calls: Mutex<Vec<(u32, u32, Vec<String>)>>,
}

impl FixedRecognizer {
    pub fn text(text: &str) -> Self {
        Self {
            answer: Ok(text.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            answer: Err(message.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl TextRecognitionService for FixedRecognizer {
    fn name(&self) -> &str {
        "fixed recognizer"
    }

    fn recognize(&self, image: &DynamicImage, languages: &[String]) -> BridgeResult<String> {
        self.calls
            .lock()
            .unwrap()
            .push((image.width(), image.height(), languages.to_vec()));
        self.answer.clone().map_err(BridgeError::Recognition)
    }
}

pub struct PanickingRecognizer;

impl TextRecognitionService for PanickingRecognizer {
    fn name(&self) -> &str {
        "panicking recognizer"
    }

    fn recognize(&self, _image: &DynamicImage, _languages: &[String]) -> BridgeResult<String> {
        panic!("recognizer crashed");
    }
}

/// Blocks inside `recognize` until released, so a test can act while
/// recognition is in flight.
pub struct GatedRecognizer {
    text: String,
    entered: Mutex<Option<oneshot::Sender<()>>>,
    release: Mutex<mpsc::Receiver<()>>,
}

pub struct Gate {
    pub entered: oneshot::Receiver<()>,
    pub release: mpsc::Sender<()>,
}

impl GatedRecognizer {
    pub fn new(text: &str) -> (Self, Gate) {
        let (entered_tx, entered_rx) = oneshot::channel();
        let (release_tx, release_rx) = mpsc::channel();
        (
            Self {
                text: text.to_string(),
                entered: Mutex::new(Some(entered_tx)),
                release: Mutex::new(release_rx),
            },
            Gate {
                entered: entered_rx,
                release: release_tx,
            },
        )
    }
}

impl TextRecognitionService for GatedRecognizer {
    fn name(&self) -> &str {
        "gated recognizer"
    }

    fn recognize(&self, _image: &DynamicImage, _languages: &[String]) -> BridgeResult<String> {
        if let Some(tx) = self.entered.lock().unwrap().take() {
            let _ = tx.send(());
        }
        self.release
            .lock()
            .unwrap()
            .recv()
            .map_err(|_| BridgeError::Recognition("gate dropped".into()))?;
        Ok(self.text.clone())
    }
}

// ---------------------------------------------------------------------------
// Recording listener
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    ScanSuccess { width: u32, height: u32, uri: String },
    ScanError(ScanError),
    ScanCancelled,
    TextExtracted { text: String, confidence: f32 },
    OcrError(ScanError),
    FileSaved { path: PathBuf, kind: FileOperationType },
    FileError(ScanError),
}

/// Records every notification, in order, from all three listener roles.
#[derive(Default)]
pub struct Recorder {
    events: Mutex<Vec<Event>>,
}

impl Recorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

impl ScanListener for Recorder {
    fn on_scan_success(&self, result: &ScanResult) {
        self.push(Event::ScanSuccess {
            width: result.image.width(),
            height: result.image.height(),
            uri: result.image_uri.clone(),
        });
    }

    fn on_scan_error(&self, error: &ScanError) {
        self.push(Event::ScanError(error.clone()));
    }

    fn on_scan_cancelled(&self) {
        self.push(Event::ScanCancelled);
    }
}

impl OcrListener for Recorder {
    fn on_text_extracted(&self, text: &str, confidence: f32) {
        self.push(Event::TextExtracted {
            text: text.to_string(),
            confidence,
        });
    }

    fn on_ocr_error(&self, error: &ScanError) {
        self.push(Event::OcrError(error.clone()));
    }
}

impl FileOperationListener for Recorder {
    fn on_file_saved(&self, path: &Path, kind: FileOperationType) {
        self.push(Event::FileSaved {
            path: path.to_path_buf(),
            kind,
        });
    }

    fn on_file_operation_error(&self, error: &ScanError) {
        self.push(Event::FileError(error.clone()));
    }
}

/// Register `recorder` for every listener role.
pub fn listen_all(scanner: &DocumentScanner, recorder: &Arc<Recorder>) {
    scanner.set_scan_listener(recorder.clone());
    scanner.set_ocr_listener(recorder.clone());
    scanner.set_file_listener(recorder.clone());
}

/// Builder wired with a capture service that serves one page at
/// [`PAGE_URI`] and the given recognizer.
pub fn scanner_with(
    recognizer: Arc<dyn TextRecognitionService>,
    root: &Path,
) -> DocumentScannerBuilder {
    let capture = FakeCapture::new(StartBehavior::Token)
        .with_page(PAGE_URI, png_bytes(&page_image(32, 24)));
    DocumentScanner::builder()
        .capture_service(Arc::new(capture))
        .recognition_service(recognizer)
        .storage_root(root)
}
