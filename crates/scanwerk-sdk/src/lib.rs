// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scanwerk-sdk: document scanning orchestration.
//
// Wraps an on-device capture service and text recognizer behind
// `DocumentScanner`, which turns a capture result into a decoded page, runs
// recognition on it, and exports it as an image, PDF, or text file. Outcomes
// are returned from each call and mirrored to registered listeners.

pub mod builder;
pub mod confidence;
pub mod listeners;
pub mod scanner;
pub mod storage;

pub use builder::DocumentScannerBuilder;
pub use confidence::text_confidence;
pub use listeners::{FileOperationListener, OcrListener, ScanListener};
pub use scanner::DocumentScanner;

pub use scanwerk_bridge::{
    CapturePayload, DocumentCaptureService, LaunchToken, PageRecord, RESULT_CANCELED, RESULT_OK,
    ScanLauncher, TextRecognitionService,
};
pub use scanwerk_core::{
    CaptureOutcome, ExportConfig, FileOperationType, ImageFormat, OcrConfig, PdfPageSize,
    PersistOutcome, RecognitionOutcome, ScanError, ScanMetadata, ScanResult, ScannerConfig,
    ScannerMode, SessionState, UiConfig,
};
