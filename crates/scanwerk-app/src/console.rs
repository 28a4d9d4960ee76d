// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Listener that reports scanner notifications on stdout/stderr.

use std::path::Path;
use std::sync::Mutex;

use scanwerk_core::Severity;
use scanwerk_sdk::{
    FileOperationListener, FileOperationType, OcrListener, ScanError, ScanListener, ScanResult,
};

fn report(stage: &str, error: &ScanError) {
    let hint = match error.severity() {
        Severity::Transient => " (try again)",
        Severity::ActionRequired => " (grant the permission and retry)",
        Severity::Permanent => "",
    };
    eprintln!("{stage} failed: {error}{hint}");
}

/// Prints every notification and keeps the last recognised text so the
/// caller can save it.
#[derive(Default)]
pub struct ConsoleListener {
    last_text: Mutex<Option<String>>,
}

impl ConsoleListener {
    pub fn take_text(&self) -> Option<String> {
        self.last_text.lock().ok().and_then(|mut text| text.take())
    }
}

impl ScanListener for ConsoleListener {
    fn on_scan_success(&self, result: &ScanResult) {
        println!(
            "captured  {} ({}x{})",
            result.image_uri,
            result.image.width(),
            result.image.height()
        );
    }

    fn on_scan_error(&self, error: &ScanError) {
        report("capture", error);
    }

    fn on_scan_cancelled(&self) {
        println!("capture cancelled");
    }
}

impl OcrListener for ConsoleListener {
    fn on_text_extracted(&self, text: &str, confidence: f32) {
        println!("text      {} chars, confidence {confidence:.2}", text.chars().count());
        for line in text.lines() {
            println!("  | {line}");
        }
        if let Ok(mut last) = self.last_text.lock() {
            *last = Some(text.to_string());
        }
    }

    fn on_ocr_error(&self, error: &ScanError) {
        report("recognition", error);
    }
}

impl FileOperationListener for ConsoleListener {
    fn on_file_saved(&self, path: &Path, kind: FileOperationType) {
        println!("saved     {kind:<5} {}", path.display());
    }

    fn on_file_operation_error(&self, error: &ScanError) {
        report("save", error);
    }
}
