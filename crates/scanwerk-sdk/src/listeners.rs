// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Listener traits and the slots the scanner keeps them in.
//
// A slot holds at most one listener. Setting it replaces the previous one,
// and the slot is read when an outcome is delivered, not when the operation
// starts: a listener registered while work is in flight receives that work's
// outcome.

use std::path::Path;
use std::sync::{Arc, RwLock};

use scanwerk_core::{
    CaptureOutcome, FileOperationType, PersistOutcome, RecognitionOutcome, ScanError, ScanResult,
};

/// Receives capture outcomes.
pub trait ScanListener: Send + Sync {
    fn on_scan_success(&self, result: &ScanResult);
    fn on_scan_error(&self, error: &ScanError);
    fn on_scan_cancelled(&self);
}

/// Receives text recognition outcomes.
pub trait OcrListener: Send + Sync {
    fn on_text_extracted(&self, text: &str, confidence: f32);
    fn on_ocr_error(&self, error: &ScanError);
}

/// Receives persist outcomes.
pub trait FileOperationListener: Send + Sync {
    fn on_file_saved(&self, path: &Path, kind: FileOperationType);
    fn on_file_operation_error(&self, error: &ScanError);
}

/// Overwrite-on-set holder for one listener.
pub(crate) struct ListenerSlot<L: ?Sized> {
    current: RwLock<Option<Arc<L>>>,
}

impl<L: ?Sized> ListenerSlot<L> {
    pub(crate) fn new() -> Self {
        Self {
            current: RwLock::new(None),
        }
    }

    pub(crate) fn set(&self, listener: Option<Arc<L>>) {
        match self.current.write() {
            Ok(mut guard) => *guard = listener,
            Err(poisoned) => *poisoned.into_inner() = listener,
        }
    }

    /// The listener registered right now. The lock is released before the
    /// caller invokes it, so listeners may re-register from a callback.
    pub(crate) fn current(&self) -> Option<Arc<L>> {
        match self.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl ListenerSlot<dyn ScanListener> {
    pub(crate) fn deliver(&self, outcome: &CaptureOutcome) {
        let Some(listener) = self.current() else {
            return;
        };
        match outcome {
            CaptureOutcome::Success(result) => listener.on_scan_success(result),
            CaptureOutcome::Error(error) => listener.on_scan_error(error),
            CaptureOutcome::Cancelled => listener.on_scan_cancelled(),
        }
    }
}

impl ListenerSlot<dyn OcrListener> {
    pub(crate) fn deliver(&self, outcome: &RecognitionOutcome) {
        let Some(listener) = self.current() else {
            return;
        };
        match outcome {
            RecognitionOutcome::Success { text, confidence } => {
                listener.on_text_extracted(text, *confidence)
            }
            RecognitionOutcome::Error(error) => listener.on_ocr_error(error),
        }
    }
}

impl ListenerSlot<dyn FileOperationListener> {
    pub(crate) fn deliver(&self, outcome: &PersistOutcome) {
        let Some(listener) = self.current() else {
            return;
        };
        match outcome {
            PersistOutcome::Success { path, kind } => listener.on_file_saved(path, *kind),
            PersistOutcome::Error(error) => listener.on_file_operation_error(error),
        }
    }
}
