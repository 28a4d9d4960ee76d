// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Internal error type for Scanwerk operations.
//
// These carry technical detail for logs. The orchestrator never hands them to
// callers; it translates each one into the closed `ScanError` set.

use thiserror::Error;

/// Top-level error type for fallible Scanwerk internals.
#[derive(Debug, Error)]
pub enum ScanwerkError {
    #[error("image processing failed: {0}")]
    Image(String),

    #[error("PDF operation failed: {0}")]
    Pdf(String),

    #[error("OCR failed: {0}")]
    Ocr(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("platform bridge error: {0}")]
    Bridge(String),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ScanwerkError>;
