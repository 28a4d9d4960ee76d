// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanwerk: Core configuration, outcome types, and error definitions shared
// across all crates.

pub mod config;
pub mod error;
pub mod scan_error;
pub mod types;

pub use config::{
    ExportConfig, ExportConfigBuilder, ImageFormat, OcrConfig, OcrConfigBuilder, PdfPageSize,
    ScannerConfig, ScannerConfigBuilder, ScannerMode, UiConfig, UiConfigBuilder,
};
pub use error::ScanwerkError;
pub use scan_error::{ScanError, Severity};
pub use types::*;
