// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scanwerk-document: output encoders for captured pages.
//
// Provides image export (JPEG, PNG, WEBP), single-page PDF generation sized to
// the page image, and, behind the `ocr` feature, an on-device text recognizer
// for desktop builds backed by `ocrs`.

pub mod export;
pub mod pdf;

#[cfg(feature = "ocr")]
pub mod ocr;

pub use export::ImageExporter;
pub use pdf::writer::PdfWriter;

#[cfg(feature = "ocr")]
pub use ocr::OcrsRecognizer;
