// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module: wrap a captured page in a single-page PDF.

pub mod writer;

pub use writer::PdfWriter;
