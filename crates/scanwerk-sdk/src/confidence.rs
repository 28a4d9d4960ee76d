// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Proxy confidence for recognised text.
//
// Recognition services return plain text without a usable certainty score, so
// the scanner rates text by its share of letters and digits. Noise from a bad
// capture (stray punctuation, box-drawing fragments) scores low.

/// Fraction of Unicode scalar values in `text` that are letters or digits.
///
/// Always in `0.0..=1.0`; empty text scores `0.0`.
pub fn text_confidence(text: &str) -> f32 {
    let (alphanumeric, total) = text.chars().fold((0usize, 0usize), |(alnum, total), c| {
        (alnum + usize::from(c.is_alphanumeric()), total + 1)
    });
    if total == 0 {
        return 0.0;
    }
    (alphanumeric as f32 / total as f32).clamp(0.0, 1.0)
}
