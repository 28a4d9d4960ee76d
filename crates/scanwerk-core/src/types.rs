// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Outcome types returned by the scanner operations, plus the per-session
// state machine.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::scan_error::ScanError;

/// Format tag recorded for every captured page.
pub const CAPTURE_FORMAT_TAG: &str = "JPEG";

/// Descriptive data about a captured page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanMetadata {
    pub width: u32,
    pub height: u32,
    pub format: String,
    /// Capture time in milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// Capture quality score, when the service reports one.
    pub quality: Option<f32>,
}

impl ScanMetadata {
    /// Metadata for a page captured now.
    pub fn captured_now(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            format: CAPTURE_FORMAT_TAG.to_string(),
            timestamp: Utc::now().timestamp_millis(),
            quality: None,
        }
    }
}

/// A successfully captured page.
#[derive(Debug, Clone)]
pub struct ScanResult {
    /// Decoded page image, shared so recognition and export can reuse it.
    pub image: Arc<DynamicImage>,
    /// Locator the capture service returned for this page.
    pub image_uri: String,
    pub extracted_text: Option<String>,
    pub confidence: Option<f32>,
    pub metadata: Option<ScanMetadata>,
}

/// What kind of file a persist operation produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileOperationType {
    Image,
    Pdf,
    Text,
}

impl std::fmt::Display for FileOperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            Self::Image => "IMAGE",
            Self::Pdf => "PDF",
            Self::Text => "TEXT",
        })
    }
}

/// Result of consuming a capture result.
#[derive(Debug, Clone)]
pub enum CaptureOutcome {
    Success(ScanResult),
    Error(ScanError),
    Cancelled,
}

impl CaptureOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Result of a text recognition run.
#[derive(Debug, Clone, PartialEq)]
pub enum RecognitionOutcome {
    Success { text: String, confidence: f32 },
    Error(ScanError),
}

impl RecognitionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Result of writing a page to disk.
#[derive(Debug, Clone, PartialEq)]
pub enum PersistOutcome {
    Success {
        path: PathBuf,
        kind: FileOperationType,
    },
    Error(ScanError),
}

impl PersistOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Saved path, if the write succeeded.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Success { path, .. } => Some(path),
            Self::Error(_) => None,
        }
    }
}

/// Lifecycle of one scan session.
///
/// `Idle → Capturing → {Captured, Cancelled, CaptureFailed}
///   → [Recognizing → {Recognized, RecognitionFailed}]
///   → [Persisting → {Persisted, PersistFailed}]`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    #[default]
    Idle,
    Capturing,
    Captured,
    Cancelled,
    CaptureFailed,
    Recognizing,
    Recognized,
    RecognitionFailed,
    Persisting,
    Persisted,
    PersistFailed,
}

impl SessionState {
    /// Whether the session may move from `self` to `next`.
    ///
    /// Terminal states can always restart a capture; there is no automatic
    /// retry, so a failed step only moves forward when the caller re-invokes.
    pub fn can_transition_to(self, next: SessionState) -> bool {
        use SessionState::*;
        match (self, next) {
            (_, Capturing) => !matches!(self, Capturing),
            (Capturing, Captured | Cancelled | CaptureFailed) => true,
            (Captured | Recognized | RecognitionFailed | Persisted | PersistFailed, Recognizing) => {
                true
            }
            (Recognizing, Recognized | RecognitionFailed) => true,
            (
                Captured | Recognized | RecognitionFailed | Persisted | PersistFailed,
                Persisting,
            ) => true,
            (Persisting, Persisted | PersistFailed) => true,
            _ => false,
        }
    }

    /// States in which control has returned to the caller.
    pub fn is_terminal(self) -> bool {
        !matches!(
            self,
            SessionState::Capturing | SessionState::Recognizing | SessionState::Persisting
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_uses_fixed_format_tag() {
        let meta = ScanMetadata::captured_now(640, 480);
        assert_eq!(meta.format, "JPEG");
        assert_eq!((meta.width, meta.height), (640, 480));
        assert!(meta.timestamp > 0);
        assert!(meta.quality.is_none());
    }

    #[test]
    fn persist_outcome_exposes_saved_path_only_on_success() {
        let saved = PersistOutcome::Success {
            path: PathBuf::from("/data/ScannedDocs/scan_1.jpeg"),
            kind: FileOperationType::Image,
        };
        assert_eq!(saved.path(), Some(&PathBuf::from("/data/ScannedDocs/scan_1.jpeg")));
        assert_eq!(PersistOutcome::Error(ScanError::FileSaveFailed).path(), None);
    }

    #[test]
    fn happy_path_transitions() {
        use SessionState::*;
        let path = [Idle, Capturing, Captured, Recognizing, Recognized, Persisting, Persisted];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{:?} -> {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn cannot_recognize_without_a_capture() {
        use SessionState::*;
        assert!(!Idle.can_transition_to(Recognizing));
        assert!(!Cancelled.can_transition_to(Persisting));
        assert!(!CaptureFailed.can_transition_to(Recognizing));
    }

    #[test]
    fn terminal_states_allow_a_new_capture() {
        use SessionState::*;
        for state in [Idle, Captured, Cancelled, CaptureFailed, Recognized, PersistFailed] {
            assert!(state.is_terminal());
            assert!(state.can_transition_to(Capturing));
        }
        assert!(!Capturing.can_transition_to(Capturing));
    }

    #[test]
    fn operation_types_render_uppercase() {
        assert_eq!(FileOperationType::Pdf.to_string(), "PDF");
        assert_eq!(FileOperationType::Text.to_string(), "TEXT");
    }
}
