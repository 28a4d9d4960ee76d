// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The closed set of failure kinds reported to callers, and the fixed
// human-readable message for each one.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Severity of a failure from the user's perspective. Drives presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Worth trying again as-is (bad lighting, blurry page, busy storage).
    Transient,
    /// The user must grant something first (camera or storage permission).
    ActionRequired,
    /// This device cannot do it.
    Permanent,
}

/// Every failure an orchestrator operation can report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanError {
    CameraPermissionDenied,
    StoragePermissionDenied,
    CameraNotAvailable,
    /// The on-device scanning or recognition service is missing.
    MlKitNotAvailable,
    ScannerInitializationFailed,
    OcrProcessingFailed,
    ImageProcessingFailed,
    FileSaveFailed,
    PdfGenerationFailed,
    /// A failure the fixed kinds do not anticipate.
    GenericError(String),
    /// Reserved for cloud-backed services.
    NetworkError(String),
}

impl ScanError {
    /// Fixed, non-localized message for this kind.
    pub fn message(&self) -> Cow<'_, str> {
        match self {
            Self::CameraPermissionDenied => {
                "Camera permission is required to scan documents".into()
            }
            Self::StoragePermissionDenied => {
                "Storage permission is required to save scanned documents".into()
            }
            Self::CameraNotAvailable => "Camera is not available on this device".into(),
            Self::MlKitNotAvailable => "ML Kit services are not available".into(),
            Self::ScannerInitializationFailed => "Failed to initialize document scanner".into(),
            Self::OcrProcessingFailed => "Failed to extract text from the document".into(),
            Self::ImageProcessingFailed => "Failed to process the scanned image".into(),
            Self::FileSaveFailed => "Failed to save the scanned document".into(),
            Self::PdfGenerationFailed => "Failed to generate PDF from the document".into(),
            Self::GenericError(message) => Cow::Borrowed(message.as_str()),
            Self::NetworkError(message) => format!("Network error: {message}").into(),
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::CameraPermissionDenied | Self::StoragePermissionDenied => {
                Severity::ActionRequired
            }
            Self::CameraNotAvailable | Self::MlKitNotAvailable => Severity::Permanent,
            Self::ScannerInitializationFailed
            | Self::OcrProcessingFailed
            | Self::ImageProcessingFailed
            | Self::FileSaveFailed
            | Self::PdfGenerationFailed
            | Self::GenericError(_)
            | Self::NetworkError(_) => Severity::Transient,
        }
    }

    /// Whether re-invoking the same operation could plausibly succeed.
    /// Nothing retries automatically.
    pub fn is_retriable(&self) -> bool {
        self.severity() == Severity::Transient
    }
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for ScanError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_fixed_kinds() -> Vec<ScanError> {
        vec![
            ScanError::CameraPermissionDenied,
            ScanError::StoragePermissionDenied,
            ScanError::CameraNotAvailable,
            ScanError::MlKitNotAvailable,
            ScanError::ScannerInitializationFailed,
            ScanError::OcrProcessingFailed,
            ScanError::ImageProcessingFailed,
            ScanError::FileSaveFailed,
            ScanError::PdfGenerationFailed,
        ]
    }

    #[test]
    fn every_fixed_kind_has_a_distinct_message() {
        let messages: Vec<String> = all_fixed_kinds()
            .iter()
            .map(|e| e.message().into_owned())
            .collect();
        for (i, m) in messages.iter().enumerate() {
            assert!(!m.is_empty());
            assert!(!messages[i + 1..].contains(m), "duplicate message {m}");
        }
    }

    #[test]
    fn generic_error_echoes_its_message() {
        let err = ScanError::GenericError("scanner busy".into());
        assert_eq!(err.message(), "scanner busy");
        assert_eq!(err.to_string(), "scanner busy");
    }

    #[test]
    fn network_error_is_prefixed() {
        let err = ScanError::NetworkError("timeout".into());
        assert_eq!(err.message(), "Network error: timeout");
    }

    #[test]
    fn fixed_messages() {
        assert_eq!(
            ScanError::FileSaveFailed.message(),
            "Failed to save the scanned document"
        );
        assert_eq!(
            ScanError::OcrProcessingFailed.to_string(),
            "Failed to extract text from the document"
        );
    }

    #[test]
    fn permissions_need_user_action() {
        assert_eq!(
            ScanError::CameraPermissionDenied.severity(),
            Severity::ActionRequired
        );
        assert!(!ScanError::StoragePermissionDenied.is_retriable());
    }

    #[test]
    fn missing_capability_is_permanent() {
        assert_eq!(ScanError::MlKitNotAvailable.severity(), Severity::Permanent);
        assert!(ScanError::OcrProcessingFailed.is_retriable());
    }
}
