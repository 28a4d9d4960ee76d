// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanwerk: capture and recognition service bridges.
//
// The orchestrator only sees the traits in `traits`. Android binds them to
// the on-device ML Kit scanner and text recognizer through JNI; desktop
// builds get a file-backed capture service and a stub that reports every
// capability as unavailable.

use std::sync::Arc;

pub mod desktop;
pub mod traits;

#[cfg(target_os = "android")]
pub mod android;

#[cfg(not(target_os = "android"))]
pub mod stub;

pub use desktop::{FileCaptureService, ImmediateLauncher, file_uri};
pub use traits::*;

/// Capture service for the target operating system.
pub fn platform_capture_service() -> Arc<dyn DocumentCaptureService> {
    #[cfg(target_os = "android")]
    {
        Arc::new(android::AndroidCaptureService::new())
    }
    #[cfg(not(target_os = "android"))]
    {
        Arc::new(stub::StubBridge)
    }
}

/// Text recognition service for the target operating system.
pub fn platform_recognition_service() -> Arc<dyn TextRecognitionService> {
    #[cfg(target_os = "android")]
    {
        Arc::new(android::MlKitTextRecognizer::new())
    }
    #[cfg(not(target_os = "android"))]
    {
        Arc::new(stub::StubBridge)
    }
}
