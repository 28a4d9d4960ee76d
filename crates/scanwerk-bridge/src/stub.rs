// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub bridge for desktop/CI builds where the on-device scanner and
// recognizer are unavailable.
//
// Every trait method returns `BridgeError::Unavailable`. The real
// implementations live in the `android` module.

use image::DynamicImage;

use crate::traits::*;

/// No-op bridge returned on non-mobile platforms.
pub struct StubBridge;

impl DocumentCaptureService for StubBridge {
    fn name(&self) -> &str {
        "Desktop (stub)"
    }

    fn start_scan_intent(&self, _request: &CaptureRequest) -> BridgeResult<LaunchToken> {
        tracing::warn!("DocumentCaptureService::start_scan_intent called on stub bridge");
        Err(BridgeError::Unavailable("document scanner"))
    }

    fn load_page(&self, _image_uri: &str) -> BridgeResult<Vec<u8>> {
        Err(BridgeError::Unavailable("document scanner"))
    }
}

impl TextRecognitionService for StubBridge {
    fn name(&self) -> &str {
        "Desktop (stub)"
    }

    fn recognize(&self, _image: &DynamicImage, _languages: &[String]) -> BridgeResult<String> {
        tracing::warn!("TextRecognitionService::recognize called on stub bridge");
        Err(BridgeError::Unavailable("text recognizer"))
    }
}
