// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic capability traits for the two external services the
// scanner delegates to, plus the request/response shapes that cross them.

use image::DynamicImage;
use scanwerk_core::{ScannerConfig, ScannerMode};
use thiserror::Error;

/// `Activity.RESULT_OK`: the capture UI finished with a result.
pub const RESULT_OK: i32 = -1;

/// `Activity.RESULT_CANCELED`: the user backed out of the capture UI.
pub const RESULT_CANCELED: i32 = 0;

/// Request code used when launching the capture UI.
pub const REQUEST_DOCUMENT_SCAN: i32 = 0x5357_0001; // "SW" + 1

/// Errors raised by a bridge implementation.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The capability does not exist on this platform or device.
    #[error("{0} is not available on this platform")]
    Unavailable(&'static str),

    /// The service client could not be constructed.
    #[error("service initialisation failed: {0}")]
    Initialization(String),

    /// The service accepted the call but reported failure.
    #[error("service request failed: {0}")]
    Request(String),

    #[error("page could not be read: {0}")]
    Io(String),

    #[error("text recognition failed: {0}")]
    Recognition(String),
}

pub type BridgeResult<T> = std::result::Result<T, BridgeError>;

/// Options handed to the capture service when a scan starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureRequest {
    pub mode: ScannerMode,
    pub page_limit: u32,
    pub gallery_import: bool,
}

impl From<&ScannerConfig> for CaptureRequest {
    fn from(config: &ScannerConfig) -> Self {
        Self {
            mode: config.scanner_mode,
            page_limit: config.page_limit,
            gallery_import: config.gallery_import,
        }
    }
}

/// Opaque value the platform uses to show the capture UI.
pub enum LaunchToken {
    /// Desktop: the pages the capture will yield, as locators.
    Pages(Vec<String>),
    /// Android: a global reference to the scanner's `IntentSender`.
    #[cfg(target_os = "android")]
    IntentSender(jni::objects::GlobalRef),
}

impl std::fmt::Debug for LaunchToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pages(pages) => f.debug_tuple("Pages").field(pages).finish(),
            #[cfg(target_os = "android")]
            Self::IntentSender(_) => f.write_str("IntentSender(..)"),
        }
    }
}

/// One page returned by the capture UI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRecord {
    /// Where the corrected page image can be loaded from.
    pub image_uri: Option<String>,
}

impl PageRecord {
    pub fn with_uri(uri: impl Into<String>) -> Self {
        Self {
            image_uri: Some(uri.into()),
        }
    }
}

/// Decoded result payload of a finished capture.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturePayload {
    pub pages: Vec<PageRecord>,
}

impl CapturePayload {
    pub fn first_page_uri(&self) -> Option<&str> {
        self.pages.first().and_then(|p| p.image_uri.as_deref())
    }
}

/// The on-device document capture service.
pub trait DocumentCaptureService: Send + Sync {
    /// Short identifier for logs.
    fn name(&self) -> &str;

    /// Ask the service for a launch token for the given options.
    ///
    /// `Initialization` means the client could not be built; `Request` means
    /// the client refused to produce a token.
    fn start_scan_intent(&self, request: &CaptureRequest) -> BridgeResult<LaunchToken>;

    /// Load the encoded bytes behind a page locator.
    fn load_page(&self, image_uri: &str) -> BridgeResult<Vec<u8>>;
}

/// Hands a launch token to the platform's activity-launch mechanism.
pub trait ScanLauncher {
    fn launch(&self, token: LaunchToken) -> BridgeResult<()>;
}

/// The on-device text recognition service.
pub trait TextRecognitionService: Send + Sync {
    /// Short identifier for logs.
    fn name(&self) -> &str;

    /// Recognise all text in `image`. Languages are hints; engines that
    /// cannot select a script ignore them.
    fn recognize(&self, image: &DynamicImage, languages: &[String]) -> BridgeResult<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_mirrors_config() {
        let config = ScannerConfig::builder()
            .scanner_mode(ScannerMode::Base)
            .page_limit(3)
            .gallery_import(false)
            .build();
        let request = CaptureRequest::from(&config);
        assert_eq!(request.mode, ScannerMode::Base);
        assert_eq!(request.page_limit, 3);
        assert!(!request.gallery_import);
    }

    #[test]
    fn only_the_first_page_is_consulted() {
        let payload = CapturePayload {
            pages: vec![PageRecord::default(), PageRecord::with_uri("file:///b.jpg")],
        };
        assert_eq!(payload.first_page_uri(), None);

        let empty = CapturePayload::default();
        assert_eq!(empty.first_page_uri(), None);
    }
}
