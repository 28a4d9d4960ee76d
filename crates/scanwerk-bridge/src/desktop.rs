// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// File-backed capture for desktop builds.
//
// There is no camera UI on desktop, so the "scan" is a list of image files
// chosen up front. Launching the token completes the capture immediately and
// the launcher holds the result until the caller feeds it back into the
// scanner, mirroring the activity-result round trip on Android.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, info};

use crate::traits::*;

const FILE_SCHEME: &str = "file://";

/// Capture service that yields pre-selected image files as scanned pages.
#[derive(Debug, Clone)]
pub struct FileCaptureService {
    pages: Vec<PathBuf>,
}

impl FileCaptureService {
    pub fn new<I, P>(pages: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            pages: pages.into_iter().map(Into::into).collect(),
        }
    }
}

/// `file://` locator for a local path, made absolute against the working
/// directory when possible.
pub fn file_uri(path: &Path) -> String {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };
    format!("{FILE_SCHEME}{}", absolute.display())
}

impl DocumentCaptureService for FileCaptureService {
    fn name(&self) -> &str {
        "Desktop (files)"
    }

    fn start_scan_intent(&self, request: &CaptureRequest) -> BridgeResult<LaunchToken> {
        let limit = request.page_limit as usize;
        let uris: Vec<String> = self
            .pages
            .iter()
            .take(limit)
            .map(|p| file_uri(p))
            .collect();
        info!(
            pages = uris.len(),
            skipped = self.pages.len().saturating_sub(limit),
            mode = ?request.mode,
            "desktop capture prepared"
        );
        Ok(LaunchToken::Pages(uris))
    }

    fn load_page(&self, image_uri: &str) -> BridgeResult<Vec<u8>> {
        let path = image_uri.strip_prefix(FILE_SCHEME).unwrap_or(image_uri);
        let bytes = std::fs::read(path)
            .map_err(|err| BridgeError::Io(format!("{path}: {err}")))?;
        debug!(path, bytes = bytes.len(), "page loaded");
        Ok(bytes)
    }
}

/// Launcher that completes the capture as soon as it is launched.
#[derive(Debug, Default)]
pub struct ImmediateLauncher {
    result: Mutex<Option<CapturePayload>>,
}

impl ImmediateLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the pending activity result as `(result code, payload)`.
    ///
    /// An empty capture is reported the way the capture UI reports a back
    /// press: `RESULT_CANCELED` and no payload.
    pub fn take_result(&self) -> (i32, Option<CapturePayload>) {
        let pending = self
            .result
            .lock()
            .map(|mut guard| guard.take())
            .unwrap_or_default();
        match pending {
            Some(payload) if !payload.pages.is_empty() => (RESULT_OK, Some(payload)),
            _ => (RESULT_CANCELED, None),
        }
    }
}

impl ScanLauncher for ImmediateLauncher {
    fn launch(&self, token: LaunchToken) -> BridgeResult<()> {
        match token {
            LaunchToken::Pages(uris) => {
                let payload = CapturePayload {
                    pages: uris.into_iter().map(PageRecord::with_uri).collect(),
                };
                let mut guard = self
                    .result
                    .lock()
                    .map_err(|_| BridgeError::Request("launcher state poisoned".into()))?;
                *guard = Some(payload);
                Ok(())
            }
            #[cfg(target_os = "android")]
            LaunchToken::IntentSender(_) => Err(BridgeError::Unavailable("intent launcher")),
        }
    }
}
