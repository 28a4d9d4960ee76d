// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Output locations for persisted pages.
//
// Files land in `<root>/<subdir>/<name>`. The subdirectory is the configured
// output directory when set, otherwise a per-kind default. Generated names are
// `scan_<epoch-millis>.<ext>`.

use std::path::{Path, PathBuf};

use chrono::Utc;
use scanwerk_core::FileOperationType;

/// Default subdirectory for exported images.
pub const IMAGE_SUBDIR: &str = "ScannedDocs";
/// Default subdirectory for generated PDFs.
pub const PDF_SUBDIR: &str = "ScannedDocsPdf";
/// Default subdirectory for recognised text.
pub const TEXT_SUBDIR: &str = "ScannedDocsText";

/// Application storage root on desktop.
///
/// `$XDG_DATA_HOME/scanwerk`, then `~/.local/share/scanwerk`, then
/// `/tmp/scanwerk`. Mobile hosts pass their files directory to the builder
/// instead.
pub fn default_storage_root() -> PathBuf {
    data_home().join("scanwerk")
}

fn data_home() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(xdg);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".local").join("share");
    }
    PathBuf::from("/tmp")
}

pub fn default_subdir(kind: FileOperationType) -> &'static str {
    match kind {
        FileOperationType::Image => IMAGE_SUBDIR,
        FileOperationType::Pdf => PDF_SUBDIR,
        FileOperationType::Text => TEXT_SUBDIR,
    }
}

/// Directory a file of `kind` is written to. Blank configured names fall
/// back to the default.
pub fn output_dir(root: &Path, configured: Option<&str>, kind: FileOperationType) -> PathBuf {
    let subdir = configured
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| default_subdir(kind));
    root.join(subdir)
}

/// `scan_<epoch-millis>.<extension>`.
pub fn timestamped_file_name(extension: &str) -> String {
    format!("scan_{}.{extension}", Utc::now().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_kind_defaults() {
        let root = Path::new("/data");
        assert_eq!(
            output_dir(root, None, FileOperationType::Image),
            PathBuf::from("/data/ScannedDocs")
        );
        assert_eq!(
            output_dir(root, None, FileOperationType::Pdf),
            PathBuf::from("/data/ScannedDocsPdf")
        );
        assert_eq!(
            output_dir(root, None, FileOperationType::Text),
            PathBuf::from("/data/ScannedDocsText")
        );
    }

    #[test]
    fn configured_directory_is_shared_by_all_kinds() {
        let root = Path::new("/data");
        for kind in [FileOperationType::Image, FileOperationType::Pdf, FileOperationType::Text] {
            assert_eq!(output_dir(root, Some("Receipts"), kind), PathBuf::from("/data/Receipts"));
        }
    }

    #[test]
    fn blank_directory_uses_default() {
        assert_eq!(
            output_dir(Path::new("/data"), Some("  "), FileOperationType::Image),
            PathBuf::from("/data/ScannedDocs")
        );
    }

    #[test]
    fn generated_names_carry_timestamp_and_extension() {
        let name = timestamped_file_name("webp");
        let millis = name
            .strip_prefix("scan_")
            .and_then(|rest| rest.strip_suffix(".webp"))
            .expect("shape");
        assert!(millis.parse::<i64>().expect("millis") > 0);
    }

    #[test]
    fn default_root_ends_with_app_dir() {
        assert!(default_storage_root().ends_with("scanwerk"));
    }
}
