// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanwerk: command-line document scanning demo.
//
// Treats local image files as the pages a capture returned and runs them
// through the scanner: capture, optional text recognition, then image, PDF,
// and text export.

mod console;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use scanwerk_bridge::{FileCaptureService, ImmediateLauncher};
use scanwerk_sdk::{CaptureOutcome, DocumentScanner, ImageFormat, ScannerConfig};

use console::ConsoleListener;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Jpeg,
    Png,
    Webp,
}

impl From<FormatArg> for ImageFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Jpeg => ImageFormat::Jpeg,
            FormatArg::Png => ImageFormat::Png,
            FormatArg::Webp => ImageFormat::Webp,
        }
    }
}

/// Scan document images: recognise text and export image, PDF, and text files.
#[derive(Parser)]
#[command(name = "scanwerk", version)]
struct Args {
    /// Page images, in capture order. Only the first page is processed.
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// Storage root for the output directories.
    #[arg(short, long, env = "SCANWERK_OUTPUT")]
    output: Option<PathBuf>,

    /// Scanner configuration as JSON. Flags below override it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Image export format.
    #[arg(short, long, value_enum)]
    format: Option<FormatArg>,

    /// JPEG quality.
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: Option<u8>,

    /// Maximum pages per capture.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=10))]
    page_limit: Option<u32>,

    /// Recognise text after capture.
    #[arg(long)]
    ocr: bool,

    /// Also save the page as a PDF.
    #[arg(long)]
    pdf: bool,

    /// Save recognised text (implies --ocr).
    #[arg(long)]
    text: bool,

    /// Write the effective configuration to this file and continue.
    #[arg(long)]
    save_config: Option<PathBuf>,
}

impl Args {
    fn scanner_config(&self) -> Result<ScannerConfig, String> {
        let mut config = match &self.config {
            Some(path) => ScannerConfig::load(path).map_err(|e| e.to_string())?,
            None => ScannerConfig::default(),
        };
        if let Some(format) = self.format {
            config.export.image_format = format.into();
        }
        if let Some(quality) = self.quality {
            config.export.image_quality = quality;
        }
        if let Some(limit) = self.page_limit {
            config.page_limit = limit;
        }
        if self.ocr || self.text {
            config.ocr.auto_ocr = true;
        }
        Ok(config.normalized())
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = match args.scanner_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(path) = &args.save_config {
        if let Err(err) = config.save(path) {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    }

    tracing::info!(pages = args.images.len(), "Scanwerk starting");

    let mut builder = DocumentScanner::builder()
        .config(config)
        .capture_service(Arc::new(FileCaptureService::new(args.images.clone())));
    if let Some(root) = &args.output {
        builder = builder.storage_root(root.clone());
    }
    let scanner = builder.build();

    let listener = Arc::new(ConsoleListener::default());
    scanner.set_scan_listener(listener.clone());
    scanner.set_ocr_listener(listener.clone());
    scanner.set_file_listener(listener.clone());

    let launcher = ImmediateLauncher::new();
    if scanner.start_scanning(&launcher).await.is_err() {
        return ExitCode::FAILURE;
    }

    let (result_code, payload) = launcher.take_result();
    let page = match scanner.process_scan_result(result_code, payload).await {
        CaptureOutcome::Success(result) => result,
        CaptureOutcome::Cancelled => return ExitCode::SUCCESS,
        CaptureOutcome::Error(_) => return ExitCode::FAILURE,
    };

    let image = scanner.save_as_image(Arc::clone(&page.image), None).await;
    if let Some(path) = image.path() {
        tracing::info!(
            path = %path.display(),
            mime = scanner.config().export.image_format.mime_type(),
            "page exported"
        );
    }
    let mut ok = image.is_success();
    if args.pdf {
        ok &= scanner
            .save_as_pdf(Arc::clone(&page.image), None)
            .await
            .is_success();
    }
    if args.text {
        match listener.take_text() {
            Some(text) => ok &= scanner.save_text(text, None).await.is_success(),
            None => ok = false,
        }
    }

    if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}
