// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the export paths in scanwerk-document: encoding a
// synthetic page in each image format and wrapping it in a PDF.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{DynamicImage, Rgb, RgbImage};

use scanwerk_core::ImageFormat;
use scanwerk_document::{ImageExporter, PdfWriter};

/// A 600x800 page: light background with dark horizontal "text" bands.
fn synthetic_page() -> DynamicImage {
    let img = RgbImage::from_fn(600, 800, |x, y| {
        let in_margin = !(40..560).contains(&x);
        if !in_margin && (y / 12) % 3 == 0 && (x / 7) % 5 != 0 {
            Rgb([25, 25, 30])
        } else {
            Rgb([245, 243, 238])
        }
    });
    DynamicImage::ImageRgb8(img)
}

fn bench_image_export(c: &mut Criterion) {
    let page = synthetic_page();
    let mut group = c.benchmark_group("image_export (600x800)");
    for format in [ImageFormat::Jpeg, ImageFormat::Png, ImageFormat::Webp] {
        let exporter = ImageExporter::new(format, 90);
        group.bench_function(format.extension(), |b| {
            b.iter(|| black_box(exporter.encode(black_box(&page))));
        });
    }
    group.finish();
}

fn bench_pdf_export(c: &mut Criterion) {
    let page = synthetic_page();
    let writer = PdfWriter::new();
    c.bench_function("pdf_export (600x800)", |b| {
        b.iter(|| black_box(writer.create_from_image(black_box(&page))));
    });
}

criterion_group!(benches, bench_image_export, bench_pdf_export);
criterion_main!(benches);
