//! End-to-end integration tests for pdf2img against a real pdfium library.
//!
//! They are gated behind the `E2E_ENABLED` environment variable so they do
//! not run in CI unless pdfium is installed and the run is explicitly
//! requested. Most tests build a small PDF in memory; the ones named
//! `test_cases_*` also pick up any PDF files dropped into `./test_cases/`.
//!
//! Run with:
//!   E2E_ENABLED=1 PDFIUM_LIB_PATH=/path/to/libpdfium.so cargo test --test e2e -- --nocapture
//!
//! To restrict to a specific test:
//!   E2E_ENABLED=1 cargo test --test e2e test_inspect -- --nocapture

use pdf2img::{
    convert, convert_many, convert_to_dir, inspect, Color, Conversion, ConversionConfig,
    ErrorKind, ImageType, NameTemplate, PageSelection, Pdf2ImgError, Source,
};
use std::path::PathBuf;

// ── Test helpers ─────────────────────────────────────────────────────────────

fn test_cases_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_cases")
}

/// Skip this test if E2E_ENABLED is not set.
macro_rules! e2e_skip_unless_enabled {
    () => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP: set E2E_ENABLED=1 to run e2e tests");
            return;
        }
    }};
}

/// A valid PDF with one page per `(width, height)` entry, in points.
///
/// Each page has a black rectangle over its lower-left quarter (offset by
/// 10pt), so the top-left corner always shows the background.
fn tiny_pdf(sizes: &[(f32, f32)]) -> Vec<u8> {
    let mut objects: Vec<String> = Vec::new();
    let kids: Vec<String> = (0..sizes.len())
        .map(|i| format!("{} 0 R", 3 + 2 * i))
        .collect();

    objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());
    objects.push(format!(
        "<< /Type /Pages /Kids [{}] /Count {} >>",
        kids.join(" "),
        sizes.len()
    ));
    for (i, (w, h)) in sizes.iter().enumerate() {
        let content = format!("0 0 0 rg 10 10 {} {} re f", w / 2.0, h / 2.0);
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] /Contents {} 0 R >>",
            w,
            h,
            4 + 2 * i
        ));
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            content.len(),
            content
        ));
    }

    let mut out = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, obj) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, obj).as_bytes());
    }
    let xref = out.len();
    out.extend_from_slice(
        format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).as_bytes(),
    );
    for off in offsets {
        out.extend_from_slice(format!("{:010} 00000 n \n", off).as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref
        )
        .as_bytes(),
    );
    out
}

fn two_pages() -> Source {
    Source::from(tiny_pdf(&[(200.0, 100.0), (300.0, 400.0)]))
}

fn config(pages: &str) -> ConversionConfig {
    ConversionConfig::builder()
        .scale(1.0)
        .pages(pages.parse::<PageSelection>().unwrap())
        .build()
        .unwrap()
}

// ── Inspect ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_inspect_page_sizes() {
    e2e_skip_unless_enabled!();

    let info = inspect(two_pages(), &ConversionConfig::default())
        .await
        .expect("inspect() should succeed");

    assert_eq!(info.page_count, 2);
    assert!((info.page_sizes[0].width - 200.0).abs() < 0.5);
    assert!((info.page_sizes[1].height - 400.0).abs() < 0.5);
    println!("Info: {:?}", info);
}

#[tokio::test]
async fn test_inspect_not_a_pdf() {
    e2e_skip_unless_enabled!();

    let err = inspect(Source::from(b"hello".to_vec()), &ConversionConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Pdf2ImgError::NotAPdf { .. }));
}

#[tokio::test]
async fn test_inspect_corrupt_pdf() {
    e2e_skip_unless_enabled!();

    let err = inspect(
        Source::from(b"%PDF-1.4\nthis is not a pdf body".to_vec()),
        &ConversionConfig::default(),
    )
    .await
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DocumentLoad, "got {err}");
}

// ── Conversion ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_convert_all_pages_png() {
    e2e_skip_unless_enabled!();

    let cfg = ConversionConfig::builder().scale(2.0).build().unwrap();
    let out = convert(two_pages(), &cfg).await.expect("convert should succeed");

    let dims: Vec<(u32, u32)> = out.pages().iter().map(|p| (p.width, p.height)).collect();
    assert_eq!(dims, vec![(400, 200), (600, 800)]);
    for page in out.pages() {
        let decoded = image::load_from_memory(&page.image.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (page.width, page.height));
    }
}

#[tokio::test]
async fn test_convert_single_page_shapes() {
    e2e_skip_unless_enabled!();

    let first = convert(two_pages(), &config("firstPage")).await.unwrap();
    assert!(matches!(first, Conversion::Single(ref p) if p.page_num == 1 && p.width == 200));

    let last = convert(two_pages(), &config("lastPage")).await.unwrap();
    assert!(matches!(last, Conversion::Single(ref p) if p.page_num == 2 && p.height == 400));

    let list = convert(two_pages(), &config("2,1")).await.unwrap();
    let nums: Vec<usize> = list.pages().iter().map(|p| p.page_num).collect();
    assert_eq!(nums, vec![2, 1]);
}

#[tokio::test]
async fn test_convert_out_of_range() {
    e2e_skip_unless_enabled!();

    let err = convert(two_pages(), &config("3")).await.unwrap_err();
    assert!(err.is_invalid_range());
}

#[tokio::test]
async fn test_convert_max_dimensions() {
    e2e_skip_unless_enabled!();

    let cfg = ConversionConfig::builder()
        .scale(10.0)
        .max_width(150.0)
        .max_height(150.0)
        .build()
        .unwrap();
    let out = convert(two_pages(), &cfg).await.unwrap();
    for page in out.pages() {
        assert!(page.width <= 150 && page.height <= 150, "{page:?}");
        assert!(page.scale < 10.0);
    }
}

#[tokio::test]
async fn test_convert_browser_support_cap() {
    e2e_skip_unless_enabled!();

    let cfg = ConversionConfig::builder()
        .scale(30.0)
        .scale_for_browser_support(true)
        .pages("lastPage".parse::<PageSelection>().unwrap())
        .build()
        .unwrap();
    let out = convert(two_pages(), &cfg).await.unwrap();
    let page = &out.pages()[0];
    assert!(page.height <= 4096, "{}x{}", page.width, page.height);
}

#[tokio::test]
async fn test_convert_jpeg() {
    e2e_skip_unless_enabled!();

    let cfg = ConversionConfig::builder()
        .img_type(ImageType::Jpg)
        .jpeg_quality(80)
        .build()
        .unwrap();
    let out = convert(two_pages(), &cfg).await.unwrap();
    for page in out.pages() {
        assert_eq!(&page.image.bytes[..2], &[0xFF, 0xD8]);
        assert!(page.image.to_data_url().starts_with("data:image/jpeg;base64,"));
    }
}

#[tokio::test]
async fn test_convert_background_colour() {
    e2e_skip_unless_enabled!();

    let cfg = ConversionConfig::builder()
        .scale(1.0)
        .background(Color::rgb(255, 0, 0))
        .pages("firstPage".parse::<PageSelection>().unwrap())
        .build()
        .unwrap();
    let out = convert(two_pages(), &cfg).await.unwrap();
    let img = image::load_from_memory(&out.pages()[0].image.bytes)
        .unwrap()
        .to_rgba8();
    let [r, g, b, _] = img.get_pixel(0, 0).0;
    assert!(r > 200 && g < 50 && b < 50, "corner pixel {:?}", [r, g, b]);
}

#[tokio::test]
async fn test_convert_many_sources() {
    e2e_skip_unless_enabled!();

    let one = Source::from(tiny_pdf(&[(100.0, 100.0)]));
    let out = convert_many([two_pages(), one], &config("all")).await.unwrap();
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].len(), 2);
    assert_eq!(out[1].len(), 1);
}

#[tokio::test]
async fn test_convert_to_dir() {
    e2e_skip_unless_enabled!();

    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("sample.pdf");
    std::fs::write(&pdf, tiny_pdf(&[(100.0, 100.0), (100.0, 100.0)])).unwrap();

    let written = convert_to_dir(&*pdf, dir.path(), &NameTemplate::default(), &config("all"))
        .await
        .unwrap();
    assert_eq!(written.len(), 2);
    assert!(dir.path().join("sample-1.png").exists());
    assert!(dir.path().join("sample-2.png").exists());
}

// ── Real-world files (optional) ──────────────────────────────────────────────

#[tokio::test]
async fn test_cases_first_page_of_each_pdf() {
    e2e_skip_unless_enabled!();

    let Ok(entries) = std::fs::read_dir(test_cases_dir()) else {
        println!("SKIP: no test_cases/ directory");
        return;
    };

    let cfg = ConversionConfig::builder()
        .scale(1.5)
        .max_width(2000.0)
        .pages("firstPage".parse::<PageSelection>().unwrap())
        .build()
        .unwrap();

    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("pdf") {
            continue;
        }
        match convert(path.as_path(), &cfg).await {
            Ok(out) => {
                let page = &out.pages()[0];
                assert!(page.width <= 2000);
                println!(
                    "[{}] ✓  {}x{} px, {} bytes",
                    path.display(),
                    page.width,
                    page.height,
                    page.image.len()
                );
            }
            Err(e) if e.kind() == ErrorKind::DocumentLoad => {
                println!("[{}] skipped: {}", path.display(), e);
            }
            Err(e) => panic!("[{}] {}", path.display(), e),
        }
    }
}
