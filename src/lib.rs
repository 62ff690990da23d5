//! # pdf2img
//!
//! Convert PDF pages to PNG or JPEG images.
//!
//! Pages are painted by pdfium (through the [`RenderBackend`] trait, so any
//! renderer can stand in), scaled with an optional shrink-only fit against a
//! maximum width and height, and encoded concurrently while results keep the
//! order the caller asked for.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input     bytes, local file or URL → memory
//!  ├─ 2. Open      pdfium loads the document (spawn_blocking)
//!  ├─ 3. Select    resolve 'all' / 'firstPage' / '3' / '1..4' against the page count
//!  ├─ 4. Fit       shrink-only scale against max width / height
//!  ├─ 5. Render    paint each page onto an RGBA surface (concurrent)
//!  └─ 6. Encode    PNG or JPEG bytes, in selection order
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2img::{convert, Conversion, ConversionConfig, ImageType};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder()
//!         .scale(2.0)
//!         .max_width(2000.0)
//!         .img_type(ImageType::Jpg)
//!         .build()?;
//!     match convert("document.pdf", &config).await? {
//!         Conversion::Single(page) => println!("{}", page.image.to_data_url()),
//!         Conversion::Pages(pages) => {
//!             for page in pages {
//!                 eprintln!("page {}: {}x{}", page.page_num, page.width, page.height);
//!             }
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2img` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! pdf2img = { version = "0.1", default-features = false }
//! ```
//!
//! ## pdfium
//!
//! The default backend binds to a pdfium shared library at runtime, looked up
//! at `PDFIUM_LIB_PATH`, then in the working directory, then system-wide.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod color;
pub mod config;
pub mod convert;
pub mod error;
pub mod naming;
pub mod output;
pub mod pages;
pub mod pipeline;
pub mod progress;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use color::Color;
pub use config::{
    ConfigSummary, ConversionConfig, ConversionConfigBuilder, DocumentOptions, ImageType,
    RenderIntent,
};
pub use convert::{
    convert, convert_each, convert_from_bytes, convert_many, convert_many_to_dir, convert_sync,
    convert_to_dir, inspect,
};
pub use error::{ErrorKind, Pdf2ImgError};
pub use naming::NameTemplate;
pub use output::{Conversion, DocumentInfo, EncodedImage, RenderedPage, WrittenImage};
pub use pages::{PageSelection, PageToken};
pub use pipeline::backend::{DocumentHandle, PdfiumBackend, RenderBackend};
pub use pipeline::input::Source;
pub use pipeline::viewport::{compute_scale, PageSize, ScaleOptions, Viewport};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use stream::{convert_stream, convert_stream_from_bytes, PageStream};
