//! The rendering collaborator: document loading, page geometry and painting.
//!
//! The orchestrator only depends on the two traits here, so any renderer can
//! stand in for pdfium (tests use an in-memory fake).
//!
//! ## Why a global lock around pdfium?
//!
//! pdfium keeps process-global state and is not safe to drive from several
//! threads at once. Every pdfium call happens inside `spawn_blocking` while
//! holding [`PDFIUM_LOCK`]; the bound library and the opened document never
//! leave that critical section. Encoding runs outside the lock, so pages
//! still overlap on the expensive PNG/JPEG step.

use crate::color::Color;
use crate::config::{DocumentOptions, RenderIntent};
use crate::error::Pdf2ImgError;
use crate::pipeline::viewport::{PageSize, Viewport};
use image::RgbaImage;
use pdfium_render::prelude::*;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Loads documents from PDF bytes.
pub trait RenderBackend: Send + Sync {
    /// Open a document. `name` is only used in error messages.
    ///
    /// Blocking; called from `spawn_blocking`.
    fn load_document(
        &self,
        bytes: Arc<[u8]>,
        name: &str,
        options: &DocumentOptions,
    ) -> Result<Arc<dyn DocumentHandle>, Pdf2ImgError>;
}

/// An opened document.
///
/// Page numbers are 1-based. Methods are blocking.
pub trait DocumentHandle: Send + Sync {
    fn page_count(&self) -> usize;

    /// Natural size of `page` in PDF points.
    fn page_size(&self, page: usize) -> Result<PageSize, Pdf2ImgError>;

    /// Paint `page` into a fresh surface sized to `viewport`.
    fn render(
        &self,
        page: usize,
        viewport: &Viewport,
        background: Color,
        intent: RenderIntent,
    ) -> Result<RgbaImage, Pdf2ImgError>;

    /// The viewport of `page` at `scale`.
    fn viewport(&self, page: usize, scale: f32) -> Result<Viewport, Pdf2ImgError> {
        Ok(Viewport::at_scale(self.page_size(page)?, scale))
    }
}

// ── pdfium ──────────────────────────────────────────────────────────────

static PDFIUM_LOCK: Mutex<()> = Mutex::new(());

/// [`RenderBackend`] backed by the pdfium C++ library.
#[derive(Debug, Clone)]
pub struct PdfiumBackend {
    library_path: Option<PathBuf>,
}

impl Default for PdfiumBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfiumBackend {
    /// Bind from `PDFIUM_LIB_PATH`, the working directory, or the system library.
    pub fn new() -> Self {
        Self {
            library_path: std::env::var_os("PDFIUM_LIB_PATH").map(PathBuf::from),
        }
    }

    /// Bind to the library file at `path` first.
    pub fn with_library_path(path: impl Into<PathBuf>) -> Self {
        Self {
            library_path: Some(path.into()),
        }
    }

    /// Check that a pdfium library can be bound.
    pub fn check(&self) -> Result<(), Pdf2ImgError> {
        self.with_pdfium(|_| Ok(()))
    }

    fn bind(&self) -> Result<Pdfium, Pdf2ImgError> {
        let bindings = match &self.library_path {
            Some(path) => Pdfium::bind_to_library(path).or_else(|e| {
                debug!("pdfium at {} unavailable: {}", path.display(), e);
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            }),
            None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./")),
        }
        .or_else(|_| Pdfium::bind_to_system_library())
        .map_err(|e| Pdf2ImgError::PdfiumBindingFailed(e.to_string()))?;

        Ok(Pdfium::new(bindings))
    }

    /// Run `f` with a bound pdfium while holding the global lock.
    fn with_pdfium<T>(
        &self,
        f: impl FnOnce(&Pdfium) -> Result<T, Pdf2ImgError>,
    ) -> Result<T, Pdf2ImgError> {
        let _guard = PDFIUM_LOCK
            .lock()
            .map_err(|_| Pdf2ImgError::Internal("pdfium lock poisoned".into()))?;
        let pdfium = self.bind()?;
        f(&pdfium)
    }
}

fn map_load_error(err: PdfiumError, name: &str, had_password: bool) -> Pdf2ImgError {
    let err_str = format!("{:?}", err);
    if err_str.contains("Password") || err_str.contains("password") {
        if had_password {
            Pdf2ImgError::WrongPassword {
                source_name: name.to_string(),
            }
        } else {
            Pdf2ImgError::PasswordRequired {
                source_name: name.to_string(),
            }
        }
    } else {
        Pdf2ImgError::CorruptPdf {
            source_name: name.to_string(),
            detail: err_str,
        }
    }
}

impl RenderBackend for PdfiumBackend {
    fn load_document(
        &self,
        bytes: Arc<[u8]>,
        name: &str,
        options: &DocumentOptions,
    ) -> Result<Arc<dyn DocumentHandle>, Pdf2ImgError> {
        if !options.extra.is_empty() {
            debug!(
                "pdfium backend ignores document options: {:?}",
                options.extra.keys().collect::<Vec<_>>()
            );
        }
        let password = options.password.clone();

        let page_sizes = self.with_pdfium(|pdfium| {
            let document = pdfium
                .load_pdf_from_byte_slice(&bytes, password.as_deref())
                .map_err(|e| map_load_error(e, name, password.is_some()))?;
            Ok(document
                .pages()
                .iter()
                .map(|page| PageSize {
                    width: page.width().value,
                    height: page.height().value,
                })
                .collect::<Vec<_>>())
        })?;

        info!("PDF loaded: {} ({} pages)", name, page_sizes.len());

        Ok(Arc::new(PdfiumDocument {
            backend: self.clone(),
            bytes,
            name: name.to_string(),
            password,
            page_sizes,
        }))
    }
}

/// A document opened by [`PdfiumBackend`].
///
/// Holds the raw bytes and reopens them inside the lock for each render;
/// pdfium document handles borrow the library binding and cannot be stored.
struct PdfiumDocument {
    backend: PdfiumBackend,
    bytes: Arc<[u8]>,
    name: String,
    password: Option<String>,
    page_sizes: Vec<PageSize>,
}

impl PdfiumDocument {
    fn check_page(&self, page: usize) -> Result<u16, Pdf2ImgError> {
        if page == 0 || page > self.page_sizes.len() {
            return Err(Pdf2ImgError::PageOutOfRange {
                page,
                total: self.page_sizes.len(),
            });
        }
        u16::try_from(page - 1).map_err(|_| Pdf2ImgError::RenderFailed {
            page,
            detail: "page index exceeds pdfium's u16 limit".into(),
        })
    }
}

impl DocumentHandle for PdfiumDocument {
    fn page_count(&self) -> usize {
        self.page_sizes.len()
    }

    fn page_size(&self, page: usize) -> Result<PageSize, Pdf2ImgError> {
        self.check_page(page)?;
        Ok(self.page_sizes[page - 1])
    }

    fn render(
        &self,
        page: usize,
        viewport: &Viewport,
        background: Color,
        intent: RenderIntent,
    ) -> Result<RgbaImage, Pdf2ImgError> {
        let index = self.check_page(page)?;
        let (width, height) = viewport.pixel_size();
        let render_failed = |detail: String| Pdf2ImgError::RenderFailed { page, detail };

        let target_width = i32::try_from(width)
            .map_err(|_| render_failed(format!("width {width} exceeds i32 range")))?;
        let target_height = i32::try_from(height)
            .map_err(|_| render_failed(format!("height {height} exceeds i32 range")))?;

        let config = PdfRenderConfig::new()
            .set_target_size(target_width, target_height)
            .set_clear_color(PdfColor::new(
                background.r,
                background.g,
                background.b,
                background.a,
            ))
            .render_annotations(true)
            .render_form_data(intent != RenderIntent::Print)
            .use_print_quality(intent == RenderIntent::Print);

        self.backend.with_pdfium(|pdfium| {
            let document = pdfium
                .load_pdf_from_byte_slice(&self.bytes, self.password.as_deref())
                .map_err(|e| map_load_error(e, &self.name, self.password.is_some()))?;
            let pdf_page = document
                .pages()
                .get(index)
                .map_err(|e| render_failed(format!("{:?}", e)))?;
            let bitmap = pdf_page
                .render_with_config(&config)
                .map_err(|e| render_failed(format!("{:?}", e)))?;
            let image = bitmap.as_image().into_rgba8();
            debug!(
                "Rendered page {} → {}x{} px",
                page,
                image.width(),
                image.height()
            );
            Ok(image)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedDoc;

    impl DocumentHandle for FixedDoc {
        fn page_count(&self) -> usize {
            1
        }

        fn page_size(&self, _page: usize) -> Result<PageSize, Pdf2ImgError> {
            Ok(PageSize {
                width: 200.0,
                height: 100.0,
            })
        }

        fn render(
            &self,
            _page: usize,
            viewport: &Viewport,
            background: Color,
            _intent: RenderIntent,
        ) -> Result<RgbaImage, Pdf2ImgError> {
            let (w, h) = viewport.pixel_size();
            Ok(RgbaImage::from_pixel(
                w,
                h,
                image::Rgba([background.r, background.g, background.b, background.a]),
            ))
        }
    }

    #[test]
    fn default_backend_honours_library_env() {
        let expected = std::env::var_os("PDFIUM_LIB_PATH").map(PathBuf::from);
        assert_eq!(PdfiumBackend::default().library_path, expected);
        assert_eq!(
            PdfiumBackend::default().library_path,
            PdfiumBackend::new().library_path
        );
    }

    #[test]
    fn default_viewport_uses_page_size() {
        let vp = FixedDoc.viewport(1, 1.5).unwrap();
        assert_eq!(vp.width, 300.0);
        assert_eq!(vp.height, 150.0);
        assert_eq!(vp.pixel_size(), (300, 150));
    }

    #[test]
    fn password_errors_are_classified() {
        let err = map_load_error(
            PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::PasswordError),
            "a.pdf",
            false,
        );
        assert!(matches!(err, Pdf2ImgError::PasswordRequired { .. }));

        let err = map_load_error(
            PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::PasswordError),
            "a.pdf",
            true,
        );
        assert!(matches!(err, Pdf2ImgError::WrongPassword { .. }));

        let err = map_load_error(
            PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::FormatError),
            "a.pdf",
            false,
        );
        assert!(matches!(err, Pdf2ImgError::CorruptPdf { .. }));
    }
}
