//! Eager (full-document) conversion entry points.
//!
//! ## Eager vs. streaming
//!
//! This module provides the simpler API: wait for all selected pages, then
//! return them in selection order. Use [`crate::stream::convert_stream`]
//! instead when you want pages progressively or need to bound peak memory on
//! documents with hundreds of pages.
//!
//! ## Ordering
//!
//! Pages render concurrently (up to `config.concurrency` per document) but
//! results are joined by their position in the resolved selection, never by
//! completion time. Multiple sources are converted concurrently and returned
//! in input order.

use crate::config::ConversionConfig;
use crate::error::Pdf2ImgError;
use crate::naming::NameTemplate;
use crate::output::{Conversion, DocumentInfo, RenderedPage, WrittenImage};
use crate::pages::PageSelection;
use crate::pipeline::backend::{DocumentHandle, PdfiumBackend, RenderBackend};
use crate::pipeline::input::{self, Source};
use crate::pipeline::render;
use futures::future;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Convert one PDF to images.
///
/// `source` may be PDF bytes, a local path or an HTTP/HTTPS URL (see
/// [`Source`]).
///
/// # Returns
/// [`Conversion::Single`] when the selection names exactly one page
/// (`firstPage`, `lastPage` or a page number), otherwise
/// [`Conversion::Pages`] in selection order.
///
/// # Errors
/// Page-selection errors are reported before any page is rendered. The
/// first page that fails to render or encode fails the whole call.
///
/// # Example
/// ```rust,no_run
/// use pdf2img::{convert, ConversionConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ConversionConfig::builder().pages("firstPage".parse::<pdf2img::PageSelection>()?).build()?;
/// let cover = convert("document.pdf", &config).await?;
/// println!("{}", cover.pages()[0].image.to_data_url());
/// # Ok(())
/// # }
/// ```
pub async fn convert(
    source: impl Into<Source>,
    config: &ConversionConfig,
) -> Result<Conversion, Pdf2ImgError> {
    convert_source(&source.into(), config).await
}

/// Convert PDF bytes already in memory.
pub async fn convert_from_bytes(
    bytes: &[u8],
    config: &ConversionConfig,
) -> Result<Conversion, Pdf2ImgError> {
    convert_source(&Source::from(bytes), config).await
}

/// Convert several PDFs concurrently, failing fast.
///
/// Results are in input order. The first source to fail fails the call and
/// the remaining conversions are dropped; use [`convert_each`] to keep the
/// successful ones.
pub async fn convert_many<I, S>(
    sources: I,
    config: &ConversionConfig,
) -> Result<Vec<Conversion>, Pdf2ImgError>
where
    I: IntoIterator<Item = S>,
    S: Into<Source>,
{
    let sources: Vec<Source> = sources.into_iter().map(Into::into).collect();
    info!("Converting {} sources", sources.len());
    future::try_join_all(sources.iter().map(|s| convert_source(s, config))).await
}

/// Convert several PDFs concurrently, keeping one result slot per source.
///
/// A failed source does not affect the others; its slot holds the error.
pub async fn convert_each<I, S>(
    sources: I,
    config: &ConversionConfig,
) -> Vec<Result<Conversion, Pdf2ImgError>>
where
    I: IntoIterator<Item = S>,
    S: Into<Source>,
{
    let sources: Vec<Source> = sources.into_iter().map(Into::into).collect();
    info!("Converting {} sources (partial results)", sources.len());
    let results =
        future::join_all(sources.iter().map(|s| convert_source(s, config))).await;
    for (source, result) in sources.iter().zip(&results) {
        if let Err(e) = result {
            warn!("Conversion of {} failed: {}", source.display_name(), e);
        }
    }
    results
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    source: impl Into<Source>,
    config: &ConversionConfig,
) -> Result<Conversion, Pdf2ImgError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Pdf2ImgError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(source, config))
}

/// Convert a PDF and write every image into `out_dir`.
///
/// File names come from `template`. Each file is written atomically (a
/// uniquely named temp file, then a rename) so a crash never leaves a
/// truncated image behind. The template is checked against the number of
/// selected pages before any page is rendered.
pub async fn convert_to_dir(
    source: impl Into<Source>,
    out_dir: impl AsRef<Path>,
    template: &NameTemplate,
    config: &ConversionConfig,
) -> Result<Vec<WrittenImage>, Pdf2ImgError> {
    let source = source.into();
    let prepared = prepare(&source, config).await?;
    let targets = plan_outputs(&source, &prepared, out_dir.as_ref(), template, config)?;
    write_prepared(&prepared, out_dir.as_ref(), targets, config).await
}

/// Convert several PDFs into one directory, with one result slot per source.
///
/// Every output path is planned before anything is rendered. A source whose
/// images would land on a file already claimed by an earlier source fails
/// with [`Pdf2ImgError::OutputNameCollision`] and writes nothing; the other
/// sources are still converted.
pub async fn convert_many_to_dir<I, S>(
    sources: I,
    out_dir: impl AsRef<Path>,
    template: &NameTemplate,
    config: &ConversionConfig,
) -> Vec<Result<Vec<WrittenImage>, Pdf2ImgError>>
where
    I: IntoIterator<Item = S>,
    S: Into<Source>,
{
    let out_dir = out_dir.as_ref();
    let sources: Vec<Source> = sources.into_iter().map(Into::into).collect();
    info!(
        "Converting {} sources into {}",
        sources.len(),
        out_dir.display()
    );

    let prepared = future::join_all(sources.iter().map(|s| prepare(s, config))).await;

    let mut claimed: HashMap<PathBuf, String> = HashMap::new();
    let planned: Vec<Result<(PreparedDocument, Vec<PathBuf>), Pdf2ImgError>> = sources
        .iter()
        .zip(prepared)
        .map(|(source, prepared)| {
            let prepared = prepared?;
            let targets = plan_outputs(source, &prepared, out_dir, template, config)?;
            if let Some((path, owner)) = targets
                .iter()
                .find_map(|t| claimed.get(t).map(|owner| (t.clone(), owner.clone())))
            {
                return Err(Pdf2ImgError::OutputNameCollision {
                    path,
                    claimed_by: owner,
                });
            }
            for target in &targets {
                claimed.insert(target.clone(), prepared.name.clone());
            }
            Ok((prepared, targets))
        })
        .collect();

    let results = future::join_all(planned.into_iter().map(|planned| async move {
        let (prepared, targets) = planned?;
        write_prepared(&prepared, out_dir, targets, config).await
    }))
    .await;

    for (source, result) in sources.iter().zip(&results) {
        if let Err(e) = result {
            warn!("Conversion of {} failed: {}", source.display_name(), e);
        }
    }
    results
}

/// Page count and natural page sizes, without rendering anything.
pub async fn inspect(
    source: impl Into<Source>,
    config: &ConversionConfig,
) -> Result<DocumentInfo, Pdf2ImgError> {
    let source = source.into();
    let doc = open_document(&source, config).await?;

    tokio::task::spawn_blocking(move || {
        let page_count = doc.page_count();
        let page_sizes = (1..=page_count)
            .map(|p| doc.page_size(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(DocumentInfo {
            page_count,
            page_sizes,
        })
    })
    .await
    .map_err(|e| Pdf2ImgError::Internal(format!("Inspect task panicked: {}", e)))?
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// An opened document with its selection resolved.
pub(crate) struct PreparedDocument {
    pub(crate) doc: Arc<dyn DocumentHandle>,
    pub(crate) pages: Vec<usize>,
    pub(crate) name: String,
}

async fn convert_source(
    source: &Source,
    config: &ConversionConfig,
) -> Result<Conversion, Pdf2ImgError> {
    let prepared = prepare(source, config).await?;
    let pages = render_prepared(&prepared, config).await?;
    Ok(shape(&config.pages, pages))
}

/// Validate options, open the document and resolve the page selection.
pub(crate) async fn prepare(
    source: &Source,
    config: &ConversionConfig,
) -> Result<PreparedDocument, Pdf2ImgError> {
    config.validate()?;
    let name = source.display_name();
    info!("Starting conversion: {}", name);

    let doc = open_document(source, config).await?;
    let total_pages = doc.page_count();
    if total_pages == 0 {
        return Err(Pdf2ImgError::EmptyDocument { source_name: name });
    }

    let pages = config.pages.resolve(total_pages)?;
    info!(
        "{}: {} pages, {} selected ({})",
        name,
        total_pages,
        pages.len(),
        config.pages
    );

    Ok(PreparedDocument { doc, pages, name })
}

/// Load `source` and open it with the configured backend.
async fn open_document(
    source: &Source,
    config: &ConversionConfig,
) -> Result<Arc<dyn DocumentHandle>, Pdf2ImgError> {
    let bytes = input::load_source(source, config.download_timeout_secs).await?;
    let backend = resolve_backend(config);
    let name = source.display_name();
    let options = config.document.clone();

    tokio::task::spawn_blocking(move || backend.load_document(bytes, &name, &options))
        .await
        .map_err(|e| Pdf2ImgError::Internal(format!("Load task panicked: {}", e)))?
}

/// The injected backend, or pdfium.
fn resolve_backend(config: &ConversionConfig) -> Arc<dyn RenderBackend> {
    match config.backend {
        Some(ref backend) => Arc::clone(backend),
        None => Arc::new(PdfiumBackend::new()),
    }
}

/// Render every selected page, preserving selection order.
async fn render_prepared(
    prepared: &PreparedDocument,
    config: &ConversionConfig,
) -> Result<Vec<RenderedPage>, Pdf2ImgError> {
    let start = Instant::now();
    let total = prepared.pages.len();
    let succeeded = AtomicUsize::new(0);

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_start(total);
    }

    let result: Result<Vec<RenderedPage>, Pdf2ImgError> =
        stream::iter(prepared.pages.iter().copied().map(|page_num| {
            let doc = Arc::clone(&prepared.doc);
            let succeeded = &succeeded;
            async move {
                if let Some(ref cb) = config.progress_callback {
                    cb.on_page_start(page_num, total);
                }
                let result = render::render_page(doc, page_num, config).await;
                match &result {
                    Ok(page) => {
                        succeeded.fetch_add(1, Ordering::SeqCst);
                        if let Some(ref cb) = config.progress_callback {
                            cb.on_page_complete(page_num, total, page.image.len());
                        }
                    }
                    Err(e) => {
                        warn!("Page {} of {} failed: {}", page_num, prepared.name, e);
                        if let Some(ref cb) = config.progress_callback {
                            cb.on_page_error(page_num, total, &e.to_string());
                        }
                    }
                }
                result
            }
        }))
        .buffered(config.concurrency)
        .try_collect()
        .await;

    let succeeded = succeeded.load(Ordering::SeqCst);
    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_complete(total, succeeded);
    }

    let pages = result?;
    info!(
        "Conversion complete: {} ({} pages, {}ms)",
        prepared.name,
        pages.len(),
        start.elapsed().as_millis()
    );
    Ok(pages)
}

/// Apply the single-page shape contract.
fn shape(selection: &PageSelection, mut pages: Vec<RenderedPage>) -> Conversion {
    if selection.is_single_page() && pages.len() == 1 {
        if let Some(page) = pages.pop() {
            return Conversion::Single(page);
        }
    }
    Conversion::Pages(pages)
}

/// Output path of every selected page, in selection order.
fn plan_outputs(
    source: &Source,
    prepared: &PreparedDocument,
    out_dir: &Path,
    template: &NameTemplate,
    config: &ConversionConfig,
) -> Result<Vec<PathBuf>, Pdf2ImgError> {
    template.check_count(prepared.pages.len())?;
    let stem = source.file_stem();
    let ext = config.img_type.extension();
    Ok(prepared
        .pages
        .iter()
        .enumerate()
        .map(|(i, &page_num)| out_dir.join(template.render(i + 1, page_num, ext, &stem)))
        .collect())
}

/// Render a prepared document and write page `i` to `targets[i]`.
async fn write_prepared(
    prepared: &PreparedDocument,
    out_dir: &Path,
    targets: Vec<PathBuf>,
    config: &ConversionConfig,
) -> Result<Vec<WrittenImage>, Pdf2ImgError> {
    let pages = render_prepared(prepared, config).await?;

    tokio::fs::create_dir_all(out_dir)
        .await
        .map_err(|e| Pdf2ImgError::OutputWriteFailed {
            path: out_dir.to_path_buf(),
            source: e,
        })?;

    let mut written = Vec::with_capacity(pages.len());
    for (page, path) in pages.into_iter().zip(targets) {
        let image = WrittenImage {
            page_num: page.page_num,
            width: page.width,
            height: page.height,
            bytes: page.image.len(),
            path,
        };
        write_atomic(image.path.clone(), page.image.bytes).await?;
        debug!("Wrote {} ({} bytes)", image.path.display(), image.bytes);
        written.push(image);
    }

    info!("Wrote {} images to {}", written.len(), out_dir.display());
    Ok(written)
}

/// Write `bytes` to a fresh temp file next to `path`, then rename it over
/// `path`. The temp file is removed on every error path.
async fn write_atomic(path: PathBuf, bytes: Vec<u8>) -> Result<(), Pdf2ImgError> {
    tokio::task::spawn_blocking(move || {
        let write_failed = |e: std::io::Error| Pdf2ImgError::OutputWriteFailed {
            path: path.clone(),
            source: e,
        };

        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut tmp = tempfile::Builder::new()
            .prefix(&format!(".{}.", file_name))
            .suffix(".tmp")
            .tempfile_in(dir)
            .map_err(write_failed)?;
        tmp.write_all(&bytes).map_err(write_failed)?;
        // A failed persist hands the temp file back; dropping it deletes it.
        tmp.persist(&path).map_err(|e| write_failed(e.error))?;
        Ok(())
    })
    .await
    .map_err(|e| Pdf2ImgError::Internal(format!("Write task panicked: {}", e)))?
}
