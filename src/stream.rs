//! Streaming conversion API: emit pages as they are ready.
//!
//! ## Streaming
//!
//! Large documents at high scale produce a lot of image data. A stream lets
//! callers write each page to disk (or a socket) as soon as it is encoded
//! instead of holding the whole document's images in memory.
//!
//! Unlike the eager [`crate::convert::convert`], [`convert_stream`] yields
//! [`RenderedPage`] items one at a time. Up to `config.concurrency` pages are
//! rendered ahead, but items are always emitted in selection order.

use crate::config::ConversionConfig;
use crate::convert::prepare;
use crate::error::Pdf2ImgError;
use crate::output::RenderedPage;
use crate::pipeline::input::Source;
use crate::pipeline::render;
use futures::stream::{self, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use tokio_stream::Stream;
use tracing::{info, warn};

/// A boxed stream of rendered pages.
pub type PageStream = Pin<Box<dyn Stream<Item = Result<RenderedPage, Pdf2ImgError>> + Send>>;

/// Convert a PDF to images, streaming pages in selection order.
///
/// # Returns
/// - `Ok(PageStream)`: one item per selected page; a failed page yields
///   an `Err` item and later pages are still attempted
/// - `Err(Pdf2ImgError)`: the document could not be loaded or the page
///   selection does not fit it
///
/// # Example
/// ```rust,no_run
/// use pdf2img::{convert_stream, ConversionConfig};
/// use futures::StreamExt;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ConversionConfig::default();
/// let mut pages = convert_stream("document.pdf", &config).await?;
/// while let Some(page) = pages.next().await {
///     let page = page?;
///     std::fs::write(format!("page-{}.png", page.page_num), &page.image.bytes)?;
/// }
/// # Ok(())
/// # }
/// ```
pub async fn convert_stream(
    source: impl Into<Source>,
    config: &ConversionConfig,
) -> Result<PageStream, Pdf2ImgError> {
    let source = source.into();
    let prepared = prepare(&source, config).await?;
    let total = prepared.pages.len();
    info!("Streaming {} pages from {}", total, prepared.name);

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_start(total);
    }

    let concurrency = config.concurrency;
    let config = Arc::new(config.clone());
    let doc = prepared.doc;

    let s = stream::iter(prepared.pages)
        .map(move |page_num| {
            let doc = Arc::clone(&doc);
            let cfg = Arc::clone(&config);
            async move {
                if let Some(ref cb) = cfg.progress_callback {
                    cb.on_page_start(page_num, total);
                }
                let result = render::render_page(doc, page_num, &cfg).await;
                if let Some(ref cb) = cfg.progress_callback {
                    match &result {
                        Ok(page) => cb.on_page_complete(page_num, total, page.image.len()),
                        Err(e) => cb.on_page_error(page_num, total, &e.to_string()),
                    }
                }
                if let Err(ref e) = result {
                    warn!("Page {} failed: {}", page_num, e);
                }
                result
            }
        })
        .buffered(concurrency);

    Ok(Box::pin(s))
}

/// Streaming equivalent of [`crate::convert::convert_from_bytes`].
pub async fn convert_stream_from_bytes(
    bytes: &[u8],
    config: &ConversionConfig,
) -> Result<PageStream, Pdf2ImgError> {
    convert_stream(Source::from(bytes), config).await
}
